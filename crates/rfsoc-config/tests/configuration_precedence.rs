//! Layer precedence for the daemon configuration.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use once_cell::sync::Lazy;
use ortho_config::OrthoConfig;
use rstest::{fixture, rstest};
use tempfile::TempDir;

use rfsoc_config::{Config, DEFAULT_REDIS_HOST, DEFAULT_REDIS_PORT, LogFormat};

static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Serialises environment mutation and restores previous values on drop.
struct EnvGuard {
    overrides: Vec<(&'static str, Option<OsString>)>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvGuard {
    fn new() -> Self {
        let lock = ENV_MUTEX
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Self {
            overrides: Vec::new(),
            _lock: lock,
        }
    }

    fn set(&mut self, key: &'static str, value: impl AsRef<OsStr>) {
        self.overrides.push((key, std::env::var_os(key)));
        // Environment mutation is unsafe under edition 2024; the mutex keeps
        // tests in this binary from racing on it.
        unsafe { std::env::set_var(key, value) };
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        while let Some((key, previous)) = self.overrides.pop() {
            match previous {
                Some(value) => unsafe { std::env::set_var(key, value) },
                None => unsafe { std::env::remove_var(key) },
            }
        }
    }
}

struct Harness {
    temp_dir: TempDir,
    env: EnvGuard,
}

impl Harness {
    fn write_config(&self, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join("rfsoc.toml");
        fs::write(&path, contents).expect("write configuration file");
        path
    }
}

#[fixture]
fn harness() -> Harness {
    Harness {
        temp_dir: TempDir::new().expect("create temp dir"),
        env: EnvGuard::new(),
    }
}

fn args(extra: &[OsString]) -> Vec<OsString> {
    let mut args = vec![OsString::from("rfsocd")];
    args.extend(extra.iter().cloned());
    args
}

#[rstest]
fn defaults_apply_without_sources(harness: Harness) {
    let config = Config::load_from_iter(args(&[])).expect("load defaults");
    assert_eq!(config.redis_host(), DEFAULT_REDIS_HOST);
    assert_eq!(config.redis_port(), DEFAULT_REDIS_PORT);
    drop(harness);
}

#[rstest]
fn file_values_override_defaults(harness: Harness) {
    let path = harness.write_config(
        "device_name = \"rfsoc2\"\nredis_host = \"192.168.2.10\"\nlog_format = \"compact\"\n",
    );
    let config = Config::load_from_iter(args(&[
        OsString::from("--config-path"),
        path.into_os_string(),
    ]))
    .expect("load file configuration");

    assert_eq!(config.device_name(), "rfsoc2");
    assert_eq!(config.redis_host(), "192.168.2.10");
    assert_eq!(config.log_format(), LogFormat::Compact);
}

#[rstest]
fn environment_overrides_file(mut harness: Harness) {
    let path = harness.write_config("redis_port = 6400\n");
    harness.env.set("RFSOC_REDIS_PORT", "6500");

    let config = Config::load_from_iter(args(&[
        OsString::from("--config-path"),
        path.into_os_string(),
    ]))
    .expect("load layered configuration");

    assert_eq!(config.redis_port(), 6500);
}

#[rstest]
fn cli_overrides_environment(mut harness: Harness) {
    harness.env.set("RFSOC_DEVICE_NAME", "from-env");

    let config = Config::load_from_iter(args(&[
        OsString::from("--device-name"),
        OsString::from("from-cli"),
    ]))
    .expect("load cli configuration");

    assert_eq!(config.device_name(), "from-cli");
}

#[rstest]
fn malformed_file_is_rejected(harness: Harness) {
    let path = harness.write_config("redis_port = \"not a port\"\n");
    let result = Config::load_from_iter(args(&[
        OsString::from("--config-path"),
        path.into_os_string(),
    ]));
    assert!(result.is_err(), "malformed configuration should fail to load");
}
