//! Structured telemetry initialisation for the daemon.
//!
//! Events always go to stderr. When a log file is configured every line is
//! also appended there, and the file is rotated by size: `<file>` becomes
//! `<file>.1`, `<file>.1` becomes `<file>.2`, and so on up to the configured
//! number of backups.

use std::fs::{self, File, OpenOptions};
use std::io::{self, IsTerminal, Write};
use std::sync::Mutex;

use camino::{Utf8Path, Utf8PathBuf};
use once_cell::sync::OnceCell;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::{self, writer::BoxMakeWriter, writer::MakeWriterExt};

use rfsoc_config::{Config, LogFormat, LogRotation};

static TELEMETRY_GUARD: OnceCell<()> = OnceCell::new();

/// Handle returned when telemetry has been initialised.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelemetryHandle;

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to parse the configured log filter expression.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// Failed to open the log file.
    #[error("failed to open log file '{path}': {source}")]
    LogFile {
        /// Configured log file.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Failed to install the tracing subscriber.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Configures the global tracing subscriber when invoked for the first time.
///
/// Repeated calls are idempotent: only the first invocation installs the
/// subscriber and opens the log file.
///
/// # Errors
///
/// Returns [`TelemetryError`] if the filter is malformed, the log file cannot
/// be opened, or another subscriber is already installed.
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    TELEMETRY_GUARD
        .get_or_try_init(|| install_subscriber(config))
        .map(|_| TelemetryHandle)
}

fn install_subscriber(config: &Config) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_new(config.log_filter())
        .map_err(|error| TelemetryError::Filter(error.to_string()))?;

    let (writer, ansi) = match config.log_file() {
        Some(path) => {
            let file = RotatingFile::open(path, config.log_rotation()).map_err(|source| {
                TelemetryError::LogFile {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
            (BoxMakeWriter::new(io::stderr.and(Mutex::new(file))), false)
        }
        None => (BoxMakeWriter::new(io::stderr), io::stderr().is_terminal()),
    };

    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_timer(fmt::time::UtcTime::rfc_3339());

    let subscriber: Box<dyn Subscriber + Send + Sync> = match config.log_format() {
        LogFormat::Json => Box::new(builder.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder.compact().finish()),
    };

    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)
}

/// Append-only log file rotated once it reaches a size threshold.
#[derive(Debug)]
pub struct RotatingFile {
    path: Utf8PathBuf,
    rotation: LogRotation,
    file: File,
    written: u64,
}

impl RotatingFile {
    /// Opens (or creates) `path` for appending.
    ///
    /// # Errors
    ///
    /// Returns the IO error if the file cannot be opened.
    pub fn open(path: &Utf8Path, rotation: LogRotation) -> io::Result<Self> {
        let file = append(path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            path: path.to_path_buf(),
            rotation,
            file,
            written,
        })
    }

    fn backup(&self, index: u32) -> Utf8PathBuf {
        Utf8PathBuf::from(format!("{}.{index}", self.path))
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        if self.rotation.backups == 0 {
            self.file = File::create(&self.path)?;
        } else {
            for index in (1..self.rotation.backups).rev() {
                rename_if_present(&self.backup(index), &self.backup(index + 1))?;
            }
            rename_if_present(&self.path, &self.backup(1))?;
            self.file = append(&self.path)?;
        }
        self.written = 0;
        Ok(())
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let incoming = u64::try_from(buf.len()).unwrap_or(u64::MAX);
        if self.written > 0 && self.written.saturating_add(incoming) > self.rotation.max_bytes {
            self.rotate()?;
        }
        let count = self.file.write(buf)?;
        self.written = self
            .written
            .saturating_add(u64::try_from(count).unwrap_or(u64::MAX));
        Ok(count)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

fn append(path: &Utf8Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn rename_if_present(from: &Utf8Path, to: &Utf8Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
