use std::process::ExitCode;

fn main() -> ExitCode {
    rfsocd::run_daemon()
}
