use smooth_kml::{Settings, logging, run};
use std::process::ExitCode;

fn main() -> ExitCode {
    let _logging = logging::setup_logging();
    logging::log_version_info();

    let settings = Settings::from_cli();
    tracing::debug!("{:?}", settings);

    match run(&settings) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
