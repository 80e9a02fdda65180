// The binary uses the library, not duplicate modules
use photo_route_viewer::{Settings, run, setup_logging};
use std::process::ExitCode;

fn main() -> ExitCode {
    let settings = Settings::from_cli();
    setup_logging(settings.verbose);

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run(settings)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
