use std::time::Duration;

use anyhow::{Context, Result};
use human_panic::setup_panic;
use log::{debug, warn};

use crate::helpers::logging;

/// Shared binary entry point: panic handler, `.env`, logging, Tokio runtime.
/// The pipeline itself is synchronous Diesel work, but stages that are
/// independent of each other are fanned out as blocking tasks, so a runtime
/// is entered before `fn_run` is called.
pub fn run<CliType>(
    fn_cli_parse: fn() -> CliType,
    fn_extract_logging: fn(&CliType) -> &logging::Params,
    fn_run: fn(CliType) -> Result<()>,
) -> Result<()> {
    setup_panic!();
    load_dot_env()?;

    let cli = fn_cli_parse();
    let logger_handle = logging::configure_from(fn_extract_logging(&cli))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .with_context(|| "Failed to start Tokio runtime")?;
    let _guard = runtime.enter();

    let run_result = fn_run(cli);

    debug!("Waiting up to 10 seconds for remaining tasks to finish");
    runtime.shutdown_timeout(Duration::from_secs(10));

    // Important with non-direct write mode
    // Handle needs to be kept alive until end of program
    logger_handle.flush();

    run_result
}

fn load_dot_env() -> Result<()> {
    if let Err(env_err) = dotenvy::dotenv() {
        if env_err.not_found() {
            warn!("No `.env` file found (recursively). You usually want to have one.")
        } else {
            return Err(env_err).with_context(|| "Failed to load `.env` file");
        }
    }
    Ok(())
}
