mod api;
mod cli;
mod editor;
mod error;
mod logging;
mod model;
mod orchestrator;
mod session;
#[cfg(test)]
mod test_support;
mod text_summary;
mod theme;
mod timer;
#[cfg(feature = "tui")]
mod tui;

use clap::Parser;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::Cli::parse();

    // Logs are best effort; a read-only data dir must not stop the client.
    if let Err(e) = logging::init() {
        eprintln!("warning: logging disabled: {e:#}");
    }

    match cli::run(args).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("fatal: {e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
