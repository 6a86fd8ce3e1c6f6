//! oauthflow server entry point.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use oauthflow_core::init_tracing;
use oauthflow_server::cli::Cli;
use oauthflow_server::{AppResult, AppState, serve};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.tracing_config()) {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "oauthflow exited with an error");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    let config = cli.load_config()?;
    let state = AppState::from_config(config)?;
    serve(Arc::new(state)).await
}
