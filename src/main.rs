use clap::Parser;
use doxsearch::cli::{Cli, Commands, execute};
use doxsearch::config::Config;
use doxsearch::server::IndexServer;
use doxsearch::worker::spawn_background_worker;
use rmcp::{ServiceExt, transport::stdio};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Logs go to stderr; stdout carries the MCP protocol and command output
    doxsearch::tracing::init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        command => {
            let outcome = tokio::task::spawn_blocking(move || execute(&command, &config)).await??;
            print!("{}", outcome.output);
            Ok(if outcome.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

async fn serve(config: Config) -> anyhow::Result<ExitCode> {
    tracing::info!("Starting doxsearch MCP server");

    let server = IndexServer::new(config);
    let state = server.doc_state().clone();

    if let Some(root) = state.config().docs_root.clone()
        && let Err(e) = state.set_docs_root(&root.display().to_string()).await
    {
        tracing::warn!("Configured docs_root is not usable: {}", e);
    }

    let cancel = CancellationToken::new();
    let worker = spawn_background_worker(state, cancel.clone());

    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("Error serving MCP server: {:?}", e);
    })?;
    service.waiting().await?;

    cancel.cancel();
    let _ = worker.await;
    Ok(ExitCode::SUCCESS)
}
