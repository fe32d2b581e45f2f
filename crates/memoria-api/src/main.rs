//! Memoria CLI entry point.
//!
//! Binary name: `memoria`

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    memoria_observe::tracing_setup::init_tracing(cli::log_filter(cli.verbose, cli.quiet), cli.otel)
        .map_err(|e| anyhow::anyhow!(e))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "memoria", &mut std::io::stdout());
        return Ok(());
    }

    // Initialize application state (config, DB, provider)
    let state = AppState::init().await?;

    let result = match cli.command {
        Commands::Memory { action } => {
            cli::memory::handle_memory_command(action, &state, cli.json).await
        }
        Commands::Message { action } => {
            cli::message::handle_message_command(action, &state, cli.json).await
        }
        Commands::Model { action } => {
            cli::model::handle_model_command(action, &state, cli.json).await
        }
        Commands::Completions { .. } => Ok(()),
    };

    state.db_pool.close().await;
    memoria_observe::tracing_setup::shutdown_tracing();

    result
}
