//! Model registry CLI commands.

use anyhow::Result;
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use uuid::Uuid;

use memoria_core::llm::registry::ModelRegistry;
use memoria_types::llm::AiModel;

use crate::state::AppState;

#[derive(Subcommand)]
pub enum ModelCommand {
    /// Register a model.
    Add {
        /// Display name.
        #[arg(long)]
        name: String,
        /// Identifier sent to the provider (e.g., gpt-4o-mini).
        #[arg(long)]
        identifier: String,
        /// Register without making it available for extraction.
        #[arg(long)]
        inactive: bool,
    },

    /// Make a registered model available for extraction.
    Enable { identifier: String },

    /// Stop using a registered model for extraction.
    Disable { identifier: String },

    /// List registered models.
    #[command(alias = "ls")]
    List {
        /// Only show active models.
        #[arg(long)]
        active: bool,
    },
}

pub async fn handle_model_command(cmd: ModelCommand, state: &AppState, json: bool) -> Result<()> {
    let registry = state.memory.models();

    match cmd {
        ModelCommand::Add {
            name,
            identifier,
            inactive,
        } => {
            let model = AiModel {
                id: Uuid::now_v7(),
                name,
                model_identifier: identifier,
                is_active: !inactive,
            };
            registry.create(&model).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&model)?);
            } else {
                println!(
                    "  {} Model '{}' registered",
                    style("*").green().bold(),
                    style(&model.model_identifier).cyan()
                );
            }
        }
        ModelCommand::Enable { identifier } => {
            registry.set_active(&identifier, true).await?;
            if !json {
                println!(
                    "  {} Model '{}' enabled",
                    style("*").green().bold(),
                    style(&identifier).cyan()
                );
            }
        }
        ModelCommand::Disable { identifier } => {
            registry.set_active(&identifier, false).await?;
            if !json {
                println!(
                    "  {} Model '{}' disabled",
                    style("*").yellow().bold(),
                    style(&identifier).cyan()
                );
            }
        }
        ModelCommand::List { active } => {
            let models = registry.list(active).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&models)?);
                return Ok(());
            }
            if models.is_empty() {
                println!(
                    "  {} No models registered. Add one with `memoria model add`.",
                    style("i").blue().bold()
                );
                return Ok(());
            }

            let default_model = state.config.memory.default_model.as_deref();
            let mut table = Table::new();
            table.load_preset(presets::UTF8_FULL_CONDENSED);
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec![
                Cell::new("Name").fg(Color::White),
                Cell::new("Identifier").fg(Color::White),
                Cell::new("Status").fg(Color::White),
            ]);

            for model in &models {
                let status = match (model.is_active, default_model == Some(model.model_identifier.as_str())) {
                    (true, true) => Cell::new("active (default)").fg(Color::Green),
                    (true, false) => Cell::new("active").fg(Color::Green),
                    (false, _) => Cell::new("inactive").fg(Color::DarkGrey),
                };
                table.add_row(vec![
                    Cell::new(&model.name),
                    Cell::new(&model.model_identifier).fg(Color::Cyan),
                    status,
                ]);
            }
            println!("{table}");
        }
    }

    Ok(())
}
