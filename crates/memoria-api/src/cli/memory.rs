//! Memory management CLI commands.
//!
//! Every command goes through the `MemoryManager` so ownership checks and
//! context-cache invalidation apply exactly as they do for library callers.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use memoria_types::error::MemoryError;
use memoria_types::memory::{Memory, MemoryCategory, MemoryUpdate};

use super::{short_id, truncate_chars};
use crate::state::AppState;

#[derive(Subcommand)]
pub enum MemoryCommand {
    /// List a user's memories, newest first.
    #[command(alias = "ls")]
    List {
        #[arg(long)]
        user: Uuid,
        #[arg(long, default_value = "50")]
        limit: usize,
        #[arg(long, default_value = "0")]
        offset: usize,
    },

    /// Show the top-ranked memories (importance, then recency).
    Relevant {
        #[arg(long)]
        user: Uuid,
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Add a memory by hand. No dedup is applied.
    Add {
        #[arg(long)]
        user: Uuid,
        #[arg(long)]
        content: String,
        /// preference, fact, or context.
        #[arg(long, default_value = "fact")]
        category: MemoryCategory,
        /// 1 (trivial) to 10 (critical).
        #[arg(long, default_value = "5")]
        importance: u8,
    },

    /// Change fields of an existing memory.
    Edit {
        #[arg(long)]
        user: Uuid,
        /// Memory ID.
        id: Uuid,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        category: Option<MemoryCategory>,
        #[arg(long)]
        importance: Option<u8>,
    },

    /// Delete a memory.
    #[command(alias = "rm")]
    Delete {
        #[arg(long)]
        user: Uuid,
        /// Memory ID.
        id: Uuid,
        /// Skip the confirmation prompt.
        #[arg(long)]
        force: bool,
    },

    /// Delete old, low-importance, rarely used memories.
    Cleanup {
        #[arg(long)]
        user: Uuid,
    },

    /// Print the compiled memory context injected into prompts.
    Context {
        #[arg(long)]
        user: Uuid,
    },

    /// Extract new memories from a conversation.
    Extract {
        #[arg(long)]
        user: Uuid,
        #[arg(long)]
        conversation: Uuid,
    },
}

/// Handle a memory subcommand.
pub async fn handle_memory_command(cmd: MemoryCommand, state: &AppState, json: bool) -> Result<()> {
    match cmd {
        MemoryCommand::List {
            user,
            limit,
            offset,
        } => {
            let memories = state.memory.get_user_memories(&user, limit, offset).await?;
            print_memories(&memories, json, "No memories yet. Memories are extracted from conversations.")
        }
        MemoryCommand::Relevant { user, limit } => {
            let memories = state.memory.get_relevant_memories(&user, limit).await?;
            print_memories(&memories, json, "No memories to rank.")
        }
        MemoryCommand::Add {
            user,
            content,
            category,
            importance,
        } => {
            let memory = state
                .memory
                .create_memory(user, &content, category, importance)
                .await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&memory)?);
            } else {
                println!(
                    "  {} Memory {} saved",
                    style("*").green().bold(),
                    style(short_id(&memory.id)).cyan()
                );
                println!("  {}", style(&memory.content).dim());
            }
            Ok(())
        }
        MemoryCommand::Edit {
            user,
            id,
            content,
            category,
            importance,
        } => {
            let update = MemoryUpdate {
                content,
                category,
                importance,
            };
            if update.is_empty() {
                anyhow::bail!("Nothing to change: pass --content, --category, or --importance");
            }
            let memory = state
                .memory
                .update_memory(&user, &id, update)
                .await
                .map_err(|e| describe_access_error(e, &id))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&memory)?);
            } else {
                println!(
                    "  {} Memory {} updated",
                    style("*").green().bold(),
                    style(short_id(&memory.id)).cyan()
                );
            }
            Ok(())
        }
        MemoryCommand::Delete { user, id, force } => delete_memory(state, user, id, force, json).await,
        MemoryCommand::Cleanup { user } => {
            let deleted = state.memory.cleanup_old_memories(&user).await?;
            if json {
                println!("{}", serde_json::json!({ "deleted": deleted }));
            } else {
                println!(
                    "  {} Removed {} stale memor{}",
                    style("x").red().bold(),
                    style(deleted).bold(),
                    if deleted == 1 { "y" } else { "ies" }
                );
            }
            Ok(())
        }
        MemoryCommand::Context { user } => {
            let context = state.memory.build_memory_context(&user).await?;
            if json {
                println!("{}", serde_json::json!({ "context": context }));
            } else if context.is_empty() {
                println!("  {} No memory context for this user.", style("i").blue().bold());
            } else {
                print!("{context}");
            }
            Ok(())
        }
        MemoryCommand::Extract { user, conversation } => {
            extract(state, user, conversation, json).await
        }
    }
}

async fn delete_memory(state: &AppState, user: Uuid, id: Uuid, force: bool, json: bool) -> Result<()> {
    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete memory {}?", style(short_id(&id)).red().bold()))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    state
        .memory
        .delete_memory(&user, &id)
        .await
        .map_err(|e| describe_access_error(e, &id))?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "deleted": true, "memory_id": id.to_string() })
        );
    } else {
        println!("  {} Memory {} deleted.", style("x").red().bold(), short_id(&id));
    }

    Ok(())
}

/// Run one extraction with a spinner. Ctrl+C cancels the run; facts already
/// stored are kept.
async fn extract(state: &AppState, user: Uuid, conversation: Uuid, json: bool) -> Result<()> {
    let cancel = CancellationToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let spinner = (!json).then(|| {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message("Extracting memories...");
        spinner.enable_steady_tick(Duration::from_millis(80));
        spinner
    });

    let outcome = state
        .memory
        .extract_memories_with_cancel(user, conversation, &cancel)
        .await;
    ctrl_c.abort();
    if let Some(spinner) = &spinner {
        spinner.finish_and_clear();
    }

    let report = outcome.context("Memory extraction failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.extracted == 0 && report.messages_considered < state.config.memory.min_messages_for_extraction {
        println!(
            "  {} Not enough messages to extract from ({} found).",
            style("i").blue().bold(),
            report.messages_considered
        );
        return Ok(());
    }

    println!(
        "  {} {} new, {} duplicate{}, {} failed (from {} fact{})",
        style("*").green().bold(),
        style(report.inserted).bold(),
        report.skipped_duplicates,
        if report.skipped_duplicates == 1 { "" } else { "s" },
        report.failed,
        report.extracted,
        if report.extracted == 1 { "" } else { "s" },
    );
    Ok(())
}

fn describe_access_error(err: MemoryError, id: &Uuid) -> anyhow::Error {
    match err {
        MemoryError::NotFound | MemoryError::Unauthorized => {
            anyhow::anyhow!("Memory {id} not found for this user")
        }
        other => other.into(),
    }
}

fn print_memories(memories: &[Memory], json: bool, empty_hint: &str) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(memories)?);
        return Ok(());
    }

    if memories.is_empty() {
        println!();
        println!("  {} {empty_hint}", style("i").blue().bold());
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("ID").fg(Color::White),
        Cell::new("Content").fg(Color::White),
        Cell::new("Category").fg(Color::White),
        Cell::new("Importance").fg(Color::White),
        Cell::new("Used").fg(Color::White),
        Cell::new("Source").fg(Color::White),
        Cell::new("Date").fg(Color::White),
    ]);

    for mem in memories {
        let category_cell = match mem.category {
            MemoryCategory::Preference => Cell::new("preference").fg(Color::Magenta),
            MemoryCategory::Fact => Cell::new("fact").fg(Color::Cyan),
            MemoryCategory::Context => Cell::new("context").fg(Color::Blue),
        };

        let source = match mem.source_conversation_id {
            Some(conv) => format!("conv:{}", short_id(&conv)),
            None => "manual".to_string(),
        };

        table.add_row(vec![
            Cell::new(short_id(&mem.id)).fg(Color::DarkGrey),
            Cell::new(truncate_chars(&mem.content, 60)).fg(Color::White),
            category_cell,
            Cell::new(format_importance(mem.importance)).fg(Color::Yellow),
            Cell::new(mem.usage_count).fg(Color::DarkGrey),
            Cell::new(source).fg(Color::DarkGrey),
            Cell::new(mem.created_at.format("%Y-%m-%d").to_string()).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} memor{}",
        style(memories.len()).bold(),
        if memories.len() == 1 { "y" } else { "ies" }
    );
    println!();

    Ok(())
}

fn format_importance(level: u8) -> String {
    format!("{level:>2}/10")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_foreign_memories_read_the_same() {
        let id = Uuid::now_v7();
        let missing = describe_access_error(MemoryError::NotFound, &id).to_string();
        let foreign = describe_access_error(MemoryError::Unauthorized, &id).to_string();
        assert_eq!(missing, foreign);
        assert_eq!(missing, format!("Memory {id} not found for this user"));
    }

    #[test]
    fn other_errors_pass_through() {
        let err = describe_access_error(MemoryError::Timeout, &Uuid::now_v7());
        assert!(matches!(err.downcast_ref::<MemoryError>(), Some(MemoryError::Timeout)));
    }
}
