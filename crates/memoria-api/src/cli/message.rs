//! Conversation message CLI commands.
//!
//! Messages recorded here are the transcript source for `memoria memory extract`.

use anyhow::Result;
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use uuid::Uuid;

use memoria_core::chat::repository::ConversationRepository;
use memoria_types::chat::ConversationMessage;
use memoria_types::llm::MessageRole;

use super::{short_id, truncate_chars};
use crate::state::AppState;

#[derive(Subcommand)]
pub enum MessageCommand {
    /// Append a message to a conversation.
    Add {
        #[arg(long)]
        conversation: Uuid,
        /// system, user, or assistant.
        #[arg(long, default_value = "user")]
        role: MessageRole,
        content: String,
    },

    /// Show the most recent messages of a conversation, oldest first.
    #[command(alias = "ls")]
    List {
        #[arg(long)]
        conversation: Uuid,
        #[arg(long, default_value = "20")]
        limit: usize,
    },
}

pub async fn handle_message_command(cmd: MessageCommand, state: &AppState, json: bool) -> Result<()> {
    let conversations = state.memory.conversations();

    match cmd {
        MessageCommand::Add {
            conversation,
            role,
            content,
        } => {
            if content.trim().is_empty() {
                anyhow::bail!("Message content must not be empty");
            }
            let message = ConversationMessage::new(conversation, role, content);
            conversations.save_message(&message).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&message)?);
            } else {
                println!(
                    "  {} {} message saved to conversation {}",
                    style("*").green().bold(),
                    message.role,
                    style(short_id(&conversation)).cyan()
                );
            }
        }
        MessageCommand::List {
            conversation,
            limit,
        } => {
            let messages = conversations.get_recent_messages(&conversation, limit).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&messages)?);
                return Ok(());
            }

            if messages.is_empty() {
                println!("  {} No messages in this conversation.", style("i").blue().bold());
                return Ok(());
            }

            let mut table = Table::new();
            table.load_preset(presets::UTF8_FULL_CONDENSED);
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec![
                Cell::new("Time").fg(Color::White),
                Cell::new("Role").fg(Color::White),
                Cell::new("Content").fg(Color::White),
            ]);

            for msg in &messages {
                let role_cell = match msg.role {
                    MessageRole::User => Cell::new("user").fg(Color::Cyan),
                    MessageRole::Assistant => Cell::new("assistant").fg(Color::Green),
                    MessageRole::System => Cell::new("system").fg(Color::DarkGrey),
                };
                table.add_row(vec![
                    Cell::new(msg.created_at.format("%Y-%m-%d %H:%M:%S").to_string())
                        .fg(Color::DarkGrey),
                    role_cell,
                    Cell::new(truncate_chars(&msg.content, 80)),
                ]);
            }

            println!("{table}");
        }
    }

    Ok(())
}
