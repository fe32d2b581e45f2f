//! CLI command definitions for the `memoria` binary.
//!
//! Uses clap derive macros. Commands are grouped by noun
//! (e.g., `memoria memory list`, `memoria model add`).

pub mod memory;
pub mod message;
pub mod model;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Inspect and manage long-term user memories.
#[derive(Parser)]
#[command(name = "memoria", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans to stdout through OpenTelemetry.
    #[arg(long, global = true, hide = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage a user's memories (list, add, edit, delete, extract, ...).
    #[command(alias = "mem")]
    Memory {
        #[command(subcommand)]
        action: memory::MemoryCommand,
    },

    /// Record and inspect conversation messages.
    #[command(alias = "msg")]
    Message {
        #[command(subcommand)]
        action: message::MessageCommand,
    },

    /// Manage the models available for extraction.
    Model {
        #[command(subcommand)]
        action: model::ModelCommand,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Tracing filter for the given verbosity flags.
pub fn log_filter(verbose: u8, quiet: bool) -> &'static str {
    match verbose {
        0 if quiet => "error",
        0 => "warn",
        1 => "info,memoria=debug",
        _ => "trace",
    }
}

/// Shorten `text` to at most `max` characters, appending "..." when cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// First eight characters of an ID, for compact tables.
pub fn short_id(id: &uuid::Uuid) -> String {
    id.to_string()[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_memory_add() {
        let user = uuid::Uuid::now_v7();
        let cli = Cli::try_parse_from([
            "memoria",
            "memory",
            "add",
            "--user",
            &user.to_string(),
            "--content",
            "likes tea",
            "--category",
            "preference",
            "--importance",
            "7",
        ])
        .unwrap();

        match cli.command {
            Commands::Memory {
                action:
                    memory::MemoryCommand::Add {
                        user: parsed,
                        content,
                        category,
                        importance,
                    },
            } => {
                assert_eq!(parsed, user);
                assert_eq!(content, "likes tea");
                assert_eq!(category, memoria_types::memory::MemoryCategory::Preference);
                assert_eq!(importance, 7);
            }
            _ => panic!("expected memory add"),
        }
    }

    #[test]
    fn rejects_unknown_category() {
        let result = Cli::try_parse_from([
            "memoria",
            "memory",
            "add",
            "--user",
            &uuid::Uuid::now_v7().to_string(),
            "--content",
            "x",
            "--category",
            "skill",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn log_filter_levels() {
        assert_eq!(log_filter(0, true), "error");
        assert_eq!(log_filter(0, false), "warn");
        assert_eq!(log_filter(1, false), "info,memoria=debug");
        assert_eq!(log_filter(3, false), "trace");
    }

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("喜欢黑咖啡喜欢黑咖啡", 6), "喜欢黑...");
    }
}
