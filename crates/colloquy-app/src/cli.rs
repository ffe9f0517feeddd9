use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Colloquy: a programming assistant that can run the code it writes.
#[derive(Parser, Debug)]
#[command(name = "colloquy", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start a new conversation (the default).
    Chat,
    /// Continue a stored conversation.
    Resume {
        /// Conversation id, as shown by `list`.
        id: String,
    },
    /// List stored conversations, newest first.
    List,
    /// Delete a stored conversation.
    Delete {
        /// Conversation id, as shown by `list`.
        id: String,
    },
}

pub fn parse() -> Args {
    Args::parse()
}
