//! Conversation sessions.
//!
//! A `SessionHandle` holds the turn history of one conversation and runs
//! the tool-call loop against it. The `SessionManager` creates fresh handles
//! and rebuilds them from the store on resume.

mod chat;
mod handle;
mod manager;

pub use chat::LoopOutcome;
pub use handle::SessionHandle;
pub use manager::SessionManager;

/// Title of a conversation that has not been named yet.
pub const PLACEHOLDER_TITLE: &str = "untitled";

#[cfg(test)]
mod tests;
