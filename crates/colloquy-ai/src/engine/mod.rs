//! Top-level sequencing of a user turn: run the loop, name the
//! conversation, persist it.

mod context;
mod error;
mod orchestrator;

pub use context::EngineContext;
pub use error::EngineError;
pub use orchestrator::{derive_title, Orchestrator, TurnReply};
