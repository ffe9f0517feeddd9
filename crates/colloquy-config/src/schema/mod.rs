//! Configuration schema types for Colloquy.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod agent;
mod model;
mod sandbox;
mod storage;
mod system;

pub use agent::*;
pub use model::*;
pub use sandbox::*;
pub use storage::*;
pub use system::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration for Colloquy.
///
/// Only override what you want to change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct ColloquyConfig {
    pub model: ModelConfig,
    pub agent: AgentConfig,
    pub sandbox: SandboxConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}
