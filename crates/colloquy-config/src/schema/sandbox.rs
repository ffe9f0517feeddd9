//! Code-execution sandbox configuration.

use serde::{Deserialize, Serialize};

/// How the `execute_code` tool runs model-supplied code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Interpreter binary. Must be on the sandbox allowlist.
    pub interpreter: String,
    /// Arguments placed before the code file path.
    pub interpreter_args: Vec<String>,
    /// Wall-clock limit per execution in seconds (valid range: 1-300).
    pub timeout_secs: u32,
    /// Cap on captured stdout/stderr bytes (valid range: 1024-1048576).
    pub max_output_bytes: u32,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            interpreter: "python3".to_string(),
            interpreter_args: vec!["-I".to_string()],
            timeout_secs: 10,
            max_output_bytes: 16 * 1024,
        }
    }
}
