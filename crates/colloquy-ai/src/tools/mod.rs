//! The tool the model may call, and how calls are dispatched.
//!
//! Only `execute_code` exists. Every call, including an unknown tool name
//! or malformed arguments, produces a `ToolCallResult` whose text goes back
//! to the model; nothing here fails.

mod executor;
mod sandbox;

pub use executor::{CodeExecutor, ToolExecutor};
pub use sandbox::{ExecutionOutcome, ExecutionSandbox, ALLOWED_INTERPRETERS};

use colloquy_common::{ToolCallRequest, ToolCallResult};
use tracing::{debug, warn};

use crate::ToolDefinition;

pub const EXECUTE_CODE: &str = "execute_code";

/// Tool declarations exposed to the model.
pub fn builtin_tools() -> Vec<ToolDefinition> {
    vec![ToolDefinition {
        name: EXECUTE_CODE.to_string(),
        description: "Execute a snippet of code in the configured interpreter and return \
                      what it printed. Only pass source code in that language. Output is \
                      only visible if the code prints it explicitly (e.g. with print())."
            .to_string(),
        parameters: serde_json::json!({
            "type": "object",
            "properties": {
                "code": {
                    "type": "string",
                    "description": "The complete source code to execute"
                }
            },
            "required": ["code"]
        }),
    }]
}

/// Convert a tool definition to the Gemini API format.
pub fn to_gemini_tool(tool: &ToolDefinition) -> serde_json::Value {
    serde_json::json!({
        "name": tool.name,
        "description": tool.description,
        "parameters": tool.parameters,
    })
}

/// Run one requested tool call and wrap its text as a result.
pub async fn dispatch(executor: &dyn ToolExecutor, call: &ToolCallRequest) -> ToolCallResult {
    let output = match call.name.as_str() {
        EXECUTE_CODE => match call.str_arg("code") {
            Some(code) => {
                debug!(tool = EXECUTE_CODE, bytes = code.len(), "Executing tool");
                executor.execute(code).await
            }
            None => {
                warn!(tool = EXECUTE_CODE, "tool call without a string `code` argument");
                format!("Error: {EXECUTE_CODE} requires a string argument `code`.")
            }
        },
        other => {
            warn!(tool = %other, "model requested an unknown tool");
            format!("Unknown tool: {other}. Available tools: {EXECUTE_CODE}")
        }
    };

    ToolCallResult {
        name: call.name.clone(),
        output,
    }
}

#[cfg(test)]
mod tests;
