//! Tool Executor: turns a code snippet into result text for the model.

use async_trait::async_trait;
use tracing::debug;

use super::sandbox::ExecutionSandbox;

/// Runs a single code snippet. Never fails: errors come back as text.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute(&self, code: &str) -> String;
}

/// Executes code in an `ExecutionSandbox`.
#[derive(Debug)]
pub struct CodeExecutor {
    sandbox: ExecutionSandbox,
}

impl CodeExecutor {
    pub fn new(sandbox: ExecutionSandbox) -> Self {
        Self { sandbox }
    }

    pub fn sandbox(&self) -> &ExecutionSandbox {
        &self.sandbox
    }
}

#[async_trait]
impl ToolExecutor for CodeExecutor {
    async fn execute(&self, code: &str) -> String {
        let outcome = self.sandbox.run(code).await;
        debug!(outcome = outcome.kind(), "code execution finished");
        outcome.into_result_text()
    }
}
