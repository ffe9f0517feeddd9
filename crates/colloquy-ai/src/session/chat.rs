//! The tool-calling loop for a SessionHandle.

use colloquy_common::Turn;
use tracing::{debug, warn};

use crate::tools::{self, ToolExecutor};
use crate::{AiError, ModelChannel, TokenUsage};

use super::handle::SessionHandle;

/// How a user turn ended.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopOutcome {
    /// The model answered with text and no further tool calls.
    Final {
        text: String,
        usage: TokenUsage,
        /// Tool rounds executed before the answer.
        rounds: u32,
    },
    /// The model kept asking for tools after `rounds` rounds had run.
    ToolLoopExceeded { rounds: u32, usage: TokenUsage },
}

impl SessionHandle {
    /// Add a user turn and drive the model until it gives a final answer.
    ///
    /// Tool calls are executed in the order the model emitted them and their
    /// results are sent back as one batch. If the channel fails or the round
    /// limit is hit, every turn added by this call is removed again.
    pub async fn chat(
        &mut self,
        channel: &dyn ModelChannel,
        executor: &dyn ToolExecutor,
        user_turn: Turn,
    ) -> Result<LoopOutcome, AiError> {
        let checkpoint = self.turns.len();
        self.turns.push(user_turn);

        let outcome = self.run_loop(channel, executor).await;
        if !matches!(outcome, Ok(LoopOutcome::Final { .. })) {
            debug!(
                dropped = self.turns.len() - checkpoint,
                "rolling back unfinished turn"
            );
            self.turns.truncate(checkpoint);
        }
        outcome
    }

    async fn run_loop(
        &mut self,
        channel: &dyn ModelChannel,
        executor: &dyn ToolExecutor,
    ) -> Result<LoopOutcome, AiError> {
        let mut usage = TokenUsage::default();
        let mut rounds = 0u32;

        loop {
            let reply = channel
                .send_message(self.system_prompt.as_deref(), &self.turns, &self.tools)
                .await?;
            usage.add(&reply.usage);

            if reply.tool_calls.is_empty() {
                if reply.content.is_empty() {
                    return Err(AiError::ParseError(
                        "model reply had neither text nor tool calls".to_string(),
                    ));
                }
                debug!(rounds, tokens = usage.total_tokens(), "model answered");
                self.turns.push(Turn::model(reply.content.clone()));
                return Ok(LoopOutcome::Final {
                    text: reply.content,
                    usage,
                    rounds,
                });
            }

            if rounds >= self.max_tool_rounds {
                warn!(
                    rounds,
                    limit = self.max_tool_rounds,
                    "model still requesting tools, giving up"
                );
                return Ok(LoopOutcome::ToolLoopExceeded { rounds, usage });
            }
            rounds += 1;

            if !reply.content.trim().is_empty() {
                debug!("ignoring text sent alongside tool calls");
            }
            debug!(round = rounds, calls = reply.tool_calls.len(), "running tool calls");

            let mut results = Vec::with_capacity(reply.tool_calls.len());
            for call in &reply.tool_calls {
                results.push(tools::dispatch(executor, call).await);
            }

            self.turns.push(Turn::tool_calls(reply.tool_calls));
            self.turns.push(Turn::tool_results(results));
        }
    }
}
