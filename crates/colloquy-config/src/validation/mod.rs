//! Full configuration validation.
//!
//! Every range violation is collected into a single `ConfigError`.

mod helpers;


use colloquy_common::ConfigError;

use crate::schema::ColloquyConfig;
use helpers::{validate_range, validate_range_f64};

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &ColloquyConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_model(&mut errors, config);
    validate_agent(&mut errors, config);
    validate_sandbox(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_model(errors: &mut Vec<String>, config: &ColloquyConfig) {
    if config.model.model.trim().is_empty() {
        errors.push("model.model must not be empty".to_string());
    }
    validate_range(errors, "model.max_tokens", config.model.max_tokens, 1, 65536);
    validate_range_f64(errors, "model.temperature", config.model.temperature, 0.0, 2.0);
    validate_range(
        errors,
        "model.request_timeout_secs",
        config.model.request_timeout_secs,
        5,
        600,
    );
}

fn validate_agent(errors: &mut Vec<String>, config: &ColloquyConfig) {
    validate_range(
        errors,
        "agent.max_tool_rounds",
        config.agent.max_tool_rounds,
        1,
        100,
    );
    validate_range(
        errors,
        "agent.title_max_chars",
        config.agent.title_max_chars,
        10,
        200,
    );
}

fn validate_sandbox(errors: &mut Vec<String>, config: &ColloquyConfig) {
    // The interpreter allowlist is enforced when the sandbox is built.
    if config.sandbox.interpreter.trim().is_empty() {
        errors.push("sandbox.interpreter must not be empty".to_string());
    }
    validate_range(
        errors,
        "sandbox.timeout_secs",
        config.sandbox.timeout_secs,
        1,
        300,
    );
    validate_range(
        errors,
        "sandbox.max_output_bytes",
        config.sandbox.max_output_bytes,
        1024,
        1024 * 1024,
    );
}
