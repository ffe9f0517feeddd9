//! Startup: config, logging, storage and the conversation engine.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use colloquy_ai::{
    CodeExecutor, ExecutionSandbox, GeminiClient, GeminiConfig, Orchestrator, SessionManager,
};
use colloquy_common::{ColloquyError, ConfigError};
use colloquy_config::{paths, ColloquyConfig};
use colloquy_store::SqliteStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` wins over `level`.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Where the conversation database lives.
pub fn database_path(config: &ColloquyConfig) -> Result<PathBuf, ConfigError> {
    match &config.storage.database {
        Some(path) => Ok(path.clone()),
        None => paths::database_file(),
    }
}

pub fn open_store(config: &ColloquyConfig) -> Result<Arc<SqliteStore>, ColloquyError> {
    let path = database_path(config)?;
    Ok(Arc::new(SqliteStore::open(path)?))
}

/// Build the sandboxed code executor described by `[sandbox]`.
pub fn build_executor(config: &ColloquyConfig) -> Result<CodeExecutor, ColloquyError> {
    let sandbox = &config.sandbox;
    let sandbox = ExecutionSandbox::new(&sandbox.interpreter, sandbox.interpreter_args.clone())
        .map_err(ColloquyError::Other)?
        .with_timeout(Duration::from_secs(u64::from(sandbox.timeout_secs)))
        .with_max_output_bytes(sandbox.max_output_bytes as usize);
    Ok(CodeExecutor::new(sandbox))
}

/// Wire the Gemini client, executor and store into an orchestrator.
pub fn build_orchestrator(
    config: &ColloquyConfig,
    store: Arc<SqliteStore>,
) -> Result<Orchestrator, ColloquyError> {
    let model = &config.model;
    let gemini = GeminiConfig::from_env()
        .map_err(|e| ColloquyError::Ai(e.to_string()))?
        .with_model(&model.model)
        .with_max_tokens(model.max_tokens)
        .with_temperature(model.temperature)
        .with_request_timeout(Duration::from_secs(u64::from(model.request_timeout_secs)));
    let client = GeminiClient::new(gemini).map_err(|e| ColloquyError::Ai(e.to_string()))?;
    info!(model = %client.model(), "model channel ready");

    let executor = build_executor(config)?;
    info!(
        interpreter = %executor.sandbox().interpreter(),
        timeout = ?executor.sandbox().timeout(),
        "code sandbox ready"
    );

    let agent = &config.agent;
    let sessions = SessionManager::new(store)
        .with_system_prompt(&agent.system_prompt)
        .with_max_tool_rounds(agent.max_tool_rounds);

    Ok(
        Orchestrator::new(Arc::new(client), Arc::new(executor), sessions)
            .with_title_max_chars(agent.title_max_chars as usize),
    )
}
