mod boot;
mod cli;
mod repl;

use std::process::ExitCode;

use colloquy_common::{ColloquyError, ConversationId};
use colloquy_config::{paths, ColloquyConfig};
use colloquy_store::ConversationStore;
use tracing::{error, info, warn};

use cli::Command;

fn main() -> ExitCode {
    let args = cli::parse();

    // Config is read first so its log level can seed the subscriber.
    let loaded = colloquy_config::load_config(args.config.as_deref());
    let level = args.log_level.clone().unwrap_or_else(|| {
        loaded
            .as_ref()
            .map(|c| c.logging.level)
            .unwrap_or_default()
            .as_directive()
            .to_string()
    });
    boot::init_logging(&level);

    info!("Colloquy v{} starting...", env!("CARGO_PKG_VERSION"));
    if let Some(ref path) = args.config {
        info!("Using config override: {}", path.display());
    }
    let config = loaded.unwrap_or_else(|e| {
        warn!("Config load failed, using defaults: {e}");
        ColloquyConfig::default()
    });

    if let Err(e) = paths::ensure_dirs() {
        warn!("Failed to create directories: {e}");
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to start async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    let command = args.command.unwrap_or(Command::Chat);
    match runtime.block_on(run(command, &config)) {
        Ok(()) => {
            info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, config: &ColloquyConfig) -> colloquy_common::Result<()> {
    let store = boot::open_store(config)?;

    match command {
        Command::List => {
            repl::print_conversations(&store.list_all()?);
            Ok(())
        }
        Command::Delete { id } => {
            let id = ConversationId::from(id);
            store.delete(&id)?;
            println!("Deleted {id}.");
            Ok(())
        }
        Command::Chat => {
            let mut engine = boot::build_orchestrator(config, store)?;
            repl::run(&mut engine).await
        }
        Command::Resume { id } => {
            let id = ConversationId::from(id);
            let summary = store
                .list_all()?
                .into_iter()
                .find(|s| s.id == id)
                .ok_or_else(|| ColloquyError::Other(format!("no stored conversation {id}")))?;

            let mut engine = boot::build_orchestrator(config, store)?;
            engine
                .open_conversation(summary.id, summary.title)
                .map_err(|e| ColloquyError::Other(e.to_string()))?;
            repl::run(&mut engine).await
        }
    }
}
