//! The interactive chat loop.

use std::io::Write;
use std::path::Path;

use colloquy_ai::{EngineError, Orchestrator};
use colloquy_common::{Attachment, ColloquyError};
use colloquy_store::ConversationSummary;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

/// One line of user input, classified.
#[derive(Debug, PartialEq, Eq)]
pub enum Input<'a> {
    Empty,
    Exit,
    List,
    /// `/attach <path>`; the path may be empty.
    Attach(&'a str),
    Message(&'a str),
}

pub fn parse_input(line: &str) -> Input<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    if ["exit", "quit", "sair"]
        .iter()
        .any(|word| line.eq_ignore_ascii_case(word))
    {
        return Input::Exit;
    }
    if line == "/list" {
        return Input::List;
    }
    if let Some(rest) = line.strip_prefix("/attach") {
        if rest.is_empty() || rest.starts_with(char::is_whitespace) {
            return Input::Attach(rest.trim());
        }
    }
    Input::Message(line)
}

/// Media type guessed from a file extension.
pub fn media_type_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

pub fn print_conversations(conversations: &[ConversationSummary]) {
    if conversations.is_empty() {
        println!("No saved conversations.");
        return;
    }
    for c in conversations {
        println!(
            "{}  {}  {}",
            c.id,
            c.updated_at.format("%Y-%m-%d %H:%M"),
            c.title
        );
    }
}

fn print_banner(engine: &Orchestrator) {
    let ctx = engine.context();
    println!("Colloquy v{}", env!("CARGO_PKG_VERSION"));
    println!("Conversation {} ({})", ctx.conversation_id(), ctx.title());
    if ctx.handle().turn_count() > 0 {
        println!("Resumed with {} earlier messages.", ctx.handle().turn_count());
    }
    println!("Commands: /attach <path>, /list, exit\n");
}

/// Read lines from stdin until the user leaves or the model channel fails.
pub async fn run(engine: &mut Orchestrator) -> Result<(), ColloquyError> {
    print_banner(engine);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("you> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_input(&line) {
            Input::Empty => {}
            Input::Exit => break,
            Input::List => match engine.conversations() {
                Ok(list) => print_conversations(&list),
                Err(e) => eprintln!("error: {e}"),
            },
            Input::Attach("") => eprintln!("usage: /attach <path>"),
            Input::Attach(path) => match tokio::fs::read(path).await {
                Ok(data) => {
                    let media_type = media_type_for(Path::new(path));
                    println!("Attached {path} ({media_type}, {} bytes).", data.len());
                    engine.attach(Attachment::new(media_type, data));
                }
                Err(e) => eprintln!("could not read {path}: {e}"),
            },
            Input::Message(text) => match engine.handle_user_turn(text).await {
                Ok(reply) => println!("\nassistant> {}\n", reply.text),
                Err(EngineError::Store(e)) => {
                    // The turn itself succeeded; show it before reporting.
                    let last = engine.context().handle().turns().last();
                    if let Some(text) = last.and_then(|t| t.as_text()) {
                        println!("\nassistant> {text}\n");
                    }
                    warn!("conversation not saved: {e}");
                    eprintln!("warning: conversation not saved: {e}");
                }
                Err(e @ EngineError::ToolLoopExceeded { .. }) => eprintln!("error: {e}"),
                Err(e @ EngineError::Channel(_)) => return Err(ColloquyError::Ai(e.to_string())),
            },
        }
    }

    println!("Goodbye.");
    Ok(())
}
