// SPDX-FileCopyrightText: 2026 Triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `triage chat` command implementation.
//!
//! Launches an interactive REPL with colored prompt and readline history.
//! Every line is sent through [`ChatService`], so each reply is routed to the
//! persona matching the message and the conversation accumulates in memory.

use std::sync::Arc;

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::info;
use triage_agent::{persona_name, ChatService, InMemoryConversationStore};
use triage_config::TriageConfig;
use triage_core::{ConversationId, Role, TriageError, Turn};

use crate::commands::{build_orchestrator, reply_header};

/// REPL commands other than plain messages.
#[derive(Debug, PartialEq, Eq)]
enum ShellCommand<'a> {
    Quit,
    /// Start a fresh conversation.
    New,
    /// List conversations held by this session.
    List,
    /// Switch to an existing conversation and replay its turns.
    Open(&'a str),
    Help,
    Message(&'a str),
    Empty,
}

fn parse_line(line: &str) -> ShellCommand<'_> {
    match line.trim() {
        "" => ShellCommand::Empty,
        "/quit" | "/exit" => ShellCommand::Quit,
        "/new" => ShellCommand::New,
        "/list" => ShellCommand::List,
        "/help" => ShellCommand::Help,
        text => match text.strip_prefix("/open") {
            Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => {
                ShellCommand::Open(rest.trim())
            }
            _ => ShellCommand::Message(text),
        },
    }
}

/// One printable line per turn, labelled by author.
fn format_turns(turns: &[Turn]) -> Vec<String> {
    turns
        .iter()
        .map(|turn| match (turn.role, turn.intent) {
            (Role::User, _) => format!("you: {}", turn.content),
            (Role::Assistant, Some(intent)) => {
                format!("{} ({}): {}", intent, persona_name(intent), turn.content)
            }
            (Role::Assistant, None) => format!("assistant: {}", turn.content),
            (Role::System, _) => format!("system: {}", turn.content),
        })
        .collect()
}

/// Runs the `triage chat` interactive REPL.
pub async fn run_shell(config: TriageConfig) -> Result<(), TriageError> {
    let orchestrator = Arc::new(build_orchestrator(&config).await?);
    let store = Arc::new(InMemoryConversationStore::new());
    let service = ChatService::new(orchestrator, store);

    let mut rl = DefaultEditor::new()
        .map_err(|e| TriageError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", format!("{} chat", config.agent.name).bold().green());
    println!("Type {} for commands, {} to exit.\n", "/help".yellow(), "/quit".yellow());

    let prompt = format!("{}> ", config.agent.name.green());
    let mut conversation: Option<ConversationId> = None;

    loop {
        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        };

        match parse_line(&line) {
            ShellCommand::Empty => continue,
            ShellCommand::Quit => break,
            ShellCommand::Help => {
                println!("  /new        start a new conversation");
                println!("  /list       list conversations");
                println!("  /open <id>  reopen a conversation and show its turns");
                println!("  /quit       exit");
            }
            ShellCommand::New => {
                conversation = None;
                println!("{}", "started a new conversation".dimmed());
            }
            ShellCommand::List => match service.store().list_conversations().await {
                Ok(conversations) => {
                    for c in conversations {
                        let marker = if conversation.as_ref() == Some(&c.id) { "*" } else { " " };
                        println!(
                            "{marker} {}  {} ({} turns)",
                            c.id,
                            c.title.as_deref().unwrap_or("untitled"),
                            c.turn_count
                        );
                    }
                }
                Err(e) => eprintln!("{}: {e}", "error".red()),
            },
            ShellCommand::Open("") => println!("usage: /open <id>"),
            ShellCommand::Open(raw) => {
                let id = ConversationId(raw.to_string());
                match open_conversation(&service, &id).await {
                    Ok(lines) => {
                        for line in lines {
                            println!("{line}");
                        }
                        println!();
                        conversation = Some(id);
                    }
                    Err(e) => eprintln!("{}: {e}", "error".red()),
                }
            }
            ShellCommand::Message(text) => {
                let _ = rl.add_history_entry(text);
                let id = conversation.as_ref().map(|id| id.0.as_str());
                match service.send(id, text).await {
                    Ok(response) => {
                        println!("{}", reply_header(&response.reply).dimmed());
                        println!("{}\n", response.reply.text);
                        conversation = Some(response.conversation_id);
                    }
                    Err(e) => eprintln!("{}: {e}", "error".red()),
                }
            }
        }
    }

    let count = service.store().list_conversations().await?.len();
    info!(conversations = count, "chat session ended");
    Ok(())
}

/// Turns of an existing conversation, formatted for display.
async fn open_conversation(
    service: &ChatService,
    id: &ConversationId,
) -> Result<Vec<String>, TriageError> {
    if service.store().get_conversation(id).await?.is_none() {
        return Err(TriageError::ConversationNotFound(id.to_string()));
    }
    let turns = service.store().turns(id).await?;
    Ok(format_turns(&turns))
}
