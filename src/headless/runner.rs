//! Headless mode runner - watch loop without a terminal UI
//!
//! Opens a list session on the record directory, keeps it fresh through the
//! watcher and prints every engine event as NDJSON until `quit` or Ctrl+C.

use std::path::Path;

use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};

use blockscope_app::config::Settings;
use blockscope_app::{Engine, EngineEvent, ListCommand, Message};
use blockscope_core::prelude::*;
use blockscope_core::SortKey;

use super::HeadlessEvent;

/// Run in headless mode - output JSON events instead of a list view
pub async fn run_headless(settings: Settings, record_dir: &Path) -> Result<()> {
    info!("═══════════════════════════════════════════════════════");
    info!("blockscope starting in HEADLESS mode");
    info!("Records: {}", record_dir.display());
    info!("═══════════════════════════════════════════════════════");

    let mut engine = Engine::new(settings, record_dir);
    let mut events = engine.subscribe();
    engine.start_watcher();

    let stdin_tx = engine.msg_sender();
    std::thread::spawn(move || {
        spawn_stdin_reader_blocking(stdin_tx);
    });

    let signal_tx = engine.msg_sender();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl+C received");
            let _ = signal_tx.send(Message::Quit).await;
        }
    });

    engine.process_message(Message::OpenSession);
    emit_events(&mut events);

    let result = headless_event_loop(&mut engine, &mut events).await;

    engine.shutdown().await;
    emit_events(&mut events);

    info!("blockscope headless mode exiting");
    result
}

async fn headless_event_loop(
    engine: &mut Engine,
    events: &mut broadcast::Receiver<EngineEvent>,
) -> Result<()> {
    loop {
        if engine.should_quit() {
            info!("Quit requested");
            break;
        }

        if !engine.process_next().await {
            info!("Message channel closed");
            break;
        }

        emit_events(events);
    }

    Ok(())
}

/// Print every event broadcast since the last call.
fn emit_events(events: &mut broadcast::Receiver<EngineEvent>) {
    loop {
        match events.try_recv() {
            Ok(event) => HeadlessEvent::from(event).emit(),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                HeadlessEvent::error(format!("dropped {} event(s)", skipped)).emit();
            }
            Err(_) => break,
        }
    }
}

/// Map one stdin line to a message.
///
/// Commands: `refresh`, `sort [cost|recency]`, `remove <start-time>`,
/// `share <start-time>`, `share-dump <start-time>`, `clear`, `quit`.
pub fn parse_command(line: &str) -> Option<Message> {
    let line = line.trim();
    let (verb, arg) = match line.split_once(char::is_whitespace) {
        Some((verb, arg)) => (verb, arg.trim()),
        None => (line, ""),
    };

    match (verb, arg) {
        ("r" | "refresh", "") => Some(Message::Load),
        ("s" | "sort", "") => Some(Message::Command(ListCommand::Sort)),
        ("s" | "sort", key) => key.parse::<SortKey>().ok().map(Message::SetSort),
        ("rm" | "remove", start_time) if !start_time.is_empty() => Some(Message::Remove {
            start_time: start_time.to_string(),
        }),
        ("share", start_time) if !start_time.is_empty() => {
            Some(Message::Command(ListCommand::Share {
                start_time: start_time.to_string(),
            }))
        }
        ("share-dump", start_time) if !start_time.is_empty() => {
            Some(Message::Command(ListCommand::ShareStackDump {
                start_time: start_time.to_string(),
            }))
        }
        ("clear", "") => Some(Message::Command(ListCommand::DeleteAll)),
        ("q" | "quit", "") => Some(Message::Quit),
        _ => None,
    }
}

/// Read commands from stdin and forward them (blocking version)
fn spawn_stdin_reader_blocking(msg_tx: mpsc::Sender<Message>) {
    use std::io::BufRead;

    let stdin = std::io::stdin();
    let reader = stdin.lock();

    for line in reader.lines() {
        match line {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                match parse_command(&line) {
                    Some(msg) => {
                        let quit = matches!(msg, Message::Quit);
                        if msg_tx.blocking_send(msg).is_err() || quit {
                            break;
                        }
                    }
                    None => warn!("Unknown stdin command: {}", line.trim()),
                }
            }
            Err(e) => {
                error!("Failed to read stdin: {}", e);
                break;
            }
        }
    }

    info!("Stdin reader exiting");
}
