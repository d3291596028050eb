//! Interactive terminal client for a webchat server.
//!
//! Polls the server's message list once a second, prints new lines as they
//! appear, and posts whatever you type.
//!
//! # Usage
//!
//! ```bash
//! # Local server on port 80
//! webchat-chat
//!
//! # Another server, posting under a name
//! webchat-chat --url http://chat.example:8080/ --name alice
//!
//! # Disable colors (useful for piping output)
//! webchat-chat --no-color
//!
//! # See the failures the client keeps quiet about
//! RUST_LOG=webchat=debug webchat-chat
//! ```
//!
//! # Commands
//!
//! - `/help` - Show available commands
//! - `/stats` - Show sync and submission statistics
//! - `/quit` - Exit the application

use std::sync::mpsc as std_mpsc;
use std::thread;

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;

use webchat::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatSession, SessionStats, TerminalLog, help_text,
    parse_command,
};

/// What the input thread reports.
enum InputEvent {
    Line(String),
    Eof,
    Terminated,
    Failed(String),
}

/// Main entry point for the webchat-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let (args, _) = ChatArgs::from_command_line_relaxed("webchat-chat [OPTIONS]");
    let config = ChatConfig::from(args);

    println!("webchat (server: {})", config.base_url);
    println!("Type /help for commands, /quit to exit\n");

    let surface = TerminalLog::with_color(config.use_color);
    let mut session = ChatSession::connect(&config, surface)?;

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    // SIGINT outside the prompt, or SIGTERM.
    let signal_tx = event_tx.clone();
    ctrlc::set_handler(move || {
        let _ = signal_tx.send(InputEvent::Terminated);
    })?;

    // The reader waits for a resume before prompting again, so it is never
    // mid-readline when the main loop exits.
    let (resume_tx, resume_rx) = std_mpsc::channel::<()>();
    thread::spawn(move || read_input(event_tx, resume_rx));

    while let Some(event) = event_rx.recv().await {
        match event {
            InputEvent::Line(line) => {
                if let Some(cmd) = parse_command(&line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::Stats => print_stats(&session.stats()),
                        ChatCommand::Invalid(message) => eprintln!("{message}"),
                    }
                } else {
                    // Fire and forget; the line shows up when the server echoes it.
                    let _ = session.send(line);
                }
                if resume_tx.send(()).is_err() {
                    break;
                }
            }
            InputEvent::Eof | InputEvent::Terminated => {
                println!("\nGoodbye!");
                break;
            }
            InputEvent::Failed(err) => {
                eprintln!("Input error: {}", err);
                break;
            }
        }
    }

    session.shutdown();
    Ok(())
}

fn read_input(events: mpsc::UnboundedSender<InputEvent>, resume: std_mpsc::Receiver<()>) {
    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(err) => {
            let _ = events.send(InputEvent::Failed(err.to_string()));
            return;
        }
    };
    loop {
        match rl.readline("> ") {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = rl.add_history_entry(line.as_str());
                }
                if events.send(InputEvent::Line(line)).is_err() || resume.recv().is_err() {
                    return;
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at the prompt discards the line.
                continue;
            }
            Err(ReadlineError::Eof) => {
                let _ = events.send(InputEvent::Eof);
                return;
            }
            Err(err) => {
                let _ = events.send(InputEvent::Failed(err.to_string()));
                return;
            }
        }
    }
}

fn print_stats(stats: &SessionStats) {
    println!("    Session Statistics:");
    println!("      Rendered messages: {}", stats.sync.rendered_count);
    println!("      Polls: {}", stats.sync.polls);
    println!("      Failed polls: {}", stats.sync.failures);
    println!("      Resyncs: {}", stats.sync.resyncs);
    match stats.sync.last_error.as_deref() {
        Some(err) => println!("      Last failure: {}", err),
        None => println!("      Last failure: (none)"),
    }
    println!("      Messages sent: {}", stats.submitted);
    println!("      Empty submits: {}", stats.skipped);
}
