//! Interactive terminal front end.
//!
//! This module provides the pieces the `webchat-chat` binary is built from:
//!
//! - [`ChatArgs`] and [`ChatConfig`]: CLI argument parsing and configuration
//! - [`ChatSession`]: a running client (background sync loop plus composer)
//! - [`parse_command`]: slash command parsing

mod commands;
mod config;
mod session;

pub use crate::render::{LogSurface, MemoryLog, TerminalLog};
pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig};
pub use session::{ChatSession, SessionStats};
