// Public modules
pub mod chat;
pub mod client;
pub mod composer;
pub mod error;
pub mod linkify;
pub mod observability;
pub mod render;
pub mod sanitize;
pub mod sync;
pub mod sync_logger;
pub mod types;

// Re-exports
pub use client::{ChatTransport, WebChat};
pub use composer::{Composer, InputField, Submission};
pub use error::{Error, Result};
pub use linkify::{Segment, linkify, linkify_html};
pub use observability::register_biometrics;
pub use render::{
    Fragment, LogSurface, MemoryLog, TerminalLog, construct_message, update_chat_log,
    welcome_message,
};
pub use sanitize::sanitize;
pub use sync::{SyncLoop, SyncState, SyncStats, TickOutcome};
pub use sync_logger::SyncLogger;
pub use types::*;
