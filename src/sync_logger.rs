//! Logging trait for sync loop and composer activity.
//!
//! This module provides the [`SyncLogger`] trait that lets callers observe
//! everything the client does, including the failures it otherwise keeps
//! from the user.

use crate::Message;
use crate::error::Result;
use crate::sync::TickOutcome;

/// A trait for logging client activity.
///
/// Attach an implementation with [`crate::SyncLoop::with_logger`] or
/// [`crate::Composer::with_logger`].
///
/// # Example
///
/// ```rust,ignore
/// use webchat::{Message, SyncLogger, TickOutcome};
///
/// struct StderrLogger;
///
/// impl SyncLogger for StderrLogger {
///     fn log_snapshot(&self, messages: &[Message]) {
///         eprintln!("snapshot of {} messages", messages.len());
///     }
///
///     fn log_tick(&self, outcome: &TickOutcome) {
///         eprintln!("tick: {outcome:?}");
///     }
///
///     fn log_submit(&self, text: &str, result: &webchat::Result<()>) {
///         eprintln!("submit {text:?}: {:?}", result.is_ok());
///     }
/// }
/// ```
pub trait SyncLogger: Send + Sync {
    /// Log a successfully parsed server snapshot.
    ///
    /// Called once per poll that returned a message list, before it is
    /// compared against what is already rendered.
    fn log_snapshot(&self, messages: &[Message]);

    /// Log the outcome of a poll tick, including failed ones.
    fn log_tick(&self, outcome: &TickOutcome);

    /// Log the result of a submitted message.
    ///
    /// Called when the background write request completes. The input field
    /// has long been cleared by then.
    fn log_submit(&self, text: &str, result: &Result<()>);
}
