//! A running chat client.
//!
//! [`ChatSession`] wires one transport to a background sync loop and a
//! composer, and collects the statistics the front end reports.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::chat::config::ChatConfig;
use crate::client::{ChatTransport, WebChat};
use crate::composer::{Composer, InputField, Submission};
use crate::error::Result;
use crate::render::LogSurface;
use crate::sync::{SyncLoop, SyncStats};
use crate::sync_logger::SyncLogger;

/// Aggregated stats for a chat session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Totals published by the sync loop.
    pub sync: SyncStats,
    /// Messages handed to the composer that started a request.
    pub submitted: u64,
    /// Submit attempts with an empty field.
    pub skipped: u64,
}

/// A chat client whose sync loop runs in the background.
///
/// Dropping the session stops the loop.
pub struct ChatSession<T: ChatTransport + ?Sized + 'static = WebChat> {
    composer: Composer<T>,
    stats: watch::Receiver<SyncStats>,
    sync_task: JoinHandle<()>,
    submitted: u64,
    skipped: u64,
}

impl ChatSession<WebChat> {
    /// Validates `config`, connects an HTTP client and starts polling.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn connect<S: LogSurface + 'static>(config: &ChatConfig, surface: S) -> Result<Self> {
        config.validate()?;
        let client = WebChat::with_options(
            Some(config.base_url.clone()),
            config.username.clone(),
            Some(config.timeout),
        )?;
        log::info!(
            "polling {} every {:?}",
            client.base_url(),
            config.poll_interval
        );
        Ok(Self::start(Arc::new(client), config, surface, None))
    }
}

impl<T: ChatTransport + ?Sized + 'static> ChatSession<T> {
    /// Starts polling `transport` into `surface` using `config`'s interval
    /// and banner.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn start<S: LogSurface + 'static>(
        transport: Arc<T>,
        config: &ChatConfig,
        surface: S,
        logger: Option<Arc<dyn SyncLogger>>,
    ) -> Self {
        let mut sync = SyncLoop::new(Arc::clone(&transport), surface)
            .with_interval(config.poll_interval)
            .with_banner(config.banner.clone());
        let mut composer = Composer::new(transport);
        if let Some(logger) = logger {
            sync = sync.with_logger(Arc::clone(&logger));
            composer = composer.with_logger(logger);
        }
        let stats = sync.subscribe();
        let sync_task = tokio::spawn(sync.run());
        Self {
            composer,
            stats,
            sync_task,
            submitted: 0,
            skipped: 0,
        }
    }

    /// Submit the content of `field`.
    pub fn submit(&mut self, field: &mut InputField) -> Submission {
        let submission = self.composer.submit(field);
        if submission.is_sent() {
            self.submitted += 1;
        } else {
            self.skipped += 1;
        }
        submission
    }

    /// Submit one line of text.
    pub fn send(&mut self, text: impl Into<String>) -> Submission {
        let mut field = InputField::with_value(text);
        self.submit(&mut field)
    }

    /// The latest statistics.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            sync: self.stats.borrow().clone(),
            submitted: self.submitted,
            skipped: self.skipped,
        }
    }

    /// Wait until the sync loop has completed another tick.
    pub async fn next_tick(&mut self) -> SyncStats {
        // The sender lives in the loop task, which only ends when aborted.
        let _ = self.stats.changed().await;
        self.stats.borrow_and_update().clone()
    }

    /// Stop polling.
    pub fn shutdown(self) {}
}

impl<T: ChatTransport + ?Sized + 'static> Drop for ChatSession<T> {
    fn drop(&mut self) {
        self.sync_task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    use crate::render::MemoryLog;
    use crate::types::{Message, PostMessageParams};

    /// Echoes every post into its message list.
    #[derive(Default)]
    struct EchoServer {
        lines: Mutex<Vec<Message>>,
    }

    #[async_trait::async_trait]
    impl ChatTransport for EchoServer {
        async fn fetch_messages(&self) -> Result<Vec<Message>> {
            Ok(self.lines.lock().unwrap().clone())
        }

        async fn post_message(&self, params: PostMessageParams) -> Result<()> {
            self.lines
                .lock()
                .unwrap()
                .push(Message::new("me", params.message));
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn sent_message_arrives_on_a_later_tick() {
        let server = Arc::new(EchoServer::default());
        let config = ChatConfig::new().with_poll_interval(Duration::from_millis(100));
        let mut session = ChatSession::start(server, &config, MemoryLog::new(), None);

        assert_eq!(session.next_tick().await.rendered_count, 0);

        let submission = session.send("hello");
        assert!(submission.outcome().await.unwrap().is_ok());
        assert_eq!(session.next_tick().await.rendered_count, 1);

        let empty = session.send("");
        assert!(!empty.is_sent());

        let stats = session.stats();
        assert_eq!(stats.submitted, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.sync.rendered_count, 1);
        assert!(stats.sync.polls >= 2);
    }

    #[tokio::test]
    async fn connect_rejects_invalid_config() {
        let config = ChatConfig::new().with_poll_interval(Duration::ZERO);
        assert!(ChatSession::connect(&config, MemoryLog::new()).is_err());
    }
}
