//! Outgoing message submission.
//!
//! The composer never touches the local log. A sent message shows up once a
//! later poll sees it in the server's list.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::client::ChatTransport;
use crate::error::{Error, Result};
use crate::observability::{COMPOSER_EMPTY_SUBMITS, COMPOSER_SUBMIT_ERRORS, COMPOSER_SUBMITS};
use crate::sync_logger::SyncLogger;
use crate::types::PostMessageParams;

/// A single-line text input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputField {
    value: String,
}

impl InputField {
    /// Creates an empty field.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a field holding `value`.
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// The current content.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replaces the content.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Returns true if the field holds the empty string.
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Empties the field.
    pub fn clear(&mut self) {
        self.value.clear();
    }

    /// Empties the field, returning what it held.
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.value)
    }
}

/// Result of [`Composer::submit`].
#[derive(Debug)]
pub enum Submission {
    /// The field was empty. No request was made and the field is unchanged.
    NotSubmitted,
    /// A write request was started. The handle resolves when it finishes;
    /// nothing needs to wait for it.
    Sent(JoinHandle<Result<()>>),
}

impl Submission {
    /// Returns true if a request was started.
    pub fn is_sent(&self) -> bool {
        matches!(self, Submission::Sent(_))
    }

    /// Wait for the request, if one was started.
    pub async fn outcome(self) -> Option<Result<()>> {
        match self {
            Submission::NotSubmitted => None,
            Submission::Sent(handle) => Some(match handle.await {
                Ok(result) => result,
                Err(e) => Err(Error::unknown(format!("submit task failed: {e}"))),
            }),
        }
    }
}

/// Submits user input to the server.
pub struct Composer<T: ChatTransport + ?Sized> {
    transport: Arc<T>,
    logger: Option<Arc<dyn SyncLogger>>,
}

impl<T: ChatTransport + ?Sized + 'static> Composer<T> {
    /// Creates a composer posting through `transport`.
    pub fn new(transport: Arc<T>) -> Self {
        Self {
            transport,
            logger: None,
        }
    }

    /// Attaches a logger.
    pub fn with_logger(mut self, logger: Arc<dyn SyncLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Submit the field's content.
    ///
    /// An empty field is left alone. Otherwise the field is cleared at once
    /// and the write request runs in the background; its failure is logged
    /// and otherwise ignored.
    ///
    /// # Panics
    ///
    /// Panics if the field is non-empty and this is called outside a Tokio
    /// runtime.
    pub fn submit(&self, field: &mut InputField) -> Submission {
        if field.is_empty() {
            COMPOSER_EMPTY_SUBMITS.click();
            return Submission::NotSubmitted;
        }
        let text = field.take();
        COMPOSER_SUBMITS.click();

        let transport = Arc::clone(&self.transport);
        let logger = self.logger.clone();
        let handle = tokio::spawn(async move {
            let result = transport
                .post_message(PostMessageParams::new(text.clone()))
                .await;
            if let Err(err) = &result {
                COMPOSER_SUBMIT_ERRORS.click();
                log::debug!("submit dropped: {err}");
            }
            if let Some(logger) = &logger {
                logger.log_submit(&text, &result);
            }
            result
        });
        Submission::Sent(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use tokio::sync::Semaphore;
    use tokio_test::{assert_err, assert_ok};

    use crate::types::Message;

    /// Records posts, optionally holding each one until released.
    struct RecordingServer {
        posts: Mutex<Vec<PostMessageParams>>,
        gate: Semaphore,
        fail: bool,
    }

    impl RecordingServer {
        fn new(fail: bool, open: bool) -> Arc<Self> {
            Arc::new(Self {
                posts: Mutex::new(Vec::new()),
                gate: Semaphore::new(if open { Semaphore::MAX_PERMITS } else { 0 }),
                fail,
            })
        }

        fn posts(&self) -> Vec<PostMessageParams> {
            self.posts.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl ChatTransport for RecordingServer {
        async fn fetch_messages(&self) -> Result<Vec<Message>> {
            Ok(Vec::new())
        }

        async fn post_message(&self, params: PostMessageParams) -> Result<()> {
            self.posts.lock().unwrap().push(params);
            let _permit = self
                .gate
                .acquire()
                .await
                .map_err(|e| Error::unknown(e.to_string()))?;
            if self.fail {
                Err(Error::connection("server went away", None))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn empty_submit_is_a_no_op() {
        let server = RecordingServer::new(false, true);
        let composer = Composer::new(Arc::clone(&server));
        let mut field = InputField::new();

        let submission = composer.submit(&mut field);
        assert!(!submission.is_sent());
        assert!(submission.outcome().await.is_none());
        assert!(server.posts().is_empty());
        assert_eq!(field.value(), "");
    }

    #[tokio::test]
    async fn submit_clears_before_the_request_finishes() {
        let server = RecordingServer::new(false, false);
        let composer = Composer::new(Arc::clone(&server));
        let mut field = InputField::with_value("hello");

        let submission = composer.submit(&mut field);
        assert!(submission.is_sent());
        assert_eq!(field.value(), "");

        server.gate.add_permits(1);
        assert_ok!(submission.outcome().await.unwrap());
        assert_eq!(server.posts(), vec![PostMessageParams::new("hello")]);
    }

    #[tokio::test]
    async fn failed_submit_still_clears() {
        let server = RecordingServer::new(true, true);
        let composer = Composer::new(Arc::clone(&server));
        let mut field = InputField::with_value("lost");

        let submission = composer.submit(&mut field);
        assert_eq!(field.value(), "");
        assert_err!(submission.outcome().await.unwrap());
        assert_eq!(server.posts().len(), 1);
    }

    #[test]
    fn empty_submit_needs_no_runtime() {
        let server = RecordingServer::new(false, true);
        let composer = Composer::new(Arc::clone(&server));
        assert!(!composer.submit(&mut InputField::new()).is_sent());
    }

    #[test]
    #[should_panic]
    fn submit_outside_a_runtime_panics() {
        let server = RecordingServer::new(false, true);
        let composer = Composer::new(server);
        composer.submit(&mut InputField::with_value("hello"));
    }

    #[tokio::test]
    async fn whitespace_is_not_empty() {
        let server = RecordingServer::new(false, true);
        let composer = Composer::new(Arc::clone(&server));
        let mut field = InputField::with_value("  ");

        assert_ok!(composer.submit(&mut field).outcome().await.unwrap());
        assert_eq!(server.posts(), vec![PostMessageParams::new("  ")]);
    }
}
