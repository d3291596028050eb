//! End-to-end sync scenarios against an in-process chat server.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use webchat::{
        ChatTransport, Composer, Error, InputField, MemoryLog, Message, PostMessageParams,
        Result, Segment, SyncLoop, TickOutcome,
    };

    /// Keeps the list the way the server does and posts as "me".
    #[derive(Default)]
    struct FakeServer {
        log: Mutex<Vec<Message>>,
        down: AtomicBool,
    }

    impl FakeServer {
        fn push(&self, sender: &str, text: &str) {
            self.log.lock().unwrap().push(Message::new(sender, text));
        }

        fn truncate(&self, len: usize) {
            self.log.lock().unwrap().truncate(len);
        }

        fn set_down(&self, down: bool) {
            self.down.store(down, Ordering::SeqCst);
        }
    }

    #[async_trait::async_trait]
    impl ChatTransport for FakeServer {
        async fn fetch_messages(&self) -> Result<Vec<Message>> {
            if self.down.load(Ordering::SeqCst) {
                return Err(Error::connection("connection refused", None));
            }
            Ok(self.log.lock().unwrap().clone())
        }

        async fn post_message(&self, params: PostMessageParams) -> Result<()> {
            if self.down.load(Ordering::SeqCst) {
                return Err(Error::connection("connection refused", None));
            }
            self.push("me", &params.message);
            Ok(())
        }
    }

    #[tokio::test]
    async fn messages_appear_once_in_server_order() {
        let server = Arc::new(FakeServer::default());
        let mut sync = SyncLoop::new(Arc::clone(&server), MemoryLog::new());

        assert!(matches!(sync.tick().await, TickOutcome::Unchanged));
        assert_eq!(sync.surface().banner(), Some("Welcome to go-webchat!"));
        assert!(sync.surface().fragments().is_empty());

        server.push("A", "hi");
        sync.tick().await;
        assert_eq!(sync.surface().lines(), vec!["A: hi"]);
        assert_eq!(sync.state().rendered_count(), 1);

        server.push("B", "see http://x.co");
        let outcome = sync.tick().await;
        assert!(matches!(outcome, TickOutcome::Rendered { from: 1, to: 2 }));
        assert_eq!(sync.state().rendered_count(), 2);

        let fragments = sync.surface().fragments();
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[1].links().collect::<Vec<_>>(), vec!["http://x.co"]);
        assert_eq!(
            fragments[1].body(),
            [
                Segment::Text("see ".to_string()),
                Segment::Link("http://x.co".to_string())
            ]
        );

        // Nothing new: nothing appended, no extra scroll.
        let scrolls = sync.surface().scroll_count();
        assert!(matches!(sync.tick().await, TickOutcome::Unchanged));
        assert_eq!(sync.surface().fragments().len(), 2);
        assert_eq!(sync.surface().scroll_count(), scrolls);
    }

    #[tokio::test]
    async fn hostile_markup_never_reaches_the_log() {
        let server = Arc::new(FakeServer::default());
        server.push("<b>eve</b>", "<script>alert(1)</script><i>hello</i>");
        let mut sync = SyncLoop::new(Arc::clone(&server), MemoryLog::new()).without_banner();

        sync.tick().await;
        let html = sync.surface().to_html();
        assert_eq!(
            html,
            "<div id=\"message_display\">&lt;b&gt;eve&lt;/b&gt;: hello</div>"
        );
    }

    #[tokio::test]
    async fn sent_messages_come_back_through_the_poll() {
        let server = Arc::new(FakeServer::default());
        let composer = Composer::new(Arc::clone(&server));
        let mut sync = SyncLoop::new(Arc::clone(&server), MemoryLog::new());
        sync.tick().await;

        let mut field = InputField::with_value("hello there");
        let submission = composer.submit(&mut field);
        assert_eq!(field.value(), "");
        // Not shown locally before the server has it.
        assert!(sync.surface().fragments().is_empty());

        assert!(submission.outcome().await.unwrap().is_ok());
        sync.tick().await;
        assert_eq!(sync.surface().lines(), vec!["me: hello there"]);

        let mut empty = InputField::new();
        assert!(!composer.submit(&mut empty).is_sent());
        sync.tick().await;
        assert_eq!(sync.surface().fragments().len(), 1);
    }

    #[tokio::test]
    async fn outage_skips_ticks_without_losing_place() {
        let server = Arc::new(FakeServer::default());
        server.push("A", "one");
        let mut sync = SyncLoop::new(Arc::clone(&server), MemoryLog::new());
        let mut stats = sync.subscribe();
        sync.tick().await;

        server.set_down(true);
        assert!(sync.tick().await.is_failed());
        assert!(sync.tick().await.is_failed());
        assert_eq!(sync.state().rendered_count(), 1);

        let published = stats.borrow_and_update().clone();
        assert_eq!(published.polls, 3);
        assert_eq!(published.failures, 2);
        assert!(published.last_error.is_some());

        server.set_down(false);
        server.push("B", "two");
        sync.tick().await;
        assert_eq!(sync.surface().lines(), vec!["A: one", "B: two"]);
    }

    #[tokio::test]
    async fn cut_history_is_shown_again() {
        let server = Arc::new(FakeServer::default());
        server.push("A", "one");
        server.push("B", "two");
        server.push("C", "three");
        let mut sync = SyncLoop::new(Arc::clone(&server), MemoryLog::new());
        sync.tick().await;

        server.truncate(1);
        assert!(matches!(
            sync.tick().await,
            TickOutcome::Resynced { count: 1 }
        ));
        assert_eq!(sync.surface().lines(), vec!["A: one"]);
        assert_eq!(sync.surface().reset_count(), 1);
        assert_eq!(sync.surface().banner(), Some("Welcome to go-webchat!"));

        server.push("D", "four");
        sync.tick().await;
        assert_eq!(sync.surface().lines(), vec!["A: one", "D: four"]);
    }
}
