use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("webchat.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("webchat.client.request_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("webchat.client.request_duration_seconds");

pub(crate) static SYNC_POLLS: Counter = Counter::new("webchat.sync.polls");
pub(crate) static SYNC_POLL_ERRORS: Counter = Counter::new("webchat.sync.poll_errors");
pub(crate) static SYNC_UNCHANGED: Counter = Counter::new("webchat.sync.unchanged");
pub(crate) static SYNC_RENDERED: Counter = Counter::new("webchat.sync.rendered_messages");
pub(crate) static SYNC_RESYNCS: Counter = Counter::new("webchat.sync.resyncs");
pub(crate) static SYNC_TICK_DURATION: Moments =
    Moments::new("webchat.sync.tick_duration_seconds");

pub(crate) static COMPOSER_SUBMITS: Counter = Counter::new("webchat.composer.submits");
pub(crate) static COMPOSER_EMPTY_SUBMITS: Counter =
    Counter::new("webchat.composer.empty_submits");
pub(crate) static COMPOSER_SUBMIT_ERRORS: Counter =
    Counter::new("webchat.composer.submit_errors");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&SYNC_POLLS);
    collector.register_counter(&SYNC_POLL_ERRORS);
    collector.register_counter(&SYNC_UNCHANGED);
    collector.register_counter(&SYNC_RENDERED);
    collector.register_counter(&SYNC_RESYNCS);
    collector.register_moments(&SYNC_TICK_DURATION);

    collector.register_counter(&COMPOSER_SUBMITS);
    collector.register_counter(&COMPOSER_EMPTY_SUBMITS);
    collector.register_counter(&COMPOSER_SUBMIT_ERRORS);
}
