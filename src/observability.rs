use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("terminallynx.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter =
    Counter::new("terminallynx.client.request_errors");
pub(crate) static CLIENT_REQUEST_RETRIES: Counter = Counter::new("terminallynx.client.retries");
pub(crate) static CLIENT_MALFORMED_REPLIES: Counter =
    Counter::new("terminallynx.client.malformed_replies");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("terminallynx.client.request_duration_seconds");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_counter(&CLIENT_REQUEST_RETRIES);
    collector.register_counter(&CLIENT_MALFORMED_REPLIES);
    collector.register_moments(&CLIENT_REQUEST_DURATION);
}
