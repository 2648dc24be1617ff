use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("copilot_debug.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter =
    Counter::new("copilot_debug.client.request_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("copilot_debug.client.request_duration_seconds");

pub(crate) static STREAM_BYTES: Counter = Counter::new("copilot_debug.stream.bytes");
pub(crate) static STREAM_RECORDS: Counter = Counter::new("copilot_debug.stream.records");
pub(crate) static STREAM_PAYLOADS: Counter = Counter::new("copilot_debug.stream.payloads");
pub(crate) static STREAM_SKIPPED: Counter = Counter::new("copilot_debug.stream.skipped");
pub(crate) static STREAM_ERRORS: Counter = Counter::new("copilot_debug.stream.errors");
pub(crate) static STREAM_SPECIAL_EVENTS: Counter =
    Counter::new("copilot_debug.stream.special_events");
pub(crate) static STREAM_PROTOCOL_VIOLATIONS: Counter =
    Counter::new("copilot_debug.stream.protocol_violations");
pub(crate) static STREAM_DURATION: Moments =
    Moments::new("copilot_debug.stream.duration_seconds");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&STREAM_BYTES);
    collector.register_counter(&STREAM_RECORDS);
    collector.register_counter(&STREAM_PAYLOADS);
    collector.register_counter(&STREAM_SKIPPED);
    collector.register_counter(&STREAM_ERRORS);
    collector.register_counter(&STREAM_SPECIAL_EVENTS);
    collector.register_counter(&STREAM_PROTOCOL_VIOLATIONS);
    collector.register_moments(&STREAM_DURATION);
}
