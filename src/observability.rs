use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("chatline.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("chatline.client.request_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("chatline.client.request_duration_seconds");

pub(crate) static MENTION_LOOKUPS: Counter = Counter::new("chatline.mention.lookups");
pub(crate) static MENTION_LOOKUP_ERRORS: Counter = Counter::new("chatline.mention.lookup_errors");
pub(crate) static MENTION_RESOLVED: Counter = Counter::new("chatline.mention.resolved");
pub(crate) static MENTION_UNRESOLVED: Counter = Counter::new("chatline.mention.unresolved");

pub(crate) static DISPATCH_SENT: Counter = Counter::new("chatline.dispatch.sent");
pub(crate) static DISPATCH_ERRORS: Counter = Counter::new("chatline.dispatch.errors");
pub(crate) static DISPATCH_BYTES: Counter = Counter::new("chatline.dispatch.bytes");

pub(crate) static INBOUND_EVENTS: Counter = Counter::new("chatline.inbound.events");
pub(crate) static INBOUND_POLL_ERRORS: Counter = Counter::new("chatline.inbound.poll_errors");
pub(crate) static NOTIFY_ERRORS: Counter = Counter::new("chatline.inbound.notify_errors");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&MENTION_LOOKUPS);
    collector.register_counter(&MENTION_LOOKUP_ERRORS);
    collector.register_counter(&MENTION_RESOLVED);
    collector.register_counter(&MENTION_UNRESOLVED);

    collector.register_counter(&DISPATCH_SENT);
    collector.register_counter(&DISPATCH_ERRORS);
    collector.register_counter(&DISPATCH_BYTES);

    collector.register_counter(&INBOUND_EVENTS);
    collector.register_counter(&INBOUND_POLL_ERRORS);
    collector.register_counter(&NOTIFY_ERRORS);
}
