use super::publisher::{Event, PublishError};

/// Pull-based consumer of bus events.
///
/// Delivery is at-least-once: an event that is not acked may be seen again,
/// which is harmless for recomputation.
pub trait Subscriber: Send + Sync {
    /// Wait up to `timeout_ms` for the next event.
    fn poll(&self, timeout_ms: u64) -> Result<Option<Event>, PublishError>;

    fn ack(&self, event_id: &str) -> Result<(), PublishError>;

    /// Reject an event. Implementations may redeliver it.
    fn nack(&self, event_id: &str, reason: &str) -> Result<(), PublishError>;
}
