//! Delivery of record-mutation notifications.
//!
//! ```text
//!  record writer ──publish──▶ Publisher ─┐
//!                                        │  (InMemoryQueue, or an external broker)
//!  RecomputeWorker ◀──poll/ack/nack── Subscriber
//! ```
//!
//! Payloads are bitcode-encoded [`MutationEvent`](crate::MutationEvent)s under
//! the [`RECORD_MUTATED`] event type.

mod in_memory_queue;
mod publisher;
mod subscriber;

pub use in_memory_queue::InMemoryQueue;
pub use publisher::{Event, PublishError, Publisher, RECORD_MUTATED};
pub use subscriber::Subscriber;
