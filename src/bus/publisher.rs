//! Bus messages and the publishing side.

use std::error::Error;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::record::MutationEvent;

/// Event type of a committed record mutation.
pub const RECORD_MUTATED: &str = "record.mutated";

/// A message on the bus.
#[derive(Clone, Debug)]
pub struct Event {
    /// Unique identifier, used for ack/nack.
    pub id: String,
    /// Routing type, e.g. [`RECORD_MUTATED`].
    pub event_type: String,
    /// bitcode-encoded payload.
    pub payload: Vec<u8>,
}

impl Event {
    pub fn new(id: impl Into<String>, event_type: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            event_type: event_type.into(),
            payload,
        }
    }

    /// Create an event with a bitcode-serialized payload.
    pub fn encode<T: Serialize>(
        id: impl Into<String>,
        event_type: impl Into<String>,
        payload: &T,
    ) -> Result<Self, PublishError> {
        let bytes = bitcode::serialize(payload)
            .map_err(|e| PublishError::SerializationFailed(e.to_string()))?;
        Ok(Self::new(id, event_type, bytes))
    }

    /// Notification that a record was created, updated or deleted.
    pub fn record_mutated(id: impl Into<String>, mutation: &MutationEvent) -> Result<Self, PublishError> {
        Self::encode(id, RECORD_MUTATED, mutation)
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, PublishError> {
        bitcode::deserialize(&self.payload)
            .map_err(|e| PublishError::SerializationFailed(e.to_string()))
    }
}

#[derive(Debug)]
pub enum PublishError {
    ConnectionFailed(String),
    SerializationFailed(String),
}

impl fmt::Display for PublishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishError::ConnectionFailed(msg) => write!(f, "Connection failed: {}", msg),
            PublishError::SerializationFailed(msg) => write!(f, "Serialization failed: {}", msg),
        }
    }
}

impl Error for PublishError {}

/// Sends events to a bus.
pub trait Publisher: Send + Sync {
    fn publish(&self, event: Event) -> Result<(), PublishError>;

    /// Default implementation publishes one by one.
    fn publish_batch(&self, events: Vec<Event>) -> Result<(), PublishError> {
        for event in events {
            self.publish(event)?;
        }
        Ok(())
    }
}
