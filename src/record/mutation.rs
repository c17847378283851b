//! Mutation events delivered after a record change is committed.

use serde::{Deserialize, Serialize};

use super::{Partition, PartitionError};

/// Partition fields of a record as seen by the event source. Either may be
/// absent when the upstream document is malformed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionFields {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
}

impl PartitionFields {
    pub fn new(category: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            tag: Some(tag.into()),
        }
    }
}

/// A committed create, update or delete of one record.
///
/// Create carries only `after`, delete only `before`, update both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationEvent {
    pub user: String,
    #[serde(default)]
    pub before: Option<PartitionFields>,
    #[serde(default)]
    pub after: Option<PartitionFields>,
}

impl MutationEvent {
    pub fn created(user: impl Into<String>, after: PartitionFields) -> Self {
        Self {
            user: user.into(),
            before: None,
            after: Some(after),
        }
    }

    pub fn updated(user: impl Into<String>, before: PartitionFields, after: PartitionFields) -> Self {
        Self {
            user: user.into(),
            before: Some(before),
            after: Some(after),
        }
    }

    pub fn deleted(user: impl Into<String>, before: PartitionFields) -> Self {
        Self {
            user: user.into(),
            before: Some(before),
            after: None,
        }
    }

    /// Distinct partitions whose statistics this mutation invalidates.
    ///
    /// An update that moves a record to another category or tag touches both
    /// the old and the new partition. Sides with missing fields are dropped.
    pub fn partitions(&self) -> Vec<Partition> {
        let mut partitions: Vec<Partition> = Vec::with_capacity(2);
        for fields in [&self.after, &self.before].into_iter().flatten() {
            match self.resolve(fields) {
                Ok(partition) => {
                    if !partitions.contains(&partition) {
                        partitions.push(partition);
                    }
                }
                Err(e) => log::debug!("ignoring mutation side for user {}: {}", self.user, e),
            }
        }
        partitions
    }

    fn resolve(&self, fields: &PartitionFields) -> Result<Partition, PartitionError> {
        Partition::from_parts(
            Some(self.user.as_str()),
            fields.category.as_deref(),
            fields.tag.as_deref(),
        )
    }
}
