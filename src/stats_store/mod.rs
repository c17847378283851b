//! StatsStore - persisted snapshots keyed by partition.
//!
//! Snapshots are read models: the recalculator overwrites them in full and
//! the query path reads them back without recomputing.

mod in_memory;

use std::sync::Arc;

use crate::error::StoreError;
use crate::record::Partition;
use crate::snapshot::StatsSnapshot;

pub use in_memory::InMemoryStatsStore;

/// A stored value together with the number of times it has been written.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub data: T,
    pub version: u64,
}

/// Snapshot persistence.
pub trait StatsStore: Send + Sync {
    /// Get the snapshot for a partition. `None` if it was never written.
    fn read(&self, partition: &Partition) -> Result<Option<Versioned<StatsSnapshot>>, StoreError>;

    /// Upsert the full snapshot, replacing whatever was stored.
    fn write(
        &self,
        partition: &Partition,
        snapshot: &StatsSnapshot,
    ) -> Result<Versioned<StatsSnapshot>, StoreError>;

    /// Delete a snapshot. Returns true if it existed.
    fn delete(&self, partition: &Partition) -> Result<bool, StoreError>;

    /// All snapshots in a user's namespace as `(partition key, snapshot)`,
    /// sorted by key.
    fn list(&self, user: &str) -> Result<Vec<(String, Versioned<StatsSnapshot>)>, StoreError>;
}

impl<T: StatsStore + ?Sized> StatsStore for Arc<T> {
    fn read(&self, partition: &Partition) -> Result<Option<Versioned<StatsSnapshot>>, StoreError> {
        (**self).read(partition)
    }

    fn write(
        &self,
        partition: &Partition,
        snapshot: &StatsSnapshot,
    ) -> Result<Versioned<StatsSnapshot>, StoreError> {
        (**self).write(partition, snapshot)
    }

    fn delete(&self, partition: &Partition) -> Result<bool, StoreError> {
        (**self).delete(partition)
    }

    fn list(&self, user: &str) -> Result<Vec<(String, Versioned<StatsSnapshot>)>, StoreError> {
        (**self).list(user)
    }
}
