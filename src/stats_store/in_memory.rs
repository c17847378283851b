//! InMemoryStatsStore - HashMap-backed snapshot store for testing and development.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::{StatsStore, Versioned};
use crate::error::StoreError;
use crate::record::Partition;
use crate::snapshot::StatsSnapshot;

struct StoredSnapshot {
    bytes: Vec<u8>,
    version: u64,
}

/// In-memory snapshot store.
///
/// Snapshots live under their owning user, keyed by `category_tag`. They are
/// kept as JSON bytes so a read returns exactly what a serializing backend
/// would. Clone-friendly via Arc.
#[derive(Clone)]
pub struct InMemoryStatsStore {
    storage: Arc<RwLock<HashMap<String, HashMap<String, StoredSnapshot>>>>,
}

impl Default for InMemoryStatsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStatsStore {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of stored snapshots across all users.
    pub fn len(&self) -> usize {
        self.storage
            .read()
            .map(|users| users.values().map(HashMap::len).sum())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StatsStore for InMemoryStatsStore {
    fn read(&self, partition: &Partition) -> Result<Option<Versioned<StatsSnapshot>>, StoreError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| StoreError::LockPoisoned("read snapshot"))?;

        let stored = storage
            .get(&partition.user)
            .and_then(|partitions| partitions.get(&partition.key()));
        match stored {
            Some(stored) => {
                let data: StatsSnapshot = serde_json::from_slice(&stored.bytes)?;
                Ok(Some(Versioned {
                    data,
                    version: stored.version,
                }))
            }
            None => Ok(None),
        }
    }

    fn write(
        &self,
        partition: &Partition,
        snapshot: &StatsSnapshot,
    ) -> Result<Versioned<StatsSnapshot>, StoreError> {
        let bytes = serde_json::to_vec(snapshot)?;

        let mut storage = self
            .storage
            .write()
            .map_err(|_| StoreError::LockPoisoned("write snapshot"))?;

        let partitions = storage.entry(partition.user.clone()).or_default();
        let key = partition.key();
        let version = partitions.get(&key).map(|s| s.version + 1).unwrap_or(1);
        partitions.insert(key, StoredSnapshot { bytes, version });

        Ok(Versioned {
            data: *snapshot,
            version,
        })
    }

    fn delete(&self, partition: &Partition) -> Result<bool, StoreError> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| StoreError::LockPoisoned("delete snapshot"))?;

        let removed = storage
            .get_mut(&partition.user)
            .and_then(|partitions| partitions.remove(&partition.key()));
        Ok(removed.is_some())
    }

    fn list(&self, user: &str) -> Result<Vec<(String, Versioned<StatsSnapshot>)>, StoreError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| StoreError::LockPoisoned("list snapshots"))?;

        let mut results = Vec::new();
        for (key, stored) in storage.get(user).into_iter().flatten() {
            let data: StatsSnapshot = serde_json::from_slice(&stored.bytes)?;
            results.push((
                key.clone(),
                Versioned {
                    data,
                    version: stored.version,
                },
            ));
        }
        results.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(results)
    }
}
