//! Stats service: the trigger and query surface over a [`StatsRecalculator`].
//!
//! `on_record_mutated` is the notification hook a record writer calls after a
//! committed change; it never fails. `get_stats` only reads. Mutations can
//! also arrive over the bus (`RecomputeWorker`) or HTTP (`router`).

mod error;
#[cfg(feature = "http")]
mod http;
#[cfg(feature = "bus")]
mod worker;

pub use error::ServiceError;
#[cfg(feature = "http")]
pub use http::{router, StatsQuery};
#[cfg(feature = "bus")]
pub use worker::{RecomputeWorker, WorkerStats};

use crate::config::StatsConfig;
use crate::error::RecomputeError;
use crate::recalculator::{RecomputeOutcome, StatsRecalculator};
use crate::record::{MutationEvent, Partition};
use crate::snapshot::StatsSnapshot;
use crate::stats_store::StatsStore;
use crate::store::RecordStore;

pub struct StatsService<R, S> {
    recalculator: StatsRecalculator<R, S>,
    config: StatsConfig,
}

impl<R: RecordStore + Clone, S: StatsStore> StatsService<R, S> {
    pub fn new(records: R, stats: S, config: StatsConfig) -> Self {
        Self {
            recalculator: StatsRecalculator::new(records, stats, &config),
            config,
        }
    }
}

impl<R: RecordStore, S: StatsStore> StatsService<R, S> {
    pub fn config(&self) -> &StatsConfig {
        &self.config
    }

    pub fn recompute(&self, partition: &Partition) -> Result<RecomputeOutcome, RecomputeError> {
        self.recalculator.recompute(partition)
    }

    /// Recompute the partition a record belongs to after it changed.
    ///
    /// A missing field makes this a no-op. Recomputation errors are logged and
    /// the previous snapshot stays in place.
    pub fn on_record_mutated(&self, user: &str, category: &str, tag: &str) {
        match Partition::new(user, category, tag) {
            Ok(partition) => self.refresh(&partition),
            Err(e) => log::debug!("skipping stats refresh: {}", e),
        }
    }

    /// Recompute every partition a mutation touched, returning them.
    pub fn handle_mutation(&self, mutation: &MutationEvent) -> Vec<Partition> {
        let partitions = mutation.partitions();
        if partitions.is_empty() {
            log::debug!("mutation for user {} names no valid partition", mutation.user);
        }
        for partition in &partitions {
            self.refresh(partition);
        }
        partitions
    }

    /// Current snapshot, or all zeros if the partition was never computed.
    pub fn get_stats(&self, user: &str, category: &str, tag: &str) -> Result<StatsSnapshot, ServiceError> {
        let partition = Partition::new(user, category, tag)?;
        let stored = self.recalculator.stats_store().read(&partition)?;
        Ok(stored.map(|v| v.data).unwrap_or_default())
    }

    /// All stored snapshots of a user keyed by `{category}_{tag}`.
    pub fn list_stats(&self, user: &str) -> Result<Vec<(String, StatsSnapshot)>, ServiceError> {
        let stored = self.recalculator.stats_store().list(user)?;
        Ok(stored.into_iter().map(|(key, v)| (key, v.data)).collect())
    }

    fn refresh(&self, partition: &Partition) {
        if let Err(e) = self.recalculator.recompute(partition) {
            log::warn!("stats for {} not refreshed: {}", partition, e);
        }
    }
}
