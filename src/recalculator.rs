//! StatsRecalculator - rebuilds one partition's snapshot from its records.
//!
//! ```text
//!   recompute(partition)
//!      ├─ StatsStore::read           previous snapshot (valid-count fallback only)
//!      ├─ AggregateReader::read      count / average / validCount   (whole partition)
//!      ├─ WindowSampler::sample      100 newest records             (abort if index building)
//!      ├─ AggregateReader::read_best fastest valid record           (whole partition)
//!      ├─ sample_deviation + average_of_n over the window's valid times
//!      └─ StatsStore::write          full overwrite, last write wins
//! ```

use crate::aggregates::{AggregateReader, Aggregates};
use crate::config::StatsConfig;
use crate::error::RecomputeError;
use crate::reading::{Degraded, StatField};
use crate::record::Partition;
use crate::snapshot::StatsSnapshot;
use crate::stats_store::{StatsStore, Versioned};
use crate::store::RecordStore;
use crate::trimmed::{average_of_n, sample_deviation, TRIMMED_WINDOWS};
use crate::window::{valid_times, WindowSampler, DEFAULT_WINDOW_LIMIT};

/// Result of a recomputation that reached the stats store.
#[derive(Debug, Clone, PartialEq)]
pub enum RecomputeOutcome {
    Written {
        partition: Partition,
        snapshot: Versioned<StatsSnapshot>,
        /// Fields that used a fallback value.
        degraded: Vec<Degraded>,
    },
    /// The partition is empty and `prune_empty` is set; the stored snapshot
    /// (if any) was deleted.
    Pruned { partition: Partition, existed: bool },
}

impl RecomputeOutcome {
    pub fn snapshot(&self) -> StatsSnapshot {
        match self {
            RecomputeOutcome::Written { snapshot, .. } => snapshot.data,
            RecomputeOutcome::Pruned { .. } => StatsSnapshot::zero(),
        }
    }

    pub fn degraded(&self) -> &[Degraded] {
        match self {
            RecomputeOutcome::Written { degraded, .. } => degraded,
            RecomputeOutcome::Pruned { .. } => &[],
        }
    }
}

pub struct StatsRecalculator<R, S> {
    aggregates: AggregateReader<R>,
    window: WindowSampler<R>,
    stats: S,
    window_limit: usize,
    prune_empty: bool,
}

impl<R: RecordStore + Clone, S: StatsStore> StatsRecalculator<R, S> {
    pub fn new(records: R, stats: S, config: &StatsConfig) -> Self {
        Self {
            aggregates: AggregateReader::new(records.clone(), config.average_scope),
            window: WindowSampler::new(records),
            stats,
            window_limit: config.window_limit.min(DEFAULT_WINDOW_LIMIT),
            prune_empty: config.prune_empty,
        }
    }
}

impl<R: RecordStore, S: StatsStore> StatsRecalculator<R, S> {
    pub fn stats_store(&self) -> &S {
        &self.stats
    }

    /// Rebuild and persist the snapshot for `partition`.
    ///
    /// On error nothing has been written and the previous snapshot stands.
    pub fn recompute(&self, partition: &Partition) -> Result<RecomputeOutcome, RecomputeError> {
        let previous = match self.stats.read(partition) {
            Ok(stored) => stored.map(|v| v.data),
            Err(e) => {
                log::warn!("could not load previous stats for {}: {}", partition, e);
                None
            }
        };

        let aggregates = self
            .aggregates
            .read(partition, previous.as_ref())
            .map_err(|e| {
                log::warn!("count aggregation failed for {}: {}", partition, e);
                RecomputeError::Store(e)
            })?;

        if self.prune_empty && aggregates.count == 0 {
            let existed = self
                .stats
                .delete(partition)
                .map_err(RecomputeError::Persist)?;
            log::info!("partition {} is empty, pruned stats (existed: {})", partition, existed);
            return Ok(RecomputeOutcome::Pruned {
                partition: partition.clone(),
                existed,
            });
        }

        let window = self
            .window
            .sample(partition, self.window_limit)
            .map_err(|e| {
                let err = RecomputeError::from_window(e);
                log::warn!("leaving stats for {} untouched: {}", partition, err);
                err
            })?;
        let times = valid_times(&window);

        let best = self.aggregates.read_best(partition);
        let deviation = sample_deviation(&times);

        let snapshot = assemble(&aggregates, best.value(), deviation.value(), &times);

        let degraded: Vec<Degraded> = [
            aggregates.average.degraded(StatField::Average),
            aggregates.valid_count.degraded(StatField::ValidCount),
            best.degraded(StatField::Best),
            deviation.degraded(StatField::Deviation),
        ]
        .into_iter()
        .flatten()
        .collect();

        let stored = self.stats.write(partition, &snapshot).map_err(|e| {
            log::error!("failed to persist stats for {}: {}", partition, e);
            RecomputeError::Persist(e)
        })?;

        log::info!(
            "stats for {} written (v{}): count={} valid={} best={} ao5={} ao12={}{}",
            partition,
            stored.version,
            snapshot.count,
            snapshot.valid_count,
            snapshot.best,
            snapshot.ao5,
            snapshot.ao12,
            if degraded.is_empty() { "" } else { " [degraded]" }
        );

        Ok(RecomputeOutcome::Written {
            partition: partition.clone(),
            snapshot: stored,
            degraded,
        })
    }
}

/// Merge partition-wide aggregates with window-derived values.
fn assemble(aggregates: &Aggregates, best: f64, deviation: f64, times: &[f64]) -> StatsSnapshot {
    let average = aggregates.average.value();
    let valid_count = aggregates.valid_count.value();

    // Estimate from the aggregate mean; the full partition is never summed.
    let sum = if average > 0.0 && valid_count > 0 {
        average * valid_count as f64
    } else {
        0.0
    };

    let [ao5, ao12, ao50, ao100] = TRIMMED_WINDOWS.map(|n| average_of_n(times, n));

    StatsSnapshot {
        count: aggregates.count,
        valid_count,
        sum,
        best,
        average,
        deviation,
        ao5,
        ao12,
        ao50,
        ao100,
    }
}
