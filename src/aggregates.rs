//! Partition-wide aggregates read straight from the store.
//!
//! These cover the whole partition, not the recent window. Only the total
//! count is required; every other value degrades to a documented fallback
//! when its aggregation fails.

use crate::config::AverageScope;
use crate::error::StoreError;
use crate::reading::{Fallback, Reading};
use crate::record::Partition;
use crate::snapshot::StatsSnapshot;
use crate::store::{Direction, RecordQuery, RecordStore, SortField};

#[derive(Debug, Clone, PartialEq)]
pub struct Aggregates {
    /// All records, DNF included.
    pub count: u64,
    pub average: Reading<f64>,
    /// Never larger than `count`, even when it is a fallback.
    pub valid_count: Reading<u64>,
}

pub struct AggregateReader<R> {
    records: R,
    scope: AverageScope,
}

impl<R: RecordStore> AggregateReader<R> {
    pub fn new(records: R, scope: AverageScope) -> Self {
        Self { records, scope }
    }

    /// Read count, average and valid count for `partition`.
    ///
    /// `previous` is the snapshot currently stored for the partition; it is
    /// only consulted when the valid-count aggregation fails.
    pub fn read(
        &self,
        partition: &Partition,
        previous: Option<&StatsSnapshot>,
    ) -> Result<Aggregates, StoreError> {
        let count = self
            .records
            .count(&RecordQuery::partition(partition))?
            .unwrap_or(0);

        Ok(Aggregates {
            count,
            average: self.read_average(partition),
            valid_count: self.read_valid_count(partition, count, previous),
        })
    }

    fn read_average(&self, partition: &Partition) -> Reading<f64> {
        let query = match self.scope {
            AverageScope::ValidOnly => RecordQuery::partition(partition).valid_only(),
            AverageScope::AllRecords => RecordQuery::partition(partition),
        };

        match self.records.average(&query) {
            Ok(average) => Reading::Computed(average.unwrap_or(0.0)),
            Err(e) => {
                log::warn!("average aggregation failed for {}: {}", partition, e);
                Reading::from_store_error(0.0, Fallback::Zero, &e)
            }
        }
    }

    fn read_valid_count(
        &self,
        partition: &Partition,
        count: u64,
        previous: Option<&StatsSnapshot>,
    ) -> Reading<u64> {
        let query = RecordQuery::partition(partition).valid_only();
        match self.records.count(&query) {
            Ok(valid) => Reading::Computed(valid.unwrap_or(0).min(count)),
            Err(e) => {
                let (value, source) = match previous.map(|s| s.valid_count).filter(|v| *v > 0) {
                    Some(prior) => (prior.min(count), Fallback::PreviousSnapshot),
                    // Last resort: assume nothing is DNF.
                    None => (count, Fallback::TotalCount),
                };
                log::warn!(
                    "valid count aggregation failed for {}: {}; using {:?} = {}",
                    partition,
                    e,
                    source,
                    value
                );
                Reading::from_store_error(value, source, &e)
            }
        }
    }

    /// Duration of the fastest valid record across the whole partition.
    pub fn read_best(&self, partition: &Partition) -> Reading<f64> {
        let query = RecordQuery::partition(partition)
            .valid_only()
            .order_by(SortField::Duration, Direction::Ascending)
            .limit(1);

        match self.records.fetch(&query) {
            Ok(records) => Reading::Computed(records.first().map(|r| r.duration).unwrap_or(0.0)),
            Err(e) => {
                log::warn!("best query failed for {}: {}", partition, e);
                Reading::from_store_error(0.0, Fallback::Zero, &e)
            }
        }
    }
}
