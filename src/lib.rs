//! solve_stats - derived statistics for timed solves, kept as read models.
//!
//! Every `(user, category, tag)` partition owns one [`StatsSnapshot`]. When a
//! record in the partition changes, [`StatsRecalculator::recompute`] gathers
//! partition-wide aggregates and a recent window of records from a
//! [`RecordStore`], derives deviation and trimmed averages, and overwrites the
//! snapshot in a [`StatsStore`]. Reads never recompute.
//!
//! ## Example
//!
//! ```
//! use solve_stats::{
//!     InMemoryRecordStore, InMemoryStatsStore, Record, SolveStatus, StatsConfig, StatsService,
//! };
//!
//! let records = InMemoryRecordStore::new();
//! let service = StatsService::new(
//!     records.clone(),
//!     InMemoryStatsStore::new(),
//!     StatsConfig::default(),
//! );
//!
//! records
//!     .put(Record::new("s1", "alice", "CUBE_3X3", "normal", 12.5, SolveStatus::Ok, 1))
//!     .unwrap();
//! service.on_record_mutated("alice", "CUBE_3X3", "normal");
//!
//! let stats = service.get_stats("alice", "CUBE_3X3", "normal").unwrap();
//! assert_eq!(stats.count, 1);
//! assert_eq!(stats.best, 12.5);
//! ```

mod aggregates;
mod config;
mod error;
mod reading;
mod recalculator;
mod record;
mod snapshot;
mod stats_store;
mod store;
mod trimmed;
mod window;

pub mod service;

#[cfg(feature = "bus")]
pub mod bus;

pub use aggregates::{AggregateReader, Aggregates};
pub use config::{AverageScope, ConfigError, StatsConfig};
pub use error::{RecomputeError, StoreError};
pub use reading::{Degraded, Fallback, Reading, StatField};
pub use recalculator::{RecomputeOutcome, StatsRecalculator};
pub use record::{MutationEvent, Partition, PartitionError, PartitionFields, Record, SolveStatus};
pub use service::{ServiceError, StatsService};
pub use snapshot::StatsSnapshot;
pub use stats_store::{InMemoryStatsStore, StatsStore, Versioned};
pub use store::{Direction, Filter, InMemoryRecordStore, OrderBy, RecordQuery, RecordStore, SortField};
pub use trimmed::{average_of_n, sample_deviation, TRIMMED_WINDOWS};
pub use window::{valid_times, WindowSampler, DEFAULT_WINDOW_LIMIT};
