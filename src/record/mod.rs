//! Solve records and the partitions they belong to.

mod mutation;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use mutation::{MutationEvent, PartitionFields};

/// Outcome recorded for an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SolveStatus {
    #[serde(rename = "OK")]
    Ok,
    /// Valid attempt; the stored duration already carries the +2s penalty.
    #[serde(rename = "PLUS2")]
    PlusTwo,
    /// Did not finish. Counted, but never part of a time statistic.
    #[serde(rename = "DNF")]
    Dnf,
}

impl SolveStatus {
    pub fn is_valid(self) -> bool {
        self != SolveStatus::Dnf
    }
}

/// One timed attempt owned by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    pub user: String,
    pub category: String,
    pub tag: String,
    pub duration: f64,
    pub status: SolveStatus,
    /// Creation time in epoch milliseconds.
    pub timestamp: u64,
    #[serde(default)]
    pub scramble: String,
    #[serde(default)]
    pub comment: String,
}

impl Record {
    pub fn new(
        id: impl Into<String>,
        user: impl Into<String>,
        category: impl Into<String>,
        tag: impl Into<String>,
        duration: f64,
        status: SolveStatus,
        timestamp: u64,
    ) -> Self {
        Self {
            id: id.into(),
            user: user.into(),
            category: category.into(),
            tag: tag.into(),
            duration,
            status,
            timestamp,
            scramble: String::new(),
            comment: String::new(),
        }
    }

    pub fn with_scramble(mut self, scramble: impl Into<String>) -> Self {
        self.scramble = scramble.into();
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn is_valid(&self) -> bool {
        self.status.is_valid()
    }

    /// The partition this record is counted in.
    pub fn partition(&self) -> Partition {
        Partition {
            user: self.user.clone(),
            category: self.category.clone(),
            tag: self.tag.clone(),
        }
    }

    pub fn belongs_to(&self, partition: &Partition) -> bool {
        self.user == partition.user
            && self.category == partition.category
            && self.tag == partition.tag
    }
}

/// A partition field was missing or empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionError {
    MissingField(&'static str),
}

impl fmt::Display for PartitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionError::MissingField(field) => write!(f, "missing partition field: {}", field),
        }
    }
}

impl std::error::Error for PartitionError {}

/// The `(user, category, tag)` scope every statistic is computed over.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Partition {
    pub user: String,
    pub category: String,
    pub tag: String,
}

impl Partition {
    pub fn new(
        user: impl Into<String>,
        category: impl Into<String>,
        tag: impl Into<String>,
    ) -> Result<Self, PartitionError> {
        let user = required("user", user.into())?;
        let category = required("category", category.into())?;
        let tag = required("tag", tag.into())?;
        Ok(Self {
            user,
            category,
            tag,
        })
    }

    /// Build a partition from optional event fields.
    pub fn from_parts(
        user: Option<&str>,
        category: Option<&str>,
        tag: Option<&str>,
    ) -> Result<Self, PartitionError> {
        Self::new(
            user.ok_or(PartitionError::MissingField("user"))?,
            category.ok_or(PartitionError::MissingField("category"))?,
            tag.ok_or(PartitionError::MissingField("tag"))?,
        )
    }

    /// Composite key inside the user's namespace: `"{category}_{tag}"`.
    pub fn key(&self) -> String {
        format!("{}_{}", self.category, self.tag)
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.user, self.key())
    }
}

fn required(field: &'static str, value: String) -> Result<String, PartitionError> {
    if value.trim().is_empty() {
        Err(PartitionError::MissingField(field))
    } else {
        Ok(value)
    }
}
