//! Values that may have been substituted after a failed computation.
//!
//! A `Reading` keeps "computed 0" apart from "defaulted to 0 after a
//! failure", so callers and tests can tell the two apart.

use std::fmt;

use serde::Serialize;

use crate::error::StoreError;

/// Where a substituted value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Fallback {
    Zero,
    PreviousSnapshot,
    /// Total record count used as an estimate of the valid count.
    TotalCount,
}

/// A value that was either computed or substituted after a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Reading<T> {
    Computed(T),
    Fallback {
        value: T,
        source: Fallback,
        cause: String,
    },
}

impl<T: Copy> Reading<T> {
    pub fn value(&self) -> T {
        match self {
            Reading::Computed(value) | Reading::Fallback { value, .. } => *value,
        }
    }
}

impl<T> Reading<T> {
    pub fn fallback(value: T, source: Fallback, cause: impl fmt::Display) -> Self {
        Reading::Fallback {
            value,
            source,
            cause: cause.to_string(),
        }
    }

    pub(crate) fn from_store_error(value: T, source: Fallback, err: &StoreError) -> Self {
        Self::fallback(value, source, err)
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Reading::Fallback { .. })
    }

    /// Describe the substitution for `field`, if one happened.
    pub fn degraded(&self, field: StatField) -> Option<Degraded> {
        match self {
            Reading::Computed(_) => None,
            Reading::Fallback { source, cause, .. } => Some(Degraded {
                field,
                source: *source,
                cause: cause.clone(),
            }),
        }
    }
}

/// Snapshot fields that can degrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StatField {
    Average,
    ValidCount,
    Best,
    Deviation,
}

impl fmt::Display for StatField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatField::Average => "average",
            StatField::ValidCount => "validCount",
            StatField::Best => "best",
            StatField::Deviation => "deviation",
        };
        f.write_str(name)
    }
}

/// One field of a written snapshot that used a fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Degraded {
    pub field: StatField,
    pub source: Fallback,
    pub cause: String,
}
