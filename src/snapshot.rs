use serde::{Deserialize, Serialize};

/// Derived statistics for one partition.
///
/// Always written in full; the all-zero value doubles as the answer for a
/// partition that has never been recomputed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    /// All records, DNF included.
    pub count: u64,
    /// Records whose status is not DNF.
    pub valid_count: u64,
    /// `average * valid_count`; an estimate, not a re-summation.
    pub sum: f64,
    /// Best valid time over the whole partition.
    pub best: f64,
    pub average: f64,
    /// Sample standard deviation of the valid times in the recent window.
    pub deviation: f64,
    pub ao5: f64,
    pub ao12: f64,
    pub ao50: f64,
    pub ao100: f64,
}

impl StatsSnapshot {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn dnf_count(&self) -> u64 {
        self.count.saturating_sub(self.valid_count)
    }

    /// Trimmed average for one of the tracked window sizes.
    pub fn average_of(&self, n: usize) -> Option<f64> {
        match n {
            5 => Some(self.ao5),
            12 => Some(self.ao12),
            50 => Some(self.ao50),
            100 => Some(self.ao100),
            _ => None,
        }
    }

    /// Bitwise comparison, so replays can be checked for exact equality.
    pub fn bit_identical(&self, other: &Self) -> bool {
        self.count == other.count
            && self.valid_count == other.valid_count
            && self.floats().map(f64::to_bits) == other.floats().map(f64::to_bits)
    }

    fn floats(&self) -> [f64; 8] {
        [
            self.sum,
            self.best,
            self.average,
            self.deviation,
            self.ao5,
            self.ao12,
            self.ao50,
            self.ao100,
        ]
    }
}
