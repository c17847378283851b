//! Trimmed averages and spread over a window of solve times.
//!
//! Both functions are pure: they see only the durations of valid records in
//! window order (most recent first).

use crate::reading::{Fallback, Reading};

/// Window sizes of the rolling trimmed averages kept in a snapshot.
pub const TRIMMED_WINDOWS: [usize; 4] = [5, 12, 50, 100];

/// Average of the `n` most recent times with the single best and single
/// worst removed.
///
/// Returns 0 when fewer than `n` times are available. For `n <= 2` nothing is
/// trimmed and the plain mean is returned. Older entries beyond the first `n`
/// are ignored; the input is not re-sorted before truncation.
///
/// ```
/// use solve_stats::average_of_n;
///
/// let ao5 = average_of_n(&[12.3, 9.8, 15.1, 11.0, 10.5], 5);
/// assert!((ao5 - 11.266_666).abs() < 1e-5);
/// assert_eq!(average_of_n(&[12.3, 9.8], 5), 0.0);
/// ```
pub fn average_of_n(times: &[f64], n: usize) -> f64 {
    if n == 0 || times.len() < n {
        return 0.0;
    }

    let recent = &times[..n];
    if n <= 2 {
        return mean(recent);
    }

    let mut sorted = recent.to_vec();
    sorted.sort_by(f64::total_cmp);
    mean(&sorted[1..n - 1])
}

/// Sample standard deviation (Bessel's correction) of `times`.
///
/// Fewer than two values yield a computed 0. A non-finite result (for
/// example from a corrupt duration) falls back to 0.
pub fn sample_deviation(times: &[f64]) -> Reading<f64> {
    if times.len() < 2 {
        return Reading::Computed(0.0);
    }

    // Welford's update keeps the result stable for long, tightly clustered
    // windows.
    let mut count = 0.0;
    let mut running_mean = 0.0;
    let mut m2 = 0.0;
    for &value in times {
        count += 1.0;
        let delta = value - running_mean;
        running_mean += delta / count;
        m2 += delta * (value - running_mean);
    }

    let deviation = (m2 / (count - 1.0)).sqrt();
    if deviation.is_finite() {
        Reading::Computed(deviation)
    } else {
        Reading::fallback(
            0.0,
            Fallback::Zero,
            format!("non-finite deviation over {} times", times.len()),
        )
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
