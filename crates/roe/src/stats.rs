//! Summary statistics over a set of ratios.

use serde::{Deserialize, Serialize};

/// Distribution of successful ROE ratios.
///
/// All fields are zero for an empty set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RoeStatistics {
    /// Number of ratios.
    pub count: usize,
    /// Arithmetic mean.
    pub average_roe: f64,
    /// Median; mean of the two middle values for an even count.
    pub median_roe: f64,
    /// Smallest ratio.
    pub min_roe: f64,
    /// Largest ratio.
    pub max_roe: f64,
    /// Population standard deviation.
    pub std_deviation: f64,
}

impl RoeStatistics {
    /// Computes statistics over `values`. NaN values are ignored.
    #[must_use]
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let mut sorted: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
        if sorted.is_empty() {
            return Self::default();
        }
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let n = count as f64;
        let mean = sorted.iter().sum::<f64>() / n;
        let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let median = if count % 2 == 0 {
            (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
        } else {
            sorted[count / 2]
        };

        Self {
            count,
            average_roe: mean,
            median_roe: median,
            min_roe: sorted[0],
            max_roe: sorted[count - 1],
            std_deviation: variance.sqrt(),
        }
    }
}
