//! Remaining Useful Life Distribution

use crate::error::FeatureStoreError;
use crate::table::FeatureTable;
use crate::REMAINING_MINUTES_COLUMN;
use serde::Serialize;
use std::f64::consts::PI;

/// Default number of histogram bins
pub const DEFAULT_BIN_COUNT: usize = 30;

/// Points on the density curve
const DENSITY_POINTS: usize = 200;

/// One histogram bin; the last bin includes its upper edge
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Binned remaining-useful-life values with a smoothed density overlay
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RulDistribution {
    pub bins: Vec<HistogramBin>,
    /// (minutes, expected count per bin) pairs of the kernel density estimate
    pub density: Vec<(f64, f64)>,
    /// Number of finite values binned
    pub total: usize,
}

impl RulDistribution {
    /// Bin a set of values into `bin_count` equal-width bins
    pub fn compute(values: &[f64], bin_count: usize) -> Self {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        let bin_count = bin_count.max(1);

        if finite.is_empty() {
            return Self {
                bins: Vec::new(),
                density: Vec::new(),
                total: 0,
            };
        }

        let (mut lo, mut hi) = finite
            .iter()
            .fold((f64::MAX, f64::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / bin_count as f64;
        let mut bins: Vec<HistogramBin> = (0..bin_count)
            .map(|i| HistogramBin {
                lower: lo + width * i as f64,
                upper: if i + 1 == bin_count { hi } else { lo + width * (i + 1) as f64 },
                count: 0,
            })
            .collect();

        for &v in &finite {
            let index = (((v - lo) / width) as usize).min(bin_count - 1);
            bins[index].count += 1;
        }

        let density = kernel_density(&finite, lo, hi)
            .into_iter()
            .map(|(x, d)| (x, d * finite.len() as f64 * width))
            .collect();

        Self {
            bins,
            density,
            total: finite.len(),
        }
    }

    /// Tallest bin count
    pub fn max_count(&self) -> usize {
        self.bins.iter().map(|b| b.count).max().unwrap_or(0)
    }

    /// Range covered by the bins
    pub fn range(&self) -> Option<(f64, f64)> {
        match (self.bins.first(), self.bins.last()) {
            (Some(first), Some(last)) => Some((first.lower, last.upper)),
            _ => None,
        }
    }
}

/// Gaussian kernel density with Scott's rule bandwidth, evaluated over [lo, hi].
/// Returns no points when the bandwidth is degenerate.
fn kernel_density(values: &[f64], lo: f64, hi: f64) -> Vec<(f64, f64)> {
    let n = values.len() as f64;
    if values.len() < 2 {
        return Vec::new();
    }

    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (n - 1.0);
    let bandwidth = variance.sqrt() * n.powf(-0.2);
    if bandwidth <= 0.0 || !bandwidth.is_finite() {
        return Vec::new();
    }

    let norm = 1.0 / (n * bandwidth * (2.0 * PI).sqrt());
    let step = (hi - lo) / (DENSITY_POINTS - 1) as f64;

    (0..DENSITY_POINTS)
        .map(|i| {
            let x = lo + step * i as f64;
            let sum: f64 = values
                .iter()
                .map(|v| {
                    let z = (x - v) / bandwidth;
                    (-0.5 * z * z).exp()
                })
                .sum();
            (x, sum * norm)
        })
        .collect()
}

impl FeatureTable {
    /// Distribution of the remaining-useful-life column
    pub fn rul_distribution(&self, bin_count: usize) -> Result<RulDistribution, FeatureStoreError> {
        Ok(RulDistribution::compute(self.column(REMAINING_MINUTES_COLUMN)?, bin_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bin_counts_sum_to_total() {
        let values: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let dist = RulDistribution::compute(&values, DEFAULT_BIN_COUNT);
        assert_eq!(dist.bins.len(), DEFAULT_BIN_COUNT);
        assert_eq!(dist.bins.iter().map(|b| b.count).sum::<usize>(), 100);
        assert_eq!(dist.total, 100);
    }

    #[test]
    fn test_max_value_lands_in_last_bin() {
        let dist = RulDistribution::compute(&[0.0, 10.0], 2);
        assert_eq!(dist.bins[0].count, 1);
        assert_eq!(dist.bins[1].count, 1);
        assert_eq!(dist.range(), Some((0.0, 10.0)));
    }

    #[test]
    fn test_constant_values() {
        let dist = RulDistribution::compute(&[5.0, 5.0, 5.0], 4);
        assert_eq!(dist.max_count(), 3);
        assert!(dist.density.is_empty());
    }

    #[test]
    fn test_empty_values() {
        let dist = RulDistribution::compute(&[f64::NAN], 10);
        assert!(dist.bins.is_empty());
        assert_eq!(dist.range(), None);
    }

    #[test]
    fn test_density_is_scaled_to_counts() {
        let values: Vec<f64> = (0..500).map(|i| (i % 50) as f64).collect();
        let dist = RulDistribution::compute(&values, 10);
        assert_eq!(dist.density.len(), DENSITY_POINTS);

        // Uniform-ish data: the curve should sit near the average bin height
        let mid = dist.density[DENSITY_POINTS / 2].1;
        let average = 500.0 / 10.0;
        assert!((mid - average).abs() < average * 0.25);
    }
}
