//! Descriptive Statistics

use crate::table::FeatureTable;
use serde::Serialize;

/// Row labels of a describe table, in display order
pub const STATISTIC_LABELS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

/// Descriptive statistics for one column. NaN cells are skipped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    /// Column name
    pub name: String,
    /// Number of non-missing values
    pub count: usize,
    /// Mean value
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator)
    pub std: f64,
    /// Minimum value
    pub min: f64,
    /// First quartile
    pub q25: f64,
    /// Median
    pub q50: f64,
    /// Third quartile
    pub q75: f64,
    /// Maximum value
    pub max: f64,
}

impl ColumnSummary {
    /// Compute summary statistics from a slice of values
    pub fn compute(name: &str, values: &[f64]) -> Self {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let count = sorted.len();
        if count == 0 {
            return Self {
                name: name.to_string(),
                count,
                mean: f64::NAN,
                std: f64::NAN,
                min: f64::NAN,
                q25: f64::NAN,
                q50: f64::NAN,
                q75: f64::NAN,
                max: f64::NAN,
            };
        }

        let n = count as f64;
        let mean = sorted.iter().sum::<f64>() / n;

        let std = if count > 1 {
            let m2: f64 = sorted.iter().map(|v| (v - mean) * (v - mean)).sum();
            (m2 / (n - 1.0)).sqrt()
        } else {
            f64::NAN
        };

        Self {
            name: name.to_string(),
            count,
            mean,
            std,
            min: sorted[0],
            q25: quantile(&sorted, 0.25),
            q50: quantile(&sorted, 0.50),
            q75: quantile(&sorted, 0.75),
            max: sorted[count - 1],
        }
    }

    /// Statistic values in `STATISTIC_LABELS` order
    pub fn values(&self) -> [f64; 8] {
        [
            self.count as f64,
            self.mean,
            self.std,
            self.min,
            self.q25,
            self.q50,
            self.q75,
            self.max,
        ]
    }

    /// Copy with every statistic rounded to `decimals` places
    pub fn rounded(&self, decimals: i32) -> Self {
        let r = |v: f64| round_to(v, decimals);
        Self {
            name: self.name.clone(),
            count: self.count,
            mean: r(self.mean),
            std: r(self.std),
            min: r(self.min),
            q25: r(self.q25),
            q50: r(self.q50),
            q75: r(self.q75),
            max: r(self.max),
        }
    }
}

/// Linear interpolation between closest ranks of a sorted, NaN-free slice
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

fn round_to(value: f64, decimals: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Descriptive statistics for every numeric column of a table
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DescribeTable {
    pub columns: Vec<ColumnSummary>,
}

impl DescribeTable {
    /// Summarize all numeric columns
    pub fn compute(table: &FeatureTable) -> Self {
        Self {
            columns: table
                .columns()
                .iter()
                .map(|c| ColumnSummary::compute(&c.name, &c.values))
                .collect(),
        }
    }

    /// Copy with every statistic rounded
    pub fn rounded(&self, decimals: i32) -> Self {
        Self {
            columns: self.columns.iter().map(|c| c.rounded(decimals)).collect(),
        }
    }

    /// Summary of a single column
    pub fn get(&self, name: &str) -> Option<&ColumnSummary> {
        self.columns.iter().find(|c| c.name == name)
    }
}

impl FeatureTable {
    /// Descriptive statistics over every numeric column
    pub fn describe(&self) -> DescribeTable {
        DescribeTable::compute(self)
    }
}
