//! Failure Counts by Operating Mode

use crate::error::FeatureStoreError;
use crate::table::FeatureTable;
use crate::FAILURE_LABEL_COLUMN;
use serde::Serialize;
use tracing::debug;

/// Number of failures observed while a machine was in one operating mode
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModeCount {
    /// Indicator column name
    pub mode: String,
    /// Sum of the indicator over failed rows
    pub count: f64,
}

/// Failure counts per operating mode, sorted ascending by count
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FailureBreakdown {
    pub counts: Vec<ModeCount>,
    /// Number of rows with a failure label of 1
    pub failure_rows: usize,
}

impl FailureBreakdown {
    /// Sum every operating mode indicator over the rows where the failure
    /// label equals 1. A table without mode columns yields an empty breakdown.
    pub fn compute(table: &FeatureTable) -> Result<Self, FeatureStoreError> {
        let labels = table.column(FAILURE_LABEL_COLUMN)?;
        let failed: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|(_, &label)| label == 1.0)
            .map(|(i, _)| i)
            .collect();

        let mut counts: Vec<ModeCount> = table
            .mode_columns()
            .into_iter()
            .map(|column| ModeCount {
                mode: column.name.clone(),
                count: failed
                    .iter()
                    .map(|&i| column.values[i])
                    .filter(|v| !v.is_nan())
                    .sum(),
            })
            .collect();

        // Stable sort keeps source column order among ties
        counts.sort_by(|a, b| a.count.total_cmp(&b.count));

        debug!(
            "Failure breakdown: {} failed rows across {} modes",
            failed.len(),
            counts.len()
        );

        Ok(Self {
            counts,
            failure_rows: failed.len(),
        })
    }

    /// Count for a single mode column
    pub fn count(&self, mode: &str) -> Option<f64> {
        self.counts.iter().find(|c| c.mode == mode).map(|c| c.count)
    }

    /// Check if there are no mode columns
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Largest count, or 0 when empty
    pub fn max_count(&self) -> f64 {
        self.counts.iter().map(|c| c.count).fold(0.0, f64::max)
    }
}

impl FeatureTable {
    /// Failure counts by operating mode for this table
    pub fn failure_breakdown(&self) -> Result<FailureBreakdown, FeatureStoreError> {
        FailureBreakdown::compute(self)
    }
}
