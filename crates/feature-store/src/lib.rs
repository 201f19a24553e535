//! Feature Store
//!
//! Loads the processed equipment feature table and provides the read-only
//! views the dashboard and report are built on: descriptive statistics,
//! failure counts by operating mode, and the remaining-useful-life distribution.

mod distribution;
mod error;
mod failures;
mod loader;
mod statistics;
mod table;

pub use distribution::{HistogramBin, RulDistribution, DEFAULT_BIN_COUNT};
pub use error::FeatureStoreError;
pub use failures::{FailureBreakdown, ModeCount};
pub use loader::{FeatureStore, StoreConfig, DEFAULT_DATA_PATH};
pub use statistics::{ColumnSummary, DescribeTable, STATISTIC_LABELS};
pub use table::{FeatureTable, NumericColumn};

/// Machine identifier column
pub const MACHINE_ID_COLUMN: &str = "machine_id";
/// Binary failure label column
pub const FAILURE_LABEL_COLUMN: &str = "failure_label";
/// Remaining useful life column (minutes)
pub const REMAINING_MINUTES_COLUMN: &str = "remaining_minutes";
/// Prefix shared by the one-hot operating mode indicator columns
pub const OPERATING_MODE_PREFIX: &str = "operating_mode_";
