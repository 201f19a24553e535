//! CSV Loading and Session Cache

use crate::error::FeatureStoreError;
use crate::table::{FeatureTable, NumericColumn};
use crate::MACHINE_ID_COLUMN;
use once_cell::sync::OnceCell;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Default location of the processed feature table
pub const DEFAULT_DATA_PATH: &str = "data/processed/agri_features.csv";

/// Feature store configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path of the CSV feature table
    pub data_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
        }
    }
}

impl FeatureTable {
    /// Read the whole CSV file into a table. Every call re-reads the file.
    pub fn read_csv(path: impl AsRef<Path>) -> Result<Self, FeatureStoreError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| FeatureStoreError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let table = Self::parse_csv(bytes)?;
        info!(
            path = %path.display(),
            rows = table.len(),
            columns = table.columns().len(),
            "Loaded feature table"
        );
        metrics::counter!("feature_table_loads_total").increment(1);
        Ok(table)
    }

    /// Parse CSV bytes into a table. Column types are inferred from every
    /// row, so a late decimal or text value widens the whole column.
    pub fn parse_csv(bytes: Vec<u8>) -> Result<Self, FeatureStoreError> {
        let df = CsvReadOptions::default()
            .with_infer_schema_length(None)
            .with_has_header(true)
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish()?;

        Self::from_dataframe(&df)
    }

    fn from_dataframe(df: &DataFrame) -> Result<Self, FeatureStoreError> {
        let mut machine_ids = None;
        let mut columns = Vec::with_capacity(df.width());

        for series in df.get_columns() {
            let name = series.name().to_string();
            if name == MACHINE_ID_COLUMN {
                let ids = series.cast(&DataType::String)?;
                machine_ids = Some(
                    ids.str()?
                        .into_iter()
                        .map(|v| v.unwrap_or_default().to_string())
                        .collect(),
                );
                continue;
            }

            let values = series.cast(&DataType::Float64)?;
            let values: Vec<f64> = values
                .f64()?
                .into_iter()
                .map(|v| v.unwrap_or(f64::NAN))
                .collect();
            debug!(column = %name, "Parsed numeric column");
            columns.push(NumericColumn::new(name, values));
        }

        FeatureTable::from_columns(machine_ids, columns)
    }
}

/// Cached reader: the first load reads the file, later loads share the same
/// table for the lifetime of the store.
pub struct FeatureStore {
    config: StoreConfig,
    table: OnceCell<Arc<FeatureTable>>,
}

impl FeatureStore {
    /// Create a store that reads lazily from the configured path
    pub fn new(config: StoreConfig) -> Self {
        info!("Creating feature store for {}", config.data_path.display());
        Self {
            config,
            table: OnceCell::new(),
        }
    }

    /// Create a store around an already loaded table
    pub fn preloaded(table: FeatureTable) -> Self {
        Self {
            config: StoreConfig::default(),
            table: OnceCell::with_value(Arc::new(table)),
        }
    }

    /// Load the table, reading the file only on first use
    pub fn load(&self) -> Result<Arc<FeatureTable>, FeatureStoreError> {
        if let Some(table) = self.table.get() {
            debug!("Feature table cache hit");
            return Ok(Arc::clone(table));
        }

        self.table
            .get_or_try_init(|| FeatureTable::read_csv(&self.config.data_path).map(Arc::new))
            .map(Arc::clone)
    }

    /// Whether the table has been loaded
    pub fn is_loaded(&self) -> bool {
        self.table.get().is_some()
    }

    /// Configured data path
    pub fn data_path(&self) -> &Path {
        &self.config.data_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE_CSV: &str = "\
machine_id,temperature,operating_mode_idle,operating_mode_load,failure_label,remaining_minutes
A,70.5,1,0,0,300
A,81.2,0,1,1,12
B,65.0,1,0,0,450
";

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_read_csv() {
        let file = write_csv(SAMPLE_CSV);
        let table = FeatureTable::read_csv(file.path()).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.machine_ids().unwrap(), vec!["A", "B"]);
        assert_eq!(
            table.column_names(),
            vec![
                "temperature",
                "operating_mode_idle",
                "operating_mode_load",
                "failure_label",
                "remaining_minutes"
            ]
        );
        assert_eq!(table.column("remaining_minutes").unwrap(), &[300.0, 12.0, 450.0]);
    }

    #[test]
    fn test_numeric_machine_ids_become_text() {
        let file = write_csv("machine_id,failure_label\n7,1\n9,0\n");
        let table = FeatureTable::read_csv(file.path()).unwrap();
        assert_eq!(table.machine_ids().unwrap(), vec!["7", "9"]);
    }

    #[test]
    fn test_late_decimal_widens_column() {
        let mut csv = String::from("machine_id,sensor,failure_label\n");
        for i in 0..1500 {
            let sensor = if i == 1200 { "3.5".to_string() } else { (i % 7).to_string() };
            csv.push_str(&format!("A,{},0\n", sensor));
        }

        let table = FeatureTable::parse_csv(csv.into_bytes()).unwrap();
        let sensor = table.column("sensor").unwrap();
        assert_eq!(table.len(), 1500);
        assert_eq!(sensor[1200], 3.5);
        assert_eq!(sensor[8], 1.0);
    }

    #[test]
    fn test_late_text_machine_id() {
        let mut csv = String::from("machine_id,failure_label\n");
        for i in 0..1100 {
            csv.push_str(&format!("{},0\n", i % 3));
        }
        csv.push_str("M-7,1\n");

        let table = FeatureTable::parse_csv(csv.into_bytes()).unwrap();
        assert_eq!(table.machine_ids().unwrap(), vec!["0", "1", "2", "M-7"]);
        assert_eq!(table.filter_machine("M-7").unwrap().len(), 1);
    }

    #[test]
    fn test_missing_cells_are_nan() {
        let file = write_csv("machine_id,pressure\nA,\nA,2.5\n");
        let table = FeatureTable::read_csv(file.path()).unwrap();
        let pressure = table.column("pressure").unwrap();
        assert!(pressure[0].is_nan());
        assert_eq!(pressure[1], 2.5);
    }

    #[test]
    fn test_missing_file() {
        let result = FeatureTable::read_csv("does/not/exist.csv");
        assert!(matches!(result, Err(FeatureStoreError::Io { .. })));
    }

    #[test]
    fn test_store_caches_table() {
        let file = write_csv(SAMPLE_CSV);
        let store = FeatureStore::new(StoreConfig {
            data_path: file.path().to_path_buf(),
        });
        assert!(!store.is_loaded());

        let first = store.load().unwrap();
        // Removing the file must not matter once the table is cached
        let path = file.path().to_path_buf();
        drop(file);
        assert!(!path.exists());

        let second = store.load().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(store.is_loaded());
    }
}
