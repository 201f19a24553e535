//! In-Memory Feature Table

use crate::error::FeatureStoreError;
use crate::{FAILURE_LABEL_COLUMN, MACHINE_ID_COLUMN, OPERATING_MODE_PREFIX, REMAINING_MINUTES_COLUMN};
use ndarray::Array2;
use serde::Serialize;
use std::collections::HashSet;

/// A named numeric column; missing cells are NaN
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericColumn {
    pub name: String,
    pub values: Vec<f64>,
}

impl NumericColumn {
    /// Create a column from a name and its values
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Whether this column is a one-hot operating mode indicator
    pub fn is_operating_mode(&self) -> bool {
        self.name.starts_with(OPERATING_MODE_PREFIX)
    }

    /// Whether this column is used as a model input
    pub fn is_feature(&self) -> bool {
        !matches!(
            self.name.as_str(),
            FAILURE_LABEL_COLUMN | REMAINING_MINUTES_COLUMN | MACHINE_ID_COLUMN
        )
    }
}

/// Immutable feature table: one machine id per row plus numeric columns in
/// source order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    machine_ids: Option<Vec<String>>,
    columns: Vec<NumericColumn>,
    rows: usize,
}

impl FeatureTable {
    /// Build a table from columns, checking that every column has the same length
    pub fn from_columns(
        machine_ids: Option<Vec<String>>,
        columns: Vec<NumericColumn>,
    ) -> Result<Self, FeatureStoreError> {
        let rows = machine_ids
            .as_ref()
            .map(Vec::len)
            .or_else(|| columns.first().map(|c| c.values.len()))
            .unwrap_or(0);

        for column in &columns {
            if column.values.len() != rows {
                return Err(FeatureStoreError::LengthMismatch {
                    column: column.name.clone(),
                    expected: rows,
                    actual: column.values.len(),
                });
            }
        }

        Ok(Self {
            machine_ids,
            columns,
            rows,
        })
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows
    }

    /// Check if the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Numeric columns in source order
    pub fn columns(&self) -> &[NumericColumn] {
        &self.columns
    }

    /// Names of the numeric columns in source order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Look up a numeric column by name
    pub fn column(&self, name: &str) -> Result<&[f64], FeatureStoreError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
            .ok_or_else(|| FeatureStoreError::MissingColumn(name.to_string()))
    }

    /// Per-row machine identifiers
    pub fn machine_column(&self) -> Result<&[String], FeatureStoreError> {
        self.machine_ids
            .as_deref()
            .ok_or_else(|| FeatureStoreError::MissingColumn(MACHINE_ID_COLUMN.to_string()))
    }

    /// Distinct machine identifiers in order of first appearance
    pub fn machine_ids(&self) -> Result<Vec<&str>, FeatureStoreError> {
        let mut seen = HashSet::new();
        Ok(self
            .machine_column()?
            .iter()
            .map(String::as_str)
            .filter(|id| seen.insert(*id))
            .collect())
    }

    /// Position in the full table of row `row` of a machine's rows, along
    /// with how many rows the machine has. No rows are copied.
    pub fn machine_row_index(&self, machine_id: &str, row: usize) -> Result<(usize, usize), FeatureStoreError> {
        let mut found = None;
        let mut count = 0;
        for (i, id) in self.machine_column()?.iter().enumerate() {
            if id == machine_id {
                if count == row {
                    found = Some(i);
                }
                count += 1;
            }
        }

        if count == 0 {
            return Err(FeatureStoreError::UnknownMachine(machine_id.to_string()));
        }
        found
            .map(|index| (index, count))
            .ok_or(FeatureStoreError::RowOutOfRange { index: row, len: count })
    }

    /// Rows belonging to one machine, in source order
    pub fn filter_machine(&self, machine_id: &str) -> Result<FeatureTable, FeatureStoreError> {
        let indices: Vec<usize> = self
            .machine_column()?
            .iter()
            .enumerate()
            .filter(|(_, id)| id.as_str() == machine_id)
            .map(|(i, _)| i)
            .collect();

        if indices.is_empty() {
            return Err(FeatureStoreError::UnknownMachine(machine_id.to_string()));
        }

        Ok(self.take_rows(&indices))
    }

    fn take_rows(&self, indices: &[usize]) -> FeatureTable {
        let machine_ids = self
            .machine_ids
            .as_ref()
            .map(|ids| indices.iter().map(|&i| ids[i].clone()).collect());

        let columns = self
            .columns
            .iter()
            .map(|c| NumericColumn::new(c.name.clone(), indices.iter().map(|&i| c.values[i]).collect()))
            .collect();

        FeatureTable {
            machine_ids,
            columns,
            rows: indices.len(),
        }
    }

    /// One-hot operating mode indicator columns
    pub fn mode_columns(&self) -> Vec<&NumericColumn> {
        self.columns.iter().filter(|c| c.is_operating_mode()).collect()
    }

    /// Model input columns (everything but label, target and machine id)
    pub fn feature_columns(&self) -> Vec<&NumericColumn> {
        self.columns.iter().filter(|c| c.is_feature()).collect()
    }

    /// Names of the model input columns
    pub fn feature_names(&self) -> Vec<String> {
        self.feature_columns().iter().map(|c| c.name.clone()).collect()
    }

    /// Model inputs of a single row
    pub fn feature_row(&self, index: usize) -> Result<Vec<f64>, FeatureStoreError> {
        if index >= self.rows {
            return Err(FeatureStoreError::RowOutOfRange {
                index,
                len: self.rows,
            });
        }
        Ok(self.feature_columns().iter().map(|c| c.values[index]).collect())
    }

    /// Model inputs of every row as a (rows × features) matrix
    pub fn feature_matrix(&self) -> Array2<f64> {
        let features = self.feature_columns();
        Array2::from_shape_fn((self.rows, features.len()), |(r, c)| features[c].values[r])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> FeatureTable {
        FeatureTable::from_columns(
            Some(vec!["A".into(), "B".into(), "A".into()]),
            vec![
                NumericColumn::new("vibration", vec![0.1, 0.2, 0.3]),
                NumericColumn::new("operating_mode_idle", vec![1.0, 0.0, 0.0]),
                NumericColumn::new("failure_label", vec![0.0, 1.0, 1.0]),
                NumericColumn::new("remaining_minutes", vec![120.0, 5.0, 10.0]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_machine_ids_first_seen_order() {
        let table = sample_table();
        assert_eq!(table.machine_ids().unwrap(), vec!["A", "B"]);
    }

    #[test]
    fn test_machine_ids_many_rows() {
        let ids: Vec<String> = (0..5000).map(|i| format!("M{}", (i * 7) % 13)).collect();
        let table = FeatureTable::from_columns(Some(ids), Vec::new()).unwrap();

        let unique = table.machine_ids().unwrap();
        assert_eq!(unique.len(), 13);
        assert_eq!(&unique[..3], &["M0", "M7", "M1"]);
    }

    #[test]
    fn test_machine_row_index() {
        let table = sample_table();
        assert_eq!(table.machine_row_index("A", 0).unwrap(), (0, 2));
        assert_eq!(table.machine_row_index("A", 1).unwrap(), (2, 2));
        assert_eq!(table.machine_row_index("B", 0).unwrap(), (1, 1));
        assert!(matches!(
            table.machine_row_index("A", 2),
            Err(FeatureStoreError::RowOutOfRange { index: 2, len: 2 })
        ));
        assert!(matches!(
            table.machine_row_index("Z", 0),
            Err(FeatureStoreError::UnknownMachine(_))
        ));
    }

    #[test]
    fn test_filter_machine() {
        let table = sample_table();
        let subset = table.filter_machine("A").unwrap();
        assert_eq!(subset.len(), 2);
        assert_eq!(subset.column("vibration").unwrap(), &[0.1, 0.3]);
        assert_eq!(subset.column("remaining_minutes").unwrap(), &[120.0, 10.0]);
    }

    #[test]
    fn test_filter_unknown_machine() {
        let table = sample_table();
        assert!(matches!(
            table.filter_machine("Z"),
            Err(FeatureStoreError::UnknownMachine(_))
        ));
    }

    #[test]
    fn test_single_machine_filter_is_identity() {
        let table = FeatureTable::from_columns(
            Some(vec!["A".into(), "A".into()]),
            vec![NumericColumn::new("failure_label", vec![1.0, 0.0])],
        )
        .unwrap();
        assert_eq!(table.filter_machine("A").unwrap(), table);
    }

    #[test]
    fn test_feature_columns_exclude_label_target_and_id() {
        let table = sample_table();
        assert_eq!(table.feature_names(), vec!["vibration", "operating_mode_idle"]);
        assert_eq!(table.feature_row(1).unwrap(), vec![0.2, 0.0]);

        let matrix = table.feature_matrix();
        assert_eq!(matrix.shape(), &[3, 2]);
        assert_eq!(matrix[[2, 0]], 0.3);
    }

    #[test]
    fn test_feature_row_out_of_range() {
        let table = sample_table();
        assert!(matches!(
            table.feature_row(3),
            Err(FeatureStoreError::RowOutOfRange { index: 3, len: 3 })
        ));
    }

    #[test]
    fn test_length_mismatch() {
        let result = FeatureTable::from_columns(
            Some(vec!["A".into()]),
            vec![NumericColumn::new("failure_label", vec![1.0, 0.0])],
        );
        assert!(matches!(result, Err(FeatureStoreError::LengthMismatch { .. })));
    }

    #[test]
    fn test_missing_column() {
        let table = FeatureTable::from_columns(None, vec![NumericColumn::new("x", vec![1.0])]).unwrap();
        assert!(matches!(table.column("failure_label"), Err(FeatureStoreError::MissingColumn(_))));
        assert!(table.machine_ids().is_err());
    }
}
