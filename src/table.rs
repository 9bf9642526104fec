//! Metric tables (Arrow `RecordBatch`)
//!
//! Tables are built row by row from [`MetricRow`]s the way adapters log
//! them, then frozen into a columnar batch:
//! - column set is the union of every row's columns, in first-seen order
//! - index columns (`epoch`, `global_step`, `batch_idx`) become `Int64`
//! - metric columns become `Float64`
//! - cells missing from a row are null

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::compute;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};

use crate::keys::Column;
use crate::{Error, Result};

/// A metric table.
pub type Table = RecordBatch;

/// One logged row: an ordered set of column values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricRow {
    cells: Vec<(Column, f64)>,
}

impl MetricRow {
    /// Create an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, column: impl Into<Column>, value: f64) -> Self {
        self.set(column, value);
        self
    }

    /// Set a cell, replacing any previous value of the same column.
    pub fn set(&mut self, column: impl Into<Column>, value: f64) {
        let column = column.into();
        match self.cells.iter_mut().find(|(existing, _)| *existing == column) {
            Some(cell) => cell.1 = value,
            None => self.cells.push((column, value)),
        }
    }

    /// Get a cell value.
    #[must_use]
    pub fn get(&self, column: &Column) -> Option<f64> {
        self.cells
            .iter()
            .find(|(existing, _)| existing == column)
            .map(|(_, value)| *value)
    }

    /// Iterate cells in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Column, f64)> {
        self.cells.iter().map(|(column, value)| (column, *value))
    }

    /// Number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if the row has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<C: Into<Column>> FromIterator<(C, f64)> for MetricRow {
    fn from_iter<I: IntoIterator<Item = (C, f64)>>(iter: I) -> Self {
        let mut row = Self::new();
        for (column, value) in iter {
            row.set(column, value);
        }
        row
    }
}

/// Accumulates [`MetricRow`]s and freezes them into a [`Table`].
#[derive(Debug, Clone, Default)]
pub struct TableBuilder {
    columns: Vec<Column>,
    rows: Vec<MetricRow>,
}

impl TableBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row, extending the column set with any new columns.
    pub fn push_row(&mut self, row: MetricRow) {
        for (column, _) in row.iter() {
            if !self.columns.contains(column) {
                self.columns.push(column.clone());
            }
        }
        self.rows.push(row);
    }

    /// Number of rows pushed so far.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Columns seen so far, in first-seen order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Freeze the rows into a columnar table.
    ///
    /// # Errors
    ///
    /// Returns error if Arrow rejects the assembled batch
    #[allow(clippy::cast_possible_truncation)]
    pub fn build(self) -> Result<Table> {
        let mut fields = Vec::with_capacity(self.columns.len());
        let mut arrays: Vec<ArrayRef> = Vec::with_capacity(self.columns.len());

        for column in &self.columns {
            let cells = self.rows.iter().map(|row| row.get(column));
            if column.is_index() {
                fields.push(Field::new(column.as_str(), DataType::Int64, true));
                arrays.push(Arc::new(Int64Array::from(
                    cells.map(|cell| cell.map(|v| v as i64)).collect::<Vec<_>>(),
                )));
            } else {
                fields.push(Field::new(column.as_str(), DataType::Float64, true));
                arrays.push(Arc::new(Float64Array::from(cells.collect::<Vec<_>>())));
            }
        }

        let options = RecordBatchOptions::new().with_row_count(Some(self.rows.len()));
        Ok(RecordBatch::try_new_with_options(
            Arc::new(Schema::new(fields)),
            arrays,
            &options,
        )?)
    }
}

impl FromIterator<MetricRow> for TableBuilder {
    fn from_iter<I: IntoIterator<Item = MetricRow>>(iter: I) -> Self {
        let mut builder = Self::new();
        for row in iter {
            builder.push_row(row);
        }
        builder
    }
}

/// Assemble a table from named columns.
///
/// # Errors
///
/// Returns error if the arrays differ in length
pub fn from_columns(columns: Vec<(Column, ArrayRef)>) -> Result<Table> {
    let fields: Vec<Field> = columns
        .iter()
        .map(|(column, array)| Field::new(column.as_str(), array.data_type().clone(), true))
        .collect();
    let arrays = columns.into_iter().map(|(_, array)| array).collect();
    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
}

/// Single-row table of text cells (adapter metadata snapshots).
///
/// # Errors
///
/// Returns error if Arrow rejects the batch
pub fn text_row(cells: Vec<(Column, String)>) -> Result<Table> {
    from_columns(
        cells
            .into_iter()
            .map(|(column, text)| {
                let array: ArrayRef = Arc::new(StringArray::from(vec![text]));
                (column, array)
            })
            .collect(),
    )
}

/// Single-column `Float64` table.
///
/// # Errors
///
/// Returns error if Arrow rejects the batch
pub fn float_column(column: Column, values: Vec<Option<f64>>) -> Result<Table> {
    let array: ArrayRef = Arc::new(Float64Array::from(values));
    from_columns(vec![(column, array)])
}

/// Columns of a table, in schema order.
#[must_use]
pub fn columns(table: &Table) -> Vec<Column> {
    table
        .schema()
        .fields()
        .iter()
        .map(|field| Column::from_name(field.name()))
        .collect()
}

/// Read a column as `f64` values (integer columns are widened, nulls kept).
///
/// # Errors
///
/// Returns error if:
/// - The column does not exist
/// - The column cannot be cast to `Float64`
pub fn column_values(table: &Table, column: &Column) -> Result<Vec<Option<f64>>> {
    let array = table
        .column_by_name(column.as_str())
        .ok_or_else(|| Error::ColumnNotFound {
            column: column.to_string(),
            available: columns(table)
                .iter()
                .map(Column::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        })?;

    let widened = compute::cast(array, &DataType::Float64)?;
    let values = widened
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| Error::Other(format!("Column '{column}' did not cast to Float64")))?;

    Ok(values.iter().collect())
}
