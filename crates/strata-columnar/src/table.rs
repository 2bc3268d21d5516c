#![forbid(unsafe_code)]

use crate::builder::ColumnBuilder;
use crate::column::Column;
use crate::error::{ColumnError, ColumnResult};
use crate::types::{DataType, Value};

/// An ordered set of equally long columns.
///
/// A table with no columns has zero rows.
#[derive(Clone, Debug)]
pub struct Table {
    columns: Vec<Column>,
    rows: usize,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> ColumnResult<Self> {
        let rows = columns.first().map_or(0, Column::len);
        if let Some(bad) = columns.iter().find(|c| c.len() != rows) {
            return Err(ColumnError::LengthMismatch {
                expected: rows,
                actual: bad.len(),
            });
        }
        Ok(Self { columns, rows })
    }

    pub(crate) fn from_columns_unchecked(columns: Vec<Column>, rows: usize) -> Self {
        debug_assert!(columns.iter().all(|c| c.len() == rows));
        let rows = if columns.is_empty() { 0 } else { rows };
        Self { columns, rows }
    }

    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: 0,
        }
    }

    pub fn num_rows(&self) -> usize {
        self.rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    pub fn data_types(&self) -> Vec<DataType> {
        self.columns.iter().map(|c| c.data_type().clone()).collect()
    }

    /// A view over the columns at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> ColumnResult<Self> {
        let columns = indices
            .iter()
            .map(|&index| {
                self.columns
                    .get(index)
                    .cloned()
                    .ok_or(ColumnError::ColumnOutOfBounds {
                        index,
                        columns: self.columns.len(),
                    })
            })
            .collect::<ColumnResult<Vec<_>>>()?;
        Ok(Self {
            columns,
            rows: self.rows,
        })
    }

    pub fn slice(&self, offset: usize, len: usize) -> ColumnResult<Self> {
        let end = offset + len;
        if end > self.rows {
            return Err(ColumnError::SliceOutOfBounds {
                offset,
                end,
                capacity: self.rows,
            });
        }
        let columns = self
            .columns
            .iter()
            .map(|c| c.slice(offset, len))
            .collect::<ColumnResult<Vec<_>>>()?;
        Ok(Self { columns, rows: len })
    }

    pub fn gather(&self, indices: &[usize]) -> ColumnResult<Self> {
        crate::gather::gather(self, indices)
    }

    pub fn row(&self, index: usize) -> ColumnResult<Vec<Value>> {
        if index >= self.rows {
            return Err(ColumnError::IndexOutOfBounds {
                index,
                len: self.rows,
            });
        }
        Ok(self.columns.iter().map(|c| c.value(index)).collect())
    }

    pub fn to_rows(&self) -> Vec<Vec<Value>> {
        (0..self.rows)
            .map(|row| self.columns.iter().map(|c| c.value(row)).collect())
            .collect()
    }
}

/// Row-oriented table construction against a fixed schema.
pub struct TableBuilder {
    builders: Vec<ColumnBuilder>,
    rows: usize,
}

impl TableBuilder {
    pub fn new(schema: Vec<DataType>) -> Self {
        let builders = schema.iter().map(ColumnBuilder::new).collect();
        Self { builders, rows: 0 }
    }

    pub fn append_row(&mut self, row: &[Value]) {
        assert_eq!(
            row.len(),
            self.builders.len(),
            "row length must match schema"
        );

        for (builder, value) in self.builders.iter_mut().zip(row.iter()) {
            builder.push(value);
        }
        self.rows += 1;
    }

    pub fn finalize(self) -> ColumnResult<Table> {
        let columns = self
            .builders
            .into_iter()
            .map(ColumnBuilder::finish)
            .collect::<ColumnResult<Vec<_>>>()?;
        Ok(Table::from_columns_unchecked(columns, self.rows))
    }
}
