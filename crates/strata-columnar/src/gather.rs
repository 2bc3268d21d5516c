#![forbid(unsafe_code)]

use crate::bitmap::BitVec;
use crate::column::Column;
use crate::error::{ColumnError, ColumnResult};
use crate::table::Table;
use crate::types::DataType;

impl Column {
    /// Copy rows `indices` (logical, in order, repeats allowed) into a new column.
    ///
    /// The result starts at offset zero. Nullable inputs stay nullable even if
    /// every gathered row is valid.
    pub fn gather(&self, indices: &[usize]) -> ColumnResult<Column> {
        if let Some(&index) = indices.iter().find(|&&i| i >= self.len()) {
            return Err(ColumnError::IndexOutOfBounds {
                index,
                len: self.len(),
            });
        }

        let validity = self
            .validity()
            .map(|_| indices.iter().map(|&i| self.is_valid(i)).collect::<BitVec>());

        match self.data_type() {
            DataType::Struct(_) => {
                let shifted: Vec<usize> = indices.iter().map(|&i| self.offset() + i).collect();
                let fields = self
                    .children()
                    .iter()
                    .map(|field| field.gather(&shifted))
                    .collect::<ColumnResult<Vec<_>>>()?;
                Column::new_struct(indices.len(), fields, validity)
            }
            DataType::List(_) => {
                let (Some(offsets), Some(values)) = (self.list_offsets(), self.list_values())
                else {
                    return Err(ColumnError::UnexpectedType {
                        expected: "list",
                        actual: self.data_type().clone(),
                    });
                };

                let mut new_offsets = Vec::with_capacity(indices.len() + 1);
                let mut child_rows = Vec::new();
                new_offsets.push(0i32);
                for &i in indices {
                    let (start, end) = (offsets[i] as usize, offsets[i + 1] as usize);
                    child_rows.extend(start..end);
                    let next = i32::try_from(child_rows.len()).map_err(|_| {
                        ColumnError::InvalidOffsets(format!(
                            "gathered list needs {} child elements",
                            child_rows.len()
                        ))
                    })?;
                    new_offsets.push(next);
                }

                Column::new_list(new_offsets, values.gather(&child_rows)?, validity)
            }
            data_type => Ok(Column::from_parts(
                data_type.clone(),
                indices.len(),
                self.data().gather(self.offset(), indices),
                validity,
            )),
        }
    }
}

/// Gather the same rows from every column of `table`.
pub fn gather(table: &Table, indices: &[usize]) -> ColumnResult<Table> {
    let columns = table
        .columns()
        .iter()
        .map(|column| column.gather(indices))
        .collect::<ColumnResult<Vec<_>>>()?;
    Ok(Table::from_columns_unchecked(columns, indices.len()))
}
