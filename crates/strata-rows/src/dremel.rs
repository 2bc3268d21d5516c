//! Repetition/definition level encoding of list columns.
//!
//! Every item transitively contained in a list row (a leaf value, a null leaf,
//! or an empty/null list at some depth) becomes one `(rep, def)` pair.
//!
//! Levels depend on the type shape only, so two columns of the same type always
//! produce comparable levels regardless of which levels happen to be nullable.
//! For a column with `n` list levels:
//! - list at depth `k` (0-based) is null: `def = 2k`
//! - list at depth `k` is empty: `def = 2k + 1`
//! - leaf is null: `def = 2n`
//! - leaf is present: `def = 2n + 1`
//!
//! Even definition levels are nulls. The repetition level of the first item of
//! a row is 0; later items carry the depth at which a new element begins.

use crate::error::{try_vec, RowError, RowResult};
use strata_columnar::{Column, ColumnError};

/// Deepest list nesting whose levels fit in a `u8`.
pub const MAX_LIST_DEPTH: usize = 127;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DremelData {
    /// `rows + 1` offsets into the level arrays.
    pub offsets: Vec<usize>,
    pub rep_levels: Vec<u8>,
    pub def_levels: Vec<u8>,
    /// Number of items with `def >= leaf_def_level`, i.e. leaf slots.
    pub leaf_data_size: usize,
    /// Definition level of a null leaf.
    pub leaf_def_level: u8,
    /// Definition level of a present leaf.
    pub max_def_level: u8,
}

impl DremelData {
    /// Encode every row of the list column `column`.
    pub fn encode(column: &Column) -> RowResult<Self> {
        if !column.data_type().is_list() {
            return Err(ColumnError::UnexpectedType {
                expected: "list",
                actual: column.data_type().clone(),
            }
            .into());
        }
        let depth = column.data_type().list_depth();
        if depth > MAX_LIST_DEPTH {
            return Err(RowError::NestingTooDeep {
                depth,
                max: MAX_LIST_DEPTH,
            });
        }

        let mut offsets = try_vec("dremel offsets", column.len() + 1)?;
        offsets.push(0);
        let items: usize = (0..column.len())
            .map(|row| count_items(column, row, 0, depth))
            .sum();
        let mut encoder = Encoder {
            depth,
            rep_levels: try_vec("dremel rep levels", items)?,
            def_levels: try_vec("dremel def levels", items)?,
            leaf_data_size: 0,
        };
        for row in 0..column.len() {
            encoder.item(column, row, 0, 0);
            offsets.push(encoder.rep_levels.len());
        }

        Ok(Self {
            offsets,
            rep_levels: encoder.rep_levels,
            def_levels: encoder.def_levels,
            leaf_data_size: encoder.leaf_data_size,
            leaf_def_level: (2 * depth) as u8,
            max_def_level: (2 * depth + 1) as u8,
        })
    }

    pub fn num_rows(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Range of level entries belonging to `row`.
    pub fn row_range(&self, row: usize) -> std::ops::Range<usize> {
        self.offsets[row]..self.offsets[row + 1]
    }
}

/// Number of level entries element `index` of `column` expands to.
fn count_items(column: &Column, index: usize, level: usize, depth: usize) -> usize {
    if level == depth || column.is_null(index) {
        return 1;
    }
    match (column.list_range(index), column.list_values()) {
        (Some(range), Some(values)) if !range.is_empty() => range
            .map(|child| count_items(values, child, level + 1, depth))
            .sum(),
        _ => 1,
    }
}

struct Encoder {
    depth: usize,
    rep_levels: Vec<u8>,
    def_levels: Vec<u8>,
    leaf_data_size: usize,
}

impl Encoder {
    fn push(&mut self, rep: usize, def: usize) {
        self.rep_levels.push(rep as u8);
        self.def_levels.push(def as u8);
    }

    /// Emit the items of element `index` of `column`, which sits at list depth `level`.
    fn item(&mut self, column: &Column, index: usize, level: usize, rep: usize) {
        if level == self.depth {
            let def = if column.is_valid(index) {
                2 * level + 1
            } else {
                2 * level
            };
            self.push(rep, def);
            self.leaf_data_size += 1;
            return;
        }

        if column.is_null(index) {
            self.push(rep, 2 * level);
            return;
        }
        let (Some(range), Some(values)) = (column.list_range(index), column.list_values()) else {
            // Validated list columns always carry offsets and values.
            self.push(rep, 2 * level);
            return;
        };
        if range.is_empty() {
            self.push(rep, 2 * level + 1);
            return;
        }
        for (pos, child) in range.enumerate() {
            let child_rep = if pos == 0 { rep } else { level + 1 };
            self.item(values, child, level + 1, child_rep);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use strata_columnar::{DataType, Value};

    fn list(values: Vec<Value>) -> Value {
        Value::List(values)
    }

    #[test]
    fn encodes_single_level_lists() {
        let column = Column::from_values(
            &DataType::list(DataType::Int32),
            &[
                list(vec![Value::Int(1), Value::Null, Value::Int(3)]),
                Value::Null,
                list(vec![]),
                list(vec![Value::Int(4)]),
            ],
        )
        .unwrap();

        let dremel = DremelData::encode(&column).unwrap();
        assert_eq!(dremel.offsets, vec![0, 3, 4, 5, 6]);
        assert_eq!(dremel.rep_levels, vec![0, 1, 1, 0, 0, 0]);
        assert_eq!(dremel.def_levels, vec![3, 2, 3, 0, 1, 3]);
        assert_eq!(dremel.leaf_data_size, 4);
        assert_eq!((dremel.leaf_def_level, dremel.max_def_level), (2, 3));
    }

    #[test]
    fn encodes_nested_lists() {
        // [[1, 2], [], null, [3]]
        let column = Column::from_values(
            &DataType::list(DataType::list(DataType::Int64)),
            &[list(vec![
                list(vec![Value::Int(1), Value::Int(2)]),
                list(vec![]),
                Value::Null,
                list(vec![Value::Int(3)]),
            ])],
        )
        .unwrap();

        let dremel = DremelData::encode(&column).unwrap();
        assert_eq!(dremel.rep_levels, vec![0, 2, 1, 1, 1]);
        assert_eq!(dremel.def_levels, vec![5, 5, 3, 2, 5]);
        assert_eq!(dremel.leaf_data_size, 3);
        assert_eq!(dremel.row_range(0), 0..5);
    }

    #[test]
    fn item_count_matches_emitted_levels() {
        let column = Column::from_values(
            &DataType::list(DataType::list(DataType::Int32)),
            &[
                list(vec![list(vec![Value::Int(1), Value::Null]), list(vec![])]),
                Value::Null,
                list(vec![]),
                list(vec![Value::Null, list(vec![Value::Int(2)])]),
            ],
        )
        .unwrap();

        let dremel = DremelData::encode(&column).unwrap();
        for row in 0..column.len() {
            assert_eq!(count_items(&column, row, 0, 2), dremel.row_range(row).len());
        }
        assert_eq!(dremel.def_levels, vec![5, 4, 3, 0, 1, 2, 5]);
    }

    #[test]
    fn sliced_columns_encode_only_their_rows() {
        let column = Column::from_values(
            &DataType::list(DataType::Utf8),
            &[
                list(vec![Value::string("a")]),
                list(vec![Value::string("b"), Value::string("c")]),
            ],
        )
        .unwrap()
        .slice(1, 1)
        .unwrap();

        let dremel = DremelData::encode(&column).unwrap();
        assert_eq!(dremel.num_rows(), 1);
        assert_eq!(dremel.rep_levels, vec![0, 1]);
        assert_eq!(dremel.def_levels, vec![3, 3]);
    }

    #[test]
    fn rejects_non_list_columns() {
        let err = DremelData::encode(&Column::from_vec(vec![1i8])).unwrap_err();
        assert!(matches!(
            err,
            RowError::Column(ColumnError::UnexpectedType {
                expected: "list",
                ..
            })
        ));
    }
}
