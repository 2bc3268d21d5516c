//! Row addressing through nested column levels.
//!
//! A logical row of a nested column maps to a position in its leaf column by
//! walking down one level at a time:
//! - struct: the field element for row `i` lives at `struct.offset + i` of its child.
//! - list: row `i` starts at `offsets[i]` of the values child.

use strata_columnar::{Column, DataType};

/// Index into the leaf column of `column` where row `row_index` starts.
///
/// Struct columns are followed through their first field, so for comparator
/// inputs (single-child struct chains) this is the leaf that row's value lives
/// at. Lists resolve to their first element; an empty or null list resolves to
/// where its elements would start.
pub fn leaf_index(row_index: usize, column: &Column) -> usize {
    let mut index = row_index;
    let mut current = column;
    loop {
        match current.data_type() {
            DataType::Struct(_) => {
                let Some(child) = current.child(0) else {
                    return index;
                };
                index += current.offset();
                current = child;
            }
            DataType::List(_) => {
                let (Some(offsets), Some(values)) = (current.list_offsets(), current.list_values())
                else {
                    return index;
                };
                index = offsets[index] as usize;
                current = values;
            }
            _ => return index,
        }
    }
}

/// The column [`leaf_index`] resolves into.
pub fn leaf_column(column: &Column) -> &Column {
    let mut current = column;
    loop {
        let next = match current.data_type() {
            DataType::Struct(_) => current.child(0),
            DataType::List(_) => current.list_values(),
            _ => None,
        };
        match next {
            Some(next) => current = next,
            None => return current,
        }
    }
}

/// Like [`leaf_index`], but only descends through list levels.
///
/// The result indexes [`list_leaf_column`], the first non-list descendant
/// (possibly a struct). Consecutive leaf slots of one list row are consecutive
/// indices there.
pub fn list_leaf_index(row_index: usize, column: &Column) -> usize {
    let mut index = row_index;
    let mut current = column;
    while let (Some(offsets), Some(values)) = (current.list_offsets(), current.list_values()) {
        index = offsets[index] as usize;
        current = values;
    }
    index
}

pub fn list_leaf_column(column: &Column) -> &Column {
    let mut current = column;
    while let Some(values) = current.list_values() {
        current = values;
    }
    current
}
