//! Lexicographic row comparison and row equality across one or two tables.

use crate::element::{ElementComparator, ElementEquality, PreparedColumn};
use crate::error::{RowError, RowResult};
use crate::types::{NanEquality, NullDepth, NullEquality, NullOrder, SortOrder};
use std::cmp::Ordering;
use std::sync::Arc;
use strata_columnar::{Column, Table};

/// Split a struct column into single-child struct chains, one per leaf path.
///
/// Each chain is tagged with the struct depth at which it branches away from
/// the previous chain. The first chain below a struct keeps the struct's own
/// depth; later fields branch one level down.
fn decompose(column: &Column, depth: u32, out: &mut Vec<(Column, u32)>) -> RowResult<()> {
    if !column.data_type().is_struct() || column.children().is_empty() {
        out.push((column.clone(), depth));
        return Ok(());
    }

    for (field_index, field) in column.children().iter().enumerate() {
        let mut paths = Vec::new();
        decompose(field, depth + 1, &mut paths)?;
        for (path_index, (path, path_depth)) in paths.into_iter().enumerate() {
            let branch = if field_index == 0 && path_index == 0 {
                depth
            } else {
                path_depth
            };
            out.push((column.struct_view(vec![path])?, branch));
        }
    }
    Ok(())
}

fn check_order_len(what: &'static str, actual: usize, expected: usize) -> RowResult<()> {
    if actual != 0 && actual != expected {
        return Err(RowError::OrderLengthMismatch {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}

/// A table's columns decomposed and prepared for repeated row comparisons.
///
/// Built once per comparison scope and shared read-only by every comparison.
#[derive(Debug)]
pub struct PreprocessedTable {
    columns: Vec<PreparedColumn>,
    branch_depths: Vec<u32>,
    column_order: Vec<SortOrder>,
    null_precedence: Vec<NullOrder>,
    /// Table column each decomposed column came from.
    sources: Vec<usize>,
    num_rows: usize,
}

impl PreprocessedTable {
    /// `column_order` and `null_precedence` are either empty (ascending, nulls
    /// before) or hold one entry per table column.
    pub fn new(
        table: &Table,
        column_order: &[SortOrder],
        null_precedence: &[NullOrder],
    ) -> RowResult<Self> {
        check_order_len("column_order", column_order.len(), table.num_columns())?;
        check_order_len(
            "null_precedence",
            null_precedence.len(),
            table.num_columns(),
        )?;

        let mut out = Self {
            columns: Vec::new(),
            branch_depths: Vec::new(),
            column_order: Vec::new(),
            null_precedence: Vec::new(),
            sources: Vec::new(),
            num_rows: table.num_rows(),
        };
        for (index, column) in table.columns().iter().enumerate() {
            let mut paths = Vec::new();
            decompose(column, 0, &mut paths)?;
            for (path, depth) in paths {
                out.columns.push(PreparedColumn::at(&path, index)?);
                out.branch_depths.push(depth);
                out.column_order
                    .push(column_order.get(index).copied().unwrap_or_default());
                out.null_precedence
                    .push(null_precedence.get(index).copied().unwrap_or_default());
                out.sources.push(index);
            }
        }

        log::trace!(
            "preprocessed {} columns into {} comparison columns over {} rows",
            table.num_columns(),
            out.columns.len(),
            out.num_rows
        );
        Ok(out)
    }

    /// Number of decomposed columns.
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn branch_depths(&self) -> &[u32] {
        &self.branch_depths
    }

    /// Table column index of every decomposed column.
    pub fn sources(&self) -> &[usize] {
        &self.sources
    }
}

fn check_compatible(lhs: &Table, rhs: &Table) -> RowResult<()> {
    if lhs.num_columns() != rhs.num_columns() {
        return Err(RowError::ColumnCountMismatch {
            lhs: lhs.num_columns(),
            rhs: rhs.num_columns(),
        });
    }
    for (column, (l, r)) in lhs.columns().iter().zip(rhs.columns()).enumerate() {
        if l.data_type() != r.data_type() {
            return Err(RowError::TypeMismatch {
                column,
                lhs: l.data_type().clone(),
                rhs: r.data_type().clone(),
            });
        }
    }
    Ok(())
}

/// Strict weak ordering over rows of a left and a right table.
#[derive(Clone, Debug)]
pub struct RowComparator {
    lhs: Arc<PreprocessedTable>,
    rhs: Arc<PreprocessedTable>,
}

/// Build a comparator for rows of `lhs` against rows of `rhs` (or of `lhs`
/// itself when `rhs` is `None`).
pub fn build_row_comparator(
    lhs: &Table,
    rhs: Option<&Table>,
    column_order: &[SortOrder],
    null_precedence: &[NullOrder],
) -> RowResult<RowComparator> {
    let left = Arc::new(PreprocessedTable::new(lhs, column_order, null_precedence)?);
    let right = match rhs {
        Some(rhs) => {
            check_compatible(lhs, rhs)?;
            Arc::new(PreprocessedTable::new(rhs, column_order, null_precedence)?)
        }
        None => Arc::clone(&left),
    };
    Ok(RowComparator {
        lhs: left,
        rhs: right,
    })
}

impl RowComparator {
    /// Compare row `lhs_row` of the left table with row `rhs_row` of the right.
    pub fn compare(&self, lhs_row: usize, rhs_row: usize) -> Ordering {
        let mut last_null_depth: NullDepth = None;
        for (i, (l, r)) in self.lhs.columns.iter().zip(&self.rhs.columns).enumerate() {
            // A null in a shallower struct already decided every deeper field of it.
            if matches!(last_null_depth, Some(last) if self.lhs.branch_depths[i] > last) {
                continue;
            }

            let element = ElementComparator::new(l, r, self.lhs.null_precedence[i]);
            let (ord, null_depth) = element.compare(lhs_row, rhs_row);
            if ord != Ordering::Equal {
                return match self.lhs.column_order[i] {
                    SortOrder::Ascending => ord,
                    SortOrder::Descending => ord.reverse(),
                };
            }
            last_null_depth = null_depth;
        }
        Ordering::Equal
    }

    pub fn less(&self, lhs_row: usize, rhs_row: usize) -> bool {
        self.compare(lhs_row, rhs_row) == Ordering::Less
    }

    pub fn lhs(&self) -> &PreprocessedTable {
        &self.lhs
    }

    pub fn rhs(&self) -> &PreprocessedTable {
        &self.rhs
    }
}

/// Row equality over a left and a right table.
#[derive(Clone, Debug)]
pub struct RowEquality {
    lhs: Arc<PreprocessedTable>,
    rhs: Arc<PreprocessedTable>,
    nulls: NullEquality,
    nans: NanEquality,
}

pub fn build_row_equality(
    lhs: &Table,
    rhs: Option<&Table>,
    nulls: NullEquality,
    nans: NanEquality,
) -> RowResult<RowEquality> {
    let left = Arc::new(PreprocessedTable::new(lhs, &[], &[])?);
    let right = match rhs {
        Some(rhs) => {
            check_compatible(lhs, rhs)?;
            Arc::new(PreprocessedTable::new(rhs, &[], &[])?)
        }
        None => Arc::clone(&left),
    };
    Ok(RowEquality {
        lhs: left,
        rhs: right,
        nulls,
        nans,
    })
}

impl RowEquality {
    pub fn equal(&self, lhs_row: usize, rhs_row: usize) -> bool {
        self.lhs
            .columns
            .iter()
            .zip(&self.rhs.columns)
            .all(|(l, r)| ElementEquality::new(l, r, self.nulls, self.nans).equal(lhs_row, rhs_row))
    }

    pub fn null_equality(&self) -> NullEquality {
        self.nulls
    }
}
