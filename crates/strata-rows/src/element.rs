//! Element-level comparison and equality.
//!
//! A [`PreparedColumn`] is a column checked against its type tags plus the
//! Dremel levels of the list it ends in (if any). Comparators pair one prepared
//! column from each side and answer per-row questions without allocating.

use crate::addressing::{list_leaf_column, list_leaf_index};
use crate::dremel::DremelData;
use crate::error::{RowError, RowResult};
use crate::types::{NanEquality, NullDepth, NullEquality, NullOrder};
use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use strata_columnar::{Column, DataType, Scalar};

/// Levels of the list a struct chain ends in.
#[derive(Clone, Debug)]
struct ListLevels {
    list: Column,
    dremel: DremelData,
}

#[derive(Clone, Debug)]
pub struct PreparedColumn {
    column: Column,
    list: Option<ListLevels>,
}

impl PreparedColumn {
    pub fn new(column: &Column) -> RowResult<Self> {
        Self::at(column, 0)
    }

    /// Prepare table column `index`; errors name that index.
    pub(crate) fn at(column: &Column, index: usize) -> RowResult<Self> {
        validate(column).map_err(|reason| RowError::Uncomparable {
            column: index,
            data_type: column.data_type().clone(),
            reason,
        })?;

        // Follow the struct chain down to the column that decides the comparison.
        let mut terminal = column;
        while terminal.data_type().is_struct() {
            match terminal.child(0) {
                Some(child) => terminal = child,
                None => break,
            }
        }
        let list = if terminal.data_type().is_list() {
            Some(ListLevels {
                list: terminal.clone(),
                dremel: DremelData::encode(terminal)?,
            })
        } else {
            None
        };

        Ok(Self {
            column: column.clone(),
            list,
        })
    }
}

/// Check every buffer and child against the type tags so comparison kernels
/// never meet a leaf pair they cannot order.
fn validate(column: &Column) -> Result<(), String> {
    if !column.data().matches(column.data_type()) {
        return Err(format!("buffer does not hold {}", column.data_type()));
    }
    if let Some(capacity) = column.data().capacity() {
        if column.offset() + column.len() > capacity {
            return Err(format!(
                "view {}..{} exceeds buffer of {capacity}",
                column.offset(),
                column.offset() + column.len()
            ));
        }
    }
    if let Some(validity) = column.validity() {
        if column.offset() + column.len() > validity.len() {
            return Err("validity bitmap shorter than the column view".to_owned());
        }
    }

    match column.data_type() {
        DataType::List(element) => {
            let offsets = column
                .list_offsets()
                .ok_or_else(|| "list is missing its offsets".to_owned())?;
            let values = column
                .list_values()
                .ok_or_else(|| "list is missing its values".to_owned())?;
            if values.data_type() != element.as_ref() {
                return Err(format!("list values are {}", values.data_type()));
            }
            if offsets.windows(2).any(|w| w[1] < w[0])
                || offsets.first().is_some_and(|&o| o < 0)
                || offsets.last().is_some_and(|&o| o as usize > values.len())
            {
                return Err("list offsets are not monotonic within the values".to_owned());
            }
            validate(values)
        }
        DataType::Struct(fields) => {
            if fields.len() != column.children().len() {
                return Err(format!(
                    "struct declares {} fields but has {} children",
                    fields.len(),
                    column.children().len()
                ));
            }
            for (field, child) in fields.iter().zip(column.children()) {
                if field != child.data_type() {
                    return Err(format!("struct field is {}", child.data_type()));
                }
                if child.len() < column.offset() + column.len() {
                    return Err("struct field shorter than its parent".to_owned());
                }
                validate(child)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn null_ordering(lhs_valid: bool, rhs_valid: bool, null_order: NullOrder) -> Ordering {
    match (lhs_valid, rhs_valid, null_order) {
        (false, false, _) | (true, true, _) => Ordering::Equal,
        (false, true, NullOrder::Before) | (true, false, NullOrder::After) => Ordering::Less,
        (false, true, NullOrder::After) | (true, false, NullOrder::Before) => Ordering::Greater,
    }
}

pub(crate) fn compare_scalars(lhs: Scalar<'_>, rhs: Scalar<'_>) -> Ordering {
    match (lhs, rhs) {
        (Scalar::Boolean(a), Scalar::Boolean(b)) => a.cmp(&b),
        (Scalar::Int8(a), Scalar::Int8(b)) => a.cmp(&b),
        (Scalar::Int16(a), Scalar::Int16(b)) => a.cmp(&b),
        (Scalar::Int32(a), Scalar::Int32(b)) => a.cmp(&b),
        (Scalar::Int64(a), Scalar::Int64(b)) => a.cmp(&b),
        (Scalar::UInt8(a), Scalar::UInt8(b)) => a.cmp(&b),
        (Scalar::UInt16(a), Scalar::UInt16(b)) => a.cmp(&b),
        (Scalar::UInt32(a), Scalar::UInt32(b)) => a.cmp(&b),
        (Scalar::UInt64(a), Scalar::UInt64(b)) => a.cmp(&b),
        (Scalar::Float32(a), Scalar::Float32(b)) => OrderedFloat(a).cmp(&OrderedFloat(b)),
        (Scalar::Float64(a), Scalar::Float64(b)) => OrderedFloat(a).cmp(&OrderedFloat(b)),
        (Scalar::Utf8(a), Scalar::Utf8(b)) => a.cmp(b),
        (lhs, rhs) => unreachable!("uncomparable leaf pair {lhs:?} / {rhs:?}"),
    }
}

pub(crate) fn scalars_equal(lhs: Scalar<'_>, rhs: Scalar<'_>, nans: NanEquality) -> bool {
    match (lhs, rhs) {
        (Scalar::Float32(a), Scalar::Float32(b)) => floats_equal(a as f64, b as f64, nans),
        (Scalar::Float64(a), Scalar::Float64(b)) => floats_equal(a, b, nans),
        (lhs, rhs) => compare_scalars(lhs, rhs) == Ordering::Equal,
    }
}

fn floats_equal(a: f64, b: f64, nans: NanEquality) -> bool {
    if a.is_nan() && b.is_nan() {
        return nans == NanEquality::AllEqual;
    }
    a == b
}

fn leaf_pair<'a>(
    lhs: &'a Column,
    lhs_index: usize,
    rhs: &'a Column,
    rhs_index: usize,
) -> (Scalar<'a>, Scalar<'a>) {
    match (lhs.scalar(lhs_index), rhs.scalar(rhs_index)) {
        (Some(l), Some(r)) => (l, r),
        _ => unreachable!("nested column reached as a leaf"),
    }
}

/// Lexicographic comparison of arbitrary nested values.
///
/// Used for the elements inside a list, which are compared as whole values.
fn compare_values(
    lhs: &Column,
    lhs_index: usize,
    rhs: &Column,
    rhs_index: usize,
    null_order: NullOrder,
) -> Ordering {
    let (lv, rv) = (lhs.is_valid(lhs_index), rhs.is_valid(rhs_index));
    if !lv || !rv {
        return null_ordering(lv, rv, null_order);
    }
    match lhs.data_type() {
        DataType::Struct(_) => {
            for (lf, rf) in lhs.children().iter().zip(rhs.children()) {
                let ord = compare_values(
                    lf,
                    lhs.offset() + lhs_index,
                    rf,
                    rhs.offset() + rhs_index,
                    null_order,
                );
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        }
        DataType::List(_) => {
            let (Some(lr), Some(rr), Some(lvals), Some(rvals)) = (
                lhs.list_range(lhs_index),
                rhs.list_range(rhs_index),
                lhs.list_values(),
                rhs.list_values(),
            ) else {
                unreachable!("validated list without children");
            };
            let (llen, rlen) = (lr.len(), rr.len());
            for (a, b) in lr.zip(rr) {
                let ord = compare_values(lvals, a, rvals, b, null_order);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            llen.cmp(&rlen)
        }
        _ => {
            let (l, r) = leaf_pair(lhs, lhs_index, rhs, rhs_index);
            compare_scalars(l, r)
        }
    }
}

fn values_equal(
    lhs: &Column,
    lhs_index: usize,
    rhs: &Column,
    rhs_index: usize,
    nulls: NullEquality,
    nans: NanEquality,
) -> bool {
    let (lv, rv) = (lhs.is_valid(lhs_index), rhs.is_valid(rhs_index));
    if !lv || !rv {
        return !lv && !rv && nulls == NullEquality::Equal;
    }
    match lhs.data_type() {
        DataType::Struct(_) => lhs.children().iter().zip(rhs.children()).all(|(lf, rf)| {
            values_equal(
                lf,
                lhs.offset() + lhs_index,
                rf,
                rhs.offset() + rhs_index,
                nulls,
                nans,
            )
        }),
        DataType::List(_) => {
            let (Some(lr), Some(rr), Some(lvals), Some(rvals)) = (
                lhs.list_range(lhs_index),
                rhs.list_range(rhs_index),
                lhs.list_values(),
                rhs.list_values(),
            ) else {
                unreachable!("validated list without children");
            };
            lr.len() == rr.len()
                && lr
                    .zip(rr)
                    .all(|(a, b)| values_equal(lvals, a, rvals, b, nulls, nans))
        }
        _ => {
            let (l, r) = leaf_pair(lhs, lhs_index, rhs, rhs_index);
            scalars_equal(l, r, nans)
        }
    }
}

/// Orders one row of `lhs` against one row of `rhs`.
#[derive(Clone, Copy, Debug)]
pub struct ElementComparator<'a> {
    lhs: &'a PreparedColumn,
    rhs: &'a PreparedColumn,
    null_order: NullOrder,
}

impl<'a> ElementComparator<'a> {
    /// Both sides must have the same [`DataType`].
    pub fn new(lhs: &'a PreparedColumn, rhs: &'a PreparedColumn, null_order: NullOrder) -> Self {
        debug_assert_eq!(lhs.column.data_type(), rhs.column.data_type());
        Self {
            lhs,
            rhs,
            null_order,
        }
    }

    /// Ascending order of the two elements and, if a null decided it, the
    /// struct depth of that null.
    pub fn compare(&self, lhs_index: usize, rhs_index: usize) -> (Ordering, NullDepth) {
        let (mut lcol, mut rcol) = (&self.lhs.column, &self.rhs.column);
        let (mut li, mut ri) = (lhs_index, rhs_index);
        let mut depth = 0u32;
        loop {
            let (lv, rv) = (lcol.is_valid(li), rcol.is_valid(ri));
            if !lv || !rv {
                return (null_ordering(lv, rv, self.null_order), Some(depth));
            }
            match lcol.data_type() {
                DataType::Struct(_) => match (lcol.child(0), rcol.child(0)) {
                    (Some(lc), Some(rc)) => {
                        li += lcol.offset();
                        ri += rcol.offset();
                        lcol = lc;
                        rcol = rc;
                        depth += 1;
                    }
                    _ => return (Ordering::Equal, None),
                },
                DataType::List(_) => return (self.compare_lists(li, ri), None),
                _ => {
                    let (l, r) = leaf_pair(lcol, li, rcol, ri);
                    return (compare_scalars(l, r), None);
                }
            }
        }
    }

    /// Lock-step walk over the Dremel levels of two list rows.
    fn compare_lists(&self, lhs_row: usize, rhs_row: usize) -> Ordering {
        let (Some(ll), Some(rl)) = (&self.lhs.list, &self.rhs.list) else {
            unreachable!("list column prepared without levels");
        };
        let (ld, rd) = (&ll.dremel, &rl.dremel);
        let (lrange, rrange) = (ld.row_range(lhs_row), rd.row_range(rhs_row));
        let (llen, rlen) = (lrange.len(), rrange.len());

        let (lleaf_col, rleaf_col) = (list_leaf_column(&ll.list), list_leaf_column(&rl.list));
        let mut lleaf = list_leaf_index(lhs_row, &ll.list);
        let mut rleaf = list_leaf_index(rhs_row, &rl.list);

        for (li, ri) in lrange.zip(rrange) {
            let (lrep, rrep) = (ld.rep_levels[li], rd.rep_levels[ri]);
            if lrep != rrep {
                // The side whose element ended first is shorter at that depth.
                return lrep.cmp(&rrep);
            }
            let (ldef, rdef) = (ld.def_levels[li], rd.def_levels[ri]);
            if ldef != rdef {
                let ord = ldef.cmp(&rdef);
                let lower_is_null = ldef.min(rdef) % 2 == 0;
                return if lower_is_null && self.null_order == NullOrder::After {
                    ord.reverse()
                } else {
                    ord
                };
            }
            if ldef >= ld.leaf_def_level {
                if ldef == ld.max_def_level {
                    let ord = compare_values(lleaf_col, lleaf, rleaf_col, rleaf, self.null_order);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                lleaf += 1;
                rleaf += 1;
            }
        }
        llen.cmp(&rlen)
    }
}

/// Equality of one row of `lhs` against one row of `rhs`.
#[derive(Clone, Copy, Debug)]
pub struct ElementEquality<'a> {
    lhs: &'a PreparedColumn,
    rhs: &'a PreparedColumn,
    nulls: NullEquality,
    nans: NanEquality,
}

impl<'a> ElementEquality<'a> {
    pub fn new(
        lhs: &'a PreparedColumn,
        rhs: &'a PreparedColumn,
        nulls: NullEquality,
        nans: NanEquality,
    ) -> Self {
        debug_assert_eq!(lhs.column.data_type(), rhs.column.data_type());
        Self {
            lhs,
            rhs,
            nulls,
            nans,
        }
    }

    pub fn equal(&self, lhs_index: usize, rhs_index: usize) -> bool {
        let (mut lcol, mut rcol) = (&self.lhs.column, &self.rhs.column);
        let (mut li, mut ri) = (lhs_index, rhs_index);
        loop {
            let (lv, rv) = (lcol.is_valid(li), rcol.is_valid(ri));
            if !lv || !rv {
                return !lv && !rv && self.nulls == NullEquality::Equal;
            }
            match lcol.data_type() {
                DataType::Struct(_) => match (lcol.child(0), rcol.child(0)) {
                    (Some(lc), Some(rc)) => {
                        li += lcol.offset();
                        ri += rcol.offset();
                        lcol = lc;
                        rcol = rc;
                    }
                    _ => return true,
                },
                DataType::List(_) => return self.lists_equal(li, ri),
                _ => {
                    let (l, r) = leaf_pair(lcol, li, rcol, ri);
                    return scalars_equal(l, r, self.nans);
                }
            }
        }
    }

    fn lists_equal(&self, lhs_row: usize, rhs_row: usize) -> bool {
        let (Some(ll), Some(rl)) = (&self.lhs.list, &self.rhs.list) else {
            unreachable!("list column prepared without levels");
        };
        let (ld, rd) = (&ll.dremel, &rl.dremel);
        let (lrange, rrange) = (ld.row_range(lhs_row), rd.row_range(rhs_row));
        if lrange.len() != rrange.len() {
            return false;
        }

        let (lleaf_col, rleaf_col) = (list_leaf_column(&ll.list), list_leaf_column(&rl.list));
        let mut lleaf = list_leaf_index(lhs_row, &ll.list);
        let mut rleaf = list_leaf_index(rhs_row, &rl.list);

        for (li, ri) in lrange.zip(rrange) {
            let def = ld.def_levels[li];
            if ld.rep_levels[li] != rd.rep_levels[ri] || def != rd.def_levels[ri] {
                return false;
            }
            if def % 2 == 0 && self.nulls == NullEquality::Unequal {
                return false;
            }
            if def >= ld.leaf_def_level {
                if def == ld.max_def_level
                    && !values_equal(lleaf_col, lleaf, rleaf_col, rleaf, self.nulls, self.nans)
                {
                    return false;
                }
                lleaf += 1;
                rleaf += 1;
            }
        }
        true
    }
}
