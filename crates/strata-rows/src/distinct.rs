//! Hash-based duplicate elimination over key columns.
//!
//! Phases, each a full barrier:
//! 1. hash every key row;
//! 2. insert every row into a [`ConcurrentRowMap`], which yields each row's
//!    group owner (the canonical row of its equality class);
//! 3. for `First`/`Last`/`None`, reduce each group into the owner's slot with
//!    an atomic min/max/increment;
//! 4. compact the set slots into the output indices.

use crate::error::{try_vec, RowError, RowResult};
use crate::hash::RowHasher;
use crate::parallel::{ExecConfig, Executor};
use crate::row::build_row_equality;
use crate::row_map::ConcurrentRowMap;
use crate::types::{KeepPolicy, NanEquality, NullEquality};
use std::sync::atomic::{AtomicUsize, Ordering};
use strata_columnar::{gather, Table};

/// Unset marker of the `First` reduction buffer.
const UNSET_FIRST: usize = usize::MAX;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DistinctOptions {
    pub keep: KeepPolicy,
    pub null_equality: NullEquality,
    pub nan_equality: NanEquality,
    pub exec: ExecConfig,
}

/// Indices of the rows that survive distinct on `keys`.
///
/// The result holds one index per distinct key tuple (for [`KeepPolicy::None`],
/// one per key tuple that occurs exactly once). Its order is unspecified; see
/// [`stable_distinct`] for input order.
pub fn distinct_row_indices(
    table: &Table,
    keys: &[usize],
    keep: KeepPolicy,
    null_equality: NullEquality,
) -> RowResult<Vec<usize>> {
    distinct_row_indices_with(
        table,
        keys,
        &DistinctOptions {
            keep,
            null_equality,
            ..DistinctOptions::default()
        },
    )
}

pub fn distinct_row_indices_with(
    table: &Table,
    keys: &[usize],
    options: &DistinctOptions,
) -> RowResult<Vec<usize>> {
    if keys.is_empty() || table.num_columns() == 0 {
        return Ok(Vec::new());
    }
    if let Some(&index) = keys.iter().find(|&&k| k >= table.num_columns()) {
        return Err(RowError::KeyOutOfBounds {
            index,
            columns: table.num_columns(),
        });
    }
    let rows = table.num_rows();
    if rows == 0 {
        return Ok(Vec::new());
    }

    let key_table = table.select(keys)?;
    let equality = build_row_equality(
        &key_table,
        None,
        options.null_equality,
        options.nan_equality,
    )?;
    let hasher = RowHasher::new(&key_table);
    let exec = Executor::new(&options.exec, rows);

    let hashes = exec.map("row hashes", rows, |row| hasher.hash_row(row))?;
    let map = ConcurrentRowMap::with_capacity(rows, options.exec.load_factor())?;
    log::debug!(
        "distinct: {rows} rows, {} key columns, map capacity {}, keep {:?}, {}",
        keys.len(),
        map.capacity(),
        options.keep,
        if exec.is_parallel() { "parallel" } else { "serial" }
    );

    let groups = exec.map("row groups", rows, |row| {
        map.insert(row, hashes[row], |a, b| {
            hashes[a] == hashes[b] && equality.equal(a, b)
        })
    })?;
    drop(map);

    let survivors = match options.keep {
        KeepPolicy::Any => exec.filter_map(rows, |row| (groups[row] == row).then_some(row)),
        KeepPolicy::First => {
            let best = atomic_buffer(rows, UNSET_FIRST)?;
            exec.for_each(rows, |row| {
                best[groups[row]].fetch_min(row, Ordering::Relaxed);
            });
            exec.filter_map(rows, |slot| {
                let row = best[slot].load(Ordering::Relaxed);
                (row != UNSET_FIRST).then_some(row)
            })
        }
        KeepPolicy::Last => {
            // Stores `row + 1` so that 0 can mean unset.
            let best = atomic_buffer(rows, 0)?;
            exec.for_each(rows, |row| {
                best[groups[row]].fetch_max(row + 1, Ordering::Relaxed);
            });
            exec.filter_map(rows, |slot| best[slot].load(Ordering::Relaxed).checked_sub(1))
        }
        KeepPolicy::None => {
            let counts = atomic_buffer(rows, 0)?;
            exec.for_each(rows, |row| {
                counts[groups[row]].fetch_add(1, Ordering::Relaxed);
            });
            exec.filter_map(rows, |slot| {
                (counts[slot].load(Ordering::Relaxed) == 1).then_some(slot)
            })
        }
    };

    log::debug!("distinct: {} of {rows} rows survive", survivors.len());
    Ok(survivors)
}

fn atomic_buffer(len: usize, init: usize) -> RowResult<Vec<AtomicUsize>> {
    let mut out = try_vec("distinct reduction buffer", len)?;
    out.extend((0..len).map(|_| AtomicUsize::new(init)));
    Ok(out)
}

/// The surviving rows of `table`, in unspecified order.
pub fn distinct(
    table: &Table,
    keys: &[usize],
    keep: KeepPolicy,
    null_equality: NullEquality,
) -> RowResult<Table> {
    let indices = distinct_row_indices(table, keys, keep, null_equality)?;
    Ok(gather(table, &indices)?)
}

/// The surviving rows of `table`, in their original order.
pub fn stable_distinct(
    table: &Table,
    keys: &[usize],
    keep: KeepPolicy,
    null_equality: NullEquality,
) -> RowResult<Table> {
    let mut indices = distinct_row_indices(table, keys, keep, null_equality)?;
    indices.sort_unstable();
    Ok(gather(table, &indices)?)
}

/// Number of distinct rows of `table` over all of its columns.
pub fn distinct_count(
    table: &Table,
    null_equality: NullEquality,
    nan_equality: NanEquality,
) -> RowResult<usize> {
    let keys: Vec<usize> = (0..table.num_columns()).collect();
    let indices = distinct_row_indices_with(
        table,
        &keys,
        &DistinctOptions {
            keep: KeepPolicy::Any,
            null_equality,
            nan_equality,
            exec: ExecConfig::default(),
        },
    )?;
    Ok(indices.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_columnar::Column;

    fn sorted(mut v: Vec<usize>) -> Vec<usize> {
        v.sort_unstable();
        v
    }

    #[test]
    fn keep_policies_on_small_keys() {
        let table = Table::new(vec![Column::from_vec(vec![1i32, 2, 1, 3, 2, 1])]).unwrap();
        let run = |keep| sorted(distinct_row_indices(&table, &[0], keep, NullEquality::Equal).unwrap());

        assert_eq!(run(KeepPolicy::First), vec![0, 1, 3]);
        assert_eq!(run(KeepPolicy::Last), vec![3, 4, 5]);
        assert_eq!(run(KeepPolicy::None), vec![3]);
        assert_eq!(run(KeepPolicy::Any).len(), 3);
    }

    #[test]
    fn last_keeps_row_zero_of_singleton_groups() {
        let table = Table::new(vec![Column::from_vec(vec![9u8, 1, 1])]).unwrap();
        let last = distinct_row_indices(&table, &[0], KeepPolicy::Last, NullEquality::Equal)
            .unwrap();
        assert_eq!(sorted(last), vec![0, 2]);
    }

    #[test]
    fn key_bounds_are_checked_before_row_count() {
        let table = Table::new(vec![Column::from_vec(Vec::<i64>::new())]).unwrap();
        assert_eq!(
            distinct_row_indices(&table, &[1], KeepPolicy::Any, NullEquality::Equal)
                .unwrap_err(),
            RowError::KeyOutOfBounds {
                index: 1,
                columns: 1
            }
        );
        assert!(
            distinct_row_indices(&table, &[0], KeepPolicy::Any, NullEquality::Equal)
                .unwrap()
                .is_empty()
        );
    }
}
