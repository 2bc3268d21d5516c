//! Lock-free open-addressed set of row indices.

use crate::error::{try_vec, RowError, RowResult};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Marks an unoccupied slot. No row index can equal it: tables are indexed by
/// `usize` and [`ConcurrentRowMap::with_capacity`] rejects `usize::MAX` rows.
pub(crate) const EMPTY_SLOT: usize = usize::MAX;

/// Maps each row to the first-inserted row of its equality class.
///
/// Slots hold row indices and are claimed with compare-and-swap; probing is
/// linear. Capacity is a power of two strictly larger than the row count, so
/// every probe sequence reaches an empty slot or a match.
pub(crate) struct ConcurrentRowMap {
    slots: Vec<AtomicUsize>,
    mask: usize,
}

impl ConcurrentRowMap {
    pub(crate) fn with_capacity(rows: usize, load_factor: f64) -> RowResult<Self> {
        if rows >= EMPTY_SLOT {
            return Err(RowError::Allocation {
                what: "row map",
                len: rows,
            });
        }
        let wanted = ((rows as f64) / load_factor).ceil() as usize;
        let capacity = wanted
            .max(rows + 1)
            .checked_next_power_of_two()
            .ok_or(RowError::Allocation {
                what: "row map",
                len: wanted,
            })?;

        let mut slots = try_vec("row map", capacity)?;
        slots.extend((0..capacity).map(|_| AtomicUsize::new(EMPTY_SLOT)));
        Ok(Self {
            slots,
            mask: capacity - 1,
        })
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Insert `row` unless an equal row is present; returns the row that owns
    /// the class afterwards (`row` itself if it was inserted).
    ///
    /// `eq(existing, row)` must be symmetric, and consistent with `hash`.
    pub(crate) fn insert<F>(&self, row: usize, hash: u64, eq: F) -> usize
    where
        F: Fn(usize, usize) -> bool,
    {
        debug_assert_ne!(row, EMPTY_SLOT);
        let mut slot = (hash as usize) & self.mask;
        loop {
            let current = self.slots[slot].load(Ordering::Acquire);
            if current == EMPTY_SLOT {
                match self.slots[slot].compare_exchange(
                    EMPTY_SLOT,
                    row,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                ) {
                    Ok(_) => return row,
                    // Lost the race: the winner may be an equal row.
                    Err(winner) if eq(winner, row) => return winner,
                    Err(_) => {}
                }
            } else if eq(current, row) {
                return current;
            }
            slot = (slot + 1) & self.mask;
        }
    }

    /// Occupied slots, in slot order.
    #[cfg(test)]
    fn occupied(&self) -> Vec<usize> {
        self.slots
            .iter()
            .map(|s| s.load(Ordering::Relaxed))
            .filter(|&r| r != EMPTY_SLOT)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_exceeds_rows() {
        assert_eq!(ConcurrentRowMap::with_capacity(0, 0.5).unwrap().capacity(), 1);
        assert_eq!(ConcurrentRowMap::with_capacity(3, 0.5).unwrap().capacity(), 8);
        assert_eq!(ConcurrentRowMap::with_capacity(8, 0.9).unwrap().capacity(), 16);
    }

    #[test]
    fn colliding_hashes_resolve_by_equality() {
        let keys = [10, 20, 10, 30, 20];
        let map = ConcurrentRowMap::with_capacity(keys.len(), 0.5).unwrap();
        let groups: Vec<usize> = (0..keys.len())
            .map(|row| map.insert(row, 42, |a, b| keys[a] == keys[b]))
            .collect();

        assert_eq!(groups, vec![0, 1, 0, 3, 1]);
        let mut occupied = map.occupied();
        occupied.sort_unstable();
        assert_eq!(occupied, vec![0, 1, 3]);
    }

    #[test]
    fn concurrent_inserts_agree_on_one_owner() {
        let rows = 2_000;
        let map = ConcurrentRowMap::with_capacity(rows, 0.5).unwrap();
        let key = |row: usize| row % 7;
        let groups: Vec<AtomicUsize> = (0..rows).map(|_| AtomicUsize::new(0)).collect();

        std::thread::scope(|scope| {
            for t in 0..4 {
                let (map, groups) = (&map, &groups);
                scope.spawn(move || {
                    for row in (t..rows).step_by(4) {
                        let owner =
                            map.insert(row, key(row) as u64, |a, b| key(a) == key(b));
                        groups[row].store(owner, Ordering::Relaxed);
                    }
                });
            }
        });

        let groups: Vec<usize> = groups.into_iter().map(AtomicUsize::into_inner).collect();
        assert_eq!(map.occupied().len(), 7);
        for row in 0..rows {
            assert_eq!(key(groups[row]), key(row));
            assert_eq!(groups[groups[row]], groups[row]);
        }
    }
}
