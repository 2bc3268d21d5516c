//! Row hashing consistent with [`RowEquality`](crate::RowEquality).
//!
//! Rows that compare equal under any null/NaN policy hash equally: nulls hash
//! to a fixed marker, NaNs to one canonical value and `-0.0` like `0.0`.

use crate::error::RowResult;
use crate::parallel::{ExecConfig, Executor};
use ahash::RandomState;
use strata_columnar::{Column, DataType, Scalar, Table};

const SEEDS: [u64; 4] = [
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
];

/// Hash combination used for every multi-part value.
pub fn combine_hashes(l: u64, r: u64) -> u64 {
    let hash = (17 * 37u64).wrapping_add(l);
    hash.wrapping_mul(37).wrapping_add(r)
}

#[derive(Clone, Debug)]
pub struct RowHasher {
    columns: Vec<Column>,
    state: RandomState,
    null_hash: u64,
}

impl RowHasher {
    pub fn new(table: &Table) -> Self {
        Self::with_seed(table, 0)
    }

    /// Same rows hash the same for the same `seed`, across processes.
    pub fn with_seed(table: &Table, seed: u64) -> Self {
        let state = RandomState::with_seeds(
            SEEDS[0] ^ seed,
            SEEDS[1],
            SEEDS[2],
            SEEDS[3].wrapping_add(seed),
        );
        let null_hash = state.hash_one(1u8);
        Self {
            columns: table.columns().to_vec(),
            state,
            null_hash,
        }
    }

    pub fn hash_row(&self, row: usize) -> u64 {
        self.columns
            .iter()
            .fold(0, |acc, column| combine_hashes(acc, self.hash_element(column, row)))
    }

    fn hash_element(&self, column: &Column, index: usize) -> u64 {
        if column.is_null(index) {
            return self.null_hash;
        }
        match column.data_type() {
            DataType::Struct(_) => column.children().iter().fold(
                self.state.hash_one(column.children().len()),
                |acc, field| combine_hashes(acc, self.hash_element(field, column.offset() + index)),
            ),
            DataType::List(_) => {
                let (Some(range), Some(values)) = (column.list_range(index), column.list_values())
                else {
                    return self.null_hash;
                };
                let len_hash = self.state.hash_one(range.len());
                range.fold(len_hash, |acc, child| {
                    combine_hashes(acc, self.hash_element(values, child))
                })
            }
            _ => match column.scalar(index) {
                Some(scalar) => self.hash_scalar(scalar),
                None => self.null_hash,
            },
        }
    }

    fn hash_scalar(&self, scalar: Scalar<'_>) -> u64 {
        match scalar {
            Scalar::Boolean(v) => self.state.hash_one(v),
            Scalar::Int8(v) => self.state.hash_one(v),
            Scalar::Int16(v) => self.state.hash_one(v),
            Scalar::Int32(v) => self.state.hash_one(v),
            Scalar::Int64(v) => self.state.hash_one(v),
            Scalar::UInt8(v) => self.state.hash_one(v),
            Scalar::UInt16(v) => self.state.hash_one(v),
            Scalar::UInt32(v) => self.state.hash_one(v),
            Scalar::UInt64(v) => self.state.hash_one(v),
            Scalar::Float32(v) => self.state.hash_one(canonical_f32(v)),
            Scalar::Float64(v) => self.state.hash_one(canonical_f64(v)),
            Scalar::Utf8(v) => self.state.hash_one(v),
        }
    }
}

fn canonical_f32(v: f32) -> u32 {
    if v.is_nan() {
        f32::NAN.to_bits()
    } else if v == 0.0 {
        0
    } else {
        v.to_bits()
    }
}

fn canonical_f64(v: f64) -> u64 {
    if v.is_nan() {
        f64::NAN.to_bits()
    } else if v == 0.0 {
        0
    } else {
        v.to_bits()
    }
}

/// Hash every row of `table`.
pub fn hash_rows(table: &Table, seed: u64) -> RowResult<Vec<u64>> {
    let hasher = RowHasher::with_seed(table, seed);
    let exec = Executor::new(&ExecConfig::default(), table.num_rows());
    exec.map("row hashes", table.num_rows(), |row| hasher.hash_row(row))
}
