//! Row identity and row order over nested columnar tables.
//!
//! This crate focuses on:
//! - Addressing a logical row through struct and list levels ([`leaf_index`]).
//! - Repetition/definition level encoding of list columns ([`DremelData`]).
//! - Element and row comparators with per-column order and null precedence
//!   ([`build_row_comparator`]), plus null/NaN-aware row equality and hashing.
//! - Hash-based distinct with `Any`/`First`/`Last`/`None` keep policies,
//!   executed on a crate-local rayon pool ([`distinct_row_indices`]).

#![forbid(unsafe_code)]

mod addressing;
mod distinct;
mod dremel;
mod element;
mod error;
mod hash;
mod parallel;
mod row;
mod row_map;
mod types;

pub use crate::addressing::{leaf_column, leaf_index, list_leaf_column, list_leaf_index};
pub use crate::distinct::{
    distinct, distinct_count, distinct_row_indices, distinct_row_indices_with, stable_distinct,
    DistinctOptions,
};
pub use crate::dremel::{DremelData, MAX_LIST_DEPTH};
pub use crate::element::{ElementComparator, ElementEquality, PreparedColumn};
pub use crate::error::{RowError, RowResult};
pub use crate::hash::{combine_hashes, hash_rows, RowHasher};
pub use crate::parallel::{ExecConfig, ExecMode};
pub use crate::row::{
    build_row_comparator, build_row_equality, PreprocessedTable, RowComparator, RowEquality,
};
pub use crate::types::{KeepPolicy, NanEquality, NullDepth, NullEquality, NullOrder, SortOrder};
