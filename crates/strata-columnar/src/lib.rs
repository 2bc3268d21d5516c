//! Arrow-style nested columns for Strata.
//!
//! This crate focuses on:
//! - Typed leaf buffers plus validity bitmaps, shared between zero-copy views.
//! - Nested `list` and `struct` columns addressed through parent offsets.
//! - Row-oriented construction (`TableBuilder`, `Column::from_values`) and
//!   materialization (`Column::value`, `Table::to_rows`) for tests and tools.
//! - Row gathers used to materialize query results.

#![forbid(unsafe_code)]

mod bitmap;
mod builder;
mod column;
mod error;
mod gather;
mod table;
mod types;

pub use crate::bitmap::BitVec;
pub use crate::column::{Column, ColumnData};
pub use crate::error::{ColumnError, ColumnResult};
pub use crate::gather::gather;
pub use crate::table::{Table, TableBuilder};
pub use crate::types::{DataType, NativeType, Scalar, Value};
