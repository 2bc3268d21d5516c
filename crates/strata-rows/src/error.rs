use strata_columnar::{ColumnError, DataType};

pub type RowResult<T> = Result<T, RowError>;

/// Contract violations detected before any comparison or parallel phase runs.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RowError {
    #[error("tables have different column counts: {lhs} vs {rhs}")]
    ColumnCountMismatch { lhs: usize, rhs: usize },

    #[error("{what} has {actual} entries, expected 0 or {expected}")]
    OrderLengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("key column {index} out of bounds for table with {columns} columns")]
    KeyOutOfBounds { index: usize, columns: usize },

    #[error("column {column} has type {lhs} on the left but {rhs} on the right")]
    TypeMismatch {
        column: usize,
        lhs: DataType,
        rhs: DataType,
    },

    #[error("column {column} of type {data_type} is not comparable: {reason}")]
    Uncomparable {
        column: usize,
        data_type: DataType,
        reason: String,
    },

    #[error("list column nests {depth} levels, at most {max} are supported")]
    NestingTooDeep { depth: usize, max: usize },

    #[error("failed to allocate {what} for {len} entries")]
    Allocation { what: &'static str, len: usize },

    #[error(transparent)]
    Column(#[from] ColumnError),
}

/// Reserve exactly `len` more slots or report resource exhaustion.
pub(crate) fn try_vec<T>(what: &'static str, len: usize) -> RowResult<Vec<T>> {
    let mut out = Vec::new();
    out.try_reserve_exact(len)
        .map_err(|_| RowError::Allocation { what, len })?;
    Ok(out)
}
