use crate::types::DataType;

pub type ColumnResult<T> = Result<T, ColumnError>;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ColumnError {
    #[error("length mismatch: expected {expected} rows, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("validity has {actual} bits, expected {expected}")]
    ValidityLength { expected: usize, actual: usize },

    #[error("slice {offset}..{end} out of bounds for column with capacity {capacity}")]
    SliceOutOfBounds {
        offset: usize,
        end: usize,
        capacity: usize,
    },

    #[error("row index {index} out of bounds for column of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("column index {index} out of bounds for table with {columns} columns")]
    ColumnOutOfBounds { index: usize, columns: usize },

    #[error("invalid list offsets: {0}")]
    InvalidOffsets(String),

    #[error("null list entry {index} spans {len} child elements")]
    NonEmptyNullList { index: usize, len: usize },

    #[error("struct field {field} has {actual} rows, struct needs at least {expected}")]
    FieldTooShort {
        field: usize,
        expected: usize,
        actual: usize,
    },

    #[error("expected a {expected} column, got {actual}")]
    UnexpectedType {
        expected: &'static str,
        actual: DataType,
    },
}
