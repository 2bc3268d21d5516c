#![forbid(unsafe_code)]

use crate::column::ColumnData;
use std::fmt;
use std::sync::Arc;

/// Logical type of a column.
///
/// Nested types carry their child types so two columns can be checked for
/// comparability without walking their buffers.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Utf8,
    List(Box<DataType>),
    Struct(Vec<DataType>),
}

impl DataType {
    pub fn list(element: DataType) -> Self {
        DataType::List(Box::new(element))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, DataType::List(_))
    }

    pub fn is_struct(&self) -> bool {
        matches!(self, DataType::Struct(_))
    }

    /// Number of list levels between this type and its first non-list descendant.
    pub fn list_depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self;
        while let DataType::List(element) = current {
            depth += 1;
            current = element;
        }
        depth
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Boolean => f.write_str("bool"),
            DataType::Int8 => f.write_str("int8"),
            DataType::Int16 => f.write_str("int16"),
            DataType::Int32 => f.write_str("int32"),
            DataType::Int64 => f.write_str("int64"),
            DataType::UInt8 => f.write_str("uint8"),
            DataType::UInt16 => f.write_str("uint16"),
            DataType::UInt32 => f.write_str("uint32"),
            DataType::UInt64 => f.write_str("uint64"),
            DataType::Float32 => f.write_str("float32"),
            DataType::Float64 => f.write_str("float64"),
            DataType::Utf8 => f.write_str("utf8"),
            DataType::List(element) => write!(f, "list<{element}>"),
            DataType::Struct(fields) => {
                f.write_str("struct<")?;
                for (idx, field) in fields.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{field}")?;
                }
                f.write_str(">")
            }
        }
    }
}

/// Owned, recursive cell value used for row-oriented building and materialization.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(Arc<str>),
    List(Vec<Value>),
    Struct(Vec<Value>),
}

impl Value {
    pub fn string(s: &str) -> Self {
        Value::String(Arc::<str>::from(s))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::string(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Borrowed view of one non-null leaf element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scalar<'a> {
    Boolean(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    Utf8(&'a str),
}

impl Scalar<'_> {
    pub fn to_value(self) -> Value {
        match self {
            Scalar::Boolean(v) => Value::Boolean(v),
            Scalar::Int8(v) => Value::Int(v as i64),
            Scalar::Int16(v) => Value::Int(v as i64),
            Scalar::Int32(v) => Value::Int(v as i64),
            Scalar::Int64(v) => Value::Int(v),
            Scalar::UInt8(v) => Value::UInt(v as u64),
            Scalar::UInt16(v) => Value::UInt(v as u64),
            Scalar::UInt32(v) => Value::UInt(v as u64),
            Scalar::UInt64(v) => Value::UInt(v),
            Scalar::Float32(v) => Value::Float(v as f64),
            Scalar::Float64(v) => Value::Float(v),
            Scalar::Utf8(v) => Value::string(v),
        }
    }
}

/// Fixed-width native element types that can back a leaf column.
pub trait NativeType: Copy + Default + Send + Sync + fmt::Debug + 'static {
    const DATA_TYPE: DataType;

    fn into_data(values: Vec<Self>) -> ColumnData;

    /// The whole backing buffer, if `data` stores this type.
    fn buffer(data: &ColumnData) -> Option<&[Self]>;

    /// Convert a builder value, returning `None` on a type mismatch or overflow.
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! native_int {
    ($ty:ty, $variant:ident) => {
        impl NativeType for $ty {
            const DATA_TYPE: DataType = DataType::$variant;

            fn into_data(values: Vec<Self>) -> ColumnData {
                ColumnData::$variant(values.into())
            }

            fn buffer(data: &ColumnData) -> Option<&[Self]> {
                match data {
                    ColumnData::$variant(values) => Some(&values[..]),
                    _ => None,
                }
            }

            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::Int(v) => <$ty>::try_from(*v).ok(),
                    Value::UInt(v) => <$ty>::try_from(*v).ok(),
                    _ => None,
                }
            }
        }
    };
}

native_int!(i8, Int8);
native_int!(i16, Int16);
native_int!(i32, Int32);
native_int!(i64, Int64);
native_int!(u8, UInt8);
native_int!(u16, UInt16);
native_int!(u32, UInt32);
native_int!(u64, UInt64);

macro_rules! native_float {
    ($ty:ty, $variant:ident) => {
        impl NativeType for $ty {
            const DATA_TYPE: DataType = DataType::$variant;

            fn into_data(values: Vec<Self>) -> ColumnData {
                ColumnData::$variant(values.into())
            }

            fn buffer(data: &ColumnData) -> Option<&[Self]> {
                match data {
                    ColumnData::$variant(values) => Some(&values[..]),
                    _ => None,
                }
            }

            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::Float(v) => Some(*v as $ty),
                    Value::Int(v) => Some(*v as $ty),
                    Value::UInt(v) => Some(*v as $ty),
                    _ => None,
                }
            }
        }
    };
}

native_float!(f32, Float32);
native_float!(f64, Float64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_renders_nested_types() {
        let ty = DataType::Struct(vec![
            DataType::Int32,
            DataType::list(DataType::list(DataType::Utf8)),
        ]);
        assert_eq!(ty.to_string(), "struct<int32, list<list<utf8>>>");
    }

    #[test]
    fn list_depth_stops_at_first_non_list() {
        let ty = DataType::list(DataType::list(DataType::Struct(vec![DataType::list(
            DataType::Int8,
        )])));
        assert_eq!(ty.list_depth(), 2);
        assert_eq!(DataType::Int8.list_depth(), 0);
    }

    #[test]
    fn native_from_value_rejects_overflow() {
        assert_eq!(i8::from_value(&Value::Int(300)), None);
        assert_eq!(u16::from_value(&Value::Int(-1)), None);
        assert_eq!(i32::from_value(&Value::UInt(7)), Some(7));
        assert_eq!(i64::from_value(&Value::string("7")), None);
    }
}
