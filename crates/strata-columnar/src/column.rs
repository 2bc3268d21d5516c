#![forbid(unsafe_code)]

use crate::bitmap::BitVec;
use crate::builder::ColumnBuilder;
use crate::error::{ColumnError, ColumnResult};
use crate::types::{DataType, NativeType, Scalar, Value};
use std::ops::Range;
use std::sync::Arc;

/// Backing buffer of a leaf column.
///
/// Buffers are shared between views; a sliced column points at the same buffer
/// with a different offset.
#[derive(Clone, Debug)]
pub enum ColumnData {
    /// Lists and structs keep their elements in child columns.
    Nested,
    Boolean(Arc<BitVec>),
    Int8(Arc<[i8]>),
    Int16(Arc<[i16]>),
    Int32(Arc<[i32]>),
    Int64(Arc<[i64]>),
    UInt8(Arc<[u8]>),
    UInt16(Arc<[u16]>),
    UInt32(Arc<[u32]>),
    UInt64(Arc<[u64]>),
    Float32(Arc<[f32]>),
    Float64(Arc<[f64]>),
    Utf8(Arc<[Arc<str>]>),
}

macro_rules! for_each_native {
    ($data:expr, $values:ident => $body:expr, nested => $nested:expr, boolean($bits:ident) => $bool_body:expr) => {
        match $data {
            ColumnData::Nested => $nested,
            ColumnData::Boolean($bits) => $bool_body,
            ColumnData::Int8($values) => $body,
            ColumnData::Int16($values) => $body,
            ColumnData::Int32($values) => $body,
            ColumnData::Int64($values) => $body,
            ColumnData::UInt8($values) => $body,
            ColumnData::UInt16($values) => $body,
            ColumnData::UInt32($values) => $body,
            ColumnData::UInt64($values) => $body,
            ColumnData::Float32($values) => $body,
            ColumnData::Float64($values) => $body,
            ColumnData::Utf8($values) => $body,
        }
    };
}

impl ColumnData {
    /// Number of physical elements in the buffer; `None` for nested columns.
    pub fn capacity(&self) -> Option<usize> {
        for_each_native!(self, values => Some(values.len()), nested => None, boolean(bits) => Some(bits.len()))
    }

    /// Whether this buffer is the physical representation of `data_type`.
    pub fn matches(&self, data_type: &DataType) -> bool {
        matches!(
            (self, data_type),
            (ColumnData::Nested, DataType::List(_) | DataType::Struct(_))
                | (ColumnData::Boolean(_), DataType::Boolean)
                | (ColumnData::Int8(_), DataType::Int8)
                | (ColumnData::Int16(_), DataType::Int16)
                | (ColumnData::Int32(_), DataType::Int32)
                | (ColumnData::Int64(_), DataType::Int64)
                | (ColumnData::UInt8(_), DataType::UInt8)
                | (ColumnData::UInt16(_), DataType::UInt16)
                | (ColumnData::UInt32(_), DataType::UInt32)
                | (ColumnData::UInt64(_), DataType::UInt64)
                | (ColumnData::Float32(_), DataType::Float32)
                | (ColumnData::Float64(_), DataType::Float64)
                | (ColumnData::Utf8(_), DataType::Utf8)
        )
    }

    fn scalar(&self, index: usize) -> Option<Scalar<'_>> {
        Some(match self {
            ColumnData::Nested => return None,
            ColumnData::Boolean(bits) => Scalar::Boolean(bits.get(index)),
            ColumnData::Int8(v) => Scalar::Int8(v[index]),
            ColumnData::Int16(v) => Scalar::Int16(v[index]),
            ColumnData::Int32(v) => Scalar::Int32(v[index]),
            ColumnData::Int64(v) => Scalar::Int64(v[index]),
            ColumnData::UInt8(v) => Scalar::UInt8(v[index]),
            ColumnData::UInt16(v) => Scalar::UInt16(v[index]),
            ColumnData::UInt32(v) => Scalar::UInt32(v[index]),
            ColumnData::UInt64(v) => Scalar::UInt64(v[index]),
            ColumnData::Float32(v) => Scalar::Float32(v[index]),
            ColumnData::Float64(v) => Scalar::Float64(v[index]),
            ColumnData::Utf8(v) => Scalar::Utf8(&v[index]),
        })
    }

    /// Copy `offset + indices[i]` into a new buffer.
    pub(crate) fn gather(&self, offset: usize, indices: &[usize]) -> ColumnData {
        match self {
            ColumnData::Nested => ColumnData::Nested,
            ColumnData::Boolean(bits) => {
                ColumnData::Boolean(Arc::new(indices.iter().map(|&i| bits.get(offset + i)).collect()))
            }
            ColumnData::Int8(v) => ColumnData::Int8(pick(v, offset, indices)),
            ColumnData::Int16(v) => ColumnData::Int16(pick(v, offset, indices)),
            ColumnData::Int32(v) => ColumnData::Int32(pick(v, offset, indices)),
            ColumnData::Int64(v) => ColumnData::Int64(pick(v, offset, indices)),
            ColumnData::UInt8(v) => ColumnData::UInt8(pick(v, offset, indices)),
            ColumnData::UInt16(v) => ColumnData::UInt16(pick(v, offset, indices)),
            ColumnData::UInt32(v) => ColumnData::UInt32(pick(v, offset, indices)),
            ColumnData::UInt64(v) => ColumnData::UInt64(pick(v, offset, indices)),
            ColumnData::Float32(v) => ColumnData::Float32(pick(v, offset, indices)),
            ColumnData::Float64(v) => ColumnData::Float64(pick(v, offset, indices)),
            ColumnData::Utf8(v) => ColumnData::Utf8(pick(v, offset, indices)),
        }
    }
}

fn pick<T: Clone>(values: &[T], offset: usize, indices: &[usize]) -> Arc<[T]> {
    indices.iter().map(|&i| values[offset + i].clone()).collect()
}

/// A typed, offset-able view over column buffers.
///
/// - Leaf element `i` lives at buffer position `offset + i`.
/// - Struct field element for row `i` lives at child logical index `offset + i`.
/// - List row `i` reads the offsets child at `offset + i` and `offset + i + 1`; the
///   offsets are logical indices into the values child.
///
/// The validity bitmap is indexed physically (`offset + i`) and is absent only
/// for columns that cannot contain nulls.
#[derive(Clone, Debug)]
pub struct Column {
    data_type: DataType,
    len: usize,
    offset: usize,
    data: ColumnData,
    validity: Option<Arc<BitVec>>,
    children: Vec<Column>,
}

impl Column {
    fn leaf(data_type: DataType, len: usize, data: ColumnData, validity: Option<BitVec>) -> Self {
        Self {
            data_type,
            len,
            offset: 0,
            data,
            validity: validity.map(Arc::new),
            children: Vec::new(),
        }
    }

    /// Build a leaf column from a buffer that was assembled elsewhere in the crate.
    pub(crate) fn from_parts(
        data_type: DataType,
        len: usize,
        data: ColumnData,
        validity: Option<BitVec>,
    ) -> Self {
        debug_assert!(data.matches(&data_type));
        Self::leaf(data_type, len, data, validity)
    }

    pub fn from_vec<T: NativeType>(values: Vec<T>) -> Self {
        let len = values.len();
        Self::leaf(T::DATA_TYPE, len, T::into_data(values), None)
    }

    /// Nullable leaf column; `None` entries become nulls.
    pub fn from_options<T: NativeType>(values: Vec<Option<T>>) -> Self {
        let len = values.len();
        let validity: BitVec = values.iter().map(Option::is_some).collect();
        let values: Vec<T> = values.into_iter().map(Option::unwrap_or_default).collect();
        Self::leaf(T::DATA_TYPE, len, T::into_data(values), Some(validity))
    }

    pub fn from_bools(values: &[bool]) -> Self {
        let bits = BitVec::from_bools(values);
        Self::leaf(
            DataType::Boolean,
            values.len(),
            ColumnData::Boolean(Arc::new(bits)),
            None,
        )
    }

    pub fn from_strs(values: &[&str]) -> Self {
        let strings: Arc<[Arc<str>]> = values.iter().map(|s| Arc::<str>::from(*s)).collect();
        Self::leaf(DataType::Utf8, values.len(), ColumnData::Utf8(strings), None)
    }

    pub fn from_opt_strs(values: &[Option<&str>]) -> Self {
        let strings: Arc<[Arc<str>]> = values
            .iter()
            .map(|s| Arc::<str>::from(s.unwrap_or("")))
            .collect();
        let validity: BitVec = values.iter().map(Option::is_some).collect();
        Self::leaf(
            DataType::Utf8,
            values.len(),
            ColumnData::Utf8(strings),
            Some(validity),
        )
    }

    /// Build a list column from `len + 1` offsets into `values`.
    ///
    /// Null entries must span zero child elements.
    pub fn new_list(
        offsets: Vec<i32>,
        values: Column,
        validity: Option<BitVec>,
    ) -> ColumnResult<Self> {
        let Some((&first, _)) = offsets.split_first() else {
            return Err(ColumnError::InvalidOffsets(
                "offsets must contain at least one entry".to_owned(),
            ));
        };
        if first < 0 {
            return Err(ColumnError::InvalidOffsets(format!(
                "first offset {first} is negative"
            )));
        }
        if let Some(pos) = offsets.windows(2).position(|w| w[1] < w[0]) {
            return Err(ColumnError::InvalidOffsets(format!(
                "offsets decrease at entry {}",
                pos + 1
            )));
        }
        let last = offsets[offsets.len() - 1] as usize;
        if last > values.len() {
            return Err(ColumnError::InvalidOffsets(format!(
                "last offset {last} exceeds {} child elements",
                values.len()
            )));
        }

        let len = offsets.len() - 1;
        if let Some(validity) = &validity {
            if validity.len() != len {
                return Err(ColumnError::ValidityLength {
                    expected: len,
                    actual: validity.len(),
                });
            }
            for index in (0..len).filter(|&i| !validity.get(i)) {
                let span = (offsets[index + 1] - offsets[index]) as usize;
                if span != 0 {
                    return Err(ColumnError::NonEmptyNullList { index, len: span });
                }
            }
        }

        Ok(Self {
            data_type: DataType::list(values.data_type.clone()),
            len,
            offset: 0,
            data: ColumnData::Nested,
            validity: validity.map(Arc::new),
            children: vec![Column::from_vec(offsets), values],
        })
    }

    pub fn new_struct(
        len: usize,
        fields: Vec<Column>,
        validity: Option<BitVec>,
    ) -> ColumnResult<Self> {
        check_fields(&fields, len)?;
        if let Some(validity) = &validity {
            if validity.len() != len {
                return Err(ColumnError::ValidityLength {
                    expected: len,
                    actual: validity.len(),
                });
            }
        }

        Ok(Self {
            data_type: DataType::Struct(fields.iter().map(|f| f.data_type.clone()).collect()),
            len,
            offset: 0,
            data: ColumnData::Nested,
            validity: validity.map(Arc::new),
            children: fields,
        })
    }

    /// Build a column of `data_type` from owned values.
    ///
    /// Values whose type does not match the column are stored as nulls.
    pub fn from_values(data_type: &DataType, values: &[Value]) -> ColumnResult<Self> {
        let mut builder = ColumnBuilder::new(data_type);
        for value in values {
            builder.push(value);
        }
        builder.finish()
    }

    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn validity(&self) -> Option<&BitVec> {
        self.validity.as_deref()
    }

    /// Whether the column carries a validity bitmap.
    pub fn nullable(&self) -> bool {
        self.validity.is_some()
    }

    pub fn is_valid(&self, index: usize) -> bool {
        debug_assert!(index < self.len, "column index out of bounds");
        self.validity
            .as_ref()
            .map_or(true, |bits| bits.get(self.offset + index))
    }

    pub fn is_null(&self, index: usize) -> bool {
        !self.is_valid(index)
    }

    pub fn null_count(&self) -> usize {
        self.validity
            .as_ref()
            .map_or(0, |bits| self.len - bits.count_ones_in(self.offset, self.len))
    }

    pub fn children(&self) -> &[Column] {
        &self.children
    }

    pub fn child(&self, index: usize) -> Option<&Column> {
        self.children.get(index)
    }

    /// Offset-adjusted native values of a leaf column.
    pub fn values<T: NativeType>(&self) -> Option<&[T]> {
        T::buffer(&self.data).map(|values| &values[self.offset..self.offset + self.len])
    }

    /// Leaf element at logical `index`, ignoring validity.
    pub fn scalar(&self, index: usize) -> Option<Scalar<'_>> {
        debug_assert!(index < self.len, "column index out of bounds");
        self.data.scalar(self.offset + index)
    }

    /// The `len + 1` offsets that bound this list column's rows.
    pub fn list_offsets(&self) -> Option<&[i32]> {
        if !self.data_type.is_list() {
            return None;
        }
        let offsets = self.children.first()?.values::<i32>()?;
        offsets.get(self.offset..self.offset + self.len + 1)
    }

    pub fn list_values(&self) -> Option<&Column> {
        if !self.data_type.is_list() {
            return None;
        }
        self.children.get(1)
    }

    /// Child element range of list row `index`.
    pub fn list_range(&self, index: usize) -> Option<Range<usize>> {
        let offsets = self.list_offsets()?;
        Some(offsets[index] as usize..offsets[index + 1] as usize)
    }

    /// Zero-copy view of `len` rows starting at logical row `offset`.
    pub fn slice(&self, offset: usize, len: usize) -> ColumnResult<Self> {
        let end = offset + len;
        if end > self.len {
            return Err(ColumnError::SliceOutOfBounds {
                offset,
                end,
                capacity: self.len,
            });
        }
        Ok(Self {
            offset: self.offset + offset,
            len,
            ..self.clone()
        })
    }

    /// A struct column sharing this column's validity, offset and length but
    /// exposing `fields` as its children.
    pub fn struct_view(&self, fields: Vec<Column>) -> ColumnResult<Self> {
        if !self.data_type.is_struct() {
            return Err(ColumnError::UnexpectedType {
                expected: "struct",
                actual: self.data_type.clone(),
            });
        }
        check_fields(&fields, self.offset + self.len)?;
        Ok(Self {
            data_type: DataType::Struct(fields.iter().map(|f| f.data_type.clone()).collect()),
            len: self.len,
            offset: self.offset,
            data: ColumnData::Nested,
            validity: self.validity.clone(),
            children: fields,
        })
    }

    /// Materialize logical row `index`.
    pub fn value(&self, index: usize) -> Value {
        if self.is_null(index) {
            return Value::Null;
        }
        match &self.data_type {
            DataType::List(_) => match (self.list_range(index), self.list_values()) {
                (Some(range), Some(values)) => Value::List(range.map(|i| values.value(i)).collect()),
                _ => Value::Null,
            },
            DataType::Struct(_) => Value::Struct(
                self.children
                    .iter()
                    .map(|field| field.value(self.offset + index))
                    .collect(),
            ),
            _ => self
                .scalar(index)
                .map(Scalar::to_value)
                .unwrap_or(Value::Null),
        }
    }

    pub fn to_values(&self) -> Vec<Value> {
        (0..self.len).map(|i| self.value(i)).collect()
    }
}

fn check_fields(fields: &[Column], needed: usize) -> ColumnResult<()> {
    for (field, column) in fields.iter().enumerate() {
        if column.len() < needed {
            return Err(ColumnError::FieldTooShort {
                field,
                expected: needed,
                actual: column.len(),
            });
        }
    }
    Ok(())
}
