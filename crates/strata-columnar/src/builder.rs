#![forbid(unsafe_code)]

use crate::bitmap::BitVec;
use crate::column::{Column, ColumnData};
use crate::error::{ColumnError, ColumnResult};
use crate::types::{DataType, NativeType, Value};
use std::sync::Arc;

/// Row-at-a-time builder for one column of any [`DataType`].
pub(crate) enum ColumnBuilder {
    Boolean {
        values: BitVec,
        validity: BitVec,
    },
    Int8(PrimitiveBuilder<i8>),
    Int16(PrimitiveBuilder<i16>),
    Int32(PrimitiveBuilder<i32>),
    Int64(PrimitiveBuilder<i64>),
    UInt8(PrimitiveBuilder<u8>),
    UInt16(PrimitiveBuilder<u16>),
    UInt32(PrimitiveBuilder<u32>),
    UInt64(PrimitiveBuilder<u64>),
    Float32(PrimitiveBuilder<f32>),
    Float64(PrimitiveBuilder<f64>),
    Utf8 {
        values: Vec<Arc<str>>,
        validity: BitVec,
    },
    List {
        offsets: Vec<usize>,
        validity: BitVec,
        values: Box<ColumnBuilder>,
    },
    Struct {
        fields: Vec<ColumnBuilder>,
        validity: BitVec,
    },
}

pub(crate) struct PrimitiveBuilder<T> {
    values: Vec<T>,
    validity: BitVec,
}

impl<T: NativeType> PrimitiveBuilder<T> {
    fn new() -> Self {
        Self {
            values: Vec::new(),
            validity: BitVec::new(),
        }
    }

    fn push(&mut self, value: &Value) {
        match T::from_value(value) {
            Some(v) => {
                self.values.push(v);
                self.validity.push(true);
            }
            None => {
                // Type mismatch or null: store a placeholder.
                self.values.push(T::default());
                self.validity.push(false);
            }
        }
    }

    fn finish(self) -> Column {
        let len = self.values.len();
        Column::from_parts(
            T::DATA_TYPE,
            len,
            T::into_data(self.values),
            finish_validity(self.validity),
        )
    }
}

fn finish_validity(validity: BitVec) -> Option<BitVec> {
    if validity.all_true() {
        None
    } else {
        Some(validity)
    }
}

impl ColumnBuilder {
    pub(crate) fn new(data_type: &DataType) -> Self {
        match data_type {
            DataType::Boolean => ColumnBuilder::Boolean {
                values: BitVec::new(),
                validity: BitVec::new(),
            },
            DataType::Int8 => ColumnBuilder::Int8(PrimitiveBuilder::new()),
            DataType::Int16 => ColumnBuilder::Int16(PrimitiveBuilder::new()),
            DataType::Int32 => ColumnBuilder::Int32(PrimitiveBuilder::new()),
            DataType::Int64 => ColumnBuilder::Int64(PrimitiveBuilder::new()),
            DataType::UInt8 => ColumnBuilder::UInt8(PrimitiveBuilder::new()),
            DataType::UInt16 => ColumnBuilder::UInt16(PrimitiveBuilder::new()),
            DataType::UInt32 => ColumnBuilder::UInt32(PrimitiveBuilder::new()),
            DataType::UInt64 => ColumnBuilder::UInt64(PrimitiveBuilder::new()),
            DataType::Float32 => ColumnBuilder::Float32(PrimitiveBuilder::new()),
            DataType::Float64 => ColumnBuilder::Float64(PrimitiveBuilder::new()),
            DataType::Utf8 => ColumnBuilder::Utf8 {
                values: Vec::new(),
                validity: BitVec::new(),
            },
            DataType::List(element) => ColumnBuilder::List {
                offsets: vec![0],
                validity: BitVec::new(),
                values: Box::new(ColumnBuilder::new(element)),
            },
            DataType::Struct(fields) => ColumnBuilder::Struct {
                fields: fields.iter().map(ColumnBuilder::new).collect(),
                validity: BitVec::new(),
            },
        }
    }

    pub(crate) fn push(&mut self, value: &Value) {
        match self {
            ColumnBuilder::Boolean { values, validity } => {
                let bit = match value {
                    Value::Boolean(b) => Some(*b),
                    _ => None,
                };
                values.push(bit.unwrap_or(false));
                validity.push(bit.is_some());
            }
            ColumnBuilder::Int8(b) => b.push(value),
            ColumnBuilder::Int16(b) => b.push(value),
            ColumnBuilder::Int32(b) => b.push(value),
            ColumnBuilder::Int64(b) => b.push(value),
            ColumnBuilder::UInt8(b) => b.push(value),
            ColumnBuilder::UInt16(b) => b.push(value),
            ColumnBuilder::UInt32(b) => b.push(value),
            ColumnBuilder::UInt64(b) => b.push(value),
            ColumnBuilder::Float32(b) => b.push(value),
            ColumnBuilder::Float64(b) => b.push(value),
            ColumnBuilder::Utf8 { values, validity } => match value {
                Value::String(s) => {
                    values.push(s.clone());
                    validity.push(true);
                }
                _ => {
                    values.push(Arc::<str>::from(""));
                    validity.push(false);
                }
            },
            ColumnBuilder::List {
                offsets,
                validity,
                values,
            } => {
                let end = offsets.last().copied().unwrap_or(0);
                match value {
                    Value::List(items) => {
                        for item in items {
                            values.push(item);
                        }
                        offsets.push(end + items.len());
                        validity.push(true);
                    }
                    _ => {
                        offsets.push(end);
                        validity.push(false);
                    }
                }
            }
            ColumnBuilder::Struct { fields, validity } => match value {
                Value::Struct(items) => {
                    for (idx, field) in fields.iter_mut().enumerate() {
                        field.push(items.get(idx).unwrap_or(&Value::Null));
                    }
                    validity.push(true);
                }
                _ => {
                    // Fields still need a slot so struct rows stay aligned with them.
                    for field in fields.iter_mut() {
                        field.push(&Value::Null);
                    }
                    validity.push(false);
                }
            },
        }
    }

    pub(crate) fn finish(self) -> ColumnResult<Column> {
        Ok(match self {
            ColumnBuilder::Boolean { values, validity } => Column::from_parts(
                DataType::Boolean,
                values.len(),
                ColumnData::Boolean(Arc::new(values)),
                finish_validity(validity),
            ),
            ColumnBuilder::Int8(b) => b.finish(),
            ColumnBuilder::Int16(b) => b.finish(),
            ColumnBuilder::Int32(b) => b.finish(),
            ColumnBuilder::Int64(b) => b.finish(),
            ColumnBuilder::UInt8(b) => b.finish(),
            ColumnBuilder::UInt16(b) => b.finish(),
            ColumnBuilder::UInt32(b) => b.finish(),
            ColumnBuilder::UInt64(b) => b.finish(),
            ColumnBuilder::Float32(b) => b.finish(),
            ColumnBuilder::Float64(b) => b.finish(),
            ColumnBuilder::Utf8 { values, validity } => Column::from_parts(
                DataType::Utf8,
                values.len(),
                ColumnData::Utf8(values.into()),
                finish_validity(validity),
            ),
            ColumnBuilder::List {
                offsets,
                validity,
                values,
            } => {
                let offsets = offsets
                    .into_iter()
                    .map(|o| {
                        i32::try_from(o).map_err(|_| {
                            ColumnError::InvalidOffsets(format!("offset {o} overflows i32"))
                        })
                    })
                    .collect::<ColumnResult<Vec<i32>>>()?;
                Column::new_list(offsets, values.finish()?, finish_validity(validity))?
            }
            ColumnBuilder::Struct { fields, validity } => {
                let len = validity.len();
                let fields = fields
                    .into_iter()
                    .map(ColumnBuilder::finish)
                    .collect::<ColumnResult<Vec<_>>>()?;
                Column::new_struct(len, fields, finish_validity(validity))?
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_values_roundtrip_through_builder() {
        let ty = DataType::list(DataType::Struct(vec![DataType::Int32, DataType::Utf8]));
        let rows = vec![
            Value::List(vec![
                Value::Struct(vec![Value::Int(1), Value::string("a")]),
                Value::Null,
            ]),
            Value::Null,
            Value::List(vec![]),
            Value::List(vec![Value::Struct(vec![Value::Null, Value::string("b")])]),
        ];

        let column = Column::from_values(&ty, &rows).unwrap();
        assert_eq!(column.data_type(), &ty);
        assert_eq!(column.len(), 4);
        assert_eq!(column.null_count(), 1);
        assert_eq!(column.to_values(), rows);
    }

    #[test]
    fn mismatched_values_become_nulls() {
        let column = Column::from_values(
            &DataType::Int16,
            &[Value::Int(5), Value::string("x"), Value::Int(1 << 20)],
        )
        .unwrap();
        assert_eq!(
            column.to_values(),
            vec![Value::Int(5), Value::Null, Value::Null]
        );
    }

    #[test]
    fn all_valid_columns_drop_their_bitmap() {
        let column = Column::from_values(&DataType::Utf8, &[Value::string("a")]).unwrap();
        assert!(!column.nullable());
    }
}
