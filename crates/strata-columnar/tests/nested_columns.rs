use pretty_assertions::assert_eq;
use strata_columnar::{gather, BitVec, Column, ColumnError, DataType, Table, TableBuilder, Value};

fn ints(values: &[Option<i64>]) -> Value {
    Value::List(values.iter().map(|v| Value::from(*v)).collect())
}

#[test]
fn list_of_lists_built_by_hand_matches_builder() {
    // [[1, 2], [3]], null, [[], null]
    let leaves = Column::from_vec(vec![1i64, 2, 3]);
    let inner = Column::new_list(
        vec![0, 2, 3, 3, 3],
        leaves,
        Some(BitVec::from_bools(&[true, true, true, false])),
    )
    .unwrap();
    let outer = Column::new_list(
        vec![0, 2, 2, 4],
        inner,
        Some(BitVec::from_bools(&[true, false, true])),
    )
    .unwrap();

    let expected = vec![
        Value::List(vec![ints(&[Some(1), Some(2)]), ints(&[Some(3)])]),
        Value::Null,
        Value::List(vec![Value::List(vec![]), Value::Null]),
    ];
    assert_eq!(outer.to_values(), expected);

    let built = Column::from_values(outer.data_type(), &expected).unwrap();
    assert_eq!(built.data_type(), outer.data_type());
    assert_eq!(built.to_values(), expected);
    assert_eq!(built.list_offsets(), Some(&[0, 2, 2, 4][..]));
}

#[test]
fn table_gather_repeats_and_reorders_rows() {
    let schema = vec![
        DataType::Int32,
        DataType::list(DataType::Utf8),
        DataType::Struct(vec![DataType::Float64, DataType::Boolean]),
    ];
    let mut builder = TableBuilder::new(schema.clone());
    builder.append_row(&[
        Value::Int(1),
        Value::List(vec![Value::string("a")]),
        Value::Struct(vec![Value::Float(0.5), Value::Boolean(true)]),
    ]);
    builder.append_row(&[Value::Null, Value::Null, Value::Null]);
    builder.append_row(&[
        Value::Int(3),
        Value::List(vec![Value::string("b"), Value::Null]),
        Value::Struct(vec![Value::Null, Value::Boolean(false)]),
    ]);
    let table = builder.finalize().unwrap();
    assert_eq!(table.data_types(), schema);

    let gathered = gather(&table, &[2, 2, 0]).unwrap();
    let rows = table.to_rows();
    assert_eq!(
        gathered.to_rows(),
        vec![rows[2].clone(), rows[2].clone(), rows[0].clone()]
    );

    let sliced = table.slice(1, 2).unwrap();
    assert_eq!(sliced.gather(&[0]).unwrap().to_rows(), vec![rows[1].clone()]);
    assert_eq!(
        sliced.gather(&[2]).unwrap_err(),
        ColumnError::IndexOutOfBounds { index: 2, len: 2 }
    );
}

#[test]
fn zero_column_tables_have_no_rows() {
    let table = Table::empty();
    assert_eq!(table.num_rows(), 0);
    assert_eq!(table.num_columns(), 0);
    assert_eq!(table.gather(&[]).unwrap().num_rows(), 0);
    assert_eq!(Table::new(Vec::new()).unwrap().num_rows(), 0);

    let builder = TableBuilder::new(Vec::new());
    assert_eq!(builder.finalize().unwrap().num_rows(), 0);
}

#[test]
fn struct_fields_longer_than_parent_are_addressed_by_offset() {
    let field = Column::from_vec(vec![7u32, 8, 9, 10]);
    let parent = Column::new_struct(2, vec![field.slice(0, 4).unwrap()], None).unwrap();
    assert_eq!(
        parent.to_values(),
        vec![
            Value::Struct(vec![Value::UInt(7)]),
            Value::Struct(vec![Value::UInt(8)])
        ]
    );

    let err = Column::new_struct(5, vec![field], None).unwrap_err();
    assert_eq!(
        err,
        ColumnError::FieldTooShort {
            field: 0,
            expected: 5,
            actual: 4
        }
    );
}
