use pretty_assertions::assert_eq;
use std::cmp::Ordering;
use strata_columnar::{BitVec, Column, DataType, Table, Value};
use strata_rows::{
    build_row_comparator, build_row_equality, NanEquality, NullEquality, NullOrder, RowError,
    SortOrder,
};

fn ints(values: &[i64]) -> Value {
    Value::List(values.iter().map(|&v| Value::Int(v)).collect())
}

fn single(ty: &DataType, values: &[Value]) -> Table {
    Table::new(vec![Column::from_values(ty, values).unwrap()]).unwrap()
}

#[test]
fn list_rows_order_lexicographically() {
    let table = single(
        &DataType::list(DataType::Int32),
        &[ints(&[1, 2]), ints(&[1, 3]), ints(&[1])],
    );
    let cmp = build_row_comparator(&table, None, &[], &[]).unwrap();

    assert!(cmp.less(0, 1));
    assert!(cmp.less(2, 0));
    assert!(!cmp.less(1, 1));
    assert_eq!(cmp.compare(1, 2), Ordering::Greater);
}

#[test]
fn struct_field_nulls_follow_precedence() {
    let ty = DataType::Struct(vec![DataType::Int32, DataType::Int32]);
    let table = single(
        &ty,
        &[
            Value::Struct(vec![Value::Int(1), Value::Null]),
            Value::Struct(vec![Value::Int(1), Value::Int(5)]),
        ],
    );

    let before = build_row_comparator(&table, None, &[], &[NullOrder::Before]).unwrap();
    assert!(before.less(0, 1));

    let after = build_row_comparator(&table, None, &[], &[NullOrder::After]).unwrap();
    assert!(after.less(1, 0));
}

#[test]
fn descending_reverses_values_and_nulls() {
    let table = Table::new(vec![Column::from_options(vec![Some(1i32), None, Some(3)])]).unwrap();
    let cmp = build_row_comparator(
        &table,
        None,
        &[SortOrder::Descending],
        &[NullOrder::Before],
    )
    .unwrap();

    let mut rows = vec![0, 1, 2];
    rows.sort_by(|&a, &b| cmp.compare(a, b));
    assert_eq!(rows, vec![2, 0, 1]);
}

#[test]
fn later_columns_break_ties() {
    let table = Table::new(vec![
        Column::from_strs(&["b", "a", "b", "a"]),
        Column::from_vec(vec![2.0f64, 1.0, 1.0, f64::NAN]),
    ])
    .unwrap();
    let cmp = build_row_comparator(
        &table,
        None,
        &[SortOrder::Ascending, SortOrder::Descending],
        &[],
    )
    .unwrap();

    let mut rows = vec![0, 1, 2, 3];
    rows.sort_by(|&a, &b| cmp.compare(a, b));
    assert_eq!(rows, vec![3, 1, 0, 2]);
}

#[test]
fn compares_rows_across_two_tables() {
    let ty = DataType::list(DataType::list(DataType::Utf8));
    let s = |v: &str| Value::string(v);
    let lhs = single(
        &ty,
        &[Value::List(vec![Value::List(vec![s("a")]), Value::Null])],
    );
    // Built with a nullable inner level on one side only.
    let rhs_inner = Column::new_list(
        vec![0, 1, 1],
        Column::from_strs(&["a"]),
        None,
    )
    .unwrap();
    let rhs = Table::new(vec![Column::new_list(vec![0, 2], rhs_inner, None).unwrap()]).unwrap();

    let cmp = build_row_comparator(&lhs, Some(&rhs), &[], &[]).unwrap();
    // [["a"], null] < [["a"], []] with nulls first.
    assert_eq!(cmp.compare(0, 0), Ordering::Less);

    let cmp = build_row_comparator(&lhs, Some(&rhs), &[], &[NullOrder::After]).unwrap();
    assert_eq!(cmp.compare(0, 0), Ordering::Greater);
}

#[test]
fn sliced_nested_columns_compare_by_logical_row() {
    let fields = Column::from_vec(vec![5i32, 1, 5, 2]);
    let column = Column::new_struct(4, vec![fields], Some(BitVec::from_bools(&[true; 4])))
        .unwrap()
        .slice(1, 3)
        .unwrap();
    let table = Table::new(vec![column]).unwrap();
    let cmp = build_row_comparator(&table, None, &[], &[]).unwrap();

    // Logical rows are [1, 5, 2].
    assert!(cmp.less(0, 2));
    assert!(cmp.less(2, 1));
}

#[test]
fn construction_errors_are_reported() {
    let a = Table::new(vec![Column::from_vec(vec![1i32])]).unwrap();
    let b = Table::new(vec![Column::from_vec(vec![1i64])]).unwrap();
    let two = Table::new(vec![
        Column::from_vec(vec![1i32]),
        Column::from_vec(vec![1i32]),
    ])
    .unwrap();

    assert!(matches!(
        build_row_comparator(&a, Some(&b), &[], &[]),
        Err(RowError::TypeMismatch { column: 0, .. })
    ));
    assert!(matches!(
        build_row_comparator(&a, Some(&two), &[], &[]),
        Err(RowError::ColumnCountMismatch { lhs: 1, rhs: 2 })
    ));
    assert!(matches!(
        build_row_comparator(&two, None, &[SortOrder::Ascending], &[]),
        Err(RowError::OrderLengthMismatch {
            what: "column_order",
            expected: 2,
            actual: 1
        })
    ));
    assert!(matches!(
        build_row_equality(&a, Some(&two), NullEquality::Equal, NanEquality::AllEqual),
        Err(RowError::ColumnCountMismatch { .. })
    ));
}

#[test]
fn equality_matches_comparator_on_plain_keys() {
    let table = Table::new(vec![
        Column::from_options(vec![Some(1u8), Some(1), None, None]),
        Column::from_vec(vec![0.0f32, -0.0, 1.0, 1.0]),
    ])
    .unwrap();
    let cmp = build_row_comparator(&table, None, &[], &[]).unwrap();
    let eq = build_row_equality(&table, None, NullEquality::Equal, NanEquality::AllEqual).unwrap();

    for l in 0..4 {
        for r in 0..4 {
            assert_eq!(eq.equal(l, r), cmp.compare(l, r) == Ordering::Equal, "{l} vs {r}");
        }
    }
}
