use pretty_assertions::assert_eq;
use strata_columnar::{Column, DataType, Table, Value};
use strata_rows::{
    build_row_equality, hash_rows, leaf_index, DremelData, NanEquality, NullEquality, RowHasher,
};

fn nested_table() -> Table {
    let ty = DataType::list(DataType::Struct(vec![DataType::Float64, DataType::Utf8]));
    let s = |f: f64, t: &str| Value::Struct(vec![Value::Float(f), Value::string(t)]);
    let column = Column::from_values(
        &ty,
        &[
            Value::List(vec![s(0.0, "a"), Value::Null]),
            Value::List(vec![s(-0.0, "a"), Value::Null]),
            Value::List(vec![s(f64::NAN, "a")]),
            Value::List(vec![s(f64::NAN, "a")]),
            Value::List(vec![s(0.0, "b")]),
            Value::Null,
            Value::Null,
        ],
    )
    .unwrap();
    Table::new(vec![column]).unwrap()
}

#[test]
fn equal_rows_hash_equally() {
    let table = nested_table();
    let eq = build_row_equality(&table, None, NullEquality::Equal, NanEquality::AllEqual).unwrap();
    let hashes = hash_rows(&table, 0).unwrap();

    let rows = table.num_rows();
    for l in 0..rows {
        for r in 0..rows {
            if eq.equal(l, r) {
                assert_eq!(hashes[l], hashes[r], "rows {l} and {r}");
            }
        }
    }
    assert!(eq.equal(0, 1));
    assert!(eq.equal(2, 3));
    assert!(eq.equal(5, 6));
    assert!(!eq.equal(0, 4));
}

#[test]
fn strict_policies_split_nulls_and_nans() {
    let table = nested_table();
    let eq = build_row_equality(&table, None, NullEquality::Unequal, NanEquality::Unequal).unwrap();

    // Row 0 holds a null list element.
    assert!(!eq.equal(0, 1));
    assert!(!eq.equal(2, 3));
    assert!(!eq.equal(5, 6));
    assert!(eq.equal(4, 4));
}

#[test]
fn compares_two_tables_of_the_same_shape() {
    let lhs = Table::new(vec![Column::from_strs(&["x", "y"])]).unwrap();
    let rhs = Table::new(vec![Column::from_opt_strs(&[Some("y"), None])]).unwrap();
    let eq = build_row_equality(&lhs, Some(&rhs), NullEquality::Equal, NanEquality::AllEqual)
        .unwrap();

    assert!(eq.equal(1, 0));
    assert!(!eq.equal(0, 0));
    assert!(!eq.equal(0, 1));

    // Hashes ignore physical nullability.
    assert_eq!(
        RowHasher::new(&lhs).hash_row(1),
        RowHasher::new(&rhs).hash_row(0)
    );
}

#[test]
fn addressing_and_levels_line_up() {
    let table = nested_table();
    let column = table.column(0).unwrap();
    let dremel = DremelData::encode(column).unwrap();

    assert_eq!(dremel.num_rows(), 7);
    assert_eq!(dremel.def_levels, vec![3, 2, 3, 2, 3, 3, 3, 0, 0]);
    assert_eq!(dremel.leaf_data_size, 7);
    // Rows 0 and 1 hold two elements each, rows 2 and 3 one each.
    assert_eq!(leaf_index(4, column), 6);
}
