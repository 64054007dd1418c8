use std::cell::Cell;

use tabulon::collab::{Cache, HashCache};
use tabulon::query::{Direction, JoinOn, Query, QueryResult};
use tabulon::{Table, TableError, View};

fn rows(result: &QueryResult<i64>) -> Vec<Vec<i64>> {
    result.rows().collect::<Result<Vec<_>, _>>().unwrap()
}

fn table(rows: Vec<Vec<i64>>) -> Table<i64> {
    let names: Vec<String> = (0..rows.first().map_or(0, Vec::len))
        .map(|i| format!("c{}", i))
        .collect();
    Table::from_rows(names, rows)
}

#[test]
fn set_then_get_returns_value() {
    let t = table(vec![vec![1, 2], vec![3, 4]]);
    t.set_cell(1, 0, 30);
    assert_eq!(t.get_cell(1, 0), 30);

    // Writes past the extent grow the table, reads past it see the sentinel
    t.set_cell(3, 2, 9);
    assert_eq!(t.get_cell(3, 2), 9);
    assert_eq!(t.get_cell(2, 2), 0);
    assert_eq!(t.get_cell(10, 10), 0);
    assert_eq!((t.row_count(), t.column_count()), (4, 3));
}

#[test]
fn writes_through_a_view_reach_the_table() {
    let t = table(vec![vec![1, 2], vec![3, 4], vec![5, 6]]);
    let view = View::new(
        &t,
        tabulon::IndexMap::from_indices(vec![2, 0]),
        tabulon::IndexMap::from_indices(vec![1]),
    );

    view.set(0, 0, 60).unwrap();
    assert_eq!(t.get_cell(2, 1), 60);

    t.set_cell(0, 1, 20);
    assert_eq!(view.get(1, 0).unwrap(), 20);
}

#[test]
fn view_backed_result_aliases_its_source() {
    let t = table(vec![vec![1, 2], vec![3, 4], vec![5, 6]]);
    let result = Query::from_source(&t)
        .exclude_rows(|i| i == 0)
        .columns(["c1"])
        .result_view()
        .unwrap();
    assert!(result.is_view_backed());

    result.set_cell(0, 0, 40).unwrap();
    assert_eq!(t.get_cell(1, 1), 40);

    t.set_cell(2, 1, 66);
    assert_eq!(result.get_cell(1, 0).unwrap(), 66);
}

#[test]
fn duplicate_projected_columns() {
    let t = table(vec![vec![1, 2], vec![3, 4]]);
    let query = Query::from_source(&t).columns(["c1", "c0", "c1"]);

    let copy = query.result().unwrap();
    assert_eq!(rows(&copy), vec![vec![2, 1, 2], vec![4, 3, 4]]);
    assert_eq!(copy.column_name(2), Some("c1"));
    copy.set_cell(0, 0, 20).unwrap();
    assert_eq!(copy.get_cell(0, 2), Ok(2));

    let live = query.result_view().unwrap();
    live.set_cell(1, 0, 40).unwrap();
    assert_eq!(live.get_cell(1, 2), Ok(40));
    assert_eq!(t.get_cell(1, 1), 40);
    assert_eq!(rows(&live), vec![vec![2, 1, 2], vec![40, 3, 40]]);
}

#[test]
fn materialized_result_is_detached() {
    let t = table(vec![vec![1, 2]]);
    let result = Query::from_source(&t).result().unwrap();
    result.set_cell(0, 0, 100).unwrap();
    t.set_cell(0, 1, 200);

    assert_eq!(t.get_cell(0, 0), 1);
    assert_eq!(rows(&result), vec![vec![100, 2]]);
}

#[test]
fn all_columns_without_clauses_returns_rows_in_order() {
    let t = table(vec![vec![1, 2], vec![3, 4]]);
    let result = Query::from_source(&t).all_columns().result().unwrap();
    assert_eq!(rows(&result), vec![vec![1, 2], vec![3, 4]]);
    assert_eq!(result.column_name(1), Some("c1"));
}

#[test]
fn exclude_index_zero() {
    let t = table(vec![vec![1, 2], vec![3, 4], vec![5, 6]]);
    let result = Query::from_source(&t)
        .exclude_rows(|i| i == 0)
        .result()
        .unwrap();
    assert_eq!(rows(&result), vec![vec![3, 4], vec![5, 6]]);
}

#[test]
fn join_yields_single_matching_pair() {
    let a = table(vec![vec![1], vec![2]]);
    let b = table(vec![vec![1], vec![3]]);
    let result = Query::from_source(&a)
        .join(&b, JoinOn::columns(0usize, 0usize))
        .result()
        .unwrap();

    assert_eq!(rows(&result), vec![vec![1, 1]]);
    assert_eq!(result.matched_rows().len(), 1);
    assert_eq!(result.matched_rows()[0].indices(), &[0, 0]);
}

#[test]
fn join_with_predicate() {
    let a = table(vec![vec![1], vec![5]]);
    let b = table(vec![vec![2], vec![4], vec![6]]);
    let result = Query::from_source(&a)
        .join(&b, JoinOn::predicate(|l: &[i64], r: &[i64]| l[0] < r[0]))
        .result()
        .unwrap();
    assert_eq!(
        rows(&result),
        vec![vec![1, 2], vec![1, 4], vec![1, 6], vec![5, 6]]
    );
}

#[test]
fn join_with_empty_side_is_empty() {
    let a = table(vec![vec![1], vec![2]]);
    let empty: Table<i64> = Table::with_columns(["c0"]);
    let result = Query::from_source(&a)
        .join(&empty, JoinOn::columns(0usize, 0usize))
        .result()
        .unwrap();
    assert!(result.is_empty());
    assert_eq!(result.column_count(), 2);
}

#[test]
fn order_descending_is_stable() {
    let t = table(vec![vec![3], vec![1], vec![2]]);
    let result = Query::from_source(&t)
        .order_by(0usize, Direction::Descending)
        .result()
        .unwrap();
    assert_eq!(rows(&result), vec![vec![3], vec![2], vec![1]]);

    let t = table(vec![vec![1, 10], vec![2, 20], vec![1, 30], vec![2, 40]]);
    let result = Query::from_source(&t)
        .order_by("c0", Direction::Descending)
        .result()
        .unwrap();
    assert_eq!(
        rows(&result),
        vec![vec![2, 20], vec![2, 40], vec![1, 10], vec![1, 30]]
    );
}

#[test]
fn limit_applies_after_ordering() {
    let t = table(vec![vec![3], vec![1], vec![2]]);
    let result = Query::from_source(&t)
        .order_by(0usize, Direction::Ascending)
        .limit(2)
        .result()
        .unwrap();
    assert_eq!(rows(&result), vec![vec![1], vec![2]]);
}

#[test]
fn get_or_create_invokes_factory_once() {
    let cache: HashCache<String, u64> = HashCache::new();
    let calls = Cell::new(0);
    let factory = || {
        calls.set(calls.get() + 1);
        7
    };
    for _ in 0..10 {
        assert_eq!(cache.get_or_create("k".to_string(), &factory), 7);
    }
    assert_eq!(calls.get(), 1);
}

#[test]
fn removing_row_zero_invalidates_earlier_views() {
    let t = table(vec![vec![1], vec![2], vec![3]]);
    let before = View::of(&t);

    t.remove_row(0).unwrap();

    for row in 0..3 {
        assert_eq!(before.get(row, 0), Err(TableError::StaleView { row, column: 0 }));
    }
    let after = View::of(&t);
    assert_eq!(after.get(0, 0), Ok(2));
    assert_eq!(after.row_count(), 2);
}

#[test]
fn rows_before_a_removed_index_stay_valid() {
    let t = table(vec![vec![1], vec![2], vec![3]]);
    let view = View::of(&t);

    t.remove_row(2).unwrap();
    assert_eq!(view.get(1, 0), Ok(2));
    assert!(matches!(view.get(2, 0), Err(TableError::StaleView { .. })));
}

#[test]
fn view_backed_result_goes_stale_and_refreshes() {
    let t = table(vec![vec![1], vec![2], vec![3]]);
    let mut result = Query::from_source(&t)
        .order_by(0usize, Direction::Descending)
        .result_view()
        .unwrap();

    t.remove_row(0).unwrap();
    assert_eq!(
        result.get_cell(0, 0),
        Err(TableError::StaleView { row: 0, column: 0 })
    );

    result.refresh().unwrap();
    assert_eq!(rows(&result), vec![vec![3], vec![2]]);
}

#[test]
fn dropped_table_makes_results_stale() {
    let t = table(vec![vec![1]]);
    let result = Query::from_source(&t).result_view().unwrap();
    drop(t);
    assert!(matches!(result.get_cell(0, 0), Err(TableError::StaleView { .. })));
}

#[test]
fn results_can_be_queried_again() {
    let t = table(vec![vec![1, 9], vec![2, 8], vec![3, 7]]);
    let first = Query::from_source(&t)
        .exclude_rows(|i| i == 1)
        .result()
        .unwrap();
    let second = Query::from_source(&first)
        .columns(["c1", "c0"])
        .order_by(0usize, Direction::Ascending)
        .result()
        .unwrap();
    assert_eq!(rows(&second), vec![vec![7, 3], vec![9, 1]]);
}

#[test]
fn query_can_be_evaluated_repeatedly() {
    let t = table(vec![vec![1], vec![2]]);
    let query = Query::from_source(&t).where_eq(0usize, 2i64);

    assert_eq!(rows(&query.result().unwrap()), vec![vec![2]]);
    t.push_row(vec![2]);
    assert_eq!(rows(&query.result().unwrap()), vec![vec![2], vec![2]]);
}

#[test]
fn unknown_column_is_reported() {
    let t = table(vec![vec![1]]);
    let err = Query::from_source(&t).columns(["nope"]).result().unwrap_err();
    assert_eq!(
        err,
        TableError::UnknownColumn {
            column: "nope".into()
        }
    );
}
