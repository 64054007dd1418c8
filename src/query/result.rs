//! Query results: table-shaped, re-queryable and traceable to source rows

use std::fmt;
use std::rc::Rc;

use crate::collab::ElementConverter;
use crate::error::{Result, TableError};
use crate::model::{CellValue, ColumnKey, Element, Schema, Table};

use super::executor::{self, Mode};
use super::selection::Selection;
use super::source::Source;

/// Source rows a result row was built from: the primary source row first,
/// then one row per join in join order
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowRef {
    indices: Vec<usize>,
}

impl RowRef {
    pub(crate) fn new(primary: usize) -> Self {
        Self {
            indices: vec![primary],
        }
    }

    pub(crate) fn with(&self, joined: usize) -> Self {
        let mut indices = self.indices.clone();
        indices.push(joined);
        Self { indices }
    }

    /// Row index in the primary source
    pub fn primary(&self) -> usize {
        self.indices[0]
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }
}

/// Origin of a result column: which source, which column in it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRef {
    pub source: usize,
    pub column: usize,
}

enum FrameData<T> {
    Materialized(Table<T>),
    Live {
        sources: Vec<Source<T>>,
        columns: Vec<ColumnRef>,
    },
}

pub(crate) struct Frame<T> {
    schema: Schema,
    matched: Vec<RowRef>,
    data: FrameData<T>,
}

impl<T> Frame<T> {
    pub(crate) fn materialized(schema: Schema, matched: Vec<RowRef>, table: Table<T>) -> Self {
        Self {
            schema,
            matched,
            data: FrameData::Materialized(table),
        }
    }

    pub(crate) fn live(
        schema: Schema,
        matched: Vec<RowRef>,
        sources: Vec<Source<T>>,
        columns: Vec<ColumnRef>,
    ) -> Self {
        Self {
            schema,
            matched,
            data: FrameData::Live { sources, columns },
        }
    }

    pub(crate) fn row_count(&self) -> usize {
        self.matched.len()
    }
}

/// The realization of a [`Selection`].
///
/// A materialized result owns a detached table. A view-backed result owns
/// no cells: reads and writes go to the source cells, so later writes to the
/// owner show up here and writes here show up in the owner.
///
/// Iterating walks the matched rows computed at evaluation; only
/// [`QueryResult::refresh`] re-runs the selection.
pub struct QueryResult<T = CellValue> {
    selection: Rc<Selection<T>>,
    mode: Mode,
    frame: Rc<Frame<T>>,
}

impl<T> Clone for QueryResult<T> {
    fn clone(&self) -> Self {
        Self {
            selection: Rc::clone(&self.selection),
            mode: self.mode,
            frame: Rc::clone(&self.frame),
        }
    }
}

impl<T> fmt::Debug for QueryResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryResult")
            .field("mode", &self.mode)
            .field("rows", &self.frame.matched.len())
            .field("columns", &self.frame.schema.len())
            .finish()
    }
}

impl<T: Element> QueryResult<T> {
    pub(crate) fn new(selection: Rc<Selection<T>>, mode: Mode, frame: Frame<T>) -> Self {
        Self {
            selection,
            mode,
            frame: Rc::new(frame),
        }
    }

    pub fn selection(&self) -> &Selection<T> {
        &self.selection
    }

    /// Whether cells alias the sources rather than a detached copy
    pub fn is_view_backed(&self) -> bool {
        self.mode == Mode::Live
    }

    pub fn row_count(&self) -> usize {
        self.frame.matched.len()
    }

    pub fn column_count(&self) -> usize {
        self.frame.schema.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.matched.is_empty()
    }

    pub fn schema(&self) -> &Schema {
        &self.frame.schema
    }

    pub fn column_name(&self, column: usize) -> Option<&str> {
        self.frame.schema.name(column)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.frame.schema.index_of(name)
    }

    /// Source row references, in result order
    pub fn matched_rows(&self) -> &[RowRef] {
        &self.frame.matched
    }

    fn check(&self, row: usize, column: usize) -> Result<()> {
        if row >= self.row_count() || column >= self.column_count() {
            return Err(TableError::out_of_range(row, column));
        }
        Ok(())
    }

    /// Resolve a live address to (source, source row, source column)
    fn locate<'a>(
        &self,
        sources: &'a [Source<T>],
        columns: &[ColumnRef],
        row: usize,
        column: usize,
    ) -> (&'a Source<T>, usize, usize) {
        let origin = columns[column];
        let source_row = self.frame.matched[row].indices[origin.source];
        (&sources[origin.source], source_row, origin.column)
    }

    pub fn get_cell(&self, row: usize, column: usize) -> Result<T> {
        self.check(row, column)?;
        match &self.frame.data {
            FrameData::Materialized(table) => Ok(table.get_cell(row, column)),
            FrameData::Live { sources, columns } => {
                let (source, r, c) = self.locate(sources, columns, row, column);
                source.get(r, c).map_err(|e| restate(e, row, column))
            }
        }
    }

    pub fn set_cell(&self, row: usize, column: usize, value: T) -> Result<()> {
        self.check(row, column)?;
        match &self.frame.data {
            FrameData::Materialized(table) => {
                table.set_cell(row, column, value);
                Ok(())
            }
            FrameData::Live { sources, columns } => {
                let (source, r, c) = self.locate(sources, columns, row, column);
                source.set(r, c, value).map_err(|e| restate(e, row, column))
            }
        }
    }

    /// Current cells of one result row
    pub fn row(&self, row: usize) -> Result<Vec<T>> {
        (0..self.column_count())
            .map(|column| self.get_cell(row, column))
            .collect()
    }

    /// Restartable sequence over the matched rows
    pub fn rows(&self) -> ResultRows<'_, T> {
        ResultRows {
            result: self,
            next: 0,
        }
    }

    /// Re-run the selection against the current state of its sources
    pub fn refresh(&mut self) -> Result<()> {
        let fresh = executor::evaluate(&self.selection, self.mode)?;
        self.frame = fresh.frame;
        Ok(())
    }

    /// Copy the current cells into a new detached table
    pub fn to_table(&self) -> Result<Table<T>> {
        let table = Table::with_schema(self.frame.schema.clone(), self.sentinel());
        for row in self.rows() {
            table.push_row(row?);
        }
        Ok(table)
    }

    /// Converted values of one column, in result order
    pub fn convert_column<U>(
        &self,
        column: impl Into<ColumnKey>,
        converter: &dyn ElementConverter<T, U>,
    ) -> Result<Vec<U>> {
        let key = column.into();
        let index = self
            .frame
            .schema
            .resolve(&key)
            .ok_or_else(|| TableError::unknown_column(key.to_string()))?;
        (0..self.row_count())
            .map(|row| Ok(converter.convert(&self.get_cell(row, index)?)))
            .collect()
    }

    pub(crate) fn sentinel(&self) -> T {
        match &self.frame.data {
            FrameData::Materialized(table) => table.sentinel(),
            FrameData::Live { sources, .. } => sources
                .first()
                .map_or_else(T::default, |source| source.sentinel()),
        }
    }
}

/// Report staleness at the result address rather than the source address
fn restate(error: TableError, row: usize, column: usize) -> TableError {
    match error {
        TableError::StaleView { .. } => TableError::stale(row, column),
        other => other,
    }
}

/// Iterator over result rows
pub struct ResultRows<'a, T> {
    result: &'a QueryResult<T>,
    next: usize,
}

impl<T: Element> Iterator for ResultRows<'_, T> {
    type Item = Result<Vec<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.result.row_count() {
            return None;
        }
        let row = self.result.row(self.next);
        self.next += 1;
        Some(row)
    }
}

impl<'a, T: Element> IntoIterator for &'a QueryResult<T> {
    type Item = Result<Vec<T>>;
    type IntoIter = ResultRows<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{JoinOn, Query};

    fn orders() -> (Table<i64>, Table<i64>) {
        let customers = Table::from_rows(["id", "tier"], vec![vec![1, 10], vec![2, 20]]);
        let orders = Table::from_rows(["customer", "total"], vec![vec![2, 5], vec![1, 7]]);
        (customers, orders)
    }

    #[test]
    fn test_live_join_writes_reach_each_source() {
        let (customers, orders) = orders();
        let result = Query::from_source(&customers)
            .join(&orders, JoinOn::columns("id", "customer"))
            .columns(["tier", "total"])
            .result_view()
            .unwrap();

        result.set_cell(0, 0, 11).unwrap();
        result.set_cell(1, 1, 50).unwrap();
        assert_eq!(customers.get_cell(0, 1), 11);
        assert_eq!(orders.get_cell(0, 1), 50);
    }

    #[test]
    fn test_out_of_domain_address() {
        let (customers, _) = orders();
        let result = Query::from_source(&customers).result_view().unwrap();
        assert_eq!(result.get_cell(2, 0), Err(TableError::out_of_range(2, 0)));
        assert_eq!(result.get_cell(0, 2), Err(TableError::out_of_range(0, 2)));
    }

    #[test]
    fn test_to_table_detaches() {
        let (customers, _) = orders();
        let result = Query::from_source(&customers).result_view().unwrap();
        let copy = result.to_table().unwrap();

        customers.set_cell(0, 0, 99);
        assert_eq!(copy.get_cell(0, 0), 1);
        assert_eq!(copy.column_name(1).as_deref(), Some("tier"));
        assert_eq!(result.get_cell(0, 0), Ok(99));
    }

    #[test]
    fn test_convert_column() {
        let (customers, _) = orders();
        let result = Query::from_source(&customers).result().unwrap();
        let labels: Vec<String> = result
            .convert_column("tier", &|tier: &i64| format!("tier-{}", tier))
            .unwrap();
        assert_eq!(labels, vec!["tier-10", "tier-20"]);
        assert_eq!(
            result.convert_column("missing", &|v: &i64| *v).unwrap_err(),
            TableError::unknown_column("missing")
        );
    }

    #[test]
    fn test_rows_restart() {
        let (customers, _) = orders();
        let result = Query::from_source(&customers).result().unwrap();
        assert_eq!(result.rows().count(), 2);
        assert_eq!((&result).into_iter().count(), 2);
    }
}
