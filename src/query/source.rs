//! Query sources: tables, views and earlier results

use crate::error::{Result, TableError};
use crate::model::table::WeakStore;
use crate::model::{CellValue, Element, Schema, Table};
use crate::view::View;

use super::result::QueryResult;

#[derive(Clone)]
enum SourceKind<T> {
    Table(WeakStore<T>),
    View(View<T>),
    Result(QueryResult<T>),
}

/// Something a selection can read rows from.
///
/// Table sources are held weakly; the caller keeps the table alive.
#[derive(Clone)]
pub struct Source<T = CellValue> {
    kind: SourceKind<T>,
}

impl<T: Element> Source<T> {
    /// A live aliasing form of this source, resolved against the owner's
    /// current state
    pub(crate) fn live(&self) -> Result<Source<T>> {
        match &self.kind {
            SourceKind::Table(weak) => {
                let table = Self::upgrade(weak)?;
                Ok(Source::from(View::of(&table)))
            }
            _ => Ok(self.clone()),
        }
    }

    fn upgrade(weak: &WeakStore<T>) -> Result<Table<T>> {
        weak.upgrade()
            .map(Table::from_shared)
            .ok_or_else(|| TableError::stale(0, 0))
    }

    fn table(weak: &WeakStore<T>) -> Option<Table<T>> {
        weak.upgrade().map(Table::from_shared)
    }

    pub fn row_count(&self) -> usize {
        match &self.kind {
            SourceKind::Table(weak) => Self::table(weak).map_or(0, |t| t.row_count()),
            SourceKind::View(view) => view.row_count(),
            SourceKind::Result(result) => result.row_count(),
        }
    }

    pub fn column_count(&self) -> usize {
        match &self.kind {
            SourceKind::Table(weak) => Self::table(weak).map_or(0, |t| t.column_count()),
            SourceKind::View(view) => view.column_count(),
            SourceKind::Result(result) => result.column_count(),
        }
    }

    pub fn schema(&self) -> Result<Schema> {
        match &self.kind {
            SourceKind::Table(weak) => Ok(Self::upgrade(weak)?.schema()),
            SourceKind::View(view) => Ok(view.schema()),
            SourceKind::Result(result) => Ok(result.schema().clone()),
        }
    }

    pub fn get(&self, row: usize, column: usize) -> Result<T> {
        match &self.kind {
            SourceKind::Table(weak) => Ok(Self::upgrade(weak)?.get_cell(row, column)),
            SourceKind::View(view) => view.get(row, column),
            SourceKind::Result(result) => result.get_cell(row, column),
        }
    }

    pub fn set(&self, row: usize, column: usize, value: T) -> Result<()> {
        match &self.kind {
            SourceKind::Table(weak) => {
                Self::upgrade(weak)?.set_cell(row, column, value);
                Ok(())
            }
            SourceKind::View(view) => view.set(row, column, value),
            SourceKind::Result(result) => result.set_cell(row, column, value),
        }
    }

    /// Snapshot of one source row
    pub fn row(&self, row: usize) -> Result<Vec<T>> {
        match &self.kind {
            SourceKind::Table(weak) => {
                let table = Self::upgrade(weak)?;
                table.row(row).ok_or_else(|| TableError::out_of_range(row, 0))
            }
            SourceKind::View(view) => view.row(row),
            SourceKind::Result(result) => result.row(row),
        }
    }

    /// Sentinel for cells a materialized copy has no value for
    pub fn sentinel(&self) -> T {
        match &self.kind {
            SourceKind::Table(weak) => Self::table(weak).map_or_else(T::default, |t| t.sentinel()),
            SourceKind::View(view) => view.sentinel().unwrap_or_default(),
            SourceKind::Result(result) => result.sentinel(),
        }
    }
}

impl<T: Clone> From<&Table<T>> for Source<T> {
    fn from(table: &Table<T>) -> Self {
        Self {
            kind: SourceKind::Table(table.downgrade()),
        }
    }
}

impl<T> From<View<T>> for Source<T> {
    fn from(view: View<T>) -> Self {
        Self {
            kind: SourceKind::View(view),
        }
    }
}

impl<T> From<&View<T>> for Source<T> {
    fn from(view: &View<T>) -> Self {
        Self {
            kind: SourceKind::View(view.clone()),
        }
    }
}

impl<T> From<QueryResult<T>> for Source<T> {
    fn from(result: QueryResult<T>) -> Self {
        Self {
            kind: SourceKind::Result(result),
        }
    }
}

impl<T> From<&QueryResult<T>> for Source<T> {
    fn from(result: &QueryResult<T>) -> Self {
        Self {
            kind: SourceKind::Result(result.clone()),
        }
    }
}

impl<T> std::fmt::Debug for Source<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            SourceKind::Table(_) => f.write_str("Source::Table"),
            SourceKind::View(view) => write!(f, "Source::View({:?})", view),
            SourceKind::Result(_) => f.write_str("Source::Result"),
        }
    }
}
