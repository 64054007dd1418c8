//! Non-owning, index-translated views over tables and other views
//!
//! A view never holds cells. It keeps a weak reference to the owning store
//! plus a row map and a column map from view coordinates to owner
//! coordinates. A view of a view composes the maps, so every access is a
//! single translation followed by a single store access.
//!
//! Invalidation follows snapshot-and-fail: a view records the owner's
//! modification count when it is created. If the owner later removes a row
//! (or column) at index `i`, every owner row (or column) `>= i` becomes stale
//! for that view and accessing it fails with [`TableError::StaleView`].
//! Inserts never invalidate; the view then addresses the live, shifted rows.

use std::fmt;
use std::ops::Range;
use std::rc::Rc;

use crate::error::{Result, TableError};
use crate::model::table::{SharedStore, WeakStore};
use crate::model::{CellValue, Schema, Table};

/// A translation from a dense domain `0..len` to target indices
#[derive(Clone)]
pub struct IndexMap {
    len: usize,
    map: Rc<dyn Fn(usize) -> Option<usize>>,
}

impl IndexMap {
    /// `i -> i` over `0..len`
    pub fn identity(len: usize) -> Self {
        Self {
            len,
            map: Rc::new(|i: usize| Some(i)),
        }
    }

    /// `i -> start + i` over `0..len`
    pub fn range(range: Range<usize>) -> Self {
        let start = range.start;
        Self {
            len: range.len(),
            map: Rc::new(move |i: usize| Some(start + i)),
        }
    }

    /// `i -> indices[i]`
    pub fn from_indices(indices: Vec<usize>) -> Self {
        let len = indices.len();
        Self {
            len,
            map: Rc::new(move |i: usize| indices.get(i).copied()),
        }
    }

    /// Arbitrary translation over `0..len`
    pub fn from_fn<F>(len: usize, f: F) -> Self
    where
        F: Fn(usize) -> usize + 'static,
    {
        Self {
            len,
            map: Rc::new(move |i: usize| Some(f(i))),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Translate an index; `None` outside the domain
    pub fn apply(&self, index: usize) -> Option<usize> {
        if index >= self.len {
            return None;
        }
        (self.map)(index)
    }

    /// Compose: translate with `self`, then with `inner`
    pub fn then(&self, inner: &IndexMap) -> IndexMap {
        let outer = self.clone();
        let inner = inner.clone();
        IndexMap {
            len: self.len,
            map: Rc::new(move |i: usize| outer.apply(i).and_then(|j| inner.apply(j))),
        }
    }
}

impl fmt::Debug for IndexMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexMap")
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

/// Anything a view can be built over
pub trait ViewTarget<T> {
    /// A view covering the whole target
    fn as_view(&self) -> View<T>;
}

/// Aliasing overlay onto a table. Not safe for concurrent mutation.
pub struct View<T = CellValue> {
    owner: WeakStore<T>,
    rows: IndexMap,
    columns: IndexMap,
    /// Owner modification count when the oldest view in the chain was built
    epoch: u64,
}

impl<T> Clone for View<T> {
    fn clone(&self) -> Self {
        Self {
            owner: self.owner.clone(),
            rows: self.rows.clone(),
            columns: self.columns.clone(),
            epoch: self.epoch,
        }
    }
}

impl<T> fmt::Debug for View<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("rows", &self.rows.len())
            .field("columns", &self.columns.len())
            .field("epoch", &self.epoch)
            .finish()
    }
}

impl<T: Clone> View<T> {
    /// Identity view over the table's extent at creation
    pub fn of(table: &Table<T>) -> Self {
        let store = table.store().borrow();
        Self {
            owner: table.downgrade(),
            rows: IndexMap::identity(store.row_count()),
            columns: IndexMap::identity(store.column_count()),
            epoch: store.mod_count(),
        }
    }

    /// View over `target` through the given maps
    pub fn new(target: &impl ViewTarget<T>, rows: IndexMap, columns: IndexMap) -> Self {
        target.as_view().restrict(rows, columns)
    }

    /// View selecting the given target rows, all columns
    pub fn rows(target: &impl ViewTarget<T>, indices: Vec<usize>) -> Self {
        let base = target.as_view();
        let columns = IndexMap::identity(base.column_count());
        base.restrict(IndexMap::from_indices(indices), columns)
    }

    /// View selecting the given target columns, all rows
    pub fn columns(target: &impl ViewTarget<T>, indices: Vec<usize>) -> Self {
        let base = target.as_view();
        let rows = IndexMap::identity(base.row_count());
        base.restrict(rows, IndexMap::from_indices(indices))
    }

    /// View over a contiguous row range, all columns
    pub fn slice(target: &impl ViewTarget<T>, rows: Range<usize>) -> Self {
        let base = target.as_view();
        let columns = IndexMap::identity(base.column_count());
        base.restrict(IndexMap::range(rows), columns)
    }

    /// A view of this view: maps are composed, nothing is copied
    pub fn restrict(&self, rows: IndexMap, columns: IndexMap) -> Self {
        Self {
            owner: self.owner.clone(),
            rows: rows.then(&self.rows),
            columns: columns.then(&self.columns),
            epoch: self.epoch,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn owner(&self, row: usize, column: usize) -> Result<SharedStore<T>> {
        self.owner
            .upgrade()
            .ok_or_else(|| TableError::stale(row, column))
    }

    /// Translate a view address to owner coordinates
    fn translate(&self, row: usize, column: usize) -> Result<(usize, usize)> {
        match (self.rows.apply(row), self.columns.apply(column)) {
            (Some(r), Some(c)) => Ok((r, c)),
            _ => Err(TableError::out_of_range(row, column)),
        }
    }

    pub fn get(&self, row: usize, column: usize) -> Result<T> {
        let (r, c) = self.translate(row, column)?;
        let owner = self.owner(row, column)?;
        let store = owner.borrow();
        if !store.is_fresh(self.epoch, r, c) {
            return Err(TableError::stale(row, column));
        }
        Ok(store.get(r, c))
    }

    /// Write through to the owning table
    pub fn set(&self, row: usize, column: usize, value: T) -> Result<()> {
        let (r, c) = self.translate(row, column)?;
        let owner = self.owner(row, column)?;
        let mut store = owner.borrow_mut();
        if !store.is_fresh(self.epoch, r, c) {
            return Err(TableError::stale(row, column));
        }
        store.set(r, c, value);
        Ok(())
    }

    /// Snapshot of a view row
    pub fn row(&self, row: usize) -> Result<Vec<T>> {
        (0..self.column_count()).map(|c| self.get(row, c)).collect()
    }

    /// Name of a view column as recorded by the owner
    pub fn column_name(&self, column: usize) -> Option<String> {
        let c = self.columns.apply(column)?;
        let owner = self.owner.upgrade()?;
        let store = owner.borrow();
        let name = store.schema().name(c).map(str::to_string);
        name
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        (0..self.column_count()).find(|&c| self.column_name(c).as_deref() == Some(name))
    }

    pub fn schema(&self) -> Schema {
        Schema::new(
            (0..self.column_count())
                .map(|c| crate::model::Column {
                    name: self.column_name(c),
                })
                .collect(),
        )
    }

    /// Owner's empty sentinel, if the owner is still alive
    pub fn sentinel(&self) -> Option<T> {
        let owner = self.owner.upgrade()?;
        let sentinel = owner.borrow().sentinel().clone();
        Some(sentinel)
    }

    /// Whether both views alias the same owning table
    pub fn same_owner(&self, other: &View<T>) -> bool {
        self.owner.ptr_eq(&other.owner)
    }
}

impl<T: Clone> ViewTarget<T> for Table<T> {
    fn as_view(&self) -> View<T> {
        View::of(self)
    }
}

impl<T: Clone> ViewTarget<T> for View<T> {
    fn as_view(&self) -> View<T> {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table<i64> {
        Table::from_rows(
            ["a", "b", "c"],
            vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]],
        )
    }

    #[test]
    fn test_index_map_composition() {
        let outer = IndexMap::from_indices(vec![2, 0]);
        let inner = IndexMap::range(10..13);
        let composed = outer.then(&inner);
        assert_eq!(composed.len(), 2);
        assert_eq!(composed.apply(0), Some(12));
        assert_eq!(composed.apply(1), Some(10));
        assert_eq!(composed.apply(2), None);

        // Inner domain still bounds the composition
        let wide = IndexMap::from_indices(vec![5]).then(&inner);
        assert_eq!(wide.apply(0), None);
    }

    #[test]
    fn test_write_through_view_reaches_table() {
        let table = sample();
        let view = View::new(
            &table,
            IndexMap::from_indices(vec![2, 1]),
            IndexMap::from_indices(vec![1]),
        );
        assert_eq!(view.get(0, 0), Ok(8));

        view.set(1, 0, 50).unwrap();
        assert_eq!(table.get_cell(1, 1), 50);
    }

    #[test]
    fn test_table_writes_visible_through_view() {
        let table = sample();
        let view = View::slice(&table, 1..3);
        table.set_cell(2, 2, 90);
        assert_eq!(view.get(1, 2), Ok(90));
    }

    #[test]
    fn test_view_of_view_composes() {
        let table = sample();
        let bottom = View::slice(&table, 1..3);
        let top = View::columns(&bottom, vec![2, 0]);
        assert_eq!(top.row_count(), 2);
        assert_eq!(top.column_count(), 2);
        assert_eq!(top.row(1), Ok(vec![9, 7]));
        assert_eq!(top.column_name(0).as_deref(), Some("c"));

        top.set(0, 1, 40).unwrap();
        assert_eq!(table.get_cell(1, 0), 40);
        assert_eq!(bottom.get(0, 0), Ok(40));
    }

    #[test]
    fn test_counts_come_from_domain() {
        let table = sample();
        let view = View::rows(&table, vec![0, 0, 1, 2]);
        table.push_row(vec![10, 11, 12]);
        assert_eq!(view.row_count(), 4);
        assert_eq!(
            view.get(4, 0),
            Err(TableError::IndexOutOfRange { row: 4, column: 0 })
        );
    }

    #[test]
    fn test_remove_row_invalidates_rows_at_or_after() {
        let table = sample();
        let view = View::of(&table);
        table.remove_row(1).unwrap();

        assert_eq!(view.get(0, 0), Ok(1));
        assert_eq!(view.get(1, 0), Err(TableError::StaleView { row: 1, column: 0 }));
        assert_eq!(view.get(2, 0), Err(TableError::StaleView { row: 2, column: 0 }));
        assert!(view.set(1, 0, 0).is_err());

        // A view built after the removal sees the shifted rows
        let fresh = View::of(&table);
        assert_eq!(fresh.get(1, 0), Ok(7));
    }

    #[test]
    fn test_remove_column_invalidates_columns_at_or_after() {
        let table = sample();
        let view = View::of(&table);
        table.remove_column(2).unwrap();
        assert_eq!(view.get(0, 1), Ok(2));
        assert_eq!(view.get(0, 2), Err(TableError::StaleView { row: 0, column: 2 }));
    }

    #[test]
    fn test_composed_view_inherits_staleness() {
        let table = sample();
        let base = View::of(&table);
        table.remove_row(0).unwrap();
        let derived = View::slice(&base, 0..1);
        assert!(matches!(derived.get(0, 0), Err(TableError::StaleView { .. })));
    }

    #[test]
    fn test_insert_keeps_view_live() {
        let table = sample();
        let view = View::of(&table);
        table.insert_row(0, vec![0, 0, 0]).unwrap();
        assert_eq!(view.get(0, 0), Ok(0));
        assert_eq!(view.get(1, 0), Ok(1));
    }

    #[test]
    fn test_dropped_owner_is_stale() {
        let table = sample();
        let view = View::of(&table);
        drop(table);
        assert_eq!(view.get(0, 0), Err(TableError::StaleView { row: 0, column: 0 }));
        assert_eq!(view.sentinel(), None);
    }
}
