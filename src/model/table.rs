//! Table store: the owner of every cell

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::collab::Factory;
use crate::error::{Result, TableError};

use super::schema::{Column, Schema};
use super::value::CellValue;

/// Axis of a structural change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Axis {
    Row,
    Column,
}

/// A logged shrink: `index` was removed along `axis` at modification `epoch`
#[derive(Debug, Clone, Copy)]
struct Shrink {
    epoch: u64,
    axis: Axis,
    index: usize,
}

/// Cell storage shared by a table handle and its weak aliases
pub(crate) struct Store<T> {
    /// Rectangular: every row holds exactly `schema.len()` cells
    rows: Vec<Vec<T>>,
    schema: Schema,
    empty: T,
    mod_count: u64,
    shrinks: Vec<Shrink>,
}

pub(crate) type SharedStore<T> = Rc<RefCell<Store<T>>>;
pub(crate) type WeakStore<T> = Weak<RefCell<Store<T>>>;

impl<T: Clone> Store<T> {
    fn new(schema: Schema, empty: T) -> Self {
        Self {
            rows: Vec::new(),
            schema,
            empty,
            mod_count: 0,
            shrinks: Vec::new(),
        }
    }

    pub(crate) fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub(crate) fn column_count(&self) -> usize {
        self.schema.len()
    }

    pub(crate) fn schema(&self) -> &Schema {
        &self.schema
    }

    pub(crate) fn sentinel(&self) -> &T {
        &self.empty
    }

    pub(crate) fn mod_count(&self) -> u64 {
        self.mod_count
    }

    pub(crate) fn get(&self, row: usize, column: usize) -> T {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .cloned()
            .unwrap_or_else(|| self.empty.clone())
    }

    pub(crate) fn set(&mut self, row: usize, column: usize, value: T) {
        self.ensure_extent(row + 1, column + 1);
        self.rows[row][column] = value;
    }

    /// Grow to at least `rows` x `columns`; growth is a structural change
    fn ensure_extent(&mut self, rows: usize, columns: usize) {
        let mut grown = false;
        if columns > self.schema.len() {
            self.schema.columns.resize(columns, Column::unnamed());
            for cells in &mut self.rows {
                cells.resize(columns, self.empty.clone());
            }
            grown = true;
        }
        if rows > self.rows.len() {
            let width = self.schema.len();
            let empty = self.empty.clone();
            self.rows.resize_with(rows, || vec![empty.clone(); width]);
            grown = true;
        }
        if grown {
            self.mod_count += 1;
        }
    }

    fn normalize_row(&mut self, values: Vec<T>) -> Vec<T> {
        if values.len() > self.schema.len() {
            self.ensure_extent(self.rows.len(), values.len());
        }
        let mut cells = values;
        cells.resize(self.schema.len(), self.empty.clone());
        cells
    }

    fn record_shrink(&mut self, axis: Axis, index: usize) {
        self.mod_count += 1;
        self.shrinks.push(Shrink {
            epoch: self.mod_count,
            axis,
            index,
        });
        tracing::trace!(?axis, index, epoch = self.mod_count, "table shrank");
    }

    /// Whether `(row, column)` is still the cell an alias created at `since` addressed
    pub(crate) fn is_fresh(&self, since: u64, row: usize, column: usize) -> bool {
        !self
            .shrinks
            .iter()
            .rev()
            .take_while(|s| s.epoch > since)
            .any(|s| match s.axis {
                Axis::Row => row >= s.index,
                Axis::Column => column >= s.index,
            })
    }
}

/// A mutable row/column store.
///
/// `Table` is a handle: cloning it yields another handle to the same cells.
/// Views and view-backed results keep only weak references, so the cells
/// live exactly as long as some `Table` handle does.
///
/// Not safe for concurrent mutation; the handle is `!Send` and `!Sync`.
pub struct Table<T = CellValue> {
    inner: SharedStore<T>,
}

impl<T> Clone for Table<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Default> Default for Table<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Default> Table<T> {
    /// Create an empty table whose sentinel is `T::default()`
    pub fn new() -> Self {
        Self::with_sentinel(T::default())
    }

    /// Create an empty table with named columns
    pub fn with_columns<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_store(Store::new(Schema::from_names(names), T::default()))
    }

    /// Create a table from named columns and row values
    pub fn from_rows<I, S>(names: I, rows: Vec<Vec<T>>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let table = Self::with_columns(names);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    /// Create a `rows` x `columns` table with every cell produced by `factory`
    pub fn filled(rows: usize, columns: usize, factory: &dyn Factory<T>) -> Self {
        let table = Self::new();
        {
            let mut store = table.inner.borrow_mut();
            store.schema.columns = vec![Column::unnamed(); columns];
            store.rows = (0..rows)
                .map(|_| (0..columns).map(|_| factory.new_instance()).collect())
                .collect();
        }
        table
    }
}

impl<T: Clone> Table<T> {
    /// Create an empty table with an explicit empty sentinel
    pub fn with_sentinel(empty: T) -> Self {
        Self::from_store(Store::new(Schema::default(), empty))
    }

    pub(crate) fn with_schema(schema: Schema, empty: T) -> Self {
        Self::from_store(Store::new(schema, empty))
    }

    fn from_store(store: Store<T>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(store)),
        }
    }

    pub(crate) fn from_shared(inner: SharedStore<T>) -> Self {
        Self { inner }
    }

    pub(crate) fn downgrade(&self) -> WeakStore<T> {
        Rc::downgrade(&self.inner)
    }

    pub(crate) fn store(&self) -> &SharedStore<T> {
        &self.inner
    }

    /// Whether two handles address the same cells
    pub fn ptr_eq(&self, other: &Table<T>) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// The value returned for cells outside the populated extent
    pub fn sentinel(&self) -> T {
        self.inner.borrow().empty.clone()
    }

    /// Read a cell; addresses beyond the extent yield the sentinel
    pub fn get_cell(&self, row: usize, column: usize) -> T {
        self.inner.borrow().get(row, column)
    }

    /// Write a cell, growing the matrix when the address is beyond it
    pub fn set_cell(&self, row: usize, column: usize, value: T) {
        self.inner.borrow_mut().set(row, column, value);
    }

    pub fn row_count(&self) -> usize {
        self.inner.borrow().row_count()
    }

    pub fn column_count(&self) -> usize {
        self.inner.borrow().column_count()
    }

    /// Snapshot of a row's cells
    pub fn row(&self, index: usize) -> Option<Vec<T>> {
        self.inner.borrow().rows.get(index).cloned()
    }

    /// Append a row and return its index
    pub fn push_row(&self, values: Vec<T>) -> usize {
        let mut store = self.inner.borrow_mut();
        let cells = store.normalize_row(values);
        store.rows.push(cells);
        store.mod_count += 1;
        store.rows.len() - 1
    }

    /// Insert a row before `index`, shifting later rows down by one
    pub fn insert_row(&self, index: usize, values: Vec<T>) -> Result<()> {
        let mut store = self.inner.borrow_mut();
        if index > store.rows.len() {
            return Err(TableError::out_of_range(index, 0));
        }
        let cells = store.normalize_row(values);
        store.rows.insert(index, cells);
        store.mod_count += 1;
        Ok(())
    }

    /// Remove a row, shifting later rows up by one.
    ///
    /// Views that address any row at or after `index` become stale.
    pub fn remove_row(&self, index: usize) -> Result<Vec<T>> {
        let mut store = self.inner.borrow_mut();
        if index >= store.rows.len() {
            return Err(TableError::out_of_range(index, 0));
        }
        let removed = store.rows.remove(index);
        store.record_shrink(Axis::Row, index);
        Ok(removed)
    }

    /// Insert a column before `index`, padding every row with the sentinel
    pub fn insert_column(&self, index: usize, name: Option<String>) -> Result<()> {
        let mut store = self.inner.borrow_mut();
        if index > store.schema.len() {
            return Err(TableError::out_of_range(0, index));
        }
        store.schema.columns.insert(index, Column { name });
        let empty = store.empty.clone();
        for cells in &mut store.rows {
            cells.insert(index, empty.clone());
        }
        store.mod_count += 1;
        Ok(())
    }

    /// Remove a column; views that address any column at or after `index` become stale
    pub fn remove_column(&self, index: usize) -> Result<()> {
        let mut store = self.inner.borrow_mut();
        if index >= store.schema.len() {
            return Err(TableError::out_of_range(0, index));
        }
        store.schema.columns.remove(index);
        for cells in &mut store.rows {
            cells.remove(index);
        }
        store.record_shrink(Axis::Column, index);
        Ok(())
    }

    /// Remove every row, keeping the columns
    pub fn clear(&self) {
        let mut store = self.inner.borrow_mut();
        store.rows.clear();
        store.record_shrink(Axis::Row, 0);
    }

    pub fn column_name(&self, index: usize) -> Option<String> {
        self.inner.borrow().schema.name(index).map(str::to_string)
    }

    /// Name a column, growing the column extent if needed
    pub fn set_column_name(&self, index: usize, name: impl Into<String>) {
        let mut store = self.inner.borrow_mut();
        let rows = store.rows.len();
        store.ensure_extent(rows, index + 1);
        store.schema.columns[index].name = Some(name.into());
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.inner.borrow().schema.index_of(name)
    }

    pub fn schema(&self) -> Schema {
        self.inner.borrow().schema.clone()
    }

    /// Column names, with `column_<i>` standing in for unnamed columns
    pub fn column_names(&self) -> Vec<String> {
        self.inner.borrow().schema.display_names()
    }

    /// Iterate row snapshots, failing fast on structural change
    pub fn iter(&self) -> TableRows<T> {
        TableRows {
            table: self.clone(),
            next: 0,
            expected: self.inner.borrow().mod_count,
            done: false,
        }
    }
}

impl<T> fmt::Debug for Table<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(store) => f
                .debug_struct("Table")
                .field("rows", &store.rows.len())
                .field("columns", &store.schema.len())
                .field("mod_count", &store.mod_count)
                .finish(),
            Err(_) => f.write_str("Table { <borrowed> }"),
        }
    }
}

/// Fail-fast row iterator over a table
pub struct TableRows<T> {
    table: Table<T>,
    next: usize,
    expected: u64,
    done: bool,
}

impl<T: Clone> Iterator for TableRows<T> {
    type Item = Result<Vec<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let store = self.table.inner.borrow();
        if store.mod_count != self.expected {
            self.done = true;
            return Some(Err(TableError::ConcurrentStructuralChange {
                expected: self.expected,
                found: store.mod_count,
            }));
        }
        match store.rows.get(self.next) {
            Some(cells) => {
                self.next += 1;
                Some(Ok(cells.clone()))
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}
