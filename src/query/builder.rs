//! Fluent query builder

use std::rc::Rc;

use crate::error::Result;
use crate::model::{CellValue, ColumnKey, Element};

use super::predicate::{JoinOn, JoinSpec, RowFilter};
use super::result::QueryResult;
use super::selection::{Direction, OrderKey, Projection, Selection};
use super::source::Source;

/// Builder accumulating clauses into a [`Selection`].
///
/// Each clause consumes the builder and returns the extended one. The
/// terminal calls borrow it, so a built query can be evaluated again or
/// cloned and extended further.
#[derive(Debug)]
pub struct Query<T = CellValue> {
    selection: Selection<T>,
}

impl<T: Clone> Clone for Query<T> {
    fn clone(&self) -> Self {
        Self {
            selection: self.selection.clone(),
        }
    }
}

impl<T> From<Selection<T>> for Query<T> {
    fn from(selection: Selection<T>) -> Self {
        Self { selection }
    }
}

impl<T: Element> Query<T> {
    /// Start a query over a table, view or earlier result
    pub fn from_source(source: impl Into<Source<T>>) -> Self {
        Self {
            selection: Selection::new(source.into()),
        }
    }

    /// Project an explicit ordered column list
    pub fn columns<I, K>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<ColumnKey>,
    {
        self.selection.projection =
            Projection::Columns(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Project every column
    pub fn all_columns(mut self) -> Self {
        self.selection.projection = Projection::All;
        self
    }

    /// Drop rows whose source position satisfies `exclude`
    pub fn exclude_rows<F>(mut self, exclude: F) -> Self
    where
        F: Fn(usize) -> bool + 'static,
    {
        self.selection
            .filters
            .push(RowFilter::ExcludeIndex(Rc::new(exclude)));
        self
    }

    /// Keep rows whose cells satisfy `keep`
    pub fn filter<F>(mut self, keep: F) -> Self
    where
        F: Fn(&[T]) -> bool + 'static,
    {
        self.selection.filters.push(RowFilter::Row(Rc::new(keep)));
        self
    }

    /// Keep rows whose `column` cell satisfies `keep`
    pub fn where_column<F>(mut self, column: impl Into<ColumnKey>, keep: F) -> Self
    where
        F: Fn(&T) -> bool + 'static,
    {
        self.selection.filters.push(RowFilter::Column {
            column: column.into(),
            test: Rc::new(keep),
        });
        self
    }

    /// Keep rows whose `column` cell equals `value`
    pub fn where_eq(self, column: impl Into<ColumnKey>, value: impl Into<T>) -> Self {
        let value = value.into();
        self.where_column(column, move |cell| *cell == value)
    }

    /// Nested-loop join with another source
    pub fn join(mut self, other: impl Into<Source<T>>, on: JoinOn<T>) -> Self {
        self.selection.joins.push(JoinSpec {
            other: other.into(),
            on,
        });
        self
    }

    /// Append an ordering term; earlier terms take precedence
    pub fn order_by(mut self, column: impl Into<ColumnKey>, direction: Direction) -> Self {
        self.selection.ordering.push(OrderKey {
            column: column.into(),
            direction,
        });
        self
    }

    /// Keep at most `n` rows after ordering
    pub fn limit(mut self, n: usize) -> Self {
        self.selection.limit = Some(n);
        self
    }

    pub fn selection(&self) -> &Selection<T> {
        &self.selection
    }

    pub fn build(self) -> Selection<T> {
        self.selection
    }

    /// Evaluate into a detached table
    pub fn result(&self) -> Result<QueryResult<T>> {
        self.selection.result()
    }

    /// Evaluate into a result that aliases the source cells
    pub fn result_view(&self) -> Result<QueryResult<T>> {
        self.selection.result_view()
    }
}
