//! The immutable query specification

use crate::error::Result;
use crate::model::{CellValue, ColumnKey, Element};

use super::executor::{self, Mode};
use super::predicate::{JoinSpec, RowFilter};
use super::result::QueryResult;
use super::source::Source;

/// Which columns a selection produces
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Projection {
    /// Every column of the (joined) source, in order
    #[default]
    All,
    /// Explicit ordered list; duplicates and reordering permitted
    Columns(Vec<ColumnKey>),
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

/// One ordering term
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderKey {
    pub column: ColumnKey,
    pub direction: Direction,
}

/// Immutable description of a query.
///
/// Evaluating a selection never changes it, so it may be evaluated any
/// number of times.
#[derive(Debug)]
pub struct Selection<T = CellValue> {
    pub source: Source<T>,
    pub projection: Projection,
    pub filters: Vec<RowFilter<T>>,
    pub joins: Vec<JoinSpec<T>>,
    pub ordering: Vec<OrderKey>,
    pub limit: Option<usize>,
}

impl<T: Clone> Clone for Selection<T> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            projection: self.projection.clone(),
            filters: self.filters.clone(),
            joins: self.joins.clone(),
            ordering: self.ordering.clone(),
            limit: self.limit,
        }
    }
}

impl<T> Selection<T> {
    /// Select every row and column of a source
    pub fn new(source: Source<T>) -> Self {
        Self {
            source,
            projection: Projection::All,
            filters: Vec::new(),
            joins: Vec::new(),
            ordering: Vec::new(),
            limit: None,
        }
    }
}

impl<T: Element> Selection<T> {
    /// Evaluate into a detached table
    pub fn result(&self) -> Result<QueryResult<T>> {
        executor::evaluate(self, Mode::Materialized)
    }

    /// Evaluate into a result that aliases the source cells
    pub fn result_view(&self) -> Result<QueryResult<T>> {
        executor::evaluate(self, Mode::Live)
    }
}
