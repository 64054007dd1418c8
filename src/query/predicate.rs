//! Row filters and join conditions

use std::fmt;
use std::rc::Rc;

use crate::model::ColumnKey;

use super::source::Source;

/// A row predicate. Filters combine with AND semantics.
pub enum RowFilter<T> {
    /// Drop the row at a source position when the closure returns true
    ExcludeIndex(Rc<dyn Fn(usize) -> bool>),
    /// Keep the row when the closure accepts its cells
    Row(Rc<dyn Fn(&[T]) -> bool>),
    /// Keep the row when the closure accepts the named cell
    Column {
        column: ColumnKey,
        test: Rc<dyn Fn(&T) -> bool>,
    },
}

impl<T> RowFilter<T> {
    /// Position filters never read cells and run first
    pub fn is_positional(&self) -> bool {
        matches!(self, RowFilter::ExcludeIndex(_))
    }
}

impl<T> Clone for RowFilter<T> {
    fn clone(&self) -> Self {
        match self {
            RowFilter::ExcludeIndex(f) => RowFilter::ExcludeIndex(Rc::clone(f)),
            RowFilter::Row(f) => RowFilter::Row(Rc::clone(f)),
            RowFilter::Column { column, test } => RowFilter::Column {
                column: column.clone(),
                test: Rc::clone(test),
            },
        }
    }
}

impl<T> fmt::Debug for RowFilter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowFilter::ExcludeIndex(_) => f.write_str("ExcludeIndex"),
            RowFilter::Row(_) => f.write_str("Row"),
            RowFilter::Column { column, .. } => write!(f, "Column({})", column),
        }
    }
}

/// Condition pairing a left row with a right row
pub enum JoinOn<T> {
    /// Left column equals right column
    Columns { left: ColumnKey, right: ColumnKey },
    /// Arbitrary predicate over (left cells, right cells)
    Predicate(Rc<dyn Fn(&[T], &[T]) -> bool>),
}

impl<T> JoinOn<T> {
    pub fn columns(left: impl Into<ColumnKey>, right: impl Into<ColumnKey>) -> Self {
        JoinOn::Columns {
            left: left.into(),
            right: right.into(),
        }
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&[T], &[T]) -> bool + 'static,
    {
        JoinOn::Predicate(Rc::new(f))
    }
}

impl<T> Clone for JoinOn<T> {
    fn clone(&self) -> Self {
        match self {
            JoinOn::Columns { left, right } => JoinOn::Columns {
                left: left.clone(),
                right: right.clone(),
            },
            JoinOn::Predicate(f) => JoinOn::Predicate(Rc::clone(f)),
        }
    }
}

impl<T> fmt::Debug for JoinOn<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinOn::Columns { left, right } => write!(f, "Columns({} = {})", left, right),
            JoinOn::Predicate(_) => f.write_str("Predicate"),
        }
    }
}

/// Join clause: another source together with its condition
#[derive(Debug)]
pub struct JoinSpec<T> {
    pub other: Source<T>,
    pub on: JoinOn<T>,
}

impl<T: Clone> Clone for JoinSpec<T> {
    fn clone(&self) -> Self {
        Self {
            other: self.other.clone(),
            on: self.on.clone(),
        }
    }
}
