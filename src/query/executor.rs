//! Selection evaluation.
//!
//! Stages run in a fixed order: resolve columns, filter the primary source
//! (position filters before value filters), nested-loop joins, projection,
//! ordering over the projected columns, limit, then either a detached table
//! or a live frame.

use std::cmp::Ordering;
use std::rc::Rc;

use crate::error::{Result, TableError};
use crate::model::{ColumnKey, Element, Schema, Table};

use super::predicate::{JoinOn, RowFilter};
use super::result::{ColumnRef, Frame, QueryResult, RowRef};
use super::selection::{Direction, Projection, Selection};
use super::source::Source;

/// How a result holds its cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Materialized,
    Live,
}

enum ValueFilter<T> {
    Row(Rc<dyn Fn(&[T]) -> bool>),
    Column(usize, Rc<dyn Fn(&T) -> bool>),
}

impl<T> ValueFilter<T> {
    fn accepts(&self, cells: &[T]) -> bool {
        match self {
            ValueFilter::Row(keep) => keep(cells),
            ValueFilter::Column(index, keep) => keep(&cells[*index]),
        }
    }
}

enum JoinTest<T> {
    Columns(usize, usize),
    Predicate(Rc<dyn Fn(&[T], &[T]) -> bool>),
}

impl<T: Element> JoinTest<T> {
    fn matches(&self, left: &[T], right: &[T]) -> bool {
        match self {
            JoinTest::Columns(l, r) => left[*l] == right[*r],
            JoinTest::Predicate(on) => on(left, right),
        }
    }
}

struct ResolvedJoin<T> {
    other: Source<T>,
    test: JoinTest<T>,
}

/// A selection with every column reference resolved to a position
struct Plan<T> {
    positional: Vec<Rc<dyn Fn(usize) -> bool>>,
    value_filters: Vec<ValueFilter<T>>,
    joins: Vec<ResolvedJoin<T>>,
    /// Schema of the projected columns
    schema: Schema,
    origins: Vec<ColumnRef>,
    projection: Vec<usize>,
    /// Keys into the projected columns
    ordering: Vec<(usize, Direction)>,
}

/// A surviving row: its source references and its combined cells
struct Candidate<T> {
    refs: RowRef,
    cells: Vec<T>,
}

fn resolve_key(schema: &Schema, key: &ColumnKey) -> Result<usize> {
    schema
        .resolve(key)
        .ok_or_else(|| TableError::unknown_column(key.to_string()))
}

fn plan<T: Element>(selection: &Selection<T>) -> Result<Plan<T>> {
    let primary = selection.source.schema()?;

    let mut positional = Vec::new();
    let mut value_filters = Vec::new();
    for filter in &selection.filters {
        match filter {
            RowFilter::ExcludeIndex(exclude) => positional.push(Rc::clone(exclude)),
            RowFilter::Row(keep) => value_filters.push(ValueFilter::Row(Rc::clone(keep))),
            RowFilter::Column { column, test } => {
                let index = resolve_key(&primary, column)?;
                value_filters.push(ValueFilter::Column(index, Rc::clone(test)));
            }
        }
    }

    let mut origins: Vec<ColumnRef> = (0..primary.len())
        .map(|column| ColumnRef { source: 0, column })
        .collect();
    let mut schema = primary;
    let mut joins = Vec::with_capacity(selection.joins.len());

    for (i, join) in selection.joins.iter().enumerate() {
        let right = join.other.schema()?;
        let test = match &join.on {
            JoinOn::Columns {
                left,
                right: right_key,
            } => JoinTest::Columns(resolve_key(&schema, left)?, resolve_key(&right, right_key)?),
            JoinOn::Predicate(on) => JoinTest::Predicate(Rc::clone(on)),
        };
        origins.extend((0..right.len()).map(|column| ColumnRef {
            source: i + 1,
            column,
        }));
        schema = schema.concat(&right);
        joins.push(ResolvedJoin {
            other: join.other.clone(),
            test,
        });
    }

    let projection = match &selection.projection {
        Projection::All => (0..schema.len()).collect(),
        Projection::Columns(keys) => keys
            .iter()
            .map(|key| resolve_key(&schema, key))
            .collect::<Result<Vec<_>>>()?,
    };

    let schema = Schema::new(
        projection
            .iter()
            .map(|&p| schema.columns[p].clone())
            .collect(),
    );
    let origins = projection.iter().map(|&p| origins[p]).collect();

    let ordering = selection
        .ordering
        .iter()
        .map(|key| Ok((resolve_key(&schema, &key.column)?, key.direction)))
        .collect::<Result<Vec<_>>>()?;

    Ok(Plan {
        positional,
        value_filters,
        joins,
        schema,
        origins,
        projection,
        ordering,
    })
}

fn scan<T: Element>(source: &Source<T>, plan: &Plan<T>) -> Result<Vec<Candidate<T>>> {
    let mut candidates = Vec::new();
    for row in 0..source.row_count() {
        if plan.positional.iter().any(|exclude| exclude(row)) {
            continue;
        }
        let cells = source.row(row)?;
        if plan.value_filters.iter().all(|filter| filter.accepts(&cells)) {
            candidates.push(Candidate {
                refs: RowRef::new(row),
                cells,
            });
        }
    }
    Ok(candidates)
}

/// For each left row in order, emit matching right rows in their order
fn nested_loop<T: Element>(left: Vec<Candidate<T>>, join: &ResolvedJoin<T>) -> Result<Vec<Candidate<T>>> {
    let right = (0..join.other.row_count())
        .map(|row| join.other.row(row))
        .collect::<Result<Vec<_>>>()?;

    let mut joined = Vec::new();
    for candidate in &left {
        for (index, cells) in right.iter().enumerate() {
            if join.test.matches(&candidate.cells, cells) {
                let mut combined = candidate.cells.clone();
                combined.extend_from_slice(cells);
                joined.push(Candidate {
                    refs: candidate.refs.with(index),
                    cells: combined,
                });
            }
        }
    }
    Ok(joined)
}

fn compare<T: Ord>(ordering: &[(usize, Direction)], a: &[T], b: &[T]) -> Ordering {
    for &(column, direction) in ordering {
        let ord = match direction {
            Direction::Ascending => a[column].cmp(&b[column]),
            Direction::Descending => b[column].cmp(&a[column]),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

pub(crate) fn evaluate<T: Element>(selection: &Selection<T>, mode: Mode) -> Result<QueryResult<T>> {
    let plan = plan(selection)?;

    let mut candidates = scan(&selection.source, &plan)?;
    tracing::debug!(rows = candidates.len(), "filtered primary source");

    for (i, join) in plan.joins.iter().enumerate() {
        candidates = nested_loop(candidates, join)?;
        tracing::debug!(join = i, rows = candidates.len(), "joined source");
    }

    for candidate in &mut candidates {
        candidate.cells = plan.projection.iter().map(|&p| candidate.cells[p].clone()).collect();
    }
    if !plan.ordering.is_empty() {
        // sort_by is stable: ties keep their post-join order
        candidates.sort_by(|a, b| compare(&plan.ordering, &a.cells, &b.cells));
    }
    if let Some(limit) = selection.limit {
        candidates.truncate(limit);
    }

    let frame = match mode {
        Mode::Materialized => {
            let table = Table::with_schema(plan.schema.clone(), selection.source.sentinel());
            let mut matched = Vec::with_capacity(candidates.len());
            for candidate in candidates {
                table.push_row(candidate.cells);
                matched.push(candidate.refs);
            }
            Frame::materialized(plan.schema, matched, table)
        }
        Mode::Live => {
            let mut sources = Vec::with_capacity(plan.joins.len() + 1);
            sources.push(selection.source.live()?);
            for join in &plan.joins {
                sources.push(join.other.live()?);
            }
            let matched = candidates.into_iter().map(|c| c.refs).collect();
            Frame::live(plan.schema, matched, sources, plan.origins)
        }
    };

    tracing::debug!(rows = frame.row_count(), ?mode, "selection evaluated");
    Ok(QueryResult::new(Rc::new(selection.clone()), mode, frame))
}
