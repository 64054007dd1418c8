//! Turns a [`Config`] into a query over loaded files

use anyhow::{Context, Result};
use rustc_hash::FxHashSet;

use crate::config::Config;
use crate::model::{CellValue, Table};
use crate::parser::ParserFactory;
use crate::query::{JoinOn, Query, QueryResult};

/// Load every input named by `config` and evaluate the query against them.
///
/// The result is materialized, so it outlives the loaded tables.
pub fn run_query(config: &Config) -> Result<QueryResult> {
    let factory = ParserFactory::new();
    let primary = factory
        .parse(&config.input, config)
        .with_context(|| format!("Failed to load input: {}", config.input.display()))?;

    let joined = config
        .joins
        .iter()
        .map(|join| {
            factory
                .parse(&join.path, config)
                .with_context(|| format!("Failed to load join input: {}", join.path.display()))
        })
        .collect::<Result<Vec<Table>>>()?;

    let query = build_query(config, &primary, &joined);
    let result = query.result().context("Query failed")?;
    tracing::info!(rows = result.row_count(), columns = result.column_count(), "query complete");
    Ok(result)
}

/// Query equivalent of `config` over already loaded tables
pub fn build_query(config: &Config, primary: &Table, joined: &[Table]) -> Query {
    let mut query = Query::from_source(primary);

    if !config.exclude_rows.is_empty() {
        let excluded: FxHashSet<usize> = config.exclude_rows.iter().copied().collect();
        query = query.exclude_rows(move |row| excluded.contains(&row));
    }
    for filter in &config.filters {
        query = query.where_eq(filter.column.clone(), CellValue::parse(&filter.value));
    }
    for (join, table) in config.joins.iter().zip(joined) {
        query = query.join(table, JoinOn::columns(join.left.clone(), join.right.clone()));
    }
    for order in &config.order_by {
        query = query.order_by(order.column.clone(), order.direction);
    }
    if !config.columns.is_empty() {
        query = query.columns(config.columns.iter().cloned());
    }
    if let Some(limit) = config.limit {
        query = query.limit(limit);
    }
    query
}
