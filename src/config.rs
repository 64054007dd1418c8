//! Configuration handling for tabulon

use std::path::PathBuf;

use crate::model::ColumnKey;
use crate::query::Direction;

/// Output format for query results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Terminal,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "terminal" => Ok(OutputFormat::Terminal),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Equality filter: keep rows whose `column` holds `value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub column: ColumnKey,
    pub value: String,
}

impl std::str::FromStr for FilterSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (column, value) = s
            .split_once('=')
            .ok_or_else(|| format!("Filter must look like column=value: {}", s))?;
        if column.trim().is_empty() {
            return Err(format!("Filter has no column: {}", s));
        }
        Ok(Self {
            column: parse_column_key(column),
            value: value.to_string(),
        })
    }
}

/// Join against another file on `left == right`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinSpecConfig {
    pub path: PathBuf,
    pub left: ColumnKey,
    pub right: ColumnKey,
}

impl std::str::FromStr for JoinSpecConfig {
    type Err = String;

    /// `path:left=right`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (path, on) = s
            .rsplit_once(':')
            .ok_or_else(|| format!("Join must look like path:left=right: {}", s))?;
        let (left, right) = on
            .split_once('=')
            .ok_or_else(|| format!("Join must look like path:left=right: {}", s))?;
        if path.is_empty() || left.trim().is_empty() || right.trim().is_empty() {
            return Err(format!("Incomplete join: {}", s));
        }
        Ok(Self {
            path: PathBuf::from(path),
            left: parse_column_key(left),
            right: parse_column_key(right),
        })
    }
}

/// One ordering key: `column` or `column:desc`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSpec {
    pub column: ColumnKey,
    pub direction: Direction,
}

impl std::str::FromStr for OrderSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (column, direction) = match s.rsplit_once(':') {
            Some((column, dir)) => match dir.to_lowercase().as_str() {
                "asc" => (column, Direction::Ascending),
                "desc" => (column, Direction::Descending),
                _ => return Err(format!("Unknown sort direction: {}", dir)),
            },
            None => (s, Direction::Ascending),
        };
        Ok(Self {
            column: parse_column_key(column),
            direction,
        })
    }
}

/// `#3` addresses column 3 by position; anything else is a column name
pub fn parse_column_key(s: &str) -> ColumnKey {
    let trimmed = s.trim();
    match trimmed.strip_prefix('#').map(str::parse::<usize>) {
        Some(Ok(index)) => ColumnKey::Index(index),
        _ => ColumnKey::Name(trimmed.to_string()),
    }
}

/// Configuration for a query run
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Path to the primary input file
    pub input: PathBuf,
    /// Projected columns; empty projects all
    pub columns: Vec<ColumnKey>,
    /// Equality filters, all of which must hold
    pub filters: Vec<FilterSpec>,
    /// Rows to drop by position in the primary input
    pub exclude_rows: Vec<usize>,
    /// Joins, applied in order
    pub joins: Vec<JoinSpecConfig>,
    /// Ordering keys, most significant first
    pub order_by: Vec<OrderSpec>,
    /// Maximum number of result rows
    pub limit: Option<usize>,
    /// Output format
    pub output_format: OutputFormat,
    /// Whether CSV inputs start with a header row
    pub has_headers: bool,
}

impl Config {
    /// Create a new Config reading `input`
    pub fn new(input: PathBuf) -> Self {
        Self {
            input,
            has_headers: true,
            ..Default::default()
        }
    }

    /// Set projected columns
    pub fn with_columns(mut self, columns: Vec<ColumnKey>) -> Self {
        self.columns = columns;
        self
    }

    /// Add an equality filter
    pub fn with_filter(mut self, filter: FilterSpec) -> Self {
        self.filters.push(filter);
        self
    }

    /// Drop rows by source position
    pub fn with_exclude_rows(mut self, rows: Vec<usize>) -> Self {
        self.exclude_rows = rows;
        self
    }

    /// Add a join
    pub fn with_join(mut self, join: JoinSpecConfig) -> Self {
        self.joins.push(join);
        self
    }

    /// Add an ordering key
    pub fn with_order_by(mut self, order: OrderSpec) -> Self {
        self.order_by.push(order);
        self
    }

    /// Cap the number of result rows
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set output format
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Treat the first CSV line as data rather than headers
    pub fn with_has_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }
}
