//! Column metadata and name resolution

use std::fmt;

use serde::{Deserialize, Serialize};

/// Column metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Optional column name
    pub name: Option<String>,
}

impl Column {
    /// Create a named column
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }

    /// Create an unnamed column
    pub fn unnamed() -> Self {
        Self { name: None }
    }
}

/// Reference to a column, by position or by name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnKey {
    Index(usize),
    Name(String),
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKey::Index(i) => write!(f, "#{}", i),
            ColumnKey::Name(name) => write!(f, "{}", name),
        }
    }
}

impl From<usize> for ColumnKey {
    fn from(i: usize) -> Self {
        ColumnKey::Index(i)
    }
}

impl From<&str> for ColumnKey {
    fn from(name: &str) -> Self {
        ColumnKey::Name(name.to_string())
    }
}

impl From<String> for ColumnKey {
    fn from(name: String) -> Self {
        ColumnKey::Name(name)
    }
}

impl From<&String> for ColumnKey {
    fn from(name: &String) -> Self {
        ColumnKey::Name(name.clone())
    }
}

/// Ordered column list with name lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    pub columns: Vec<Column>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// Build a schema of named columns
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: names.into_iter().map(Column::named).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Get the name of a column by position
    pub fn name(&self, index: usize) -> Option<&str> {
        self.columns.get(index).and_then(|c| c.name.as_deref())
    }

    /// Get column index by name; the first column with the name wins
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.as_deref() == Some(name))
    }

    /// Resolve a key to a position inside this schema
    pub fn resolve(&self, key: &ColumnKey) -> Option<usize> {
        match key {
            ColumnKey::Index(i) if *i < self.columns.len() => Some(*i),
            ColumnKey::Index(_) => None,
            ColumnKey::Name(name) => self.index_of(name),
        }
    }

    /// Names for display, falling back to `column_<i>` for unnamed columns
    pub fn display_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, c)| c.name.clone().unwrap_or_else(|| format!("column_{}", i)))
            .collect()
    }

    /// Concatenate two schemas, as a join does
    pub fn concat(&self, other: &Schema) -> Schema {
        let mut columns = self.columns.clone();
        columns.extend(other.columns.iter().cloned());
        Schema { columns }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve() {
        let schema = Schema::new(vec![Column::named("id"), Column::unnamed(), Column::named("id")]);
        assert_eq!(schema.resolve(&"id".into()), Some(0));
        assert_eq!(schema.resolve(&ColumnKey::Index(1)), Some(1));
        assert_eq!(schema.resolve(&ColumnKey::Index(3)), None);
        assert_eq!(schema.resolve(&"missing".into()), None);
        assert_eq!(schema.display_names(), vec!["id", "column_1", "id"]);
    }
}
