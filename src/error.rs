//! Error types for table, view and query operations

use thiserror::Error;

/// Convenience alias for engine results
pub type Result<T> = std::result::Result<T, TableError>;

/// Errors surfaced by the engine. Every variant carries the offending
/// address or identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// Address outside the valid domain of a table, view or result
    #[error("index out of range: row {row}, column {column}")]
    IndexOutOfRange { row: usize, column: usize },

    /// Projection, predicate, join or ordering names a column that does not exist
    #[error("unknown column: {column}")]
    UnknownColumn { column: String },

    /// Record accessor that cannot be bound to any column
    #[error("accessor `{accessor}` of `{record}` does not map to any column")]
    UnmappableAccessor { record: String, accessor: String },

    /// View address invalidated by a structural shrink of its owner
    #[error("stale view: row {row}, column {column} was invalidated by a structural change")]
    StaleView { row: usize, column: usize },

    /// Store was structurally modified while being iterated
    #[error("concurrent structural change: expected modification count {expected}, found {found}")]
    ConcurrentStructuralChange { expected: u64, found: u64 },
}

impl TableError {
    pub fn out_of_range(row: usize, column: usize) -> Self {
        TableError::IndexOutOfRange { row, column }
    }

    pub fn unknown_column(column: impl Into<String>) -> Self {
        TableError::UnknownColumn {
            column: column.into(),
        }
    }

    pub fn stale(row: usize, column: usize) -> Self {
        TableError::StaleView { row, column }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_identifiers() {
        let err = TableError::unknown_column("salary");
        assert_eq!(err.to_string(), "unknown column: salary");

        let err = TableError::out_of_range(4, 2);
        assert!(err.to_string().contains("row 4"));
        assert!(err.to_string().contains("column 2"));
    }
}
