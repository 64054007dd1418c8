//! Parser layer for loading tabular files into tables

mod csv;
mod json;

use std::path::Path;

use anyhow::{bail, Result};

use crate::config::Config;
use crate::model::Table;

pub use self::csv::CsvParser;
pub use self::json::JsonParser;

/// Trait for loading tabular data files
pub trait Parser {
    /// Parse a file into a new table
    fn parse(&self, path: &Path, config: &Config) -> Result<Table>;

    /// Check if this parser can handle the given file extension
    fn supports_extension(&self, ext: &str) -> bool;
}

/// Picks a parser by file extension
pub struct ParserFactory {
    parsers: Vec<Box<dyn Parser>>,
}

impl Default for ParserFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserFactory {
    /// Create a factory with every supported parser
    pub fn new() -> Self {
        Self {
            parsers: vec![Box::new(CsvParser), Box::new(JsonParser)],
        }
    }

    /// Get a parser for the given file path; files without an extension
    /// are sniffed
    pub fn get_parser(&self, path: &Path) -> Result<&dyn Parser> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .or_else(|| detect_format(path).map(str::to_string))
            .unwrap_or_default();

        for parser in &self.parsers {
            if parser.supports_extension(&ext) {
                return Ok(parser.as_ref());
            }
        }

        bail!(
            "Unsupported file format: {}",
            if ext.is_empty() { "unknown" } else { ext.as_str() }
        )
    }

    /// Parse a file using the appropriate parser
    pub fn parse(&self, path: &Path, config: &Config) -> Result<Table> {
        let parser = self.get_parser(path)?;
        let table = parser.parse(path, config)?;
        tracing::debug!(
            path = %path.display(),
            rows = table.row_count(),
            columns = table.column_count(),
            "loaded table"
        );
        Ok(table)
    }
}

/// Detect file format from content (for files without extension)
pub fn detect_format(path: &Path) -> Option<&'static str> {
    use std::fs::File;
    use std::io::{BufRead, BufReader};

    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    let mut line = String::new();
    reader.read_line(&mut line).ok()?;
    if line.is_empty() {
        return None;
    }

    let trimmed = line.trim_start();
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        return Some("json");
    }

    Some("csv")
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_sniffs_files_without_extension() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"[{{"a": 1}}]"#).unwrap();
        assert_eq!(detect_format(file.path()), Some("json"));

        let factory = ParserFactory::new();
        let table = factory.parse(file.path(), &Config::default()).unwrap();
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_rejects_unknown_extension() {
        let factory = ParserFactory::new();
        let err = factory.get_parser(Path::new("data.xlsx")).err().unwrap();
        assert!(err.to_string().contains("xlsx"));
    }
}
