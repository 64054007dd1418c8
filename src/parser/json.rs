//! JSON array parser

use std::borrow::Cow;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{bail, Context, Result};
use indexmap::IndexSet;
use serde_json::Value;

use crate::config::Config;
use crate::model::{CellValue, Table};

use super::Parser;

/// Parser for JSON array files
pub struct JsonParser;

impl Parser for JsonParser {
    fn parse(&self, path: &Path, _config: &Config) -> Result<Table> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open JSON file: {}", path.display()))?;
        let reader = BufReader::new(file);

        let value: Value =
            serde_json::from_reader(reader).context("Failed to parse JSON file")?;

        // Handle both arrays and single objects
        let array = match value {
            Value::Array(arr) => arr,
            Value::Object(_) => vec![value],
            _ => bail!("JSON must be an array or object"),
        };

        // Columns in first-seen key order across all objects
        let mut column_names: IndexSet<String> = IndexSet::new();
        for item in &array {
            if let Value::Object(obj) = item {
                column_names.extend(obj.keys().cloned());
            }
        }

        let table = Table::with_columns(column_names.iter().cloned());
        for item in &array {
            let cells = match item {
                Value::Object(obj) => column_names
                    .iter()
                    .map(|key| json_value_to_cell(obj.get(key)))
                    .collect(),
                // Non-object item in array: put in first column
                _ => vec![json_value_to_cell(Some(item))],
            };
            table.push_row(cells);
        }

        Ok(table)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "json")
    }
}

fn json_value_to_cell(value: Option<&Value>) -> CellValue {
    match value {
        None | Some(Value::Null) => CellValue::Null,
        Some(Value::Bool(b)) => CellValue::Bool(*b),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                CellValue::Int(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(Cow::Owned(n.to_string()))
            }
        }
        Some(Value::String(s)) => match CellValue::parse(s) {
            date @ (CellValue::Date(_) | CellValue::DateTime(_)) => date,
            _ => CellValue::String(Cow::Owned(s.clone())),
        },
        // Nested structures are kept as their JSON text
        Some(nested) => CellValue::String(Cow::Owned(nested.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_parse_array_of_objects() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[{{"id": 1, "tags": ["a"]}}, {{"id": 2, "name": "bob", "born": "1990-01-02"}}]"#
        )
        .unwrap();

        let table = JsonParser.parse(file.path(), &Config::default()).unwrap();
        assert_eq!(table.column_names(), vec!["id", "tags", "name", "born"]);
        assert_eq!(table.get_cell(0, 1), CellValue::from(r#"["a"]"#));
        assert_eq!(table.get_cell(0, 2), CellValue::Null);
        assert_eq!(table.get_cell(1, 2), CellValue::from("bob"));
        assert!(matches!(table.get_cell(1, 3), CellValue::Date(_)));
    }

    #[test]
    fn test_string_that_looks_numeric_stays_string() {
        assert_eq!(
            json_value_to_cell(Some(&Value::String("42".into()))),
            CellValue::from("42")
        );
    }
}
