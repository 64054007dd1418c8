//! CSV file parser

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::model::{CellValue, Table};

use super::Parser;

/// Parser for CSV files
pub struct CsvParser;

impl Parser for CsvParser {
    fn parse(&self, path: &Path, config: &Config) -> Result<Table> {
        let file =
            File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
        let delimiter = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
            _ => b',',
        };
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(config.has_headers)
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(BufReader::new(file));

        let table = if config.has_headers {
            let headers = csv_reader
                .headers()
                .context("Failed to read CSV headers")?
                .clone();
            Table::with_columns(headers.iter().map(str::to_string))
        } else {
            Table::new()
        };

        // Short rows are padded by the table; long rows widen it
        for (line_num, result) in csv_reader.records().enumerate() {
            let line = line_num + usize::from(config.has_headers) + 1;
            let record = result.with_context(|| format!("Failed to read CSV row {}", line))?;
            table.push_row(record.iter().map(CellValue::parse).collect());
        }

        Ok(table)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "csv" | "tsv" | "txt")
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_with_headers() {
        let file = write_temp(".csv", "id,name,score\n1,ada,3.5\n2,bob\n");
        let table = CsvParser.parse(file.path(), &Config::new(file.path().into())).unwrap();

        assert_eq!(table.column_names(), vec!["id", "name", "score"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.get_cell(0, 0), CellValue::Int(1));
        assert_eq!(table.get_cell(0, 2), CellValue::Float(3.5));
        assert_eq!(table.get_cell(1, 2), CellValue::Null);
    }

    #[test]
    fn test_parse_without_headers() {
        let file = write_temp(".tsv", "1\tx\n2\ty\tz\n");
        let config = Config::new(file.path().into()).with_has_headers(false);
        let table = CsvParser.parse(file.path(), &config).unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.column_name(0), None);
        assert_eq!(table.get_cell(0, 2), CellValue::Null);
        assert_eq!(table.get_cell(1, 2), CellValue::from("z"));
    }
}
