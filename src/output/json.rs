//! JSON output format

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::model::CellValue;
use crate::query::QueryResult;

use super::OutputFormatter;

/// JSON output formatter
pub struct JsonOutput {
    pretty: bool,
}

impl JsonOutput {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct JsonResultOutput {
    source: String,
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
    /// Source row indices behind each result row
    matched: Vec<Vec<usize>>,
    row_count: usize,
}

impl OutputFormatter for JsonOutput {
    fn render(&self, result: &QueryResult, source: &Path, writer: &mut dyn Write) -> Result<()> {
        let rows = result.rows().collect::<Result<Vec<_>, _>>()?;
        let output = JsonResultOutput {
            source: source.display().to_string(),
            columns: result.schema().display_names(),
            rows,
            matched: result
                .matched_rows()
                .iter()
                .map(|r| r.indices().to_vec())
                .collect(),
            row_count: result.row_count(),
        };

        if self.pretty {
            serde_json::to_writer_pretty(&mut *writer, &output)?;
        } else {
            serde_json::to_writer(&mut *writer, &output)?;
        }
        writeln!(writer)?;

        Ok(())
    }
}
