//! Boxed table output for terminals

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::query::QueryResult;

use super::OutputFormatter;

/// Terminal output as a bordered grid
pub struct TerminalOutput;

impl TerminalOutput {
    pub fn new() -> Self {
        Self
    }

    fn write_header(&self, writer: &mut dyn Write, source: &Path) -> Result<()> {
        writeln!(writer, " tabulon: {}", source.display())?;
        writeln!(writer)?;
        Ok(())
    }

    fn write_rows_table(&self, result: &QueryResult, writer: &mut dyn Write) -> Result<()> {
        let mut builder = Builder::default();
        builder.push_record(result.schema().display_names());
        for row in result {
            builder.push_record(row?.iter().map(|c| c.display().into_owned()));
        }

        let mut table = builder.build();
        table.with(Style::modern());
        writeln!(writer, "{}", table)?;
        Ok(())
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for TerminalOutput {
    fn render(&self, result: &QueryResult, source: &Path, writer: &mut dyn Write) -> Result<()> {
        self.write_header(writer, source)?;

        if result.column_count() == 0 {
            writeln!(writer, "No columns selected.")?;
            return Ok(());
        }

        self.write_rows_table(result, writer)?;

        let noun = if result.row_count() == 1 { "row" } else { "rows" };
        writeln!(writer, "{} {}", result.row_count(), noun)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CellValue, Table};
    use crate::query::Query;

    #[test]
    fn test_render_grid() {
        let table = Table::from_rows(
            ["name", "age"],
            vec![
                vec![CellValue::from("ada"), CellValue::Int(36)],
                vec![CellValue::from("bob"), CellValue::Null],
            ],
        );
        let result = Query::from_source(&table).result().unwrap();

        let mut out = Vec::new();
        TerminalOutput::new()
            .render(&result, Path::new("people.csv"), &mut out)
            .unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("tabulon: people.csv"));
        assert!(text.contains("name"));
        assert!(text.contains("ada"));
        assert!(text.contains("NULL"));
        assert!(text.ends_with("2 rows\n"));
    }
}
