//! Output formatting for query results

mod json;
mod terminal;

use std::io::Write;
use std::path::Path;

use anyhow::Result;

use crate::config::OutputFormat;
use crate::query::QueryResult;

pub use json::JsonOutput;
pub use terminal::TerminalOutput;

/// Trait for output formatters
pub trait OutputFormatter {
    /// Render a result read from `source` to a writer
    fn render(&self, result: &QueryResult, source: &Path, writer: &mut dyn Write) -> Result<()>;
}

/// Factory for creating output formatters
pub struct OutputFactory;

impl OutputFactory {
    /// Create an output formatter based on format type
    pub fn create(format: OutputFormat) -> Box<dyn OutputFormatter> {
        match format {
            OutputFormat::Terminal => Box::new(TerminalOutput::new()),
            OutputFormat::Json => Box::new(JsonOutput::new()),
        }
    }
}

/// Render a result to stdout
pub fn render_to_stdout(result: &QueryResult, source: &Path, format: OutputFormat) -> Result<()> {
    let formatter = OutputFactory::create(format);
    let mut stdout = std::io::stdout().lock();
    formatter.render(result, source, &mut stdout)
}
