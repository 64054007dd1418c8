//! tabulon - query CSV and JSON tables from the command line

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use tabulon::config::{Config, FilterSpec, JoinSpecConfig, OrderSpec, OutputFormat};
use tabulon::model::ColumnKey;
use tabulon::output::render_to_stdout;
use tabulon::runner::run_query;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat {
    Terminal,
    Json,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> Self {
        match f {
            CliOutputFormat::Terminal => OutputFormat::Terminal,
            CliOutputFormat::Json => OutputFormat::Json,
        }
    }
}

/// Select, filter, join and order rows of CSV and JSON tables
#[derive(Parser, Debug)]
#[command(name = "tabulon")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input file (CSV, TSV or JSON)
    input: PathBuf,

    /// Column(s) to project, by name or `#index` (comma-separated)
    #[arg(short, long, value_delimiter = ',', value_parser = parse_key)]
    select: Vec<ColumnKey>,

    /// Keep rows where column=value (repeatable)
    #[arg(short = 'w', long = "where")]
    filters: Vec<FilterSpec>,

    /// Drop rows by position in the input (comma-separated)
    #[arg(long, value_delimiter = ',')]
    exclude_row: Vec<usize>,

    /// Join another file: path:left=right (repeatable)
    #[arg(short, long)]
    join: Vec<JoinSpecConfig>,

    /// Order by column, optionally column:desc (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    order_by: Vec<OrderSpec>,

    /// Maximum number of rows to print
    #[arg(short, long)]
    limit: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "terminal")]
    format: CliOutputFormat,

    /// Treat the first CSV line as data
    #[arg(long)]
    no_headers: bool,

    /// Log query stages to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn parse_key(s: &str) -> Result<ColumnKey, String> {
    Ok(tabulon::config::parse_column_key(s))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        // Nothing matched
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("tabulon=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tabulon=warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run(cli: Cli) -> Result<bool> {
    let config = Config {
        input: cli.input,
        columns: cli.select,
        filters: cli.filters,
        exclude_rows: cli.exclude_row,
        joins: cli.join,
        order_by: cli.order_by,
        limit: cli.limit,
        output_format: cli.format.into(),
        has_headers: !cli.no_headers,
    };

    let result = run_query(&config)?;
    render_to_stdout(&result, &config.input, config.output_format)?;

    Ok(!result.is_empty())
}
