mod error;

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use gridsource_lib::DataSource;
use gridsource_lib::DataSourceOptions;
use gridsource_lib::DataSourceSnapshot;
use gridsource_lib::fetch::SourceRead;
use gridsource_lib::model::ColumnDef;
use gridsource_lib::model::Item;
use gridsource_lib::pagination::Pager;
use gridsource_lib::pagination::Pagination;
use gridsource_lib::pipeline::Direction;
use simplelog::Config;
use simplelog::LevelFilter;
use simplelog::WriteLogger;

use crate::error::CliError;
use crate::error::Result;

/// Run a JSON row set through the filter, sort and page pipeline.
#[derive(Parser, Debug)]
#[command(name = "gridsource", version, about)]
struct Cli {
    /// JSON file holding an array of row objects (stdin if omitted)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Column filter, repeatable: FIELD=TEXT
    #[arg(short, long = "filter", value_name = "FIELD=TEXT")]
    filters: Vec<String>,

    /// Sort key, repeatable and applied in order: FIELD[:asc|desc]
    #[arg(short, long = "sort", value_name = "FIELD[:DIR]")]
    sorts: Vec<String>,

    /// Page to show (1-based)
    #[arg(short, long, default_value_t = 1)]
    page: usize,

    /// Rows per page
    #[arg(long)]
    page_size: Option<usize>,

    /// Return every matching row instead of one page
    #[arg(long)]
    no_paginate: bool,

    /// JSON file with data source options
    #[arg(long, value_name = "PATH")]
    options: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Pager that only reports what it is told.
struct LogPager {
    page_size: usize,
}

impl Pager for LogPager {
    fn page_sizes(&self) -> Vec<usize> {
        vec![self.page_size]
    }

    fn refresh(&self, pagination: &Pagination) {
        log::info!(
            "Page {} of {} ({} rows, {} per page)",
            pagination.page(),
            pagination.page_count(),
            pagination.count(),
            pagination.page_size()
        );
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    init_logger(&cli)?;

    let rows = read_rows(cli.input.as_deref())?;
    log::debug!("Loaded {} rows", rows.len());

    let mut options = match &cli.options {
        Some(path) => {
            let json = std::fs::read_to_string(path).map_err(|e| CliError::io(path, e))?;
            DataSourceOptions::from_json(&json)?
        }
        None => DataSourceOptions::default(),
    };
    options = options.with_auto_load(false);
    if cli.no_paginate {
        options = options.with_pagination(false);
    }
    if let Some(page_size) = cli.page_size {
        options = options.with_page_size(page_size);
    }

    let filters = cli
        .filters
        .iter()
        .map(|raw| parse_filter(raw))
        .collect::<Result<Vec<_>>>()?;
    let sorts = cli
        .sorts
        .iter()
        .map(|raw| parse_sort(raw))
        .collect::<Result<Vec<_>>>()?;

    let mut fields: Vec<String> = Vec::new();
    for (field, _) in &sorts {
        if fields.contains(field) {
            return Err(CliError::DuplicateSort(field.clone()));
        }
        fields.push(field.clone());
    }
    for (field, _) in &filters {
        if !fields.contains(field) {
            fields.push(field.clone());
        }
    }
    let column_of = |field: &str| fields.iter().position(|f| f == field).unwrap_or_default();

    let source = DataSource::builder()
        .read(move |_| SourceRead::ready(rows.clone()))
        .read_error(|e| log::error!("Read failed: {}", e))
        .pager(Arc::new(LogPager {
            page_size: options.page_size,
        }))
        .columns(fields.iter().map(ColumnDef::new))
        .options(options)
        .build()?;

    source.attached().await;
    for (field, text) in &filters {
        source.filter_changed(column_of(field), text.clone()).await?;
    }
    for (index, (field, direction)) in sorts.iter().enumerate() {
        apply_sort(&source, column_of(field), *direction, index > 0).await?;
    }
    source.page_changed(cli.page).await;

    println!("{}", render(&source.snapshot())?);
    Ok(())
}

fn render(snapshot: &DataSourceSnapshot) -> Result<String> {
    serde_json::to_string_pretty(snapshot).map_err(CliError::Output)
}

fn init_logger(cli: &Cli) -> Result<()> {
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    match &cli.log_file {
        Some(path) => {
            let file = File::create(path).map_err(|e| CliError::io(path, e))?;
            WriteLogger::init(level, Config::default(), file)?;
        }
        None => WriteLogger::init(level, Config::default(), std::io::stderr())?,
    }
    Ok(())
}

fn read_rows(input: Option<&std::path::Path>) -> Result<Vec<Item>> {
    let json = match input {
        Some(path) => std::fs::read_to_string(path).map_err(|e| CliError::io(path, e))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| CliError::io("<stdin>", e))?;
            buf
        }
    };
    Ok(serde_json::from_str(&json)?)
}

fn parse_filter(raw: &str) -> Result<(String, String)> {
    match raw.split_once('=') {
        Some((field, text)) if !field.is_empty() => Ok((field.to_string(), text.to_string())),
        _ => Err(CliError::InvalidFilter(raw.to_string())),
    }
}

fn parse_sort(raw: &str) -> Result<(String, Direction)> {
    let (field, direction) = match raw.split_once(':') {
        Some((field, "asc")) => (field, Direction::Asc),
        Some((field, "desc")) => (field, Direction::Desc),
        Some(_) => return Err(CliError::InvalidSort(raw.to_string())),
        None => (raw, Direction::Asc),
    };
    if field.is_empty() {
        return Err(CliError::InvalidSort(raw.to_string()));
    }
    Ok((field.to_string(), direction))
}

/// Clicks a header until it reaches `direction`: once for ascending, twice
/// for descending.
async fn apply_sort(
    source: &DataSource,
    column: usize,
    direction: Direction,
    additive: bool,
) -> Result<()> {
    let clicks = match direction {
        Direction::Asc => 1,
        Direction::Desc => 2,
    };
    for _ in 0..clicks {
        source.sort_changed(column, additive).await?;
    }
    Ok(())
}
