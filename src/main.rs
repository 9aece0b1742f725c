use std::path::PathBuf;
use std::rc::Rc;
use std::time::Instant;

use clap::Parser;
use csv_processor::{CsvProcessor, ProcessorConfig, QueryResult};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Group car sales by make and sum units sold and revenue.
///
/// Worker count and delimiter come from CSV_PROCESSOR_WORKERS / CSV_PROCESSOR_DELIMITER.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// CSV file to load
    #[arg(value_name = "CSV_PATH", default_value = "data/car_sales.csv")]
    path: PathBuf,

    /// Wildcard applied to the `make` column, e.g. `Toy*`
    #[arg(value_name = "MAKE_PATTERN", default_value = "*")]
    make_pattern: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let Args { path, make_pattern } = Args::parse();

    let config = ProcessorConfig::from_env()?;
    info!(workers = config.workers, "starting");

    let mut processor = CsvProcessor::with_config(config);
    let summary = processor.load_csv(&path)?;
    info!(
        rows = summary.rows_processed,
        ragged = summary.errors.len(),
        "loaded"
    );
    let processor = Rc::new(processor);

    let start = Instant::now();
    let result = processor
        .query()
        .filter("make", [make_pattern.as_str()])
        .group_by("make")
        .sums(vec!["units_sold", "revenue"])
        .sort_by("revenue")
        .execute()?;
    info!(elapsed = ?start.elapsed(), "query finished");

    if let QueryResult::Grouped(table) = result {
        for entry in table {
            println!(
                "{:<16} units={:<10} revenue={}",
                entry.key,
                entry.total("units_sold"),
                entry.total("revenue")
            );
        }
    }

    Ok(())
}
