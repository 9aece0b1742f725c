use std::rc::Rc;
use std::time::Instant;

use crate::utils::sample_csv_path;
use csv_processor::{CsvProcessor, ProcessorConfig, QueryCache};
mod utils;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = sample_csv_path();
    let mut processor = CsvProcessor::with_config(ProcessorConfig::default().with_workers(4));
    let cache = Rc::new(QueryCache::new());
    processor.load_csv(path.as_path())?;
    let processor_rc = Rc::new(processor);

    // First run (filter + group-sum)
    let start = Instant::now();
    let result = processor_rc
        .query_with_cache(&cache)
        .filter("year", ["202*"])
        .group_by("make")
        .sum("units_sold")
        .sort_by("units_sold")
        .execute()?;
    println!("First run: {} groups, elapsed: {:?}", result.len(), start.elapsed());

    // Second run (should be cached)
    let start = Instant::now();
    let cached_result = processor_rc
        .query_with_cache(&cache)
        .filter("year", ["202*"])
        .group_by("make")
        .sum("units_sold")
        .sort_by("units_sold")
        .execute()?;
    println!(
        "Cached run: {} groups, elapsed: {:?}",
        cached_result.len(),
        start.elapsed()
    );
    assert_eq!(result, cached_result);

    Ok(())
}
