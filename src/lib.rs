//! # csv_processor
//!
//! Parallel filtering and group-by summation over memory-mapped CSV files.
//!
//! - Memory-mapped loading with a row offset index built in one pass
//! - Wildcard filters (`Toy*`, `*olla`, exact values), OR-ed per column and AND-ed
//!   across columns, with column projection
//! - Group-by with per-group `u64` sums over any number of columns, optionally
//!   sorted by one of them
//! - Both operations split the rows into contiguous partitions processed on a
//!   per-call Rayon pool, then merge the partial results in partition order
//! - Fluent query builder with an LRU result cache
//!
//! # Example
//!
//! ```no_run
//! use csv_processor::{CsvProcessor, QueryResult};
//! use std::path::Path;
//! use std::rc::Rc;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut processor = CsvProcessor::new();
//!     processor.load_csv(Path::new("car_sales.csv"))?;
//!     let processor = Rc::new(processor);
//!
//!     // Units sold per make, for makes starting with "T", best sellers first
//!     let result = processor
//!         .query()
//!         .filter("make", ["T*"])
//!         .group_by("make")
//!         .sum("units_sold")
//!         .sort_by("units_sold")
//!         .workers(4)
//!         .execute()?;
//!
//!     if let QueryResult::Grouped(table) = result {
//!         for entry in table {
//!             println!("{} => {}", entry.key, entry.total("units_sold"));
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

mod helpers;
pub mod processor;

pub use processor::{
    ColumnFilter, ErrorCode, GroupedSumEntry, GroupedSumTable, ParseSummary, ProcessorError,
    Projection, Row,
    config::ProcessorConfig,
    csv_processor::CsvProcessor,
    query_builder::{QueryBuilder, QueryCache, QueryResult},
    wildcard::wildcard_match,
};
