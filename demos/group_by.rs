use crate::utils::sample_csv_path;
use csv_processor::{ColumnFilter, CsvProcessor, Projection};
mod utils;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = sample_csv_path();

    let mut processor = CsvProcessor::new();
    processor.load_csv(path.as_path())?;

    let keep: Projection = ["region", "units_sold", "revenue"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let rows = processor.filter_rows(&ColumnFilter::new(), &keep, 4)?;

    // Revenue and units per region, highest revenue first
    let grouped =
        processor.group_and_sum(&rows, "region", &["units_sold", "revenue"], 4, Some("revenue"))?;
    for entry in grouped {
        println!(
            "Region {} => units {}, revenue {}",
            entry.key,
            entry.total("units_sold"),
            entry.total("revenue")
        );
    }

    Ok(())
}
