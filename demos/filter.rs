use crate::utils::sample_csv_path;
use csv_processor::{ColumnFilter, CsvProcessor, Projection};
mod utils;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = sample_csv_path();

    let mut processor = CsvProcessor::new();
    processor.load_csv(path.as_path())?;

    // Toyotas and Teslas sold in the EU
    let mut wanted = ColumnFilter::new();
    wanted.insert("make".into(), ["Toyota".to_string(), "Tes*".to_string()].into());
    wanted.insert("region".into(), ["EU".to_string()].into());
    let keep: Projection = ["make", "model", "units_sold"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let rows = processor.filter_rows(&wanted, &keep, 4)?;

    println!("Matching rows: {}", rows.len());
    for row in rows.iter().take(10) {
        println!("{} {} x{}", row["make"], row["model"], row["units_sold"]);
    }
    Ok(())
}
