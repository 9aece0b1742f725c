use clap::Parser;
use rand::Rng;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

const MAKES: [(&str, &[&str]); 6] = [
    ("Toyota", &["Corolla", "Camry", "Yaris", "RAV4"]),
    ("Honda", &["Civic", "Accord", "CR-V"]),
    ("Ford", &["Focus", "Fiesta", "F-150"]),
    ("Tesla", &["Model 3", "Model Y"]),
    ("Volkswagen", &["Golf", "Polo", "Passat"]),
    ("Hyundai", &["i30", "Tucson"]),
];

const REGIONS: [&str; 6] = ["US", "EU", "ASIA", "AFRICA", "AUSTRALIA", "SOUTH AMERICA"];

/// Write a synthetic car-sales CSV
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Number of data rows to generate
    #[arg(value_name = "ROWS", default_value_t = 1_000_000)]
    rows: usize,

    /// Output file; parent directories are created
    #[arg(value_name = "PATH", default_value = "data/car_sales.csv")]
    path: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Args { rows, path } = Args::parse();

    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }

    let file = File::create(&path)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "id,make,model,year,region,units_sold,revenue")?;

    let mut rng = rand::rng();
    for i in 0..rows {
        let (make, models) = MAKES[rng.random_range(0..MAKES.len())];
        let model = models[rng.random_range(0..models.len())];
        let year = rng.random_range(2015..=2024);
        let region = REGIONS[rng.random_range(0..REGIONS.len())];
        let units: u64 = rng.random_range(1..50);
        let revenue = units * rng.random_range(15_000..60_000u64);
        writeln!(
            writer,
            "{},{},{},{},{},{},{}",
            i, make, model, year, region, units, revenue
        )?;
    }
    writer.flush()?;

    println!("Sample CSV generated: {} ({} rows)", path.display(), rows);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_defaults() {
        Args::command().debug_assert();
        let args = Args::try_parse_from(["data_generator"]).unwrap();
        assert_eq!(args.rows, 1_000_000);
        assert_eq!(args.path, PathBuf::from("data/car_sales.csv"));
    }

    #[test]
    fn test_args_rejects_bad_row_count() {
        assert!(Args::try_parse_from(["data_generator", "many"]).is_err());
        let args = Args::try_parse_from(["data_generator", "500", "out/cars.csv"]).unwrap();
        assert_eq!(args.rows, 500);
        assert_eq!(args.path, PathBuf::from("out/cars.csv"));
    }
}
