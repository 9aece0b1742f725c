use std::path::PathBuf;

/// Path of the CSV written by `cargo run --bin data_generator`, relative to the crate root.
pub fn sample_csv_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("data")
        .join("car_sales.csv")
}
