use std::path::Path;

use crate::processor::{
    ColumnFilter, GroupedSumTable, ParseSummary, ProcessorError, Projection, Row,
    config::ProcessorConfig, filter, group_sum, row_source::CsvSource,
};

/// Loads a CSV file once and answers filter and group-sum queries over it
///
/// # Examples
///
/// ```no_run
/// # use csv_processor::{CsvProcessor, ColumnFilter, Projection};
/// let mut processor = CsvProcessor::new();
/// processor.load_csv("sales.csv".as_ref()).unwrap();
///
/// let mut wanted = ColumnFilter::new();
/// wanted.insert("make".into(), ["Toy*".to_string()].into());
/// let keep: Projection = ["make".to_string(), "units".to_string()].into();
///
/// let rows = processor.filter_rows(&wanted, &keep, 4).unwrap();
/// let grouped = processor
///     .group_and_sum(&rows, "make", &["units"], 4, Some("units"))
///     .unwrap();
/// println!("{:?}", grouped);
/// ```
#[derive(Debug, Default)]
pub struct CsvProcessor {
    source: Option<CsvSource>,
    config: ProcessorConfig,
}

impl CsvProcessor {
    /// Create an empty processor with the default configuration
    pub fn new() -> Self {
        Self::with_config(ProcessorConfig::default())
    }

    pub fn with_config(config: ProcessorConfig) -> Self {
        CsvProcessor {
            source: None,
            config,
        }
    }

    /// Maps the CSV file at `path` and indexes its rows
    ///
    /// The first line is the header. Rows whose cell count differs from the
    /// header are kept and reported in the returned [`ParseSummary`].
    ///
    /// # Errors
    /// See [`CsvSource::open`]. On error the processor keeps its previous state.
    pub fn load_csv(&mut self, path: &Path) -> Result<ParseSummary, ProcessorError> {
        let (source, summary) = CsvSource::open(path, &self.config)?;
        self.source = Some(source);
        Ok(summary)
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    pub fn source(&self) -> Result<&CsvSource, ProcessorError> {
        self.source.as_ref().ok_or(ProcessorError::NotLoaded)
    }

    /// Id of the currently loaded file, see [`CsvSource::id`]
    pub fn source_id(&self) -> Option<u64> {
        self.source.as_ref().map(CsvSource::id)
    }

    pub fn is_loaded(&self) -> bool {
        self.source.is_some()
    }

    pub fn row_count(&self) -> usize {
        self.source.as_ref().map_or(0, CsvSource::row_count)
    }

    pub fn col_count(&self) -> usize {
        self.source.as_ref().map_or(0, CsvSource::col_count)
    }

    pub fn headers(&self) -> &[String] {
        self.source.as_ref().map(CsvSource::headers).unwrap_or(&[])
    }

    /// Rows matching `column_values`, projected onto `columns_to_keep`, in file order
    ///
    /// # Errors
    /// [`ProcessorError::NotLoaded`] before a successful [`load_csv`](Self::load_csv).
    pub fn filter_rows(
        &self,
        column_values: &ColumnFilter,
        columns_to_keep: &Projection,
        workers: usize,
    ) -> Result<Vec<Row>, ProcessorError> {
        let source = self.source()?;
        Ok(filter::filter_rows(
            source,
            column_values,
            columns_to_keep,
            workers,
        ))
    }

    /// Per-group sums of `sum_columns` over `rows`, see [`group_sum::group_and_sum`]
    pub fn group_and_sum<S: AsRef<str> + Sync>(
        &self,
        rows: &[Row],
        group_by: &str,
        sum_columns: &[S],
        workers: usize,
        sort_by: Option<&str>,
    ) -> Result<GroupedSumTable, ProcessorError> {
        group_sum::group_and_sum(rows, group_by, sum_columns, workers, sort_by)
    }
}
