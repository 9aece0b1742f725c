use std::env;

use crate::processor::ProcessorError;

pub const WORKERS_ENV: &str = "CSV_PROCESSOR_WORKERS";
pub const DELIMITER_ENV: &str = "CSV_PROCESSOR_DELIMITER";

/// Settings shared by ingestion and the query engines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorConfig {
    /// Default worker count for queries built through [`QueryBuilder`](crate::processor::query_builder::QueryBuilder)
    pub workers: usize,
    /// Single-byte cell separator
    pub delimiter: u8,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        ProcessorConfig {
            workers: 1,
            delimiter: b',',
        }
    }
}

impl ProcessorConfig {
    /// Defaults overridden by `CSV_PROCESSOR_WORKERS` and `CSV_PROCESSOR_DELIMITER`
    pub fn from_env() -> Result<Self, ProcessorError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ProcessorError> {
        let mut config = ProcessorConfig::default();

        if let Some(raw) = lookup(WORKERS_ENV) {
            let workers: usize = raw
                .trim()
                .parse()
                .map_err(|_| ProcessorError::Config(format!("{WORKERS_ENV}={raw}")))?;
            config.workers = workers.max(1);
        }

        if let Some(raw) = lookup(DELIMITER_ENV) {
            config.delimiter = match raw.as_bytes() {
                [b] if b.is_ascii() && *b != b'\n' && *b != b'\r' => *b,
                b"\\t" => b'\t',
                _ => {
                    return Err(ProcessorError::Config(format!(
                        "{DELIMITER_ENV} must be a single ASCII character, got {raw:?}"
                    )));
                }
            };
        }

        Ok(config)
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}
