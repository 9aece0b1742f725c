use memchr::memchr_iter;
use memmap2::Mmap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::{collections::HashSet, fs::File, ops::Range, path::Path, str};
use tracing::{error, info, warn};

use crate::processor::{ParseError, ParseSummary, ProcessorError, Row, config::ProcessorConfig};

static NEXT_SOURCE_ID: AtomicU64 = AtomicU64::new(1);

/// Memory-mapped CSV file with a header list and a row offset index
///
/// The index is built once at load time, so any row can be read directly and
/// workers can take disjoint slices of it without rescanning the file.
#[derive(Debug)]
pub struct CsvSource {
    id: u64,
    mmap: Mmap,
    headers: Vec<String>,
    rows: Vec<(usize, usize)>, // byte offsets of each data line, line ending excluded
    delimiter: char,
}

impl CsvSource {
    /// Maps `path` and indexes its rows
    ///
    /// # Errors
    /// - [`ProcessorError::FileNotFound`] if `path` does not exist
    /// - [`ProcessorError::Unknown`] if the file cannot be opened or mapped
    /// - [`ProcessorError::FileRead`] if there is no header line
    /// - [`ProcessorError::InvalidCharacter`] if the file is not UTF-8
    /// - [`ProcessorError::DuplicateHeader`] if a column name repeats
    pub fn open(
        path: &Path,
        config: &ProcessorConfig,
    ) -> Result<(Self, ParseSummary), ProcessorError> {
        if !path.exists() {
            error!(path = %path.display(), "CSV file not found");
            return Err(ProcessorError::FileNotFound(path.to_path_buf()));
        }

        info!(path = %path.display(), "reading CSV file");

        let file = File::open(path).inspect_err(|e| {
            error!(path = %path.display(), error = %e, "failed to open CSV file");
        })?;
        if file.metadata()?.len() == 0 {
            return Err(ProcessorError::FileRead("missing header line".into()));
        }
        let mmap = unsafe { Mmap::map(&file) }.inspect_err(|e| {
            error!(path = %path.display(), error = %e, "failed to map CSV file");
        })?;

        let buf = str::from_utf8(&mmap[..]).map_err(|e| ProcessorError::InvalidCharacter {
            offset: e.valid_up_to(),
        })?;

        let delimiter = char::from(config.delimiter);
        let header_end = memchr::memchr(b'\n', buf.as_bytes()).unwrap_or(buf.len());
        let header_line = trim_cr(&buf[..header_end]);
        if header_line.is_empty() {
            return Err(ProcessorError::FileRead("missing header line".into()));
        }

        let headers: Vec<String> = header_line.split(delimiter).map(|s| s.to_string()).collect();
        let mut seen = HashSet::with_capacity(headers.len());
        for name in &headers {
            if !seen.insert(name.as_str()) {
                error!(column = %name, "duplicate header");
                return Err(ProcessorError::DuplicateHeader(name.clone()));
            }
        }

        let data_start = (header_end + 1).min(buf.len());
        let (rows, errors) = Self::index_rows(buf, data_start, delimiter, headers.len());

        if !errors.is_empty() {
            warn!(
                rows = errors.len(),
                first_line = errors[0].line,
                "rows with a cell count different from the header"
            );
        }

        info!(rows = rows.len(), "CSV rows indexed");
        info!(columns = headers.len(), "CSV columns found");
        info!(path = %path.display(), "CSV file read complete");

        let summary = ParseSummary {
            rows_processed: rows.len(),
            errors,
        };

        Ok((
            CsvSource {
                id: NEXT_SOURCE_ID.fetch_add(1, Ordering::Relaxed),
                mmap,
                headers,
                rows,
                delimiter,
            },
            summary,
        ))
    }

    fn index_rows(
        buf: &str,
        data_start: usize,
        delimiter: char,
        num_cols: usize,
    ) -> (Vec<(usize, usize)>, Vec<ParseError>) {
        let bytes = buf.as_bytes();
        let mut rows = Vec::new();
        let mut errors = Vec::new();
        let mut line_no = 1; // header

        let mut push_line = |start: usize, end: usize, line_no: usize| {
            let line = trim_cr(&buf[start..end]);
            if line.is_empty() {
                return;
            }
            let found = line.split(delimiter).count();
            if found != num_cols {
                errors.push(ParseError {
                    line: line_no,
                    expected: num_cols,
                    found,
                });
            }
            rows.push((start, start + line.len()));
        };

        let mut start = data_start;
        for newline_pos in memchr_iter(b'\n', &bytes[data_start..]) {
            let end = data_start + newline_pos;
            line_no += 1;
            push_line(start, end, line_no);
            start = end + 1;
        }
        if start < bytes.len() {
            push_line(start, bytes.len(), line_no + 1);
        }

        (rows, errors)
    }

    /// Process-unique id of this load; two loads never share one, even of the same file
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.headers.len()
    }

    /// Raw text of data row `idx`, without its line ending
    pub fn line(&self, idx: usize) -> Option<&str> {
        let &(start, end) = self.rows.get(idx)?;
        // offsets sit on line boundaries of a buffer validated at load time
        Some(str::from_utf8(&self.mmap[start..end]).unwrap_or(""))
    }

    /// Cells of data row `idx` in header order
    pub fn cells(&self, idx: usize) -> Option<impl Iterator<Item = &str>> {
        self.line(idx).map(|line| line.split(self.delimiter))
    }

    /// Materialises data row `idx` keyed by header name
    pub fn row(&self, idx: usize) -> Option<Row> {
        let cells = self.cells(idx)?;
        Some(
            self.headers
                .iter()
                .zip(cells)
                .map(|(name, value)| (name.clone(), value.to_string()))
                .collect(),
        )
    }

    /// All data rows in file order; may be called any number of times
    pub fn rows(&self) -> impl Iterator<Item = Row> + '_ {
        self.rows_in(0..self.row_count())
    }

    /// Data rows with indices in `range`
    pub fn rows_in(&self, range: Range<usize>) -> impl Iterator<Item = Row> + '_ {
        let end = range.end.min(self.row_count());
        (range.start.min(end)..end).filter_map(move |idx| self.row(idx))
    }
}

fn trim_cr(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}
