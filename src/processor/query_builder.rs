use lru::LruCache;
use tracing::debug;

use crate::processor::csv_processor::CsvProcessor;
use crate::processor::{ColumnFilter, GroupedSumTable, ProcessorError, Projection, Row};
use std::cell::RefCell;
use std::num::NonZeroUsize;
use std::rc::Rc;

const DEFAULT_CACHE_CAPACITY: NonZeroUsize = NonZeroUsize::new(128).unwrap();

/// Canonical form of a query against one loaded file; the worker count is
/// left out since it never changes the result
#[derive(Debug, Hash, Eq, PartialEq, Clone)]
pub struct QueryKey {
    source: Option<u64>,
    filters: Vec<(String, Vec<String>)>,
    select: Vec<String>,
    group_by: Option<String>,
    sum_columns: Vec<String>,
    sort_by: Option<String>,
    limit: Option<usize>,
}

#[derive(Debug)]
pub struct QueryCache {
    cache: RefCell<LruCache<QueryKey, QueryResult>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            cache: RefCell::new(LruCache::new(capacity)),
        }
    }

    pub fn get(&self, key: &QueryKey) -> Option<QueryResult> {
        self.cache.borrow_mut().get(key).cloned()
    }

    pub fn put(&self, key: QueryKey, value: QueryResult) {
        self.cache.borrow_mut().put(key, value);
    }

    pub fn len(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.cache.borrow_mut().clear();
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Query results
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// Filtered, projected rows in file order
    Rows(Vec<Row>),
    /// Per-group totals
    Grouped(GroupedSumTable),
}

impl QueryResult {
    pub fn len(&self) -> usize {
        match self {
            QueryResult::Rows(rows) => rows.len(),
            QueryResult::Grouped(table) => table.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fluent filter -> group-sum query over a loaded [`CsvProcessor`]
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    processor: Rc<CsvProcessor>,
    cache: Option<Rc<QueryCache>>,
    filters: ColumnFilter,
    select_columns: Projection,
    group_by: Option<String>,
    sum_columns: Vec<String>,
    sort_by: Option<String>,
    workers: usize,
    limit: Option<usize>,
}

impl QueryBuilder {
    pub fn new(processor: Rc<CsvProcessor>, cache: Option<Rc<QueryCache>>) -> Self {
        let workers = processor.config().workers;
        Self {
            processor,
            cache,
            filters: ColumnFilter::new(),
            select_columns: Projection::new(),
            group_by: None,
            sum_columns: Vec::new(),
            sort_by: None,
            workers,
            limit: None,
        }
    }

    /// Require `column` to match one of `patterns`; repeated calls for the
    /// same column add patterns
    pub fn filter<'a>(mut self, column: &str, patterns: impl IntoIterator<Item = &'a str>) -> Self {
        self.filters
            .entry(column.to_string())
            .or_default()
            .extend(patterns.into_iter().map(str::to_string));
        self
    }

    /// Add multiple (column, pattern) conditions
    pub fn filters(mut self, filters: Vec<(&str, &str)>) -> Self {
        for (column, pattern) in filters {
            self = self.filter(column, [pattern]);
        }
        self
    }

    /// Columns to return for row queries
    pub fn select(mut self, columns: Vec<&str>) -> Self {
        self.select_columns = columns.into_iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn group_by(mut self, column: &str) -> Self {
        self.group_by = Some(column.to_string());
        self
    }

    pub fn sum(mut self, column: &str) -> Self {
        self.sum_columns.push(column.to_string());
        self
    }

    pub fn sums(mut self, columns: Vec<&str>) -> Self {
        self.sum_columns
            .extend(columns.into_iter().map(|s| s.to_string()));
        self
    }

    /// Order groups by this summed column, largest first
    pub fn sort_by(mut self, column: &str) -> Self {
        self.sort_by = Some(column.to_string());
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Limit number of results
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Disable caching
    pub fn no_cache(mut self) -> Self {
        self.cache = None;
        self
    }

    pub fn key(&self) -> QueryKey {
        let mut filters: Vec<(String, Vec<String>)> = self
            .filters
            .iter()
            .map(|(column, patterns)| {
                let mut patterns: Vec<String> = patterns.iter().cloned().collect();
                patterns.sort_unstable();
                (column.clone(), patterns)
            })
            .collect();
        filters.sort_unstable();

        let mut select: Vec<String> = self.select_columns.iter().cloned().collect();
        select.sort_unstable();

        QueryKey {
            source: self.processor.source_id(),
            filters,
            select,
            group_by: self.group_by.clone(),
            sum_columns: self.sum_columns.clone(),
            sort_by: self.sort_by.clone(),
            limit: self.limit,
        }
    }

    /// Run the query
    ///
    /// Without `group_by` the filtered rows are returned. With it, the filtered
    /// rows are grouped and summed; the group-by and sum columns are projected
    /// automatically.
    pub fn execute(self) -> Result<QueryResult, ProcessorError> {
        if self.group_by.is_none() && (!self.sum_columns.is_empty() || self.sort_by.is_some()) {
            return Err(ProcessorError::Query(
                "sum and sort_by require group_by".into(),
            ));
        }

        let key = self.key();
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(&key) {
                debug!(results = hit.len(), "query served from cache");
                return Ok(hit);
            }
        }

        let result = self.run()?;

        if let Some(cache) = &self.cache {
            cache.put(key, result.clone());
        }
        Ok(result)
    }

    fn run(&self) -> Result<QueryResult, ProcessorError> {
        let mut projection = self.select_columns.clone();
        if let Some(group_by) = &self.group_by {
            projection.insert(group_by.clone());
            projection.extend(self.sum_columns.iter().cloned());
        }

        let mut rows = self
            .processor
            .filter_rows(&self.filters, &projection, self.workers)?;

        match &self.group_by {
            None => {
                if let Some(n) = self.limit {
                    rows.truncate(n);
                }
                Ok(QueryResult::Rows(rows))
            }
            Some(group_by) => {
                let mut table = self.processor.group_and_sum(
                    &rows,
                    group_by,
                    self.sum_columns.as_slice(),
                    self.workers,
                    self.sort_by.as_deref(),
                )?;
                if let Some(n) = self.limit {
                    table.truncate(n);
                }
                Ok(QueryResult::Grouped(table))
            }
        }
    }
}

impl CsvProcessor {
    pub fn query(self: &Rc<Self>) -> QueryBuilder {
        QueryBuilder::new(self.clone(), None)
    }

    pub fn query_with_cache(self: &Rc<Self>, cache: &Rc<QueryCache>) -> QueryBuilder {
        QueryBuilder::new(self.clone(), Some(cache.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::config::ProcessorConfig;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SALES: &str = "make,model,region,units,revenue\n\
        Toyota,Corolla,west,5,100\n\
        Honda,Civic,east,3,60\n\
        Toyota,Camry,east,7,210\n\
        Ford,Focus,west,2,40\n\
        Toyota,Yaris,west,1,15\n";

    fn make_processor(config: ProcessorConfig) -> Rc<CsvProcessor> {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(tmp, "{}", SALES).unwrap();

        let mut processor = CsvProcessor::with_config(config);
        processor.load_csv(tmp.path()).unwrap();
        Rc::new(processor)
    }

    #[test]
    fn test_select_rows() {
        let processor = make_processor(ProcessorConfig::default());
        let result = processor
            .query()
            .filter("make", ["Toy*"])
            .select(vec!["model"])
            .execute()
            .unwrap();

        match result {
            QueryResult::Rows(rows) => {
                let models: Vec<&str> = rows.iter().map(|r| r["model"].as_str()).collect();
                assert_eq!(models, vec!["Corolla", "Camry", "Yaris"]);
                assert!(rows.iter().all(|r| r.len() == 1));
            }
            _ => panic!("Expected Rows result"),
        }
    }

    #[test]
    fn test_group_sum_query() {
        let processor = make_processor(ProcessorConfig::default().with_workers(3));
        let result = processor
            .query()
            .filters(vec![("region", "west"), ("region", "east")])
            .group_by("make")
            .sums(vec!["units", "revenue"])
            .sort_by("revenue")
            .execute()
            .unwrap();

        match result {
            QueryResult::Grouped(table) => {
                let keys: Vec<&str> = table.iter().map(|e| e.key.as_str()).collect();
                assert_eq!(keys, vec!["Toyota", "Honda", "Ford"]);
                assert_eq!(table[0].total("units"), 13);
                assert_eq!(table[0].total("revenue"), 325);
            }
            _ => panic!("Expected Grouped result"),
        }
    }

    #[test]
    fn test_limit() {
        let processor = make_processor(ProcessorConfig::default());
        let result = processor
            .query()
            .group_by("make")
            .sum("units")
            .sort_by("units")
            .limit(1)
            .execute()
            .unwrap();
        assert_eq!(result.len(), 1);
        if let QueryResult::Grouped(table) = result {
            assert_eq!(table[0].key, "Toyota");
        }
    }

    #[test]
    fn test_sum_without_group_by() {
        let processor = make_processor(ProcessorConfig::default());
        let err = processor.query().sum("units").execute().unwrap_err();
        assert!(matches!(err, ProcessorError::Query(_)));
    }

    #[test]
    fn test_no_matches_cannot_group() {
        let processor = make_processor(ProcessorConfig::default());
        let err = processor
            .query()
            .filter("make", ["Tesla"])
            .group_by("make")
            .sum("units")
            .execute()
            .unwrap_err();
        assert!(matches!(err, ProcessorError::InvalidData(_)));
    }

    #[test]
    fn test_cached_query() {
        let processor = make_processor(ProcessorConfig::default());
        let cache = Rc::new(QueryCache::new());

        let first = processor
            .query_with_cache(&cache)
            .filter("make", ["Toyota"])
            .group_by("region")
            .sum("units")
            .execute()
            .unwrap();
        let second = processor
            .query_with_cache(&cache)
            .filter("make", ["Toyota"])
            .group_by("region")
            .sum("units")
            .workers(4)
            .execute()
            .unwrap(); // from cache

        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);

        processor
            .query_with_cache(&cache)
            .filter("make", ["Honda"])
            .execute()
            .unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_failed_query_not_cached() {
        let processor = make_processor(ProcessorConfig::default());
        let cache = Rc::new(QueryCache::new());
        let result = processor
            .query_with_cache(&cache)
            .group_by("dealer")
            .sum("units")
            .execute();
        assert!(result.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_shared_cache_keeps_processors_apart() {
        let load = |csv: &str| {
            let mut tmp = NamedTempFile::new().unwrap();
            write!(tmp, "{}", csv).unwrap();
            let mut processor = CsvProcessor::new();
            processor.load_csv(tmp.path()).unwrap();
            Rc::new(processor)
        };
        let a = load("make,units\nToyota,5\n");
        let b = load("make,units\nToyota,100\n");
        let cache = Rc::new(QueryCache::new());

        let total = |processor: &Rc<CsvProcessor>| match processor
            .query_with_cache(&cache)
            .group_by("make")
            .sum("units")
            .execute()
            .unwrap()
        {
            QueryResult::Grouped(table) => table[0].total("units"),
            QueryResult::Rows(_) => panic!("Expected Grouped result"),
        };

        assert_eq!(total(&a), 5);
        assert_eq!(total(&b), 100);
        assert_eq!(total(&a), 5);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_key_is_order_independent() {
        let processor = make_processor(ProcessorConfig::default());
        let a = processor
            .query()
            .filter("make", ["Toyota", "Honda"])
            .filter("region", ["west"])
            .select(vec!["model", "units"]);
        let b = processor
            .query()
            .filter("region", ["west"])
            .filter("make", ["Honda", "Toyota"])
            .select(vec!["units", "model"]);
        assert_eq!(a.key(), b.key());
    }
}
