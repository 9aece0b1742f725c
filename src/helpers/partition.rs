use std::ops::Range;

use rayon::ThreadPoolBuilder;
use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};
use tracing::{debug, warn};

/// Splits `0..len` into exactly `workers` contiguous ranges of `ceil(len / workers)` rows.
///
/// Trailing ranges may be shorter or empty. `workers == 0` is treated as 1.
pub fn chunk_ranges(len: usize, workers: usize) -> Vec<Range<usize>> {
    let workers = workers.max(1);
    let chunk_size = len.div_ceil(workers);

    (0..workers)
        .map(|i| {
            let start = (i * chunk_size).min(len);
            let end = (start + chunk_size).min(len);
            start..end
        })
        .collect()
}

/// Runs `task` once per partition of `0..len` on a pool of `workers` threads.
///
/// The pool lives for this call only. Results come back in partition order.
pub fn run_partitioned<T, F>(len: usize, workers: usize, task: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize, Range<usize>) -> T + Sync,
{
    let ranges = chunk_ranges(len, workers);
    let workers = ranges.len();

    let run = || -> Vec<T> {
        ranges
            .into_par_iter()
            .enumerate()
            .map(|(worker, range)| {
                debug!(worker, start = range.start, end = range.end, "partition started");
                task(worker, range)
            })
            .collect()
    };

    match ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("csv-worker-{i}"))
        .build()
    {
        Ok(pool) => pool.install(run),
        Err(e) => {
            warn!(error = %e, workers, "could not build worker pool, using global pool");
            run()
        }
    }
}
