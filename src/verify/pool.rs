use std::ops::Range;
use std::sync::Arc;

use rayon::prelude::*;

use crate::error::{ParameterError, ResourceError, Result};
use crate::progress::{ProgressObserver, ProgressTracker};

use super::VerificationSummary;

/// Trials are reported to the progress tracker in batches of this size.
const PROGRESS_BATCH: u64 = 1024;

/// Splits `0..total` into at most `workers` contiguous, non-overlapping
/// ranges whose lengths differ by at most one. Never returns empty ranges.
pub(crate) fn partition(total: u64, workers: usize) -> Vec<Range<u64>> {
    let workers = (workers.max(1) as u64).min(total);
    if workers == 0 {
        return Vec::new();
    }
    let base = total / workers;
    let extra = total % workers;
    let mut start = 0;
    (0..workers)
        .map(|i| {
            let len = base + u64::from(i < extra);
            let range = start..start + len;
            start += len;
            range
        })
        .collect()
}

/// Default worker count: one per available core.
pub(crate) fn default_thread_count() -> usize {
    std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
}

/// Rejects a zero count or thread count before any work starts.
pub(crate) fn validate_sizes(
    count_name: &'static str,
    count: u64,
    thread_count: usize,
) -> Result<()> {
    if count == 0 {
        return Err(ParameterError::NonPositive { parameter: count_name }.into());
    }
    if thread_count == 0 {
        return Err(ParameterError::NonPositive {
            parameter: "thread_count",
        }
        .into());
    }
    Ok(())
}

/// Runs `work` once per shard of `0..total` on a dedicated pool of
/// `thread_count` threads and returns the slices in shard order.
///
/// `work` receives the trial range and the shared progress tracker.
pub(crate) fn run_sharded<F>(
    task: &str,
    total: u64,
    thread_count: usize,
    observer: Option<Arc<dyn ProgressObserver>>,
    work: F,
) -> Result<Vec<VerificationSummary>>
where
    F: Fn(Range<u64>, &ProgressTracker) -> VerificationSummary + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(thread_count)
        .thread_name(|i| format!("euler-worker-{i}"))
        .build()
        .map_err(|e| ResourceError::ThreadPool(e.to_string()))?;

    let shards = partition(total, thread_count);
    tracing::debug!(task, total, shards = shards.len(), "dispatching");

    let tracker = ProgressTracker::begin(task, total).with_observer(observer);
    let slices = pool.install(|| {
        shards
            .into_par_iter()
            .map(|range| work(range, &tracker))
            .collect::<Vec<_>>()
    });
    tracker.finish();
    Ok(slices)
}

/// Calls `trial` for every id in `range`, reporting progress in batches.
pub(crate) fn for_each_trial(range: Range<u64>, tracker: &ProgressTracker, mut trial: impl FnMut(u64)) {
    let mut pending = 0;
    for id in range {
        trial(id);
        pending += 1;
        if pending == PROGRESS_BATCH {
            tracker.advance(pending);
            pending = 0;
        }
    }
    if pending > 0 {
        tracker.advance(pending);
    }
}
