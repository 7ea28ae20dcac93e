use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Receives progress snapshots, e.g. to drive a progress bar.
///
/// Called from worker threads; ordering across workers is not guaranteed.
pub trait ProgressObserver: Send + Sync {
    /// Called whenever the run crosses another tenth of its total work.
    fn on_progress(&self, snapshot: &ProgressSnapshot);
}

/// Point-in-time view of a run's progress.
#[derive(Debug, Clone)]
pub struct ProgressSnapshot {
    /// Name of the task being tracked.
    pub task: String,
    /// Work items completed so far.
    pub completed: u64,
    /// Total work items.
    pub total: u64,
    /// Time since the tracker was started.
    pub elapsed: Duration,
}

impl ProgressSnapshot {
    /// Fraction of work completed, in `[0, 1]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (self.completed.min(self.total) as f64) / (self.total as f64)
    }

    /// Items per second since start.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.completed as f64 / secs
        } else {
            0.0
        }
    }

    /// Estimated time remaining, if a rate is known yet.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn eta(&self) -> Option<Duration> {
        let rate = self.rate();
        if rate <= 0.0 {
            return None;
        }
        let remaining = self.total.saturating_sub(self.completed) as f64;
        Some(Duration::from_secs_f64(remaining / rate))
    }
}

/// Shared progress counter for one verification run.
///
/// Workers only ever call [`advance`](Self::advance); all state is atomic.
/// Created with [`begin`](Self::begin) and torn down with
/// [`finish`](Self::finish).
pub struct ProgressTracker {
    task: String,
    total: u64,
    completed: AtomicU64,
    reported_decile: AtomicU64,
    started: Instant,
    observer: Option<Arc<dyn ProgressObserver>>,
}

impl ProgressTracker {
    /// Starts tracking `total` items of work for `task`.
    #[must_use]
    pub fn begin(task: impl Into<String>, total: u64) -> Self {
        Self {
            task: task.into(),
            total,
            completed: AtomicU64::new(0),
            reported_decile: AtomicU64::new(0),
            started: Instant::now(),
            observer: None,
        }
    }

    /// Forwards decile updates to `observer`.
    #[must_use]
    pub fn with_observer(mut self, observer: Option<Arc<dyn ProgressObserver>>) -> Self {
        self.observer = observer;
        self
    }

    /// Records `n` completed items.
    pub fn advance(&self, n: u64) {
        let done = self.completed.fetch_add(n, Ordering::Relaxed) + n;
        if self.total == 0 {
            return;
        }
        let decile = (done.min(self.total) * 10) / self.total;
        let prev = self.reported_decile.fetch_max(decile, Ordering::Relaxed);
        if decile > prev {
            let snapshot = self.snapshot();
            tracing::debug!(
                task = %snapshot.task,
                completed = snapshot.completed,
                total = snapshot.total,
                "{}% complete",
                decile * 10
            );
            if let Some(observer) = &self.observer {
                observer.on_progress(&snapshot);
            }
        }
    }

    /// Number of items completed so far.
    #[must_use]
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Returns the current progress.
    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            task: self.task.clone(),
            completed: self.completed(),
            total: self.total,
            elapsed: self.started.elapsed(),
        }
    }

    /// Ends the run, logs its throughput and returns the final progress.
    pub fn finish(self) -> ProgressSnapshot {
        let snapshot = self.snapshot();
        tracing::debug!(
            task = %snapshot.task,
            completed = snapshot.completed,
            elapsed_ms = snapshot.elapsed.as_millis(),
            rate = snapshot.rate(),
            "finished"
        );
        snapshot
    }
}

impl std::fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("task", &self.task)
            .field("total", &self.total)
            .field("completed", &self.completed())
            .finish_non_exhaustive()
    }
}
