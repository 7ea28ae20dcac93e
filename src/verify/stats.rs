/// Number of histogram bins: one for exact zero, one per decade from
/// `1e-20` to `1`, and one for errors of 1 or more.
pub const HISTOGRAM_BINS: usize = 22;

/// Running distribution of absolute errors.
///
/// Mean and variance use Welford's update and Chan's pairwise merge, so
/// per-worker statistics combine exactly once all workers have joined.
/// The histogram is bucketed by decade, which makes it mergeable too.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorStats {
    count: u64,
    mean: f64,
    m2: f64,
    max: f64,
    histogram: [u64; HISTOGRAM_BINS],
}

impl Default for ErrorStats {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorStats {
    /// An empty distribution.
    #[must_use]
    pub fn new() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            max: 0.0,
            histogram: [0; HISTOGRAM_BINS],
        }
    }

    /// Adds one observation.
    #[allow(clippy::cast_precision_loss)]
    pub fn push(&mut self, error: f64) {
        self.count += 1;
        let delta = error - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (error - self.mean);
        self.max = self.max.max(error);
        self.histogram[bin(error)] += 1;
    }

    /// Combines two distributions.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn merge(&self, other: &Self) -> Self {
        if self.count == 0 {
            return other.clone();
        }
        if other.count == 0 {
            return self.clone();
        }
        let count = self.count + other.count;
        let (na, nb, n) = (self.count as f64, other.count as f64, count as f64);
        let delta = other.mean - self.mean;
        let mut histogram = self.histogram;
        for (h, o) in histogram.iter_mut().zip(other.histogram) {
            *h += o;
        }
        Self {
            count,
            mean: self.mean + delta * nb / n,
            m2: self.m2 + other.m2 + delta * delta * na * nb / n,
            max: self.max.max(other.max),
            histogram,
        }
    }

    /// Number of observations.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Largest observed error.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Mean error.
    #[must_use]
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Sample standard deviation (0 with fewer than two observations).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn std_dev(&self) -> f64 {
        if self.count < 2 {
            return 0.0;
        }
        (self.m2 / (self.count - 1) as f64).sqrt()
    }

    /// Decade histogram; see [`HISTOGRAM_BINS`].
    #[must_use]
    pub fn histogram(&self) -> &[u64; HISTOGRAM_BINS] {
        &self.histogram
    }
}

/// Bin 0 holds exact zeros, bin `k` in `1..=20` holds `[1e(k-21), 1e(k-20))`
/// (with smaller non-zero errors clamped into bin 1), bin 21 holds `>= 1`
/// and non-finite errors.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn bin(error: f64) -> usize {
    if error == 0.0 {
        return 0;
    }
    if !error.is_finite() {
        return HISTOGRAM_BINS - 1;
    }
    let decade = error.abs().log10().floor() + 21.0;
    decade.clamp(1.0, (HISTOGRAM_BINS - 1) as f64) as usize
}
