use std::f64::consts::TAU;
use std::sync::Arc;
use std::time::Instant;

use crate::error::{ParameterError, Result};
use crate::math::complex::exp_taylor;
use crate::math::Complex64;
use crate::progress::ProgressObserver;
use crate::random::RandomSource;

use super::pool::{default_thread_count, for_each_trial, run_sharded, validate_sizes};
use super::{Domain, TrialInput, TrialResult, TrialValue, VerificationSummary};

/// How the angles under test are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThetaSampling {
    /// `theta_i = 2 pi i / sample_count`; independent of the thread count.
    #[default]
    Grid,
    /// Uniform draws from `[0, 2 pi)`, each from a stream keyed by the seed
    /// and the trial id.
    Random,
}

/// How `e^(i theta)` is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpMethod {
    /// The library exponential.
    #[default]
    Native,
    /// Compensated Taylor series, see [`exp_taylor`].
    Taylor,
}

impl ExpMethod {
    fn eval(self, theta: f64) -> Complex64 {
        let z = Complex64::new(0.0, theta);
        match self {
            Self::Native => z.exp(),
            Self::Taylor => exp_taylor(z),
        }
    }
}

/// Parameters for [`VerifyEulerFormula`].
#[derive(Debug, Clone)]
pub struct EulerFormulaParams {
    /// Number of angles to test.
    pub sample_count: u64,
    /// Largest accepted `|lhs - rhs|`. Zero demands exact agreement.
    pub tolerance: f64,
    /// Worker threads.
    pub thread_count: usize,
    /// Master seed, used with [`ThetaSampling::Random`].
    pub seed: u64,
    pub sampling: ThetaSampling,
    pub method: ExpMethod,
}

impl Default for EulerFormulaParams {
    fn default() -> Self {
        Self {
            sample_count: 10_000,
            tolerance: 1e-12,
            thread_count: default_thread_count(),
            seed: 42,
            sampling: ThetaSampling::Grid,
            method: ExpMethod::Native,
        }
    }
}

impl EulerFormulaParams {
    /// Parameters for `sample_count` grid angles, everything else default.
    #[must_use]
    pub fn new(sample_count: u64) -> Self {
        Self {
            sample_count,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn with_threads(mut self, thread_count: usize) -> Self {
        self.thread_count = thread_count;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_sampling(mut self, sampling: ThetaSampling) -> Self {
        self.sampling = sampling;
        self
    }

    #[must_use]
    pub fn with_method(mut self, method: ExpMethod) -> Self {
        self.method = method;
        self
    }

    fn validate(&self) -> Result<()> {
        validate_sizes("sample_count", self.sample_count, self.thread_count)?;
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ParameterError::InvalidTolerance(self.tolerance).into());
        }
        Ok(())
    }
}

/// Angle of grid sample `index` out of `count`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn theta_at(index: u64, count: u64) -> f64 {
    TAU * index as f64 / count as f64
}

/// Checks `e^(i theta) = cos theta + i sin theta` over many angles.
pub struct VerifyEulerFormula {
    params: EulerFormulaParams,
    observer: Option<Arc<dyn ProgressObserver>>,
}

impl VerifyEulerFormula {
    /// Creates a new `VerifyEulerFormula` operation.
    #[must_use]
    pub fn new(params: EulerFormulaParams) -> Self {
        Self {
            params,
            observer: None,
        }
    }

    /// Reports progress to `observer` while running.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Executes the verification.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are invalid or the worker pool
    /// cannot be started.
    pub fn execute(&self) -> Result<VerificationSummary> {
        self.params.validate()?;
        let p = &self.params;
        tracing::info!(
            samples = p.sample_count,
            threads = p.thread_count,
            tolerance = p.tolerance,
            sampling = ?p.sampling,
            method = ?p.method,
            "verifying Euler's formula"
        );

        let started = Instant::now();
        let slices = run_sharded(
            "euler-formula",
            p.sample_count,
            p.thread_count,
            self.observer.clone(),
            |range, tracker| {
                let mut summary = VerificationSummary::new(Domain::ComplexAnalysis);
                for_each_trial(range, tracker, |trial_id| {
                    let theta = match p.sampling {
                        ThetaSampling::Grid => theta_at(trial_id, p.sample_count),
                        ThetaSampling::Random => {
                            RandomSource::for_trial(p.seed, trial_id).next_real(0.0, TAU)
                        }
                    };
                    summary.record(check_angle(trial_id, theta, p));
                });
                summary
            },
        )?;

        let summary =
            VerificationSummary::merge(Domain::ComplexAnalysis, slices, started.elapsed());
        if let Some(stats) = summary.error_stats() {
            tracing::info!(
                max = stats.max(),
                mean = stats.mean(),
                std_dev = stats.std_dev(),
                "error distribution"
            );
        }
        summary.log();
        Ok(summary)
    }
}

fn check_angle(trial_id: u64, theta: f64, params: &EulerFormulaParams) -> TrialResult {
    let lhs = params.method.eval(theta);
    let (sin, cos) = theta.sin_cos();
    let rhs = Complex64::new(cos, sin);
    let error = (lhs - rhs).norm();
    TrialResult {
        trial_id,
        input: TrialInput::Angle { theta },
        lhs: TrialValue::Complex(lhs),
        rhs: TrialValue::Complex(rhs),
        // NaN never passes
        passed: error <= params.tolerance,
        absolute_error: Some(error),
    }
}
