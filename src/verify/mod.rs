//! Bulk verification of Euler's three identities.
//!
//! Every verifier follows the same shape: a parameter struct validated up
//! front, a fixed worker pool over statically sharded trials, and a
//! [`VerificationSummary`] merged from per-worker slices after the join.

pub mod complex;
pub mod number_theory;
mod pool;
pub mod stats;
pub mod topology;

pub use complex::{EulerFormulaParams, ExpMethod, ThetaSampling, VerifyEulerFormula};
pub use number_theory::{EulerTheoremParams, Exponent, ModulusSource, VerifyEulerTheorem};
pub use stats::ErrorStats;
pub use topology::{
    EulerCharacteristicParams, PolyhedronCheck, TopologyVerification, VerifyEulerCharacteristic,
    VerifyPolyhedra,
};

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ParameterError;
use crate::math::Complex64;

/// The mathematical domain a verification task belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    /// Euler's theorem: `a^phi(n) = 1 (mod n)` for `gcd(a, n) = 1`.
    NumberTheory,
    /// Euler's formula: `e^(i theta) = cos theta + i sin theta`.
    ComplexAnalysis,
    /// Euler's polyhedron formula: `V - E + F = 2`.
    Topology,
}

impl Domain {
    /// Short selector name, as accepted by [`FromStr`].
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NumberTheory => "number",
            Self::ComplexAnalysis => "complex",
            Self::Topology => "topology",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "number" | "number-theory" => Ok(Self::NumberTheory),
            "complex" | "complex-analysis" => Ok(Self::ComplexAnalysis),
            "topology" => Ok(Self::Topology),
            _ => Err(ParameterError::UnknownSelector {
                kind: "domain",
                value: s.to_owned(),
            }),
        }
    }
}

/// The inputs of a single trial.
#[derive(Debug, Clone, PartialEq)]
pub enum TrialInput {
    /// Modulus, coprime base and the exponent it was raised to.
    Modular { modulus: u64, base: u64, exponent: u64 },
    /// Angle on the unit circle.
    Angle { theta: f64 },
    /// A named closed surface, with its subdivision level if refined.
    Polyhedron { name: String, level: Option<u32> },
}

/// One side of a checked identity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrialValue {
    /// A residue.
    Residue(u64),
    /// An Euler characteristic.
    Characteristic(i64),
    /// A complex number.
    Complex(Complex64),
}

impl fmt::Display for TrialValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Residue(r) => write!(f, "{r}"),
            Self::Characteristic(chi) => write!(f, "{chi}"),
            Self::Complex(z) => write!(f, "{z:e}"),
        }
    }
}

/// Outcome of checking one identity instance.
///
/// A failed trial is data, not an error: it is kept in
/// [`VerificationSummary::failed_trials`] for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialResult {
    /// Position of the trial in the run, `0..total_trials`.
    pub trial_id: u64,
    /// Inputs the identity was evaluated at.
    pub input: TrialInput,
    /// Computed left-hand side.
    pub lhs: TrialValue,
    /// Computed right-hand side.
    pub rhs: TrialValue,
    /// Whether the identity held (within tolerance for real-valued domains).
    pub passed: bool,
    /// `|lhs - rhs|` for real-valued domains.
    pub absolute_error: Option<f64>,
}

/// Overall verdict of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every trial passed.
    Verified,
    /// This many trials failed.
    Failed(u64),
    /// No trial was run at all, which is itself an anomaly.
    Empty,
}

/// Aggregate of a verification run.
///
/// Invariant: `passed_count + failed_trials.len() == total_trials`.
#[derive(Debug, Clone)]
pub struct VerificationSummary {
    domain: Domain,
    total_trials: u64,
    passed_count: u64,
    failed_trials: Vec<TrialResult>,
    wall_time: Duration,
    error_stats: Option<ErrorStats>,
}

impl VerificationSummary {
    /// An empty summary for `domain`.
    #[must_use]
    pub fn new(domain: Domain) -> Self {
        Self {
            domain,
            total_trials: 0,
            passed_count: 0,
            failed_trials: Vec::new(),
            wall_time: Duration::ZERO,
            error_stats: None,
        }
    }

    /// Counts a finished trial, retaining it only if it failed.
    pub fn record(&mut self, trial: TrialResult) {
        self.total_trials += 1;
        if let Some(error) = trial.absolute_error {
            self.error_stats.get_or_insert_with(ErrorStats::new).push(error);
        }
        if trial.passed {
            self.passed_count += 1;
        } else {
            self.failed_trials.push(trial);
        }
    }

    /// Concatenates per-worker slices in the order given.
    ///
    /// Slices come from contiguous, ordered shards, so the merged failures
    /// stay ordered by `trial_id`.
    #[must_use]
    pub fn merge(
        domain: Domain,
        slices: impl IntoIterator<Item = Self>,
        wall_time: Duration,
    ) -> Self {
        let mut merged = Self::new(domain);
        for slice in slices {
            debug_assert_eq!(slice.domain, domain);
            merged.total_trials += slice.total_trials;
            merged.passed_count += slice.passed_count;
            merged.failed_trials.extend(slice.failed_trials);
            merged.error_stats = match (merged.error_stats.take(), slice.error_stats) {
                (Some(a), Some(b)) => Some(a.merge(&b)),
                (a, b) => a.or(b),
            };
        }
        merged.wall_time = wall_time;
        merged
    }

    /// Domain the trials belong to.
    #[must_use]
    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Number of trials run.
    #[must_use]
    pub fn total_trials(&self) -> u64 {
        self.total_trials
    }

    /// Number of trials whose identity held.
    #[must_use]
    pub fn passed_count(&self) -> u64 {
        self.passed_count
    }

    /// Failed trials, ordered by `trial_id`.
    #[must_use]
    pub fn failed_trials(&self) -> &[TrialResult] {
        &self.failed_trials
    }

    /// Wall-clock time of the whole run.
    #[must_use]
    pub fn wall_time(&self) -> Duration {
        self.wall_time
    }

    /// Error distribution, for domains with a real-valued error.
    #[must_use]
    pub fn error_stats(&self) -> Option<&ErrorStats> {
        self.error_stats.as_ref()
    }

    /// Overall verdict.
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        if self.total_trials == 0 {
            Outcome::Empty
        } else if self.failed_trials.is_empty() {
            Outcome::Verified
        } else {
            Outcome::Failed(self.failed_trials.len() as u64)
        }
    }

    /// Fraction of trials that passed, if any ran.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> Option<f64> {
        (self.total_trials > 0).then(|| self.passed_count as f64 / self.total_trials as f64)
    }

    /// Checks `passed + failed == total`.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.passed_count + self.failed_trials.len() as u64 == self.total_trials
    }

    pub(crate) fn with_wall_time(mut self, wall_time: Duration) -> Self {
        self.wall_time = wall_time;
        self
    }

    /// Logs the verdict: `info` when verified, `warn` otherwise.
    pub(crate) fn log(&self) {
        match self.outcome() {
            Outcome::Verified => tracing::info!(
                domain = %self.domain,
                trials = self.total_trials,
                wall_ms = self.wall_time.as_millis(),
                "all trials passed"
            ),
            Outcome::Failed(n) => {
                tracing::warn!(
                    domain = %self.domain,
                    trials = self.total_trials,
                    failed = n,
                    wall_ms = self.wall_time.as_millis(),
                    "identity failed"
                );
                if let Some(first) = self.failed_trials.first() {
                    tracing::warn!(
                        trial = first.trial_id,
                        input = ?first.input,
                        lhs = %first.lhs,
                        rhs = %first.rhs,
                        "first failure"
                    );
                }
            }
            Outcome::Empty => tracing::warn!(domain = %self.domain, "no trials were run"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trial(id: u64, passed: bool, error: Option<f64>) -> TrialResult {
        TrialResult {
            trial_id: id,
            input: TrialInput::Angle { theta: 0.0 },
            lhs: TrialValue::Residue(1),
            rhs: TrialValue::Residue(1),
            passed,
            absolute_error: error,
        }
    }

    #[test]
    fn domain_selectors() {
        assert_eq!("number".parse::<Domain>().ok(), Some(Domain::NumberTheory));
        assert_eq!(" Complex ".parse::<Domain>().ok(), Some(Domain::ComplexAnalysis));
        assert_eq!("topology".parse::<Domain>().ok(), Some(Domain::Topology));
        assert!(matches!(
            "geometry".parse::<Domain>(),
            Err(ParameterError::UnknownSelector { kind: "domain", .. })
        ));
        for d in [Domain::NumberTheory, Domain::ComplexAnalysis, Domain::Topology] {
            assert_eq!(d.to_string().parse::<Domain>().ok(), Some(d));
        }
    }

    #[test]
    fn record_keeps_only_failures() {
        let mut s = VerificationSummary::new(Domain::ComplexAnalysis);
        s.record(trial(0, true, Some(0.0)));
        s.record(trial(1, false, Some(1.0)));
        s.record(trial(2, true, Some(0.5)));
        assert_eq!(s.total_trials(), 3);
        assert_eq!(s.passed_count(), 2);
        assert_eq!(s.failed_trials().len(), 1);
        assert_eq!(s.failed_trials()[0].trial_id, 1);
        assert!(s.is_consistent());
        assert_eq!(s.outcome(), Outcome::Failed(1));
        assert_eq!(s.error_stats().map(ErrorStats::count), Some(3));
    }

    #[test]
    fn merge_concatenates_in_order() {
        let mut a = VerificationSummary::new(Domain::NumberTheory);
        a.record(trial(0, false, None));
        a.record(trial(1, true, None));
        let mut b = VerificationSummary::new(Domain::NumberTheory);
        b.record(trial(2, true, None));
        b.record(trial(3, false, None));

        let merged = VerificationSummary::merge(
            Domain::NumberTheory,
            [a, b],
            Duration::from_millis(5),
        );
        assert_eq!(merged.total_trials(), 4);
        assert_eq!(merged.passed_count(), 2);
        let ids: Vec<u64> = merged.failed_trials().iter().map(|t| t.trial_id).collect();
        assert_eq!(ids, vec![0, 3]);
        assert!(merged.is_consistent());
        assert_eq!(merged.wall_time(), Duration::from_millis(5));
        assert!(merged.error_stats().is_none());
    }

    #[test]
    fn empty_summary_is_an_anomaly() {
        let s = VerificationSummary::new(Domain::Topology);
        assert_eq!(s.outcome(), Outcome::Empty);
        assert_eq!(s.success_rate(), None);
        assert!(s.is_consistent());
    }
}
