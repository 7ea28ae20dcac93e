use std::sync::Arc;
use std::time::Instant;

use crate::error::{ParameterError, Result};
use crate::math::number::{carmichael_lambda, euler_phi, gcd, mod_pow};
use crate::progress::ProgressObserver;
use crate::random::RandomSource;

use super::pool::{default_thread_count, for_each_trial, run_sharded, validate_sizes};
use super::{Domain, TrialInput, TrialResult, TrialValue, VerificationSummary};

/// Largest modulus the verifier will factor by trial division.
pub const MAX_MODULUS: u64 = 1 << 40;

/// Where the moduli under test come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModulusSource {
    /// Trial `i` tests `n = i + 2`.
    Sequential,
    /// Each trial draws `n` uniformly from `[2, max]`.
    Random { max: u64 },
}

/// The exponent `a` is raised to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exponent {
    /// Euler's totient `phi(n)`.
    Totient,
    /// Carmichael's `lambda(n)`, the smallest universal exponent.
    Carmichael,
}

impl Exponent {
    /// The exponent for modulus `n`.
    #[must_use]
    pub fn of(self, n: u64) -> u64 {
        match self {
            Self::Totient => euler_phi(n),
            Self::Carmichael => carmichael_lambda(n),
        }
    }
}

/// Parameters for [`VerifyEulerTheorem`].
#[derive(Debug, Clone)]
pub struct EulerTheoremParams {
    /// Number of moduli to test; one trial per modulus.
    pub count: u64,
    /// Maximum random draws per modulus while looking for a coprime base.
    pub exponent_bound: u32,
    /// Worker threads.
    pub thread_count: usize,
    /// Master seed; trial `i` draws from `RandomSource::for_trial(seed, i)`.
    pub seed: u64,
    /// How moduli are generated.
    pub moduli: ModulusSource,
    /// Which exponent to check.
    pub exponent: Exponent,
}

impl Default for EulerTheoremParams {
    fn default() -> Self {
        Self {
            count: 1000,
            exponent_bound: 20,
            thread_count: default_thread_count(),
            seed: 42,
            moduli: ModulusSource::Sequential,
            exponent: Exponent::Totient,
        }
    }
}

impl EulerTheoremParams {
    /// Parameters for `count` sequential moduli, everything else default.
    #[must_use]
    pub fn new(count: u64) -> Self {
        Self {
            count,
            ..Self::default()
        }
    }

    /// Sets the coprime-base draw bound.
    #[must_use]
    pub fn with_exponent_bound(mut self, exponent_bound: u32) -> Self {
        self.exponent_bound = exponent_bound;
        self
    }

    /// Sets the number of worker threads.
    #[must_use]
    pub fn with_threads(mut self, thread_count: usize) -> Self {
        self.thread_count = thread_count;
        self
    }

    /// Sets the master seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the modulus source.
    #[must_use]
    pub fn with_moduli(mut self, moduli: ModulusSource) -> Self {
        self.moduli = moduli;
        self
    }

    /// Sets the exponent to check.
    #[must_use]
    pub fn with_exponent(mut self, exponent: Exponent) -> Self {
        self.exponent = exponent;
        self
    }

    fn validate(&self) -> Result<()> {
        validate_sizes("count", self.count, self.thread_count)?;
        if self.exponent_bound == 0 {
            return Err(ParameterError::NonPositive {
                parameter: "exponent_bound",
            }
            .into());
        }
        let largest = match self.moduli {
            ModulusSource::Sequential => self.count.saturating_add(1),
            ModulusSource::Random { max } => {
                if max < 2 {
                    return Err(ParameterError::OutOfRange {
                        parameter: "max modulus",
                        value: max,
                        min: 2,
                        max: MAX_MODULUS,
                    }
                    .into());
                }
                max
            }
        };
        if largest > MAX_MODULUS {
            return Err(ParameterError::OutOfRange {
                parameter: "largest modulus",
                value: largest,
                min: 2,
                max: MAX_MODULUS,
            }
            .into());
        }
        Ok(())
    }
}

/// Checks `a^phi(n) = 1 (mod n)` for many moduli `n` and coprime bases `a`.
pub struct VerifyEulerTheorem {
    params: EulerTheoremParams,
    observer: Option<Arc<dyn ProgressObserver>>,
}

impl VerifyEulerTheorem {
    /// Creates a new `VerifyEulerTheorem` operation.
    #[must_use]
    pub fn new(params: EulerTheoremParams) -> Self {
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
    /// cannot be started. Failed trials are not errors; they are reported
    /// in the summary.
    pub fn execute(&self) -> Result<VerificationSummary> {
        self.params.validate()?;
        let p = &self.params;
        tracing::info!(
            count = p.count,
            threads = p.thread_count,
            seed = p.seed,
            exponent = ?p.exponent,
            "verifying Euler's theorem"
        );

        let started = Instant::now();
        let slices = run_sharded(
            "euler-theorem",
            p.count,
            p.thread_count,
            self.observer.clone(),
            |range, tracker| {
                let mut summary = VerificationSummary::new(Domain::NumberTheory);
                for_each_trial(range, tracker, |trial_id| {
                    let mut rng = RandomSource::for_trial(p.seed, trial_id);
                    let modulus = match p.moduli {
                        ModulusSource::Sequential => trial_id + 2,
                        ModulusSource::Random { max } => rng.next_int(2, max),
                    };
                    let base = coprime_base(modulus, &mut rng, p.exponent_bound);
                    let exponent = p.exponent.of(modulus);
                    summary.record(check_residue(trial_id, modulus, base, exponent));
                });
                summary
            },
        )?;

        let summary = VerificationSummary::merge(Domain::NumberTheory, slices, started.elapsed());
        summary.log();
        Ok(summary)
    }
}

/// Checks `base^exponent = 1 (mod modulus)`.
fn check_residue(trial_id: u64, modulus: u64, base: u64, exponent: u64) -> TrialResult {
    let residue = mod_pow(base, exponent, modulus);
    TrialResult {
        trial_id,
        input: TrialInput::Modular {
            modulus,
            base,
            exponent,
        },
        lhs: TrialValue::Residue(residue),
        rhs: TrialValue::Residue(1),
        passed: residue == 1,
        absolute_error: None,
    }
}

/// Draws a base in `[2, n - 1]` coprime to `n`, at most `max_draws` times.
///
/// When every draw shares a factor with `n`, falls back to the smallest
/// coprime base. `n = 2` has only the trivial unit, so its base is 1.
pub(crate) fn coprime_base(n: u64, rng: &mut RandomSource, max_draws: u32) -> u64 {
    if n <= 2 {
        return 1;
    }
    for _ in 0..max_draws {
        let a = rng.next_int(2, n - 1);
        if gcd(a, n) == 1 {
            return a;
        }
    }
    // n - 1 is always coprime to n
    (2..n).find(|&a| gcd(a, n) == 1).unwrap_or(n - 1)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::EulerError;
    use crate::verify::Outcome;

    #[test]
    fn hundred_moduli_all_pass() {
        let params = EulerTheoremParams::new(100)
            .with_exponent_bound(20)
            .with_threads(4)
            .with_seed(42);
        let summary = VerifyEulerTheorem::new(params).execute().unwrap();
        assert_eq!(summary.total_trials(), 100);
        assert!(summary.failed_trials().is_empty());
        assert_eq!(summary.outcome(), Outcome::Verified);
        assert_eq!(summary.domain(), Domain::NumberTheory);
    }

    #[test]
    fn carmichael_exponent_also_holds() {
        let params = EulerTheoremParams::new(500)
            .with_threads(2)
            .with_exponent(Exponent::Carmichael);
        let summary = VerifyEulerTheorem::new(params).execute().unwrap();
        assert_eq!(summary.outcome(), Outcome::Verified);
    }

    #[test]
    fn random_moduli_are_reproducible() {
        let params = EulerTheoremParams::new(300)
            .with_threads(3)
            .with_moduli(ModulusSource::Random { max: 1_000_000 });
        let a = VerifyEulerTheorem::new(params.clone()).execute().unwrap();
        let b = VerifyEulerTheorem::new(params).execute().unwrap();
        assert_eq!(a.total_trials(), 300);
        assert_eq!(a.failed_trials(), b.failed_trials());
        assert_eq!(a.outcome(), Outcome::Verified);
    }

    #[test]
    fn coprime_base_is_coprime() {
        let mut rng = RandomSource::seeded(9);
        for n in 2..500 {
            let a = coprime_base(n, &mut rng, 3);
            assert_eq!(gcd(a, n), 1, "n = {n}, a = {a}");
            assert!(a < n || n == 2);
        }
    }

    #[test]
    fn exhausted_draws_fall_back_to_smallest_unit() {
        // 30 = 2 * 3 * 5: with no draws allowed the smallest unit >= 2 is 7
        let mut rng = RandomSource::seeded(0);
        assert_eq!(coprime_base(30, &mut rng, 0), 7);
    }

    #[test]
    fn a_wrong_exponent_is_kept_as_a_failure() {
        // one past the totient lands back on the base itself
        let n = 7;
        let phi = Exponent::Totient.of(n);
        let mut summary = VerificationSummary::new(Domain::NumberTheory);
        summary.record(check_residue(0, n, 3, phi));
        summary.record(check_residue(1, n, 3, phi + 1));
        summary.record(check_residue(2, n, 5, phi));

        assert_eq!(summary.total_trials(), 3);
        assert_eq!(summary.passed_count(), 2);
        assert!(summary.is_consistent());
        assert_eq!(summary.outcome(), Outcome::Failed(1));
        let failed = &summary.failed_trials()[0];
        assert_eq!(failed.trial_id, 1);
        assert!(!failed.passed);
        assert_eq!(failed.lhs, TrialValue::Residue(3));
        assert_eq!(
            failed.input,
            TrialInput::Modular {
                modulus: 7,
                base: 3,
                exponent: 7,
            }
        );
    }

    #[test]
    fn thread_count_does_not_change_random_moduli() {
        let run = |threads| {
            let params = EulerTheoremParams::new(400)
                .with_threads(threads)
                .with_seed(42)
                .with_moduli(ModulusSource::Random { max: 1 << 32 });
            VerifyEulerTheorem::new(params).execute().unwrap()
        };
        let reference = run(1);
        assert_eq!(reference.outcome(), Outcome::Verified);
        for threads in [2, 4, 8] {
            let other = run(threads);
            assert_eq!(other.total_trials(), reference.total_trials());
            assert_eq!(other.failed_trials(), reference.failed_trials());
        }
    }

    #[test]
    fn trial_draws_do_not_depend_on_the_worker() {
        // what the verifier draws for a trial is fixed by seed and id alone
        let draw = |id| {
            let mut rng = RandomSource::for_trial(42, id);
            let n = rng.next_int(2, 1 << 32);
            (n, coprime_base(n, &mut rng, 20))
        };
        let forward: Vec<_> = (0..50).map(draw).collect();
        let backward: Vec<_> = (0..50).rev().map(draw).collect();
        assert!(forward.iter().eq(backward.iter().rev()));
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let cases = [
            EulerTheoremParams::new(0),
            EulerTheoremParams::new(10).with_threads(0),
            EulerTheoremParams::new(10).with_exponent_bound(0),
            EulerTheoremParams::new(10).with_moduli(ModulusSource::Random { max: 1 }),
            EulerTheoremParams::new(10).with_moduli(ModulusSource::Random {
                max: MAX_MODULUS + 1,
            }),
        ];
        for params in cases {
            let result = VerifyEulerTheorem::new(params.clone()).execute();
            assert!(
                matches!(result, Err(EulerError::Parameter(_))),
                "{params:?} should be rejected"
            );
        }
    }
}
