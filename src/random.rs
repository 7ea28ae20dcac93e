use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seeded, restartable pseudo-random source used by every verifier.
///
/// Generators are owned, never shared. Verifiers derive one per trial with
/// [`RandomSource::for_trial`], so what a trial draws depends only on the
/// master seed and its id, never on which worker runs it.
#[derive(Debug, Clone)]
pub struct RandomSource {
    seed: u64,
    rng: StdRng,
}

impl RandomSource {
    /// Creates a generator whose sequence is fully determined by `seed`.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Derives the generator for trial `trial_id` of a run seeded with
    /// `master`.
    ///
    /// Distinct ids give statistically independent streams; the same
    /// `(master, trial_id)` pair always gives the same stream.
    #[must_use]
    pub fn for_trial(master: u64, trial_id: u64) -> Self {
        let mut state = master ^ trial_id.wrapping_mul(0xd1b5_4a32_d192_ed03);
        Self::seeded(splitmix64(&mut state))
    }

    /// Returns the seed this generator was created with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Rewinds the generator to the start of its sequence.
    pub fn restart(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
    }

    /// Returns an integer in `[low, high]`.
    ///
    /// # Panics
    ///
    /// Panics if `low > high`.
    pub fn next_int(&mut self, low: u64, high: u64) -> u64 {
        self.rng.gen_range(low..=high)
    }

    /// Returns a real in `[low, high)`.
    ///
    /// # Panics
    ///
    /// Panics if the range is empty or not finite.
    pub fn next_real(&mut self, low: f64, high: f64) -> f64 {
        self.rng.gen_range(low..high)
    }
}

/// One step of the `SplitMix64` generator, used to decorrelate seeds.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
