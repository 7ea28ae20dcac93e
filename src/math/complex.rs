//! Complex-valued kernels: compensated summation, a series exponential that
//! is independent of the platform `exp`, and the Riemann zeta partial sum.

use super::Complex64;

/// Maximum number of Taylor terms before the series is cut off.
const TAYLOR_MAX_TERMS: usize = 500;

/// Terms smaller than this stop the series.
const TAYLOR_CONVERGENCE: f64 = 1e-20;

/// Kahan-compensated running sum.
#[derive(Debug, Clone, Copy, Default)]
pub struct KahanSum {
    sum: f64,
    compensation: f64,
}

impl KahanSum {
    /// Creates an empty sum.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value to the sum.
    pub fn add(&mut self, value: f64) {
        let y = value - self.compensation;
        let t = self.sum + y;
        self.compensation = (t - self.sum) - y;
        self.sum = t;
    }

    /// Returns the current total.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.sum
    }
}

/// Computes `e^z` from its Taylor series with compensated summation.
///
/// Arguments with `|z| > 1` are scaled down by a power of two first and the
/// result squared back up, which keeps every term below 1 in magnitude.
#[must_use]
pub fn exp_taylor(z: Complex64) -> Complex64 {
    let magnitude = z.norm();
    if !magnitude.is_finite() {
        return Complex64::new(f64::NAN, f64::NAN);
    }

    let mut squarings = 0u32;
    let mut reduced = z;
    let mut m = magnitude;
    while m > 1.0 {
        reduced /= 2.0;
        m /= 2.0;
        squarings += 1;
    }

    let mut re = KahanSum::new();
    let mut im = KahanSum::new();
    re.add(1.0);

    let mut term = Complex64::new(1.0, 0.0);
    for k in 1..=TAYLOR_MAX_TERMS {
        #[allow(clippy::cast_precision_loss)]
        let kf = k as f64;
        term *= reduced / kf;
        re.add(term.re);
        im.add(term.im);
        if term.norm() < TAYLOR_CONVERGENCE {
            break;
        }
    }

    let mut result = Complex64::new(re.total(), im.total());
    for _ in 0..squarings {
        result *= result;
    }
    result
}

/// Partial sum of the Riemann zeta series `sum 1/n^s`.
///
/// Only meaningful for `Re(s) > 1`; elsewhere the partial sums do not
/// converge and the value is merely a bounded surface for plotting.
#[must_use]
pub fn zeta_partial(s: Complex64, max_terms: u32) -> Complex64 {
    let mut sum = Complex64::new(0.0, 0.0);
    for n in 1..=max_terms {
        let term = Complex64::new(f64::from(n), 0.0).powc(-s);
        sum += term;
        if term.norm() < 1e-10 {
            break;
        }
    }
    sum
}
