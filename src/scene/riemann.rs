use std::fmt;
use std::str::FromStr;

use crate::error::{try_with_capacity, ParameterError, Result};
use crate::math::complex::zeta_partial;
use crate::math::{Complex64, Point3};

use super::{ColorMap, Geometry, Scene, SurfaceSamples};

/// Highest surface point; poles and overflow are flattened to this.
const HEIGHT_CAP: f64 = 3.0;

/// Terms of the zeta partial sum evaluated per sample.
const ZETA_TERMS: u32 = 200;

/// Finest grid the builder accepts per side.
const MAX_RESOLUTION: u32 = 2048;

/// A complex function to plot over a rectangle of the plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComplexFunction {
    /// `1 / z`, with a pole at the origin.
    Reciprocal,
    /// `e^(i z)`, which reduces to Euler's formula on the real axis.
    #[default]
    EulerExp,
    /// Partial sums of the Riemann zeta series.
    Zeta,
}

impl ComplexFunction {
    /// Evaluates the function at `z`.
    #[must_use]
    pub fn eval(self, z: Complex64) -> Complex64 {
        match self {
            Self::Reciprocal => z.inv(),
            Self::EulerExp => (Complex64::i() * z).exp(),
            Self::Zeta => zeta_partial(z, ZETA_TERMS),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reciprocal => "reciprocal",
            Self::EulerExp => "exp",
            Self::Zeta => "zeta",
        }
    }
}

impl fmt::Display for ComplexFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComplexFunction {
    type Err = ParameterError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reciprocal" | "1/z" => Ok(Self::Reciprocal),
            "exp" | "euler" => Ok(Self::EulerExp),
            "zeta" => Ok(Self::Zeta),
            _ => Err(ParameterError::UnknownSelector {
                kind: "complex function",
                value: s.to_owned(),
            }),
        }
    }
}

/// Rectangle of the complex plane to sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceBounds {
    pub re_min: f64,
    pub re_max: f64,
    pub im_min: f64,
    pub im_max: f64,
}

impl Default for SurfaceBounds {
    fn default() -> Self {
        Self::square(2.0)
    }
}

impl SurfaceBounds {
    /// `[-half, half]` on both axes.
    #[must_use]
    pub fn square(half: f64) -> Self {
        Self {
            re_min: -half,
            re_max: half,
            im_min: -half,
            im_max: half,
        }
    }

    fn validate(&self) -> Result<()> {
        for (parameter, value) in [
            ("re_min", self.re_min),
            ("re_max", self.re_max),
            ("im_min", self.im_min),
            ("im_max", self.im_max),
        ] {
            if !value.is_finite() {
                return Err(ParameterError::NotFinite { parameter, value }.into());
            }
        }
        if self.re_max <= self.re_min || self.im_max <= self.im_min {
            return Err(ParameterError::NonPositive {
                parameter: "bounds extent",
            }
            .into());
        }
        Ok(())
    }
}

/// Height and phase of one sample. Non-finite values sit at the cap with
/// phase 0.
fn height_and_phase(w: Complex64) -> (f64, f64) {
    let magnitude = w.norm();
    if !magnitude.is_finite() || !w.arg().is_finite() {
        return (HEIGHT_CAP, 0.0);
    }
    ((magnitude.ln_1p() / 2.0).min(HEIGHT_CAP), w.arg())
}

/// Samples a complex function over a square grid and builds a height field
/// with domain coloring: height grows with `ln(1 + |w|)` and hue follows
/// `arg w`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildRiemannSurface {
    function: ComplexFunction,
    bounds: SurfaceBounds,
    resolution: u32,
}

impl BuildRiemannSurface {
    /// Creates a new `BuildRiemannSurface` operation sampling
    /// `resolution x resolution` points of `function`.
    #[must_use]
    pub fn new(function: ComplexFunction, resolution: u32) -> Self {
        Self {
            function,
            bounds: SurfaceBounds::default(),
            resolution,
        }
    }

    #[must_use]
    pub fn with_bounds(mut self, bounds: SurfaceBounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the resolution is outside `[2, 2048]`, the bounds
    /// are empty or not finite, or the grid cannot be allocated.
    pub fn execute(&self) -> Result<Scene> {
        if !(2..=MAX_RESOLUTION).contains(&self.resolution) {
            return Err(ParameterError::OutOfRange {
                parameter: "resolution",
                value: u64::from(self.resolution),
                min: 2,
                max: u64::from(MAX_RESOLUTION),
            }
            .into());
        }
        self.bounds.validate()?;

        let n = self.resolution as usize;
        let mut points = try_with_capacity("surface samples", n * n)?;
        let mut phases = try_with_capacity("surface phases", n * n)?;
        let b = self.bounds;
        let step = |lo: f64, hi: f64, i: u32| lo + (hi - lo) * f64::from(i) / f64::from(self.resolution - 1);
        for row in 0..self.resolution {
            let im = step(b.im_min, b.im_max, row);
            for col in 0..self.resolution {
                let re = step(b.re_min, b.re_max, col);
                let (height, phase) = height_and_phase(self.function.eval(Complex64::new(re, im)));
                points.push(Point3::new(re, im, height));
                phases.push(phase);
            }
        }
        tracing::debug!(function = %self.function, resolution = n, "sampled surface");

        Scene::new(
            Geometry::Surface(SurfaceSamples {
                rows: n,
                cols: n,
                points,
            }),
            phases,
            ColorMap::Phase,
            format!("Riemann surface of {}", self.function),
        )
    }
}
