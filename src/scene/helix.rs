use std::f64::consts::TAU;

use crate::error::{try_with_capacity, ParameterError, Result};
use crate::math::Point3;
use crate::verify::complex::theta_at;

use super::{ColorMap, Geometry, Scene};

/// Lifts the unit circle traced by `e^(i theta)` into a helix: each angle
/// becomes `(cos theta, sin theta, pitch * theta)`, hued by `theta`.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildEulerHelix {
    angles: Vec<f64>,
    pitch: f64,
}

impl BuildEulerHelix {
    /// Creates a helix over explicit angles, e.g. the samples of a
    /// verification run.
    #[must_use]
    pub fn from_angles(angles: Vec<f64>) -> Self {
        Self { angles, pitch: 0.1 }
    }

    /// Creates a helix of `points` evenly spaced angles over `revolutions`
    /// full turns.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than two points are requested or
    /// `revolutions` is not a positive finite number.
    pub fn turns(revolutions: f64, points: u32) -> Result<Self> {
        if points < 2 {
            return Err(ParameterError::OutOfRange {
                parameter: "points",
                value: u64::from(points),
                min: 2,
                max: u64::from(u32::MAX),
            }
            .into());
        }
        if !revolutions.is_finite() {
            return Err(ParameterError::NotFinite {
                parameter: "revolutions",
                value: revolutions,
            }
            .into());
        }
        if revolutions <= 0.0 {
            return Err(ParameterError::NonPositive {
                parameter: "revolutions",
            }
            .into());
        }
        let last = u64::from(points - 1);
        let mut angles = try_with_capacity("helix angles", points as usize)?;
        angles.extend((0..=last).map(|i| theta_at(i, last) * revolutions));
        Ok(Self::from_angles(angles))
    }

    /// Rise per radian.
    #[must_use]
    pub fn with_pitch(mut self, pitch: f64) -> Self {
        self.pitch = pitch;
        self
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no angles or the pitch is not finite.
    pub fn execute(&self) -> Result<Scene> {
        if self.angles.is_empty() {
            return Err(ParameterError::NonPositive { parameter: "angles" }.into());
        }
        if !self.pitch.is_finite() {
            return Err(ParameterError::NotFinite {
                parameter: "pitch",
                value: self.pitch,
            }
            .into());
        }

        let points: Vec<Point3> = self
            .angles
            .iter()
            .map(|&theta| {
                let (sin, cos) = theta.sin_cos();
                Point3::new(cos, sin, self.pitch * theta)
            })
            .collect();
        let (min, max) = self
            .angles
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &t| {
                (lo.min(t), hi.max(t))
            });
        let turns = (max - min) / TAU;
        Scene::new(
            Geometry::Polyline(points),
            self.angles.clone(),
            ColorMap::Hue { min, max },
            format!("Euler's formula: e^(i theta) over {turns:.1} turns"),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn helix_points_sit_on_the_unit_cylinder() {
        let scene = BuildEulerHelix::turns(3.0, 300).unwrap().execute().unwrap();
        let points = scene.geometry().positions();
        assert_eq!(points.len(), 300);
        for p in points {
            assert_relative_eq!(p.x.hypot(p.y), 1.0, epsilon = 1e-12);
        }
        assert_relative_eq!(points[0].z, 0.0);
        assert_relative_eq!(points[299].z, 0.1 * 3.0 * TAU, epsilon = 1e-12);
    }

    #[test]
    fn pitch_scales_height() {
        let scene = BuildEulerHelix::from_angles(vec![0.0, 1.0, 2.0])
            .with_pitch(2.0)
            .execute()
            .unwrap();
        let z: Vec<f64> = scene.geometry().positions().iter().map(|p| p.z).collect();
        assert_eq!(z, vec![0.0, 2.0, 4.0]);
        assert!(matches!(scene.geometry(), Geometry::Polyline(_)));
    }

    #[test]
    fn bad_parameters() {
        assert!(BuildEulerHelix::turns(1.0, 1).is_err());
        assert!(BuildEulerHelix::turns(0.0, 10).is_err());
        assert!(BuildEulerHelix::turns(f64::NAN, 10).is_err());
        assert!(BuildEulerHelix::from_angles(Vec::new()).execute().is_err());
    }
}
