use crate::error::{try_with_capacity, ParameterError, Result};
use crate::math::number::{prime_counts, sieve};
use crate::math::Point3;

use super::{Camera, Color, ColorMap, Geometry, Scene};

/// Largest `limit` the spiral builder will sieve up to.
pub const MAX_ULAM_LIMIT: u64 = 1 << 28;

/// Position of `n >= 1` on the Ulam square spiral.
///
/// 1 sits at the origin, 2 at `(1, 0)`, and the walk turns
/// counter-clockwise: 3 at `(1, 1)`, 4 at `(0, 1)`, 5 at `(-1, 1)`. Ring `k`
/// ends on the odd square `(2k + 1)^2` at `(k, -k)`.
///
/// # Panics
///
/// Panics if `n == 0`.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub fn ulam_position(n: u64) -> (i64, i64) {
    assert!(n > 0, "the spiral starts at 1");
    let k = ceil_sqrt(n) / 2;
    let side = 2 * k;
    let ki = k as i64;
    let back = |corner: u64| (corner - n) as i64;

    let mut corner = (side + 1) * (side + 1);
    if n + side >= corner {
        return (ki - back(corner), -ki);
    }
    corner -= side;
    if n + side >= corner {
        return (-ki, -ki + back(corner));
    }
    corner -= side;
    if n + side >= corner {
        return (-ki + back(corner), ki);
    }
    (ki, ki - back(corner - side))
}

fn ceil_sqrt(n: u64) -> u64 {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let mut r = (n as f64).sqrt() as u64;
    while r * r < n {
        r += 1;
    }
    while r > 0 && (r - 1) * (r - 1) >= n {
        r -= 1;
    }
    r
}

/// Plots the primes up to `limit` on the Ulam spiral.
///
/// Each prime `p` becomes a point colored by `ln p`. With a density height
/// set, points are lifted to `z = pi(p) / p * height`, so the slowly
/// thinning prime density becomes a gentle slope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildUlamSpiral {
    limit: u64,
    density_height: Option<f64>,
}

impl BuildUlamSpiral {
    /// Creates a new `BuildUlamSpiral` operation for the integers `1..=limit`.
    #[must_use]
    pub fn new(limit: u64) -> Self {
        Self {
            limit,
            density_height: None,
        }
    }

    /// Lifts every prime by its local prime density times `height`.
    #[must_use]
    pub fn with_density_height(mut self, height: f64) -> Self {
        self.density_height = Some(height);
        self
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error if `limit` is outside `[2, MAX_ULAM_LIMIT]`, the
    /// height is not finite, or the sieve cannot be allocated.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn execute(&self) -> Result<Scene> {
        if !(2..=MAX_ULAM_LIMIT).contains(&self.limit) {
            return Err(ParameterError::OutOfRange {
                parameter: "limit",
                value: self.limit,
                min: 2,
                max: MAX_ULAM_LIMIT,
            }
            .into());
        }
        if let Some(value) = self.density_height.filter(|h| !h.is_finite()) {
            return Err(ParameterError::NotFinite {
                parameter: "density_height",
                value,
            }
            .into());
        }

        // limit <= 2^28 fits usize on every supported target
        let limit = self.limit as usize;
        let is_prime = sieve(limit)?;
        let pi = prime_counts(&is_prime)?;
        let count = pi.last().copied().unwrap_or(0) as usize;

        let mut points = try_with_capacity("spiral points", count)?;
        let mut data = try_with_capacity("spiral data", count)?;
        for (n, _) in is_prime.iter().enumerate().filter(|&(_, &p)| p) {
            let (x, y) = ulam_position(n as u64);
            let z = self
                .density_height
                .map_or(0.0, |h| f64::from(pi[n]) / n as f64 * h);
            points.push(Point3::new(x as f64, y as f64, z));
            data.push((n as f64).ln());
        }
        tracing::debug!(limit = self.limit, primes = count, "built Ulam spiral");

        let color_map = ColorMap::Gradient {
            from: Color::new(40, 80, 230),
            to: Color::new(240, 60, 40),
            min: 2f64.ln(),
            max: (self.limit as f64).ln(),
        };
        let title = format!("Ulam spiral: {count} primes up to {}", self.limit);
        let camera = if self.density_height.is_some() {
            Camera::default()
        } else {
            Camera::top_down()
        };
        Ok(Scene::new(Geometry::PointCloud(points), data, color_map, title)?.with_camera(camera))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::EulerError;

    #[test]
    fn first_ring_walks_counter_clockwise() {
        let expected = [
            (0, 0),
            (1, 0),
            (1, 1),
            (0, 1),
            (-1, 1),
            (-1, 0),
            (-1, -1),
            (0, -1),
            (1, -1),
            (2, -1),
            (2, 0),
        ];
        for (n, &pos) in (1u64..).zip(&expected) {
            assert_eq!(ulam_position(n), pos, "n = {n}");
        }
    }

    #[test]
    fn odd_squares_close_each_ring() {
        for k in 0i64..50 {
            let n = (2 * k + 1).pow(2) as u64;
            assert_eq!(ulam_position(n), (k, -k));
        }
    }

    #[test]
    fn consecutive_numbers_are_neighbours() {
        let mut seen = std::collections::HashSet::new();
        let mut prev = ulam_position(1);
        seen.insert(prev);
        for n in 2..2_000 {
            let pos = ulam_position(n);
            assert_eq!((pos.0 - prev.0).abs() + (pos.1 - prev.1).abs(), 1, "n = {n}");
            assert!(seen.insert(pos), "n = {n} revisits {pos:?}");
            prev = pos;
        }
    }

    #[test]
    fn spiral_has_one_point_per_prime() {
        let scene = BuildUlamSpiral::new(100).execute().unwrap();
        assert_eq!(scene.geometry().positions().len(), 25);
        assert_eq!(scene.data().len(), 25);
        assert!(scene.geometry().positions().iter().all(|p| p.z == 0.0));
        assert_eq!(scene.camera(), Camera::top_down());
    }

    #[test]
    fn density_lifts_points() {
        let scene = BuildUlamSpiral::new(100)
            .with_density_height(10.0)
            .execute()
            .unwrap();
        // 2 is the first prime: pi(2) / 2 * 10
        let first = scene.geometry().positions()[0];
        assert!((first.z - 5.0).abs() < 1e-12);
    }

    #[test]
    fn limits_are_checked() {
        for limit in [0, 1, MAX_ULAM_LIMIT + 1] {
            assert!(matches!(
                BuildUlamSpiral::new(limit).execute(),
                Err(EulerError::Parameter(ParameterError::OutOfRange { .. }))
            ));
        }
        assert!(BuildUlamSpiral::new(10)
            .with_density_height(f64::NAN)
            .execute()
            .is_err());
    }
}
