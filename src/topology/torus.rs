use std::f64::consts::TAU;

use crate::error::{try_with_capacity, ParameterError, Result};
use crate::math::Point3;

use super::Mesh;

/// Builds a triangulated torus about the z axis.
///
/// The torus is the genus-1 counterpart of the icosphere: its Euler
/// characteristic is 0 at every resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MakeTorus {
    major_radius: f64,
    minor_radius: f64,
    rings: u32,
    sides: u32,
}

impl MakeTorus {
    /// Creates a new `MakeTorus` operation with `rings` segments around the
    /// central axis and `sides` around the tube.
    #[must_use]
    pub fn new(major_radius: f64, minor_radius: f64, rings: u32, sides: u32) -> Self {
        Self {
            major_radius,
            minor_radius,
            rings,
            sides,
        }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than 3 rings or sides are requested (the
    /// quad grid would fold onto itself) or the grid is too large to index.
    #[allow(clippy::cast_precision_loss)]
    pub fn execute(&self) -> Result<Mesh> {
        for (parameter, value) in [("rings", self.rings), ("sides", self.sides)] {
            if value < 3 {
                return Err(ParameterError::OutOfRange {
                    parameter,
                    value: u64::from(value),
                    min: 3,
                    max: u64::from(u32::MAX),
                }
                .into());
            }
        }
        let Some(vertex_count) = self.rings.checked_mul(self.sides) else {
            return Err(ParameterError::OutOfRange {
                parameter: "rings * sides",
                value: u64::from(self.rings) * u64::from(self.sides),
                min: 9,
                max: u64::from(u32::MAX),
            }
            .into());
        };

        let mut vertices = try_with_capacity("torus vertices", vertex_count as usize)?;
        for i in 0..self.rings {
            let u = TAU * f64::from(i) / f64::from(self.rings);
            for j in 0..self.sides {
                let v = TAU * f64::from(j) / f64::from(self.sides);
                let r = self.major_radius + self.minor_radius * v.cos();
                vertices.push(Point3::new(r * u.cos(), r * u.sin(), self.minor_radius * v.sin()));
            }
        }

        let index = |i: u32, j: u32| (i % self.rings) * self.sides + (j % self.sides);
        let mut faces = try_with_capacity("torus faces", 2 * vertex_count as usize)?;
        for i in 0..self.rings {
            for j in 0..self.sides {
                let a = index(i, j);
                let b = index(i + 1, j);
                let c = index(i + 1, j + 1);
                let d = index(i, j + 1);
                faces.push([a, b, c]);
                faces.push([a, c, d]);
            }
        }

        Mesh::new(vertices, faces)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn torus_has_characteristic_zero() {
        for (rings, sides) in [(3, 3), (8, 5), (24, 12)] {
            let c = MakeTorus::new(2.0, 0.5, rings, sides).execute().unwrap().census();
            let n = (rings * sides) as usize;
            assert_eq!((c.vertices, c.edges, c.faces), (n, 3 * n, 2 * n));
            assert_eq!(c.characteristic, 0);
        }
    }

    #[test]
    fn torus_is_closed() {
        let mesh = MakeTorus::new(2.0, 0.5, 16, 8).execute().unwrap();
        assert!(mesh.validate_closed().is_ok());
    }

    #[test]
    fn fine_torus_area_approaches_exact() {
        let mesh = MakeTorus::new(2.0, 0.5, 256, 128).execute().unwrap();
        let exact = 4.0 * PI * PI * 2.0 * 0.5;
        assert!((mesh.surface_area() - exact).abs() / exact < 1e-3);
    }

    #[test]
    fn too_few_sides_is_rejected() {
        assert!(MakeTorus::new(2.0, 0.5, 8, 2).execute().is_err());
    }
}
