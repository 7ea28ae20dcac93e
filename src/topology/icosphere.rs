use crate::error::{ParameterError, Result};

use super::solids::icosahedron_tables;
use super::Mesh;

/// Deepest subdivision level whose face indices still fit in `u32`
/// (`20 * 4^13` faces).
pub const MAX_SUBDIVISION_LEVEL: u32 = 13;

/// Builds an icosphere by repeatedly splitting every face of an icosahedron
/// into four.
///
/// Level `k` has `20 * 4^k` faces, `30 * 4^k` edges and `10 * 4^k + 2`
/// vertices. The vertices are projected onto the unit sphere after the last
/// refinement, which leaves the counts untouched.
pub struct MakeIcosphere {
    level: u32,
}

impl MakeIcosphere {
    /// Creates a new `MakeIcosphere` operation.
    #[must_use]
    pub fn new(level: u32) -> Self {
        Self { level }
    }

    /// Expected `(V, E, F)` for the configured level, computed in closed form.
    #[must_use]
    pub fn expected_counts(&self) -> Option<(u64, u64, u64)> {
        let scale = 4u64.checked_pow(self.level)?;
        let faces = scale.checked_mul(20)?;
        let edges = scale.checked_mul(30)?;
        Some((edges - faces + 2, edges, faces))
    }

    /// Executes the operation, returning the refined mesh.
    ///
    /// # Errors
    ///
    /// Returns an error if the level exceeds [`MAX_SUBDIVISION_LEVEL`] or
    /// the refined mesh cannot be allocated.
    pub fn execute(&self) -> Result<Mesh> {
        self.execute_with(|_, _| {})
    }

    /// Like [`execute`](Self::execute), calling `on_level` with every
    /// intermediate mesh, starting with the bare icosahedron at level 0.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub fn execute_with(&self, mut on_level: impl FnMut(u32, &Mesh)) -> Result<Mesh> {
        if self.level > MAX_SUBDIVISION_LEVEL {
            return Err(ParameterError::OutOfRange {
                parameter: "subdivision_level",
                value: u64::from(self.level),
                min: 0,
                max: u64::from(MAX_SUBDIVISION_LEVEL),
            }
            .into());
        }

        let (vertices, faces) = icosahedron_tables();
        let mut mesh = Mesh::new(vertices, faces)?;
        on_level(0, &mesh);
        for level in 1..=self.level {
            mesh = mesh.subdivide()?;
            on_level(level, &mesh);
        }
        Ok(mesh.projected_to_sphere(1.0))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::EulerError;

    #[test]
    fn level_zero_is_the_icosahedron() {
        let c = MakeIcosphere::new(0).execute().unwrap().census();
        assert_eq!((c.vertices, c.edges, c.faces), (12, 30, 20));
    }

    #[test]
    fn level_two_counts() {
        let c = MakeIcosphere::new(2).execute().unwrap().census();
        assert_eq!((c.vertices, c.edges, c.faces), (42, 120, 80));
        assert_eq!(c.characteristic, 2);
    }

    #[test]
    fn counts_match_closed_form_up_to_level_five() {
        for level in 0..=5 {
            let op = MakeIcosphere::new(level);
            let (v, e, f) = op.expected_counts().unwrap();
            let c = op.execute().unwrap().census();
            assert_eq!(c.vertices as u64, v, "level {level}");
            assert_eq!(c.edges as u64, e, "level {level}");
            assert_eq!(c.faces as u64, f, "level {level}");
            assert_eq!(c.characteristic, 2, "level {level}");
        }
    }

    #[test]
    fn vertices_lie_on_unit_sphere() {
        let mesh = MakeIcosphere::new(3).execute().unwrap();
        for v in mesh.vertices() {
            assert!((v.coords.norm() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn refined_sphere_is_closed() {
        assert!(MakeIcosphere::new(3).execute().unwrap().validate_closed().is_ok());
    }

    #[test]
    fn callback_sees_every_level() {
        let mut seen = Vec::new();
        MakeIcosphere::new(3)
            .execute_with(|level, mesh| seen.push((level, mesh.faces().len())))
            .unwrap();
        assert_eq!(seen, vec![(0, 20), (1, 80), (2, 320), (3, 1280)]);
    }

    #[test]
    fn too_deep_is_rejected() {
        let result = MakeIcosphere::new(MAX_SUBDIVISION_LEVEL + 1).execute();
        assert!(matches!(
            result,
            Err(EulerError::Parameter(ParameterError::OutOfRange { .. }))
        ));
    }
}
