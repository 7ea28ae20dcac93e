use std::f64::consts::PI;
use std::sync::Arc;

use crate::error::Result;
use crate::topology::Mesh;

use super::{Color, ColorMap, Geometry, Scene};

/// How mesh vertices are colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeshColoring {
    /// Hue by azimuth around the z axis.
    #[default]
    Position,
    /// By the subdivision level that created each vertex, so the original
    /// icosahedron corners stand out from later midpoints.
    Generation,
}

/// Wraps an existing mesh in a scene without copying it.
#[derive(Debug, Clone)]
pub struct BuildMeshScene {
    mesh: Arc<Mesh>,
    coloring: MeshColoring,
    title: String,
}

impl BuildMeshScene {
    /// Creates a new `BuildMeshScene` operation.
    #[must_use]
    pub fn new(mesh: Arc<Mesh>) -> Self {
        let census = mesh.census();
        Self {
            mesh,
            coloring: MeshColoring::default(),
            title: format!("Euler characteristic: {census}"),
        }
    }

    #[must_use]
    pub fn with_coloring(mut self, coloring: MeshColoring) -> Self {
        self.coloring = coloring;
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Never fails for a well-formed mesh; the `Result` mirrors the other
    /// builders.
    pub fn execute(&self) -> Result<Scene> {
        let (data, color_map) = match self.coloring {
            MeshColoring::Position => (
                self.mesh.vertices().iter().map(|p| p.y.atan2(p.x)).collect(),
                ColorMap::Hue { min: -PI, max: PI },
            ),
            MeshColoring::Generation => {
                let data: Vec<f64> = self
                    .mesh
                    .vertex_generation()
                    .iter()
                    .map(|&g| f64::from(g))
                    .collect();
                let max = data.iter().copied().fold(0.0, f64::max);
                (
                    data,
                    ColorMap::Gradient {
                        from: Color::new(250, 200, 40),
                        to: Color::new(30, 90, 200),
                        min: 0.0,
                        max,
                    },
                )
            }
        };
        Scene::new(
            Geometry::Mesh(Arc::clone(&self.mesh)),
            data,
            color_map,
            self.title.clone(),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::topology::MakeIcosphere;

    #[test]
    fn scene_shares_the_mesh() {
        let mesh = Arc::new(MakeIcosphere::new(2).execute().unwrap());
        let scene = BuildMeshScene::new(Arc::clone(&mesh)).execute().unwrap();
        match scene.geometry() {
            Geometry::Mesh(m) => assert!(Arc::ptr_eq(m, &mesh)),
            other => panic!("unexpected geometry {other:?}"),
        }
        assert_eq!(scene.data().len(), 42);
        assert!(scene.title().contains("V=42 E=120 F=80 chi=2"));
    }

    #[test]
    fn generation_coloring_separates_levels() {
        let mesh = Arc::new(MakeIcosphere::new(2).execute().unwrap());
        let scene = BuildMeshScene::new(mesh)
            .with_coloring(MeshColoring::Generation)
            .execute()
            .unwrap();
        let corners = scene.data().iter().filter(|&&g| g == 0.0).count();
        assert_eq!(corners, 12);
        assert_ne!(scene.color_of(0), scene.color_of(41));
    }
}
