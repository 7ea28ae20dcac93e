use std::collections::HashMap;

use crate::error::{Result, TopologyError};
use crate::math::Point3;

use super::Mesh;

/// The five convex regular polyhedra, triangulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatonicSolid {
    Tetrahedron,
    Cube,
    Octahedron,
    Icosahedron,
    Dodecahedron,
}

impl PlatonicSolid {
    /// All five solids.
    pub const ALL: [Self; 5] = [
        Self::Tetrahedron,
        Self::Cube,
        Self::Octahedron,
        Self::Icosahedron,
        Self::Dodecahedron,
    ];

    /// Human-readable name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Tetrahedron => "tetrahedron",
            Self::Cube => "cube",
            Self::Octahedron => "octahedron",
            Self::Icosahedron => "icosahedron",
            Self::Dodecahedron => "dodecahedron",
        }
    }

    /// Builds the triangulated solid.
    ///
    /// Non-triangular faces are fanned from their first vertex, so the cube
    /// has 12 triangles and the dodecahedron 36.
    ///
    /// # Errors
    ///
    /// Returns an error only if the built-in tables are inconsistent.
    pub fn mesh(self) -> Result<Mesh> {
        match self {
            Self::Tetrahedron => tetrahedron(),
            Self::Cube => cube(),
            Self::Octahedron => octahedron(),
            Self::Icosahedron => icosahedron(),
            Self::Dodecahedron => dodecahedron(),
        }
    }
}

fn tetrahedron() -> Result<Mesh> {
    let s = (2.0f64 / 3.0).sqrt();
    let base_z = -1.0 / 3f64.sqrt();
    let vertices = vec![
        Point3::new(s, 0.0, base_z),
        Point3::new(-s / 2.0, 0.5, base_z),
        Point3::new(-s / 2.0, -0.5, base_z),
        Point3::new(0.0, 0.0, 3f64.sqrt() / 3.0),
    ];
    Mesh::new(vertices, vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]])
}

fn cube() -> Result<Mesh> {
    let vertices = [
        (-1.0, -1.0, -1.0),
        (1.0, -1.0, -1.0),
        (1.0, 1.0, -1.0),
        (-1.0, 1.0, -1.0),
        (-1.0, -1.0, 1.0),
        (1.0, -1.0, 1.0),
        (1.0, 1.0, 1.0),
        (-1.0, 1.0, 1.0),
    ]
    .map(|(x, y, z)| Point3::new(x, y, z))
    .to_vec();

    let quads: [[u32; 4]; 6] = [
        [0, 3, 2, 1],
        [4, 5, 6, 7],
        [0, 1, 5, 4],
        [2, 3, 7, 6],
        [0, 4, 7, 3],
        [1, 2, 6, 5],
    ];
    let faces = quads
        .iter()
        .flat_map(|q| [[q[0], q[1], q[2]], [q[0], q[2], q[3]]])
        .collect();
    Mesh::new(vertices, faces)
}

fn octahedron() -> Result<Mesh> {
    let vertices = [
        (1.0, 0.0, 0.0),
        (-1.0, 0.0, 0.0),
        (0.0, 1.0, 0.0),
        (0.0, -1.0, 0.0),
        (0.0, 0.0, 1.0),
        (0.0, 0.0, -1.0),
    ]
    .map(|(x, y, z)| Point3::new(x, y, z))
    .to_vec();
    let faces = vec![
        [0, 2, 4],
        [2, 1, 4],
        [1, 3, 4],
        [3, 0, 4],
        [2, 0, 5],
        [1, 2, 5],
        [3, 1, 5],
        [0, 3, 5],
    ];
    Mesh::new(vertices, faces)
}

/// Unit icosahedron vertex positions and outward-wound faces.
pub(crate) fn icosahedron_tables() -> (Vec<Point3>, Vec<[u32; 3]>) {
    let t = (1.0 + 5f64.sqrt()) / 2.0;
    let vertices = [
        (-1.0, t, 0.0),
        (1.0, t, 0.0),
        (-1.0, -t, 0.0),
        (1.0, -t, 0.0),
        (0.0, -1.0, t),
        (0.0, 1.0, t),
        (0.0, -1.0, -t),
        (0.0, 1.0, -t),
        (t, 0.0, -1.0),
        (t, 0.0, 1.0),
        (-t, 0.0, -1.0),
        (-t, 0.0, 1.0),
    ]
    .map(|(x, y, z)| Point3::from(nalgebra::Vector3::new(x, y, z).normalize()))
    .to_vec();

    let faces = vec![
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];
    (vertices, faces)
}

fn icosahedron() -> Result<Mesh> {
    let (vertices, faces) = icosahedron_tables();
    Mesh::new(vertices, faces)
}

/// The dodecahedron as the dual of the icosahedron: one vertex per
/// icosahedron face (its centroid), one pentagon per icosahedron vertex.
#[allow(clippy::cast_possible_truncation)]
fn dodecahedron() -> Result<Mesh> {
    let (ico_vertices, ico_faces) = icosahedron_tables();

    let vertices: Vec<Point3> = ico_faces
        .iter()
        .map(|f| {
            let sum = f
                .iter()
                .fold(nalgebra::Vector3::zeros(), |acc, &i| acc + ico_vertices[i as usize].coords);
            Point3::from(sum / 3.0)
        })
        .collect();

    // directed edge (a, b) -> the face that contains it
    let mut face_of_edge: HashMap<(u32, u32), usize> = HashMap::with_capacity(ico_faces.len() * 3);
    for (fi, f) in ico_faces.iter().enumerate() {
        for k in 0..3 {
            face_of_edge.insert((f[k], f[(k + 1) % 3]), fi);
        }
    }

    let mut faces = Vec::with_capacity(36);
    for v in 0..ico_vertices.len() as u32 {
        let Some(start) = ico_faces.iter().position(|f| f.contains(&v)) else {
            continue;
        };

        // Walk the faces around `v`: the face after (v, x, y) is the one
        // holding the directed edge v -> y.
        let mut ring = Vec::with_capacity(5);
        let mut current = start;
        loop {
            ring.push(current as u32);
            let f = ico_faces[current];
            let pos = f.iter().position(|&i| i == v).unwrap_or(0);
            let y = f[(pos + 2) % 3];
            let next = *face_of_edge
                .get(&(v, y))
                .ok_or(TopologyError::NotClosed(v.min(y), v.max(y)))?;
            if next == start || ring.len() > ico_faces.len() {
                break;
            }
            current = next;
        }

        for i in 1..ring.len() - 1 {
            faces.push([ring[0], ring[i], ring[i + 1]]);
        }
    }

    Mesh::new(vertices, faces)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn platonic_counts() {
        // (V, E, F) after triangulating non-triangular faces
        let expected = [
            (PlatonicSolid::Tetrahedron, (4, 6, 4)),
            (PlatonicSolid::Cube, (8, 18, 12)),
            (PlatonicSolid::Octahedron, (6, 12, 8)),
            (PlatonicSolid::Icosahedron, (12, 30, 20)),
            (PlatonicSolid::Dodecahedron, (20, 54, 36)),
        ];
        for (solid, (v, e, f)) in expected {
            let c = solid.mesh().unwrap().census();
            assert_eq!((c.vertices, c.edges, c.faces), (v, e, f), "{}", solid.name());
            assert_eq!(c.characteristic, 2, "{}", solid.name());
        }
    }

    #[test]
    fn all_solids_are_closed() {
        for solid in PlatonicSolid::ALL {
            let mesh = solid.mesh().unwrap();
            assert!(mesh.validate_closed().is_ok(), "{}", solid.name());
        }
    }

    #[test]
    fn icosahedron_is_on_unit_sphere() {
        let mesh = PlatonicSolid::Icosahedron.mesh().unwrap();
        for v in mesh.vertices() {
            assert!((v.coords.norm() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn icosahedron_faces_wind_outward() {
        let mesh = PlatonicSolid::Icosahedron.mesh().unwrap();
        for (i, f) in mesh.faces().iter().enumerate() {
            let centroid: nalgebra::Vector3<f64> = f
                .iter()
                .map(|&k| mesh.vertices()[k as usize].coords)
                .sum();
            assert!(mesh.face_normal(i).dot(&centroid) > 0.0, "face {i}");
        }
    }

    #[test]
    fn cube_volume_and_area() {
        let mesh = PlatonicSolid::Cube.mesh().unwrap();
        assert!((mesh.volume() - 8.0).abs() < 1e-12);
        assert!((mesh.surface_area() - 24.0).abs() < 1e-12);
    }

    #[test]
    fn dodecahedron_vertices_are_equidistant() {
        let mesh = PlatonicSolid::Dodecahedron.mesh().unwrap();
        let r0 = mesh.vertices()[0].coords.norm();
        for v in mesh.vertices() {
            assert!((v.coords.norm() - r0).abs() < 1e-12);
        }
    }
}
