use std::collections::HashMap;

use crate::error::{try_with_capacity, Result, TopologyError};
use crate::math::{Point3, Vector3, TOLERANCE};

/// Vertex, edge and face counts of a mesh together with its Euler
/// characteristic `V - E + F`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshCensus {
    /// Number of vertices.
    pub vertices: usize,
    /// Number of distinct undirected edges.
    pub edges: usize,
    /// Number of triangular faces.
    pub faces: usize,
    /// `V - E + F`, computed exactly.
    pub characteristic: i64,
}

impl std::fmt::Display for MeshCensus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "V={} E={} F={} chi={}",
            self.vertices, self.edges, self.faces, self.characteristic
        )
    }
}

/// An immutable indexed triangle mesh.
///
/// Vertices live in an arena whose insertion order is their index. The edge
/// set is derived from the faces once, at construction, as sorted unique
/// `[min, max]` index pairs. Refinement never edits a mesh in place; see
/// [`Mesh::subdivide`].
#[derive(Debug, Clone)]
pub struct Mesh {
    vertices: Vec<Point3>,
    faces: Vec<[u32; 3]>,
    edges: Vec<[u32; 2]>,
    vertex_generation: Vec<u32>,
}

impl Mesh {
    /// Creates a mesh from vertex positions and triangle indices.
    ///
    /// # Errors
    ///
    /// Returns an error if a face references a missing vertex or repeats a
    /// vertex, or if the edge set cannot be allocated.
    pub fn new(vertices: Vec<Point3>, faces: Vec<[u32; 3]>) -> Result<Self> {
        let generation = vec![0; vertices.len()];
        Self::with_generation(vertices, faces, generation)
    }

    /// Like [`Mesh::new`], also recording the subdivision level at which each
    /// vertex was created.
    pub(crate) fn with_generation(
        vertices: Vec<Point3>,
        faces: Vec<[u32; 3]>,
        vertex_generation: Vec<u32>,
    ) -> Result<Self> {
        debug_assert_eq!(vertices.len(), vertex_generation.len());
        for (i, face) in faces.iter().enumerate() {
            for &index in face {
                if index as usize >= vertices.len() {
                    return Err(TopologyError::IndexOutOfBounds {
                        face: i,
                        index,
                        len: vertices.len(),
                    }
                    .into());
                }
            }
            if face[0] == face[1] || face[1] == face[2] || face[2] == face[0] {
                return Err(TopologyError::DegenerateFace(i).into());
            }
        }

        let edges = collect_edges(&faces)?;
        Ok(Self {
            vertices,
            faces,
            edges,
            vertex_generation,
        })
    }

    /// Vertex positions, indexed by vertex id.
    #[must_use]
    pub fn vertices(&self) -> &[Point3] {
        &self.vertices
    }

    /// Triangles as vertex index triples.
    #[must_use]
    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    /// Deduplicated undirected edges, sorted, each stored as `[min, max]`.
    #[must_use]
    pub fn edges(&self) -> &[[u32; 2]] {
        &self.edges
    }

    /// Subdivision level at which each vertex was introduced (0 for the base
    /// solid).
    #[must_use]
    pub fn vertex_generation(&self) -> &[u32] {
        &self.vertex_generation
    }

    /// Returns `V`, `E`, `F` and the Euler characteristic.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn census(&self) -> MeshCensus {
        let v = self.vertices.len();
        let e = self.edges.len();
        let f = self.faces.len();
        MeshCensus {
            vertices: v,
            edges: e,
            faces: f,
            characteristic: v as i64 - e as i64 + f as i64,
        }
    }

    /// The Euler characteristic `V - E + F`.
    #[must_use]
    pub fn euler_characteristic(&self) -> i64 {
        self.census().characteristic
    }

    /// Checks that the mesh is a closed surface: every edge borders exactly
    /// two faces.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::NotClosed`] naming the first offending edge.
    pub fn validate_closed(&self) -> std::result::Result<(), TopologyError> {
        let mut incidence: HashMap<[u32; 2], u32> = HashMap::with_capacity(self.edges.len());
        for face in &self.faces {
            for k in 0..3 {
                *incidence.entry(edge_key(face[k], face[(k + 1) % 3])).or_insert(0) += 1;
            }
        }
        for edge in &self.edges {
            if incidence.get(edge).copied() != Some(2) {
                return Err(TopologyError::NotClosed(edge[0], edge[1]));
            }
        }
        Ok(())
    }

    /// Total area of all triangles.
    #[must_use]
    pub fn surface_area(&self) -> f64 {
        self.faces
            .iter()
            .map(|&f| {
                let [a, b, c] = self.corners(f);
                (b - a).cross(&(c - a)).norm() * 0.5
            })
            .sum()
    }

    /// Enclosed volume by the divergence theorem.
    ///
    /// Only meaningful for closed meshes; the sign depends on face
    /// orientation, so the absolute value is returned.
    #[must_use]
    pub fn volume(&self) -> f64 {
        let signed: f64 = self
            .faces
            .iter()
            .map(|&f| {
                let [a, b, c] = self.corners(f);
                a.coords.dot(&b.coords.cross(&c.coords)) / 6.0
            })
            .sum();
        signed.abs()
    }

    /// Unit normal of face `index`, following its winding.
    #[must_use]
    pub fn face_normal(&self, index: usize) -> Vector3 {
        let [a, b, c] = self.corners(self.faces[index]);
        (b - a).cross(&(c - a)).try_normalize(TOLERANCE).unwrap_or_else(Vector3::zeros)
    }

    /// Returns a copy with every vertex projected onto the sphere of the
    /// given radius about the origin. Connectivity is unchanged.
    #[must_use]
    pub fn projected_to_sphere(&self, radius: f64) -> Self {
        let vertices = self
            .vertices
            .iter()
            .map(|p| match p.coords.try_normalize(TOLERANCE) {
                Some(dir) => Point3::from(dir * radius),
                None => *p,
            })
            .collect();
        Self {
            vertices,
            faces: self.faces.clone(),
            edges: self.edges.clone(),
            vertex_generation: self.vertex_generation.clone(),
        }
    }

    /// Splits every triangle into four by inserting edge midpoints.
    ///
    /// Midpoints are shared between the two faces of an edge through a
    /// lookup keyed by the sorted endpoint pair, so the result has exactly
    /// `V + E` vertices, `2E + 3F` edges and `4F` faces.
    ///
    /// # Errors
    ///
    /// Returns an error if the refined mesh would overflow 32-bit indices or
    /// cannot be allocated.
    pub fn subdivide(&self) -> Result<Self> {
        let generation = self.vertex_generation.iter().copied().max().unwrap_or(0) + 1;
        let new_vertex_count = self.vertices.len() + self.edges.len();
        if u32::try_from(new_vertex_count).is_err() {
            return Err(crate::error::ParameterError::OutOfRange {
                parameter: "vertex count",
                value: new_vertex_count as u64,
                min: 0,
                max: u64::from(u32::MAX),
            }
            .into());
        }

        let mut vertices = try_with_capacity("subdivided vertices", new_vertex_count)?;
        vertices.extend_from_slice(&self.vertices);
        let mut vertex_generation = try_with_capacity("vertex generations", new_vertex_count)?;
        vertex_generation.extend_from_slice(&self.vertex_generation);
        let mut faces = try_with_capacity("subdivided faces", self.faces.len() * 4)?;

        let mut midpoints: HashMap<[u32; 2], u32> = HashMap::with_capacity(self.edges.len());
        #[allow(clippy::cast_possible_truncation)]
        let mut midpoint = |a: u32, b: u32| -> u32 {
            *midpoints.entry(edge_key(a, b)).or_insert_with(|| {
                let mid = nalgebra::center(&vertices[a as usize], &vertices[b as usize]);
                // bounded by the u32 check above
                let index = vertices.len() as u32;
                vertices.push(mid);
                vertex_generation.push(generation);
                index
            })
        };

        for &[v0, v1, v2] in &self.faces {
            let a = midpoint(v0, v1);
            let b = midpoint(v1, v2);
            let c = midpoint(v2, v0);
            faces.push([v0, a, c]);
            faces.push([v1, b, a]);
            faces.push([v2, c, b]);
            faces.push([a, b, c]);
        }

        Self::with_generation(vertices, faces, vertex_generation)
    }

    fn corners(&self, face: [u32; 3]) -> [Point3; 3] {
        face.map(|i| self.vertices[i as usize])
    }
}

/// Normalizes an undirected edge to `[min, max]`.
#[must_use]
pub fn edge_key(a: u32, b: u32) -> [u32; 2] {
    if a < b {
        [a, b]
    } else {
        [b, a]
    }
}

fn collect_edges(faces: &[[u32; 3]]) -> Result<Vec<[u32; 2]>> {
    let mut edges = try_with_capacity("edge list", faces.len() * 3)?;
    for face in faces {
        for k in 0..3 {
            edges.push(edge_key(face[k], face[(k + 1) % 3]));
        }
    }
    edges.sort_unstable();
    edges.dedup();
    Ok(edges)
}
