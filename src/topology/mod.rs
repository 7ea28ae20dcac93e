//! Triangle meshes for checking Euler's polyhedron formula.
//!
//! Meshes are index arenas: vertices are addressed by their insertion index
//! and faces by index triples, so shared vertices and edges need no pointer
//! graph.

pub mod icosphere;
pub mod mesh;
pub mod solids;
pub mod torus;

pub use icosphere::{MakeIcosphere, MAX_SUBDIVISION_LEVEL};
pub use mesh::{edge_key, Mesh, MeshCensus};
pub use solids::PlatonicSolid;
pub use torus::MakeTorus;
