//! Scenes: drawable geometry plus the scalar data that colors it.
//!
//! Builders here are pure. They read domain data, allocate a fresh
//! [`Scene`] and never touch the renderer or the filesystem.

mod helix;
mod mesh_scene;
mod riemann;
mod ulam;

pub use helix::BuildEulerHelix;
pub use mesh_scene::{BuildMeshScene, MeshColoring};
pub use riemann::{BuildRiemannSurface, ComplexFunction, SurfaceBounds};
pub use ulam::{ulam_position, BuildUlamSpiral, MAX_ULAM_LIMIT};

use std::f64::consts::PI;
use std::sync::Arc;

use crate::error::{ParameterError, Result};
use crate::math::{Point3, Vector3};
use crate::topology::Mesh;

/// An 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Converts hue, saturation and value, each in `[0, 1]`, to RGB.
    /// Hue wraps around.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_hsv(h: f64, s: f64, v: f64) -> Self {
        let h = h.rem_euclid(1.0) * 6.0;
        let s = s.clamp(0.0, 1.0);
        let v = v.clamp(0.0, 1.0);
        let sector = h.floor();
        let f = h - sector;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));
        let (r, g, b) = match sector as u8 {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };
        Self::from_unit(r, g, b)
    }

    /// Linear blend: `t = 0` gives `self`, `t = 1` gives `other`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| f64::from(a) + (f64::from(b) - f64::from(a)) * t;
        Self::from_unit(
            mix(self.r, other.r) / 255.0,
            mix(self.g, other.g) / 255.0,
            mix(self.b, other.b) / 255.0,
        )
    }

    /// Scales every channel by `factor`, saturating.
    #[must_use]
    pub fn shaded(self, factor: f64) -> Self {
        Self::from_unit(
            f64::from(self.r) / 255.0 * factor,
            f64::from(self.g) / 255.0 * factor,
            f64::from(self.b) / 255.0 * factor,
        )
    }

    /// Quantizes channels in `[0, 1]`, clamping out-of-range values.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub(crate) fn from_unit(r: f64, g: f64, b: f64) -> Self {
        let q = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::new(q(r), q(g), q(b))
    }
}

/// Maps one scalar datum to a color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorMap {
    /// Full hue circle over `[min, max]`.
    Hue { min: f64, max: f64 },
    /// Linear blend between two colors over `[min, max]`.
    Gradient {
        from: Color,
        to: Color,
        min: f64,
        max: f64,
    },
    /// Domain coloring: the datum is a complex phase in `[-pi, pi]`.
    Phase,
    /// One color for everything.
    Solid(Color),
}

impl ColorMap {
    /// Colors `datum`. Values outside the range clamp to its ends and
    /// non-finite values take the low end.
    #[must_use]
    pub fn map(&self, datum: f64) -> Color {
        match *self {
            Self::Hue { min, max } => Color::from_hsv(0.85 * normalize(datum, min, max), 0.8, 0.95),
            Self::Gradient { from, to, min, max } => from.lerp(to, normalize(datum, min, max)),
            Self::Phase => Color::from_hsv(normalize(datum, -PI, PI), 0.9, 0.95),
            Self::Solid(color) => color,
        }
    }
}

fn normalize(datum: f64, min: f64, max: f64) -> f64 {
    if !datum.is_finite() || max <= min {
        return 0.0;
    }
    ((datum - min) / (max - min)).clamp(0.0, 1.0)
}

/// A row-major grid of surface points, `rows * cols` long.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceSamples {
    pub rows: usize,
    pub cols: usize,
    pub points: Vec<Point3>,
}

impl SurfaceSamples {
    /// Two triangles per grid cell, wound counter-clockwise seen from +z
    /// when rows run along +y and columns along +x.
    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + Clone + '_ {
        let cols = self.cols;
        (0..self.rows.saturating_sub(1)).flat_map(move |r| {
            (0..cols.saturating_sub(1)).flat_map(move |c| {
                let i = r * cols + c;
                [[i, i + 1, i + cols + 1], [i, i + cols + 1, i + cols]]
            })
        })
    }
}

/// What a scene draws.
#[derive(Debug, Clone)]
pub enum Geometry {
    PointCloud(Vec<Point3>),
    Polyline(Vec<Point3>),
    Mesh(Arc<Mesh>),
    Surface(SurfaceSamples),
}

impl Geometry {
    /// Positions of the colored elements: points, polyline vertices, mesh
    /// vertices or surface samples.
    #[must_use]
    pub fn positions(&self) -> &[Point3] {
        match self {
            Self::PointCloud(points) | Self::Polyline(points) => points,
            Self::Mesh(mesh) => mesh.vertices(),
            Self::Surface(surface) => &surface.points,
        }
    }
}

/// Where the camera sits, in spherical coordinates around the scene's
/// bounding sphere. Angles are radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub azimuth: f64,
    pub elevation: f64,
    /// Vertical field of view.
    pub fov: f64,
    /// Values above 1 move closer.
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            azimuth: -PI / 3.0,
            elevation: PI / 6.0,
            fov: PI / 4.0,
            zoom: 1.0,
        }
    }
}

impl Camera {
    /// Looking straight down the z axis.
    #[must_use]
    pub fn top_down() -> Self {
        Self {
            azimuth: -PI / 2.0,
            elevation: PI / 2.0,
            ..Self::default()
        }
    }
}

/// Everything a renderer needs to draw one picture.
#[derive(Debug, Clone)]
pub struct Scene {
    geometry: Geometry,
    data: Vec<f64>,
    color_map: ColorMap,
    camera: Camera,
    title: String,
}

impl Scene {
    /// Creates a scene with one datum per element of `geometry`.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::DataLength`] if `data` does not match.
    pub fn new(
        geometry: Geometry,
        data: Vec<f64>,
        color_map: ColorMap,
        title: impl Into<String>,
    ) -> Result<Self> {
        let expected = geometry.positions().len();
        if data.len() != expected {
            return Err(ParameterError::DataLength {
                expected,
                actual: data.len(),
            }
            .into());
        }
        Ok(Self {
            geometry,
            data,
            color_map,
            camera: Camera::default(),
            title: title.into(),
        })
    }

    /// Replaces the default camera.
    #[must_use]
    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = camera;
        self
    }

    #[must_use]
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    #[must_use]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    #[must_use]
    pub fn color_map(&self) -> ColorMap {
        self.color_map
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Color of element `index`.
    #[must_use]
    pub fn color_of(&self, index: usize) -> Color {
        self.color_map.map(self.data.get(index).copied().unwrap_or(f64::NAN))
    }

    /// Axis-aligned bounds of the finite positions, if there are any.
    #[must_use]
    pub fn bounds(&self) -> Option<(Point3, Point3)> {
        let mut finite = self
            .geometry
            .positions()
            .iter()
            .filter(|p| p.iter().all(|c| c.is_finite()));
        let first = *finite.next()?;
        Some(finite.fold((first, first), |(lo, hi), p| (lo.inf(p), hi.sup(p))))
    }

    /// Center and radius of the sphere around [`bounds`](Self::bounds).
    #[must_use]
    pub fn bounding_sphere(&self) -> Option<(Point3, f64)> {
        let (lo, hi) = self.bounds()?;
        let center = nalgebra::center(&lo, &hi);
        let half: Vector3 = (hi - lo) / 2.0;
        Some((center, half.norm()))
    }
}
