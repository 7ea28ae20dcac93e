use std::f64::consts::FRAC_PI_2;
use std::path::Path;

use nalgebra::{Isometry3, Perspective3};

use crate::error::{try_with_capacity, RenderError, Result};
use crate::math::{Point3, Vector3};
use crate::scene::{Color, Geometry, Scene};

use super::{check_dimensions, export, Image, RenderConfig, Renderer};

/// Light that is not facing the camera still gets this much.
const AMBIENT: f64 = 0.3;

/// Keeps the view direction off the up axis.
const MAX_ELEVATION: f64 = FRAC_PI_2 - 1e-3;

/// Software z-buffer rasterizer with PNG export.
///
/// Meshes and surfaces are Gouraud shaded with a headlight; point clouds
/// are drawn as round splats and polylines as stamped thick segments.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphicsRenderer;

impl GraphicsRenderer {
    /// Creates a new `GraphicsRenderer`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for GraphicsRenderer {
    fn name(&self) -> &'static str {
        "graphics"
    }

    fn ensure_available(&self) -> Result<()> {
        Ok(())
    }

    fn render(&self, scene: &Scene, config: &RenderConfig) -> Result<Image> {
        check_dimensions(config.width, config.height)?;
        let view = View::framing(scene, config)?;
        let mut canvas = Canvas::new(config)?;

        match scene.geometry() {
            Geometry::PointCloud(points) => draw_points(&mut canvas, &view, scene, points, config),
            Geometry::Polyline(points) => draw_polyline(&mut canvas, &view, scene, points, config),
            Geometry::Mesh(mesh) => {
                let triangles = mesh.faces().iter().map(|f| f.map(|i| i as usize));
                draw_triangles(&mut canvas, &view, scene, mesh.vertices(), triangles)?;
            }
            Geometry::Surface(surface) => {
                draw_triangles(&mut canvas, &view, scene, &surface.points, surface.triangles())?;
            }
        }

        tracing::debug!(
            title = scene.title(),
            width = config.width,
            height = config.height,
            "rendered scene"
        );
        Ok(canvas.image)
    }

    fn export(&self, scene: &Scene, config: &RenderConfig, path: &Path) -> Result<Image> {
        let image = self.render(scene, config)?;
        let bytes = export::encode_png(&image)?;
        export::write_atomically(path, &bytes)?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "wrote image");
        Ok(image)
    }
}

/// Camera transform fitted to the scene's bounding sphere.
struct View {
    world_to_camera: Isometry3<f64>,
    projection: Perspective3<f64>,
    /// Unit vector from the scene towards the eye, used as the light.
    toward_eye: Vector3,
    width: f64,
    height: f64,
}

/// A projected point: pixel coordinates and normalized depth in `[-1, 1]`.
#[derive(Clone, Copy)]
struct Projected {
    x: f64,
    y: f64,
    depth: f64,
}

impl View {
    fn framing(scene: &Scene, config: &RenderConfig) -> Result<Self> {
        let (center, radius) = scene.bounding_sphere().ok_or(RenderError::EmptyScene)?;
        let radius = radius.max(1e-6);
        let camera = config.camera.unwrap_or_else(|| scene.camera());

        let width = f64::from(config.width);
        let height = f64::from(config.height);
        let aspect = width / height;
        let fov = if camera.fov.is_finite() { camera.fov.clamp(0.05, 3.0) } else { 0.8 };
        let zoom = if camera.zoom.is_finite() && camera.zoom > 0.0 { camera.zoom } else { 1.0 };

        // fit the sphere inside the narrower of the two fields of view
        let half_vertical = fov / 2.0;
        let half_horizontal = (half_vertical.tan() * aspect).atan();
        let distance = radius / half_vertical.min(half_horizontal).sin() / zoom;

        let elevation = camera.elevation.clamp(-MAX_ELEVATION, MAX_ELEVATION);
        let (sin_az, cos_az) = camera.azimuth.sin_cos();
        let toward_eye = Vector3::new(
            elevation.cos() * cos_az,
            elevation.cos() * sin_az,
            elevation.sin(),
        );
        let eye = center + toward_eye * distance;
        let world_to_camera = Isometry3::look_at_rh(&eye, &center, &Vector3::z());

        let znear = (distance - radius * 1.05).max(distance * 1e-3);
        let zfar = distance + radius * 1.05;
        Ok(Self {
            world_to_camera,
            projection: Perspective3::new(aspect, fov, znear, zfar),
            toward_eye,
            width,
            height,
        })
    }

    fn project(&self, p: &Point3) -> Option<Projected> {
        if !p.iter().all(|c| c.is_finite()) {
            return None;
        }
        let in_camera = self.world_to_camera.transform_point(p);
        // the camera looks down -z
        if in_camera.z >= 0.0 {
            return None;
        }
        let ndc = self.projection.project_point(&in_camera);
        Some(Projected {
            x: (ndc.x + 1.0) / 2.0 * self.width,
            y: (1.0 - ndc.y) / 2.0 * self.height,
            depth: ndc.z,
        })
    }

    fn shade(&self, normal: &Vector3) -> f64 {
        AMBIENT + (1.0 - AMBIENT) * normal.dot(&self.toward_eye).abs()
    }
}

struct Canvas {
    image: Image,
    depth: Vec<f64>,
}

impl Canvas {
    fn new(config: &RenderConfig) -> Result<Self> {
        let image = Image::filled(config.width, config.height, config.background)?;
        let len = config.width as usize * config.height as usize;
        let mut depth = try_with_capacity("depth buffer", len)?;
        depth.resize(len, f64::INFINITY);
        Ok(Self { image, depth })
    }

    /// Writes `color` at pixel `(x, y)` if it is inside the image and nearer
    /// than what is already there.
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    fn plot(&mut self, x: i64, y: i64, depth: f64, color: Color) {
        if x < 0 || y < 0 || x >= i64::from(self.image.width()) || y >= i64::from(self.image.height()) {
            return;
        }
        let index = y as usize * self.image.width() as usize + x as usize;
        if depth < self.depth[index] {
            self.depth[index] = depth;
            self.image.put(x as u32, y as u32, color);
        }
    }

    /// Fills a disc of `radius` pixels at one depth.
    #[allow(clippy::cast_possible_truncation)]
    fn splat(&mut self, at: Projected, radius: f64, color: Color) {
        let radius = radius.max(0.5);
        let reach = radius.ceil() as i64;
        let (cx, cy) = (at.x.floor() as i64, at.y.floor() as i64);
        for dy in -reach..=reach {
            for dx in -reach..=reach {
                #[allow(clippy::cast_precision_loss)]
                let (fx, fy) = (dx as f64, dy as f64);
                if fx * fx + fy * fy <= radius * radius {
                    self.plot(cx + dx, cy + dy, at.depth, color);
                }
            }
        }
    }
}

fn draw_points(
    canvas: &mut Canvas,
    view: &View,
    scene: &Scene,
    points: &[Point3],
    config: &RenderConfig,
) {
    for (i, p) in points.iter().enumerate() {
        if let Some(at) = view.project(p) {
            canvas.splat(at, config.point_size / 2.0, scene.color_of(i));
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn draw_polyline(
    canvas: &mut Canvas,
    view: &View,
    scene: &Scene,
    points: &[Point3],
    config: &RenderConfig,
) {
    let radius = config.line_width / 2.0;
    let projected: Vec<Option<Projected>> = points.iter().map(|p| view.project(p)).collect();
    for (i, pair) in projected.windows(2).enumerate() {
        let (Some(a), Some(b)) = (pair[0], pair[1]) else {
            continue;
        };
        let (ca, cb) = (scene.color_of(i), scene.color_of(i + 1));
        let length = (b.x - a.x).hypot(b.y - a.y);
        // one stamp per pixel of length
        let steps = length.ceil().clamp(1.0, 1e6) as u32;
        for s in 0..=steps {
            let t = f64::from(s) / f64::from(steps);
            let at = Projected {
                x: a.x + (b.x - a.x) * t,
                y: a.y + (b.y - a.y) * t,
                depth: a.depth + (b.depth - a.depth) * t,
            };
            canvas.splat(at, radius, ca.lerp(cb, t));
        }
    }
}

fn draw_triangles(
    canvas: &mut Canvas,
    view: &View,
    scene: &Scene,
    vertices: &[Point3],
    triangles: impl Iterator<Item = [usize; 3]> + Clone,
) -> Result<()> {
    let mut normals = try_with_capacity::<Vector3>("vertex normals", vertices.len())?;
    normals.resize(vertices.len(), Vector3::zeros());
    for [a, b, c] in triangles.clone() {
        let (pa, pb, pc) = (vertices[a], vertices[b], vertices[c]);
        let face = (pb - pa).cross(&(pc - pa));
        if face.iter().all(|v| v.is_finite()) {
            for i in [a, b, c] {
                normals[i] += face;
            }
        }
    }

    let lit: Vec<(Option<Projected>, Color)> = vertices
        .iter()
        .zip(&normals)
        .enumerate()
        .map(|(i, (p, n))| {
            let normal = n.try_normalize(1e-300).unwrap_or(view.toward_eye);
            (view.project(p), scene.color_of(i).shaded(view.shade(&normal)))
        })
        .collect();

    for [a, b, c] in triangles {
        if let (Some(pa), Some(pb), Some(pc)) = (lit[a].0, lit[b].0, lit[c].0) {
            fill_triangle(canvas, [pa, pb, pc], [lit[a].1, lit[b].1, lit[c].1]);
        }
    }
    Ok(())
}

/// Rasterizes one triangle with barycentric interpolation of depth and
/// color, sampling at pixel centres.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn fill_triangle(canvas: &mut Canvas, p: [Projected; 3], colors: [Color; 3]) {
    let edge = |a: Projected, b: Projected, x: f64, y: f64| (b.x - a.x) * (y - a.y) - (b.y - a.y) * (x - a.x);
    let area = edge(p[0], p[1], p[2].x, p[2].y);
    if area.abs() < 1e-12 {
        return;
    }

    let width = f64::from(canvas.image.width());
    let height = f64::from(canvas.image.height());
    let x0 = p.iter().map(|q| q.x).fold(f64::INFINITY, f64::min).max(0.0).floor() as i64;
    let x1 = p.iter().map(|q| q.x).fold(f64::NEG_INFINITY, f64::max).min(width - 1.0).ceil() as i64;
    let y0 = p.iter().map(|q| q.y).fold(f64::INFINITY, f64::min).max(0.0).floor() as i64;
    let y1 = p.iter().map(|q| q.y).fold(f64::NEG_INFINITY, f64::max).min(height - 1.0).ceil() as i64;

    let channels = colors.map(|c| [f64::from(c.r), f64::from(c.g), f64::from(c.b)]);
    for y in y0..=y1 {
        for x in x0..=x1 {
            let (sx, sy) = (x as f64 + 0.5, y as f64 + 0.5);
            let w0 = edge(p[1], p[2], sx, sy) / area;
            let w1 = edge(p[2], p[0], sx, sy) / area;
            let w2 = 1.0 - w0 - w1;
            if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                continue;
            }
            let depth = w0 * p[0].depth + w1 * p[1].depth + w2 * p[2].depth;
            let mix = |k: usize| (w0 * channels[0][k] + w1 * channels[1][k] + w2 * channels[2][k]) / 255.0;
            canvas.plot(x, y, depth, Color::from_unit(mix(0), mix(1), mix(2)));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::scene::{BuildMeshScene, BuildRiemannSurface, Camera, ColorMap, ComplexFunction};
    use crate::topology::MakeIcosphere;
    use std::sync::Arc;

    fn small() -> RenderConfig {
        RenderConfig::default().with_size(64, 48)
    }

    #[test]
    fn icosphere_covers_the_centre() {
        let mesh = Arc::new(MakeIcosphere::new(2).execute().unwrap());
        let scene = BuildMeshScene::new(mesh).execute().unwrap();
        let config = small();
        let image = GraphicsRenderer::new().render(&scene, &config).unwrap();
        assert_eq!((image.width(), image.height()), (64, 48));
        assert_ne!(image.pixel(32, 24), Some(config.background));
        // framed with a margin, so the corners stay background
        assert_eq!(image.pixel(0, 0), Some(config.background));
        assert_eq!(image.pixel(63, 47), Some(config.background));
    }

    #[test]
    fn surface_and_points_draw_something() {
        let surface = BuildRiemannSurface::new(ComplexFunction::EulerExp, 12)
            .execute()
            .unwrap();
        let config = small();
        let image = GraphicsRenderer::new().render(&surface, &config).unwrap();
        assert!(image.count_not(config.background) > 100);

        let dots = Scene::new(
            Geometry::PointCloud(vec![Point3::new(-1.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)]),
            vec![0.0, 1.0],
            ColorMap::Solid(Color::WHITE),
            "dots",
        )
        .unwrap()
        .with_camera(Camera::top_down());
        let image = GraphicsRenderer::new().render(&dots, &config).unwrap();
        assert!(image.count_not(config.background) >= 2);
    }

    #[test]
    fn nearer_geometry_wins() {
        let mut canvas = Canvas::new(&small()).unwrap();
        canvas.plot(3, 3, 0.5, Color::WHITE);
        canvas.plot(3, 3, 0.9, Color::BLACK);
        assert_eq!(canvas.image.pixel(3, 3), Some(Color::WHITE));
        canvas.plot(3, 3, 0.1, Color::BLACK);
        assert_eq!(canvas.image.pixel(3, 3), Some(Color::BLACK));
        // off-canvas writes are dropped
        canvas.plot(-1, 100, 0.0, Color::BLACK);
    }

    #[test]
    fn empty_scene_and_bad_sizes() {
        let empty = Scene::new(
            Geometry::PointCloud(Vec::new()),
            Vec::new(),
            ColorMap::Solid(Color::WHITE),
            "empty",
        )
        .unwrap();
        assert!(matches!(
            GraphicsRenderer::new().render(&empty, &small()),
            Err(crate::error::EulerError::Render(RenderError::EmptyScene))
        ));
        let dot = Scene::new(
            Geometry::PointCloud(vec![Point3::origin()]),
            vec![0.0],
            ColorMap::Solid(Color::WHITE),
            "dot",
        )
        .unwrap();
        assert!(matches!(
            GraphicsRenderer::new().render(&dot, &small().with_size(0, 10)),
            Err(crate::error::EulerError::Render(RenderError::InvalidDimensions { .. }))
        ));
    }
}
