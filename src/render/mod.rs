//! Offline rasterization of [`Scene`]s and PNG export.
//!
//! The renderer is chosen once, at configuration time, through
//! [`select_renderer`]. Builds without the `graphics` feature still link:
//! every request then fails with [`RenderError::Unavailable`] before any
//! work is done and without touching the filesystem.

#[cfg(feature = "graphics")]
mod export;
#[cfg(feature = "graphics")]
mod raster;

#[cfg(feature = "graphics")]
pub use raster::GraphicsRenderer;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{ParameterError, RenderError, Result};
use crate::scene::{Camera, Color, Scene};

/// Largest accepted image side, in pixels.
pub const MAX_IMAGE_SIDE: u32 = 8192;

/// An RGB8 image, row-major from the top-left corner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Image {
    /// An image filled with `background`.
    ///
    /// # Errors
    ///
    /// Returns an error if either side is zero or above [`MAX_IMAGE_SIDE`].
    pub fn filled(width: u32, height: u32, background: Color) -> Result<Self> {
        check_dimensions(width, height)?;
        let len = width as usize * height as usize * 3;
        let mut pixels = crate::error::try_with_capacity("image pixels", len)?;
        for _ in 0..width as usize * height as usize {
            pixels.extend_from_slice(&[background.r, background.g, background.b]);
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGB8 bytes.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Color at `(x, y)`, if inside the image.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        Some(Color::new(self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]))
    }

    /// Number of pixels that differ from `color`.
    #[must_use]
    pub fn count_not(&self, color: Color) -> usize {
        self.pixels
            .chunks_exact(3)
            .filter(|px| *px != [color.r, color.g, color.b])
            .count()
    }

    #[cfg_attr(not(feature = "graphics"), allow(dead_code))]
    pub(crate) fn put(&mut self, x: u32, y: u32, color: Color) {
        let i = (y as usize * self.width as usize + x as usize) * 3;
        self.pixels[i..i + 3].copy_from_slice(&[color.r, color.g, color.b]);
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 || width > MAX_IMAGE_SIDE || height > MAX_IMAGE_SIDE {
        return Err(RenderError::InvalidDimensions { width, height }.into());
    }
    Ok(())
}

/// Output settings shared by every renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub background: Color,
    /// Overrides the scene's own camera when set.
    pub camera: Option<Camera>,
    /// Diameter of point splats, in pixels.
    pub point_size: f64,
    /// Width of polylines, in pixels.
    pub line_width: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            background: Color::new(16, 18, 28),
            camera: None,
            point_size: 4.0,
            line_width: 2.0,
        }
    }
}

impl RenderConfig {
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    #[must_use]
    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = Some(camera);
        self
    }

    #[must_use]
    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }
}

/// Turns scenes into images and image files.
pub trait Renderer: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Fails fast if this backend cannot produce output at all.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Unavailable`] for a backend that is not built in.
    fn ensure_available(&self) -> Result<()>;

    /// Rasterizes `scene`.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid dimensions, an empty scene, or an
    /// unavailable backend.
    fn render(&self, scene: &Scene, config: &RenderConfig) -> Result<Image>;

    /// Rasterizes `scene` and writes it to `path` as PNG. Either the whole
    /// file is written or no file is left behind.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering, encoding, or writing fails.
    fn export(&self, scene: &Scene, config: &RenderConfig, path: &Path) -> Result<Image>;
}

/// A backend that is never available.
#[derive(Debug, Clone)]
pub struct UnavailableRenderer {
    reason: String,
}

impl UnavailableRenderer {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn error(&self) -> crate::error::EulerError {
        RenderError::Unavailable(self.reason.clone()).into()
    }
}

impl Default for UnavailableRenderer {
    fn default() -> Self {
        Self::new("built without the graphics feature")
    }
}

impl Renderer for UnavailableRenderer {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    fn ensure_available(&self) -> Result<()> {
        Err(self.error())
    }

    fn render(&self, _scene: &Scene, _config: &RenderConfig) -> Result<Image> {
        Err(self.error())
    }

    fn export(&self, _scene: &Scene, _config: &RenderConfig, _path: &Path) -> Result<Image> {
        Err(self.error())
    }
}

/// Which renderer to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderBackend {
    /// The graphics renderer when compiled in, otherwise unavailable.
    #[default]
    Auto,
    Graphics,
    Unavailable,
}

impl FromStr for RenderBackend {
    type Err = ParameterError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "graphics" | "png" => Ok(Self::Graphics),
            "none" | "unavailable" => Ok(Self::Unavailable),
            _ => Err(ParameterError::UnknownSelector {
                kind: "render backend",
                value: s.to_owned(),
            }),
        }
    }
}

impl fmt::Display for RenderBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Auto => "auto",
            Self::Graphics => "graphics",
            Self::Unavailable => "unavailable",
        })
    }
}

/// Picks a renderer. Asking for graphics in a build without it yields a
/// renderer that reports why.
#[must_use]
pub fn select_renderer(backend: RenderBackend) -> Box<dyn Renderer> {
    match backend {
        RenderBackend::Unavailable => {
            Box::new(UnavailableRenderer::new("rendering disabled by configuration"))
        }
        #[cfg(feature = "graphics")]
        RenderBackend::Auto | RenderBackend::Graphics => Box::new(GraphicsRenderer::new()),
        #[cfg(not(feature = "graphics"))]
        RenderBackend::Auto | RenderBackend::Graphics => Box::new(UnavailableRenderer::default()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::EulerError;
    use crate::math::Point3;
    use crate::scene::{ColorMap, Geometry};

    fn dot() -> Scene {
        Scene::new(
            Geometry::PointCloud(vec![Point3::origin()]),
            vec![0.0],
            ColorMap::Solid(Color::WHITE),
            "dot",
        )
        .unwrap()
    }

    #[test]
    fn unavailable_renderer_never_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let renderer = UnavailableRenderer::default();
        assert!(matches!(
            renderer.ensure_available(),
            Err(EulerError::Render(RenderError::Unavailable(_)))
        ));
        let result = renderer.export(&dot(), &RenderConfig::default(), &path);
        assert!(matches!(result, Err(EulerError::Render(RenderError::Unavailable(_)))));
        assert!(!path.exists());
    }

    #[test]
    fn explicit_unavailable_backend() {
        let renderer = select_renderer(RenderBackend::Unavailable);
        assert_eq!(renderer.name(), "unavailable");
        assert!(renderer.ensure_available().is_err());
    }

    #[test]
    fn auto_matches_build_features() {
        let renderer = select_renderer(RenderBackend::Auto);
        assert_eq!(renderer.ensure_available().is_ok(), cfg!(feature = "graphics"));
    }

    #[test]
    fn backend_selectors() {
        assert_eq!("PNG".parse::<RenderBackend>().ok(), Some(RenderBackend::Graphics));
        assert_eq!("none".parse::<RenderBackend>().ok(), Some(RenderBackend::Unavailable));
        assert!("vulkan".parse::<RenderBackend>().is_err());
    }

    #[test]
    fn image_dimensions_are_checked() {
        assert!(Image::filled(0, 10, Color::BLACK).is_err());
        assert!(Image::filled(10, MAX_IMAGE_SIDE + 1, Color::BLACK).is_err());
        let mut image = Image::filled(4, 3, Color::BLACK).unwrap();
        assert_eq!(image.pixels().len(), 36);
        image.put(3, 2, Color::WHITE);
        assert_eq!(image.pixel(3, 2), Some(Color::WHITE));
        assert_eq!(image.pixel(4, 0), None);
        assert_eq!(image.count_not(Color::BLACK), 1);
    }
}
