mod common;

use euler_prover::error::RenderError;
use euler_prover::render::{select_renderer, RenderBackend, RenderConfig, UnavailableRenderer};
use euler_prover::scene::{BuildRiemannSurface, ComplexFunction};
use euler_prover::task::{render_visualization, Visualization, VisualizationRequest};
use euler_prover::EulerError;

use common::init_tracing;

#[test]
fn riemann_without_graphics_reports_unavailable() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("riemann.png");
    let request = VisualizationRequest::new(
        Visualization::Riemann(BuildRiemannSurface::new(ComplexFunction::Zeta, 64)),
        &output,
    );
    let result = render_visualization(&request, &UnavailableRenderer::default());
    assert!(matches!(result, Err(EulerError::Render(RenderError::Unavailable(_)))));
    assert!(!output.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn disabled_backend_never_writes() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("primes.png");
    let request = VisualizationRequest::new(
        Visualization::default_for("ulam".parse().unwrap()).unwrap(),
        &output,
    );
    let renderer = select_renderer(RenderBackend::Unavailable);
    assert!(render_visualization(&request, renderer.as_ref()).is_err());
    assert!(!output.exists());
}

#[cfg(feature = "graphics")]
#[test]
fn every_visualization_exports_a_png() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let renderer = select_renderer(RenderBackend::Auto);
    for kind in ["primes", "euler", "topology", "torus", "complex"] {
        let output = dir.path().join(format!("{kind}.png"));
        let request = VisualizationRequest::new(
            Visualization::default_for(kind.parse().unwrap()).unwrap(),
            &output,
        )
        .with_render(RenderConfig::default().with_size(160, 120));
        let rendered = render_visualization(&request, renderer.as_ref()).unwrap();
        assert_eq!(rendered.path, output);
        assert!(!rendered.title.is_empty());

        let bytes = std::fs::read(&output).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n", "{kind}");
        let background = request.render.background;
        assert!(rendered.image.count_not(background) > 0, "{kind} drew nothing");
    }
    // only the four images, no staging files
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 4);
}
