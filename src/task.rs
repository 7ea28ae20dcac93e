//! The surface external dispatchers drive: one verification task or one
//! visualization request in, one report or image out.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{ParameterError, Result};
use crate::progress::ProgressObserver;
use crate::render::{Image, RenderConfig, Renderer};
use crate::scene::{
    BuildEulerHelix, BuildMeshScene, BuildRiemannSurface, BuildUlamSpiral, ComplexFunction,
    MeshColoring, Scene,
};
use crate::topology::{MakeIcosphere, MakeTorus, MeshCensus};
use crate::verify::{
    Domain, EulerCharacteristicParams, EulerFormulaParams, EulerTheoremParams, PolyhedronCheck,
    VerificationSummary, VerifyEulerCharacteristic, VerifyEulerFormula, VerifyEulerTheorem,
    VerifyPolyhedra,
};

/// One verification run.
#[derive(Debug, Clone)]
pub enum VerificationTask {
    NumberTheory(EulerTheoremParams),
    ComplexAnalysis(EulerFormulaParams),
    Topology(EulerCharacteristicParams),
    /// The Platonic solids and a torus.
    Polyhedra,
}

impl VerificationTask {
    /// The default task for `domain`.
    #[must_use]
    pub fn for_domain(domain: Domain) -> Self {
        match domain {
            Domain::NumberTheory => Self::NumberTheory(EulerTheoremParams::default()),
            Domain::ComplexAnalysis => Self::ComplexAnalysis(EulerFormulaParams::default()),
            Domain::Topology => Self::Topology(EulerCharacteristicParams::default()),
        }
    }

    #[must_use]
    pub fn domain(&self) -> Domain {
        match self {
            Self::NumberTheory(_) => Domain::NumberTheory,
            Self::ComplexAnalysis(_) => Domain::ComplexAnalysis,
            Self::Topology(_) | Self::Polyhedra => Domain::Topology,
        }
    }
}

/// What a verification run produced.
#[derive(Debug, Clone)]
pub struct TaskReport {
    pub summary: VerificationSummary,
    /// Census per icosphere level; empty for other tasks.
    pub levels: Vec<MeshCensus>,
    /// Per-solid results; empty unless the task was [`VerificationTask::Polyhedra`].
    pub polyhedra: Vec<PolyhedronCheck>,
}

impl TaskReport {
    fn summary_only(summary: VerificationSummary) -> Self {
        Self {
            summary,
            levels: Vec::new(),
            polyhedra: Vec::new(),
        }
    }
}

/// Runs `task`, reporting progress to `observer` if given.
///
/// # Errors
///
/// Returns an error if the task parameters are invalid or resources run
/// out. Failed trials are reported in the summary, not as errors.
pub fn run_verification(
    task: &VerificationTask,
    observer: Option<Arc<dyn ProgressObserver>>,
) -> Result<TaskReport> {
    match task {
        VerificationTask::NumberTheory(params) => {
            let mut op = VerifyEulerTheorem::new(params.clone());
            if let Some(observer) = observer {
                op = op.with_observer(observer);
            }
            op.execute().map(TaskReport::summary_only)
        }
        VerificationTask::ComplexAnalysis(params) => {
            let mut op = VerifyEulerFormula::new(params.clone());
            if let Some(observer) = observer {
                op = op.with_observer(observer);
            }
            op.execute().map(TaskReport::summary_only)
        }
        VerificationTask::Topology(params) => {
            let mut op = VerifyEulerCharacteristic::new(*params);
            if let Some(observer) = observer {
                op = op.with_observer(observer);
            }
            let result = op.execute()?;
            Ok(TaskReport {
                summary: result.summary,
                levels: result.levels,
                polyhedra: Vec::new(),
            })
        }
        VerificationTask::Polyhedra => {
            let (summary, polyhedra) = VerifyPolyhedra::new().execute()?;
            Ok(TaskReport {
                summary,
                levels: Vec::new(),
                polyhedra,
            })
        }
    }
}

/// Visualization selector, as typed by a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualizationKind {
    /// Primes on the Ulam spiral.
    Primes,
    /// The helix of `e^(i theta)`.
    EulerFormula,
    /// A refined icosphere.
    Topology,
    /// A triangulated torus, the genus-1 counterpart of the icosphere.
    Torus,
    /// Domain-colored complex surface.
    Riemann,
}

impl VisualizationKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Primes => "primes",
            Self::EulerFormula => "euler",
            Self::Topology => "topology",
            Self::Torus => "torus",
            Self::Riemann => "complex",
        }
    }
}

impl fmt::Display for VisualizationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VisualizationKind {
    type Err = ParameterError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "primes" | "ulam" => Ok(Self::Primes),
            "euler" | "euler-formula" => Ok(Self::EulerFormula),
            "topology" | "icosphere" => Ok(Self::Topology),
            "torus" => Ok(Self::Torus),
            "complex" | "riemann" => Ok(Self::Riemann),
            _ => Err(ParameterError::UnknownSelector {
                kind: "visualization",
                value: s.to_owned(),
            }),
        }
    }
}

/// A fully parameterized visualization.
#[derive(Debug, Clone)]
pub enum Visualization {
    Ulam(BuildUlamSpiral),
    EulerHelix(BuildEulerHelix),
    Icosphere { level: u32, coloring: MeshColoring },
    Torus(MakeTorus),
    Riemann(BuildRiemannSurface),
}

impl Visualization {
    /// Sensible defaults for each kind.
    ///
    /// # Errors
    ///
    /// Never fails for the built-in defaults; the `Result` comes from the
    /// helix constructor.
    pub fn default_for(kind: VisualizationKind) -> Result<Self> {
        Ok(match kind {
            VisualizationKind::Primes => Self::Ulam(BuildUlamSpiral::new(10_000)),
            VisualizationKind::EulerFormula => Self::EulerHelix(BuildEulerHelix::turns(4.0, 2_000)?),
            VisualizationKind::Topology => Self::Icosphere {
                level: 3,
                coloring: MeshColoring::Generation,
            },
            VisualizationKind::Torus => Self::Torus(MakeTorus::new(2.0, 0.7, 64, 32)),
            VisualizationKind::Riemann => {
                Self::Riemann(BuildRiemannSurface::new(ComplexFunction::EulerExp, 200))
            }
        })
    }

    #[must_use]
    pub fn kind(&self) -> VisualizationKind {
        match self {
            Self::Ulam(_) => VisualizationKind::Primes,
            Self::EulerHelix(_) => VisualizationKind::EulerFormula,
            Self::Icosphere { .. } => VisualizationKind::Topology,
            Self::Torus(_) => VisualizationKind::Torus,
            Self::Riemann(_) => VisualizationKind::Riemann,
        }
    }

    /// Builds the scene.
    ///
    /// # Errors
    ///
    /// Returns the builder's error.
    pub fn build(&self) -> Result<Scene> {
        match self {
            Self::Ulam(op) => op.execute(),
            Self::EulerHelix(op) => op.execute(),
            Self::Icosphere { level, coloring } => {
                let mesh = Arc::new(MakeIcosphere::new(*level).execute()?);
                BuildMeshScene::new(mesh).with_coloring(*coloring).execute()
            }
            Self::Torus(op) => BuildMeshScene::new(Arc::new(op.execute()?)).execute(),
            Self::Riemann(op) => op.execute(),
        }
    }
}

/// A visualization plus where and how to write it.
#[derive(Debug, Clone)]
pub struct VisualizationRequest {
    pub visualization: Visualization,
    pub output: PathBuf,
    pub render: RenderConfig,
}

impl VisualizationRequest {
    #[must_use]
    pub fn new(visualization: Visualization, output: impl Into<PathBuf>) -> Self {
        Self {
            visualization,
            output: output.into(),
            render: RenderConfig::default(),
        }
    }

    #[must_use]
    pub fn with_render(mut self, render: RenderConfig) -> Self {
        self.render = render;
        self
    }
}

/// An image that has been written to disk.
#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub path: PathBuf,
    pub title: String,
    pub image: Image,
}

/// Builds the requested scene and exports it through `renderer`.
///
/// An unavailable renderer is reported before any scene is built.
///
/// # Errors
///
/// Returns [`RenderError::Unavailable`](crate::error::RenderError) for an
/// unavailable backend, otherwise the builder's or renderer's error.
pub fn render_visualization(
    request: &VisualizationRequest,
    renderer: &dyn Renderer,
) -> Result<RenderedImage> {
    renderer.ensure_available()?;
    let kind = request.visualization.kind();
    tracing::info!(%kind, backend = renderer.name(), output = %request.output.display(), "visualizing");

    let scene = request.visualization.build()?;
    let image = renderer.export(&scene, &request.render, &request.output)?;
    Ok(RenderedImage {
        path: request.output.clone(),
        title: scene.title().to_owned(),
        image,
    })
}
