use std::sync::Arc;
use std::time::Instant;

use crate::error::Result;
use crate::progress::{ProgressObserver, ProgressTracker};
use crate::topology::{MakeIcosphere, MakeTorus, Mesh, MeshCensus, PlatonicSolid};

use super::{Domain, TrialInput, TrialResult, TrialValue, VerificationSummary};

/// Parameters for [`VerifyEulerCharacteristic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EulerCharacteristicParams {
    /// Deepest icosphere level to check; every level from 0 up is a trial.
    pub subdivision_level: u32,
}

impl Default for EulerCharacteristicParams {
    fn default() -> Self {
        Self {
            subdivision_level: 4,
        }
    }
}

impl EulerCharacteristicParams {
    #[must_use]
    pub fn new(subdivision_level: u32) -> Self {
        Self { subdivision_level }
    }
}

/// Result of a topology run: the summary, the census of every level and
/// the most refined mesh for visualization.
#[derive(Debug, Clone)]
pub struct TopologyVerification {
    pub summary: VerificationSummary,
    pub levels: Vec<MeshCensus>,
    pub mesh: Arc<Mesh>,
}

/// Checks `V - E + F = 2` on successive refinements of an icosphere.
pub struct VerifyEulerCharacteristic {
    params: EulerCharacteristicParams,
    observer: Option<Arc<dyn ProgressObserver>>,
}

impl VerifyEulerCharacteristic {
    /// Creates a new `VerifyEulerCharacteristic` operation.
    #[must_use]
    pub fn new(params: EulerCharacteristicParams) -> Self {
        Self {
            params,
            observer: None,
        }
    }

    /// Reports progress to `observer` while running.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Executes the verification.
    ///
    /// # Errors
    ///
    /// Returns an error if the level is too deep for `u32` indices or a
    /// refined mesh cannot be allocated.
    pub fn execute(&self) -> Result<TopologyVerification> {
        let level = self.params.subdivision_level;
        tracing::info!(level, "verifying Euler's polyhedron formula");

        let started = Instant::now();
        let tracker = ProgressTracker::begin("euler-characteristic", u64::from(level) + 1)
            .with_observer(self.observer.clone());
        let mut summary = VerificationSummary::new(Domain::Topology);
        let mut levels = Vec::new();

        let mesh = MakeIcosphere::new(level).execute_with(|k, mesh| {
            let census = mesh.census();
            tracing::debug!(level = k, %census, "refined");
            summary.record(census_trial(
                u64::from(k),
                "icosphere",
                Some(k),
                census,
                2,
            ));
            levels.push(census);
            tracker.advance(1);
        })?;
        tracker.finish();

        let summary = summary.with_wall_time(started.elapsed());
        summary.log();
        Ok(TopologyVerification {
            summary,
            levels,
            mesh: Arc::new(mesh),
        })
    }
}

/// One closed surface checked by [`VerifyPolyhedra`].
#[derive(Debug, Clone, PartialEq)]
pub struct PolyhedronCheck {
    pub name: &'static str,
    pub census: MeshCensus,
    /// Characteristic the surface must have: 2 for spheres, 0 for a torus.
    pub expected: i64,
    pub surface_area: f64,
    pub volume: f64,
}

impl PolyhedronCheck {
    fn of(name: &'static str, mesh: &Mesh, expected: i64) -> Self {
        Self {
            name,
            census: mesh.census(),
            expected,
            surface_area: mesh.surface_area(),
            volume: mesh.volume(),
        }
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.census.characteristic == self.expected
    }
}

/// Checks the five Platonic solids and a torus.
#[derive(Default)]
pub struct VerifyPolyhedra;

impl VerifyPolyhedra {
    /// Creates a new `VerifyPolyhedra` operation.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Executes the verification, returning the summary and every check.
    ///
    /// # Errors
    ///
    /// Returns an error if a solid fails to build.
    pub fn execute(&self) -> Result<(VerificationSummary, Vec<PolyhedronCheck>)> {
        let started = Instant::now();
        let mut checks = Vec::with_capacity(PlatonicSolid::ALL.len() + 1);
        for solid in PlatonicSolid::ALL {
            checks.push(PolyhedronCheck::of(solid.name(), &solid.mesh()?, 2));
        }
        checks.push(PolyhedronCheck::of(
            "torus",
            &MakeTorus::new(2.0, 0.5, 24, 12).execute()?,
            0,
        ));

        let mut summary = VerificationSummary::new(Domain::Topology);
        for (id, check) in (0u64..).zip(&checks) {
            tracing::debug!(
                name = check.name,
                census = %check.census,
                area = check.surface_area,
                volume = check.volume,
                "checked"
            );
            summary.record(census_trial(id, check.name, None, check.census, check.expected));
        }
        let summary = summary.with_wall_time(started.elapsed());
        summary.log();
        Ok((summary, checks))
    }
}

fn census_trial(
    trial_id: u64,
    name: &str,
    level: Option<u32>,
    census: MeshCensus,
    expected: i64,
) -> TrialResult {
    TrialResult {
        trial_id,
        input: TrialInput::Polyhedron {
            name: name.to_owned(),
            level,
        },
        lhs: TrialValue::Characteristic(census.characteristic),
        rhs: TrialValue::Characteristic(expected),
        passed: census.characteristic == expected,
        absolute_error: None,
    }
}
