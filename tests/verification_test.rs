mod common;

use std::sync::Arc;

use euler_prover::task::{run_verification, VerificationTask};
use euler_prover::verify::{
    Domain, EulerCharacteristicParams, EulerFormulaParams, EulerTheoremParams, ExpMethod,
    ModulusSource, Outcome, ThetaSampling, VerifyEulerCharacteristic, VerifyEulerFormula,
    VerifyEulerTheorem,
};
use euler_prover::EulerError;

use common::{init_tracing, RecordingObserver};

#[test]
fn euler_theorem_hundred_moduli() {
    init_tracing();
    let params = EulerTheoremParams::new(100)
        .with_exponent_bound(20)
        .with_threads(4)
        .with_seed(42);
    let summary = VerifyEulerTheorem::new(params).execute().unwrap();
    assert_eq!(summary.total_trials(), 100);
    assert_eq!(summary.passed_count(), 100);
    assert!(summary.failed_trials().is_empty());
    assert!(summary.is_consistent());
}

#[test]
fn icosphere_level_two() {
    init_tracing();
    let result = VerifyEulerCharacteristic::new(EulerCharacteristicParams::new(2))
        .execute()
        .unwrap();
    let census = result.mesh.census();
    assert_eq!(
        (census.vertices, census.edges, census.faces, census.characteristic),
        (42, 120, 80, 2)
    );
    assert_eq!(result.summary.outcome(), Outcome::Verified);
}

#[test]
fn thread_count_leaves_results_unchanged() {
    init_tracing();
    let theorem = |threads| {
        let params = EulerTheoremParams::new(2_000)
            .with_threads(threads)
            .with_seed(7)
            .with_moduli(ModulusSource::Sequential);
        VerifyEulerTheorem::new(params).execute().unwrap()
    };
    let formula = |threads| {
        let params = EulerFormulaParams::new(4_000)
            .with_threads(threads)
            .with_sampling(ThetaSampling::Grid)
            .with_method(ExpMethod::Taylor)
            .with_tolerance(0.0);
        VerifyEulerFormula::new(params).execute().unwrap()
    };

    let (t1, f1) = (theorem(1), formula(1));
    for threads in [2, 4, 8] {
        let (t, f) = (theorem(threads), formula(threads));
        assert_eq!(t.total_trials(), t1.total_trials());
        assert_eq!(t.failed_trials(), t1.failed_trials());
        assert_eq!(f.total_trials(), f1.total_trials());
        assert_eq!(f.failed_trials(), f1.failed_trials(), "{threads} threads");
        assert_eq!(
            f.error_stats().map(|s| s.histogram().to_vec()),
            f1.error_stats().map(|s| s.histogram().to_vec())
        );
    }
}

#[test]
fn observer_sees_completion() {
    init_tracing();
    let observer = Arc::new(RecordingObserver::default());
    let task = VerificationTask::ComplexAnalysis(EulerFormulaParams::new(10_000).with_threads(4));
    let report = run_verification(&task, Some(observer.clone())).unwrap();
    assert_eq!(report.summary.domain(), Domain::ComplexAnalysis);

    let seen = observer.snapshots.lock().unwrap();
    assert!(!seen.is_empty());
    assert!(seen.iter().all(|&(_, total)| total == 10_000));
    assert!(seen.iter().any(|&(done, total)| done == total));
}

#[test]
fn invalid_parameters_fail_before_work() {
    init_tracing();
    let observer = Arc::new(RecordingObserver::default());
    let task = VerificationTask::ComplexAnalysis(EulerFormulaParams::new(100).with_tolerance(-1.0));
    let result = run_verification(&task, Some(observer.clone()));
    assert!(matches!(result, Err(EulerError::Parameter(_))));
    assert!(observer.snapshots.lock().unwrap().is_empty());
}

#[test]
fn polyhedra_and_torus() {
    init_tracing();
    let report = run_verification(&VerificationTask::Polyhedra, None).unwrap();
    let expected = [
        ("tetrahedron", 2),
        ("cube", 2),
        ("octahedron", 2),
        ("icosahedron", 2),
        ("dodecahedron", 2),
        ("torus", 0),
    ];
    let got: Vec<_> = report
        .polyhedra
        .iter()
        .map(|c| (c.name, c.census.characteristic))
        .collect();
    assert_eq!(got, expected);
}
