//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::sync::{Mutex, Once};

use euler_prover::progress::{ProgressObserver, ProgressSnapshot};

static TRACING: Once = Once::new();

/// Installs a test-friendly subscriber once per test binary.
///
/// Defaults to WARN; override with `RUST_LOG` (e.g. `RUST_LOG=euler_prover=debug`).
pub fn init_tracing() {
    TRACING.call_once(|| {
        let env_filter = tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into());
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_test_writer()
            .try_init();
    });
}

/// Records every snapshot it is handed.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    pub snapshots: Mutex<Vec<(u64, u64)>>,
}

impl ProgressObserver for RecordingObserver {
    fn on_progress(&self, snapshot: &ProgressSnapshot) {
        if let Ok(mut seen) = self.snapshots.lock() {
            seen.push((snapshot.completed, snapshot.total));
        }
    }
}
