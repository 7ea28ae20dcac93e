pub mod error;
pub mod math;
pub mod progress;
pub mod random;
pub mod render;
pub mod scene;
pub mod task;
pub mod topology;
pub mod verify;

pub use error::{EulerError, Result};
