pub mod complex;
pub mod number;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Double-precision complex number.
pub type Complex64 = num_complex::Complex64;

/// Vectors shorter than this have no meaningful direction.
pub const TOLERANCE: f64 = 1e-10;
