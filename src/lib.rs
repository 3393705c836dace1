//! kernel3d: a small computational-geometry kernel for 3D Euclidean space
//!
//! This crate provides immutable vectors, line segments and cubes with the
//! transformations, distance queries and intersection tests used by
//! rendering, physics and collision-detection code.
//!
//! All floating-point comparisons share one absolute tolerance,
//! [`constants::EPSILON`].
//!
//! # Examples
//!
//! ```rust
//! use kernel3d::{Cube3, Segment3, Vector3};
//!
//! let cube = Cube3::new(Vector3::origin(), 2.0)?;
//! assert!(cube.contains_point(&Vector3::new(0.5, 0.5, 0.5)));
//!
//! let probe = Segment3::new(Vector3::new(-3.0, 0.0, 0.0), Vector3::new(3.0, 0.0, 0.0))?;
//! let hits = cube
//!     .edges()
//!     .iter()
//!     .filter(|edge| edge.distance_to_line(&probe) < 1.2)
//!     .count();
//! // Edges crossing the x axis are one unit away; those along it are √2 away
//! assert_eq!(hits, 8);
//! # Ok::<(), kernel3d::GeometryError>(())
//! ```

use crate::constants::MIN_EDGE_LENGTH;
use thiserror::Error;

pub mod constants;
pub mod coordinates;
pub mod cube;
pub mod segment;

// Re-export commonly used types
pub use coordinates::Vector3;
pub use cube::{Cube3, CubeBuilder};
pub use segment::Segment3;

/// Main error type for the kernel3d library
///
/// Every variant is a violated precondition reported by the call that
/// violated it.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("Segment endpoints coincide at {point}")]
    CoincidentEndpoints { point: Vector3 },

    #[error("Edge length must be greater than {min:e}, got {0}", min = MIN_EDGE_LENGTH)]
    NonPositiveEdgeLength(f64),

    #[error("Scale factor must be positive, got {0}")]
    NonPositiveScaleFactor(f64),

    #[error("Length must be positive, got {0}")]
    NonPositiveLength(f64),

    #[error("Orientation is not a proper rotation matrix")]
    InvalidOrientation,
}

/// Result type for kernel3d operations
pub type Result<T> = std::result::Result<T, GeometryError>;
