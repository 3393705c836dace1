//! Fluent configuration for [`Cube3`]

use super::Cube3;
use crate::coordinates::Vector3;
use crate::Result;

/// Builder for [`Cube3`]
///
/// Defaults to the unit cube: centered at the origin with edge length 1.
/// Validation happens in [`build`](CubeBuilder::build), which defers to
/// [`Cube3::new`].
///
/// # Examples
///
/// ```rust
/// use kernel3d::{Cube3, Vector3};
///
/// let cube = Cube3::builder()
///     .with_center(Vector3::new(1.0, 2.0, 3.0))
///     .with_edge_length(4.0)
///     .build()
///     .unwrap();
/// assert_eq!(cube.edge_length(), 4.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CubeBuilder {
    center: Vector3,
    edge_length: f64,
}

impl CubeBuilder {
    /// Create a builder with the unit-cube defaults
    pub fn new() -> Self {
        Self {
            center: Vector3::origin(),
            edge_length: 1.0,
        }
    }

    /// Set the center
    pub fn with_center(mut self, center: Vector3) -> Self {
        self.center = center;
        self
    }

    /// Set the edge length
    pub fn with_edge_length(mut self, edge_length: f64) -> Self {
        self.edge_length = edge_length;
        self
    }

    /// Build the cube, validating the edge length
    pub fn build(self) -> Result<Cube3> {
        Cube3::new(self.center, self.edge_length)
    }
}

impl Default for CubeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
