//! # Vector Module
//!
//! This module provides the `Vector3` value type: a point or displacement in
//! 3D Euclidean space. It is the leaf type of the kernel; segments and cubes
//! are built entirely out of it.
//!
//! ## Affine Conflation
//!
//! A `Vector3` represents both a position and a displacement. Subtracting two
//! positions yields a displacement, adding a displacement to a position yields
//! a position, and the type does not distinguish between the two.
//!
//! ## Tolerant Equality
//!
//! Two vectors are equal when every coordinate differs by less than
//! [`EPSILON`]. Exact bitwise equality is not meaningful after floating-point
//! arithmetic, so `PartialEq`, `Eq` and `Hash` are implemented by hand.
//!
//! The hash quantizes every coordinate onto an ε-sized grid. Equal vectors
//! almost always land in the same grid cell, but two vectors less than ε apart
//! that straddle a cell boundary compare equal while hashing differently.
//!
//! ## Examples
//!
//! ```rust
//! use kernel3d::Vector3;
//!
//! let x_axis = Vector3::new(1.0, 0.0, 0.0);
//! let y_axis = Vector3::new(0.0, 1.0, 0.0);
//!
//! // Right-hand rule
//! assert_eq!(x_axis.cross(&y_axis), Vector3::new(0.0, 0.0, 1.0));
//! assert_eq!(x_axis.dot(&y_axis), 0.0);
//! ```

use crate::constants::EPSILON;
use nalgebra as na;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Three-dimensional vector with tolerant equality
///
/// Stores three `f64` coordinates. All operations return new values; a
/// `Vector3` is never modified after construction.
///
/// # Unit Vectors vs Position Vectors
///
/// This type can represent:
/// - **Positions**: points in space relative to the origin
/// - **Displacements**: offsets between two positions
/// - **Directions**: displacements of unit length
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Vector3 {
    x: f64,
    y: f64,
    z: f64,
}

impl Vector3 {
    /// The zero vector, also the origin
    pub const ZERO: Vector3 = Vector3::new(0.0, 0.0, 0.0);

    /// Creates a new vector
    ///
    /// # Arguments
    ///
    /// * `x` - X-component
    /// * `y` - Y-component
    /// * `z` - Z-component
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kernel3d::Vector3;
    ///
    /// let v = Vector3::new(1.0, 2.0, 3.0);
    /// assert_eq!(v.x(), 1.0);
    /// assert_eq!(v.y(), 2.0);
    /// assert_eq!(v.z(), 3.0);
    /// ```
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Vector3 { x, y, z }
    }

    /// Alias for [`Vector3::new`]
    pub const fn of(x: f64, y: f64, z: f64) -> Self {
        Self::new(x, y, z)
    }

    /// The origin (0, 0, 0)
    pub const fn origin() -> Self {
        Self::ZERO
    }

    /// X-component
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Y-component
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Z-component
    pub fn z(&self) -> f64 {
        self.z
    }

    /// Euclidean distance to another vector
    ///
    /// # Mathematical Formula
    ///
    /// `distance = sqrt((x₁-x₂)² + (y₁-y₂)² + (z₁-z₂)²)`
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kernel3d::Vector3;
    ///
    /// let a = Vector3::origin();
    /// let b = Vector3::new(3.0, 4.0, 0.0);
    /// assert_eq!(a.distance_to(&b), 5.0);
    /// ```
    pub fn distance_to(&self, other: &Vector3) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Squared Euclidean distance to another vector
    ///
    /// Performs no square root. Callers that only compare distances (nearest
    /// neighbour searches, radius checks against a squared radius) should use
    /// this instead of [`Vector3::distance_to`]; ordering is preserved because
    /// squaring is monotonic on non-negative values.
    pub fn distance_squared(&self, other: &Vector3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    /// Length of the vector measured from the origin
    ///
    /// # Mathematical Formula
    ///
    /// `magnitude = sqrt(x² + y² + z²)`
    pub fn magnitude(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Returns a unit vector in the same direction
    ///
    /// A vector whose magnitude is below [`EPSILON`] has no defined direction.
    /// In that case the input is returned unchanged rather than failing, so the
    /// result is *not* guaranteed to have unit length. Callers that need a
    /// direction must check the magnitude first.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kernel3d::Vector3;
    ///
    /// let unit = Vector3::new(3.0, 4.0, 0.0).normalize();
    /// assert!((unit.magnitude() - 1.0).abs() < 1e-15);
    ///
    /// // Degenerate input comes back untouched
    /// let zero = Vector3::origin();
    /// assert_eq!(zero.normalize(), zero);
    /// ```
    pub fn normalize(&self) -> Vector3 {
        let mag = self.magnitude();
        if mag < EPSILON {
            log::warn!("Normalizing near-zero vector {}; returning it unchanged", self);
            return *self;
        }
        *self / mag
    }

    /// Componentwise sum
    pub fn add(&self, other: &Vector3) -> Vector3 {
        *self + *other
    }

    /// Componentwise difference `self - other`
    pub fn subtract(&self, other: &Vector3) -> Vector3 {
        *self - *other
    }

    /// Multiplies every component by `scalar`
    pub fn scale(&self, scalar: f64) -> Vector3 {
        *self * scalar
    }

    /// Dot product
    ///
    /// # Mathematical Formula
    ///
    /// `dot = x₁*x₂ + y₁*y₂ + z₁*z₂`
    pub fn dot(&self, other: &Vector3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Right-handed cross product
    ///
    /// The result is perpendicular to both inputs. Parallel, antiparallel and
    /// identical inputs produce the zero vector.
    ///
    /// # Mathematical Formula
    ///
    /// ```text
    /// cross = (y₁*z₂ - z₁*y₂, z₁*x₂ - x₁*z₂, x₁*y₂ - y₁*x₂)
    /// ```
    pub fn cross(&self, other: &Vector3) -> Vector3 {
        Vector3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Rotates about the X axis through the origin
    ///
    /// The X coordinate is invariant.
    ///
    /// ```text
    /// y' = y cos θ - z sin θ
    /// z' = y sin θ + z cos θ
    /// ```
    pub fn rotate_x(&self, angle_radians: f64) -> Vector3 {
        let (sin, cos) = angle_radians.sin_cos();
        Vector3::new(
            self.x,
            self.y * cos - self.z * sin,
            self.y * sin + self.z * cos,
        )
    }

    /// Rotates about the Y axis through the origin
    ///
    /// The Y coordinate is invariant.
    ///
    /// ```text
    /// x' =  x cos θ + z sin θ
    /// z' = -x sin θ + z cos θ
    /// ```
    pub fn rotate_y(&self, angle_radians: f64) -> Vector3 {
        let (sin, cos) = angle_radians.sin_cos();
        Vector3::new(
            self.x * cos + self.z * sin,
            self.y,
            -self.x * sin + self.z * cos,
        )
    }

    /// Rotates about the Z axis through the origin
    ///
    /// The Z coordinate is invariant.
    ///
    /// ```text
    /// x' = x cos θ - y sin θ
    /// y' = x sin θ + y cos θ
    /// ```
    pub fn rotate_z(&self, angle_radians: f64) -> Vector3 {
        let (sin, cos) = angle_radians.sin_cos();
        Vector3::new(
            self.x * cos - self.y * sin,
            self.x * sin + self.y * cos,
            self.z,
        )
    }

    /// Componentwise minimum
    pub fn min(&self, other: &Vector3) -> Vector3 {
        Vector3::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    /// Componentwise maximum
    pub fn max(&self, other: &Vector3) -> Vector3 {
        Vector3::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }

    /// Coordinates as an array
    pub fn to_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

/// Maps a coordinate onto the ε grid used for hashing
pub(crate) fn quantize(value: f64) -> i64 {
    // `as` saturates for values too large for the grid and maps NaN to 0
    (value / EPSILON).round() as i64
}

impl PartialEq for Vector3 {
    fn eq(&self, other: &Self) -> bool {
        (self.x - other.x).abs() < EPSILON
            && (self.y - other.y).abs() < EPSILON
            && (self.z - other.z).abs() < EPSILON
    }
}

impl Eq for Vector3 {}

impl Hash for Vector3 {
    fn hash<H: Hasher>(&self, state: &mut H) {
        quantize(self.x).hash(state);
        quantize(self.y).hash(state);
        quantize(self.z).hash(state);
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vector3({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

impl From<[f64; 3]> for Vector3 {
    fn from(arr: [f64; 3]) -> Self {
        Vector3::new(arr[0], arr[1], arr[2])
    }
}

impl From<na::Vector3<f64>> for Vector3 {
    fn from(vec: na::Vector3<f64>) -> Self {
        Vector3::new(vec.x, vec.y, vec.z)
    }
}

impl From<Vector3> for na::Vector3<f64> {
    fn from(vec: Vector3) -> Self {
        na::Vector3::new(vec.x, vec.y, vec.z)
    }
}

impl From<na::Point3<f64>> for Vector3 {
    fn from(point: na::Point3<f64>) -> Self {
        Vector3::new(point.x, point.y, point.z)
    }
}

impl From<Vector3> for na::Point3<f64> {
    fn from(vec: Vector3) -> Self {
        na::Point3::new(vec.x, vec.y, vec.z)
    }
}

// Arithmetic operations for convenience
impl std::ops::Add for Vector3 {
    type Output = Vector3;

    fn add(self, other: Vector3) -> Vector3 {
        Vector3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl std::ops::Sub for Vector3 {
    type Output = Vector3;

    fn sub(self, other: Vector3) -> Vector3 {
        Vector3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl std::ops::Mul<f64> for Vector3 {
    type Output = Vector3;

    fn mul(self, scalar: f64) -> Vector3 {
        Vector3 {
            x: self.x * scalar,
            y: self.y * scalar,
            z: self.z * scalar,
        }
    }
}

impl std::ops::Div<f64> for Vector3 {
    type Output = Vector3;

    fn div(self, scalar: f64) -> Vector3 {
        Vector3 {
            x: self.x / scalar,
            y: self.y / scalar,
            z: self.z / scalar,
        }
    }
}

impl std::ops::Neg for Vector3 {
    type Output = Vector3;

    fn neg(self) -> Vector3 {
        Vector3 {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}
