//! # Cube Module
//!
//! Cubes defined by a center, an edge length and an orientation about the
//! center.
//!
//! ## Vertex Numbering
//!
//! Vertex `i` for `i` in `0..8` sits at `center + R·(±h, ±h, ±h)` where `h` is
//! half the edge length, `R` the orientation, and bit 0, 1, 2 of `i` select
//! the sign on the local x, y, z axis (clear = minus, set = plus):
//!
//! ```text
//!        6----------7
//!       /|         /|
//!      / |        / |
//!     4----------5  |        z
//!     |  2-------|--3        |  y
//!     | /        | /         | /
//!     |/         |/          |/
//!     0----------1           +----x
//! ```
//!
//! Edges run around the bottom face (`0-1-3-2`), around the top face
//! (`4-5-7-6`) and up the four verticals (`i` to `i + 4`).
//!
//! ## Orientation
//!
//! A freshly built cube is axis-aligned. The `rotate_*` operations turn it
//! about its own center and record the accumulated rotation, so containment,
//! intersection and distance queries stay correct after rotation: they work in
//! the cube's local frame and reduce to the plain axis-aligned tests when the
//! orientation is the identity. Center and edge length never change under
//! rotation, and equality ignores orientation.

mod builder;

pub use builder::CubeBuilder;

use crate::constants::{
    EDGE_COUNT, EPSILON, FACE_COUNT, MIN_EDGE_LENGTH, SQRT_2, SQRT_3, VERTEX_COUNT,
};
use crate::coordinates::vector::quantize;
use crate::coordinates::Vector3;
use crate::segment::Segment3;
use crate::{GeometryError, Result};
use nalgebra::{Matrix3, Rotation3, Unit};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

type NaVector3 = nalgebra::Vector3<f64>;

/// Vertex index pairs for the twelve edges
const EDGE_VERTICES: [(usize, usize); EDGE_COUNT] = [
    // bottom ring
    (0, 1),
    (1, 3),
    (3, 2),
    (2, 0),
    // top ring
    (4, 5),
    (5, 7),
    (7, 6),
    (6, 4),
    // verticals
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

/// Coordinate axis a cube can be rotated about
#[derive(Debug, Clone, Copy)]
enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn rotate(self, vector: &Vector3, angle_radians: f64) -> Vector3 {
        match self {
            Axis::X => vector.rotate_x(angle_radians),
            Axis::Y => vector.rotate_y(angle_radians),
            Axis::Z => vector.rotate_z(angle_radians),
        }
    }

    fn unit(self) -> Unit<NaVector3> {
        match self {
            Axis::X => NaVector3::x_axis(),
            Axis::Y => NaVector3::y_axis(),
            Axis::Z => NaVector3::z_axis(),
        }
    }
}

/// A cube with cached vertices and edges
///
/// Vertices and edges are derived on first access and cached for the life of
/// the value. The caches are initialize-once cells, so a `Cube3` can be shared
/// across threads and queried concurrently.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawCube", into = "RawCube")]
pub struct Cube3 {
    center: Vector3,
    edge_length: f64,
    orientation: Rotation3<f64>,
    vertices: OnceCell<[Vector3; VERTEX_COUNT]>,
    edges: OnceCell<[Segment3; EDGE_COUNT]>,
}

/// Wire form of a cube; the caches are never serialized
#[derive(Serialize, Deserialize)]
struct RawCube {
    center: Vector3,
    edge_length: f64,
    #[serde(default = "Rotation3::identity")]
    orientation: Rotation3<f64>,
}

impl TryFrom<RawCube> for Cube3 {
    type Error = GeometryError;

    fn try_from(raw: RawCube) -> Result<Self> {
        let cube = Cube3::new(raw.center, raw.edge_length)?;
        if !is_proper_rotation(raw.orientation.matrix()) {
            log::debug!("Rejected cube orientation {}", raw.orientation.matrix());
            return Err(GeometryError::InvalidOrientation);
        }
        Ok(cube.with_orientation(raw.orientation))
    }
}

/// Orthonormal with determinant +1, within [`EPSILON`]
fn is_proper_rotation(m: &Matrix3<f64>) -> bool {
    let orthonormal = (m * m.transpose() - Matrix3::identity())
        .iter()
        .all(|c| c.abs() < EPSILON);
    orthonormal && (m.determinant() - 1.0).abs() < EPSILON
}

impl From<Cube3> for RawCube {
    fn from(cube: Cube3) -> Self {
        RawCube {
            center: cube.center,
            edge_length: cube.edge_length,
            orientation: cube.orientation,
        }
    }
}

impl Cube3 {
    /// Creates an axis-aligned cube
    ///
    /// # Errors
    ///
    /// [`GeometryError::NonPositiveEdgeLength`] unless `edge_length` is greater
    /// than [`MIN_EDGE_LENGTH`]. NaN is rejected.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kernel3d::{Cube3, Vector3};
    ///
    /// let cube = Cube3::new(Vector3::origin(), 2.0).unwrap();
    /// assert_eq!(cube.volume(), 8.0);
    /// assert!(Cube3::new(Vector3::origin(), 0.0).is_err());
    /// ```
    pub fn new(center: Vector3, edge_length: f64) -> Result<Self> {
        if !(edge_length > MIN_EDGE_LENGTH) {
            log::debug!("Rejected cube edge length {}", edge_length);
            return Err(GeometryError::NonPositiveEdgeLength(edge_length));
        }
        log::trace!("Created cube at {} with edge length {}", center, edge_length);
        Ok(Cube3 {
            center,
            edge_length,
            orientation: Rotation3::identity(),
            vertices: OnceCell::new(),
            edges: OnceCell::new(),
        })
    }

    /// Alias for [`Cube3::new`]
    pub fn of(center: Vector3, edge_length: f64) -> Result<Self> {
        Self::new(center, edge_length)
    }

    /// Axis-aligned cube of edge length 1 centered at the origin
    pub fn unit() -> Self {
        Cube3 {
            center: Vector3::origin(),
            edge_length: 1.0,
            orientation: Rotation3::identity(),
            vertices: OnceCell::new(),
            edges: OnceCell::new(),
        }
    }

    /// Starts a [`CubeBuilder`] with the unit-cube defaults
    pub fn builder() -> CubeBuilder {
        CubeBuilder::new()
    }

    /// Same center, edge length and orientation, with empty caches
    fn with_orientation(&self, orientation: Rotation3<f64>) -> Self {
        Cube3 {
            center: self.center,
            edge_length: self.edge_length,
            orientation,
            vertices: OnceCell::new(),
            edges: OnceCell::new(),
        }
    }

    /// Center point
    pub fn center(&self) -> Vector3 {
        self.center
    }

    /// Edge length
    pub fn edge_length(&self) -> f64 {
        self.edge_length
    }

    /// Half the edge length; the distance from the center to each face
    pub fn half_edge(&self) -> f64 {
        self.edge_length / 2.0
    }

    /// Accumulated rotation about the center
    pub fn orientation(&self) -> &Rotation3<f64> {
        &self.orientation
    }

    /// True when every face is perpendicular to a coordinate axis
    ///
    /// Holds for the identity orientation and for any rotation that permutes
    /// the axes (quarter turns), within [`EPSILON`].
    pub fn is_axis_aligned(&self) -> bool {
        self.orientation
            .matrix()
            .column_iter()
            .all(|column| column.iter().any(|c| (c.abs() - 1.0).abs() < EPSILON))
    }

    /// The cube's local x, y and z axes in world coordinates
    fn axes(&self) -> [NaVector3; 3] {
        [
            self.orientation * NaVector3::x(),
            self.orientation * NaVector3::y(),
            self.orientation * NaVector3::z(),
        ]
    }

    /// Expresses a world point relative to the center in the local frame
    fn to_local(&self, point: &Vector3) -> NaVector3 {
        self.orientation
            .inverse_transform_vector(&NaVector3::from(*point - self.center))
    }

    fn compute_vertices(&self) -> [Vector3; VERTEX_COUNT] {
        let half = self.half_edge();
        std::array::from_fn(|i| {
            let sign = |bit: usize| if i & bit == 0 { -half } else { half };
            let offset = self.orientation * NaVector3::new(sign(1), sign(2), sign(4));
            self.center + Vector3::from(offset)
        })
    }

    /// The eight corners, in the bit-pattern order described in the module docs
    pub fn vertices(&self) -> &[Vector3; VERTEX_COUNT] {
        self.vertices.get_or_init(|| {
            log::trace!("Deriving vertices for {}", self);
            self.compute_vertices()
        })
    }

    /// The twelve edges: bottom ring, top ring, then verticals
    pub fn edges(&self) -> &[Segment3; EDGE_COUNT] {
        self.edges.get_or_init(|| {
            log::trace!("Deriving edges for {}", self);
            let vertices = self.vertices();
            EDGE_VERTICES.map(|(a, b)| Segment3::between_distinct(vertices[a], vertices[b]))
        })
    }

    /// `6·e²`
    pub fn surface_area(&self) -> f64 {
        FACE_COUNT as f64 * self.edge_length * self.edge_length
    }

    /// `e³`
    pub fn volume(&self) -> f64 {
        self.edge_length * self.edge_length * self.edge_length
    }

    /// `12·e`
    pub fn total_edge_length(&self) -> f64 {
        EDGE_COUNT as f64 * self.edge_length
    }

    /// Corner-to-opposite-corner length, `e·√3`
    pub fn space_diagonal(&self) -> f64 {
        self.edge_length * SQRT_3
    }

    /// Diagonal of one face, `e·√2`
    pub fn face_diagonal(&self) -> f64 {
        self.edge_length * SQRT_2
    }

    /// Cube shifted by `displacement`
    pub fn translate(&self, displacement: &Vector3) -> Cube3 {
        self.move_to(&(self.center + *displacement))
    }

    /// Same cube placed at an absolute center
    pub fn move_to(&self, new_center: &Vector3) -> Cube3 {
        log::trace!("Moving cube from {} to {}", self.center, new_center);
        Cube3 {
            center: *new_center,
            ..self.with_orientation(self.orientation)
        }
    }

    /// Same center, edge length multiplied by `factor`
    ///
    /// # Errors
    ///
    /// [`GeometryError::NonPositiveScaleFactor`] unless `factor` is greater
    /// than [`EPSILON`]; [`GeometryError::NonPositiveEdgeLength`] if the scaled
    /// edge collapses below tolerance.
    pub fn scale(&self, factor: f64) -> Result<Cube3> {
        if !(factor > EPSILON) {
            log::debug!("Rejected cube scale factor {}", factor);
            return Err(GeometryError::NonPositiveScaleFactor(factor));
        }
        Ok(Cube3::new(self.center, self.edge_length * factor)?.with_orientation(self.orientation))
    }

    fn rotated(&self, axis: Axis, angle_radians: f64) -> Cube3 {
        let center = self.center;
        let turned = self
            .vertices()
            .map(|vertex| axis.rotate(&(vertex - center), angle_radians) + center);

        let rotation = Rotation3::from_axis_angle(&axis.unit(), angle_radians);
        log::trace!("Rotating cube about {:?} by {} rad", axis, angle_radians);
        Cube3 {
            vertices: OnceCell::with_value(turned),
            ..self.with_orientation(rotation * self.orientation)
        }
    }

    /// Rotates about the X axis through the center
    ///
    /// The returned cube has the same center and edge length (and so compares
    /// equal to `self`), with its vertex cache already holding the rotated
    /// corners.
    pub fn rotate_x(&self, angle_radians: f64) -> Cube3 {
        self.rotated(Axis::X, angle_radians)
    }

    /// Rotates about the Y axis through the center
    pub fn rotate_y(&self, angle_radians: f64) -> Cube3 {
        self.rotated(Axis::Y, angle_radians)
    }

    /// Rotates about the Z axis through the center
    pub fn rotate_z(&self, angle_radians: f64) -> Cube3 {
        self.rotated(Axis::Z, angle_radians)
    }

    /// True when `point` is inside or on the surface (within [`EPSILON`])
    ///
    /// For an axis-aligned cube this is `|pᵢ - cᵢ| ≤ h + ε` on every axis.
    pub fn contains_point(&self, point: &Vector3) -> bool {
        let limit = self.half_edge() + EPSILON;
        let local = self.to_local(point);
        let contained = local.iter().all(|c| c.abs() <= limit);
        log::trace!(
            "Point {} is {} {}",
            point,
            if contained { "inside" } else { "outside" },
            self
        );
        contained
    }

    /// Separating-axis overlap test
    ///
    /// Candidate axes are the three face normals of each cube and the nine
    /// cross products of their edge directions. Near-zero cross products
    /// (parallel edges) are skipped since they cannot separate anything the
    /// face normals do not. Touching cubes intersect.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kernel3d::{Cube3, Vector3};
    ///
    /// let a = Cube3::unit();
    /// let far = a.translate(&Vector3::new(3.0, 0.0, 0.0));
    /// let touching = a.translate(&Vector3::new(1.0, 0.0, 0.0));
    /// assert!(!a.intersects(&far));
    /// assert!(a.intersects(&touching));
    /// ```
    pub fn intersects(&self, other: &Cube3) -> bool {
        let own_axes = self.axes();
        let other_axes = other.axes();
        let between = NaVector3::from(other.center - self.center);

        let reach = |axes: &[NaVector3; 3], half: f64, axis: &NaVector3| {
            half * axes.iter().map(|a| a.dot(axis).abs()).sum::<f64>()
        };
        let separates = |axis: &NaVector3| {
            between.dot(axis).abs()
                > reach(&own_axes, self.half_edge(), axis)
                    + reach(&other_axes, other.half_edge(), axis)
                    + EPSILON
        };

        let face_normals = own_axes.iter().chain(other_axes.iter()).copied();
        let edge_crosses = own_axes
            .iter()
            .flat_map(|a| other_axes.iter().map(move |b| a.cross(b)))
            .filter_map(|axis| {
                let norm = axis.norm();
                (norm >= EPSILON).then(|| axis / norm)
            });

        let intersects = !face_normals.chain(edge_crosses).any(|axis| separates(&axis));
        log::trace!(
            "{} and {} {}",
            self,
            other,
            if intersects { "intersect" } else { "do not intersect" }
        );
        intersects
    }

    /// Distance from `point` to the nearest point of the solid
    ///
    /// Zero for contained points; otherwise the point is clamped into the cube
    /// along each local axis and the distance to that surface point returned.
    pub fn distance_to_point(&self, point: &Vector3) -> f64 {
        if self.contains_point(point) {
            return 0.0;
        }
        let half = self.half_edge();
        let local = self.to_local(point);
        let nearest = local.map(|c| c.clamp(-half, half));
        let distance = (local - nearest).norm();
        log::trace!("Distance from {} to {}: {}", point, self, distance);
        distance
    }

    /// Lowest corner of the axis-aligned bounding box
    ///
    /// `center - h` on every axis for an axis-aligned cube.
    pub fn min_corner(&self) -> Vector3 {
        let vertices = self.vertices();
        vertices[1..].iter().fold(vertices[0], |acc, v| acc.min(v))
    }

    /// Highest corner of the axis-aligned bounding box
    ///
    /// `center + h` on every axis for an axis-aligned cube.
    pub fn max_corner(&self) -> Vector3 {
        let vertices = self.vertices();
        vertices[1..].iter().fold(vertices[0], |acc, v| acc.max(v))
    }
}

impl PartialEq for Cube3 {
    fn eq(&self, other: &Self) -> bool {
        self.center == other.center && (self.edge_length - other.edge_length).abs() < EPSILON
    }
}

impl Eq for Cube3 {}

impl Hash for Cube3 {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.center.hash(state);
        quantize(self.edge_length).hash(state);
    }
}

impl fmt::Display for Cube3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cube3[center={}, edge={:.2}]", self.center, self.edge_length)
    }
}
