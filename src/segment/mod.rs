//! # Segment Module
//!
//! Finite line segments between two distinct endpoints, with point
//! projection, segment-to-segment distance and intersection.
//!
//! ## Closest Approach
//!
//! Distance and intersection between two segments share one computation.
//! Parameterize the segments as `P(s) = start₁ + s·d₁` and
//! `Q(t) = start₂ + t·d₂`. The squared distance `|P(s) - Q(t)|²` is minimized
//! where both partial derivatives vanish, which gives the 2×2 system
//!
//! ```text
//! | a  -b | |s|   |-d|        a = d₁·d₁   b = d₁·d₂   c = d₂·d₂
//! | b  -c | |t| = |-e|        d = d₁·w₀   e = d₂·w₀   w₀ = start₁ - start₂
//! ```
//!
//! with determinant `a·c - b²`. The determinant vanishes exactly when the
//! directions are parallel, in which case every `s` has a matching optimal `t`
//! and one parameter has to be fixed by hand.

use crate::constants::EPSILON;
use crate::coordinates::Vector3;
use crate::{GeometryError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A finite segment from `start` to `end`
///
/// The endpoints are never equal under [`Vector3`] tolerance. Direction
/// matters: a segment and its [`reverse`](Segment3::reverse) are different
/// values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawSegment")]
pub struct Segment3 {
    start: Vector3,
    end: Vector3,
}

/// Unvalidated wire form; deserialization goes through [`Segment3::new`]
#[derive(Deserialize)]
struct RawSegment {
    start: Vector3,
    end: Vector3,
}

impl TryFrom<RawSegment> for Segment3 {
    type Error = GeometryError;

    fn try_from(raw: RawSegment) -> Result<Self> {
        Segment3::new(raw.start, raw.end)
    }
}

/// Coefficients of the closest-approach system for two segments
struct ClosestApproach {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,
}

impl ClosestApproach {
    fn new(first: &Segment3, second: &Segment3) -> Self {
        let d1 = first.direction();
        let d2 = second.direction();
        let w0 = first.start - second.start;

        ClosestApproach {
            a: d1.dot(&d1),
            b: d1.dot(&d2),
            c: d2.dot(&d2),
            d: d1.dot(&w0),
            e: d2.dot(&w0),
        }
    }

    fn determinant(&self) -> f64 {
        self.a * self.c - self.b * self.b
    }

    fn is_degenerate(&self) -> bool {
        self.determinant().abs() < EPSILON
    }

    /// Unclamped parameters of the closest points on the two infinite lines.
    /// Only meaningful when the system is not degenerate.
    fn solve(&self) -> (f64, f64) {
        let den = self.determinant();
        let s = (self.b * self.e - self.c * self.d) / den;
        let t = (self.a * self.e - self.b * self.d) / den;
        (s, t)
    }

    /// Parameter on the second line closest to the first line's start.
    ///
    /// Divides by whichever of `b` and `c` is larger; the two quotients agree
    /// for parallel lines but the larger denominator is the better conditioned.
    fn solve_parallel(&self) -> f64 {
        if self.b > self.c {
            self.d / self.b
        } else {
            self.e / self.c
        }
    }
}

fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

fn on_bound(value: f64) -> bool {
    value == 0.0 || value == 1.0
}

impl Segment3 {
    /// Creates a segment between two distinct points
    ///
    /// # Errors
    ///
    /// [`GeometryError::CoincidentEndpoints`] if `start` equals `end` within
    /// tolerance.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kernel3d::{Segment3, Vector3};
    ///
    /// let seg = Segment3::new(Vector3::origin(), Vector3::new(3.0, 4.0, 0.0)).unwrap();
    /// assert_eq!(seg.length(), 5.0);
    ///
    /// assert!(Segment3::new(Vector3::origin(), Vector3::origin()).is_err());
    /// ```
    pub fn new(start: Vector3, end: Vector3) -> Result<Self> {
        if start == end {
            log::debug!("Rejected segment with coincident endpoints at {}", start);
            return Err(GeometryError::CoincidentEndpoints { point: start });
        }
        log::trace!("Created segment {} -> {}", start, end);
        Ok(Segment3 { start, end })
    }

    /// Alias for [`Segment3::new`]
    pub fn of(start: Vector3, end: Vector3) -> Result<Self> {
        Self::new(start, end)
    }

    /// Skips the coincidence check; callers guarantee the endpoints are
    /// separated (cube corners sharing an edge are at least
    /// [`MIN_EDGE_LENGTH`](crate::constants::MIN_EDGE_LENGTH) apart)
    pub(crate) fn between_distinct(start: Vector3, end: Vector3) -> Self {
        debug_assert!(start != end, "coincident endpoints at {}", start);
        Segment3 { start, end }
    }

    /// Creates a segment of the given length along `direction`
    ///
    /// `direction` need not be unit length; it is normalized first.
    ///
    /// # Errors
    ///
    /// - [`GeometryError::NonPositiveLength`] if `length` is not greater than
    ///   [`EPSILON`]
    /// - [`GeometryError::CoincidentEndpoints`] if `direction` is (near) zero,
    ///   since it then has no direction to extend along
    pub fn from_direction(start: Vector3, direction: Vector3, length: f64) -> Result<Self> {
        if !(length > EPSILON) {
            log::debug!("Rejected segment length {}", length);
            return Err(GeometryError::NonPositiveLength(length));
        }
        if direction.magnitude() < EPSILON {
            log::debug!("Rejected near-zero segment direction {}", direction);
            return Err(GeometryError::CoincidentEndpoints { point: start });
        }
        let end = start + direction.normalize() * length;
        Self::new(start, end)
    }

    /// Start point
    pub fn start(&self) -> Vector3 {
        self.start
    }

    /// End point
    pub fn end(&self) -> Vector3 {
        self.end
    }

    /// Distance between the endpoints
    pub fn length(&self) -> f64 {
        self.start.distance_to(&self.end)
    }

    /// `end - start`, not normalized; its magnitude is the segment length
    pub fn direction(&self) -> Vector3 {
        self.end - self.start
    }

    /// Unit vector from `start` toward `end`
    pub fn direction_normalized(&self) -> Vector3 {
        self.direction().normalize()
    }

    /// Point halfway between the endpoints
    pub fn midpoint(&self) -> Vector3 {
        (self.start + self.end) * 0.5
    }

    fn point_at(&self, t: f64) -> Vector3 {
        self.start + self.direction() * t
    }

    /// Point on the segment nearest to `point`
    ///
    /// Projects onto the infinite line, `t = ((p - start)·d) / (d·d)`, then
    /// clamps `t` into `[0, 1]`: projections before the start snap to `start`
    /// and projections past the end snap to `end`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kernel3d::{Segment3, Vector3};
    ///
    /// let seg = Segment3::new(Vector3::origin(), Vector3::new(1.0, 0.0, 0.0)).unwrap();
    /// let closest = seg.closest_point_to(&Vector3::new(0.5, 1.0, 0.0));
    /// assert_eq!(closest, Vector3::new(0.5, 0.0, 0.0));
    /// ```
    pub fn closest_point_to(&self, point: &Vector3) -> Vector3 {
        let direction = self.direction();
        let t = (*point - self.start).dot(&direction) / direction.dot(&direction);
        self.point_at(clamp_unit(t))
    }

    /// Euclidean distance from `point` to the nearest point on the segment
    pub fn distance_to_point(&self, point: &Vector3) -> f64 {
        point.distance_to(&self.closest_point_to(point))
    }

    /// Shortest distance between two finite segments
    ///
    /// Solves the closest-approach system for the infinite lines, falls back
    /// to a one-parameter solve (`s = 0`) when the lines are parallel, and
    /// clamps both parameters to the segments. Clamping one parameter moves
    /// the optimum of the other, so whenever either parameter lands on a
    /// bound the answer is the minimum over the clamped pair and the four
    /// endpoint-to-opposite-segment distances.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kernel3d::{Segment3, Vector3};
    ///
    /// let a = Segment3::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0)).unwrap();
    /// let b = Segment3::new(Vector3::new(0.0, 1.0, 0.0), Vector3::new(1.0, 1.0, 0.0)).unwrap();
    /// assert!((a.distance_to_line(&b) - 1.0).abs() < 1e-10);
    /// ```
    pub fn distance_to_line(&self, other: &Segment3) -> f64 {
        let system = ClosestApproach::new(self, other);

        let (s, t) = if system.is_degenerate() {
            (0.0, clamp_unit(system.solve_parallel()))
        } else {
            let (s, t) = system.solve();
            (clamp_unit(s), clamp_unit(t))
        };

        let mut distance = self.point_at(s).distance_to(&other.point_at(t));

        if on_bound(s) || on_bound(t) {
            distance = distance
                .min(other.distance_to_point(&self.start))
                .min(other.distance_to_point(&self.end))
                .min(self.distance_to_point(&other.start))
                .min(self.distance_to_point(&other.end));
        }

        log::trace!("Distance between {} and {}: {}", self, other, distance);
        distance
    }

    /// True when the directions are parallel or antiparallel
    pub fn is_parallel_to(&self, other: &Segment3) -> bool {
        self.direction_normalized()
            .cross(&other.direction_normalized())
            .magnitude()
            < EPSILON
    }

    /// True when the directions are at right angles
    pub fn is_perpendicular_to(&self, other: &Segment3) -> bool {
        self.direction_normalized()
            .dot(&other.direction_normalized())
            .abs()
            < EPSILON
    }

    /// Point where two segments cross, if any
    ///
    /// Returns `None` for parallel segments (including overlapping collinear
    /// ones, which have no unique crossing), when the crossing of the
    /// infinite lines falls outside either segment, and for skew segments
    /// whose closest points are more than [`EPSILON`] apart.
    pub fn intersection_with(&self, other: &Segment3) -> Option<Vector3> {
        if self.is_parallel_to(other) {
            log::trace!("{} and {} are parallel; no intersection", self, other);
            return None;
        }

        let system = ClosestApproach::new(self, other);
        if system.is_degenerate() {
            return None;
        }

        let (s, t) = system.solve();
        if !(0.0..=1.0).contains(&s) || !(0.0..=1.0).contains(&t) {
            log::trace!("Crossing outside segment bounds (s={}, t={})", s, t);
            return None;
        }

        let on_self = self.point_at(s);
        let on_other = other.point_at(t);
        if on_self.distance_to(&on_other) >= EPSILON {
            log::trace!("{} and {} are skew; no intersection", self, other);
            return None;
        }

        log::trace!("{} and {} intersect at {}", self, other, on_self);
        Some(on_self)
    }

    /// Same segment traversed from `end` to `start`
    pub fn reverse(&self) -> Segment3 {
        Segment3 {
            start: self.end,
            end: self.start,
        }
    }

    /// Rescales the segment about its midpoint
    ///
    /// # Errors
    ///
    /// - [`GeometryError::NonPositiveScaleFactor`] unless `factor > 0`
    /// - [`GeometryError::CoincidentEndpoints`] if the factor is so small the
    ///   scaled endpoints collapse within tolerance
    pub fn scale(&self, factor: f64) -> Result<Segment3> {
        if !(factor > 0.0) {
            log::debug!("Rejected segment scale factor {}", factor);
            return Err(GeometryError::NonPositiveScaleFactor(factor));
        }
        let mid = self.midpoint();
        let half = self.direction() * (0.5 * factor);
        Segment3::new(mid - half, mid + half)
    }
}

impl fmt::Display for Segment3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Segment3[{} -> {}]", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    fn seg(a: [f64; 3], b: [f64; 3]) -> Segment3 {
        Segment3::new(a.into(), b.into()).unwrap()
    }

    #[test]
    fn test_rejects_coincident_endpoints() {
        let p = Vector3::new(1.0, 2.0, 3.0);
        let result = Segment3::new(p, p);
        assert!(matches!(
            result,
            Err(GeometryError::CoincidentEndpoints { .. })
        ));

        // Within tolerance still counts as coincident
        let nudged = Vector3::new(1.0 + 1e-12, 2.0, 3.0);
        assert!(Segment3::of(p, nudged).is_err());
    }

    #[test]
    fn test_basic_measurements() {
        let s = seg([1.0, 1.0, 1.0], [4.0, 5.0, 1.0]);
        assert_abs_diff_eq!(s.length(), 5.0, epsilon = 1e-12);
        assert_eq!(s.direction(), Vector3::new(3.0, 4.0, 0.0));
        assert_eq!(s.direction_normalized(), Vector3::new(0.6, 0.8, 0.0));
        assert_eq!(s.midpoint(), Vector3::new(2.5, 3.0, 1.0));
        assert_eq!(s.start(), Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(s.end(), Vector3::new(4.0, 5.0, 1.0));
    }

    #[test]
    fn test_from_direction() {
        let s = Segment3::from_direction(Vector3::origin(), Vector3::new(0.0, 10.0, 0.0), 2.5)
            .unwrap();
        assert_eq!(s.end(), Vector3::new(0.0, 2.5, 0.0));

        assert!(matches!(
            Segment3::from_direction(Vector3::origin(), Vector3::new(1.0, 0.0, 0.0), 0.0),
            Err(GeometryError::NonPositiveLength(_))
        ));
        assert!(matches!(
            Segment3::from_direction(Vector3::origin(), Vector3::ZERO, 1.0),
            Err(GeometryError::CoincidentEndpoints { .. })
        ));

        // A direction below tolerance cannot be normalized, whatever the length
        assert!(matches!(
            Segment3::from_direction(Vector3::origin(), Vector3::new(1e-11, 0.0, 0.0), 1e12),
            Err(GeometryError::CoincidentEndpoints { .. })
        ));

        // Just above tolerance still scales to the requested length
        let s = Segment3::from_direction(Vector3::origin(), Vector3::new(0.0, 0.0, 1e-9), 3.0)
            .unwrap();
        assert_abs_diff_eq!(s.length(), 3.0, epsilon = 1e-12);
    }

    #[rstest]
    #[case([0.5, 1.0, 0.0], [0.5, 0.0, 0.0], 1.0)]
    #[case([-2.0, 0.0, 0.0], [0.0, 0.0, 0.0], 2.0)]
    #[case([4.0, 4.0, 0.0], [1.0, 0.0, 0.0], 5.0)]
    #[case([0.25, 0.0, 0.0], [0.25, 0.0, 0.0], 0.0)]
    fn test_closest_point(
        #[case] point: [f64; 3],
        #[case] expected: [f64; 3],
        #[case] distance: f64,
    ) {
        let s = seg([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        let point = Vector3::from(point);
        assert_eq!(s.closest_point_to(&point), Vector3::from(expected));
        assert_abs_diff_eq!(s.distance_to_point(&point), distance, epsilon = 1e-12);
    }

    #[test]
    fn test_parallel_offset_segments() {
        let s1 = seg([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        let s2 = seg([0.0, 1.0, 0.0], [1.0, 1.0, 0.0]);

        assert_abs_diff_eq!(s1.distance_to_line(&s2), 1.0, epsilon = 1e-12);
        assert!(s1.is_parallel_to(&s2));
        assert!(!s1.is_perpendicular_to(&s2));
        assert_eq!(s1.intersection_with(&s2), None);
    }

    #[test]
    fn test_collinear_gap_needs_endpoint_fallback() {
        // The parallel branch pins s = 0, which alone would report 2.0
        let s1 = seg([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        let s2 = seg([2.0, 0.0, 0.0], [3.0, 0.0, 0.0]);
        assert_abs_diff_eq!(s1.distance_to_line(&s2), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(s2.distance_to_line(&s1), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_parallel_branch_divides_by_larger_coefficient() {
        // |d1| > |d2|, same direction, so b = d1·d2 exceeds c = d2·d2
        let s1 = seg([0.0, 0.0, 0.0], [4.0, 0.0, 0.0]);
        let s2 = seg([6.0, 1.0, 0.0], [7.0, 1.0, 0.0]);

        let system = ClosestApproach::new(&s1, &s2);
        assert!(system.is_degenerate());
        assert!(system.b > system.c);
        assert_abs_diff_eq!(system.d / system.b, system.e / system.c, epsilon = 1e-12);
        assert_abs_diff_eq!(system.solve_parallel(), -6.0, epsilon = 1e-12);

        // Nearest pair is s1's end and s2's start
        assert_abs_diff_eq!(s1.distance_to_line(&s2), 5.0_f64.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(s2.distance_to_line(&s1), 5.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_parallel_overlap_uses_interior_parameter() {
        // s1's start projects into the middle of s2
        let s1 = seg([0.0, 0.0, 0.0], [4.0, 0.0, 0.0]);
        let s2 = seg([-0.5, 1.0, 0.0], [0.5, 1.0, 0.0]);

        let system = ClosestApproach::new(&s1, &s2);
        assert!(system.b > system.c);
        assert_abs_diff_eq!(system.solve_parallel(), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(s1.distance_to_line(&s2), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_antiparallel_segments() {
        let s1 = seg([0.0, 0.0, 0.0], [2.0, 0.0, 0.0]);
        let s2 = seg([2.0, 0.0, 3.0], [0.0, 0.0, 3.0]);
        assert!(s1.is_parallel_to(&s2));
        assert_abs_diff_eq!(s1.distance_to_line(&s2), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_skew_segments() {
        let s1 = seg([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        let s2 = seg([0.0, 0.0, 1.0], [0.0, 1.0, 1.0]);

        assert_eq!(s1.intersection_with(&s2), None);
        assert!(s1.distance_to_line(&s2) > 0.0);
        assert_abs_diff_eq!(s1.distance_to_line(&s2), 1.0, epsilon = 1e-12);
        assert!(s1.is_perpendicular_to(&s2));
    }

    #[test]
    fn test_skew_interior_closest_points() {
        // Closest points are interior to both segments; no clamping involved
        let s1 = seg([-1.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        let s2 = seg([0.0, -1.0, 2.0], [0.0, 1.0, 2.0]);
        assert_abs_diff_eq!(s1.distance_to_line(&s2), 2.0, epsilon = 1e-12);
        assert_eq!(s1.intersection_with(&s2), None);
    }

    #[test]
    fn test_clamped_closest_points() {
        let s1 = seg([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        let s2 = seg([2.0, 1.0, 0.0], [2.0, 2.0, 0.0]);
        assert_abs_diff_eq!(s1.distance_to_line(&s2), 2.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_crossing_segments_intersect() {
        let s1 = seg([-1.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        let s2 = seg([0.0, -1.0, 0.0], [0.0, 1.0, 0.0]);

        assert_eq!(s1.intersection_with(&s2), Some(Vector3::origin()));
        assert_abs_diff_eq!(s1.distance_to_line(&s2), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_intersection_at_shared_endpoint() {
        let s1 = seg([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        let s2 = seg([1.0, 0.0, 0.0], [1.0, 1.0, 0.0]);
        assert_eq!(s1.intersection_with(&s2), Some(Vector3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_lines_cross_outside_segments() {
        let s1 = seg([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        let s2 = seg([2.0, -1.0, 0.0], [2.0, 1.0, 0.0]);
        assert_eq!(s1.intersection_with(&s2), None);
        assert_abs_diff_eq!(s1.distance_to_line(&s2), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_perpendicular_check() {
        let x = seg([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        let y = seg([5.0, 5.0, 5.0], [5.0, 7.0, 5.0]);
        let diagonal = seg([0.0, 0.0, 0.0], [1.0, 1.0, 0.0]);

        assert!(x.is_perpendicular_to(&y));
        assert!(!x.is_perpendicular_to(&diagonal));
        assert!(!x.is_parallel_to(&diagonal));
    }

    #[test]
    fn test_reverse() {
        let s = seg([0.0, 0.0, 0.0], [1.0, 2.0, 3.0]);
        let r = s.reverse();

        assert_ne!(r, s);
        assert_eq!(r.start(), s.end());
        assert_eq!(r.end(), s.start());
        assert_eq!(r.reverse(), s);
        assert_abs_diff_eq!(r.length(), s.length(), epsilon = 1e-12);
    }

    #[test]
    fn test_scale_about_midpoint() {
        let s = seg([0.0, 0.0, 0.0], [2.0, 0.0, 0.0]);

        let doubled = s.scale(2.0).unwrap();
        assert_eq!(doubled, seg([-1.0, 0.0, 0.0], [3.0, 0.0, 0.0]));
        assert_eq!(doubled.midpoint(), s.midpoint());

        let halved = s.scale(0.5).unwrap();
        assert_abs_diff_eq!(halved.length(), 1.0, epsilon = 1e-12);

        for bad in [0.0, -1.0, f64::NAN] {
            assert!(matches!(
                s.scale(bad),
                Err(GeometryError::NonPositiveScaleFactor(_))
            ));
        }
    }

    #[test]
    fn test_display() {
        let s = seg([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        assert_eq!(
            s.to_string(),
            "Segment3[Vector3(0.00, 0.00, 0.00) -> Vector3(1.00, 0.00, 0.00)]"
        );
    }
}
