//! Constants module for geometric tolerances and cube topology

// Tolerances
/// Absolute tolerance used for coordinate equality, degenerate magnitudes and
/// near-zero denominators
pub const EPSILON: f64 = 1e-10;

/// Smallest accepted cube edge length
///
/// Any edge longer than `√3·ε` has at least one component above ε however the
/// cube is turned, so its endpoints never compare equal.
pub const MIN_EDGE_LENGTH: f64 = 2.0 * EPSILON;

// Cube topology
/// Corners of a cube
pub const VERTEX_COUNT: usize = 8;
/// Edges of a cube
pub const EDGE_COUNT: usize = 12;
/// Faces of a cube
pub const FACE_COUNT: usize = 6;

// Derived constants
/// Ratio of a cube's space diagonal to its edge length
pub const SQRT_3: f64 = 1.732_050_807_568_877_2;
/// Ratio of a cube's face diagonal to its edge length
pub const SQRT_2: f64 = std::f64::consts::SQRT_2;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagonal_ratios() {
        assert!((SQRT_3 * SQRT_3 - 3.0).abs() < 1e-15);
        assert!((SQRT_2 * SQRT_2 - 2.0).abs() < 1e-15);
    }

    #[test]
    fn test_cube_topology_matches_euler_characteristic() {
        // V - E + F = 2 for any convex polyhedron
        let euler = VERTEX_COUNT as i64 - EDGE_COUNT as i64 + FACE_COUNT as i64;
        assert_eq!(euler, 2);
    }

    #[test]
    fn test_min_edge_clears_tolerance_on_every_axis() {
        // Worst case is an edge along a body diagonal
        assert!(MIN_EDGE_LENGTH / SQRT_3 > EPSILON);
    }
}
