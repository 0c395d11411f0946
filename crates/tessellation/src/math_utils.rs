//! Orientation and ordering predicates used by the sweep.
//!
//! Angles are never computed with trigonometry here. [`edge_direction`] and
//! [`edge_angle`] map a vector onto a scalar that grows monotonically with its angle to
//! the x axis, which is all the sweep needs to sort edges around a vertex.

use crate::math::*;

#[cfg(not(feature = "std"))]
use num_traits::Float;

/// Tolerance used for every fuzzy comparison of the sweep.
pub const MATH_TOLERANCE: f32 = f32::EPSILON * 4.0;

/// Sweep order: `u` comes before (or at the same position as) `v` if it is on the left,
/// or vertically aligned and below.
#[inline]
pub fn vert_leq(u: Point, v: Point) -> bool {
    u.x < v.x || (u.x == v.x && u.y <= v.y)
}

#[inline]
pub fn vert_eq(u: Point, v: Point, tolerance: f32) -> bool {
    (u.x - v.x).abs() <= tolerance && (u.y - v.y).abs() <= tolerance
}

#[inline]
pub fn float_eq(u: f32, v: f32, tolerance: f32) -> bool {
    u - tolerance <= v && v <= u + tolerance
}

/// Maps the angle between `norm` and the x axis to `[-2, 2]`.
///
/// `norm.x` is expected to be positive (edges are oriented in sweep order).
#[inline]
pub fn edge_direction(norm: Vector) -> f32 {
    if norm.y >= 0.0 {
        if norm.x > norm.y {
            norm.y / norm.x
        } else {
            2.0 - norm.x / norm.y
        }
    } else if norm.x > -norm.y {
        norm.y / norm.x
    } else {
        -2.0 - norm.x / norm.y
    }
}

/// Maps the full angle between `norm` and the x axis to `[0, 8)`.
///
/// NaN for a zero vector.
#[inline]
pub fn edge_angle(norm: Vector) -> f32 {
    if norm.x >= 0.0 && norm.y >= 0.0 {
        // [0, 2]
        if norm.x > norm.y {
            norm.y / norm.x
        } else {
            2.0 - norm.x / norm.y
        }
    } else if norm.x < 0.0 && norm.y >= 0.0 {
        // (2, 4]
        if -norm.x > norm.y {
            4.0 + norm.y / norm.x
        } else {
            2.0 - norm.x / norm.y
        }
    } else if norm.x < 0.0 && norm.y < 0.0 {
        // (4, 6)
        if norm.x < norm.y {
            4.0 + norm.y / norm.x
        } else {
            6.0 - norm.x / norm.y
        }
    } else {
        // [6, 8)
        if norm.x > -norm.y {
            8.0 + norm.y / norm.x
        } else {
            6.0 - norm.x / norm.y
        }
    }
}

/// Counter-clockwise rotation from `from` to `to`, in the `[0, 8]` units of [`edge_angle`].
///
/// Identical vectors give a full turn (8). NaN if either angle is undefined.
pub fn edge_angle_between(from: Vector, to: Vector) -> f32 {
    if from == to {
        return 8.0;
    }

    let from_a = edge_angle(from);
    let to_a = edge_angle(to);

    if from_a.is_nan() || to_a.is_nan() {
        return f32::NAN;
    }

    if from_a <= to_a {
        to_a - from_a
    } else {
        8.0 - (from_a - to_a)
    }
}

/// Whether two edges with a rotation of `angle` between them are (almost) overlapping.
#[inline]
pub fn angle_below_tolerance(angle: f32, tolerance: f32) -> bool {
    angle < tolerance || 8.0 - angle < tolerance
}

/// Whether `u`, `v`, `w` make a counter-clockwise turn.
#[inline]
pub fn is_ccw(u: Point, v: Point, w: Point) -> bool {
    u.x * (v.y - w.y) + v.x * (w.y - u.y) + w.x * (u.y - v.y) > 0.0
}

#[test]
fn sweep_order() {
    assert!(vert_leq(point(0.0, 5.0), point(1.0, 0.0)));
    assert!(vert_leq(point(1.0, 0.0), point(1.0, 1.0)));
    assert!(vert_leq(point(1.0, 1.0), point(1.0, 1.0)));
    assert!(!vert_leq(point(1.0, 2.0), point(1.0, 1.0)));
    assert!(!vert_leq(point(2.0, 0.0), point(1.0, 10.0)));
}

#[test]
fn fuzzy_equality() {
    let p = point(10.0, 10.0);
    assert!(vert_eq(p, point(10.0, 10.0), MATH_TOLERANCE));
    assert!(vert_eq(p, point(10.0 + f32::EPSILON, 10.0), MATH_TOLERANCE));
    assert!(!vert_eq(p, point(10.001, 10.0), MATH_TOLERANCE));
    assert!(float_eq(1.0, 1.0 + MATH_TOLERANCE, MATH_TOLERANCE));
    assert!(!float_eq(1.0, 1.1, MATH_TOLERANCE));
}

#[test]
fn directions_are_monotonic() {
    let dirs = [
        vector(1.0, -100.0),
        vector(1.0, -1.0),
        vector(1.0, -0.5),
        vector(1.0, 0.0),
        vector(1.0, 0.5),
        vector(1.0, 1.0),
        vector(1.0, 100.0),
    ];

    for pair in dirs.windows(2) {
        assert!(edge_direction(pair[0]) < edge_direction(pair[1]), "{:?}", pair);
    }

    assert_eq!(edge_direction(vector(1.0, 0.0)), 0.0);
    assert_eq!(edge_direction(vector(1.0, 1.0)), 1.0);
    assert_eq!(edge_direction(vector(0.0, 1.0)), 2.0);
    assert_eq!(edge_direction(vector(0.0, -1.0)), -2.0);
}

#[test]
fn angles_cover_the_full_turn() {
    let angles = [
        vector(1.0, 0.0),
        vector(1.0, 1.0),
        vector(0.0, 1.0),
        vector(-1.0, 1.0),
        vector(-1.0, 0.0),
        vector(-1.0, -1.0),
        vector(0.0, -1.0),
        vector(1.0, -1.0),
    ];

    for (i, v) in angles.iter().enumerate() {
        assert_eq!(edge_angle(*v), i as f32, "{:?}", v);
    }

    assert!(edge_angle(vector(0.0, 0.0)).is_nan());
}

#[test]
fn angle_between() {
    let x = vector(1.0, 0.0);
    let y = vector(0.0, 1.0);
    assert_eq!(edge_angle_between(x, y), 2.0);
    assert_eq!(edge_angle_between(y, x), 6.0);
    assert_eq!(edge_angle_between(x, x), 8.0);
    assert!(edge_angle_between(x, vector(0.0, 0.0)).is_nan());

    assert!(angle_below_tolerance(8.0 - 1e-7, MATH_TOLERANCE));
    assert!(angle_below_tolerance(1e-7, MATH_TOLERANCE));
    assert!(!angle_below_tolerance(1.0, MATH_TOLERANCE));
}

#[test]
fn orientation() {
    assert!(is_ccw(point(0.0, 0.0), point(1.0, 0.0), point(1.0, 1.0)));
    assert!(!is_ccw(point(0.0, 0.0), point(1.0, 1.0), point(1.0, 0.0)));
    assert!(!is_ccw(point(0.0, 0.0), point(1.0, 0.0), point(2.0, 0.0)));
}
