//! Elliptic arcs.

use crate::flatten::FLATTENING_STACK_SIZE;
use crate::scalar::Scalar;
use crate::{point, vector, Angle, FlatteningParams, Point, Vector};
use arrayvec::ArrayVec;

/// Flag parameters for arcs as described by the SVG specification.
///
/// For most situations using the SVG arc notation, there are four different arcs
/// (two different ellipses, each with two different arc sweeps) that satisfy the
/// arc parameters. The `large_arc` and `sweep` flags indicate which one of the
/// four arcs are drawn.
///
/// See more examples in the [SVG specification](https://svgwg.org/specs/paths/)
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct ArcFlags {
    /// Of the four candidate arc sweeps, two will represent an arc sweep of greater
    /// than or equal to 180 degrees (the "large-arc"), and two will represent an arc
    /// sweep of less than or equal to 180 degrees (the "small arc"). If `large_arc`
    /// is `true`, then one of the two larger arc sweeps will be chosen; otherwise, if
    /// `large_arc` is `false`, one of the smaller arc sweeps will be chosen.
    pub large_arc: bool,
    /// If `sweep` is `true`, then the arc will be drawn in a "positive-angle" direction
    /// (the angle increases as the arc is drawn, in a y-down coordinate system).
    pub sweep: bool,
}

/// An elliptic arc curve segment using the SVG's end-point notation.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct SvgArc<S> {
    pub from: Point<S>,
    pub to: Point<S>,
    pub radii: Vector<S>,
    pub x_rotation: Angle<S>,
    pub flags: ArcFlags,
}

/// Center parameterization of an arc, with the sign conventions of the
/// sampling function below.
#[derive(Copy, Clone, Debug)]
struct CenterArc<S> {
    center: Point<S>,
    radii: Vector<S>,
    sin_phi: S,
    cos_phi: S,
    start_angle: S,
    // Signed.
    sweep_angle: S,
}

impl<S: Scalar> CenterArc<S> {
    fn sample(&self, angle: S) -> Point<S> {
        let (sin, cos) = angle.sin_cos();
        let sx = self.radii.x * cos;
        let sy = self.radii.y * sin;

        point(
            self.center.x - (sx * self.cos_phi - sy * self.sin_phi),
            self.center.y + (sx * self.sin_phi + sy * self.cos_phi),
        )
    }
}

enum ArcWork<S> {
    Piece {
        start_angle: S,
        sweep_angle: S,
        from: Point<S>,
        to: Point<S>,
        depth: u32,
    },
    Point(Point<S>),
}

fn angle_between<S: Scalar>(a: Vector<S>, b: Vector<S>) -> S {
    a.cross(b).atan2(a.dot(b))
}

impl<S: Scalar> SvgArc<S> {
    /// Returns `true` if the arc degenerates into a straight line segment.
    ///
    /// This happens when either radius is zero, or when both endpoints coincide.
    pub fn is_straight_line(&self) -> bool {
        self.radii.x.abs() <= S::EPSILON || self.radii.y.abs() <= S::EPSILON || self.from == self.to
    }

    fn to_center_arc(&self) -> Option<CenterArc<S>> {
        if self.is_straight_line() {
            return None;
        }

        let mut rx = self.radii.x.abs();
        let mut ry = self.radii.y.abs();
        let (sin_phi, cos_phi) = self.x_rotation.radians.sin_cos();

        let half = (self.from - self.to) * S::HALF;
        let x1 = cos_phi * half.x + sin_phi * half.y;
        let y1 = -sin_phi * half.x + cos_phi * half.y;

        // Scale the radii up when they are too small to join both endpoints.
        let lambda = (x1 * x1) / (rx * rx) + (y1 * y1) / (ry * ry);
        if lambda > S::ONE {
            let s = lambda.sqrt();
            rx = rx * s;
            ry = ry * s;
        }

        let rx_y1 = rx * rx * y1 * y1;
        let ry_x1 = ry * ry * x1 * x1;
        let c = ((rx * rx * ry * ry - rx_y1 - ry_x1) / (rx_y1 + ry_x1))
            .max(S::ZERO)
            .sqrt();

        let sign = if self.flags.large_arc != self.flags.sweep {
            S::ONE
        } else {
            -S::ONE
        };
        let cx = sign * c * rx * y1 / ry;
        let cy = -sign * c * ry * x1 / rx;

        let center = point(
            cx * cos_phi - cy * sin_phi + (self.from.x + self.to.x) * S::HALF,
            cx * sin_phi + cy * cos_phi + (self.from.y + self.to.y) * S::HALF,
        );

        let start_angle = angle_between(
            vector(S::ONE, S::ZERO),
            vector(-(x1 - cx) / rx, (y1 - cy) / ry),
        );
        let sweep = angle_between(
            vector((x1 - cx) / rx, (y1 - cy) / ry),
            vector((-x1 - cx) / rx, (-y1 - cy) / ry),
        )
        .abs();

        let full = S::PI() * S::TWO;
        let sweep_angle = if self.flags.large_arc {
            sweep.max(full - sweep)
        } else {
            sweep.min(full - sweep)
        };

        Some(CenterArc {
            center,
            radii: vector(rx, ry),
            sin_phi,
            cos_phi,
            start_angle,
            sweep_angle: if self.flags.sweep { -sweep_angle } else { sweep_angle },
        })
    }

    /// Approximates the arc with a sequence of points, passing each point to the callback.
    ///
    /// Only the points between `from` and `to` are emitted. Nothing is emitted when the
    /// arc is a straight line.
    ///
    /// Large arcs are first cut into pieces whose chord stays within the tolerance of
    /// a circle of the average radius, then each piece is subdivided adaptively.
    pub fn for_each_flattened_with(
        &self,
        params: &FlatteningParams<S>,
        callback: &mut dyn FnMut(Point<S>),
    ) {
        let arc = match self.to_center_arc() {
            Some(arc) => arc,
            None => {
                return;
            }
        };

        let r_avg = (arc.radii.x + arc.radii.y) * S::HALF;
        let err = (r_avg - params.distance_error.sqrt()) / r_avg;

        if err > S::FRAC_1_SQRT_2() * S::HALF - S::EPSILON {
            let pieces = (arc.sweep_angle.abs() / (err.acos() * S::TWO)).ceil() + S::ONE;
            let count = pieces.to_u32().unwrap_or(1).max(1);
            let piece_angle = arc.sweep_angle / pieces;

            let mut start_angle = arc.start_angle;
            let mut from = self.from;
            for i in 0..count {
                let last = i + 1 == count;
                let to = if last {
                    self.to
                } else {
                    arc.sample(start_angle + piece_angle)
                };

                flatten_piece(&arc, params, start_angle, piece_angle, from, to, callback);
                if !last {
                    callback(to);
                }

                start_angle = start_angle + piece_angle;
                from = to;
            }
        } else {
            flatten_piece(
                &arc,
                params,
                arc.start_angle,
                arc.sweep_angle,
                self.from,
                self.to,
                callback,
            );
        }
    }
}

fn flatten_piece<S: Scalar>(
    arc: &CenterArc<S>,
    params: &FlatteningParams<S>,
    start_angle: S,
    sweep_angle: S,
    from: Point<S>,
    to: Point<S>,
    callback: &mut dyn FnMut(Point<S>),
) {
    let max_depth = params.depth_limit();
    let mut stack: ArrayVec<ArcWork<S>, FLATTENING_STACK_SIZE> = ArrayVec::new();
    stack.push(ArcWork::Piece {
        start_angle,
        sweep_angle,
        from,
        to,
        depth: 0,
    });

    while let Some(work) = stack.pop() {
        match work {
            ArcWork::Point(p) => callback(p),
            ArcWork::Piece {
                start_angle,
                sweep_angle,
                from,
                to,
                depth,
            } => {
                if depth >= max_depth {
                    continue;
                }

                let half_sweep = sweep_angle * S::HALF;
                let mid = arc.sample(start_angle + half_sweep);
                let chord_mid = from.lerp(to, S::HALF);

                if (mid - chord_mid).square_length() < params.distance_error
                    && (!params.has_angular_error() || sweep_angle.abs() < params.angular_error)
                {
                    callback(mid);
                    continue;
                }

                stack.push(ArcWork::Piece {
                    start_angle: start_angle + half_sweep,
                    sweep_angle: half_sweep,
                    from: mid,
                    to,
                    depth: depth + 1,
                });
                stack.push(ArcWork::Point(mid));
                stack.push(ArcWork::Piece {
                    start_angle,
                    sweep_angle: half_sweep,
                    from,
                    to: mid,
                    depth: depth + 1,
                });
            }
        }
    }
}

#[cfg(test)]
fn flattened(arc: &SvgArc<f32>, params: &FlatteningParams<f32>) -> std::vec::Vec<Point<f32>> {
    let mut points = std::vec::Vec::new();
    arc.for_each_flattened_with(params, &mut |p| points.push(p));
    points
}

#[test]
fn half_circle_points_are_on_the_circle() {
    let arc = SvgArc {
        from: point(0.0f32, 0.0),
        to: point(10.0, 0.0),
        radii: vector(5.0, 5.0),
        x_rotation: Angle::radians(0.0),
        flags: ArcFlags {
            large_arc: false,
            sweep: true,
        },
    };

    let points = flattened(&arc, &FlatteningParams::with_tolerance(0.1));
    assert!(points.len() > 4);

    for p in &points {
        let r = (*p - point(5.0, 0.0)).length();
        assert!((r - 5.0).abs() < 1e-3, "{:?} at distance {}", p, r);
        // With the sweep flag set, the arc goes through the negative y side.
        assert!(p.y < 0.0, "{:?}", p);
    }

    let flipped = SvgArc {
        flags: ArcFlags {
            large_arc: false,
            sweep: false,
        },
        ..arc
    };
    for p in &flattened(&flipped, &FlatteningParams::with_tolerance(0.1)) {
        assert!(p.y > 0.0, "{:?}", p);
    }
}

#[test]
fn points_follow_the_sweep() {
    let arc = SvgArc {
        from: point(0.0f32, 0.0),
        to: point(10.0, 0.0),
        radii: vector(5.0, 5.0),
        x_rotation: Angle::radians(0.0),
        flags: ArcFlags {
            large_arc: false,
            sweep: true,
        },
    };

    let points = flattened(&arc, &FlatteningParams::for_stroke(0.5, 1.0));
    let mut prev_x = 0.0;
    for p in &points {
        assert!(p.x > prev_x, "{:?}", points);
        prev_x = p.x;
    }
}

#[test]
fn small_radii_are_scaled_up() {
    let arc = SvgArc {
        from: point(0.0f32, 0.0),
        to: point(10.0, 0.0),
        radii: vector(1.0, 1.0),
        x_rotation: Angle::radians(0.0),
        flags: ArcFlags::default(),
    };

    for p in &flattened(&arc, &FlatteningParams::with_tolerance(0.1)) {
        let r = (*p - point(5.0, 0.0)).length();
        assert!((r - 5.0).abs() < 1e-3, "{:?} at distance {}", p, r);
    }
}

#[test]
fn degenerate_arcs() {
    let arc = SvgArc {
        from: point(0.0f32, 0.0),
        to: point(10.0, 0.0),
        radii: vector(0.0, 5.0),
        x_rotation: Angle::radians(0.0),
        flags: ArcFlags::default(),
    };
    assert!(arc.is_straight_line());
    assert!(flattened(&arc, &FlatteningParams::with_tolerance(0.1)).is_empty());

    let closed = SvgArc {
        to: point(0.0, 0.0),
        radii: vector(5.0, 5.0),
        ..arc
    };
    assert!(closed.is_straight_line());
}
