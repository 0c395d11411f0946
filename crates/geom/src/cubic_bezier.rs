use crate::flatten::{FlatteningStep, FLATTENING_STACK_SIZE};
use crate::scalar::Scalar;
use crate::{distance_sq, turn_angle, FlatteningParams, Point};
use arrayvec::ArrayVec;

/// A 2d curve segment defined by four points: the beginning of the segment, two control
/// points and the end of the segment.
///
/// The curve is defined by equation:
/// ```∀ t ∈ [0..1],  P(t) = (1 - t)³ * from + 3 * (1 - t)² * t * ctrl1 + 3 * t² * (1 - t) * ctrl2 + t³ * to```
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct CubicBezierSegment<S> {
    pub from: Point<S>,
    pub ctrl1: Point<S>,
    pub ctrl2: Point<S>,
    pub to: Point<S>,
}

impl<S: Scalar> CubicBezierSegment<S> {
    /// Sample the curve at t (expecting t between 0 and 1).
    pub fn sample(&self, t: S) -> Point<S> {
        let t2 = t * t;
        let t3 = t2 * t;
        let one_t = S::ONE - t;
        let one_t2 = one_t * one_t;
        let one_t3 = one_t2 * one_t;

        let three = S::value(3.0);

        self.from * one_t3
            + self.ctrl1.to_vector() * three * one_t2 * t
            + self.ctrl2.to_vector() * three * one_t * t2
            + self.to.to_vector() * t3
    }

    /// Split this curve into two sub-curves.
    pub fn split(&self, t: S) -> (CubicBezierSegment<S>, CubicBezierSegment<S>) {
        let ctrl1a = self.from + (self.ctrl1 - self.from) * t;
        let ctrl2a = self.ctrl1 + (self.ctrl2 - self.ctrl1) * t;
        let ctrl1aa = ctrl1a + (ctrl2a - ctrl1a) * t;
        let ctrl3a = self.ctrl2 + (self.to - self.ctrl2) * t;
        let ctrl2aa = ctrl2a + (ctrl3a - ctrl2a) * t;
        let ctrl1aaa = ctrl1aa + (ctrl2aa - ctrl1aa) * t;

        (
            CubicBezierSegment {
                from: self.from,
                ctrl1: ctrl1a,
                ctrl2: ctrl1aa,
                to: ctrl1aaa,
            },
            CubicBezierSegment {
                from: ctrl1aaa,
                ctrl1: ctrl2aa,
                ctrl2: ctrl3a,
                to: self.to,
            },
        )
    }

    /// Approximates the curve with a sequence of points, passing each point to the callback.
    ///
    /// Only the points between `from` and `to` are emitted, in curve order.
    pub fn for_each_flattened_with(
        &self,
        params: &FlatteningParams<S>,
        callback: &mut dyn FnMut(Point<S>),
    ) {
        let max_depth = params.depth_limit();
        let mut stack: ArrayVec<(Self, u32), FLATTENING_STACK_SIZE> = ArrayVec::new();
        stack.push((*self, 0));

        while let Some((curve, depth)) = stack.pop() {
            if depth >= max_depth {
                continue;
            }

            match curve.flattening_step(params) {
                FlatteningStep::Point(p) => callback(p),
                FlatteningStep::Points(a, b) => {
                    callback(a);
                    callback(b);
                }
                FlatteningStep::Skip => {}
                FlatteningStep::Split => {
                    let (before, after) = curve.split(S::HALF);
                    stack.push((after, depth + 1));
                    stack.push((before, depth + 1));
                }
            }
        }
    }

    fn flattening_step(&self, params: &FlatteningParams<S>) -> FlatteningStep<Point<S>> {
        let (p0, p1, p2, p3) = (self.from, self.ctrl1, self.ctrl2, self.to);
        let chord = p3 - p0;
        let chord_sq = chord.square_length();
        let ctrl_mid = p1.lerp(p2, S::HALF);

        // Distance factors of each control point to the chord.
        let d1 = ((p1.x - p3.x) * chord.y - (p1.y - p3.y) * chord.x).abs() * S::TWO;
        let d2 = ((p2.x - p3.x) * chord.y - (p2.y - p3.y) * chord.x).abs() * S::TWO;

        match (d1 > S::EPSILON, d2 > S::EPSILON) {
            (true, true) => {
                if (d1 + d2) * (d1 + d2) / chord_sq <= params.distance_error {
                    if !params.has_angular_error() {
                        return FlatteningStep::Point(ctrl_mid);
                    }

                    let da = turn_angle(p1 - p0, p2 - p1) + turn_angle(p2 - p1, p3 - p2);
                    if da < params.angular_error {
                        return FlatteningStep::Point(ctrl_mid);
                    }
                }
            }
            (true, false) => {
                if d1 * d1 / chord_sq <= params.distance_error {
                    if !params.has_angular_error() {
                        return FlatteningStep::Point(ctrl_mid);
                    }

                    if turn_angle(p1 - p0, p2 - p1) < params.angular_error {
                        return FlatteningStep::Points(p1, p2);
                    }
                }
            }
            (false, true) => {
                if d2 * d2 / chord_sq <= params.distance_error {
                    if !params.has_angular_error() {
                        return FlatteningStep::Point(ctrl_mid);
                    }

                    if turn_angle(p2 - p1, p3 - p2) < params.angular_error {
                        return FlatteningStep::Points(p1, p2);
                    }
                }
            }
            (false, false) => {
                // All four points are collinear.
                let (sd1, sd2) = if chord_sq == S::ZERO {
                    (distance_sq(p0, p1), distance_sq(p3, p2))
                } else {
                    let t1 = (p1 - p0).dot(chord) / chord_sq;
                    let t2 = (p2 - p0).dot(chord) / chord_sq;
                    if t1 > S::ZERO && t1 < S::ONE && t2 > S::ZERO && t2 < S::ONE {
                        return FlatteningStep::Skip;
                    }

                    let chord_distance_sq = |p: Point<S>, t: S| {
                        if t <= S::ZERO {
                            distance_sq(p, p0)
                        } else if t >= S::ONE {
                            distance_sq(p, p3)
                        } else {
                            distance_sq(p, p0 + chord * t)
                        }
                    };

                    (chord_distance_sq(p1, t1), chord_distance_sq(p2, t2))
                };

                if sd1 > sd2 {
                    if sd1 < params.distance_error {
                        return FlatteningStep::Point(p1);
                    }
                } else if sd2 < params.distance_error {
                    return FlatteningStep::Point(p2);
                }
            }
        }

        FlatteningStep::Split
    }
}

#[cfg(test)]
use crate::point;

#[test]
fn flattened_points_stay_in_the_hull() {
    let curve = CubicBezierSegment {
        from: point(0.0f32, 0.0),
        ctrl1: point(0.0, 10.0),
        ctrl2: point(10.0, 10.0),
        to: point(10.0, 0.0),
    };

    let mut points = std::vec::Vec::new();
    curve.for_each_flattened_with(&FlatteningParams::with_tolerance(0.05), &mut |p| {
        points.push(p)
    });

    assert!(points.len() > 8);
    let mut prev_x = -1.0;
    for p in &points {
        assert!(p.x >= prev_x, "{:?}", points);
        assert!(p.x >= 0.0 && p.x <= 10.0);
        assert!(p.y >= 0.0 && p.y <= 7.5 + 1e-4);
        prev_x = p.x;
    }
}

#[test]
fn straight_cubic() {
    let curve = CubicBezierSegment {
        from: point(0.0f32, 0.0),
        ctrl1: point(2.0, 0.0),
        ctrl2: point(7.0, 0.0),
        to: point(10.0, 0.0),
    };

    let mut count = 0;
    curve.for_each_flattened_with(&FlatteningParams::with_tolerance(0.1), &mut |_| count += 1);
    assert_eq!(count, 0);
}

#[test]
fn stroke_params_emit_more_points() {
    let curve = CubicBezierSegment {
        from: point(0.0f32, 0.0),
        ctrl1: point(0.0, 40.0),
        ctrl2: point(40.0, 40.0),
        to: point(40.0, 0.0),
    };

    let mut fill = 0;
    let mut stroke = 0;
    curve.for_each_flattened_with(&FlatteningParams::with_tolerance(1.0), &mut |_| fill += 1);
    curve.for_each_flattened_with(&FlatteningParams::for_stroke(1.0, 1.0), &mut |_| {
        stroke += 1
    });

    assert!(fill > 0);
    assert!(stroke >= fill);
}
