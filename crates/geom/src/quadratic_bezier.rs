use crate::flatten::{FlatteningStep, FLATTENING_STACK_SIZE};
use crate::scalar::Scalar;
use crate::{distance_sq, turn_angle, FlatteningParams, Point};
use arrayvec::ArrayVec;

/// A 2d curve segment defined by three points: the beginning of the segment, a control
/// point and the end of the segment.
///
/// The curve is defined by equation:
/// ```∀ t ∈ [0..1],  P(t) = (1 - t)² * from + 2 * (1 - t) * t * ctrl + t² * to```
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct QuadraticBezierSegment<S> {
    pub from: Point<S>,
    pub ctrl: Point<S>,
    pub to: Point<S>,
}

impl<S: Scalar> QuadraticBezierSegment<S> {
    /// Sample the curve at t (expecting t between 0 and 1).
    pub fn sample(&self, t: S) -> Point<S> {
        let t2 = t * t;
        let one_t = S::ONE - t;
        let one_t2 = one_t * one_t;

        self.from * one_t2 + self.ctrl.to_vector() * S::TWO * one_t * t + self.to.to_vector() * t2
    }

    /// Split this curve into two sub-curves.
    pub fn split(&self, t: S) -> (QuadraticBezierSegment<S>, QuadraticBezierSegment<S>) {
        let split_point = self.sample(t);

        (
            QuadraticBezierSegment {
                from: self.from,
                ctrl: self.from.lerp(self.ctrl, t),
                to: split_point,
            },
            QuadraticBezierSegment {
                from: split_point,
                ctrl: self.ctrl.lerp(self.to, t),
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
        let (p0, p1, p2) = (self.from, self.ctrl, self.to);
        let chord = p2 - p0;

        // Twice the area of the control triangle.
        let d = ((p1.x - p2.x) * chord.y - (p1.y - p2.y) * chord.x).abs() * S::TWO;

        if d > S::EPSILON {
            if d * d / chord.square_length() <= params.distance_error {
                let approximation = p1.lerp(self.sample(S::HALF), S::HALF);
                if !params.has_angular_error()
                    || turn_angle(p1 - p0, p2 - p1) < params.angular_error
                {
                    return FlatteningStep::Point(approximation);
                }
            }

            return FlatteningStep::Split;
        }

        // Collinear control point.
        let chord_sq = chord.square_length();
        let sd = if chord_sq == S::ZERO {
            distance_sq(p0, p1)
        } else {
            let t = (p1 - p0).dot(chord) / chord_sq;
            if t > S::ZERO && t < S::ONE {
                return FlatteningStep::Skip;
            }

            if t <= S::ZERO {
                distance_sq(p1, p0)
            } else {
                distance_sq(p1, p2)
            }
        };

        if sd < params.distance_error {
            return FlatteningStep::Point(p1);
        }

        FlatteningStep::Split
    }
}

#[cfg(test)]
fn flattened(curve: &QuadraticBezierSegment<f32>, tolerance: f32) -> std::vec::Vec<Point<f32>> {
    let mut points = std::vec::Vec::new();
    curve.for_each_flattened_with(&FlatteningParams::with_tolerance(tolerance), &mut |p| {
        points.push(p)
    });

    points
}

#[test]
fn flattening_follows_the_curve() {
    use crate::point;

    let curve = QuadraticBezierSegment {
        from: point(0.0, 0.0),
        ctrl: point(5.0, 10.0),
        to: point(10.0, 0.0),
    };

    let points = flattened(&curve, 0.1);
    assert!(points.len() > 4);

    let mut prev_x = 0.0;
    for p in &points {
        assert!(p.x > prev_x, "{:?}", points);
        assert!(p.y > 0.0 && p.y <= 5.0 + 1e-5, "{:?}", p);
        prev_x = p.x;
    }
    assert!(prev_x < 10.0);
}

#[test]
fn smaller_tolerance_gives_more_points() {
    use crate::point;

    let curve = QuadraticBezierSegment {
        from: point(0.0, 0.0),
        ctrl: point(5.0, 10.0),
        to: point(10.0, 0.0),
    };

    let coarse = flattened(&curve, 1.0);
    let fine = flattened(&curve, 0.01);

    assert!(!coarse.is_empty());
    assert!(fine.len() > coarse.len());
}

#[test]
fn collinear_control_point() {
    use crate::point;

    let between = QuadraticBezierSegment {
        from: point(0.0, 0.0),
        ctrl: point(5.0, 0.0),
        to: point(10.0, 0.0),
    };
    assert!(flattened(&between, 0.1).is_empty());

    // The control point is right before `from`, close enough to be kept as is.
    let overshoot = QuadraticBezierSegment {
        from: point(0.0, 0.0),
        ctrl: point(-0.01, 0.0),
        to: point(10.0, 0.0),
    };
    assert_eq!(flattened(&overshoot, 0.5), std::vec![point(-0.01, 0.0)]);
}

#[test]
fn depth_limit() {
    use crate::point;

    let curve = QuadraticBezierSegment {
        from: point(0.0, 0.0),
        ctrl: point(500.0, 1000.0),
        to: point(1000.0, 0.0),
    };

    let mut count = 0;
    let params = FlatteningParams::with_tolerance(0.000_001f32).with_max_depth(3);
    curve.for_each_flattened_with(&params, &mut |_| count += 1);

    // Nothing is flat enough within three levels of subdivision.
    assert_eq!(count, 0);
}
