use crate::scalar::Scalar;
use crate::{vector, Point, Vector};

/// Local geometry of a polyline vertex, between an incoming and an outgoing edge.
///
/// Used to offset polylines: a vertex displaced by `bisector * miter_length * d` ends up
/// at distance `d` from both adjacent edges.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct VertexNormal<S> {
    /// Cross product of the normalized outgoing and incoming directions (seen from the
    /// vertex). Its sign tells on which side the polyline turns, zero means the edges
    /// are collinear.
    pub cross: S,
    /// `1 / sin(θ / 2)` where `θ` is the angle between the two edges. One for a straight
    /// line, growing without bound as the turn gets sharper.
    pub miter_length: S,
    /// Unit vector splitting the angle between the two edges.
    ///
    /// For collinear edges this is the left perpendicular of the outgoing edge.
    pub bisector: Vector<S>,
}

impl<S: Scalar> VertexNormal<S> {
    /// Computes the normal at `vertex`, between `prev -> vertex` and `vertex -> next`.
    pub fn new(prev: Point<S>, vertex: Point<S>, next: Point<S>) -> Self {
        let n0 = (prev - vertex).normalize();
        let n1 = (next - vertex).normalize();

        let cross = n1.x * n0.y - n1.y * n0.x;
        if cross == S::ZERO {
            return VertexNormal {
                cross: S::ZERO,
                miter_length: S::ONE,
                bisector: vector(-n1.y, n1.x),
            };
        }

        let dot = n0.dot(n1);

        VertexNormal {
            cross,
            miter_length: S::ONE / (S::HALF - S::HALF * dot).sqrt(),
            bisector: (n0 + n1).normalize(),
        }
    }
}

#[cfg(test)]
use crate::point;

#[test]
fn right_angle() {
    let n = VertexNormal::new(point(0.0f32, 0.0), point(1.0, 0.0), point(1.0, 1.0));

    assert_eq!(n.cross, 1.0);
    assert!((n.miter_length - core::f32::consts::SQRT_2).abs() < 1e-5);
    assert!((n.bisector - vector(-0.5f32.sqrt(), 0.5f32.sqrt())).length() < 1e-5);

    // Turning the other way flips the sign of the cross product.
    let n = VertexNormal::new(point(0.0f32, 0.0), point(1.0, 0.0), point(1.0, -1.0));
    assert_eq!(n.cross, -1.0);
    assert!((n.bisector - vector(-0.5f32.sqrt(), -(0.5f32.sqrt()))).length() < 1e-5);
}

#[test]
fn collinear() {
    let n = VertexNormal::new(point(0.0f32, 0.0), point(1.0, 0.0), point(3.0, 0.0));

    assert_eq!(n.cross, 0.0);
    assert_eq!(n.miter_length, 1.0);
    assert_eq!(n.bisector, vector(0.0, 1.0));
}

#[test]
fn sharp_turn() {
    let n = VertexNormal::new(point(0.0f32, 0.0), point(10.0, 0.0), point(0.0, 1.0));

    assert!(n.cross > 0.0);
    // A sharp turn gives a long miter.
    assert!(n.miter_length > 10.0);
}
