#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]
#![allow(clippy::excessive_precision)]
#![allow(clippy::many_single_char_names)]
#![no_std]

//! Simple 2D geometric primitives on top of euclid.
//!
//! This crate is reexported in [tessel](../tessel/index.html).
//!
//! # Overview.
//!
//! This crate implements the maths needed to turn curves into polylines before they
//! are fed to the tessellator:
//!
//! - quadratic and cubic bézier curves,
//! - elliptic arcs in SVG notation,
//! - the normal, miter length and bisector at a polyline vertex.
//!
//! # Flattening
//!
//! Flattening is the action of approximating a curve with a succession of line segments.
//!
//! The curves in this crate are flattened by adaptive subdivision: a curve is split
//! in two halves until each half is flat enough to be replaced by a single point.
//! The thresholds are described by [`FlatteningParams`]:
//!
//! - `distance_error` is the squared distance tolerated between the curve and its
//!   approximation,
//! - `angular_error` optionally bounds the turn angle of each approximated piece, which
//!   matters when the polyline is later offset (strokes),
//! - `max_depth` bounds the subdivision.
//!
//! Flattening never recurses: the pending sub-curves are kept on a fixed-capacity
//! stack, so the subdivision depth is deterministic regardless of the input.
//!
//! The flattening callbacks receive the intermediate points only. Neither the start
//! nor the end point of the curve is emitted, the caller already knows them.

#[cfg(any(test, feature = "std"))]
extern crate std;

// Reexport dependencies.
pub use arrayvec;
pub use euclid;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

pub mod arc;
pub mod cubic_bezier;
mod flatten;
mod normal;
pub mod quadratic_bezier;

#[doc(inline)]
pub use crate::arc::{ArcFlags, SvgArc};
#[doc(inline)]
pub use crate::cubic_bezier::CubicBezierSegment;
pub use crate::flatten::FlatteningParams;
pub use crate::normal::VertexNormal;
#[doc(inline)]
pub use crate::quadratic_bezier::QuadraticBezierSegment;

pub use crate::scalar::Scalar;

mod scalar {
    pub(crate) use num_traits::{Float, FloatConst, NumCast};

    use core::fmt::{Debug, Display};
    use core::ops::{AddAssign, DivAssign, MulAssign, SubAssign};

    pub trait Scalar:
        Float
        + NumCast
        + FloatConst
        + Sized
        + Display
        + Debug
        + AddAssign
        + SubAssign
        + MulAssign
        + DivAssign
    {
        const HALF: Self;
        const ZERO: Self;
        const ONE: Self;
        const TWO: Self;

        /// Machine epsilon, used to detect degenerate (collinear) control points
        /// while flattening.
        const EPSILON: Self;

        fn value(v: f32) -> Self;
    }

    impl Scalar for f32 {
        const HALF: Self = 0.5;
        const ZERO: Self = 0.0;
        const ONE: Self = 1.0;
        const TWO: Self = 2.0;

        const EPSILON: Self = f32::EPSILON;

        #[inline]
        fn value(v: f32) -> Self {
            v
        }
    }

    impl Scalar for f64 {
        const HALF: Self = 0.5;
        const ZERO: Self = 0.0;
        const ONE: Self = 1.0;
        const TWO: Self = 2.0;

        const EPSILON: Self = f64::EPSILON;

        #[inline]
        fn value(v: f32) -> Self {
            v as f64
        }
    }
}

/// Alias for `euclid::default::Point2D`.
pub use euclid::default::Point2D as Point;

/// Alias for `euclid::default::Vector2D`.
pub use euclid::default::Vector2D as Vector;

/// Alias for `euclid::default::Box2D`
pub use euclid::default::Box2D;

/// An angle in radians.
pub use euclid::Angle;

/// Shorthand for `Vector::new(x, y)`.
#[inline]
pub fn vector<S>(x: S, y: S) -> Vector<S> {
    Vector::new(x, y)
}

/// Shorthand for `Point::new(x, y)`.
#[inline]
pub fn point<S>(x: S, y: S) -> Point<S> {
    Point::new(x, y)
}

/// Squared distance between two points.
#[inline]
pub(crate) fn distance_sq<S: Scalar>(a: Point<S>, b: Point<S>) -> S {
    (b - a).square_length()
}

/// Absolute difference of the directions of two vectors, folded into `[0, PI]`.
#[inline]
pub(crate) fn turn_angle<S: Scalar>(a: Vector<S>, b: Vector<S>) -> S {
    let da = (b.y.atan2(b.x) - a.y.atan2(a.x)).abs();
    da.min(S::PI() * S::TWO - da)
}
