#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]
#![allow(clippy::float_cmp)]
#![allow(clippy::too_many_arguments)]
#![no_std]

//! Tessellation of 2D polygons with winding rules and antialiasing boundaries.
//!
//! This crate is reexported in [tessel](https://docs.rs/tessel/).
//!
//! ## Overview
//!
//! The most interesting types and traits of this crate are:
//!
//! * [`Tessellator`](struct.Tessellator.html) - Sweep-line tessellator for arbitrary
//!   (self-intersecting, multi-contour) polygons. Contours are written through
//!   [`Cursor`](struct.Cursor.html)s and the result is produced in two phases,
//!   [`prepare`](struct.Tessellator.html#method.prepare) and
//!   [`write`](struct.Tessellator.html#method.write).
//! * [`LineDrawer`](struct.LineDrawer.html) - Flattens lines, bézier curves and arcs into
//!   the contours of a fill tessellator and of a stroke tessellator.
//! * [`GeometryBuilder`](geometry_builder/trait.GeometryBuilder.html) - The output
//!   interface of the tessellator, see the [geometry_builder module](geometry_builder/index.html).
//!
//! ## The tessellation pipeline
//!
//! Contours are stored in a half-edge mesh as soon as they are pushed. Closing a contour
//! removes its zero-length edges and collinear tails.
//!
//! `prepare` runs the sweep: vertices are visited from left to right, coincident vertices
//! are merged, intersecting edges are split, and diagonals are added so that every
//! region with a winding number accepted by the fill rule becomes monotone. Monotone
//! regions are then cut into triangles.
//!
//! When a boundary inset or offset is set, `prepare` also follows the outline of the
//! filled area and computes a ribbon of quads around it. The outer vertices of the ribbon
//! have a blend value that goes to zero, which is meant to be multiplied with the alpha
//! channel to antialias the edges of the shape. The
//! [`RelocateRule`](enum.RelocateRule.html) decides whether the interior vertices are
//! moved inward to compensate for the ribbon.
//!
//! `write` sends the vertices and triangles computed by `prepare` to a geometry builder.
//! Since `prepare` reports exact counts and accumulates them in a [`Count`](struct.Count.html),
//! the output of several tessellators can be sized up front and written into a single
//! pair of buffers.
//!
//! ## Example
//!
//! ```
//! use tessel_tessellation::{Tessellator, Count, VertexBuffers, simple_builder};
//! use tessel_tessellation::math::{point, Point};
//!
//! let mut tessellator = Tessellator::new();
//! let mut cursor = tessellator.begin_contour(false);
//! for p in &[point(0.0, 0.0), point(10.0, 0.0), point(10.0, 10.0), point(0.0, 10.0)] {
//!     tessellator.push_vertex(&mut cursor, *p).unwrap();
//! }
//! tessellator.close_contour(&mut cursor).unwrap();
//!
//! let mut total = Count::default();
//! let count = tessellator.prepare(&mut total).unwrap();
//! assert_eq!(count.triangles, 2);
//!
//! let mut buffers: VertexBuffers<Point, u16> = VertexBuffers::new();
//! tessellator.write(&mut simple_builder(&mut buffers)).unwrap();
//! assert_eq!(buffers.indices.len(), 6);
//! ```
//!
//! ## Logging
//!
//! In debug builds with the `std` feature, the sweep can trace every event with
//! [`tracing`](https://docs.rs/tracing/) at the debug level (target `tessel::tessellation`).
//! Tracing is enabled per tessellator with `set_logging(true)`, or globally by setting the
//! `TESSEL_FORCE_LOGGING` environment variable. Errors are always reported, regardless of
//! this flag.

extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

pub use tessel_geom as geom;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

#[cfg(all(debug_assertions, feature = "std"))]
macro_rules! tess_log {
    ($obj:ident, $fmt:expr) => (
        if $obj.log {
            tracing::debug!(target: "tessel::tessellation", $fmt);
        }
    );
    ($obj:ident, $fmt:expr, $($arg:tt)*) => (
        if $obj.log {
            tracing::debug!(target: "tessel::tessellation", $fmt, $($arg)*);
        }
    );
}

#[cfg(not(all(debug_assertions, feature = "std")))]
macro_rules! tess_log {
    ($obj:ident, $fmt:expr) => {};
    ($obj:ident, $fmt:expr, $($arg:tt)*) => {};
}

mod boundary;
mod edge_dict;
mod error;
pub mod geometry_builder;
mod line_drawer;
mod math_utils;
mod merge;
mod mesh;
mod monotone;
mod sweep;
mod tessellator;
mod vertex_queue;

#[cfg(test)]
mod fill_tests;

pub mod math {
    //! f32 versions of the geometric types used everywhere.

    use crate::geom::euclid;

    /// Alias for `euclid::default::Point2D<f32>`.
    pub type Point = euclid::default::Point2D<f32>;

    /// Alias for `euclid::default::Vector2D<f32>`.
    pub type Vector = euclid::default::Vector2D<f32>;

    /// Alias for `euclid::default::Box2D<f32>`.
    pub type Box2D = euclid::default::Box2D<f32>;

    /// An angle in radians (f32).
    pub type Angle = euclid::Angle<f32>;

    /// Shorthand for `Vector::new(x, y)`.
    #[inline]
    pub fn vector(x: f32, y: f32) -> Vector {
        Vector::new(x, y)
    }

    /// Shorthand for `Point::new(x, y)`.
    #[inline]
    pub fn point(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }
}

#[doc(inline)]
pub use crate::tessellator::{Cursor, Tessellator};

#[doc(inline)]
pub use crate::line_drawer::LineDrawer;

#[doc(inline)]
pub use crate::geometry_builder::{
    simple_builder, BuffersBuilder, CallbackBuilder, FillVertexConstructor, GeometryBuilder,
    GeometryBuilderError, InvertWinding, NoOutput, Positions, VertexBuffers,
};

#[doc(inline)]
pub use crate::error::*;

use crate::math::{Point, Vector};
use core::ops::{Add, AddAssign, Sub};

/// The fill rule defines how to determine what is inside and what is outside of the shape.
///
/// The winding number of a region is the signed number of contours crossed to reach it
/// from the outside, counter-clockwise contours counting as positive. A region with a
/// winding number of zero is always outside.
///
/// See the SVG specification for the even-odd and non-zero rules.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum FillRule {
    EvenOdd,
    NonZero,
    Positive,
    Negative,
    /// Inside where at least two contours overlap, whatever their orientation.
    AbsGeqTwo,
}

impl FillRule {
    #[inline]
    pub fn is_in(&self, winding: i16) -> bool {
        match *self {
            FillRule::EvenOdd => winding % 2 != 0,
            FillRule::NonZero => winding != 0,
            FillRule::Positive => winding > 0,
            FillRule::Negative => winding < 0,
            FillRule::AbsGeqTwo => winding >= 2 || winding <= -2,
        }
    }

    #[inline]
    pub fn is_out(&self, winding: i16) -> bool {
        !self.is_in(winding)
    }
}

/// How the interior vertices are moved when an antialiasing boundary is generated.
///
/// Moving the vertices inward compensates for the width of the boundary ribbon, so
/// that the shape does not look bolder than it is. Relocating vertices that are shared
/// by several regions can make the ribbon overlap the interior, which shows on
/// self-intersecting shapes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum RelocateRule {
    /// Never move vertices. Half of the inset is added to the offset instead.
    Never,
    /// Only move vertices that were split because the outline touches itself there.
    Auto,
    /// Move every boundary vertex.
    Always,
    /// Move every boundary vertex, then run the sweep again on the moved vertices.
    ///
    /// This is the most expensive option and the one with the best quality.
    Monotonize,
    /// Generate a distance field instead of an antialiasing ribbon: convex corners get
    /// additional fan vertices.
    DistanceField,
}

/// Parameters for the tessellator.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct FillOptions {
    /// Decides which regions are inside.
    ///
    /// Default value: `NonZero`.
    pub fill_rule: FillRule,

    /// Distance the boundary vertices are moved toward the interior of the shape.
    ///
    /// Default value: `0.0`.
    pub boundary_inset: f32,

    /// Width of the antialiasing ribbon outside of the shape.
    ///
    /// Default value: `0.0`.
    pub boundary_offset: f32,

    /// Scale factor of the content, only used to compute how many vertices are added at
    /// convex corners with `RelocateRule::DistanceField`.
    ///
    /// Default value: `1.0`.
    pub content_scale: f32,

    /// See [`RelocateRule`](enum.RelocateRule.html).
    ///
    /// Default value: `Auto`.
    pub relocate_rule: RelocateRule,
}

impl FillOptions {
    pub const DEFAULT_FILL_RULE: FillRule = FillRule::NonZero;
    pub const DEFAULT_BOUNDARY_INSET: f32 = 0.0;
    pub const DEFAULT_BOUNDARY_OFFSET: f32 = 0.0;
    pub const DEFAULT_CONTENT_SCALE: f32 = 1.0;
    pub const DEFAULT_RELOCATE_RULE: RelocateRule = RelocateRule::Auto;

    pub const DEFAULT: Self = FillOptions {
        fill_rule: Self::DEFAULT_FILL_RULE,
        boundary_inset: Self::DEFAULT_BOUNDARY_INSET,
        boundary_offset: Self::DEFAULT_BOUNDARY_OFFSET,
        content_scale: Self::DEFAULT_CONTENT_SCALE,
        relocate_rule: Self::DEFAULT_RELOCATE_RULE,
    };

    #[inline]
    pub fn even_odd() -> Self {
        Self::DEFAULT.with_fill_rule(FillRule::EvenOdd)
    }

    #[inline]
    pub fn non_zero() -> Self {
        Self::DEFAULT
    }

    #[inline]
    pub const fn with_fill_rule(mut self, rule: FillRule) -> Self {
        self.fill_rule = rule;
        self
    }

    /// Sets both the inset and the offset of the boundary.
    #[inline]
    pub const fn with_antialiasing(mut self, value: f32) -> Self {
        self.boundary_inset = value;
        self.boundary_offset = value;
        self
    }

    #[inline]
    pub const fn with_boundary_inset(mut self, inset: f32) -> Self {
        self.boundary_inset = inset;
        self
    }

    #[inline]
    pub const fn with_boundary_offset(mut self, offset: f32) -> Self {
        self.boundary_offset = offset;
        self
    }

    #[inline]
    pub const fn with_content_scale(mut self, scale: f32) -> Self {
        self.content_scale = scale;
        self
    }

    #[inline]
    pub const fn with_relocate_rule(mut self, rule: RelocateRule) -> Self {
        self.relocate_rule = rule;
        self
    }

    /// Whether a boundary ribbon is generated.
    #[inline]
    pub fn has_boundary(&self) -> bool {
        self.boundary_offset > 0.0 || self.boundary_inset > 0.0
    }
}

impl Default for FillOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Parameters for the stroke outlines generated by the [`LineDrawer`](struct.LineDrawer.html).
///
/// Joins are mitered, falling back to a bevel when the miter is too long. Open contours
/// end with a butt cap.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct StrokeOptions {
    /// Line width
    ///
    /// Default value: `StrokeOptions::DEFAULT_LINE_WIDTH`.
    pub line_width: f32,

    /// Ratio between the miter length and the half line width above which joins are
    /// beveled.
    ///
    /// Must be greater than or equal to 1.0.
    /// Default value: `StrokeOptions::DEFAULT_MITER_LIMIT`.
    pub miter_limit: f32,

    /// Approximation error of the curves. Larger values produce more points.
    ///
    /// Default value: `StrokeOptions::DEFAULT_TOLERANCE`.
    pub tolerance: f32,
}

impl StrokeOptions {
    pub const MINIMUM_MITER_LIMIT: f32 = 1.0;
    pub const DEFAULT_MITER_LIMIT: f32 = 4.0;
    pub const DEFAULT_LINE_WIDTH: f32 = 1.0;
    pub const DEFAULT_TOLERANCE: f32 = 1.0;

    pub const DEFAULT: Self = StrokeOptions {
        line_width: Self::DEFAULT_LINE_WIDTH,
        miter_limit: Self::DEFAULT_MITER_LIMIT,
        tolerance: Self::DEFAULT_TOLERANCE,
    };

    #[inline]
    pub fn tolerance(tolerance: f32) -> Self {
        Self::DEFAULT.with_tolerance(tolerance)
    }

    #[inline]
    pub const fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[inline]
    pub const fn with_line_width(mut self, width: f32) -> Self {
        self.line_width = width;
        self
    }

    #[inline]
    pub fn with_miter_limit(mut self, limit: f32) -> Self {
        assert!(limit >= Self::MINIMUM_MITER_LIMIT);
        self.miter_limit = limit;
        self
    }
}

impl Default for StrokeOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

type Index = u32;

/// A vertex offset in the output geometry.
///
/// Vertex ids are caller-space: they include the vertex offset given to `prepare`, so
/// several tessellators can write into the same buffers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct VertexId(pub Index);

impl VertexId {
    pub const INVALID: VertexId = VertexId(u32::MAX);

    pub fn offset(self) -> Index {
        self.0
    }

    pub fn to_usize(self) -> usize {
        self.0 as usize
    }

    pub fn from_usize(v: usize) -> Self {
        VertexId(v as Index)
    }
}

impl Add<u32> for VertexId {
    type Output = Self;
    fn add(self, rhs: u32) -> Self {
        VertexId(self.0 + rhs)
    }
}

impl Sub<u32> for VertexId {
    type Output = Self;
    fn sub(self, rhs: u32) -> Self {
        VertexId(self.0 - rhs)
    }
}

impl From<u16> for VertexId {
    fn from(v: u16) -> Self {
        VertexId(v as Index)
    }
}
impl From<u32> for VertexId {
    fn from(v: u32) -> Self {
        VertexId(v)
    }
}

impl From<VertexId> for u16 {
    fn from(v: VertexId) -> Self {
        v.0 as u16
    }
}
impl From<VertexId> for u32 {
    fn from(v: VertexId) -> Self {
        v.0
    }
}
impl From<VertexId> for i32 {
    fn from(v: VertexId) -> Self {
        v.0 as i32
    }
}
impl From<VertexId> for usize {
    fn from(v: VertexId) -> Self {
        v.0 as usize
    }
}

/// Number of vertices and triangles of a tessellation.
///
/// `prepare` adds the size of its output to a running `Count`, the `vertices` member
/// of which is also the offset of the first vertex id it will write.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Count {
    pub vertices: u32,
    pub triangles: u32,
}

impl Add for Count {
    type Output = Count;
    fn add(self, other: Count) -> Count {
        Count {
            vertices: self.vertices + other.vertices,
            triangles: self.triangles + other.triangles,
        }
    }
}

impl AddAssign for Count {
    fn add_assign(&mut self, other: Count) {
        self.vertices += other.vertices;
        self.triangles += other.triangles;
    }
}

/// A vertex of the tessellated geometry.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct FillVertex {
    pub(crate) position: Point,
    pub(crate) blend_value: f32,
    pub(crate) normal: Vector,
}

impl FillVertex {
    #[inline]
    pub fn position(&self) -> Point {
        self.position
    }

    /// Antialiasing intensity: one for interior vertices, decreasing toward zero on the
    /// outer side of the boundary ribbon.
    ///
    /// The alpha channel of the shape's color is meant to be multiplied by this value.
    #[inline]
    pub fn blend_value(&self) -> f32 {
        self.blend_value
    }

    /// Direction pointing toward the inside of the shape.
    ///
    /// Zero for vertices that are not on the boundary, or when no boundary is generated.
    #[inline]
    pub fn normal(&self) -> Vector {
        self.normal
    }
}

#[test]
fn fill_rules() {
    let rules = [
        FillRule::EvenOdd,
        FillRule::NonZero,
        FillRule::Positive,
        FillRule::Negative,
        FillRule::AbsGeqTwo,
    ];
    let expected = [
        // -2     -1     0      1      2      3
        [false, true, false, true, false, true],
        [true, true, false, true, true, true],
        [false, false, false, true, true, true],
        [true, true, false, false, false, false],
        [true, false, false, false, true, true],
    ];

    for (rule, row) in rules.iter().zip(expected.iter()) {
        for (winding, &inside) in (-2..=3).zip(row.iter()) {
            assert_eq!(rule.is_in(winding), inside, "{:?} {}", rule, winding);
            assert_eq!(rule.is_out(winding), !inside);
        }
    }
}

#[test]
fn count_accumulates() {
    let mut total = Count::default();
    total += Count { vertices: 4, triangles: 2 };
    total += Count { vertices: 3, triangles: 1 };
    assert_eq!(total, Count { vertices: 7, triangles: 3 });
    assert_eq!(total + Count::default(), total);
}
