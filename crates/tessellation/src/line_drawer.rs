//! Conversion of paths made of lines, curves and arcs into tessellator contours.

use crate::geom::{ArcFlags, CubicBezierSegment, FlatteningParams, QuadraticBezierSegment, SvgArc, VertexNormal};
use crate::math::*;
use crate::tessellator::{Cursor, Tessellator};
use crate::{StrokeOptions, TessellationError};

use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use num_traits::Float;

/// Flattens paths into the contours of a fill tessellator and of a stroke tessellator.
///
/// The fill tessellator receives the flattened polygon. The stroke tessellator receives
/// the outline of a line of width `StrokeOptions::line_width` along it, as stroke contours.
/// Either of them is optional. A third tessellator, usually configured with
/// [`RelocateRule::DistanceField`](enum.RelocateRule.html), can receive the same polygon as
/// the fill, see [`with_distance_field`](#method.with_distance_field).
///
/// Each `move_to` starts a new contour, closing the current one as an open contour.
/// Contours are closed explicitly with [`close`](#method.close). When a fill tessellator
/// is set, every contour is closed.
///
/// ## Example
///
/// ```
/// use tessel_tessellation::{Count, LineDrawer, StrokeOptions, Tessellator};
/// use tessel_tessellation::math::point;
///
/// let mut fill = Tessellator::new();
/// let mut stroke = Tessellator::new();
/// {
///     let options = StrokeOptions::default().with_line_width(2.0);
///     let mut drawer = LineDrawer::new(&options, Some(&mut fill), Some(&mut stroke));
///     drawer.move_to(point(0.0, 0.0)).unwrap();
///     drawer.line_to(point(10.0, 0.0)).unwrap();
///     drawer.quadratic_bezier_to(point(10.0, 10.0), point(0.0, 10.0)).unwrap();
///     drawer.close(true).unwrap();
/// }
///
/// let mut total = Count::default();
/// assert!(fill.prepare(&mut total).unwrap().triangles > 0);
/// assert!(stroke.prepare(&mut total).unwrap().triangles > 0);
/// ```
pub struct LineDrawer<'l> {
    fill: Option<FillTarget<'l>>,
    distance_field: Option<FillTarget<'l>>,
    stroke: Option<&'l mut Tessellator>,
    stroke_cursor: Option<Cursor>,
    params: FlatteningParams<f32>,
    half_width: f32,
    miter_limit: f32,
    /// The two first points of the contour.
    first: [Point; 2],
    previous: Point,
    current: Point,
    count: u32,
    flattened: Vec<Point>,
}

/// A tessellator that receives the flattened polygon.
struct FillTarget<'l> {
    tessellator: &'l mut Tessellator,
    cursor: Option<Cursor>,
}

impl<'l> FillTarget<'l> {
    fn new(tessellator: &'l mut Tessellator) -> Self {
        FillTarget {
            tessellator,
            cursor: None,
        }
    }

    fn begin(&mut self) {
        self.cursor = Some(self.tessellator.begin_contour(false));
    }

    fn push(&mut self, p: Point) -> Result<(), TessellationError> {
        match &mut self.cursor {
            Some(cursor) => self.tessellator.push_vertex(cursor, p),
            None => Ok(()),
        }
    }

    fn close(&mut self, last: Point) -> Result<(), TessellationError> {
        if let Some(mut cursor) = self.cursor.take() {
            self.tessellator.push_vertex(&mut cursor, last)?;
            self.tessellator.close_contour(&mut cursor)?;
        }

        Ok(())
    }
}

fn left_perp(from: Point, to: Point) -> Vector {
    let v = to - from;
    let len = v.length();
    if len > 0.0 {
        vector(-v.y, v.x) / len
    } else {
        Vector::zero()
    }
}

impl<'l> LineDrawer<'l> {
    pub fn new(
        options: &StrokeOptions,
        fill: Option<&'l mut Tessellator>,
        stroke: Option<&'l mut Tessellator>,
    ) -> Self {
        // The tolerance is a quality factor: the flattening error is its inverse.
        let error = 1.0 / options.tolerance;
        let params = if stroke.is_some() {
            FlatteningParams::for_stroke(error, options.line_width)
        } else {
            FlatteningParams::with_tolerance(error)
        };

        LineDrawer {
            fill: fill.map(FillTarget::new),
            distance_field: None,
            stroke,
            stroke_cursor: None,
            params,
            half_width: options.line_width * 0.5,
            miter_limit: options.miter_limit,
            first: [Point::zero(); 2],
            previous: Point::zero(),
            current: Point::zero(),
            count: 0,
            flattened: Vec::new(),
        }
    }

    /// Also sends the flattened polygon to `tessellator`.
    ///
    /// Every contour is then closed, like with a fill tessellator.
    pub fn with_distance_field(mut self, tessellator: &'l mut Tessellator) -> Self {
        self.distance_field = Some(FillTarget::new(tessellator));
        self
    }

    /// The flattening parameters derived from the stroke options.
    pub fn flattening_params(&self) -> &FlatteningParams<f32> {
        &self.params
    }

    /// Starts a new contour at `to`.
    pub fn move_to(&mut self, to: Point) -> Result<(), TessellationError> {
        if self.count > 0 {
            self.close(false)?;
        }

        for target in self.fill.iter_mut().chain(self.distance_field.iter_mut()) {
            target.begin();
        }
        if let Some(stroke) = &mut self.stroke {
            self.stroke_cursor = Some(stroke.begin_contour(false));
        }

        self.push(to)
    }

    pub fn line_to(&mut self, to: Point) -> Result<(), TessellationError> {
        self.push(to)
    }

    pub fn quadratic_bezier_to(&mut self, ctrl: Point, to: Point) -> Result<(), TessellationError> {
        let curve = QuadraticBezierSegment {
            from: self.current,
            ctrl,
            to,
        };

        let mut points = core::mem::take(&mut self.flattened);
        points.clear();
        curve.for_each_flattened_with(&self.params, &mut |p| points.push(p));
        points.push(to);

        self.push_all(points)
    }

    pub fn cubic_bezier_to(
        &mut self,
        ctrl1: Point,
        ctrl2: Point,
        to: Point,
    ) -> Result<(), TessellationError> {
        let curve = CubicBezierSegment {
            from: self.current,
            ctrl1,
            ctrl2,
            to,
        };

        let mut points = core::mem::take(&mut self.flattened);
        points.clear();
        curve.for_each_flattened_with(&self.params, &mut |p| points.push(p));
        points.push(to);

        self.push_all(points)
    }

    /// Adds an elliptic arc in SVG notation.
    ///
    /// An arc with a zero radius is a straight line to `to`.
    pub fn arc_to(
        &mut self,
        radii: Vector,
        x_rotation: Angle,
        large_arc: bool,
        sweep: bool,
        to: Point,
    ) -> Result<(), TessellationError> {
        let arc = SvgArc {
            from: self.current,
            to,
            radii,
            x_rotation,
            flags: ArcFlags { large_arc, sweep },
        };

        let mut points = core::mem::take(&mut self.flattened);
        points.clear();
        arc.for_each_flattened_with(&self.params, &mut |p| points.push(p));
        points.push(to);

        self.push_all(points)
    }

    /// Ends the current contour.
    ///
    /// A closed contour connects its last point to its first one, an open one only matters
    /// to the stroke, which then ends with a butt cap.
    pub fn close(&mut self, closed: bool) -> Result<(), TessellationError> {
        if self.count == 0 {
            return Ok(());
        }

        let mut closed = closed;
        for target in self.fill.iter_mut().chain(self.distance_field.iter_mut()) {
            target.close(self.current)?;
            closed = true;
        }

        if self.stroke.is_some() && self.count > 1 {
            if closed && self.count > 2 {
                self.push_stroke(self.previous, self.current, self.first[0])?;
                self.push_stroke(self.current, self.first[0], self.first[1])?;
                if let (Some(stroke), Some(cursor)) = (&mut self.stroke, &mut self.stroke_cursor) {
                    stroke.close_stroke_contour(cursor)?;
                }
            } else {
                let (previous, current) = (self.previous, self.current);
                self.start_stroke(previous, current)?;
                let offset = left_perp(previous, current) * self.half_width;
                if let (Some(stroke), Some(cursor)) = (&mut self.stroke, &mut self.stroke_cursor) {
                    stroke.push_stroke_vertex(cursor, current, offset)?;
                    stroke.close_contour(cursor)?;
                }
            }
        }
        self.stroke_cursor = None;

        self.count = 0;

        Ok(())
    }

    fn push_all(&mut self, points: Vec<Point>) -> Result<(), TessellationError> {
        let mut result = Ok(());
        for p in &points {
            result = self.push(*p);
            if result.is_err() {
                break;
            }
        }
        self.flattened = points;

        result
    }

    fn push(&mut self, p: Point) -> Result<(), TessellationError> {
        if self.count < 2 {
            self.first[self.count as usize] = p;
        }

        if self.count > 0 {
            let current = self.current;
            for target in self.fill.iter_mut().chain(self.distance_field.iter_mut()) {
                target.push(current)?;
            }
        }

        if self.count > 1 && self.stroke.is_some() {
            self.push_stroke(self.previous, self.current, p)?;
        }

        self.previous = self.current;
        self.current = p;
        self.count += 1;

        Ok(())
    }

    // The butt cap at the start of a stroke.
    fn start_stroke(&mut self, v0: Point, v1: Point) -> Result<(), TessellationError> {
        let offset = left_perp(v0, v1) * self.half_width;
        if let (Some(stroke), Some(cursor)) = (&mut self.stroke, &mut self.stroke_cursor) {
            if cursor.count() == 0 {
                stroke.push_stroke_vertex(cursor, v0, offset)?;
            }
        }

        Ok(())
    }

    /// Pushes the join at `v1`, between `v0 -> v1` and `v1 -> v2`.
    fn push_stroke(&mut self, v0: Point, v1: Point, v2: Point) -> Result<(), TessellationError> {
        self.start_stroke(v0, v1)?;

        let half_width = self.half_width;
        let miter_limit = self.miter_limit;
        let (stroke, cursor) = match (&mut self.stroke, &mut self.stroke_cursor) {
            (Some(stroke), Some(cursor)) => (stroke, cursor),
            _ => return Ok(()),
        };

        let n = VertexNormal::new(v0, v1, v2);
        let mut offset = (n.miter_length * half_width).copysign(n.cross);

        if n.miter_length.abs() < miter_limit {
            return stroke.push_stroke_vertex(cursor, v1, n.bisector * offset);
        }

        // Bevel. The miter is shortened so that it does not go past the shortest edge.
        let l0 = (v1 - v0).square_length();
        let l2 = (v1 - v2).square_length();
        let miter_sq = n.miter_length * n.miter_length;
        let q_sq = l0.min(l2) / (miter_sq - 1.0);
        let max_offset_sq = miter_sq * q_sq;
        if offset * offset > max_offset_sq {
            offset = max_offset_sq.sqrt().copysign(n.cross);
        }

        let before = left_perp(v0, v1) * half_width;
        let after = left_perp(v1, v2) * half_width;
        if offset > 0.0 {
            stroke.push_stroke_bottom(cursor, v1 - before)?;
            stroke.push_stroke_bottom(cursor, v1 - after)?;
            stroke.push_stroke_top(cursor, v1 + n.bisector * offset)
        } else {
            stroke.push_stroke_bottom(cursor, v1 - n.bisector * offset)?;
            stroke.push_stroke_top(cursor, v1 + before)?;
            stroke.push_stroke_top(cursor, v1 + after)
        }
    }
}

#[cfg(test)]
use crate::{Count, FillOptions, FillRule, RelocateRule};

#[cfg(test)]
fn prepare(tessellator: &mut Tessellator) -> Count {
    tessellator.prepare(&mut Count::default()).unwrap()
}

#[test]
fn fill_polyline() {
    let mut fill = Tessellator::new();
    {
        let mut drawer = LineDrawer::new(&StrokeOptions::default(), Some(&mut fill), None);
        drawer.move_to(point(0.0, 0.0)).unwrap();
        drawer.line_to(point(10.0, 0.0)).unwrap();
        drawer.line_to(point(10.0, 10.0)).unwrap();
        drawer.line_to(point(0.0, 10.0)).unwrap();
        drawer.close(true).unwrap();
    }

    let count = prepare(&mut fill);
    assert_eq!(count.vertices, 4);
    assert_eq!(count.triangles, 2);
}

#[test]
fn move_to_closes_the_current_contour() {
    let mut fill = Tessellator::new();
    fill.set_fill_rule(FillRule::EvenOdd);
    {
        let mut drawer = LineDrawer::new(&StrokeOptions::default(), Some(&mut fill), None);
        for x in &[0.0, 20.0] {
            drawer.move_to(point(*x, 0.0)).unwrap();
            drawer.line_to(point(*x + 10.0, 0.0)).unwrap();
            drawer.line_to(point(*x + 5.0, 10.0)).unwrap();
        }
        drawer.close(true).unwrap();
    }

    assert_eq!(prepare(&mut fill).triangles, 2);
}

#[test]
fn curves_are_flattened() {
    let mut fill = Tessellator::new();
    {
        let mut drawer = LineDrawer::new(&StrokeOptions::tolerance(4.0), Some(&mut fill), None);
        drawer.move_to(point(0.0, 0.0)).unwrap();
        drawer.quadratic_bezier_to(point(50.0, 100.0), point(100.0, 0.0)).unwrap();
        drawer
            .cubic_bezier_to(point(100.0, -50.0), point(0.0, -50.0), point(0.0, 0.0))
            .unwrap();
        drawer.close(true).unwrap();
    }

    let count = prepare(&mut fill);
    assert!(count.vertices > 6, "{:?}", count);
    assert_eq!(count.triangles + 2, count.vertices);
}

#[test]
fn arc_with_zero_radius_is_a_line() {
    let mut fill = Tessellator::new();
    {
        let mut drawer = LineDrawer::new(&StrokeOptions::default(), Some(&mut fill), None);
        drawer.move_to(point(0.0, 0.0)).unwrap();
        drawer.line_to(point(10.0, 0.0)).unwrap();
        drawer
            .arc_to(vector(0.0, 0.0), Angle::zero(), false, false, point(10.0, 10.0))
            .unwrap();
        drawer.close(true).unwrap();
    }

    let count = prepare(&mut fill);
    assert_eq!(count.vertices, 3);
    assert_eq!(count.triangles, 1);
}

#[test]
fn stroke_open_segment() {
    let mut stroke = Tessellator::new();
    {
        let options = StrokeOptions::default().with_line_width(2.0);
        let mut drawer = LineDrawer::new(&options, None, Some(&mut stroke));
        drawer.move_to(point(0.0, 0.0)).unwrap();
        drawer.line_to(point(10.0, 0.0)).unwrap();
        drawer.close(false).unwrap();
    }

    // A 10x2 rectangle.
    let count = prepare(&mut stroke);
    assert_eq!(count.vertices, 4);
    assert_eq!(count.triangles, 2);
}

#[test]
fn stroke_polyline_with_miter_joins() {
    let mut stroke = Tessellator::new();
    {
        let options = StrokeOptions::default().with_line_width(2.0);
        let mut drawer = LineDrawer::new(&options, None, Some(&mut stroke));
        drawer.move_to(point(0.0, 0.0)).unwrap();
        drawer.line_to(point(10.0, 0.0)).unwrap();
        drawer.line_to(point(10.0, 10.0)).unwrap();
        drawer.close(false).unwrap();
    }

    // Three pairs of vertices.
    let count = prepare(&mut stroke);
    assert_eq!(count.vertices, 6);
    assert_eq!(count.triangles, 4);
}

#[test]
fn stroke_join_above_miter_limit_is_beveled() {
    let mut stroke = Tessellator::new();
    {
        let options = StrokeOptions::default()
            .with_line_width(2.0)
            .with_miter_limit(1.0);
        let mut drawer = LineDrawer::new(&options, None, Some(&mut stroke));
        drawer.move_to(point(0.0, 0.0)).unwrap();
        drawer.line_to(point(10.0, 0.0)).unwrap();
        drawer.line_to(point(10.0, 10.0)).unwrap();
        drawer.close(false).unwrap();
    }

    // The outer side of the join gets two vertices instead of one.
    let count = prepare(&mut stroke);
    assert_eq!(count.vertices, 7);
    assert_eq!(count.triangles, 5);
}

#[test]
fn distance_field_receives_the_polygon() {
    let mut fill = Tessellator::new();
    let mut sdf = Tessellator::with_options(
        FillOptions::default()
            .with_boundary_offset(2.0)
            .with_relocate_rule(RelocateRule::DistanceField),
    );
    {
        let options = StrokeOptions::default();
        let mut drawer =
            LineDrawer::new(&options, Some(&mut fill), None).with_distance_field(&mut sdf);
        drawer.move_to(point(0.0, 0.0)).unwrap();
        drawer.line_to(point(10.0, 0.0)).unwrap();
        drawer.line_to(point(10.0, 10.0)).unwrap();
        drawer.line_to(point(0.0, 10.0)).unwrap();
        drawer.close(true).unwrap();
    }

    assert_eq!(prepare(&mut fill).triangles, 2);

    // Same interior, plus the ribbon and the corner fans.
    let count = prepare(&mut sdf);
    assert!(count.vertices > 8, "{:?}", count);
    assert!(count.triangles > 10, "{:?}", count);
}
