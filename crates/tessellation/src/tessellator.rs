use crate::edge_dict::EdgeDict;
use crate::error::*;
use crate::geometry_builder::GeometryBuilder;
use crate::math::*;
use crate::math_utils::MATH_TOLERANCE;
use crate::mesh::{HalfEdgeIdx, Mesh, VertexIdx};
use crate::vertex_queue::VertexQueue;
use crate::{Count, FillOptions, FillRule, FillVertex, RelocateRule, VertexId};

use alloc::vec::Vec;

/// Writes one contour into a [`Tessellator`](struct.Tessellator.html).
///
/// Cursors are created with `Tessellator::begin_contour` and only refer to the tessellator
/// that created them. Several cursors can be open at the same time, their contours are
/// independent.
#[derive(Clone, Debug)]
pub struct Cursor {
    pub(crate) edge: Option<HalfEdgeIdx>,
    pub(crate) root: Option<HalfEdgeIdx>,
    pub(crate) origin: Point,
    pub(crate) count: u32,
    pub(crate) closed: bool,
    pub(crate) clockwise: bool,
}

impl Cursor {
    /// Number of vertices in the contour.
    ///
    /// For stroke contours, each pair of top and bottom vertices counts once. After closing,
    /// this is the number of remaining edges.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// The first position pushed into the contour.
    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_clockwise(&self) -> bool {
        self.clockwise
    }
}

/// The result of `prepare`, replayed by `write`.
pub(crate) struct Output {
    pub vertex_offset: u32,
    pub vertices: Vec<FillVertex>,
    pub triangles: Vec<[u32; 3]>,
}

/// A sweep-line tessellator for arbitrary polygons.
///
/// ## Overview
///
/// Contours are pushed vertex by vertex through [`Cursor`](struct.Cursor.html)s. Once all
/// contours are closed, [`prepare`](#method.prepare) runs the tessellation and reports the
/// number of vertices and triangles, and [`write`](#method.write) sends them to a
/// [`GeometryBuilder`](geometry_builder/trait.GeometryBuilder.html).
///
/// Contours may intersect themselves and each other, the [`FillRule`](enum.FillRule.html)
/// decides which regions are filled.
///
/// ## Antialiasing
///
/// With a non-zero boundary inset or offset, the outline of the filled area is extruded
/// into a ribbon of triangles. The outer vertices of the ribbon have a blend value below one
/// and a normal pointing toward the inside of the shape. See
/// [`FillOptions`](struct.FillOptions.html) and [`RelocateRule`](enum.RelocateRule.html).
///
/// ## Reuse
///
/// Contours can't be added after `prepare`. Call [`clear`](#method.clear) to start over
/// with a new shape, the allocations are kept.
///
/// ## Example
///
/// ```
/// use tessel_tessellation::{Tessellator, FillOptions, FillRule, Count, NoOutput};
/// use tessel_tessellation::math::point;
///
/// let mut tessellator = Tessellator::with_options(FillOptions::even_odd());
///
/// // An hourglass.
/// let mut cursor = tessellator.begin_contour(false);
/// for p in &[point(0.0, 0.0), point(10.0, 10.0), point(10.0, 0.0), point(0.0, 10.0)] {
///     tessellator.push_vertex(&mut cursor, *p).unwrap();
/// }
/// tessellator.close_contour(&mut cursor).unwrap();
///
/// let mut total = Count::default();
/// let count = tessellator.prepare(&mut total).unwrap();
/// assert_eq!(count.triangles, 2);
/// assert_eq!(total, count);
///
/// tessellator.write(&mut NoOutput::new()).unwrap();
/// ```
pub struct Tessellator {
    pub(crate) mesh: Mesh,
    pub(crate) options: FillOptions,
    pub(crate) queue: VertexQueue,
    pub(crate) dict: EdgeDict,
    pub(crate) tolerance: f32,
    mark: u32,
    /// Classify the events without adding diagonals.
    pub(crate) dry_run: bool,
    pub(crate) event: Point,
    pub(crate) event_vertex: Option<VertexIdx>,
    pub(crate) protected_vertices: Vec<VertexIdx>,
    pub(crate) protected_edges: Vec<HalfEdgeIdx>,
    pub(crate) log: bool,
    bounds: Option<Box2D>,
    prepared: bool,
    output: Option<Output>,
}

impl Default for Tessellator {
    fn default() -> Self {
        Self::new()
    }
}

impl Tessellator {
    /// Constructor.
    pub fn new() -> Self {
        Self::with_options(FillOptions::DEFAULT)
    }

    pub fn with_options(options: FillOptions) -> Self {
        #[cfg(all(debug_assertions, feature = "std"))]
        let log = std::env::var("TESSEL_FORCE_LOGGING").is_ok();
        #[cfg(not(all(debug_assertions, feature = "std")))]
        let log = false;

        Tessellator {
            mesh: Mesh::new(),
            options,
            queue: VertexQueue::new(),
            dict: EdgeDict::new(),
            tolerance: MATH_TOLERANCE,
            mark: 0,
            dry_run: false,
            event: Point::zero(),
            event_vertex: None,
            protected_vertices: Vec::new(),
            protected_edges: Vec::new(),
            log,
            bounds: None,
            prepared: false,
            output: None,
        }
    }

    /// Enable/disable some verbose logging during the tessellation, for
    /// debugging purposes.
    pub fn set_logging(&mut self, is_enabled: bool) {
        #[cfg(all(debug_assertions, feature = "std"))]
        let forced = std::env::var("TESSEL_FORCE_LOGGING").is_ok();

        #[cfg(not(all(debug_assertions, feature = "std")))]
        let forced = false;

        self.log = is_enabled || forced;
    }

    pub fn options(&self) -> &FillOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: FillOptions) {
        self.options = options;
    }

    /// Sets both the boundary inset and offset.
    pub fn set_antialias_value(&mut self, value: f32) {
        self.options.boundary_inset = value;
        self.options.boundary_offset = value;
    }

    pub fn set_boundaries_transform(&mut self, inset: f32, offset: f32) {
        self.options.boundary_inset = inset;
        self.options.boundary_offset = offset;
    }

    pub fn boundary_inset(&self) -> f32 {
        self.options.boundary_inset
    }

    pub fn boundary_offset(&self) -> f32 {
        self.options.boundary_offset
    }

    pub fn set_content_scale(&mut self, scale: f32) {
        self.options.content_scale = scale;
    }

    pub fn content_scale(&self) -> f32 {
        self.options.content_scale
    }

    pub fn set_relocate_rule(&mut self, rule: RelocateRule) {
        self.options.relocate_rule = rule;
    }

    pub fn relocate_rule(&self) -> RelocateRule {
        self.options.relocate_rule
    }

    pub fn set_fill_rule(&mut self, rule: FillRule) {
        self.options.fill_rule = rule;
    }

    pub fn fill_rule(&self) -> FillRule {
        self.options.fill_rule
    }

    /// Reserves room for `n` vertices and edges.
    pub fn preallocate(&mut self, n: usize) {
        self.mesh.reserve(n);
    }

    /// Bounding box of every position pushed so far.
    pub fn bounds(&self) -> Option<Box2D> {
        self.bounds
    }

    /// Whether `prepare` was called since the last `clear`.
    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    /// Removes all contours and results, keeping the allocations.
    pub fn clear(&mut self) {
        self.mesh.clear();
        self.queue.clear();
        self.dict.clear();
        self.mark = 0;
        self.dry_run = false;
        self.event = Point::zero();
        self.event_vertex = None;
        self.protected_vertices.clear();
        self.protected_edges.clear();
        self.bounds = None;
        self.prepared = false;
        self.output = None;
    }

    /// A new value for the per-edge marks, different from every mark set so far.
    pub(crate) fn next_mark(&mut self) -> u32 {
        self.mark = self.mark.wrapping_add(1);
        if self.mark == 0 {
            // Marks left over from before the wrap could collide.
            for (_, edge) in self.mesh.edges.iter_mut() {
                edge.left.mark = 0;
                edge.right.mark = 0;
            }
            self.mark = 1;
        }
        self.mark
    }

    // Contours.

    /// Starts a new contour.
    ///
    /// Contours are counter-clockwise unless `clockwise` is set, which only matters for the
    /// fill rules that look at the sign of the winding number.
    pub fn begin_contour(&mut self, clockwise: bool) -> Cursor {
        Cursor {
            edge: None,
            root: None,
            origin: Point::zero(),
            count: 0,
            closed: false,
            clockwise,
        }
    }

    fn check_cursor(&self, cursor: &Cursor) -> Result<(), TessellationError> {
        if self.prepared {
            return Err(UnsupportedParameter::AlreadyPrepared.into());
        }
        if cursor.closed {
            return Err(UnsupportedParameter::ContourIsClosed.into());
        }
        if let Some(edge) = cursor.edge {
            if !self.mesh.is_live(edge) {
                // The tessellator was cleared since the contour started.
                return Err(UnsupportedParameter::ContourIsClosed.into());
            }
        }

        Ok(())
    }

    fn check_position(p: Point) -> Result<(), TessellationError> {
        if p.x.is_finite() && p.y.is_finite() {
            Ok(())
        } else {
            Err(UnsupportedParameter::PositionIsNaN.into())
        }
    }

    fn add_to_bounds(&mut self, p: Point) {
        self.bounds = Some(match self.bounds {
            Some(b) => Box2D {
                min: b.min.min(p),
                max: b.max.max(p),
            },
            None => Box2D { min: p, max: p },
        });
    }

    fn start(&mut self, cursor: &mut Cursor, p: Point) {
        if cursor.count == 0 {
            cursor.origin = p;
        }
        tess_log!(self, "push {:?}", p);
    }

    /// Appends a vertex to a fill contour.
    pub fn push_vertex(&mut self, cursor: &mut Cursor, p: Point) -> Result<(), TessellationError> {
        self.check_cursor(cursor)?;
        Self::check_position(p)?;

        self.start(cursor, p);
        cursor.edge = Some(self.mesh.push_vertex(cursor.edge, p, cursor.clockwise, false));
        cursor.count += 1;
        self.add_to_bounds(p);

        Ok(())
    }

    /// Appends a pair of vertices to a stroke contour: `p + offset` on the top side and
    /// `p - offset` on the bottom side.
    ///
    /// A stroke contour is a closed polygon that runs along the top side and comes back
    /// along the bottom side.
    pub fn push_stroke_vertex(
        &mut self,
        cursor: &mut Cursor,
        p: Point,
        offset: Vector,
    ) -> Result<(), TessellationError> {
        self.check_cursor(cursor)?;
        Self::check_position(p)?;
        if !offset.x.is_finite() || !offset.y.is_finite() {
            return Err(UnsupportedParameter::OffsetIsNaN.into());
        }

        self.start(cursor, p);
        let top = p + offset;
        let bottom = p - offset;
        match cursor.edge {
            None => {
                let root = self.mesh.push_vertex(None, top, cursor.clockwise, false);
                cursor.root = Some(root);
                cursor.edge = Some(self.mesh.push_vertex(Some(root), bottom, cursor.clockwise, false));
            }
            Some(edge) => {
                let prev = self.mesh.lprev(edge);
                self.mesh.push_vertex(Some(prev), bottom, cursor.clockwise, false);
                let prev = self.mesh.lprev(edge);
                cursor.edge = Some(self.mesh.push_vertex(Some(prev), top, cursor.clockwise, true));
            }
        }
        cursor.count += 1;
        self.add_to_bounds(top);
        self.add_to_bounds(bottom);

        Ok(())
    }

    /// Appends a vertex to the top side of a stroke contour.
    pub fn push_stroke_top(&mut self, cursor: &mut Cursor, p: Point) -> Result<(), TessellationError> {
        self.check_cursor(cursor)?;
        Self::check_position(p)?;

        self.start(cursor, p);
        match cursor.edge {
            None => {
                let root = self.mesh.push_vertex(None, p, cursor.clockwise, false);
                cursor.root = Some(root);
                cursor.edge = Some(root);
            }
            Some(edge) => {
                let prev = self.mesh.lprev(edge);
                cursor.edge = Some(self.mesh.push_vertex(Some(prev), p, cursor.clockwise, true));
            }
        }
        cursor.count += 1;
        self.add_to_bounds(p);

        Ok(())
    }

    /// Appends a vertex to the bottom side of a stroke contour.
    pub fn push_stroke_bottom(
        &mut self,
        cursor: &mut Cursor,
        p: Point,
    ) -> Result<(), TessellationError> {
        self.check_cursor(cursor)?;
        Self::check_position(p)?;

        self.start(cursor, p);
        match cursor.edge {
            None => {
                let root = self.mesh.push_vertex(None, p, cursor.clockwise, false);
                cursor.root = Some(root);
                cursor.edge = Some(root);
            }
            Some(edge) => {
                let prev = self.mesh.lprev(edge);
                self.mesh.push_vertex(Some(prev), p, cursor.clockwise, false);
            }
        }
        cursor.count += 1;
        self.add_to_bounds(p);

        Ok(())
    }

    /// Closes a contour, removing its zero-length edges and collinear vertices.
    ///
    /// Returns `Ok(false)` if nothing remains of the contour.
    pub fn close_contour(&mut self, cursor: &mut Cursor) -> Result<bool, TessellationError> {
        self.check_cursor(cursor)?;
        cursor.closed = true;

        Ok(self.finish_contour(cursor))
    }

    /// Closes a stroke contour.
    ///
    /// The first pair of vertices is moved onto the last pair, which closes the loop of
    /// a stroke that ends where it started.
    pub fn close_stroke_contour(&mut self, cursor: &mut Cursor) -> Result<bool, TessellationError> {
        self.check_cursor(cursor)?;
        cursor.closed = true;

        if let (Some(root), Some(edge)) = (cursor.root, cursor.edge) {
            let top = self.mesh.org(edge);
            let bottom = self.mesh.org(self.mesh.lprev(edge));
            if let Some(v) = self.mesh.org_vertex(root) {
                self.mesh.relocate(v, top);
            }
            if let Some(v) = self.mesh.org_vertex(root.sym()) {
                self.mesh.relocate(v, bottom);
            }
        }

        Ok(self.finish_contour(cursor))
    }

    fn finish_contour(&mut self, cursor: &mut Cursor) -> bool {
        let edge = match cursor.edge {
            Some(edge) => edge,
            None => return false,
        };

        let visit = self.next_mark();
        cursor.edge = self.remove_degenerate_edges(edge, Some(&mut cursor.count), true, visit);
        self.mesh.trim_vertices();

        if cursor.edge.is_none() {
            tess_log!(self, "empty contour");
        }

        cursor.edge.is_some()
    }

    // Tessellation.

    /// Runs the tessellation and computes its output.
    ///
    /// `total` is the running count of a shared output: its vertex count is the offset of
    /// the first vertex id this tessellator writes, and the size of this tessellator's output
    /// is added to it. The returned count is the size of this tessellator's output alone.
    ///
    /// A tessellator can only be prepared once. On failure, `write` emits nothing.
    pub fn prepare(&mut self, total: &mut Count) -> Result<Count, TessellationError> {
        if self.prepared {
            return Err(UnsupportedParameter::AlreadyPrepared.into());
        }
        self.prepared = true;
        self.output = None;

        let output = match self.tessellate(total.vertices) {
            Ok(output) => output,
            Err(e) => {
                tracing::error!(target: "tessel::tessellation", "Tessellation failed: {:?}", e);
                return Err(e.into());
            }
        };

        let count = Count {
            vertices: output.vertices.len() as u32,
            triangles: output.triangles.len() as u32,
        };
        *total += count;
        self.output = Some(output);

        Ok(count)
    }

    fn tessellate(&mut self, vertex_offset: u32) -> Result<Output, InternalError> {
        let boundary = self.options.has_boundary();
        let monotonize = boundary && self.options.relocate_rule == RelocateRule::Monotonize;

        self.dry_run = monotonize;
        let result = self.compute_interior();
        self.dry_run = false;
        result?;

        if boundary {
            self.compute_boundary();

            if monotonize {
                // Move the vertices first, then sweep again from scratch.
                self.displace_boundaries();
                self.reset_sweep_state();
                self.compute_interior()?;
            }

            self.tessellate_interior()?;

            if !monotonize {
                self.displace_boundaries();
            }
        } else {
            self.tessellate_interior()?;
        }

        Ok(self.build_output(vertex_offset, boundary))
    }

    fn reset_sweep_state(&mut self) {
        for i in 0..self.mesh.vertex_table.len() {
            let v = match self.mesh.vertex_table[i] {
                Some(v) => v,
                None => continue,
            };
            let (first, origin) = {
                let vertex = &self.mesh.vertices[v];
                (vertex.edge, vertex.origin)
            };
            if !self.mesh.is_live(first) {
                continue;
            }

            let mut e = first;
            loop {
                let edge = &mut self.mesh.edges[e.edge];
                edge.direction = f32::NAN;
                edge.node = None;
                let half = edge.half_mut(e.side);
                half.origin = origin;
                half.real_winding = 0;

                e = self.mesh.onext(e);
                if e == first {
                    break;
                }
            }
        }
    }

    fn build_output(&mut self, vertex_offset: u32, boundary: bool) -> Output {
        let mut vertices = Vec::new();
        let mut triangles = Vec::new();

        // Export index to output index.
        let mut local = Vec::with_capacity(self.mesh.export_vertices.len());
        for slot in &self.mesh.export_vertices {
            let vertex = slot.and_then(|v| self.mesh.vertices.get(v));
            match vertex {
                Some(vertex) => {
                    local.push(Some(vertices.len() as u32));
                    vertices.push(FillVertex {
                        position: vertex.origin,
                        blend_value: 1.0,
                        normal: vertex.normal,
                    });
                }
                None => local.push(None),
            }
        }

        if boundary {
            self.export_boundaries(&local, &mut vertices, &mut triangles);
        }

        self.export_triangles(&local, &mut triangles);

        tess_log!(
            self,
            "output: {} vertices, {} triangles",
            vertices.len(),
            triangles.len()
        );

        Output {
            vertex_offset,
            vertices,
            triangles,
        }
    }

    /// Output index of a vertex.
    pub(crate) fn local_id(&self, local: &[Option<u32>], v: VertexIdx) -> Option<u32> {
        let export_idx = self.mesh.vertices.get(v)?.export_idx?;
        local.get(export_idx as usize).copied().flatten()
    }

    fn export_triangles(&mut self, local: &[Option<u32>], triangles: &mut Vec<[u32; 3]>) {
        let mark = self.next_mark();
        let fill_rule = self.options.fill_rule;

        for i in 0..self.mesh.face_edges.len() {
            let first = match self.mesh.face_edges[i] {
                Some(e) if self.mesh.is_live(e) => e,
                _ => continue,
            };
            if self.mesh[first].mark == mark || fill_rule.is_out(self.mesh[first].real_winding) {
                continue;
            }

            let mut ids = [None; 3];
            let mut n = 0;
            let mut e = first;
            loop {
                if n < 3 {
                    ids[n] = self
                        .mesh
                        .org_vertex(e)
                        .and_then(|v| self.local_id(local, v));
                }
                self.mesh[e].mark = mark;
                n += 1;
                e = self.mesh.lnext(e);
                if e == first {
                    break;
                }
            }

            if n == 3 {
                if let [Some(a), Some(b), Some(c)] = ids {
                    triangles.push([a, b, c]);
                }
            }
        }
    }

    /// Sends the result of `prepare` to a geometry builder.
    ///
    /// Vertex ids start at the offset given to `prepare` and are emitted in increasing
    /// order, before the triangles.
    pub fn write(&self, output: &mut dyn GeometryBuilder) -> TessellationResult {
        let prepared = match self.output {
            Some(ref prepared) => prepared,
            None => return Err(InternalError::NotPrepared.into()),
        };

        output.begin_geometry();

        for (i, vertex) in prepared.vertices.iter().enumerate() {
            let id = VertexId(prepared.vertex_offset + i as u32);
            if let Err(e) = output.add_vertex(id, *vertex) {
                output.abort_geometry();
                return Err(e.into());
            }
        }

        for t in &prepared.triangles {
            output.add_triangle(
                VertexId(prepared.vertex_offset + t[0]),
                VertexId(prepared.vertex_offset + t[1]),
                VertexId(prepared.vertex_offset + t[2]),
            );
        }

        output.end_geometry();

        Ok(())
    }
}

#[cfg(test)]
use crate::geometry_builder::{simple_builder, VertexBuffers};

#[test]
fn cursor_rejects_invalid_input() {
    let mut tess = Tessellator::new();
    let mut cursor = tess.begin_contour(false);

    assert_eq!(
        tess.push_vertex(&mut cursor, point(f32::NAN, 0.0)),
        Err(UnsupportedParameter::PositionIsNaN.into())
    );
    assert_eq!(cursor.count(), 0);

    tess.push_vertex(&mut cursor, point(1.0, 2.0)).unwrap();
    assert_eq!(cursor.origin(), point(1.0, 2.0));
    assert_eq!(
        tess.push_stroke_vertex(&mut cursor, point(0.0, 0.0), vector(f32::INFINITY, 0.0)),
        Err(UnsupportedParameter::OffsetIsNaN.into())
    );

    tess.push_vertex(&mut cursor, point(5.0, 2.0)).unwrap();
    tess.push_vertex(&mut cursor, point(5.0, 7.0)).unwrap();
    assert!(tess.close_contour(&mut cursor).unwrap());
    assert!(cursor.is_closed());

    assert_eq!(
        tess.push_vertex(&mut cursor, point(0.0, 0.0)),
        Err(UnsupportedParameter::ContourIsClosed.into())
    );
    assert_eq!(
        tess.close_contour(&mut cursor),
        Err(UnsupportedParameter::ContourIsClosed.into())
    );

    let bounds = tess.bounds().unwrap();
    assert_eq!(bounds.min, point(1.0, 2.0));
    assert_eq!(bounds.max, point(5.0, 7.0));
}

#[test]
fn degenerate_contours_collapse() {
    let mut tess = Tessellator::new();

    let mut empty = tess.begin_contour(false);
    assert!(!tess.close_contour(&mut empty).unwrap());

    let mut single = tess.begin_contour(false);
    tess.push_vertex(&mut single, point(1.0, 1.0)).unwrap();
    assert!(!tess.close_contour(&mut single).unwrap());

    let mut line = tess.begin_contour(false);
    tess.push_vertex(&mut line, point(0.0, 0.0)).unwrap();
    tess.push_vertex(&mut line, point(5.0, 0.0)).unwrap();
    tess.push_vertex(&mut line, point(10.0, 0.0)).unwrap();
    assert!(!tess.close_contour(&mut line).unwrap());

    assert_eq!(tess.mesh.edges.len(), 0);
    assert_eq!(tess.mesh.vertices.len(), 0);
    assert!(tess.mesh.vertex_table.is_empty());

    let mut total = Count::default();
    assert_eq!(tess.prepare(&mut total), Ok(Count::default()));
}

#[test]
fn duplicate_and_collinear_vertices_are_removed() {
    let mut tess = Tessellator::new();
    let mut cursor = tess.begin_contour(false);
    for p in &[
        point(0.0, 0.0),
        point(0.0, 0.0),
        point(5.0, 0.0),
        point(10.0, 0.0),
        point(10.0, 10.0),
        point(10.0, 10.0),
        point(0.0, 10.0),
    ] {
        tess.push_vertex(&mut cursor, *p).unwrap();
    }
    assert!(tess.close_contour(&mut cursor).unwrap());
    assert_eq!(cursor.count(), 4);
    assert_eq!(tess.mesh.vertices.len(), 4);
}

#[test]
fn prepare_once() {
    let mut tess = Tessellator::new();
    let mut cursor = tess.begin_contour(false);
    for p in &[point(0.0, 0.0), point(1.0, 0.0), point(0.0, 1.0)] {
        tess.push_vertex(&mut cursor, *p).unwrap();
    }

    let mut buffers: VertexBuffers<Point, u16> = VertexBuffers::new();
    assert_eq!(
        tess.write(&mut simple_builder(&mut buffers)),
        Err(InternalError::NotPrepared.into())
    );

    tess.close_contour(&mut cursor).unwrap();

    let mut total = Count {
        vertices: 10,
        triangles: 2,
    };
    let count = tess.prepare(&mut total).unwrap();
    assert_eq!(count, Count { vertices: 3, triangles: 1 });
    assert_eq!(total, Count { vertices: 13, triangles: 3 });
    assert!(tess.is_prepared());

    assert_eq!(
        tess.prepare(&mut total),
        Err(UnsupportedParameter::AlreadyPrepared.into())
    );
    let mut other = tess.begin_contour(false);
    assert_eq!(
        tess.push_vertex(&mut other, point(0.0, 0.0)),
        Err(UnsupportedParameter::AlreadyPrepared.into())
    );

    tess.clear();
    assert!(!tess.is_prepared());
    assert_eq!(
        tess.push_vertex(&mut cursor, point(0.0, 0.0)),
        Err(UnsupportedParameter::ContourIsClosed.into())
    );
    let mut cursor = tess.begin_contour(false);
    tess.push_vertex(&mut cursor, point(0.0, 0.0)).unwrap();
}

#[test]
fn stroke_contour() {
    let mut tess = Tessellator::new();
    let mut cursor = tess.begin_contour(false);

    // A horizontal band of height 2.
    for x in &[0.0, 5.0, 10.0] {
        tess.push_stroke_vertex(&mut cursor, point(*x, 0.0), vector(0.0, 1.0))
            .unwrap();
    }
    assert_eq!(cursor.count(), 3);
    assert!(tess.close_contour(&mut cursor).unwrap());
    // The middle vertices are collinear.
    assert_eq!(tess.mesh.vertices.len(), 4);

    let mut total = Count::default();
    let count = tess.prepare(&mut total).unwrap();
    assert_eq!(count.triangles, 2);
}
