//! Half-edge mesh storing the contours and everything the sweep adds to them.
//!
//! Each [`Edge`] owns its two halves. A half-edge is addressed by the edge handle and
//! a [`Side`], and knows the next half-edge counter-clockwise around its origin
//! (`origin_next`) and the next half-edge around its left face (`left_next`).
//!
//! Half-edges keep a copy of their origin position and the table index of their origin
//! vertex, so that most of the sweep never needs to touch the vertices.

use crate::edge_dict::NodeIdx;
use crate::error::InternalError;
use crate::math::*;
use crate::math_utils::*;
use crate::vertex_queue::QueueHandle;

use alloc::vec::Vec;
use core::ops::{Index, IndexMut};
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    pub(crate) struct VertexIdx;
    pub(crate) struct EdgeIdx;
    pub(crate) struct FaceEdgeIdx;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    pub fn is_right(self) -> bool {
        self == Side::Right
    }

    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct HalfEdgeIdx {
    pub edge: EdgeIdx,
    pub side: Side,
}

impl HalfEdgeIdx {
    #[inline]
    pub fn left(edge: EdgeIdx) -> Self {
        HalfEdgeIdx {
            edge,
            side: Side::Left,
        }
    }

    #[inline]
    pub fn right(edge: EdgeIdx) -> Self {
        HalfEdgeIdx {
            edge,
            side: Side::Right,
        }
    }

    /// The other half of the same edge.
    #[inline]
    pub fn sym(self) -> Self {
        HalfEdgeIdx {
            edge: self.edge,
            side: self.side.opposite(),
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct HalfEdge {
    /// Next half-edge counter-clockwise around the origin.
    pub origin_next: HalfEdgeIdx,
    /// Next half-edge counter-clockwise around the left face.
    pub left_next: HalfEdgeIdx,
    pub origin: Point,
    /// Table index of the origin vertex.
    pub vertex: u32,
    /// Winding number of the left face, computed by the sweep.
    pub real_winding: i16,
    /// Change of the winding number when crossing from the right face to the left face.
    pub winding: i16,
    pub mark: u32,
}

impl HalfEdge {
    fn new(this: HalfEdgeIdx) -> Self {
        HalfEdge {
            origin_next: this,
            left_next: this.sym(),
            origin: Point::zero(),
            vertex: u32::MAX,
            real_winding: 0,
            winding: 0,
            mark: 0,
        }
    }
}

pub(crate) struct Edge {
    pub left: HalfEdge,
    pub right: HalfEdge,
    /// Node of the edge in the sweep dictionary, if any.
    pub node: Option<NodeIdx>,
    /// Slope of the edge in sweep order, NaN until computed by `update_info`.
    pub direction: f32,
    /// When set, the right half goes in the sweep direction.
    pub inverted: bool,
}

impl Edge {
    fn new(id: EdgeIdx) -> Self {
        Edge {
            left: HalfEdge::new(HalfEdgeIdx::left(id)),
            right: HalfEdge::new(HalfEdgeIdx::right(id)),
            node: None,
            direction: f32::NAN,
            inverted: false,
        }
    }

    #[inline]
    pub fn half(&self, side: Side) -> &HalfEdge {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    #[inline]
    pub fn half_mut(&mut self, side: Side) -> &mut HalfEdge {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    /// Side of the half-edge that goes in the sweep direction.
    #[inline]
    pub fn positive_side(&self) -> Side {
        if self.inverted {
            Side::Right
        } else {
            Side::Left
        }
    }

    #[inline]
    pub fn left_vec(&self) -> Point {
        self.half(self.positive_side()).origin
    }

    #[inline]
    pub fn right_vec(&self) -> Point {
        self.half(self.positive_side().opposite()).origin
    }

    /// Table index of the rightmost vertex.
    #[inline]
    pub fn right_org(&self) -> u32 {
        self.half(self.positive_side().opposite()).vertex
    }

    pub fn update_info(&mut self) {
        if self.direction.is_nan() {
            self.inverted = !vert_leq(self.left.origin, self.right.origin);
            self.direction = edge_direction(self.right_vec() - self.left_vec());
        }
    }

    #[inline]
    pub fn reset_info(&mut self) {
        self.direction = f32::NAN;
        self.update_info();
    }
}

pub(crate) struct Vertex {
    /// A half-edge with this origin.
    pub edge: HalfEdgeIdx,
    pub origin: Point,
    pub normal: Vector,
    /// Index in the vertex table.
    pub unique_idx: u32,
    pub queue_handle: Option<QueueHandle>,
    pub export_idx: Option<u32>,
}

/// A segment of a boundary ring, following the outline of the filled area.
pub(crate) struct FaceEdge {
    pub next: FaceEdgeIdx,
    pub vertex: Option<VertexIdx>,
    pub origin: Point,
    /// Outer vertex of the antialiasing ribbon.
    pub displaced: Point,
    pub normal: Vector,
    pub value: f32,
    pub direction: f32,
    /// Fan angle at convex corners of a distance field.
    pub angle: f32,
    pub extra: u16,
    pub split_vertex: bool,
}

pub(crate) struct Boundary {
    pub head: FaceEdgeIdx,
    pub degenerate: bool,
}

#[derive(Default)]
pub(crate) struct Mesh {
    pub vertices: SlotMap<VertexIdx, Vertex>,
    pub edges: SlotMap<EdgeIdx, Edge>,
    pub faces: SlotMap<FaceEdgeIdx, FaceEdge>,
    /// Live vertices by table index. Released vertices leave a hole.
    pub vertex_table: Vec<Option<VertexIdx>>,
    /// Vertices in the order the sweep visited them.
    pub export_vertices: Vec<Option<VertexIdx>>,
    /// Half-edges from which the regions are discovered.
    pub edges_of_interest: Vec<Option<HalfEdgeIdx>>,
    /// One half-edge per output triangle, duplicates allowed.
    pub face_edges: Vec<Option<HalfEdgeIdx>>,
    pub boundaries: Vec<Boundary>,
}

impl Index<HalfEdgeIdx> for Mesh {
    type Output = HalfEdge;

    #[inline]
    fn index(&self, h: HalfEdgeIdx) -> &HalfEdge {
        self.edges[h.edge].half(h.side)
    }
}

impl IndexMut<HalfEdgeIdx> for Mesh {
    #[inline]
    fn index_mut(&mut self, h: HalfEdgeIdx) -> &mut HalfEdge {
        self.edges[h.edge].half_mut(h.side)
    }
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.edges.clear();
        self.faces.clear();
        self.vertex_table.clear();
        self.export_vertices.clear();
        self.edges_of_interest.clear();
        self.face_edges.clear();
        self.boundaries.clear();
    }

    pub fn reserve(&mut self, n: usize) {
        self.vertices.reserve(n);
        self.edges.reserve(n);
        self.vertex_table.reserve(n);
        self.export_vertices.reserve(n);
    }

    // Navigation.

    #[inline]
    pub fn onext(&self, h: HalfEdgeIdx) -> HalfEdgeIdx {
        self[h].origin_next
    }

    #[inline]
    pub fn lnext(&self, h: HalfEdgeIdx) -> HalfEdgeIdx {
        self[h].left_next
    }

    #[inline]
    pub fn oprev(&self, h: HalfEdgeIdx) -> HalfEdgeIdx {
        self[h.sym()].left_next
    }

    #[inline]
    pub fn lprev(&self, h: HalfEdgeIdx) -> HalfEdgeIdx {
        self[h].origin_next.sym()
    }

    #[inline]
    pub fn org(&self, h: HalfEdgeIdx) -> Point {
        self[h].origin
    }

    #[inline]
    pub fn dst(&self, h: HalfEdgeIdx) -> Point {
        self[h.sym()].origin
    }

    #[inline]
    pub fn norm(&self, h: HalfEdgeIdx) -> Vector {
        self.dst(h) - self.org(h)
    }

    #[inline]
    pub fn direction(&self, h: HalfEdgeIdx) -> f32 {
        self.edges[h.edge].direction
    }

    /// Whether the half-edge goes in the sweep direction. Requires up to date edge info.
    #[inline]
    pub fn goes_right(&self, h: HalfEdgeIdx) -> bool {
        self.edges[h.edge].inverted == h.side.is_right()
    }

    #[inline]
    pub fn goes_left(&self, h: HalfEdgeIdx) -> bool {
        !self.goes_right(h)
    }

    /// The half-edge of `edge` going in the sweep direction.
    #[inline]
    pub fn positive(&self, edge: EdgeIdx) -> HalfEdgeIdx {
        HalfEdgeIdx {
            edge,
            side: self.edges[edge].positive_side(),
        }
    }

    #[inline]
    pub fn negative(&self, edge: EdgeIdx) -> HalfEdgeIdx {
        self.positive(edge).sym()
    }

    #[inline]
    pub fn update_info(&mut self, edge: EdgeIdx) {
        self.edges[edge].update_info();
    }

    #[inline]
    pub fn is_live(&self, h: HalfEdgeIdx) -> bool {
        self.edges.contains_key(h.edge)
    }

    #[inline]
    pub fn vertex_at(&self, unique_idx: u32) -> Option<VertexIdx> {
        self.vertex_table
            .get(unique_idx as usize)
            .copied()
            .flatten()
    }

    /// Origin vertex of a half-edge.
    #[inline]
    pub fn org_vertex(&self, h: HalfEdgeIdx) -> Option<VertexIdx> {
        self.vertex_at(self[h].vertex)
    }

    /// Number of half-edges around the left face of `h`.
    pub fn face_len(&self, h: HalfEdgeIdx) -> usize {
        let mut n = 0;
        let mut e = h;
        loop {
            n += 1;
            e = self.lnext(e);
            if e == h {
                return n;
            }
        }
    }

    // Allocation.

    pub fn alloc_edge(&mut self) -> EdgeIdx {
        self.edges.insert_with_key(Edge::new)
    }

    /// Allocates a vertex at `origin` and makes it the origin of every half-edge around
    /// the origin of `edge`.
    pub fn make_vertex(&mut self, edge: HalfEdgeIdx, origin: Point) -> VertexIdx {
        let unique_idx = self.vertex_table.len() as u32;
        let v = self.vertices.insert(Vertex {
            edge,
            origin,
            normal: Vector::zero(),
            unique_idx,
            queue_handle: None,
            export_idx: None,
        });
        self.vertex_table.push(Some(v));

        let mut e = edge;
        loop {
            self.set_origin(e, v);
            e = self.onext(e);
            if e == edge {
                break;
            }
        }

        v
    }

    #[inline]
    pub fn set_origin(&mut self, h: HalfEdgeIdx, v: VertexIdx) {
        let (origin, unique_idx) = {
            let vertex = &self.vertices[v];
            (vertex.origin, vertex.unique_idx)
        };
        let half = &mut self[h];
        half.origin = origin;
        half.vertex = unique_idx;
    }

    #[inline]
    pub fn copy_origin(&mut self, to: HalfEdgeIdx, from: HalfEdgeIdx) {
        let (origin, vertex) = (self[from].origin, self[from].vertex);
        let half = &mut self[to];
        half.origin = origin;
        half.vertex = vertex;
    }

    /// Moves a vertex along with the cached origin of its half-edges.
    pub fn relocate(&mut self, v: VertexIdx, position: Point) {
        self.vertices[v].origin = position;
        let first = self.vertices[v].edge;
        if !self.is_live(first) {
            return;
        }
        let mut e = first;
        loop {
            self[e].origin = position;
            e = self.onext(e);
            if e == first {
                break;
            }
        }
    }

    pub fn release_edge(&mut self, edge: EdgeIdx) {
        let left = HalfEdgeIdx::left(edge);
        let right = HalfEdgeIdx::right(edge);
        for slot in self
            .edges_of_interest
            .iter_mut()
            .chain(self.face_edges.iter_mut())
        {
            if *slot == Some(left) || *slot == Some(right) {
                *slot = None;
            }
        }

        for &h in &[left, right] {
            if let Some(v) = self.org_vertex(h) {
                if self.vertices[v].edge == h {
                    let next = self[h].origin_next;
                    self.vertices[v].edge = next;
                }
            }
        }

        self.edges.remove(edge);
    }

    pub fn release_vertex(&mut self, v: VertexIdx) {
        if let Some(vertex) = self.vertices.remove(v) {
            if let Some(export_idx) = vertex.export_idx {
                self.export_vertices[export_idx as usize] = None;
            }
            self.vertex_table[vertex.unique_idx as usize] = None;
        }
    }

    /// Drops the released vertices at the end of the table.
    pub fn trim_vertices(&mut self) {
        while let Some(None) = self.vertex_table.last() {
            self.vertex_table.pop();
        }
    }

    // Topological operators.

    /// Creates a single edge whose two halves start on the same new vertex.
    pub fn make_edge_loop(&mut self, origin: Point) -> EdgeIdx {
        let edge = self.alloc_edge();
        let left = HalfEdgeIdx::left(edge);
        let right = HalfEdgeIdx::right(edge);

        self.make_vertex(left, origin);
        self.copy_origin(right, left);

        self[left].left_next = left;
        self[left].origin_next = right;
        self[right].left_next = right;
        self[right].origin_next = left;

        edge
    }

    /// Appends a vertex to a contour by splitting `e`, or starts a new contour.
    pub fn push_vertex(
        &mut self,
        e: Option<HalfEdgeIdx>,
        origin: Point,
        clockwise: bool,
        return_new: bool,
    ) -> HalfEdgeIdx {
        match e {
            None => {
                let edge = self.make_edge_loop(origin);
                let winding = if clockwise { -1 } else { 1 };
                self.edges[edge].left.winding = winding;
                self.edges[edge].right.winding = -winding;
                HalfEdgeIdx::left(edge)
            }
            Some(e) => {
                let e_new = HalfEdgeIdx::left(self.alloc_edge());
                let v = self.make_vertex(e_new, origin);
                self.split_edge_loops(e, e_new, v);
                if return_new {
                    e_new
                } else {
                    e
                }
            }
        }
    }

    /// Inserts `e_new` after `e_org` in its left loop, with `v` as the new vertex
    /// between them.
    pub fn split_edge_loops(&mut self, e_org: HalfEdgeIdx, e_new: HalfEdgeIdx, v: VertexIdx) {
        let b = e_org.sym();
        let d = e_new.sym();

        self.copy_origin(d, b);
        self.set_origin(b, v);
        self.set_origin(e_new, v);

        let e = self.lnext(e_org);
        let g = self.onext(b);
        let h = g.sym();

        self[e].origin_next = d;
        self[d].origin_next = g;
        self[e_new].origin_next = b;
        self[b].origin_next = e_new;
        self[e_org].left_next = e_new;
        self[e_new].left_next = e;
        self[h].left_next = d;
        self[d].left_next = b;

        self[e_new].winding = self[e_org].winding;
        self[d].winding = self[b].winding;
        self[e_new].real_winding = self[e_org].real_winding;
        self[d].real_winding = self[b].real_winding;
    }

    /// Connects the destination of `a` to the origin star of `e`, right after `e`.
    pub fn join_edge_loops(&mut self, a: HalfEdgeIdx, e: HalfEdgeIdx) {
        let b = a.sym();
        let g = self.onext(e);
        let h = g.sym();

        self[e].origin_next = b;
        self[b].origin_next = g;
        self[a].left_next = e;
        self[h].left_next = b;
    }

    /// Adds a diagonal from the destination of `e_org` to the origin of `e_dst`, which
    /// must be on the same face. The new half-edge has the face of `e_dst` on its left.
    pub fn connect_edges(
        &mut self,
        e_org: HalfEdgeIdx,
        e_dst: HalfEdgeIdx,
    ) -> Result<HalfEdgeIdx, InternalError> {
        if self[e_org.sym()].vertex == self[e_dst].vertex {
            return Err(InternalError::ConnectSameVertex);
        }

        let edge = self.alloc_edge();
        let e_new = HalfEdgeIdx::left(edge);
        let e_new_sym = e_new.sym();
        let e_prev = self.onext(e_dst).sym();
        let e_next = self.lnext(e_org);

        let winding = self[e_org].real_winding;
        self[e_new].real_winding = winding;
        self[e_new_sym].real_winding = winding;

        self.copy_origin(e_new, e_org.sym());
        self.copy_origin(e_new_sym, e_dst);

        self[e_prev].left_next = e_new_sym;
        self[e_new_sym].left_next = e_next;
        self[e_new].left_next = e_dst;
        self[e_org].left_next = e_new;

        self[e_new].origin_next = e_org.sym();
        self[e_next].origin_next = e_new;
        self[e_new_sym].origin_next = e_prev.sym();
        self[e_dst].origin_next = e_new_sym;

        self.update_info(edge);

        Ok(e_new)
    }

    /// Splits `e` at `position` and returns the new vertex.
    pub fn split_edge(&mut self, e: HalfEdgeIdx, position: Point) -> VertexIdx {
        let e_new = HalfEdgeIdx::left(self.alloc_edge());
        let v = self.make_vertex(e_new, position);
        let v2 = self.org_vertex(e.sym());

        self.split_edge_loops(e, e_new, v);

        if let Some(v2) = v2 {
            if self.vertices[v2].edge == e.sym() {
                self.vertices[v2].edge = e_new.sym();
            }
        }

        self.update_info(e_new.edge);

        v
    }

    /// Splits two crossing edges at `position` and joins them on a single new vertex.
    pub fn split_edge_pair(
        &mut self,
        mut e1: HalfEdgeIdx,
        mut e2: HalfEdgeIdx,
        position: Point,
    ) -> VertexIdx {
        // The upper edge is split first.
        if self.direction(e2) > self.direction(e1) {
            core::mem::swap(&mut e1, &mut e2);
        }

        let e_new = HalfEdgeIdx::left(self.alloc_edge());
        let v = self.make_vertex(e_new, position);
        let v2 = self.org_vertex(e1.sym());

        self.split_edge_loops(e1, e_new, v);

        if let Some(v2) = v2 {
            if self.vertices[v2].edge == e1.sym() {
                self.vertices[v2].edge = e_new.sym();
            }
        }

        let o_prev_org = e_new;
        let o_prev_new = e1.sym();
        self.update_info(e_new.edge);

        let v2 = self.org_vertex(e2.sym());
        let e_new = HalfEdgeIdx::left(self.alloc_edge());

        self.split_edge_loops(e2, e_new, v);
        self.join_edge_loops(e2, o_prev_org);
        self.join_edge_loops(e_new.sym(), o_prev_new);

        if let Some(v2) = v2 {
            if self.vertices[v2].edge == e2.sym() {
                self.vertices[v2].edge = e_new.sym();
            }
        }

        self.edges[e_new.edge].reset_info();

        v
    }

    /// Removes an edge from a contour, collapsing its origin into its destination.
    ///
    /// Returns a half-edge starting on the destination.
    pub fn remove_edge(&mut self, e: HalfEdgeIdx) -> HalfEdgeIdx {
        let e_sym = e.sym();

        let e_left_prev = self.lprev(e);
        let e_sym_left_prev = self.lprev(e_sym);
        let e_origin_prev = self.oprev(e);
        let e_sym_origin_prev = self.oprev(e_sym);

        let onext = self.onext(e);
        let lnext = self.lnext(e);
        self.copy_origin(onext, lnext);
        self.edges[onext.edge].reset_info();

        self[e_left_prev].left_next = self.lnext(e);
        self[e_sym_left_prev].left_next = self.lnext(e_sym);

        self[e_origin_prev].origin_next = self.onext(e_sym);
        self[e_sym_origin_prev].origin_next = self.onext(e);

        self.release_edge(e.edge);

        self.onext(e_sym_origin_prev)
    }

    /// Detaches the half-edges from `first` to `last` (excluded) around their origin
    /// into a new vertex at the same position.
    pub fn split_vertex(&mut self, first: HalfEdgeIdx, last: HalfEdgeIdx) -> Option<VertexIdx> {
        let org = self.org_vertex(first)?;

        let front = self.onext(first);
        let back = self.onext(last);

        let first_prev = self.lprev(first);
        self[first_prev].left_next = last;
        self[first].origin_next = back;

        let last_prev = self.lprev(last);
        self[last_prev].left_next = first;
        self[last].origin_next = front;

        self.vertices[org].edge = front;
        let origin = self[front].origin;
        let vertex = self.make_vertex(first, origin);

        if self.vertices[org].export_idx.is_some() {
            self.vertices[vertex].export_idx = Some(self.export_vertices.len() as u32);
            self.export_vertices.push(Some(vertex));
        }

        Some(vertex)
    }
}

#[cfg(test)]
fn contour(mesh: &mut Mesh, points: &[Point]) -> HalfEdgeIdx {
    let mut e = None;
    for p in points {
        e = Some(mesh.push_vertex(e, *p, false, false));
    }
    e.unwrap()
}

#[test]
fn contour_loops() {
    let mut mesh = Mesh::new();
    let e = contour(
        &mut mesh,
        &[point(0.0, 0.0), point(1.0, 0.0), point(1.0, 1.0), point(0.0, 1.0)],
    );

    assert_eq!(mesh.vertices.len(), 4);
    assert_eq!(mesh.edges.len(), 4);
    assert_eq!(mesh.face_len(e), 4);
    assert_eq!(mesh.face_len(e.sym()), 4);

    // Every vertex has exactly two half-edges.
    for (v, vertex) in mesh.vertices.iter() {
        let first = vertex.edge;
        assert_eq!(mesh.org_vertex(first), Some(v));
        assert_eq!(mesh.onext(mesh.onext(first)), first);
        assert_eq!(mesh.org(first), vertex.origin);
    }

    // The two faces walk the contour in opposite directions.
    let mut e2 = e;
    loop {
        assert_eq!(mesh.dst(e2), mesh.org(mesh.lnext(e2)));
        assert_eq!(mesh[e2].winding, 1);
        assert_eq!(mesh[e2.sym()].winding, -1);
        e2 = mesh.lnext(e2);
        if e2 == e {
            break;
        }
    }
}

#[test]
fn connect_splits_faces() {
    let mut mesh = Mesh::new();
    let e = contour(
        &mut mesh,
        &[point(0.0, 0.0), point(1.0, 0.0), point(1.0, 1.0), point(0.0, 1.0)],
    );

    // Connect the destination of e to the opposite corner.
    let target = mesh.lnext(mesh.lnext(mesh.lnext(e)));
    let diagonal = mesh.connect_edges(e, target).unwrap();

    assert_eq!(mesh.edges.len(), 5);
    assert_eq!(mesh.org(diagonal), mesh.dst(e));
    assert_eq!(mesh.dst(diagonal), mesh.org(target));
    assert_eq!(mesh.face_len(diagonal), 3);
    assert_eq!(mesh.face_len(diagonal.sym()), 3);

    assert_eq!(
        mesh.connect_edges(e, mesh.lnext(e)),
        Err(InternalError::ConnectSameVertex)
    );
}

#[test]
fn split_and_remove() {
    let mut mesh = Mesh::new();
    let e = contour(&mut mesh, &[point(0.0, 0.0), point(2.0, 0.0), point(1.0, 2.0)]);
    assert_eq!(mesh.face_len(e), 3);

    let v = mesh.split_edge(e, mesh.org(e).lerp(mesh.dst(e), 0.5));
    assert_eq!(mesh.face_len(e), 4);
    assert_eq!(mesh.vertices.len(), 4);
    assert_eq!(mesh.dst(e), mesh.vertices[v].origin);

    let next = mesh.lnext(e);
    let remaining = mesh.remove_edge(next);
    assert_eq!(mesh.edges.len(), 3);
    assert_eq!(mesh.face_len(e), 3);
    assert_eq!(mesh.org(remaining), mesh.dst(e));
}

#[test]
fn released_edges_leave_no_references() {
    let mut mesh = Mesh::new();
    let e = contour(&mut mesh, &[point(0.0, 0.0), point(2.0, 0.0), point(1.0, 2.0)]);
    mesh.edges_of_interest.push(Some(e));
    mesh.face_edges.push(Some(e.sym()));

    let next = mesh.lnext(e);
    mesh.remove_edge(e);

    assert!(!mesh.is_live(e));
    assert_eq!(mesh.edges_of_interest, [None]);
    assert_eq!(mesh.face_edges, [None]);
    for (_, vertex) in mesh.vertices.iter() {
        if mesh.org(next) == vertex.origin {
            assert!(mesh.is_live(vertex.edge));
        }
    }
}

#[test]
fn stale_handles_stay_dead_after_reuse() {
    let mut mesh = Mesh::new();
    let e = contour(&mut mesh, &[point(0.0, 0.0), point(2.0, 0.0), point(1.0, 2.0)]);
    let v = mesh.split_edge(e, point(1.0, 0.0));

    let removed = mesh.lnext(e);
    mesh.remove_edge(removed);
    assert!(!mesh.is_live(removed));

    // The freed slots are recycled under new keys.
    let edge = mesh.alloc_edge();
    assert_ne!(edge, removed.edge);
    assert!(!mesh.is_live(removed));
    assert!(mesh.is_live(HalfEdgeIdx::left(edge)));

    mesh.release_vertex(v);
    assert!(!mesh.vertices.contains_key(v));
    assert_eq!(mesh.vertex_at(3), None);

    mesh.clear();
    assert!(!mesh.is_live(HalfEdgeIdx::left(edge)));
    assert!(mesh.vertices.is_empty());
}
