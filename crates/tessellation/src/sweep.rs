//! The sweep: vertices are visited from left to right, crossing edges are split, winding
//! numbers are propagated from the edges below, and the regions inside the fill rule are
//! cut into monotone pieces by adding diagonals toward the helper of the edge below.
//!
//! At each event, the edges around the vertex are visited counter-clockwise starting
//! from the first angle that is not convex on the left side (see `first_edge`). Each angle
//! between two consecutive edges is classified as a [`VertexType`].

use crate::edge_dict::{Helper, Intersection, IntersectionEvent, NodeIdx, VertexType};
use crate::error::InternalError;
use crate::math_utils::vert_eq;
use crate::mesh::{HalfEdgeIdx, VertexIdx};
use crate::tessellator::Tessellator;

// Bounds the recursive intersection checks after a regular crossing.
const MAX_INTERSECTION_DEPTH: u32 = 32;

impl Tessellator {
    /// Runs the sweep over every vertex.
    ///
    /// Fills the sweep order of the vertices and the edges of interest, computes the
    /// winding number of every face and, unless `dry_run` is set, adds the diagonals of
    /// the monotone decomposition.
    pub(crate) fn compute_interior(&mut self) -> Result<(), InternalError> {
        self.mesh.export_vertices.clear();
        self.mesh.edges_of_interest.clear();
        for (_, vertex) in self.mesh.vertices.iter_mut() {
            vertex.export_idx = None;
            vertex.queue_handle = None;
        }

        self.dict.clear();
        self.queue.reset(&mut self.mesh);
        self.event_vertex = None;

        while let Some(v) = self.queue.extract_min() {
            let origin = match self.mesh.vertices.get_mut(v) {
                Some(vertex) => {
                    vertex.queue_handle = None;
                    vertex.origin
                }
                None => continue,
            };

            // Coincident vertices become a single event.
            while let Some(next) = self.queue.peek_min() {
                let next_origin = match self.mesh.vertices.get(next) {
                    Some(vertex) => vertex.origin,
                    None => {
                        self.queue.extract_min();
                        continue;
                    }
                };

                if !vert_eq(next_origin, origin, self.tolerance) {
                    break;
                }

                self.queue.extract_min();
                self.mesh.vertices[next].queue_handle = None;
                if let Err(e) = self.merge_vertices(v, next) {
                    tracing::error!(target: "tessel::tessellation", "Failed to merge vertices at {:?}: {:?}", origin, e);
                    return Err(e);
                }
            }

            let (origin, unique_idx) = match self.mesh.vertices.get(v) {
                Some(vertex) => (vertex.origin, vertex.unique_idx),
                None => continue,
            };

            self.dict
                .update(&mut self.mesh, origin, unique_idx, self.tolerance);

            if let Err(e) = self.sweep_vertex(v) {
                tracing::error!(target: "tessel::tessellation", "Sweep failed at {:?}: {:?}", origin, e);
                return Err(e);
            }
        }

        Ok(())
    }

    fn sweep_vertex(&mut self, v: VertexIdx) -> Result<(), InternalError> {
        let origin = self.mesh.vertices[v].origin;
        self.event = origin;

        tess_log!(self, "event {}: {:?}", self.mesh.vertices[v].unique_idx, origin);

        // An edge of the dictionary can pass through the event.
        if let Some(isect) = self.dict.check_vertex(&self.mesh, origin, self.tolerance) {
            self.process_vertex_intersect(v, isect)?;
        }

        if !self.vertex_has_edges(v) {
            return Ok(());
        }

        self.event_vertex = Some(v);

        // Outgoing edges can cross the edges of the dictionary. Splitting them changes
        // the star of the vertex, so the walk restarts after each intersection.
        let limit = self.mesh.edges.len() * 4 + 16;
        let mut steps = 0;
        let mut e = self.mesh.vertices[v].edge;
        loop {
            self.mesh.update_info(e.edge);
            if self.mesh.goes_right(e) {
                let (org, dst) = (self.mesh.org(e), self.mesh.dst(e));
                if let Some(isect) = self.dict.check_edge(&self.mesh, org, dst, self.tolerance) {
                    if self.process_intersect(v, isect, e, 0)?.is_some() {
                        if self.event_vertex.is_none() {
                            return Err(InternalError::IntersectionFailed);
                        }
                        e = self.mesh.vertices[v].edge;
                    }
                }
            }

            e = self.mesh.onext(e);
            if e == self.mesh.vertices[v].edge {
                break;
            }

            steps += 1;
            if steps > limit {
                return Err(InternalError::IntersectionFailed);
            }
        }

        let first = self.mesh.vertices[v].edge;
        let mut e = first;
        loop {
            self.mesh.update_info(e.edge);
            e = self.mesh.onext(e);
            if e == first {
                break;
            }
        }

        let fill_rule = self.options.fill_rule;
        let first = self.first_edge(v);
        let mut e = first;
        loop {
            // Diagonals are inserted between e and the next edge, they must not be
            // visited.
            let e_next = self.mesh.onext(e);
            let convex = self.mesh.direction(e) > self.mesh.direction(e_next);

            if self.mesh.goes_right(e) {
                let kind = if self.mesh.goes_right(e_next) {
                    if convex {
                        // Below a split vertex, the winding comes from the edge below.
                        let below = self
                            .dict
                            .edge_below_edge(&self.mesh, &self.mesh.edges[e_next.edge]);
                        let winding = below
                            .and_then(|n| self.dict.node(n))
                            .map_or(0, |n| n.winding_above);

                        self.mesh[e].real_winding = winding;
                        self.mesh[e_next.sym()].real_winding = winding;

                        VertexType::Split
                    } else {
                        self.mesh.edges_of_interest.push(Some(e));

                        let sym = &self.mesh[e.sym()];
                        let winding = sym.real_winding.wrapping_add(sym.winding);
                        self.mesh[e].real_winding = winding;
                        self.mesh[e_next.sym()].real_winding = winding;

                        VertexType::Start
                    }
                } else {
                    self.mesh[e].real_winding = self.mesh[e_next.sym()].real_winding;

                    VertexType::RegularBottom
                };

                let inside = fill_rule.is_in(self.mesh[e].real_winding);
                tess_log!(self, "  {:?} winding {} inside {}", kind, self.mesh[e].real_winding, inside);
                if inside {
                    self.on_vertex(kind, e);
                }

                if self.mesh.edges[e.edge].node.is_none() {
                    if let Some(node) = self.push_edge(e) {
                        if inside {
                            let helper = Helper::new(e, kind);
                            self.set_helper(node, helper);
                        }
                    }
                }
            } else {
                let kind = if self.mesh.goes_right(e_next) {
                    self.mesh[e_next.sym()].real_winding = self.mesh[e].real_winding;

                    VertexType::RegularTop
                } else if convex {
                    VertexType::Merge
                } else {
                    VertexType::End
                };

                let inside = fill_rule.is_in(self.mesh[e].real_winding);
                tess_log!(self, "  {:?} winding {} inside {}", kind, self.mesh[e].real_winding, inside);
                if inside {
                    self.on_vertex(kind, e);
                }

                // Incoming edges leave the dictionary, unless a merge vertex still needs
                // them as a helper.
                if let Some(node) = self.mesh.edges[e.edge].node {
                    let is_merge = self
                        .dict
                        .node(node)
                        .map_or(false, |n| n.helper.kind == VertexType::Merge);
                    if !is_merge {
                        self.mesh.edges[e.edge].node = None;
                        self.dict.pop(node);
                    }
                }
            }

            e = e_next;
            if e == first {
                break;
            }
        }

        self.event_vertex = None;

        let export_idx = self.mesh.export_vertices.len() as u32;
        self.mesh.vertices[v].export_idx = Some(export_idx);
        self.mesh.export_vertices.push(Some(v));

        Ok(())
    }

    fn vertex_has_edges(&self, v: VertexIdx) -> bool {
        match self.mesh.vertices.get(v) {
            Some(vertex) => self.mesh.is_live(vertex.edge),
            None => false,
        }
    }

    /// The edge from which the angles around `v` are classified: the first one after a
    /// convex angle on the left, or at a transition from right to left.
    fn first_edge(&self, v: VertexIdx) -> HalfEdgeIdx {
        let first = self.mesh.vertices[v].edge;
        let mut e = first;
        loop {
            let next = self.mesh.onext(e);
            let convex = self.mesh.direction(e) > self.mesh.direction(next);

            if self.mesh.goes_right(e) {
                if self.mesh.goes_left(next) {
                    return next;
                }
                if convex {
                    return e;
                }
            } else if self.mesh.goes_left(next) && convex {
                return next;
            }

            e = next;
            if e == first {
                return e;
            }
        }
    }

    fn push_edge(&mut self, e: HalfEdgeIdx) -> Option<NodeIdx> {
        let winding = self.mesh[e].real_winding;
        match self.dict.push(&self.mesh, e.edge, winding) {
            Some(node) => {
                self.mesh.edges[e.edge].node = Some(node);
                Some(node)
            }
            None => {
                tracing::warn!(
                    target: "tessel::tessellation",
                    "Edge {:?} -> {:?} does not start at the event {:?}",
                    self.mesh.org(e),
                    self.mesh.dst(e),
                    self.event,
                );
                None
            }
        }
    }

    fn ensure_node(&mut self, e: HalfEdgeIdx) -> Option<NodeIdx> {
        match self.mesh.edges[e.edge].node {
            Some(node) => Some(node),
            None => self.push_edge(e),
        }
    }

    fn set_helper(&mut self, node: NodeIdx, helper: Helper) {
        if let Some(n) = self.dict.node_mut(node) {
            n.helper = helper;
        }
    }

    fn helper_of(&self, node: Option<NodeIdx>) -> Option<(NodeIdx, Helper)> {
        let node = node?;
        self.dict.node(node).map(|n| (node, n.helper))
    }

    /// Adds a diagonal from the origin of `source` to the origin of `target`.
    fn connect_to_helper(&mut self, source: HalfEdgeIdx, target: HalfEdgeIdx) -> Option<HalfEdgeIdx> {
        if !self.mesh.is_live(source) || !self.mesh.is_live(target) {
            tess_log!(self, "  stale helper");
            return None;
        }

        tess_log!(self, "  connect {:?} -> {:?}", self.mesh.org(source), self.mesh.org(target));

        let from = self.mesh.lprev(source);
        match self.mesh.connect_edges(from, target) {
            Ok(e) => {
                self.mesh.edges_of_interest.push(Some(e));
                Some(e)
            }
            Err(err) => {
                tracing::warn!(target: "tessel::tessellation", "Diagonal at {:?} skipped: {:?}", self.event, err);
                None
            }
        }
    }

    /// Monotone decomposition step for an angle inside the fill rule.
    fn on_vertex(&mut self, kind: VertexType, e: HalfEdgeIdx) {
        if self.dry_run {
            return;
        }

        let e_prev = self.mesh.lprev(e);
        let prev_node = self
            .mesh
            .edges
            .get(e_prev.edge)
            .and_then(|edge| edge.node);
        let org = self.mesh.org(e);
        let vertex = self.mesh[e].vertex;

        match kind {
            VertexType::Start => {
                if let Some(node) = self.ensure_node(e) {
                    self.set_helper(node, Helper::new(e, kind));
                }
            }
            VertexType::End => {
                if let Some((_, helper)) = self.helper_of(prev_node) {
                    if helper.kind == VertexType::Merge {
                        if let Some(target) = helper.e1 {
                            self.connect_to_helper(e, target);
                        }
                    }
                }
            }
            VertexType::Split => {
                let below = self.dict.edge_below_point(&self.mesh, org, vertex);
                if let Some((below, helper)) = self.helper_of(below) {
                    if let Some(target) = helper.e1 {
                        let diagonal = self.connect_to_helper(e, target);
                        self.set_helper(
                            below,
                            Helper {
                                e1: diagonal,
                                kind,
                            },
                        );
                    }
                }

                if let Some(node) = self.ensure_node(e) {
                    self.set_helper(node, Helper::new(e, kind));
                }
            }
            VertexType::Merge => {
                if let Some((node, helper)) = self.helper_of(prev_node) {
                    if helper.kind == VertexType::Merge {
                        if let Some(target) = helper.e1 {
                            self.connect_to_helper(e, target);
                        }
                        if let Some(n) = self.dict.node_mut(node) {
                            n.helper.kind = VertexType::RegularTop;
                        }
                    }
                }

                self.update_helper_below(kind, e);
            }
            VertexType::RegularBottom => {
                if let Some((node, helper)) = self.helper_of(prev_node) {
                    if helper.kind == VertexType::Merge {
                        if let Some(target) = helper.e1 {
                            self.connect_to_helper(e, target);
                        }
                    }

                    self.mesh.edges[e_prev.edge].node = None;
                    self.dict.pop(node);
                }

                if let Some(node) = self.ensure_node(e) {
                    self.set_helper(node, Helper::new(e, kind));
                }
            }
            VertexType::RegularTop => {
                self.update_helper_below(kind, e);
            }
        }
    }

    // The vertex becomes the helper of the edge below, after connecting a pending merge
    // vertex.
    fn update_helper_below(&mut self, kind: VertexType, e: HalfEdgeIdx) {
        let org = self.mesh.org(e);
        let vertex = self.mesh[e].vertex;
        let below = self.dict.edge_below_point(&self.mesh, org, vertex);

        if let Some((below, helper)) = self.helper_of(below) {
            let mut e = e;
            if helper.kind == VertexType::Merge {
                if let Some(target) = helper.e1 {
                    if let Some(diagonal) = self.connect_to_helper(e, target) {
                        e = diagonal;
                    }
                }
            }
            self.set_helper(below, Helper::new(e, kind));
        }
    }

    fn process_vertex_intersect(&mut self, v: VertexIdx, isect: Intersection) -> Result<(), InternalError> {
        if isect.event != IntersectionEvent::EventIsIntersection {
            return Ok(());
        }

        let edge = match self.dict.node(isect.node) {
            Some(n) if self.mesh.edges.contains_key(n.edge) => n.edge,
            _ => return Ok(()),
        };

        tess_log!(self, "  edge passes through the event at {:?}", isect.point);

        let e1 = self.mesh.positive(edge);
        let vertex = self.mesh.split_edge(e1, isect.point);
        self.dict.refresh(&mut self.mesh, isect.node);

        self.merge_vertices(v, vertex)
    }

    /// Splits the edges of an intersection found by `check_edge` and merges the
    /// vertices that end up at the same place.
    ///
    /// Returns `None` if nothing was changed.
    fn process_intersect(
        &mut self,
        v: VertexIdx,
        isect: Intersection,
        e2: HalfEdgeIdx,
        depth: u32,
    ) -> Result<Option<HalfEdgeIdx>, InternalError> {
        let edge1 = match self.dict.node(isect.node) {
            Some(n) if self.mesh.edges.contains_key(n.edge) => n.edge,
            _ => return Ok(None),
        };

        tess_log!(
            self,
            "  intersection {:?} -> {:?} x {:?} -> {:?} at {:?}: {:?}",
            self.mesh.edges[edge1].left_vec(),
            self.mesh.edges[edge1].right_vec(),
            self.mesh.org(e2),
            self.mesh.dst(e2),
            isect.point,
            isect.event,
        );

        match isect.event {
            IntersectionEvent::Regular => {
                let e1 = self.mesh.positive(edge1);
                let vertex = self.mesh.split_edge_pair(e1, e2, isect.point);
                self.dict.refresh(&mut self.mesh, isect.node);

                // The remaining part of e2 can cross other edges.
                if depth < MAX_INTERSECTION_DEPTH && self.mesh.is_live(e2) {
                    let (org, dst) = (self.mesh.org(e2), self.mesh.dst(e2));
                    if let Some(next) = self.dict.check_edge(&self.mesh, org, dst, self.tolerance) {
                        self.process_intersect(v, next, e2, depth + 1)?;
                    }
                }

                if let Some(position) = self.mesh.vertices.get(vertex).map(|v| v.origin) {
                    let handle = self.queue.insert(position, vertex);
                    self.mesh.vertices[vertex].queue_handle = Some(handle);
                }
            }
            IntersectionEvent::EventIsIntersection => {
                let e1 = self.mesh.positive(edge1);
                let vertex = self.mesh.split_edge(e1, isect.point);
                self.dict.refresh(&mut self.mesh, isect.node);
                self.merge_vertices(v, vertex)?;
            }
            IntersectionEvent::EdgeConnection1 => {
                let right = self.mesh.org_vertex(self.mesh.negative(edge1));
                let vertex = self.mesh.split_edge(self.mesh.positive(e2.edge), isect.point);
                if let Some(right) = right {
                    self.merge_vertices(right, vertex)?;
                }
            }
            IntersectionEvent::EdgeConnection2 => {
                let right = self.mesh.org_vertex(self.mesh.negative(e2.edge));
                let vertex = self.mesh.split_edge(self.mesh.positive(edge1), isect.point);
                self.dict.refresh(&mut self.mesh, isect.node);
                if let Some(right) = right {
                    self.merge_vertices(right, vertex)?;
                }
            }
            IntersectionEvent::Merge => return Ok(None),
        }

        Ok(Some(e2))
    }
}
