//! Merging of coincident vertices.
//!
//! The edges of the merged vertex are inserted into the star of the remaining vertex in
//! angular order. Edges that end up on top of each other are then cleaned up: two-edge
//! faces hanging on the vertex (ears) are removed, overlapping edges are split so that they
//! share both endpoints, and parallel edges forming a two-edge face are collapsed into one,
//! adding up their windings.

use crate::error::InternalError;
use crate::math_utils::*;
use crate::mesh::{EdgeIdx, HalfEdgeIdx, VertexIdx};
use crate::tessellator::Tessellator;

// A full turn is 8 in the units of `edge_angle`.
const MAX_ROTATION: f32 = 32.0;

impl Tessellator {
    /// Moves every edge of `merge` to `org` and releases `merge`.
    pub(crate) fn merge_vertices(&mut self, org: VertexIdx, merge: VertexIdx) -> Result<(), InternalError> {
        if org == merge
            || self.protected_vertices.contains(&org)
            || self.protected_vertices.contains(&merge)
        {
            return Ok(());
        }

        if !self.mesh.vertices.contains_key(org) || !self.mesh.vertices.contains_key(merge) {
            return Ok(());
        }

        tess_log!(
            self,
            "merge {} into {} at {:?}",
            self.mesh.vertices[merge].unique_idx,
            self.mesh.vertices[org].unique_idx,
            self.mesh.vertices[org].origin
        );

        let org_idx = self.mesh.vertices[org].unique_idx;
        let mut e_org = self.mesh.vertices[org].edge;
        let mut e_merge = self.mesh.vertices[merge].edge;
        let e_merge_end = e_merge;

        if !self.mesh.is_live(e_org) || !self.mesh.is_live(e_merge) {
            return Err(InternalError::MergeEmptyVertex);
        }

        let mut l_a = self.angle_to_next(e_org)?;

        // A single edge between both vertices is simply collapsed.
        loop {
            let e_merge_next = self.mesh.onext(e_merge);

            if self.mesh[e_merge.sym()].vertex == org_idx && self.mesh.onext(e_merge_next) == e_merge {
                self.pop_dict_node(e_merge.edge);
                let remaining = self.mesh.remove_edge(e_merge);
                self.mesh.vertices[org].edge = remaining;
                self.release_merged_vertex(merge);
                return Ok(());
            }

            e_merge = e_merge_next;
            if e_merge == e_merge_end {
                break;
            }
        }

        let limit = self.mesh.edges.len() * 2 + 2;
        let mut steps = 0;
        loop {
            let e_merge_next = self.mesh.onext(e_merge);
            let mut total_angle = 0.0;

            loop {
                let r_a = edge_angle_between(self.mesh.norm(e_org), self.mesh.norm(e_merge));
                if r_a.is_nan() {
                    return Err(InternalError::InvalidEdgeAngle);
                }

                total_angle += r_a;
                if total_angle >= MAX_ROTATION {
                    return Err(InternalError::MergeRotationOverflow);
                }

                if angle_below_tolerance(r_a, self.tolerance) {
                    let next = self.merge_edges(org, e_org, e_merge);
                    self.mesh.copy_origin(e_merge, e_org);
                    e_org = next;
                    l_a = self.angle_to_next(e_org)?;
                    break;
                } else if r_a < l_a {
                    let next = self.insert_next(e_org, e_merge);
                    self.mesh.copy_origin(e_merge, e_org);
                    e_org = next;
                    l_a = self.angle_to_next(e_org)?;
                    break;
                } else {
                    e_org = self.mesh.onext(e_org);
                    l_a = self.angle_to_next(e_org)?;
                }
            }

            if e_merge == e_merge_next {
                break;
            }
            e_merge = e_merge_next;
            if e_merge == e_merge_end {
                break;
            }

            steps += 1;
            if steps > limit {
                return Err(InternalError::MergeRotationOverflow);
            }
        }

        self.release_merged_vertex(merge);

        self.remove_ears(org)?;

        self.protected_vertices.push(org);
        let result = self.process_overlaps(org);
        self.protected_vertices.pop();
        result?;

        self.remove_loops(org);

        Ok(())
    }

    fn angle_to_next(&self, e: HalfEdgeIdx) -> Result<f32, InternalError> {
        let angle = edge_angle_between(self.mesh.norm(e), self.mesh.norm(self.mesh.onext(e)));
        if angle.is_nan() {
            return Err(InternalError::InvalidEdgeAngle);
        }

        Ok(angle)
    }

    fn pop_dict_node(&mut self, edge: EdgeIdx) {
        if let Some(node) = self.mesh.edges.get_mut(edge).and_then(|e| e.node.take()) {
            self.dict.pop(node);
        }
    }

    fn release_merged_vertex(&mut self, v: VertexIdx) {
        if let Some(handle) = self.mesh.vertices.get_mut(v).and_then(|v| v.queue_handle.take()) {
            self.queue.remove(handle);
        }
        if self.event_vertex == Some(v) {
            self.event_vertex = None;
        }
        self.mesh.release_vertex(v);
    }

    /// Moves `r` from its star to the position right after `l` in the star of `l`.
    fn insert_next(&mut self, l: HalfEdgeIdx, r: HalfEdgeIdx) -> HalfEdgeIdx {
        let l_next = self.mesh.onext(l);

        if self.mesh.onext(r) != r {
            let r_origin_prev = self.mesh.oprev(r);
            let r_left_prev = self.mesh.lprev(r);

            self.mesh[r_origin_prev].origin_next = self.mesh.onext(r);
            self.mesh[r_left_prev].left_next = r_origin_prev;
        }

        self.mesh[r].origin_next = l_next;
        self.mesh[r.sym()].left_next = l;
        self.mesh[l_next.sym()].left_next = r;
        self.mesh[l].origin_next = r;

        r
    }

    /// Inserts `e_merge` next to `e_org` when both point in the same direction.
    ///
    /// The order is chosen so that the two edges don't cross the faces between them.
    /// Returns the edge after which the next merged edge is inserted.
    fn merge_edges(&mut self, org: VertexIdx, e_org: HalfEdgeIdx, e_merge: HalfEdgeIdx) -> HalfEdgeIdx {
        if self.mesh.lnext(e_org).sym() == e_merge {
            return self.insert_next(e_org, e_merge);
        }

        if self.mesh.lnext(e_merge).sym() == e_org {
            let prev = self.mesh.oprev(e_org);
            self.insert_next(prev, e_merge);
            return e_org;
        }

        let origin = self.mesh.vertices[org].origin;
        let org_ccw = is_ccw(
            origin,
            self.mesh.dst(e_org),
            self.mesh.dst(self.mesh.lnext(e_org)),
        );
        let merge_ccw = is_ccw(
            origin,
            self.mesh.dst(e_merge),
            self.mesh.dst(self.mesh.lnext(e_merge)),
        );

        let after = if org_ccw == merge_ccw {
            let shorter = vert_leq(self.mesh.dst(e_org), self.mesh.dst(e_merge));
            if self.mesh.goes_right(e_org) && self.mesh.goes_right(e_merge) {
                !shorter
            } else {
                shorter
            }
        } else {
            org_ccw
        };

        if after {
            self.insert_next(e_org, e_merge)
        } else {
            let prev = self.mesh.oprev(e_org);
            self.insert_next(prev, e_merge);
            e_org
        }
    }

    /// Removes the two-edge faces made of a pair of edges going back and forth between
    /// `org` and a vertex that has no other edge.
    fn remove_ears(&mut self, org: VertexIdx) -> Result<(), InternalError> {
        let mut e_org = self.mesh.vertices[org].edge;
        let mut e_org_end = e_org;

        let limit = self.mesh.edges.len() + 1;
        let mut steps = 0;
        loop {
            let mut e_org_next = self.mesh.onext(e_org);

            let is_ear = self.mesh.lnext(e_org).sym() == e_org_next
                && self.mesh.lnext(e_org_next).sym() == e_org;

            if is_ear && e_org_next != e_org {
                let e_join = e_org_next;
                e_org_next = self.mesh.onext(e_join);

                tess_log!(self, "  remove ear {:?} -> {:?}", self.mesh.org(e_org), self.mesh.dst(e_org));

                let org_prev = self.mesh.oprev(e_org);
                let org_left_prev = self.mesh.lprev(e_org);
                let join_left_prev = self.mesh.lprev(e_join);

                self.mesh[org_prev].origin_next = self.mesh.onext(e_join);
                let next = self.mesh.lnext(self.mesh.lnext(e_org));
                self.mesh[org_left_prev].left_next = next;
                let next = self.mesh.lnext(self.mesh.lnext(e_join));
                self.mesh[join_left_prev].left_next = next;

                let far = self.mesh.org_vertex(self.mesh.lnext(e_org));

                self.pop_dict_node(e_org.edge);
                self.pop_dict_node(e_join.edge);
                self.mesh.release_edge(e_org.edge);
                self.mesh.release_edge(e_join.edge);

                if let Some(far) = far {
                    self.release_merged_vertex(far);
                }

                if e_org_next == e_org || e_org_next == e_join || !self.mesh.is_live(e_org_next) {
                    // Nothing left around the vertex.
                    if self.event_vertex == Some(org) {
                        self.event_vertex = None;
                    }
                    tracing::error!(target: "tessel::tessellation", "Vertex at {:?} lost all its edges", self.mesh.vertices[org].origin);
                    return Err(InternalError::MergeEmptyVertex);
                }

                if e_org == e_org_end || e_join == e_org_end {
                    e_org_end = self.mesh.oprev(e_org_next);
                    self.mesh.vertices[org].edge = e_org_end;
                }
            }

            e_org = e_org_next;
            if e_org == e_org_end {
                return Ok(());
            }

            steps += 1;
            if steps > limit {
                return Err(InternalError::MergeRotationOverflow);
            }
        }
    }

    fn process_overlaps(&mut self, org: VertexIdx) -> Result<(), InternalError> {
        let limit = self.mesh.edges.len() + 1;
        let mut restarts = 0;

        'restart: loop {
            let first = match self.mesh.vertices.get(org) {
                Some(vertex) if self.mesh.is_live(vertex.edge) => vertex.edge,
                _ => return Ok(()),
            };

            let mut e = first;
            loop {
                let mut e_next = self.mesh.onext(e);

                let angle = edge_angle_between(self.mesh.norm(e), self.mesh.norm(e_next));
                if angle.is_nan() {
                    return Err(InternalError::InvalidEdgeAngle);
                }

                if e_next != e && angle_below_tolerance(angle, self.tolerance) {
                    let e_join = e_next;
                    e_next = self.mesh.onext(e_join);

                    if self.process_edge_overlap(e, e_join)? {
                        restarts += 1;
                        if restarts > limit {
                            return Err(InternalError::MergeRotationOverflow);
                        }
                        continue 'restart;
                    }

                    if e_join == first {
                        return Ok(());
                    }
                }

                e = e_next;
                if e == first {
                    return Ok(());
                }
            }
        }
    }

    /// Splits the longest of two overlapping edges at the end of the shortest one, then
    /// merges their destinations.
    ///
    /// Returns whether the mesh was changed.
    fn process_edge_overlap(&mut self, e1: HalfEdgeIdx, e2: HalfEdgeIdx) -> Result<bool, InternalError> {
        if self.protected_edges.contains(&e1) || self.protected_edges.contains(&e2) {
            return Ok(false);
        }

        let (mut e1, mut e2) = (e1, e2);
        self.mesh.update_info(e1.edge);
        self.mesh.update_info(e2.edge);

        let swap = if self.mesh.goes_left(e1) {
            !vert_leq(self.mesh.dst(e2), self.mesh.dst(e1))
        } else {
            !vert_leq(self.mesh.dst(e1), self.mesh.dst(e2))
        };
        if swap {
            core::mem::swap(&mut e1, &mut e2);
        }

        tess_log!(self, "  overlap {:?} -> {:?} and {:?}", self.mesh.org(e1), self.mesh.dst(e1), self.mesh.dst(e2));

        let v_org = match self.mesh.org_vertex(e1.sym()) {
            Some(v) if !self.protected_vertices.contains(&v) => v,
            _ => return Ok(false),
        };

        let v_merge = if !vert_eq(self.mesh.dst(e1), self.mesh.dst(e2), self.tolerance) {
            let p = self.mesh.dst(e1);
            self.mesh.split_edge(e2, p)
        } else {
            match self.mesh.org_vertex(e2.sym()) {
                Some(v) => v,
                None => return Ok(false),
            }
        };

        if v_org == v_merge || self.protected_vertices.contains(&v_merge) {
            return Ok(false);
        }

        self.protected_edges.push(e2.sym());
        self.protected_edges.push(e1.sym());

        let result = self.merge_vertices(v_org, v_merge);

        self.protected_edges.pop();
        self.protected_edges.pop();

        result.map(|_| true)
    }

    /// Collapses pairs of parallel edges from `org` that form a two-edge face.
    fn remove_loops(&mut self, org: VertexIdx) {
        let mut e = match self.mesh.vertices.get(org) {
            Some(vertex) if self.mesh.is_live(vertex.edge) => vertex.edge,
            _ => return,
        };
        let mut e_end = e;

        loop {
            let e_next = self.mesh.onext(e);

            let next = self.mesh.lnext(e).sym();
            if self.mesh.lnext(self.mesh.lnext(e)) == e && next == e_next && next != e {
                if self.mesh.vertices[org].edge == e || e_end == e {
                    e_end = e_next;
                    self.mesh.vertices[org].edge = e_next;
                }

                tess_log!(self, "  remove loop {:?} -> {:?}", self.mesh.org(e), self.mesh.dst(e));

                let e_prev = self.mesh.oprev(e);
                let e_sym = e.sym();
                let sym_left_prev = self.mesh.lprev(e_sym);
                let sym_origin_prev = self.mesh.oprev(e_sym);
                let next_sym = next.sym();

                if self.mesh[next].winding != self.mesh[e].winding {
                    let w = self.mesh[e].winding;
                    self.mesh[next].winding += w;
                }
                if self.mesh[next_sym].winding != self.mesh[e_sym].winding {
                    let w = self.mesh[e_sym].winding;
                    self.mesh[next_sym].winding += w;
                }

                self.mesh[sym_left_prev].left_next = next_sym;
                let after = self.mesh.lnext(e_sym);
                self.mesh[next_sym].left_next = after;

                self.mesh[e_prev].origin_next = self.mesh.onext(e);
                let after = self.mesh.onext(e_sym);
                self.mesh[sym_origin_prev].origin_next = after;

                if let Some(far) = self.mesh.org_vertex(sym_origin_prev) {
                    self.mesh.vertices[far].edge = after;
                }

                self.pop_dict_node(e.edge);
                self.mesh.release_edge(e.edge);
            }

            e = e_next;
            if e == e_end {
                break;
            }
        }
    }
}
