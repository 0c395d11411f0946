//! Triangulation of the monotone regions left by the sweep, and removal of degenerate
//! edges.

use crate::error::InternalError;
use crate::math_utils::*;
use crate::mesh::HalfEdgeIdx;
use crate::tessellator::Tessellator;

impl Tessellator {
    /// Triangulates every face inside the fill rule.
    pub(crate) fn tessellate_interior(&mut self) -> Result<(), InternalError> {
        let mark = self.next_mark();
        let fill_rule = self.options.fill_rule;

        let mut i = 0;
        while i < self.mesh.edges_of_interest.len() {
            if let Some(e) = self.mesh.edges_of_interest[i] {
                for &h in &[HalfEdgeIdx::left(e.edge), HalfEdgeIdx::right(e.edge)] {
                    if !self.mesh.is_live(h) || self.mesh[h].mark == mark {
                        continue;
                    }

                    if fill_rule.is_in(self.mesh[h].real_winding) {
                        self.tessellate_mono_region(h, mark)?;
                    } else {
                        self.mesh[h].mark = mark;
                    }
                }
            }
            i += 1;
        }

        Ok(())
    }

    // Adds a triangle to the output unless it is flat.
    fn push_face(&mut self, e: HalfEdgeIdx) {
        if !self.is_degenerate_triangle(e) {
            self.mesh.face_edges.push(Some(e));
        }
    }

    /// Cuts a monotone face into triangles.
    ///
    /// The face is walked from its rightmost vertex along an upper and a lower chain,
    /// emitting triangles as soon as they are convex.
    fn tessellate_mono_region(&mut self, edge: HalfEdgeIdx, mark: u32) -> Result<(), InternalError> {
        if self.mesh.lnext(self.mesh.lnext(edge)) == edge {
            self.mesh[edge].mark = mark;
            return Ok(());
        }

        let edge = match self.remove_degenerate_edges(edge, None, false, mark) {
            Some(e) => e,
            None => return Ok(()),
        };

        let n = self.mesh.face_len(edge);
        let mut e = edge;
        loop {
            self.mesh[e].mark = mark;
            e = self.mesh.lnext(e);
            if e == edge {
                break;
            }
        }

        tess_log!(self, "monotone region of {} edges from {:?}", n, self.mesh.org(edge));

        let mut up = edge;
        let mut steps = 0;
        while vert_leq(self.mesh.dst(up), self.mesh.org(up)) && steps < n {
            up = self.mesh.lprev(up);
            steps += 1;
        }
        steps = 0;
        while vert_leq(self.mesh.org(up), self.mesh.dst(up)) && steps < n {
            up = self.mesh.lnext(up);
            steps += 1;
        }
        let mut lo = self.mesh.lprev(up);

        while self.mesh.lnext(up) != lo {
            if vert_leq(self.mesh.dst(up), self.mesh.org(lo)) {
                // up.dst is on the left, triangles can be formed from lo.org.
                loop {
                    let lo_next = self.mesh.lnext(lo);
                    if lo_next == up {
                        break;
                    }
                    let convex = self.mesh.goes_left(lo_next)
                        || is_ccw(self.mesh.org(lo), self.mesh.dst(lo), self.mesh.dst(lo_next));
                    if !convex {
                        break;
                    }

                    let t = self.mesh.connect_edges(lo_next, lo)?;
                    lo = t.sym();
                    self.push_face(t);
                }
                lo = self.mesh.lprev(lo);
                self.mesh[lo].mark = mark;
            } else {
                // lo.org is on the left, triangles can be formed from up.dst.
                loop {
                    if self.mesh.lnext(lo) == up {
                        break;
                    }
                    let up_prev = self.mesh.lprev(up);
                    let convex = self.mesh.goes_right(up_prev)
                        || !is_ccw(self.mesh.dst(up), self.mesh.org(up), self.mesh.org(up_prev));
                    if !convex {
                        break;
                    }

                    let t = self.mesh.connect_edges(up, up_prev)?;
                    up = t.sym();
                    self.push_face(t);
                }
                up = self.mesh.lnext(up);
                self.mesh[up].mark = mark;
            }
        }

        // The rest is a fan around the leftmost vertex.
        while self.mesh.lnext(self.mesh.lnext(lo)) != up {
            let t = self.mesh.connect_edges(self.mesh.lnext(lo), lo)?;
            self.push_face(t);
            lo = t.sym();
            self.mesh[lo].mark = mark;
        }

        self.push_face(lo);

        Ok(())
    }

    /// Removes the zero-length edges of a face, and its collinear tails.
    ///
    /// Edges are visited along the face until one already marked with `visit` is found,
    /// and marked along the way. In `safe` mode, collinear vertices are removed and the
    /// collapsed vertices are released. Otherwise they are kept, since other faces can
    /// still refer to them, and a flat triangle makes the whole face degenerate.
    ///
    /// Returns `None` if nothing remains of the face. `count` is decremented for each
    /// removed edge.
    pub(crate) fn remove_degenerate_edges(
        &mut self,
        mut e: HalfEdgeIdx,
        count: Option<&mut u32>,
        safe: bool,
        visit: u32,
    ) -> Option<HalfEdgeIdx> {
        let tolerance = self.tolerance;
        let mut removed = 0;

        while self.mesh[e].mark != visit {
            let mut e_lnext = self.mesh.lnext(e);
            self.mesh.update_info(e.edge);
            self.mesh.update_info(e_lnext.edge);

            while vert_eq(self.mesh.org(e), self.mesh.dst(e), tolerance)
                && self.mesh.lnext(self.mesh.lnext(e)) != e
            {
                tess_log!(self, "remove zero-length edge at {:?}", self.mesh.org(e));

                let vertex = self.mesh.org_vertex(e.sym());
                let merge = self.mesh.org_vertex(e);

                let tmp = e;
                e = e_lnext;
                e_lnext = self.mesh.lnext(e);

                let remaining = self.mesh.remove_edge(tmp);
                if let Some(v) = vertex {
                    self.mesh.vertices[v].edge = remaining;
                }
                if safe {
                    if let Some(m) = merge {
                        self.mesh.release_vertex(m);
                    }
                }
                removed += 1;

                self.mesh.update_info(e.edge);
                self.mesh.update_info(e_lnext.edge);
            }

            if self.mesh.lnext(e_lnext) == e {
                // One or two edges left.
                if e_lnext != e {
                    if safe {
                        self.release_origin(e_lnext);
                        self.release_origin(e_lnext.sym());
                    }
                    self.mesh.release_edge(e_lnext.edge);
                    removed += 1;
                }
                if safe {
                    self.release_origin(e);
                    self.release_origin(e.sym());
                }
                self.mesh.release_edge(e.edge);
                removed += 1;

                if let Some(count) = count {
                    *count = count.saturating_sub(removed);
                }
                return None;
            }

            if float_eq(self.mesh.direction(e), self.mesh.direction(e_lnext), tolerance) {
                if safe {
                    let tmp = e_lnext;
                    // e is checked again once the tail is removed.
                    e = self.mesh.lprev(e);

                    let vertex = self.mesh.org_vertex(tmp.sym());
                    let merge = self.mesh.org_vertex(tmp);

                    let remaining = self.mesh.remove_edge(tmp);
                    if let Some(v) = vertex {
                        self.mesh.vertices[v].edge = remaining;
                    }
                    if let Some(m) = merge {
                        self.mesh.release_vertex(m);
                    }
                    removed += 1;
                } else if self.mesh.lnext(self.mesh.lnext(e_lnext)) == e {
                    // Flat triangle.
                    if let Some(count) = count {
                        *count = count.saturating_sub(removed);
                    }
                    return None;
                }
            }

            self.mesh[e].mark = visit;
            e = self.mesh.lnext(e);
        }

        if let Some(count) = count {
            *count = count.saturating_sub(removed);
        }

        Some(e)
    }

    fn release_origin(&mut self, e: HalfEdgeIdx) {
        if let Some(v) = self.mesh.org_vertex(e) {
            self.mesh.release_vertex(v);
        }
    }

    /// Whether a face has two edges, or two consecutive collinear edges.
    pub(crate) fn is_degenerate_triangle(&mut self, e: HalfEdgeIdx) -> bool {
        if self.mesh.lnext(self.mesh.lnext(e)) == e {
            return true;
        }

        let first = e;
        let mut e = e;
        loop {
            let next = self.mesh.lnext(e);
            self.mesh.update_info(e.edge);
            self.mesh.update_info(next.edge);

            if float_eq(self.mesh.direction(e), self.mesh.direction(next), self.tolerance) {
                return true;
            }

            e = next;
            if e == first {
                return false;
            }
        }
    }
}
