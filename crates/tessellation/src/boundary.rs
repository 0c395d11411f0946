//! Antialiasing boundaries.
//!
//! After the sweep, the outline of the filled area is followed along the faces that are
//! outside of the fill rule, producing one ring of [`FaceEdge`]s per connected outline.
//! Each ring vertex is then displaced outward by the boundary offset (and optionally the
//! mesh vertex inward by the inset) along the bisector of its corner. The output is a ribbon
//! of quads between the mesh vertices and the displaced ones.
//!
//! With [`RelocateRule::DistanceField`], convex corners get a fan of extra vertices instead
//! of a single mitered one.

use crate::geom::VertexNormal;
use crate::math::*;
use crate::math_utils::*;
use crate::mesh::{Boundary, FaceEdge, FaceEdgeIdx, HalfEdgeIdx};
use crate::tessellator::Tessellator;
use crate::{FillVertex, RelocateRule};

use alloc::vec::Vec;
use core::f32::consts::{FRAC_PI_4, PI};

#[cfg(not(feature = "std"))]
use num_traits::Float;

/// Beyond this miter length, the displaced vertex is clamped and faded.
const MAX_MITER_LENGTH: f32 = 3.0;

fn normalize_or_zero(v: Vector) -> Vector {
    let len = v.length();
    if len > 0.0 && len.is_finite() {
        v / len
    } else {
        Vector::zero()
    }
}

fn rotate_around(p: Point, center: Point, angle: f32) -> Point {
    let (sin, cos) = angle.sin_cos();
    let d = p - center;
    point(
        center.x + d.x * cos - d.y * sin,
        center.y + d.x * sin + d.y * cos,
    )
}

impl Tessellator {
    /// Follows the outline of the filled area.
    pub(crate) fn compute_boundary(&mut self) {
        self.mesh.boundaries.clear();
        self.mesh.faces.clear();

        let mark = self.next_mark();
        let fill_rule = self.options.fill_rule;

        let mut i = 0;
        while i < self.mesh.edges_of_interest.len() {
            if let Some(e) = self.mesh.edges_of_interest[i] {
                for &h in &[HalfEdgeIdx::left(e.edge), HalfEdgeIdx::right(e.edge)] {
                    if !self.mesh.is_live(h) || self.mesh[h].mark == mark {
                        continue;
                    }

                    if fill_rule.is_out(self.mesh[h].real_winding) {
                        self.follow_boundary(h, mark);
                    } else {
                        self.mesh[h].mark = mark;
                    }
                }
            }
            i += 1;
        }

        for i in 0..self.mesh.boundaries.len() {
            let head = self.mesh.boundaries[i].head;
            match self.remove_degenerate_ring(head) {
                Some(head) => self.mesh.boundaries[i].head = head,
                None => self.mesh.boundaries[i].degenerate = true,
            }
        }

        tess_log!(
            self,
            "{} boundaries, {} segments",
            self.mesh.boundaries.len(),
            self.mesh.faces.len()
        );
    }

    /// Next half-edge of the outline after `e`, on an outside face.
    ///
    /// Where several outlines touch at a vertex, the vertex is split so that each ring
    /// gets its own copy.
    fn find_next_boundary(&mut self, e: HalfEdgeIdx) -> HalfEdgeIdx {
        if self.mesh.onext(self.mesh.onext(e)) == e {
            return e;
        }

        let fill_rule = self.options.fill_rule;
        let mut prev = self.mesh.onext(e);
        while fill_rule.is_in(self.mesh[prev].real_winding) && prev != e {
            prev = self.mesh.onext(prev);
        }

        if prev != e {
            self.mesh.split_vertex(e, prev);
        }

        prev
    }

    fn follow_boundary(&mut self, mut e: HalfEdgeIdx, mark: u32) {
        let mut face: Option<FaceEdgeIdx> = None;

        while self.mesh[e].mark != mark {
            let target = self.mesh.lnext(e);
            let e_next = self.find_next_boundary(target);

            let vertex = self.mesh.org_vertex(e);
            let origin = self.mesh.org(e);
            self.mesh.update_info(e.edge);
            let direction = self.mesh.direction(e);
            let segment = |next| FaceEdge {
                next,
                vertex,
                origin,
                displaced: origin,
                normal: Vector::zero(),
                value: 0.0,
                direction,
                angle: 0.0,
                extra: 0,
                split_vertex: target != e_next,
            };

            let id = match face {
                None => {
                    let id = self.mesh.faces.insert_with_key(segment);
                    self.mesh.boundaries.push(Boundary {
                        head: id,
                        degenerate: false,
                    });
                    id
                }
                Some(prev) => {
                    let head = self.mesh.faces[prev].next;
                    let id = self.mesh.faces.insert(segment(head));
                    self.mesh.faces[prev].next = id;
                    id
                }
            };
            face = Some(id);

            self.mesh[e].mark = mark;
            e = e_next;
        }
    }

    /// Removes the coincident vertices of a ring.
    ///
    /// Returns the new head of the ring, or `None` if the ring is degenerate.
    fn remove_degenerate_ring(&mut self, head: FaceEdgeIdx) -> Option<FaceEdgeIdx> {
        let faces = &mut self.mesh.faces;
        let tolerance = self.tolerance;

        if faces[faces[head].next].next == head {
            // Less than three segments.
            return None;
        }

        let mut end = head;
        let mut e = head;
        loop {
            let mut e_lnext = faces[e].next;

            while vert_eq(faces[e].origin, faces[e_lnext].origin, tolerance)
                && faces[faces[e].next].next != e
            {
                let removed = faces[e].next;
                e_lnext = faces[removed].next;
                if end == removed {
                    end = e_lnext;
                }

                faces[e].next = e_lnext;
                faces.remove(removed);
            }

            if faces[e_lnext].next == e {
                return None;
            }

            if float_eq(faces[e].direction, faces[e_lnext].direction, tolerance)
                && faces[faces[e_lnext].next].next == e
            {
                // Flat triangle.
                return None;
            }

            e = e_lnext;
            if e == end {
                return Some(end);
            }
        }
    }

    pub(crate) fn displace_boundaries(&mut self) {
        for i in 0..self.mesh.boundaries.len() {
            if self.mesh.boundaries[i].degenerate {
                continue;
            }

            let head = self.mesh.boundaries[i].head;
            let mut e = head;
            loop {
                self.displace_boundary(e);
                e = self.mesh.faces[e].next;
                if e == head {
                    break;
                }
            }
        }
    }

    /// Computes the displaced position of the vertex after `face`.
    fn displace_boundary(&mut self, face: FaceEdgeIdx) {
        let next = self.mesh.faces[face].next;
        let next2 = self.mesh.faces[next].next;

        let v0 = self.mesh.faces[face].origin;
        let v1 = self.mesh.faces[next].origin;
        let v2 = self.mesh.faces[next2].origin;

        let n = VertexNormal::new(v0, v1, v2);

        let rule = self.options.relocate_rule;
        let mut offset = self.options.boundary_offset;
        let mut inset = self.options.boundary_inset;

        let relocate = match rule {
            RelocateRule::Always | RelocateRule::Monotonize | RelocateRule::DistanceField => true,
            RelocateRule::Auto if self.mesh.faces[next].split_vertex => true,
            RelocateRule::Never | RelocateRule::Auto => {
                // The whole inset goes to the offset instead.
                offset += inset * 0.5;
                inset = 0.0;
                false
            }
        };

        // Points toward the interior, away from the displaced vertex.
        let normal = if n.cross < 0.0 { n.bisector } else { -n.bisector };
        let vertex = self.mesh.faces[next].vertex;
        if let Some(v) = vertex.and_then(|v| self.mesh.vertices.get_mut(v)) {
            v.normal = normal;
        }

        let content_scale = self.options.content_scale;
        let mut miter = n.miter_length;
        let segment = &mut self.mesh.faces[next];
        segment.normal = normal;

        if n.cross < 0.0 && rule == RelocateRule::DistanceField {
            let a0 = v0 - v1;
            let a2 = v2 - v1;
            let angle = PI - a0.cross(a2).atan2(a0.dot(a2));
            let length = offset * angle * content_scale;

            let min_vertices = (angle / FRAC_PI_4).floor() as u16;
            let vertices = (length / 4.0).floor() as u16;

            let edge = v1 - v0;
            let perp = normalize_or_zero(vector(-edge.y, edge.x));

            segment.displaced = v1 + perp * offset;
            segment.extra = min_vertices.max(vertices);
            segment.value = 0.0;
            segment.angle = angle;
        } else {
            segment.value = 0.0;
            segment.extra = 0;
            if miter.is_nan() {
                miter = MAX_MITER_LENGTH;
            } else if miter > MAX_MITER_LENGTH {
                segment.value = 1.0 - MAX_MITER_LENGTH / miter;
                miter = MAX_MITER_LENGTH;
            }

            let offset_mod = (miter * offset).copysign(n.cross);
            segment.displaced = v1 + n.bisector * offset_mod;
        }

        if relocate {
            let inset_mod = (miter * inset).copysign(n.cross);
            if let Some(v) = vertex {
                if self.mesh.vertices.contains_key(v) {
                    self.mesh.relocate(v, v1 - n.bisector * inset_mod);
                }
            }
        }
    }

    /// Appends the ribbon vertices and triangles of every ring.
    ///
    /// `local` maps the export index of the mesh vertices to their output index.
    pub(crate) fn export_boundaries(
        &self,
        local: &[Option<u32>],
        vertices: &mut Vec<FillVertex>,
        triangles: &mut Vec<[u32; 3]>,
    ) {
        let faces = &self.mesh.faces;

        for boundary in &self.mesh.boundaries {
            if boundary.degenerate {
                continue;
            }

            let head = boundary.head;
            let first_extra = vertices.len() as u32;
            let mut e = faces[head].next;
            self.export_ring_vertex(e, local, vertices, triangles);

            loop {
                let tl = vertices.len() as u32 - 1;
                let tr = vertices.len() as u32;
                let bl = self.ring_vertex_id(local, e);
                let br = self.ring_vertex_id(local, faces[e].next);

                e = faces[e].next;
                self.export_ring_vertex(e, local, vertices, triangles);
                push_quad(triangles, tl, tr, bl, br);

                if e == head {
                    break;
                }
            }

            let tl = vertices.len() as u32 - 1;
            let bl = self.ring_vertex_id(local, e);
            let br = self.ring_vertex_id(local, faces[e].next);
            push_quad(triangles, tl, first_extra, bl, br);
        }
    }

    fn ring_vertex_id(&self, local: &[Option<u32>], e: FaceEdgeIdx) -> Option<u32> {
        self.local_id(local, self.mesh.faces[e].vertex?)
    }

    // The displaced vertex of a ring segment, followed by its fan if any.
    fn export_ring_vertex(
        &self,
        e: FaceEdgeIdx,
        local: &[Option<u32>],
        vertices: &mut Vec<FillVertex>,
        triangles: &mut Vec<[u32; 3]>,
    ) {
        let segment = &self.mesh.faces[e];
        let inner = segment
            .vertex
            .and_then(|v| self.mesh.vertices.get(v))
            .map_or(segment.origin, |v| v.origin);

        let mut prev = vertices.len() as u32;
        vertices.push(FillVertex {
            position: segment.displaced,
            blend_value: segment.value,
            normal: normalize_or_zero(inner - segment.displaced),
        });

        if segment.extra == 0 {
            return;
        }

        let center = self.ring_vertex_id(local, e);
        let incr = segment.angle / segment.extra as f32;
        let mut angle = -incr;
        for _ in 0..segment.extra {
            let position = rotate_around(segment.displaced, segment.origin, angle);
            let id = vertices.len() as u32;
            vertices.push(FillVertex {
                position,
                blend_value: segment.value,
                normal: normalize_or_zero(inner - position),
            });

            if let Some(center) = center {
                triangles.push([center, id, prev]);
            }

            prev = id;
            angle -= incr;
        }
    }
}

fn push_quad(triangles: &mut Vec<[u32; 3]>, tl: u32, tr: u32, bl: Option<u32>, br: Option<u32>) {
    if let (Some(bl), Some(br)) = (bl, br) {
        triangles.push([tl, bl, tr]);
        triangles.push([bl, br, tr]);
    }
}
