//! The sweep line status: edges crossing the sweep line, sorted from bottom to top.
//!
//! Each node caches the position where its edge crosses the sweep line (`current`),
//! which is updated for every event. Nodes also carry the monotone decomposition
//! helper of their edge.

use crate::math::*;
use crate::math_utils::*;
use crate::mesh::{Edge, EdgeIdx, HalfEdgeIdx, Mesh};

use alloc::vec::Vec;
use core::cmp::Ordering;
use slotmap::{new_key_type, SlotMap};

#[cfg(not(feature = "std"))]
use num_traits::Float;

new_key_type! {
    pub(crate) struct NodeIdx;
}

/// Classification of a sweep event, from the point of view of one angle between two
/// consecutive edges around the event vertex.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum VertexType {
    /// Both edges go right, non-convex angle.
    Start,
    /// Both edges go left, non-convex angle.
    End,
    /// Both edges go right, convex angle.
    Split,
    /// Both edges go left, convex angle.
    Merge,
    /// The region is below the vertex.
    RegularTop,
    /// The region is above the vertex.
    RegularBottom,
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct Helper {
    pub e1: Option<HalfEdgeIdx>,
    pub kind: VertexType,
}

impl Helper {
    pub fn new(e1: HalfEdgeIdx, kind: VertexType) -> Self {
        Helper {
            e1: Some(e1),
            kind,
        }
    }
}

pub(crate) struct DictNode {
    pub org: Point,
    pub norm: Vector,
    /// Intersection of the edge with the sweep line.
    pub current: Point,
    /// Rightmost end of the edge.
    pub dst: Point,
    pub edge: EdgeIdx,
    pub direction: f32,
    pub winding_above: i16,
    /// Whether the edge is parametrized by x rather than y.
    pub horizontal: bool,
    pub helper: Helper,
}

impl DictNode {
    #[inline]
    fn less(&self, other: &DictNode) -> bool {
        if self.current.y == other.current.y {
            self.direction < other.direction
        } else {
            self.current.y < other.current.y
        }
    }

    fn order(&self, other: &DictNode) -> Ordering {
        if self.less(other) {
            Ordering::Less
        } else if other.less(self) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum IntersectionEvent {
    /// The edges cross somewhere right of the sweep line.
    Regular,
    /// The dictionary edge passes through the event, it must be split there.
    EventIsIntersection,
    /// The dictionary edge ends on the new edge.
    EdgeConnection1,
    /// The new edge ends on the dictionary edge.
    EdgeConnection2,
    /// Both edges end at the same place.
    Merge,
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct Intersection {
    pub node: NodeIdx,
    pub point: Point,
    pub event: IntersectionEvent,
}

fn bbox_overlap(a0: Point, a1: Point, b0: Point, b1: Point, tolerance: f32) -> bool {
    let a_min = a0.min(a1);
    let a_max = a0.max(a1);
    let b_min = b0.min(b1);
    let b_max = b0.max(b1);

    a_min.x <= b_max.x + tolerance
        && b_min.x <= a_max.x + tolerance
        && a_min.y <= b_max.y + tolerance
        && b_min.y <= a_max.y + tolerance
}

/// Tolerance for an endpoint lying on another edge.
///
/// Crossings computed close to an endpoint carry an error relative to the magnitude of
/// the coordinates, so the absolute tolerance is scaled by it.
fn snap_tolerance(tolerance: f32, points: &[Point]) -> f32 {
    let magnitude = points
        .iter()
        .fold(1.0f32, |m, p| m.max(p.x.abs()).max(p.y.abs()));
    tolerance * magnitude * 2.0
}

/// Distance from `p` to the line through `a` and `b`, and the parameter of its
/// projection on the segment.
fn distance_to_segment(p: Point, a: Point, b: Point) -> (f32, f32) {
    let d = b - a;
    let q = p - a;
    let square_length = d.square_length();
    if square_length == 0.0 {
        return (f32::INFINITY, 0.0);
    }

    (
        d.cross(q).abs() / square_length.sqrt(),
        d.dot(q) / square_length,
    )
}

pub(crate) struct EdgeDict {
    pub event: Point,
    nodes: SlotMap<NodeIdx, DictNode>,
    order: Vec<NodeIdx>,
}

impl EdgeDict {
    pub fn new() -> Self {
        EdgeDict {
            event: Point::zero(),
            nodes: SlotMap::with_key(),
            order: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.event = Point::zero();
        self.nodes.clear();
        self.order.clear();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn node(&self, id: NodeIdx) -> Option<&DictNode> {
        self.nodes.get(id)
    }

    #[inline]
    pub fn node_mut(&mut self, id: NodeIdx) -> Option<&mut DictNode> {
        self.nodes.get_mut(id)
    }

    /// Inserts an edge starting or ending at the current event.
    ///
    /// Returns `None` if the edge is not connected to the event.
    pub fn push(&mut self, mesh: &Mesh, edge_idx: EdgeIdx, winding_above: i16) -> Option<NodeIdx> {
        let edge = &mesh.edges[edge_idx];
        let org = edge.left.origin;
        let dst = edge.right.origin;

        let far = if org == self.event {
            dst
        } else if dst == self.event {
            org
        } else {
            return None;
        };

        let norm = far - self.event;
        let node = DictNode {
            org: self.event,
            norm,
            current: self.event,
            dst: far,
            edge: edge_idx,
            direction: edge.direction,
            winding_above,
            horizontal: norm.x.abs() > f32::EPSILON,
            helper: Helper {
                e1: None,
                kind: VertexType::Start,
            },
        };

        let position = {
            let nodes = &self.nodes;
            self.order.partition_point(|id| !node.less(&nodes[*id]))
        };
        let id = self.nodes.insert(node);
        self.order.insert(position, id);

        Some(id)
    }

    pub fn pop(&mut self, id: NodeIdx) {
        if self.nodes.remove(id).is_some() {
            self.order.retain(|n| *n != id);
        }
    }

    /// Moves the sweep line to `event`, recomputing where every edge crosses it and
    /// dropping the edges that are behind.
    ///
    /// `vertex` is the table index of the event vertex.
    pub fn update(&mut self, mesh: &mut Mesh, event: Point, vertex: u32, tolerance: f32) {
        self.event = event;

        let nodes = &mut self.nodes;
        self.order.retain(|&id| {
            let n = &mut nodes[id];
            let edge = match mesh.edges.get_mut(n.edge) {
                Some(edge) => edge,
                None => {
                    nodes.remove(id);
                    return false;
                }
            };

            n.direction = edge.direction;

            if edge.right_org() == vertex {
                n.current = n.dst;
            } else {
                let t = if n.horizontal {
                    (event.x - n.org.x) / n.norm.x
                } else {
                    (event.y - n.org.y) / n.norm.y
                };

                if !(0.0..=1.0).contains(&t) {
                    edge.node = None;
                    nodes.remove(id);
                    return false;
                }

                n.current = n.org + n.norm * t;
            }

            if n.current.x == n.dst.x
                && (n.current.y - n.dst.y).abs() < tolerance
                && n.current.y < event.y
            {
                edge.node = None;
                nodes.remove(id);
                return false;
            }

            true
        });

        let nodes = &self.nodes;
        self.order.sort_by(|a, b| nodes[*a].order(&nodes[*b]));
    }

    /// Recomputes the far end of a dictionary edge after it was split.
    pub fn refresh(&mut self, mesh: &mut Mesh, id: NodeIdx) {
        let n = match self.nodes.get_mut(id) {
            Some(n) => n,
            None => return,
        };
        let edge = match mesh.edges.get_mut(n.edge) {
            Some(edge) => edge,
            None => return,
        };

        edge.reset_info();
        let org = edge.left.origin;
        let dst = edge.right.origin;
        if edge.inverted {
            n.norm = org - dst;
            n.dst = org;
        } else {
            n.norm = dst - org;
            n.dst = dst;
        }
        n.horizontal = n.norm.x.abs() > f32::EPSILON;
        n.direction = edge.direction;
    }

    fn live_nodes<'l>(&'l self, mesh: &'l Mesh) -> impl Iterator<Item = (NodeIdx, &'l DictNode)> + 'l {
        self.order.iter().filter_map(move |id| {
            let n = &self.nodes[*id];
            if mesh.edges.contains_key(n.edge) {
                Some((*id, n))
            } else {
                None
            }
        })
    }

    /// Looks for an edge passing through the event vertex.
    pub fn check_vertex(&self, mesh: &Mesh, org: Point, tolerance: f32) -> Option<Intersection> {
        for (id, n) in self.live_nodes(mesh) {
            if vert_eq(n.current, org, tolerance) && !vert_eq(n.org, org, tolerance) {
                if vert_eq(n.current, n.dst, tolerance) {
                    // Just the end of the edge.
                    continue;
                }

                return Some(Intersection {
                    node: id,
                    point: self.event,
                    event: IntersectionEvent::EventIsIntersection,
                });
            }
        }

        None
    }

    /// Looks for the first dictionary edge intersecting the edge from `org` (the event)
    /// to `dst`.
    pub fn check_edge(
        &self,
        mesh: &Mesh,
        org: Point,
        dst: Point,
        tolerance: f32,
    ) -> Option<Intersection> {
        // An endpoint touching an edge only wins if no other edge crosses this one.
        let mut touching = None;

        for (id, n) in self.live_nodes(mesh) {
            let n_cur = n.current;
            let n_dst = n.dst;

            if vert_eq(n.org, org, tolerance) || vert_eq(n_dst, org, tolerance) {
                // Common origin.
                continue;
            } else if vert_eq(n_cur, org, tolerance) {
                if vert_eq(n_cur, n_dst, tolerance) {
                    continue;
                }
                return Some(Intersection {
                    node: id,
                    point: self.event,
                    event: IntersectionEvent::EventIsIntersection,
                });
            }

            if vert_eq(dst, n_dst, tolerance) {
                // Common destination.
                continue;
            }

            let snap = snap_tolerance(tolerance, &[org, dst, n_cur, n_dst]);
            if !bbox_overlap(org, dst, n_cur, n_dst, snap) {
                continue;
            }

            let a = dst - org;
            let b = n_dst - n_cur;

            if vert_eq(n_cur, n_dst, tolerance) {
                // The remaining part of the dictionary edge is a point: it either ends on
                // the new edge or not at all.
                let ends_on_edge = if a.x.abs() < tolerance {
                    a.y.abs() < tolerance
                } else {
                    let s = (n_dst.x - org.x) / a.x;
                    (0.0..=1.0).contains(&s) && (n_dst.y - (org.y + s * a.y)).abs() <= tolerance
                };

                if ends_on_edge {
                    return Some(Intersection {
                        node: id,
                        point: n_cur,
                        event: IntersectionEvent::EdgeConnection1,
                    });
                }
                continue;
            }

            let (distance, param) = distance_to_segment(n_dst, org, dst);
            if distance <= snap && param > 0.0 && param < 1.0 && !vert_eq(n_dst, org, snap) {
                // The dictionary edge ends on the new edge.
                if touching.is_none() {
                    let event = if vert_eq(n_dst, dst, snap) {
                        IntersectionEvent::Merge
                    } else {
                        IntersectionEvent::EdgeConnection1
                    };
                    touching = Some(Intersection {
                        node: id,
                        point: n_dst,
                        event,
                    });
                }
                continue;
            }

            let (distance, param) = distance_to_segment(dst, n_cur, n_dst);
            if distance <= snap && param > 0.0 && param < 1.0 && !vert_eq(dst, n_cur, snap) {
                // The new edge ends on the dictionary edge.
                if touching.is_none() {
                    touching = Some(Intersection {
                        node: id,
                        point: dst,
                        event: IntersectionEvent::EdgeConnection2,
                    });
                }
                continue;
            }

            let denom = b.y * a.x - b.x * a.y;
            if denom == 0.0 {
                continue;
            }

            let ca = org - n_cur;
            let s = (ca.y * b.x - ca.x * b.y) / denom;
            let t = (ca.y * a.x - ca.x * a.y) / denom;

            if (0.0..=1.0).contains(&s) && (0.0..=1.0).contains(&t) {
                let point = org + a * s;
                let on_dst = vert_eq(point, dst, tolerance);
                let on_node_dst = vert_eq(point, n_dst, tolerance);

                let (point, event) = match (on_node_dst, on_dst) {
                    (true, true) => (point, IntersectionEvent::Merge),
                    (false, true) => (point, IntersectionEvent::EdgeConnection2),
                    (true, false) => (n_dst, IntersectionEvent::EdgeConnection1),
                    (false, false) => (point, IntersectionEvent::Regular),
                };

                return Some(Intersection {
                    node: id,
                    point,
                    event,
                });
            }
        }

        touching
    }

    /// Finds the edge directly below `edge`, which starts at the event.
    pub fn edge_below_edge(&self, mesh: &Mesh, edge: &Edge) -> Option<NodeIdx> {
        let left = edge.left_vec();
        let lower_bound = self.order.partition_point(|id| {
            let n = &self.nodes[*id];
            if n.current.y == left.y {
                n.direction < edge.direction
            } else {
                n.current.y < left.y
            }
        });

        self.scan_below(mesh, lower_bound, |n| n.current == self.event)
    }

    /// Finds the edge directly below `point`, ignoring the edges ending on `vertex`.
    pub fn edge_below_point(&self, mesh: &Mesh, point: Point, vertex: u32) -> Option<NodeIdx> {
        let lower_bound = self
            .order
            .partition_point(|id| self.nodes[*id].current.y < point.y);

        self.scan_below(mesh, lower_bound, |n| {
            mesh.edges[n.edge].right_org() == vertex || n.current == point
        })
    }

    // Walks down from the node below `lower_bound`, skipping dead edges and the nodes
    // selected by `skip`. The bottom node is returned even if `skip` selects it.
    fn scan_below(
        &self,
        mesh: &Mesh,
        lower_bound: usize,
        skip: impl Fn(&DictNode) -> bool,
    ) -> Option<NodeIdx> {
        let mut i = lower_bound.checked_sub(1)?;
        loop {
            let id = self.order[i];
            let n = &self.nodes[id];
            let live = mesh.edges.contains_key(n.edge);
            if i == 0 {
                return if live { Some(id) } else { None };
            }
            if live && !skip(n) {
                return Some(id);
            }
            i -= 1;
        }
    }
}

#[cfg(test)]
fn dict_edge(mesh: &mut Mesh, from: Point, to: Point) -> EdgeIdx {
    let e = mesh.push_vertex(None, from, false, false);
    let e = mesh.push_vertex(Some(e), to, false, false);
    mesh.update_info(e.edge);
    e.edge
}

#[test]
fn sorted_by_sweep_line_crossing() {
    let mut mesh = Mesh::new();
    let low = dict_edge(&mut mesh, point(0.0, 0.0), point(10.0, 0.0));
    let high = dict_edge(&mut mesh, point(0.0, 5.0), point(10.0, 5.0));
    let steep = dict_edge(&mut mesh, point(0.0, 0.0), point(10.0, 10.0));

    let mut dict = EdgeDict::new();
    dict.event = point(0.0, 5.0);
    let n_high = dict.push(&mesh, high, 1).unwrap();
    dict.event = point(0.0, 0.0);
    let n_steep = dict.push(&mesh, steep, 1).unwrap();
    let n_low = dict.push(&mesh, low, 0).unwrap();
    assert_eq!(dict.order, [n_low, n_steep, n_high]);

    // Not connected to the event.
    assert!(dict.push(&mesh, high, 0).is_none());

    // Past x = 5, the steep edge is above the high one.
    let e = mesh.push_vertex(None, point(6.0, 20.0), false, false);
    let v = mesh[e].vertex;
    dict.update(&mut mesh, point(6.0, 20.0), v, MATH_TOLERANCE);
    assert_eq!(dict.order, [n_low, n_high, n_steep]);
    assert_eq!(dict.node(n_steep).unwrap().current, point(6.0, 6.0));

    // Behind the end of the edges.
    dict.update(&mut mesh, point(11.0, 0.0), v, MATH_TOLERANCE);
    assert_eq!(dict.len(), 0);
    assert!(mesh.edges[low].node.is_none());
}

#[test]
fn edges_below() {
    let mut mesh = Mesh::new();
    let low = dict_edge(&mut mesh, point(0.0, 0.0), point(10.0, 0.0));
    let high = dict_edge(&mut mesh, point(0.0, 10.0), point(10.0, 10.0));

    let mut dict = EdgeDict::new();
    dict.event = point(0.0, 0.0);
    let n_low = dict.push(&mesh, low, 1).unwrap();
    dict.event = point(0.0, 10.0);
    dict.push(&mesh, high, 0).unwrap();

    let e = mesh.push_vertex(None, point(5.0, 5.0), false, false);
    let v = mesh[e].vertex;
    dict.update(&mut mesh, point(5.0, 5.0), v, MATH_TOLERANCE);

    assert_eq!(dict.edge_below_point(&mesh, point(5.0, 5.0), v), Some(n_low));
    assert_eq!(dict.edge_below_point(&mesh, point(5.0, -1.0), v), None);

    let right = dict_edge(&mut mesh, point(5.0, 5.0), point(8.0, 6.0));
    assert_eq!(dict.edge_below_edge(&mesh, &mesh.edges[right]), Some(n_low));

    // Released edges are ignored.
    mesh.release_edge(low);
    assert_eq!(dict.edge_below_point(&mesh, point(5.0, 5.0), v), None);
}

#[test]
fn intersections() {
    let mut mesh = Mesh::new();
    let crossing = dict_edge(&mut mesh, point(0.0, 0.0), point(10.0, 10.0));

    let mut dict = EdgeDict::new();
    dict.event = point(0.0, 0.0);
    dict.push(&mesh, crossing, 0).unwrap();

    let e = mesh.push_vertex(None, point(2.0, 8.0), false, false);
    let v = mesh[e].vertex;
    dict.update(&mut mesh, point(2.0, 8.0), v, MATH_TOLERANCE);

    let isect = dict
        .check_edge(&mesh, point(2.0, 8.0), point(8.0, 2.0), MATH_TOLERANCE)
        .unwrap();
    assert_eq!(isect.event, IntersectionEvent::Regular);
    assert!((isect.point - point(5.0, 5.0)).length() < 1e-4);

    // Ends on the dictionary edge.
    let isect = dict
        .check_edge(&mesh, point(2.0, 8.0), point(6.0, 6.0), MATH_TOLERANCE)
        .unwrap();
    assert_eq!(isect.event, IntersectionEvent::EdgeConnection2);

    // Stays above.
    assert!(dict
        .check_edge(&mesh, point(2.0, 8.0), point(9.0, 12.0), MATH_TOLERANCE)
        .is_none());

    // The event itself is on the dictionary edge.
    let e = mesh.push_vertex(None, point(4.0, 4.0), false, false);
    let v = mesh[e].vertex;
    dict.update(&mut mesh, point(4.0, 4.0), v, MATH_TOLERANCE);
    let isect = dict
        .check_vertex(&mesh, point(4.0, 4.0), MATH_TOLERANCE)
        .unwrap();
    assert_eq!(isect.event, IntersectionEvent::EventIsIntersection);
    assert_eq!(isect.point, point(4.0, 4.0));
}

#[test]
fn endpoint_near_edge() {
    let mut mesh = Mesh::new();
    let low = dict_edge(&mut mesh, point(0.0, 0.0), point(90.0, 30.0));
    let high = dict_edge(&mut mesh, point(0.0, 40.0), point(90.0, 0.0));

    let mut dict = EdgeDict::new();
    dict.event = point(0.0, 0.0);
    let n_low = dict.push(&mesh, low, 0).unwrap();

    let e = mesh.push_vertex(None, point(10.0, 20.0), false, false);
    let v = mesh[e].vertex;
    dict.update(&mut mesh, point(10.0, 20.0), v, MATH_TOLERANCE);

    // The destination is off the line by more than the absolute tolerance.
    let dst = point(60.0, 20.00001);
    let isect = dict
        .check_edge(&mesh, point(10.0, 20.0), dst, MATH_TOLERANCE)
        .unwrap();
    assert_eq!(isect.node, n_low);
    assert_eq!(isect.event, IntersectionEvent::EdgeConnection2);
    assert_eq!(isect.point, dst);

    // A crossing further up the dictionary takes precedence.
    dict.event = point(0.0, 40.0);
    let n_high = dict.push(&mesh, high, 1).unwrap();
    dict.event = point(10.0, 20.0);
    dict.update(&mut mesh, point(10.0, 20.0), v, MATH_TOLERANCE);
    let isect = dict
        .check_edge(&mesh, point(10.0, 20.0), dst, MATH_TOLERANCE)
        .unwrap();
    assert_eq!(isect.node, n_high);
    assert_eq!(isect.event, IntersectionEvent::Regular);
    assert!((isect.point - point(45.0, 20.0)).length() < 1e-3);
}
