//! Priority queue of sweep events.
//!
//! The vertices known when the sweep starts are sorted once into an array that is
//! consumed from the end. Vertices created during the sweep (at intersections) go to
//! a binary heap. The minimum of the queue is the smaller of both minimums.

use crate::math::Point;
use crate::math_utils::vert_leq;
use crate::mesh::{Mesh, VertexIdx};

use alloc::vec::Vec;
use core::cmp::Ordering;

/// Position of a vertex in the queue, needed to remove it before it is extracted.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum QueueHandle {
    Sorted(u32),
    Heap(u32),
}

#[derive(Copy, Clone, Debug)]
struct Key {
    position: Point,
    vertex: VertexIdx,
}

#[inline]
fn key_leq(a: &Key, b: &Key) -> bool {
    vert_leq(a.position, b.position)
}

fn sweep_order(a: &Key, b: &Key) -> Ordering {
    a.position
        .x
        .partial_cmp(&b.position.x)
        .unwrap_or(Ordering::Equal)
        .then(
            a.position
                .y
                .partial_cmp(&b.position.y)
                .unwrap_or(Ordering::Equal),
        )
}

struct HeapSlot {
    key: Option<Key>,
    node: u32,
    next_free: Option<u32>,
}

/// Binary heap with stable handles. Positions are 1-based, `nodes[0]` is unused.
struct Heap {
    nodes: Vec<u32>,
    slots: Vec<HeapSlot>,
    size: u32,
    free_list: Option<u32>,
}

impl Heap {
    fn new() -> Self {
        Heap {
            nodes: alloc::vec![0],
            slots: Vec::new(),
            size: 0,
            free_list: None,
        }
    }

    fn clear(&mut self) {
        self.nodes.truncate(1);
        self.slots.clear();
        self.size = 0;
        self.free_list = None;
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.size == 0
    }

    #[inline]
    fn key(&self, node: u32) -> &Key {
        let handle = self.nodes[node as usize];
        match self.slots[handle as usize].key {
            Some(ref key) => key,
            None => unreachable!("empty heap slot in use"),
        }
    }

    fn min(&self) -> Option<&Key> {
        if self.is_empty() {
            return None;
        }
        Some(self.key(1))
    }

    fn insert(&mut self, key: Key) -> u32 {
        self.size += 1;
        let curr = self.size;
        if curr as usize >= self.nodes.len() {
            self.nodes.push(0);
        }

        let handle = match self.free_list {
            Some(handle) => {
                self.free_list = self.slots[handle as usize].next_free.take();
                self.slots[handle as usize].key = Some(key);
                handle
            }
            None => {
                self.slots.push(HeapSlot {
                    key: Some(key),
                    node: 0,
                    next_free: None,
                });
                self.slots.len() as u32 - 1
            }
        };

        self.nodes[curr as usize] = handle;
        self.slots[handle as usize].node = curr;
        self.float_up(curr);

        handle
    }

    fn release_slot(&mut self, handle: u32) -> Option<Key> {
        let slot = &mut self.slots[handle as usize];
        slot.next_free = self.free_list;
        self.free_list = Some(handle);
        slot.key.take()
    }

    fn extract_min(&mut self) -> Option<Key> {
        if self.is_empty() {
            return None;
        }

        let h_min = self.nodes[1];
        let last = self.nodes[self.size as usize];
        self.nodes[1] = last;
        self.slots[last as usize].node = 1;

        self.size -= 1;
        if self.size > 0 {
            self.float_down(1);
        }

        self.release_slot(h_min)
    }

    fn remove(&mut self, handle: u32) -> Option<Key> {
        if self.slots.get(handle as usize)?.key.is_none() {
            return None;
        }

        let curr = self.slots[handle as usize].node;
        let last = self.nodes[self.size as usize];
        self.nodes[curr as usize] = last;
        self.slots[last as usize].node = curr;

        self.size -= 1;
        if curr <= self.size {
            if curr <= 1 || key_leq(self.key(curr >> 1), self.key(curr)) {
                self.float_down(curr);
            } else {
                self.float_up(curr);
            }
        }

        self.release_slot(handle)
    }

    fn float_down(&mut self, mut curr: u32) {
        let h_curr = self.nodes[curr as usize];
        loop {
            let mut child = curr << 1;
            if child < self.size && key_leq(self.key(child + 1), self.key(child)) {
                child += 1;
            }

            if child > self.size || key_leq(self.slot_key(h_curr), self.key(child)) {
                self.nodes[curr as usize] = h_curr;
                self.slots[h_curr as usize].node = curr;
                break;
            }

            let h_child = self.nodes[child as usize];
            self.nodes[curr as usize] = h_child;
            self.slots[h_child as usize].node = curr;
            curr = child;
        }
    }

    fn float_up(&mut self, mut curr: u32) {
        let h_curr = self.nodes[curr as usize];
        loop {
            let parent = curr >> 1;
            if parent == 0 || key_leq(self.key(parent), self.slot_key(h_curr)) {
                self.nodes[curr as usize] = h_curr;
                self.slots[h_curr as usize].node = curr;
                break;
            }

            let h_parent = self.nodes[parent as usize];
            self.nodes[curr as usize] = h_parent;
            self.slots[h_parent as usize].node = curr;
            curr = parent;
        }
    }

    #[inline]
    fn slot_key(&self, handle: u32) -> &Key {
        match self.slots[handle as usize].key {
            Some(ref key) => key,
            None => unreachable!("empty heap slot in use"),
        }
    }
}

pub(crate) struct VertexQueue {
    heap: Heap,
    /// Sorted in decreasing sweep order, so that the minimum is at the end.
    sorted: Vec<Option<Key>>,
    size: usize,
}

impl VertexQueue {
    pub fn new() -> Self {
        VertexQueue {
            heap: Heap::new(),
            sorted: Vec::new(),
            size: 0,
        }
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.sorted.clear();
        self.size = 0;
    }

    /// Fills the queue with every live vertex of the mesh, and stores their handles.
    pub fn reset(&mut self, mesh: &mut Mesh) {
        self.clear();

        for v in mesh.vertex_table.iter().flatten() {
            self.sorted.push(Some(Key {
                position: mesh.vertices[*v].origin,
                vertex: *v,
            }));
        }

        self.sorted.sort_by(|a, b| match (a, b) {
            (Some(a), Some(b)) => sweep_order(b, a),
            _ => Ordering::Equal,
        });
        self.size = self.sorted.len();

        for (i, key) in self.sorted.iter().enumerate() {
            if let Some(key) = key {
                mesh.vertices[key.vertex].queue_handle = Some(QueueHandle::Sorted(i as u32));
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0 && self.heap.is_empty()
    }

    pub fn insert(&mut self, position: Point, vertex: VertexIdx) -> QueueHandle {
        QueueHandle::Heap(self.heap.insert(Key { position, vertex }))
    }

    pub fn remove(&mut self, handle: QueueHandle) {
        match handle {
            QueueHandle::Heap(h) => {
                self.heap.remove(h);
            }
            QueueHandle::Sorted(i) => {
                if let Some(slot) = self.sorted.get_mut(i as usize) {
                    *slot = None;
                }
                self.trim();
            }
        }
    }

    fn trim(&mut self) {
        while self.size > 0 && self.sorted[self.size - 1].is_none() {
            self.size -= 1;
        }
    }

    fn sorted_min(&self) -> Option<&Key> {
        if self.size == 0 {
            return None;
        }
        self.sorted[self.size - 1].as_ref()
    }

    /// Removes and returns the first vertex in sweep order.
    ///
    /// The vertex keeps its queue handle, the caller is expected to reset it.
    pub fn extract_min(&mut self) -> Option<VertexIdx> {
        let sort_min = match self.sorted_min() {
            Some(key) => *key,
            None => return self.heap.extract_min().map(|key| key.vertex),
        };

        if let Some(heap_min) = self.heap.min() {
            if key_leq(heap_min, &sort_min) {
                return self.heap.extract_min().map(|key| key.vertex);
            }
        }

        self.size -= 1;
        self.trim();

        Some(sort_min.vertex)
    }

    pub fn peek_min(&self) -> Option<VertexIdx> {
        let sort_min = match self.sorted_min() {
            Some(key) => key,
            None => return self.heap.min().map(|key| key.vertex),
        };

        if let Some(heap_min) = self.heap.min() {
            if key_leq(heap_min, sort_min) {
                return Some(heap_min.vertex);
            }
        }

        Some(sort_min.vertex)
    }
}

#[cfg(test)]
fn queue_with(mesh: &mut Mesh, points: &[Point]) -> (VertexQueue, Vec<VertexIdx>) {
    let mut vertices = Vec::new();
    for p in points {
        let e = mesh.push_vertex(None, *p, false, false);
        vertices.push(mesh.org_vertex(e).unwrap());
    }

    let mut queue = VertexQueue::new();
    queue.reset(mesh);
    (queue, vertices)
}

#[cfg(test)]
fn drain(mesh: &Mesh, queue: &mut VertexQueue) -> Vec<Point> {
    let mut result = Vec::new();
    while let Some(v) = queue.extract_min() {
        result.push(mesh.vertices[v].origin);
    }
    result
}

#[test]
fn extracts_in_sweep_order() {
    use crate::math::point;

    let mut mesh = Mesh::new();
    let (mut queue, _) = queue_with(
        &mut mesh,
        &[
            point(3.0, 0.0),
            point(1.0, 5.0),
            point(1.0, -5.0),
            point(-2.0, 0.0),
            point(2.0, 2.0),
        ],
    );

    assert!(!queue.is_empty());
    assert_eq!(
        drain(&mesh, &mut queue),
        [
            point(-2.0, 0.0),
            point(1.0, -5.0),
            point(1.0, 5.0),
            point(2.0, 2.0),
            point(3.0, 0.0),
        ]
    );
    assert!(queue.is_empty());
}

#[test]
fn inserted_vertices_are_interleaved() {
    use crate::math::point;

    let mut mesh = Mesh::new();
    let (mut queue, _) = queue_with(&mut mesh, &[point(0.0, 0.0), point(4.0, 0.0)]);

    let first = queue.extract_min().unwrap();
    assert_eq!(mesh.vertices[first].origin, point(0.0, 0.0));

    for p in &[point(3.0, 0.0), point(1.0, 0.0), point(5.0, 0.0), point(2.0, 1.0)] {
        let e = mesh.push_vertex(None, *p, false, false);
        let v = mesh.org_vertex(e).unwrap();
        queue.insert(*p, v);
    }

    assert_eq!(queue.peek_min().map(|v| mesh.vertices[v].origin), Some(point(1.0, 0.0)));
    assert_eq!(
        drain(&mesh, &mut queue),
        [
            point(1.0, 0.0),
            point(2.0, 1.0),
            point(3.0, 0.0),
            point(4.0, 0.0),
            point(5.0, 0.0),
        ]
    );
}

#[test]
fn removed_vertices_are_skipped() {
    use crate::math::point;

    let mut mesh = Mesh::new();
    let (mut queue, vertices) = queue_with(
        &mut mesh,
        &[point(0.0, 0.0), point(1.0, 0.0), point(2.0, 0.0)],
    );

    // The current minimum and a vertex in the middle.
    for &v in &[vertices[0], vertices[1]] {
        let handle = mesh.vertices[v].queue_handle.unwrap();
        queue.remove(handle);
    }

    let e = mesh.push_vertex(None, point(0.5, 0.0), false, false);
    let v = mesh.org_vertex(e).unwrap();
    let handle = queue.insert(point(0.5, 0.0), v);
    queue.remove(handle);

    assert_eq!(drain(&mesh, &mut queue), [point(2.0, 0.0)]);
}
