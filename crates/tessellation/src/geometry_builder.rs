//! Tools to help with generating vertex and index buffers.
//!
//! ## Overview
//!
//! The tessellator does not know about the vertex layout of its users. Once prepared, it
//! sends its vertices and triangles to a [`GeometryBuilder`](trait.GeometryBuilder.html),
//! which is free to convert them and store them wherever it wants.
//!
//! Vertex ids are caller-space: `prepare` is given the number of vertices already
//! produced by other tessellators, and the ids it hands to the builder start from there.
//! Several tessellators can therefore write into the same buffers, in the order they
//! were prepared.
//!
//! It is very common to push vertices and indices into a pair of vectors, so this module
//! also provides:
//!
//! * [`VertexBuffers`](struct.VertexBuffers.html), a simple pair of vectors of vertices
//!   and indices (generic parameters).
//! * [`BuffersBuilder`](struct.BuffersBuilder.html), which writes into a `VertexBuffers`
//!   and delegates the creation of vertex values to a
//!   [`FillVertexConstructor`](trait.FillVertexConstructor.html).
//! * [`CallbackBuilder`](struct.CallbackBuilder.html), which forwards everything to a pair
//!   of closures.
//!
//! ## Examples
//!
//! ### Generating custom vertices
//!
//! ```
//! use tessel_tessellation::{
//!     BuffersBuilder, Count, FillVertex, FillVertexConstructor, Tessellator, VertexBuffers,
//! };
//! use tessel_tessellation::math::point;
//!
//! // Our custom vertex.
//! #[derive(Copy, Clone, Debug)]
//! pub struct MyVertex {
//!     position: [f32; 2],
//!     color: [f32; 4],
//! }
//!
//! struct WithColor([f32; 4]);
//!
//! impl FillVertexConstructor<MyVertex> for WithColor {
//!     fn new_vertex(&mut self, vertex: FillVertex) -> MyVertex {
//!         let mut color = self.0;
//!         color[3] *= vertex.blend_value();
//!         MyVertex {
//!             position: vertex.position().to_array(),
//!             color,
//!         }
//!     }
//! }
//!
//! fn triangle(x: f32) -> Tessellator {
//!     let mut tessellator = Tessellator::new();
//!     let mut cursor = tessellator.begin_contour(false);
//!     for p in &[point(x, 0.0), point(x + 10.0, 0.0), point(x + 5.0, 10.0)] {
//!         tessellator.push_vertex(&mut cursor, *p).unwrap();
//!     }
//!     tessellator.close_contour(&mut cursor).unwrap();
//!     tessellator
//! }
//!
//! let mut red = triangle(0.0);
//! let mut green = triangle(20.0);
//!
//! // Both tessellators write into the same buffers.
//! let mut total = Count::default();
//! red.prepare(&mut total).unwrap();
//! green.prepare(&mut total).unwrap();
//!
//! let mut output: VertexBuffers<MyVertex, u16> = VertexBuffers::with_capacity(
//!     total.vertices as usize,
//!     total.triangles as usize * 3,
//! );
//! red.write(&mut BuffersBuilder::new(&mut output, WithColor([1.0, 0.0, 0.0, 1.0]))).unwrap();
//! green.write(&mut BuffersBuilder::new(&mut output, WithColor([0.0, 1.0, 0.0, 1.0]))).unwrap();
//!
//! assert_eq!(output.vertices.len(), 6);
//! assert_eq!(output.indices.len(), 6);
//! ```
//!
//! ### Generating a completely custom output
//!
//! ```
//! use tessel_tessellation::{FillVertex, GeometryBuilder, GeometryBuilderError, VertexId};
//!
//! // Writes the result of the tessellation to stdout.
//! pub struct ToStdOut;
//!
//! impl GeometryBuilder for ToStdOut {
//!     fn begin_geometry(&mut self) {
//!         println!(" -- begin geometry");
//!     }
//!
//!     fn add_vertex(&mut self, id: VertexId, vertex: FillVertex) -> Result<(), GeometryBuilderError> {
//!         println!("vertex {} {:?}", id.offset(), vertex.position());
//!         Ok(())
//!     }
//!
//!     fn add_triangle(&mut self, a: VertexId, b: VertexId, c: VertexId) {
//!         println!("triangle ({}, {}, {})", a.offset(), b.offset(), c.offset());
//!     }
//!
//!     fn abort_geometry(&mut self) {
//!         println!(" -- oops!");
//!     }
//! }
//! ```

pub use crate::error::GeometryBuilderError;
use crate::math::{Point, Vector};
use crate::{FillVertex, Index, VertexId};

use alloc::vec::Vec;
use core::convert::From;

/// The output interface of the [`Tessellator`](../struct.Tessellator.html).
///
/// `write` calls `begin_geometry`, then adds every vertex in increasing id order, then
/// every triangle, then calls `end_geometry`. If adding a vertex fails, `abort_geometry`
/// is called instead and nothing else follows.
pub trait GeometryBuilder {
    /// Called at the beginning of a generation.
    ///
    /// end_geometry must be called before begin_geometry is called again.
    fn begin_geometry(&mut self) {}

    /// Called at the end of a generation.
    fn end_geometry(&mut self) {}

    /// Inserts a vertex with the given caller-space id.
    fn add_vertex(&mut self, id: VertexId, vertex: FillVertex) -> Result<(), GeometryBuilderError>;

    /// Inserts a triangle made of vertices that were added since begin_geometry, or by
    /// tessellators written before into the same output.
    fn add_triangle(&mut self, a: VertexId, b: VertexId, c: VertexId);

    /// abort_geometry is called instead of end_geometry if an error occurred while producing
    /// the geometry and we won't be able to finish.
    ///
    /// The implementation is expected to discard the geometry that was generated since the last
    /// time begin_geometry was called, and to remain in a usable state.
    fn abort_geometry(&mut self) {}
}

/// Structure that holds the vertex and index data.
///
/// Usually written into though temporary `BuffersBuilder` objects.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct VertexBuffers<OutputVertex, OutputIndex> {
    pub vertices: Vec<OutputVertex>,
    pub indices: Vec<OutputIndex>,
}

impl<OutputVertex, OutputIndex> VertexBuffers<OutputVertex, OutputIndex> {
    /// Constructor
    pub fn new() -> Self {
        VertexBuffers::with_capacity(512, 1024)
    }

    /// Constructor
    pub fn with_capacity(num_vertices: usize, num_indices: usize) -> Self {
        VertexBuffers {
            vertices: Vec::with_capacity(num_vertices),
            indices: Vec::with_capacity(num_indices),
        }
    }

    /// Empty the buffers without freeing memory, for reuse without reallocation.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }
}

/// A temporary view on a `VertexBuffers` object which facilitate the population of vertex and index
/// data.
///
/// Vertices must arrive in order: the id of each vertex, plus the vertex offset, must be the
/// current length of the vertex buffer. The vertex offset is zero by default, which fits a
/// sequence of tessellators prepared with the same running [`Count`](../struct.Count.html)
/// and written into empty buffers.
pub struct BuffersBuilder<'l, OutputVertex: 'l, OutputIndex: 'l, Ctor> {
    buffers: &'l mut VertexBuffers<OutputVertex, OutputIndex>,
    first_vertex: Index,
    first_index: Index,
    vertex_offset: Index,
    vertex_constructor: Ctor,
}

impl<'l, OutputVertex: 'l, OutputIndex: 'l, Ctor>
    BuffersBuilder<'l, OutputVertex, OutputIndex, Ctor>
{
    pub fn new(buffers: &'l mut VertexBuffers<OutputVertex, OutputIndex>, ctor: Ctor) -> Self {
        let first_vertex = buffers.vertices.len() as Index;
        let first_index = buffers.indices.len() as Index;
        BuffersBuilder {
            buffers,
            first_vertex,
            first_index,
            vertex_offset: 0,
            vertex_constructor: ctor,
        }
    }

    /// Shifts every vertex id, for buffers that already contain other geometry.
    pub fn with_vertex_offset(mut self, offset: Index) -> Self {
        self.vertex_offset = offset;

        self
    }

    /// Consumes self and returns a builder with opposite triangle face winding.
    pub fn with_inverted_winding(self) -> InvertWinding<Self> {
        InvertWinding(self)
    }

    pub fn buffers<'a, 'b: 'a>(&'b self) -> &'a VertexBuffers<OutputVertex, OutputIndex> {
        self.buffers
    }
}

/// A wrapper for geometry builders that inverts the triangle face winding.
pub struct InvertWinding<B>(B);

impl<B: GeometryBuilder> GeometryBuilder for InvertWinding<B> {
    fn begin_geometry(&mut self) {
        self.0.begin_geometry();
    }

    fn end_geometry(&mut self) {
        self.0.end_geometry()
    }

    #[inline]
    fn add_vertex(&mut self, id: VertexId, vertex: FillVertex) -> Result<(), GeometryBuilderError> {
        self.0.add_vertex(id, vertex)
    }

    fn add_triangle(&mut self, a: VertexId, b: VertexId, c: VertexId) {
        self.0.add_triangle(a, c, b);
    }

    fn abort_geometry(&mut self) {
        self.0.abort_geometry();
    }
}

/// A trait specifying how to create vertex values.
pub trait FillVertexConstructor<OutputVertex> {
    fn new_vertex(&mut self, vertex: FillVertex) -> OutputVertex;
}

/// A simple vertex constructor that just takes the position.
pub struct Positions;

impl FillVertexConstructor<Point> for Positions {
    fn new_vertex(&mut self, vertex: FillVertex) -> Point {
        vertex.position()
    }
}

impl<F, OutputVertex> FillVertexConstructor<OutputVertex> for F
where
    F: Fn(FillVertex) -> OutputVertex,
{
    fn new_vertex(&mut self, vertex: FillVertex) -> OutputVertex {
        self(vertex)
    }
}

/// A `BuffersBuilder` that only keeps the positions.
pub type SimpleBuffersBuilder<'l> = BuffersBuilder<'l, Point, u16, Positions>;

/// Creates a `SimpleBuffersBuilder`.
pub fn simple_builder(buffers: &mut VertexBuffers<Point, u16>) -> SimpleBuffersBuilder<'_> {
    BuffersBuilder::new(buffers, Positions)
}

impl<'l, OutputVertex, OutputIndex, Ctor> GeometryBuilder
    for BuffersBuilder<'l, OutputVertex, OutputIndex, Ctor>
where
    OutputVertex: 'l,
    OutputIndex: From<VertexId> + MaxIndex,
    Ctor: FillVertexConstructor<OutputVertex>,
{
    fn begin_geometry(&mut self) {
        self.first_vertex = self.buffers.vertices.len() as Index;
        self.first_index = self.buffers.indices.len() as Index;
    }

    fn add_vertex(&mut self, id: VertexId, vertex: FillVertex) -> Result<(), GeometryBuilderError> {
        let len = self.buffers.vertices.len();
        if (id.0 as usize).checked_add(self.vertex_offset as usize) != Some(len) {
            return Err(GeometryBuilderError::InvalidVertex);
        }
        if len >= OutputIndex::MAX {
            return Err(GeometryBuilderError::TooManyVertices);
        }

        self.buffers
            .vertices
            .push(self.vertex_constructor.new_vertex(vertex));

        Ok(())
    }

    fn add_triangle(&mut self, a: VertexId, b: VertexId, c: VertexId) {
        debug_assert!(a != b);
        debug_assert!(a != c);
        debug_assert!(b != c);
        self.buffers.indices.push((a + self.vertex_offset).into());
        self.buffers.indices.push((b + self.vertex_offset).into());
        self.buffers.indices.push((c + self.vertex_offset).into());
    }

    fn abort_geometry(&mut self) {
        self.buffers.vertices.truncate(self.first_vertex as usize);
        self.buffers.indices.truncate(self.first_index as usize);
    }
}

/// A geometry builder that forwards vertices and triangles to two closures.
///
/// The vertex callback receives the id, position, blend value and normal of each vertex.
pub struct CallbackBuilder<V, T> {
    on_vertex: V,
    on_triangle: T,
}

impl<V, T> CallbackBuilder<V, T>
where
    V: FnMut(u32, Point, f32, Vector),
    T: FnMut([u32; 3]),
{
    pub fn new(on_vertex: V, on_triangle: T) -> Self {
        CallbackBuilder {
            on_vertex,
            on_triangle,
        }
    }
}

impl<V, T> GeometryBuilder for CallbackBuilder<V, T>
where
    V: FnMut(u32, Point, f32, Vector),
    T: FnMut([u32; 3]),
{
    fn add_vertex(&mut self, id: VertexId, vertex: FillVertex) -> Result<(), GeometryBuilderError> {
        (self.on_vertex)(id.0, vertex.position, vertex.blend_value, vertex.normal);
        Ok(())
    }

    fn add_triangle(&mut self, a: VertexId, b: VertexId, c: VertexId) {
        (self.on_triangle)([a.0, b.0, c.0]);
    }
}

/// A geometry builder that does not output any geometry.
///
/// Mostly useful for testing.
pub struct NoOutput {
    vertices: u32,
    triangles: u32,
}

impl NoOutput {
    pub fn new() -> Self {
        NoOutput {
            vertices: 0,
            triangles: 0,
        }
    }

    /// Number of vertices received since the last begin_geometry.
    pub fn vertices(&self) -> u32 {
        self.vertices
    }

    /// Number of triangles received since the last begin_geometry.
    pub fn triangles(&self) -> u32 {
        self.triangles
    }
}

impl Default for NoOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometryBuilder for NoOutput {
    fn begin_geometry(&mut self) {
        self.vertices = 0;
        self.triangles = 0;
    }

    fn add_vertex(&mut self, _: VertexId, _: FillVertex) -> Result<(), GeometryBuilderError> {
        if self.vertices == u32::MAX {
            return Err(GeometryBuilderError::TooManyVertices);
        }
        self.vertices += 1;
        Ok(())
    }

    fn add_triangle(&mut self, a: VertexId, b: VertexId, c: VertexId) {
        debug_assert!(a != b);
        debug_assert!(a != c);
        debug_assert!(b != c);
        self.triangles += 1;
    }
}

/// Provides the maximum value of an index.
///
/// This should be the maximum value representable by the index type up
/// to u32::MAX because the tessellators can't internally represent more
/// than u32::MAX indices.
pub trait MaxIndex {
    const MAX: usize;
}

impl MaxIndex for u16 {
    const MAX: usize = u16::MAX as usize;
}
impl MaxIndex for u32 {
    const MAX: usize = u32::MAX as usize;
}
impl MaxIndex for i32 {
    const MAX: usize = i32::MAX as usize;
}
// Vertex ids are u32.
impl MaxIndex for usize {
    const MAX: usize = u32::MAX as usize;
}

#[cfg(test)]
use crate::math::{point, vector};

#[cfg(test)]
fn vertex(x: f32, y: f32) -> FillVertex {
    FillVertex {
        position: point(x, y),
        blend_value: 1.0,
        normal: vector(0.0, 0.0),
    }
}

#[test]
fn buffers_builder_checks_vertex_order() {
    let mut buffers: VertexBuffers<Point, u16> = VertexBuffers::new();
    let mut builder = simple_builder(&mut buffers);

    builder.begin_geometry();
    assert_eq!(builder.add_vertex(VertexId(0), vertex(0.0, 0.0)), Ok(()));
    assert_eq!(
        builder.add_vertex(VertexId(2), vertex(1.0, 0.0)),
        Err(GeometryBuilderError::InvalidVertex)
    );
    assert_eq!(builder.add_vertex(VertexId(1), vertex(1.0, 0.0)), Ok(()));
    assert_eq!(builder.add_vertex(VertexId(2), vertex(1.0, 1.0)), Ok(()));
    builder.add_triangle(VertexId(0), VertexId(1), VertexId(2));
    builder.end_geometry();

    assert_eq!(buffers.vertices.len(), 3);
    assert_eq!(buffers.indices, [0, 1, 2]);
}

#[test]
fn buffers_builder_offset_and_abort() {
    let mut buffers: VertexBuffers<Point, u32> = VertexBuffers::new();
    buffers.vertices.push(point(5.0, 5.0));
    buffers.indices.extend_from_slice(&[0, 0, 0]);

    {
        let mut builder = BuffersBuilder::new(&mut buffers, Positions).with_vertex_offset(1);
        builder.begin_geometry();
        assert_eq!(builder.add_vertex(VertexId(0), vertex(0.0, 0.0)), Ok(()));
        assert_eq!(builder.add_vertex(VertexId(1), vertex(1.0, 0.0)), Ok(()));
        assert_eq!(builder.add_vertex(VertexId(2), vertex(1.0, 1.0)), Ok(()));
        builder.add_triangle(VertexId(0), VertexId(1), VertexId(2));
        builder.end_geometry();
    }
    assert_eq!(buffers.indices, [0, 0, 0, 1, 2, 3]);

    {
        let mut builder = BuffersBuilder::new(&mut buffers, Positions).with_inverted_winding();
        builder.begin_geometry();
        assert_eq!(builder.add_vertex(VertexId(4), vertex(2.0, 0.0)), Ok(()));
        builder.add_triangle(VertexId(1), VertexId(2), VertexId(4));
        builder.abort_geometry();
    }
    assert_eq!(buffers.vertices.len(), 4);
    assert_eq!(buffers.indices.len(), 6);
}

#[test]
fn callback_builder() {
    let mut vertices = Vec::new();
    let mut triangles = Vec::new();
    {
        let mut builder = CallbackBuilder::new(
            |id, position, value, _normal| vertices.push((id, position, value)),
            |triangle| triangles.push(triangle),
        );
        builder.begin_geometry();
        builder.add_vertex(VertexId(7), vertex(1.0, 2.0)).unwrap();
        builder.add_triangle(VertexId(7), VertexId(8), VertexId(9));
        builder.end_geometry();
    }

    assert_eq!(vertices, [(7, point(1.0, 2.0), 1.0)]);
    assert_eq!(triangles, [[7, 8, 9]]);
}
