#![deny(bare_trait_objects)]
#![no_std]

//! Tessellation of 2D polygons into triangles, with antialiasing boundaries.
//!
//! # Crates
//!
//! This meta-crate (`tessel`) reexports the following sub-crates for convenience:
//!
//! * **tessel_tessellation** - The sweep-line tessellator, the line drawer and the
//!   geometry builders.
//! * **tessel_geom** - Bézier curves, elliptic arcs and vertex normals, with adaptive
//!   flattening.
//!
//! Each `tessel_<name>` crate is reexported as a `<name>` module in `tessel`.
//!
//! # Feature flags
//!
//! serialization using serde can be enabled on each crate using the
//! `serialization` feature flag (disabled by default).
//!
//! Without the default `std` feature, the crates only depend on `core` and `alloc`.
//!
//! # Examples
//!
//! ## Filling a polygon with a hole
//!
//! ```
//! use tessel::math::{point, Point};
//! use tessel::tessellation::{Count, FillOptions, Tessellator, VertexBuffers, simple_builder};
//!
//! let mut tessellator = Tessellator::with_options(FillOptions::even_odd());
//!
//! let outer = [point(0.0, 0.0), point(10.0, 0.0), point(10.0, 10.0), point(0.0, 10.0)];
//! let inner = [point(3.0, 3.0), point(7.0, 3.0), point(7.0, 7.0), point(3.0, 7.0)];
//! for contour in &[outer, inner] {
//!     let mut cursor = tessellator.begin_contour(false);
//!     for p in contour {
//!         tessellator.push_vertex(&mut cursor, *p).unwrap();
//!     }
//!     tessellator.close_contour(&mut cursor).unwrap();
//! }
//!
//! let mut total = Count::default();
//! let count = tessellator.prepare(&mut total).unwrap();
//! assert_eq!(count.vertices, 8);
//! assert_eq!(count.triangles, 8);
//!
//! let mut geometry: VertexBuffers<Point, u16> = VertexBuffers::with_capacity(
//!     total.vertices as usize,
//!     total.triangles as usize * 3,
//! );
//! tessellator.write(&mut simple_builder(&mut geometry)).unwrap();
//!
//! println!(" -- {} vertices {} indices",
//!     geometry.vertices.len(),
//!     geometry.indices.len()
//! );
//! ```
//!
//! ## Stroking and filling curves
//!
//! ```
//! use tessel::math::{point, vector, Angle};
//! use tessel::tessellation::{Count, LineDrawer, NoOutput, StrokeOptions, Tessellator};
//!
//! let mut fill = Tessellator::new();
//! let mut stroke = Tessellator::new();
//!
//! {
//!     let options = StrokeOptions::tolerance(2.0).with_line_width(3.0);
//!     let mut drawer = LineDrawer::new(&options, Some(&mut fill), Some(&mut stroke));
//!     drawer.move_to(point(0.0, 0.0)).unwrap();
//!     drawer.line_to(point(100.0, 0.0)).unwrap();
//!     drawer.quadratic_bezier_to(point(100.0, 100.0), point(50.0, 100.0)).unwrap();
//!     drawer.arc_to(vector(25.0, 25.0), Angle::zero(), false, true, point(0.0, 100.0)).unwrap();
//!     drawer.close(true).unwrap();
//! }
//!
//! let mut total = Count::default();
//! fill.prepare(&mut total).unwrap();
//! stroke.prepare(&mut total).unwrap();
//!
//! let mut output = NoOutput::new();
//! fill.write(&mut output).unwrap();
//! stroke.write(&mut output).unwrap();
//! ```

pub extern crate tessel_geom;
pub extern crate tessel_tessellation;

pub use tessel_geom as geom;
pub use tessel_tessellation as tessellation;

pub use tessel_tessellation::math;
