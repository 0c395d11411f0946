use crate::geometry_builder::*;
use crate::math::*;
use crate::{
    Count, FillOptions, FillRule, FillVertex, RelocateRule, TessellationError, Tessellator,
    VertexId,
};

use alloc::vec::Vec;
use core::f32::consts::PI;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

struct Output {
    count: Count,
    vertices: Vec<FillVertex>,
    indices: Vec<u32>,
}

impl Output {
    fn triangles(&self) -> usize {
        self.indices.len() / 3
    }

    fn triangle(&self, i: usize) -> [FillVertex; 3] {
        [
            self.vertices[self.indices[i * 3] as usize],
            self.vertices[self.indices[i * 3 + 1] as usize],
            self.vertices[self.indices[i * 3 + 2] as usize],
        ]
    }

    /// Triangles made only of interior vertices.
    fn interior_triangles(&self) -> usize {
        (0..self.triangles())
            .filter(|i| self.triangle(*i).iter().all(|v| v.blend_value() == 1.0))
            .count()
    }
}

fn tessellate_contours(
    contours: &[&[Point]],
    options: FillOptions,
) -> Result<Output, TessellationError> {
    init_logging();

    let mut tess = Tessellator::with_options(options);
    tess.set_logging(std::env::var("TESSEL_ENABLE_LOGGING").is_ok());
    for contour in contours {
        let mut cursor = tess.begin_contour(false);
        for p in contour.iter() {
            tess.push_vertex(&mut cursor, *p)?;
        }
        tess.close_contour(&mut cursor)?;
    }

    let count = tess.prepare(&mut Count::default())?;

    let mut buffers: VertexBuffers<FillVertex, u32> = VertexBuffers::new();
    tess.write(&mut BuffersBuilder::new(&mut buffers, |v: FillVertex| v))?;

    Ok(Output {
        count,
        vertices: buffers.vertices,
        indices: buffers.indices,
    })
}

fn triangles_area(output: &Output) -> f32 {
    let mut area = 0.0;
    for i in 0..output.triangles() {
        let [a, b, c] = output.triangle(i);
        let ab = b.position() - a.position();
        let ac = c.position() - a.position();
        area += ab.cross(ac).abs() * 0.5;
    }

    area
}

const ALL_FILL_RULES: [FillRule; 5] = [
    FillRule::EvenOdd,
    FillRule::NonZero,
    FillRule::Positive,
    FillRule::Negative,
    FillRule::AbsGeqTwo,
];

type Point64 = crate::geom::euclid::default::Point2D<f64>;

fn winding_number(contours: &[&[Point]], p: Point64) -> i16 {
    let mut winding = 0;
    for contour in contours {
        for (i, a) in contour.iter().enumerate() {
            let a = a.to_f64();
            let b = contour[(i + 1) % contour.len()].to_f64();
            let side = (b - a).cross(p - a);
            if a.y <= p.y {
                if b.y > p.y && side > 0.0 {
                    winding += 1;
                }
            } else if b.y <= p.y && side < 0.0 {
                winding -= 1;
            }
        }
    }

    winding
}

fn near_segment(a: Point64, b: Point64, p: Point64, distance: f64) -> bool {
    let d = b - a;
    let square_length = d.square_length();
    if square_length == 0.0 {
        return false;
    }

    let t = ((p - a).dot(d) / square_length).max(0.0).min(1.0);
    (a + d * t - p).square_length() < distance * distance
}

fn strictly_inside(triangle: [Point64; 3], p: Point64) -> bool {
    let [a, b, c] = triangle;
    let d1 = (b - a).cross(p - a);
    let d2 = (c - b).cross(p - b);
    let d3 = (a - c).cross(p - c);

    (d1 > 0.0 && d2 > 0.0 && d3 > 0.0) || (d1 < 0.0 && d2 < 0.0 && d3 < 0.0)
}

/// Samples a grid over the contours and checks that each sample is covered by one
/// triangle where the fill rule says inside, and by none elsewhere.
///
/// Samples close to an input edge or a triangle edge are skipped.
fn check_coverage(contours: &[&[Point]], fill_rule: FillRule) {
    const SAMPLES: usize = 48;

    let output = match tessellate_contours(contours, FillOptions::DEFAULT.with_fill_rule(fill_rule)) {
        Ok(output) => output,
        Err(e) => panic!("Test failed with fill rule {:?}: {:?}", fill_rule, e),
    };

    let triangles: Vec<[Point64; 3]> = (0..output.triangles())
        .map(|i| {
            let [a, b, c] = output.triangle(i);
            [
                a.position().to_f64(),
                b.position().to_f64(),
                c.position().to_f64(),
            ]
        })
        .collect();

    let mut segments: Vec<(Point64, Point64)> = Vec::new();
    for contour in contours {
        for (i, a) in contour.iter().enumerate() {
            segments.push((a.to_f64(), contour[(i + 1) % contour.len()].to_f64()));
        }
    }
    for t in &triangles {
        segments.extend_from_slice(&[(t[0], t[1]), (t[1], t[2]), (t[2], t[0])]);
    }

    let all_points = || contours.iter().flat_map(|c| c.iter()).map(|p| p.to_f64());
    let min = all_points().fold(Point64::new(f64::MAX, f64::MAX), |m, p| m.min(p));
    let max = all_points().fold(Point64::new(f64::MIN, f64::MIN), |m, p| m.max(p));
    let step_x = (max.x - min.x) / SAMPLES as f64;
    let step_y = (max.y - min.y) / SAMPLES as f64;

    for i in 0..SAMPLES {
        for j in 0..SAMPLES {
            let p = Point64::new(
                min.x + (i as f64 + 0.37) * step_x,
                min.y + (j as f64 + 0.61) * step_y,
            );
            if segments.iter().any(|&(a, b)| near_segment(a, b, p, 1e-3)) {
                continue;
            }

            let winding = winding_number(contours, p);
            let covered = triangles.iter().filter(|t| strictly_inside(**t, p)).count();
            assert_eq!(
                covered,
                fill_rule.is_in(winding) as usize,
                "{:?} covered {} times with winding {} and fill rule {:?}",
                p,
                covered,
                winding,
                fill_rule
            );
        }
    }
}

fn rotated(points: &[Point], angle: f32) -> Vec<Point> {
    let (sin, cos) = angle.sin_cos();
    points
        .iter()
        .map(|p| point(p.x * cos - p.y * sin, p.x * sin + p.y * cos))
        .collect()
}

fn test_shape(contours: &[&[Point]], fill_rule: FillRule, expected_triangles: Option<usize>) {
    let output = match tessellate_contours(contours, FillOptions::DEFAULT.with_fill_rule(fill_rule)) {
        Ok(output) => output,
        Err(e) => panic!("Test failed with fill rule {:?}: {:?}", fill_rule, e),
    };

    assert_eq!(output.count.triangles as usize, output.triangles());
    assert_eq!(output.count.vertices as usize, output.vertices.len());
    if let Some(expected) = expected_triangles {
        assert_eq!(
            output.triangles(),
            expected,
            "with fill rule {:?}",
            fill_rule
        );
    }
}

fn test_shape_with_rotations(contours: &[&[Point]], steps: u32, expected_triangles: Option<usize>) {
    for i in 0..steps {
        let angle = PI * 2.0 * i as f32 / steps as f32;
        let rotated: Vec<Vec<Point>> = contours.iter().map(|c| rotated(c, angle)).collect();
        let slices: Vec<&[Point]> = rotated.iter().map(|c| &c[..]).collect();

        test_shape(&slices, FillRule::EvenOdd, expected_triangles);
        test_shape(&slices, FillRule::NonZero, None);
    }
}

#[test]
fn square() {
    let square = [
        point(0.0, 0.0),
        point(10.0, 0.0),
        point(10.0, 10.0),
        point(0.0, 10.0),
    ];
    let output = tessellate_contours(&[&square], FillOptions::non_zero()).unwrap();

    assert_eq!(output.count, Count { vertices: 4, triangles: 2 });
    assert_eq!(output.triangles(), 2);
    assert!((triangles_area(&output) - 100.0).abs() < 1e-3);
    for v in &output.vertices {
        assert_eq!(v.blend_value(), 1.0);
        assert_eq!(v.normal(), vector(0.0, 0.0));
    }
}

#[test]
fn simple_triangle() {
    let path = [point(0.0, 0.0), point(1.0, 1.0), point(0.0, 1.0)];
    test_shape_with_rotations(&[&path], 64, Some(1));
}

#[test]
fn simple_monotone() {
    let path = [
        point(0.0, 0.0),
        point(-1.0, 1.0),
        point(-3.0, 2.0),
        point(-1.0, 3.0),
        point(-4.0, 5.0),
        point(0.0, 6.0),
    ];
    test_shape(&[&path], FillRule::EvenOdd, Some(4));
    test_shape(&[&path], FillRule::NonZero, Some(4));
}

#[test]
fn simple_split() {
    let path = [
        point(0.0, 0.0),
        point(2.0, 1.0),
        point(2.0, 3.0),
        point(1.0, 2.5),
        point(0.0, 3.0),
    ];
    test_shape_with_rotations(&[&path], 64, Some(3));
}

#[test]
fn simple_merge_split() {
    let path = [
        point(0.0, 0.0),
        point(1.0, 1.0),
        point(2.0, 0.0),
        point(2.0, 3.0),
        point(1.0, 2.0),
        point(0.0, 3.0),
    ];
    test_shape_with_rotations(&[&path], 64, Some(4));
}

#[test]
fn simple_1() {
    let path = [
        point(0.0, 0.0),
        point(1.0, 1.0),
        point(2.0, 0.0),
        point(1.0, 3.0),
        point(0.5, 4.0),
        point(0.0, 3.0),
    ];
    test_shape_with_rotations(&[&path], 64, Some(4));
}

#[test]
fn fan_invariant() {
    // Convex and star-shaped polygons, n - 2 triangles each.
    for &n in &[3usize, 5, 8, 17, 64] {
        let convex: Vec<Point> = (0..n)
            .map(|i| {
                let a = PI * 2.0 * i as f32 / n as f32;
                point(a.cos() * 100.0, a.sin() * 100.0)
            })
            .collect();
        let output = tessellate_contours(&[&convex], FillOptions::default()).unwrap();
        assert_eq!(output.triangles(), n - 2, "convex {}", n);

        if n >= 5 {
            let star: Vec<Point> = (0..n * 2)
                .map(|i| {
                    let a = PI * i as f32 / n as f32;
                    let r = if i % 2 == 0 { 100.0 } else { 40.0 };
                    point(a.cos() * r, a.sin() * r)
                })
                .collect();
            let output = tessellate_contours(&[&star], FillOptions::default()).unwrap();
            assert_eq!(output.triangles(), n * 2 - 2, "star {}", n);
        }
    }
}

#[test]
fn collinear_vertices_are_removed() {
    let path = [
        point(0.0, 0.0),
        point(1.0, 0.0),
        point(2.0, 0.0),
        point(2.0, 1.0),
        point(2.0, 2.0),
        point(1.0, 2.0),
        point(0.0, 2.0),
        point(0.0, 1.0),
    ];
    let output = tessellate_contours(&[&path], FillOptions::default()).unwrap();

    assert_eq!(output.count, Count { vertices: 4, triangles: 2 });
    assert!((triangles_area(&output) - 4.0).abs() < 1e-4);
}

#[test]
fn hole() {
    let outer = [point(-11.0, 5.0), point(0.0, -5.0), point(10.0, 5.0)];
    let inner = [point(-5.0, 2.0), point(0.0, -2.0), point(4.0, 2.0)];

    test_shape_with_rotations(&[&outer, &inner], 32, Some(6));

    let even_odd = tessellate_contours(&[&outer, &inner], FillOptions::even_odd()).unwrap();
    let non_zero = tessellate_contours(&[&outer, &inner], FillOptions::non_zero()).unwrap();
    // Both contours have the same orientation, the hole is only cut with even-odd.
    assert!((triangles_area(&even_odd) - (105.0 - 18.0)).abs() < 1e-3);
    assert!((triangles_area(&non_zero) - 105.0).abs() < 1e-3);
}

#[test]
fn opposite_contours_cancel() {
    let outer = [
        point(0.0, 0.0),
        point(10.0, 0.0),
        point(10.0, 10.0),
        point(0.0, 10.0),
    ];
    let inner = [
        point(2.0, 2.0),
        point(2.0, 8.0),
        point(8.0, 8.0),
        point(8.0, 2.0),
    ];

    // The inner square has a winding number of zero.
    let output = tessellate_contours(&[&outer, &inner], FillOptions::non_zero()).unwrap();
    assert_eq!(output.triangles(), 8);
    assert!((triangles_area(&output) - 64.0).abs() < 1e-3);

    // Only the overlap is kept.
    let output = tessellate_contours(
        &[&outer, &inner],
        FillOptions::DEFAULT.with_fill_rule(FillRule::AbsGeqTwo),
    )
    .unwrap();
    assert_eq!(output.triangles(), 0);
}

#[test]
fn overlapping_contours_abs_geq_two() {
    let a = [
        point(0.0, 0.0),
        point(10.0, 0.0),
        point(10.0, 10.0),
        point(0.0, 10.0),
    ];
    let b = [
        point(5.0, 5.0),
        point(15.0, 5.0),
        point(15.0, 15.0),
        point(5.0, 15.0),
    ];

    let output = tessellate_contours(
        &[&a, &b],
        FillOptions::DEFAULT.with_fill_rule(FillRule::AbsGeqTwo),
    )
    .unwrap();
    assert!((triangles_area(&output) - 25.0).abs() < 1e-3);

    let output = tessellate_contours(&[&a, &b], FillOptions::non_zero()).unwrap();
    assert!((triangles_area(&output) - 175.0).abs() < 1e-3);

    let output = tessellate_contours(&[&a, &b], FillOptions::even_odd()).unwrap();
    assert!((triangles_area(&output) - 150.0).abs() < 1e-3);
}

#[test]
fn degenerate_same_position() {
    let path = [point(0.0, 0.0); 6];
    let output = tessellate_contours(&[&path], FillOptions::default()).unwrap();
    assert_eq!(output.count, Count::default());
}

#[test]
fn hourglass() {
    // x  x
    // |\/|
    // |/\|
    // x  x
    let path = [
        point(0.0, 0.0),
        point(10.0, 10.0),
        point(10.0, 0.0),
        point(0.0, 10.0),
    ];

    let output = tessellate_contours(&[&path], FillOptions::even_odd()).unwrap();
    assert_eq!(output.triangles(), 2);
    assert!((triangles_area(&output) - 50.0).abs() < 1e-3);
}

#[test]
fn figure_eight() {
    // The two lobes have opposite winding numbers.
    let path = [
        point(0.0, 0.0),
        point(10.0, 10.0),
        point(10.0, 0.0),
        point(0.0, 10.0),
    ];

    let non_zero = tessellate_contours(&[&path], FillOptions::non_zero()).unwrap();
    assert_eq!(non_zero.triangles(), 2);
    assert!((triangles_area(&non_zero) - 50.0).abs() < 1e-3);

    let positive = tessellate_contours(
        &[&path],
        FillOptions::DEFAULT.with_fill_rule(FillRule::Positive),
    )
    .unwrap();
    let negative = tessellate_contours(
        &[&path],
        FillOptions::DEFAULT.with_fill_rule(FillRule::Negative),
    )
    .unwrap();
    assert_eq!(positive.triangles(), 1);
    assert_eq!(negative.triangles(), 1);
    assert!((triangles_area(&positive) - 25.0).abs() < 1e-3);
    assert!((triangles_area(&negative) - 25.0).abs() < 1e-3);
}

#[test]
fn auto_intersection_type1() {
    //  o.___
    //   \   'o
    //    \ /
    //     x  <-- intersection!
    //    / \
    //  o.___\
    //       'o
    let path = [
        point(0.0, 0.0),
        point(2.0, 1.0),
        point(0.0, 2.0),
        point(2.0, 3.0),
    ];
    test_shape(&[&path], FillRule::EvenOdd, Some(2));
    test_shape(&[&path], FillRule::NonZero, Some(2));
}

#[test]
fn auto_intersection_type2() {
    //  o
    //  |\   ,o
    //  | \ / |
    //  |  x  | <-- intersection!
    //  | / \ |
    //  o'   \|
    //        o
    let path = [
        point(0.0, 0.0),
        point(2.0, 3.0),
        point(2.0, 1.0),
        point(0.0, 2.0),
    ];
    test_shape(&[&path], FillRule::EvenOdd, Some(2));
}

#[test]
fn auto_intersection_multi() {
    //      .
    //  ___/_\___
    //  | /   \ |
    //  |/     \|
    // /|       |\
    // \|       |/
    //  |\     /|
    //  |_\___/_|
    //     \ /
    //      '
    let square = [
        point(20.0, 20.0),
        point(60.0, 20.0),
        point(60.0, 60.0),
        point(20.0, 60.0),
    ];
    let diamond = [
        point(40.0, 10.0),
        point(70.0, 40.0),
        point(40.0, 70.0),
        point(10.0, 40.0),
    ];

    test_shape(&[&square, &diamond], FillRule::EvenOdd, Some(8));
    test_shape(&[&square, &diamond], FillRule::NonZero, None);
}

#[test]
fn three_edges_below() {
    //       .
    //      /|
    //     / |
    //    x  |
    //   /|\ |
    //  / | \|
    // /__|  .
    let a = [point(1.0, 0.0), point(0.0, 1.0), point(2.0, 2.0)];
    let b = [
        point(1.0, 0.0),
        point(-1.0, 2.0),
        point(0.0, 1.0),
        point(0.0, 2.0),
    ];

    test_shape(&[&a, &b], FillRule::EvenOdd, None);
    test_shape(&[&a, &b], FillRule::NonZero, None);
}

#[test]
fn coincident_vertices_from_several_contours() {
    // Four triangles sharing their apex.
    let mut contours = Vec::new();
    for i in 0..4 {
        let a = PI * 0.5 * i as f32;
        contours.push(alloc::vec![
            point(0.0, 0.0),
            point(a.cos() * 10.0, a.sin() * 10.0),
            point((a + 0.5).cos() * 10.0, (a + 0.5).sin() * 10.0),
        ]);
    }
    let slices: Vec<&[Point]> = contours.iter().map(|c| &c[..]).collect();

    let output = tessellate_contours(&slices, FillOptions::default()).unwrap();
    assert_eq!(output.triangles(), 4);
}

#[test]
fn two_phase_consistency() {
    let star: Vec<Point> = (0..20)
        .map(|i| {
            let a = PI * i as f32 / 10.0;
            let r = if i % 2 == 0 { 50.0 } else { 20.0 };
            point(a.cos() * r, a.sin() * r)
        })
        .collect();
    let hourglass = [
        point(100.0, 0.0),
        point(110.0, 10.0),
        point(110.0, 0.0),
        point(100.0, 10.0),
    ];

    let mut first = Tessellator::new();
    let mut second = Tessellator::with_options(FillOptions::even_odd());
    for (tess, contour) in [(&mut first, &star[..]), (&mut second, &hourglass[..])].iter_mut() {
        let mut cursor = tess.begin_contour(false);
        for p in contour.iter() {
            tess.push_vertex(&mut cursor, *p).unwrap();
        }
        tess.close_contour(&mut cursor).unwrap();
    }

    let mut total = Count::default();
    let a = first.prepare(&mut total).unwrap();
    let b = second.prepare(&mut total).unwrap();
    assert_eq!(total, a + b);

    let mut counter = NoOutput::new();
    first.write(&mut counter).unwrap();
    assert_eq!(counter.vertices(), a.vertices);
    assert_eq!(counter.triangles(), a.triangles);
    second.write(&mut counter).unwrap();
    assert_eq!(counter.vertices(), b.vertices);
    assert_eq!(counter.triangles(), b.triangles);

    // Both write into the same buffers, with caller-space ids.
    let mut buffers: VertexBuffers<Point, u32> = VertexBuffers::new();
    first.write(&mut simple_builder_u32(&mut buffers)).unwrap();
    second.write(&mut simple_builder_u32(&mut buffers)).unwrap();
    assert_eq!(buffers.vertices.len() as u32, total.vertices);
    assert_eq!(buffers.indices.len() as u32, total.triangles * 3);
    assert!(buffers.indices.iter().all(|i| *i < total.vertices));
    assert!(buffers.indices[a.triangles as usize * 3..]
        .iter()
        .all(|i| *i >= a.vertices));

    // Writing is repeatable.
    let mut again: VertexBuffers<Point, u32> = VertexBuffers::new();
    first.write(&mut simple_builder_u32(&mut again)).unwrap();
    assert_eq!(again.vertices[..], buffers.vertices[..a.vertices as usize]);
}

fn simple_builder_u32(buffers: &mut VertexBuffers<Point, u32>) -> BuffersBuilder<'_, Point, u32, Positions> {
    BuffersBuilder::new(buffers, Positions)
}

#[test]
fn idempotence() {
    let path: Vec<Point> = (0..30)
        .map(|i| {
            let a = PI * i as f32 / 15.0;
            let r = 30.0 + (a * 3.0).sin() * 10.0;
            point(a.cos() * r, a.sin() * r)
        })
        .collect();

    for options in &[
        FillOptions::non_zero(),
        FillOptions::even_odd().with_antialiasing(1.0),
        FillOptions::non_zero()
            .with_antialiasing(1.0)
            .with_relocate_rule(RelocateRule::Monotonize),
    ] {
        let a = tessellate_contours(&[&path], *options).unwrap();
        let b = tessellate_contours(&[&path], *options).unwrap();
        assert_eq!(a.count, b.count);
        assert!((triangles_area(&a) - triangles_area(&b)).abs() < 1e-3);
    }
}

#[test]
fn clear_and_reuse() {
    let triangle = [point(0.0, 0.0), point(10.0, 0.0), point(5.0, 10.0)];

    let mut tess = Tessellator::new();
    for _ in 0..3 {
        let mut cursor = tess.begin_contour(false);
        for p in &triangle {
            tess.push_vertex(&mut cursor, *p).unwrap();
        }
        tess.close_contour(&mut cursor).unwrap();

        let count = tess.prepare(&mut Count::default()).unwrap();
        assert_eq!(count, Count { vertices: 3, triangles: 1 });
        assert_eq!(
            tess.prepare(&mut Count::default()),
            Err(crate::UnsupportedParameter::AlreadyPrepared.into())
        );

        tess.clear();
        assert_eq!(
            tess.write(&mut NoOutput::new()),
            Err(crate::InternalError::NotPrepared.into())
        );
    }
}

#[test]
fn too_many_vertices() {
    struct Builder {
        max_vertices: u32,
        aborted: bool,
    }

    impl GeometryBuilder for Builder {
        fn add_vertex(&mut self, _: VertexId, _: FillVertex) -> Result<(), GeometryBuilderError> {
            if self.max_vertices == 0 {
                return Err(GeometryBuilderError::TooManyVertices);
            }
            self.max_vertices -= 1;
            Ok(())
        }

        fn add_triangle(&mut self, _a: VertexId, _b: VertexId, _c: VertexId) {
            panic!("no triangle expected after a failure");
        }

        fn abort_geometry(&mut self) {
            self.aborted = true;
        }
    }

    let path: Vec<Point> = (0..10)
        .map(|i| {
            let a = PI * i as f32 / 5.0;
            point(a.cos(), a.sin())
        })
        .collect();

    let mut tess = Tessellator::new();
    let mut cursor = tess.begin_contour(false);
    for p in &path {
        tess.push_vertex(&mut cursor, *p).unwrap();
    }
    tess.close_contour(&mut cursor).unwrap();
    tess.prepare(&mut Count::default()).unwrap();

    for &max_vertices in &[0, 5] {
        let mut builder = Builder {
            max_vertices,
            aborted: false,
        };
        assert_eq!(
            tess.write(&mut builder),
            Err(TessellationError::GeometryBuilder(
                GeometryBuilderError::TooManyVertices
            )),
        );
        assert!(builder.aborted);
    }
}

#[test]
fn buffers_builder_with_u16_indices() {
    let square = [
        point(0.0, 0.0),
        point(10.0, 0.0),
        point(10.0, 10.0),
        point(0.0, 10.0),
    ];
    let mut tess = Tessellator::new();
    let mut cursor = tess.begin_contour(true);
    for p in &square {
        tess.push_vertex(&mut cursor, *p).unwrap();
    }
    tess.close_contour(&mut cursor).unwrap();
    tess.prepare(&mut Count::default()).unwrap();

    let mut buffers: VertexBuffers<Point, u16> = VertexBuffers::new();
    tess.write(&mut simple_builder(&mut buffers)).unwrap();
    assert_eq!(buffers.vertices.len(), 4);
    assert_eq!(buffers.indices.len(), 6);

    // A builder that already holds geometry needs an offset.
    assert_eq!(
        tess.write(&mut simple_builder(&mut buffers)),
        Err(TessellationError::GeometryBuilder(
            GeometryBuilderError::InvalidVertex
        )),
    );
    assert_eq!(buffers.vertices.len(), 4);
    tess.write(&mut BuffersBuilder::new(&mut buffers, Positions).with_vertex_offset(4))
        .unwrap();
    assert_eq!(buffers.vertices.len(), 8);
    assert!(buffers.indices[6..].iter().all(|i| *i >= 4));
}

// Boundaries.

#[test]
fn square_with_boundary() {
    let square = [
        point(0.0, 0.0),
        point(10.0, 0.0),
        point(10.0, 10.0),
        point(0.0, 10.0),
    ];

    // The inset is added to the offset when vertices are not relocated.
    let options = FillOptions::non_zero()
        .with_boundary_offset(1.0)
        .with_boundary_inset(1.0)
        .with_relocate_rule(RelocateRule::Never);
    let output = tessellate_contours(&[&square], options).unwrap();

    assert_eq!(output.count, Count { vertices: 8, triangles: 10 });
    assert_eq!(output.interior_triangles(), 2);
    assert!((triangles_area(&output) - 13.0 * 13.0).abs() < 1e-2);

    let ribbon: Vec<&FillVertex> = output
        .vertices
        .iter()
        .filter(|v| v.blend_value() < 1.0)
        .collect();
    assert_eq!(ribbon.len(), 4);
    for v in ribbon {
        assert_eq!(v.blend_value(), 0.0);
        let p = v.position();
        assert!((p.x + 1.5).abs() < 1e-4 || (p.x - 11.5).abs() < 1e-4, "{:?}", p);
        assert!((p.y + 1.5).abs() < 1e-4 || (p.y - 11.5).abs() < 1e-4, "{:?}", p);
        // Toward the square.
        let to_center = point(5.0, 5.0) - p;
        assert!(v.normal().dot(to_center) > 0.0);
    }
}

#[test]
fn relocated_boundary() {
    let square = [
        point(0.0, 0.0),
        point(10.0, 0.0),
        point(10.0, 10.0),
        point(0.0, 10.0),
    ];

    let options = FillOptions::non_zero()
        .with_antialiasing(1.0)
        .with_relocate_rule(RelocateRule::Always);
    let output = tessellate_contours(&[&square], options).unwrap();

    assert_eq!(output.interior_triangles(), 2);
    // The interior shrinks by the inset, the ribbon extends past the contour by the offset.
    let interior: Vec<Point> = output
        .vertices
        .iter()
        .filter(|v| v.blend_value() == 1.0)
        .map(|v| v.position())
        .collect();
    assert_eq!(interior.len(), 4);
    for p in &interior {
        assert!((p.x - 1.0).abs() < 1e-4 || (p.x - 9.0).abs() < 1e-4, "{:?}", p);
        assert!((p.y - 1.0).abs() < 1e-4 || (p.y - 9.0).abs() < 1e-4, "{:?}", p);
    }
    assert!((triangles_area(&output) - 12.0 * 12.0).abs() < 1e-2);
}

#[test]
fn sharp_corners_fade_out() {
    // A thin spike, its miter is clamped.
    let spike = [point(0.0, 0.0), point(100.0, 1.0), point(0.0, 2.0)];
    let options = FillOptions::non_zero()
        .with_boundary_offset(1.0)
        .with_relocate_rule(RelocateRule::Never);
    let output = tessellate_contours(&[&spike], options).unwrap();

    assert_eq!(output.interior_triangles(), 1);
    let faded = output
        .vertices
        .iter()
        .filter(|v| v.blend_value() > 0.0 && v.blend_value() < 1.0)
        .count();
    assert_eq!(faded, 1);
}

#[test]
fn boundary_offset_monotonicity() {
    let square = [
        point(0.0, 0.0),
        point(10.0, 0.0),
        point(10.0, 10.0),
        point(0.0, 10.0),
    ];

    let mut previous: Option<Output> = None;
    for &offset in &[1.0, 20.0, 40.0] {
        let options = FillOptions::non_zero()
            .with_boundary_offset(offset)
            .with_relocate_rule(RelocateRule::DistanceField);
        let output = tessellate_contours(&[&square], options).unwrap();
        assert_eq!(output.interior_triangles(), 2);

        if let Some(previous) = previous {
            assert!(output.vertices.len() > previous.vertices.len());
        }
        previous = Some(output);
    }

    // Without distance field, the ribbon doesn't depend on the offset.
    let small = tessellate_contours(
        &[&square],
        FillOptions::non_zero()
            .with_boundary_offset(1.0)
            .with_relocate_rule(RelocateRule::Never),
    )
    .unwrap();
    let large = tessellate_contours(
        &[&square],
        FillOptions::non_zero()
            .with_boundary_offset(20.0)
            .with_relocate_rule(RelocateRule::Never),
    )
    .unwrap();
    assert_eq!(small.count, large.count);
}

#[test]
fn boundary_of_shape_with_hole() {
    let outer = [
        point(0.0, 0.0),
        point(10.0, 0.0),
        point(10.0, 10.0),
        point(0.0, 10.0),
    ];
    let inner = [
        point(3.0, 3.0),
        point(7.0, 3.0),
        point(7.0, 7.0),
        point(3.0, 7.0),
    ];

    let options = FillOptions::even_odd()
        .with_boundary_offset(0.5)
        .with_relocate_rule(RelocateRule::Never);
    let output = tessellate_contours(&[&outer, &inner], options).unwrap();

    assert_eq!(output.interior_triangles(), 8);
    // One ring around each contour.
    assert_eq!(output.vertices.len(), 16);
    assert_eq!(output.triangles(), 8 + 16);
}

#[test]
fn self_touching_boundary() {
    // The outline goes through the crossing twice, the vertex is split there.
    let path = [
        point(0.0, 0.0),
        point(10.0, 10.0),
        point(10.0, 0.0),
        point(0.0, 10.0),
    ];

    for &rule in &[RelocateRule::Never, RelocateRule::Auto, RelocateRule::Always] {
        let options = FillOptions::even_odd()
            .with_antialiasing(0.5)
            .with_relocate_rule(rule);
        let output = tessellate_contours(&[&path], options).unwrap();

        assert_eq!(output.interior_triangles(), 2, "{:?}", rule);
        assert_eq!(output.count.triangles as usize, output.triangles());
        assert_eq!(output.count.vertices as usize, output.vertices.len());
    }
}

#[test]
fn monotonize_boundary() {
    let path = [
        point(0.0, 0.0),
        point(20.0, 0.0),
        point(20.0, 20.0),
        point(10.0, 5.0),
        point(0.0, 20.0),
    ];

    let options = FillOptions::non_zero()
        .with_antialiasing(1.0)
        .with_relocate_rule(RelocateRule::Monotonize);
    let output = tessellate_contours(&[&path], options).unwrap();

    assert_eq!(output.interior_triangles(), 3);
    assert_eq!(output.count.triangles as usize, output.triangles());
}

#[test]
fn endpoints_close_to_crossings() {
    // The vertical edge crosses both other contours right next to their vertices.
    let a = [
        point(23.0, 79.0),
        point(12.0, 80.0),
        point(1.0, 91.0),
        point(5.0, 7.0),
        point(77.0, 18.0),
    ];
    let b = [point(30.0, 98.0), point(30.0, 0.0), point(40.0, 42.0)];
    let c = [
        point(52.0, 28.0),
        point(41.0, 60.0),
        point(83.0, 11.0),
        point(10.0, 56.0),
        point(36.0, 59.0),
        point(88.0, 99.0),
    ];

    for &fill_rule in &ALL_FILL_RULES {
        check_coverage(&[&a, &b, &c], fill_rule);
    }
}

#[test]
fn coverage_matches_winding_numbers() {
    let shapes: &[&[&[Point]]] = &[
        // Hourglass.
        &[&[
            point(0.0, 0.0),
            point(10.0, 10.0),
            point(10.0, 0.0),
            point(0.0, 10.0),
        ]],
        // Pentagram.
        &[&[
            point(0.0, -10.0),
            point(5.9, 8.1),
            point(-9.5, -3.1),
            point(9.5, -3.1),
            point(-5.9, 8.1),
        ]],
        // Overlapping squares, the last one clockwise.
        &[
            &[point(0.0, 0.0), point(6.0, 0.0), point(6.0, 6.0), point(0.0, 6.0)],
            &[point(3.0, 3.0), point(9.0, 3.0), point(9.0, 9.0), point(3.0, 9.0)],
            &[point(4.0, 1.0), point(4.0, 5.0), point(8.0, 5.0), point(8.0, 1.0)],
        ],
        // Nested squares, the innermost one clockwise.
        &[
            &[point(0.0, 0.0), point(10.0, 0.0), point(10.0, 10.0), point(0.0, 10.0)],
            &[point(2.0, 2.0), point(8.0, 2.0), point(8.0, 8.0), point(2.0, 8.0)],
            &[point(4.0, 4.0), point(4.0, 6.0), point(6.0, 6.0), point(6.0, 4.0)],
        ],
        // Spiral crossing itself twice.
        &[&[
            point(0.0, 0.0),
            point(10.0, 0.0),
            point(10.0, 10.0),
            point(2.0, 10.0),
            point(2.0, 2.0),
            point(8.0, 2.0),
            point(8.0, 8.0),
            point(0.0, 8.0),
        ]],
        &[
            &[
                point(97.0, 8.0),
                point(32.0, 15.0),
                point(63.0, 97.0),
                point(57.0, 60.0),
                point(83.0, 48.0),
                point(100.0, 26.0),
                point(12.0, 62.0),
            ],
            &[point(49.0, 55.0), point(77.0, 97.0), point(98.0, 0.0)],
        ],
        &[
            &[
                point(92.0, 29.0),
                point(75.0, 13.0),
                point(40.0, 3.0),
                point(2.0, 3.0),
                point(83.0, 69.0),
            ],
            &[point(48.0, 87.0), point(27.0, 54.0), point(92.0, 3.0)],
            &[
                point(28.0, 97.0),
                point(56.0, 63.0),
                point(70.0, 29.0),
                point(44.0, 29.0),
                point(86.0, 28.0),
                point(97.0, 58.0),
                point(37.0, 2.0),
            ],
        ],
        &[
            &[
                point(82.0, 12.0),
                point(23.0, 80.0),
                point(92.0, 37.0),
                point(15.0, 95.0),
                point(42.0, 92.0),
                point(91.0, 64.0),
                point(54.0, 64.0),
            ],
            &[point(38.0, 36.0), point(75.0, 63.0), point(64.0, 50.0), point(75.0, 4.0)],
            &[
                point(31.0, 95.0),
                point(51.0, 53.0),
                point(85.0, 22.0),
                point(46.0, 70.0),
                point(89.0, 99.0),
                point(86.0, 94.0),
            ],
        ],
        &[
            &[
                point(65.0, 44.0),
                point(73.0, 45.0),
                point(58.0, 34.0),
                point(84.0, 70.0),
                point(77.0, 93.0),
                point(0.0, 49.0),
            ],
            &[
                point(16.0, 66.0),
                point(99.0, 71.0),
                point(26.0, 54.0),
                point(7.0, 61.0),
                point(46.0, 72.0),
                point(70.0, 25.0),
                point(64.0, 52.0),
            ],
        ],
        &[
            &[
                point(58.0, 21.0),
                point(99.0, 90.0),
                point(79.0, 65.0),
                point(4.0, 48.0),
                point(25.0, 44.0),
                point(12.0, 26.0),
                point(73.0, 86.0),
            ],
            &[
                point(75.0, 24.0),
                point(63.0, 13.0),
                point(85.0, 49.0),
                point(37.0, 64.0),
                point(63.0, 2.0),
                point(41.0, 78.0),
            ],
        ],
    ];

    for contours in shapes {
        for &fill_rule in &ALL_FILL_RULES {
            check_coverage(contours, fill_rule);
        }
    }
}
