//! Engine-level tests driving the public widening API.

use crate::math::{point, Box2D, Point, Transform, Vector};
use crate::path::{Figure, FigureBuilder, Shape, ShapeEvent, Side};
use crate::sink::{CapEnd, WideningSink};
use crate::{widen, ContourAssembler, DashStyle, LineCap, LineJoin, PenGeometry, WidenError, Widener};

use alloc::vec::Vec;

fn line_figure(points: &[Point]) -> Figure {
    let mut builder = Figure::builder(points[0]);
    for p in &points[1..] {
        builder.line_to(*p);
    }
    builder.build()
}

fn outline(figure: &Figure, pen: &PenGeometry) -> Shape {
    Widener::new(0.05).outline(figure, pen, None).unwrap()
}

// One bounding box per output figure, control points included.
fn figure_boxes(shape: &Shape) -> Vec<Box2D> {
    let mut boxes = Vec::new();
    let mut cur: Option<Box2D> = None;
    let mut grow = |cur: &mut Option<Box2D>, p: Point| {
        let b = cur.as_mut().unwrap();
        b.min.x = b.min.x.min(p.x);
        b.min.y = b.min.y.min(p.y);
        b.max.x = b.max.x.max(p.x);
        b.max.y = b.max.y.max(p.y);
    };
    for event in shape.iter() {
        match event {
            ShapeEvent::Begin { at } => cur = Some(Box2D { min: at, max: at }),
            ShapeEvent::Line { to, .. } => grow(&mut cur, to),
            ShapeEvent::Cubic {
                ctrl1, ctrl2, to, ..
            } => {
                grow(&mut cur, ctrl1);
                grow(&mut cur, ctrl2);
                grow(&mut cur, to);
            }
            ShapeEvent::End { .. } => boxes.push(cur.take().unwrap()),
        }
    }
    boxes
}

fn assert_box_close(b: &Box2D, min: Point, max: Point, eps: f32) {
    assert!((b.min - min).length() < eps, "min {:?} vs {:?}", b.min, min);
    assert!((b.max - max).length() < eps, "max {:?} vs {:?}", b.max, max);
}

#[test]
fn empty_pen_round_trip() {
    let figure = line_figure(&[point(0.0, 0.0), point(10.0, 0.0)]);

    let zero = PenGeometry::elliptical(0.0, 0.0, 0.0);
    let shape = Widener::new(0.1).outline(&figure, &zero, None).unwrap();
    assert!(shape.is_empty());

    // A transform collapsing the pen below tolerance must also widen to
    // nothing.
    let pen = PenGeometry::width(2.0);
    let squash = Transform::scale(1e-8, 1e-8);
    let shape = Widener::new(0.1)
        .outline(&figure, &pen, Some(&squash))
        .unwrap();
    assert!(shape.is_empty());
}

#[test]
fn open_figure_emits_one_closed_contour() {
    let figure = line_figure(&[point(0.0, 0.0), point(10.0, 0.0), point(10.0, 10.0)]);
    let shape = outline(&figure, &PenGeometry::width(2.0));
    assert_eq!(shape.num_figures(), 1);

    // Every figure is explicitly closed, with finite geometry.
    let mut open_figures = 0;
    for event in shape.iter() {
        match event {
            ShapeEvent::Begin { .. } => open_figures += 1,
            ShapeEvent::End { .. } => open_figures -= 1,
            ShapeEvent::Line { to, .. } => assert!(to.x.is_finite() && to.y.is_finite()),
            ShapeEvent::Cubic { to, .. } => assert!(to.x.is_finite() && to.y.is_finite()),
        }
    }
    assert_eq!(open_figures, 0);
}

#[test]
fn closed_figure_seals_at_the_seam() {
    let figure = FigureBuilder::rectangle(point(0.0, 0.0), point(10.0, 10.0));
    let shape = outline(&figure, &PenGeometry::width(2.0));
    assert_eq!(shape.num_figures(), 1);

    let boxes = figure_boxes(&shape);
    assert_box_close(&boxes[0], point(-1.0, -1.0), point(11.0, 11.0), 1e-4);
}

#[test]
fn miter_vertex_is_emitted_within_the_limit() {
    // A right-angle corner: the miter vertex sits at distance r·√2 from
    // the spine corner, well within the default limit.
    let figure = line_figure(&[point(0.0, 0.0), point(10.0, 0.0), point(10.0, 10.0)]);
    let shape = outline(&figure, &PenGeometry::width(2.0));

    let mut found_miter = false;
    for event in shape.iter() {
        if let ShapeEvent::Line { to, .. } = event {
            if (to - point(11.0, -1.0)).length() < 1e-4 {
                found_miter = true;
            }
        }
    }
    assert!(found_miter, "missing miter vertex at (11, -1)");
}

#[test]
fn miter_limit_bounds_the_spike() {
    // A very sharp turn whose full miter would reach ~12 pen radii past
    // the corner.
    let spine = [point(0.0, 0.0), point(10.0, 0.0), point(0.5, 1.5)];
    let corner = spine[1];
    let limit = 2.0;

    let pen = PenGeometry::width(2.0)
        .with_line_join(LineJoin::Miter)
        .with_miter_limit(limit);
    let shape = outline(&line_figure(&spine), &pen);

    // The clip keeps the outline within the limit of the corner; without
    // it the spike would push the bounding box out to x ≈ 22.
    let b = shape.fast_bounding_box().unwrap();
    assert!(b.max.x < corner.x + limit + 0.5, "unclipped spike: {:?}", b);

    // The clipped miter introduces two clip vertices at distance close to
    // the limit from the corner.
    let mut clipped = 0;
    for event in shape.iter() {
        if let ShapeEvent::Line { to, .. } = event {
            let d = (to - corner).length();
            if (d - limit).abs() < 0.6 {
                clipped += 1;
            }
        }
    }
    assert!(clipped >= 2, "expected clip vertices near the miter limit");
}

#[test]
fn exceeded_miter_clipped_matches_bevel() {
    let spine = [point(0.0, 0.0), point(10.0, 0.0), point(0.5, 1.5)];

    let clipped_pen = PenGeometry::width(2.0)
        .with_line_join(LineJoin::MiterClipped)
        .with_miter_limit(1.0);
    let bevel_pen = PenGeometry::width(2.0).with_line_join(LineJoin::Bevel);

    let a = outline(&line_figure(&spine), &clipped_pen);
    let b = outline(&line_figure(&spine), &bevel_pen);
    assert_eq!(a, b);
}

#[test]
fn solid_dash_style_is_a_pass_through() {
    let spine = [point(0.0, 0.0), point(10.0, 0.0), point(10.0, 10.0)];
    let solid = PenGeometry::width(2.0);

    // A dash pattern that never interrupts the stroke must reproduce the
    // solid output bit for bit.
    let covering = PenGeometry::width(2.0).with_dashes(&[1000.0, 0.0], 0.0);

    let a = outline(&line_figure(&spine), &solid);
    let b = outline(&line_figure(&spine), &covering);
    assert_eq!(a, b);
}

#[test]
fn dash_boundaries_on_a_straight_segment() {
    // Pattern [3, 2] with phase 0 over a length-10 segment: boundaries at
    // 0, 3, 5, 8 and 10, alternating dash/gap/dash/gap/dash.
    let figure = line_figure(&[point(0.0, 0.0), point(10.0, 0.0)]);
    let pen = PenGeometry::width(2.0).with_dashes(&[3.0, 2.0], 0.0);
    let shape = outline(&figure, &pen);

    let boxes = figure_boxes(&shape);
    assert_eq!(boxes.len(), 3);
    assert_box_close(&boxes[0], point(0.0, -1.0), point(3.0, 1.0), 1e-4);
    assert_box_close(&boxes[1], point(5.0, -1.0), point(8.0, 1.0), 1e-4);
    // The gap ends exactly at the endpoint, leaving a zero-length dash.
    assert_box_close(&boxes[2], point(10.0, -1.0), point(10.0, 1.0), 1e-4);
}

#[test]
fn dash_spacing_follows_the_inverse_transform() {
    // Under a 2× horizontal stretch, dash lengths are measured in path
    // space: pattern [3, 2] lands at world x = 6 for the first dash end.
    let figure = line_figure(&[point(0.0, 0.0), point(10.0, 0.0)]);
    let pen = PenGeometry::width(2.0).with_dashes(&[3.0, 2.0], 0.0);
    let stretch = Transform::scale(2.0, 1.0);
    let shape = Widener::new(0.05)
        .outline(&figure, &pen, Some(&stretch))
        .unwrap();

    let boxes = figure_boxes(&shape);
    assert!((boxes[0].max.x - 6.0).abs() < 1e-3, "{:?}", boxes[0]);
}

#[test]
fn a_dash_turns_corners_without_caps() {
    // One dash long enough to span the corner: the join machinery runs and
    // the output is a single contour covering both legs.
    let figure = line_figure(&[point(0.0, 0.0), point(10.0, 0.0), point(10.0, 10.0)]);
    let pen = PenGeometry::width(2.0).with_dashes(&[100.0, 1.0], 0.0);
    let shape = outline(&figure, &pen);

    assert_eq!(shape.num_figures(), 1);
    let boxes = figure_boxes(&shape);
    assert_box_close(&boxes[0], point(-1.0, -1.0), point(11.0, 10.0), 1e-3);
}

#[test]
fn square_caps_extend_by_half_the_pen_width() {
    let figure = line_figure(&[point(0.0, 0.0), point(10.0, 0.0)]);
    let pen = PenGeometry::width(4.0).with_caps(LineCap::Square);
    let shape = outline(&figure, &pen);

    let boxes = figure_boxes(&shape);
    assert_eq!(boxes.len(), 1);
    assert_box_close(&boxes[0], point(-2.0, -2.0), point(12.0, 2.0), 1e-4);
}

#[test]
fn round_caps_stay_within_the_pen_radius() {
    let figure = line_figure(&[point(0.0, 0.0), point(10.0, 0.0)]);
    let pen = PenGeometry::width(4.0).with_caps(LineCap::Round);
    let shape = outline(&figure, &pen);

    // Control points of the cap arcs may poke slightly past the geometric
    // extent, but no further than the bézier circle approximation allows.
    let b = &figure_boxes(&shape)[0];
    assert!(b.min.x > -2.4 && b.min.x < -1.9);
    assert!(b.max.x < 12.4 && b.max.x > 11.9);
    assert!(b.min.y > -2.4 && b.max.y < 2.4);
}

#[test]
fn triangle_caps_reach_their_apex() {
    let figure = line_figure(&[point(0.0, 0.0), point(10.0, 0.0)]);
    let pen = PenGeometry::width(4.0).with_caps(LineCap::Triangle);
    let shape = outline(&figure, &pen);

    let mut found_start_apex = false;
    let mut found_end_apex = false;
    for event in shape.iter() {
        if let ShapeEvent::Line { to, .. } = event {
            found_start_apex |= (to - point(-2.0, 0.0)).length() < 1e-4;
            found_end_apex |= (to - point(12.0, 0.0)).length() < 1e-4;
        }
    }
    assert!(found_start_apex && found_end_apex);
}

#[test]
fn hit_test_inside_and_outside_a_rectangle_stroke() {
    let figure = FigureBuilder::rectangle(point(0.0, 0.0), point(10.0, 10.0));
    let pen = PenGeometry::width(2.0);
    let widener = Widener::new(0.05);

    // Strictly inside the band around the left edge.
    assert!(widener.hit_test(point(0.5, 5.0), &figure, &pen, None).unwrap());
    assert!(widener.hit_test(point(10.0, 5.0), &figure, &pen, None).unwrap());

    // The hollow middle and the far outside are misses.
    assert!(!widener.hit_test(point(5.0, 5.0), &figure, &pen, None).unwrap());
    assert!(!widener.hit_test(point(20.0, 20.0), &figure, &pen, None).unwrap());
}

#[test]
fn hit_test_open_curve() {
    let mut builder = Figure::builder(point(0.0, 0.0));
    builder.cubic_to(point(3.0, 4.0), point(7.0, 4.0), point(10.0, 0.0));
    let figure = builder.build();
    let pen = PenGeometry::width(2.0);
    let widener = Widener::new(0.05);

    assert!(widener.hit_test(point(5.0, 3.0), &figure, &pen, None).unwrap());
    assert!(!widener.hit_test(point(5.0, -3.0), &figure, &pen, None).unwrap());
}

#[test]
fn gaps_split_the_stroke_into_runs() {
    let mut builder = Figure::builder(point(0.0, 0.0));
    builder
        .line_to(point(4.0, 0.0))
        .gap_to(point(6.0, 0.0))
        .line_to(point(10.0, 0.0));
    let figure = builder.build();

    let shape = outline(&figure, &PenGeometry::width(2.0));
    assert_eq!(shape.num_figures(), 2);

    let boxes = figure_boxes(&shape);
    assert_box_close(&boxes[0], point(0.0, -1.0), point(4.0, 1.0), 1e-4);
    assert_box_close(&boxes[1], point(6.0, -1.0), point(10.0, 1.0), 1e-4);
}

#[test]
fn degenerate_segments_are_merged_across() {
    let mut builder = Figure::builder(point(0.0, 0.0));
    builder
        .line_to(point(5.0, 0.0))
        .line_to(point(5.0, 0.0))
        .line_to(point(10.0, 0.0));
    let figure = builder.build();

    let shape = outline(&figure, &PenGeometry::width(2.0));
    assert_eq!(shape.num_figures(), 1);
    let boxes = figure_boxes(&shape);
    assert_box_close(&boxes[0], point(0.0, -1.0), point(10.0, 1.0), 1e-4);
}

#[test]
fn a_lonely_point_is_emitted_as_its_caps() {
    let mut builder = Figure::builder(point(5.0, 5.0));
    builder.line_to(point(5.0, 5.0));
    let figure = builder.build();

    // Flat caps widen a point to nothing.
    let shape = outline(&figure, &PenGeometry::width(2.0));
    assert!(shape.is_empty());

    // Round caps produce a dot.
    let pen = PenGeometry::width(2.0).with_caps(LineCap::Round);
    let shape = outline(&figure, &pen);
    assert_eq!(shape.num_figures(), 1);
    let b = &figure_boxes(&shape)[0];
    assert!((b.min - point(4.0, 4.0)).length() < 0.2);
    assert!((b.max - point(6.0, 6.0)).length() < 0.2);
}

#[test]
fn invalid_dash_arrays_are_rejected_before_widening() {
    let figure = line_figure(&[point(0.0, 0.0), point(10.0, 0.0)]);
    let mut pen = PenGeometry::width(2.0);
    pen.dash_style = DashStyle::Custom {
        array: alloc::vec![1.0, 2.0, 3.0],
        offset: 0.0,
    };

    let result = Widener::new(0.1).outline(&figure, &pen, None);
    assert!(matches!(result, Err(WidenError::InvalidDashArray { .. })));
}

#[test]
fn non_finite_input_aborts_the_figure() {
    let figure = line_figure(&[point(0.0, 0.0), point(f32::NAN, 0.0)]);
    let result = Widener::new(0.1).outline(&figure, &PenGeometry::width(2.0), None);
    assert!(matches!(result, Err(WidenError::BadNumber)));
}

#[test]
fn elliptical_pen_offsets_follow_the_ellipse() {
    let figure = line_figure(&[point(0.0, 0.0), point(10.0, 0.0)]);
    let pen = PenGeometry::elliptical(2.0, 6.0, 0.0);
    let shape = outline(&figure, &pen);

    // A horizontal spine under a tall pen: the rails sit at the vertical
    // semi-axis.
    let boxes = figure_boxes(&shape);
    assert_box_close(&boxes[0], point(0.0, -3.0), point(10.0, 3.0), 1e-4);
}

/// Records the order of sink events, for tests that assert on the protocol
/// rather than on coordinates.
#[derive(Default)]
struct RecordingSink {
    events: Vec<&'static str>,
}

impl WideningSink for RecordingSink {
    fn start_with(&mut self, _left: Point, _right: Point) {
        self.events.push("start_with");
    }
    fn quad_to(&mut self, _left: Point, _right: Point) {
        self.events.push("quad_to");
    }
    fn curved_quad_to(&mut self, _offset: Vector, _dir: Vector, _spine: Point, _prev: Point) {
        self.events.push("curved_quad_to");
    }
    fn curve_wedge(&mut self, _side: Side, _c1: Point, _c2: Point, _to: Point) {
        self.events.push("curve_wedge");
    }
    fn polyline_wedge(&mut self, _side: Side, _points: &[Point]) {
        self.events.push("polyline_wedge");
    }
    fn inner_corner(&mut self, _side: Side, _center: Point, _offset: Point) {
        self.events.push("inner_corner");
    }
    fn bezier_cap(
        &mut self,
        _end: CapEnd,
        _c1a: Point,
        _c2a: Point,
        _mid: Point,
        _c1b: Point,
        _c2b: Point,
        _to: Point,
    ) {
        self.events.push("bezier_cap");
    }
    fn cap_triangle(&mut self, _end: CapEnd, _apex: Point, _to: Point) {
        self.events.push("cap_triangle");
    }
    fn cap_flat(&mut self, _end: CapEnd, _to: Point) {
        self.events.push("cap_flat");
    }
    fn set_current_points(&mut self, _left: Point, _right: Point) {
        self.events.push("set_current_points");
    }
    fn switch_sides(&mut self) {
        self.events.push("switch_sides");
    }
    fn add_figure(&mut self) {
        self.events.push("add_figure");
    }
}

#[test]
fn a_half_turn_switches_sides_instead_of_joining() {
    let figure = line_figure(&[point(0.0, 0.0), point(10.0, 0.0), point(0.0, 0.0)]);
    let mut sink = RecordingSink::default();
    widen(&figure, &PenGeometry::width(2.0), None, 0.05, &mut sink).unwrap();

    assert!(sink.events.contains(&"switch_sides"));
    assert!(!sink.events.contains(&"polyline_wedge"));
    assert!(!sink.events.contains(&"curve_wedge"));
}

#[test]
fn collinear_continuation_is_smooth() {
    let figure = line_figure(&[point(0.0, 0.0), point(5.0, 0.0), point(10.0, 0.0)]);
    let mut sink = RecordingSink::default();
    widen(&figure, &PenGeometry::width(2.0), None, 0.05, &mut sink).unwrap();

    // No join geometry for a straight-through corner.
    assert!(sink.events.contains(&"set_current_points"));
    assert!(!sink.events.contains(&"inner_corner"));
}

#[test]
fn smooth_joins_skip_corner_construction() {
    let mut builder = Figure::builder(point(0.0, 0.0));
    builder
        .cubic_to(point(3.0, 3.0), point(7.0, 3.0), point(10.0, 0.0))
        .smooth()
        .cubic_to(point(13.0, -3.0), point(17.0, -3.0), point(20.0, 0.0));
    let figure = builder.build();

    let mut sink = RecordingSink::default();
    widen(&figure, &PenGeometry::width(1.0), None, 0.05, &mut sink).unwrap();
    assert!(!sink.events.contains(&"inner_corner"));
    assert!(sink.events.contains(&"curved_quad_to"));
}

#[test]
fn round_joins_emit_curve_wedges() {
    let figure = line_figure(&[point(0.0, 0.0), point(10.0, 0.0), point(10.0, 10.0)]);
    let pen = PenGeometry::width(2.0).with_line_join(LineJoin::Round);
    let mut sink = RecordingSink::default();
    widen(&figure, &pen, None, 0.05, &mut sink).unwrap();
    assert!(sink.events.contains(&"curve_wedge"));
    assert!(sink.events.contains(&"inner_corner"));
}

#[test]
fn sharp_curve_with_a_fat_pen_gets_refinement_arcs() {
    // A hairpin far tighter than the pen: the flattened offsets need
    // inserted rounding arcs to avoid visible faceting.
    let mut builder = Figure::builder(point(0.0, 0.0));
    builder.cubic_to(point(4.0, 8.0), point(-4.0, 8.0), point(0.0, 0.5));
    let figure = builder.build();
    let pen = PenGeometry::width(40.0);

    let mut sink = RecordingSink::default();
    widen(&figure, &pen, None, 0.1, &mut sink).unwrap();
    assert!(
        sink.events.contains(&"curve_wedge"),
        "expected refinement arcs on a tight hairpin"
    );
}

#[test]
fn refinement_respects_the_viewable_region() {
    let mut builder = Figure::builder(point(0.0, 0.0));
    builder.cubic_to(point(4.0, 8.0), point(-4.0, 8.0), point(0.0, 0.5));
    let figure = builder.build();
    let pen = PenGeometry::width(40.0);

    // A viewport far away from the curve suppresses the extra arcs.
    let far = Box2D {
        min: point(1000.0, 1000.0),
        max: point(1010.0, 1010.0),
    };
    let mut sink = RecordingSink::default();
    Widener::new(0.1)
        .with_viewport(far)
        .widen(&figure, &pen, None, &mut sink)
        .unwrap();
    assert!(!sink.events.contains(&"curve_wedge"));
}

#[test]
fn abutting_seam_of_a_gappy_closed_figure_fuses_flat() {
    // Closed figure with a gap in the middle: the runs on both sides of
    // the start point are stroked, so they abut with flat caps.
    let mut builder = Figure::builder(point(0.0, 0.0));
    builder
        .line_to(point(10.0, 0.0))
        .gap_to(point(10.0, 10.0))
        .line_to(point(0.0, 10.0))
        .close();
    let figure = builder.build();

    let pen = PenGeometry::width(2.0).with_dash_cap(LineCap::Round);
    let mut sink = RecordingSink::default();
    widen(&figure, &pen, None, 0.05, &mut sink).unwrap();

    // Two runs: one capped with the dash cap at the gap ends, and the two
    // seam ends left flat (no bezier cap there).
    let bezier_caps = sink.events.iter().filter(|e| **e == "bezier_cap").count();
    assert_eq!(bezier_caps, 2);
}

#[test]
fn aborting_sink_short_circuits_the_traversal() {
    struct CountingSink {
        quads: u32,
    }
    impl WideningSink for CountingSink {
        fn start_with(&mut self, _l: Point, _r: Point) {}
        fn quad_to(&mut self, _l: Point, _r: Point) {
            self.quads += 1;
        }
        fn curved_quad_to(&mut self, _o: Vector, _d: Vector, _s: Point, _p: Point) {}
        fn curve_wedge(&mut self, _s: Side, _a: Point, _b: Point, _c: Point) {}
        fn polyline_wedge(&mut self, _s: Side, _p: &[Point]) {}
        fn inner_corner(&mut self, _s: Side, _c: Point, _o: Point) {}
        fn bezier_cap(
            &mut self,
            _e: CapEnd,
            _a: Point,
            _b: Point,
            _m: Point,
            _c: Point,
            _d: Point,
            _t: Point,
        ) {
        }
        fn cap_triangle(&mut self, _e: CapEnd, _a: Point, _t: Point) {}
        fn cap_flat(&mut self, _e: CapEnd, _t: Point) {}
        fn set_current_points(&mut self, _l: Point, _r: Point) {}
        fn switch_sides(&mut self) {}
        fn add_figure(&mut self) {}
        fn aborted(&self) -> bool {
            self.quads > 0
        }
    }

    let figure = line_figure(&[
        point(0.0, 0.0),
        point(10.0, 0.0),
        point(10.0, 10.0),
        point(0.0, 10.0),
    ]);
    let mut sink = CountingSink { quads: 0 };
    widen(&figure, &PenGeometry::width(2.0), None, 0.05, &mut sink).unwrap();

    // The widener stopped at the first opportunity after the abort.
    assert_eq!(sink.quads, 1);
}

#[test]
fn outline_matches_between_widen_and_convenience_entry() {
    let figure = line_figure(&[point(0.0, 0.0), point(10.0, 0.0)]);
    let pen = PenGeometry::width(2.0);

    let mut shape = Shape::new();
    {
        let mut sink = ContourAssembler::new(&mut shape);
        widen(&figure, &pen, None, 0.05, &mut sink).unwrap();
    }
    let convenience = Widener::new(0.05).outline(&figure, &pen, None).unwrap();
    assert_eq!(shape, convenience);
}
