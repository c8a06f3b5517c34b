//! Widening output: the sink trait and the two provided implementations.
//!
//! The widener communicates with its consumer through [`WideningSink`], a
//! strictly ordered stream of rail events: offset pairs advance both rails,
//! wedges and caps touch one rail, and `add_figure` seals the current
//! sub-stroke. [`ContourAssembler`] turns that stream into closed outline
//! figures on a [`Shape`]; [`HitTestSink`] folds it into a winding number
//! around a query point instead, and aborts the traversal as soon as the
//! answer is known.

use crate::math::{Point, Transform, Vector};
use crate::path::geom::CubicBezierSegment;
use crate::path::{Shape, ShapeEvent, Side};

use alloc::vec::Vec;

/// Which end of a sub-stroke a cap belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CapEnd {
    /// The cap closing the seam where the two rails were seeded.
    Start,
    /// The cap bridging the rails' final points.
    End,
}

/// Receives the widened geometry of one figure, one primitive at a time.
///
/// Calls arrive in a strict order reflecting monotonically increasing
/// progress along the path: `start_with` first, then offset-pair and corner
/// events alternating as the spine advances, then `add_figure` sealing the
/// sub-stroke. Cap events for the start of a sub-stroke arrive right after
/// `start_with`; cap events for its end arrive right before `add_figure`.
pub trait WideningSink {
    /// Begin a sub-stroke, seeding the left and right rails.
    fn start_with(&mut self, left: Point, right: Point);

    /// Advance both rails with a straight step.
    fn quad_to(&mut self, left: Point, right: Point);

    /// Advance both rails along a flattened curve step.
    ///
    /// The rails move to `spine ± offset`. `seg_dir` is the curve tangent
    /// for this step; implementations use it to detect an offset direction
    /// reversing against the spine (a kink) and patch the tear through the
    /// spine point.
    fn curved_quad_to(&mut self, offset: Vector, seg_dir: Vector, spine: Point, prev_spine: Point);

    /// Append a cubic bézier arc to one rail (round joins, refinement arcs).
    fn curve_wedge(&mut self, side: Side, ctrl1: Point, ctrl2: Point, to: Point);

    /// Append straight segments to one rail (miter and bevel joins).
    fn polyline_wedge(&mut self, side: Side, points: &[Point]);

    /// Fill the inner side of a corner: to the spine point, then out to the
    /// new inner offset point.
    fn inner_corner(&mut self, side: Side, center: Point, offset_point: Point);

    /// A round cap: two symmetric bézier half-arcs from the current rail
    /// point through `mid` to `to`.
    fn bezier_cap(
        &mut self,
        end: CapEnd,
        ctrl1a: Point,
        ctrl2a: Point,
        mid: Point,
        ctrl1b: Point,
        ctrl2b: Point,
        to: Point,
    );

    /// A triangular cap through `apex`.
    fn cap_triangle(&mut self, end: CapEnd, apex: Point, to: Point);

    /// A flat cap; the straight bridge between the rails.
    fn cap_flat(&mut self, end: CapEnd, to: Point);

    /// Move the rail endpoints without emitting geometry (smooth corners).
    fn set_current_points(&mut self, left: Point, right: Point);

    /// Swap the rails' roles; emitted at 180° turns.
    fn switch_sides(&mut self);

    /// Seal the current sub-stroke into one closed output figure.
    fn add_figure(&mut self);

    /// Merge externally supplied geometry (markers, custom caps) into the
    /// output.
    fn add_fill(&mut self, shape: &Shape, transform: Option<&Transform>) {
        let _ = (shape, transform);
    }

    /// Polled by the widener after each unit of work; once true, no further
    /// geometry is emitted.
    fn aborted(&self) -> bool {
        false
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum RailVerb {
    Line,
    Cubic,
}

/// One accumulating offset rail: a point buffer plus verb bytes.
#[derive(Clone, Debug, Default)]
struct Rail {
    points: Vec<Point>,
    verbs: Vec<RailVerb>,
}

impl Rail {
    fn seed(&mut self, at: Point) {
        self.points.clear();
        self.verbs.clear();
        self.points.push(at);
    }

    fn line_to(&mut self, to: Point) {
        self.points.push(to);
        self.verbs.push(RailVerb::Line);
    }

    fn cubic_to(&mut self, ctrl1: Point, ctrl2: Point, to: Point) {
        self.points.push(ctrl1);
        self.points.push(ctrl2);
        self.points.push(to);
        self.verbs.push(RailVerb::Cubic);
    }

    fn first(&self) -> Point {
        self.points[0]
    }

    fn last(&self) -> Point {
        *self.points.last().unwrap()
    }

    fn set_last(&mut self, p: Point) {
        *self.points.last_mut().unwrap() = p;
    }

    fn is_seeded(&self) -> bool {
        !self.points.is_empty()
    }
}

/// Accumulates the two offset rails of each sub-stroke and seals them into
/// closed figures on the output shape.
///
/// One closed figure is produced per continuous stroked run: the right rail
/// is reverse-appended to the left one, the start-cap seam is replayed, and
/// the contour is closed.
pub struct ContourAssembler<'l> {
    output: &'l mut Shape,
    left: Rail,
    right: Rail,
    // Start cap geometry, recorded as steps from the right seed point to the
    // left seed point and replayed at sealing time.
    start_cap: Rail,
}

impl<'l> ContourAssembler<'l> {
    pub fn new(output: &'l mut Shape) -> Self {
        ContourAssembler {
            output,
            left: Rail::default(),
            right: Rail::default(),
            start_cap: Rail::default(),
        }
    }

    fn rail(&mut self, side: Side) -> &mut Rail {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    fn kinked_step(rail: &mut Rail, to: Point, seg_dir: Vector, prev_spine: Point) {
        let step = to - rail.last();
        if step.dot(seg_dir) < 0.0 {
            // The offset direction reversed against the spine; patch the
            // tear with a triangle through the spine point.
            rail.line_to(prev_spine);
        }
        rail.line_to(to);
    }
}

impl<'l> WideningSink for ContourAssembler<'l> {
    fn start_with(&mut self, left: Point, right: Point) {
        self.left.seed(left);
        self.right.seed(right);
        self.start_cap.seed(right);
    }

    fn quad_to(&mut self, left: Point, right: Point) {
        self.left.line_to(left);
        self.right.line_to(right);
    }

    fn curved_quad_to(&mut self, offset: Vector, seg_dir: Vector, spine: Point, prev_spine: Point) {
        Self::kinked_step(&mut self.left, spine + offset, seg_dir, prev_spine);
        Self::kinked_step(&mut self.right, spine - offset, seg_dir, prev_spine);
    }

    fn curve_wedge(&mut self, side: Side, ctrl1: Point, ctrl2: Point, to: Point) {
        self.rail(side).cubic_to(ctrl1, ctrl2, to);
    }

    fn polyline_wedge(&mut self, side: Side, points: &[Point]) {
        let rail = self.rail(side);
        for p in points {
            rail.line_to(*p);
        }
    }

    fn inner_corner(&mut self, side: Side, center: Point, offset_point: Point) {
        let rail = self.rail(side);
        rail.line_to(center);
        rail.line_to(offset_point);
    }

    fn bezier_cap(
        &mut self,
        end: CapEnd,
        ctrl1a: Point,
        ctrl2a: Point,
        mid: Point,
        ctrl1b: Point,
        ctrl2b: Point,
        to: Point,
    ) {
        let rail = match end {
            CapEnd::End => &mut self.left,
            CapEnd::Start => &mut self.start_cap,
        };
        rail.cubic_to(ctrl1a, ctrl2a, mid);
        rail.cubic_to(ctrl1b, ctrl2b, to);
    }

    fn cap_triangle(&mut self, end: CapEnd, apex: Point, to: Point) {
        let rail = match end {
            CapEnd::End => &mut self.left,
            CapEnd::Start => &mut self.start_cap,
        };
        rail.line_to(apex);
        rail.line_to(to);
    }

    fn cap_flat(&mut self, _end: CapEnd, _to: Point) {
        // The straight bridge between the rails is produced when the figure
        // is sealed.
    }

    fn set_current_points(&mut self, left: Point, right: Point) {
        self.left.set_last(left);
        self.right.set_last(right);
    }

    fn switch_sides(&mut self) {
        core::mem::swap(&mut self.left, &mut self.right);
    }

    fn add_figure(&mut self) {
        if !self.left.is_seeded() || !self.right.is_seeded() {
            return;
        }

        self.output.begin(self.left.first());

        // Left rail, forward.
        let mut pt = 1;
        for verb in &self.left.verbs {
            match verb {
                RailVerb::Line => {
                    self.output.line_to(self.left.points[pt]);
                    pt += 1;
                }
                RailVerb::Cubic => {
                    self.output.cubic_to(
                        self.left.points[pt],
                        self.left.points[pt + 1],
                        self.left.points[pt + 2],
                    );
                    pt += 3;
                }
            }
        }

        // Bridge to the right rail's end (the flat end cap, or a zero-length
        // step when other cap geometry already joined the rails).
        if self.left.last() != self.right.last() {
            self.output.line_to(self.right.last());
        }

        // Right rail, reversed.
        let mut pt = self.right.points.len() - 1;
        for verb in self.right.verbs.iter().rev() {
            match verb {
                RailVerb::Line => {
                    self.output.line_to(self.right.points[pt - 1]);
                    pt -= 1;
                }
                RailVerb::Cubic => {
                    self.output.cubic_to(
                        self.right.points[pt - 1],
                        self.right.points[pt - 2],
                        self.right.points[pt - 3],
                    );
                    pt -= 3;
                }
            }
        }

        // Start cap seam, from the right seed back to the left seed.
        let mut pt = 1;
        for verb in &self.start_cap.verbs {
            match verb {
                RailVerb::Line => {
                    self.output.line_to(self.start_cap.points[pt]);
                    pt += 1;
                }
                RailVerb::Cubic => {
                    self.output.cubic_to(
                        self.start_cap.points[pt],
                        self.start_cap.points[pt + 1],
                        self.start_cap.points[pt + 2],
                    );
                    pt += 3;
                }
            }
        }

        self.output.close();

        self.left = Rail::default();
        self.right = Rail::default();
        self.start_cap = Rail::default();
    }

    fn add_fill(&mut self, shape: &Shape, transform: Option<&Transform>) {
        let map = |p: Point| match transform {
            Some(t) => t.transform_point(p),
            None => p,
        };
        for event in shape.iter() {
            match event {
                ShapeEvent::Begin { at } => self.output.begin(map(at)),
                ShapeEvent::Line { to, .. } => self.output.line_to(map(to)),
                ShapeEvent::Cubic {
                    ctrl1, ctrl2, to, ..
                } => self.output.cubic_to(map(ctrl1), map(ctrl2), map(to)),
                ShapeEvent::End { .. } => self.output.close(),
            }
        }
    }
}

/// Accumulates a point-in-stroke test instead of building geometry.
///
/// Every emitted primitive is treated as a closed sub-polygon; the query
/// point is hit when it winds inside any of them or lies within `tolerance`
/// of an edge. [`aborted`](WideningSink::aborted) turns true the moment the
/// hit is confirmed so the widener can short-circuit the traversal.
pub struct HitTestSink {
    query: Point,
    tolerance: f32,
    hit: bool,
    cur_left: Point,
    cur_right: Point,
    // Pivot for wedge polygons: the spine point of the corner in progress.
    pivot: Point,
    scratch: Vec<Point>,
}

impl HitTestSink {
    pub fn new(query: Point, tolerance: f32) -> Self {
        HitTestSink {
            query,
            tolerance,
            hit: false,
            cur_left: Point::zero(),
            cur_right: Point::zero(),
            pivot: Point::zero(),
            scratch: Vec::new(),
        }
    }

    pub fn was_hit(&self) -> bool {
        self.hit
    }

    fn test_polygon(&mut self, points: &[Point]) {
        if self.hit || points.len() < 3 {
            return;
        }
        let mut winding = 0i32;
        for i in 0..points.len() {
            let a = points[i];
            let b = points[(i + 1) % points.len()];
            if segment_distance_sq(self.query, a, b) <= self.tolerance * self.tolerance {
                self.hit = true;
                return;
            }
            test_edge_winding(self.query, a, b, &mut winding);
        }
        if winding != 0 {
            self.hit = true;
        }
    }

    fn flatten_into_scratch(&mut self, from: Point, ctrl1: Point, ctrl2: Point, to: Point) {
        let curve = CubicBezierSegment {
            from,
            ctrl1,
            ctrl2,
            to,
        };
        let tolerance = self.tolerance.max(1e-3);
        let scratch = &mut self.scratch;
        curve.for_each_flattened_with_tangent(tolerance, &mut |p, _| {
            scratch.push(p);
        });
    }
}

impl WideningSink for HitTestSink {
    fn start_with(&mut self, left: Point, right: Point) {
        self.cur_left = left;
        self.cur_right = right;
        self.pivot = left.lerp(right, 0.5);
    }

    fn quad_to(&mut self, left: Point, right: Point) {
        let quad = [self.cur_left, left, right, self.cur_right];
        self.test_polygon(&quad);
        self.cur_left = left;
        self.cur_right = right;
    }

    fn curved_quad_to(&mut self, offset: Vector, _seg_dir: Vector, spine: Point, _prev: Point) {
        self.quad_to(spine + offset, spine - offset);
    }

    fn curve_wedge(&mut self, side: Side, ctrl1: Point, ctrl2: Point, to: Point) {
        let from = match side {
            Side::Left => self.cur_left,
            Side::Right => self.cur_right,
        };
        self.scratch.clear();
        self.scratch.push(self.pivot);
        self.scratch.push(from);
        self.flatten_into_scratch(from, ctrl1, ctrl2, to);
        let polygon = core::mem::take(&mut self.scratch);
        self.test_polygon(&polygon);
        self.scratch = polygon;
        match side {
            Side::Left => self.cur_left = to,
            Side::Right => self.cur_right = to,
        }
    }

    fn polyline_wedge(&mut self, side: Side, points: &[Point]) {
        let from = match side {
            Side::Left => self.cur_left,
            Side::Right => self.cur_right,
        };
        self.scratch.clear();
        self.scratch.push(self.pivot);
        self.scratch.push(from);
        self.scratch.extend_from_slice(points);
        let polygon = core::mem::take(&mut self.scratch);
        self.test_polygon(&polygon);
        self.scratch = polygon;
        if let Some(last) = points.last() {
            match side {
                Side::Left => self.cur_left = *last,
                Side::Right => self.cur_right = *last,
            }
        }
    }

    fn inner_corner(&mut self, side: Side, center: Point, offset_point: Point) {
        self.pivot = center;
        let from = match side {
            Side::Left => self.cur_left,
            Side::Right => self.cur_right,
        };
        let triangle = [from, center, offset_point];
        self.test_polygon(&triangle);
        match side {
            Side::Left => self.cur_left = offset_point,
            Side::Right => self.cur_right = offset_point,
        }
    }

    fn bezier_cap(
        &mut self,
        end: CapEnd,
        ctrl1a: Point,
        ctrl2a: Point,
        mid: Point,
        ctrl1b: Point,
        ctrl2b: Point,
        to: Point,
    ) {
        let from = match end {
            CapEnd::End => self.cur_left,
            CapEnd::Start => self.cur_right,
        };
        self.scratch.clear();
        self.scratch.push(from);
        self.flatten_into_scratch(from, ctrl1a, ctrl2a, mid);
        self.flatten_into_scratch(mid, ctrl1b, ctrl2b, to);
        let polygon = core::mem::take(&mut self.scratch);
        self.test_polygon(&polygon);
        self.scratch = polygon;
    }

    fn cap_triangle(&mut self, end: CapEnd, apex: Point, to: Point) {
        let from = match end {
            CapEnd::End => self.cur_left,
            CapEnd::Start => self.cur_right,
        };
        let triangle = [from, apex, to];
        self.test_polygon(&triangle);
    }

    fn cap_flat(&mut self, _end: CapEnd, _to: Point) {
        if !self.hit
            && segment_distance_sq(self.query, self.cur_left, self.cur_right)
                <= self.tolerance * self.tolerance
        {
            self.hit = true;
        }
    }

    fn set_current_points(&mut self, left: Point, right: Point) {
        self.cur_left = left;
        self.cur_right = right;
    }

    fn switch_sides(&mut self) {
        core::mem::swap(&mut self.cur_left, &mut self.cur_right);
    }

    fn add_figure(&mut self) {}

    fn aborted(&self) -> bool {
        self.hit
    }
}

// Winding contribution of one polygon edge with respect to `point`, in the
// manner of a scanline crossing test on the horizontal through the point.
fn test_edge_winding(point: Point, from: Point, to: Point, winding: &mut i32) {
    let y0 = from.y;
    let y1 = to.y;
    let min_y = y0.min(y1);
    let max_y = y0.max(y1);

    if min_y > point.y || max_y <= point.y || y0 == y1 {
        return;
    }

    let d = y1 - y0;
    let t = (point.y - y0) / d;
    let x = from.x + (to.x - from.x) * t;

    if x > point.x {
        return;
    }

    *winding += if d > 0.0 { 1 } else { -1 };
}

fn segment_distance_sq(p: Point, a: Point, b: Point) -> f32 {
    let ab = b - a;
    let len_sq = ab.square_length();
    if len_sq <= 0.0 {
        return (p - a).square_length();
    }
    let t = ((p - a).dot(ab) / len_sq).max(0.0).min(1.0);
    (p - (a + ab * t)).square_length()
}
