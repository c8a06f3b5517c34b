//! The per-figure widening state machine and the public entry points.

use crate::dash::Dasher;
use crate::math::{Box2D, Point, Transform, Vector};
use crate::path::figure::{FigureSegment, FigureSource};
use crate::pen::{PenModel, RailPen};
use crate::segment::SegmentAdapter;
use crate::sink::{ContourAssembler, HitTestSink, WideningSink};
use crate::path::Shape;
use crate::{DashPattern, DashStyle, LineCap, PenGeometry};
use crate::{WidenError, WidenResult, FUZZ};

/// Widen one figure into the sink.
///
/// This is the library call: the outline (or whatever else the sink
/// accumulates) of stroking `figure` with `pen` under the optional render
/// transform, approximated to the absolute `tolerance`.
pub fn widen<F: FigureSource>(
    figure: &F,
    pen: &PenGeometry,
    transform: Option<&Transform>,
    tolerance: f32,
    sink: &mut dyn WideningSink,
) -> WidenResult {
    Widener::new(tolerance).widen(figure, pen, transform, sink)
}

/// A widening context carrying the call-independent parameters.
///
/// The viewable region, when set, gates curvature refinement: rounding arcs
/// are only spliced into offset curves whose steps can actually be seen.
#[derive(Clone, Debug)]
pub struct Widener {
    tolerance: f32,
    viewport: Option<Box2D>,
}

impl Widener {
    pub fn new(tolerance: f32) -> Self {
        Widener {
            tolerance,
            viewport: None,
        }
    }

    pub fn with_viewport(mut self, viewport: Box2D) -> Self {
        self.viewport = Some(viewport);
        self
    }

    /// Widen one figure into the sink.
    pub fn widen<F: FigureSource>(
        &self,
        figure: &F,
        pen: &PenGeometry,
        transform: Option<&Transform>,
        sink: &mut dyn WideningSink,
    ) -> WidenResult {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(WidenError::BadNumber);
        }
        if let Some(t) = transform {
            if !(t.m11.is_finite()
                && t.m12.is_finite()
                && t.m21.is_finite()
                && t.m22.is_finite()
                && t.m31.is_finite()
                && t.m32.is_finite())
            {
                return Err(WidenError::BadNumber);
            }
        }

        let model = match PenModel::resolve(pen, transform, self.tolerance)? {
            Some(model) => model,
            None => {
                trace!("pen is empty, skipping widening");
                return Ok(());
            }
        };

        let rail = RailPen::new(&model, pen.line_join, self.viewport, sink);

        match &pen.dash_style {
            DashStyle::Solid => {
                let mut target = rail;
                self.widen_figure(figure, &mut target, pen, transform, false)
            }
            DashStyle::Custom { array, offset } => {
                let pattern = DashPattern::new(array, *offset)?;
                let mut target = Dasher::new(rail, &pattern, pen.dash_cap, transform)?;
                self.widen_figure(figure, &mut target, pen, transform, true)
            }
        }
    }

    /// Widen one figure and collect the outline into a fresh shape.
    pub fn outline<F: FigureSource>(
        &self,
        figure: &F,
        pen: &PenGeometry,
        transform: Option<&Transform>,
    ) -> Result<Shape, WidenError> {
        let mut shape = Shape::new();
        {
            let mut sink = ContourAssembler::new(&mut shape);
            self.widen(figure, pen, transform, &mut sink)?;
        }
        Ok(shape)
    }

    /// Whether `point` is inside the stroked appearance of the figure.
    pub fn hit_test<F: FigureSource>(
        &self,
        point: Point,
        figure: &F,
        pen: &PenGeometry,
        transform: Option<&Transform>,
    ) -> Result<bool, WidenError> {
        let mut sink = HitTestSink::new(point, self.tolerance);
        self.widen(figure, pen, transform, &mut sink)?;
        Ok(sink.was_hit())
    }

    fn widen_figure<F: FigureSource, T: RailTarget>(
        &self,
        figure: &F,
        target: &mut T,
        pen: &PenGeometry,
        transform: Option<&Transform>,
        dashed: bool,
    ) -> WidenResult {
        if figure.is_empty() {
            return Ok(());
        }

        let closed_seam = figure.is_closed() && !figure.has_gaps() && !dashed;

        // Caps for runs delimited by the figure's open ends. Closed figures
        // traversed with the open algorithm get dash caps, except that a
        // stroked seam abuts with matching flat caps that fuse.
        let (mut next_cap, final_cap) = if closed_seam {
            (pen.start_cap, pen.end_cap)
        } else if figure.is_closed() {
            if !dashed && seam_abuts(figure) {
                (LineCap::Flat, LineCap::Flat)
            } else {
                (pen.dash_cap, pen.dash_cap)
            }
        } else {
            (pen.start_cap, pen.end_cap)
        };

        let start = apply_point(transform, figure.start_point())?;
        let mut cur = start;
        let mut pen_down = false;
        let mut started = false;
        let mut saw_stroked = false;
        let mut pending_skipped = false;
        // Seam bookkeeping for closed figures without gaps.
        let mut first_dir: Option<Vector> = None;
        let mut seam_smooth = false;

        for view in figure.segments() {
            if target.aborted() {
                return Ok(());
            }

            if view.is_gap {
                if pen_down {
                    target.end_run(pen.dash_cap)?;
                    pen_down = false;
                }
                cur = apply_point(transform, view.segment.to())?;
                next_cap = pen.dash_cap;
                continue;
            }
            saw_stroked = true;

            let adapter = match view.segment {
                FigureSegment::Line { to } => {
                    SegmentAdapter::set_line(0.0, 1.0, &mut cur, to, transform)?
                }
                FigureSegment::Cubic { ctrl1, ctrl2, to } => SegmentAdapter::set_cubic(
                    0.0,
                    1.0,
                    &mut cur,
                    ctrl1,
                    ctrl2,
                    to,
                    transform,
                    self.tolerance,
                )?,
            };

            let dir = match adapter.first_tangent() {
                Ok(dir) => dir,
                Err(WidenError::ZeroVector) => {
                    // Degenerate segment: merge the corners on both sides.
                    trace!("skipping degenerate segment");
                    pending_skipped = true;
                    cur = adapter.end_point();
                    continue;
                }
                Err(e) => return Err(e),
            };

            if pen_down {
                let smooth = view.is_smooth_join && !pending_skipped;
                target.corner(dir, smooth, pending_skipped, false)?;
            } else if closed_seam && !started {
                first_dir = Some(dir);
                seam_smooth = view.is_smooth_join;
                target.start_run(cur, dir, None)?;
                pen_down = true;
            } else {
                target.start_run(cur, dir, Some(next_cap))?;
                next_cap = pen.dash_cap;
                pen_down = true;
            }
            started = true;
            pending_skipped = false;

            let (end, _end_tangent) = adapter.widen(&mut |p, tangent, is_line, last| {
                if target.aborted() {
                    return Ok(());
                }
                if is_line {
                    target.line_step(p, tangent)
                } else {
                    target.curve_step(p, tangent, last)
                }
            })?;
            cur = end;
        }

        if target.aborted() {
            return Ok(());
        }

        if !started {
            // The figure had no non-degenerate stroked segment; widening
            // never began. A stroked point is still visible through its
            // caps.
            if saw_stroked {
                return capped_point(target, start, pen);
            }
            return Ok(());
        }

        if closed_seam {
            if pen_down {
                if (cur - start).square_length() > FUZZ * FUZZ {
                    // The implicit closing edge.
                    let dir = start - cur;
                    target.corner(dir, false, pending_skipped, false)?;
                    pending_skipped = false;
                    target.line_step(start, dir)?;
                }
                if let Some(first_dir) = first_dir {
                    target.corner(first_dir, seam_smooth, pending_skipped, true)?;
                }
                target.close_run()?;
            }
            return Ok(());
        }

        if figure.is_closed() && (cur - start).square_length() > FUZZ * FUZZ {
            // Closed figures traversed with the open algorithm still stroke
            // the implicit closing edge.
            let dir = start - cur;
            if pen_down {
                target.corner(dir, false, pending_skipped, false)?;
            } else {
                target.start_run(cur, dir, Some(next_cap))?;
                pen_down = true;
            }
            target.line_step(start, dir)?;
        }

        if pen_down {
            target.end_run(final_cap)?;
        }

        Ok(())
    }
}

/// The per-figure emission interface the widener drives; implemented
/// directly by the rail pen and, when a dash pattern is active, by the
/// dasher sitting in front of it.
pub(crate) trait RailTarget {
    fn start_run(&mut self, at: Point, dir: Vector, cap: Option<LineCap>) -> WidenResult;
    fn line_step(&mut self, to: Point, dir: Vector) -> WidenResult;
    fn curve_step(&mut self, to: Point, dir: Vector, last: bool) -> WidenResult;
    fn corner(&mut self, new_dir: Vector, smooth: bool, skipped: bool, closing: bool)
        -> WidenResult;
    fn end_run(&mut self, cap: LineCap) -> WidenResult;
    fn close_run(&mut self) -> WidenResult;
    fn aborted(&self) -> bool;
}

impl<'a, 'b> RailTarget for RailPen<'a, 'b> {
    fn start_run(&mut self, at: Point, dir: Vector, cap: Option<LineCap>) -> WidenResult {
        RailPen::start_run(self, at, dir, cap)
    }

    fn line_step(&mut self, to: Point, _dir: Vector) -> WidenResult {
        RailPen::line_step(self, to)
    }

    fn curve_step(&mut self, to: Point, dir: Vector, _last: bool) -> WidenResult {
        RailPen::curve_step(self, to, dir)
    }

    fn corner(
        &mut self,
        new_dir: Vector,
        smooth: bool,
        skipped: bool,
        closing: bool,
    ) -> WidenResult {
        RailPen::corner(self, new_dir, smooth, skipped, closing)
    }

    fn end_run(&mut self, cap: LineCap) -> WidenResult {
        RailPen::end_run(self, cap)
    }

    fn close_run(&mut self) -> WidenResult {
        RailPen::close_run(self)
    }

    fn aborted(&self) -> bool {
        RailPen::aborted(self)
    }
}

fn apply_point(transform: Option<&Transform>, p: Point) -> Result<Point, WidenError> {
    let p = match transform {
        Some(t) => t.transform_point(p),
        None => p,
    };
    if p.x.is_finite() && p.y.is_finite() {
        Ok(p)
    } else {
        Err(WidenError::BadNumber)
    }
}

// A closed figure with gaps abuts when the two runs meeting at the seam are
// both stroked; they fuse with matching flat caps instead of independent
// dash caps.
fn seam_abuts<F: FigureSource>(figure: &F) -> bool {
    let mut segments = figure.segments();
    let first = match segments.next() {
        Some(first) => first,
        None => return false,
    };
    if first.is_gap {
        return false;
    }
    let mut last = first;
    for view in segments {
        last = view;
    }
    // The implicit closing edge is stroked, so only an exactly-closing gap
    // segment breaks the abutment.
    let closing_edge = last.segment.to() != figure.start_point();
    closing_edge || !last.is_gap
}

fn capped_point<T: RailTarget>(target: &mut T, at: Point, pen: &PenGeometry) -> WidenResult {
    if pen.start_cap == LineCap::Flat && pen.end_cap == LineCap::Flat {
        return Ok(());
    }
    let dir = Vector::new(1.0, 0.0);
    target.start_run(at, dir, Some(pen.start_cap))?;
    target.end_run(pen.end_cap)
}
