//! Per-segment widening primitives.
//!
//! A segment adapter takes a (possibly parameter-trimmed) line or cubic
//! segment, applies the render transform, and produces the flattened steps
//! the rail pen consumes, along with the segment's first and last tangents.
//! A segment whose direction is indistinguishable from zero reports
//! [`WidenError::ZeroVector`] from [`first_tangent`](SegmentAdapter::first_tangent);
//! the widener recovers by merging the corners on both sides of it.

use crate::geom::CubicBezierSegment;
use crate::math::{Point, Transform, Vector};
use crate::{WidenError, WidenResult, FUZZ};

pub(crate) enum SegmentAdapter {
    Line(LineAdapter),
    Cubic(CubicAdapter),
}

pub(crate) struct LineAdapter {
    to: Point,
    dir: Vector,
}

pub(crate) struct CubicAdapter {
    curve: CubicBezierSegment,
    tolerance: f32,
}

fn apply(transform: Option<&Transform>, p: Point) -> Result<Point, WidenError> {
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

impl SegmentAdapter {
    /// A line from `*first` to `to`, restricted to the parameter range
    /// `[start_t, end_t]`. `*first` is updated to the trimmed start point.
    pub fn set_line(
        start_t: f32,
        end_t: f32,
        first: &mut Point,
        to: Point,
        transform: Option<&Transform>,
    ) -> Result<Self, WidenError> {
        let to = apply(transform, to)?;
        let from = *first;
        let start = from.lerp(to, start_t);
        let end = from.lerp(to, end_t);
        *first = start;
        Ok(SegmentAdapter::Line(LineAdapter {
            to: end,
            dir: end - start,
        }))
    }

    /// A cubic from `*first` through the three control points, restricted
    /// to `[start_t, end_t]`. Trimming composes two one-sided splits, with
    /// the second split parameter rescaled into the once-trimmed domain.
    pub fn set_cubic(
        start_t: f32,
        end_t: f32,
        first: &mut Point,
        ctrl1: Point,
        ctrl2: Point,
        to: Point,
        transform: Option<&Transform>,
        tolerance: f32,
    ) -> Result<Self, WidenError> {
        let mut curve = CubicBezierSegment {
            from: *first,
            ctrl1: apply(transform, ctrl1)?,
            ctrl2: apply(transform, ctrl2)?,
            to: apply(transform, to)?,
        };

        if start_t > 0.0 {
            curve = curve.after_split(start_t);
            if end_t < 1.0 {
                curve = curve.before_split((end_t - start_t) / (1.0 - start_t));
            }
        } else if end_t < 1.0 {
            curve = curve.before_split(end_t);
        }

        *first = curve.from;
        Ok(SegmentAdapter::Cubic(CubicAdapter { curve, tolerance }))
    }

    /// The direction the segment leaves its start point in, or
    /// `ZeroVector` when the segment is degenerate and must be skipped.
    pub fn first_tangent(&self) -> Result<Vector, WidenError> {
        let tangent = match self {
            SegmentAdapter::Line(line) => Some(line.dir),
            SegmentAdapter::Cubic(cubic) => cubic.curve.start_tangent(),
        };
        match tangent {
            Some(t) if t.square_length() > FUZZ * FUZZ => Ok(t),
            _ => Err(WidenError::ZeroVector),
        }
    }

    pub fn end_point(&self) -> Point {
        match self {
            SegmentAdapter::Line(line) => line.to,
            SegmentAdapter::Cubic(cubic) => cubic.curve.to,
        }
    }

    /// Drive the widening of this segment: the callback receives each
    /// flattened step as `(point, tangent, is_line, is_last)`, and the far
    /// endpoint and tangent are returned.
    pub fn widen<F>(&self, step: &mut F) -> Result<(Point, Vector), WidenError>
    where
        F: FnMut(Point, Vector, bool, bool) -> WidenResult,
    {
        match self {
            SegmentAdapter::Line(line) => {
                step(line.to, line.dir, true, true)?;
                Ok((line.to, line.dir))
            }
            SegmentAdapter::Cubic(cubic) => {
                let mut result = Ok(());
                // One step of lookahead so the last flattened point can be
                // flagged.
                let mut pending: Option<(Point, Vector)> = None;
                cubic
                    .curve
                    .for_each_flattened_with_tangent(cubic.tolerance, &mut |p, tangent| {
                        if result.is_err() {
                            return;
                        }
                        if let Some((pp, pt)) = pending.take() {
                            result = step(pp, pt, false, false);
                        }
                        pending = Some((p, tangent));
                    });
                result?;
                let (last_pt, last_tan) = match pending {
                    Some(p) => p,
                    None => return Err(WidenError::ZeroVector),
                };
                step(last_pt, last_tan, false, true)?;
                Ok((last_pt, last_tan))
            }
        }
    }
}
