//! Dashing: buffers one edge (a run of steps between corners) at a time and
//! starts or stops the pen at dash boundaries.
//!
//! Dash distances are measured in pre-transform space through a quadratic
//! form derived from the inverse render transform, so dash spacing follows
//! the path even under anisotropic transforms. The dash cursor advances
//! monotonically along a figure: it is re-seeded from the pattern phase at
//! each run start and deliberately *not* reset at corners, so dashes flow
//! around joins instead of breaking at them.

use crate::math::{Point, Transform, Vector};
use crate::pen::RailPen;
use crate::widen::RailTarget;
use crate::{LineCap, WidenError, WidenResult};

use alloc::vec::Vec;

/// Dash/segment boundaries closer than this (in pre-transform units) are
/// resolved as a single event, and dash arrays shorter than this in total
/// are rescaled up to it so the walk always makes forward progress.
pub(crate) const MIN_DASH_ARRAY_LENGTH: f32 = 1e-6;

/// A validated, normalized dash sequence: an even number of nonnegative
/// lengths alternating dash/gap, plus a phase wrapped into `[0, total)`.
#[derive(Clone, Debug, PartialEq)]
pub struct DashPattern {
    lengths: Vec<f32>,
    phase: f32,
    total: f32,
}

impl DashPattern {
    pub fn new(array: &[f32], offset: f32) -> Result<Self, WidenError> {
        if array.len() < 2 {
            return Err(WidenError::bad_dash("fewer than two entries"));
        }
        if array.len() % 2 != 0 {
            return Err(WidenError::bad_dash("odd number of entries"));
        }

        let mut total = 0.0f32;
        for &len in array {
            if !(len >= 0.0) {
                return Err(WidenError::bad_dash("negative or NaN entry"));
            }
            total += len;
        }
        if !total.is_finite() {
            return Err(WidenError::bad_dash("non-finite total length"));
        }
        if total <= 0.0 {
            return Err(WidenError::bad_dash("zero total length"));
        }
        if !offset.is_finite() {
            return Err(WidenError::bad_dash("non-finite offset"));
        }

        let mut lengths: Vec<f32> = array.into();
        if total < MIN_DASH_ARRAY_LENGTH {
            // Numerically negligible period: scale the sequence up so the
            // dash walk cannot stall.
            let scale = MIN_DASH_ARRAY_LENGTH / total;
            for len in &mut lengths {
                *len *= scale;
            }
            total = MIN_DASH_ARRAY_LENGTH;
        }

        let mut phase = offset % total;
        if phase < 0.0 {
            phase += total;
        }

        Ok(DashPattern {
            lengths,
            phase,
            total,
        })
    }

    pub fn total_length(&self) -> f32 {
        self.total
    }

    /// A cursor positioned `phase` into the sequence.
    fn seed(&self) -> DashCursor {
        let mut pos = self.phase;
        let mut index = 0;
        while pos >= self.lengths[index] {
            pos -= self.lengths[index];
            index = (index + 1) % self.lengths.len();
        }
        DashCursor {
            index,
            remaining: self.lengths[index] - pos,
            is_on: index % 2 == 0,
        }
    }
}

#[derive(Copy, Clone, Debug)]
struct DashCursor {
    index: usize,
    // Pre-transform distance to the next dash event.
    remaining: f32,
    is_on: bool,
}

// |T⁻¹·v|² as a quadratic form in v, so lengths are measured in the space
// the dash array was specified in.
#[derive(Copy, Clone, Debug)]
struct LengthQuad {
    cxx: f32,
    cxy: f32,
    cyy: f32,
}

impl LengthQuad {
    const IDENTITY: Self = LengthQuad {
        cxx: 1.0,
        cxy: 0.0,
        cyy: 1.0,
    };

    fn from_transform(transform: &Transform) -> Result<Self, WidenError> {
        let inv = transform.inverse().ok_or(WidenError::BadNumber)?;
        let quad = LengthQuad {
            cxx: inv.m11 * inv.m11 + inv.m12 * inv.m12,
            cxy: 2.0 * (inv.m11 * inv.m21 + inv.m12 * inv.m22),
            cyy: inv.m21 * inv.m21 + inv.m22 * inv.m22,
        };
        if quad.cxx.is_finite() && quad.cxy.is_finite() && quad.cyy.is_finite() {
            Ok(quad)
        } else {
            Err(WidenError::BadNumber)
        }
    }

    fn length(&self, v: Vector) -> f32 {
        (self.cxx * v.x * v.x + self.cxy * v.x * v.y + self.cyy * v.y * v.y)
            .max(0.0)
            .sqrt()
    }
}

// One flattened step buffered for the current edge.
#[derive(Copy, Clone, Debug)]
struct EdgeRecord {
    to: Point,
    // Curve tangent at the record's end, for offset computation.
    tangent: Vector,
    // Unit chord direction, for interpolating dash boundaries.
    direction: Vector,
    // Cumulative pre-transform length at the record's end.
    cum: f32,
    // World chord length per unit of pre-transform length.
    scale: f32,
    is_line: bool,
    last_on_curve: bool,
}

/// Sits between the stroke widener and the rail pen when a dash pattern is
/// active: buffers one edge of steps, then walks the dash sequence over it.
pub(crate) struct Dasher<'a, 'b, 'p> {
    pen: RailPen<'a, 'b>,
    pattern: &'p DashPattern,
    dash_cap: LineCap,
    length_quad: LengthQuad,

    records: Vec<EdgeRecord>,
    edge_start: Point,
    edge_total: f32,
    cur_dir: Vector,
    cursor: DashCursor,
    pen_down: bool,
    // Cap for the next dash start; the run's own cap for a dash beginning
    // exactly at the run start, the dash cap afterwards.
    pending_cap: LineCap,
}

impl<'a, 'b, 'p> Dasher<'a, 'b, 'p> {
    pub fn new(
        pen: RailPen<'a, 'b>,
        pattern: &'p DashPattern,
        dash_cap: LineCap,
        transform: Option<&Transform>,
    ) -> Result<Self, WidenError> {
        let length_quad = match transform {
            Some(t) => LengthQuad::from_transform(t)?,
            None => LengthQuad::IDENTITY,
        };
        Ok(Dasher {
            pen,
            pattern,
            dash_cap,
            length_quad,
            records: Vec::new(),
            edge_start: Point::zero(),
            edge_total: 0.0,
            cur_dir: Vector::new(1.0, 0.0),
            cursor: pattern.seed(),
            pen_down: false,
            pending_cap: dash_cap,
        })
    }

    fn push_record(&mut self, to: Point, tangent: Vector, is_line: bool, last: bool) {
        let from = self
            .records
            .last()
            .map(|r| r.to)
            .unwrap_or(self.edge_start);
        let chord = to - from;
        let world_len = chord.length();
        if world_len <= 0.0 {
            return;
        }
        let pre_len = self.length_quad.length(chord).max(MIN_DASH_ARRAY_LENGTH);
        self.edge_total += pre_len;
        self.records.push(EdgeRecord {
            to,
            tangent,
            direction: chord / world_len,
            cum: self.edge_total,
            scale: world_len / pre_len,
            is_line,
            last_on_curve: last,
        });
        self.cur_dir = tangent;
    }

    fn advance_entry(&mut self) {
        self.cursor.index = (self.cursor.index + 1) % self.pattern.lengths.len();
        self.cursor.remaining = self.pattern.lengths[self.cursor.index];
        self.cursor.is_on = self.cursor.index % 2 == 0;
    }

    // Bring the pen state in line with the dash cursor at the given point.
    fn sync_pen(&mut self, at: Point, dir: Vector) -> WidenResult {
        if self.cursor.is_on && !self.pen_down {
            let cap = core::mem::replace(&mut self.pending_cap, self.dash_cap);
            RailPen::start_run(&mut self.pen, at, dir, Some(cap))?;
            self.pen_down = true;
        } else if !self.cursor.is_on && self.pen_down {
            RailPen::end_run(&mut self.pen, self.dash_cap)?;
            self.pen_down = false;
        }
        Ok(())
    }

    fn extend(&mut self, rec: &EdgeRecord, to: Point) -> WidenResult {
        if rec.is_line {
            RailPen::line_step(&mut self.pen, to)
        } else {
            RailPen::curve_step(&mut self.pen, to, rec.tangent)
        }
    }

    /// Walk the dash sequence over the buffered edge, starting and stopping
    /// the pen at dash boundaries.
    fn flush(&mut self) -> WidenResult {
        let dir0 = self
            .records
            .first()
            .map(|r| r.tangent)
            .unwrap_or(self.cur_dir);
        let at0 = self.edge_start;
        // The pen state can disagree with the pattern at position 0 when
        // the previous edge ended exactly on a boundary.
        self.sync_pen(at0, dir0)?;

        let records = core::mem::take(&mut self.records);
        let mut from = self.edge_start;
        let mut prev_cum = 0.0;

        'records: for rec in &records {
            let mut pos = prev_cum;
            loop {
                if self.pen.aborted() {
                    break 'records;
                }
                let to_boundary = self.cursor.remaining;
                let to_rec_end = rec.cum - pos;

                if to_boundary >= to_rec_end - MIN_DASH_ARRAY_LENGTH {
                    // The segment ends first, or the boundaries coincide.
                    if self.pen_down {
                        self.extend(rec, rec.to)?;
                    }
                    self.cursor.remaining -= to_rec_end;
                    if self.cursor.remaining.abs() <= MIN_DASH_ARRAY_LENGTH {
                        // Coincident boundaries: resolve as one event. At
                        // true segment endpoints the curve tangent applies;
                        // interior flattened vertices use the chord.
                        let dir = if rec.is_line || rec.last_on_curve {
                            rec.tangent
                        } else {
                            rec.direction
                        };
                        self.advance_entry();
                        self.sync_pen(rec.to, dir)?;
                    }
                    break;
                }

                // The dash or gap ends inside the segment; the segment
                // cursor stays put. Caps at interpolated points take the
                // chord direction.
                let p = from + rec.direction * ((pos + to_boundary - prev_cum) * rec.scale);
                if self.pen_down {
                    self.extend(rec, p)?;
                }
                pos += to_boundary;
                self.advance_entry();
                let dir = if rec.is_line { rec.tangent } else { rec.direction };
                self.sync_pen(p, dir)?;
            }
            prev_cum = rec.cum;
            from = rec.to;
        }

        let end = records.last().map(|r| r.to).unwrap_or(self.edge_start);
        self.records = records;
        self.records.clear();
        self.edge_start = end;
        self.edge_total = 0.0;
        Ok(())
    }
}

impl<'a, 'b, 'p> RailTarget for Dasher<'a, 'b, 'p> {
    fn start_run(&mut self, at: Point, dir: Vector, cap: Option<LineCap>) -> WidenResult {
        self.records.clear();
        self.edge_start = at;
        self.edge_total = 0.0;
        self.cur_dir = dir;
        self.cursor = self.pattern.seed();
        self.pen_down = false;
        // The run's cap only applies when a dash actually begins at the run
        // start; a run starting inside a gap uses dash caps throughout.
        self.pending_cap = match cap {
            Some(cap) if self.cursor.is_on => cap,
            _ => self.dash_cap,
        };
        Ok(())
    }

    fn line_step(&mut self, to: Point, dir: Vector) -> WidenResult {
        self.push_record(to, dir, true, true);
        Ok(())
    }

    fn curve_step(&mut self, to: Point, dir: Vector, last: bool) -> WidenResult {
        self.push_record(to, dir, false, last);
        Ok(())
    }

    fn corner(&mut self, new_dir: Vector, smooth: bool, skipped: bool, closing: bool) -> WidenResult {
        trace!("dash edge flushed at corner");
        self.flush()?;
        // An open dash turns the corner through the join machinery; a gap
        // in progress resumes on the other side.
        if self.pen_down && !self.pen.aborted() {
            RailPen::corner(&mut self.pen, new_dir, smooth, skipped, closing)?;
        }
        self.cur_dir = new_dir;
        Ok(())
    }

    fn end_run(&mut self, cap: LineCap) -> WidenResult {
        self.flush()?;
        if self.pen_down {
            if !self.pen.aborted() {
                RailPen::end_run(&mut self.pen, cap)?;
            }
            self.pen_down = false;
        }
        Ok(())
    }

    fn close_run(&mut self) -> WidenResult {
        self.end_run(self.dash_cap)
    }

    fn aborted(&self) -> bool {
        self.pen.aborted()
    }
}
