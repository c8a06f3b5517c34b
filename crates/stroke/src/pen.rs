//! The resolved pen and the geometry it stamps out: offset points, joins,
//! caps and curvature-refinement arcs.
//!
//! All join and cap math happens in pen space, where the pen is a circle of
//! radius `r`; the pen matrix maps pen space to world space and is the
//! identity for circular pens. Radius vectors are pen-space vectors of
//! length `r` whose world image is tangent-perpendicular to the path, so an
//! offset point is always `center + matrix · radius_vector`.

use crate::geom::{perp, Matrix2x2};
use crate::math::{Box2D, Point, Transform, Vector};
use crate::path::{LineCap, LineJoin, Side};
use crate::sink::{CapEnd, WideningSink};
use crate::{PenGeometry, WidenError, WidenResult, FUZZ};

/// Pens whose world-space footprint falls below `tolerance * EMPTY_PEN_FACTOR`
/// are degenerate and widen to nothing.
const EMPTY_PEN_FACTOR: f32 = 1e-3;

/// An immutable pen resolved for one widening call: the pen geometry with
/// the render transform folded in and every derived quantity precomputed.
#[derive(Clone, Debug)]
pub struct PenModel {
    // Pen space (circle of radius `radius`) to world space. Identity for
    // circular pens.
    matrix: Matrix2x2,
    inverse: Matrix2x2,
    radius: f32,
    radius_sq: f32,
    circular: bool,
    nominal_miter_limit: f32,
    // nominal_miter_limit * radius, a pen-space length.
    miter_limit: f32,
    miter_limit_sq: f32,
    // Dot-product cutoff on consecutive radius vectors below which a
    // flattened curve needs an inserted rounding arc. Values below -1 mean
    // "never refine".
    refinement_threshold: f32,
    // Conservative world-space bound on the pen footprint, used to inflate
    // boxes tested against the viewable region.
    world_radius: f32,
}

impl PenModel {
    /// Resolve a pen for one widening call.
    ///
    /// Returns `Ok(None)` when the pen is degenerate (zero-sized, or
    /// collapsed below the tolerance by the transform): the caller skips
    /// widening entirely and emits no geometry.
    pub fn resolve(
        geometry: &PenGeometry,
        transform: Option<&Transform>,
        tolerance: f32,
    ) -> Result<Option<PenModel>, WidenError> {
        let hw = geometry.half_width.abs();
        let hh = geometry.half_height.abs();
        if !hw.is_finite() || !hh.is_finite() || !geometry.angle.is_finite() {
            return Err(WidenError::BadNumber);
        }
        if !geometry.miter_limit.is_finite() {
            return Err(WidenError::BadNumber);
        }

        // The pen ellipse is the image of the unit circle: scale first,
        // then rotate, then fold in the render transform (ignoring its
        // translation).
        let mut matrix = Matrix2x2::scale(hw, hh);
        if geometry.angle != 0.0 {
            matrix = matrix.then(&Matrix2x2::rotation(geometry.angle));
        }
        if let Some(t) = transform {
            matrix = matrix.then(&Matrix2x2::from_linear(t));
        }
        if !matrix.is_finite() {
            return Err(WidenError::BadNumber);
        }

        let empty_bound = tolerance * EMPTY_PEN_FACTOR;
        let scale_bound_sq = 2.0 * matrix.col0().square_length().max(matrix.col1().square_length());
        if scale_bound_sq < empty_bound * empty_bound {
            return Ok(None);
        }

        // Circularity by exact equality of the matched entries after
        // folding: a scaled rotation maps the unit circle to a circle.
        let circular = matrix.m11 == matrix.m22 && matrix.m12 == -matrix.m21;

        let radius = matrix.col0().length().max(matrix.col1().length());
        let (matrix, inverse) = if circular {
            (Matrix2x2::IDENTITY, Matrix2x2::IDENTITY)
        } else {
            let mut m = matrix;
            if m.determinant() < 0.0 {
                // De-flip so pen space keeps the world's orientation; the
                // ellipse itself is symmetric under the sign change.
                m.m12 = -m.m12;
                m.m22 = -m.m22;
            }
            if m.determinant() < empty_bound * empty_bound {
                return Ok(None);
            }
            // Normalize so pen space is a circle of radius `radius`.
            let hat = Matrix2x2::new(
                m.m11 / radius,
                m.m12 / radius,
                m.m21 / radius,
                m.m22 / radius,
            );
            let inverse = match hat.inverse() {
                Some(inv) => inv,
                None => return Ok(None),
            };
            (hat, inverse)
        };

        let nominal = geometry.miter_limit.max(PenGeometry::MINIMUM_MITER_LIMIT);
        let miter_limit = nominal * radius;

        let refinement_threshold = if radius <= tolerance {
            -2.0
        } else {
            let c = 1.0 - tolerance / radius;
            2.0 * c * c - 1.0
        };

        Ok(Some(PenModel {
            matrix,
            inverse,
            radius,
            radius_sq: radius * radius,
            circular,
            nominal_miter_limit: nominal,
            miter_limit,
            miter_limit_sq: miter_limit * miter_limit,
            refinement_threshold,
            world_radius: radius * core::f32::consts::SQRT_2,
        }))
    }

    pub fn is_circular(&self) -> bool {
        self.circular
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub(crate) fn refinement_threshold(&self) -> f32 {
        self.refinement_threshold
    }

    pub(crate) fn world_radius(&self) -> f32 {
        self.world_radius
    }

    #[inline]
    fn to_pen_dir(&self, world_dir: Vector) -> Vector {
        if self.circular {
            world_dir
        } else {
            self.inverse.transform_vector(world_dir)
        }
    }

    #[inline]
    pub(crate) fn world_offset(&self, pen_vec: Vector) -> Vector {
        if self.circular {
            pen_vec
        } else {
            self.matrix.transform_vector(pen_vec)
        }
    }

    /// The pen-space radius vector for a world direction: length `radius`,
    /// world image perpendicular-left of the direction.
    pub(crate) fn radius_vector(&self, world_dir: Vector) -> Result<Vector, WidenError> {
        let v = self.to_pen_dir(world_dir);
        let len_sq = v.square_length();
        if len_sq <= FUZZ * FUZZ {
            return Err(WidenError::ZeroVector);
        }
        Ok(perp(v) * (self.radius / len_sq.sqrt()))
    }

    /// The pen-space vector aligned with a world direction, length `radius`.
    /// Its world image is the pen's extent along the direction of travel
    /// (square cap extensions, triangle apexes, round cap tips).
    pub(crate) fn pen_tangent(&self, world_dir: Vector) -> Result<Vector, WidenError> {
        let v = self.to_pen_dir(world_dir);
        let len_sq = v.square_length();
        if len_sq <= FUZZ * FUZZ {
            return Err(WidenError::ZeroVector);
        }
        Ok(v * (self.radius / len_sq.sqrt()))
    }

    /// Control point offsets for one circular arc from radius vector `a` to
    /// `b` (`a · b >= 0`), via the division-avoiding half-angle identity.
    /// `None` means the turn is too small to need an arc at all.
    fn arc_ctrl_points(&self, a: Vector, b: Vector) -> Option<(Vector, Vector)> {
        let dot = a.dot(b);
        let half_sq = (self.radius_sq + dot) * 0.5; // (r·cos(φ/2))²
        let sin_sq = self.radius_sq - half_sq; // (r·sin(φ/2))²
        if sin_sq <= self.radius_sq * FUZZ {
            return None;
        }
        let dist = (4.0 / 3.0) * (self.radius - half_sq.max(0.0).sqrt()) / sin_sq.sqrt();
        let s = if a.cross(b) >= 0.0 { 1.0 } else { -1.0 };
        Some((a + perp(a) * (s * dist), b - perp(b) * (s * dist)))
    }
}

/// The mutable per-figure traversal state: where the pen is, which way it
/// points, and the radius vector in use.
#[derive(Copy, Clone, Debug)]
pub(crate) struct PenCursor {
    pub center: Point,
    pub dir: Vector,
    // Pen-space radius vector for `dir`, length = pen radius.
    pub radvec: Vector,
    // World image of `radvec`: left rail = center + offset.
    pub offset: Vector,
}

/// Drives one pen along one figure, emitting rail geometry to the sink.
///
/// Owned by a single widening invocation; the pen model itself stays
/// immutable and shareable between the corner, cap and dash code paths.
pub(crate) struct RailPen<'a, 'b> {
    pen: &'a PenModel,
    join: LineJoin,
    sink: &'b mut dyn WideningSink,
    viewport: Option<Box2D>,
    cursor: PenCursor,
}

enum OuterJoin {
    Smooth,
    Bevel,
    Miter(Vector),
    Clip(Vector, Vector),
    Round,
}

enum MiterOutcome {
    Smooth,
    Bevel,
    Exceeded,
    Point(Vector),
}

impl<'a, 'b> RailPen<'a, 'b> {
    pub fn new(
        pen: &'a PenModel,
        join: LineJoin,
        viewport: Option<Box2D>,
        sink: &'b mut dyn WideningSink,
    ) -> Self {
        RailPen {
            pen,
            join,
            sink,
            viewport,
            cursor: PenCursor {
                center: Point::zero(),
                dir: Vector::new(1.0, 0.0),
                radvec: Vector::zero(),
                offset: Vector::zero(),
            },
        }
    }

    pub fn aborted(&self) -> bool {
        self.sink.aborted()
    }

    /// Put the pen down at `at`, seed both rails and emit the start cap.
    /// `cap` is `None` for the seam of a closed figure, which gets a corner
    /// instead of caps.
    pub fn start_run(&mut self, at: Point, dir: Vector, cap: Option<LineCap>) -> WidenResult {
        let u = self.pen.radius_vector(dir)?;
        let o = self.pen.world_offset(u);

        if cap == Some(LineCap::Square) {
            let e = self.pen.world_offset(self.pen.pen_tangent(dir)?);
            self.sink.start_with(at - e + o, at - e - o);
            self.sink.quad_to(at + o, at - o);
        } else {
            self.sink.start_with(at + o, at - o);
        }

        match cap {
            Some(LineCap::Round) => {
                let w = self.pen.pen_tangent(dir)?;
                self.round_cap(CapEnd::Start, at, -u, -w)?;
            }
            Some(LineCap::Triangle) => {
                let w = self.pen.pen_tangent(dir)?;
                let apex = at - self.pen.world_offset(w);
                self.sink.cap_triangle(CapEnd::Start, apex, at + o);
            }
            Some(LineCap::Flat) => {
                self.sink.cap_flat(CapEnd::Start, at + o);
            }
            Some(LineCap::Square) | None => {}
        }

        self.cursor = PenCursor {
            center: at,
            dir,
            radvec: u,
            offset: o,
        };

        Ok(())
    }

    /// Advance both rails straight to `to`; the direction is unchanged.
    pub fn line_step(&mut self, to: Point) -> WidenResult {
        let o = self.cursor.offset;
        self.sink.quad_to(to + o, to - o);
        self.cursor.center = to;
        Ok(())
    }

    /// Advance both rails along one flattened curve step, splicing in a
    /// rounding arc where the turn is sharp enough to show faceting under a
    /// thick pen.
    pub fn curve_step(&mut self, to: Point, dir: Vector) -> WidenResult {
        let u = self.pen.radius_vector(dir)?;

        let turn = self.cursor.radvec.dot(u) / self.pen.radius_sq;
        if turn < self.pen.refinement_threshold() && self.refinement_visible(to) {
            self.corner_impl(dir, LineJoin::Round, false, false, false)?;
        }

        let o = self.pen.world_offset(u);
        self.sink
            .curved_quad_to(o, dir, to, self.cursor.center);

        self.cursor = PenCursor {
            center: to,
            dir,
            radvec: u,
            offset: o,
        };

        Ok(())
    }

    /// Process the corner between the current direction and `new_dir`.
    pub fn corner(
        &mut self,
        new_dir: Vector,
        smooth: bool,
        skipped: bool,
        closing: bool,
    ) -> WidenResult {
        self.corner_impl(new_dir, self.join, smooth, skipped, closing)
    }

    fn corner_impl(
        &mut self,
        new_dir: Vector,
        join: LineJoin,
        smooth: bool,
        skipped: bool,
        _closing: bool,
    ) -> WidenResult {
        let u1 = self.pen.radius_vector(new_dir)?;
        let o1 = self.pen.world_offset(u1);
        let c = self.cursor.center;
        let left1 = c + o1;
        let right1 = c - o1;

        if smooth {
            self.sink.set_current_points(left1, right1);
            return self.finish_corner(new_dir, u1, o1);
        }

        let v0 = self.pen.to_pen_dir(self.cursor.dir);
        let v1 = self.pen.to_pen_dir(new_dir);
        let det = v0.cross(v1);
        let dot = v0.dot(v1);

        if det.abs() <= dot.abs() * FUZZ {
            if dot > 0.0 {
                // No turn.
                self.sink.set_current_points(left1, right1);
            } else {
                // A 180° turn: both rails are pushed forward by the miter
                // extension and swapped.
                let nominal = if skipped {
                    1.0
                } else {
                    self.pen.nominal_miter_limit
                };
                let w = self.pen.pen_tangent(self.cursor.dir)?;
                let e = self.pen.world_offset(w) * nominal;
                let o0 = self.cursor.offset;
                self.sink.quad_to(c + o0 + e, c - o0 + e);
                self.sink.switch_sides();
                self.sink.quad_to(left1, right1);
            }
            return self.finish_corner(new_dir, u1, o1);
        }

        // det > 0 turns counter-clockwise, putting the left rail inside.
        let (outer, inner) = if det > 0.0 {
            (Side::Right, Side::Left)
        } else {
            (Side::Left, Side::Right)
        };
        let sigma = if outer == Side::Left { 1.0 } else { -1.0 };
        let a = self.cursor.radvec * sigma;
        let b = u1 * sigma;

        // A corner merged across a skipped degenerate segment is held to
        // miter limit 1 so it cannot spike.
        let (limit, limit_sq) = if skipped {
            (self.pen.radius, self.pen.radius_sq)
        } else {
            (self.pen.miter_limit, self.pen.miter_limit_sq)
        };

        let outer_join = match join {
            LineJoin::Round => OuterJoin::Round,
            LineJoin::Bevel => OuterJoin::Bevel,
            LineJoin::Miter | LineJoin::MiterClipped => match self.miter_point(a, b, limit_sq) {
                MiterOutcome::Smooth => OuterJoin::Smooth,
                MiterOutcome::Bevel => OuterJoin::Bevel,
                MiterOutcome::Point(m) => OuterJoin::Miter(m),
                MiterOutcome::Exceeded => {
                    if join == LineJoin::Miter {
                        let (c0, c1) = self.clip_points(a, b, limit);
                        OuterJoin::Clip(c0, c1)
                    } else {
                        OuterJoin::Bevel
                    }
                }
            },
        };

        if let OuterJoin::Smooth = outer_join {
            self.sink.set_current_points(left1, right1);
            return self.finish_corner(new_dir, u1, o1);
        }

        let inner_new = if inner == Side::Left { left1 } else { right1 };
        self.sink.inner_corner(inner, c, inner_new);

        let outer_new = if outer == Side::Left { left1 } else { right1 };
        match outer_join {
            OuterJoin::Bevel => {
                self.sink.polyline_wedge(outer, &[outer_new]);
            }
            OuterJoin::Miter(m) => {
                let miter_pt = c + self.pen.world_offset(m);
                self.sink.polyline_wedge(outer, &[miter_pt, outer_new]);
            }
            OuterJoin::Clip(c0, c1) => {
                let p0 = c + self.pen.world_offset(c0);
                let p1 = c + self.pen.world_offset(c1);
                self.sink.polyline_wedge(outer, &[p0, p1, outer_new]);
            }
            OuterJoin::Round => {
                self.round_wedge(outer, c, a, b, outer_new);
            }
            OuterJoin::Smooth => unreachable!(),
        }

        self.finish_corner(new_dir, u1, o1)
    }

    fn finish_corner(&mut self, new_dir: Vector, u1: Vector, o1: Vector) -> WidenResult {
        self.cursor.dir = new_dir;
        self.cursor.radvec = u1;
        self.cursor.offset = o1;
        Ok(())
    }

    /// The exact miter intersection of the two outer rail lines, solved
    /// with Cramer's rule in pen space; acceptance requires both ray
    /// parameters to point forward and the (squared, division-free) miter
    /// limit test to pass.
    fn miter_point(&self, a: Vector, b: Vector, limit_sq: f32) -> MiterOutcome {
        let s = if a.cross(b) >= 0.0 { 1.0 } else { -1.0 };
        let ta = perp(a) * (s / self.pen.radius);
        let tb = perp(b) * (s / self.pen.radius);
        let e = b - a;

        let den = ta.cross(tb);
        if den.abs() <= FUZZ {
            // Near-collinear rails. With a nonnegative dot product this is
            // treated as smooth; the next offset point simply takes over.
            return if a.dot(b) >= 0.0 {
                MiterOutcome::Smooth
            } else {
                MiterOutcome::Bevel
            };
        }

        let t_num = e.cross(tb);
        let u_num = ta.cross(e);
        if t_num * den < 0.0 || u_num * den < 0.0 {
            return MiterOutcome::Bevel;
        }

        let m_num = a * den + ta * t_num;
        if m_num.square_length() > limit_sq * den * den {
            return MiterOutcome::Exceeded;
        }

        MiterOutcome::Point(m_num / den)
    }

    /// Where the miter-limit line clips the two outer rails, from the
    /// closed-form half-angle expressions in the radius-vector dot product.
    fn clip_points(&self, a: Vector, b: Vector, limit: f32) -> (Vector, Vector) {
        let r = self.pen.radius;
        let s = if a.cross(b) >= 0.0 { 1.0 } else { -1.0 };
        let ta = perp(a) * (s / r);
        let tb = perp(b) * (s / r);

        let dot = a.dot(b);
        let cos_half = ((self.pen.radius_sq + dot) * 0.5).max(0.0).sqrt() / r;
        let sin_half = ((self.pen.radius_sq - dot) * 0.5).max(0.0).sqrt() / r;
        let q = (limit - r * cos_half) / sin_half;

        (a + ta * q, b - tb * q)
    }

    /// The outer side of a round join: one bézier arc when the radius
    /// vectors are within 90° of each other, two arcs meeting at the
    /// bisecting radius vector otherwise.
    fn round_wedge(&mut self, outer: Side, center: Point, a: Vector, b: Vector, outer_new: Point) {
        let dot = a.dot(b);
        if dot >= 0.0 {
            self.emit_arc(outer, center, a, b, outer_new);
            return;
        }

        // Bisect: the midpoint radius vector is the complex square root of
        // the product of the two unit radius vectors, flipped if it lands
        // on the wrong side.
        let inv_r = 1.0 / self.pen.radius;
        let ua = a * inv_r;
        let ub = b * inv_r;
        let prod = complex_mul(ua, ub);
        let mut mid = complex_sqrt(prod);
        if mid.dot(ua + ub) < 0.0 {
            mid = -mid;
        }
        let m = mid * self.pen.radius;
        let mid_pt = center + self.pen.world_offset(m);

        self.emit_arc(outer, center, a, m, mid_pt);
        self.emit_arc(outer, center, m, b, outer_new);
    }

    fn emit_arc(&mut self, side: Side, center: Point, a: Vector, b: Vector, end: Point) {
        match self.pen.arc_ctrl_points(a, b) {
            Some((c1, c2)) => {
                let c1 = center + self.pen.world_offset(c1);
                let c2 = center + self.pen.world_offset(c2);
                self.sink.curve_wedge(side, c1, c2, end);
            }
            None => {
                // Too small a turn to warrant an arc.
                self.sink.polyline_wedge(side, &[end]);
            }
        }
    }

    /// A round cap: two symmetric quarter arcs from radius vector `a`
    /// through the tip vector to `-a`.
    fn round_cap(&mut self, end: CapEnd, center: Point, a: Vector, tip: Vector) -> WidenResult {
        let (c1a, c2a) = self
            .pen
            .arc_ctrl_points(a, tip)
            .ok_or(WidenError::ZeroVector)?;
        let (c1b, c2b) = self
            .pen
            .arc_ctrl_points(tip, -a)
            .ok_or(WidenError::ZeroVector)?;
        let w = |v: Vector| center + self.pen.world_offset(v);
        self.sink.bezier_cap(
            end,
            w(c1a),
            w(c2a),
            w(tip),
            w(c1b),
            w(c2b),
            w(-a),
        );
        Ok(())
    }

    /// Emit the end cap for the current run and seal the sub-stroke.
    pub fn end_run(&mut self, cap: LineCap) -> WidenResult {
        let c = self.cursor.center;
        let o = self.cursor.offset;
        let d = self.cursor.dir;

        match cap {
            LineCap::Flat => {
                self.sink.cap_flat(CapEnd::End, c - o);
            }
            LineCap::Square => {
                let e = self.pen.world_offset(self.pen.pen_tangent(d)?);
                self.sink.quad_to(c + o + e, c - o + e);
                self.sink.cap_flat(CapEnd::End, c - o + e);
            }
            LineCap::Triangle => {
                let w = self.pen.pen_tangent(d)?;
                let apex = c + self.pen.world_offset(w);
                self.sink.cap_triangle(CapEnd::End, apex, c - o);
            }
            LineCap::Round => {
                let u = self.cursor.radvec;
                let w = self.pen.pen_tangent(d)?;
                self.round_cap(CapEnd::End, c, u, w)?;
            }
        }

        self.sink.add_figure();
        Ok(())
    }

    /// Seal a closed run whose seam was handled as a corner.
    pub fn close_run(&mut self) -> WidenResult {
        self.sink.add_figure();
        Ok(())
    }

    fn refinement_visible(&self, to: Point) -> bool {
        let vp = match &self.viewport {
            Some(vp) => vp,
            None => return true,
        };
        let a = self.cursor.center;
        let r = self.pen.world_radius();
        let step_box = Box2D {
            min: Point::new(a.x.min(to.x) - r, a.y.min(to.y) - r),
            max: Point::new(a.x.max(to.x) + r, a.y.max(to.y) + r),
        };
        vp.intersects(&step_box)
    }
}

#[inline]
fn complex_mul(a: Vector, b: Vector) -> Vector {
    Vector::new(a.x * b.x - a.y * b.y, a.x * b.y + a.y * b.x)
}

// Principal square root of a unit complex number.
#[inline]
fn complex_sqrt(z: Vector) -> Vector {
    let re = ((1.0 + z.x) * 0.5).max(0.0).sqrt();
    let im = ((1.0 - z.x) * 0.5).max(0.0).sqrt();
    Vector::new(re, if z.y >= 0.0 { im } else { -im })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::vector;
    use crate::PenGeometry;

    fn resolve(pen: &PenGeometry) -> PenModel {
        PenModel::resolve(pen, None, 0.01).unwrap().unwrap()
    }

    #[test]
    fn zero_pen_is_empty() {
        let pen = PenGeometry::elliptical(0.0, 0.0, 0.0);
        assert!(PenModel::resolve(&pen, None, 0.1).unwrap().is_none());
    }

    #[test]
    fn collapsing_transform_empties_the_pen() {
        let pen = PenGeometry::width(2.0);
        let squash = Transform::scale(1e-9, 1e-9);
        assert!(PenModel::resolve(&pen, Some(&squash), 0.1)
            .unwrap()
            .is_none());
    }

    #[test]
    fn non_finite_pen_is_rejected() {
        let mut pen = PenGeometry::width(2.0);
        pen.half_width = f32::NAN;
        assert!(matches!(
            PenModel::resolve(&pen, None, 0.1),
            Err(WidenError::BadNumber)
        ));
    }

    #[test]
    fn circular_pen_detected_after_folding() {
        let pen = PenGeometry::width(3.0);
        let model = resolve(&pen);
        assert!(model.is_circular());
        assert!((model.radius() - 1.5).abs() < 1e-6);

        // A uniform scale-and-rotate keeps the pen circular.
        let t = Transform::rotation(crate::geom::euclid::Angle::radians(0.7)).then_scale(2.0, 2.0);
        let model = PenModel::resolve(&pen, Some(&t), 0.01).unwrap().unwrap();
        assert!(model.is_circular());
        assert!((model.radius() - 3.0).abs() < 1e-4);

        // An anisotropic scale does not.
        let t = Transform::scale(2.0, 1.0);
        let model = PenModel::resolve(&pen, Some(&t), 0.01).unwrap().unwrap();
        assert!(!model.is_circular());
    }

    #[test]
    fn radius_vector_is_left_of_direction() {
        let pen = PenGeometry::width(2.0);
        let model = resolve(&pen);
        let u = model.radius_vector(vector(1.0, 0.0)).unwrap();
        let o = model.world_offset(u);
        assert!((o - vector(0.0, 1.0)).length() < 1e-6);

        let elliptical = PenGeometry::elliptical(4.0, 2.0, 0.0);
        let model = resolve(&elliptical);
        let u = model.radius_vector(vector(1.0, 0.0)).unwrap();
        let o = model.world_offset(u);
        // For an axis-aligned ellipse the offset for a horizontal direction
        // is the vertical semi-axis.
        assert!((o - vector(0.0, 1.0)).length() < 1e-5);
        assert!(o.cross(vector(1.0, 0.0)) < 0.0);
    }

    #[test]
    fn degenerate_direction_is_a_zero_vector_error() {
        let model = resolve(&PenGeometry::width(2.0));
        assert_eq!(
            model.radius_vector(vector(0.0, 0.0)),
            Err(WidenError::ZeroVector)
        );
    }

    #[test]
    fn arc_control_distance_matches_the_quarter_circle_constant() {
        let model = resolve(&PenGeometry::width(2.0));
        let a = vector(1.0, 0.0);
        let b = vector(0.0, 1.0);
        let (c1, c2) = model.arc_ctrl_points(a, b).unwrap();
        // The classic (4/3)(√2 − 1) control offset for a 90° arc.
        let kappa = 4.0 / 3.0 * (core::f32::consts::SQRT_2 - 1.0);
        assert!((c1 - vector(1.0, kappa)).length() < 1e-5);
        assert!((c2 - vector(kappa, 1.0)).length() < 1e-5);
    }

    #[test]
    fn refinement_threshold_disabled_for_thin_pens() {
        let pen = PenGeometry::width(0.1);
        let model = PenModel::resolve(&pen, None, 0.25).unwrap().unwrap();
        assert!(model.refinement_threshold() < -1.0);

        let thick = PenGeometry::width(20.0);
        let model = PenModel::resolve(&thick, None, 0.25).unwrap().unwrap();
        let t = model.refinement_threshold();
        assert!(t > -1.0 && t < 1.0);
    }

    #[test]
    fn complex_sqrt_bisects() {
        // sqrt of -1 is ±i; the principal branch takes +i.
        let m = complex_sqrt(vector(-1.0, 0.0));
        assert!((m - vector(0.0, 1.0)).length() < 1e-6);

        let z = complex_mul(vector(0.0, 1.0), vector(0.0, 1.0));
        assert!((z - vector(-1.0, 0.0)).length() < 1e-6);
    }
}
