use crate::math::{Point, Vector};
use core::ops::Range;

/// A 2d curve segment defined by four points: the beginning of the segment,
/// two control points and the end of the segment.
///
/// The curve is defined by equation:
/// ```∀ t ∈ [0..1],  P(t) = (1 - t)³ * from + 3 * (1 - t)² * t * ctrl1 + 3 * t² * (1 - t) * ctrl2 + t³ * to```
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct CubicBezierSegment {
    pub from: Point,
    pub ctrl1: Point,
    pub ctrl2: Point,
    pub to: Point,
}

impl CubicBezierSegment {
    /// Sample the curve at t (expecting t between 0 and 1).
    pub fn sample(&self, t: f32) -> Point {
        let t2 = t * t;
        let t3 = t2 * t;
        let one_t = 1.0 - t;
        let one_t2 = one_t * one_t;
        let one_t3 = one_t2 * one_t;

        (self.from.to_vector() * one_t3
            + self.ctrl1.to_vector() * 3.0 * one_t2 * t
            + self.ctrl2.to_vector() * 3.0 * one_t * t2
            + self.to.to_vector() * t3)
            .to_point()
    }

    /// Sample the curve's derivative at t (expecting t between 0 and 1).
    pub fn derivative(&self, t: f32) -> Vector {
        let one_t = 1.0 - t;
        (self.ctrl1 - self.from) * 3.0 * one_t * one_t
            + (self.ctrl2 - self.ctrl1) * 6.0 * one_t * t
            + (self.to - self.ctrl2) * 3.0 * t * t
    }

    /// The direction of the curve where it leaves `from`.
    ///
    /// Falls back through the control polygon when leading control points
    /// coincide with the start point; `None` means all four points coincide
    /// and the segment has no direction at all.
    pub fn start_tangent(&self) -> Option<Vector> {
        first_nonzero(&[
            self.ctrl1 - self.from,
            self.ctrl2 - self.from,
            self.to - self.from,
        ])
    }

    /// The direction of the curve where it arrives at `to`.
    pub fn end_tangent(&self) -> Option<Vector> {
        first_nonzero(&[
            self.to - self.ctrl2,
            self.to - self.ctrl1,
            self.to - self.from,
        ])
    }

    /// A robust tangent at parameter t: where the true derivative vanishes
    /// (cusps, coincident control points) the nearest well defined direction
    /// is used instead.
    pub fn tangent_at(&self, t: f32) -> Vector {
        let d = self.derivative(t);
        if d.square_length() > 0.0 {
            return d;
        }
        if t < 0.5 {
            self.start_tangent().unwrap_or_else(|| Vector::zero())
        } else {
            self.end_tangent().unwrap_or_else(|| Vector::zero())
        }
    }

    /// Return the curve inside a given range of t.
    ///
    /// This is equivalent to splitting at the range's end points.
    pub fn split_range(&self, t_range: Range<f32>) -> Self {
        let (t0, t1) = (t_range.start, t_range.end);
        if t0 == 0.0 && t1 == 1.0 {
            return *self;
        }
        let cut = self.after_split(t0);
        if t1 >= 1.0 {
            return cut;
        }
        // The second trim parameter lives in the domain of the already
        // trimmed curve.
        cut.before_split((t1 - t0) / (1.0 - t0))
    }

    /// Return the curve before the split point.
    pub fn before_split(&self, t: f32) -> Self {
        let ctrl1a = self.from.lerp(self.ctrl1, t);
        let ctrl2a = self.ctrl1.lerp(self.ctrl2, t);
        let ctrl1aa = ctrl1a.lerp(ctrl2a, t);
        let ctrl3a = self.ctrl2.lerp(self.to, t);
        let ctrl2aa = ctrl2a.lerp(ctrl3a, t);
        CubicBezierSegment {
            from: self.from,
            ctrl1: ctrl1a,
            ctrl2: ctrl1aa,
            to: ctrl1aa.lerp(ctrl2aa, t),
        }
    }

    /// Return the curve after the split point.
    pub fn after_split(&self, t: f32) -> Self {
        let ctrl1a = self.from.lerp(self.ctrl1, t);
        let ctrl2a = self.ctrl1.lerp(self.ctrl2, t);
        let ctrl1aa = ctrl1a.lerp(ctrl2a, t);
        let ctrl3a = self.ctrl2.lerp(self.to, t);
        let ctrl2aa = ctrl2a.lerp(ctrl3a, t);
        CubicBezierSegment {
            from: ctrl1aa.lerp(ctrl2aa, t),
            ctrl1: ctrl2aa,
            ctrl2: ctrl3a,
            to: self.to,
        }
    }

    /// The smallest axis-aligned box containing the four points (and
    /// therefore the curve, by the convex hull property).
    pub fn control_box(&self) -> crate::math::Box2D {
        let min_x = self
            .from
            .x
            .min(self.ctrl1.x)
            .min(self.ctrl2.x)
            .min(self.to.x);
        let max_x = self
            .from
            .x
            .max(self.ctrl1.x)
            .max(self.ctrl2.x)
            .max(self.to.x);
        let min_y = self
            .from
            .y
            .min(self.ctrl1.y)
            .min(self.ctrl2.y)
            .min(self.to.y);
        let max_y = self
            .from
            .y
            .max(self.ctrl1.y)
            .max(self.ctrl2.y)
            .max(self.to.y);
        crate::math::Box2D {
            min: Point::new(min_x, min_y),
            max: Point::new(max_x, max_y),
        }
    }

    // Computes the number of quadratic bézier segments required to
    // approximate this cubic curve within the tolerance threshold.
    //
    // Derived by Raph Levien from section 10.6 of Sedeberg's CAGD notes
    // https://scholarsarchive.byu.edu/cgi/viewcontent.cgi?article=1000&context=facpub#section.10.6
    // and the error metric from the caffein owl blog post
    // http://caffeineowl.com/graphics/2d/vectorial/cubic2quad01.html
    fn num_quadratics(&self, tolerance: f32) -> u32 {
        debug_assert!(tolerance > 0.0);

        let x = self.from.x - 3.0 * self.ctrl1.x + 3.0 * self.ctrl2.x - self.to.x;
        let y = self.from.y - 3.0 * self.ctrl1.y + 3.0 * self.ctrl2.y - self.to.y;
        let err = x * x + y * y;

        let n = (err / (432.0 * tolerance * tolerance)).powf(1.0 / 6.0).ceil();
        if n.is_finite() && n >= 1.0 {
            n as u32
        } else {
            1
        }
    }

    /// Approximates the curve with a sequence of line segments within
    /// `tolerance`, invoking the callback with the end point and the curve
    /// tangent at each step (the start point is not reported).
    ///
    /// The sequence is finite, always ends exactly at `to`, and each call
    /// restarts the approximation from scratch.
    pub fn for_each_flattened_with_tangent<F>(&self, tolerance: f32, callback: &mut F)
    where
        F: FnMut(Point, Vector),
    {
        let quadratics_tolerance = tolerance * 0.2;
        let flattening_tolerance = tolerance * 0.8;

        let num_quadratics = self.num_quadratics(quadratics_tolerance);
        let step = 1.0 / num_quadratics as f32;

        let mut t0 = 0.0;
        for i in 0..num_quadratics {
            let last_quad = i + 1 == num_quadratics;
            let t1 = if last_quad { 1.0 } else { t0 + step };

            let sub = self.split_range(t0..t1);
            let ctrl = quadratic_approximation_ctrl(&sub);

            // Uniform parameter steps on the quadratic; the deviation of the
            // chord from the parabola over one step is bounded by
            // |from - 2*ctrl + to| / (4*n²).
            let a = sub.from.to_vector() - ctrl.to_vector() * 2.0 + sub.to.to_vector();
            let n = ((a.length() / (4.0 * flattening_tolerance)).sqrt())
                .ceil()
                .max(1.0) as u32;

            for j in 1..=n {
                let s = j as f32 / n as f32;
                let t = t0 + (t1 - t0) * s;
                if last_quad && j == n {
                    callback(self.to, self.tangent_at(1.0));
                } else {
                    let one_s = 1.0 - s;
                    let p = (sub.from.to_vector() * (one_s * one_s)
                        + ctrl.to_vector() * (2.0 * s * one_s)
                        + sub.to.to_vector() * (s * s))
                        .to_point();
                    callback(p, self.tangent_at(t));
                }
            }

            t0 = t1;
        }
    }
}

// The control point of the single-quadratic approximation of a cubic:
// (3*(ctrl1 + ctrl2) - (from + to)) / 4.
fn quadratic_approximation_ctrl(curve: &CubicBezierSegment) -> Point {
    (((curve.ctrl1.to_vector() + curve.ctrl2.to_vector()) * 3.0
        - (curve.from.to_vector() + curve.to.to_vector()))
        * 0.25)
        .to_point()
}

fn first_nonzero(candidates: &[Vector; 3]) -> Option<Vector> {
    for v in candidates {
        if v.square_length() > 0.0 {
            return Some(*v);
        }
    }
    None
}
