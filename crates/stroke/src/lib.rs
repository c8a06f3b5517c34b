#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]
#![allow(clippy::float_cmp)]
#![allow(clippy::too_many_arguments)]
#![no_std]

//! Stroke widening of 2D paths.
//!
//! Given a figure (a run of line and cubic bézier segments, open or closed,
//! possibly containing unstroked gaps) and a pen description (elliptical
//! width/height/angle, caps, joins, miter limit, optional dash pattern and an
//! affine render transform), this crate computes the filled outline that
//! represents the stroked appearance of the figure to a given tolerance.
//!
//! ## Overview
//!
//! The widener walks the figure once, keeping two offset "rails" on either
//! side of the spine. Corners are joined according to the pen's line join
//! (miter with a limit test and clip/bevel fallbacks, round via one or two
//! bézier arcs, bevel), open ends are capped (flat, square, round or
//! triangular), and curve offsets are refined with extra rounding arcs where
//! a thick pen would magnify the flattening facets. When a dash pattern is
//! active, a dashing stage buffers each edge and starts and stops the pen at
//! dash boundaries, measuring distance in pre-transform space.
//!
//! Output goes through the [`WideningSink`] trait. Two sinks are provided:
//! [`ContourAssembler`] seals the rails into closed outline figures on a
//! [`Shape`](kontur_path::Shape), and [`HitTestSink`] accumulates a winding
//! number around a query point and aborts the traversal as soon as a hit is
//! certain.
//!
//! # Examples
//!
//! ```
//! use kontur_stroke::{widen, ContourAssembler, PenGeometry};
//! use kontur_stroke::path::{Figure, Shape};
//! use kontur_stroke::math::point;
//!
//! let mut builder = Figure::builder(point(0.0, 0.0));
//! builder.line_to(point(10.0, 0.0));
//! builder.line_to(point(10.0, 10.0));
//! let figure = builder.build();
//!
//! let pen = PenGeometry::width(2.0);
//!
//! let mut output = Shape::new();
//! {
//!     let mut sink = ContourAssembler::new(&mut output);
//!     widen(&figure, &pen, None, 0.1, &mut sink).unwrap();
//! }
//!
//! assert_eq!(output.num_figures(), 1);
//! ```

extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

pub use kontur_path as path;

pub use crate::path::geom;
pub use crate::path::math;

#[macro_use]
mod log;

mod dash;
mod error;
mod pen;
mod segment;
pub mod sink;
mod widen;

#[cfg(test)]
mod widen_tests;

#[doc(inline)]
pub use crate::dash::DashPattern;
#[doc(inline)]
pub use crate::error::*;
#[doc(inline)]
pub use crate::pen::PenModel;
#[doc(inline)]
pub use crate::sink::{CapEnd, ContourAssembler, HitTestSink, WideningSink};
#[doc(inline)]
pub use crate::widen::{widen, Widener};

pub use crate::path::{LineCap, LineJoin, Side};

use alloc::vec::Vec;

/// Distances and direction vectors shorter than this are considered
/// indistinguishable from zero.
pub(crate) const FUZZ: f32 = 1e-6;

/// The dash pattern style of a pen.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum DashStyle {
    /// A continuous stroke.
    Solid,
    /// Alternating dash/gap lengths, in pen-width units, with a phase
    /// offset into the sequence.
    Custom { array: Vec<f32>, offset: f32 },
}

impl Default for DashStyle {
    fn default() -> Self {
        DashStyle::Solid
    }
}

/// Describes a pen in the path's local space.
///
/// The pen's cross section is an ellipse of the given half width and half
/// height, rotated by `angle` radians. A render transform folded in at
/// widening time deforms the ellipse along with the path.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
#[non_exhaustive]
pub struct PenGeometry {
    /// Half of the pen width.
    ///
    /// Default value: `PenGeometry::DEFAULT_HALF_WIDTH`.
    pub half_width: f32,

    /// Half of the pen height.
    ///
    /// Default value: `PenGeometry::DEFAULT_HALF_WIDTH`.
    pub half_height: f32,

    /// Rotation of the pen ellipse in radians.
    ///
    /// Default value: `0.0`.
    pub angle: f32,

    /// See the SVG specification.
    ///
    /// Default value: `LineJoin::Miter`.
    pub line_join: LineJoin,

    /// Must be greater than or equal to 1.0.
    /// Default value: `PenGeometry::DEFAULT_MITER_LIMIT`.
    pub miter_limit: f32,

    /// What cap to use at the start of an open figure.
    ///
    /// Default value: `LineCap::Flat`.
    pub start_cap: LineCap,

    /// What cap to use at the end of an open figure.
    ///
    /// Default value: `LineCap::Flat`.
    pub end_cap: LineCap,

    /// What cap to use where a dash or a gap interrupts the stroke.
    ///
    /// Default value: `LineCap::Flat`.
    pub dash_cap: LineCap,

    /// Default value: `DashStyle::Solid`.
    pub dash_style: DashStyle,
}

impl PenGeometry {
    /// Minimum miter limit as defined by the SVG specification.
    pub const MINIMUM_MITER_LIMIT: f32 = 1.0;
    /// Default miter limit.
    pub const DEFAULT_MITER_LIMIT: f32 = 10.0;
    pub const DEFAULT_LINE_CAP: LineCap = LineCap::Flat;
    pub const DEFAULT_LINE_JOIN: LineJoin = LineJoin::Miter;
    pub const DEFAULT_HALF_WIDTH: f32 = 0.5;

    pub const DEFAULT: Self = PenGeometry {
        half_width: Self::DEFAULT_HALF_WIDTH,
        half_height: Self::DEFAULT_HALF_WIDTH,
        angle: 0.0,
        line_join: Self::DEFAULT_LINE_JOIN,
        miter_limit: Self::DEFAULT_MITER_LIMIT,
        start_cap: Self::DEFAULT_LINE_CAP,
        end_cap: Self::DEFAULT_LINE_CAP,
        dash_cap: Self::DEFAULT_LINE_CAP,
        dash_style: DashStyle::Solid,
    };

    /// A circular pen of the given width.
    #[inline]
    pub fn width(width: f32) -> Self {
        let mut pen = Self::DEFAULT;
        pen.half_width = width * 0.5;
        pen.half_height = width * 0.5;
        pen
    }

    /// An elliptical pen.
    #[inline]
    pub fn elliptical(width: f32, height: f32, angle: f32) -> Self {
        let mut pen = Self::DEFAULT;
        pen.half_width = width * 0.5;
        pen.half_height = height * 0.5;
        pen.angle = angle;
        pen
    }

    #[inline]
    pub fn with_line_join(mut self, join: LineJoin) -> Self {
        self.line_join = join;
        self
    }

    #[inline]
    pub fn with_miter_limit(mut self, limit: f32) -> Self {
        assert!(limit >= Self::MINIMUM_MITER_LIMIT);
        self.miter_limit = limit;
        self
    }

    /// Set the start, end and dash caps all at once.
    #[inline]
    pub fn with_caps(mut self, cap: LineCap) -> Self {
        self.start_cap = cap;
        self.end_cap = cap;
        self.dash_cap = cap;
        self
    }

    #[inline]
    pub fn with_start_cap(mut self, cap: LineCap) -> Self {
        self.start_cap = cap;
        self
    }

    #[inline]
    pub fn with_end_cap(mut self, cap: LineCap) -> Self {
        self.end_cap = cap;
        self
    }

    #[inline]
    pub fn with_dash_cap(mut self, cap: LineCap) -> Self {
        self.dash_cap = cap;
        self
    }

    #[inline]
    pub fn with_dashes(mut self, array: &[f32], offset: f32) -> Self {
        self.dash_style = DashStyle::Custom {
            array: array.into(),
            offset,
        };
        self
    }
}

impl Default for PenGeometry {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[test]
fn default_pen_geometry() {
    let pen = PenGeometry::default();
    assert_eq!(pen.half_width, 0.5);
    assert_eq!(pen.line_join, LineJoin::Miter);
    assert_eq!(pen.dash_style, DashStyle::Solid);
}

#[test]
#[should_panic]
fn invalid_miter_limit() {
    let _ = PenGeometry::width(1.0).with_miter_limit(0.5);
}
