#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]
#![allow(clippy::match_like_matches_macro)]
#![no_std]

//! Data structures to store, build and iterate over the figures consumed and
//! produced by the kontur stroke widener.
//!
//! A [`Figure`](figure/struct.Figure.html) is one sub-path: an ordered run of
//! line and cubic bézier segments, open or closed, where individual segments
//! can be flagged as unstroked gaps or smooth joins. A
//! [`Shape`](shape/struct.Shape.html) is the widener's output: a set of
//! closed outline figures.
//!
//! This crate is reexported in [kontur](https://docs.rs/kontur/).
//!
//! # Examples
//!
//! ```
//! use kontur_path::Figure;
//! use kontur_path::math::point;
//!
//! let mut builder = Figure::builder(point(0.0, 0.0));
//! builder.line_to(point(10.0, 0.0));
//! builder.cubic_to(point(12.0, 0.0), point(12.0, 2.0), point(12.0, 4.0));
//! let figure = builder.build();
//!
//! for segment in figure.segments() {
//!     println!("{:?}", segment);
//! }
//! ```

extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

pub use kontur_geom as geom;

pub mod figure;
pub mod shape;

#[doc(inline)]
pub use crate::figure::{Figure, FigureBuilder, FigureSegment, FigureSource, SegmentView};
#[doc(inline)]
pub use crate::shape::{Shape, ShapeEvent};

pub use crate::geom::math;

/// Line cap as defined by the PostScript and SVG specifications, plus the
/// triangular cap.
///
/// <svg viewBox="0 0 400 399.99998" height="400" width="400">
///   <g transform="translate(0,-652.36229)">
///     <path style="opacity:1;fill:#80b3ff;" d="m 240,983 a 30,30 0 0 1 -25,-15 30,30 0 0 1 0,-30.00001 30,30 0 0 1 25.98076,-15 l 0,30 z"/>
///     <path style="fill:#80b3ff;" d="m 390,782.6 -150,260 -60,-60 150,-260 60,60 z"/>
///     <path style="fill:#80b3ff;" d="m 390,782.6 a 30,30 0 0 1 -60,-60 l 60,60 z"/>
///     <path style="opacity:1;fill:#80b3ff;" d="m 181.2,1000 43.3-25 0,-60 -43.3,25 z"/>
///   </g>
/// </svg>
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum LineCap {
    /// The stroke ends flat at the exact endpoint of the path.
    Flat,
    /// The stroke extends beyond the endpoint of the path by half of the
    /// pen width and ends flat.
    Square,
    /// The stroke ends with a half circle of diameter equal to the pen
    /// width.
    Round,
    /// The stroke ends with a triangle whose apex extends beyond the
    /// endpoint by half of the pen width.
    Triangle,
}

impl Default for LineCap {
    fn default() -> Self {
        LineCap::Flat
    }
}

/// Line join as defined by the SVG specification, with the two miter
/// fallback flavors.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum LineJoin {
    /// A sharp corner; when the corner exceeds the miter limit the spike is
    /// clipped flat at the limit.
    Miter,
    /// A sharp corner; when the corner exceeds the miter limit the join
    /// falls back to `Bevel` instead.
    MiterClipped,
    /// A bevelled corner.
    Bevel,
    /// A rounded corner.
    Round,
}

impl Default for LineJoin {
    fn default() -> Self {
        LineJoin::Miter
    }
}

/// Left or right rail of a widened stroke, looking along the direction of
/// travel.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    pub fn is_left(self) -> bool {
        self == Side::Left
    }
}
