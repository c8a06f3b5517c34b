#![deny(bare_trait_objects)]

//! Stroke widening for 2D paths.
//!
//! Given a figure (straight and cubic bézier sub-paths, open or closed,
//! possibly containing unstroked gaps) and a pen description (elliptical
//! width/height/angle, caps, joins, miter limit, optional dash pattern and
//! an affine render transform), kontur computes the filled outline that
//! represents the stroked appearance of that figure to a given tolerance.
//!
//! # Crates
//!
//! This meta-crate (`kontur`) reexports the following sub-crates for
//! convenience:
//!
//! * **kontur_stroke** - The widening engine: pens, joins, caps, dashes,
//!   outline assembly and stroke hit testing.
//! * **kontur_path** - Figure and outline data structures.
//! * **kontur_geom** - 2d vector, matrix and cubic bézier utilities.
//!
//! Each `kontur_<name>` crate is reexported as a `<name>` module in
//! `kontur`. For example:
//!
//! ```ignore
//! use kontur_stroke::Widener;
//! ```
//!
//! Is equivalent to:
//!
//! ```ignore
//! use kontur::stroke::Widener;
//! ```
//!
//! # Example
//!
//! ```
//! use kontur::math::point;
//! use kontur::path::Figure;
//! use kontur::stroke::{PenGeometry, Widener};
//!
//! let mut builder = Figure::builder(point(0.0, 0.0));
//! builder.line_to(point(20.0, 0.0));
//! builder.line_to(point(20.0, 20.0));
//! let figure = builder.build();
//!
//! let pen = PenGeometry::width(4.0);
//! let outline = Widener::new(0.1).outline(&figure, &pen, None).unwrap();
//! assert_eq!(outline.num_figures(), 1);
//! ```
//!
//! # Feature flags
//!
//! * `serialization` - serde serialization of the vocabulary types.
//! * `tracing` - debug-level instrumentation of the widening engine.

pub use kontur_stroke as stroke;

pub use crate::stroke::geom;
pub use crate::stroke::path;

pub use crate::path::math;

#[doc(inline)]
pub use crate::stroke::{
    widen, ContourAssembler, DashStyle, HitTestSink, LineCap, LineJoin, PenGeometry, Side,
    WidenError, Widener, WideningSink,
};
