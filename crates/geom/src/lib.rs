#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]
#![allow(clippy::many_single_char_names)]
#![no_std]

//! 2D geometric primitives for stroke widening, on top of euclid.
//!
//! This crate is reexported in [kontur](https://docs.rs/kontur/).
//!
//! # Overview
//!
//! This crate implements the small amount of geometry the widening engine
//! needs from its collaborators:
//!
//! - f32 point/vector aliases and shorthands,
//! - a 2×2 linear matrix used for elliptical pen shapes,
//! - cubic bézier segments with parameter-range trimming and
//!   tolerance-driven flattening that also reports tangents.
//!
//! # Flattening
//!
//! Flattening approximates a curve with a succession of line segments. The
//! tolerance threshold taken as input by the flattening entry points is the
//! maximum distance between the curve and its linear approximation: the
//! smaller the tolerance, the more segments are generated. The widening
//! engine additionally needs the curve tangent at every flattened point in
//! order to place offset points, so the flattener here reports
//! `(point, tangent)` pairs.

#[cfg(any(test, feature = "std"))]
extern crate std;

// Reexport dependencies.
pub use arrayvec;
pub use euclid;

mod cubic_bezier;
mod matrix;

#[doc(inline)]
pub use crate::cubic_bezier::CubicBezierSegment;
#[doc(inline)]
pub use crate::matrix::Matrix2x2;

pub mod math {
    //! f32 aliases of the euclid types used everywhere in kontur.

    /// Alias for `euclid::default::Point2D<f32>`.
    pub type Point = euclid::default::Point2D<f32>;

    /// Alias for `euclid::default::Vector2D<f32>`.
    pub type Vector = euclid::default::Vector2D<f32>;

    /// Alias for `euclid::default::Transform2D<f32>`.
    pub type Transform = euclid::default::Transform2D<f32>;

    /// Alias for `euclid::default::Box2D<f32>`.
    pub type Box2D = euclid::default::Box2D<f32>;

    /// Shorthand for `Point::new(x, y)`.
    #[inline]
    pub fn point(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }

    /// Shorthand for `Vector::new(x, y)`.
    #[inline]
    pub fn vector(x: f32, y: f32) -> Vector {
        Vector::new(x, y)
    }
}

use crate::math::Vector;

/// The counter-clockwise perpendicular of a vector.
#[inline]
pub fn perp(v: Vector) -> Vector {
    Vector::new(-v.y, v.x)
}
