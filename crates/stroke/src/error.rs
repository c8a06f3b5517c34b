/// The widening engine's result type.
pub type WidenResult = Result<(), WidenError>;

/// An error that can happen while widening a figure.
///
/// Degenerate individual segments are recovered internally by merging the
/// corners on both sides; everything surfacing here aborts the current
/// figure only, leaving previously emitted figures on the sink intact.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum WidenError {
    /// A direction or radius computation produced a vector
    /// indistinguishable from zero.
    #[error("direction vector indistinguishable from zero")]
    ZeroVector,

    /// A near-singular transform or division produced a NaN or infinity.
    #[error("arithmetic produced a non-finite number")]
    BadNumber,

    /// The dash array is malformed and was rejected before widening
    /// started.
    #[error("invalid dash array: {reason}")]
    InvalidDashArray { reason: &'static str },
}

impl WidenError {
    pub(crate) fn bad_dash(reason: &'static str) -> Self {
        WidenError::InvalidDashArray { reason }
    }
}
