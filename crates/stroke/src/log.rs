//! Conditional logging macros.
//!
//! When the `tracing` feature is enabled these forward to `tracing`; when
//! disabled they expand to no-ops with zero runtime overhead.

#[cfg(feature = "tracing")]
macro_rules! trace {
    ($($arg:tt)*) => { tracing::trace!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace {
    ($($arg:tt)*) => {};
}
