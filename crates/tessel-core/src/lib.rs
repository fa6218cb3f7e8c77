#![forbid(unsafe_code)]

//! Core: geometry and logging shared by the tessel crates.
//!
//! # Role in tessel
//! `tessel-core` owns [`geometry::Rect`], the only value exchanged between
//! the layout solver and the dashboard panels that draw into the regions it
//! produces, plus the [`logging`] facade that lets the solver emit
//! structured `tracing` events without scattering `#[cfg]` guards.

pub mod geometry;
pub mod logging;

pub use geometry::Rect;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};
