#![forbid(unsafe_code)]

//! Logging facade.
//!
//! With the `tracing` feature the usual `tracing` macros are re-exported here
//! and at the crate root. Without it, the crate root exports macros of the
//! same names that expand to nothing, so call sites never need their own
//! `#[cfg]` guards:
//!
//! ```ignore
//! use tessel_core::{debug_span, warn};
//!
//! let _span = debug_span!("layout.split", constraints = 3).entered();
//! warn!(message = "layout.over_constrained", overflow = 4);
//! ```
//!
//! Spans produced by the no-op `*_span!` macros are [`NoopSpan`] values that
//! accept `entered()` and `in_scope()` like a real span.

#[cfg(feature = "tracing")]
pub use tracing::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};

/// Stand-in for `tracing::Span` when tracing is compiled out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoopSpan;

impl NoopSpan {
    /// Enter the span; returns itself as the guard.
    #[inline]
    #[must_use]
    pub const fn entered(self) -> Self {
        self
    }

    /// Run `f` "inside" the span.
    #[inline]
    pub fn in_scope<F: FnOnce() -> T, T>(&self, f: F) -> T {
        f()
    }
}

#[cfg(not(feature = "tracing"))]
mod noop {
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }

    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    #[macro_export]
    macro_rules! info {
        ($($arg:tt)*) => {};
    }

    #[macro_export]
    macro_rules! warn {
        ($($arg:tt)*) => {};
    }

    #[macro_export]
    macro_rules! error {
        ($($arg:tt)*) => {};
    }

    #[macro_export]
    macro_rules! trace_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }

    #[macro_export]
    macro_rules! debug_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }

    #[macro_export]
    macro_rules! info_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }

    #[macro_export]
    macro_rules! warn_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }

    #[macro_export]
    macro_rules! error_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }
}
