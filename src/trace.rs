//! Scan diagnostics backed by `tracing` when the `tracing` feature is on.
//!
//! Run-level records (scan span, consolidation, feature counts) are emitted at
//! info level. Per-window records go through `trace_window!` at debug level
//! and always carry the window origin, so a scan over thousands of windows
//! stays quiet under the default `symbolscan=info` filter. Without the
//! feature every macro expands to nothing observable.

/// Opens an info-level span around a scan stage.
#[cfg(feature = "tracing")]
macro_rules! trace_span {
    ($name:expr $(, $($field:tt)*)?) => {
        tracing::info_span!($name $(, $($field)*)?)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_span {
    ($name:expr $(, $($field:tt)*)?) => {
        $crate::trace::NoopSpan
    };
}

/// Records a run-level event with `key = value` fields.
#[cfg(feature = "tracing")]
macro_rules! trace_event {
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        tracing::info!(name: $name, $($key = $value),+)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_event {
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        let _ = ($($value,)+);
    };
}

/// Records a per-window event tagged with the window origin.
#[cfg(feature = "tracing")]
macro_rules! trace_window {
    ($name:expr, $window:expr $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::debug!(name: $name, x = $window.x, y = $window.y $(, $key = $value)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_window {
    ($name:expr, $window:expr $(, $key:ident = $value:expr)* $(,)?) => {
        let _ = (&$window, $($value,)*);
    };
}

pub(crate) use trace_event;
pub(crate) use trace_span;
pub(crate) use trace_window;

/// Placeholder span so `trace_span!(..).entered()` compiles without tracing.
#[cfg(not(feature = "tracing"))]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    #[inline]
    pub fn entered(self) -> Self {
        self
    }
}
