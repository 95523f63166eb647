//! Logging and tracing facilities for Horizon Masonry.
//!
//! Horizon Masonry uses the `tracing` crate for instrumentation. To see logs,
//! install a subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_masonry=debug")
//!     .init();
//! ```

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core framework target.
    pub const CORE: &str = "horizon_masonry_core";
    /// Event loop target.
    pub const EVENT_LOOP: &str = "horizon_masonry_core::event_loop";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_masonry_core::signal";
    /// Grid orchestration (collection events, lifecycle).
    pub const GRID: &str = "horizon_masonry::grid";
    /// Layout passes and measurement.
    pub const LAYOUT: &str = "horizon_masonry::layout";
    /// Placement queue and readiness handling.
    pub const SCHEDULER: &str = "horizon_masonry::scheduler";
}

/// Span names used for performance tracing.
pub mod span_names {
    /// One flush of the placement queue.
    pub const LAYOUT_PASS: &str = "layout_pass";
    /// A full reflow of every collection item.
    pub const REFLOW: &str = "reflow";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// Useful for tracking the duration of operations.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "horizon_masonry::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}
