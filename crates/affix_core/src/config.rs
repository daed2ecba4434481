//! Engine configuration
//!
//! The source system hardcoded these as numeric literals; here they are
//! configuration with the production values as defaults.

use std::time::Duration;

/// Tuning constants for the sticky engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StickyConfig {
    /// Gap kept between a stopped element and its boundary landmark
    /// (footer for top-stickies, header for bottom-stickies).
    pub stop_padding: f32,
    /// Vertical gap between members of a dialog-mode stack.
    pub dialog_gap: f32,
    /// Viewport width below which sticky behavior is disabled
    /// entirely (tablet/mobile breakpoint).
    pub min_viewport_width: f32,
    /// Cadence at which the host should drive [`crate::Sticky::poll`].
    /// Scroll and resize events only set flags; recomputation happens
    /// on the poll.
    pub poll_interval: Duration,
}

impl Default for StickyConfig {
    fn default() -> Self {
        Self {
            stop_padding: 10.0,
            dialog_gap: 20.0,
            min_viewport_width: 768.0,
            poll_interval: Duration::from_millis(50),
        }
    }
}
