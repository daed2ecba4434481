//! affix — scroll-sticky positioning engine
//!
//! Pins marked elements to the top or bottom of a scrolling viewport,
//! stops them at a travel boundary (a page footer or header), and can
//! coordinate several elements as one fit-constrained "dialog" stack.
//! The DOM is injected ([`affix_dom::Document`]), so the engine's
//! decision logic runs headless.
//!
//! Elements opt in through selector classes (see [`css`]); the engine
//! answers with marker classes, inline styles, and shim placeholders
//! that preserve flow space. Scroll and resize events only set flags;
//! the host drives recomputation by calling [`Sticky::poll`] on a
//! fixed interval ([`StickyConfig::poll_interval`]).
//!
//! # Example
//!
//! ```rust
//! use affix_core::{css, Sticky};
//! use affix_dom::{Document, NodeMetrics};
//!
//! let mut doc = Document::new();
//! doc.set_viewport_size(1024.0, 940.0);
//! let panel = doc.create_element("div");
//! doc.add_class(panel, css::STICK_AT_TOP_SELECTOR);
//! doc.append_child(doc.root(), panel).unwrap();
//! doc.set_metrics(panel, NodeMetrics {
//!     width: 320.0,
//!     height: 168.0,
//!     offset_top: 238.0,
//!     ..Default::default()
//! });
//!
//! let mut sticky = Sticky::default();
//! sticky.init(&mut doc).unwrap();
//!
//! doc.set_scroll_top(400.0);
//! sticky.poll(&mut doc).unwrap();
//! assert!(doc.has_class(panel, css::FIXED_CLASS));
//! ```

pub mod config;
pub mod coordinator;
pub mod css;
pub mod dialog;
pub mod edge;
pub mod geometry;
pub mod record;
pub mod scheduler;

pub use config::StickyConfig;
pub use coordinator::{EdgeCoordinator, Mode};
pub use edge::Edge;
pub use geometry::{Measurement, WindowGeometry};
pub use record::{AppliedClass, Status, StickyElement};
pub use scheduler::Tick;

use affix_dom::{Document, DomError};

/// The engine facade: one coordinator per viewport edge, addressable
/// by [`Edge`].
pub struct Sticky {
    at_top: EdgeCoordinator,
    at_bottom: EdgeCoordinator,
}

impl Default for Sticky {
    fn default() -> Self {
        Self::new(StickyConfig::default())
    }
}

impl Sticky {
    pub fn new(config: StickyConfig) -> Self {
        Self {
            at_top: EdgeCoordinator::new(Edge::Top, config),
            at_bottom: EdgeCoordinator::new(Edge::Bottom, config),
        }
    }

    pub fn coordinator(&self, edge: Edge) -> &EdgeCoordinator {
        match edge {
            Edge::Top => &self.at_top,
            Edge::Bottom => &self.at_bottom,
        }
    }

    pub fn coordinator_mut(&mut self, edge: Edge) -> &mut EdgeCoordinator {
        match edge {
            Edge::Top => &mut self.at_top,
            Edge::Bottom => &mut self.at_bottom,
        }
    }

    /// Initial sync and position pass for both edges; call once at
    /// module startup.
    pub fn init(&mut self, doc: &mut Document) -> Result<(), DomError> {
        self.at_top.init(doc)?;
        self.at_bottom.init(doc)
    }

    /// Re-derive one edge's state from the current document. External
    /// code that mutates page content must call this afterward.
    pub fn recalculate(&mut self, doc: &mut Document, edge: Edge) -> Result<(), DomError> {
        self.coordinator_mut(edge).recalculate(doc)
    }

    /// Switch an edge's coordination mode; takes effect next pass.
    pub fn set_mode(&mut self, edge: Edge, mode: Mode) {
        self.coordinator_mut(edge).set_mode(mode);
    }

    /// Drain both edges' pending event flags and run whatever passes
    /// they call for. Drive this every
    /// [`StickyConfig::poll_interval`].
    pub fn poll(&mut self, doc: &mut Document) -> Result<(), DomError> {
        self.at_top.tick(doc)?;
        self.at_bottom.tick(doc)
    }

    /// Teardown: remove both edges' event listeners.
    pub fn clear_events(&mut self, doc: &mut Document) {
        self.at_top.clear_events(doc);
        self.at_bottom.clear_events(doc);
    }
}
