//! Edge direction strategy
//!
//! Top-sticky and bottom-sticky behavior share everything except a
//! small set of sign-sensitive operations. Those live here on a single
//! value object, so the coordinator is written once and parameterized
//! by direction.

use affix_dom::{Document, DomError, NodeId};

use crate::config::StickyConfig;
use crate::css;
use crate::geometry::{Measurement, WindowGeometry};

/// Which viewport edge elements pin to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Edge {
    Top,
    Bottom,
}

impl Edge {
    /// Selector class marking candidate elements for this edge.
    pub fn selector_class(self) -> &'static str {
        match self {
            Edge::Top => css::STICK_AT_TOP_SELECTOR,
            Edge::Bottom => css::STICK_AT_BOTTOM_SELECTOR,
        }
    }

    /// Selector class of the travel-limit landmark for this edge.
    pub fn landmark_class(self) -> &'static str {
        match self {
            Edge::Top => css::FOOTER_SELECTOR,
            Edge::Bottom => css::HEADER_SELECTOR,
        }
    }

    /// Boundary marker applied to the stuck element at the end of the
    /// group opposite the sticking edge.
    pub fn boundary_class(self) -> &'static str {
        match self {
            Edge::Top => css::GROUP_BOTTOM_CLASS,
            Edge::Bottom => css::GROUP_TOP_CLASS,
        }
    }

    /// Inline property pinning a stuck element to the viewport edge.
    pub fn pin_property(self) -> &'static str {
        match self {
            Edge::Top => "top",
            Edge::Bottom => "bottom",
        }
    }

    /// Document-relative position of the element edge this direction
    /// cares about: top border for top-stickies, bottom border for
    /// bottom-stickies.
    pub fn in_page_edge_position(self, measurement: &Measurement) -> f32 {
        match self {
            Edge::Top => measurement.offset_top,
            Edge::Bottom => measurement.offset_top + measurement.height,
        }
    }

    /// Document-relative position beyond which no element on this edge
    /// may travel, derived from the boundary landmark.
    ///
    /// A missing landmark defaults to 0.0 for compatibility with the
    /// source system. For a top-edge coordinator that makes every
    /// stuck element stop almost immediately; suspect but preserved.
    pub fn end_of_scroll_area(self, doc: &Document, config: &StickyConfig) -> f32 {
        let Some(landmark) = doc.query_class_first(self.landmark_class()) else {
            tracing::warn!(
                edge = ?self,
                landmark = self.landmark_class(),
                "boundary landmark missing; travel limit defaults to 0"
            );
            return 0.0;
        };
        let metrics = doc.metrics(landmark).unwrap_or_default();
        match self {
            Edge::Top => metrics.offset_top - config.stop_padding,
            Edge::Bottom => metrics.offset_top + metrics.height + config.stop_padding,
        }
    }

    /// Has the viewport scrolled past the point where the element (or
    /// stack) leaves normal flow and sticks?
    pub fn scrolled_from_passed(self, window: &WindowGeometry, scrolled_from: f32) -> bool {
        match self {
            Edge::Top => window.top() >= scrolled_from,
            Edge::Bottom => window.bottom() < scrolled_from,
        }
    }

    /// Absolute document position an element is pinned to once it has
    /// used up its travel allowance. `trailing_offset` is the space
    /// dialog-mode members beyond this one occupy toward the landmark.
    pub fn stop_position(self, end_of_scroll_area: f32, height: f32, trailing_offset: f32) -> f32 {
        match self {
            Edge::Top => end_of_scroll_area - height - trailing_offset,
            Edge::Bottom => end_of_scroll_area + trailing_offset,
        }
    }

    /// Viewport-edge position at which the element transitions from
    /// stuck to stopped. `edge_offset` is its dialog-mode distance
    /// from the sticking edge.
    pub fn scrolling_to(
        self,
        stop_position: f32,
        height: f32,
        edge_offset: f32,
    ) -> f32 {
        match self {
            Edge::Top => stop_position - edge_offset,
            Edge::Bottom => stop_position + height + edge_offset,
        }
    }

    /// Has the viewport scrolled past the stop threshold?
    pub fn scrolling_to_passed(self, window: &WindowGeometry, scrolling_to: f32) -> bool {
        match self {
            Edge::Top => window.top() >= scrolling_to,
            Edge::Bottom => window.bottom() <= scrolling_to,
        }
    }

    /// Insert a shim adjacent to the element so its flow space stays
    /// occupied: before the element for top-stickies, after it for
    /// bottom-stickies.
    pub fn insert_shim(
        self,
        doc: &mut Document,
        element: NodeId,
        shim: NodeId,
    ) -> Result<(), DomError> {
        match self {
            Edge::Top => doc.insert_before(element, shim),
            Edge::Bottom => doc.insert_after(element, shim),
        }
    }

    /// Ordering key placing elements nearest the sticking edge first.
    /// Dialog-mode fitting walks this order backwards, so the members
    /// nearest the viewport edge are preserved preferentially.
    pub fn distance_from_edge(self, in_page_edge_position: f32) -> f32 {
        match self {
            Edge::Top => in_page_edge_position,
            Edge::Bottom => -in_page_edge_position,
        }
    }
}
