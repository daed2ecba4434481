//! Geometry sampling
//!
//! The only code that touches raw measurement primitives. Everything
//! else in the engine works from the snapshots produced here, so one
//! recalculation pass always sees consistent geometry.

use affix_dom::{Document, NodeId};

/// Snapshot of the viewport: size plus the document-relative window it
/// currently shows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowGeometry {
    pub width: f32,
    pub height: f32,
    pub scroll_top: f32,
}

impl WindowGeometry {
    /// Document-relative position of the viewport's top edge.
    pub fn top(&self) -> f32 {
        self.scroll_top
    }

    /// Document-relative position of the viewport's bottom edge.
    pub fn bottom(&self) -> f32 {
        self.scroll_top + self.height
    }
}

/// Take a viewport snapshot.
pub fn window_geometry(doc: &Document) -> WindowGeometry {
    let viewport = doc.viewport();
    WindowGeometry {
        width: viewport.width,
        height: viewport.height,
        scroll_top: viewport.scroll_top,
    }
}

/// Cached element geometry: size, flow offset, and vertical margins.
///
/// `horizontal_space` is the width the element occupies in flow; it is
/// written back as an inline `width` when the element is pinned, since
/// fixed positioning forfeits flow-derived width.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Measurement {
    pub height: f32,
    pub horizontal_space: f32,
    pub offset_top: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
}

/// Outcome of measuring a node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Measured {
    Ready(Measurement),
    /// The node contains an image whose dimensions are not yet known;
    /// its laid-out height cannot be trusted until the load signal
    /// fires. The caller registers a load callback and retries.
    Deferred,
}

/// Measure a node's flow geometry.
pub fn measure(doc: &Document, node: NodeId) -> Measured {
    if doc.image_pending(node) {
        return Measured::Deferred;
    }
    let Some(metrics) = doc.metrics(node) else {
        return Measured::Deferred;
    };
    Measured::Ready(Measurement {
        height: metrics.height,
        horizontal_space: metrics.width,
        offset_top: metrics.offset_top,
        margin_top: metrics.margin_top,
        margin_bottom: metrics.margin_bottom,
    })
}
