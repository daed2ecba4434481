//! Node storage types for the headless document

use indexmap::IndexMap;
use slotmap::new_key_type;

new_key_type! {
    /// Stable key for a document node
    pub struct NodeId;
}

/// Laid-out geometry for a node, authored by the host.
///
/// `offset_top` is document-relative (distance from the document top to
/// the node's top border edge when laid out in normal flow).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NodeMetrics {
    pub width: f32,
    pub height: f32,
    pub offset_top: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
}

/// Viewport state: visible size plus vertical scroll offset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub scroll_top: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1024.0,
            height: 768.0,
            scroll_top: 0.0,
        }
    }
}

/// A single document node: tag, class list, inline styles, tree links,
/// authored metrics, and the image-load latch.
#[derive(Debug)]
pub struct Node {
    pub tag: String,
    /// Class list in attribute order.
    pub classes: Vec<String>,
    /// Inline styles in insertion order, so serialized output is
    /// deterministic and comparable in tests.
    pub styles: IndexMap<String, String>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub metrics: NodeMetrics,
    /// True while a contained image's dimensions are unknown; cleared
    /// by [`crate::Document::complete_image_load`].
    pub image_pending: bool,
}

impl Node {
    pub(crate) fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            classes: Vec::new(),
            styles: IndexMap::new(),
            parent: None,
            children: Vec::new(),
            metrics: NodeMetrics::default(),
            image_pending: false,
        }
    }
}
