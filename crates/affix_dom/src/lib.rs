//! Headless document model for the affix sticky-positioning engine
//!
//! The engine's only observable output is DOM mutation: class lists,
//! inline styles, shim insertion/removal, and scroll adjustments. This
//! crate provides a small in-memory document exposing exactly that
//! surface, so the engine's decision logic can run and be tested
//! without a browser.
//!
//! Geometry is authored by the host rather than computed: each node
//! carries [`NodeMetrics`] describing its laid-out size and
//! document-relative offset. Shims preserve flow space when an element
//! is pinned, which is what keeps the authored metrics of surrounding
//! nodes valid while the engine works.
//!
//! # Example
//!
//! ```rust
//! use affix_dom::{Document, NodeMetrics};
//!
//! let mut doc = Document::new();
//! let panel = doc.create_element("div");
//! doc.add_class(panel, "js-stick-at-top-when-scrolling");
//! doc.append_child(doc.root(), panel).unwrap();
//! doc.set_metrics(panel, NodeMetrics { width: 320.0, height: 168.0, offset_top: 238.0, ..Default::default() });
//!
//! assert_eq!(doc.query_class("js-stick-at-top-when-scrolling"), vec![panel]);
//! ```

pub mod document;
pub mod events;
pub mod node;

pub use document::Document;
pub use events::ListenerId;
pub use node::{Node, NodeId, NodeMetrics, Viewport};

use thiserror::Error;

/// Errors raised by structural document mutations.
///
/// The engine prunes detached elements before mutating around them, so
/// in practice these surface only on host misuse.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomError {
    /// The node id does not refer to a live node.
    #[error("node does not exist in this document")]
    MissingNode,
    /// The operation needs an anchor that is attached to the document.
    #[error("anchor node is detached from the document")]
    DetachedNode,
}
