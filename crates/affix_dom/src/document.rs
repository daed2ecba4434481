//! The in-memory document: tree structure, class/style mutation,
//! geometry, viewport, and event wiring

use slotmap::SlotMap;

use crate::events::{EventRegistry, ListenerId};
use crate::node::{Node, NodeId, NodeMetrics, Viewport};
use crate::DomError;

/// A headless document.
///
/// Holds an arena of nodes rooted at a synthetic `body` element, the
/// viewport state, and the listener registries. All mutation happens
/// through `&mut self`, so engine passes are serialized the same way
/// browser main-thread work is.
pub struct Document {
    nodes: SlotMap<NodeId, Node>,
    root: NodeId,
    viewport: Viewport,
    events: EventRegistry,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new("body"));
        Self {
            nodes,
            root,
            viewport: Viewport::default(),
            events: EventRegistry::default(),
        }
    }

    /// The synthetic root element; always attached.
    pub fn root(&self) -> NodeId {
        self.root
    }

    // ========================================================================
    // Structure
    // ========================================================================

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.nodes.insert(Node::new(tag))
    }

    /// True if the node is live and reachable from the root.
    pub fn is_attached(&self, node: NodeId) -> bool {
        let mut current = node;
        loop {
            if current == self.root {
                return true;
            }
            match self.nodes.get(current).and_then(|n| n.parent) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Append `child` as the last child of `parent`, detaching it from
    /// any previous parent first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        if !self.nodes.contains_key(parent) || !self.nodes.contains_key(child) {
            return Err(DomError::MissingNode);
        }
        self.detach(child);
        self.nodes[parent].children.push(child);
        self.nodes[child].parent = Some(parent);
        Ok(())
    }

    /// Insert `node` as the previous sibling of `anchor`.
    pub fn insert_before(&mut self, anchor: NodeId, node: NodeId) -> Result<(), DomError> {
        self.insert_adjacent(anchor, node, 0)
    }

    /// Insert `node` as the next sibling of `anchor`.
    pub fn insert_after(&mut self, anchor: NodeId, node: NodeId) -> Result<(), DomError> {
        self.insert_adjacent(anchor, node, 1)
    }

    fn insert_adjacent(
        &mut self,
        anchor: NodeId,
        node: NodeId,
        offset: usize,
    ) -> Result<(), DomError> {
        if !self.nodes.contains_key(anchor) || !self.nodes.contains_key(node) {
            return Err(DomError::MissingNode);
        }
        let parent = self.nodes[anchor].parent.ok_or(DomError::DetachedNode)?;
        self.detach(node);
        // Anchor index is looked up after the detach in case both share
        // a parent.
        let index = self.nodes[parent]
            .children
            .iter()
            .position(|&c| c == anchor)
            .ok_or(DomError::DetachedNode)?;
        self.nodes[parent].children.insert(index + offset, node);
        self.nodes[node].parent = Some(parent);
        Ok(())
    }

    /// Detach a node (and its subtree) from the document. The node
    /// stays live and can be re-inserted.
    pub fn remove(&mut self, node: NodeId) {
        self.detach(node);
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get(node).and_then(|n| n.parent) else {
            return;
        };
        self.nodes[parent].children.retain(|&c| c != node);
        self.nodes[node].parent = None;
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node).map(|n| n.tag.as_str())
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes.get(node).map_or(&[], |n| n.children.as_slice())
    }

    // ========================================================================
    // Classes
    // ========================================================================

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(data) = self.nodes.get_mut(node) {
            if !data.classes.iter().any(|c| c == class) {
                data.classes.push(class.to_string());
            }
        }
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(data) = self.nodes.get_mut(node) {
            data.classes.retain(|c| c != class);
        }
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes
            .get(node)
            .is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    pub fn classes(&self, node: NodeId) -> &[String] {
        self.nodes.get(node).map_or(&[], |n| n.classes.as_slice())
    }

    /// All attached nodes carrying `class`, in document (pre-order)
    /// order.
    pub fn query_class(&self, class: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack = vec![self.root];
        while let Some(node) = stack.pop() {
            if self.has_class(node, class) {
                found.push(node);
            }
            for &child in self.nodes[node].children.iter().rev() {
                stack.push(child);
            }
        }
        found
    }

    /// First attached node carrying `class`, if any.
    pub fn query_class_first(&self, class: &str) -> Option<NodeId> {
        self.query_class(class).into_iter().next()
    }

    // ========================================================================
    // Inline styles
    // ========================================================================

    pub fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(data) = self.nodes.get_mut(node) {
            data.styles.insert(property.to_string(), value.to_string());
        }
    }

    pub fn remove_style(&mut self, node: NodeId, property: &str) {
        if let Some(data) = self.nodes.get_mut(node) {
            data.styles.shift_remove(property);
        }
    }

    pub fn clear_styles(&mut self, node: NodeId) {
        if let Some(data) = self.nodes.get_mut(node) {
            data.styles.clear();
        }
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.nodes
            .get(node)
            .and_then(|n| n.styles.get(property))
            .map(String::as_str)
    }

    /// Inline styles serialized in insertion order, for test
    /// comparisons.
    pub fn style_text(&self, node: NodeId) -> String {
        self.nodes.get(node).map_or_else(String::new, |n| {
            n.styles
                .iter()
                .map(|(k, v)| format!("{k}: {v}"))
                .collect::<Vec<_>>()
                .join("; ")
        })
    }

    // ========================================================================
    // Geometry and viewport
    // ========================================================================

    pub fn metrics(&self, node: NodeId) -> Option<NodeMetrics> {
        self.nodes.get(node).map(|n| n.metrics)
    }

    pub fn set_metrics(&mut self, node: NodeId, metrics: NodeMetrics) {
        if let Some(data) = self.nodes.get_mut(node) {
            data.metrics = metrics;
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Resize the viewport; fires resize listeners when the size
    /// changes.
    pub fn set_viewport_size(&mut self, width: f32, height: f32) {
        if (self.viewport.width, self.viewport.height) == (width, height) {
            return;
        }
        self.viewport.width = width;
        self.viewport.height = height;
        self.events.fire_resize();
    }

    /// Set the vertical scroll offset (clamped at 0); fires scroll
    /// listeners when it changes.
    pub fn set_scroll_top(&mut self, scroll_top: f32) {
        let clamped = scroll_top.max(0.0);
        if (self.viewport.scroll_top - clamped).abs() < f32::EPSILON {
            return;
        }
        self.viewport.scroll_top = clamped;
        self.events.fire_scroll();
    }

    /// Adjust the scroll offset by a delta. Used by the engine's
    /// dialog-fit scroll jump as well as by hosts.
    pub fn scroll_by(&mut self, delta: f32) {
        self.set_scroll_top(self.viewport.scroll_top + delta);
    }

    // ========================================================================
    // Events
    // ========================================================================

    pub fn add_scroll_listener(
        &mut self,
        callback: impl Fn() + Send + Sync + 'static,
    ) -> ListenerId {
        self.events.add_scroll(Box::new(callback))
    }

    pub fn add_resize_listener(
        &mut self,
        callback: impl Fn() + Send + Sync + 'static,
    ) -> ListenerId {
        self.events.add_resize(Box::new(callback))
    }

    pub fn remove_scroll_listener(&mut self, id: ListenerId) -> bool {
        self.events.remove_scroll(id)
    }

    pub fn remove_resize_listener(&mut self, id: ListenerId) -> bool {
        self.events.remove_resize(id)
    }

    // ========================================================================
    // Image loading
    // ========================================================================

    /// True while the node contains an image whose dimensions are not
    /// yet known, making its height unmeasurable.
    pub fn image_pending(&self, node: NodeId) -> bool {
        self.nodes.get(node).is_some_and(|n| n.image_pending)
    }

    pub fn set_image_pending(&mut self, node: NodeId, pending: bool) {
        if let Some(data) = self.nodes.get_mut(node) {
            data.image_pending = pending;
        }
    }

    /// Register a callback for when the node's image finishes loading.
    pub fn on_image_load(&mut self, node: NodeId, callback: impl Fn() + Send + Sync + 'static) {
        self.events.add_image_load(node, Box::new(callback));
    }

    /// Signal that the node's image has loaded: clears the pending
    /// flag and drains that node's load callbacks.
    pub fn complete_image_load(&mut self, node: NodeId) {
        if let Some(data) = self.nodes.get_mut(node) {
            data.image_pending = false;
        }
        self.events.fire_image_load(node);
    }
}
