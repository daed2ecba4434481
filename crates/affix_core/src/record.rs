//! Per-element sticky state
//!
//! Each candidate element gets one record per edge, holding its state
//! machine, cached geometry, and shim bookkeeping. All mutation
//! methods are idempotent; a recalculation pass can re-apply the same
//! target state without observable churn.

use affix_dom::{Document, DomError, NodeId};

use crate::css::{self, px};
use crate::edge::Edge;
use crate::geometry::Measurement;

/// Sticky lifecycle state.
///
/// `Stopped` is stuck-plus-pinned: the marker class stays on and an
/// inline absolute position is layered over it, so the element
/// detaches from the viewport edge and stays put in the page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// In normal document flow; no shim, no marker classes.
    Free,
    /// Out of flow, pinned to the viewport edge; shim holds its space.
    Stuck,
    /// Out of flow, pinned to an absolute document position at the end
    /// of its travel allowance.
    Stopped,
}

/// Which marker class got applied when the element became sticky.
///
/// Elements already past their threshold on the initial pass get the
/// onload variant so the stylesheet skips the transition animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppliedClass {
    OnLoad,
    Scrolled,
}

impl AppliedClass {
    pub fn class_name(self) -> &'static str {
        match self {
            AppliedClass::OnLoad => css::FIXED_ONLOAD_CLASS,
            AppliedClass::Scrolled => css::FIXED_CLASS,
        }
    }
}

/// State record for one sticky-eligible element on one edge.
#[derive(Debug)]
pub struct StickyElement {
    pub node: NodeId,
    pub status: Status,
    applied_class: Option<AppliedClass>,
    pub measurement: Measurement,
    /// Document-relative position of the element's relevant edge when
    /// laid out in flow; refreshed on every measurement pass.
    pub in_page_edge_position: f32,
    shim: Option<NodeId>,
    /// Cleared by dialog-mode fitting when this member must be
    /// released for the stack to fit the viewport.
    pub can_be_stuck: bool,
    /// True once initial measurement (including any contained image
    /// load) has completed; unmeasured elements never leave `Free`.
    pub has_loaded_dimensions: bool,
    /// Guards the image-load callback against duplicate registration.
    pub load_callback_registered: bool,
}

impl StickyElement {
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            status: Status::Free,
            applied_class: None,
            measurement: Measurement::default(),
            in_page_edge_position: 0.0,
            shim: None,
            can_be_stuck: true,
            has_loaded_dimensions: false,
            load_callback_registered: false,
        }
    }

    pub fn shim(&self) -> Option<NodeId> {
        self.shim
    }

    pub fn applied_class(&self) -> Option<AppliedClass> {
        self.applied_class
    }

    /// Pin the element to the viewport edge, `offset` pixels in from
    /// it. Inserts the shim and marker class on the Free -> Stuck
    /// transition; on later passes only the pin and width styles are
    /// refreshed.
    pub fn stick(
        &mut self,
        doc: &mut Document,
        edge: Edge,
        offset: f32,
        class: AppliedClass,
    ) -> Result<(), DomError> {
        if self.status == Status::Free {
            let shim = doc.create_element("div");
            doc.add_class(shim, css::SHIM_CLASS);
            edge.insert_shim(doc, self.node, shim)?;
            self.shim = Some(shim);
            doc.add_class(self.node, class.class_name());
            self.applied_class = Some(class);
            self.status = Status::Stuck;
            tracing::debug!(node = ?self.node, ?edge, offset, "element stuck");
        }
        doc.set_style(self.node, edge.pin_property(), &px(offset));
        doc.set_style(self.node, "width", &px(self.measurement.horizontal_space));
        self.sync_shim(doc);
        Ok(())
    }

    /// Pin a stuck element to an absolute document position; the
    /// marker class stays on.
    pub fn stop(&mut self, doc: &mut Document, edge: Edge, position: f32) {
        debug_assert_ne!(self.status, Status::Free, "only stuck elements stop");
        doc.set_style(self.node, "position", "absolute");
        doc.set_style(self.node, "top", &px(position));
        if edge == Edge::Bottom {
            doc.remove_style(self.node, "bottom");
        }
        if self.status != Status::Stopped {
            tracing::debug!(node = ?self.node, ?edge, position, "element stopped");
        }
        self.status = Status::Stopped;
    }

    /// Undo a stop, returning the element to the viewport-edge pin.
    pub fn unstop(&mut self, doc: &mut Document, edge: Edge, offset: f32) {
        if self.status != Status::Stopped {
            return;
        }
        doc.remove_style(self.node, "position");
        if edge == Edge::Bottom {
            doc.remove_style(self.node, "top");
        }
        doc.set_style(self.node, edge.pin_property(), &px(offset));
        self.status = Status::Stuck;
        tracing::debug!(node = ?self.node, ?edge, "element unstopped");
    }

    /// Return the element to normal flow: shim out, marker and
    /// boundary classes off, inline styles cleared.
    pub fn release(&mut self, doc: &mut Document, edge: Edge) {
        if let Some(shim) = self.shim.take() {
            doc.remove(shim);
        }
        if let Some(class) = self.applied_class.take() {
            doc.remove_class(self.node, class.class_name());
        }
        doc.remove_class(self.node, edge.boundary_class());
        for property in ["position", "top", "bottom", "width"] {
            doc.remove_style(self.node, property);
        }
        if self.status != Status::Free {
            tracing::debug!(node = ?self.node, ?edge, "element released");
        }
        self.status = Status::Free;
    }

    /// Keep the shim sized to the element's cached measurement so the
    /// vacated flow space stays accurate.
    pub fn sync_shim(&self, doc: &mut Document) {
        let Some(shim) = self.shim else {
            return;
        };
        doc.set_style(shim, "width", &px(self.measurement.horizontal_space));
        doc.set_style(shim, "height", &px(self.measurement.height));
        doc.set_style(shim, "margin-top", &px(self.measurement.margin_top));
        doc.set_style(shim, "margin-bottom", &px(self.measurement.margin_bottom));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use affix_dom::NodeMetrics;
    use crate::geometry::{measure, Measured};

    fn fixture() -> (Document, StickyElement) {
        let mut doc = Document::new();
        let node = doc.create_element("div");
        doc.append_child(doc.root(), node).unwrap();
        doc.set_metrics(
            node,
            NodeMetrics {
                width: 320.0,
                height: 168.0,
                offset_top: 238.0,
                margin_top: 5.0,
                margin_bottom: 15.0,
            },
        );
        let mut el = StickyElement::new(node);
        let Measured::Ready(m) = measure(&doc, node) else {
            panic!("fixture node should measure");
        };
        el.measurement = m;
        el.has_loaded_dimensions = true;
        (doc, el)
    }

    #[test]
    fn shim_exists_iff_not_free() {
        let (mut doc, mut el) = fixture();
        assert_eq!(el.status, Status::Free);
        assert!(el.shim().is_none());

        el.stick(&mut doc, Edge::Top, 0.0, AppliedClass::Scrolled)
            .unwrap();
        let shim = el.shim().expect("stuck element must have a shim");
        assert!(doc.has_class(shim, css::SHIM_CLASS));
        // Shim sits where the element's flow space was: before it for
        // the top edge.
        assert_eq!(doc.children(doc.root()), &[shim, el.node]);
        assert_eq!(doc.style(shim, "height"), Some("168px"));
        assert_eq!(doc.style(shim, "width"), Some("320px"));
        assert_eq!(doc.style(shim, "margin-top"), Some("5px"));
        assert_eq!(doc.style(shim, "margin-bottom"), Some("15px"));

        el.release(&mut doc, Edge::Top);
        assert_eq!(el.status, Status::Free);
        assert!(el.shim().is_none());
        assert!(!doc.is_attached(shim));
    }

    #[test]
    fn bottom_edge_shim_goes_after_the_element() {
        let (mut doc, mut el) = fixture();
        el.stick(&mut doc, Edge::Bottom, 0.0, AppliedClass::Scrolled)
            .unwrap();
        let shim = el.shim().unwrap();
        assert_eq!(doc.children(doc.root()), &[el.node, shim]);
        assert_eq!(doc.style(el.node, "bottom"), Some("0px"));
    }

    #[test]
    fn stop_layers_absolute_position_over_stuck() {
        let (mut doc, mut el) = fixture();
        el.stick(&mut doc, Edge::Top, 0.0, AppliedClass::Scrolled)
            .unwrap();
        el.stop(&mut doc, Edge::Top, 822.0);

        assert_eq!(el.status, Status::Stopped);
        assert!(doc.has_class(el.node, css::FIXED_CLASS));
        assert_eq!(doc.style(el.node, "position"), Some("absolute"));
        assert_eq!(doc.style(el.node, "top"), Some("822px"));

        el.unstop(&mut doc, Edge::Top, 0.0);
        assert_eq!(el.status, Status::Stuck);
        assert_eq!(doc.style(el.node, "position"), None);
        assert_eq!(doc.style(el.node, "top"), Some("0px"));
    }

    #[test]
    fn release_clears_marker_classes_and_styles() {
        let (mut doc, mut el) = fixture();
        el.stick(&mut doc, Edge::Top, 0.0, AppliedClass::OnLoad)
            .unwrap();
        assert!(doc.has_class(el.node, css::FIXED_ONLOAD_CLASS));
        doc.add_class(el.node, Edge::Top.boundary_class());

        el.release(&mut doc, Edge::Top);
        assert!(!doc.has_class(el.node, css::FIXED_ONLOAD_CLASS));
        assert!(!doc.has_class(el.node, Edge::Top.boundary_class()));
        assert_eq!(doc.style_text(el.node), "");
    }

    #[test]
    fn stick_is_idempotent() {
        let (mut doc, mut el) = fixture();
        el.stick(&mut doc, Edge::Top, 0.0, AppliedClass::Scrolled)
            .unwrap();
        let classes = doc.classes(el.node).to_vec();
        let styles = doc.style_text(el.node);
        let children = doc.children(doc.root()).to_vec();

        el.stick(&mut doc, Edge::Top, 0.0, AppliedClass::Scrolled)
            .unwrap();
        assert_eq!(doc.classes(el.node), classes.as_slice());
        assert_eq!(doc.style_text(el.node), styles);
        assert_eq!(doc.children(doc.root()), children.as_slice());
    }
}
