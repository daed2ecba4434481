//! Edge coordination
//!
//! One coordinator owns all sticky-eligible elements for one viewport
//! edge. Every pass re-syncs the element list against the live
//! document, re-samples geometry, runs dialog aggregation when active,
//! and applies per-element state transitions. Passes are idempotent:
//! recalculating twice with no intervening DOM change leaves identical
//! classes, styles, and shims.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use affix_dom::{Document, DomError};

use crate::config::StickyConfig;
use crate::dialog::{self, DialogLayout};
use crate::edge::Edge;
use crate::geometry::{measure, window_geometry, Measured};
use crate::record::{AppliedClass, Status, StickyElement};
use crate::scheduler::{EventScheduler, Tick};

/// Coordination mode for an edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Elements are positioned independently.
    #[default]
    Default,
    /// Elements form one ordered, fit-constrained stack.
    Dialog,
}

/// Owns and positions the sticky elements of one viewport edge.
pub struct EdgeCoordinator {
    edge: Edge,
    config: StickyConfig,
    elements: Vec<StickyElement>,
    end_of_scroll_area: f32,
    mode: Mode,
    has_initial_positions_been_set: bool,
    scheduler: EventScheduler,
}

impl EdgeCoordinator {
    pub fn new(edge: Edge, config: StickyConfig) -> Self {
        Self {
            edge,
            config,
            elements: Vec::new(),
            end_of_scroll_area: 0.0,
            mode: Mode::Default,
            has_initial_positions_been_set: false,
            scheduler: EventScheduler::new(),
        }
    }

    pub fn edge(&self) -> Edge {
        self.edge
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Current element records, in document order as of the last sync.
    pub fn elements(&self) -> &[StickyElement] {
        &self.elements
    }

    /// Switch coordination mode; takes effect on the next pass.
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Full sync + initial position pass. Elements already past their
    /// threshold get the onload marker class (no animation).
    pub fn init(&mut self, doc: &mut Document) -> Result<(), DomError> {
        self.recalculate(doc)
    }

    /// Re-derive everything from the current document: sync the
    /// element list, re-measure, recompute the travel limit, and apply
    /// state transitions. External code that mutates page content in a
    /// way that can affect sticky layout must call this afterward.
    pub fn recalculate(&mut self, doc: &mut Document) -> Result<(), DomError> {
        self.sync_elements(doc);
        self.measure_elements(doc);
        self.end_of_scroll_area = self.edge.end_of_scroll_area(doc, &self.config);
        self.position_elements(doc)
    }

    /// Position-only pass against the current scroll offset, reusing
    /// cached measurements. This is the scroll-tick path.
    pub fn reposition(&mut self, doc: &mut Document) -> Result<(), DomError> {
        self.position_elements(doc)
    }

    /// Consume the scheduler's pending flags and run the pass they
    /// call for. The host drives this at `config.poll_interval`.
    pub fn tick(&mut self, doc: &mut Document) -> Result<(), DomError> {
        match self.scheduler.take_tick() {
            Tick::Idle => Ok(()),
            Tick::Scroll => self.reposition(doc),
            Tick::Resize => self.recalculate(doc),
        }
    }

    /// Teardown: remove event listeners and drop pending work.
    pub fn clear_events(&mut self, doc: &mut Document) {
        self.scheduler.clear_events(doc);
    }

    /// Rebuild the element list in document order: newly matching
    /// nodes get fresh records, detached nodes are pruned silently
    /// (their shims removed with them).
    fn sync_elements(&mut self, doc: &mut Document) {
        let nodes = doc.query_class(self.edge.selector_class());
        let mut old = std::mem::take(&mut self.elements);
        let mut next = Vec::with_capacity(nodes.len());
        for node in nodes {
            if let Some(index) = old.iter().position(|el| el.node == node) {
                next.push(old.swap_remove(index));
            } else {
                tracing::debug!(?node, edge = ?self.edge, "tracking new sticky element");
                next.push(StickyElement::new(node));
            }
        }
        let edge = self.edge;
        for mut el in old {
            tracing::debug!(node = ?el.node, ?edge, "pruning detached sticky element");
            el.release(doc, edge);
        }
        self.elements = next;
    }

    /// Re-sample geometry for every element. Nodes whose contained
    /// image has not loaded stay unmeasured (and therefore free); a
    /// load callback arms the scheduler's re-measure flag once.
    fn measure_elements(&mut self, doc: &mut Document) {
        let remeasure = self.scheduler.remeasure_flag();
        for el in &mut self.elements {
            match measure(doc, el.node) {
                Measured::Ready(m) => {
                    el.measurement = m;
                    el.in_page_edge_position = self.edge.in_page_edge_position(&m);
                    el.has_loaded_dimensions = true;
                    el.load_callback_registered = false;
                }
                Measured::Deferred => {
                    el.has_loaded_dimensions = false;
                    if !el.load_callback_registered {
                        let flag = Arc::clone(&remeasure);
                        doc.on_image_load(el.node, move || {
                            flag.store(true, Ordering::SeqCst);
                        });
                        el.load_callback_registered = true;
                    }
                }
            }
        }
    }

    fn position_elements(&mut self, doc: &mut Document) -> Result<(), DomError> {
        if self.elements.is_empty() {
            return Ok(());
        }
        self.scheduler.register(doc);

        let edge = self.edge;
        let win = window_geometry(doc);

        // Sticky behavior is desktop-only; narrow viewports force
        // everything back into flow.
        if win.width < self.config.min_viewport_width {
            for el in &mut self.elements {
                el.release(doc, edge);
            }
            self.has_initial_positions_been_set = true;
            return Ok(());
        }

        for el in &mut self.elements {
            el.can_be_stuck = true;
        }
        let layout = self.aggregate_dialog(doc, win.height);
        // A fit-driven release may have adjusted scroll; re-snapshot.
        let win = window_geometry(doc);

        let class = if self.has_initial_positions_been_set {
            AppliedClass::Scrolled
        } else {
            AppliedClass::OnLoad
        };
        let end = self.end_of_scroll_area;

        for (index, el) in self.elements.iter_mut().enumerate() {
            if !el.can_be_stuck || !el.has_loaded_dimensions {
                el.release(doc, edge);
                continue;
            }
            let offsets = layout
                .as_ref()
                .and_then(|l| l.offsets(index))
                .unwrap_or_default();
            let scrolled_from = layout
                .as_ref()
                .and_then(|l| l.stack_edge_position)
                .unwrap_or(el.in_page_edge_position);
            let stop_position = edge.stop_position(end, el.measurement.height, offsets.end_offset);
            let scrolling_to =
                edge.scrolling_to(stop_position, el.measurement.height, offsets.edge_offset);

            if !edge.scrolled_from_passed(&win, scrolled_from) {
                el.release(doc, edge);
            } else if !edge.scrolling_to_passed(&win, scrolling_to) {
                el.unstop(doc, edge, offsets.edge_offset);
                el.stick(doc, edge, offsets.edge_offset, class)?;
            } else {
                el.stick(doc, edge, offsets.edge_offset, class)?;
                el.stop(doc, edge, stop_position);
            }
        }

        self.mark_group_boundary(doc);
        self.has_initial_positions_been_set = true;
        Ok(())
    }

    /// Run dialog aggregation when active. Members released by fitting
    /// are made ineligible for this pass; if a previously pinned member
    /// was released, scroll jumps so the stack edge lines up with the
    /// viewport edge and the dialog stays usable.
    fn aggregate_dialog(&mut self, doc: &mut Document, viewport_height: f32) -> Option<DialogLayout> {
        if self.mode != Mode::Dialog {
            return None;
        }
        let layout = dialog::compute(
            &self.elements,
            self.edge,
            viewport_height,
            self.config.dialog_gap,
        );
        let mut visible_release = false;
        for &index in &layout.released {
            if self.elements[index].status != Status::Free {
                visible_release = true;
            }
            self.elements[index].can_be_stuck = false;
        }
        if visible_release {
            if let Some(stack_edge) = layout.stack_edge_position {
                let scroll_target = match self.edge {
                    Edge::Top => stack_edge,
                    Edge::Bottom => stack_edge - viewport_height,
                };
                tracing::debug!(
                    scroll_target,
                    "dialog fit released a pinned member; adjusting scroll"
                );
                doc.set_scroll_top(scroll_target);
            }
        }
        Some(layout)
    }

    /// Exactly one stuck element carries the group boundary marker:
    /// the one at the end of the group opposite the sticking edge, so
    /// a visual separator appears only at the stack's outer boundary.
    fn mark_group_boundary(&self, doc: &mut Document) {
        let edge = self.edge;
        let target = self
            .elements
            .iter()
            .enumerate()
            .filter(|(_, el)| el.status != Status::Free)
            .max_by(|(_, a), (_, b)| {
                edge.distance_from_edge(a.in_page_edge_position)
                    .total_cmp(&edge.distance_from_edge(b.in_page_edge_position))
            })
            .map(|(index, _)| index);
        for (index, el) in self.elements.iter().enumerate() {
            if Some(index) == target {
                doc.add_class(el.node, edge.boundary_class());
            } else {
                doc.remove_class(el.node, edge.boundary_class());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css;
    use affix_dom::{NodeId, NodeMetrics};

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("affix_core=trace")
            .with_test_writer()
            .try_init();
    }

    fn el_with_metrics(doc: &mut Document, class: &str, metrics: NodeMetrics) -> NodeId {
        let node = doc.create_element("div");
        doc.add_class(node, class);
        doc.append_child(doc.root(), node).unwrap();
        doc.set_metrics(node, metrics);
        node
    }

    /// Scenario fixture: 940px viewport, one 168px-tall top-sticky at
    /// offset 238, footer top at 1000 (stop padding 10).
    fn top_fixture() -> (Document, EdgeCoordinator, NodeId) {
        let mut doc = Document::new();
        doc.set_viewport_size(1024.0, 940.0);
        let element = el_with_metrics(
            &mut doc,
            css::STICK_AT_TOP_SELECTOR,
            NodeMetrics {
                width: 320.0,
                height: 168.0,
                offset_top: 238.0,
                ..Default::default()
            },
        );
        el_with_metrics(
            &mut doc,
            css::FOOTER_SELECTOR,
            NodeMetrics {
                offset_top: 1000.0,
                height: 80.0,
                ..Default::default()
            },
        );
        let coordinator = EdgeCoordinator::new(Edge::Top, StickyConfig::default());
        (doc, coordinator, element)
    }

    #[test]
    fn top_element_walks_free_stuck_stopped() {
        init_tracing();
        let (mut doc, mut coordinator, element) = top_fixture();
        coordinator.init(&mut doc).unwrap();
        assert_eq!(coordinator.elements()[0].status, Status::Free);
        assert!(doc.classes(element).iter().all(|c| !c.starts_with("content-fixed")));

        doc.set_scroll_top(248.0);
        coordinator.reposition(&mut doc).unwrap();
        assert_eq!(coordinator.elements()[0].status, Status::Stuck);
        assert!(doc.has_class(element, css::FIXED_CLASS));
        assert_eq!(doc.style(element, "top"), Some("0px"));
        assert_eq!(doc.style(element, "width"), Some("320px"));

        doc.set_scroll_top(822.0);
        coordinator.reposition(&mut doc).unwrap();
        assert_eq!(coordinator.elements()[0].status, Status::Stopped);
        assert_eq!(doc.style(element, "position"), Some("absolute"));
        assert_eq!(doc.style(element, "top"), Some("822px"));

        doc.set_scroll_top(100.0);
        coordinator.reposition(&mut doc).unwrap();
        assert_eq!(coordinator.elements()[0].status, Status::Free);
        assert_eq!(doc.style_text(element), "");
    }

    #[test]
    fn stop_position_is_a_monotonic_travel_bound() {
        let (mut doc, mut coordinator, element) = top_fixture();
        coordinator.init(&mut doc).unwrap();
        for scroll in [822.0, 900.0, 1400.0, 2000.0] {
            doc.set_scroll_top(scroll);
            coordinator.reposition(&mut doc).unwrap();
            assert_eq!(coordinator.elements()[0].status, Status::Stopped);
            assert_eq!(doc.style(element, "top"), Some("822px"), "at scroll {scroll}");
        }
    }

    #[test]
    fn recalculate_is_idempotent() {
        let (mut doc, mut coordinator, element) = top_fixture();
        doc.set_scroll_top(248.0);
        coordinator.init(&mut doc).unwrap();
        coordinator.recalculate(&mut doc).unwrap();

        let classes = doc.classes(element).to_vec();
        let styles = doc.style_text(element);
        let shim = coordinator.elements()[0].shim().unwrap();
        let shim_styles = doc.style_text(shim);
        let siblings = doc.children(doc.root()).to_vec();

        coordinator.recalculate(&mut doc).unwrap();
        assert_eq!(doc.classes(element), classes.as_slice());
        assert_eq!(doc.style_text(element), styles);
        assert_eq!(coordinator.elements()[0].shim(), Some(shim));
        assert_eq!(doc.style_text(shim), shim_styles);
        assert_eq!(doc.children(doc.root()), siblings.as_slice());
    }

    #[test]
    fn initial_pass_uses_the_onload_class() {
        let (mut doc, mut coordinator, element) = top_fixture();
        doc.set_scroll_top(248.0);
        coordinator.init(&mut doc).unwrap();
        assert!(doc.has_class(element, css::FIXED_ONLOAD_CLASS));
        assert!(!doc.has_class(element, css::FIXED_CLASS));
    }

    #[test]
    fn bottom_element_walks_stuck_free_stopped() {
        init_tracing();
        // Header bottom edge at 260 => travel limit 270. Short (300px)
        // viewport so the stop threshold is reachable.
        let mut doc = Document::new();
        doc.set_viewport_size(1024.0, 300.0);
        el_with_metrics(
            &mut doc,
            css::HEADER_SELECTOR,
            NodeMetrics {
                offset_top: 200.0,
                height: 60.0,
                ..Default::default()
            },
        );
        let element = el_with_metrics(
            &mut doc,
            css::STICK_AT_BOTTOM_SELECTOR,
            NodeMetrics {
                width: 400.0,
                height: 50.0,
                offset_top: 1110.0, // in-page bottom edge at 1160
                ..Default::default()
            },
        );
        let mut coordinator = EdgeCoordinator::new(Edge::Bottom, StickyConfig::default());

        doc.set_scroll_top(500.0); // window bottom 800 < 1160
        coordinator.init(&mut doc).unwrap();
        assert_eq!(coordinator.elements()[0].status, Status::Stuck);
        assert_eq!(doc.style(element, "bottom"), Some("0px"));
        // Shim sits after the element for the bottom edge.
        let shim = coordinator.elements()[0].shim().unwrap();
        let root_children = doc.children(doc.root()).to_vec();
        let el_index = root_children.iter().position(|&n| n == element).unwrap();
        assert_eq!(root_children[el_index + 1], shim);

        doc.set_scroll_top(860.0); // window bottom 1160: flow position reached
        coordinator.reposition(&mut doc).unwrap();
        assert_eq!(coordinator.elements()[0].status, Status::Free);

        doc.set_scroll_top(10.0); // window bottom 310 <= 320
        coordinator.reposition(&mut doc).unwrap();
        assert_eq!(coordinator.elements()[0].status, Status::Stopped);
        assert_eq!(doc.style(element, "position"), Some("absolute"));
        assert_eq!(doc.style(element, "top"), Some("270px"));
        assert_eq!(doc.style(element, "bottom"), None);
    }

    #[test]
    fn narrow_viewport_forces_everything_free() {
        let (mut doc, mut coordinator, element) = top_fixture();
        doc.set_scroll_top(400.0);
        coordinator.init(&mut doc).unwrap();
        assert_eq!(coordinator.elements()[0].status, Status::Stuck);

        doc.set_viewport_size(500.0, 940.0);
        coordinator.recalculate(&mut doc).unwrap();
        assert_eq!(coordinator.elements()[0].status, Status::Free);
        assert!(coordinator.elements()[0].shim().is_none());
        assert_eq!(doc.style_text(element), "");
        assert!(!doc.has_class(element, css::FIXED_ONLOAD_CLASS));
        assert!(!doc.has_class(element, css::FIXED_CLASS));
    }

    #[test]
    fn detached_elements_are_pruned_with_their_shims() {
        let (mut doc, mut coordinator, element) = top_fixture();
        doc.set_scroll_top(400.0);
        coordinator.init(&mut doc).unwrap();
        let shim = coordinator.elements()[0].shim().unwrap();
        assert!(doc.is_attached(shim));

        doc.remove(element);
        coordinator.recalculate(&mut doc).unwrap();
        assert!(coordinator.elements().is_empty());
        assert!(!doc.is_attached(shim));
    }

    #[test]
    fn missing_landmark_degenerates_to_immediate_stop() {
        // Travel limit defaults to 0 without a footer, so a scrolled
        // top-sticky stops at once (at a negative position). Preserved
        // source behavior.
        let mut doc = Document::new();
        doc.set_viewport_size(1024.0, 940.0);
        let element = el_with_metrics(
            &mut doc,
            css::STICK_AT_TOP_SELECTOR,
            NodeMetrics {
                width: 320.0,
                height: 168.0,
                offset_top: 238.0,
                ..Default::default()
            },
        );
        let mut coordinator = EdgeCoordinator::new(Edge::Top, StickyConfig::default());
        doc.set_scroll_top(248.0);
        coordinator.init(&mut doc).unwrap();
        assert_eq!(coordinator.elements()[0].status, Status::Stopped);
        assert_eq!(doc.style(element, "top"), Some("-168px"));
    }

    #[test]
    fn deferred_image_measurement_keeps_element_free_until_load() {
        let (mut doc, mut coordinator, element) = top_fixture();
        doc.set_image_pending(element, true);
        doc.set_scroll_top(400.0);
        coordinator.init(&mut doc).unwrap();
        assert_eq!(coordinator.elements()[0].status, Status::Free);
        assert!(!coordinator.elements()[0].has_loaded_dimensions);

        // The load signal arms the re-measure flag; the next tick runs
        // a full recalculation and the element can finally stick.
        doc.complete_image_load(element);
        coordinator.tick(&mut doc).unwrap();
        assert!(coordinator.elements()[0].has_loaded_dimensions);
        assert_eq!(coordinator.elements()[0].status, Status::Stuck);
    }

    #[test]
    fn boundary_marker_sits_on_the_outer_stuck_element() {
        // Two independent top-stickies, both stuck; only the lower one
        // carries the group-bottom marker.
        let mut doc = Document::new();
        doc.set_viewport_size(1024.0, 940.0);
        let upper = el_with_metrics(
            &mut doc,
            css::STICK_AT_TOP_SELECTOR,
            NodeMetrics {
                width: 300.0,
                height: 40.0,
                offset_top: 100.0,
                ..Default::default()
            },
        );
        let lower = el_with_metrics(
            &mut doc,
            css::STICK_AT_TOP_SELECTOR,
            NodeMetrics {
                width: 300.0,
                height: 40.0,
                offset_top: 200.0,
                ..Default::default()
            },
        );
        el_with_metrics(
            &mut doc,
            css::FOOTER_SELECTOR,
            NodeMetrics {
                offset_top: 5000.0,
                ..Default::default()
            },
        );
        let mut coordinator = EdgeCoordinator::new(Edge::Top, StickyConfig::default());
        doc.set_scroll_top(300.0);
        coordinator.init(&mut doc).unwrap();

        assert_eq!(coordinator.elements()[0].status, Status::Stuck);
        assert_eq!(coordinator.elements()[1].status, Status::Stuck);
        assert!(!doc.has_class(upper, css::GROUP_BOTTOM_CLASS));
        assert!(doc.has_class(lower, css::GROUP_BOTTOM_CLASS));

        // Scrolling back releases the group and the marker goes away.
        doc.set_scroll_top(0.0);
        coordinator.reposition(&mut doc).unwrap();
        assert!(!doc.has_class(lower, css::GROUP_BOTTOM_CLASS));
    }

    fn dialog_fixture(viewport_height: f32) -> (Document, EdgeCoordinator, [NodeId; 3]) {
        let mut doc = Document::new();
        doc.set_viewport_size(1024.0, viewport_height);
        let heights = [300.0, 400.0, 500.0];
        let offsets = [100.0, 420.0, 840.0];
        let mut nodes = [NodeId::default(); 3];
        for i in 0..3 {
            nodes[i] = el_with_metrics(
                &mut doc,
                css::STICK_AT_TOP_SELECTOR,
                NodeMetrics {
                    width: 600.0,
                    height: heights[i],
                    offset_top: offsets[i],
                    ..Default::default()
                },
            );
        }
        el_with_metrics(
            &mut doc,
            css::FOOTER_SELECTOR,
            NodeMetrics {
                offset_top: 5000.0,
                ..Default::default()
            },
        );
        let mut coordinator = EdgeCoordinator::new(Edge::Top, StickyConfig::default());
        coordinator.set_mode(Mode::Dialog);
        (doc, coordinator, nodes)
    }

    #[test]
    fn dialog_fit_releases_furthest_member() {
        init_tracing();
        let (mut doc, mut coordinator, nodes) = dialog_fixture(900.0);
        doc.set_scroll_top(150.0);
        coordinator.init(&mut doc).unwrap();

        // 300 + 400 + 500 exceeds 900; the furthest member goes free.
        assert_eq!(coordinator.elements()[2].status, Status::Free);
        assert!(!coordinator.elements()[2].can_be_stuck);
        assert_eq!(coordinator.elements()[0].status, Status::Stuck);
        assert_eq!(coordinator.elements()[1].status, Status::Stuck);

        // Stacked offsets: nearest at the edge, next after its height
        // plus the dialog gap.
        assert_eq!(doc.style(nodes[0], "top"), Some("0px"));
        assert_eq!(doc.style(nodes[1], "top"), Some("320px"));

        // Boundary marker sits on the trailing stuck member only.
        assert!(doc.has_class(nodes[1], css::GROUP_BOTTOM_CLASS));
        assert!(!doc.has_class(nodes[0], css::GROUP_BOTTOM_CLASS));
        assert!(!doc.has_class(nodes[2], css::GROUP_BOTTOM_CLASS));
    }

    #[test]
    fn dialog_members_share_the_stack_threshold() {
        let (mut doc, mut coordinator, _nodes) = dialog_fixture(900.0);
        // Below the stack's in-page edge (100) everything stays free.
        doc.set_scroll_top(50.0);
        coordinator.init(&mut doc).unwrap();
        for el in coordinator.elements() {
            assert_eq!(el.status, Status::Free);
        }

        // At the stack edge, all kept members pin together even though
        // the later members' own offsets are further down the page.
        doc.set_scroll_top(100.0);
        coordinator.reposition(&mut doc).unwrap();
        assert_eq!(coordinator.elements()[0].status, Status::Stuck);
        assert_eq!(coordinator.elements()[1].status, Status::Stuck);
    }

    #[test]
    fn shrinking_viewport_releases_pinned_member_and_adjusts_scroll() {
        // All three fit a 1300px viewport and pin. Shrinking to 900
        // releases the furthest (pinned) member, which jumps scroll to
        // the stack edge.
        let (mut doc, mut coordinator, _nodes) = dialog_fixture(1300.0);
        doc.set_scroll_top(150.0);
        coordinator.init(&mut doc).unwrap();
        for el in coordinator.elements() {
            assert_eq!(el.status, Status::Stuck);
        }

        doc.set_viewport_size(1024.0, 900.0);
        coordinator.recalculate(&mut doc).unwrap();
        assert_eq!(coordinator.elements()[2].status, Status::Free);
        assert_eq!(doc.viewport().scroll_top, 100.0);
    }
}
