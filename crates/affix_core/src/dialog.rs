//! Dialog-mode aggregation
//!
//! In dialog mode an edge's elements behave as one ordered stack: each
//! member pins a cumulative distance in from the viewport edge, and the
//! stack as a whole must fit the viewport height. The layout computed
//! here is transient; the coordinator rebuilds it every pass.

use crate::edge::Edge;
use crate::record::StickyElement;

/// Per-member stacking offsets, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MemberOffsets {
    /// Distance from the sticking edge: the heights (plus gaps) of the
    /// members between this one and the viewport edge.
    pub edge_offset: f32,
    /// Space occupied by members beyond this one, toward the travel
    /// landmark; folds into the stop position.
    pub end_offset: f32,
}

/// Result of one dialog-mode aggregation pass.
#[derive(Debug, Default)]
pub struct DialogLayout {
    /// Parallel to the coordinator's element list; `None` for members
    /// that are unmeasured or were released to make the stack fit.
    offsets: Vec<Option<MemberOffsets>>,
    /// In-page edge position of the whole stack (the nearest kept
    /// member's edge); every member's `scrolled_from` in dialog mode.
    pub stack_edge_position: Option<f32>,
    /// Indices released by fitting, furthest from the edge first.
    pub released: Vec<usize>,
    /// Visual height of the kept stack: member heights plus the gaps
    /// between them.
    pub total_height: f32,
    /// Kept member at the sticking edge.
    pub leading: Option<usize>,
    /// Kept member at the opposite end of the stack.
    pub trailing: Option<usize>,
}

impl DialogLayout {
    pub fn offsets(&self, index: usize) -> Option<MemberOffsets> {
        self.offsets.get(index).copied().flatten()
    }
}

/// Aggregate an edge's elements into a stacked dialog layout.
///
/// Fitting releases whole members, never partial ones, walking from
/// the member furthest from the sticking edge inward until the sum of
/// the remaining heights fits the viewport. Ordering is by distance
/// from the sticking edge, independent of document order.
pub fn compute(
    elements: &[StickyElement],
    edge: Edge,
    viewport_height: f32,
    gap: f32,
) -> DialogLayout {
    let mut layout = DialogLayout {
        offsets: vec![None; elements.len()],
        ..Default::default()
    };

    let mut kept: Vec<usize> = (0..elements.len())
        .filter(|&i| elements[i].has_loaded_dimensions)
        .collect();
    kept.sort_by(|&a, &b| {
        let da = edge.distance_from_edge(elements[a].in_page_edge_position);
        let db = edge.distance_from_edge(elements[b].in_page_edge_position);
        da.total_cmp(&db)
    });

    let mut stacked_height: f32 = kept.iter().map(|&i| elements[i].measurement.height).sum();
    while let Some(&furthest) = kept.last() {
        if stacked_height <= viewport_height {
            break;
        }
        stacked_height -= elements[furthest].measurement.height;
        kept.pop();
        layout.released.push(furthest);
        tracing::debug!(
            index = furthest,
            viewport_height,
            "dialog stack too tall; releasing furthest member"
        );
    }

    if kept.is_empty() {
        return layout;
    }

    let mut edge_offset = 0.0;
    for &index in &kept {
        layout.offsets[index] = Some(MemberOffsets {
            edge_offset,
            ..Default::default()
        });
        edge_offset += elements[index].measurement.height + gap;
    }
    let mut end_offset = 0.0;
    for &index in kept.iter().rev() {
        if let Some(offsets) = layout.offsets[index].as_mut() {
            offsets.end_offset = end_offset;
        }
        end_offset += elements[index].measurement.height + gap;
    }

    layout.leading = kept.first().copied();
    layout.trailing = kept.last().copied();
    layout.stack_edge_position = Some(elements[kept[0]].in_page_edge_position);
    layout.total_height = stacked_height + gap * (kept.len() - 1) as f32;
    layout
}
