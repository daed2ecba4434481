//! Event scheduling
//!
//! Raw scroll/resize events only set pending flags; recomputation
//! happens when the host polls at a fixed interval. This bounds the
//! cost of event storms: however many events arrive between polls, the
//! next tick does one pass.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use affix_dom::{Document, ListenerId};

/// What a poll tick found pending.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    /// Nothing pending.
    Idle,
    /// Scroll happened; positions need recomputing against current
    /// scroll, cached measurements stay valid.
    Scroll,
    /// Resize happened (or a deferred measurement became available);
    /// everything needs re-measuring before positions are recomputed.
    Resize,
}

/// Pending-flag scheduler for one edge coordinator.
pub struct EventScheduler {
    scroll_pending: Arc<AtomicBool>,
    resize_pending: Arc<AtomicBool>,
    /// Armed by image-load callbacks when a deferred measurement
    /// becomes available.
    remeasure_pending: Arc<AtomicBool>,
    scroll_listener: Option<ListenerId>,
    resize_listener: Option<ListenerId>,
}

impl Default for EventScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl EventScheduler {
    pub fn new() -> Self {
        Self {
            scroll_pending: Arc::new(AtomicBool::new(false)),
            resize_pending: Arc::new(AtomicBool::new(false)),
            remeasure_pending: Arc::new(AtomicBool::new(false)),
            scroll_listener: None,
            resize_listener: None,
        }
    }

    /// Install the scroll and resize listeners. Guarded: repeated
    /// calls install nothing further.
    pub fn register(&mut self, doc: &mut Document) {
        if self.scroll_listener.is_some() {
            return;
        }
        let scroll = Arc::clone(&self.scroll_pending);
        self.scroll_listener = Some(doc.add_scroll_listener(move || {
            scroll.store(true, Ordering::SeqCst);
        }));
        let resize = Arc::clone(&self.resize_pending);
        self.resize_listener = Some(doc.add_resize_listener(move || {
            resize.store(true, Ordering::SeqCst);
        }));
    }

    pub fn is_registered(&self) -> bool {
        self.scroll_listener.is_some()
    }

    /// Remove the listeners and drop any pending work. For teardown
    /// and test harnesses; normal operation never needs this.
    pub fn clear_events(&mut self, doc: &mut Document) {
        if let Some(id) = self.scroll_listener.take() {
            doc.remove_scroll_listener(id);
        }
        if let Some(id) = self.resize_listener.take() {
            doc.remove_resize_listener(id);
        }
        self.scroll_pending.store(false, Ordering::SeqCst);
        self.resize_pending.store(false, Ordering::SeqCst);
        self.remeasure_pending.store(false, Ordering::SeqCst);
    }

    /// Flag handle for image-load callbacks to arm a re-measure.
    pub fn remeasure_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.remeasure_pending)
    }

    /// Consume the pending flags and report what this tick should do.
    /// A resize (or pending re-measure) supersedes a scroll, since the
    /// full pass recomputes positions anyway.
    pub fn take_tick(&self) -> Tick {
        let resize = self.resize_pending.swap(false, Ordering::SeqCst);
        let remeasure = self.remeasure_pending.swap(false, Ordering::SeqCst);
        let scroll = self.scroll_pending.swap(false, Ordering::SeqCst);
        if resize || remeasure {
            Tick::Resize
        } else if scroll {
            Tick::Scroll
        } else {
            Tick::Idle
        }
    }
}
