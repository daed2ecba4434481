//! Listener registries for scroll, resize, and image-load signals
//!
//! Listeners are plain callbacks with no document access; the engine's
//! scheduler uses them to set shared pending flags which a poll tick
//! later consumes. They fire synchronously from the document mutation
//! that triggers them.

use rustc_hash::FxHashMap;

use crate::node::NodeId;

/// Handle returned by listener registration, used for removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Callback = Box<dyn Fn() + Send + Sync>;

/// Registry of scroll/resize listeners plus per-node image-load
/// callbacks.
#[derive(Default)]
pub struct EventRegistry {
    next_id: u64,
    scroll: FxHashMap<ListenerId, Callback>,
    resize: FxHashMap<ListenerId, Callback>,
    image_load: FxHashMap<NodeId, Vec<Callback>>,
}

impl EventRegistry {
    fn next(&mut self) -> ListenerId {
        self.next_id += 1;
        ListenerId(self.next_id)
    }

    pub fn add_scroll(&mut self, callback: Callback) -> ListenerId {
        let id = self.next();
        self.scroll.insert(id, callback);
        id
    }

    pub fn add_resize(&mut self, callback: Callback) -> ListenerId {
        let id = self.next();
        self.resize.insert(id, callback);
        id
    }

    pub fn remove_scroll(&mut self, id: ListenerId) -> bool {
        self.scroll.remove(&id).is_some()
    }

    pub fn remove_resize(&mut self, id: ListenerId) -> bool {
        self.resize.remove(&id).is_some()
    }

    pub fn fire_scroll(&self) {
        for callback in self.scroll.values() {
            callback();
        }
    }

    pub fn fire_resize(&self) {
        for callback in self.resize.values() {
            callback();
        }
    }

    pub fn add_image_load(&mut self, node: NodeId, callback: Callback) {
        self.image_load.entry(node).or_default().push(callback);
    }

    /// Drain and fire the load callbacks registered for `node`.
    pub fn fire_image_load(&mut self, node: NodeId) {
        if let Some(callbacks) = self.image_load.remove(&node) {
            for callback in callbacks {
                callback();
            }
        }
    }
}
