//! Process-wide slot for the host runtime handle.
//!
//! Written once by the load callback and read by every worker afterwards.
//! The cell's release/acquire publication orders the write before any read
//! that observes it.

use std::sync::Arc;

use hostlink_sdk::{BridgeError, BridgeResult};
use once_cell::sync::OnceCell;

/// Single-slot, write-once holder for a runtime handle.
pub struct HandleCache<R> {
    slot: OnceCell<Arc<R>>,
}

impl<R> HandleCache<R> {
    /// Create an empty cache. Usable in a `static`.
    pub const fn new() -> Self {
        Self {
            slot: OnceCell::new(),
        }
    }

    /// Publish the handle. Fails if one was already published; the first
    /// handle stays in place.
    pub fn publish(&self, runtime: R) -> BridgeResult<Arc<R>> {
        let runtime = Arc::new(runtime);
        self.slot
            .set(Arc::clone(&runtime))
            .map_err(|_| BridgeError::AlreadyLoaded)?;
        Ok(runtime)
    }

    /// The published handle, if any.
    pub fn get(&self) -> Option<Arc<R>> {
        self.slot.get().cloned()
    }

    /// The published handle, or [`BridgeError::NotLoaded`].
    pub fn require(&self) -> BridgeResult<Arc<R>> {
        self.get().ok_or(BridgeError::NotLoaded)
    }

    /// Whether a handle has been published.
    pub fn is_loaded(&self) -> bool {
        self.slot.get().is_some()
    }
}

impl<R> Default for HandleCache<R> {
    fn default() -> Self {
        Self::new()
    }
}
