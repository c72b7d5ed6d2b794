//! Optimistic boolean toggles with rollback.
//!
//! Apply the new value locally and mark it pending, issue the request, revert
//! to the previous value if the request is rejected, and clear the pending flag
//! once it settles whatever the outcome. The same routine drives the visibility
//! switch of upload items and of stored materials through [`ToggleSlot`].

use std::future::Future;

use lectern_core::models::{MaterialId, Visibility};
use tokio::sync::RwLock;

use crate::item::UploadItemId;
use crate::queue::UploadQueue;
use crate::store::MaterialsStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleState {
    pub value: bool,
    pub pending: bool,
}

/// One boolean, plus its pending flag, inside a collection `C`.
pub trait ToggleSlot<C> {
    /// `None` when the target is not in the collection.
    fn get(&self, collection: &C) -> Option<ToggleState>;

    /// Write both fields. Returns false (and writes nothing) when the target is
    /// not in the collection.
    fn set(&self, collection: &mut C, state: ToggleState) -> bool;
}

#[derive(Debug, PartialEq, Eq)]
pub enum ToggleOutcome<E> {
    /// The server accepted the change; the new value stays.
    Confirmed,
    /// The server rejected the change; the previous value was restored.
    RolledBack(E),
    /// The target disappeared while the request was in flight; nothing was
    /// written. Carries the request's own result.
    Discarded(Result<(), E>),
    /// The target did not exist; no request was issued.
    Missing,
    /// A change for this target is already pending; no request was issued.
    Busy,
}

impl<E> ToggleOutcome<E> {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, ToggleOutcome::Confirmed)
    }

    /// Whether the server accepted the change, whether or not the local
    /// target was still there to receive it.
    pub fn request_succeeded(&self) -> bool {
        matches!(self, ToggleOutcome::Confirmed | ToggleOutcome::Discarded(Ok(())))
    }
}

/// Run one optimistic toggle of `slot` inside `collection`.
///
/// The lock is only held for the local writes, never across `request`.
pub async fn optimistic_toggle<C, S, R, F, E>(
    collection: &RwLock<C>,
    slot: &S,
    value: bool,
    request: R,
) -> ToggleOutcome<E>
where
    S: ToggleSlot<C>,
    R: FnOnce() -> F,
    F: Future<Output = Result<(), E>>,
{
    let previous = {
        let mut guard = collection.write().await;
        match slot.get(&guard) {
            None => return ToggleOutcome::Missing,
            Some(state) if state.pending => return ToggleOutcome::Busy,
            Some(state) => {
                slot.set(
                    &mut guard,
                    ToggleState {
                        value,
                        pending: true,
                    },
                );
                state.value
            }
        }
    };

    let result = request().await;

    let mut guard = collection.write().await;
    let settled = if result.is_ok() { value } else { previous };
    let present = slot.set(
        &mut guard,
        ToggleState {
            value: settled,
            pending: false,
        },
    );

    match result {
        result if !present => ToggleOutcome::Discarded(result),
        Ok(()) => ToggleOutcome::Confirmed,
        Err(e) => ToggleOutcome::RolledBack(e),
    }
}

/// `is_public` of an upload item in the queue.
#[derive(Debug, Clone, Copy)]
pub struct ItemVisibility(pub UploadItemId);

impl ToggleSlot<UploadQueue> for ItemVisibility {
    fn get(&self, queue: &UploadQueue) -> Option<ToggleState> {
        queue.get(self.0).map(|item| ToggleState {
            value: item.is_public,
            pending: item.visibility_updating,
        })
    }

    fn set(&self, queue: &mut UploadQueue, state: ToggleState) -> bool {
        match queue.get_mut(self.0) {
            Some(item) => {
                item.is_public = state.value;
                item.visibility_updating = state.pending;
                true
            }
            None => false,
        }
    }
}

/// `visibility` of a stored material, read as "is public".
#[derive(Debug, Clone, Copy)]
pub struct MaterialVisibility(pub MaterialId);

impl ToggleSlot<MaterialsStore> for MaterialVisibility {
    fn get(&self, store: &MaterialsStore) -> Option<ToggleState> {
        store.get(self.0).map(|m| ToggleState {
            value: m.is_public(),
            pending: m.updating,
        })
    }

    fn set(&self, store: &mut MaterialsStore, state: ToggleState) -> bool {
        match store.get_mut(self.0) {
            Some(material) => {
                material.visibility = Visibility::from_public(state.value);
                material.updating = state.pending;
                true
            }
            None => false,
        }
    }
}
