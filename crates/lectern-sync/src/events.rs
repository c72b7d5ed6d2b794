//! Upload progress notifications.
//!
//! Events are emitted while the queue lock is held, so a subscriber sees them in
//! exactly the order the queue was mutated.

use lectern_core::models::MaterialId;
use tokio::sync::mpsc;

use crate::item::UploadItemId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    Queued { item_id: UploadItemId },
    Started { item_id: UploadItemId },
    Completed { item_id: UploadItemId, material_id: MaterialId },
    Failed { item_id: UploadItemId, message: String },
    /// Every item of one group (or of the whole sliding window run) settled.
    GroupSettled { group: usize, succeeded: usize, failed: usize },
    /// Materials store refreshed after a batch; `None` when the fetch failed.
    Refreshed { materials: Option<usize> },
    Purged { item_id: UploadItemId },
}

pub type UploadEventSender = mpsc::UnboundedSender<UploadEvent>;

#[derive(Debug, Clone, Default)]
pub(crate) struct EventSink {
    tx: Option<UploadEventSender>,
}

impl EventSink {
    pub(crate) fn new(tx: Option<UploadEventSender>) -> Self {
        Self { tx }
    }

    pub(crate) fn emit(&self, event: UploadEvent) {
        if let Some(ref tx) = self.tx {
            // A dropped receiver only means nobody is listening.
            let _ = tx.send(event);
        }
    }
}
