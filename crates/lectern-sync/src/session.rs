//! Materials session: upload queue and materials store for one course.
//!
//! A session owns both collections and serializes every local mutation through
//! their locks. Network calls are never made while a lock is held; results are
//! applied afterwards, and a result whose target has gone away is dropped.

use std::sync::Arc;

use lectern_core::models::{CourseId, Material, MaterialId, UserId, Visibility};
use lectern_core::{ApiError, MaterialApi, UploadPolicy};
use tokio::sync::{RwLock, Semaphore};

use crate::events::{EventSink, UploadEvent, UploadEventSender};
use crate::filter::MaterialFilter;
use crate::intake::{self, IntakeRejection, PendingFile};
use crate::item::{UploadItem, UploadItemId};
use crate::optimistic::{optimistic_toggle, ItemVisibility, MaterialVisibility, ToggleOutcome};
use crate::pipeline::run_protocol;
use crate::queue::UploadQueue;
use crate::scheduler::run_scheduled;
use crate::store::MaterialsStore;

/// Result of one `upload_files` call.
#[derive(Debug, Default)]
pub struct UploadSummary {
    /// Queued items, in arrival order
    pub items: Vec<UploadItemId>,
    /// State of each queued item once the batch settled, before the merged ones
    /// were purged. Items dismissed mid-batch are absent.
    pub results: Vec<UploadItem>,
    pub succeeded: usize,
    pub failed: usize,
    /// Items dismissed before their result arrived; counted as neither
    pub dismissed: usize,
    /// Files dropped at intake; they never entered the queue
    pub rejected: Vec<IntakeRejection>,
}

/// How one queued item's upload ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Settlement {
    Done,
    Failed,
    Dismissed,
}

fn count(settled: &[Settlement], wanted: Settlement) -> usize {
    settled.iter().filter(|s| **s == wanted).count()
}

pub struct MaterialsSession {
    api: Arc<dyn MaterialApi>,
    course_id: CourseId,
    current_user: Option<UserId>,
    policy: UploadPolicy,
    /// Bounds items in `uploading` across every batch of this session
    upload_slots: Semaphore,
    queue: RwLock<UploadQueue>,
    store: RwLock<MaterialsStore>,
    events: EventSink,
}

impl MaterialsSession {
    pub fn new(
        api: Arc<dyn MaterialApi>,
        course_id: CourseId,
        current_user: Option<UserId>,
        policy: UploadPolicy,
    ) -> Self {
        Self {
            api,
            course_id,
            current_user,
            upload_slots: Semaphore::new(policy.concurrency.max(1)),
            policy,
            queue: RwLock::new(UploadQueue::new()),
            store: RwLock::new(MaterialsStore::new()),
            events: EventSink::default(),
        }
    }

    /// Send upload progress events to `tx`.
    pub fn with_events(mut self, tx: UploadEventSender) -> Self {
        self.events = EventSink::new(Some(tx));
        self
    }

    pub fn course_id(&self) -> CourseId {
        self.course_id
    }

    pub fn current_user(&self) -> Option<UserId> {
        self.current_user
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Replace the store with the server's list. On failure the held list is
    /// kept and the error returned.
    pub async fn refresh(&self) -> Result<usize, ApiError> {
        self.store.write().await.set_loading(true);

        let result = self.api.list_materials(self.course_id).await;

        let mut store = self.store.write().await;
        store.set_loading(false);
        match result {
            Ok(materials) => {
                store.replace_all(materials);
                tracing::info!(course_id = self.course_id, count = store.len(), "Materials refreshed");
                Ok(store.len())
            }
            Err(e) => {
                store.mark_fetch_failed();
                tracing::warn!(course_id = self.course_id, error = %e, "Failed to fetch materials");
                Err(e)
            }
        }
    }

    /// Screen, queue and upload a batch of files, then refresh the store and
    /// purge the done items it now holds.
    #[tracing::instrument(skip(self, files), fields(course_id = self.course_id, files = files.len()))]
    pub async fn upload_files(&self, files: Vec<PendingFile>) -> UploadSummary {
        let report = intake::screen(files, self.policy.max_file_size_bytes);
        let mut summary = UploadSummary {
            rejected: report.rejected,
            ..Default::default()
        };

        if report.accepted.is_empty() {
            tracing::debug!("No acceptable files in batch");
            return summary;
        }

        tracing::info!(
            accepted = report.accepted.len(),
            rejected = summary.rejected.len(),
            "Starting upload batch"
        );
        let mut jobs = Vec::with_capacity(report.accepted.len());
        {
            let mut queue = self.queue.write().await;
            for file in report.accepted {
                let item = UploadItem::new(file.descriptor.clone());
                let item_id = item.id;
                queue.push(item);
                self.events.emit(UploadEvent::Queued { item_id });
                summary.items.push(item_id);
                jobs.push((item_id, file));
            }
        }

        let outcomes = run_scheduled(
            jobs,
            &self.policy,
            |(item_id, file)| self.upload_item(item_id, file),
            |group, settled: &[Settlement]| {
                self.events.emit(UploadEvent::GroupSettled {
                    group,
                    succeeded: count(settled, Settlement::Done),
                    failed: count(settled, Settlement::Failed),
                });
            },
        )
        .await;

        summary.succeeded = count(&outcomes, Settlement::Done);
        summary.failed = count(&outcomes, Settlement::Failed);
        summary.dismissed = count(&outcomes, Settlement::Dismissed);
        {
            let queue = self.queue.read().await;
            summary.results = summary
                .items
                .iter()
                .filter_map(|id| queue.get(*id).cloned())
                .collect();
        }

        let refreshed = self.refresh().await.ok();
        self.events.emit(UploadEvent::Refreshed {
            materials: refreshed,
        });

        // Only materials the store actually holds may take over from their item.
        let merged = self.store.read().await.ids();
        let mut queue = self.queue.write().await;
        for item_id in queue.purge_merged(&merged) {
            self.events.emit(UploadEvent::Purged { item_id });
        }

        tracing::info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            dismissed = summary.dismissed,
            rejected = summary.rejected.len(),
            "Upload batch finished"
        );
        summary
    }

    /// Drive one queued item through the protocol.
    async fn upload_item(&self, item_id: UploadItemId, file: PendingFile) -> Settlement {
        let _permit = match self.upload_slots.acquire().await {
            Ok(permit) => permit,
            Err(e) => return self.settle(item_id, Err(e.to_string())).await,
        };

        {
            let mut queue = self.queue.write().await;
            let Some(item) = queue.get_mut(item_id) else {
                tracing::debug!(item_id = %item_id, "Item dismissed before upload started");
                return Settlement::Dismissed;
            };
            if let Err(e) = item.start() {
                tracing::warn!(error = %e, "Upload item not startable");
                return Settlement::Failed;
            }
            self.events.emit(UploadEvent::Started { item_id });
        }

        let result = run_protocol(
            self.api.as_ref(),
            self.course_id,
            &file.descriptor,
            file.content,
        )
        .await
        .map(|material| material.id)
        .map_err(|e| e.to_string());

        self.settle(item_id, result).await
    }

    async fn settle(
        &self,
        item_id: UploadItemId,
        result: Result<MaterialId, String>,
    ) -> Settlement {
        let mut queue = self.queue.write().await;
        let Some(item) = queue.get_mut(item_id) else {
            tracing::debug!(item_id = %item_id, "Discarding result for dismissed item");
            return Settlement::Dismissed;
        };

        match result {
            Ok(material_id) => {
                if let Err(e) = item.complete(material_id) {
                    tracing::warn!(error = %e, "Failed to record upload completion");
                    return Settlement::Failed;
                }
                self.events.emit(UploadEvent::Completed {
                    item_id,
                    material_id,
                });
                Settlement::Done
            }
            Err(message) => {
                tracing::warn!(item_id = %item_id, file = %item.file.name, error = %message, "Upload failed");
                if let Err(e) = item.fail(message.clone()) {
                    tracing::warn!(error = %e, "Failed to record upload failure");
                    return Settlement::Failed;
                }
                self.events.emit(UploadEvent::Failed { item_id, message });
                Settlement::Failed
            }
        }
    }

    /// Toggle the visibility of a done upload item. Items without a material
    /// yet are left untouched. Once the server accepts the change it is
    /// mirrored into the store, even if the item was purged or dismissed in
    /// the meantime.
    pub async fn toggle_item_visibility(
        &self,
        item_id: UploadItemId,
        is_public: bool,
    ) -> ToggleOutcome<ApiError> {
        let material_id = {
            let queue = self.queue.read().await;
            match queue.get(item_id).and_then(UploadItem::material_id) {
                Some(id) => id,
                None => return ToggleOutcome::Missing,
            }
        };

        let visibility = Visibility::from_public(is_public);
        let outcome = optimistic_toggle(&self.queue, &ItemVisibility(item_id), is_public, || {
            self.api.update_visibility(material_id, visibility)
        })
        .await;

        if outcome.request_succeeded() {
            self.store.write().await.set_visibility(material_id, visibility);
        }
        if let ToggleOutcome::RolledBack(e) = &outcome {
            tracing::warn!(material_id, error = %e, "Visibility change rejected, reverted");
        }
        outcome
    }

    pub async fn toggle_material_visibility(
        &self,
        material_id: MaterialId,
        is_public: bool,
    ) -> ToggleOutcome<ApiError> {
        let visibility = Visibility::from_public(is_public);
        let outcome = optimistic_toggle(
            &self.store,
            &MaterialVisibility(material_id),
            is_public,
            || self.api.update_visibility(material_id, visibility),
        )
        .await;

        if let ToggleOutcome::RolledBack(e) = &outcome {
            tracing::warn!(material_id, error = %e, "Visibility change rejected, reverted");
        }
        outcome
    }

    /// Remove a material locally, then ask the server to delete it. A failed
    /// request is logged and the local removal stands. Returns whether the
    /// material was held locally.
    pub async fn delete_material(&self, material_id: MaterialId) -> bool {
        let removed = self.store.write().await.remove(material_id).is_some();

        if let Err(e) = self.api.delete_material(self.course_id, material_id).await {
            tracing::warn!(material_id, error = %e, "Failed to delete material");
        }
        removed
    }

    /// Hide an item from the queue. A request already in flight for it still
    /// completes; its result is discarded.
    pub async fn dismiss(&self, item_id: UploadItemId) -> bool {
        self.queue.write().await.dismiss(item_id)
    }

    pub async fn upload_item_snapshot(&self, item_id: UploadItemId) -> Option<UploadItem> {
        self.queue.read().await.get(item_id).cloned()
    }

    pub async fn upload_items(&self) -> Vec<UploadItem> {
        self.queue.read().await.iter().cloned().collect()
    }

    pub async fn active_uploads(&self) -> Vec<UploadItem> {
        self.queue.read().await.active()
    }

    pub async fn completed_uploads(&self) -> Vec<UploadItem> {
        self.queue.read().await.completed()
    }

    pub async fn material(&self, material_id: MaterialId) -> Option<Material> {
        self.store.read().await.get(material_id).cloned()
    }

    /// Every held material, ordered by id.
    pub async fn materials(&self) -> Vec<Material> {
        self.store.read().await.sorted()
    }

    /// Held materials passing `filter`, ordered by id.
    pub async fn visible_materials(&self, filter: &MaterialFilter) -> Vec<Material> {
        let store = self.store.read().await;
        let mut materials: Vec<Material> = filter
            .apply(store.iter(), self.current_user)
            .into_iter()
            .cloned()
            .collect();
        materials.sort_by_key(|m| m.id);
        materials
    }

    pub async fn is_loading(&self) -> bool {
        self.store.read().await.is_loading()
    }

    pub async fn is_loaded(&self) -> bool {
        self.store.read().await.is_loaded()
    }

    pub fn is_owner(&self, material: &Material) -> bool {
        self.current_user == Some(material.owner_id)
    }
}
