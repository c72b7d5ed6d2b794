//! Visible upload queue, in arrival order.

use std::collections::HashSet;

use lectern_core::models::MaterialId;

use crate::item::{UploadItem, UploadItemId, UploadStatus};

#[derive(Debug, Default, Clone)]
pub struct UploadQueue {
    items: Vec<UploadItem>,
}

impl UploadQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: UploadItem) {
        self.items.push(item);
    }

    pub fn get(&self, id: UploadItemId) -> Option<&UploadItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn get_mut(&mut self, id: UploadItemId) -> Option<&mut UploadItem> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    /// Remove an item whatever its status. Returns whether it was present.
    pub fn dismiss(&mut self, id: UploadItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id != id);
        self.items.len() != before
    }

    /// Drop `done` items whose material is in `merged`. Returns the purged ids.
    pub fn purge_merged(&mut self, merged: &HashSet<MaterialId>) -> Vec<UploadItemId> {
        let mut purged = Vec::new();
        self.items.retain(|item| match item.material_id() {
            Some(material_id) if merged.contains(&material_id) => {
                purged.push(item.id);
                false
            }
            _ => true,
        });
        purged
    }

    pub fn uploading_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| i.status == UploadStatus::Uploading)
            .count()
    }

    /// Items currently uploading.
    pub fn active(&self) -> Vec<UploadItem> {
        self.items
            .iter()
            .filter(|i| i.status == UploadStatus::Uploading)
            .cloned()
            .collect()
    }

    /// Items that reached `done` or `error`.
    pub fn completed(&self) -> Vec<UploadItem> {
        self.items
            .iter()
            .filter(|i| i.is_terminal())
            .cloned()
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UploadItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
