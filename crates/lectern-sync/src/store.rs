//! Materials store: the local copy of the course's authoritative material list.
//!
//! Replaced wholesale on refresh; patched in place for visibility changes and
//! deletions so the view does not wait for a refetch.

use std::collections::{HashMap, HashSet};

use lectern_core::models::{Material, MaterialId, Visibility};

#[derive(Debug, Default, Clone)]
pub struct MaterialsStore {
    materials: HashMap<MaterialId, Material>,
    loaded: bool,
    loading: bool,
}

impl MaterialsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole list with a fresh server copy.
    pub fn replace_all(&mut self, materials: Vec<Material>) {
        self.materials = materials.into_iter().map(|m| (m.id, m)).collect();
        self.loaded = true;
    }

    /// Record a failed fetch: the held list is kept, and a store that never
    /// loaded is considered loaded (and empty).
    pub fn mark_fetch_failed(&mut self) {
        self.loaded = true;
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn get(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(&id)
    }

    pub fn get_mut(&mut self, id: MaterialId) -> Option<&mut Material> {
        self.materials.get_mut(&id)
    }

    pub fn contains(&self, id: MaterialId) -> bool {
        self.materials.contains_key(&id)
    }

    pub fn remove(&mut self, id: MaterialId) -> Option<Material> {
        self.materials.remove(&id)
    }

    /// Patch the visibility of a held material. Returns false when it is absent.
    pub fn set_visibility(&mut self, id: MaterialId, visibility: Visibility) -> bool {
        match self.materials.get_mut(&id) {
            Some(material) => {
                material.visibility = visibility;
                true
            }
            None => false,
        }
    }

    pub fn ids(&self) -> HashSet<MaterialId> {
        self.materials.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.values()
    }

    /// Snapshot ordered by id, for stable display.
    pub fn sorted(&self) -> Vec<Material> {
        let mut materials: Vec<Material> = self.materials.values().cloned().collect();
        materials.sort_by_key(|m| m.id);
        materials
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}
