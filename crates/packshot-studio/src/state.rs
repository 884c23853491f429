// SPDX-FileCopyrightText: 2026 Packshot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The owned studio state.

use std::collections::HashMap;

use packshot_core::types::{
    Category, DataUri, FailedItemPolicy, GenerationSettings, ItemStatus, LogoEffectConfig,
    WorkItem,
};

/// Most logos kept in the library.
pub const LOGO_LIBRARY_LIMIT: usize = 50;

/// Everything the studio owns: work items in list order, categories,
/// settings, and the logo configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudioState {
    pub items: Vec<WorkItem>,
    pub categories: Vec<Category>,
    pub settings: GenerationSettings,
    pub effects: LogoEffectConfig,
    /// Most recent first.
    pub logo_library: Vec<DataUri>,
    pub active_logo: Option<DataUri>,
}

impl StudioState {
    pub fn item(&self, id: &str) -> Option<&WorkItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn item_mut(&mut self, id: &str) -> Option<&mut WorkItem> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    pub fn any_selected(&self) -> bool {
        self.items.iter().any(|i| i.selected)
    }

    /// Id of the first item automation may dispatch next.
    ///
    /// Pending items are always candidates. Failed items are candidates
    /// under [`FailedItemPolicy::Retry`] until they have been dispatched
    /// `max_attempts_per_run` times in this run. When any item is selected,
    /// only selected items qualify.
    pub fn next_eligible(&self, attempts: &HashMap<String, u32>) -> Option<&str> {
        let scoped = self.any_selected();
        let max_attempts = self.settings.max_attempts_per_run;
        self.items
            .iter()
            .filter(|item| !scoped || item.selected)
            .find(|item| match item.status {
                ItemStatus::Pending => true,
                ItemStatus::Failed => {
                    self.settings.failed_items == FailedItemPolicy::Retry
                        && attempts.get(&item.id).copied().unwrap_or(0) < max_attempts
                }
                _ => false,
            })
            .map(|item| item.id.as_str())
    }

    /// Puts `logo` at the front of the library and makes it active.
    pub fn add_logo(&mut self, logo: DataUri) {
        self.logo_library.retain(|existing| existing != &logo);
        self.logo_library.insert(0, logo.clone());
        self.logo_library.truncate(LOGO_LIBRARY_LIMIT);
        self.active_logo = Some(logo);
    }

    /// Activates the library entry at `index`.
    pub fn select_logo(&mut self, index: usize) -> bool {
        match self.logo_library.get(index) {
            Some(logo) => {
                self.active_logo = Some(logo.clone());
                true
            }
            None => false,
        }
    }

    /// Removes the library entry at `index`, deactivating it if active.
    pub fn remove_logo(&mut self, index: usize) -> Option<DataUri> {
        if index >= self.logo_library.len() {
            return None;
        }
        let removed = self.logo_library.remove(index);
        if self.active_logo.as_ref() == Some(&removed) {
            self.active_logo = None;
        }
        Some(removed)
    }
}
