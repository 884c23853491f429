// SPDX-FileCopyrightText: 2026 Packshot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Catalog operations on [`StudioState`]: items, selection, categories,
//! bulk import/export.

use packshot_core::PackshotError;
use packshot_core::types::{Category, ItemMetadata, ItemStatus, Priority, WorkItem};
use serde::Serialize;
use serde_json::Value;
use strum::{Display, EnumString};

use crate::state::StudioState;

/// Which items a bulk reset returns to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ResetFilter {
    Pending,
    Failed,
    Completed,
    All,
}

impl ResetFilter {
    fn matches(self, status: ItemStatus) -> bool {
        match self {
            Self::Pending => status == ItemStatus::Pending,
            Self::Failed => status == ItemStatus::Failed,
            Self::Completed => status == ItemStatus::Completed,
            Self::All => true,
        }
    }
}

/// How imported items combine with the existing list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ImportMode {
    #[default]
    Append,
    Overwrite,
}

/// Item counts by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub failed: usize,
    pub selected: usize,
}

/// Fields for a manually added item.
#[derive(Debug, Clone, Default)]
pub struct NewItem {
    pub category: Option<String>,
    pub name: Option<String>,
    pub prompt: String,
    pub logo_prompt: String,
    pub description: String,
}

/// Changes to an existing item. `None` leaves a field as it is.
#[derive(Debug, Clone, Default)]
pub struct ItemEdit {
    pub name: Option<String>,
    pub prompt: Option<String>,
    pub logo_prompt: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<Priority>,
}

impl StudioState {
    fn require_item(&mut self, id: &str) -> Result<&mut WorkItem, PackshotError> {
        self.item_mut(id).ok_or_else(|| PackshotError::NotFound {
            kind: "work item",
            id: id.to_string(),
        })
    }

    fn first_category_id(&self) -> String {
        self.categories
            .first()
            .map(|c| c.id.clone())
            .unwrap_or_default()
    }

    /// Adds a pending item at the top of the list and returns its id.
    pub fn add_item(&mut self, new: NewItem) -> Result<String, PackshotError> {
        if new.prompt.trim().is_empty() {
            return Err(PackshotError::Import("a prompt is required".into()));
        }
        let id = format!("custom-{}", uuid::Uuid::new_v4());
        let category = new.category.unwrap_or_else(|| self.first_category_id());
        let name = new
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("New design {}", self.items.len() + 1));
        let mut item = WorkItem::new(id.clone(), category, name, new.prompt)
            .with_logo_prompt(new.logo_prompt);
        item.description = new.description;
        self.items.insert(0, item);
        Ok(id)
    }

    /// Applies an edit to an item's descriptive fields. Status, result,
    /// and selection are untouched.
    pub fn update_item(&mut self, id: &str, edit: ItemEdit) -> Result<(), PackshotError> {
        if edit.prompt.as_deref().is_some_and(|p| p.trim().is_empty()) {
            return Err(PackshotError::Import("a prompt is required".into()));
        }
        if let Some(category) = &edit.category {
            if !self.categories.iter().any(|c| &c.id == category) {
                return Err(PackshotError::NotFound {
                    kind: "category",
                    id: category.clone(),
                });
            }
        }

        let item = self.require_item(id)?;
        if let Some(name) = edit.name.filter(|n| !n.trim().is_empty()) {
            item.name = name;
        }
        if let Some(prompt) = edit.prompt {
            item.prompt = prompt;
        }
        if let Some(logo_prompt) = edit.logo_prompt {
            item.logo_prompt = logo_prompt;
        }
        if let Some(description) = edit.description {
            item.description = description;
        }
        if let Some(category) = edit.category {
            item.category = category;
        }
        if let Some(priority) = edit.priority {
            item.metadata.priority = priority;
        }
        Ok(())
    }

    pub fn remove_item(&mut self, id: &str) -> Result<WorkItem, PackshotError> {
        let index = self
            .items
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| PackshotError::NotFound {
                kind: "work item",
                id: id.to_string(),
            })?;
        Ok(self.items.remove(index))
    }

    /// Flips one item's selection flag and returns the new value.
    pub fn toggle_selected(&mut self, id: &str) -> Result<bool, PackshotError> {
        let item = self.require_item(id)?;
        item.selected = !item.selected;
        Ok(item.selected)
    }

    /// Sets the selection flag on every listed id.
    pub fn select(&mut self, ids: &[String]) -> Result<usize, PackshotError> {
        if let Some(missing) = ids.iter().find(|id| self.item(id).is_none()) {
            return Err(PackshotError::NotFound {
                kind: "work item",
                id: missing.clone(),
            });
        }
        let mut count = 0;
        for item in self.items.iter_mut().filter(|i| ids.contains(&i.id)) {
            item.selected = true;
            count += 1;
        }
        Ok(count)
    }

    /// Toggles selection across the visible items: selects them all unless
    /// they are all selected already, in which case they are deselected.
    pub fn toggle_select_all(&mut self, category: Option<&str>) -> bool {
        let visible = |item: &WorkItem| category.is_none_or(|c| item.category == c);
        let mut shown = self.items.iter().filter(|i| visible(i)).peekable();
        let all_selected = shown.peek().is_some() && shown.all(|i| i.selected);
        let target = !all_selected;
        for item in self.items.iter_mut() {
            if visible(item) {
                item.selected = target;
            }
        }
        target
    }

    pub fn clear_selection(&mut self) {
        for item in &mut self.items {
            item.selected = false;
        }
    }

    /// Manually sets an item's status. Leaving `Completed` drops the result.
    pub fn set_status(&mut self, id: &str, status: ItemStatus) -> Result<(), PackshotError> {
        let item = self.require_item(id)?;
        match status {
            ItemStatus::Pending => item.reset(),
            ItemStatus::Completed if item.result_image.is_none() => {
                return Err(PackshotError::Internal(format!(
                    "item {id} has no result image to mark completed"
                )));
            }
            _ => {
                if status != ItemStatus::Completed {
                    item.result_image = None;
                }
                item.status = status;
            }
        }
        Ok(())
    }

    /// Returns matching items to `Pending`, clearing results and errors.
    pub fn reset_items(&mut self, filter: ResetFilter) -> usize {
        let mut count = 0;
        for item in self.items.iter_mut().filter(|i| filter.matches(i.status)) {
            item.reset();
            count += 1;
        }
        count
    }

    /// Drops every work item.
    pub fn clear_items(&mut self) {
        self.items.clear();
    }

    pub fn stats(&self) -> CatalogStats {
        let count = |status: ItemStatus| self.items.iter().filter(|i| i.status == status).count();
        CatalogStats {
            total: self.items.len(),
            completed: count(ItemStatus::Completed),
            pending: count(ItemStatus::Pending),
            failed: count(ItemStatus::Failed),
            selected: self.items.iter().filter(|i| i.selected).count(),
        }
    }

    /// Sets the logo-integration fragment of every item in `category`.
    pub fn apply_logo_prompt(&mut self, category: &str, logo_prompt: &str) -> usize {
        let mut count = 0;
        for item in self.items.iter_mut().filter(|i| i.category == category) {
            item.logo_prompt = logo_prompt.to_string();
            count += 1;
        }
        count
    }

    // --- Categories ---

    /// Adds a category whose id is slugified from `name`.
    pub fn add_category(&mut self, name: &str, color: &str) -> Result<String, PackshotError> {
        let base = slugify(name);
        if base.is_empty() {
            return Err(PackshotError::Import("category name is empty".into()));
        }
        let mut id = base.clone();
        let mut n = 2;
        while self.categories.iter().any(|c| c.id == id) {
            id = format!("{base}-{n}");
            n += 1;
        }
        self.categories
            .push(Category::new(id.clone(), name.trim(), color));
        Ok(id)
    }

    pub fn update_category(
        &mut self,
        id: &str,
        name: Option<&str>,
        color: Option<&str>,
    ) -> Result<(), PackshotError> {
        let category = self
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| PackshotError::NotFound {
                kind: "category",
                id: id.to_string(),
            })?;
        if let Some(name) = name {
            category.name = name.to_string();
        }
        if let Some(color) = color {
            category.color = color.to_string();
        }
        Ok(())
    }

    /// Deletes a category without deleting its items.
    ///
    /// Items move to the first remaining category. When none remains they
    /// keep the dangling id. Returns how many items were reassigned.
    pub fn delete_category(&mut self, id: &str) -> Result<usize, PackshotError> {
        let index = self
            .categories
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| PackshotError::NotFound {
                kind: "category",
                id: id.to_string(),
            })?;
        self.categories.remove(index);

        let Some(fallback) = self.categories.first().map(|c| c.id.clone()) else {
            return Ok(0);
        };
        let mut moved = 0;
        for item in self.items.iter_mut().filter(|i| i.category == id) {
            item.category = fallback.clone();
            moved += 1;
        }
        Ok(moved)
    }

    // --- Import / export ---

    /// Imports items from a JSON array, coercing each element.
    ///
    /// Every imported item starts `Pending` and unselected. Missing or
    /// colliding ids get a fresh `imported-<uuid>` id and unknown categories
    /// fall back to the first known category.
    pub fn import_items(&mut self, json: &str, mode: ImportMode) -> Result<usize, PackshotError> {
        let parsed: Value = serde_json::from_str(json)
            .map_err(|e| PackshotError::Import(format!("invalid JSON: {e}")))?;
        let Value::Array(elements) = parsed else {
            return Err(PackshotError::Import("JSON should be an array".into()));
        };

        if mode == ImportMode::Overwrite {
            self.items.clear();
        }

        let fallback_category = self.first_category_id();
        let mut imported = Vec::with_capacity(elements.len());
        for element in &elements {
            let text = |key: &str| match element.get(key) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => String::new(),
            };

            let mut id = text("id");
            let taken = |id: &str, batch: &[WorkItem]| {
                self.item(id).is_some() || batch.iter().any(|i: &WorkItem| i.id == id)
            };
            if id.trim().is_empty() || taken(&id, &imported) {
                id = format!("imported-{}", uuid::Uuid::new_v4());
            }

            let category = text("category");
            let category = if self.categories.iter().any(|c| c.id == category) {
                category
            } else {
                fallback_category.clone()
            };

            let name = Some(text("name"))
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "Imported design".to_string());

            let metadata = element
                .get("metadata")
                .and_then(|m| serde_json::from_value::<ItemMetadata>(m.clone()).ok())
                .unwrap_or_default();

            let mut item = WorkItem::new(id, category, name, text("prompt"))
                .with_logo_prompt(text("logoPrompt"));
            item.description = text("description");
            item.metadata = metadata;
            imported.push(item);
        }

        let count = imported.len();
        self.items.extend(imported);
        Ok(count)
    }

    /// Serializes every item as indented JSON.
    pub fn export_items(&self) -> Result<String, PackshotError> {
        serde_json::to_string_pretty(&self.items)
            .map_err(|e| PackshotError::Internal(format!("export failed: {e}")))
    }
}

/// Lowercases and joins whitespace-separated words with `-`.
pub fn slugify(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// File name used when exporting a completed item's image.
///
/// Characters outside `[A-Za-z0-9]` and the Arabic block become `_`.
pub fn download_file_name(item: &WorkItem) -> String {
    let safe: String = item
        .name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || ('\u{0600}'..='\u{06FF}').contains(&c) {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("mockup-{}-{safe}.png", item.id)
}
