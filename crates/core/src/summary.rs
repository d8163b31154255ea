use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::category::{parse_deletable, CategoryId, CategoryInfo};
use crate::error::WorkflowError;
use crate::model::{CategoryDetail, CategorySummary};

/// One deletable category as shown to the user.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CategoryEntry {
    #[serde(flatten)]
    pub info: &'static CategoryInfo,
    pub selected: bool,
    pub size: u64,
    pub count: u64,
}

impl CategoryEntry {
    fn new(id: CategoryId) -> Self {
        Self {
            info: id.info(),
            selected: false,
            size: 0,
            count: 0,
        }
    }

    pub fn id(&self) -> CategoryId {
        self.info.id
    }
}

/// Per-category size/count and user selection for the five deletable categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySummaryStore {
    entries: BTreeMap<CategoryId, CategoryEntry>,
}

impl Default for CategorySummaryStore {
    fn default() -> Self {
        Self {
            entries: CategoryId::DELETABLE
                .into_iter()
                .map(|id| (id, CategoryEntry::new(id)))
                .collect(),
        }
    }
}

impl CategorySummaryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: CategoryId) -> Option<&CategoryEntry> {
        self.entries.get(&id)
    }

    /// Entries in registry order.
    pub fn entries(&self) -> impl Iterator<Item = &CategoryEntry> {
        self.entries.values()
    }

    /// Overwrites size/count from a terminal summary. Selection is left untouched. All five
    /// deletable categories must be present or nothing is applied.
    pub fn replace_metrics(&mut self, summary: &CategorySummary) -> Result<(), WorkflowError> {
        let mut updates = Vec::with_capacity(CategoryId::DELETABLE.len());
        for (key, detail) in &summary.0 {
            let id = key.parse::<CategoryId>().map_err(|_| {
                WorkflowError::validation(format!("unknown category `{key}` in summary"))
            })?;
            if !id.is_deletable() {
                debug!(category = %id, "ignoring non-deletable category in summary");
                continue;
            }
            updates.push((id, *detail));
        }

        let missing: Vec<&str> = CategoryId::DELETABLE
            .into_iter()
            .filter(|id| !updates.iter().any(|(seen, _)| seen == id))
            .map(CategoryId::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(WorkflowError::validation(format!(
                "missing categories: {}",
                missing.join(", ")
            )));
        }

        for (id, CategoryDetail { total_size, total_count }) in updates {
            if let Some(entry) = self.entries.get_mut(&id) {
                entry.size = total_size;
                entry.count = total_count;
            }
        }
        Ok(())
    }

    /// Flips the selection of a deletable category and returns the new value.
    pub fn toggle_selection(&mut self, category: &str) -> Result<bool, WorkflowError> {
        let id = parse_deletable(category)?;
        let entry = self
            .entries
            .get_mut(&id)
            .ok_or_else(|| WorkflowError::NotFound {
                category: category.to_string(),
            })?;
        entry.selected = !entry.selected;
        Ok(entry.selected)
    }

    pub fn selected_category_ids(&self) -> Vec<CategoryId> {
        self.entries
            .values()
            .filter(|entry| entry.selected)
            .map(CategoryEntry::id)
            .collect()
    }

    /// Zeroes size/count for a category whose files were deleted. Selection is kept.
    pub fn clear_metrics(&mut self, id: CategoryId) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.size = 0;
            entry.count = 0;
        }
    }

    /// Zeroes every metric but keeps the current selection.
    pub fn reset_metrics(&mut self) {
        for entry in self.entries.values_mut() {
            entry.size = 0;
            entry.count = 0;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn total_selected_size(&self) -> u64 {
        self.entries
            .values()
            .filter(|entry| entry.selected)
            .fold(0_u64, |sum, entry| sum.saturating_add(entry.size))
    }
}
