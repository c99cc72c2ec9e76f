//! Filterable, sortable, paged view over the workflow listing.

use std::cmp::Ordering;

use crate::workflow::WorkflowConfig;

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Name,
    Updated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Clone)]
pub struct WorkflowTable {
    workflows: Vec<WorkflowConfig>,
    search: String,
    sort: Option<(SortKey, SortOrder)>,
    /// Indices into `workflows` that match the search, in display order.
    filtered: Vec<usize>,
    /// Zero-based page being shown.
    page: usize,
    page_size: usize,
}

impl WorkflowTable {
    pub fn new(page_size: usize) -> Self {
        Self {
            workflows: Vec::new(),
            search: String::new(),
            sort: None,
            filtered: Vec::new(),
            page: 0,
            page_size: page_size.max(1),
        }
    }

    pub fn set_workflows(&mut self, workflows: Vec<WorkflowConfig>) {
        self.workflows = workflows;
        self.rebuild();
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 0;
        self.rebuild();
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn sort_by(&mut self, key: SortKey, order: SortOrder) {
        self.sort = Some((key, order));
        self.rebuild();
    }

    /// Total workflows loaded, ignoring the filter.
    pub fn total(&self) -> usize {
        self.workflows.len()
    }

    /// Workflows matching the filter.
    pub fn len(&self) -> usize {
        self.filtered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filtered.is_empty()
    }

    fn rebuild(&mut self) {
        let needle = self.search.to_lowercase();
        let mut filtered: Vec<usize> = self
            .workflows
            .iter()
            .enumerate()
            .filter(|(_, workflow)| matches_search(workflow, &needle))
            .map(|(idx, _)| idx)
            .collect();

        if let Some((key, order)) = self.sort {
            filtered.sort_by(|&a, &b| {
                let ordering = compare(&self.workflows[a], &self.workflows[b], key);
                match order {
                    SortOrder::Ascending => ordering,
                    SortOrder::Descending => ordering.reverse(),
                }
            });
        }

        self.filtered = filtered;
        self.page = self.page.min(self.page_count() - 1);
    }

    /// Matching rows in display order.
    pub fn rows(&self) -> impl Iterator<Item = &WorkflowConfig> {
        self.filtered.iter().map(|&idx| &self.workflows[idx])
    }

    pub fn page_count(&self) -> usize {
        self.filtered.len().div_ceil(self.page_size).max(1)
    }

    pub fn current_page(&self) -> usize {
        self.page
    }

    /// Rows of the current page.
    pub fn page_rows(&self) -> impl Iterator<Item = &WorkflowConfig> {
        self.rows()
            .skip(self.page * self.page_size)
            .take(self.page_size)
    }

    /// Show zero-based `page`, clamped to the last page.
    pub fn go_to_page(&mut self, page: usize) {
        self.page = page.min(self.page_count() - 1);
    }
}

impl Default for WorkflowTable {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

fn matches_search(workflow: &WorkflowConfig, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    workflow.name.to_lowercase().contains(needle)
        || workflow
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(needle))
}

fn compare(a: &WorkflowConfig, b: &WorkflowConfig, key: SortKey) -> Ordering {
    match key {
        SortKey::Name => a
            .name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name)),
        // Entries without a timestamp sort first.
        SortKey::Updated => a.updated_at.cmp(&b.updated_at),
    }
}
