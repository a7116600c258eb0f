//! Explorer application state and its pure transitions.
//!
//! Every user action is an [`ExplorerMsg`]; [`ExplorerState::update`]
//! consumes the current state and returns the next one without performing
//! any I/O. Callers issue requests based on the resulting state (for
//! example [`ExplorerState::browse_query`]) and feed responses back as
//! messages.

mod messages;

pub use messages::ExplorerMsg;

use crate::api::{QueryParams, ReviewDocument};
use crate::export::{ExportMode, INITIAL_CURSOR, StopReason};
use crate::filters::FilterSet;

/// Rows requested per browse page.
pub const BROWSE_ROWS: u32 = 100;

/// Summary of the last finished export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    /// Mode the export ran in.
    pub mode: ExportMode,
    /// Documents retained.
    pub documents: usize,
    /// Total reported by `/metrics`.
    pub total: u64,
    /// Why paging stopped, when it completed.
    pub stop_reason: Option<StopReason>,
}

/// Server-side cursor position while browsing reviews.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseCursor {
    /// Cursor of the current page.
    pub cursor_mark: String,
    /// Cursor of the following page, once known.
    pub next_cursor: Option<String>,
    /// Current page number (1-based).
    pub current_page: u32,
}

impl Default for BrowseCursor {
    fn default() -> Self {
        Self {
            cursor_mark: INITIAL_CURSOR.to_owned(),
            next_cursor: None,
            current_page: 1,
        }
    }
}

/// Everything the explorer remembers between actions.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplorerState {
    /// Active filters.
    pub filters: FilterSet,
    /// Whether filters have been applied since the last reset.
    pub filters_applied: bool,
    /// Products chosen for export.
    pub selected_products: Vec<String>,
    /// Preview (true) or full export (false).
    pub preview_mode: bool,
    /// Browse position.
    pub browse: BrowseCursor,
    /// Documents of the current browse page.
    pub current_docs: Vec<ReviewDocument>,
    /// `numFound` of the last browse page.
    pub total_found: u64,
    /// Outcome of the last export.
    pub last_export: Option<ExportSummary>,
}

impl Default for ExplorerState {
    fn default() -> Self {
        Self {
            filters: FilterSet::default(),
            filters_applied: false,
            selected_products: Vec::new(),
            preview_mode: true,
            browse: BrowseCursor::default(),
            current_docs: Vec::new(),
            total_found: 0,
            last_export: None,
        }
    }
}

impl ExplorerState {
    /// Applies `msg` and returns the next state.
    #[must_use]
    pub fn update(mut self, msg: ExplorerMsg) -> Self {
        match msg {
            ExplorerMsg::ApplyFilters(filters) => {
                self.filters = filters;
                self.filters_applied = true;
                self.reset_pagination();
            }
            ExplorerMsg::ResetFilters => {
                return Self {
                    preview_mode: self.preview_mode,
                    ..Self::default()
                };
            }
            ExplorerMsg::LoadedFilters(filters) => {
                self.selected_products.clone_from(&filters.product);
                self.filters = filters;
                self.filters_applied = true;
                self.reset_pagination();
            }
            ExplorerMsg::ToggleProduct(product) => {
                if let Some(index) = self.selected_products.iter().position(|p| *p == product) {
                    self.selected_products.remove(index);
                } else {
                    self.selected_products.push(product);
                }
            }
            ExplorerMsg::ClearSelection => self.selected_products.clear(),
            ExplorerMsg::SetPreviewMode(preview) => self.preview_mode = preview,
            ExplorerMsg::ExportCompleted(summary) => self.last_export = Some(summary),
            ExplorerMsg::PageLoaded(page) => {
                let has_docs = !page.docs.is_empty();
                self.current_docs = page.docs;
                self.total_found = page.num_found;
                self.browse.next_cursor = page
                    .next_cursor_mark
                    .filter(|next| has_docs && *next != self.browse.cursor_mark);
            }
            ExplorerMsg::NextPage => {
                if let Some(next) = self.browse.next_cursor.take() {
                    self.browse.cursor_mark = next;
                    self.browse.current_page += 1;
                    self.current_docs.clear();
                }
            }
            ExplorerMsg::PreviousPage => {
                if self.browse.current_page > 1 {
                    self.reset_pagination();
                }
            }
        }
        self
    }

    fn reset_pagination(&mut self) {
        self.browse = BrowseCursor::default();
        self.current_docs.clear();
        self.total_found = 0;
    }

    /// Export mode selected by the preview toggle.
    #[must_use]
    pub const fn export_mode(&self) -> ExportMode {
        if self.preview_mode {
            ExportMode::Preview
        } else {
            ExportMode::Full
        }
    }

    /// Filters for an export: the selected products replace the product
    /// filter when any are selected.
    #[must_use]
    pub fn export_filters(&self) -> FilterSet {
        let mut filters = self.filters.clone();
        if !self.selected_products.is_empty() {
            filters.product.clone_from(&self.selected_products);
        }
        filters
    }

    /// Query for the current browse page.
    #[must_use]
    pub fn browse_query(&self) -> QueryParams {
        self.export_filters()
            .to_query()
            .with("rows", BROWSE_ROWS.to_string())
            .with("cursorMark", self.browse.cursor_mark.as_str())
    }
}
