//! Messages accepted by [`ExplorerState::update`](super::ExplorerState::update).

use crate::api::ReviewPage;
use crate::filters::FilterSet;

use super::ExportSummary;

/// A user action or a completed request.
#[derive(Debug, Clone, PartialEq)]
pub enum ExplorerMsg {
    // Filters
    /// Apply a filter set from the filter panel.
    ApplyFilters(FilterSet),
    /// Clear every filter and the product selection.
    ResetFilters,
    /// Apply a filter set loaded from JSON; its products become the selection.
    LoadedFilters(FilterSet),

    // Product selection
    /// Select or deselect a product.
    ToggleProduct(String),
    /// Deselect every product.
    ClearSelection,

    // Export mode
    /// Switch between preview and full export.
    SetPreviewMode(bool),
    /// An export run finished.
    ExportCompleted(ExportSummary),

    // Browsing
    /// A browse page arrived from `/reviews`.
    PageLoaded(ReviewPage),
    /// Advance to the next browse page.
    NextPage,
    /// Go back; cursor pagination can only restart from the first page.
    PreviousPage,
}
