//! Client-side pagination over accumulated review documents.

use std::ops::Range;

use crate::api::ExplorerError;

/// Default number of documents shown per results page.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// 1-based page navigation over a fixed number of items.
///
/// Navigation is clamped: moving past either end stays on the boundary page.
///
/// # Example
///
/// ```
/// use review_explorer::results::ResultsPager;
///
/// let mut pager = ResultsPager::new(45, 20).expect("non-zero page size");
/// assert_eq!(pager.page_count(), 3);
/// pager.go_to(9);
/// assert_eq!(pager.current_page(), 3);
/// assert_eq!(pager.range(), 40..45);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultsPager {
    total_items: usize,
    page_size: usize,
    current_page: usize,
}

impl ResultsPager {
    /// Creates a pager positioned on the first page.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::InvalidPagination`] when `page_size` is zero.
    pub fn new(total_items: usize, page_size: usize) -> Result<Self, ExplorerError> {
        if page_size == 0 {
            return Err(ExplorerError::InvalidPagination {
                message: "page size must be at least 1".to_owned(),
            });
        }
        Ok(Self {
            total_items,
            page_size,
            current_page: 1,
        })
    }

    /// Number of pages; an empty result set still has one (empty) page.
    #[must_use]
    pub const fn page_count(&self) -> usize {
        let pages = self.total_items.div_ceil(self.page_size);
        if pages == 0 { 1 } else { pages }
    }

    /// Current page (1-based).
    #[must_use]
    pub const fn current_page(&self) -> usize {
        self.current_page
    }

    /// Items per page.
    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// Total number of items.
    #[must_use]
    pub const fn total_items(&self) -> usize {
        self.total_items
    }

    /// Returns true when a later page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.current_page < self.page_count()
    }

    /// Returns true when an earlier page exists.
    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    /// Moves forward one page, if possible.
    pub const fn next_page(&mut self) {
        if self.has_next() {
            self.current_page += 1;
        }
    }

    /// Moves back one page, if possible.
    pub const fn prev_page(&mut self) {
        if self.has_prev() {
            self.current_page -= 1;
        }
    }

    /// Jumps to `page`, clamped to `1..=page_count`.
    pub fn go_to(&mut self, page: usize) {
        self.current_page = page.clamp(1, self.page_count());
    }

    /// Item indices on the current page.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        let start = self
            .current_page
            .saturating_sub(1)
            .saturating_mul(self.page_size)
            .min(self.total_items);
        let end = start.saturating_add(self.page_size).min(self.total_items);
        start..end
    }

    /// Items on the current page.
    #[must_use]
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        items.get(self.range()).unwrap_or_default()
    }
}
