//! Export sizing, mode selection, and output format.

use std::fmt;
use std::str::FromStr;

use crate::api::ExplorerError;

/// Smallest accepted page size.
pub const MIN_ROWS: u32 = 10;
/// Largest accepted page size.
pub const MAX_ROWS: u32 = 1000;
/// Default page size.
pub const DEFAULT_ROWS: u32 = 100;
/// Smallest accepted preview cap.
pub const MIN_PREVIEW_CAP: u32 = 50;
/// Largest accepted preview cap, also the default.
pub const MAX_PREVIEW_CAP: u32 = 100;
/// Smallest accepted iteration ceiling.
pub const MIN_MAX_PAGES: u32 = 1;
/// Largest accepted iteration ceiling.
pub const MAX_MAX_PAGES: u32 = 200;
/// Default iteration ceiling.
pub const DEFAULT_MAX_PAGES: u32 = 100;

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Flattened comma-separated table.
    Csv,
    /// Raw documents, one JSON object per line.
    Jsonl,
    /// Flattened table in an Excel workbook.
    Xlsx,
}

impl ExportFormat {
    /// File extension used for this format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Jsonl => "jsonl",
            Self::Xlsx => "xlsx",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "jsonl" | "json-lines" | "jsonlines" => Ok(Self::Jsonl),
            "xlsx" | "excel" => Ok(Self::Xlsx),
            _ => Err(ExplorerError::Configuration {
                message: format!(
                    "unsupported export format '{s}': valid options are 'csv', 'jsonl', or 'xlsx'"
                ),
            }),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Whether an export stops after one capped page or follows the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportMode {
    /// A single page capped at the preview limit.
    #[default]
    Preview,
    /// Every page until the cursor is exhausted.
    Full,
}

/// Validated page sizing for an export run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSettings {
    rows: u32,
    mode: ExportMode,
    random_seed: Option<u64>,
    preview_cap: u32,
    max_pages: u32,
}

impl ExportSettings {
    /// Creates settings with the default preview cap and iteration ceiling.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::InvalidPagination`] when `rows` is outside
    /// `10..=1000`.
    pub fn new(rows: u32, mode: ExportMode) -> Result<Self, ExplorerError> {
        check_range("rows", rows, MIN_ROWS, MAX_ROWS)?;
        Ok(Self {
            rows,
            mode,
            random_seed: None,
            preview_cap: MAX_PREVIEW_CAP,
            max_pages: DEFAULT_MAX_PAGES,
        })
    }

    /// Sets the server-side sampling seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.random_seed = seed;
        self
    }

    /// Sets the preview cap.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::InvalidPagination`] when `cap` is outside
    /// `50..=100`.
    pub fn with_preview_cap(mut self, cap: u32) -> Result<Self, ExplorerError> {
        check_range("preview cap", cap, MIN_PREVIEW_CAP, MAX_PREVIEW_CAP)?;
        self.preview_cap = cap;
        Ok(self)
    }

    /// Sets the iteration ceiling for full exports.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::InvalidPagination`] when `max_pages` is
    /// outside `1..=200`.
    pub fn with_max_pages(mut self, max_pages: u32) -> Result<Self, ExplorerError> {
        check_range("max pages", max_pages, MIN_MAX_PAGES, MAX_MAX_PAGES)?;
        self.max_pages = max_pages;
        Ok(self)
    }

    /// Requested rows per page.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Export mode.
    #[must_use]
    pub const fn mode(&self) -> ExportMode {
        self.mode
    }

    /// Sampling seed, if any.
    #[must_use]
    pub const fn random_seed(&self) -> Option<u64> {
        self.random_seed
    }

    /// Preview cap.
    #[must_use]
    pub const fn preview_cap(&self) -> u32 {
        self.preview_cap
    }

    /// Maximum number of page requests.
    #[must_use]
    pub const fn max_pages(&self) -> u32 {
        match self.mode {
            ExportMode::Preview => 1,
            ExportMode::Full => self.max_pages,
        }
    }

    /// The `rows` value actually sent on the wire.
    ///
    /// Preview requests never ask for more than the preview cap.
    #[must_use]
    pub fn page_size(&self) -> u32 {
        match self.mode {
            ExportMode::Preview => self.rows.min(self.preview_cap),
            ExportMode::Full => self.rows,
        }
    }

    /// Upper bound on retained documents, if any.
    ///
    /// A preview keeps at most one capped page even when the server sends
    /// more.
    #[must_use]
    pub fn document_limit(&self) -> Option<usize> {
        match self.mode {
            ExportMode::Preview => usize::try_from(self.page_size()).ok(),
            ExportMode::Full => None,
        }
    }
}

fn check_range(name: &str, value: u32, min: u32, max: u32) -> Result<(), ExplorerError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ExplorerError::InvalidPagination {
            message: format!("{name} must be between {min} and {max}, got {value}"),
        })
    }
}
