//! Review export: cursor paging, flattening, writers, and the export log.
//!
//! # Pipeline
//!
//! An [`ExportEngine`] asks `/metrics` for the total, then walks `/reviews`
//! through [`CursorPages`] until the cursor is exhausted, stalls, or the
//! iteration ceiling is reached. Preview runs stop after one capped page.
//! Completed full exports are appended to the [`ExportLog`].
//!
//! The accumulated documents are written either raw as JSON Lines or
//! flattened into a fixed-column table, as CSV or as an Excel workbook.

mod attributes;
mod engine;
mod filename;
mod flatten;
mod jsonl;
mod log;
mod model;
mod pages;
mod table;
mod xlsx;

pub use attributes::{AttributeMentions, PREDEFINED_ATTRIBUTES, Sentiment, parse_attribute_list};
pub use engine::{
    AbortReason, ExportEngine, ExportOutcome, ExportPhase, ExportProgress, ExportRequest,
    NoProgress, ProgressSink,
};
pub use filename::{FileKind, export_file_name};
pub use flatten::{FlatTable, flatten};
pub use jsonl::write_jsonl;
pub use log::{DEFAULT_LOG_FILE, ExportLog, ExportLogEntry, entries_for_export};
pub use model::{
    DEFAULT_MAX_PAGES, DEFAULT_ROWS, ExportFormat, ExportMode, ExportSettings, MAX_PREVIEW_CAP,
};
pub use pages::{CursorPages, INITIAL_CURSOR, StopReason};
pub use table::write_csv;
pub use xlsx::write_xlsx;
