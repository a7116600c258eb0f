//! JSONL (JSON Lines) writer for raw review documents.
//!
//! Documents are written untouched, one JSON object per line, keeping their
//! original field order.

use std::io::Write;

use crate::api::{ExplorerError, ReviewDocument};

/// Writes documents in JSONL format to the given writer.
///
/// # Errors
///
/// Returns [`ExplorerError::Io`] if writing to the output fails or a
/// document cannot be serialized.
pub fn write_jsonl<W: Write>(writer: &mut W, docs: &[ReviewDocument]) -> Result<(), ExplorerError> {
    for doc in docs {
        serde_json::to_writer(&mut *writer, doc).map_err(|e| ExplorerError::Io {
            message: format!("JSON serialization failed: {e}"),
        })?;
        writeln!(writer).map_err(|e| ExplorerError::io("failed to write JSONL", &e))?;
    }
    Ok(())
}
