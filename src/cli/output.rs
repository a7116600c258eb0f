//! Output formatting utilities for CLI operations.

use std::io::{self, Write};

use camino::{Utf8Path, Utf8PathBuf};
use review_explorer::api::{Category, Quotas, ReviewDocument, display_value};
use review_explorer::catalog::ProductIndex;
use review_explorer::export::{
    ExportFormat, FileKind, export_file_name, flatten, write_csv, write_jsonl, write_xlsx,
};
use review_explorer::files::{self, WriteMode};
use review_explorer::results::ResultsPager;
use review_explorer::{ExplorerError, FilterSet};

/// Value of `--output` that selects stdout.
pub const STDOUT_MARKER: &str = "-";

const CONTENT_PREVIEW_CHARS: usize = 80;

/// Where exported documents are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Standard output.
    Stdout,
    /// A file, created or truncated.
    File(Utf8PathBuf),
}

impl Destination {
    /// Resolves `--output`: unset uses a generated name in the working
    /// directory, `-` selects stdout, and a trailing `/` places a generated
    /// name in that directory.
    #[must_use]
    pub fn resolve(
        output: Option<&str>,
        filters: &FilterSet,
        kind: FileKind,
        format: ExportFormat,
    ) -> Self {
        let generated = || export_file_name(filters, kind, format.extension());
        match output {
            None => Self::File(Utf8PathBuf::from(generated())),
            Some(STDOUT_MARKER) => Self::Stdout,
            Some(dir) if dir.ends_with('/') => Self::File(Utf8Path::new(dir).join(generated())),
            Some(path) => Self::File(files::utf8_path(path)),
        }
    }
}

/// Writes `docs` in `format` to `destination`.
pub fn write_documents(
    destination: &Destination,
    format: ExportFormat,
    docs: &[ReviewDocument],
) -> Result<(), ExplorerError> {
    match destination {
        Destination::Stdout => write_documents_to(&mut io::stdout().lock(), format, docs),
        Destination::File(path) => {
            let mut file = files::open_for_write(path, "export", WriteMode::Create)?;
            write_documents_to(&mut file, format, docs)?;
            file.flush().map_err(|error| io_error(&error))
        }
    }
}

/// Writes `docs` in `format` to the given writer.
pub fn write_documents_to<W: Write>(
    writer: &mut W,
    format: ExportFormat,
    docs: &[ReviewDocument],
) -> Result<(), ExplorerError> {
    match format {
        ExportFormat::Csv => write_csv(writer, &flatten(docs)),
        ExportFormat::Jsonl => write_jsonl(writer, docs),
        ExportFormat::Xlsx => write_xlsx(writer, &flatten(docs)),
    }
}

/// Writes quota usage.
pub fn write_quotas<W: Write>(writer: &mut W, quotas: &Quotas) -> Result<(), ExplorerError> {
    writeln!(writer, "API quotas:").map_err(|e| io_error(&e))?;
    for (label, value) in [
        ("Used volume", &quotas.used_volume),
        ("Remaining volume", &quotas.remaining_volume),
        ("Quota", &quotas.quota),
        ("End date", &quotas.end_date),
    ] {
        writeln!(writer, "  {label}: {}", display_value(value)).map_err(|e| io_error(&e))?;
    }
    Ok(())
}

/// Writes categories with their subcategories.
pub fn write_categories<W: Write>(
    writer: &mut W,
    categories: &[Category],
) -> Result<(), ExplorerError> {
    writeln!(writer, "Categories ({}):", categories.len()).map_err(|e| io_error(&e))?;
    for category in categories {
        if category.subcategories.is_empty() {
            writeln!(writer, "  {}", category.category).map_err(|e| io_error(&e))?;
        } else {
            writeln!(
                writer,
                "  {}: {}",
                category.category,
                category.subcategories.join(", ")
            )
            .map_err(|e| io_error(&e))?;
        }
    }
    Ok(())
}

/// Writes a titled list of names.
pub fn write_name_list<W: Write>(
    writer: &mut W,
    title: &str,
    names: &[String],
) -> Result<(), ExplorerError> {
    writeln!(writer, "{title} ({}):", names.len()).map_err(|e| io_error(&e))?;
    for name in names {
        writeln!(writer, "  {name}").map_err(|e| io_error(&e))?;
    }
    Ok(())
}

/// Writes products grouped by brand.
pub fn write_products<W: Write>(writer: &mut W, index: &ProductIndex) -> Result<(), ExplorerError> {
    if index.is_empty() {
        return writeln!(writer, "No products match the filters.").map_err(|e| io_error(&e));
    }
    for brand in index.brands() {
        writeln!(writer, "{brand}:").map_err(|e| io_error(&e))?;
        for product in index.for_brand(brand) {
            match product.review_count {
                Some(count) => writeln!(writer, "  {} ({count} reviews)", product.name),
                None => writeln!(writer, "  {}", product.name),
            }
            .map_err(|e| io_error(&e))?;
        }
    }
    writeln!(writer).map_err(|e| io_error(&e))?;
    writeln!(writer, "{} products", index.len()).map_err(|e| io_error(&e))
}

/// Writes one line per document: id, date, brand, product, rating, and the
/// start of the review text.
pub fn write_review_lines<W: Write>(
    writer: &mut W,
    docs: &[ReviewDocument],
) -> Result<(), ExplorerError> {
    for doc in docs {
        let field = |key: &str| doc.get(key).map(display_value).unwrap_or_default();
        let content: String = field("content trad").chars().take(CONTENT_PREVIEW_CHARS).collect();
        writeln!(
            writer,
            "{} | {} | {} | {} | {} | {content}",
            field("id"),
            field("date"),
            field("brand"),
            field("product"),
            field("rating"),
        )
        .map_err(|e| io_error(&e))?;
    }
    Ok(())
}

/// Writes the current results page of `docs` followed by a position line.
pub fn write_results_page<W: Write>(
    writer: &mut W,
    pager: &ResultsPager,
    docs: &[ReviewDocument],
) -> Result<(), ExplorerError> {
    write_review_lines(writer, pager.slice(docs))?;
    let range = pager.range();
    writeln!(
        writer,
        "Page {} of {} (reviews {}-{} of {})",
        pager.current_page(),
        pager.page_count(),
        range.start.saturating_add(1).min(range.end),
        range.end,
        pager.total_items()
    )
    .map_err(|e| io_error(&e))?;
    if pager.has_next() {
        writeln!(writer, "More pages available (use --page).").map_err(|e| io_error(&e))?;
    }
    Ok(())
}

/// Writes a status line to stderr; failures are ignored.
pub fn status(message: &str) {
    let mut stderr = io::stderr().lock();
    if writeln!(stderr, "{message}").is_err() {
        tracing::debug!("stderr unavailable for status output");
    }
}

/// Converts an I/O error to an [`ExplorerError::Io`].
pub(crate) fn io_error(error: &io::Error) -> ExplorerError {
    ExplorerError::Io {
        message: error.to_string(),
    }
}
