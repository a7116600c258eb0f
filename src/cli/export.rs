//! Review export operation.

use std::io;

use review_explorer::export::{
    ExportEngine, ExportLog, ExportLogEntry, ExportOutcome, ExportPhase, ExportProgress,
    ExportRequest, FileKind, ProgressSink,
};
use review_explorer::results::ResultsPager;
use review_explorer::state::ExportSummary;
use review_explorer::{ExplorerConfig, ExplorerError, ExplorerMsg, ExplorerState, ExportMode};

use super::output::{Destination, status, write_documents, write_results_page};

/// Progress reporting for terminal use: events go to `tracing`, and a
/// status line per page goes to stderr.
#[derive(Debug, Default)]
pub struct TerminalProgress;

impl ProgressSink for TerminalProgress {
    fn phase_changed(&mut self, phase: &ExportPhase) {
        tracing::debug!(?phase, "export phase changed");
    }

    fn page_fetched(&mut self, progress: &ExportProgress) {
        tracing::info!(
            page = progress.page,
            documents = progress.documents,
            "page fetched"
        );
        status(&progress_line(progress));
    }

    fn overlap_detected(&mut self, entry: &ExportLogEntry) {
        status(&format!(
            "warning: {} was already exported on {} for an overlapping date range",
            entry.product,
            entry.export_timestamp.format("%Y-%m-%d %H:%M")
        ));
    }
}

fn progress_line(progress: &ExportProgress) -> String {
    format!(
        "page {}/{}: {} of {} reviews ({}%)",
        progress.page,
        progress.expected_pages,
        progress.documents,
        progress.total,
        progress.percent()
    )
}

/// Runs a preview or full export and writes the documents.
///
/// The documents go to `--output` (a generated file name by default), and
/// the `--page` results page is shown on stdout. When a page request fails,
/// the documents gathered so far are still written before the error is
/// returned.
///
/// # Errors
///
/// Returns configuration and filter errors, the request error that aborted
/// the export, and I/O errors while writing.
pub fn run(config: &ExplorerConfig) -> Result<(), ExplorerError> {
    let filters = config.resolve_filters()?;
    let settings = config.export_settings()?;
    let format = config.export_format()?;
    let gateway = super::gateway(config)?;

    let selection = ExplorerState::default()
        .update(ExplorerMsg::LoadedFilters(filters))
        .update(ExplorerMsg::SetPreviewMode(
            settings.mode() == ExportMode::Preview,
        ));
    let request = ExportRequest {
        filters: selection.export_filters(),
        settings,
    };
    tracing::info!(filters = %request.filters.summary(), "export requested");

    let outcome = ExportEngine::new(&gateway)
        .with_log(ExportLog::new(config.export_log_path()))
        .run(&request, &mut TerminalProgress);
    let summary = summarise(&selection, &outcome);
    let state = selection.update(ExplorerMsg::ExportCompleted(summary));

    if let Some(error) = &outcome.log_error {
        status(&format!("warning: export log not updated: {error}"));
    }
    if matches!(outcome.phase, ExportPhase::Aborted(_)) && outcome.docs.is_empty() {
        if let Some(error) = outcome.error() {
            return Err(error.clone());
        }
        status("No reviews match the filters.");
        return Ok(());
    }

    let kind = match state.export_mode() {
        ExportMode::Preview => FileKind::Preview,
        ExportMode::Full => FileKind::Complete,
    };
    let destination = Destination::resolve(config.output.as_deref(), &request.filters, kind, format);
    write_documents(&destination, format, &outcome.docs)?;

    if let Destination::File(path) = &destination {
        status(&format!("Saved {} reviews to {path}", outcome.docs.len()));
        let mut pager = ResultsPager::new(outcome.docs.len(), config.results_page_size())?;
        pager.go_to(usize::try_from(config.page).unwrap_or(usize::MAX));
        write_results_page(&mut io::stdout().lock(), &pager, &outcome.docs)?;
    }
    if let Some(summary) = state.last_export {
        status(&summary_line(&summary));
    }

    outcome.error().cloned().map_or(Ok(()), Err)
}

fn summarise(state: &ExplorerState, outcome: &ExportOutcome) -> ExportSummary {
    ExportSummary {
        mode: state.export_mode(),
        documents: outcome.docs.len(),
        total: outcome.total,
        stop_reason: outcome.stop_reason(),
    }
}

fn summary_line(summary: &ExportSummary) -> String {
    let mode = match summary.mode {
        ExportMode::Preview => "Preview",
        ExportMode::Full => "Export",
    };
    summary.stop_reason.map_or_else(
        || {
            format!(
                "{mode} interrupted after {} of {} reviews",
                summary.documents, summary.total
            )
        },
        |reason| {
            format!(
                "{mode} finished: {} of {} reviews ({})",
                summary.documents,
                summary.total,
                reason.describe()
            )
        },
    )
}
