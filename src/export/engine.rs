//! The export loop: metrics total, cursor paging, and log bookkeeping.
//!
//! An export moves through `Idle → FetchingMetricsTotal → Paging → Done` or
//! ends in `Aborted`. A zero total aborts before any page is requested. A
//! failed page request aborts as well, but the documents gathered so far are
//! kept in the [`ExportOutcome`].

use chrono::Utc;

use crate::api::{
    Endpoint, ExplorerError, MetricsSummary, QueryParams, ReviewDocument, ReviewsGateway, decode,
};
use crate::filters::FilterSet;

use super::log::{ExportLog, ExportLogEntry, entries_for_export};
use super::model::{ExportMode, ExportSettings};
use super::pages::{CursorPages, INITIAL_CURSOR, StopReason};

/// What to export and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    /// Review filters.
    pub filters: FilterSet,
    /// Page sizing and mode.
    pub settings: ExportSettings,
}

/// Why an export ended early.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    /// `/metrics` reported no matching reviews.
    ZeroTotal,
    /// A request failed.
    Failed(ExplorerError),
}

/// Export state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportPhase {
    /// Nothing requested yet.
    Idle,
    /// Waiting for the `/metrics` total.
    FetchingMetricsTotal,
    /// About to request the page at `cursor`.
    Paging {
        /// Cursor of the next request.
        cursor: String,
    },
    /// Finished normally.
    Done(StopReason),
    /// Finished early.
    Aborted(AbortReason),
}

/// Progress after one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportProgress {
    /// Pages fetched so far.
    pub page: u32,
    /// `ceil(total / rows)`; display only.
    pub expected_pages: u64,
    /// Documents retained so far.
    pub documents: usize,
    /// Total reported by `/metrics`.
    pub total: u64,
}

impl ExportProgress {
    /// Completion percentage, clamped to 100.
    #[must_use]
    pub fn percent(&self) -> u64 {
        u64::try_from(self.documents)
            .unwrap_or(u64::MAX)
            .saturating_mul(100)
            .checked_div(self.total)
            .map_or(100, |value| value.min(100))
    }
}

/// Receives export progress.
pub trait ProgressSink {
    /// Called on every state transition.
    fn phase_changed(&mut self, _phase: &ExportPhase) {}

    /// Called after each retained page.
    fn page_fetched(&mut self, _progress: &ExportProgress) {}

    /// Called for each prior log entry overlapping a full export.
    fn overlap_detected(&mut self, _entry: &ExportLogEntry) {}
}

/// Sink that ignores progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {}

/// Result of one export run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
    /// Documents retained, possibly partial when aborted.
    pub docs: Vec<ReviewDocument>,
    /// Total reported by `/metrics`.
    pub total: u64,
    /// Page requests that returned a page.
    pub pages_fetched: u32,
    /// Terminal phase.
    pub phase: ExportPhase,
    /// Prior log entries overlapping this export.
    pub overlaps: Vec<ExportLogEntry>,
    /// Log entries appended.
    pub logged_entries: usize,
    /// Failure while appending to the log; the export itself succeeded.
    pub log_error: Option<ExplorerError>,
}

impl ExportOutcome {
    const fn new() -> Self {
        Self {
            docs: Vec::new(),
            total: 0,
            pages_fetched: 0,
            phase: ExportPhase::Idle,
            overlaps: Vec::new(),
            logged_entries: 0,
            log_error: None,
        }
    }

    /// Stop reason of a completed export.
    #[must_use]
    pub const fn stop_reason(&self) -> Option<StopReason> {
        match self.phase {
            ExportPhase::Done(reason) => Some(reason),
            _ => None,
        }
    }

    /// The request error that aborted the export, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&ExplorerError> {
        match &self.phase {
            ExportPhase::Aborted(AbortReason::Failed(error)) => Some(error),
            _ => None,
        }
    }

    /// Returns true when the export ended normally.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        matches!(self.phase, ExportPhase::Done(_))
    }
}

/// Drives `/metrics` and `/reviews` for one export.
pub struct ExportEngine<'g, G: ReviewsGateway + ?Sized> {
    gateway: &'g G,
    log: Option<ExportLog>,
}

impl<'g, G: ReviewsGateway + ?Sized> ExportEngine<'g, G> {
    /// Creates an engine that keeps no export log.
    #[must_use]
    pub const fn new(gateway: &'g G) -> Self {
        Self { gateway, log: None }
    }

    /// Records completed full exports in `log`.
    #[must_use]
    pub fn with_log(mut self, log: ExportLog) -> Self {
        self.log = Some(log);
        self
    }

    /// Runs the export to completion.
    ///
    /// Errors never escape: they end the run in [`ExportPhase::Aborted`]
    /// with the documents fetched so far.
    pub fn run(&self, request: &ExportRequest, sink: &mut dyn ProgressSink) -> ExportOutcome {
        let mut outcome = ExportOutcome::new();
        let query = request.filters.to_query();
        let settings = &request.settings;

        enter(&mut outcome, sink, ExportPhase::FetchingMetricsTotal);
        let total = match self.metrics_total(&query) {
            Ok(0) => {
                tracing::info!("no reviews match the filters");
                enter(&mut outcome, sink, ExportPhase::Aborted(AbortReason::ZeroTotal));
                return outcome;
            }
            Ok(total) => total,
            Err(error) => {
                tracing::warn!("metrics lookup failed: {error}");
                enter(&mut outcome, sink, ExportPhase::Aborted(AbortReason::Failed(error)));
                return outcome;
            }
        };
        outcome.total = total;

        if settings.mode() == ExportMode::Full {
            outcome.overlaps = self.overlaps(&request.filters);
            for entry in &outcome.overlaps {
                sink.overlap_detected(entry);
            }
        }

        let expected_pages = total.div_ceil(u64::from(settings.page_size()));
        tracing::info!(total, expected_pages, mode = ?settings.mode(), "starting export");

        let mut pages = CursorPages::new(self.gateway, &query, settings);
        enter(
            &mut outcome,
            sink,
            ExportPhase::Paging {
                cursor: INITIAL_CURSOR.to_owned(),
            },
        );
        while let Some(result) = pages.next() {
            outcome.pages_fetched = pages.pages_fetched();
            match result {
                Ok(page) => outcome.docs.extend(page.docs),
                Err(error) => {
                    tracing::warn!(
                        kept = outcome.docs.len(),
                        "page request failed: {error}"
                    );
                    enter(&mut outcome, sink, ExportPhase::Aborted(AbortReason::Failed(error)));
                    return outcome;
                }
            }
            if let Some(limit) = settings.document_limit() {
                outcome.docs.truncate(limit);
            }
            sink.page_fetched(&ExportProgress {
                page: outcome.pages_fetched,
                expected_pages,
                documents: outcome.docs.len(),
                total,
            });
            if pages.stop_reason().is_none() && outcome.pages_fetched < settings.max_pages() {
                enter(
                    &mut outcome,
                    sink,
                    ExportPhase::Paging {
                        cursor: pages.cursor().to_owned(),
                    },
                );
            }
        }

        let reason = match (settings.mode(), pages.stop_reason()) {
            (ExportMode::Preview, None | Some(StopReason::IterationCap)) => {
                StopReason::PreviewLimit
            }
            (_, Some(reason)) => reason,
            (ExportMode::Full, None) => StopReason::IterationCap,
        };
        tracing::info!(
            documents = outcome.docs.len(),
            pages = outcome.pages_fetched,
            reason = reason.describe(),
            "export finished"
        );
        enter(&mut outcome, sink, ExportPhase::Done(reason));

        if settings.mode() == ExportMode::Full {
            self.record(request, &mut outcome);
        }
        outcome
    }

    fn metrics_total(&self, query: &QueryParams) -> Result<u64, ExplorerError> {
        let value = self.gateway.fetch(Endpoint::Metrics, query)?;
        let metrics: MetricsSummary = decode(Endpoint::Metrics, value)?;
        Ok(metrics.nb_docs)
    }

    fn overlaps(&self, filters: &FilterSet) -> Vec<ExportLogEntry> {
        let Some(log) = &self.log else {
            return Vec::new();
        };
        match log.overlapping(filters) {
            Ok(entries) => {
                for entry in &entries {
                    tracing::warn!(
                        product = %entry.product,
                        exported_at = %entry.export_timestamp,
                        "date range overlaps a previous export"
                    );
                }
                entries
            }
            Err(error) => {
                tracing::warn!("export log unreadable, skipping overlap check: {error}");
                Vec::new()
            }
        }
    }

    fn record(&self, request: &ExportRequest, outcome: &mut ExportOutcome) {
        let Some(log) = &self.log else {
            return;
        };
        let entries = entries_for_export(
            &request.filters,
            &request.settings,
            &outcome.docs,
            Utc::now(),
        );
        match log.append(&entries) {
            Ok(count) => outcome.logged_entries = count,
            Err(error) => {
                tracing::warn!("failed to append export log: {error}");
                outcome.log_error = Some(error);
            }
        }
    }
}

fn enter(outcome: &mut ExportOutcome, sink: &mut dyn ProgressSink, phase: ExportPhase) {
    tracing::trace!(?phase, "export phase");
    sink.phase_changed(&phase);
    outcome.phase = phase;
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
