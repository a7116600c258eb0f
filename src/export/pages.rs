//! Lazy cursor pagination over `/reviews`.

use crate::api::{Endpoint, ExplorerError, QueryParams, ReviewPage, ReviewsGateway};

use super::model::ExportSettings;

/// Cursor value requesting the first page.
pub const INITIAL_CURSOR: &str = "*";

const ROWS_KEY: &str = "rows";
const CURSOR_KEY: &str = "cursorMark";
const RANDOM_KEY: &str = "random";

/// Why pagination ended without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A page came back without documents.
    EmptyPage,
    /// The response carried no `nextCursorMark`.
    CursorExhausted,
    /// `nextCursorMark` repeated the current cursor.
    CursorStalled,
    /// The iteration ceiling was reached.
    IterationCap,
    /// Preview mode fetched its single page.
    PreviewLimit,
}

impl StopReason {
    /// Short human label.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::EmptyPage => "empty page",
            Self::CursorExhausted => "cursor exhausted",
            Self::CursorStalled => "cursor did not advance",
            Self::IterationCap => "iteration ceiling reached",
            Self::PreviewLimit => "preview limit",
        }
    }
}

/// Finite iterator of review pages following `nextCursorMark`.
///
/// Each call to [`Iterator::next`] issues at most one request. Iteration
/// ends on an empty page, a missing or repeated cursor, the iteration
/// ceiling, or after the first error. The sequence can only be restarted
/// from the first page.
pub struct CursorPages<'g, G: ReviewsGateway + ?Sized> {
    gateway: &'g G,
    base: QueryParams,
    max_pages: u32,
    cursor: String,
    pages_fetched: u32,
    stop: Option<StopReason>,
    failed: bool,
}

impl<'g, G: ReviewsGateway + ?Sized> CursorPages<'g, G> {
    /// Builds a page iterator for `filters` sized by `settings`.
    #[must_use]
    pub fn new(gateway: &'g G, filters: &QueryParams, settings: &ExportSettings) -> Self {
        let mut base = filters.clone().with(ROWS_KEY, settings.page_size().to_string());
        if let Some(seed) = settings.random_seed() {
            base.set(RANDOM_KEY, seed.to_string());
        }
        Self {
            gateway,
            base,
            max_pages: settings.max_pages(),
            cursor: INITIAL_CURSOR.to_owned(),
            pages_fetched: 0,
            stop: None,
            failed: false,
        }
    }

    /// Rewinds to the first page.
    pub fn restart(&mut self) {
        INITIAL_CURSOR.clone_into(&mut self.cursor);
        self.pages_fetched = 0;
        self.stop = None;
        self.failed = false;
    }

    /// Cursor the next request will use.
    #[must_use]
    pub fn cursor(&self) -> &str {
        &self.cursor
    }

    /// Number of page requests that returned a decodable page.
    #[must_use]
    pub const fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    /// Why iteration ended, once it has.
    #[must_use]
    pub const fn stop_reason(&self) -> Option<StopReason> {
        self.stop
    }

    fn fetch_page(&self) -> Result<ReviewPage, ExplorerError> {
        let params = self.base.clone().with(CURSOR_KEY, self.cursor.as_str());
        let value = self.gateway.fetch(Endpoint::Reviews, &params)?;
        ReviewPage::from_result(value)
    }

    fn advance(&mut self, next: Option<&str>) {
        match next {
            None => self.stop = Some(StopReason::CursorExhausted),
            Some(mark) if mark == self.cursor => self.stop = Some(StopReason::CursorStalled),
            Some(mark) => mark.clone_into(&mut self.cursor),
        }
    }
}

impl<G: ReviewsGateway + ?Sized> Iterator for CursorPages<'_, G> {
    type Item = Result<ReviewPage, ExplorerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.stop.is_some() {
            return None;
        }
        if self.pages_fetched >= self.max_pages {
            self.stop = Some(StopReason::IterationCap);
            return None;
        }

        let page = match self.fetch_page() {
            Ok(page) => page,
            Err(error) => {
                self.failed = true;
                return Some(Err(error));
            }
        };
        self.pages_fetched += 1;
        tracing::debug!(
            page = self.pages_fetched,
            docs = page.docs.len(),
            cursor = %self.cursor,
            "fetched review page"
        );

        if page.docs.is_empty() {
            self.stop = Some(StopReason::EmptyPage);
            return None;
        }
        self.advance(page.next_cursor_mark.as_deref());
        Some(Ok(page))
    }
}

#[cfg(test)]
mod tests {
    use mockall::Sequence;
    use rstest::{fixture, rstest};
    use serde_json::json;

    use super::*;
    use crate::api::MockReviewsGateway;
    use crate::export::model::ExportMode;

    #[fixture]
    fn full() -> ExportSettings {
        ExportSettings::new(100, ExportMode::Full)
            .and_then(|s| s.with_max_pages(5))
            .expect("valid settings")
    }

    fn page(docs: usize, next: Option<&str>) -> serde_json::Value {
        let list: Vec<serde_json::Value> = (0..docs).map(|i| json!({"id": i})).collect();
        match next {
            Some(mark) => json!({"docs": list, "numFound": 999, "nextCursorMark": mark}),
            None => json!({"docs": list, "numFound": 999}),
        }
    }

    #[rstest]
    fn follows_cursor_until_exhausted(full: ExportSettings) {
        let mut gateway = MockReviewsGateway::new();
        let mut seq = Sequence::new();
        gateway
            .expect_fetch()
            .withf(|_, params| params.get("cursorMark") == Some("*"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(page(2, Some("A"))));
        gateway
            .expect_fetch()
            .withf(|_, params| params.get("cursorMark") == Some("A"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(page(1, None)));

        let mut pages = CursorPages::new(&gateway, &QueryParams::new(), &full);
        let sizes: Vec<usize> = pages
            .by_ref()
            .map(|result| result.expect("page").docs.len())
            .collect();

        assert_eq!(sizes, vec![2, 1]);
        assert_eq!(pages.pages_fetched(), 2);
        assert_eq!(pages.stop_reason(), Some(StopReason::CursorExhausted));
    }

    #[rstest]
    fn stalled_cursor_terminates(full: ExportSettings) {
        let mut gateway = MockReviewsGateway::new();
        gateway
            .expect_fetch()
            .times(2)
            .returning(|_, _| Ok(page(3, Some("SAME"))));

        let mut pages = CursorPages::new(&gateway, &QueryParams::new(), &full);
        assert_eq!(pages.by_ref().count(), 2);
        assert_eq!(pages.stop_reason(), Some(StopReason::CursorStalled));
    }

    #[rstest]
    fn always_advancing_cursor_hits_iteration_cap(full: ExportSettings) {
        let mut gateway = MockReviewsGateway::new();
        let mut counter = 0_u32;
        gateway.expect_fetch().times(5).returning(move |_, _| {
            counter += 1;
            Ok(page(1, Some(&format!("C{counter}"))))
        });

        let mut pages = CursorPages::new(&gateway, &QueryParams::new(), &full);
        assert_eq!(pages.by_ref().count(), 5);
        assert_eq!(pages.stop_reason(), Some(StopReason::IterationCap));
        assert!(pages.next().is_none());
    }

    #[rstest]
    fn empty_page_ends_iteration(full: ExportSettings) {
        let mut gateway = MockReviewsGateway::new();
        gateway
            .expect_fetch()
            .times(1)
            .returning(|_, _| Ok(page(0, Some("A"))));

        let mut pages = CursorPages::new(&gateway, &QueryParams::new(), &full);
        assert!(pages.next().is_none());
        assert_eq!(pages.stop_reason(), Some(StopReason::EmptyPage));
    }

    #[rstest]
    fn error_is_yielded_once_then_iteration_ends(full: ExportSettings) {
        let mut gateway = MockReviewsGateway::new();
        gateway.expect_fetch().times(1).returning(|_, _| {
            Err(ExplorerError::Api {
                endpoint: "/reviews".to_owned(),
                status: 500,
                message: "boom".to_owned(),
            })
        });

        let mut pages = CursorPages::new(&gateway, &QueryParams::new(), &full);
        assert!(matches!(pages.next(), Some(Err(ExplorerError::Api { .. }))));
        assert!(pages.next().is_none());
        assert_eq!(pages.stop_reason(), None);
    }

    #[rstest]
    fn restart_rewinds_to_first_cursor(full: ExportSettings) {
        let mut gateway = MockReviewsGateway::new();
        gateway
            .expect_fetch()
            .withf(|_, params| params.get("cursorMark") == Some("*"))
            .times(2)
            .returning(|_, _| Ok(page(1, None)));

        let mut pages = CursorPages::new(&gateway, &QueryParams::new(), &full);
        assert_eq!(pages.by_ref().count(), 1);
        pages.restart();
        assert_eq!(pages.cursor(), INITIAL_CURSOR);
        assert_eq!(pages.pages_fetched(), 0);
        assert_eq!(pages.by_ref().count(), 1);
    }

    #[rstest]
    fn request_carries_rows_seed_and_filters() {
        let settings = ExportSettings::new(1000, ExportMode::Preview)
            .and_then(|s| s.with_preview_cap(60))
            .expect("valid settings")
            .with_seed(Some(7));
        let mut gateway = MockReviewsGateway::new();
        gateway
            .expect_fetch()
            .withf(|endpoint, params| {
                *endpoint == Endpoint::Reviews
                    && params.iter().collect::<Vec<_>>()
                        == vec![
                            ("brand", "AVENE"),
                            ("rows", "60"),
                            ("random", "7"),
                            ("cursorMark", "*"),
                        ]
            })
            .times(1)
            .returning(|_, _| Ok(page(60, Some("A"))));

        let filters = QueryParams::new().with("brand", "AVENE");
        let mut pages = CursorPages::new(&gateway, &filters, &settings);
        assert_eq!(pages.by_ref().count(), 1);
        assert_eq!(pages.stop_reason(), Some(StopReason::IterationCap));
    }
}
