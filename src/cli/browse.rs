//! Review browsing operation.

use std::io::{self, Write};

use review_explorer::api::{Endpoint, ReviewPage};
use review_explorer::export::FileKind;
use review_explorer::{
    ExplorerConfig, ExplorerError, ExplorerMsg, ExplorerState, ReviewsGateway,
};

use super::output::{Destination, io_error, status, write_documents, write_review_lines};

/// Shows server page `--page` of the matching reviews.
///
/// Pages are reached by following the cursor from the first page. When the
/// cursor runs out first, the last available page is shown. With
/// `--output`, the page's documents are also written to a file.
///
/// # Errors
///
/// Returns filter loading errors, and gateway or decoding errors from
/// `/reviews`.
pub fn run(config: &ExplorerConfig) -> Result<(), ExplorerError> {
    let filters = config.resolve_filters()?;
    let gateway = super::gateway(config)?;

    let state = browse_to(
        &gateway,
        ExplorerState::default().update(ExplorerMsg::LoadedFilters(filters)),
        config.page,
    )?;

    let mut stdout = io::stdout().lock();
    write_review_lines(&mut stdout, &state.current_docs)?;
    writeln!(
        stdout,
        "Page {} ({} reviews shown, {} matching)",
        state.browse.current_page,
        state.current_docs.len(),
        state.total_found
    )
    .map_err(|e| io_error(&e))?;

    if let Some(output) = config.output.as_deref() {
        let format = config.export_format()?;
        let destination = Destination::resolve(
            Some(output),
            &state.export_filters(),
            FileKind::Page(state.browse.current_page),
            format,
        );
        write_documents(&destination, format, &state.current_docs)?;
        if let Destination::File(path) = &destination {
            status(&format!("Saved page to {path}"));
        }
    }
    Ok(())
}

/// Loads pages until `target` is reached or the cursor is exhausted.
fn browse_to<G: ReviewsGateway + ?Sized>(
    gateway: &G,
    initial: ExplorerState,
    target: u32,
) -> Result<ExplorerState, ExplorerError> {
    let mut state = load_page(gateway, initial)?;
    while state.browse.current_page < target {
        if state.browse.next_cursor.is_none() {
            tracing::info!(page = state.browse.current_page, "no further pages");
            break;
        }
        state = load_page(gateway, state.update(ExplorerMsg::NextPage))?;
    }
    Ok(state)
}

fn load_page<G: ReviewsGateway + ?Sized>(
    gateway: &G,
    state: ExplorerState,
) -> Result<ExplorerState, ExplorerError> {
    let value = gateway.fetch(Endpoint::Reviews, &state.browse_query())?;
    let page = ReviewPage::from_result(value)?;
    tracing::debug!(
        page = state.browse.current_page,
        docs = page.docs.len(),
        "browse page loaded"
    );
    Ok(state.update(ExplorerMsg::PageLoaded(page)))
}

#[cfg(test)]
mod tests {
    use review_explorer::FilterSet;
    use review_explorer::api::test_support::StubGateway;
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn start() -> ExplorerState {
        ExplorerState::default().update(ExplorerMsg::LoadedFilters(FilterSet::default()))
    }

    #[rstest]
    fn follows_cursor_to_requested_page() {
        let gateway = StubGateway::new()
            .with_response(
                Endpoint::Reviews,
                Ok(json!({"docs": [{"id": "a"}], "numFound": 3, "nextCursorMark": "c1"})),
            )
            .with_response(
                Endpoint::Reviews,
                Ok(json!({"docs": [{"id": "b"}], "numFound": 3, "nextCursorMark": "c2"})),
            );

        let state = browse_to(&gateway, start(), 2).expect("browse should succeed");

        assert_eq!(state.browse.current_page, 2);
        assert_eq!(state.browse.cursor_mark, "c1");
        assert_eq!(gateway.calls(Endpoint::Reviews), 2);
        let cursors: Vec<Option<String>> = gateway
            .requests()
            .iter()
            .map(|(_, params)| params.get("cursorMark").map(str::to_owned))
            .collect();
        assert_eq!(cursors, vec![Some("*".to_owned()), Some("c1".to_owned())]);
    }

    #[rstest]
    fn stops_on_last_page_when_cursor_runs_out() {
        let gateway = StubGateway::new().with_response(
            Endpoint::Reviews,
            Ok(json!({"docs": [{"id": "a"}], "numFound": 1, "nextCursorMark": "*"})),
        );

        let state = browse_to(&gateway, start(), 5).expect("browse should succeed");

        assert_eq!(state.browse.current_page, 1);
        assert_eq!(state.current_docs.len(), 1);
        assert_eq!(gateway.calls(Endpoint::Reviews), 1);
    }

    #[rstest]
    fn null_page_stops_browsing() {
        let gateway = StubGateway::new()
            .with_response(
                Endpoint::Reviews,
                Ok(json!({"docs": [{"id": "a"}], "numFound": 3, "nextCursorMark": "c1"})),
            )
            .with_response(Endpoint::Reviews, Ok(json!(null)));

        let state = browse_to(&gateway, start(), 4).expect("browse should succeed");

        assert_eq!(state.browse.current_page, 2);
        assert!(state.current_docs.is_empty());
        assert_eq!(gateway.calls(Endpoint::Reviews), 2);
    }

    #[rstest]
    fn gateway_errors_propagate() {
        let gateway = StubGateway::new().with_response(
            Endpoint::Reviews,
            Err(ExplorerError::Network {
                message: "refused".to_owned(),
            }),
        );

        assert!(matches!(
            browse_to(&gateway, start(), 1),
            Err(ExplorerError::Network { .. })
        ));
    }
}
