//! Tests for configuration consistency validation.

use rstest::rstest;

use crate::ExplorerConfig;
use crate::api::ExplorerError;

#[rstest]
fn defaults_are_valid() {
    assert!(
        ExplorerConfig::default().validate().is_ok(),
        "default configuration should validate"
    );
}

#[rstest]
fn rejects_both_filter_sources() {
    let config = ExplorerConfig {
        filters: Some("filters.json".to_owned()),
        filters_json: Some("{}".to_owned()),
        ..Default::default()
    };

    let result = config.validate();
    assert!(
        matches!(result, Err(ExplorerError::Configuration { .. })),
        "should reject conflicting filter sources, got {result:?}"
    );
    assert!(config.resolve_filters().is_err());
}

#[rstest]
#[case::rows_too_small(ExplorerConfig { rows: 5, ..Default::default() })]
#[case::rows_too_large(ExplorerConfig { rows: 5000, ..Default::default() })]
#[case::preview_cap_too_small(ExplorerConfig { preview_cap: 10, ..Default::default() })]
#[case::max_pages_zero(ExplorerConfig { max_pages: 0, ..Default::default() })]
#[case::max_pages_too_large(ExplorerConfig { max_pages: 500, ..Default::default() })]
#[case::page_zero(ExplorerConfig { page: 0, ..Default::default() })]
#[case::page_size_zero(ExplorerConfig { page_size: 0, ..Default::default() })]
fn rejects_out_of_range_sizing(#[case] config: ExplorerConfig) {
    let result = config.validate();
    assert!(
        matches!(result, Err(ExplorerError::InvalidPagination { .. })),
        "expected InvalidPagination, got {result:?}"
    );
}

#[rstest]
fn rejects_zero_timeout() {
    let config = ExplorerConfig {
        request_timeout_seconds: 0,
        ..Default::default()
    };

    assert!(matches!(
        config.validate(),
        Err(ExplorerError::Configuration { .. })
    ));
}

#[rstest]
#[case::operation(ExplorerConfig { operation: Some("sync".to_owned()), ..Default::default() })]
#[case::format(ExplorerConfig { export_format: Some("parquet".to_owned()), ..Default::default() })]
fn rejects_unknown_names(#[case] config: ExplorerConfig) {
    assert!(matches!(
        config.validate(),
        Err(ExplorerError::Configuration { .. })
    ));
}
