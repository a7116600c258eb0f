//! Tests for operation and export format parsing.

use rstest::rstest;

use crate::ExplorerConfig;
use crate::api::ExplorerError;
use crate::config::OperationMode;
use crate::export::ExportFormat;

fn with_operation(operation: &str) -> ExplorerConfig {
    ExplorerConfig {
        operation: Some(operation.to_owned()),
        ..Default::default()
    }
}

#[rstest]
fn operation_defaults_to_quotas() {
    assert_eq!(
        ExplorerConfig::default().operation_mode(),
        Ok(OperationMode::Quotas),
        "should show quotas when no operation is set"
    );
}

#[rstest]
#[case("quotas", OperationMode::Quotas)]
#[case("Catalog", OperationMode::Catalog)]
#[case("reference", OperationMode::Catalog)]
#[case("products", OperationMode::Products)]
#[case("browse", OperationMode::Browse)]
#[case("reviews", OperationMode::Browse)]
#[case("EXPORT", OperationMode::Export)]
fn operation_parses_known_names(#[case] input: &str, #[case] expected: OperationMode) {
    assert_eq!(with_operation(input).operation_mode(), Ok(expected));
}

#[rstest]
fn unknown_operation_is_rejected() {
    let result = with_operation("download").operation_mode();
    assert!(
        matches!(result, Err(ExplorerError::Configuration { ref message }) if message.contains("download")),
        "expected Configuration error, got {result:?}"
    );
}

#[rstest]
fn operation_display_round_trips() {
    for mode in [
        OperationMode::Quotas,
        OperationMode::Catalog,
        OperationMode::Products,
        OperationMode::Browse,
        OperationMode::Export,
    ] {
        assert_eq!(mode.to_string().parse::<OperationMode>(), Ok(mode));
    }
}

#[rstest]
#[case(None, ExportFormat::Csv)]
#[case(Some("jsonl"), ExportFormat::Jsonl)]
#[case(Some("CSV"), ExportFormat::Csv)]
#[case(Some("excel"), ExportFormat::Xlsx)]
fn export_format_defaults_to_csv(#[case] value: Option<&str>, #[case] expected: ExportFormat) {
    let config = ExplorerConfig {
        export_format: value.map(str::to_owned),
        ..Default::default()
    };
    assert_eq!(config.export_format(), Ok(expected));
}
