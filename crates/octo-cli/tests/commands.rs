//! End-to-end command scenarios against a mock gateway.

#![allow(clippy::unwrap_used)]

use clap::Parser;
use serde_json::{Value, json};

use octo_cli::{CliArgs, CommandOutput, OctoCli, OctoConfig, error_lines};
use octo_client::MockGateway;
use octo_core::{Error, Result};

fn cli() -> OctoCli {
    OctoCli::new("octo-explore", OctoConfig::default()).with_version("0.1.0")
}

async fn run(gateway: &MockGateway, argv: &[&str]) -> Result<CommandOutput> {
    let args = CliArgs::try_parse_from(argv).unwrap();
    cli()
        .execute(args.command, None, || Ok(gateway.clone()))
        .await
}

#[tokio::test]
async fn test_graphql_errors_without_data_fail_with_every_message() {
    let gateway = MockGateway::new(vec![json!({
        "data": null,
        "errors": [{"message": "Unknown ckId 'Nope'"}, {"message": "Validation failed"}]
    })]);

    let err = run(&gateway, &["octo-explore", "rt", "list", "Nope"])
        .await
        .unwrap_err();
    assert_eq!(err.exit_code(), 1);

    let lines = error_lines(&err);
    assert_eq!(lines[0], "GraphQL error: Unknown ckId 'Nope'");
    assert_eq!(lines[1], "GraphQL error: Validation failed");
    assert!(lines[2].starts_with("Error: "));
}

#[tokio::test]
async fn test_graphql_errors_with_data_render_and_warn() {
    let gateway = MockGateway::new(vec![json!({
        "data": {"runtime": {"runtimeEntities": {
            "totalCount": 2,
            "edges": [
                {"node": {"rtId": "1", "rtWellKnownName": "Pump-1"}},
                {"node": null}
            ]
        }}},
        "errors": [{"message": "node 2 could not be resolved"}]
    })]);

    let out = run(&gateway, &["octo-explore", "rt", "list", "Basic/Machine"])
        .await
        .unwrap();
    assert_eq!(out.stderr, vec!["GraphQL error: node 2 could not be resolved"]);
    assert!(out.stdout.contains("(1 shown, 2 total)"));
    assert!(out.stdout.contains("  1  Pump-1\n"));
}

#[tokio::test]
async fn test_filter_sends_typed_value() {
    let gateway = MockGateway::with_data(json!({"runtime": {"runtimeEntities": {
        "totalCount": 1,
        "edges": [{"node": {
            "rtId": "7",
            "rtWellKnownName": "Big",
            "attributes": {"items": [{"attributeName": "count", "value": 12}]}
        }}]
    }}}));

    let out = run(
        &gateway,
        &["octo-explore", "rt", "filter", "Basic/Machine", "count", "GREATER_THAN", "10"],
    )
    .await
    .unwrap();
    assert!(out.stdout.starts_with(
        "Filter Basic/Machine where count GREATER_THAN 10 (1 shown, 1 matched):\n\n"
    ));
    assert!(out.stdout.contains("  7  Big  (count=12)\n"));

    let requests = gateway.requests().await;
    let filter = requests[0].request.variable("fieldFilter").unwrap();
    assert_eq!(filter[0]["comparisonValue"], json!(10));
    assert_eq!(filter[0]["operator"], json!("GREATER_THAN"));
}

#[tokio::test]
async fn test_negative_filter_value_and_sort() {
    let gateway = MockGateway::with_data(json!({"runtime": {"runtimeEntities": {"edges": []}}}));
    run(
        &gateway,
        &[
            "octo-explore", "rt", "filter", "Basic/Sensor", "offset", "LESS_THAN", "-3.5",
            "--sort", "offset:desc", "--first", "5",
        ],
    )
    .await
    .unwrap();

    let requests = gateway.requests().await;
    let request = &requests[0].request;
    assert_eq!(request.variable("fieldFilter").unwrap()[0]["comparisonValue"], json!(-3.5));
    assert_eq!(
        request.variable("sortOrder"),
        Some(&json!([{"attributePath": "offset", "sortOrder": "DESCENDING"}]))
    );
    assert_eq!(request.variable("first"), Some(&json!(5)));
}

#[test]
fn test_unknown_operator_is_usage_error() {
    let err = CliArgs::try_parse_from([
        "octo-explore", "rt", "filter", "Basic/Machine", "count", "CONTAINS", "1",
    ])
    .unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(err.to_string().contains("GREATER_THAN"));
}

#[tokio::test]
async fn test_ck_type_ambiguous_short_name_uses_first() {
    let gateway = MockGateway::with_data(json!({"constructionKit": {"types": {"edges": [
        {"node": {"ckTypeId": {"fullName": "System-2.0.2/Entity-1"}, "description": "system"}},
        {"node": {"ckTypeId": {"fullName": "Basic/Entity-1"}, "description": "basic"}}
    ]}}}));

    let out = run(&gateway, &["octo-explore", "ck", "type", "Entity-1"])
        .await
        .unwrap();
    assert!(out.stdout.starts_with("Type: System-2.0.2/Entity-1\n"));
}

#[tokio::test]
async fn test_transport_failure_keeps_hint() {
    let gateway = MockGateway::with_failure(|| {
        Error::transport("https://assets.example.com/tenants/t/GraphQL", "connection refused")
    });

    let err = run(&gateway, &["octo-explore", "introspect", "top"])
        .await
        .unwrap_err();
    let lines = error_lines(&err);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("connection refused"));
}

#[tokio::test]
async fn test_tenant_override_reaches_gateway() {
    let gateway = MockGateway::with_data(json!({"runtime": {"runtimeEntities": {"totalCount": 0}}}));
    let out = run(
        &gateway,
        &["octo-explore", "rt", "count", "Basic/Machine", "--tenant", "other", "--json"],
    )
    .await
    .unwrap();

    let parsed: Value = serde_json::from_str(&out.stdout).unwrap();
    assert_eq!(parsed["totalCount"], json!(0));
    let requests = gateway.requests().await;
    assert_eq!(requests[0].tenant.as_deref(), Some("other"));
}

#[tokio::test]
async fn test_missing_octo_cli_settings_is_config_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    let settings_path = dir.path().join("missing-settings.json");
    std::fs::write(
        &config_path,
        format!(
            "[gateway]\nsettings_file = \"{}\"\n",
            settings_path.display().to_string().replace('\\', "/")
        ),
    )
    .unwrap();

    let config = OctoConfig::load(Some(config_path.to_str().unwrap())).unwrap();
    let err = octo_client::HttpGateway::from_provider(&config).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(err.to_string().contains("octo-cli -c LogIn -i"));
}

#[tokio::test]
async fn test_null_error_metadata_still_renders_partial_data() {
    let gateway = MockGateway::new(vec![json!({
        "data": {"runtime": {"runtimeEntities": {
            "totalCount": 1,
            "edges": [{"node": {"rtId": "1", "rtWellKnownName": "Pump-1"}}]
        }}},
        "errors": [{"message": "partial", "locations": null, "path": null}]
    })]);

    let out = run(&gateway, &["octo-explore", "rt", "list", "Basic/Machine"])
        .await
        .unwrap();
    assert_eq!(out.stderr, vec!["GraphQL error: partial"]);
    assert!(out.stdout.contains("  1  Pump-1\n"));
}

#[tokio::test]
async fn test_location_without_column_keeps_messages() {
    let gateway = MockGateway::new(vec![json!({
        "data": null,
        "errors": [{"message": "Unknown ckId", "locations": [{"line": 3}]}]
    })]);

    let err = run(&gateway, &["octo-explore", "rt", "count", "Nope"])
        .await
        .unwrap_err();
    assert_eq!(error_lines(&err)[0], "GraphQL error: Unknown ckId");
}

#[tokio::test]
async fn test_not_found_after_partial_data_reports_warnings() {
    let gateway = MockGateway::new(vec![json!({
        "data": {"runtime": {"runtimeEntities": {"totalCount": 1, "edges": [{"node": null}]}}},
        "errors": [{"message": "node 42 could not be resolved"}]
    })]);

    let err = run(&gateway, &["octo-explore", "rt", "get", "Basic/Machine", "42"])
        .await
        .unwrap_err();
    assert!(matches!(err.root(), Error::NotFound(_)));
    assert_eq!(err.exit_code(), 1);
    assert_eq!(
        error_lines(&err),
        vec![
            "GraphQL error: node 42 could not be resolved".to_string(),
            "Error: Not found: entity not found: ckId=Basic/Machine rtId=42".to_string(),
        ]
    );
}
