//! HTTP gateway behaviour against a local mock server.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use octo_client::{GraphqlGateway, HttpGateway, MAX_ERROR_BODY_CHARS};
use octo_core::{ConnectionSettings, Error, FilterOperator, FieldFilter, Paging, QueryBuilder};

fn gateway(server: &MockServer) -> HttpGateway {
    let settings = ConnectionSettings::new(format!("{}/", server.uri()), "meshtest", "secret-token")
        .with_timeout(Duration::from_millis(500));
    HttpGateway::new(settings).unwrap()
}

#[tokio::test]
async fn test_posts_query_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tenants/meshtest/GraphQL"))
        .and(header("authorization", "Bearer secret-token"))
        .and(body_partial_json(json!({"variables": {"ckId": "Basic/Machine"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"runtime": {"runtimeEntities": {"totalCount": 42}}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = QueryBuilder::default().count_entities("Basic/Machine").unwrap();
    let response = gateway(&server).execute(&request, None).await.unwrap();
    assert_eq!(
        response.at(&["runtime", "runtimeEntities", "totalCount"]),
        Some(&json!(42))
    );
    assert!(response.warnings.is_empty());
}

#[tokio::test]
async fn test_tenant_override_changes_path() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tenants/other/GraphQL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"x": 1}})))
        .expect(1)
        .mount(&server)
        .await;

    let request = QueryBuilder::default().introspect_query_fields().unwrap();
    gateway(&server).execute(&request, Some("other")).await.unwrap();
}

#[tokio::test]
async fn test_filter_variables_are_typed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"variables": {"fieldFilter": [
            {"attributePath": "count", "operator": "GREATER_THAN", "comparisonValue": 10}
        ]}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"runtime": null}})))
        .expect(1)
        .mount(&server)
        .await;

    let filter = FieldFilter::from_cli("count", FilterOperator::GreaterThan, "10");
    let request = QueryBuilder::default()
        .filter_entities("Basic/Machine", &filter, &Paging::default(), None)
        .unwrap();
    gateway(&server).execute(&request, None).await.unwrap();
}

#[tokio::test]
async fn test_unauthorized_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let request = QueryBuilder::default().count_entities("X").unwrap();
    let err = gateway(&server).execute(&request, None).await.unwrap_err();
    assert!(matches!(err, Error::Auth(_)));
    assert!(err.hint().is_some());
}

#[tokio::test]
async fn test_forbidden_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let request = QueryBuilder::default().count_entities("X").unwrap();
    let err = gateway(&server).execute(&request, None).await.unwrap_err();
    assert!(matches!(err, Error::Auth(_)));
}

#[tokio::test]
async fn test_server_error_truncates_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("x".repeat(5000)))
        .mount(&server)
        .await;

    let request = QueryBuilder::default().count_entities("X").unwrap();
    let err = gateway(&server).execute(&request, None).await.unwrap_err();
    assert!(matches!(
        &err,
        Error::Http { status: 502, body, .. } if body.len() == MAX_ERROR_BODY_CHARS
    ));
}

#[tokio::test]
async fn test_non_json_body_is_serialization_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let request = QueryBuilder::default().count_entities("X").unwrap();
    let err = gateway(&server).execute(&request, None).await.unwrap_err();
    assert!(matches!(err, Error::Serialization(_)));
}

#[tokio::test]
async fn test_graphql_errors_without_data_fail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [{"message": "Unknown ckId"}, {"message": "second"}]
        })))
        .mount(&server)
        .await;

    let request = QueryBuilder::default().count_entities("X").unwrap();
    let err = gateway(&server).execute(&request, None).await.unwrap_err();
    assert!(matches!(&err, Error::GraphQl { messages } if messages.len() == 2));
}

#[tokio::test]
async fn test_graphql_errors_with_data_are_warnings() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"runtime": {"runtimeEntities": {"totalCount": 1}}},
            "errors": [{"message": "attribute 'foo' unknown"}]
        })))
        .mount(&server)
        .await;

    let request = QueryBuilder::default().count_entities("X").unwrap();
    let response = gateway(&server).execute(&request, None).await.unwrap();
    assert_eq!(response.warnings, vec!["attribute 'foo' unknown"]);
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": {}}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let request = QueryBuilder::default().count_entities("X").unwrap();
    let err = gateway(&server).execute(&request, None).await.unwrap_err();
    assert!(matches!(err, Error::Timeout { .. }));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    let settings = ConnectionSettings::new("http://127.0.0.1:1", "meshtest", "tok")
        .with_timeout(Duration::from_secs(2));
    let request = QueryBuilder::default().count_entities("X").unwrap();
    let err = HttpGateway::new(settings)
        .unwrap()
        .execute(&request, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Transport { .. }));
}
