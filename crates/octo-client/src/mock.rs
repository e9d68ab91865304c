//! Mock gateway for testing.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use octo_core::{Error, QueryRequest, Result};

use crate::gateway::GraphqlGateway;
use crate::response::{GatewayResponse, GraphqlResponse};

type FailureFn = Arc<dyn Fn() -> Error + Send + Sync>;

#[derive(Clone)]
enum Canned {
    Body(Value),
    Failure(FailureFn),
}

/// A request the mock received.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub request: QueryRequest,
    pub tenant: Option<String>,
}

/// Gateway that answers with canned response bodies.
///
/// Bodies are full `{ data, errors }` envelopes and go through the same
/// classification as real responses. Replies are returned in order and
/// cycle once exhausted; every request is recorded.
#[derive(Clone, Default)]
pub struct MockGateway {
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    canned: Vec<Canned>,
    index: usize,
    requests: Vec<RecordedRequest>,
}

impl MockGateway {
    /// Creates a mock returning `bodies` in order.
    ///
    /// # Examples
    ///
    /// ```
    /// use octo_client::MockGateway;
    /// use serde_json::json;
    ///
    /// let gateway = MockGateway::new(vec![
    ///     json!({"data": {"runtime": {"runtimeEntities": {"totalCount": 3}}}}),
    /// ]);
    /// ```
    pub fn new(bodies: Vec<Value>) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                canned: bodies.into_iter().map(Canned::Body).collect(),
                ..MockState::default()
            })),
        }
    }

    /// Creates a mock with a single `data` payload.
    pub fn with_data(data: Value) -> Self {
        Self::new(vec![serde_json::json!({ "data": data })])
    }

    /// Creates a mock whose every call fails with the error `make` builds.
    pub fn with_failure(make: impl Fn() -> Error + Send + Sync + 'static) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                canned: vec![Canned::Failure(Arc::new(make))],
                ..MockState::default()
            })),
        }
    }

    /// Requests received so far.
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().await.requests.clone()
    }

    /// Number of requests received so far.
    pub async fn request_count(&self) -> usize {
        self.state.lock().await.requests.len()
    }
}

#[async_trait]
impl GraphqlGateway for MockGateway {
    async fn execute(
        &self,
        request: &QueryRequest,
        tenant: Option<&str>,
    ) -> Result<GatewayResponse> {
        let mut state = self.state.lock().await;
        state.requests.push(RecordedRequest {
            request: request.clone(),
            tenant: tenant.map(str::to_string),
        });

        if state.canned.is_empty() {
            return Err(Error::transport("mock://", "no canned responses"));
        }
        let reply = state.canned[state.index].clone();
        state.index = (state.index + 1) % state.canned.len();
        drop(state);

        match reply {
            Canned::Body(body) => {
                let response: GraphqlResponse = serde_json::from_value(body)?;
                response.into_result()
            }
            Canned::Failure(make) => Err(make()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use octo_core::QueryBuilder;
    use serde_json::json;

    fn count_request() -> QueryRequest {
        QueryBuilder::default().count_entities("Basic/Machine").unwrap()
    }

    #[tokio::test]
    async fn test_mock_returns_data_and_records() {
        let gateway = MockGateway::with_data(json!({"x": 1}));
        let resp = gateway.execute(&count_request(), Some("t2")).await.unwrap();
        assert_eq!(resp.data, json!({"x": 1}));

        let requests = gateway.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].tenant.as_deref(), Some("t2"));
    }

    #[tokio::test]
    async fn test_mock_cycles() {
        let gateway = MockGateway::new(vec![json!({"data": {"n": 1}}), json!({"data": {"n": 2}})]);
        let req = count_request();
        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(gateway.execute(&req, None).await.unwrap().data["n"].clone());
        }
        assert_eq!(seen, vec![json!(1), json!(2), json!(1)]);
    }

    #[tokio::test]
    async fn test_mock_classifies_graphql_errors() {
        let gateway = MockGateway::new(vec![json!({"data": null, "errors": [{"message": "nope"}]})]);
        let err = gateway.execute(&count_request(), None).await.unwrap_err();
        assert!(matches!(err, Error::GraphQl { .. }));
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let gateway = MockGateway::with_failure(|| Error::timeout("mock://"));
        let err = gateway.execute(&count_request(), None).await.unwrap_err();
        assert!(matches!(err, Error::Timeout { .. }));
        assert_eq!(gateway.request_count().await, 1);
    }

    #[tokio::test]
    async fn test_empty_mock_fails() {
        let gateway = MockGateway::new(Vec::new());
        assert!(gateway.execute(&count_request(), None).await.is_err());
    }
}
