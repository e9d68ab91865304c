//! reqwest-backed gateway for the asset service GraphQL endpoint.

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, warn};

use octo_core::{ConnectionSettings, Error, QueryRequest, Result, SettingsProvider};

use crate::gateway::GraphqlGateway;
use crate::response::{GatewayResponse, GraphqlResponse};

/// Longest response body quoted in an HTTP status error.
pub const MAX_ERROR_BODY_CHARS: usize = 500;

/// Gateway that POSTs to `{base}/tenants/{tenant}/GraphQL` with a bearer token.
#[derive(Debug)]
pub struct HttpGateway {
    settings: ConnectionSettings,
    client: reqwest::Client,
}

impl HttpGateway {
    /// Creates a gateway from validated settings.
    ///
    /// # Errors
    ///
    /// Returns `Config` or `Auth` when the settings are incomplete, and
    /// `Config` when the HTTP client cannot be built.
    pub fn new(settings: ConnectionSettings) -> Result<Self> {
        settings.validate()?;
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { settings, client })
    }

    /// Creates a gateway from whatever settings `provider` resolves.
    pub fn from_provider(provider: &dyn SettingsProvider) -> Result<Self> {
        Self::new(provider.connection_settings()?)
    }

    /// Settings this gateway was built with.
    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    /// Endpoint URL for a tenant.
    pub fn endpoint(&self, tenant: Option<&str>) -> String {
        self.settings.graphql_url(tenant)
    }
}

/// Map a reqwest failure to the transport or timeout variant.
fn classify_send_error(endpoint: &str, err: &reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::timeout(endpoint)
    } else {
        Error::transport(endpoint, err.to_string())
    }
}

/// Map a non-200 status to an error.
fn classify_status(endpoint: &str, status: StatusCode, body: &str) -> Error {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Error::auth(format!("HTTP {} from {endpoint}", status.as_u16()))
        }
        _ => Error::Http {
            status: status.as_u16(),
            endpoint: endpoint.to_string(),
            body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
        },
    }
}

#[async_trait]
impl GraphqlGateway for HttpGateway {
    async fn execute(
        &self,
        request: &QueryRequest,
        tenant: Option<&str>,
    ) -> Result<GatewayResponse> {
        let endpoint = self.endpoint(tenant);
        let body = request.to_body()?;
        debug!(operation = %request.operation, endpoint = %endpoint, "Sending GraphQL request");

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.settings.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| classify_send_error(&endpoint, &e))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| classify_send_error(&endpoint, &e))?;

        if status != StatusCode::OK {
            let text = String::from_utf8_lossy(&bytes);
            return Err(classify_status(&endpoint, status, &text));
        }

        let parsed = GraphqlResponse::from_slice(&bytes)?;
        let result = parsed.into_result()?;
        for message in &result.warnings {
            warn!(operation = %request.operation, "GraphQL error alongside data: {message}");
        }
        debug!(operation = %request.operation, warnings = result.warnings.len(), "GraphQL request complete");
        Ok(result)
    }
}
