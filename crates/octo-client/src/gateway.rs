//! Gateway trait for executing GraphQL requests.

use async_trait::async_trait;

use octo_core::{QueryRequest, Result};

use crate::response::GatewayResponse;

/// Executes a single GraphQL request against a tenant.
///
/// Implementations perform exactly one round trip per call and never retry.
#[async_trait]
pub trait GraphqlGateway: Send + Sync {
    /// Execute `request`, addressing `tenant` or the configured default.
    ///
    /// # Errors
    ///
    /// Transport, timeout, authentication, HTTP status, body decoding and
    /// GraphQL-errors-without-data failures, each as its own error variant.
    async fn execute(&self, request: &QueryRequest, tenant: Option<&str>)
    -> Result<GatewayResponse>;
}
