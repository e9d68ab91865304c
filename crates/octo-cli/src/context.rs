//! Per-invocation settings shared by the command handlers.

use octo_client::{GatewayResponse, GraphqlGateway};
use octo_core::{QueryBuilder, QueryRequest, Result};
use octo_core::query::{DEFAULT_PAGE_SIZE, DEFAULT_SCHEMA_SCAN_SIZE};
use octo_core::table::{ATTRIBUTE_MAX_LEN, CELL_MAX_LEN};

use crate::config::DisplayConfig;

/// Query construction and display limits for one run.
#[derive(Debug, Clone)]
pub struct ExploreContext {
    pub queries: QueryBuilder,
    pub attribute_max_len: usize,
    pub cell_max_len: usize,
    pub schema_scan_size: u32,
}

impl Default for ExploreContext {
    fn default() -> Self {
        Self {
            queries: QueryBuilder::new(DEFAULT_PAGE_SIZE),
            attribute_max_len: ATTRIBUTE_MAX_LEN,
            cell_max_len: CELL_MAX_LEN,
            schema_scan_size: DEFAULT_SCHEMA_SCAN_SIZE,
        }
    }
}

impl From<&DisplayConfig> for ExploreContext {
    fn from(display: &DisplayConfig) -> Self {
        Self {
            queries: QueryBuilder::new(display.page_size),
            attribute_max_len: display.attribute_max_len,
            cell_max_len: display.cell_max_len,
            schema_scan_size: display.schema_scan_size,
        }
    }
}

/// Send one request, logging the operation.
pub async fn fetch(
    gateway: &dyn GraphqlGateway,
    request: &QueryRequest,
    tenant: Option<&str>,
) -> Result<GatewayResponse> {
    tracing::debug!(operation = %request.operation, tenant = ?tenant, "executing query");
    let response = gateway.execute(request, tenant).await?;
    if !response.warnings.is_empty() {
        tracing::debug!(
            operation = %request.operation,
            count = response.warnings.len(),
            "query returned partial data"
        );
    }
    Ok(response)
}
