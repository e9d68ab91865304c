//! Connection settings for the GraphQL endpoint.
//!
//! The CLI owns how settings are loaded (config file, environment, the
//! octo-cli settings file). Everything below it only sees an immutable
//! [`ConnectionSettings`] value obtained through [`SettingsProvider`].

use std::time::Duration;

use crate::{Error, Result};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Resolved endpoint, tenant and credential for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// Asset service base URL, e.g. `https://assets.example.com/`.
    pub endpoint_base_url: String,

    /// Default tenant.
    pub tenant_id: String,

    /// Bearer token.
    pub access_token: String,

    /// Request timeout.
    pub timeout: Duration,
}

impl ConnectionSettings {
    /// Create settings with the default timeout.
    pub fn new(
        endpoint_base_url: impl Into<String>,
        tenant_id: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            endpoint_base_url: endpoint_base_url.into(),
            tenant_id: tenant_id.into(),
            access_token: access_token.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Tenant to address, honouring a per-call override.
    pub fn tenant<'a>(&'a self, tenant_override: Option<&'a str>) -> &'a str {
        tenant_override
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.tenant_id)
    }

    /// GraphQL endpoint: `{base}/tenants/{tenant}/GraphQL`.
    pub fn graphql_url(&self, tenant_override: Option<&str>) -> String {
        let base = self.endpoint_base_url.trim_end_matches('/');
        format!("{base}/tenants/{}/GraphQL", self.tenant(tenant_override))
    }

    /// Check that every field needed for a request is present.
    ///
    /// A missing token is reported as an authentication failure so the user
    /// is pointed at the login flow rather than the config file.
    pub fn validate(&self) -> Result<()> {
        if self.endpoint_base_url.trim().is_empty() {
            return Err(Error::config("no asset service URL configured"));
        }
        if self.tenant_id.trim().is_empty() {
            return Err(Error::config("no tenant id configured"));
        }
        if self.access_token.trim().is_empty() {
            return Err(Error::auth("no access token found in settings"));
        }
        Ok(())
    }
}

/// Source of connection settings.
///
/// Implemented by the CLI configuration; tests implement it on plain values.
pub trait SettingsProvider: Send + Sync {
    /// Resolve the settings used to reach the GraphQL endpoint.
    ///
    /// # Errors
    ///
    /// Returns `Config` when the URL or tenant is missing and `Auth` when no
    /// access token is available.
    fn connection_settings(&self) -> Result<ConnectionSettings>;
}

impl SettingsProvider for ConnectionSettings {
    fn connection_settings(&self) -> Result<ConnectionSettings> {
        self.validate()?;
        Ok(self.clone())
    }
}
