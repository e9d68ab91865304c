//! Configuration for the Octo explorer CLI.
//!
//! Provides the [`OctoConfig`] struct that loads from TOML files,
//! environment variables, and defaults using the `confyg` crate.
//!
//! # Loading Priority
//!
//! 1. Explicit `--config <path>` flag
//! 2. `OCTO_EXPLORER_CONFIG` environment variable
//! 3. XDG default: `~/.config/octo-explorer/config.toml`
//! 4. Built-in defaults
//!
//! Gateway fields left unset fall back to the octo-cli settings file
//! (`~/.octo-cli/settings.json`), so an existing octo-cli login works
//! without any explorer configuration.

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use confyg::{Confygery, env};
use octo_core::query::{DEFAULT_PAGE_SIZE, DEFAULT_SCHEMA_SCAN_SIZE};
use octo_core::settings::DEFAULT_TIMEOUT;
use octo_core::table::{ATTRIBUTE_MAX_LEN, CELL_MAX_LEN};
use octo_core::{ConnectionSettings, Error, Result, SettingsProvider};
use serde::{Deserialize, Deserializer, Serialize};

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "OCTO_EXPLORER_CONFIG";

/// Prefix for environment overrides (`OCTO_GATEWAY_TENANT_ID`, ...).
pub const ENV_PREFIX: &str = "OCTO";

// ============================================================================
// Configuration structs
// ============================================================================

/// Main configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OctoConfig {
    /// Endpoint, tenant and credentials.
    pub gateway: GatewayConfig,

    /// Output formatting and page sizes.
    pub display: DisplayConfig,
}

/// Endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Asset service base URL.
    pub base_url: Option<String>,

    /// Default tenant.
    pub tenant_id: Option<String>,

    /// Bearer token. Usually taken from the octo-cli settings file.
    pub access_token: Option<String>,

    /// Request timeout in seconds.
    #[serde(deserialize_with = "number_or_string")]
    pub timeout_secs: u64,

    /// Path of the octo-cli settings file.
    pub settings_file: Option<String>,
}

/// Display configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Default `--first` for runtime listings.
    #[serde(deserialize_with = "number_or_string")]
    pub page_size: u32,

    /// Truncation length for attribute values.
    #[serde(deserialize_with = "number_or_string")]
    pub attribute_max_len: usize,

    /// Truncation length for table cells.
    #[serde(deserialize_with = "number_or_string")]
    pub cell_max_len: usize,

    /// Number of schema objects fetched for detail lookups and search.
    #[serde(deserialize_with = "number_or_string")]
    pub schema_scan_size: u32,
}

// ============================================================================
// Default implementations
// ============================================================================

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            tenant_id: None,
            access_token: None,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            settings_file: None,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            attribute_max_len: ATTRIBUTE_MAX_LEN,
            cell_max_len: CELL_MAX_LEN,
            schema_scan_size: DEFAULT_SCHEMA_SCAN_SIZE,
        }
    }
}

/// Accept numbers given either natively (TOML) or as text (environment).
fn number_or_string<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Deserialize<'de>,
    T::Err: Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw<T> {
        Number(T),
        Text(String),
    }

    match Raw::<T>::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

// ============================================================================
// Config loading
// ============================================================================

impl OctoConfig {
    /// Load configuration from file, environment, and defaults.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder =
            Confygery::new().map_err(|e| Error::config(format!("config init: {e}")))?;

        if let Some(path) = Self::resolve_config_path(config_path)
            && path.exists()
        {
            builder
                .add_file(&path.to_string_lossy())
                .map_err(|e| Error::config(format!("config file: {e}")))?;
        }

        let mut env_opts = env::Options::with_top_level(ENV_PREFIX);
        env_opts.add_section("gateway");
        env_opts.add_section("display");
        builder
            .add_env(env_opts)
            .map_err(|e| Error::config(format!("config env: {e}")))?;

        let config: Self = builder
            .build()
            .map_err(|e| Error::config(format!("config build: {e}")))?;

        tracing::debug!(
            tenant = config.gateway.tenant_id.as_deref().unwrap_or("(from settings file)"),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Resolve the config file path from explicit flag, env var, or XDG default.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(PathBuf::from(path));
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Some(PathBuf::from(path));
        }

        Self::default_config_path()
    }

    /// Return the XDG default config path.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("octo-explorer").join("config.toml"))
    }

    /// Location of the octo-cli settings file.
    pub fn octo_cli_settings_path(&self) -> Option<PathBuf> {
        match &self.gateway.settings_file {
            Some(path) => Some(PathBuf::from(path)),
            None => dirs::home_dir().map(|h| h.join(".octo-cli").join("settings.json")),
        }
    }

    /// Serialize this config to a pretty-printed TOML string.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Timeout as a duration; zero falls back to the default.
    pub fn timeout(&self) -> Duration {
        match self.gateway.timeout_secs {
            0 => DEFAULT_TIMEOUT,
            secs => Duration::from_secs(secs),
        }
    }

    fn needs_octo_cli_settings(&self) -> bool {
        let missing = |v: &Option<String>| v.as_deref().is_none_or(|s| s.trim().is_empty());
        missing(&self.gateway.base_url)
            || missing(&self.gateway.tenant_id)
            || missing(&self.gateway.access_token)
    }
}

// ============================================================================
// octo-cli settings file
// ============================================================================

/// The parts of `~/.octo-cli/settings.json` the explorer reads.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct OctoCliSettings {
    pub octo_tool_options: OctoToolOptions,
    pub authentication: OctoAuthentication,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct OctoToolOptions {
    pub asset_service_url: Option<String>,
    pub tenant_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct OctoAuthentication {
    pub access_token: Option<String>,
}

impl OctoCliSettings {
    /// Read the settings file; `Ok(None)` when it does not exist.
    pub fn read(path: &Path) -> Result<Option<Self>> {
        if !path.is_file() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("failed to read {}: {e}", path.display())))?;
        let settings = serde_json::from_str(&content)
            .map_err(|e| Error::config(format!("failed to parse {}: {e}", path.display())))?;
        Ok(Some(settings))
    }
}

// ============================================================================
// SettingsProvider implementation
// ============================================================================

impl SettingsProvider for OctoConfig {
    fn connection_settings(&self) -> Result<ConnectionSettings> {
        let mut fallback = OctoCliSettings::default();
        if self.needs_octo_cli_settings() {
            let path = self.octo_cli_settings_path();
            let found = match path.as_deref() {
                Some(p) => OctoCliSettings::read(p)?,
                None => None,
            };
            match found {
                Some(settings) => fallback = settings,
                None if self.gateway.base_url.is_none() => {
                    let shown = path.map_or_else(|| "~/.octo-cli/settings.json".into(), |p| {
                        p.display().to_string()
                    });
                    return Err(Error::config(format!(
                        "settings file not found at {shown}. Run 'octo-cli -c Config' to create it, \
                         then 'octo-cli -c LogIn -i' to authenticate"
                    )));
                }
                None => {}
            }
        }

        let pick = |own: &Option<String>, other: Option<String>| {
            own.clone()
                .filter(|s| !s.trim().is_empty())
                .or(other)
                .unwrap_or_default()
        };
        let settings = ConnectionSettings::new(
            pick(&self.gateway.base_url, fallback.octo_tool_options.asset_service_url),
            pick(&self.gateway.tenant_id, fallback.octo_tool_options.tenant_id),
            pick(&self.gateway.access_token, fallback.authentication.access_token),
        )
        .with_timeout(self.timeout());

        settings.validate()?;
        Ok(settings)
    }
}

// ============================================================================
// Tests
// ============================================================================
