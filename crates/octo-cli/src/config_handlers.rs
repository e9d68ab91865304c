//! Handler functions for config CLI commands.
//!
//! Implements `octo-explore config {path,get,init}` and the TOML dotted-key
//! lookup used by `get`.

use std::path::PathBuf;

use octo_core::{Error, Result};

use crate::cli::ConfigAction;
use crate::config::OctoConfig;
use crate::output::CommandOutput;

// ============================================================================
// Command dispatch
// ============================================================================

/// Handle a config subcommand.
///
/// Receives the raw `--config` path (not a loaded config) because `path`
/// and `init` work before a config file exists.
pub fn handle_config_command(config_path: Option<&str>, action: ConfigAction) -> Result<CommandOutput> {
    match action {
        ConfigAction::Path => cmd_config_path(config_path),
        ConfigAction::Get { key } => cmd_config_get(config_path, &key),
        ConfigAction::Init { file, force } => cmd_config_init(file.as_deref(), force),
    }
}

// ============================================================================
// Command handlers
// ============================================================================

/// Show the resolved config file path.
fn cmd_config_path(config_path: Option<&str>) -> Result<CommandOutput> {
    let path = OctoConfig::resolve_config_path(config_path).ok_or_else(|| {
        Error::config("Could not determine config directory for this platform")
    })?;

    let mut out = CommandOutput::new();
    out.line(path.display().to_string());
    if !path.exists() {
        out.note("(file does not exist, run `octo-explore config init` to create it)");
    }
    Ok(out)
}

/// Get a configuration value by dotted key.
fn cmd_config_get(config_path: Option<&str>, key: &str) -> Result<CommandOutput> {
    let config = OctoConfig::load(config_path)?;
    let value = toml::Value::try_from(&config).map_err(|e| Error::config(e.to_string()))?;
    let found = get_nested_value(&value, key)
        .ok_or_else(|| Error::config(format!("Key '{key}' not found in configuration")))?;

    let mut out = CommandOutput::new();
    out.line(format_toml_value(found));
    Ok(out)
}

/// Create a default configuration file.
fn cmd_config_init(file: Option<&str>, force: bool) -> Result<CommandOutput> {
    let path = match file {
        Some(p) => PathBuf::from(p),
        None => OctoConfig::default_config_path()
            .ok_or_else(|| Error::config("Could not determine config directory"))?,
    };

    if path.exists() && !force {
        return Err(Error::config(format!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let toml_str = OctoConfig::default().to_toml_string()?;
    std::fs::write(&path, &toml_str)?;
    tracing::info!(path = %path.display(), "wrote default configuration");

    let mut out = CommandOutput::new();
    out.line(format!("Config file created at {}", path.display()));
    Ok(out)
}

// ============================================================================
// TOML dotted-key helpers
// ============================================================================

/// Navigate a dotted key path in a TOML value tree.
fn get_nested_value<'a>(value: &'a toml::Value, key: &str) -> Option<&'a toml::Value> {
    key.split('.')
        .try_fold(value, |current, part| current.as_table()?.get(part))
}

/// Format a TOML value for display on stdout.
fn format_toml_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Integer(i) => i.to_string(),
        toml::Value::Float(f) => f.to_string(),
        toml::Value::Boolean(b) => b.to_string(),
        toml::Value::Datetime(dt) => dt.to_string(),
        toml::Value::Array(_) | toml::Value::Table(_) => {
            toml::to_string_pretty(value).unwrap_or_else(|_| format!("{value:?}"))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
