//! Octo CLI: command-line explorer for OctoMesh.
//!
//! Parses the `ck`, `rt`, `introspect`, `config` and `version` commands,
//! loads configuration and renders gateway responses as text or JSON.
//!
//! # Modules
//!
//! - [`cli`]: clap command tree
//! - [`config`]: `OctoConfig` loading and the octo-cli settings fallback
//! - [`app`]: `OctoCli` application and dispatch
//! - [`output`]: captured stdout/stderr for one command
//! - `*_handlers`: one module per command group

pub mod app;
pub mod ck_handlers;
pub mod cli;
pub mod config;
pub mod config_handlers;
pub mod context;
pub mod introspect_handlers;
pub mod output;
pub mod rt_handlers;

pub use app::OctoCli;
pub use cli::{CliArgs, Command};
pub use config::OctoConfig;
pub use context::ExploreContext;
pub use output::{CommandOutput, error_lines};
