//! OctoCli application.
//!
//! Owns the loaded configuration, sets up logging and dispatches parsed
//! commands to their handlers. The gateway is only built for commands that
//! talk to the server, so `config` and `version` work without settings.

use std::sync::Arc;

use octo_client::{GraphqlGateway, HttpGateway};
use octo_core::Result;
use tracing_subscriber::EnvFilter;

use crate::cli::{CliArgs, Command};
use crate::config::OctoConfig;
use crate::context::ExploreContext;
use crate::output::CommandOutput;
use crate::{ck_handlers, config_handlers, introspect_handlers, rt_handlers};

// ============================================================================
// OctoCli
// ============================================================================

/// The explorer application.
pub struct OctoCli {
    name: String,
    config: Arc<OctoConfig>,
    version: String,
}

impl OctoCli {
    /// Create from CLI args, loading config from file/env.
    pub fn from_args(name: impl Into<String>, args: &CliArgs) -> Result<Self> {
        let config = OctoConfig::load(args.config.as_deref())?;
        Ok(Self::new(name, config))
    }

    /// Create a new CLI application.
    pub fn new(name: impl Into<String>, config: OctoConfig) -> Self {
        Self {
            name: name.into(),
            config: Arc::new(config),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Override the version string.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Get a reference to the loaded configuration.
    pub fn config(&self) -> &OctoConfig {
        &self.config
    }

    /// Query and display settings for handlers.
    pub fn context(&self) -> ExploreContext {
        ExploreContext::from(&self.config.display)
    }

    /// Initialise tracing-based logging on stderr.
    ///
    /// Uses `RUST_LOG` env var if set, otherwise defaults based on verbosity flags.
    pub fn init_logging(&self, verbose: bool, quiet: bool) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if quiet {
            EnvFilter::new("warn")
        } else if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        };

        // Ignore error if a subscriber is already set (e.g. in tests).
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }

    /// Run the CLI with the given arguments against the configured endpoint.
    pub async fn run(&self, args: CliArgs) -> Result<CommandOutput> {
        self.init_logging(args.verbose, args.quiet);
        let config = Arc::clone(&self.config);
        self.execute(args.command, args.config.as_deref(), move || {
            HttpGateway::from_provider(&*config)
        })
        .await
    }

    /// Dispatch a command, building the gateway with `connect` when needed.
    pub async fn execute<G, F>(
        &self,
        command: Option<Command>,
        config_path: Option<&str>,
        connect: F,
    ) -> Result<CommandOutput>
    where
        G: GraphqlGateway,
        F: FnOnce() -> Result<G>,
    {
        let mut out = CommandOutput::new();
        match command {
            Some(Command::Version) => {
                out.line(format!("{} {}", self.name, self.version));
                Ok(out)
            }
            Some(Command::Config(config_cmd)) => {
                config_handlers::handle_config_command(config_path, config_cmd.command)
            }
            Some(Command::Ck(ck)) => {
                let gateway = connect()?;
                ck_handlers::handle_ck_command(&gateway, &self.context(), ck.command).await
            }
            Some(Command::Rt(rt)) => {
                let gateway = connect()?;
                rt_handlers::handle_rt_command(&gateway, &self.context(), rt.command).await
            }
            Some(Command::Introspect(introspect)) => {
                let gateway = connect()?;
                introspect_handlers::handle_introspect_command(
                    &gateway,
                    &self.context(),
                    introspect.command,
                )
                .await
            }
            None => {
                out.line(format!(
                    "{} {}, use --help for usage",
                    self.name, self.version
                ));
                Ok(out)
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use clap::Parser;
    use octo_client::MockGateway;
    use octo_core::Error;
    use serde_json::json;

    fn cli() -> OctoCli {
        OctoCli::new("octo-explore", OctoConfig::default()).with_version("0.1.0")
    }

    fn no_gateway() -> Result<MockGateway> {
        panic!("gateway must not be built for local commands")
    }

    #[test]
    fn test_octo_cli_new() {
        let cli = OctoCli::new("my-app", OctoConfig::default());
        assert_eq!(cli.name, "my-app");
        assert_eq!(cli.config().display.page_size, 50);
    }

    #[test]
    fn test_octo_cli_with_version() {
        assert_eq!(cli().version, "0.1.0");
    }

    #[test]
    fn test_context_follows_display_config() {
        let mut config = OctoConfig::default();
        config.display.page_size = 7;
        let cli = OctoCli::new("app", config);
        assert_eq!(cli.context().queries.default_page_size(), 7);
    }

    #[tokio::test]
    async fn test_version_command() {
        let args = CliArgs::parse_from(["test", "version"]);
        let out = cli().execute(args.command, None, no_gateway).await.unwrap();
        assert_eq!(out.stdout, "octo-explore 0.1.0\n");
    }

    #[tokio::test]
    async fn test_no_command() {
        let args = CliArgs::parse_from(["test"]);
        let out = cli().execute(args.command, None, no_gateway).await.unwrap();
        assert!(out.stdout.contains("use --help"));
    }

    #[tokio::test]
    async fn test_config_path_needs_no_gateway() {
        let args = CliArgs::parse_from(["test", "config", "path"]);
        let out = cli()
            .execute(args.command, Some("/tmp/octo-test/config.toml"), no_gateway)
            .await
            .unwrap();
        assert_eq!(out.stdout, "/tmp/octo-test/config.toml\n");
    }

    #[tokio::test]
    async fn test_data_command_uses_gateway() {
        let gateway = MockGateway::with_data(json!({"runtime": {"runtimeEntities": {"totalCount": 3}}}));
        let args = CliArgs::parse_from(["test", "rt", "count", "Basic/Machine"]);
        let out = cli()
            .execute(args.command, None, || Ok(gateway.clone()))
            .await
            .unwrap();
        assert_eq!(out.stdout, "Basic/Machine: 3 instances\n");
        assert_eq!(gateway.request_count().await, 1);
    }

    #[tokio::test]
    async fn test_connect_failure_propagates() {
        let args = CliArgs::parse_from(["test", "ck", "models"]);
        let result = cli()
            .execute(args.command, None, || -> Result<MockGateway> {
                Err(Error::auth("no access token found in settings"))
            })
            .await;
        assert!(matches!(result, Err(Error::Auth(_))));
    }

    #[test]
    fn test_init_logging_default() {
        cli().init_logging(false, false);
    }

    #[test]
    fn test_init_logging_verbose() {
        cli().init_logging(true, false);
    }

    #[test]
    fn test_init_logging_quiet() {
        cli().init_logging(false, true);
    }
}
