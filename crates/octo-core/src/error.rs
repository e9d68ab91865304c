//! Error types for Octo Explorer operations.
//!
//! This module provides the common `Error` type and `Result<T>` alias used
//! across all Octo crates. Every failure a command can hit maps onto one
//! variant here, and the CLI turns each into a single stderr line plus a
//! non-zero exit code.

use thiserror::Error;

/// Errors that can occur while querying or rendering OctoMesh data.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The endpoint could not be reached.
    #[error("cannot connect to {endpoint}: {message}")]
    Transport {
        /// GraphQL endpoint URL.
        endpoint: String,
        /// Underlying transport message.
        message: String,
    },

    /// The request did not complete within the configured timeout.
    #[error("request to {endpoint} timed out")]
    Timeout {
        /// GraphQL endpoint URL.
        endpoint: String,
    },

    /// Missing, expired or rejected credentials.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Unexpected HTTP status.
    #[error("HTTP {status} from {endpoint}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// GraphQL endpoint URL.
        endpoint: String,
        /// Response body, truncated.
        body: String,
    },

    /// The server reported GraphQL errors and returned no usable data.
    #[error("GraphQL request failed: {}", messages.join("; "))]
    GraphQl {
        /// One message per GraphQL error.
        messages: Vec<String>,
    },

    /// Nothing matched the requested identifier.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Filter operator outside the supported set.
    #[error("Invalid operator: {0}")]
    InvalidOperator(String),

    /// Rejected argument, caught before any network call.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A failure raised after a response that also carried GraphQL errors.
    #[error("{source}")]
    WithWarnings {
        /// GraphQL error messages returned next to the data.
        warnings: Vec<String>,
        /// The failure itself.
        source: Box<Error>,
    },
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a transport error for an endpoint.
    pub fn transport(endpoint: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Transport {
            endpoint: endpoint.into(),
            message: msg.into(),
        }
    }

    /// Create a timeout error for an endpoint.
    pub fn timeout(endpoint: impl Into<String>) -> Self {
        Self::Timeout {
            endpoint: endpoint.into(),
        }
    }

    /// Create an authentication error.
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// Create a not found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an invalid operator error.
    pub fn invalid_operator(msg: impl Into<String>) -> Self {
        Self::InvalidOperator(msg.into())
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Attach GraphQL warnings from the response this failure came from.
    ///
    /// Returns `self` unchanged when there is nothing to attach.
    pub fn with_warnings(self, warnings: &[String]) -> Self {
        if warnings.is_empty() {
            return self;
        }
        match self {
            Self::WithWarnings {
                warnings: mut existing,
                source,
            } => {
                existing.extend_from_slice(warnings);
                Self::WithWarnings {
                    warnings: existing,
                    source,
                }
            }
            other => Self::WithWarnings {
                warnings: warnings.to_vec(),
                source: Box::new(other),
            },
        }
    }

    /// GraphQL warnings carried alongside this failure.
    pub fn warnings(&self) -> &[String] {
        match self {
            Self::WithWarnings { warnings, .. } => warnings,
            _ => &[],
        }
    }

    /// The underlying failure, without any attached warnings.
    pub fn root(&self) -> &Error {
        match self {
            Self::WithWarnings { source, .. } => source.root(),
            other => other,
        }
    }

    /// Returns `true` for failures detected before any request was sent.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self.root(),
            Self::InvalidOperator(_) | Self::InvalidArgument(_)
        )
    }

    /// Process exit code for this failure.
    ///
    /// Usage errors share clap's exit code 2; everything else exits with 1.
    pub fn exit_code(&self) -> i32 {
        if self.is_usage_error() { 2 } else { 1 }
    }

    /// Follow-up hint shown under the error line, if any.
    pub fn hint(&self) -> Option<&'static str> {
        match self.root() {
            Self::Auth(_) => {
                Some("Your token may have expired. Run 'octo-cli -c LogIn -i' to re-authenticate.")
            }
            Self::Transport { .. } => {
                Some("Check your network and that the asset service URL is correct in settings.")
            }
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type alias using Octo's Error type.
pub type Result<T> = std::result::Result<T, Error>;
