//! Octo Core: query building and result handling for OctoMesh GraphQL.
//!
//! This crate holds everything between the command line and the wire that
//! does not perform I/O: the error taxonomy, the typed data model, query
//! construction, connection unwrapping, identifier resolution, filter
//! encoding and table rendering.
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`settings`]: Connection settings and the provider trait
//! - [`connection`]: Edge/node unwrapping and paging metadata
//! - [`query`]: Canned GraphQL documents and their variables
//! - [`filter`]: Field filter operators, value coercion and encoding
//! - [`resolver`]: Identifier resolution over candidate lists
//! - [`table`]: Aligned rendering of nullable values
//! - [`construction_kit`], [`runtime`], [`introspection`]: Response records

pub mod connection;
pub mod construction_kit;
pub mod error;
pub mod filter;
pub mod introspection;
pub mod query;
pub mod resolver;
pub mod runtime;
pub mod settings;
pub mod table;

// Re-export key types at crate root for convenience
pub use connection::{Connection, ItemList, Page, PageInfo, unwrap_connection};
pub use error::{Error, Result};
pub use filter::{FieldFilter, FilterOperator, ScalarValue, coerce_value, encode_filter};
pub use query::{
    Operation, Paging, Projection, QueryBuilder, QueryRequest, SchemaKind, SortOrder, SortSpec,
};
pub use resolver::{Identified, Identifier, resolve, resolve_or_not_found};
pub use settings::{ConnectionSettings, SettingsProvider};
pub use table::{Table, TableRenderer, format_value};
