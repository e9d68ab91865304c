//! CLI argument parsing and command definitions.
//!
//! Three explorer groups share one binary: `ck` for Construction Kit schema
//! metadata, `rt` for runtime entities and `introspect` for raw GraphQL
//! schema introspection. `config` and `version` are local-only.

use clap::{Args, Parser, Subcommand};
use octo_core::{FilterOperator, SortSpec};

// ============================================================================
// CLI argument types
// ============================================================================

/// Top-level CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "octo-explore", author, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file.
    #[arg(short, long, env = "OCTO_EXPLORER_CONFIG")]
    pub config: Option<String>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Explore Construction Kit models, types and enums.
    Ck(CkCommand),

    /// Explore runtime entities.
    Rt(RtCommand),

    /// Inspect the raw GraphQL schema.
    Introspect(IntrospectCommand),

    /// Configuration operations.
    Config(ConfigCommand),

    /// Print version information.
    Version,
}

/// Output flags shared by every data command.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputArgs {
    /// Print the raw JSON payload instead of formatted text.
    #[arg(long)]
    pub json: bool,

    /// Address a different tenant than the configured one.
    #[arg(long)]
    pub tenant: Option<String>,
}

/// Pagination flags.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct PageArgs {
    /// Page size.
    #[arg(long)]
    pub first: Option<u32>,

    /// Cursor from a previous page.
    #[arg(long)]
    pub after: Option<String>,
}

impl PageArgs {
    pub fn paging(&self) -> octo_core::Paging {
        octo_core::Paging::new(self.first, self.after.clone())
    }
}

/// Sorting flag.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct SortArgs {
    /// Sort by attribute, e.g. `name:asc` or `name:desc`.
    #[arg(long, value_parser = parse_sort)]
    pub sort: Option<SortSpec>,
}

fn parse_sort(s: &str) -> Result<SortSpec, String> {
    s.parse().map_err(|e: octo_core::Error| e.to_string())
}

fn parse_operator(s: &str) -> Result<FilterOperator, String> {
    s.parse().map_err(|e: octo_core::Error| e.to_string())
}

// ============================================================================
// ck
// ============================================================================

/// Construction Kit subcommands.
#[derive(Parser, Debug)]
pub struct CkCommand {
    #[command(subcommand)]
    pub command: CkAction,
}

#[derive(Subcommand, Debug)]
pub enum CkAction {
    /// List CK models.
    Models {
        #[command(flatten)]
        page: PageArgs,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show detail for one model.
    Model {
        /// Model full name or declared name.
        name: String,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// List types, grouped by model.
    Types {
        /// Only show types of this model (e.g. `System-2.0.2`).
        #[arg(long)]
        model: Option<String>,
        #[command(flatten)]
        page: PageArgs,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show attributes, associations and derived types of one type.
    Type {
        /// Type full name (e.g. `System-2.0.2/Entity-1`) or short name.
        name: String,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// List enums, grouped by model.
    Enums {
        /// Only show enums of this model.
        #[arg(long)]
        model: Option<String>,
        #[command(flatten)]
        page: PageArgs,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show the values of one enum.
    Enum {
        /// Enum full name or short name.
        name: String,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Search type and enum names and descriptions.
    Search {
        /// Case-insensitive search term.
        term: String,
        /// Limit the number of matches per kind.
        #[arg(long)]
        first: Option<u32>,
        #[command(flatten)]
        output: OutputArgs,
    },
}

// ============================================================================
// rt
// ============================================================================

/// Runtime entity subcommands.
#[derive(Parser, Debug)]
pub struct RtCommand {
    #[command(subcommand)]
    pub command: RtAction,
}

#[derive(Subcommand, Debug)]
pub enum RtAction {
    /// List instances of a CK type.
    List {
        /// CK type id (e.g. `Industry.Basic/Machine`).
        ck_id: String,
        /// Include all attribute values.
        #[arg(long)]
        attrs: bool,
        #[command(flatten)]
        sort: SortArgs,
        #[command(flatten)]
        page: PageArgs,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show one entity with attributes and outbound associations.
    Get {
        /// CK type id.
        ck_id: String,
        /// Runtime entity id.
        rt_id: String,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Count instances of a CK type.
    Count {
        /// CK type id.
        ck_id: String,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// LIKE search on one attribute.
    Search {
        /// CK type id.
        ck_id: String,
        /// Search term.
        term: String,
        /// Attribute to search.
        #[arg(long, default_value = "name")]
        attr: String,
        #[command(flatten)]
        sort: SortArgs,
        #[command(flatten)]
        page: PageArgs,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Project entities onto explicit columns.
    Query {
        /// CK type id.
        ck_id: String,
        /// Comma-separated column paths (e.g. `name,machineState`).
        #[arg(long, required = true, value_delimiter = ',')]
        columns: Vec<String>,
        #[command(flatten)]
        sort: SortArgs,
        #[command(flatten)]
        page: PageArgs,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Filter by a single attribute comparison.
    Filter {
        /// CK type id.
        ck_id: String,
        /// Attribute path.
        attr: String,
        /// Operator, e.g. `EQUALS` or `GREATER_THAN`.
        #[arg(value_parser = parse_operator)]
        op: FilterOperator,
        /// Comparison value; booleans and numbers are sent typed.
        #[arg(allow_hyphen_values = true)]
        value: String,
        #[command(flatten)]
        sort: SortArgs,
        #[command(flatten)]
        page: PageArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
}

// ============================================================================
// introspect
// ============================================================================

/// Introspection subcommands.
#[derive(Parser, Debug)]
pub struct IntrospectCommand {
    #[command(subcommand)]
    pub command: IntrospectAction,
}

#[derive(Subcommand, Debug)]
pub enum IntrospectAction {
    /// Show top-level query fields.
    Top {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show fields and enum values of a GraphQL type.
    Type {
        /// GraphQL type name (case-sensitive).
        name: String,
        #[command(flatten)]
        output: OutputArgs,
    },
}

// ============================================================================
// config
// ============================================================================

/// Config-specific subcommands.
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    /// Config subcommand to execute.
    #[command(subcommand)]
    pub command: ConfigAction,
}

/// Available config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path.
    Path,

    /// Get a configuration value by dotted key.
    Get {
        /// Dotted key (e.g., "display.page_size").
        key: String,
    },

    /// Create a default configuration file.
    Init {
        /// Output file path (defaults to XDG config path).
        #[arg(short, long)]
        file: Option<String>,

        /// Overwrite existing file.
        #[arg(long)]
        force: bool,
    },
}

// ============================================================================
// Tests
// ============================================================================
