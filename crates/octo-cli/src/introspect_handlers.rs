//! Handler functions for `introspect` commands.

use octo_client::GraphqlGateway;
use octo_core::introspection::{FieldInfo, TypeInfo};
use octo_core::{Error, Result};

use crate::cli::{IntrospectAction, OutputArgs};
use crate::context::{ExploreContext, fetch};
use crate::output::CommandOutput;

const FIELD_NAME_WIDTH: usize = 40;

/// Handle an `introspect` subcommand.
pub async fn handle_introspect_command(
    gateway: &dyn GraphqlGateway,
    ctx: &ExploreContext,
    action: IntrospectAction,
) -> Result<CommandOutput> {
    match action {
        IntrospectAction::Top { output } => top(gateway, ctx, &output).await,
        IntrospectAction::Type { name, output } => show_type(gateway, ctx, &name, &output).await,
    }
}

async fn top(
    gateway: &dyn GraphqlGateway,
    ctx: &ExploreContext,
    output: &OutputArgs,
) -> Result<CommandOutput> {
    let request = ctx.queries.introspect_query_fields()?;
    let response = fetch(gateway, &request, output.tenant.as_deref()).await?;
    let mut fields: Vec<FieldInfo> = match response.at(&["__schema", "queryType", "fields"]) {
        Some(value) => serde_json::from_value(value.clone())?,
        None => Vec::new(),
    };
    fields.sort_by(|a, b| a.name.cmp(&b.name));

    if output.json {
        return Ok(CommandOutput::json(&fields)?.with_warnings(&response.warnings));
    }

    let mut out = CommandOutput::new().with_warnings(&response.warnings);
    out.line("Top-level query fields:");
    out.blank();
    for field in &fields {
        out.line(format!(
            "  {:FIELD_NAME_WIDTH$} -> {}",
            field.name,
            field.field_type.display()
        ));
    }
    Ok(out)
}

async fn show_type(
    gateway: &dyn GraphqlGateway,
    ctx: &ExploreContext,
    name: &str,
    output: &OutputArgs,
) -> Result<CommandOutput> {
    let request = ctx.queries.introspect_type(name)?;
    let response = fetch(gateway, &request, output.tenant.as_deref()).await?;
    let info: TypeInfo = match response.at(&["__type"]) {
        Some(value) => serde_json::from_value(value.clone())?,
        None => {
            return Err(Error::not_found(format!(
                "GraphQL type '{name}' (type names are case-sensitive; \
                 run 'introspect top' to see the entry points)"
            ))
            .with_warnings(&response.warnings));
        }
    };

    if output.json {
        return Ok(CommandOutput::json(&info)?.with_warnings(&response.warnings));
    }

    let mut out = CommandOutput::new().with_warnings(&response.warnings);
    out.line(format!(
        "Type: {}  (kind: {})",
        info.name,
        info.kind.as_deref().unwrap_or("?")
    ));
    if let Some(desc) = info.description.as_deref().filter(|d| !d.is_empty()) {
        out.line(format!("Description: {desc}"));
    }

    if !info.fields.is_empty() {
        out.blank();
        out.line("Fields:");
        for field in &info.fields {
            out.line(format!(
                "  {:FIELD_NAME_WIDTH$} -> {}",
                field.name,
                field.field_type.display()
            ));
        }
    }
    if !info.enum_values.is_empty() {
        out.blank();
        out.line("Enum values:");
        for value in &info.enum_values {
            match value.description.as_deref().filter(|d| !d.is_empty()) {
                Some(desc) => out.line(format!("  {}  ({desc})", value.name)),
                None => out.line(format!("  {}", value.name)),
            }
        }
    }
    Ok(out)
}
