//! Handler functions for `ck` commands.
//!
//! Listings fetch one page from the server. Detail lookups and search fetch
//! up to `schema_scan_size` objects and resolve or match locally, because
//! the server only filters Construction Kit objects by exact id.

use octo_client::{GatewayResponse, GraphqlGateway};
use octo_core::construction_kit::{
    CkEnum, CkModel, CkType, filter_by_model, group_by_model, matches_term,
};
use octo_core::table::truncate;
use octo_core::{
    Connection, Error, Identified, Page, Paging, Result, SchemaKind, resolve_or_not_found,
};
use serde_json::json;

use crate::cli::{CkAction, OutputArgs, PageArgs};
use crate::context::{ExploreContext, fetch};
use crate::output::{CommandOutput, more_results_hint};

const MODELS_PATH: [&str; 2] = ["constructionKit", "models"];
const TYPES_PATH: [&str; 2] = ["constructionKit", "types"];
const ENUMS_PATH: [&str; 2] = ["constructionKit", "enums"];

/// Handle a `ck` subcommand.
pub async fn handle_ck_command(
    gateway: &dyn GraphqlGateway,
    ctx: &ExploreContext,
    action: CkAction,
) -> Result<CommandOutput> {
    match action {
        CkAction::Models { page, output } => list_models(gateway, ctx, &page, &output).await,
        CkAction::Model { name, output } => show_model(gateway, ctx, &name, &output).await,
        CkAction::Types {
            model,
            page,
            output,
        } => list_types(gateway, ctx, model.as_deref(), &page, &output).await,
        CkAction::Type { name, output } => show_type(gateway, ctx, &name, &output).await,
        CkAction::Enums {
            model,
            page,
            output,
        } => list_enums(gateway, ctx, model.as_deref(), &page, &output).await,
        CkAction::Enum { name, output } => show_enum(gateway, ctx, &name, &output).await,
        CkAction::Search {
            term,
            first,
            output,
        } => search(gateway, ctx, &term, first, &output).await,
    }
}

fn page_of<T: serde::de::DeserializeOwned>(response: &GatewayResponse, path: &[&str]) -> Page<T> {
    Connection::<T>::from_value(response.at(path)).into_page()
}

/// Schema listings default to the scan size rather than the runtime page size.
fn schema_paging(ctx: &ExploreContext, page: &PageArgs) -> Paging {
    Paging::new(
        Some(page.first.unwrap_or(ctx.schema_scan_size)),
        page.after.clone(),
    )
}

fn push_more_hint<T>(out: &mut CommandOutput, page: &Page<T>, first: u32) {
    if page.has_next_page() {
        out.blank();
        out.line(more_results_hint(first, page.end_cursor()));
    }
}

fn yes_no(flag: Option<bool>) -> &'static str {
    if flag.unwrap_or(false) { "yes" } else { "no" }
}

fn flag_suffix(flags: &[&str]) -> String {
    if flags.is_empty() {
        String::new()
    } else {
        format!(" ({})", flags.join(", "))
    }
}

fn model_heading(model: &str) -> &str {
    if model.is_empty() { "(no model)" } else { model }
}

// ============================================================================
// Models
// ============================================================================

async fn list_models(
    gateway: &dyn GraphqlGateway,
    ctx: &ExploreContext,
    page_args: &PageArgs,
    output: &OutputArgs,
) -> Result<CommandOutput> {
    let paging = page_args.paging();
    let first = ctx.queries.page_size(&paging)?;
    let request = ctx.queries.list_models(&paging)?;
    let response = fetch(gateway, &request, output.tenant.as_deref()).await?;

    let mut page: Page<CkModel> = page_of(&response, &MODELS_PATH);
    page.items
        .sort_by(|a, b| a.id.full_name.cmp(&b.id.full_name));

    if output.json {
        return Ok(CommandOutput::json(&page)?.with_warnings(&response.warnings));
    }

    let mut out = CommandOutput::new().with_warnings(&response.warnings);
    if page.items.is_empty() {
        out.line("No CK models found.");
        return Ok(out);
    }

    out.line(format!("CK Models ({}):", page.items.len()));
    out.blank();
    for model in &page.items {
        out.line(format!(
            "  {:45} state={}",
            model.id.full_name,
            model.model_state.as_deref().unwrap_or("?")
        ));
        if let Some(desc) = model.description.as_deref().filter(|d| !d.is_empty()) {
            out.line(format!("    {}", truncate(desc, ctx.attribute_max_len)));
        }
    }
    push_more_hint(&mut out, &page, first);
    Ok(out)
}

async fn show_model(
    gateway: &dyn GraphqlGateway,
    ctx: &ExploreContext,
    name: &str,
    output: &OutputArgs,
) -> Result<CommandOutput> {
    let request = ctx
        .queries
        .schema_detail(SchemaKind::Model, ctx.schema_scan_size)?;
    let response = fetch(gateway, &request, output.tenant.as_deref()).await?;
    let models: Vec<CkModel> = page_of(&response, &MODELS_PATH).items;
    let model = resolve_or_not_found(&models, name, "model")
        .map_err(|e| e.with_warnings(&response.warnings))?;

    if output.json {
        return Ok(CommandOutput::json(model)?.with_warnings(&response.warnings));
    }

    let mut out = CommandOutput::new().with_warnings(&response.warnings);
    out.line(format!("Model: {}", model.id.full_name));
    out.line(format!("  Name:    {}", model.id.name.as_deref().unwrap_or("?")));
    if let Some(version) = &model.id.version {
        out.line(format!("  Version: {version}"));
    }
    out.line(format!(
        "  State:   {}",
        model.model_state.as_deref().unwrap_or("?")
    ));
    if let Some(desc) = &model.description {
        out.line(format!("  Description: {desc}"));
    }
    if model.dependencies.is_empty() {
        out.line("  Dependencies: none");
    } else {
        out.line(format!("  Dependencies ({}):", model.dependencies.len()));
        for dep in &model.dependencies {
            out.line(format!("    - {}", dep.full_name));
        }
    }
    Ok(out)
}

// ============================================================================
// Types
// ============================================================================

async fn list_types(
    gateway: &dyn GraphqlGateway,
    ctx: &ExploreContext,
    model: Option<&str>,
    page_args: &PageArgs,
    output: &OutputArgs,
) -> Result<CommandOutput> {
    let paging = schema_paging(ctx, page_args);
    let first = ctx.queries.page_size(&paging)?;
    let request = ctx.queries.list_types(&paging)?;
    let response = fetch(gateway, &request, output.tenant.as_deref()).await?;

    let mut page: Page<CkType> = page_of(&response, &TYPES_PATH);
    page.items = filter_by_model(std::mem::take(&mut page.items), model);

    if output.json {
        return Ok(CommandOutput::json(&page)?.with_warnings(&response.warnings));
    }

    let mut out = CommandOutput::new().with_warnings(&response.warnings);
    if page.items.is_empty() {
        match model {
            Some(m) => out.line(format!("No types found in model '{m}'.")),
            None => out.line("No types found."),
        }
        return Ok(out);
    }

    let scope = model.map(|m| format!(" in {m}")).unwrap_or_default();
    out.line(format!(
        "CK Types{scope} ({} shown, {} total):",
        page.items.len(),
        page.total_display()
    ));
    out.blank();
    for (model, types) in group_by_model(&page.items) {
        out.line(format!("  [{}]", model_heading(model)));
        for t in types {
            let extends = t
                .base_type_name()
                .map(|b| format!(" extends {b}"))
                .unwrap_or_default();
            out.line(format!(
                "    {:40}{}{extends}",
                t.identifier().short_name(),
                flag_suffix(&t.flags())
            ));
        }
        out.blank();
    }
    push_more_hint(&mut out, &page, first);
    Ok(out)
}

async fn show_type(
    gateway: &dyn GraphqlGateway,
    ctx: &ExploreContext,
    name: &str,
    output: &OutputArgs,
) -> Result<CommandOutput> {
    let request = ctx
        .queries
        .schema_detail(SchemaKind::Type, ctx.schema_scan_size)?;
    let response = fetch(gateway, &request, output.tenant.as_deref()).await?;
    let types: Vec<CkType> = page_of(&response, &TYPES_PATH).items;
    let ck_type = resolve_or_not_found(&types, name, "type")
        .map_err(|e| e.with_warnings(&response.warnings))?;

    if output.json {
        return Ok(CommandOutput::json(ck_type)?.with_warnings(&response.warnings));
    }

    let mut out = CommandOutput::new().with_warnings(&response.warnings);
    render_type(&mut out, ck_type);
    Ok(out)
}

fn render_type(out: &mut CommandOutput, t: &CkType) {
    out.line(format!("Type: {}", t.ck_type_id.full_name));
    out.line(format!("  Abstract: {}", yes_no(t.is_abstract)));
    out.line(format!("  Final:    {}", yes_no(t.is_final)));
    if let Some(desc) = &t.description {
        out.line(format!("  Description: {desc}"));
    }
    match t.base_type_name() {
        Some(base) => out.line(format!("  Base type: {base}")),
        None => out.line("  Base type: (none, root type)"),
    }

    let attributes = t.attribute_definitions();
    if attributes.is_empty() {
        out.line("\n  Attributes: none");
    } else {
        out.line(format!("\n  Attributes ({}):", attributes.len()));
        for attr in attributes {
            let optional = if attr.is_optional.unwrap_or(false) {
                " (optional)"
            } else {
                ""
            };
            out.line(format!(
                "    {:35} {}{optional}",
                attr.attribute_name,
                attr.attribute_value_type.as_deref().unwrap_or("?")
            ));
        }
    }

    let (inbound, outbound) = t
        .associations
        .as_ref()
        .map_or((&[][..], &[][..]), |a| (a.inbound(), a.outbound()));
    if inbound.is_empty() && outbound.is_empty() {
        out.line("\n  Associations: none");
    } else {
        out.line("\n  Associations:");
        let role_info = |a: &octo_core::construction_kit::CkAssociation| {
            format!(
                "(role: {}, nav: {}, mult: {})",
                a.role_id.as_ref().map_or("?", |r| r.full_name.as_str()),
                a.navigation_property_name.as_deref().unwrap_or("?"),
                a.multiplicity.as_deref().unwrap_or("?")
            )
        };
        if !outbound.is_empty() {
            out.line(format!("    Outbound ({}):", outbound.len()));
            for a in outbound {
                let target = a.target_ck_type_id.as_ref().map_or("?", |t| t.full_name.as_str());
                out.line(format!("      -> {target}  {}", role_info(a)));
            }
        }
        if !inbound.is_empty() {
            out.line(format!("    Inbound ({}):", inbound.len()));
            for a in inbound {
                let origin = a.origin_ck_type_id.as_ref().map_or("?", |t| t.full_name.as_str());
                out.line(format!("      <- {origin}  {}", role_info(a)));
            }
        }
    }

    let derived = t.derived_type_names();
    if derived.is_empty() {
        out.line("\n  Derived types: none");
    } else {
        out.line(format!("\n  Derived types ({}):", derived.len()));
        for d in derived {
            out.line(format!("    - {d}"));
        }
    }
}

// ============================================================================
// Enums
// ============================================================================

async fn list_enums(
    gateway: &dyn GraphqlGateway,
    ctx: &ExploreContext,
    model: Option<&str>,
    page_args: &PageArgs,
    output: &OutputArgs,
) -> Result<CommandOutput> {
    let paging = schema_paging(ctx, page_args);
    let first = ctx.queries.page_size(&paging)?;
    let request = ctx.queries.list_enums(&paging)?;
    let response = fetch(gateway, &request, output.tenant.as_deref()).await?;

    let mut page: Page<CkEnum> = page_of(&response, &ENUMS_PATH);
    page.items = filter_by_model(std::mem::take(&mut page.items), model);

    if output.json {
        return Ok(CommandOutput::json(&page)?.with_warnings(&response.warnings));
    }

    let mut out = CommandOutput::new().with_warnings(&response.warnings);
    if page.items.is_empty() {
        match model {
            Some(m) => out.line(format!("No enums found in model '{m}'.")),
            None => out.line("No enums found."),
        }
        return Ok(out);
    }

    let scope = model.map(|m| format!(" in {m}")).unwrap_or_default();
    out.line(format!(
        "CK Enums{scope} ({} shown, {} total):",
        page.items.len(),
        page.total_display()
    ));
    out.blank();
    for (model, enums) in group_by_model(&page.items) {
        out.line(format!("  [{}]", model_heading(model)));
        for e in enums {
            out.line(format!(
                "    {:40}{}  [{} values]",
                e.identifier().short_name(),
                flag_suffix(&e.flags()),
                e.values.len()
            ));
        }
        out.blank();
    }
    push_more_hint(&mut out, &page, first);
    Ok(out)
}

async fn show_enum(
    gateway: &dyn GraphqlGateway,
    ctx: &ExploreContext,
    name: &str,
    output: &OutputArgs,
) -> Result<CommandOutput> {
    let request = ctx
        .queries
        .schema_detail(SchemaKind::Enum, ctx.schema_scan_size)?;
    let response = fetch(gateway, &request, output.tenant.as_deref()).await?;
    let enums: Vec<CkEnum> = page_of(&response, &ENUMS_PATH).items;
    let ck_enum = resolve_or_not_found(&enums, name, "enum")
        .map_err(|e| e.with_warnings(&response.warnings))?;

    if output.json {
        return Ok(CommandOutput::json(ck_enum)?.with_warnings(&response.warnings));
    }

    let mut out = CommandOutput::new().with_warnings(&response.warnings);
    out.line(format!("Enum: {}", ck_enum.ck_enum_id.full_name));
    if let Some(desc) = &ck_enum.description {
        out.line(format!("  Description: {desc}"));
    }
    out.line(format!("  Use flags:    {}", yes_no(ck_enum.use_flags)));
    out.line(format!("  Extensible:   {}", yes_no(ck_enum.is_extensible)));
    if ck_enum.values.is_empty() {
        out.line("\n  Values: none");
    } else {
        out.line(format!("\n  Values ({}):", ck_enum.values.len()));
        for v in &ck_enum.values {
            let desc = v
                .description
                .as_deref()
                .filter(|d| !d.is_empty())
                .map(|d| format!("  ({d})"))
                .unwrap_or_default();
            out.line(format!("    {:4}  {}{desc}", v.key, v.name));
        }
    }
    Ok(out)
}

// ============================================================================
// Search
// ============================================================================

async fn search(
    gateway: &dyn GraphqlGateway,
    ctx: &ExploreContext,
    term: &str,
    first: Option<u32>,
    output: &OutputArgs,
) -> Result<CommandOutput> {
    if first == Some(0) {
        return Err(Error::invalid_argument("--first must be a positive integer"));
    }
    let request = ctx.queries.search_schema(ctx.schema_scan_size)?;
    let response = fetch(gateway, &request, output.tenant.as_deref()).await?;

    let limit = first.map_or(usize::MAX, |n| n as usize);
    let mut types: Vec<CkType> = page_of::<CkType>(&response, &TYPES_PATH)
        .items
        .into_iter()
        .filter(|t| matches_term(&t.ck_type_id, t.description.as_deref(), term))
        .collect();
    types.sort_by(|a, b| a.ck_type_id.full_name.cmp(&b.ck_type_id.full_name));
    types.truncate(limit);

    let mut enums: Vec<CkEnum> = page_of::<CkEnum>(&response, &ENUMS_PATH)
        .items
        .into_iter()
        .filter(|e| matches_term(&e.ck_enum_id, e.description.as_deref(), term))
        .collect();
    enums.sort_by(|a, b| a.ck_enum_id.full_name.cmp(&b.ck_enum_id.full_name));
    enums.truncate(limit);

    tracing::debug!(term, types = types.len(), enums = enums.len(), "schema search");

    if output.json {
        let payload = json!({"types": types, "enums": enums});
        return Ok(CommandOutput::json(&payload)?.with_warnings(&response.warnings));
    }

    let mut out = CommandOutput::new().with_warnings(&response.warnings);
    if types.is_empty() && enums.is_empty() {
        out.line(format!("No types or enums matching '{term}'."));
        return Ok(out);
    }

    if !types.is_empty() {
        out.line(format!("Types matching '{term}' ({}):", types.len()));
        for t in &types {
            let marker = if t.is_abstract.unwrap_or(false) {
                " (abstract)"
            } else {
                ""
            };
            out.line(format!("  {}{marker}", t.ck_type_id.full_name));
        }
    }
    if !enums.is_empty() {
        if !types.is_empty() {
            out.blank();
        }
        out.line(format!("Enums matching '{term}' ({}):", enums.len()));
        for e in &enums {
            out.line(format!("  {}", e.ck_enum_id.full_name));
        }
    }
    Ok(out)
}
