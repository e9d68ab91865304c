//! Handler functions for `rt` commands.

use octo_client::{GatewayResponse, GraphqlGateway};
use octo_core::runtime::{RuntimeEntity, TransientQueryResult};
use octo_core::table::render_key_values;
use octo_core::{
    Connection, Error, FieldFilter, Page, Paging, Projection, Result, SortSpec,
    TableRenderer, format_value,
};
use serde_json::{Value, json};

use crate::cli::{OutputArgs, RtAction};
use crate::context::{ExploreContext, fetch};
use crate::output::{CommandOutput, more_results_hint};

const ENTITIES_PATH: [&str; 2] = ["runtime", "runtimeEntities"];
const TRANSIENT_PATH: [&str; 3] = ["runtime", "transientQuery", "simple"];

const ATTRIBUTE_KEY_WIDTH: usize = 35;

/// Handle an `rt` subcommand.
pub async fn handle_rt_command(
    gateway: &dyn GraphqlGateway,
    ctx: &ExploreContext,
    action: RtAction,
) -> Result<CommandOutput> {
    match action {
        RtAction::List {
            ck_id,
            attrs,
            sort,
            page,
            output,
        } => {
            let projection = if attrs {
                Projection::WithAttributes
            } else {
                Projection::Compact
            };
            list(gateway, ctx, &ck_id, projection, &page.paging(), sort.sort.as_ref(), &output).await
        }
        RtAction::Get {
            ck_id,
            rt_id,
            output,
        } => get(gateway, ctx, &ck_id, &rt_id, &output).await,
        RtAction::Count { ck_id, output } => count(gateway, ctx, &ck_id, &output).await,
        RtAction::Search {
            ck_id,
            term,
            attr,
            sort,
            page,
            output,
        } => {
            let paging = page.paging();
            let request =
                ctx.queries
                    .search_entities(&ck_id, &attr, &term, &paging, sort.sort.as_ref())?;
            let response = fetch(gateway, &request, output.tenant.as_deref()).await?;
            let page: Page<RuntimeEntity> = entity_page(&response);
            if output.json {
                return entities_json(&page, &response);
            }
            let mut out = CommandOutput::new().with_warnings(&response.warnings);
            if page.items.is_empty() {
                out.line(format!(
                    "No instances of '{ck_id}' matching '{term}' (on attribute '{attr}')."
                ));
                return Ok(out);
            }
            out.line(format!(
                "Search '{term}' on {ck_id}.{attr} ({} shown, {} matched):",
                page.items.len(),
                page.total_display()
            ));
            out.blank();
            render_matches(&mut out, ctx, &page, &attr);
            push_more_hint(&mut out, &page, ctx.queries.page_size(&paging)?);
            Ok(out)
        }
        RtAction::Query {
            ck_id,
            columns,
            sort,
            page,
            output,
        } => query(gateway, ctx, &ck_id, &columns, &page.paging(), sort.sort.as_ref(), &output).await,
        RtAction::Filter {
            ck_id,
            attr,
            op,
            value,
            sort,
            page,
            output,
        } => {
            let filter = FieldFilter::from_cli(&attr, op, &value);
            filter_entities(gateway, ctx, &ck_id, &filter, &page.paging(), sort.sort.as_ref(), &output)
                .await
        }
    }
}

fn entity_page(response: &GatewayResponse) -> Page<RuntimeEntity> {
    Connection::<RuntimeEntity>::from_value(response.at(&ENTITIES_PATH)).into_page()
}

fn entities_json(page: &Page<RuntimeEntity>, response: &GatewayResponse) -> Result<CommandOutput> {
    let payload = json!({
        "totalCount": page.total_count,
        "pageInfo": page.page_info,
        "entities": page.items,
    });
    Ok(CommandOutput::json(&payload)?.with_warnings(&response.warnings))
}

fn push_more_hint<T>(out: &mut CommandOutput, page: &Page<T>, first: u32) {
    if page.has_next_page() {
        if !out.stdout.ends_with("\n\n") {
            out.blank();
        }
        out.line(more_results_hint(first, page.end_cursor()));
    }
}

/// `  rtId  name  (attr=value)` lines for search and filter results.
fn render_matches(out: &mut CommandOutput, ctx: &ExploreContext, page: &Page<RuntimeEntity>, attr: &str) {
    for entity in &page.items {
        let value = entity
            .attribute(attr)
            .map(|v| format_value(v, ctx.attribute_max_len))
            .unwrap_or_default();
        out.line(format!(
            "  {}  {}  ({attr}={value})",
            entity.rt_id_display(),
            entity.display_name()
        ));
    }
}

fn render_attributes(out: &mut CommandOutput, ctx: &ExploreContext, entity: &RuntimeEntity) {
    let pairs = entity
        .attribute_values()
        .iter()
        .map(|a| (a.attribute_name.as_str(), &a.value));
    out.push_block(&render_key_values(
        pairs,
        "    ",
        ATTRIBUTE_KEY_WIDTH,
        ctx.attribute_max_len,
    ));
}

async fn list(
    gateway: &dyn GraphqlGateway,
    ctx: &ExploreContext,
    ck_id: &str,
    projection: Projection,
    paging: &Paging,
    sort: Option<&SortSpec>,
    output: &OutputArgs,
) -> Result<CommandOutput> {
    let first = ctx.queries.page_size(paging)?;
    let request = ctx.queries.list_entities(ck_id, projection, paging, sort)?;
    let response = fetch(gateway, &request, output.tenant.as_deref()).await?;
    let page = entity_page(&response);

    if output.json {
        return entities_json(&page, &response);
    }

    let mut out = CommandOutput::new().with_warnings(&response.warnings);
    if page.items.is_empty() {
        out.line(format!("No instances of '{ck_id}' found."));
        return Ok(out);
    }

    out.line(format!(
        "Instances of {ck_id} ({} shown, {} total):",
        page.items.len(),
        page.total_display()
    ));
    out.blank();
    for entity in &page.items {
        out.line(format!(
            "  {}  {}",
            entity.rt_id_display(),
            entity.display_name()
        ));
        if projection == Projection::WithAttributes {
            render_attributes(&mut out, ctx, entity);
            out.blank();
        }
    }
    push_more_hint(&mut out, &page, first);
    Ok(out)
}

async fn get(
    gateway: &dyn GraphqlGateway,
    ctx: &ExploreContext,
    ck_id: &str,
    rt_id: &str,
    output: &OutputArgs,
) -> Result<CommandOutput> {
    let request = ctx.queries.get_entity(ck_id, rt_id)?;
    let response = fetch(gateway, &request, output.tenant.as_deref()).await?;
    let entity = entity_page(&response)
        .items
        .into_iter()
        .next()
        .ok_or_else(|| {
            Error::not_found(format!("entity not found: ckId={ck_id} rtId={rt_id}"))
                .with_warnings(&response.warnings)
        })?;

    if output.json {
        return Ok(CommandOutput::json(&entity)?.with_warnings(&response.warnings));
    }

    let unknown = |v: &Option<String>| v.clone().unwrap_or_else(|| "?".to_string());
    let mut out = CommandOutput::new().with_warnings(&response.warnings);
    out.line(format!("Entity: {}", entity.display_name()));
    out.line(format!("  rtId:      {}", entity.rt_id_display()));
    out.line(format!("  ckTypeId:  {}", unknown(&entity.ck_type_id)));
    out.line(format!("  created:   {}", unknown(&entity.rt_creation_date_time)));
    out.line(format!("  changed:   {}", unknown(&entity.rt_changed_date_time)));
    out.line(format!(
        "  version:   {}",
        entity
            .rt_version
            .as_ref()
            .map_or_else(|| "?".to_string(), |v| format_value(v, ctx.attribute_max_len))
    ));

    let attributes = entity.attribute_values();
    if attributes.is_empty() {
        out.line("\n  Attributes: none");
    } else {
        out.line(format!("\n  Attributes ({}):", attributes.len()));
        render_attributes(&mut out, ctx, &entity);
    }

    let associations = entity.outbound_associations();
    if associations.is_empty() {
        out.line("\n  Outbound associations: none");
    } else {
        out.line(format!("\n  Outbound associations ({}):", associations.len()));
        for a in associations {
            out.line(format!(
                "    -> {}  rtId={}  (role: {})",
                a.target_ck_type_id.as_deref().unwrap_or("?"),
                a.target_rt_id.as_deref().unwrap_or("?"),
                a.ck_association_role_id.as_deref().unwrap_or("?")
            ));
        }
    }
    Ok(out)
}

async fn count(
    gateway: &dyn GraphqlGateway,
    ctx: &ExploreContext,
    ck_id: &str,
    output: &OutputArgs,
) -> Result<CommandOutput> {
    let request = ctx.queries.count_entities(ck_id)?;
    let response = fetch(gateway, &request, output.tenant.as_deref()).await?;
    let total = response
        .at(&["runtime", "runtimeEntities", "totalCount"])
        .and_then(Value::as_u64);

    if output.json {
        let payload = json!({"ckId": ck_id, "totalCount": total});
        return Ok(CommandOutput::json(&payload)?.with_warnings(&response.warnings));
    }

    let mut out = CommandOutput::new().with_warnings(&response.warnings);
    let shown = total.map_or_else(|| "?".to_string(), |t| t.to_string());
    out.line(format!("{ck_id}: {shown} instances"));
    Ok(out)
}

async fn query(
    gateway: &dyn GraphqlGateway,
    ctx: &ExploreContext,
    ck_id: &str,
    columns: &[String],
    paging: &Paging,
    sort: Option<&SortSpec>,
    output: &OutputArgs,
) -> Result<CommandOutput> {
    let first = ctx.queries.page_size(paging)?;
    let request = ctx
        .queries
        .project_columns(ck_id, columns, paging, sort, None)?;
    let response = fetch(gateway, &request, output.tenant.as_deref()).await?;
    let result: TransientQueryResult = match response.at(&TRANSIENT_PATH) {
        Some(value) => serde_json::from_value(value.clone())?,
        None => TransientQueryResult::default(),
    };

    if output.json {
        return Ok(CommandOutput::json(&result)?.with_warnings(&response.warnings));
    }

    let mut out = CommandOutput::new().with_warnings(&response.warnings);
    let Some(item) = result.first_item() else {
        out.line(format!("No results for transient query on '{ck_id}'."));
        return Ok(out);
    };
    let table = item.to_table();

    let total = result
        .total_count
        .map_or_else(|| "?".to_string(), |t| t.to_string());
    out.line(format!(
        "Transient query on {ck_id} ({} rows, {total} total):",
        table.rows.len()
    ));
    out.blank();
    out.push_block(
        &TableRenderer::new()
            .with_cell_max_len(ctx.cell_max_len)
            .render(&table),
    );
    // The transient query reports no page info; a short page means more exist.
    if result
        .total_count
        .is_some_and(|t| t > table.rows.len() as u64)
    {
        out.blank();
        out.line(more_results_hint(first, None));
    }
    Ok(out)
}

async fn filter_entities(
    gateway: &dyn GraphqlGateway,
    ctx: &ExploreContext,
    ck_id: &str,
    filter: &FieldFilter,
    paging: &Paging,
    sort: Option<&SortSpec>,
    output: &OutputArgs,
) -> Result<CommandOutput> {
    let first = ctx.queries.page_size(paging)?;
    let request = ctx.queries.filter_entities(ck_id, filter, paging, sort)?;
    let response = fetch(gateway, &request, output.tenant.as_deref()).await?;
    let page = entity_page(&response);

    if output.json {
        return entities_json(&page, &response);
    }

    let mut out = CommandOutput::new().with_warnings(&response.warnings);
    if page.items.is_empty() {
        out.line(format!("No instances of '{ck_id}' where {filter}."));
        return Ok(out);
    }

    out.line(format!(
        "Filter {ck_id} where {filter} ({} shown, {} matched):",
        page.items.len(),
        page.total_display()
    ));
    out.blank();
    render_matches(&mut out, ctx, &page, &filter.attribute_path);
    push_more_hint(&mut out, &page, first);
    Ok(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cli::{PageArgs, SortArgs};
    use octo_client::MockGateway;
    use octo_core::FilterOperator;

    fn output() -> OutputArgs {
        OutputArgs::default()
    }

    fn entities(total: u64, has_next: bool, nodes: Value) -> Value {
        let cursor = if has_next { json!("cur1") } else { Value::Null };
        json!({"runtime": {"runtimeEntities": {
            "totalCount": total,
            "pageInfo": {"hasNextPage": has_next, "endCursor": cursor},
            "edges": nodes
        }}})
    }

    #[tokio::test]
    async fn test_list_compact() {
        let gateway = MockGateway::with_data(entities(
            120,
            true,
            json!([
                {"node": {"rtId": "65a1", "rtWellKnownName": "Pump-1"}},
                {"node": {"rtId": "65a2", "rtWellKnownName": null}}
            ]),
        ));
        let action = RtAction::List {
            ck_id: "Basic/Machine".into(),
            attrs: false,
            sort: SortArgs::default(),
            page: PageArgs::default(),
            output: output(),
        };
        let out = handle_rt_command(&gateway, &ExploreContext::default(), action)
            .await
            .unwrap();

        assert!(out.stdout.starts_with("Instances of Basic/Machine (2 shown, 120 total):\n\n"));
        assert!(out.stdout.contains("  65a1  Pump-1\n"));
        assert!(out.stdout.contains("  65a2  65a2\n"));
        assert!(out.stdout.contains("--first 100"));
        assert!(out.stdout.contains("--after cur1"));
    }

    #[tokio::test]
    async fn test_list_with_attributes_renders_values() {
        let gateway = MockGateway::with_data(entities(
            1,
            false,
            json!([{"node": {
                "rtId": "1",
                "rtWellKnownName": "Pump-1",
                "attributes": {"items": [
                    {"attributeName": "name", "value": "Pump-1"},
                    {"attributeName": "serial", "value": null}
                ]}
            }}]),
        ));
        let action = RtAction::List {
            ck_id: "Basic/Machine".into(),
            attrs: true,
            sort: SortArgs::default(),
            page: PageArgs::default(),
            output: output(),
        };
        let out = handle_rt_command(&gateway, &ExploreContext::default(), action)
            .await
            .unwrap();

        let name_line = format!("    {:35} = Pump-1\n", "name");
        assert!(out.stdout.contains(&name_line));
        assert!(out.stdout.contains("= (null)"));
        let requests = gateway.requests().await;
        assert_eq!(
            requests[0].request.operation,
            octo_core::Operation::ListEntitiesWithAttributes
        );
    }

    #[tokio::test]
    async fn test_list_empty() {
        let gateway = MockGateway::with_data(json!({"runtime": {"runtimeEntities": {"totalCount": 0, "edges": []}}}));
        let action = RtAction::List {
            ck_id: "Basic/Machine".into(),
            attrs: false,
            sort: SortArgs::default(),
            page: PageArgs::default(),
            output: output(),
        };
        let out = handle_rt_command(&gateway, &ExploreContext::default(), action)
            .await
            .unwrap();
        assert_eq!(out.stdout, "No instances of 'Basic/Machine' found.\n");
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let gateway = MockGateway::with_data(json!({"runtime": {"runtimeEntities": {"edges": []}}}));
        let action = RtAction::Get {
            ck_id: "Basic/Machine".into(),
            rt_id: "abc".into(),
            output: output(),
        };
        let err = handle_rt_command(&gateway, &ExploreContext::default(), action)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Not found: entity not found: ckId=Basic/Machine rtId=abc");
    }

    #[tokio::test]
    async fn test_get_with_associations() {
        let gateway = MockGateway::with_data(entities(
            1,
            false,
            json!([{"node": {
                "rtId": "65a1",
                "ckTypeId": "Basic/Machine",
                "rtWellKnownName": "Pump-1",
                "rtVersion": 3,
                "attributes": {"items": [{"attributeName": "name", "value": "Pump-1"}]},
                "associations": {"definitions": {"items": [
                    {"ckAssociationRoleId": "System/ParentChild", "targetRtId": "77", "targetCkTypeId": "Basic/Tree"}
                ]}}
            }}]),
        ));
        let action = RtAction::Get {
            ck_id: "Basic/Machine".into(),
            rt_id: "65a1".into(),
            output: output(),
        };
        let out = handle_rt_command(&gateway, &ExploreContext::default(), action)
            .await
            .unwrap();
        assert!(out.stdout.starts_with("Entity: Pump-1\n  rtId:      65a1\n"));
        assert!(out.stdout.contains("  created:   ?\n"));
        assert!(out.stdout.contains("  version:   3\n"));
        assert!(out.stdout.contains("\n  Attributes (1):\n"));
        assert!(out.stdout.contains("    -> Basic/Tree  rtId=77  (role: System/ParentChild)\n"));
    }

    #[tokio::test]
    async fn test_count_text_and_json() {
        let data = json!({"runtime": {"runtimeEntities": {"totalCount": 42}}});
        let gateway = MockGateway::with_data(data);
        let action = RtAction::Count {
            ck_id: "Basic/Machine".into(),
            output: output(),
        };
        let out = handle_rt_command(&gateway, &ExploreContext::default(), action)
            .await
            .unwrap();
        assert_eq!(out.stdout, "Basic/Machine: 42 instances\n");

        let action = RtAction::Count {
            ck_id: "Basic/Machine".into(),
            output: OutputArgs {
                json: true,
                tenant: Some("other".into()),
            },
        };
        let out = handle_rt_command(&gateway, &ExploreContext::default(), action)
            .await
            .unwrap();
        let parsed: Value = serde_json::from_str(&out.stdout).unwrap();
        assert_eq!(parsed, json!({"ckId": "Basic/Machine", "totalCount": 42}));
        let requests = gateway.requests().await;
        assert_eq!(requests[1].tenant.as_deref(), Some("other"));
    }

    #[tokio::test]
    async fn test_search_shows_searched_attribute() {
        let gateway = MockGateway::with_data(entities(
            1,
            false,
            json!([{"node": {
                "rtId": "1",
                "rtWellKnownName": "P1",
                "attributes": {"items": [{"attributeName": "name", "value": "Pump One"}]}
            }}]),
        ));
        let action = RtAction::Search {
            ck_id: "Basic/Machine".into(),
            term: "Pump".into(),
            attr: "name".into(),
            sort: SortArgs::default(),
            page: PageArgs::default(),
            output: output(),
        };
        let out = handle_rt_command(&gateway, &ExploreContext::default(), action)
            .await
            .unwrap();
        assert!(out.stdout.starts_with("Search 'Pump' on Basic/Machine.name (1 shown, 1 matched):\n\n"));
        assert!(out.stdout.contains("  1  P1  (name=Pump One)\n"));

        let requests = gateway.requests().await;
        assert_eq!(
            requests[0].request.variable("fieldFilter"),
            Some(&json!([{"attributePath": "name", "operator": "LIKE", "comparisonValue": "Pump"}]))
        );
    }

    #[tokio::test]
    async fn test_filter_empty_message() {
        let gateway = MockGateway::with_data(json!({"runtime": {"runtimeEntities": {"totalCount": 0, "edges": null}}}));
        let action = RtAction::Filter {
            ck_id: "Basic/Machine".into(),
            attr: "count".into(),
            op: FilterOperator::GreaterThan,
            value: "10".into(),
            sort: SortArgs::default(),
            page: PageArgs::default(),
            output: output(),
        };
        let out = handle_rt_command(&gateway, &ExploreContext::default(), action)
            .await
            .unwrap();
        assert_eq!(
            out.stdout,
            "No instances of 'Basic/Machine' where count GREATER_THAN 10.\n"
        );
        let requests = gateway.requests().await;
        assert_eq!(
            requests[0].request.variable("fieldFilter"),
            Some(&json!([{"attributePath": "count", "operator": "GREATER_THAN", "comparisonValue": 10}]))
        );
    }

    #[tokio::test]
    async fn test_query_renders_table() {
        let gateway = MockGateway::with_data(json!({"runtime": {"transientQuery": {"simple": {
            "totalCount": 5,
            "items": [{
                "columns": [{"attributePath": "name"}, {"attributePath": "machineState"}],
                "rows": {"items": [
                    {"cells": {"items": [{"value": "Pump-1"}, {"value": 1}]}},
                    {"cells": {"items": [{"value": "Pump-2"}, {"value": null}]}}
                ]}
            }]
        }}}}));
        let action = RtAction::Query {
            ck_id: "Basic/Machine".into(),
            columns: vec!["name".into(), "machineState".into()],
            sort: SortArgs::default(),
            page: PageArgs {
                first: Some(2),
                after: None,
            },
            output: output(),
        };
        let out = handle_rt_command(&gateway, &ExploreContext::default(), action)
            .await
            .unwrap();
        assert!(out.stdout.starts_with("Transient query on Basic/Machine (2 rows, 5 total):\n\n"));
        assert!(out.stdout.contains("  name        machineState\n"));
        assert!(out.stdout.contains("(null)"));
        assert!(out.stdout.contains("--first 4"));
    }

    #[tokio::test]
    async fn test_query_without_rows() {
        let gateway = MockGateway::with_data(json!({"runtime": {"transientQuery": {"simple": {"totalCount": 0, "items": []}}}}));
        let action = RtAction::Query {
            ck_id: "Basic/Machine".into(),
            columns: vec!["name".into()],
            sort: SortArgs::default(),
            page: PageArgs::default(),
            output: output(),
        };
        let out = handle_rt_command(&gateway, &ExploreContext::default(), action)
            .await
            .unwrap();
        assert_eq!(out.stdout, "No results for transient query on 'Basic/Machine'.\n");
    }

    #[tokio::test]
    async fn test_query_with_columns_and_no_rows_prints_header() {
        let gateway = MockGateway::with_data(json!({"runtime": {"transientQuery": {"simple": {
            "totalCount": 0,
            "items": [{
                "columns": [{"attributePath": "name"}, {"attributePath": "machineState"}],
                "rows": {"items": []}
            }]
        }}}}));
        let action = RtAction::Query {
            ck_id: "Basic/Machine".into(),
            columns: vec!["name".into(), "machineState".into()],
            sort: SortArgs::default(),
            page: PageArgs::default(),
            output: output(),
        };
        let out = handle_rt_command(&gateway, &ExploreContext::default(), action)
            .await
            .unwrap();
        assert_eq!(
            out.stdout,
            "Transient query on Basic/Machine (0 rows, 0 total):\n\n  name        machineState\n  ----------  ------------\n"
        );
    }

    #[tokio::test]
    async fn test_zero_first_rejected_before_request() {
        let gateway = MockGateway::with_data(json!({}));
        let action = RtAction::List {
            ck_id: "Basic/Machine".into(),
            attrs: false,
            sort: SortArgs::default(),
            page: PageArgs {
                first: Some(0),
                after: None,
            },
            output: output(),
        };
        let err = handle_rt_command(&gateway, &ExploreContext::default(), action)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(gateway.request_count().await, 0);
    }
}
