//! Runtime entity records and transient query results.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::connection::{ItemList, items_of};
use crate::table::Table;

/// A runtime entity (an instance of a CK type).
///
/// Only the identity fields are always requested; attributes and
/// associations are present when the query variant asked for them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeEntity {
    /// Runtime object id.
    #[serde(default)]
    pub rt_id: Option<String>,

    /// CK type of this entity.
    #[serde(default)]
    pub ck_type_id: Option<String>,

    /// Optional well-known name.
    #[serde(default)]
    pub rt_well_known_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rt_creation_date_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rt_changed_date_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rt_version: Option<Value>,

    /// Attribute values, when fetched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<ItemList<AttributeValue>>,

    /// Association definitions, when fetched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub associations: Option<RuntimeAssociations>,
}

/// One `{ attributeName, value }` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeValue {
    pub attribute_name: String,
    #[serde(default)]
    pub value: Value,
}

/// Outbound association definitions of an entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeAssociations {
    #[serde(default)]
    pub definitions: Option<ItemList<AssociationDefinition>>,
}

/// A single association edge to another runtime entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociationDefinition {
    #[serde(default)]
    pub ck_association_role_id: Option<String>,
    #[serde(default)]
    pub target_rt_id: Option<String>,
    #[serde(default)]
    pub target_ck_type_id: Option<String>,
}

impl RuntimeEntity {
    /// Well-known name, falling back to the rtId, then `?`.
    pub fn display_name(&self) -> &str {
        self.rt_well_known_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(self.rt_id.as_deref())
            .unwrap_or("?")
    }

    /// The rtId, or `?`.
    pub fn rt_id_display(&self) -> &str {
        self.rt_id.as_deref().unwrap_or("?")
    }

    /// Attribute values in server order.
    pub fn attribute_values(&self) -> &[AttributeValue] {
        items_of(self.attributes.as_ref())
    }

    /// Value of a named attribute, if present.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attribute_values()
            .iter()
            .find(|a| a.attribute_name == name)
            .map(|a| &a.value)
    }

    /// Outbound association definitions.
    pub fn outbound_associations(&self) -> &[AssociationDefinition] {
        items_of(
            self.associations
                .as_ref()
                .and_then(|a| a.definitions.as_ref()),
        )
    }
}

// ============================================================================
// Transient queries
// ============================================================================

/// Result of `transientQuery.simple`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransientQueryResult {
    #[serde(default)]
    pub total_count: Option<u64>,
    #[serde(default, deserialize_with = "crate::connection::null_as_default")]
    pub items: Vec<TransientQueryItem>,
}

/// Column definitions plus the rows of one projection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransientQueryItem {
    #[serde(default, deserialize_with = "crate::connection::null_as_default")]
    pub columns: Vec<ColumnDefinition>,
    #[serde(default)]
    pub rows: Option<ItemList<TransientRow>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    #[serde(default)]
    pub attribute_path: Option<String>,
    #[serde(default)]
    pub attribute_value_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransientRow {
    #[serde(default)]
    pub cells: Option<ItemList<TransientCell>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransientCell {
    #[serde(default)]
    pub attribute_path: Option<String>,
    #[serde(default)]
    pub value: Value,
}

impl TransientQueryResult {
    /// The first projection, which is the only one `simple` returns.
    pub fn first_item(&self) -> Option<&TransientQueryItem> {
        self.items.first()
    }
}

impl TransientQueryItem {
    /// Rows in server order.
    pub fn rows(&self) -> &[TransientRow] {
        items_of(self.rows.as_ref())
    }

    /// Convert into a renderable table. Rows keep their own cell count.
    pub fn to_table(&self) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|c| c.attribute_path.clone().unwrap_or_else(|| "?".to_string()))
            .collect();
        let rows = self
            .rows()
            .iter()
            .map(|row| {
                items_of(row.cells.as_ref())
                    .iter()
                    .map(|cell| cell.value.clone())
                    .collect()
            })
            .collect();
        Table::new(columns, rows)
    }
}
