//! Relay-style connection unwrapping.
//!
//! The server wraps every paged list as
//! `{ totalCount, pageInfo { hasNextPage endCursor }, edges [{ node }] }`.
//! This module is the one place where whatever the server sent is turned
//! into plain, ordered collections. It never fails: a missing connection,
//! a missing `edges` array, null nodes and nodes that do not decode into
//! the expected record all collapse to "no item".

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ============================================================================
// Wire types
// ============================================================================

/// Paging metadata of a connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Whether the server holds more items after this page.
    #[serde(default)]
    pub has_next_page: bool,

    /// Cursor to pass as `after` for the next page.
    #[serde(default)]
    pub end_cursor: Option<String>,
}

/// A single edge. `node` is `None` when the server sent null or an
/// undecodable node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge<T> {
    /// The wrapped item.
    pub node: Option<T>,
}

/// A decoded connection.
///
/// Deserialization is lenient (see [`Connection::from_value`]), so typed
/// records can embed sub-connections without risking a failed decode of the
/// whole response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    /// Total number of matching items on the server, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,

    /// Paging metadata, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_info: Option<PageInfo>,

    /// Edges in server order.
    pub edges: Vec<Edge<T>>,
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Self {
            total_count: None,
            page_info: None,
            edges: Vec::new(),
        }
    }
}

impl<T: DeserializeOwned> Connection<T> {
    /// Decode a connection from an arbitrary JSON value.
    pub fn from_value(value: Option<&Value>) -> Self {
        let Some(Value::Object(map)) = value else {
            return Self::default();
        };

        let total_count = map.get("totalCount").and_then(Value::as_u64);
        let page_info = map
            .get("pageInfo")
            .filter(|v| !v.is_null())
            .and_then(|v| serde_json::from_value::<PageInfo>(v.clone()).ok());

        let edges = match map.get("edges") {
            Some(Value::Array(edges)) => edges.iter().map(decode_edge).collect(),
            _ => Vec::new(),
        };

        Self {
            total_count,
            page_info,
            edges,
        }
    }
}

impl<T> Connection<T> {
    /// Consume the connection, keeping present nodes in original order.
    pub fn into_nodes(self) -> Vec<T> {
        self.edges.into_iter().filter_map(|edge| edge.node).collect()
    }

    /// Consume the connection into a page of items plus paging metadata.
    pub fn into_page(self) -> Page<T> {
        let total_count = self.total_count;
        let page_info = self.page_info.clone();
        Page {
            items: self.into_nodes(),
            total_count,
            page_info,
        }
    }

    /// Number of present nodes.
    pub fn node_count(&self) -> usize {
        self.edges.iter().filter(|e| e.node.is_some()).count()
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Connection<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(Some(&value)))
    }
}

fn decode_edge<T: DeserializeOwned>(edge: &Value) -> Edge<T> {
    let node = match edge.get("node") {
        None | Some(Value::Null) => None,
        Some(node) => match serde_json::from_value::<T>(node.clone()) {
            Ok(node) => Some(node),
            Err(e) => {
                tracing::warn!("dropping undecodable node: {e}");
                None
            }
        },
    };
    Edge { node }
}

/// Flatten a connection value into its nodes.
///
/// # Example
///
/// ```
/// use octo_core::unwrap_connection;
/// use serde_json::{json, Value};
///
/// let conn = json!({"edges": [{"node": null}, {"node": {"id": 1}}]});
/// let nodes: Vec<Value> = unwrap_connection(Some(&conn));
/// assert_eq!(nodes, vec![json!({"id": 1})]);
/// ```
pub fn unwrap_connection<T: DeserializeOwned>(connection: Option<&Value>) -> Vec<T> {
    Connection::<T>::from_value(connection).into_nodes()
}

// ============================================================================
// Page
// ============================================================================

/// One fetched page of items.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items in server order.
    pub items: Vec<T>,

    /// Server-side total, if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,

    /// Paging metadata, if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_info: Option<PageInfo>,
}

impl<T> Page<T> {
    /// Whether the server reported more items after this page.
    pub fn has_next_page(&self) -> bool {
        self.page_info.as_ref().is_some_and(|p| p.has_next_page)
    }

    /// Cursor for the next page, if any.
    pub fn end_cursor(&self) -> Option<&str> {
        self.page_info.as_ref().and_then(|p| p.end_cursor.as_deref())
    }

    /// Total as display text (`?` when the server did not report one).
    pub fn total_display(&self) -> String {
        self.total_count
            .map_or_else(|| "?".to_string(), |t| t.to_string())
    }
}

// ============================================================================
// Item lists
// ============================================================================

/// The `{ items: [...] }` wrapper used for runtime attributes, association
/// definitions and transient-query rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ItemList<T> {
    /// Wrapped items; a null or missing list decodes as empty.
    #[serde(default = "Vec::new", deserialize_with = "null_as_default")]
    pub items: Vec<T>,
}

impl<T> Default for ItemList<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

/// Items of an optional list, treating absence as empty.
pub fn items_of<T>(list: Option<&ItemList<T>>) -> &[T] {
    list.map_or(&[], |l| l.items.as_slice())
}

/// Deserialize `null` as the type's default value.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Tests
// ============================================================================
