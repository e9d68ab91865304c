//! GraphQL response envelope and its classification.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use octo_core::{Error, Result};

/// A GraphQL error entry.
///
/// Only `message` is relied on; the metadata is decoded leniently so an
/// unusual error shape never hides the messages or the partial data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphqlError {
    /// Error message.
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    /// Source locations.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub locations: Vec<GraphqlLocation>,
    /// Response path.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub path: Vec<Value>,
    /// Extensions payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl GraphqlError {
    /// Message text, with a placeholder for errors that carry none.
    pub fn display_message(&self) -> String {
        if self.message.is_empty() {
            serde_json::to_string(self).unwrap_or_else(|_| "(no message)".to_string())
        } else {
            self.message.clone()
        }
    }
}

/// Location of an error in the query document. Either part may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphqlLocation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

/// Raw `{ data, errors }` body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphqlResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub errors: Vec<GraphqlError>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl GraphqlResponse {
    /// Parse a response body.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body)
            .map_err(|e| Error::serialization(format!("invalid GraphQL response body: {e}")))
    }

    /// Whether `data` is present and non-null.
    pub fn has_data(&self) -> bool {
        !matches!(self.data, None | Some(Value::Null))
    }

    /// Classify the envelope.
    ///
    /// Errors without usable data fail the request with every message.
    /// Errors next to usable data become warnings on a successful response.
    pub fn into_result(self) -> Result<GatewayResponse> {
        let messages: Vec<String> = self.errors.iter().map(GraphqlError::display_message).collect();
        if !messages.is_empty() && !self.has_data() {
            return Err(Error::GraphQl { messages });
        }
        Ok(GatewayResponse {
            data: self.data.unwrap_or(Value::Null),
            warnings: messages,
        })
    }
}

/// A successful gateway call: the `data` payload plus any GraphQL errors
/// that came alongside it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GatewayResponse {
    pub data: Value,
    pub warnings: Vec<String>,
}

impl GatewayResponse {
    pub fn new(data: Value) -> Self {
        Self {
            data,
            warnings: Vec::new(),
        }
    }

    /// Walk `data` along object keys, e.g. `["runtime", "runtimeEntities"]`.
    pub fn at(&self, path: &[&str]) -> Option<&Value> {
        path.iter()
            .try_fold(&self.data, |value, key| value.get(*key))
            .filter(|v| !v.is_null())
    }
}
