//! Standard GraphQL introspection records.
//!
//! Used as a safety valve for discovering field names when the server
//! schema moves ahead of the canned queries.

use serde::{Deserialize, Serialize};

use crate::connection::null_as_default;

/// Recursive type reference (`{ name kind ofType { ... } }`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeRef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub of_type: Option<Box<TypeRef>>,
}

impl TypeRef {
    /// Render in SDL notation: `String!`, `[Entity]`, `[Int!]!`.
    pub fn display(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        let inner = self.of_type.as_deref();
        match (self.kind.as_deref(), inner) {
            (Some("NON_NULL"), Some(inner)) => format!("{}!", inner.display()),
            (Some("LIST"), Some(inner)) => format!("[{}]", inner.display()),
            (_, Some(inner)) => inner.name.clone().unwrap_or_else(|| "?".to_string()),
            (_, None) => "?".to_string(),
        }
    }

    /// Innermost named type, skipping list and non-null wrappers.
    pub fn named(&self) -> Option<&str> {
        match &self.name {
            Some(name) => Some(name),
            None => self.of_type.as_deref().and_then(TypeRef::named),
        }
    }
}

/// A field of an object type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub name: String,
    #[serde(rename = "type", default)]
    pub field_type: TypeRef,
}

/// An enum value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValueInfo {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Result of `__type(name: ...)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeInfo {
    pub name: String,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Vec<FieldInfo>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub enum_values: Vec<EnumValueInfo>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn type_ref(value: serde_json::Value) -> TypeRef {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_named_type() {
        assert_eq!(type_ref(json!({"name": "String", "kind": "SCALAR"})).display(), "String");
    }

    #[test]
    fn test_non_null_list_of_non_null() {
        let t = type_ref(json!({
            "name": null, "kind": "NON_NULL",
            "ofType": {"name": null, "kind": "LIST",
                "ofType": {"name": null, "kind": "NON_NULL",
                    "ofType": {"name": "Int", "kind": "SCALAR"}}}
        }));
        assert_eq!(t.display(), "[Int!]!");
        assert_eq!(t.named(), Some("Int"));
    }

    #[test]
    fn test_unknown_wrapper_falls_back_to_inner_name() {
        let t = type_ref(json!({"kind": "WEIRD", "ofType": {"name": "X"}}));
        assert_eq!(t.display(), "X");
        assert_eq!(type_ref(json!({})).display(), "?");
    }

    #[test]
    fn test_type_info_null_collections() {
        let info: TypeInfo = serde_json::from_value(json!({
            "name": "Query", "kind": "OBJECT", "fields": null, "enumValues": null
        }))
        .unwrap();
        assert!(info.fields.is_empty());
        assert!(info.enum_values.is_empty());
    }
}
