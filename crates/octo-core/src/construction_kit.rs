//! Construction Kit schema records: models, types and enums.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::connection::{Connection, null_as_default};
use crate::resolver::{Identified, Identifier};

/// A CK model (a versioned package of types and enums).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CkModel {
    pub id: Identifier,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub model_state: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dependencies: Vec<Identifier>,
}

/// Reference to another type, as in `baseType { ckTypeId { fullName } }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CkTypeRef {
    #[serde(default)]
    pub ck_type_id: Option<Identifier>,
}

impl CkTypeRef {
    /// Full name of the referenced type, if present.
    pub fn full_name(&self) -> Option<&str> {
        self.ck_type_id.as_ref().map(|id| id.full_name.as_str())
    }
}

/// A CK type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CkType {
    pub ck_type_id: Identifier,
    #[serde(default)]
    pub is_abstract: Option<bool>,
    #[serde(default)]
    pub is_final: Option<bool>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub base_type: Option<CkTypeRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Connection<CkAttribute>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub associations: Option<CkAssociations>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived_types: Option<Connection<CkTypeRef>>,
}

impl CkType {
    /// Base type full name, if the type is not a root type.
    pub fn base_type_name(&self) -> Option<&str> {
        self.base_type.as_ref().and_then(CkTypeRef::full_name)
    }

    /// `abstract` / `final` flags that are set.
    pub fn flags(&self) -> Vec<&'static str> {
        let mut flags = Vec::new();
        if self.is_abstract.unwrap_or(false) {
            flags.push("abstract");
        }
        if self.is_final.unwrap_or(false) {
            flags.push("final");
        }
        flags
    }

    /// Attribute definitions, when fetched.
    pub fn attribute_definitions(&self) -> Vec<&CkAttribute> {
        self.attributes
            .iter()
            .flat_map(|c| c.edges.iter().filter_map(|e| e.node.as_ref()))
            .collect()
    }

    /// Full names of the directly derived types, when fetched.
    pub fn derived_type_names(&self) -> Vec<&str> {
        self.derived_types
            .iter()
            .flat_map(|c| c.edges.iter().filter_map(|e| e.node.as_ref()))
            .filter_map(CkTypeRef::full_name)
            .collect()
    }
}

/// Attribute definition of a CK type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CkAttribute {
    pub attribute_name: String,
    #[serde(default)]
    pub attribute_value_type: Option<String>,
    #[serde(default)]
    pub is_optional: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_complete_values: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_increment_reference: Option<serde_json::Value>,
}

/// Inbound and outbound associations of a CK type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CkAssociations {
    #[serde(rename = "in", default)]
    pub inbound: Option<CkAssociationGroup>,
    #[serde(rename = "out", default)]
    pub outbound: Option<CkAssociationGroup>,
}

impl CkAssociations {
    pub fn inbound(&self) -> &[CkAssociation] {
        self.inbound.as_ref().map_or(&[], |g| g.all.as_slice())
    }

    pub fn outbound(&self) -> &[CkAssociation] {
        self.outbound.as_ref().map_or(&[], |g| g.all.as_slice())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CkAssociationGroup {
    #[serde(default, deserialize_with = "null_as_default")]
    pub all: Vec<CkAssociation>,
}

/// A CK association role between two types.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CkAssociation {
    #[serde(default)]
    pub role_id: Option<Identifier>,
    #[serde(default)]
    pub origin_ck_type_id: Option<Identifier>,
    #[serde(default)]
    pub target_ck_type_id: Option<Identifier>,
    #[serde(default)]
    pub navigation_property_name: Option<String>,
    #[serde(default)]
    pub multiplicity: Option<String>,
}

/// A CK enum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CkEnum {
    pub ck_enum_id: Identifier,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub use_flags: Option<bool>,
    #[serde(default)]
    pub is_extensible: Option<bool>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub values: Vec<CkEnumValue>,
}

impl CkEnum {
    /// `flags` / `extensible` markers that are set.
    pub fn flags(&self) -> Vec<&'static str> {
        let mut flags = Vec::new();
        if self.use_flags.unwrap_or(false) {
            flags.push("flags");
        }
        if self.is_extensible.unwrap_or(false) {
            flags.push("extensible");
        }
        flags
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CkEnumValue {
    pub key: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Identified for CkModel {
    fn identifier(&self) -> &Identifier {
        &self.id
    }
}

impl Identified for CkType {
    fn identifier(&self) -> &Identifier {
        &self.ck_type_id
    }
}

impl Identified for CkEnum {
    fn identifier(&self) -> &Identifier {
        &self.ck_enum_id
    }
}

// ============================================================================
// Grouping and search
// ============================================================================

/// Keep only items whose model prefix equals `model`.
pub fn filter_by_model<T: Identified>(items: Vec<T>, model: Option<&str>) -> Vec<T> {
    match model {
        Some(model) => items
            .into_iter()
            .filter(|i| i.identifier().model_prefix() == model)
            .collect(),
        None => items,
    }
}

/// Group items by model prefix, each group sorted by full name.
pub fn group_by_model<T: Identified>(items: &[T]) -> BTreeMap<&str, Vec<&T>> {
    let mut groups: BTreeMap<&str, Vec<&T>> = BTreeMap::new();
    for item in items {
        groups
            .entry(item.identifier().model_prefix())
            .or_default()
            .push(item);
    }
    for group in groups.values_mut() {
        group.sort_by(|a, b| a.identifier().full_name.cmp(&b.identifier().full_name));
    }
    groups
}

/// Case-insensitive substring search over full name and description.
pub fn matches_term(id: &Identifier, description: Option<&str>, term: &str) -> bool {
    let term = term.to_lowercase();
    id.full_name.to_lowercase().contains(&term)
        || description.is_some_and(|d| d.to_lowercase().contains(&term))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::connection::unwrap_connection;
    use serde_json::json;

    fn type_detail() -> serde_json::Value {
        json!({
            "ckTypeId": {"fullName": "Basic-2.0.0/Machine-1", "semanticVersionedFullName": "Basic-2.0.0/Machine-1.0.0"},
            "isAbstract": false,
            "isFinal": true,
            "description": "A machine",
            "baseType": {"ckTypeId": {"fullName": "System-2.0.2/Entity-1"}},
            "attributes": {"edges": [
                {"node": {"attributeName": "name", "attributeValueType": "STRING", "isOptional": false}},
                {"node": null}
            ]},
            "associations": {
                "in": {"all": [{"roleId": {"fullName": "System/ParentChild"}, "originCkTypeId": {"fullName": "Basic/Tree"}}]},
                "out": null
            },
            "derivedTypes": {"edges": [{"node": {"ckTypeId": {"fullName": "Basic-2.0.0/Pump-1"}}}]}
        })
    }

    #[test]
    fn test_type_detail_decodes() {
        let t: CkType = serde_json::from_value(type_detail()).unwrap();
        assert_eq!(t.base_type_name(), Some("System-2.0.2/Entity-1"));
        assert_eq!(t.flags(), vec!["final"]);
        assert_eq!(t.attribute_definitions().len(), 1);
        let assoc = t.associations.as_ref().unwrap();
        assert_eq!(assoc.inbound().len(), 1);
        assert!(assoc.outbound().is_empty());
        assert_eq!(t.derived_type_names(), vec!["Basic-2.0.0/Pump-1"]);
    }

    #[test]
    fn test_type_without_base_is_root() {
        let t: CkType = serde_json::from_value(json!({
            "ckTypeId": {"fullName": "System/Root"},
            "baseType": null
        }))
        .unwrap();
        assert_eq!(t.base_type_name(), None);
        assert!(t.flags().is_empty());
        assert!(t.attribute_definitions().is_empty());
    }

    #[test]
    fn test_node_without_identifier_is_dropped() {
        let conn = json!({"edges": [{"node": {"description": "no id"}}, {"node": {"ckTypeId": {"fullName": "A/B"}}}]});
        let types: Vec<CkType> = unwrap_connection(Some(&conn));
        assert_eq!(types.len(), 1);
    }

    #[test]
    fn test_enum_flags_and_values() {
        let e: CkEnum = serde_json::from_value(json!({
            "ckEnumId": {"fullName": "System/Agg-1"},
            "useFlags": true,
            "isExtensible": true,
            "values": [{"key": 0, "name": "Sum"}, {"key": 1, "name": "Avg", "description": "mean"}]
        }))
        .unwrap();
        assert_eq!(e.flags(), vec!["flags", "extensible"]);
        assert_eq!(e.values.len(), 2);
    }

    #[test]
    fn test_model_null_dependencies() {
        let m: CkModel = serde_json::from_value(json!({
            "id": {"fullName": "System-2.0.2", "name": "System", "version": "2.0.2"},
            "dependencies": null
        }))
        .unwrap();
        assert!(m.dependencies.is_empty());
        assert_eq!(m.identifier().name.as_deref(), Some("System"));
    }

    #[test]
    fn test_group_and_filter_by_model() {
        let ids = vec![
            Identifier::new("B/Z"),
            Identifier::new("A/Y"),
            Identifier::new("B/A"),
            Identifier::new("Loose"),
        ];
        let groups = group_by_model(&ids);
        let keys: Vec<_> = groups.keys().copied().collect();
        assert_eq!(keys, vec!["", "A", "B"]);
        let b: Vec<_> = groups["B"].iter().map(|i| i.full_name.as_str()).collect();
        assert_eq!(b, vec!["B/A", "B/Z"]);

        let only_b = filter_by_model(ids, Some("B"));
        assert_eq!(only_b.len(), 2);
    }

    #[test]
    fn test_matches_term() {
        let id = Identifier::new("Basic/Machine-1");
        assert!(matches_term(&id, None, "mach"));
        assert!(matches_term(&id, Some("Rotating Equipment"), "equip"));
        assert!(!matches_term(&id, None, "pump"));
    }
}
