//! Parameterized GraphQL documents and variable bundles.
//!
//! Each access pattern has its own canned document so callers only fetch
//! what they display: compact listings ask for ids and names, and only the
//! attribute variants pull attribute payloads. [`QueryBuilder`] pairs a
//! document with its variables and applies the default page size.
//!
//! Only one page is ever requested. Paginated documents always select
//! `pageInfo` so the caller can tell the user that more results exist.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::filter::FieldFilter;
use crate::{Error, Result};

/// Page size used when the caller does not pass `first`.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Number of schema objects fetched for local detail lookup and search.
pub const DEFAULT_SCHEMA_SCAN_SIZE: u32 = 200;

// ============================================================================
// Documents
// ============================================================================

const LIST_ENTITIES_COMPACT: &str = r#"
query($ckId: String!, $first: Int, $after: String, $sortOrder: [Sort]) {
  runtime {
    runtimeEntities(ckId: $ckId, first: $first, after: $after, sortOrder: $sortOrder) {
      totalCount
      pageInfo { hasNextPage endCursor }
      edges { node { rtId ckTypeId rtWellKnownName } }
    }
  }
}"#;

const LIST_ENTITIES_WITH_ATTRIBUTES: &str = r#"
query($ckId: String!, $first: Int, $after: String, $sortOrder: [Sort]) {
  runtime {
    runtimeEntities(ckId: $ckId, first: $first, after: $after, sortOrder: $sortOrder) {
      totalCount
      pageInfo { hasNextPage endCursor }
      edges { node {
        rtId ckTypeId rtWellKnownName
        attributes { items { attributeName value } }
      } }
    }
  }
}"#;

const GET_ENTITY: &str = r#"
query($ckId: String!, $rtId: OctoObjectId!) {
  runtime {
    runtimeEntities(ckId: $ckId, rtId: $rtId, first: 1) {
      edges { node {
        rtId ckTypeId rtWellKnownName rtCreationDateTime rtChangedDateTime rtVersion
        attributes { items { attributeName value } }
        associations { definitions(direction: OUTBOUND) {
          items { ckAssociationRoleId targetRtId targetCkTypeId }
        } }
      } }
    }
  }
}"#;

const COUNT_ENTITIES: &str = r#"
query($ckId: String!) {
  runtime {
    runtimeEntities(ckId: $ckId) { totalCount }
  }
}"#;

const FILTER_ENTITIES: &str = r#"
query($ckId: String!, $first: Int, $after: String, $sortOrder: [Sort], $fieldFilter: [FieldFilter]) {
  runtime {
    runtimeEntities(ckId: $ckId, first: $first, after: $after, sortOrder: $sortOrder, fieldFilter: $fieldFilter) {
      totalCount
      pageInfo { hasNextPage endCursor }
      edges { node {
        rtId ckTypeId rtWellKnownName
        attributes { items { attributeName value } }
      } }
    }
  }
}"#;

const PROJECT_COLUMNS: &str = r#"
query($ckId: String!, $columnPaths: [String!]!, $first: Int, $after: String, $sortOrder: [Sort], $fieldFilter: [FieldFilter]) {
  runtime {
    transientQuery {
      simple(ckId: $ckId, columnPaths: $columnPaths, first: $first, after: $after, sortOrder: $sortOrder, fieldFilter: $fieldFilter) {
        totalCount
        items {
          columns { attributePath attributeValueType }
          rows { items { cells { items { attributePath value } } } }
        }
      }
    }
  }
}"#;

const LIST_MODELS: &str = r#"
query($first: Int, $after: String) {
  constructionKit {
    models(first: $first, after: $after) {
      totalCount
      pageInfo { hasNextPage endCursor }
      edges { node {
        id { name version fullName semanticVersionedFullName }
        description
        modelState
        dependencies { name version fullName semanticVersionedFullName }
      } }
    }
  }
}"#;

const LIST_TYPES: &str = r#"
query($first: Int, $after: String) {
  constructionKit {
    types(first: $first, after: $after) {
      totalCount
      pageInfo { hasNextPage endCursor }
      edges { node {
        ckTypeId { fullName semanticVersionedFullName }
        isAbstract
        isFinal
        description
        baseType { ckTypeId { fullName } }
      } }
    }
  }
}"#;

const TYPE_DETAIL: &str = r#"
query($first: Int) {
  constructionKit {
    types(first: $first) {
      totalCount
      edges { node {
        ckTypeId { fullName semanticVersionedFullName }
        isAbstract
        isFinal
        description
        baseType { ckTypeId { fullName } }
        attributes { edges { node {
          attributeName attributeValueType isOptional autoCompleteValues autoIncrementReference
        } } }
        associations {
          in { all { roleId { fullName } originCkTypeId { fullName } targetCkTypeId { fullName } navigationPropertyName multiplicity } }
          out { all { roleId { fullName } originCkTypeId { fullName } targetCkTypeId { fullName } navigationPropertyName multiplicity } }
        }
        derivedTypes { edges { node { ckTypeId { fullName } } } }
      } }
    }
  }
}"#;

const LIST_ENUMS: &str = r#"
query($first: Int, $after: String) {
  constructionKit {
    enums(first: $first, after: $after) {
      totalCount
      pageInfo { hasNextPage endCursor }
      edges { node {
        ckEnumId { fullName semanticVersionedFullName }
        description
        useFlags
        isExtensible
        values { key name description }
      } }
    }
  }
}"#;

const SEARCH_SCHEMA: &str = r#"
query($first: Int) {
  constructionKit {
    types(first: $first) {
      edges { node { ckTypeId { fullName } description isAbstract } }
    }
    enums(first: $first) {
      edges { node { ckEnumId { fullName } description } }
    }
  }
}"#;

const INTROSPECT_QUERY_FIELDS: &str = r#"
query {
  __schema { queryType { fields { name type { name kind ofType { name kind } } } } }
}"#;

const INTROSPECT_TYPE: &str = r#"
query($name: String!) {
  __type(name: $name) {
    name
    kind
    description
    fields { name type { name kind ofType { name kind ofType { name kind } } } }
    enumValues { name description }
  }
}"#;

// ============================================================================
// Parameters
// ============================================================================

/// Named operations, used for logging and dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListEntitiesCompact,
    ListEntitiesWithAttributes,
    GetEntity,
    CountEntities,
    SearchEntities,
    FilterEntities,
    ProjectColumns,
    ListModels,
    ListTypes,
    ListEnums,
    SchemaDetail(SchemaKind),
    SearchSchema,
    IntrospectQueryFields,
    IntrospectType,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ListEntitiesCompact => f.write_str("list-entities-compact"),
            Self::ListEntitiesWithAttributes => f.write_str("list-entities-with-attributes"),
            Self::GetEntity => f.write_str("get-entity"),
            Self::CountEntities => f.write_str("count-entities"),
            Self::SearchEntities => f.write_str("search-entities"),
            Self::FilterEntities => f.write_str("filter-entities"),
            Self::ProjectColumns => f.write_str("project-columns"),
            Self::ListModels => f.write_str("list-models"),
            Self::ListTypes => f.write_str("list-types"),
            Self::ListEnums => f.write_str("list-enums"),
            Self::SchemaDetail(kind) => write!(f, "{kind}-detail"),
            Self::SearchSchema => f.write_str("search-schema"),
            Self::IntrospectQueryFields => f.write_str("introspect-query-fields"),
            Self::IntrospectType => f.write_str("introspect-type"),
        }
    }
}

/// Kind of Construction Kit object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    Model,
    Type,
    Enum,
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Model => "model",
            Self::Type => "type",
            Self::Enum => "enum",
        })
    }
}

/// Whether a runtime listing includes attribute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Projection {
    /// rtId, ckTypeId and well-known name only.
    #[default]
    Compact,
    /// Identity plus all attribute values.
    WithAttributes,
}

/// Requested page: size and start cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paging {
    /// Page size; the builder's default when `None`.
    pub first: Option<u32>,
    /// Cursor from a previous page's `endCursor`.
    pub after: Option<String>,
}

impl Paging {
    pub fn new(first: Option<u32>, after: Option<String>) -> Self {
        Self { first, after }
    }

    /// First page of `first` items.
    pub fn first(first: u32) -> Self {
        Self {
            first: Some(first),
            after: None,
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Single-key sort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
    pub attribute_path: String,
    pub sort_order: SortOrder,
}

impl SortSpec {
    pub fn ascending(attribute_path: impl Into<String>) -> Self {
        Self {
            attribute_path: attribute_path.into(),
            sort_order: SortOrder::Ascending,
        }
    }

    pub fn descending(attribute_path: impl Into<String>) -> Self {
        Self {
            attribute_path: attribute_path.into(),
            sort_order: SortOrder::Descending,
        }
    }
}

impl FromStr for SortSpec {
    type Err = Error;

    /// Parse `attr`, `attr:asc` or `attr:desc`.
    ///
    /// Any direction starting with `desc` (case-insensitive) sorts
    /// descending; everything else sorts ascending.
    fn from_str(s: &str) -> Result<Self> {
        let (attr, direction) = match s.split_once(':') {
            Some((attr, direction)) => (attr.trim(), Some(direction)),
            None => (s.trim(), None),
        };
        if attr.is_empty() {
            return Err(Error::invalid_argument(format!(
                "sort '{s}' has no attribute (expected attr[:asc|desc])"
            )));
        }
        let descending = direction.is_some_and(|d| d.to_ascii_lowercase().starts_with("desc"));
        Ok(if descending {
            Self::descending(attr)
        } else {
            Self::ascending(attr)
        })
    }
}

// ============================================================================
// Requests
// ============================================================================

/// A document plus its variables, ready for the gateway.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRequest {
    #[serde(skip)]
    pub operation: Operation,

    #[serde(rename = "query")]
    pub document: &'static str,

    #[serde(skip_serializing_if = "Map::is_empty")]
    pub variables: Map<String, Value>,
}

impl QueryRequest {
    fn new(operation: Operation, document: &'static str) -> Self {
        Self {
            operation,
            document,
            variables: Map::new(),
        }
    }

    fn var(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.variables.insert(name.to_string(), value.into());
        self
    }

    fn var_opt(self, name: &str, value: Option<Value>) -> Self {
        match value {
            Some(v) => self.var(name, v),
            None => self,
        }
    }

    /// Variable by name.
    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    /// Request body as sent over the wire.
    pub fn to_body(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Builds [`QueryRequest`]s for every supported operation.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    default_page_size: u32,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl QueryBuilder {
    pub fn new(default_page_size: u32) -> Self {
        Self { default_page_size }
    }

    pub fn default_page_size(&self) -> u32 {
        self.default_page_size
    }

    /// Effective page size; zero is rejected, large values pass through.
    pub fn page_size(&self, paging: &Paging) -> Result<u32> {
        match paging.first.unwrap_or(self.default_page_size) {
            0 => Err(Error::invalid_argument("--first must be a positive integer")),
            n => Ok(n),
        }
    }

    fn paged(&self, request: QueryRequest, paging: &Paging) -> Result<QueryRequest> {
        let first = self.page_size(paging)?;
        Ok(request
            .var("first", first)
            .var_opt("after", paging.after.clone().map(Value::from)))
    }

    fn sorted(request: QueryRequest, sort: Option<&SortSpec>) -> Result<QueryRequest> {
        let value = sort.map(|s| serde_json::to_value([s])).transpose()?;
        Ok(request.var_opt("sortOrder", value))
    }

    fn filtered(request: QueryRequest, filter: Option<&FieldFilter>) -> Result<QueryRequest> {
        let value = filter
            .map(|f| serde_json::to_value(f.to_wire()))
            .transpose()?;
        Ok(request.var_opt("fieldFilter", value))
    }

    // ------------------------------------------------------------------------
    // Runtime entities
    // ------------------------------------------------------------------------

    /// List entities of a CK type.
    pub fn list_entities(
        &self,
        ck_id: &str,
        projection: Projection,
        paging: &Paging,
        sort: Option<&SortSpec>,
    ) -> Result<QueryRequest> {
        let request = match projection {
            Projection::Compact => {
                QueryRequest::new(Operation::ListEntitiesCompact, LIST_ENTITIES_COMPACT)
            }
            Projection::WithAttributes => QueryRequest::new(
                Operation::ListEntitiesWithAttributes,
                LIST_ENTITIES_WITH_ATTRIBUTES,
            ),
        };
        let request = self.paged(request.var("ckId", ck_id), paging)?;
        Self::sorted(request, sort)
    }

    /// Fetch one entity with attributes and outbound associations.
    pub fn get_entity(&self, ck_id: &str, rt_id: &str) -> Result<QueryRequest> {
        Ok(QueryRequest::new(Operation::GetEntity, GET_ENTITY)
            .var("ckId", ck_id)
            .var("rtId", rt_id))
    }

    /// Count entities of a CK type.
    pub fn count_entities(&self, ck_id: &str) -> Result<QueryRequest> {
        Ok(QueryRequest::new(Operation::CountEntities, COUNT_ENTITIES).var("ckId", ck_id))
    }

    /// LIKE search on one attribute; the term is sent as a string.
    pub fn search_entities(
        &self,
        ck_id: &str,
        attribute: &str,
        term: &str,
        paging: &Paging,
        sort: Option<&SortSpec>,
    ) -> Result<QueryRequest> {
        let filter = FieldFilter::like(attribute, term);
        let request = QueryRequest::new(Operation::SearchEntities, FILTER_ENTITIES).var("ckId", ck_id);
        let request = self.paged(request, paging)?;
        let request = Self::sorted(request, sort)?;
        Self::filtered(request, Some(&filter))
    }

    /// Entities matching a single field filter.
    pub fn filter_entities(
        &self,
        ck_id: &str,
        filter: &FieldFilter,
        paging: &Paging,
        sort: Option<&SortSpec>,
    ) -> Result<QueryRequest> {
        let request = QueryRequest::new(Operation::FilterEntities, FILTER_ENTITIES).var("ckId", ck_id);
        let request = self.paged(request, paging)?;
        let request = Self::sorted(request, sort)?;
        Self::filtered(request, Some(filter))
    }

    /// Transient query projecting entities onto `columns`.
    ///
    /// Column paths are trimmed and blank entries dropped; at least one
    /// must remain.
    pub fn project_columns(
        &self,
        ck_id: &str,
        columns: &[String],
        paging: &Paging,
        sort: Option<&SortSpec>,
        filter: Option<&FieldFilter>,
    ) -> Result<QueryRequest> {
        let columns: Vec<&str> = columns
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .collect();
        if columns.is_empty() {
            return Err(Error::invalid_argument(
                "--columns needs at least one column path",
            ));
        }
        let request = QueryRequest::new(Operation::ProjectColumns, PROJECT_COLUMNS)
            .var("ckId", ck_id)
            .var("columnPaths", json!(columns));
        let request = self.paged(request, paging)?;
        let request = Self::sorted(request, sort)?;
        Self::filtered(request, filter)
    }

    // ------------------------------------------------------------------------
    // Construction Kit
    // ------------------------------------------------------------------------

    pub fn list_models(&self, paging: &Paging) -> Result<QueryRequest> {
        self.paged(QueryRequest::new(Operation::ListModels, LIST_MODELS), paging)
    }

    pub fn list_types(&self, paging: &Paging) -> Result<QueryRequest> {
        self.paged(QueryRequest::new(Operation::ListTypes, LIST_TYPES), paging)
    }

    pub fn list_enums(&self, paging: &Paging) -> Result<QueryRequest> {
        self.paged(QueryRequest::new(Operation::ListEnums, LIST_ENUMS), paging)
    }

    /// Fetch `scan_size` objects of `kind` with full detail, for local
    /// resolution of a single identifier.
    pub fn schema_detail(&self, kind: SchemaKind, scan_size: u32) -> Result<QueryRequest> {
        let document = match kind {
            SchemaKind::Model => LIST_MODELS,
            SchemaKind::Type => TYPE_DETAIL,
            SchemaKind::Enum => LIST_ENUMS,
        };
        let request = QueryRequest::new(Operation::SchemaDetail(kind), document);
        self.paged(request, &Paging::first(scan_size))
    }

    /// Fetch `scan_size` types and enums for local name/description search.
    pub fn search_schema(&self, scan_size: u32) -> Result<QueryRequest> {
        self.paged(
            QueryRequest::new(Operation::SearchSchema, SEARCH_SCHEMA),
            &Paging::first(scan_size),
        )
    }

    // ------------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------------

    /// Top-level query fields.
    pub fn introspect_query_fields(&self) -> Result<QueryRequest> {
        Ok(QueryRequest::new(
            Operation::IntrospectQueryFields,
            INTROSPECT_QUERY_FIELDS,
        ))
    }

    /// Fields and enum values of one named GraphQL type.
    pub fn introspect_type(&self, name: &str) -> Result<QueryRequest> {
        if name.trim().is_empty() {
            return Err(Error::invalid_argument("type name must not be empty"));
        }
        Ok(QueryRequest::new(Operation::IntrospectType, INTROSPECT_TYPE).var("name", name))
    }
}
