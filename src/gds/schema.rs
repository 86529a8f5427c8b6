//! Schema introspection and projection-safe property validation.

use log::debug;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use super::client::{CypherExecutor, CypherQuery};
use crate::mcp::error::{database_error, McpResult};

/// GDS property types a stored property can be projected as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyType {
    Integer,
    Float,
    IntegerList,
    FloatList,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Integer => "INTEGER",
            PropertyType::Float => "FLOAT",
            PropertyType::IntegerList => "INTEGER_LIST",
            PropertyType::FloatList => "FLOAT_LIST",
        }
    }
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One Cypher `valueType()` result, reduced to what projection cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Integer,
    Float,
    IntegerList,
    FloatList,
    EmptyList,
    Other,
}

fn strip_not_null(s: &str) -> &str {
    s.trim().trim_end_matches("NOT NULL").trim()
}

fn parse_value_type(value_type: &str) -> ValueKind {
    let outer = strip_not_null(value_type);
    match outer {
        "INTEGER" => return ValueKind::Integer,
        "FLOAT" => return ValueKind::Float,
        _ => {}
    }

    let Some(inner) = outer.strip_prefix("LIST<").and_then(|s| s.strip_suffix('>')) else {
        return ValueKind::Other;
    };

    let mut has_float = false;
    let mut has_integer = false;
    for element in inner.split('|').map(strip_not_null) {
        match element {
            "INTEGER" => has_integer = true,
            "FLOAT" => has_float = true,
            "NOTHING" => {}
            _ => return ValueKind::Other,
        }
    }

    match (has_integer, has_float) {
        (_, true) => ValueKind::FloatList,
        (true, false) => ValueKind::IntegerList,
        (false, false) => ValueKind::EmptyList,
    }
}

/// Decide the node projection type from every `valueType()` seen for a property.
///
/// Integers widen to floats; integer lists widen to float lists. Strings, booleans,
/// and scalars mixed with lists cannot be projected.
pub fn classify_node_property<S: AsRef<str>>(value_types: &[S]) -> Option<PropertyType> {
    let kinds: Vec<ValueKind> = value_types.iter().map(|t| parse_value_type(t.as_ref())).collect();
    if kinds.is_empty() || kinds.contains(&ValueKind::Other) {
        return None;
    }

    let scalars = kinds
        .iter()
        .filter(|k| matches!(k, ValueKind::Integer | ValueKind::Float))
        .count();
    if scalars == kinds.len() {
        return Some(if kinds.contains(&ValueKind::Float) {
            PropertyType::Float
        } else {
            PropertyType::Integer
        });
    }
    if scalars > 0 {
        return None;
    }

    if kinds.contains(&ValueKind::FloatList) {
        Some(PropertyType::FloatList)
    } else if kinds.contains(&ValueKind::IntegerList) {
        Some(PropertyType::IntegerList)
    } else {
        None
    }
}

/// Relationship properties project as doubles, so only numeric scalars qualify.
pub fn classify_rel_property<S: AsRef<str>>(value_types: &[S]) -> Option<PropertyType> {
    if value_types.is_empty() {
        return None;
    }
    value_types
        .iter()
        .all(|t| matches!(parse_value_type(t.as_ref()), ValueKind::Integer | ValueKind::Float))
        .then_some(PropertyType::Float)
}

async fn fetch_strings(executor: &dyn CypherExecutor, query: CypherQuery, column: &str) -> McpResult<Vec<String>> {
    let table = executor.fetch(query).await?;
    let values = table
        .values(column)
        .ok_or_else(|| database_error(format!("result is missing column '{column}'")))?;
    Ok(values
        .into_iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect())
}

pub async fn count_nodes(executor: &dyn CypherExecutor) -> McpResult<i64> {
    let table = executor
        .fetch(CypherQuery::new("MATCH (n) RETURN count(n) AS count").returns(["count"]))
        .await?;
    Ok(table
        .get(0, "count")
        .and_then(Value::as_i64)
        .unwrap_or_default())
}

pub async fn get_node_labels(executor: &dyn CypherExecutor) -> McpResult<Vec<String>> {
    let query = CypherQuery::new("CALL db.labels() YIELD label RETURN label ORDER BY label").returns(["label"]);
    fetch_strings(executor, query, "label").await
}

pub async fn get_relationship_types(executor: &dyn CypherExecutor) -> McpResult<Vec<String>> {
    let query = CypherQuery::new(
        "CALL db.relationshipTypes() YIELD relationshipType RETURN relationshipType ORDER BY relationshipType",
    )
    .returns(["relationshipType"]);
    fetch_strings(executor, query, "relationshipType").await
}

pub async fn get_node_properties_keys(executor: &dyn CypherExecutor) -> McpResult<Vec<String>> {
    let query = CypherQuery::new("MATCH (n) UNWIND keys(n) AS key RETURN DISTINCT key ORDER BY key").returns(["key"]);
    fetch_strings(executor, query, "key").await
}

pub async fn get_relationship_properties_keys(executor: &dyn CypherExecutor) -> McpResult<Vec<String>> {
    let query =
        CypherQuery::new("MATCH ()-[r]->() UNWIND keys(r) AS key RETURN DISTINCT key ORDER BY key").returns(["key"]);
    fetch_strings(executor, query, "key").await
}

const NODE_VALUE_TYPES: &str = "
MATCH (n)
WHERE size($nodeLabels) = 0 OR any(label IN labels(n) WHERE label IN $nodeLabels)
UNWIND $properties AS property
WITH property, n[property] AS value
WHERE value IS NOT NULL
RETURN property, collect(DISTINCT valueType(value)) AS valueTypes";

const REL_VALUE_TYPES: &str = "
MATCH (a)-[r]->(b)
WHERE (size($relTypes) = 0 OR type(r) IN $relTypes)
  AND (size($nodeLabels) = 0
       OR (any(label IN labels(a) WHERE label IN $nodeLabels)
           AND any(label IN labels(b) WHERE label IN $nodeLabels)))
UNWIND $properties AS property
WITH property, r[property] AS value
WHERE value IS NOT NULL
RETURN property, collect(DISTINCT valueType(value)) AS valueTypes";

async fn value_types(executor: &dyn CypherExecutor, query: CypherQuery) -> McpResult<BTreeMap<String, Vec<String>>> {
    let table = executor.fetch(query.returns(["property", "valueTypes"])).await?;
    let mut by_property = BTreeMap::new();
    for row in table.rows() {
        let Some(property) = row[0].as_str() else { continue };
        let types = row[1]
            .as_array()
            .map(|types| types.iter().filter_map(|t| t.as_str().map(str::to_string)).collect())
            .unwrap_or_default();
        by_property.insert(property.to_string(), types);
    }
    Ok(by_property)
}

/// Node properties among `properties` that can be projected, with their projection type.
pub async fn validate_node_properties(
    executor: &dyn CypherExecutor,
    properties: &[String],
    node_labels: &[String],
) -> McpResult<BTreeMap<String, PropertyType>> {
    if properties.is_empty() {
        return Ok(BTreeMap::new());
    }
    let query = CypherQuery::new(NODE_VALUE_TYPES)
        .param("properties", properties.to_vec())
        .param("nodeLabels", node_labels.to_vec());

    let mut valid = BTreeMap::new();
    for (property, types) in value_types(executor, query).await? {
        match classify_node_property(&types) {
            Some(property_type) => {
                valid.insert(property, property_type);
            }
            None => debug!("跳过无法投影的节点属性 {}: {:?}", property, types),
        }
    }
    Ok(valid)
}

/// Relationship properties among `properties` whose values are numeric on every
/// matching relationship.
pub async fn validate_rel_properties(
    executor: &dyn CypherExecutor,
    properties: &[String],
    node_labels: &[String],
    rel_types: &[String],
) -> McpResult<BTreeMap<String, PropertyType>> {
    if properties.is_empty() {
        return Ok(BTreeMap::new());
    }
    let query = CypherQuery::new(REL_VALUE_TYPES)
        .param("properties", properties.to_vec())
        .param("nodeLabels", node_labels.to_vec())
        .param("relTypes", rel_types.to_vec());

    let mut valid = BTreeMap::new();
    for (property, types) in value_types(executor, query).await? {
        match classify_rel_property(&types) {
            Some(property_type) => {
                valid.insert(property, property_type);
            }
            None => debug!("跳过无法投影的关系属性 {}: {:?}", property, types),
        }
    }
    Ok(valid)
}
