//! Ephemeral in-memory graph projections.

use log::{debug, info, warn};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::client::{quote_identifier, string_literal, CypherExecutor, CypherQuery};
use super::schema::{self, PropertyType};
use crate::mcp::error::{invalid_parameters_error, McpResult};

pub const PROJECTION_PREFIX: &str = "mcp_projection_";

/// Accept a single string or a list of strings; `null` and absent mean empty.
pub fn string_list(arguments: &Map<String, Value>, key: &str) -> McpResult<Vec<String>> {
    match arguments.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(s)) => Ok(vec![s.clone()]),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| invalid_parameters_error(format!("'{key}' must contain only strings")))
            })
            .collect(),
        Some(other) => Err(invalid_parameters_error(format!(
            "'{key}' must be a string or a list of strings, got {other}"
        ))),
    }
}

/// Which part of the database to project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectionParams {
    pub node_labels: Vec<String>,
    pub rel_types: Vec<String>,
    pub undirected: bool,
}

impl ProjectionParams {
    pub fn from_arguments(arguments: &Map<String, Value>, undirected: bool) -> McpResult<Self> {
        Ok(Self {
            node_labels: string_list(arguments, "nodeLabels")?,
            rel_types: string_list(arguments, "relTypes")?,
            undirected,
        })
    }

    fn orientation(&self) -> &'static str {
        if self.undirected {
            "UNDIRECTED"
        } else {
            "NATURAL"
        }
    }
}

fn node_properties_literal(properties: &BTreeMap<String, PropertyType>) -> String {
    let entries: Vec<String> = properties
        .iter()
        .map(|(name, property_type)| {
            let default = match property_type {
                PropertyType::Float => ", defaultValue: toFloat('NaN')",
                _ => "",
            };
            format!("{}: {{property: {}{}}}", quote_identifier(name), string_literal(name), default)
        })
        .collect();
    format!("{{{}}}", entries.join(", "))
}

/// Build the `gds.graph.project` call.
///
/// Node properties are written as a Cypher literal because `NaN` defaults cannot
/// travel as JSON parameters.
pub fn projection_query(
    graph_name: &str,
    params: &ProjectionParams,
    node_properties: &BTreeMap<String, PropertyType>,
    rel_properties: &BTreeMap<String, PropertyType>,
) -> CypherQuery {
    let node_projection = if params.node_labels.is_empty() {
        json!("*")
    } else {
        json!(params.node_labels)
    };

    let rel_property_names: Vec<&String> = rel_properties.keys().collect();
    let mut rel_projection = Map::new();
    if params.rel_types.is_empty() {
        rel_projection.insert(
            "__ALL__".to_string(),
            json!({"type": "*", "orientation": params.orientation(), "properties": rel_property_names}),
        );
    } else {
        for rel_type in &params.rel_types {
            rel_projection.insert(
                rel_type.clone(),
                json!({"type": rel_type, "orientation": params.orientation(), "properties": rel_property_names}),
            );
        }
    }

    let config = if node_properties.is_empty() {
        "{}".to_string()
    } else {
        format!("{{nodeProperties: {}}}", node_properties_literal(node_properties))
    };

    let text = format!(
        "CALL gds.graph.project($graphName, $nodeProjection, $relationshipProjection, {config})
YIELD graphName, nodeCount, relationshipCount
RETURN graphName, nodeCount, relationshipCount"
    );

    CypherQuery::new(text)
        .param("graphName", graph_name)
        .param("nodeProjection", node_projection)
        .param("relationshipProjection", Value::Object(rel_projection))
        .returns(["graphName", "nodeCount", "relationshipCount"])
}

/// A named GDS projection that must be released after use.
#[derive(Debug)]
pub struct ProjectedGraph {
    name: String,
}

impl ProjectedGraph {
    /// Validate the database's property keys against the filters and project.
    pub async fn project(executor: &dyn CypherExecutor, params: &ProjectionParams) -> McpResult<Self> {
        let node_keys = schema::get_node_properties_keys(executor).await?;
        let rel_keys = schema::get_relationship_properties_keys(executor).await?;

        let node_properties = schema::validate_node_properties(executor, &node_keys, &params.node_labels).await?;
        let rel_properties =
            schema::validate_rel_properties(executor, &rel_keys, &params.node_labels, &params.rel_types).await?;
        debug!(
            "投影属性: 节点 {:?}, 关系 {:?}",
            node_properties.keys().collect::<Vec<_>>(),
            rel_properties.keys().collect::<Vec<_>>()
        );

        let name = format!("{PROJECTION_PREFIX}{}", Uuid::new_v4().simple());
        let table = executor
            .fetch(projection_query(&name, params, &node_properties, &rel_properties))
            .await?;
        info!(
            "📐 已创建投影 {} (节点: {}, 关系: {})",
            name,
            table.get(0, "nodeCount").cloned().unwrap_or(Value::Null),
            table.get(0, "relationshipCount").cloned().unwrap_or(Value::Null)
        );
        Ok(Self { name })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn release(self, executor: &dyn CypherExecutor) -> McpResult<()> {
        executor
            .run(
                CypherQuery::new("CALL gds.graph.drop($graphName, false) YIELD graphName RETURN graphName")
                    .param("graphName", self.name.as_str()),
            )
            .await?;
        debug!("🗑️ 已释放投影 {}", self.name);
        Ok(())
    }

    /// Release the projection and hand back `outcome`.
    ///
    /// A release failure is reported only when the outcome itself succeeded.
    pub async fn finish<T>(self, executor: &dyn CypherExecutor, outcome: McpResult<T>) -> McpResult<T> {
        let name = self.name.clone();
        match (outcome, self.release(executor).await) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), release) => {
                if let Err(release_err) = release {
                    warn!("⚠️ 释放投影 {} 失败: {}", name, release_err);
                }
                Err(e)
            }
        }
    }
}
