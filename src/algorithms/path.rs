//! Path finding.

use async_trait::async_trait;
use log::info;
use serde_json::{Map, Value};
use std::sync::Arc;

use super::{
    object_schema, optional_str, AlgorithmCategory, AlgorithmHandler, Arguments, ParamKind, ParamSpec, NODE_LABELS,
    REL_TYPES,
};
use crate::gds::translate::{translate_id_lists_to_identifiers, translate_identifiers_to_ids};
use crate::gds::{CypherExecutor, CypherQuery, ProjectedGraph, ProjectionParams, ResultTable};
use crate::mcp::error::{invalid_parameters_error, McpResult};

const DEFAULT_IDENTIFIER_PROPERTY: &str = "name";

const PARAMS: [ParamSpec; 7] = [
    ParamSpec::required("start_node", ParamKind::Any, "Identifier of the node the path starts at."),
    ParamSpec::required("end_node", ParamKind::Any, "Identifier of the node the path ends at."),
    ParamSpec::optional(
        "nodeIdentifierProperty",
        ParamKind::String,
        "Node property the start and end identifiers are matched against. Default 'name'.",
    ),
    ParamSpec::optional(
        "relationship_property",
        ParamKind::String,
        "Relationship property used as cost. Every hop costs 1 when omitted.",
    ),
    ParamSpec::optional(
        "undirected",
        ParamKind::Boolean,
        "Traverse relationships in both directions. Default false.",
    ),
    NODE_LABELS,
    REL_TYPES,
];

const DIJKSTRA: &str = "CALL gds.shortestPath.dijkstra.stream($graphName, $configuration)
YIELD index, sourceNode, targetNode, totalCost, nodeIds, costs, path
RETURN index, sourceNode, targetNode, totalCost, nodeIds, costs, [node IN nodes(path) | node[$property]] AS path";

const COLUMNS: [&str; 7] = ["index", "sourceNode", "targetNode", "totalCost", "nodeIds", "costs", "path"];

/// Keys of the rendered path, in output order.
const PATH_KEYS: [&str; 5] = ["totalCost", "nodeIds", "nodeNames", "path", "costs"];

/// Render the first path row as one object.
///
/// `found` is false when no path exists; the other keys are then `null` or empty.
fn path_object(table: ResultTable) -> Value {
    let mut object = Map::new();
    match table.into_records().into_iter().next() {
        Some(mut record) => {
            object.insert("found".to_string(), Value::Bool(true));
            for key in PATH_KEYS {
                object.insert(key.to_string(), record.remove(key).unwrap_or(Value::Null));
            }
        }
        None => {
            object.insert("found".to_string(), Value::Bool(false));
            object.insert("totalCost".to_string(), Value::Null);
            for key in &PATH_KEYS[1..] {
                object.insert(key.to_string(), Value::Array(Vec::new()));
            }
        }
    }
    Value::Object(object)
}

/// Weighted shortest path between two nodes identified by a property (Dijkstra).
pub struct ShortestPathHandler {
    executor: Arc<dyn CypherExecutor>,
}

impl ShortestPathHandler {
    pub fn new(executor: Arc<dyn CypherExecutor>) -> Self {
        Self { executor }
    }

    async fn node_id(&self, identifier: Option<&Value>, key: &str, property: &str) -> McpResult<Value> {
        let identifier = identifier
            .filter(|v| !v.is_null())
            .ok_or_else(|| invalid_parameters_error(format!("'{key}' is required")))?;
        let mut resolved = Map::new();
        translate_identifiers_to_ids(self.executor.as_ref(), Some(identifier), key, Some(property), &mut resolved).await?;
        resolved
            .remove(key)
            .and_then(|ids| ids.as_array().and_then(|ids| ids.first().cloned()))
            .ok_or_else(|| invalid_parameters_error(format!("No node found for '{key}'")))
    }

    async fn dijkstra(&self, graph: &ProjectedGraph, arguments: &Arguments, property: &str) -> McpResult<ResultTable> {
        let source = self.node_id(arguments.get("start_node"), "start_node", property).await?;
        let target = self.node_id(arguments.get("end_node"), "end_node", property).await?;

        let mut configuration = Map::new();
        configuration.insert("sourceNode".to_string(), source);
        configuration.insert("targetNode".to_string(), target);
        if let Some(weight) = optional_str(arguments, "relationship_property")? {
            configuration.insert("relationshipWeightProperty".to_string(), Value::String(weight.to_string()));
        }

        info!("⚙️ find_shortest_path 参数: {}", Value::Object(configuration.clone()));
        self.executor
            .fetch(
                CypherQuery::new(DIJKSTRA)
                    .param("graphName", graph.name())
                    .param("configuration", Value::Object(configuration))
                    .param("property", property)
                    .returns(COLUMNS),
            )
            .await
    }
}

#[async_trait]
impl AlgorithmHandler for ShortestPathHandler {
    fn name(&self) -> &str {
        "find_shortest_path"
    }

    fn description(&self) -> &str {
        "Find the shortest (lowest cost) path between two nodes identified by a property value, using Dijkstra's algorithm. Returns the total cost, the node ids and names along the path and the accumulated cost at each step. An empty result means no path exists."
    }

    fn category(&self) -> AlgorithmCategory {
        AlgorithmCategory::Path
    }

    fn input_schema(&self) -> Map<String, Value> {
        object_schema(&PARAMS)
    }

    fn render(&self, table: ResultTable) -> McpResult<Value> {
        Ok(path_object(table))
    }

    async fn execute(&self, arguments: Arguments) -> McpResult<ResultTable> {
        let executor = self.executor.as_ref();
        let property = optional_str(&arguments, "nodeIdentifierProperty")?.unwrap_or(DEFAULT_IDENTIFIER_PROPERTY);
        let undirected = match arguments.get("undirected") {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(other) => {
                return Err(invalid_parameters_error(format!("'undirected' must be a boolean, got {other}")))
            }
        };
        let projection = ProjectionParams::from_arguments(&arguments, undirected)?;

        let graph = ProjectedGraph::project(executor, &projection).await?;
        let outcome = self.dijkstra(&graph, &arguments, property).await;
        let mut table = graph.finish(executor, outcome).await?;

        if table.is_empty() {
            info!("🚫 未找到路径");
            return Ok(table);
        }
        translate_id_lists_to_identifiers(executor, Some(property), &mut table, "nodeIds", "nodeNames").await?;
        Ok(table)
    }
}
