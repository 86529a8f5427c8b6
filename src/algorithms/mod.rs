//! GDS algorithm handlers.
//!
//! Most algorithms are plain stream procedures and are described declaratively
//! by a [`StreamAlgorithm`]; [`StreamAlgorithmHandler`] runs any of them.

pub mod centrality;
pub mod community;
pub mod path;
pub mod registry;
pub mod similarity;

use async_trait::async_trait;
use log::{debug, info};
use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::gds::client::quote_identifier;
use crate::gds::translate::{filter_identifiers, filter_identifiers_pro, translate_identifiers_to_ids, translate_ids_to_identifiers};
use crate::gds::{CypherExecutor, CypherQuery, ProjectedGraph, ProjectionParams, ResultTable};
use crate::mcp::error::{invalid_parameters_error, serialize_error, McpResult};

pub use registry::AlgorithmRegistry;

/// Tool arguments as received from the client.
pub type Arguments = Map<String, Value>;

/// Drop caller-only keys and unset values before forwarding to GDS.
///
/// With nothing forbidden the arguments pass through untouched, `null`s included.
pub fn clean_params(arguments: &Arguments, forbidden: &[&str]) -> Arguments {
    if forbidden.is_empty() {
        return arguments.clone();
    }
    arguments
        .iter()
        .filter(|(key, value)| !value.is_null() && !forbidden.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Read an optional string argument.
pub fn optional_str<'a>(arguments: &'a Arguments, key: &str) -> McpResult<Option<&'a str>> {
    match arguments.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(invalid_parameters_error(format!("'{key}' must be a string, got {other}"))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgorithmCategory {
    Centrality,
    Community,
    Similarity,
    Path,
}

impl AlgorithmCategory {
    pub const ALL: [AlgorithmCategory; 4] = [
        AlgorithmCategory::Centrality,
        AlgorithmCategory::Community,
        AlgorithmCategory::Similarity,
        AlgorithmCategory::Path,
    ];

    /// Service group name used in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            AlgorithmCategory::Centrality => "centrality",
            AlgorithmCategory::Community => "community",
            AlgorithmCategory::Similarity => "similarity",
            AlgorithmCategory::Path => "path",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AlgorithmCategory::Centrality => "节点重要性算法 (PageRank、中介中心性等)",
            AlgorithmCategory::Community => "社区发现与连通分量算法",
            AlgorithmCategory::Similarity => "节点相似度算法",
            AlgorithmCategory::Path => "路径查找算法",
        }
    }
}

/// JSON schema shape of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
    Number,
    Boolean,
    /// One node/label name or a list of them.
    NameList,
    Enum(&'static [&'static str]),
    /// Passed through as given (maps, mixed shapes).
    Any,
}

impl ParamKind {
    fn schema(&self, description: &str) -> Value {
        let mut schema = match self {
            ParamKind::String => json!({"type": "string"}),
            ParamKind::Integer => json!({"type": "integer"}),
            ParamKind::Number => json!({"type": "number"}),
            ParamKind::Boolean => json!({"type": "boolean"}),
            ParamKind::NameList => json!({
                "anyOf": [
                    {"type": "string"},
                    {"type": "integer"},
                    {"type": "array", "items": {"type": ["string", "integer"]}}
                ]
            }),
            ParamKind::Enum(values) => json!({"type": "string", "enum": values}),
            ParamKind::Any => json!({}),
        };
        if let Some(obj) = schema.as_object_mut() {
            obj.insert("description".to_string(), Value::String(description.to_string()));
        }
        schema
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub description: &'static str,
    pub required: bool,
}

impl ParamSpec {
    pub const fn optional(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            required: false,
        }
    }

    pub const fn required(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            required: true,
        }
    }
}

pub const NODE_IDENTIFIER_PROPERTY: ParamSpec = ParamSpec::optional(
    "nodeIdentifierProperty",
    ParamKind::String,
    "Node property holding a human readable identifier, e.g. 'name'. When set, results carry the identifier next to each node id and node arguments are matched against it.",
);
pub const NODE_LABELS: ParamSpec = ParamSpec::optional(
    "nodeLabels",
    ParamKind::NameList,
    "Node labels to include in the projection. All labels when omitted.",
);
pub const REL_TYPES: ParamSpec = ParamSpec::optional(
    "relTypes",
    ParamKind::NameList,
    "Relationship types to include in the projection. All types when omitted.",
);
pub const NODES: ParamSpec = ParamSpec::optional(
    "nodes",
    ParamKind::NameList,
    "Only return results for these nodes: identifiers when nodeIdentifierProperty is set, node ids otherwise.",
);
pub const NODE_RESULT_FILTER: ParamSpec = ParamSpec::optional(
    "nodeResultFilter",
    ParamKind::NameList,
    "Only return nodes carrying one of these labels.",
);

/// Keys consumed by the server itself and never forwarded as configuration.
const CALLER_KEYS: [&str; 5] = [
    "nodes",
    "nodeIdentifierProperty",
    "nodeLabels",
    "relTypes",
    "nodeResultFilter",
];

/// JSON schema object for a tool with the given parameters.
pub fn object_schema(params: &[ParamSpec]) -> Map<String, Value> {
    let properties: Map<String, Value> = params
        .iter()
        .map(|p| (p.name.to_string(), p.kind.schema(p.description)))
        .collect();
    let required: Vec<&str> = params.iter().filter(|p| p.required).map(|p| p.name).collect();

    let mut schema = Map::new();
    schema.insert("type".to_string(), json!("object"));
    schema.insert("properties".to_string(), Value::Object(properties));
    schema.insert("required".to_string(), json!(required));
    schema
}

/// A graph algorithm exposed as an MCP tool.
#[async_trait]
pub trait AlgorithmHandler: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn category(&self) -> AlgorithmCategory;

    fn input_schema(&self) -> Map<String, Value>;

    async fn execute(&self, arguments: Arguments) -> McpResult<ResultTable>;

    /// JSON returned to the client: one object per row.
    fn render(&self, table: ResultTable) -> McpResult<Value> {
        serde_json::to_value(&table).map_err(|e| serialize_error(self.name(), e))
    }
}

/// How the stream result is narrowed after translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultFilter {
    None,
    /// `nodes`
    Nodes,
    /// `nodes` and `nodeResultFilter`
    NodesAndLabels,
}

/// Declarative description of a `gds.<algo>.stream` procedure.
#[derive(Debug)]
pub struct StreamAlgorithm {
    pub name: &'static str,
    pub description: &'static str,
    pub category: AlgorithmCategory,
    pub procedure: &'static str,
    pub yields: &'static [&'static str],
    /// Algorithm specific parameters; the projection and identifier
    /// parameters are added automatically.
    pub params: &'static [ParamSpec],
    pub undirected: bool,
    /// Whether the remaining arguments are passed as the procedure configuration.
    pub forward_config: bool,
    /// `(id column, name column)` pairs translated when an identifier property is set.
    pub id_columns: &'static [(&'static str, &'static str)],
    /// Parameters holding node identifiers to translate into ids.
    pub id_params: &'static [&'static str],
    pub result_filter: ResultFilter,
}

impl StreamAlgorithm {
    pub fn all_params(&self) -> Vec<ParamSpec> {
        let mut params = Vec::with_capacity(self.params.len() + 5);
        if self.result_filter != ResultFilter::None {
            params.push(NODES);
        }
        params.push(NODE_IDENTIFIER_PROPERTY);
        params.extend_from_slice(self.params);
        params.push(NODE_LABELS);
        params.push(REL_TYPES);
        if self.result_filter == ResultFilter::NodesAndLabels {
            params.push(NODE_RESULT_FILTER);
        }
        params
    }

    fn caller_keys(&self) -> Vec<&'static str> {
        CALLER_KEYS.iter().chain(self.id_params).copied().collect()
    }

    /// `CALL <procedure>($graphName, $configuration) YIELD ... RETURN ...`
    pub fn stream_query(&self, graph_name: &str, configuration: Arguments) -> CypherQuery {
        let columns = self
            .yields
            .iter()
            .map(|c| quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ");
        CypherQuery::new(format!(
            "CALL {}($graphName, $configuration) YIELD {columns} RETURN {columns}",
            self.procedure
        ))
        .param("graphName", graph_name)
        .param("configuration", Value::Object(configuration))
        .returns(self.yields.iter().copied())
    }
}

/// Runs any [`StreamAlgorithm`] against a fresh projection.
pub struct StreamAlgorithmHandler {
    algorithm: &'static StreamAlgorithm,
    executor: Arc<dyn CypherExecutor>,
}

impl StreamAlgorithmHandler {
    pub fn new(algorithm: &'static StreamAlgorithm, executor: Arc<dyn CypherExecutor>) -> Self {
        Self { algorithm, executor }
    }

    /// Arguments the tool accepts; anything else is ignored.
    fn accepted(&self, arguments: Arguments) -> Arguments {
        let params = self.algorithm.all_params();
        arguments
            .into_iter()
            .filter(|(key, _)| {
                let known = params.iter().any(|p| p.name == key.as_str());
                if !known {
                    debug!("忽略 {} 的未知参数: {}", self.algorithm.name, key);
                }
                known
            })
            .collect()
    }

    async fn stream(
        &self,
        graph: &ProjectedGraph,
        arguments: &Arguments,
        identifier_property: Option<&str>,
    ) -> McpResult<ResultTable> {
        let executor = self.executor.as_ref();
        let configuration = if self.algorithm.forward_config {
            let mut configuration = clean_params(arguments, &self.algorithm.caller_keys());
            for key in self.algorithm.id_params {
                translate_identifiers_to_ids(executor, arguments.get(*key), key, identifier_property, &mut configuration)
                    .await?;
            }
            configuration
        } else {
            Arguments::new()
        };

        info!(
            "⚙️ {} 参数: {}",
            self.algorithm.name,
            Value::Object(configuration.clone())
        );
        executor
            .fetch(self.algorithm.stream_query(graph.name(), configuration))
            .await
    }
}

#[async_trait]
impl AlgorithmHandler for StreamAlgorithmHandler {
    fn name(&self) -> &str {
        self.algorithm.name
    }

    fn description(&self) -> &str {
        self.algorithm.description
    }

    fn category(&self) -> AlgorithmCategory {
        self.algorithm.category
    }

    fn input_schema(&self) -> Map<String, Value> {
        object_schema(&self.algorithm.all_params())
    }

    async fn execute(&self, arguments: Arguments) -> McpResult<ResultTable> {
        let executor = self.executor.as_ref();
        let arguments = self.accepted(arguments);
        if let Some(missing) = self
            .algorithm
            .params
            .iter()
            .find(|p| p.required && arguments.get(p.name).map_or(true, Value::is_null))
        {
            return Err(invalid_parameters_error(format!(
                "Missing required parameter '{}' for {}",
                missing.name, self.algorithm.name
            )));
        }
        let identifier_property = optional_str(&arguments, "nodeIdentifierProperty")?;
        let projection = ProjectionParams::from_arguments(&arguments, self.algorithm.undirected)?;

        let graph = ProjectedGraph::project(executor, &projection).await?;
        let outcome = self.stream(&graph, &arguments, identifier_property).await;
        let mut table = graph.finish(executor, outcome).await?;

        for (id_column, name_column) in self.algorithm.id_columns {
            translate_ids_to_identifiers(executor, identifier_property, &mut table, id_column, name_column).await?;
        }

        match self.algorithm.result_filter {
            ResultFilter::None => {}
            ResultFilter::Nodes => filter_identifiers(identifier_property, arguments.get("nodes"), &mut table),
            ResultFilter::NodesAndLabels => {
                filter_identifiers_pro(
                    executor,
                    identifier_property,
                    arguments.get("nodes"),
                    arguments.get("nodeResultFilter"),
                    &mut table,
                )
                .await?
            }
        }

        info!("📊 {} 返回 {} 行", self.algorithm.name, table.len());
        Ok(table)
    }
}
