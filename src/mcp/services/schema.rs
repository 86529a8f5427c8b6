// MCP Schema 服务
//
// 提供节点计数、标签、关系类型与属性键查询

use rmcp::model::Tool;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::gds::{schema, CypherExecutor};
use crate::mcp::{empty_schema, invalid_parameters_error, serialize_error, McpResult};

const TOOLS: [(&str, &str); 5] = [
    ("count_nodes_tool", "Count the number of nodes in the graph"),
    ("get_node_properties_keys_tool", "Get all node properties keys in the database"),
    ("get_node_labels_tool", "Get all node labels in the database"),
    ("get_relationship_types_tool", "Get all relationship types in the database"),
    (
        "get_relationship_properties_keys_tool",
        "Get all relationship properties keys in the database",
    ),
];

/// Schema 服务
pub struct SchemaService {
    executor: Arc<dyn CypherExecutor>,
}

impl SchemaService {
    pub fn new(executor: Arc<dyn CypherExecutor>) -> Self {
        Self { executor }
    }
}

#[async_trait::async_trait]
impl crate::mcp::GdsMcpService for SchemaService {
    fn name(&self) -> &str {
        "schema"
    }

    fn description(&self) -> &str {
        "查询图数据库的节点、标签、关系类型和属性键"
    }

    fn tools(&self) -> Vec<Tool> {
        TOOLS
            .iter()
            .map(|(name, description)| Tool {
                name: (*name).into(),
                description: (*description).into(),
                input_schema: empty_schema(),
            })
            .collect()
    }

    async fn handle_tool_call(&self, name: &str, _arguments: Value) -> McpResult<Value> {
        let executor = self.executor.as_ref();
        match name {
            "count_nodes_tool" => Ok(json!(schema::count_nodes(executor).await?)),
            "get_node_properties_keys_tool" => {
                serde_json::to_value(schema::get_node_properties_keys(executor).await?)
                    .map_err(|e| serialize_error(name, e))
            }
            "get_node_labels_tool" => {
                serde_json::to_value(schema::get_node_labels(executor).await?).map_err(|e| serialize_error(name, e))
            }
            "get_relationship_types_tool" => {
                serde_json::to_value(schema::get_relationship_types(executor).await?)
                    .map_err(|e| serialize_error(name, e))
            }
            "get_relationship_properties_keys_tool" => {
                serde_json::to_value(schema::get_relationship_properties_keys(executor).await?)
                    .map_err(|e| serialize_error(name, e))
            }
            _ => Err(invalid_parameters_error(format!("Unknown tool: {name}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gds::testing::MemoryExecutor;
    use crate::gds::ResultTable;
    use crate::mcp::{GdsMcpService, McpError};

    fn service() -> SchemaService {
        let executor = MemoryExecutor::new()
            .on("count(n)", ResultTable::with_rows(["count"], vec![vec![json!(302)]]))
            .on(
                "db.labels",
                ResultTable::with_rows(["label"], vec![vec![json!("Station")], vec![json!("Zone")]]),
            )
            .on(
                "db.relationshipTypes",
                ResultTable::with_rows(["relationshipType"], vec![vec![json!("LINK")]]),
            )
            .on("keys(r)", ResultTable::with_rows(["key"], vec![vec![json!("time")]]))
            .on(
                "keys(n)",
                ResultTable::with_rows(["key"], vec![vec![json!("name")], vec![json!("zone")]]),
            );
        SchemaService::new(Arc::new(executor))
    }

    #[test]
    fn test_tools_take_no_arguments() {
        let tools = service().tools();
        assert_eq!(tools.len(), 5);
        for tool in tools {
            assert_eq!(tool.input_schema["properties"], json!({}));
        }
    }

    #[tokio::test]
    async fn test_tool_results() {
        let service = service();
        assert_eq!(service.handle_tool_call("count_nodes_tool", json!({})).await.unwrap(), json!(302));
        assert_eq!(
            service.handle_tool_call("get_node_labels_tool", json!({})).await.unwrap(),
            json!(["Station", "Zone"])
        );
        assert_eq!(
            service.handle_tool_call("get_relationship_types_tool", json!({})).await.unwrap(),
            json!(["LINK"])
        );
        assert_eq!(
            service
                .handle_tool_call("get_relationship_properties_keys_tool", json!({}))
                .await
                .unwrap(),
            json!(["time"])
        );
        assert_eq!(
            service
                .handle_tool_call("get_node_properties_keys_tool", json!({}))
                .await
                .unwrap(),
            json!(["name", "zone"])
        );
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let err = service().handle_tool_call("drop_database", json!({})).await.unwrap_err();
        assert!(matches!(err, McpError::InvalidParameters(_)));
    }
}
