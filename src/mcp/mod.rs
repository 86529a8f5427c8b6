// GDS MCP 服务模块
//
// 将 Neo4j Graph Data Science 的模式查询与图算法封装为 MCP 工具，
// 通过 stdio 上的 JSON-RPC 供 LLM 调用

pub mod bridge;
pub mod error;
pub mod services;
pub mod stats;

use log::{debug, info, warn};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;

pub use error::*;
pub use rmcp::model::{Implementation, Tool};
pub use stats::{PerformanceCollector, PerformanceStats, ToolStats};

use crate::algorithms::{AlgorithmCategory, AlgorithmRegistry};
use crate::config::{ServerConfig, ServicesConfig, SERVICE_GROUPS};
use crate::gds::CypherExecutor;

/// 由管理器直接处理的工具
pub const LIST_TOOLS: &str = "list_tools";

/// GDS MCP 服务 trait
#[async_trait::async_trait]
pub trait GdsMcpService: Send + Sync {
    /// 服务名称
    fn name(&self) -> &str;

    /// 服务描述
    fn description(&self) -> &str;

    /// 获取服务提供的工具列表
    fn tools(&self) -> Vec<Tool>;

    /// 处理工具调用
    async fn handle_tool_call(&self, name: &str, arguments: Value) -> McpResult<Value>;
}

/// 构造无参数工具的 input schema
pub fn empty_schema() -> Arc<serde_json::Map<String, Value>> {
    let mut schema = serde_json::Map::new();
    schema.insert("type".to_string(), json!("object"));
    schema.insert("properties".to_string(), json!({}));
    schema.insert("required".to_string(), json!([]));
    Arc::new(schema)
}

/// Tool 的 JSON 表示 (name / description / inputSchema)
pub fn tool_to_json(tool: &Tool) -> Value {
    json!({
        "name": tool.name,
        "description": tool.description,
        "inputSchema": Value::Object((*tool.input_schema).clone()),
    })
}

/// 旧版客户端把参数包在 `{"parameters": {...}}` 中
fn unwrap_parameters(arguments: Value) -> Value {
    match arguments {
        Value::Object(mut map) if map.len() == 1 && map.contains_key("parameters") => {
            match map.remove("parameters") {
                Some(inner @ Value::Object(_)) => inner,
                Some(Value::Null) | None => Value::Object(serde_json::Map::new()),
                Some(other) => {
                    map.insert("parameters".to_string(), other);
                    Value::Object(map)
                }
            }
        }
        Value::Null => Value::Object(serde_json::Map::new()),
        other => other,
    }
}

/// GDS MCP 服务管理器
pub struct GdsMcpManager {
    server: ServerConfig,
    /// 按服务组的固定顺序排列
    services: Vec<Box<dyn GdsMcpService>>,
    performance_collector: Arc<PerformanceCollector>,
}

impl GdsMcpManager {
    /// 根据启用的服务组创建管理器
    pub fn new(server: &ServerConfig, services_config: &ServicesConfig, executor: Arc<dyn CypherExecutor>) -> Self {
        info!("🔧 初始化 GDS MCP 服务管理器");
        let registry = AlgorithmRegistry::new(executor.clone());
        let mut services: Vec<Box<dyn GdsMcpService>> = Vec::new();

        info!("📋 启用 MCP 服务: {:?}", services_config.enabled);
        for group in SERVICE_GROUPS.iter().copied().filter(|g| services_config.is_enabled(g)) {
            debug!("🔧 正在初始化服务: {}", group);
            if group == "schema" {
                services.push(Box::new(services::SchemaService::new(executor.clone())));
            } else if let Some(category) = AlgorithmCategory::ALL.iter().find(|c| c.as_str() == group) {
                services.push(Box::new(services::AlgorithmService::new(
                    *category,
                    registry.by_category(*category),
                )));
            }
            info!("✅ 服务 '{}' 初始化成功", group);
        }
        for unknown in services_config.enabled.iter().filter(|g| !SERVICE_GROUPS.contains(&g.as_str())) {
            warn!("⚠️  未知的服务名称: {}", unknown);
        }
        info!("🎯 MCP 服务管理器初始化完成，共注册 {} 个服务", services.len());

        Self {
            server: server.clone(),
            services,
            performance_collector: Arc::new(PerformanceCollector::new()),
        }
    }

    fn list_tools_tool() -> Tool {
        Tool {
            name: LIST_TOOLS.into(),
            description: "List all available tools in MCP Tool format".into(),
            input_schema: empty_schema(),
        }
    }

    /// 获取所有工具，包括 `list_tools`
    pub fn get_all_tools(&self) -> Vec<Tool> {
        let mut tools: Vec<Tool> = self.services.iter().flat_map(|s| s.tools()).collect();
        tools.push(Self::list_tools_tool());
        tools
    }

    pub fn has_tool(&self, tool_name: &str) -> bool {
        tool_name == LIST_TOOLS || self.find_service(tool_name).is_some()
    }

    pub fn service_names(&self) -> Vec<&str> {
        self.services.iter().map(|s| s.name()).collect()
    }

    fn find_service(&self, tool_name: &str) -> Option<&dyn GdsMcpService> {
        self.services
            .iter()
            .find(|s| s.tools().iter().any(|t| t.name == tool_name))
            .map(|s| &**s)
    }

    /// 处理工具调用
    pub async fn handle_tool_call(&self, tool_name: &str, arguments: Value) -> McpResult<Value> {
        debug!("🔧 处理工具调用: {}", tool_name);
        let arguments = unwrap_parameters(arguments);
        debug!(
            "📋 工具参数: {}",
            serde_json::to_string_pretty(&arguments).unwrap_or_default()
        );

        if tool_name == LIST_TOOLS {
            let tools: Vec<Value> = self.get_all_tools().iter().map(tool_to_json).collect();
            return Ok(Value::Array(tools));
        }

        let Some(service) = self.find_service(tool_name) else {
            warn!("❌ 未找到处理工具的服务: {}", tool_name);
            return Err(invalid_parameters_error(format!("Unknown tool: {tool_name}")));
        };
        debug!("🎯 找到处理服务: {}", service.name());

        let start = Instant::now();
        let result = service.handle_tool_call(tool_name, arguments).await;
        let elapsed = start.elapsed();
        self.performance_collector.record(tool_name, elapsed, result.is_ok());

        match &result {
            Ok(_) => info!("✅ 工具调用成功: {} (耗时: {:?})", tool_name, elapsed),
            Err(e) => warn!("❌ 工具调用失败: {} (耗时: {:?}, 错误: {})", tool_name, elapsed, e),
        }
        result
    }

    pub fn get_performance_stats(&self) -> PerformanceStats {
        self.performance_collector.get_stats()
    }

    pub fn performance_collector(&self) -> &PerformanceCollector {
        &self.performance_collector
    }

    /// 获取服务器信息
    pub fn server_info(&self) -> Implementation {
        Implementation {
            name: self.server.name.clone(),
            version: self.server.version.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gds::testing::MemoryExecutor;
    use crate::gds::{OfflineExecutor, ResultTable};

    fn manager_with(executor: MemoryExecutor, groups: &[&str]) -> GdsMcpManager {
        let services = ServicesConfig {
            enabled: groups.iter().map(|g| g.to_string()).collect(),
        };
        GdsMcpManager::new(&ServerConfig::default(), &services, Arc::new(executor))
    }

    #[test]
    fn test_unwrap_parameters() {
        assert_eq!(unwrap_parameters(json!({"parameters": {"a": 1}})), json!({"a": 1}));
        assert_eq!(unwrap_parameters(json!({"parameters": null})), json!({}));
        assert_eq!(unwrap_parameters(json!({"a": 1})), json!({"a": 1}));
        assert_eq!(unwrap_parameters(json!({"parameters": 3})), json!({"parameters": 3}));
        assert_eq!(unwrap_parameters(Value::Null), json!({}));
    }

    #[test]
    fn test_all_groups_expose_every_tool() {
        let manager = GdsMcpManager::new(
            &ServerConfig::default(),
            &ServicesConfig::default(),
            Arc::new(OfflineExecutor),
        );
        let tools = manager.get_all_tools();
        // 5 schema tools + 22 algorithms + list_tools
        assert_eq!(tools.len(), 28);
        assert!(manager.has_tool("count_nodes_tool"));
        assert!(manager.has_tool("find_shortest_path"));
        assert!(manager.has_tool(LIST_TOOLS));
        assert_eq!(manager.service_names(), ["schema", "centrality", "community", "similarity", "path"]);
    }

    #[test]
    fn test_disabled_group_hides_tools() {
        let manager = manager_with(MemoryExecutor::new(), &["schema"]);
        assert!(manager.has_tool("get_node_labels_tool"));
        assert!(!manager.has_tool("pagerank"));
    }

    #[tokio::test]
    async fn test_list_tools_tool() {
        let manager = manager_with(MemoryExecutor::new(), &["path"]);
        let result = manager.handle_tool_call(LIST_TOOLS, json!({})).await.unwrap();
        let names: Vec<&str> = result
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["find_shortest_path", "list_tools"]);
        assert!(result[0]["inputSchema"]["properties"]["start_node"].is_object());
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let manager = manager_with(MemoryExecutor::new(), &["schema"]);
        let err = manager.handle_tool_call("pagerank", json!({})).await.unwrap_err();
        assert_eq!(err.code(), -32602);
    }

    #[tokio::test]
    async fn test_stats_are_recorded() {
        let executor = MemoryExecutor::new().on("count(n)", ResultTable::with_rows(["count"], vec![vec![json!(12)]]));
        let manager = manager_with(executor, &["schema"]);

        let result = manager
            .handle_tool_call("count_nodes_tool", json!({"parameters": {}}))
            .await
            .unwrap();
        assert_eq!(result, json!(12));

        let stats = manager.get_performance_stats();
        assert_eq!(stats.tool_calls, 1);
        assert_eq!(stats.tool_stats["count_nodes_tool"].successful_calls, 1);
    }

    #[test]
    fn test_server_info() {
        let manager = manager_with(MemoryExecutor::new(), &[]);
        let info = manager.server_info();
        assert_eq!(info.name, "neo4j-gds");
        assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_services_follow_group_order() {
        let manager = manager_with(MemoryExecutor::new(), &["path", "schema", "graph_magic"]);
        assert_eq!(manager.service_names(), ["schema", "path"]);
        assert!(!manager.has_tool("graph_magic"));
    }
}
