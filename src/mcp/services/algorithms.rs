// MCP 算法服务
//
// 每个算法类别 (centrality / community / similarity / path) 对应一个服务实例

use log::debug;
use rmcp::model::Tool;
use serde_json::Value;
use std::sync::Arc;

use crate::algorithms::{AlgorithmCategory, AlgorithmHandler, Arguments};
use crate::mcp::{invalid_parameters_error, parse_error, McpResult};

/// 算法服务
pub struct AlgorithmService {
    category: AlgorithmCategory,
    handlers: Vec<Arc<dyn AlgorithmHandler>>,
}

impl AlgorithmService {
    pub fn new(category: AlgorithmCategory, handlers: Vec<Arc<dyn AlgorithmHandler>>) -> Self {
        Self { category, handlers }
    }

    fn handler(&self, name: &str) -> Option<&Arc<dyn AlgorithmHandler>> {
        self.handlers.iter().find(|h| h.name() == name)
    }
}

fn to_arguments(tool_name: &str, arguments: Value) -> McpResult<Arguments> {
    match arguments {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Arguments::new()),
        other => Err(parse_error(tool_name, format!("expected an object, got {other}"))),
    }
}

#[async_trait::async_trait]
impl crate::mcp::GdsMcpService for AlgorithmService {
    fn name(&self) -> &str {
        self.category.as_str()
    }

    fn description(&self) -> &str {
        self.category.description()
    }

    fn tools(&self) -> Vec<Tool> {
        self.handlers
            .iter()
            .map(|h| Tool {
                name: h.name().to_string().into(),
                description: h.description().to_string().into(),
                input_schema: Arc::new(h.input_schema()),
            })
            .collect()
    }

    async fn handle_tool_call(&self, name: &str, arguments: Value) -> McpResult<Value> {
        let handler = self
            .handler(name)
            .ok_or_else(|| invalid_parameters_error(format!("Unknown tool: {name}")))?;
        let arguments = to_arguments(name, arguments)?;

        debug!("🧮 执行算法 {} ({})", name, self.category.as_str());
        let table = handler.execute(arguments).await?;
        handler.render(table)
    }
}
