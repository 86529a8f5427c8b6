// MCP 桥接模块
//
// 基于换行分隔 JSON-RPC 2.0 的 stdio 服务循环

use log::{debug, error, info, warn};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::mcp::{tool_to_json, GdsMcpManager, McpResult};

pub const PROTOCOL_VERSION: &str = "2024-11-05";

const PARSE_ERROR: i64 = -32700;
const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;

fn error_response(id: Value, code: i64, message: impl Into<String>) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {
            "code": code,
            "message": message.into()
        }
    })
}

fn result_response(id: Value, result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result
    })
}

fn text_content(text: String, is_error: bool) -> Value {
    json!({
        "content": [
            {
                "type": "text",
                "text": text
            }
        ],
        "isError": is_error
    })
}

async fn call_tool(manager: &GdsMcpManager, id: Value, params: &Value) -> Value {
    let Some(tool_name) = params.get("name").and_then(Value::as_str) else {
        return error_response(id, INVALID_PARAMS, "Missing tool name");
    };
    if !manager.has_tool(tool_name) {
        return error_response(id, INVALID_PARAMS, format!("Unknown tool: {tool_name}"));
    }
    let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

    match manager.handle_tool_call(tool_name, arguments).await {
        Ok(result) => {
            let text = serde_json::to_string_pretty(&result).unwrap_or_else(|_| result.to_string());
            result_response(id, text_content(text, false))
        }
        Err(e) => {
            let data = json!({"type": e.kind(), "code": e.code()});
            let mut response = result_response(id, text_content(format!("Error executing {tool_name}: {e}"), true));
            response["result"]["_meta"] = data;
            response
        }
    }
}

/// 处理一条消息；通知和响应不需要回复，返回 `None`
pub async fn handle_message(manager: &GdsMcpManager, line: &str) -> Option<Value> {
    let msg: Value = match serde_json::from_str(line) {
        Ok(msg) => msg,
        Err(e) => {
            warn!("⚠️ 无法解析消息: {}", e);
            return Some(error_response(Value::Null, PARSE_ERROR, format!("Parse error: {e}")));
        }
    };

    let id = msg.get("id").cloned();
    let Some(method) = msg.get("method").and_then(Value::as_str) else {
        if msg.get("result").is_some() || msg.get("error").is_some() {
            return None;
        }
        return Some(error_response(id.unwrap_or(Value::Null), INVALID_REQUEST, "Invalid request"));
    };

    // 没有 id 的消息是通知
    let Some(id) = id else {
        debug!("🔔 收到通知: {}", method);
        return None;
    };
    let params = msg.get("params").cloned().unwrap_or(Value::Null);
    debug!("📨 请求: {} (id: {})", method, id);

    let response = match method {
        "initialize" => {
            let protocol_version = params
                .get("protocolVersion")
                .and_then(Value::as_str)
                .unwrap_or(PROTOCOL_VERSION);
            let server_info = manager.server_info();
            result_response(
                id,
                json!({
                    "protocolVersion": protocol_version,
                    "capabilities": {
                        "tools": {
                            "listChanged": false
                        }
                    },
                    "serverInfo": {
                        "name": server_info.name,
                        "version": server_info.version
                    }
                }),
            )
        }
        "ping" => result_response(id, json!({})),
        "tools/list" => {
            let tools: Vec<Value> = manager.get_all_tools().iter().map(tool_to_json).collect();
            result_response(id, json!({ "tools": tools }))
        }
        "tools/call" => call_tool(manager, id, &params).await,
        _ if method.starts_with("notifications/") => return None,
        _ => error_response(id, METHOD_NOT_FOUND, format!("Method not found: {method}")),
    };
    Some(response)
}

async fn write_response<W: AsyncWrite + Unpin>(writer: &mut W, response: &Value) -> McpResult<()> {
    let mut line = response.to_string();
    line.push('\n');
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

/// 逐行读取请求并写回响应，直到输入结束
pub async fn serve<R, W>(manager: &GdsMcpManager, reader: R, mut writer: W) -> McpResult<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(response) = handle_message(manager, line).await {
            write_response(&mut writer, &response).await?;
        }
    }
    Ok(())
}

/// 启动 stdio MCP 服务器
pub async fn start_mcp_server(manager: Arc<GdsMcpManager>) -> McpResult<()> {
    let server_info = manager.server_info();
    info!("🚀 {} MCP Server {} starting...", server_info.name, server_info.version);
    info!("📡 Available services: {}", manager.service_names().join(", "));
    info!("🔌 Listening on stdio...");

    let result = serve(&manager, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await;
    if let Err(e) = &result {
        error!("❌ MCP 服务循环异常退出: {}", e);
    }

    manager.performance_collector().log_summary();
    info!("👋 MCP Server shutting down");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ServerConfig, ServicesConfig};
    use crate::gds::testing::MemoryExecutor;
    use crate::gds::ResultTable;

    fn manager() -> GdsMcpManager {
        let executor = MemoryExecutor::new().on("count(n)", ResultTable::with_rows(["count"], vec![vec![json!(42)]]));
        let services = ServicesConfig {
            enabled: vec!["schema".to_string()],
        };
        GdsMcpManager::new(&ServerConfig::default(), &services, Arc::new(executor))
    }

    #[tokio::test]
    async fn test_initialize_echoes_protocol_version() {
        let response = handle_message(
            &manager(),
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-03-26"}}"#,
        )
        .await
        .unwrap();
        assert_eq!(response["id"], json!(1));
        assert_eq!(response["result"]["protocolVersion"], json!("2025-03-26"));
        assert_eq!(response["result"]["serverInfo"]["name"], json!("neo4j-gds"));
    }

    #[tokio::test]
    async fn test_notifications_get_no_reply() {
        let manager = manager();
        assert!(handle_message(&manager, r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await
            .is_none());
        assert!(handle_message(&manager, r#"{"jsonrpc":"2.0","id":3,"result":{}}"#).await.is_none());
    }

    #[tokio::test]
    async fn test_error_codes() {
        let manager = manager();
        let parse = handle_message(&manager, "{not json").await.unwrap();
        assert_eq!(parse["error"]["code"], json!(-32700));
        assert_eq!(parse["id"], Value::Null);

        let unknown = handle_message(&manager, r#"{"jsonrpc":"2.0","id":"a","method":"resources/list"}"#)
            .await
            .unwrap();
        assert_eq!(unknown["error"]["code"], json!(-32601));
        assert_eq!(unknown["id"], json!("a"));

        let tool = handle_message(
            &manager,
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"pagerank"}}"#,
        )
        .await
        .unwrap();
        assert_eq!(tool["error"]["code"], json!(-32602));
    }

    #[tokio::test]
    async fn test_tool_call_returns_text_content() {
        let response = handle_message(
            &manager(),
            r#"{"jsonrpc":"2.0","id":7,"method":"tools/call","params":{"name":"count_nodes_tool","arguments":{}}}"#,
        )
        .await
        .unwrap();
        assert_eq!(response["result"]["isError"], json!(false));
        assert_eq!(response["result"]["content"][0]["text"], json!("42"));
    }

    #[tokio::test]
    async fn test_serve_writes_one_line_per_request() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#,
            "\n\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
            "\n"
        );
        let mut output = Vec::new();
        serve(&manager(), input.as_bytes(), &mut output).await.unwrap();

        let lines: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["result"], json!({}));
        assert_eq!(lines[1]["result"]["tools"].as_array().unwrap().len(), 6);
    }
}
