//! MCP 错误类型

/// GDS MCP 错误类型
#[derive(Debug, Clone, PartialEq)]
pub enum McpError {
    /// 参数验证错误
    InvalidParameters(String),
    /// 服务执行错误
    ExecutionFailed(String),
    /// 配置错误
    ConfigurationError(String),
    /// Neo4j / GDS 返回的错误
    DatabaseError(String),
    /// 网络错误
    NetworkError(String),
    /// 超时错误
    TimeoutError(String),
    /// 未知错误
    Unknown(String),
}

impl McpError {
    /// JSON-RPC error code
    pub fn code(&self) -> i64 {
        match self {
            McpError::InvalidParameters(_) => -32602,
            McpError::ExecutionFailed(_) => -32000,
            McpError::ConfigurationError(_) => -32603,
            McpError::DatabaseError(_) => -32001,
            McpError::NetworkError(_) => -32002,
            McpError::TimeoutError(_) => -32005,
            McpError::Unknown(_) => -32603,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            McpError::InvalidParameters(_) => "InvalidParameters",
            McpError::ExecutionFailed(_) => "ExecutionFailed",
            McpError::ConfigurationError(_) => "ConfigurationError",
            McpError::DatabaseError(_) => "DatabaseError",
            McpError::NetworkError(_) => "NetworkError",
            McpError::TimeoutError(_) => "TimeoutError",
            McpError::Unknown(_) => "Unknown",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            McpError::InvalidParameters(msg)
            | McpError::ExecutionFailed(msg)
            | McpError::ConfigurationError(msg)
            | McpError::DatabaseError(msg)
            | McpError::NetworkError(msg)
            | McpError::TimeoutError(msg)
            | McpError::Unknown(msg) => msg,
        }
    }
}

impl std::fmt::Display for McpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            McpError::InvalidParameters(msg) => write!(f, "Invalid parameters: {msg}"),
            McpError::ExecutionFailed(msg) => write!(f, "Execution failed: {msg}"),
            McpError::ConfigurationError(msg) => write!(f, "Configuration error: {msg}"),
            McpError::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            McpError::NetworkError(msg) => write!(f, "Network error: {msg}"),
            McpError::TimeoutError(msg) => write!(f, "Timeout error: {msg}"),
            McpError::Unknown(msg) => write!(f, "Unknown error: {msg}"),
        }
    }
}

impl std::error::Error for McpError {}

impl From<serde_json::Error> for McpError {
    fn from(err: serde_json::Error) -> Self {
        McpError::InvalidParameters(format!("JSON parsing error: {err}"))
    }
}

impl From<std::io::Error> for McpError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::TimedOut => McpError::TimeoutError(format!("Timeout: {err}")),
            std::io::ErrorKind::ConnectionRefused
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionAborted => {
                McpError::NetworkError(format!("Connection error: {err}"))
            }
            _ => McpError::ExecutionFailed(format!("IO error: {err}")),
        }
    }
}

impl From<neo4rs::Error> for McpError {
    fn from(err: neo4rs::Error) -> Self {
        McpError::DatabaseError(err.to_string())
    }
}

impl From<neo4rs::DeError> for McpError {
    fn from(err: neo4rs::DeError) -> Self {
        McpError::DatabaseError(format!("Failed to decode result value: {err}"))
    }
}

impl From<tokio::time::error::Elapsed> for McpError {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        McpError::TimeoutError(format!("Operation timeout: {err}"))
    }
}

/// 类型别名
pub type McpResult<T> = Result<T, McpError>;

/// 构造 参数无效 错误
pub fn invalid_parameters_error<T: Into<String>>(msg: T) -> McpError {
    McpError::InvalidParameters(msg.into())
}

/// 构造 执行失败 错误
pub fn execution_failed_error<T: Into<String>>(msg: T) -> McpError {
    McpError::ExecutionFailed(msg.into())
}

/// 构造 数据库 错误
pub fn database_error<T: Into<String>>(msg: T) -> McpError {
    McpError::DatabaseError(msg.into())
}

/// Convert parameter parsing error to MCP error
pub fn parse_error(tool_name: &str, e: impl std::fmt::Display) -> McpError {
    invalid_parameters_error(format!("Failed to parse {tool_name} parameters: {e}"))
}

/// Convert serialization error to MCP error
pub fn serialize_error(tool_name: &str, e: impl std::fmt::Display) -> McpError {
    execution_failed_error(format!("Failed to serialize {tool_name} result: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(invalid_parameters_error("x").code(), -32602);
        assert_eq!(execution_failed_error("x").code(), -32000);
        assert_eq!(database_error("x").code(), -32001);
        assert_eq!(McpError::TimeoutError("x".into()).kind(), "TimeoutError");
    }

    #[test]
    fn test_display_and_message() {
        let err = parse_error("pagerank", "missing field");
        assert_eq!(err.message(), "Failed to parse pagerank parameters: missing field");
        assert_eq!(
            err.to_string(),
            "Invalid parameters: Failed to parse pagerank parameters: missing field"
        );
    }

    #[test]
    fn test_io_error_mapping() {
        let timeout: McpError = std::io::Error::new(std::io::ErrorKind::TimedOut, "slow").into();
        assert!(matches!(timeout, McpError::TimeoutError(_)));

        let refused: McpError =
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "down").into();
        assert!(matches!(refused, McpError::NetworkError(_)));
    }
}
