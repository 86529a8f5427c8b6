use thiserror::Error;

/// 应用级错误
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Neo4j connection error: {0}")]
    Connection(String),
    #[error("MCP server error: {0}")]
    Server(String),
}

/// 配置加载和解析错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read file '{0}': {1}")]
    FileRead(String, #[source] std::io::Error),
    #[error("Failed to parse TOML from file '{0}': {1}")]
    TomlParse(String, #[source] toml::de::Error),
    #[error("Required configuration field '{0}' is missing or invalid")]
    FieldMissing(String),
    #[error("Unknown service group: {0}")]
    UnknownService(String),
    #[error("Failed to load .env file: {0}")]
    DotEnv(String),
}
