pub mod algorithms;
pub mod config;
pub mod errors;
pub mod gds;
pub mod logging;
pub mod mcp; // MCP 服务层与 stdio 桥接

// Re-export commonly used items for convenience
pub use config::AppConfig;
pub use errors::AppError;
