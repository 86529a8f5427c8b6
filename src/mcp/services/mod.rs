// MCP 服务实现模块
//
// schema: 数据库模式查询; 其余服务按算法类别划分

pub mod algorithms;
pub mod schema;

// 重新导出服务
pub use algorithms::AlgorithmService;
pub use schema::SchemaService;
