//! Neo4j access used by every handler.

use async_trait::async_trait;
use log::{debug, info};
use neo4rs::{ConfigBuilder, Graph};
use serde_json::{Map, Value};

use super::bolt::json_to_bolt;
use super::table::ResultTable;
use crate::config::Neo4jConfig;
use crate::mcp::error::{McpError, McpResult};

/// A Cypher statement, its parameters and the columns to collect from each record.
#[derive(Debug, Clone, PartialEq)]
pub struct CypherQuery {
    text: String,
    params: Map<String, Value>,
    columns: Vec<String>,
}

impl CypherQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: Map::new(),
            columns: Vec::new(),
        }
    }

    pub fn param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    pub fn returns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    fn to_neo4rs(&self) -> neo4rs::Query {
        self.params
            .iter()
            .fold(neo4rs::query(&self.text), |q, (key, value)| {
                q.param(key, json_to_bolt(value))
            })
    }
}

/// Executes Cypher against the graph database.
#[async_trait]
pub trait CypherExecutor: Send + Sync {
    /// Runs the query and collects `query.columns()` from every record.
    async fn fetch(&self, query: CypherQuery) -> McpResult<ResultTable>;

    /// Runs the query for its side effects.
    async fn run(&self, query: CypherQuery) -> McpResult<()> {
        self.fetch(query).await.map(|_| ())
    }
}

/// Production executor backed by a `neo4rs` connection pool.
#[derive(Clone)]
pub struct Neo4jClient {
    graph: Graph,
}

impl Neo4jClient {
    /// Build the pool and run `RETURN 1`.
    ///
    /// `Graph::connect` only creates the pool; the ping forces a real Bolt handshake
    /// so an unreachable server fails here rather than on the first tool call.
    pub async fn connect(config: &Neo4jConfig) -> McpResult<Self> {
        info!("🔌 连接 Neo4j: {} (用户: {})", config.uri, config.username);
        let mut builder = ConfigBuilder::default()
            .uri(config.uri.as_str())
            .user(config.username.as_str())
            .password(config.password.as_str())
            .max_connections(config.max_connections)
            .fetch_size(config.fetch_size);
        if let Some(database) = &config.database {
            info!("📂 使用数据库: {}", database);
            builder = builder.db(database.as_str());
        }

        let graph = Graph::connect(builder.build()?).await?;
        graph
            .run(neo4rs::query("RETURN 1"))
            .await
            .map_err(|e| McpError::NetworkError(format!("Neo4j is not responding to queries: {e}")))?;

        info!("✅ Neo4j 连接成功");
        Ok(Self { graph })
    }
}

#[async_trait]
impl CypherExecutor for Neo4jClient {
    async fn fetch(&self, query: CypherQuery) -> McpResult<ResultTable> {
        debug!("🧾 Cypher: {}", query.text().trim());
        let mut stream = self.graph.execute(query.to_neo4rs()).await?;
        let mut table = ResultTable::new(query.columns().to_vec());

        while let Some(row) = stream.next().await? {
            let values = query
                .columns()
                .iter()
                .map(|column| row.get::<Value>(column).map_err(McpError::from))
                .collect::<McpResult<Vec<_>>>()?;
            table.push_row(values);
        }

        debug!("📦 返回 {} 行", table.len());
        Ok(table)
    }

    async fn run(&self, query: CypherQuery) -> McpResult<()> {
        debug!("🧾 Cypher: {}", query.text().trim());
        self.graph.run(query.to_neo4rs()).await?;
        Ok(())
    }
}

/// Executor used when no database connection exists, e.g. for `list-tools`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineExecutor;

#[async_trait]
impl CypherExecutor for OfflineExecutor {
    async fn fetch(&self, _query: CypherQuery) -> McpResult<ResultTable> {
        Err(McpError::NetworkError("not connected to Neo4j".to_string()))
    }
}

/// Backtick-quote a Cypher identifier.
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Single-quoted Cypher string literal.
pub fn string_literal(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_builder() {
        let query = CypherQuery::new("MATCH (n) WHERE n.name = $name RETURN id(n) AS nodeId")
            .param("name", "Paddington")
            .returns(["nodeId"]);

        assert_eq!(query.params()["name"], json!("Paddington"));
        assert_eq!(query.columns(), ["nodeId"]);
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("from"), "`from`");
        assert_eq!(quote_identifier("we`ird"), "`we``ird`");
    }

    #[test]
    fn test_string_literal() {
        assert_eq!(string_literal("prop"), "'prop'");
        assert_eq!(string_literal("it's"), "'it\\'s'");
        assert_eq!(string_literal("a\\b"), "'a\\\\b'");
    }

    #[tokio::test]
    async fn test_offline_executor_fails() {
        let err = OfflineExecutor
            .fetch(CypherQuery::new("RETURN 1"))
            .await
            .unwrap_err();
        assert!(matches!(err, McpError::NetworkError(_)));
    }
}
