//! In-memory [`CypherExecutor`] for exercising handlers without a database.

use async_trait::async_trait;
use parking_lot::Mutex;

use super::client::{CypherExecutor, CypherQuery};
use super::table::ResultTable;
use crate::mcp::error::McpResult;

type Responder = Box<dyn Fn(&CypherQuery) -> McpResult<ResultTable> + Send + Sync>;

/// Answers queries by substring match on the Cypher text and records every query.
///
/// Rules are tried in registration order; unmatched queries yield an empty table
/// with the requested columns.
#[derive(Default)]
pub struct MemoryExecutor {
    rules: Vec<(String, Responder)>,
    log: Mutex<Vec<CypherQuery>>,
}

impl MemoryExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `table` for queries whose text contains `pattern`.
    pub fn on(mut self, pattern: &str, table: ResultTable) -> Self {
        self.rules
            .push((pattern.to_string(), Box::new(move |_| Ok(table.clone()))));
        self
    }

    /// Compute the answer from the query itself.
    pub fn respond<F>(mut self, pattern: &str, responder: F) -> Self
    where
        F: Fn(&CypherQuery) -> McpResult<ResultTable> + Send + Sync + 'static,
    {
        self.rules.push((pattern.to_string(), Box::new(responder)));
        self
    }

    pub fn queries(&self) -> Vec<CypherQuery> {
        self.log.lock().clone()
    }

    /// Recorded queries whose text contains `pattern`.
    pub fn queries_matching(&self, pattern: &str) -> Vec<CypherQuery> {
        self.log
            .lock()
            .iter()
            .filter(|q| q.text().contains(pattern))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl CypherExecutor for MemoryExecutor {
    async fn fetch(&self, query: CypherQuery) -> McpResult<ResultTable> {
        self.log.lock().push(query.clone());
        match self.rules.iter().find(|(pattern, _)| query.text().contains(pattern.as_str())) {
            Some((_, responder)) => responder(&query),
            None => Ok(ResultTable::new(query.columns().to_vec())),
        }
    }
}
