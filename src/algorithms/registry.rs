//! Name to handler lookup.

use std::sync::Arc;

use super::path::ShortestPathHandler;
use super::{centrality, community, similarity, AlgorithmCategory, AlgorithmHandler, StreamAlgorithmHandler};
use crate::gds::CypherExecutor;

/// Every algorithm tool, in catalogue order.
pub struct AlgorithmRegistry {
    handlers: Vec<Arc<dyn AlgorithmHandler>>,
}

impl AlgorithmRegistry {
    pub fn new(executor: Arc<dyn CypherExecutor>) -> Self {
        let stream_definitions = centrality::ALGORITHMS
            .iter()
            .chain(community::ALGORITHMS.iter())
            .chain(similarity::ALGORITHMS.iter());

        let mut handlers: Vec<Arc<dyn AlgorithmHandler>> = stream_definitions
            .map(|algorithm| Arc::new(StreamAlgorithmHandler::new(algorithm, executor.clone())) as Arc<dyn AlgorithmHandler>)
            .collect();
        handlers.push(Arc::new(ShortestPathHandler::new(executor)));

        Self { handlers }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn AlgorithmHandler>> {
        self.handlers.iter().find(|h| h.name() == name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    pub fn by_category(&self, category: AlgorithmCategory) -> Vec<Arc<dyn AlgorithmHandler>> {
        self.handlers
            .iter()
            .filter(|h| h.category() == category)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::Arguments;
    use crate::gds::OfflineExecutor;
    use std::collections::HashSet;

    fn registry() -> AlgorithmRegistry {
        AlgorithmRegistry::new(Arc::new(OfflineExecutor))
    }

    #[test]
    fn test_catalogue() {
        let registry = registry();
        assert_eq!(registry.len(), 22);
        let names: HashSet<&str> = registry.names().into_iter().collect();
        assert_eq!(names.len(), registry.len());
        for name in ["pagerank", "CELF", "HITS", "node_similarity", "leiden", "find_shortest_path"] {
            assert!(names.contains(name), "missing {name}");
        }
    }

    #[test]
    fn test_by_category() {
        let registry = registry();
        assert_eq!(registry.by_category(AlgorithmCategory::Centrality).len(), 11);
        assert_eq!(registry.by_category(AlgorithmCategory::Community).len(), 8);
        assert_eq!(registry.by_category(AlgorithmCategory::Similarity).len(), 2);
        let path = registry.by_category(AlgorithmCategory::Path);
        assert_eq!(path.len(), 1);
        assert_eq!(path[0].name(), "find_shortest_path");
    }

    #[test]
    fn test_get() {
        let registry = registry();
        assert_eq!(registry.get("bridges").map(|h| h.category()), Some(AlgorithmCategory::Centrality));
        assert!(registry.get("nope").is_none());
    }

    #[test]
    fn test_offline_handlers_report_network_error() {
        let registry = registry();
        let handler = registry.get("louvain").unwrap();
        let err = tokio_test::block_on(handler.execute(Arguments::new())).unwrap_err();
        assert_eq!(err.kind(), "NetworkError");
    }
}
