//! Community detection and connected component algorithms.

use super::{AlgorithmCategory, ParamKind, ParamSpec, ResultFilter, StreamAlgorithm};

const RELATIONSHIP_WEIGHT_PROPERTY: ParamSpec = ParamSpec::optional(
    "relationshipWeightProperty",
    ParamKind::String,
    "Relationship property used as weight. Unweighted when omitted.",
);
const SEED_PROPERTY: ParamSpec = ParamSpec::optional(
    "seedProperty",
    ParamKind::String,
    "Node property holding initial community ids.",
);
const MAX_LEVELS: ParamSpec = ParamSpec::optional(
    "maxLevels",
    ParamKind::Integer,
    "Maximum number of levels the graph is clustered and condensed. Default 10.",
);
const TOLERANCE: ParamSpec = ParamSpec::optional(
    "tolerance",
    ParamKind::Number,
    "Minimum change in modularity between iterations. Default 0.0001.",
);
const INCLUDE_INTERMEDIATE: ParamSpec = ParamSpec::optional(
    "includeIntermediateCommunities",
    ParamKind::Boolean,
    "Also return the community ids of every intermediate level. Default false.",
);
const CONSECUTIVE_IDS: ParamSpec = ParamSpec::optional(
    "consecutiveIds",
    ParamKind::Boolean,
    "Number communities 0, 1, 2, ... instead of using internal ids. Default false.",
);
const MIN_COMMUNITY_SIZE: ParamSpec = ParamSpec::optional(
    "minCommunitySize",
    ParamKind::Integer,
    "Only return nodes in communities of at least this size.",
);
const MAX_ITERATIONS: ParamSpec =
    ParamSpec::optional("maxIterations", ParamKind::Integer, "Maximum number of iterations. Default 10.");

pub static ALGORITHMS: [StreamAlgorithm; 8] = [
    StreamAlgorithm {
        name: "louvain",
        description: "Detect communities with the Louvain method, maximizing modularity hierarchically.",
        category: AlgorithmCategory::Community,
        procedure: "gds.louvain.stream",
        yields: &["nodeId", "communityId", "intermediateCommunityIds"],
        params: &[
            RELATIONSHIP_WEIGHT_PROPERTY,
            SEED_PROPERTY,
            MAX_LEVELS,
            MAX_ITERATIONS,
            TOLERANCE,
            INCLUDE_INTERMEDIATE,
            CONSECUTIVE_IDS,
            MIN_COMMUNITY_SIZE,
        ],
        undirected: false,
        forward_config: true,
        id_columns: &[("nodeId", "nodeName")],
        id_params: &[],
        result_filter: ResultFilter::Nodes,
    },
    StreamAlgorithm {
        name: "leiden",
        description: "Detect communities with the Leiden method, a Louvain refinement that guarantees well-connected communities. The graph is treated as undirected.",
        category: AlgorithmCategory::Community,
        procedure: "gds.leiden.stream",
        yields: &["nodeId", "communityId", "intermediateCommunityIds"],
        params: &[
            RELATIONSHIP_WEIGHT_PROPERTY,
            SEED_PROPERTY,
            MAX_LEVELS,
            ParamSpec::optional("gamma", ParamKind::Number, "Resolution parameter. Default 1.0."),
            ParamSpec::optional("theta", ParamKind::Number, "Randomness when breaking communities. Default 0.01."),
            TOLERANCE,
            INCLUDE_INTERMEDIATE,
            CONSECUTIVE_IDS,
            MIN_COMMUNITY_SIZE,
        ],
        undirected: true,
        forward_config: true,
        id_columns: &[("nodeId", "nodeName")],
        id_params: &[],
        result_filter: ResultFilter::Nodes,
    },
    StreamAlgorithm {
        name: "label_propagation",
        description: "Detect communities by propagating labels: each node adopts the most frequent label among its neighbours.",
        category: AlgorithmCategory::Community,
        procedure: "gds.labelPropagation.stream",
        yields: &["nodeId", "communityId"],
        params: &[
            RELATIONSHIP_WEIGHT_PROPERTY,
            ParamSpec::optional("nodeWeightProperty", ParamKind::String, "Node property used as node weight."),
            SEED_PROPERTY,
            MAX_ITERATIONS,
            CONSECUTIVE_IDS,
            MIN_COMMUNITY_SIZE,
        ],
        undirected: false,
        forward_config: true,
        id_columns: &[("nodeId", "nodeName")],
        id_params: &[],
        result_filter: ResultFilter::Nodes,
    },
    StreamAlgorithm {
        name: "weakly_connected_components",
        description: "Find weakly connected components: sets of nodes connected when relationship direction is ignored.",
        category: AlgorithmCategory::Community,
        procedure: "gds.wcc.stream",
        yields: &["nodeId", "componentId"],
        params: &[
            RELATIONSHIP_WEIGHT_PROPERTY,
            ParamSpec::optional(
                "threshold",
                ParamKind::Number,
                "Ignore relationships with a weight at or below this value.",
            ),
            SEED_PROPERTY,
            CONSECUTIVE_IDS,
            ParamSpec::optional(
                "minComponentSize",
                ParamKind::Integer,
                "Only return nodes in components of at least this size.",
            ),
        ],
        undirected: false,
        forward_config: true,
        id_columns: &[("nodeId", "nodeName")],
        id_params: &[],
        result_filter: ResultFilter::Nodes,
    },
    StreamAlgorithm {
        name: "strongly_connected_components",
        description: "Find strongly connected components: sets of nodes that can all reach each other following relationship direction.",
        category: AlgorithmCategory::Community,
        procedure: "gds.scc.stream",
        yields: &["nodeId", "componentId"],
        params: &[CONSECUTIVE_IDS],
        undirected: false,
        forward_config: true,
        id_columns: &[("nodeId", "nodeName")],
        id_params: &[],
        result_filter: ResultFilter::Nodes,
    },
    StreamAlgorithm {
        name: "k_core_decomposition",
        description: "Compute the core value of every node: the largest k such that the node belongs to a subgraph where all nodes have degree at least k. The graph is treated as undirected.",
        category: AlgorithmCategory::Community,
        procedure: "gds.kcore.stream",
        yields: &["nodeId", "coreValue"],
        params: &[],
        undirected: true,
        forward_config: true,
        id_columns: &[("nodeId", "nodeName")],
        id_params: &[],
        result_filter: ResultFilter::Nodes,
    },
    StreamAlgorithm {
        name: "triangle_count",
        description: "Count the triangles each node takes part in. The graph is treated as undirected.",
        category: AlgorithmCategory::Community,
        procedure: "gds.triangleCount.stream",
        yields: &["nodeId", "triangleCount"],
        params: &[ParamSpec::optional(
            "maxDegree",
            ParamKind::Integer,
            "Skip nodes with a degree above this value; they report -1.",
        )],
        undirected: true,
        forward_config: true,
        id_columns: &[("nodeId", "nodeName")],
        id_params: &[],
        result_filter: ResultFilter::Nodes,
    },
    StreamAlgorithm {
        name: "local_clustering_coefficient",
        description: "Compute the local clustering coefficient: how close each node's neighbourhood is to a clique. The graph is treated as undirected.",
        category: AlgorithmCategory::Community,
        procedure: "gds.localClusteringCoefficient.stream",
        yields: &["nodeId", "localClusteringCoefficient"],
        params: &[ParamSpec::optional(
            "triangleCountProperty",
            ParamKind::String,
            "Node property holding precomputed triangle counts.",
        )],
        undirected: true,
        forward_config: true,
        id_columns: &[("nodeId", "nodeName")],
        id_params: &[],
        result_filter: ResultFilter::Nodes,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::tests::{args, graph_executor};
    use crate::algorithms::{AlgorithmHandler, StreamAlgorithmHandler};
    use crate::gds::ResultTable;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<&str> = ALGORITHMS.iter().map(|a| a.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ALGORITHMS.len());
    }

    #[tokio::test]
    async fn test_louvain_filters_nodes_by_name() {
        let executor = Arc::new(graph_executor().on(
            "gds.louvain.stream",
            ResultTable::with_rows(
                ["nodeId", "communityId", "intermediateCommunityIds"],
                vec![
                    vec![json!(1), json!(7), json!(null)],
                    vec![json!(2), json!(7), json!(null)],
                    vec![json!(3), json!(9), json!(null)],
                ],
            ),
        ));
        let handler = StreamAlgorithmHandler::new(&ALGORITHMS[0], executor.clone());

        let table = handler
            .execute(args(json!({
                "nodeIdentifierProperty": "name",
                "nodes": ["n1", "n3"],
                "maxLevels": 5
            })))
            .await
            .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1, "communityId"), Some(&json!(9)));
        let stream = &executor.queries_matching("gds.louvain.stream")[0];
        assert_eq!(stream.params()["configuration"], json!({"maxLevels": 5}));
    }

    #[tokio::test]
    async fn test_triangle_count_projects_undirected() {
        let executor = Arc::new(graph_executor());
        let handler = StreamAlgorithmHandler::new(&ALGORITHMS[6], executor.clone());

        let table = handler.execute(args(json!({"relTypes": "KNOWS"}))).await.unwrap();

        assert!(table.is_empty());
        let project = &executor.queries_matching("gds.graph.project")[0];
        assert_eq!(
            project.params()["relationshipProjection"]["KNOWS"]["orientation"],
            json!("UNDIRECTED")
        );
    }
}
