//! Centrality algorithms.

use super::{AlgorithmCategory, ParamKind, ParamSpec, ResultFilter, StreamAlgorithm};

const SCALERS: &[&str] = &["None", "MinMax", "Max", "Mean", "Log", "StdScore", "Center"];

const SOURCE_NODES: ParamSpec = ParamSpec::optional(
    "sourceNodes",
    ParamKind::NameList,
    "Nodes to bias the random walk towards: identifiers when nodeIdentifierProperty is set, node ids otherwise.",
);
const SCALER: ParamSpec = ParamSpec::optional("scaler", ParamKind::Enum(SCALERS), "Normalization applied to the final scores.");
const DAMPING_FACTOR: ParamSpec = ParamSpec::optional(
    "dampingFactor",
    ParamKind::Number,
    "Probability of following a relationship instead of teleporting, in [0, 1). Default 0.85.",
);
const MAX_ITERATIONS: ParamSpec =
    ParamSpec::optional("maxIterations", ParamKind::Integer, "Maximum number of iterations. Default 20.");
const TOLERANCE: ParamSpec = ParamSpec::optional(
    "tolerance",
    ParamKind::Number,
    "Minimum change in scores between iterations before the algorithm stops. Default 0.0000001.",
);
const RELATIONSHIP_WEIGHT_PROPERTY: ParamSpec = ParamSpec::optional(
    "relationshipWeightProperty",
    ParamKind::String,
    "Relationship property used as weight. Unweighted when omitted.",
);

pub static ALGORITHMS: [StreamAlgorithm; 11] = [
    StreamAlgorithm {
        name: "article_rank",
        description: "Calculate the ArticleRank of nodes. A PageRank variant where links from nodes with few outgoing relationships carry more weight.",
        category: AlgorithmCategory::Centrality,
        procedure: "gds.articleRank.stream",
        yields: &["nodeId", "score"],
        params: &[SOURCE_NODES, SCALER, DAMPING_FACTOR, MAX_ITERATIONS, TOLERANCE],
        undirected: false,
        forward_config: true,
        id_columns: &[("nodeId", "nodeName")],
        id_params: &["sourceNodes"],
        result_filter: ResultFilter::Nodes,
    },
    StreamAlgorithm {
        name: "articulation_points",
        description: "Find articulation points: nodes whose removal increases the number of connected components. The graph is treated as undirected.",
        category: AlgorithmCategory::Centrality,
        procedure: "gds.articulationPoints.stream",
        yields: &["nodeId"],
        params: &[],
        undirected: true,
        forward_config: false,
        id_columns: &[("nodeId", "nodeName")],
        id_params: &[],
        result_filter: ResultFilter::None,
    },
    StreamAlgorithm {
        name: "betweenness_centrality",
        description: "Calculate betweenness centrality: how often a node lies on the shortest paths between other nodes.",
        category: AlgorithmCategory::Centrality,
        procedure: "gds.betweenness.stream",
        yields: &["nodeId", "score"],
        params: &[
            ParamSpec::optional(
                "samplingSize",
                ParamKind::Integer,
                "Number of source nodes sampled to approximate the score. Exact when omitted.",
            ),
            RELATIONSHIP_WEIGHT_PROPERTY,
        ],
        undirected: false,
        forward_config: true,
        id_columns: &[("nodeId", "nodeName")],
        id_params: &[],
        result_filter: ResultFilter::Nodes,
    },
    StreamAlgorithm {
        name: "bridges",
        description: "Find bridges: relationships whose removal increases the number of connected components. The graph is treated as undirected.",
        category: AlgorithmCategory::Centrality,
        procedure: "gds.bridges.stream",
        yields: &["from", "to"],
        params: &[],
        undirected: true,
        forward_config: false,
        id_columns: &[("from", "fromName"), ("to", "toName")],
        id_params: &[],
        result_filter: ResultFilter::None,
    },
    StreamAlgorithm {
        name: "CELF",
        description: "Select the set of seed nodes that maximizes the expected spread of influence under the Independent Cascade model (Cost Effective Lazy Forward).",
        category: AlgorithmCategory::Centrality,
        procedure: "gds.influenceMaximization.celf.stream",
        yields: &["nodeId", "spread"],
        params: &[
            ParamSpec::required("seedSetSize", ParamKind::Integer, "Number of seed nodes to select."),
            ParamSpec::optional(
                "monteCarloSimulations",
                ParamKind::Integer,
                "Number of Monte-Carlo simulations. Default 100.",
            ),
            ParamSpec::optional(
                "propagationProbability",
                ParamKind::Number,
                "Probability that a node activates a neighbour. Default 0.1.",
            ),
        ],
        undirected: false,
        forward_config: true,
        id_columns: &[("nodeId", "nodeName")],
        id_params: &[],
        result_filter: ResultFilter::None,
    },
    StreamAlgorithm {
        name: "closeness_centrality",
        description: "Calculate closeness centrality: the inverse of the average shortest path distance to all other reachable nodes.",
        category: AlgorithmCategory::Centrality,
        procedure: "gds.closeness.stream",
        yields: &["nodeId", "score"],
        params: &[ParamSpec::optional(
            "useWassermanFaust",
            ParamKind::Boolean,
            "Use the Wasserman-Faust formula, which accounts for disconnected graphs. Default false.",
        )],
        undirected: false,
        forward_config: true,
        id_columns: &[("nodeId", "nodeName")],
        id_params: &[],
        result_filter: ResultFilter::Nodes,
    },
    StreamAlgorithm {
        name: "degree_centrality",
        description: "Calculate degree centrality: the number (or total weight) of relationships of each node.",
        category: AlgorithmCategory::Centrality,
        procedure: "gds.degree.stream",
        yields: &["nodeId", "score"],
        params: &[
            ParamSpec::optional(
                "orientation",
                ParamKind::Enum(&["NATURAL", "REVERSE", "UNDIRECTED"]),
                "Which relationships to count: outgoing (NATURAL), incoming (REVERSE) or both (UNDIRECTED). Default NATURAL.",
            ),
            RELATIONSHIP_WEIGHT_PROPERTY,
        ],
        undirected: false,
        forward_config: true,
        id_columns: &[("nodeId", "nodeName")],
        id_params: &[],
        result_filter: ResultFilter::NodesAndLabels,
    },
    StreamAlgorithm {
        name: "eigenvector_centrality",
        description: "Calculate eigenvector centrality: nodes are important when connected to other important nodes.",
        category: AlgorithmCategory::Centrality,
        procedure: "gds.eigenvector.stream",
        yields: &["nodeId", "score"],
        params: &[MAX_ITERATIONS, TOLERANCE, RELATIONSHIP_WEIGHT_PROPERTY, SOURCE_NODES, SCALER],
        undirected: false,
        forward_config: true,
        id_columns: &[("nodeId", "nodeName")],
        id_params: &["sourceNodes"],
        result_filter: ResultFilter::Nodes,
    },
    StreamAlgorithm {
        name: "pagerank",
        description: "Calculate the PageRank of nodes: importance based on the number and importance of incoming relationships.",
        category: AlgorithmCategory::Centrality,
        procedure: "gds.pageRank.stream",
        yields: &["nodeId", "score"],
        params: &[SOURCE_NODES, DAMPING_FACTOR, MAX_ITERATIONS, TOLERANCE],
        undirected: false,
        forward_config: true,
        id_columns: &[("nodeId", "nodeName")],
        id_params: &["sourceNodes"],
        result_filter: ResultFilter::Nodes,
    },
    StreamAlgorithm {
        name: "harmonic_centrality",
        description: "Calculate harmonic centrality: the sum of inverse shortest path distances to all other nodes. Handles disconnected graphs.",
        category: AlgorithmCategory::Centrality,
        procedure: "gds.closeness.harmonic.stream",
        yields: &["nodeId", "score"],
        params: &[],
        undirected: false,
        forward_config: false,
        id_columns: &[("nodeId", "nodeName")],
        id_params: &[],
        result_filter: ResultFilter::Nodes,
    },
    StreamAlgorithm {
        name: "HITS",
        description: "Run Hyperlink-Induced Topic Search: every node gets a hub and an authority score.",
        category: AlgorithmCategory::Centrality,
        procedure: "gds.hits.stream",
        yields: &["nodeId", "values"],
        params: &[
            ParamSpec::optional("hitsIterations", ParamKind::Integer, "Number of hub/authority iterations. Default 20."),
            ParamSpec::optional("authProperty", ParamKind::String, "Name of the authority score. Default 'auth'."),
            ParamSpec::optional("hubProperty", ParamKind::String, "Name of the hub score. Default 'hub'."),
            ParamSpec::optional(
                "partitioning",
                ParamKind::Enum(&["AUTO", "RANGE", "DEGREE"]),
                "Partitioning strategy used for parallel computation. Default AUTO.",
            ),
        ],
        undirected: false,
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

    fn find(name: &str) -> &'static StreamAlgorithm {
        ALGORITHMS.iter().find(|a| a.name == name).unwrap()
    }

    #[test]
    fn test_definitions_are_consistent() {
        for algorithm in &ALGORITHMS {
            assert_eq!(algorithm.category, AlgorithmCategory::Centrality);
            assert!(algorithm.procedure.starts_with("gds.") && algorithm.procedure.ends_with(".stream"));
            for (id_column, _) in algorithm.id_columns {
                assert!(algorithm.yields.contains(id_column), "{} does not yield {}", algorithm.name, id_column);
            }
            for id_param in algorithm.id_params {
                assert!(algorithm.params.iter().any(|p| p.name == *id_param));
            }
        }
    }

    #[test]
    fn test_undirected_algorithms() {
        assert!(find("articulation_points").undirected);
        assert!(find("bridges").undirected);
        assert!(!find("pagerank").undirected);
    }

    #[tokio::test]
    async fn test_bridges_names_both_endpoints() {
        let executor = Arc::new(graph_executor().on(
            "gds.bridges.stream",
            ResultTable::with_rows(["from", "to"], vec![vec![json!(1), json!(2)]]),
        ));
        let handler = StreamAlgorithmHandler::new(find("bridges"), executor.clone());

        let table = handler
            .execute(args(json!({"nodeIdentifierProperty": "name", "dampingFactor": 0.5})))
            .await
            .unwrap();

        assert_eq!(table.columns(), ["from", "to", "fromName", "toName"]);
        assert_eq!(table.get(0, "toName"), Some(&json!("n2")));

        let stream = &executor.queries_matching("gds.bridges.stream")[0];
        assert_eq!(stream.params()["configuration"], json!({}));
        let project = &executor.queries_matching("gds.graph.project")[0];
        assert_eq!(
            project.params()["relationshipProjection"]["__ALL__"]["orientation"],
            json!("UNDIRECTED")
        );
    }

    #[tokio::test]
    async fn test_degree_filters_by_label() {
        let executor = Arc::new(
            graph_executor()
                .on(
                    "gds.degree.stream",
                    ResultTable::with_rows(
                        ["nodeId", "score"],
                        vec![vec![json!(1), json!(3.0)], vec![json!(2), json!(1.0)]],
                    ),
                )
                .on(
                    "labels(gds.util.asNode(nodeId))",
                    ResultTable::with_rows(
                        ["nodeId", "labels"],
                        vec![vec![json!(1), json!(["Person"])], vec![json!(2), json!(["Movie"])]],
                    ),
                ),
        );
        let handler = StreamAlgorithmHandler::new(find("degree_centrality"), executor.clone());

        let table = handler
            .execute(args(json!({"orientation": "REVERSE", "nodeResultFilter": ["Movie"]})))
            .await
            .unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0, "nodeId"), Some(&json!(2)));
        let stream = &executor.queries_matching("gds.degree.stream")[0];
        assert_eq!(stream.params()["configuration"], json!({"orientation": "REVERSE"}));
    }

    #[tokio::test]
    async fn test_pagerank_translates_source_nodes() {
        let executor = Arc::new(graph_executor().on(
            "gds.pageRank.stream",
            ResultTable::with_rows(["nodeId", "score"], vec![vec![json!(4), json!(0.2)]]),
        ));
        let handler = StreamAlgorithmHandler::new(find("pagerank"), executor.clone());

        handler
            .execute(args(json!({
                "nodeIdentifierProperty": "name",
                "sourceNodes": ["n4", "n7"],
                "dampingFactor": 0.9,
                "maxIterations": 40
            })))
            .await
            .unwrap();

        let stream = &executor.queries_matching("gds.pageRank.stream")[0];
        assert_eq!(
            stream.params()["configuration"],
            json!({"sourceNodes": [4, 7], "dampingFactor": 0.9, "maxIterations": 40})
        );
    }

    #[tokio::test]
    async fn test_celf_requires_seed_set_size() {
        let executor = Arc::new(graph_executor());
        let handler = StreamAlgorithmHandler::new(find("CELF"), executor.clone());

        let err = handler.execute(args(json!({"seedSetSize": null}))).await.unwrap_err();

        assert!(err.message().contains("seedSetSize"));
        assert!(executor.queries_matching("gds.graph.project").is_empty());
    }
}
