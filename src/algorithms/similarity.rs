//! Similarity algorithms. Both run in their filtered form so callers can
//! restrict the source and target node sets by identifier.

use super::{AlgorithmCategory, ParamKind, ParamSpec, ResultFilter, StreamAlgorithm};

const SOURCE_NODE_FILTER: ParamSpec = ParamSpec::optional(
    "sourceNodeFilter",
    ParamKind::NameList,
    "Restrict source nodes: identifiers when nodeIdentifierProperty is set, otherwise node ids or a label.",
);
const TARGET_NODE_FILTER: ParamSpec = ParamSpec::optional(
    "targetNodeFilter",
    ParamKind::NameList,
    "Restrict target nodes: identifiers when nodeIdentifierProperty is set, otherwise node ids or a label.",
);
const SIMILARITY_CUTOFF: ParamSpec = ParamSpec::optional(
    "similarityCutoff",
    ParamKind::Number,
    "Lower limit for the similarity score to be included in the result.",
);
const TOP_K: ParamSpec = ParamSpec::optional(
    "topK",
    ParamKind::Integer,
    "Maximum number of neighbours reported per node. Default 10.",
);

pub static ALGORITHMS: [StreamAlgorithm; 2] = [
    StreamAlgorithm {
        name: "node_similarity",
        description: "Compare nodes by the neighbours they share (Jaccard, Overlap or Cosine) and return similar node pairs.",
        category: AlgorithmCategory::Similarity,
        procedure: "gds.nodeSimilarity.filtered.stream",
        yields: &["node1", "node2", "similarity"],
        params: &[
            SOURCE_NODE_FILTER,
            TARGET_NODE_FILTER,
            SIMILARITY_CUTOFF,
            ParamSpec::optional(
                "degreeCutoff",
                ParamKind::Integer,
                "Ignore nodes with fewer relationships than this. Default 1.",
            ),
            ParamSpec::optional(
                "upperDegreeCutoff",
                ParamKind::Integer,
                "Ignore nodes with more relationships than this.",
            ),
            TOP_K,
            ParamSpec::optional(
                "bottomK",
                ParamKind::Integer,
                "Report the k least similar neighbours per node instead.",
            ),
            ParamSpec::optional("topN", ParamKind::Integer, "Global limit on the number of most similar pairs."),
            ParamSpec::optional("bottomN", ParamKind::Integer, "Global limit on the number of least similar pairs."),
            ParamSpec::optional(
                "relationshipWeightProperty",
                ParamKind::String,
                "Relationship property used as weight for weighted similarity.",
            ),
            ParamSpec::optional(
                "similarityMetric",
                ParamKind::Enum(&["JACCARD", "OVERLAP", "COSINE"]),
                "Similarity metric. Default JACCARD.",
            ),
            ParamSpec::optional(
                "useComponents",
                ParamKind::Any,
                "Compute only within weakly connected components: a boolean or the name of a precomputed component property.",
            ),
        ],
        undirected: false,
        forward_config: true,
        id_columns: &[("node1", "node1Name"), ("node2", "node2Name")],
        id_params: &["sourceNodeFilter", "targetNodeFilter"],
        result_filter: ResultFilter::None,
    },
    StreamAlgorithm {
        name: "k_nearest_neighbors",
        description: "Find the k most similar nodes for each node based on node properties (K-Nearest Neighbors).",
        category: AlgorithmCategory::Similarity,
        procedure: "gds.knn.filtered.stream",
        yields: &["node1", "node2", "similarity"],
        params: &[
            SOURCE_NODE_FILTER,
            TARGET_NODE_FILTER,
            ParamSpec::required(
                "nodeProperties",
                ParamKind::Any,
                "Node properties compared for similarity: a name, a list of names, or a map of name to metric.",
            ),
            TOP_K,
            ParamSpec::optional(
                "sampleRate",
                ParamKind::Number,
                "Share of potential comparisons sampled per iteration, in (0, 1]. Default 0.5.",
            ),
            ParamSpec::optional(
                "deltaThreshold",
                ParamKind::Number,
                "Stop once fewer than this share of similarities changed. Default 0.001.",
            ),
            ParamSpec::optional("maxIterations", ParamKind::Integer, "Maximum number of iterations. Default 100."),
            ParamSpec::optional(
                "randomJoins",
                ParamKind::Integer,
                "Random connection attempts per node per iteration. Default 10.",
            ),
            ParamSpec::optional(
                "initialSampler",
                ParamKind::Enum(&["UNIFORM", "RANDOMWALK"]),
                "How initial neighbours are picked. Default UNIFORM.",
            ),
            SIMILARITY_CUTOFF,
            ParamSpec::optional(
                "perturbationRate",
                ParamKind::Number,
                "Probability of replacing a neighbour with a less similar one. Default 0.",
            ),
            ParamSpec::optional(
                "seedTargetNodes",
                ParamKind::Boolean,
                "Seed every node's neighbours with target nodes. Default false.",
            ),
        ],
        undirected: false,
        forward_config: true,
        id_columns: &[("node1", "node1Name"), ("node2", "node2Name")],
        id_params: &["sourceNodeFilter", "targetNodeFilter"],
        result_filter: ResultFilter::None,
    },
];
