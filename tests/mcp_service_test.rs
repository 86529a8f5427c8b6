// 通过 GdsMcpManager 端到端调用工具，数据库由内存执行器模拟

mod common;

use common::{manager, station_executor};
use neo4j_gds_mcp::mcp::McpError;
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn test_schema_tools() {
    let manager = manager(Arc::new(station_executor()));

    assert_eq!(manager.handle_tool_call("count_nodes_tool", json!({})).await.unwrap(), json!(4));
    assert_eq!(
        manager
            .handle_tool_call("get_node_properties_keys_tool", json!({}))
            .await
            .unwrap(),
        json!(["name", "zone"])
    );
    assert_eq!(
        manager.handle_tool_call("get_node_labels_tool", json!({})).await.unwrap(),
        json!(["Station"])
    );
}

#[tokio::test]
async fn test_pagerank_translates_and_filters() {
    let executor = Arc::new(station_executor());
    let manager = manager(executor.clone());

    let result = manager
        .handle_tool_call(
            "pagerank",
            json!({
                "nodeIdentifierProperty": "name",
                "nodes": ["Bank", "Euston"],
                "sourceNodes": "Aldgate",
                "dampingFactor": 0.85,
                "notAParameter": true
            }),
        )
        .await
        .unwrap();

    assert_eq!(
        result,
        json!([
            {"nodeId": 1, "score": 0.9, "nodeName": "Bank"},
            {"nodeId": 2, "score": 0.4, "nodeName": "Euston"}
        ])
    );

    let stream = executor.queries_matching("gds.pageRank.stream");
    assert_eq!(stream.len(), 1);
    assert_eq!(
        stream[0].params()["configuration"],
        json!({"dampingFactor": 0.85, "sourceNodes": [0]})
    );
}

#[tokio::test]
async fn test_projection_is_validated_and_released() {
    let executor = Arc::new(station_executor());
    let manager = manager(executor.clone());

    manager
        .handle_tool_call("pagerank", json!({"nodeLabels": ["Station"], "relTypes": "LINK"}))
        .await
        .unwrap();

    let projections = executor.queries_matching("gds.graph.project");
    assert_eq!(projections.len(), 1);
    let projection = &projections[0];
    // name 是字符串，无法投影
    assert!(projection.text().contains("zone"));
    assert!(!projection.text().contains("`name`"));
    assert_eq!(projection.params()["nodeProjection"], json!(["Station"]));
    assert_eq!(
        projection.params()["relationshipProjection"],
        json!({"LINK": {"type": "LINK", "orientation": "NATURAL", "properties": ["time"]}})
    );

    let graph_name = projection.params()["graphName"].clone();
    assert!(graph_name.as_str().unwrap().starts_with("mcp_projection_"));
    let drops = executor.queries_matching("gds.graph.drop");
    assert_eq!(drops.len(), 1);
    assert_eq!(drops[0].params()["graphName"], graph_name);
}

#[tokio::test]
async fn test_unknown_source_node_still_releases_projection() {
    let executor = Arc::new(station_executor());
    let manager = manager(executor.clone());

    let err = manager
        .handle_tool_call(
            "pagerank",
            json!({"nodeIdentifierProperty": "name", "sourceNodes": ["Paddington"]}),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, McpError::InvalidParameters(_)));
    assert!(err.message().contains("Paddington"));
    assert!(executor.queries_matching("gds.pageRank.stream").is_empty());
    assert_eq!(executor.queries_matching("gds.graph.drop").len(), 1);
}

#[tokio::test]
async fn test_shortest_path() {
    let executor = Arc::new(station_executor());
    let manager = manager(executor.clone());

    let result = manager
        .handle_tool_call(
            "find_shortest_path",
            json!({"start_node": "Aldgate", "end_node": "Euston", "relationship_property": "time"}),
        )
        .await
        .unwrap();

    assert_eq!(
        result,
        json!({
            "found": true,
            "totalCost": 7.5,
            "nodeIds": [0, 1, 2],
            "nodeNames": ["Aldgate", "Bank", "Euston"],
            "path": ["Aldgate", "Bank", "Euston"],
            "costs": [0.0, 3.0, 7.5]
        })
    );

    let dijkstra = executor.queries_matching("gds.shortestPath.dijkstra.stream");
    assert_eq!(
        dijkstra[0].params()["configuration"],
        json!({"sourceNode": 0, "targetNode": 2, "relationshipWeightProperty": "time"})
    );
}

#[tokio::test]
async fn test_failed_calls_are_counted() {
    let manager = manager(Arc::new(station_executor()));

    let err = manager.handle_tool_call("CELF", json!({})).await.unwrap_err();
    assert_eq!(err.code(), -32602);
    manager.handle_tool_call("count_nodes_tool", json!({})).await.unwrap();

    let stats = manager.get_performance_stats();
    assert_eq!(stats.tool_calls, 2);
    assert_eq!(stats.failed_calls, 1);
    assert_eq!(stats.tool_stats["CELF"].failed_calls, 1);
    assert_eq!(stats.tool_stats["count_nodes_tool"].successful_calls, 1);
}
