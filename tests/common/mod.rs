#![allow(dead_code)]

use neo4j_gds_mcp::config::{ServerConfig, ServicesConfig};
use neo4j_gds_mcp::gds::testing::MemoryExecutor;
use neo4j_gds_mcp::gds::ResultTable;
use neo4j_gds_mcp::mcp::GdsMcpManager;
use serde_json::{json, Value};
use std::sync::Arc;

/// Small station graph: node `i` is named `STATIONS[i]`.
pub const STATIONS: [&str; 4] = ["Aldgate", "Bank", "Euston", "Holborn"];

fn station_id(name: &Value) -> Option<i64> {
    let name = name.as_str()?;
    STATIONS.iter().position(|s| *s == name).map(|i| i as i64)
}

pub fn station_executor() -> MemoryExecutor {
    MemoryExecutor::new()
        .on("count(n)", ResultTable::with_rows(["count"], vec![vec![json!(4)]]))
        .on("db.labels", ResultTable::with_rows(["label"], vec![vec![json!("Station")]]))
        .on("keys(n)", ResultTable::with_rows(["key"], vec![vec![json!("name")], vec![json!("zone")]]))
        .on("keys(r)", ResultTable::with_rows(["key"], vec![vec![json!("time")]]))
        .on(
            "n[property] AS value",
            ResultTable::with_rows(
                ["property", "valueTypes"],
                vec![
                    vec![json!("name"), json!(["STRING NOT NULL"])],
                    vec![json!("zone"), json!(["INTEGER NOT NULL"])],
                ],
            ),
        )
        .on(
            "r[property] AS value",
            ResultTable::with_rows(["property", "valueTypes"], vec![vec![json!("time"), json!(["FLOAT NOT NULL"])]]),
        )
        .on(
            "gds.graph.project",
            ResultTable::with_rows(
                ["graphName", "nodeCount", "relationshipCount"],
                vec![vec![json!("g"), json!(4), json!(5)]],
            ),
        )
        .on(
            "gds.pageRank.stream",
            ResultTable::with_rows(
                ["nodeId", "score"],
                vec![
                    vec![json!(0), json!(0.15)],
                    vec![json!(1), json!(0.9)],
                    vec![json!(2), json!(0.4)],
                    vec![json!(3), json!(0.3)],
                ],
            ),
        )
        .on(
            "gds.shortestPath.dijkstra.stream",
            ResultTable::with_rows(
                ["index", "sourceNode", "targetNode", "totalCost", "nodeIds", "costs", "path"],
                vec![vec![
                    json!(0),
                    json!(0),
                    json!(2),
                    json!(7.5),
                    json!([0, 1, 2]),
                    json!([0.0, 3.0, 7.5]),
                    json!(["Aldgate", "Bank", "Euston"]),
                ]],
            ),
        )
        .respond("gds.util.asNode(nodeId)[$property]", |query| {
            let rows = query.params()["nodeIds"]
                .as_array()
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .filter_map(|id| {
                    let name = STATIONS.get(usize::try_from(id.as_i64()?).ok()?)?;
                    Some(vec![id, json!(name)])
                })
                .collect();
            Ok(ResultTable::with_rows(["nodeId", "name"], rows))
        })
        .respond("WHERE n[$property] = name", |query| {
            let rows = query.params()["names"]
                .as_array()
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .filter_map(|name| station_id(&name).map(|id| vec![name, json!(id)]))
                .collect();
            Ok(ResultTable::with_rows(["name", "nodeId"], rows))
        })
}

pub fn manager(executor: Arc<MemoryExecutor>) -> GdsMcpManager {
    GdsMcpManager::new(&ServerConfig::default(), &ServicesConfig::default(), executor)
}
