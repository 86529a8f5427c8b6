//! Translation between internal node ids and user-facing identifiers.

use log::{debug, info};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

use super::client::{CypherExecutor, CypherQuery};
use super::table::ResultTable;
use crate::mcp::error::{invalid_parameters_error, McpResult};

const NAMES_BY_ID: &str = "UNWIND $nodeIds AS nodeId RETURN nodeId, gds.util.asNode(nodeId)[$property] AS name";
const IDS_BY_NAME: &str = "UNWIND $names AS name MATCH (n) WHERE n[$property] = name RETURN name, id(n) AS nodeId";
const LABELS_BY_ID: &str = "UNWIND $nodeIds AS nodeId RETURN nodeId, labels(gds.util.asNode(nodeId)) AS labels";

fn as_list(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        Value::Null => Vec::new(),
        other => vec![other.clone()],
    }
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

async fn names_by_id(
    executor: &dyn CypherExecutor,
    property: &str,
    ids: Vec<i64>,
) -> McpResult<HashMap<i64, Value>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let table = executor
        .fetch(
            CypherQuery::new(NAMES_BY_ID)
                .param("nodeIds", ids)
                .param("property", property)
                .returns(["nodeId", "name"]),
        )
        .await?;
    Ok(table
        .rows()
        .iter()
        .filter_map(|row| row[0].as_i64().map(|id| (id, row[1].clone())))
        .collect())
}

fn distinct_ids<'a>(values: impl Iterator<Item = &'a Value>) -> Vec<i64> {
    let mut seen = HashSet::new();
    values
        .filter_map(Value::as_i64)
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Add `name_column` holding `identifier_property` of the node in `id_column`.
///
/// No-op without an identifier property.
pub async fn translate_ids_to_identifiers(
    executor: &dyn CypherExecutor,
    identifier_property: Option<&str>,
    table: &mut ResultTable,
    id_column: &str,
    name_column: &str,
) -> McpResult<()> {
    let Some(property) = identifier_property else {
        return Ok(());
    };
    let Some(ids) = table.values(id_column) else {
        return Ok(());
    };

    let ids = distinct_ids(ids.into_iter());
    let names = names_by_id(executor, property, ids).await?;
    let column: Vec<Value> = table
        .values(id_column)
        .unwrap_or_default()
        .into_iter()
        .map(|id| id.as_i64().and_then(|id| names.get(&id).cloned()).unwrap_or(Value::Null))
        .collect();
    table.push_column(name_column, column);
    Ok(())
}

/// Same as [`translate_ids_to_identifiers`] for columns holding lists of ids.
pub async fn translate_id_lists_to_identifiers(
    executor: &dyn CypherExecutor,
    identifier_property: Option<&str>,
    table: &mut ResultTable,
    id_column: &str,
    name_column: &str,
) -> McpResult<()> {
    let Some(property) = identifier_property else {
        return Ok(());
    };
    let Some(lists) = table.values(id_column) else {
        return Ok(());
    };

    let ids = distinct_ids(lists.into_iter().filter_map(Value::as_array).flatten());
    let names = names_by_id(executor, property, ids).await?;
    let column: Vec<Value> = table
        .values(id_column)
        .unwrap_or_default()
        .into_iter()
        .map(|list| {
            let translated = list
                .as_array()
                .map(|ids| {
                    ids.iter()
                        .map(|id| id.as_i64().and_then(|id| names.get(&id).cloned()).unwrap_or(Value::Null))
                        .collect()
                })
                .unwrap_or_default();
            Value::Array(translated)
        })
        .collect();
    table.push_column(name_column, column);
    Ok(())
}

/// Replace `params[param_key]` with the internal ids of the nodes whose
/// `identifier_property` equals one of `names`.
///
/// Without an identifier property the names are forwarded as given.
pub async fn translate_identifiers_to_ids(
    executor: &dyn CypherExecutor,
    names: Option<&Value>,
    param_key: &str,
    identifier_property: Option<&str>,
    params: &mut Map<String, Value>,
) -> McpResult<()> {
    let Some(names) = present(names) else {
        return Ok(());
    };
    let Some(property) = identifier_property else {
        params.insert(param_key.to_string(), names.clone());
        return Ok(());
    };

    let wanted = as_list(names);
    let table = executor
        .fetch(
            CypherQuery::new(IDS_BY_NAME)
                .param("names", wanted.clone())
                .param("property", property)
                .returns(["name", "nodeId"]),
        )
        .await?;

    let mut ids = Vec::new();
    let mut missing = Vec::new();
    for name in &wanted {
        let matches: Vec<Value> = table
            .rows()
            .iter()
            .filter(|row| &row[0] == name)
            .map(|row| row[1].clone())
            .collect();
        if matches.is_empty() {
            missing.push(name.to_string());
        }
        ids.extend(matches);
    }

    if !missing.is_empty() {
        return Err(invalid_parameters_error(format!(
            "No nodes found with {property} = {} for '{param_key}'",
            missing.join(", ")
        )));
    }

    debug!("🔁 {} 转换为节点 ID: {:?}", param_key, ids);
    params.insert(param_key.to_string(), Value::Array(ids));
    Ok(())
}

fn matches_name(cell: &Value, name: &Value) -> bool {
    if cell == name {
        return true;
    }
    // Node ids may arrive as strings from clients that stringify every argument.
    match (cell.as_i64(), name.as_str()) {
        (Some(id), Some(text)) => text.trim().parse::<i64>().map(|n| n == id).unwrap_or(false),
        _ => false,
    }
}

/// Keep rows whose `nodeName` (or `nodeId` without an identifier property) is in `names`.
pub fn filter_identifiers(identifier_property: Option<&str>, names: Option<&Value>, table: &mut ResultTable) {
    let Some(names) = present(names) else {
        return;
    };
    let wanted = as_list(names);
    let column = if identifier_property.is_some() { "nodeName" } else { "nodeId" };
    let Some(idx) = table.column_index(column) else {
        return;
    };

    let before = table.len();
    table.retain_rows(|row| wanted.iter().any(|name| matches_name(&row[idx], name)));
    info!("🔎 按 {} 过滤结果: {} -> {} 行", column, before, table.len());
}

/// [`filter_identifiers`], then keep rows whose node carries one of the labels in `node_result_filter`.
pub async fn filter_identifiers_pro(
    executor: &dyn CypherExecutor,
    identifier_property: Option<&str>,
    names: Option<&Value>,
    node_result_filter: Option<&Value>,
    table: &mut ResultTable,
) -> McpResult<()> {
    filter_identifiers(identifier_property, names, table);

    let Some(filter) = present(node_result_filter) else {
        return Ok(());
    };
    let labels: HashSet<String> = as_list(filter)
        .iter()
        .map(|label| {
            label
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| invalid_parameters_error("'nodeResultFilter' must contain label names"))
        })
        .collect::<McpResult<_>>()?;
    let Some(idx) = table.column_index("nodeId") else {
        return Ok(());
    };

    let ids = distinct_ids(table.rows().iter().map(|row| &row[idx]));
    if ids.is_empty() {
        return Ok(());
    }
    let label_table = executor
        .fetch(
            CypherQuery::new(LABELS_BY_ID)
                .param("nodeIds", ids)
                .returns(["nodeId", "labels"]),
        )
        .await?;

    let keep: HashSet<i64> = label_table
        .rows()
        .iter()
        .filter(|row| {
            row[1]
                .as_array()
                .map(|node_labels| node_labels.iter().any(|l| l.as_str().is_some_and(|l| labels.contains(l))))
                .unwrap_or(false)
        })
        .filter_map(|row| row[0].as_i64())
        .collect();

    table.retain_rows(|row| row[idx].as_i64().is_some_and(|id| keep.contains(&id)));
    Ok(())
}
