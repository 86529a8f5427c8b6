//! Graph Data Science access layer: Cypher execution, schema introspection,
//! projections and id translation.

pub mod bolt;
pub mod client;
pub mod projection;
pub mod schema;
pub mod table;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod translate;

pub use client::{CypherExecutor, CypherQuery, Neo4jClient, OfflineExecutor};
pub use projection::{ProjectedGraph, ProjectionParams};
pub use schema::PropertyType;
pub use table::ResultTable;
