//! Node discovery for `--select-node` and `--node`.

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::application::ports::ClusterGateway;
use crate::domain::labels::Labels;
use crate::domain::node::{ClusterNode, NodeList, NodeObject, filter_node_labels, worker_nodes};

/// Schedulable (non control-plane) nodes, aged relative to `now`.
///
/// # Errors
///
/// Returns the gateway error if the query fails or cannot be parsed.
pub async fn list_worker_nodes(
    gateway: &impl ClusterGateway,
    now: DateTime<Utc>,
) -> Result<Vec<ClusterNode>> {
    let list: NodeList = gateway.query(&["get", "nodes", "-o", "json"]).await?;
    Ok(worker_nodes(list, now))
}

/// Labels of `node_name` minus the ignored keys and key prefixes.
///
/// # Errors
///
/// Returns the gateway error if the node does not exist or cannot be parsed.
pub async fn node_labels(
    gateway: &impl ClusterGateway,
    node_name: &str,
    ignored: &[&str],
    ignored_prefixes: &[&str],
) -> Result<Labels> {
    let node: NodeObject = gateway
        .query(&["get", "node", node_name, "-o", "json"])
        .await?;
    Ok(filter_node_labels(node.metadata.labels, ignored, ignored_prefixes))
}
