//! Cluster node types and the pure parts of node selection.
//!
//! The serde shapes cover only the fields of `kubectl get node(s) -o json`
//! that this tool reads; everything else is ignored.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::labels::Labels;

/// Taint key that marks control-plane nodes.
pub const CONTROL_PLANE_TAINT: &str = "node-role.kubernetes.io/control-plane";

/// Node label keys (exact) that would over-constrain scheduling if copied
/// into the pod's node affinity.
pub const DEFAULT_IGNORED_NODE_LABELS: &[&str] = &[
    "kubernetes.io/arch",
    "kubernetes.io/os",
    "beta.kubernetes.io/arch",
    "beta.kubernetes.io/os",
    "beta.kubernetes.io/instance-type",
    "node.kubernetes.io/instance-type",
    "topology.kubernetes.io/region",
    "topology.kubernetes.io/zone",
    "failure-domain.beta.kubernetes.io/region",
    "failure-domain.beta.kubernetes.io/zone",
];

/// Node label key prefixes dropped for the same reason.
pub const DEFAULT_IGNORED_NODE_LABEL_PREFIXES: &[&str] = &["node-role.kubernetes.io/"];

// ── kubectl JSON shapes ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NodeList {
    #[serde(default)]
    pub items: Vec<NodeObject>,
}

#[derive(Debug, Deserialize)]
pub struct NodeObject {
    pub metadata: NodeMetadata,
    #[serde(default)]
    pub spec: NodeSpec,
    #[serde(default)]
    pub status: NodeStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetadata {
    pub name: String,
    pub creation_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub labels: Labels,
}

#[derive(Debug, Default, Deserialize)]
pub struct NodeSpec {
    #[serde(default)]
    pub taints: Vec<Taint>,
}

#[derive(Debug, Deserialize)]
pub struct Taint {
    pub key: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStatus {
    #[serde(default)]
    pub node_info: NodeInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    #[serde(default)]
    pub kubelet_version: String,
}

impl NodeObject {
    #[must_use]
    pub fn is_control_plane(&self) -> bool {
        self.spec.taints.iter().any(|t| t.key == CONTROL_PLANE_TAINT)
    }
}

// ── Domain type ──────────────────────────────────────────────────────────────

/// A schedulable node as shown in the node picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterNode {
    pub name: String,
    pub age: Duration,
    pub version: String,
}

impl ClusterNode {
    /// One-line summary for the interactive picker.
    #[must_use]
    pub fn display_line(&self) -> String {
        format!(
            "{:<40} {:>5}  {}",
            self.name,
            format_age(self.age),
            self.version
        )
    }
}

/// Keep only worker nodes and compute their age relative to `now`.
///
/// Nodes without a creation timestamp, or created "in the future" because of
/// clock skew, get an age of zero.
#[must_use]
pub fn worker_nodes(list: NodeList, now: DateTime<Utc>) -> Vec<ClusterNode> {
    list.items
        .into_iter()
        .filter(|node| !node.is_control_plane())
        .map(|node| {
            let age = node
                .metadata
                .creation_timestamp
                .and_then(|created| (now - created).to_std().ok())
                .unwrap_or_default();
            ClusterNode {
                name: node.metadata.name,
                age,
                version: node.status.node_info.kubelet_version,
            }
        })
        .collect()
}

/// Remove ignored keys from a node's labels.
#[must_use]
pub fn filter_node_labels(labels: Labels, ignored: &[&str], ignored_prefixes: &[&str]) -> Labels {
    labels
        .into_iter()
        .filter(|(key, _)| {
            !ignored.contains(&key.as_str())
                && !ignored_prefixes.iter().any(|p| key.starts_with(p))
        })
        .collect()
}

/// Render an age like `kubectl get` does: `3d`, `5h`, `12m`, `40s`.
#[must_use]
pub fn format_age(age: Duration) -> String {
    const MINUTE: u64 = 60;
    const HOUR: u64 = 60 * MINUTE;
    const DAY: u64 = 24 * HOUR;

    let secs = age.as_secs();
    if secs > DAY {
        format!("{}d", secs / DAY)
    } else if secs >= HOUR {
        format!("{}h", secs / HOUR)
    } else if secs >= MINUTE {
        format!("{}m", secs / MINUTE)
    } else {
        format!("{secs}s")
    }
}
