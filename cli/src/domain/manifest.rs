//! Pod and `NetworkPolicy` manifest rendering.
//!
//! The output is handed unmodified to `kubectl apply -f -`.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::domain::error::ValidationError;
use crate::domain::labels::{Labels, identity_labels};
use crate::domain::template::Template;

/// Name of the single container in every pod.
pub const CONTAINER_NAME: &str = "main";

/// Pods are throwaway; deleting one should not wait on the default 30s.
pub const TERMINATION_GRACE_PERIOD_SECONDS: u32 = 1;

/// Separator between documents in a multi-resource manifest.
pub const DOCUMENT_SEPARATOR: &str = "---\n";

// ── Pod ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PodManifest<'a> {
    api_version: &'static str,
    kind: &'static str,
    metadata: Metadata<'a>,
    spec: PodSpec<'a>,
}

#[derive(Debug, Serialize)]
struct Metadata<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Labels::is_empty")]
    labels: Labels,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PodSpec<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    affinity: Option<Affinity>,
    termination_grace_period_seconds: u32,
    containers: Vec<Container<'a>>,
}

#[derive(Debug, Serialize)]
struct Container<'a> {
    name: &'static str,
    image: &'a str,
    command: &'a [String],
    args: &'a [String],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Affinity {
    node_affinity: NodeAffinity,
}

#[derive(Debug, Serialize)]
struct NodeAffinity {
    #[serde(rename = "requiredDuringSchedulingIgnoredDuringExecution")]
    required: NodeSelector,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NodeSelector {
    node_selector_terms: Vec<NodeSelectorTerm>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NodeSelectorTerm {
    match_expressions: Vec<MatchExpression>,
}

#[derive(Debug, Serialize)]
struct MatchExpression {
    key: String,
    operator: &'static str,
    values: Vec<String>,
}

/// One OR-group whose AND'ed terms pin the pod to nodes carrying every label.
fn node_affinity(node_labels: &Labels) -> Option<Affinity> {
    if node_labels.is_empty() {
        return None;
    }
    let match_expressions = node_labels
        .iter()
        .map(|(key, value)| MatchExpression {
            key: key.clone(),
            operator: "In",
            values: vec![value.clone()],
        })
        .collect();
    Some(Affinity {
        node_affinity: NodeAffinity {
            required: NodeSelector {
                node_selector_terms: vec![NodeSelectorTerm { match_expressions }],
            },
        },
    })
}

// ── NetworkPolicy ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NetworkPolicyManifest<'a> {
    api_version: &'static str,
    kind: &'static str,
    metadata: Metadata<'a>,
    spec: NetworkPolicySpec,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NetworkPolicySpec {
    pod_selector: PodSelectorBlock,
    policy_types: Vec<&'static str>,
    egress: Vec<EgressRule>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PodSelectorBlock {
    match_labels: Labels,
}

#[derive(Debug, Serialize)]
struct EgressRule {
    ports: Vec<PortRange>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PortRange {
    protocol: &'static str,
    port: u16,
    end_port: u16,
}

fn allow_all_egress() -> Vec<EgressRule> {
    let ports = ["TCP", "UDP", "SCTP"]
        .into_iter()
        .map(|protocol| PortRange {
            protocol,
            port: 1,
            end_port: u16::MAX,
        })
        .collect();
    vec![EgressRule { ports }]
}

// ── Builder ──────────────────────────────────────────────────────────────────

/// Render the manifest for one pod and, if the template asks for it, its
/// allow-all-egress `NetworkPolicy` as a second `---` separated document.
///
/// `node_labels` become required node affinity; pass an empty map to let the
/// scheduler choose freely. Template labels are overlaid on the identity
/// labels without re-checking them; callers reject identity keys upstream
/// (see [`Template::with_overrides`]).
///
/// # Errors
///
/// Returns [`ValidationError::EmptyName`] if `name` is empty, or an error if
/// YAML serialization fails.
pub fn build_manifest(
    managed_by: &str,
    name: &str,
    node_labels: &Labels,
    template: &Template,
) -> Result<String> {
    if name.is_empty() {
        return Err(ValidationError::EmptyName.into());
    }

    let identity = identity_labels(name, managed_by);
    let mut pod_labels = identity.clone();
    pod_labels.extend(
        template
            .pod
            .additional_labels
            .iter()
            .map(|(k, v)| (k.clone(), v.clone())),
    );

    let pod = PodManifest {
        api_version: "v1",
        kind: "Pod",
        metadata: Metadata {
            name,
            labels: pod_labels,
        },
        spec: PodSpec {
            affinity: node_affinity(node_labels),
            termination_grace_period_seconds: TERMINATION_GRACE_PERIOD_SECONDS,
            containers: vec![Container {
                name: CONTAINER_NAME,
                image: &template.default_image,
                command: &template.pod.command,
                args: &template.pod.args,
            }],
        },
    };
    let mut manifest = serde_yaml::to_string(&pod).context("cannot serialize pod manifest")?;

    if template.network_policy.create_allow_all {
        let policy = NetworkPolicyManifest {
            api_version: "networking.k8s.io/v1",
            kind: "NetworkPolicy",
            metadata: Metadata {
                name,
                labels: Labels::new(),
            },
            spec: NetworkPolicySpec {
                pod_selector: PodSelectorBlock {
                    match_labels: identity,
                },
                policy_types: vec!["Egress"],
                egress: allow_all_egress(),
            },
        };
        let policy_yaml = serde_yaml::to_string(&policy)
            .context("cannot serialize network policy manifest")?;
        manifest.push_str(DOCUMENT_SEPARATOR);
        manifest.push_str(&policy_yaml);
    }

    Ok(manifest)
}
