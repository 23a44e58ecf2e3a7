//! Run command: create a disposable pod, attach to it, and delete it.

use std::future::Future;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime, Utc};
use clap::Args;

use crate::application::ports::{ClusterGateway, ProgressReporter, TemplateStore};
use crate::application::services::lifecycle::{PodRequest, run_pod};
use crate::application::services::nodes::{list_worker_nodes, node_labels};
use crate::domain::labels::{Labels, parse_labels};
use crate::domain::node::{
    ClusterNode, DEFAULT_IGNORED_NODE_LABEL_PREFIXES, DEFAULT_IGNORED_NODE_LABELS,
};
use crate::domain::{Template, TemplateOverrides, build_manifest, synthesize_pod_name};
use crate::output::OutputContext;

/// Arguments for the run command.
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Container image (default from template)
    #[arg(long)]
    pub image: Option<String>,

    /// Shell to start in the pod (default from template)
    #[arg(long)]
    pub shell: Option<String>,

    /// Extra pod label, repeatable
    #[arg(short = 'l', long = "label", value_name = "KEY=VALUE")]
    pub labels: Vec<String>,

    /// Schedule the pod onto this node
    #[arg(long, value_name = "NAME", conflicts_with = "select_node")]
    pub node: Option<String>,

    /// Pick the node interactively
    #[arg(long)]
    pub select_node: bool,

    /// Print the manifest instead of creating anything
    #[arg(long)]
    pub dry_run: bool,
}

impl RunArgs {
    /// Whether this invocation has to talk to the cluster at all.
    #[must_use]
    pub fn needs_cluster(&self) -> bool {
        !self.dry_run || self.node.is_some() || self.select_node
    }
}

/// Load the template and apply the command-line overrides.
///
/// # Errors
///
/// Returns an error for malformed or reserved labels, or if the template
/// cannot be loaded.
pub fn resolve_template(args: &RunArgs, store: &impl TemplateStore) -> Result<Template> {
    let labels = parse_labels(&args.labels)?;
    store.load_or_init()?.with_overrides(TemplateOverrides {
        image: args.image.clone(),
        shell: args.shell.clone(),
        labels,
    })
}

/// Build the pod request for one run.
///
/// # Errors
///
/// Returns an error if the manifest cannot be rendered.
pub fn prepare(
    managed_by: &str,
    now: NaiveDateTime,
    node_labels: &Labels,
    template: &Template,
) -> Result<PodRequest> {
    let name = synthesize_pod_name(managed_by, now);
    let manifest = build_manifest(managed_by, &name, node_labels, template)?;
    Ok(PodRequest {
        name,
        manifest,
        shell: template.default_shell.clone(),
        network_policy: template.network_policy.create_allow_all,
    })
}

/// `--dry-run` without any node constraint: render and print, no cluster.
///
/// # Errors
///
/// Returns an error if the template or manifest cannot be produced.
pub fn dry_run(args: &RunArgs, store: &impl TemplateStore, managed_by: &str) -> Result<()> {
    let template = resolve_template(args, store)?;
    let request = prepare(managed_by, Local::now().naive_local(), &Labels::new(), &template)?;
    print!("{}", request.manifest);
    Ok(())
}

fn pick_node(nodes: &[ClusterNode]) -> Result<String> {
    anyhow::ensure!(!nodes.is_empty(), "no schedulable worker nodes found");
    let items: Vec<String> = nodes.iter().map(ClusterNode::display_line).collect();
    let idx = dialoguer::Select::new()
        .with_prompt("Select node")
        .items(&items)
        .default(0)
        .interact()
        .context("node selection")?;
    Ok(nodes[idx].name.clone())
}

async fn target_node(args: &RunArgs, gateway: &impl ClusterGateway) -> Result<Option<String>> {
    if let Some(node) = args.node.as_deref().filter(|n| !n.is_empty()) {
        return Ok(Some(node.to_string()));
    }
    if args.select_node {
        let nodes = list_worker_nodes(gateway, Utc::now()).await?;
        return pick_node(&nodes).map(Some);
    }
    Ok(None)
}

/// Entry point for `testpod run`.
///
/// # Errors
///
/// Returns an error if validation, node lookup, or any lifecycle step fails.
pub async fn run(
    ctx: &OutputContext,
    reporter: &impl ProgressReporter,
    args: &RunArgs,
    store: &impl TemplateStore,
    managed_by: &str,
    gateway: &impl ClusterGateway,
    interrupt: impl Future<Output = ()>,
) -> Result<()> {
    let template = resolve_template(args, store)?;

    let constraints = match target_node(args, gateway).await? {
        Some(node) => {
            if !args.dry_run {
                ctx.kv("node", &node);
            }
            node_labels(
                gateway,
                &node,
                DEFAULT_IGNORED_NODE_LABELS,
                DEFAULT_IGNORED_NODE_LABEL_PREFIXES,
            )
            .await?
        }
        None => Labels::new(),
    };

    let request = prepare(managed_by, Local::now().naive_local(), &constraints, &template)?;
    if args.dry_run {
        print!("{}", request.manifest);
        return Ok(());
    }

    ctx.kv("pod", &request.name);
    ctx.kv("image", &template.default_image);
    run_pod(gateway, reporter, &request, interrupt).await
}
