//! Attach to an already running testpod.

use anyhow::Result;

use crate::application::ports::{ClusterGateway, ProgressReporter};
use crate::application::services::lifecycle::attach;
use crate::domain::labels::PodSelector;
use crate::domain::selection::{PodList, select_single};

/// Names of the pods matching `selector`.
///
/// # Errors
///
/// Returns the gateway error if the query fails or its output is not a pod list.
pub async fn matching_pods(
    gateway: &impl ClusterGateway,
    selector: &PodSelector,
) -> Result<Vec<String>> {
    let selector_args = selector.to_args();
    let mut args = vec!["get", "pods", "-o", "json"];
    args.extend(selector_args.iter().map(String::as_str));
    let list: PodList = gateway.query(&args).await?;
    Ok(list.names())
}

/// Find exactly one pod matching `selector` and open `shell` in it.
///
/// Nothing is deleted afterwards; the pod belongs to the run that created it.
///
/// # Errors
///
/// `SelectionError::NotFound` or `SelectionError::Ambiguous` when the match
/// count is not one, otherwise the gateway error.
pub async fn enter_pod(
    gateway: &impl ClusterGateway,
    reporter: &impl ProgressReporter,
    selector: &PodSelector,
    shell: &str,
) -> Result<()> {
    let name = select_single(matching_pods(gateway, selector).await?, selector)?;
    reporter.success(&format!("entering pod {name}"));
    attach(gateway, reporter, &name, shell).await
}
