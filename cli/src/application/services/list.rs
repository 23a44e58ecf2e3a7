//! `kubectl get pods` for testpods, printed as kubectl renders it.

use anyhow::Result;

use crate::application::ports::{ClusterGateway, Invocation};
use crate::domain::labels::{LABEL_MANAGED_BY, PodSelector};

/// Print the pods matching `selector` with a `MANAGED-BY` column.
///
/// # Errors
///
/// Returns the gateway error if `kubectl get pods` fails.
pub async fn list_pods(gateway: &impl ClusterGateway, selector: &PodSelector) -> Result<()> {
    let selector_args = selector.to_args();
    let mut args = vec!["get", "pods", "-L", LABEL_MANAGED_BY];
    args.extend(selector_args.iter().map(String::as_str));
    gateway.run(&Invocation::normal(&args)).await?;
    Ok(())
}
