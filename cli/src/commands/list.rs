//! List command: show testpods in the current namespace.

use anyhow::Result;
use clap::Args;

use crate::application::ports::ClusterGateway;
use crate::application::services::list::list_pods;
use crate::domain::labels::PodSelector;

/// Arguments for the list command.
#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Include testpods created from other hosts
    #[arg(long)]
    pub all: bool,
}

/// Entry point for `testpod list`.
///
/// # Errors
///
/// Returns an error if `kubectl get pods` fails.
pub async fn run(args: &ListArgs, managed_by: &str, gateway: &impl ClusterGateway) -> Result<()> {
    let selector = PodSelector::testpods((!args.all).then_some(managed_by));
    list_pods(gateway, &selector).await
}
