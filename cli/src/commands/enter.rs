//! Enter command: open a shell in an existing testpod.

use anyhow::Result;
use clap::Args;

use crate::application::ports::{ClusterGateway, ProgressReporter, TemplateStore};
use crate::application::services::enter::enter_pod;
use crate::domain::labels::PodSelector;

/// Arguments for the enter command.
#[derive(Args, Debug, Default)]
pub struct EnterArgs {
    /// Consider testpods created from any host, not just this one
    #[arg(long)]
    pub all: bool,

    /// Shell to start (default from template)
    #[arg(long)]
    pub shell: Option<String>,
}

/// Entry point for `testpod enter`.
///
/// # Errors
///
/// Returns an error if the template cannot be loaded, no single pod matches,
/// or the exec session fails.
pub async fn run(
    reporter: &impl ProgressReporter,
    args: &EnterArgs,
    store: &impl TemplateStore,
    managed_by: &str,
    gateway: &impl ClusterGateway,
) -> Result<()> {
    let shell = match args.shell.as_deref().filter(|s| !s.is_empty()) {
        Some(shell) => shell.to_string(),
        None => store.load_or_init()?.default_shell,
    };
    let selector = PodSelector::testpods((!args.all).then_some(managed_by));
    enter_pod(gateway, reporter, &selector, &shell).await
}
