//! Pod lifecycle: apply, wait for readiness, attach, and guaranteed teardown.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::future::Future;

use anyhow::Result;

use crate::application::ports::{ClusterGateway, Invocation, ProgressReporter};
use crate::domain::error::{LifecycleError, ToolError};

/// Server-side readiness timeout passed to `kubectl wait`.
pub const READY_TIMEOUT: &str = "30s";

/// Exit codes meaning the shell itself could not be started.
const SHELL_NOT_STARTED: [i32; 2] = [126, 127];

/// Cluster resources created per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Pod,
    NetworkPolicy,
}

impl ResourceKind {
    /// Resource name as kubectl accepts it.
    #[must_use]
    pub fn kubectl_name(self) -> &'static str {
        match self {
            Self::Pod => "pod",
            Self::NetworkPolicy => "netpol",
        }
    }
}

/// Everything needed to run one disposable pod.
#[derive(Debug, Clone)]
pub struct PodRequest {
    pub name: String,
    /// Rendered YAML, applied through stdin.
    pub manifest: String,
    pub shell: String,
    /// Whether the manifest carries a sibling `NetworkPolicy`.
    pub network_policy: bool,
}

/// Deletes the resources of one pod exactly once.
///
/// Armed right after a successful apply. [`Teardown::release`] runs the
/// deletes asynchronously; if the guard is dropped unreleased (cancelled or
/// panicking future), `Drop` issues the same deletes through the blocking
/// gateway call.
pub struct Teardown<'a, G: ClusterGateway, P: ProgressReporter> {
    gateway: &'a G,
    reporter: &'a P,
    name: String,
    pending: Vec<ResourceKind>,
}

impl<'a, G: ClusterGateway, P: ProgressReporter> Teardown<'a, G, P> {
    /// The network policy goes first so the pod never outlives its selector.
    #[must_use]
    pub fn arm(gateway: &'a G, reporter: &'a P, name: &str, network_policy: bool) -> Self {
        let mut pending = Vec::with_capacity(2);
        if network_policy {
            pending.push(ResourceKind::NetworkPolicy);
        }
        pending.push(ResourceKind::Pod);
        Self {
            gateway,
            reporter,
            name: name.to_string(),
            pending,
        }
    }

    fn delete_invocation(&self, kind: ResourceKind) -> Invocation {
        Invocation::silent(&["delete", "--wait=false", kind.kubectl_name(), self.name.as_str()])
    }

    fn report(&self, kind: ResourceKind, result: Result<String>) {
        match result {
            Ok(_) => self
                .reporter
                .success(&format!("deleted {} {}", kind.kubectl_name(), self.name)),
            Err(e) => self.reporter.warn(&format!(
                "failed to delete {} {}: {e}",
                kind.kubectl_name(),
                self.name
            )),
        }
    }

    /// Run all pending deletes. Failures become warnings.
    ///
    /// A kind leaves `pending` only once its delete has returned, so a
    /// release cancelled midway leaves the rest to `Drop`.
    pub async fn release(mut self) {
        while let Some(kind) = self.pending.first().copied() {
            let result = self.gateway.run(&self.delete_invocation(kind)).await;
            self.pending.remove(0);
            self.report(kind, result);
        }
    }
}

impl<G: ClusterGateway, P: ProgressReporter> Drop for Teardown<'_, G, P> {
    fn drop(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        tracing::debug!(pod = %self.name, "teardown guard dropped unreleased");
        for kind in std::mem::take(&mut self.pending) {
            let result = self.gateway.run_blocking(&self.delete_invocation(kind));
            self.report(kind, result);
        }
    }
}

/// Open an interactive shell in `name`.
///
/// A shell that ends with a non-zero code (the last command failed) is only
/// reported as a warning.
///
/// # Errors
///
/// Returns the gateway error if `kubectl exec` fails, or if the shell could
/// not be started (exit code 126 or 127).
pub async fn attach(
    gateway: &impl ClusterGateway,
    reporter: &impl ProgressReporter,
    name: &str,
    shell: &str,
) -> Result<()> {
    let result = gateway
        .run(&Invocation::interactive(&["exec", "-it", name, "--", shell]))
        .await;
    let Err(e) = result else {
        return Ok(());
    };
    match e.downcast_ref::<ToolError>() {
        Some(&ToolError::Exited { code, .. }) if !SHELL_NOT_STARTED.contains(&code) => {
            reporter.warn(&format!("shell in pod {name} exited with code {code}"));
            Ok(())
        }
        _ => Err(e),
    }
}

async fn wait_and_attach(
    gateway: &impl ClusterGateway,
    reporter: &impl ProgressReporter,
    request: &PodRequest,
) -> Result<()> {
    reporter.step(&format!("waiting for pod {} to become ready", request.name));
    let timeout = format!("--timeout={READY_TIMEOUT}");
    let target = format!("pod/{}", request.name);
    gateway
        .run(&Invocation::silent(&[
            "wait",
            "--for=condition=ready",
            timeout.as_str(),
            target.as_str(),
        ]))
        .await?;
    reporter.success(&format!("pod {} is ready", request.name));
    attach(gateway, reporter, &request.name, &request.shell).await
}

/// Create the pod, wait for it, attach, and always delete it afterwards.
///
/// `interrupt` resolving while waiting or attached aborts the session with
/// [`LifecycleError::Interrupted`]; teardown still runs.
///
/// # Errors
///
/// Returns the apply, wait, or exec error, or `Interrupted`. Teardown
/// failures are reported as warnings and never replace the original result.
pub async fn run_pod(
    gateway: &impl ClusterGateway,
    reporter: &impl ProgressReporter,
    request: &PodRequest,
    interrupt: impl Future<Output = ()>,
) -> Result<()> {
    reporter.step(&format!("creating pod {}", request.name));
    gateway
        .run(&Invocation::silent(&["apply", "-f", "-"]).with_stdin(request.manifest.clone()))
        .await?;
    reporter.success(&format!("created pod {}", request.name));

    let teardown = Teardown::arm(gateway, reporter, &request.name, request.network_policy);

    let outcome = tokio::select! {
        result = wait_and_attach(gateway, reporter, request) => result,
        () = interrupt => {
            tracing::debug!(pod = %request.name, "interrupted");
            Err(LifecycleError::Interrupted(request.name.clone()).into())
        }
    };

    teardown.release().await;
    outcome
}
