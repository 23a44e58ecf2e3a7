//! Application context: unified state passed to every command handler.
//!
//! `AppContext` holds what every command needs (output styling and the
//! managed-by identity). Cluster access is opened separately with
//! [`AppContext::open_cluster`] so commands that never reach the cluster do
//! not need a kubeconfig.

use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::Result;

use crate::application::ports::ProgressReporter;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::host::local_hostname;
use crate::infra::kubeconfig::{ScopedKubeconfig, locate};
use crate::infra::kubectl::Kubectl;
use crate::output::{OutputContext, TerminalReporter};

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
}

/// Cluster credential flags.
pub struct ClusterFlags {
    /// `--kubeconfig` value, possibly a path list from `$KUBECONFIG`.
    pub kubeconfig: Option<OsString>,
    /// Use the kubeconfig in place instead of a scoped copy.
    pub no_temp_kubeconfig: bool,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    pub output: OutputFlags,
    pub cluster: ClusterFlags,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Identity written to `app.kubernetes.io/managed-by`: the local hostname.
    pub managed_by: String,
    cluster: ClusterFlags,
}

/// An open cluster connection: the gateway plus the credential scope it uses.
pub struct ClusterSession {
    pub gateway: Kubectl<TokioCommandRunner>,
    scope: Option<ScopedKubeconfig>,
}

impl ClusterSession {
    /// Remove the scoped kubeconfig, if any. Failure is only a warning.
    pub fn close(self, reporter: &impl ProgressReporter) {
        if let Some(scope) = self.scope {
            scope.close(reporter);
        }
    }
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the local hostname cannot be determined.
    pub fn new(flags: AppFlags) -> Result<Self> {
        Ok(Self {
            output: OutputContext::new(flags.output.no_color, flags.output.quiet),
            managed_by: local_hostname()?,
            cluster: flags.cluster,
        })
    }

    /// Progress reporter bound to this context's output.
    #[must_use]
    pub fn reporter(&self) -> TerminalReporter<'_> {
        TerminalReporter::new(&self.output)
    }

    /// Prepare cluster access.
    ///
    /// Unless `--no-temp-kubeconfig` was given, the kubeconfig is copied into
    /// a private temporary file that every `kubectl` call then uses.
    ///
    /// # Errors
    ///
    /// Returns a `CredentialError` if no kubeconfig is found or it cannot be
    /// copied.
    pub fn open_cluster(&self) -> Result<ClusterSession> {
        let echo = !self.output.quiet;
        let runner = TokioCommandRunner::default();

        if self.cluster.no_temp_kubeconfig {
            let kubeconfig = self
                .cluster
                .kubeconfig
                .as_ref()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from);
            return Ok(ClusterSession {
                gateway: Kubectl::new(runner, kubeconfig, echo),
                scope: None,
            });
        }

        let source = locate(
            self.cluster.kubeconfig.as_deref(),
            dirs::home_dir().as_deref(),
        )?;
        let scope = ScopedKubeconfig::create(&source)?;
        Ok(ClusterSession {
            gateway: Kubectl::new(runner, Some(scope.path().to_path_buf()), echo),
            scope: Some(scope),
        })
    }
}
