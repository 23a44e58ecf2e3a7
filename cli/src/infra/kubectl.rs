//! Production `ClusterGateway`: drives the `kubectl` binary through a
//! [`CommandRunner`].
//!
//! The active kubeconfig is a constructor value and reaches the child only
//! through its environment. Nothing here touches the process environment.

use std::path::{Path, PathBuf};
use std::process::Output;

use anyhow::Result;

use crate::application::ports::{
    CLUSTER_TOOL, ClusterGateway, CommandRunner, Invocation, InvocationMode,
};
use crate::domain::error::ToolError;

/// Environment variable kubectl reads its credentials path from.
pub const KUBECONFIG_ENV: &str = "KUBECONFIG";

/// `kubectl` behind the [`ClusterGateway`] port.
pub struct Kubectl<R: CommandRunner> {
    runner: R,
    kubeconfig: Option<PathBuf>,
    echo: bool,
}

impl<R: CommandRunner> Kubectl<R> {
    /// `kubeconfig`, when set, is exported as `KUBECONFIG` to every call.
    /// `echo` controls whether `Normal` invocations print their output.
    #[must_use]
    pub fn new(runner: R, kubeconfig: Option<PathBuf>, echo: bool) -> Self {
        Self {
            runner,
            kubeconfig,
            echo,
        }
    }

    #[must_use]
    pub fn runner(&self) -> &R {
        &self.runner
    }

    #[must_use]
    pub fn kubeconfig(&self) -> Option<&Path> {
        self.kubeconfig.as_deref()
    }

    fn env(&self) -> Vec<(String, String)> {
        self.kubeconfig
            .iter()
            .map(|p| (KUBECONFIG_ENV.to_string(), p.to_string_lossy().into_owned()))
            .collect()
    }

    fn finish(&self, invocation: &Invocation, output: &Output) -> Result<String> {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let combined = format!("{stdout}{stderr}").trim().to_string();

        if !output.status.success() {
            return Err(ToolError::Failed {
                command: invocation.describe(CLUSTER_TOOL),
                status: output.status.to_string(),
                output: combined,
            }
            .into());
        }

        match invocation.mode {
            // stderr carries deprecation warnings that would break JSON.
            InvocationMode::Structured => Ok(stdout.into_owned()),
            InvocationMode::Normal => {
                if self.echo && !combined.is_empty() {
                    println!("{combined}");
                }
                Ok(combined)
            }
            InvocationMode::Silent | InvocationMode::Interactive => Ok(combined),
        }
    }
}

/// Spawn failures mean the tool is missing; anything else keeps its context.
fn spawn_error(err: anyhow::Error, invocation: &Invocation) -> anyhow::Error {
    match err.downcast_ref::<std::io::Error>() {
        Some(io) => ToolError::Unavailable {
            program: CLUSTER_TOOL.to_string(),
            reason: io.to_string(),
        }
        .into(),
        None => err.context(invocation.describe(CLUSTER_TOOL)),
    }
}

impl<R: CommandRunner> ClusterGateway for Kubectl<R> {
    async fn run(&self, invocation: &Invocation) -> Result<String> {
        invocation.validate()?;
        let env = self.env();
        tracing::debug!(args = ?invocation.args, mode = ?invocation.mode, "running kubectl");

        if invocation.mode == InvocationMode::Interactive {
            let status = self
                .runner
                .run_status(CLUSTER_TOOL, &invocation.args, &env)
                .await
                .map_err(|e| spawn_error(e, invocation))?;
            tracing::debug!(%status, "interactive kubectl exited");
            if !status.success() {
                let command = invocation.describe(CLUSTER_TOOL);
                return Err(match status.code() {
                    Some(code) => ToolError::Exited { command, code },
                    None => ToolError::Failed {
                        command,
                        status: status.to_string(),
                        output: String::new(),
                    },
                }
                .into());
            }
            return Ok(String::new());
        }

        let output = match &invocation.stdin {
            Some(input) => {
                self.runner
                    .run_with_stdin(CLUSTER_TOOL, &invocation.args, &env, input.as_bytes())
                    .await
            }
            None => self.runner.run(CLUSTER_TOOL, &invocation.args, &env).await,
        }
        .map_err(|e| spawn_error(e, invocation))?;
        tracing::debug!(status = %output.status, "kubectl exited");
        self.finish(invocation, &output)
    }

    fn run_blocking(&self, invocation: &Invocation) -> Result<String> {
        invocation.validate()?;
        if invocation.mode == InvocationMode::Interactive || invocation.stdin.is_some() {
            anyhow::bail!(
                "'{}' cannot run without a runtime",
                invocation.describe(CLUSTER_TOOL)
            );
        }
        tracing::debug!(args = ?invocation.args, "running kubectl (blocking)");
        let output = self
            .runner
            .run_blocking(CLUSTER_TOOL, &invocation.args, &self.env())
            .map_err(|e| spawn_error(e, invocation))?;
        self.finish(invocation, &output)
    }
}
