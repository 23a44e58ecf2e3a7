//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::process::{ExitStatus, Output};
use std::time::Duration;

use anyhow::Result;
use serde::de::DeserializeOwned;

use crate::domain::error::{ToolError, ValidationError};
use crate::domain::template::Template;

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Extra environment for one child process, as `(name, value)` pairs.
pub type EnvVars = [(String, String)];

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[String], env: &EnvVars) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[String],
        env: &EnvVars,
        timeout: Duration,
    ) -> Result<Output>;
    /// Run a program with stdin piped from `stdin`.
    async fn run_with_stdin(
        &self,
        program: &str,
        args: &[String],
        env: &EnvVars,
        stdin: &[u8],
    ) -> Result<Output>;
    /// Run a program with inherited stdio (interactive pass-through) and
    /// return only its exit status. No timeout.
    async fn run_status(&self, program: &str, args: &[String], env: &EnvVars)
    -> Result<ExitStatus>;
    /// Run a program to completion on the calling thread.
    ///
    /// Used from `Drop` where no runtime can be awaited.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned.
    fn run_blocking(&self, program: &str, args: &[String], env: &EnvVars) -> Result<Output>;
}

// ── Cluster Gateway Port ──────────────────────────────────────────────────────

/// The cluster command-line tool every gateway drives.
pub const CLUSTER_TOOL: &str = "kubectl";

/// How a gateway call treats the child's streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationMode {
    /// Capture combined output and echo it, trimmed.
    Normal,
    /// Capture combined output without echoing.
    Silent,
    /// Hand the caller's terminal to the child and block until it exits.
    Interactive,
    /// Capture stdout silently for deserialization.
    Structured,
}

/// One call of the cluster command-line tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub args: Vec<String>,
    pub mode: InvocationMode,
    pub stdin: Option<String>,
}

impl Invocation {
    fn with_mode<S: AsRef<str>>(args: &[S], mode: InvocationMode) -> Self {
        Self {
            args: args.iter().map(|a| a.as_ref().to_string()).collect(),
            mode,
            stdin: None,
        }
    }

    #[must_use]
    pub fn normal<S: AsRef<str>>(args: &[S]) -> Self {
        Self::with_mode(args, InvocationMode::Normal)
    }

    #[must_use]
    pub fn silent<S: AsRef<str>>(args: &[S]) -> Self {
        Self::with_mode(args, InvocationMode::Silent)
    }

    #[must_use]
    pub fn interactive<S: AsRef<str>>(args: &[S]) -> Self {
        Self::with_mode(args, InvocationMode::Interactive)
    }

    #[must_use]
    pub fn structured<S: AsRef<str>>(args: &[S]) -> Self {
        Self::with_mode(args, InvocationMode::Structured)
    }

    /// Feed `input` to the child's stdin.
    #[must_use]
    pub fn with_stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    /// Reject combinations that cannot be honoured.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::StdinWithInteractive`] when stdin is supplied
    /// for an interactive call; the terminal is already the child's stdin.
    pub fn validate(&self) -> Result<()> {
        if self.mode == InvocationMode::Interactive && self.stdin.is_some() {
            return Err(ValidationError::StdinWithInteractive.into());
        }
        Ok(())
    }

    /// Short human label such as `kubectl get nodes`, used in error messages.
    #[must_use]
    pub fn describe(&self, program: &str) -> String {
        let verb: Vec<&str> = self
            .args
            .iter()
            .take_while(|a| !a.starts_with('-'))
            .take(2)
            .map(String::as_str)
            .collect();
        if verb.is_empty() {
            program.to_string()
        } else {
            format!("{program} {}", verb.join(" "))
        }
    }
}

/// The only boundary to the cluster.
#[allow(async_fn_in_trait)]
pub trait ClusterGateway {
    /// Run one invocation and return its captured output.
    ///
    /// Interactive invocations return an empty string.
    ///
    /// # Errors
    ///
    /// Validation errors before spawning; `ToolError::Unavailable` when the
    /// tool cannot be started; `ToolError::Failed` on a non-zero exit.
    async fn run(&self, invocation: &Invocation) -> Result<String>;

    /// Same as [`ClusterGateway::run`] but synchronous, for drop-time cleanup.
    ///
    /// # Errors
    ///
    /// Same as [`ClusterGateway::run`].
    fn run_blocking(&self, invocation: &Invocation) -> Result<String>;

    /// Run a structured query and deserialize its JSON output into `T`.
    ///
    /// # Errors
    ///
    /// Execution errors as for `run`; `ToolError::Parse` when the output does
    /// not match `T`.
    async fn query<T: DeserializeOwned>(&self, args: &[&str]) -> Result<T> {
        let invocation = Invocation::structured(args);
        let raw = self.run(&invocation).await?;
        serde_json::from_str(&raw).map_err(|source| {
            ToolError::Parse {
                command: invocation.describe(CLUSTER_TOOL),
                source,
            }
            .into()
        })
    }
}

// ── Template Store Port ───────────────────────────────────────────────────────

/// Abstracts pod template persistence so commands can be tested without disk.
pub trait TemplateStore {
    /// Load the template, writing the default first if none exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or created.
    fn load_or_init(&self) -> Result<Template>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait, no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}
