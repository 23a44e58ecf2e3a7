//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator, so callers can `downcast_ref` them back out.

use std::path::PathBuf;

use thiserror::Error;

// ── Validation errors ─────────────────────────────────────────────────────────

/// Bad caller input, rejected before anything touches the cluster.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Pod name cannot be empty.")]
    EmptyName,

    #[error("Label '{0}' is reserved for pod identity and cannot be overridden.")]
    ReservedLabel(String),

    #[error("Invalid label '{0}': expected key=value with a non-empty key.")]
    MalformedLabel(String),

    #[error("Cannot pass stdin to an interactive command.")]
    StdinWithInteractive,
}

// ── Selection errors ──────────────────────────────────────────────────────────

/// Cardinality violations when exactly one pod is required.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("No testpod found matching {selector}. Start one with: testpod run")]
    NotFound { selector: String },

    #[error("{} testpods match {selector}, expected exactly one: {}", .candidates.len(), .candidates.join(", "))]
    Ambiguous {
        selector: String,
        candidates: Vec<String>,
    },
}

// ── External tool errors ──────────────────────────────────────────────────────

/// Failures of the cluster command-line tool.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("'{command}' exited with {status}{}", format_output(.output))]
    Failed {
        command: String,
        status: String,
        output: String,
    },

    /// An interactive session ended with a non-zero exit code.
    #[error("'{command}' exited with code {code}")]
    Exited { command: String, code: i32 },

    #[error("cannot run {program}: {reason}. Is it installed and on PATH?")]
    Unavailable { program: String, reason: String },

    #[error("unexpected output from '{command}': {source}")]
    Parse {
        command: String,
        #[source]
        source: serde_json::Error,
    },
}

fn format_output(output: &str) -> String {
    if output.is_empty() {
        String::new()
    } else {
        format!(":\n{output}")
    }
}

// ── Credential errors ─────────────────────────────────────────────────────────

/// Failures while preparing the scoped kubeconfig copy.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("No local kubeconfig file found. Try using the --no-temp-kubeconfig flag.")]
    NotFound,

    #[error("cannot {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ── Lifecycle errors ──────────────────────────────────────────────────────────

/// Orchestration outcomes that are not tool failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("Interrupted while pod '{0}' was active. Cleanup was requested.")]
    Interrupted(String),
}
