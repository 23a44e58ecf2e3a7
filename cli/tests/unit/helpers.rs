//! Shared test helpers: exit statuses and output constructors.

#![allow(dead_code)]

use std::process::{ExitStatus, Output};

// ── Cross-platform ExitStatus construction ───────────────────────────────────

/// Build an `ExitStatus` from a logical exit code (0 = success, non-zero = failure).
///
/// On Unix the raw wait-status encodes the exit code in bits 8–15, so we shift.
/// On Windows `ExitStatusExt::from_raw` takes the exit code directly.
#[cfg(unix)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    #[allow(clippy::cast_sign_loss)]
    ExitStatus::from_raw(code as u32)
}

// ── Output constructors ──────────────────────────────────────────────────────

pub fn ok_output(stdout: &[u8]) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.to_vec(),
        stderr: Vec::new(),
    }
}

pub fn ok_output_with_stderr(stdout: &[u8], stderr: &[u8]) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.to_vec(),
        stderr: stderr.to_vec(),
    }
}

pub fn err_output(code: i32, stderr: &[u8]) -> Output {
    Output {
        status: exit_status(code),
        stdout: Vec::new(),
        stderr: stderr.to_vec(),
    }
}

/// `kubectl get nodes -o json` with one control-plane node and two workers.
pub const NODES_JSON: &str = r#"{
    "apiVersion": "v1",
    "kind": "List",
    "items": [
        {
            "metadata": {"name": "cp-1", "creationTimestamp": "2024-01-01T00:00:00Z"},
            "spec": {"taints": [{"key": "node-role.kubernetes.io/control-plane", "effect": "NoSchedule"}]},
            "status": {"nodeInfo": {"kubeletVersion": "v1.31.0"}}
        },
        {
            "metadata": {"name": "worker-1", "creationTimestamp": "2024-01-09T00:00:00Z"},
            "spec": {},
            "status": {"nodeInfo": {"kubeletVersion": "v1.31.0"}}
        },
        {
            "metadata": {"name": "worker-2", "creationTimestamp": "2024-01-10T12:00:00Z"},
            "spec": {"taints": [{"key": "dedicated", "effect": "NoSchedule"}]},
            "status": {"nodeInfo": {"kubeletVersion": "v1.30.2"}}
        }
    ]
}"#;

/// `kubectl get node worker-1 -o json`.
pub const NODE_JSON: &str = r#"{
    "metadata": {
        "name": "worker-1",
        "labels": {
            "beta.kubernetes.io/arch": "amd64",
            "kubernetes.io/arch": "amd64",
            "kubernetes.io/hostname": "worker-1",
            "kubernetes.io/os": "linux",
            "node-role.kubernetes.io/worker": "",
            "pool": "general",
            "topology.kubernetes.io/zone": "eu-1a"
        }
    }
}"#;

/// `kubectl get pods -o json` body for the given pod names.
pub fn pods_json(names: &[&str]) -> String {
    let items: Vec<String> = names
        .iter()
        .map(|n| format!(r#"{{"metadata":{{"name":"{n}"}}}}"#))
        .collect();
    format!(r#"{{"apiVersion":"v1","items":[{}]}}"#, items.join(","))
}
