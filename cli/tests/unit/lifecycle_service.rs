//! Unit tests for the pod lifecycle service.
//!
//! Every test drives `run_pod` against a scripted gateway and asserts on the
//! exact kubectl calls, in particular that teardown runs once after any
//! post-apply failure and never after a failed apply.

#![allow(clippy::expect_used)]

use std::future::{pending, ready};
use std::time::Duration;

use testpod_cli::application::ports::InvocationMode;
use testpod_cli::application::services::lifecycle::{PodRequest, Teardown, run_pod};
use testpod_cli::domain::error::{LifecycleError, ToolError};

use crate::mocks::{RecordingReporter, Reply, ScriptedGateway, verb};

const POD: &str = "testpod-laptop-20240101-120000";

fn request(network_policy: bool) -> PodRequest {
    PodRequest {
        name: POD.to_string(),
        manifest: "apiVersion: v1\nkind: Pod\n".to_string(),
        shell: "/bin/sh".to_string(),
        network_policy,
    }
}

fn pod_delete() -> Vec<String> {
    vec!["pod".to_string(), POD.to_string()]
}

fn netpol_delete() -> Vec<String> {
    vec!["netpol".to_string(), POD.to_string()]
}

#[tokio::test]
async fn happy_path_runs_every_step_in_order() {
    let gw = ScriptedGateway::happy();
    let reporter = RecordingReporter::default();

    run_pod(&gw, &reporter, &request(false), pending())
        .await
        .expect("run succeeds");

    let calls = gw.calls();
    assert_eq!(gw.verbs(), vec!["apply", "wait", "exec", "delete"]);

    assert_eq!(calls[0].args, vec!["apply", "-f", "-"]);
    assert_eq!(calls[0].stdin.as_deref(), Some("apiVersion: v1\nkind: Pod\n"));

    let target = format!("pod/{POD}");
    assert_eq!(
        calls[1].args,
        vec![
            "wait",
            "--for=condition=ready",
            "--timeout=30s",
            target.as_str(),
        ]
    );

    assert_eq!(calls[2].args, vec!["exec", "-it", POD, "--", "/bin/sh"]);
    assert_eq!(calls[2].mode, InvocationMode::Interactive);

    assert_eq!(calls[3].args, vec!["delete", "--wait=false", "pod", POD]);
    assert!(gw.blocking_calls().is_empty());
    assert!(reporter.warnings().is_empty());
}

#[tokio::test]
async fn wait_timeout_still_deletes_pod_exactly_once() {
    let gw = ScriptedGateway::new(|inv| match verb(inv) {
        "wait" => Reply::Fail("error: timed out waiting for the condition on pods/testpod"),
        _ => Reply::Ok(String::new()),
    });
    let reporter = RecordingReporter::default();

    let err = run_pod(&gw, &reporter, &request(false), pending())
        .await
        .expect_err("wait failure must surface");

    match err.downcast_ref::<ToolError>() {
        Some(ToolError::Failed {
            command, output, ..
        }) => {
            assert_eq!(command, "kubectl wait");
            assert!(output.contains("timed out"), "got: {output}");
        }
        other => panic!("expected the wait error, got {other:?}"),
    }
    assert_eq!(gw.verbs(), vec!["apply", "wait", "delete"]);
    assert_eq!(gw.deletes(), vec![pod_delete()]);
    assert!(gw.blocking_calls().is_empty());
}

#[tokio::test]
async fn apply_failure_deletes_nothing() {
    let gw = ScriptedGateway::new(|inv| match verb(inv) {
        "apply" => Reply::Fail("error: pods is forbidden"),
        _ => Reply::Ok(String::new()),
    });
    let reporter = RecordingReporter::default();

    let err = run_pod(&gw, &reporter, &request(true), pending())
        .await
        .expect_err("apply failure must surface");

    assert!(err.to_string().contains("forbidden"), "got: {err}");
    assert_eq!(gw.verbs(), vec!["apply"]);
    assert!(gw.deletes().is_empty());
    assert!(gw.blocking_calls().is_empty());
}

#[tokio::test]
async fn network_policy_is_deleted_before_pod() {
    let gw = ScriptedGateway::happy();
    let reporter = RecordingReporter::default();

    run_pod(&gw, &reporter, &request(true), pending())
        .await
        .expect("run succeeds");

    assert_eq!(gw.deletes(), vec![netpol_delete(), pod_delete()]);
}

#[tokio::test]
async fn exec_failure_is_returned_after_teardown() {
    let gw = ScriptedGateway::new(|inv| match verb(inv) {
        "exec" => Reply::Fail("command terminated with exit code 127"),
        _ => Reply::Ok(String::new()),
    });
    let reporter = RecordingReporter::default();

    let err = run_pod(&gw, &reporter, &request(false), pending())
        .await
        .expect_err("exec failure must surface");

    assert!(matches!(
        err.downcast_ref::<ToolError>(),
        Some(ToolError::Failed { command, .. }) if command == "kubectl exec"
    ));
    assert_eq!(gw.verbs(), vec!["apply", "wait", "exec", "delete"]);
}

#[tokio::test]
async fn non_zero_shell_exit_is_only_a_warning() {
    let gw = ScriptedGateway::new(|inv| match verb(inv) {
        "exec" => Reply::Exit(1),
        _ => Reply::Ok(String::new()),
    });
    let reporter = RecordingReporter::default();

    run_pod(&gw, &reporter, &request(false), pending())
        .await
        .expect("a failed last command in the shell must not fail the run");

    assert_eq!(gw.verbs(), vec!["apply", "wait", "exec", "delete"]);
    assert_eq!(
        reporter.warnings(),
        vec![format!("shell in pod {POD} exited with code 1")]
    );
}

#[tokio::test]
async fn missing_shell_is_an_error() {
    let gw = ScriptedGateway::new(|inv| match verb(inv) {
        "exec" => Reply::Exit(127),
        _ => Reply::Ok(String::new()),
    });
    let reporter = RecordingReporter::default();

    let err = run_pod(&gw, &reporter, &request(false), pending())
        .await
        .expect_err("shell that never started must surface");

    assert!(matches!(
        err.downcast_ref::<ToolError>(),
        Some(ToolError::Exited { code: 127, .. })
    ));
    assert_eq!(gw.deletes(), vec![pod_delete()]);
}

#[tokio::test]
async fn delete_failure_is_only_a_warning() {
    let gw = ScriptedGateway::new(|inv| match verb(inv) {
        "delete" => Reply::Fail("error: the server is currently unable to handle the request"),
        _ => Reply::Ok(String::new()),
    });
    let reporter = RecordingReporter::default();

    run_pod(&gw, &reporter, &request(true), pending())
        .await
        .expect("delete failures must not fail the run");

    let warnings = reporter.warnings();
    assert_eq!(warnings.len(), 2, "got: {warnings:?}");
    assert!(warnings[0].starts_with(&format!("failed to delete netpol {POD}")));
    assert!(warnings[1].starts_with(&format!("failed to delete pod {POD}")));
}

#[tokio::test]
async fn wait_timeout_with_failing_delete_reports_the_timeout() {
    let gw = ScriptedGateway::new(|inv| match verb(inv) {
        "wait" => Reply::Fail("timed out"),
        "delete" => Reply::Fail("connection refused"),
        _ => Reply::Ok(String::new()),
    });
    let reporter = RecordingReporter::default();

    let err = run_pod(&gw, &reporter, &request(false), pending())
        .await
        .expect_err("wait failure must surface");

    assert!(matches!(
        err.downcast_ref::<ToolError>(),
        Some(ToolError::Failed { command, .. }) if command == "kubectl wait"
    ));
    assert_eq!(reporter.warnings().len(), 1);
}

#[tokio::test]
async fn interrupt_while_waiting_tears_down() {
    let gw = ScriptedGateway::new(|inv| match verb(inv) {
        "wait" => Reply::Hang,
        _ => Reply::Ok(String::new()),
    });
    let reporter = RecordingReporter::default();

    let err = run_pod(&gw, &reporter, &request(true), ready(()))
        .await
        .expect_err("interrupt must surface");

    assert_eq!(
        err.downcast_ref::<LifecycleError>(),
        Some(&LifecycleError::Interrupted(POD.to_string()))
    );
    assert!(!gw.verbs().contains(&"exec".to_string()));
    assert_eq!(gw.deletes(), vec![netpol_delete(), pod_delete()]);
    assert!(gw.blocking_calls().is_empty());
}

#[tokio::test]
async fn cancelled_run_deletes_through_blocking_path() {
    let gw = ScriptedGateway::new(|inv| match verb(inv) {
        "wait" => Reply::Hang,
        _ => Reply::Ok(String::new()),
    });
    let reporter = RecordingReporter::default();

    let outcome = tokio::time::timeout(
        Duration::from_millis(50),
        run_pod(&gw, &reporter, &request(true), pending()),
    )
    .await;

    assert!(outcome.is_err(), "run should still be waiting");
    assert!(gw.deletes().is_empty());
    assert_eq!(gw.blocking_deletes(), vec![netpol_delete(), pod_delete()]);
    assert!(
        gw.blocking_calls()
            .iter()
            .all(|c| c.mode == InvocationMode::Silent)
    );
}

#[tokio::test]
async fn released_teardown_does_not_delete_again_on_drop() {
    let gw = ScriptedGateway::happy();
    let reporter = RecordingReporter::default();

    let teardown = Teardown::arm(&gw, &reporter, POD, false);
    teardown.release().await;

    assert_eq!(gw.deletes(), vec![pod_delete()]);
    assert!(gw.blocking_calls().is_empty());
}

#[test]
fn dropped_teardown_deletes_once() {
    let gw = ScriptedGateway::happy();
    let reporter = RecordingReporter::default();

    drop(Teardown::arm(&gw, &reporter, POD, false));

    assert_eq!(gw.blocking_deletes(), vec![pod_delete()]);
    assert_eq!(
        reporter.events(),
        vec![format!("success: deleted pod {POD}")]
    );
}

#[tokio::test]
async fn cancelled_release_leaves_unfinished_deletes_to_drop() {
    let gw = ScriptedGateway::new(|inv| {
        if verb(inv) == "delete" && inv.args.iter().any(|a| a == "netpol") {
            Reply::Hang
        } else {
            Reply::Ok(String::new())
        }
    });
    let reporter = RecordingReporter::default();

    let teardown = Teardown::arm(&gw, &reporter, POD, true);
    let outcome = tokio::time::timeout(Duration::from_millis(50), teardown.release()).await;

    assert!(outcome.is_err(), "release should still be waiting");
    assert_eq!(gw.deletes(), vec![netpol_delete()]);
    assert_eq!(gw.blocking_deletes(), vec![netpol_delete(), pod_delete()]);
    assert_eq!(
        reporter.events().last(),
        Some(&format!("success: deleted pod {POD}"))
    );
}
