//! State machine transition and guard tests

use super::common::{flaky_descriptor, two_stage_descriptor};
use agent_workspace::workspace::{Workspace, WorkspaceError};
use agent_workspace_sdk::{Severity, WorkspaceStatus};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn unmet_precondition_never_calls_executor() {
    let runs = Arc::new(AtomicUsize::new(0));
    let ws = Workspace::new(two_stage_descriptor(runs.clone(), Duration::ZERO));

    // Prompt left blank
    let err = ws.invoke(0).unwrap_err();
    assert!(matches!(err, WorkspaceError::Validation(_)));
    assert_eq!(runs.load(Ordering::SeqCst), 0);
    assert!(ws.artifact(0).is_none());
    assert!(matches!(
        ws.status(),
        WorkspaceStatus::Error { stage: 0, .. }
    ));

    let log = ws.run_log(None);
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].severity, Severity::Warning);
}

#[tokio::test]
async fn success_stores_artifact_and_unlocks_the_next_stage() {
    let runs = Arc::new(AtomicUsize::new(0));
    let ws = Workspace::new(two_stage_descriptor(runs.clone(), Duration::ZERO));
    ws.set_param("prompt", "go").unwrap();

    let status = ws.invoke(0).unwrap().wait().await.unwrap();
    assert_eq!(status, WorkspaceStatus::Ready { stage: 0 });
    assert!(ws.artifact(0).is_some());

    let status = ws.invoke(1).unwrap().wait().await.unwrap();
    assert_eq!(status, WorkspaceStatus::Ready { stage: 1 });
    assert!(ws.artifact(1).is_some());
    assert_eq!(runs.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn dependent_stage_fails_precondition_until_its_input_exists() {
    let runs = Arc::new(AtomicUsize::new(0));
    let ws = Workspace::new(two_stage_descriptor(runs.clone(), Duration::ZERO));
    ws.set_param("prompt", "go").unwrap();

    let err = ws.invoke(1).unwrap_err();
    assert!(matches!(err, WorkspaceError::Validation(_)));
    assert_eq!(runs.load(Ordering::SeqCst), 0);
    assert!(ws.artifact(1).is_none());

    // Error is recoverable: run the missing stage, then the dependent one
    ws.invoke(0).unwrap().wait().await.unwrap();
    let status = ws.invoke(1).unwrap().wait().await.unwrap();
    assert_eq!(status, WorkspaceStatus::Ready { stage: 1 });
}

#[tokio::test]
async fn invoking_while_running_is_rejected() {
    let runs = Arc::new(AtomicUsize::new(0));
    let ws = Workspace::new(two_stage_descriptor(
        runs.clone(),
        Duration::from_millis(100),
    ));
    ws.set_param("prompt", "go").unwrap();

    let completion = ws.invoke(0).unwrap();
    let err = ws.invoke(0).unwrap_err();
    assert!(matches!(
        err,
        WorkspaceError::StageInFlight {
            running: 0,
            requested: 0
        }
    ));

    completion.wait().await.unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    // Exactly one "started" entry despite the second invoke
    let started = ws
        .run_log(None)
        .iter()
        .filter(|e| e.message.contains("started"))
        .count();
    assert_eq!(started, 1);
}

#[tokio::test]
async fn ready_allows_rerun_and_advance_but_not_going_back() {
    let runs = Arc::new(AtomicUsize::new(0));
    let ws = Workspace::new(two_stage_descriptor(runs, Duration::ZERO));
    ws.set_param("prompt", "go").unwrap();

    ws.invoke(0).unwrap().wait().await.unwrap();
    // Re-run of the same stage supersedes the artifact
    ws.invoke(0).unwrap().wait().await.unwrap();
    ws.invoke(1).unwrap().wait().await.unwrap();

    let entries_before = ws.run_log(None).len();
    let err = ws.invoke(0).unwrap_err();
    assert!(matches!(
        err,
        WorkspaceError::IllegalTransition { requested: 0 }
    ));
    assert_eq!(ws.status(), WorkspaceStatus::Ready { stage: 1 });
    assert_eq!(ws.run_log(None).len(), entries_before);
}

#[tokio::test]
async fn reset_restores_defaults_from_any_state() {
    let runs = Arc::new(AtomicUsize::new(0));
    let descriptor = two_stage_descriptor(runs, Duration::ZERO);
    let ws = Workspace::new(descriptor.clone());
    ws.set_param("prompt", "go").unwrap();
    ws.invoke(0).unwrap().wait().await.unwrap();

    ws.reset();
    assert_eq!(ws.status(), WorkspaceStatus::Idle);
    assert_eq!(ws.params(), descriptor.default_params());
    assert!(ws.artifact(0).is_none());
    assert!(ws.run_log(None).is_empty());
}

#[tokio::test]
async fn late_result_after_reset_is_discarded() {
    let runs = Arc::new(AtomicUsize::new(0));
    let ws = Workspace::new(two_stage_descriptor(
        runs.clone(),
        Duration::from_millis(100),
    ));
    ws.set_param("prompt", "go").unwrap();

    let completion = ws.invoke(0).unwrap();
    ws.reset();

    assert!(completion.wait().await.is_none());
    assert!(ws.artifact(0).is_none());
    assert_eq!(ws.status(), WorkspaceStatus::Idle);
    assert!(ws.run_log(None).is_empty());
}

#[tokio::test]
async fn dropping_the_workspace_discards_the_in_flight_result() {
    let runs = Arc::new(AtomicUsize::new(0));
    let ws = Workspace::new(two_stage_descriptor(runs, Duration::from_millis(50)));
    ws.set_param("prompt", "go").unwrap();

    let completion = ws.invoke(0).unwrap();
    drop(ws);

    assert!(completion.wait().await.is_none());
}

#[tokio::test]
async fn executor_failure_retains_the_prior_artifact() {
    let fail = Arc::new(AtomicBool::new(false));
    let ws = Workspace::new(flaky_descriptor(fail.clone()));

    let status = ws.invoke(0).unwrap().wait().await.unwrap();
    assert_eq!(status, WorkspaceStatus::Ready { stage: 0 });
    let first = ws.artifact(0).unwrap();

    fail.store(true, Ordering::SeqCst);
    let status = ws.invoke(0).unwrap().wait().await.unwrap();
    assert!(matches!(status, WorkspaceStatus::Error { stage: 0, .. }));

    // The earlier artifact survives the failed attempt
    assert_eq!(ws.artifact(0).unwrap(), first);

    let log = ws.run_log(None);
    assert_eq!(log[0].severity, Severity::Error);
}
