//! In-process runtime surface tests

use agent_workspace::runtime::InProcessRuntime;
use agent_workspace::session::Session;
use agent_workspace_sdk::{AgentRuntime, Severity, WorkspaceStatus};
use uuid::Uuid;

fn runtime() -> InProcessRuntime {
    InProcessRuntime::new(&Session::signed_out())
}

#[tokio::test]
async fn runs_a_workspace_end_to_end() {
    let runtime = runtime();
    let handle = runtime.open_workspace("homework").unwrap();

    runtime
        .set_param(handle.id(), "source_text", "Sorting orders data. Searching finds it.")
        .unwrap();
    runtime.set_param(handle.id(), "mcq_count", "2").unwrap();
    runtime.set_param(handle.id(), "open_count", "1").unwrap();

    let completion = runtime.invoke_stage(handle.id(), 0).await.unwrap();
    let status = completion.wait().await.unwrap();
    assert_eq!(status, WorkspaceStatus::Ready { stage: 0 });
    assert_eq!(
        runtime.get_status(handle.id()).await.unwrap(),
        WorkspaceStatus::Ready { stage: 0 }
    );
    assert!(runtime.get_artifact(handle.id(), 0).await.unwrap().is_some());

    // Newest first: completed before started
    let log = runtime.get_run_log(handle.id(), None).await.unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].severity, Severity::Success);
    assert_eq!(log[1].severity, Severity::Info);

    // Auxiliary warnings leave the status alone
    runtime
        .record_warning(handle.id(), "clipboard copy denied")
        .await
        .unwrap();
    assert_eq!(
        runtime.get_status(handle.id()).await.unwrap(),
        WorkspaceStatus::Ready { stage: 0 }
    );
    assert_eq!(
        runtime.get_run_log(handle.id(), None).await.unwrap().len(),
        3
    );

    runtime.reset_workspace(handle.id()).await.unwrap();
    assert_eq!(
        runtime.get_status(handle.id()).await.unwrap(),
        WorkspaceStatus::Idle
    );
    assert!(runtime.get_artifact(handle.id(), 0).await.unwrap().is_none());
    assert!(runtime
        .get_run_log(handle.id(), None)
        .await
        .unwrap()
        .is_empty());

    runtime.close_workspace(handle.id()).await.unwrap();
    assert!(runtime.get_status(handle.id()).await.is_err());
}

#[tokio::test]
async fn run_log_limit_returns_the_newest_entries() {
    let runtime = runtime();
    let handle = runtime.open_workspace("topic").unwrap();

    let completion = runtime.invoke_stage(handle.id(), 0).await.unwrap();
    completion.wait().await.unwrap();

    let latest = runtime.get_run_log(handle.id(), Some(1)).await.unwrap();
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].severity, Severity::Success);
}

#[tokio::test]
async fn subscribers_see_entries_as_they_append() {
    let runtime = runtime();
    let handle = runtime.open_workspace("topic").unwrap();
    let mut rx = runtime.subscribe_run_log(handle.id()).await.unwrap();

    let completion = runtime.invoke_stage(handle.id(), 0).await.unwrap();
    completion.wait().await.unwrap();

    let first = rx.recv().await.unwrap();
    assert_eq!(first.severity, Severity::Info);
    let second = rx.recv().await.unwrap();
    assert_eq!(second.severity, Severity::Success);
}

#[tokio::test]
async fn closing_discards_the_in_flight_result() {
    let runtime = runtime();
    let handle = runtime.open_workspace("topic").unwrap();

    let completion = runtime.invoke_stage(handle.id(), 0).await.unwrap();
    runtime.close_workspace(handle.id()).await.unwrap();

    assert!(completion.wait().await.is_none());
}

#[tokio::test]
async fn unknown_handles_are_errors() {
    let runtime = runtime();
    let stray = Uuid::new_v4();
    assert!(runtime.get_status(&stray).await.is_err());
    assert!(runtime.close_workspace(&stray).await.is_err());
    assert!(runtime.set_param(&stray, "text", "x").is_err());
}
