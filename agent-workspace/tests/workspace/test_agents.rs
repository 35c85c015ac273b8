//! The six agent instantiations, driven through the shared state machine

use agent_workspace::agents::{booklet, code_review, evaluation, syllabus};
use agent_workspace::registry;
use agent_workspace::session::Session;
use agent_workspace::workspace::{Workspace, WorkspaceError};
use agent_workspace_sdk::{Artifact, ScoreTier, WorkspaceStatus};
use std::sync::Arc;

fn open(agent_id: &str) -> Workspace {
    let descriptor = registry::find(&Session::signed_out(), agent_id).unwrap();
    Workspace::new(descriptor)
}

fn words(n: usize) -> String {
    vec!["word"; n].join(" ")
}

#[tokio::test]
async fn topic_agent_treats_empty_text_as_a_legal_run() {
    let ws = open("topic");
    let status = ws.invoke(0).unwrap().wait().await.unwrap();
    assert_eq!(status, WorkspaceStatus::Ready { stage: 0 });

    let artifact = ws.artifact(0).unwrap();
    assert!(artifact.as_topics().unwrap().topics.is_empty());
}

#[tokio::test]
async fn topic_agent_ranks_recurring_terms() {
    let ws = open("topic");
    ws.set_param("text", "the cat sat on the mat the cat ran")
        .unwrap();
    ws.invoke(0).unwrap().wait().await.unwrap();

    let artifact = ws.artifact(0).unwrap();
    assert_eq!(
        artifact.as_topics().unwrap().topics,
        vec!["cat", "sat", "mat", "ran"]
    );
}

#[test]
fn week_plan_assigns_every_topic_round_robin() {
    let topics: Vec<String> = (0..9).map(|i| format!("t{i}")).collect();
    for weeks in 1..=52u32 {
        let plan = syllabus::build_week_plan(&topics, weeks);
        assert_eq!(plan.rows.len(), topics.len());
        for (i, row) in plan.rows.iter().enumerate() {
            assert_eq!(row.week, (i as u32 % weeks) + 1);
        }
    }
}

#[tokio::test]
async fn syllabus_workspace_rejects_out_of_range_weeks() {
    let ws = open("syllabus");
    ws.set_param("topics", "graphs\ntrees").unwrap();
    ws.set_param("weeks", "60").unwrap();

    let err = ws.invoke(0).unwrap_err();
    assert!(matches!(err, WorkspaceError::Validation(_)));
    assert!(ws.artifact(0).is_none());
}

#[tokio::test]
async fn syllabus_workspace_builds_a_plan() {
    let ws = open("syllabus");
    ws.set_param("topics", "graphs, trees, heaps").unwrap();
    ws.set_param("weeks", "2").unwrap();
    ws.invoke(0).unwrap().wait().await.unwrap();

    let artifact = ws.artifact(0).unwrap();
    let plan = artifact.as_week_plan().unwrap();
    assert_eq!(plan.weeks, 2);
    assert_eq!(
        plan.rows.iter().map(|r| r.week).collect::<Vec<_>>(),
        vec![1, 2, 1]
    );
}

#[tokio::test]
async fn homework_agent_requires_at_least_one_question() {
    let ws = open("homework");
    ws.set_param("source_text", "Sorting orders data. Searching finds it.")
        .unwrap();
    ws.set_param("mcq_count", "0").unwrap();
    ws.set_param("open_count", "0").unwrap();

    let err = ws.invoke(0).unwrap_err();
    assert!(matches!(err, WorkspaceError::Validation(_)));

    ws.set_param("open_count", "2").unwrap();
    ws.set_param("mcq_count", "1").unwrap();
    ws.invoke(0).unwrap().wait().await.unwrap();

    match ws.artifact(0).unwrap() {
        Artifact::Homework(set) => {
            assert_eq!(set.mcq.len(), 1);
            assert_eq!(set.open.len(), 2);
        }
        other => panic!("expected homework, got {:?}", other),
    }
}

#[tokio::test]
async fn evaluation_agent_scores_by_word_count() {
    let ws = open("evaluation");
    ws.set_param("submission", &words(100)).unwrap();
    ws.invoke(0).unwrap().wait().await.unwrap();

    match ws.artifact(0).unwrap() {
        Artifact::Evaluation(report) => {
            assert_eq!(report.word_count, 100);
            assert_eq!(report.score, 76);
            assert_eq!(report.tier, ScoreTier::Mid);
        }
        other => panic!("expected an evaluation, got {:?}", other),
    }
}

#[test]
fn evaluation_tiers_match_the_step_function() {
    assert_eq!(evaluation::score_submission(&words(40)).score, 58);
    assert_eq!(evaluation::score_submission(&words(100)).score, 76);
    assert_eq!(evaluation::score_submission(&words(200)).score, 93);
}

#[tokio::test]
async fn evaluation_agent_requires_a_submission() {
    let ws = open("evaluation");
    let err = ws.invoke(0).unwrap_err();
    assert!(matches!(err, WorkspaceError::Validation(_)));
}

#[tokio::test]
async fn booklet_flow_drafts_from_the_outline() {
    let ws = Workspace::new(Arc::new(booklet::descriptor(Some(
        "Dana Levi".to_string(),
    ))));
    ws.set_param("course_name", "Compilers").unwrap();

    // Draft before outline fails its precondition, then the flow recovers
    let err = ws.invoke(1).unwrap_err();
    assert!(matches!(err, WorkspaceError::Validation(_)));

    ws.invoke(0).unwrap().wait().await.unwrap();
    let status = ws.invoke(1).unwrap().wait().await.unwrap();
    assert_eq!(status, WorkspaceStatus::Ready { stage: 1 });

    match ws.artifact(1).unwrap() {
        Artifact::Booklet(draft) => {
            assert!(draft.greeting.contains("Dana Levi"));
            assert!(draft.greeting.contains("Compilers"));
            assert!(!draft.chapters.is_empty());
        }
        other => panic!("expected a booklet, got {:?}", other),
    }
}

#[tokio::test]
async fn code_review_flow_reviews_what_it_generated() {
    let ws = Workspace::new(Arc::new(code_review::descriptor()));
    ws.set_param("assignment", "Sum the sequence of numbers")
        .unwrap();
    ws.set_param("mistakes_level", "2").unwrap();

    ws.invoke(0).unwrap().wait().await.unwrap();
    let code = ws.artifact(0).unwrap();
    assert!(code.as_sample_code().unwrap().source.contains("print("));

    ws.invoke(1).unwrap().wait().await.unwrap();
    match ws.artifact(1).unwrap() {
        Artifact::Review(report) => {
            // Two seeded mistakes plus the strength note
            assert_eq!(report.findings.len(), 3);
            assert!(report.summary.contains("Python"));
        }
        other => panic!("expected a review, got {:?}", other),
    }
}

#[tokio::test]
async fn code_review_requires_an_assignment_prompt() {
    let ws = Workspace::new(Arc::new(code_review::descriptor()));
    let err = ws.invoke(0).unwrap_err();
    assert!(matches!(err, WorkspaceError::Validation(_)));
}
