//! Common test fixtures for workspace integration tests

use agent_workspace_sdk::{
    async_trait, AgentDescriptor, AgentMetadata, Artifact, FieldSchema, FieldType, StageBinding,
    StageExecutor, StageSchema, TopicList, WorkspaceResult,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Executor that counts invocations and resolves to a fixed topic list
pub struct CountingExecutor {
    pub runs: Arc<AtomicUsize>,
    pub latency: Duration,
}

#[async_trait]
impl StageExecutor for CountingExecutor {
    async fn run(
        &self,
        _params: HashMap<String, String>,
        _inputs: Vec<Artifact>,
    ) -> WorkspaceResult<Artifact> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.latency).await;
        Ok(Artifact::Topics(TopicList {
            topics: vec!["fixed".to_string()],
        }))
    }
}

/// Executor that fails after starting whenever the flag is set
pub struct FlakyExecutor {
    pub fail: Arc<AtomicBool>,
}

#[async_trait]
impl StageExecutor for FlakyExecutor {
    async fn run(
        &self,
        _params: HashMap<String, String>,
        _inputs: Vec<Artifact>,
    ) -> WorkspaceResult<Artifact> {
        if self.fail.load(Ordering::SeqCst) {
            return Err("synthetic executor failure".into());
        }
        Ok(Artifact::Topics(TopicList {
            topics: vec!["ok".to_string()],
        }))
    }
}

fn prompt_field() -> FieldSchema {
    FieldSchema {
        name: "prompt".to_string(),
        field_type: FieldType::Text,
        label: "Prompt".to_string(),
        description: "Required input".to_string(),
        required: true,
        default: None,
        required_for_stages: None,
    }
}

fn stage(index: usize, name: &str, requires: Vec<usize>) -> StageSchema {
    StageSchema {
        index,
        key: name.to_lowercase(),
        name: name.to_string(),
        description: String::new(),
        requires,
    }
}

/// Two stages sharing one run counter; stage 1 requires stage 0's artifact
pub fn two_stage_descriptor(runs: Arc<AtomicUsize>, latency: Duration) -> Arc<AgentDescriptor> {
    Arc::new(AgentDescriptor {
        metadata: AgentMetadata {
            id: "fixture".to_string(),
            name: "Fixture Agent".to_string(),
            description: "Two counted stages".to_string(),
        },
        fields: vec![prompt_field()],
        stages: vec![
            StageBinding {
                schema: stage(0, "First", vec![]),
                executor: Arc::new(CountingExecutor {
                    runs: runs.clone(),
                    latency,
                }),
                check: None,
            },
            StageBinding {
                schema: stage(1, "Second", vec![0]),
                executor: Arc::new(CountingExecutor { runs, latency }),
                check: None,
            },
        ],
    })
}

/// One unguarded stage whose executor fails while the flag is set
pub fn flaky_descriptor(fail: Arc<AtomicBool>) -> Arc<AgentDescriptor> {
    Arc::new(AgentDescriptor {
        metadata: AgentMetadata {
            id: "flaky".to_string(),
            name: "Flaky Agent".to_string(),
            description: "One stage that can fail".to_string(),
        },
        fields: vec![],
        stages: vec![StageBinding {
            schema: stage(0, "Work", vec![]),
            executor: Arc::new(FlakyExecutor { fail }),
            check: None,
        }],
    })
}
