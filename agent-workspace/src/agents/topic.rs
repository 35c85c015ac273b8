//! Topic extraction agent: surfaces recurring key terms from pasted
//! course material.

use agent_workspace_sdk::{
    async_trait, params, AgentDefinition, AgentDescriptor, Artifact, StageBinding, StageExecutor,
    StageSchema, TopicList, WorkspaceResult,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::keyword;

/// Config schema for the topic extraction workspace
#[derive(Debug, Clone, AgentDefinition)]
#[agent(
    id = "topic",
    name = "Topic Extraction Agent",
    description = "Upload a syllabus, lesson plan or paste academic text to surface the key recurring topics."
)]
pub struct TopicConfig {
    /// Raw course material; empty input legally yields an empty topic list
    #[field(
        label = "Input material",
        description = "Paste 1-3 paragraphs of course material, an assignment description, or a syllabus section"
    )]
    pub text: Option<String>,
}

/// Build the topic agent descriptor
pub fn descriptor() -> AgentDescriptor {
    AgentDescriptor {
        metadata: TopicConfig::metadata(),
        fields: TopicConfig::fields(),
        stages: vec![StageBinding {
            schema: StageSchema {
                index: 0,
                key: "extract".to_string(),
                name: "Extract topics".to_string(),
                description: "Run an in-memory keyword scan over the input material".to_string(),
                requires: vec![],
            },
            executor: Arc::new(ExtractTopicsExecutor::default()),
            check: None,
        }],
    }
}

/// Keyword-scan stage
pub struct ExtractTopicsExecutor {
    pub latency: Duration,
}

impl Default for ExtractTopicsExecutor {
    fn default() -> Self {
        Self {
            latency: Duration::from_millis(600),
        }
    }
}

#[async_trait]
impl StageExecutor for ExtractTopicsExecutor {
    async fn run(
        &self,
        params: HashMap<String, String>,
        _inputs: Vec<Artifact>,
    ) -> WorkspaceResult<Artifact> {
        tokio::time::sleep(self.latency).await;
        let topics = keyword::extract(params::text(&params, "text"));
        Ok(Artifact::Topics(TopicList { topics }))
    }
}
