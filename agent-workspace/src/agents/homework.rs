//! Homework generator agent: derives practice questions from source
//! material by cycling through its sentence fragments.

use agent_workspace_sdk::{
    async_trait, params, AgentDefinition, AgentDescriptor, Artifact, HomeworkSet, McqQuestion,
    OpenQuestion, StageBinding, StageExecutor, StageSchema, WorkspaceResult,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::keyword;

/// Config schema for the homework workspace
#[derive(Debug, Clone, AgentDefinition)]
#[agent(
    id = "homework",
    name = "Homework Generator",
    description = "Design prompts that generate practice questions, projects and homework sets."
)]
pub struct HomeworkConfig {
    /// Source material the questions are derived from
    #[field(
        label = "Source text",
        description = "Lesson text or reading the homework should cover"
    )]
    pub source_text: String,

    /// How many multiple-choice questions to generate
    #[field(
        label = "MCQ count",
        description = "Multiple-choice questions to generate",
        type = "number",
        min = "0",
        max = "10",
        default = "3"
    )]
    pub mcq_count: u32,

    /// How many open questions to generate
    #[field(
        label = "Open count",
        description = "Open questions to generate",
        type = "number",
        min = "0",
        max = "10",
        default = "2"
    )]
    pub open_count: u32,
}

impl HomeworkConfig {
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        Self {
            source_text: params::text(params, "source_text").to_string(),
            mcq_count: params::number(params, "mcq_count", 0) as u32,
            open_count: params::number(params, "open_count", 0) as u32,
        }
    }
}

/// Build the homework agent descriptor
pub fn descriptor() -> AgentDescriptor {
    AgentDescriptor {
        metadata: HomeworkConfig::metadata(),
        fields: HomeworkConfig::fields(),
        stages: vec![StageBinding {
            schema: StageSchema {
                index: 0,
                key: "generate".to_string(),
                name: "Generate questions".to_string(),
                description: "Build MCQ and open questions from the source text".to_string(),
                requires: vec![],
            },
            executor: Arc::new(GenerateHomeworkExecutor::default()),
            check: Some(at_least_one_question),
        }],
    }
}

fn at_least_one_question(params: &HashMap<String, String>) -> Result<(), String> {
    let mcq = params::number(params, "mcq_count", 0);
    let open = params::number(params, "open_count", 0);
    if mcq + open <= 0 {
        return Err("Request at least one question (MCQ or open) before generating".to_string());
    }
    Ok(())
}

/// Question-generation stage
pub struct GenerateHomeworkExecutor {
    pub latency: Duration,
}

impl Default for GenerateHomeworkExecutor {
    fn default() -> Self {
        Self {
            latency: Duration::from_millis(900),
        }
    }
}

#[async_trait]
impl StageExecutor for GenerateHomeworkExecutor {
    async fn run(
        &self,
        params: HashMap<String, String>,
        _inputs: Vec<Artifact>,
    ) -> WorkspaceResult<Artifact> {
        tokio::time::sleep(self.latency).await;
        let config = HomeworkConfig::from_params(&params);
        Ok(Artifact::Homework(generate_homework(&config)))
    }
}

/// Cycle question prompts through the sentence fragments of the source
pub fn generate_homework(config: &HomeworkConfig) -> HomeworkSet {
    let mut fragments = keyword::sentence_fragments(&config.source_text);
    if fragments.is_empty() {
        fragments.push(config.source_text.trim().to_string());
    }

    let mcq = (0..config.mcq_count as usize)
        .map(|i| {
            // Option 0 is the fragment the prompt is built from
            let options: Vec<String> = (0..4)
                .map(|k| fragments[(i + k) % fragments.len()].clone())
                .collect();
            McqQuestion {
                prompt: format!(
                    "Q{}: Which statement best matches the source material?",
                    i + 1
                ),
                options,
                answer: 0,
            }
        })
        .collect();

    let open = (0..config.open_count as usize)
        .map(|i| OpenQuestion {
            prompt: format!(
                "In your own words, explain: \"{}\"",
                fragments[(config.mcq_count as usize + i) % fragments.len()]
            ),
        })
        .collect();

    HomeworkSet { mcq, open }
}
