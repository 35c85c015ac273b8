//! Syllabus builder agent: distributes a flat topic list across teaching
//! weeks.

use agent_workspace_sdk::{
    async_trait, params, AgentDefinition, AgentDescriptor, Artifact, StageBinding, StageExecutor,
    StageSchema, WeekPlan, WeekRow, WorkspaceResult,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Config schema for the syllabus workspace
#[derive(Debug, Clone, AgentDefinition)]
#[agent(
    id = "syllabus",
    name = "Syllabus Builder",
    description = "Sketch your course modules, learning outcomes and assessments in one structured workspace."
)]
pub struct SyllabusConfig {
    /// Flat topic list, one per line (commas also accepted)
    #[field(
        label = "Topics",
        description = "Topics to schedule, one per line; an empty list yields an empty plan"
    )]
    pub topics: Option<String>,

    /// Number of teaching weeks to spread the topics across
    #[field(
        label = "Weeks",
        description = "Teaching weeks in the term",
        type = "number",
        min = "1",
        max = "52",
        default = "12"
    )]
    pub weeks: u32,

    /// Logo referenced by the export sink, not by the plan itself
    #[field(
        label = "Logo",
        description = "Optional logo image placed at the top of the exported document",
        type = "file_path",
        pattern = "*.png"
    )]
    pub logo: Option<String>,
}

/// Build the syllabus agent descriptor
pub fn descriptor() -> AgentDescriptor {
    AgentDescriptor {
        metadata: SyllabusConfig::metadata(),
        fields: SyllabusConfig::fields(),
        stages: vec![StageBinding {
            schema: StageSchema {
                index: 0,
                key: "plan".to_string(),
                name: "Build week plan".to_string(),
                description: "Distribute the topic list across the teaching weeks".to_string(),
                requires: vec![],
            },
            executor: Arc::new(PlanWeeksExecutor),
            check: None,
        }],
    }
}

/// Parse the raw topics field into a flat list
pub fn parse_topics(raw: &str) -> Vec<String> {
    raw.split(['\n', ','])
        .map(|topic| topic.trim())
        .filter(|topic| !topic.is_empty())
        .map(|topic| topic.to_string())
        .collect()
}

/// Round-robin the topic list across `weeks` weeks.
///
/// Weeks are clamped to [1, 52]; the topic at index `i` lands in week
/// `i mod weeks` (1-based in the output rows). Deterministic for the same
/// topic list and week count.
pub fn build_week_plan(topics: &[String], weeks: u32) -> WeekPlan {
    let weeks = weeks.clamp(1, 52);
    let rows = topics
        .iter()
        .enumerate()
        .map(|(i, topic)| WeekRow {
            week: (i as u32 % weeks) + 1,
            topic: topic.clone(),
        })
        .collect();
    WeekPlan { weeks, rows }
}

/// Week-plan stage; pure derivation, no simulated latency
pub struct PlanWeeksExecutor;

#[async_trait]
impl StageExecutor for PlanWeeksExecutor {
    async fn run(
        &self,
        params: HashMap<String, String>,
        _inputs: Vec<Artifact>,
    ) -> WorkspaceResult<Artifact> {
        let topics = parse_topics(params::text(&params, "topics"));
        let weeks = params::number(&params, "weeks", 12) as u32;
        Ok(Artifact::WeekPlan(build_week_plan(&topics, weeks)))
    }
}
