//! Homework checking agent: suggests a grade for a pasted submission.
//!
//! Scoring is a deterministic step function of word count, not a learned
//! model; the tiers break at 50 and 150 words.

use agent_workspace_sdk::{
    async_trait, params, AgentDefinition, AgentDescriptor, Artifact, EvaluationReport, ScoreTier,
    StageBinding, StageExecutor, StageSchema, WorkspaceResult,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Config schema for the evaluation workspace
#[derive(Debug, Clone, AgentDefinition)]
#[agent(
    id = "evaluation",
    name = "Homework Checking Agent",
    description = "Paste an assignment, rubric and student answer to get a suggested grade and feedback."
)]
pub struct EvaluationConfig {
    /// Assignment or rubric, shown back in the feedback only
    #[field(
        label = "Assignment",
        description = "Optional assignment or rubric the submission answers"
    )]
    pub assignment: Option<String>,

    /// The student answer being graded
    #[field(label = "Submission", description = "Student answer to evaluate")]
    pub submission: String,
}

/// Build the evaluation agent descriptor
pub fn descriptor() -> AgentDescriptor {
    AgentDescriptor {
        metadata: EvaluationConfig::metadata(),
        fields: EvaluationConfig::fields(),
        stages: vec![StageBinding {
            schema: StageSchema {
                index: 0,
                key: "evaluate".to_string(),
                name: "Evaluate submission".to_string(),
                description: "Suggest a grade and feedback for the submission".to_string(),
                requires: vec![],
            },
            executor: Arc::new(EvaluateSubmissionExecutor::default()),
            check: None,
        }],
    }
}

/// Step-function scoring over the submission word count
pub fn score_submission(submission: &str) -> EvaluationReport {
    let word_count = submission.split_whitespace().count();
    let (score, tier) = if word_count < 50 {
        (58, ScoreTier::Low)
    } else if word_count < 150 {
        (76, ScoreTier::Mid)
    } else {
        (93, ScoreTier::High)
    };

    let feedback = match tier {
        ScoreTier::Low => {
            "The answer is too brief to cover the assignment. Expand each claim with an example \
             or a step of reasoning."
        }
        ScoreTier::Mid => {
            "A solid answer that touches the main points. Deepen one or two arguments and tie \
             them back to the assignment question."
        }
        ScoreTier::High => {
            "A thorough answer with room for detail and reasoning. Check that every paragraph \
             earns its place and trim repetition."
        }
    };

    EvaluationReport {
        word_count,
        score,
        tier,
        feedback: feedback.to_string(),
    }
}

/// Grading stage
pub struct EvaluateSubmissionExecutor {
    pub latency: Duration,
}

impl Default for EvaluateSubmissionExecutor {
    fn default() -> Self {
        Self {
            latency: Duration::from_millis(1100),
        }
    }
}

#[async_trait]
impl StageExecutor for EvaluateSubmissionExecutor {
    async fn run(
        &self,
        params: HashMap<String, String>,
        _inputs: Vec<Artifact>,
    ) -> WorkspaceResult<Artifact> {
        tokio::time::sleep(self.latency).await;
        let report = score_submission(params::text(&params, "submission"));
        Ok(Artifact::Evaluation(report))
    }
}
