//! Course booklet agent: a two-stage workflow that outlines a course and
//! then drafts booklet chapters from the outline.

use agent_workspace_sdk::{
    async_trait, params, AgentDefinition, AgentDescriptor, Artifact, BookletChapter, BookletDraft,
    CourseOutline, OutlineSection, StageBinding, StageExecutor, StageSchema, WorkspaceResult,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Sections used when the teacher does not name any units
const DEFAULT_SECTIONS: [&str; 4] = [
    "Introduction",
    "Core concepts",
    "Worked examples",
    "Summary and practice",
];

/// Config schema for the booklet workspace
#[derive(Debug, Clone, AgentDefinition)]
#[agent(
    id = "booklet",
    name = "Course Booklet Generator",
    description = "Draft a cohesive booklet from your course units, summaries and activities."
)]
pub struct BookletConfig {
    /// Course the booklet belongs to
    #[field(label = "Course name", description = "Course the booklet is drafted for")]
    pub course_name: String,

    /// Unit names, one per line; defaults apply when empty
    #[field(
        label = "Units",
        description = "Course units to outline, one per line"
    )]
    pub units: Option<String>,

    /// Voice the draft is written in; only the draft stage reads it
    #[field(
        label = "Tone",
        description = "Voice used for the drafted chapters",
        type = "select",
        options = "Student-friendly|Academic|Concise",
        default = "Student-friendly",
        stages = "1"
    )]
    pub tone: String,
}

impl BookletConfig {
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        Self {
            course_name: params::text(params, "course_name").to_string(),
            units: params.get("units").cloned(),
            tone: params::text(params, "tone").to_string(),
        }
    }
}

/// Build the booklet agent descriptor.
///
/// The display name comes from the injected session and only decorates the
/// draft greeting; no other behavior depends on identity.
pub fn descriptor(display_name: Option<String>) -> AgentDescriptor {
    AgentDescriptor {
        metadata: BookletConfig::metadata(),
        fields: BookletConfig::fields(),
        stages: vec![
            StageBinding {
                schema: StageSchema {
                    index: 0,
                    key: "outline".to_string(),
                    name: "Outline course".to_string(),
                    description: "Sketch the booklet sections from the course units".to_string(),
                    requires: vec![],
                },
                executor: Arc::new(OutlineCourseExecutor::default()),
                check: None,
            },
            StageBinding {
                schema: StageSchema {
                    index: 1,
                    key: "draft".to_string(),
                    name: "Draft booklet".to_string(),
                    description: "Write booklet chapters from the outline".to_string(),
                    requires: vec![0],
                },
                executor: Arc::new(DraftBookletExecutor {
                    latency: Duration::from_millis(1600),
                    display_name,
                }),
                check: None,
            },
        ],
    }
}

/// Outline stage
pub struct OutlineCourseExecutor {
    pub latency: Duration,
}

impl Default for OutlineCourseExecutor {
    fn default() -> Self {
        Self {
            latency: Duration::from_millis(800),
        }
    }
}

#[async_trait]
impl StageExecutor for OutlineCourseExecutor {
    async fn run(
        &self,
        params: HashMap<String, String>,
        _inputs: Vec<Artifact>,
    ) -> WorkspaceResult<Artifact> {
        tokio::time::sleep(self.latency).await;
        let config = BookletConfig::from_params(&params);
        Ok(Artifact::Outline(outline_course(&config)))
    }
}

/// Derive outline sections from the named units, or fall back to the
/// default booklet structure
pub fn outline_course(config: &BookletConfig) -> CourseOutline {
    let named: Vec<String> = config
        .units
        .as_deref()
        .unwrap_or("")
        .lines()
        .map(|unit| unit.trim())
        .filter(|unit| !unit.is_empty())
        .map(|unit| unit.to_string())
        .collect();

    let titles: Vec<String> = if named.is_empty() {
        DEFAULT_SECTIONS.iter().map(|s| s.to_string()).collect()
    } else {
        named
    };

    let sections = titles
        .into_iter()
        .map(|title| OutlineSection {
            summary: format!("What \"{}\" covers within {}", title, config.course_name),
            title,
        })
        .collect();

    CourseOutline {
        course: config.course_name.clone(),
        sections,
    }
}

/// Draft stage; requires the outline artifact
pub struct DraftBookletExecutor {
    pub latency: Duration,
    pub display_name: Option<String>,
}

#[async_trait]
impl StageExecutor for DraftBookletExecutor {
    async fn run(
        &self,
        params: HashMap<String, String>,
        inputs: Vec<Artifact>,
    ) -> WorkspaceResult<Artifact> {
        tokio::time::sleep(self.latency).await;

        let Some(outline) = inputs.first().and_then(|a| a.as_outline()) else {
            return Err("outline artifact is missing".into());
        };
        let config = BookletConfig::from_params(&params);

        let greeting = match &self.display_name {
            Some(name) => format!(
                "Hello {}, here is the draft booklet for {}.",
                name, outline.course
            ),
            None => format!("Here is the draft booklet for {}.", outline.course),
        };

        let chapters = outline
            .sections
            .iter()
            .map(|section| BookletChapter {
                title: section.title.clone(),
                body: chapter_body(&config.tone, section),
            })
            .collect();

        Ok(Artifact::Booklet(BookletDraft { greeting, chapters }))
    }
}

fn chapter_body(tone: &str, section: &OutlineSection) -> String {
    match tone {
        "Academic" => format!(
            "This chapter examines {} in formal detail. {}.",
            section.title.to_lowercase(),
            section.summary
        ),
        "Concise" => format!("{}: key points only. {}.", section.title, section.summary),
        _ => format!(
            "Let's walk through {} together, step by step. {}.",
            section.title.to_lowercase(),
            section.summary
        ),
    }
}
