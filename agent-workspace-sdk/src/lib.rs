// Re-export the derive macro
pub use agent_workspace_macros::AgentDefinition;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, oneshot};
use uuid::Uuid;

// Re-export async trait for convenience
pub use async_trait::async_trait;

/// Agent metadata (id, name, description)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentMetadata {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// Complete agent metadata with fields (for JSON export)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullAgentMetadata {
    #[serde(flatten)]
    pub metadata: AgentMetadata,
    pub fields: Vec<FieldSchema>,
}

/// Field schema definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    pub field_type: FieldType,
    pub label: String,
    pub description: String,
    pub required: bool,
    pub default: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_for_stages: Option<Vec<usize>>,
}

/// Field type enum
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Number {
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
    },
    Select {
        options: Vec<String>,
    },
    FilePath {
        #[serde(skip_serializing_if = "Option::is_none")]
        pattern: Option<String>,
    },
}

impl FieldSchema {
    /// Whether this field must be non-blank before the given stage may run
    pub fn required_for_stage(&self, stage: usize) -> bool {
        match &self.required_for_stages {
            Some(stages) => stages.contains(&stage),
            None => self.required,
        }
    }

    /// Validate a non-blank value against the field type
    pub fn validate(&self, value: &str) -> Result<(), String> {
        match &self.field_type {
            FieldType::Text | FieldType::FilePath { .. } => Ok(()),
            FieldType::Number { min, max } => {
                let n: i64 = value
                    .trim()
                    .parse()
                    .map_err(|_| format!("Field '{}' must be a number", self.label))?;
                if let Some(min) = min {
                    if n < *min {
                        return Err(format!("Field '{}' must be at least {}", self.label, min));
                    }
                }
                if let Some(max) = max {
                    if n > *max {
                        return Err(format!("Field '{}' must be at most {}", self.label, max));
                    }
                }
                Ok(())
            }
            FieldType::Select { options } => {
                if options.iter().any(|o| o == value) {
                    Ok(())
                } else {
                    Err(format!(
                        "Field '{}' must be one of: {}",
                        self.label,
                        options.join(", ")
                    ))
                }
            }
        }
    }
}

/// Trait that agent config structs must implement (auto-implemented by derive macro)
pub trait AgentDefinition {
    fn metadata() -> AgentMetadata;
    fn fields() -> Vec<FieldSchema>;
}

/// Workspace status for stage tracking
///
/// Exactly one value at a time; `error` carries the user-visible message so
/// a "running with error message" combination is unrepresentable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WorkspaceStatus {
    Idle,
    Running { stage: usize },
    Ready { stage: usize },
    Error { stage: usize, message: String },
}

/// Run log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// Immutable run log record; appended only, never mutated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunLogEntry {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    pub message: String,
}

// ============================================================================
// Artifacts
// ============================================================================

/// Typed output of a stage; immutable once produced, superseded (not
/// mutated) by a later run of the same stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Artifact {
    Topics(TopicList),
    WeekPlan(WeekPlan),
    Homework(HomeworkSet),
    Evaluation(EvaluationReport),
    Outline(CourseOutline),
    Booklet(BookletDraft),
    SampleCode(SampleCode),
    Review(ReviewReport),
}

impl Artifact {
    pub fn as_topics(&self) -> Option<&TopicList> {
        match self {
            Artifact::Topics(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_week_plan(&self) -> Option<&WeekPlan> {
        match self {
            Artifact::WeekPlan(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_outline(&self) -> Option<&CourseOutline> {
        match self {
            Artifact::Outline(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_sample_code(&self) -> Option<&SampleCode> {
        match self {
            Artifact::SampleCode(c) => Some(c),
            _ => None,
        }
    }
}

/// Ranked keywords extracted from source material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicList {
    pub topics: Vec<String>,
}

/// Week-by-topic assignment produced by the syllabus builder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekPlan {
    pub weeks: u32,
    pub rows: Vec<WeekRow>,
}

/// One topic scheduled into one week (weeks are 1-based)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekRow {
    pub week: u32,
    pub topic: String,
}

/// Generated homework set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeworkSet {
    pub mcq: Vec<McqQuestion>,
    pub open: Vec<OpenQuestion>,
}

/// Multiple-choice question; `answer` indexes into `options`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McqQuestion {
    pub prompt: String,
    pub options: Vec<String>,
    pub answer: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenQuestion {
    pub prompt: String,
}

/// Suggested grade for a submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub word_count: usize,
    pub score: u8,
    pub tier: ScoreTier,
    pub feedback: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreTier {
    Low,
    Mid,
    High,
}

/// Course outline; input to the booklet draft stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseOutline {
    pub course: String,
    pub sections: Vec<OutlineSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineSection {
    pub title: String,
    pub summary: String,
}

/// Drafted booklet built from an outline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookletDraft {
    pub greeting: String,
    pub chapters: Vec<BookletChapter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookletChapter {
    pub title: String,
    pub body: String,
}

/// Generated student code; input to the review stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleCode {
    pub language: String,
    pub source: String,
}

/// Pedagogical review of generated code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewReport {
    pub summary: String,
    pub findings: Vec<ReviewFinding>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewFinding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub note: String,
}

// ============================================================================
// Stages and descriptors
// ============================================================================

/// One named unit of work within an agent's workflow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageSchema {
    /// Ordinal position within the agent's stage list
    pub index: usize,
    pub key: String,
    pub name: String,
    pub description: String,
    /// Stage indexes whose artifacts must exist before this stage may run
    pub requires: Vec<usize>,
}

/// Cross-field config rule checked before a stage runs; returns a
/// user-visible message on failure
pub type ConfigCheck = fn(&HashMap<String, String>) -> Result<(), String>;

/// A stage schema bound to its executor
#[derive(Clone)]
pub struct StageBinding {
    pub schema: StageSchema,
    pub executor: Arc<dyn StageExecutor>,
    pub check: Option<ConfigCheck>,
}

/// Everything one agent instantiation declares: config schema and
/// defaults, ordered stage list, executor bindings
#[derive(Clone)]
pub struct AgentDescriptor {
    pub metadata: AgentMetadata,
    pub fields: Vec<FieldSchema>,
    pub stages: Vec<StageBinding>,
}

impl AgentDescriptor {
    pub fn full_metadata(&self) -> FullAgentMetadata {
        FullAgentMetadata {
            metadata: self.metadata.clone(),
            fields: self.fields.clone(),
        }
    }

    /// Initial config params: every declared field at its default
    pub fn default_params(&self) -> HashMap<String, String> {
        self.fields
            .iter()
            .map(|f| (f.name.clone(), f.default.clone().unwrap_or_default()))
            .collect()
    }
}

/// Result type for workspace operations
pub type WorkspaceResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Asynchronous unit of work behind one stage.
///
/// Implementations simulate latency and compute a deterministic artifact
/// from the given params and input artifacts. The caller serializes
/// invocations; an executor never observes two in-flight runs for the
/// same workspace. A real backend swap-in must keep this single-shot,
/// cancelable-by-abandonment contract.
#[async_trait]
pub trait StageExecutor: Send + Sync {
    async fn run(
        &self,
        params: HashMap<String, String>,
        inputs: Vec<Artifact>,
    ) -> WorkspaceResult<Artifact>;
}

/// Workspace handle for tracking an open workspace
#[derive(Debug, Clone)]
pub struct WorkspaceHandle {
    pub id: Uuid,
    pub agent_id: String,
}

impl WorkspaceHandle {
    pub fn new(id: Uuid, agent_id: String) -> Self {
        Self { id, agent_id }
    }

    pub fn id(&self) -> &Uuid {
        &self.id
    }
}

/// Completion handle for one stage invocation.
///
/// Awaiting it yields the workspace status after the executor resolved;
/// `None` means the workspace was reset or dropped first and the result
/// was discarded.
#[derive(Debug)]
pub struct StageCompletion {
    rx: oneshot::Receiver<WorkspaceStatus>,
}

impl StageCompletion {
    pub fn new(rx: oneshot::Receiver<WorkspaceStatus>) -> Self {
        Self { rx }
    }

    pub async fn wait(self) -> Option<WorkspaceStatus> {
        self.rx.await.ok()
    }
}

// ============================================================================
// Param helpers
// ============================================================================

/// Helpers for reading typed values out of a workspace's config params
pub mod params {
    use std::collections::HashMap;

    pub fn text<'a>(params: &'a HashMap<String, String>, name: &str) -> &'a str {
        params.get(name).map(|s| s.as_str()).unwrap_or("")
    }

    pub fn number(params: &HashMap<String, String>, name: &str, fallback: i64) -> i64 {
        params
            .get(name)
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(fallback)
    }
}

// ============================================================================
// Console Logging Macros (for the CLI host)
// ============================================================================

/// Logs an informational message.
///
/// # Example
/// ```
/// use agent_workspace_sdk::log_info;
/// log_info!("Opening workspace...");
/// ```
///
/// Outputs:
/// ```text
/// ℹ Opening workspace...
/// ```
#[macro_export]
macro_rules! log_info {
    ($message:expr) => {
        println!("\x1b[36mℹ {}\x1b[0m", $message);
    };
    ($fmt:expr, $($arg:tt)*) => {
        println!("\x1b[36mℹ {}\x1b[0m", format!($fmt, $($arg)*));
    };
}

/// Logs a success message.
///
/// # Example
/// ```
/// use agent_workspace_sdk::log_success;
/// log_success!("Stage complete");
/// ```
///
/// Outputs:
/// ```text
/// ✓ Stage complete
/// ```
#[macro_export]
macro_rules! log_success {
    ($message:expr) => {
        println!("\x1b[32m✓ {}\x1b[0m", $message);
    };
    ($fmt:expr, $($arg:tt)*) => {
        println!("\x1b[32m✓ {}\x1b[0m", format!($fmt, $($arg)*));
    };
}

/// Logs a warning message.
///
/// # Example
/// ```
/// use agent_workspace_sdk::log_warning;
/// log_warning!("Field 'text' is empty");
/// ```
///
/// Outputs:
/// ```text
/// ⚠ Warning: Field 'text' is empty
/// ```
#[macro_export]
macro_rules! log_warning {
    ($message:expr) => {
        println!("\x1b[33m⚠ Warning: {}\x1b[0m", $message);
    };
    ($fmt:expr, $($arg:tt)*) => {
        println!("\x1b[33m⚠ Warning: {}\x1b[0m", format!($fmt, $($arg)*));
    };
}

/// Logs an error message.
///
/// # Example
/// ```
/// use agent_workspace_sdk::log_error;
/// log_error!("Stage 'Draft booklet' failed");
/// ```
///
/// Outputs:
/// ```text
/// ✗ Stage 'Draft booklet' failed
/// ```
#[macro_export]
macro_rules! log_error {
    ($message:expr) => {
        println!("\x1b[31m✗ {}\x1b[0m", $message);
    };
    ($fmt:expr, $($arg:tt)*) => {
        println!("\x1b[31m✗ {}\x1b[0m", format!($fmt, $($arg)*));
    };
}

// ============================================================================
// Runtime trait
// ============================================================================

/// Runtime trait for agent discovery and workspace execution.
///
/// This provides a unified API for host surfaces (CLI today, a real UI
/// later); a backend-backed runtime can replace the in-process one
/// without changing consumers.
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    /// List all known agents with metadata
    fn list_agents(&self) -> WorkspaceResult<Vec<FullAgentMetadata>>;

    /// Get detailed metadata for a specific agent
    fn get_agent_metadata(&self, id: &str) -> WorkspaceResult<FullAgentMetadata>;

    /// Ordered stage schemas for a specific agent
    fn list_stages(&self, id: &str) -> WorkspaceResult<Vec<StageSchema>>;

    /// Validate config params against the agent's field schemas
    fn validate_params(&self, id: &str, params: &HashMap<String, String>) -> WorkspaceResult<()>;

    /// Open a new workspace bound to the given agent
    fn open_workspace(&self, id: &str) -> WorkspaceResult<WorkspaceHandle>;

    /// Set one config field on an open workspace
    fn set_param(&self, handle_id: &Uuid, name: &str, value: &str) -> WorkspaceResult<()>;

    /// Invoke a stage; returns a completion handle once the stage started
    async fn invoke_stage(&self, handle_id: &Uuid, stage: usize)
        -> WorkspaceResult<StageCompletion>;

    /// Current status of a workspace
    async fn get_status(&self, handle_id: &Uuid) -> WorkspaceResult<WorkspaceStatus>;

    /// Run log entries, newest first
    async fn get_run_log(
        &self,
        handle_id: &Uuid,
        limit: Option<usize>,
    ) -> WorkspaceResult<Vec<RunLogEntry>>;

    /// Subscribe to run log entries as they are appended
    async fn subscribe_run_log(
        &self,
        handle_id: &Uuid,
    ) -> WorkspaceResult<broadcast::Receiver<RunLogEntry>>;

    /// Stored artifact for a stage, if any
    async fn get_artifact(&self, handle_id: &Uuid, stage: usize)
        -> WorkspaceResult<Option<Artifact>>;

    /// Append an auxiliary-failure warning entry without changing status
    async fn record_warning(&self, handle_id: &Uuid, message: &str) -> WorkspaceResult<()>;

    /// Reset a workspace to defaults
    async fn reset_workspace(&self, handle_id: &Uuid) -> WorkspaceResult<()>;

    /// Close a workspace, discarding all state and any in-flight result
    async fn close_workspace(&self, handle_id: &Uuid) -> WorkspaceResult<()>;
}
