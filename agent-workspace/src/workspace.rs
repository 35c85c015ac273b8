//! Workspace state machine.
//!
//! One `Workspace` binds one agent descriptor to the state it owns: the
//! config params, the artifacts produced by each stage, the run log, and
//! the current status. The machine is the single writer; host surfaces
//! observe it only through the read accessors.

use agent_workspace_sdk::{
    AgentDescriptor, Artifact, RunLogEntry, Severity, StageBinding, StageCompletion,
    WorkspaceStatus,
};
use chrono::Utc;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, oneshot};

// ---------------------------------------------------------------------------
// WorkspaceError
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum WorkspaceError {
    /// A stage is still running; invocations are strictly serialized
    StageInFlight { running: usize, requested: usize },
    /// The requested stage cannot be invoked from the current status
    IllegalTransition { requested: usize },
    UnknownStage(usize),
    UnknownField(String),
    /// Precondition failure; the workspace moved to `error` with this message
    Validation(String),
}

impl fmt::Display for WorkspaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StageInFlight { running, requested } => write!(
                f,
                "stage {running} is still running; invocation of stage {requested} rejected"
            ),
            Self::IllegalTransition { requested } => {
                write!(f, "stage {requested} cannot be invoked from the current status")
            }
            Self::UnknownStage(stage) => write!(f, "unknown stage index: {stage}"),
            Self::UnknownField(name) => write!(f, "unknown config field: {name}"),
            Self::Validation(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for WorkspaceError {}

// ---------------------------------------------------------------------------
// Workspace
// ---------------------------------------------------------------------------

struct Inner {
    status: WorkspaceStatus,
    params: HashMap<String, String>,
    artifacts: HashMap<usize, Artifact>,
    run_log: Vec<RunLogEntry>,
    next_log_id: u64,
    /// Bumped on reset; in-flight results from an older epoch are discarded
    epoch: u64,
}

/// One live workspace instance.
///
/// Cloning shares the underlying state; dropping the last clone discards
/// it, and any executor result that resolves afterwards is thrown away.
#[derive(Clone)]
pub struct Workspace {
    descriptor: Arc<AgentDescriptor>,
    inner: Arc<Mutex<Inner>>,
    logs_tx: broadcast::Sender<RunLogEntry>,
}

impl Workspace {
    pub fn new(descriptor: Arc<AgentDescriptor>) -> Self {
        let params = descriptor.default_params();
        let (logs_tx, _) = broadcast::channel(256);
        Self {
            descriptor,
            inner: Arc::new(Mutex::new(Inner {
                status: WorkspaceStatus::Idle,
                params,
                artifacts: HashMap::new(),
                run_log: Vec::new(),
                next_log_id: 0,
                epoch: 0,
            })),
            logs_tx,
        }
    }

    pub fn descriptor(&self) -> &AgentDescriptor {
        &self.descriptor
    }

    pub fn status(&self) -> WorkspaceStatus {
        self.inner.lock().unwrap().status.clone()
    }

    pub fn params(&self) -> HashMap<String, String> {
        self.inner.lock().unwrap().params.clone()
    }

    /// Set one config field; the field must be declared by the agent
    pub fn set_param(&self, name: &str, value: &str) -> Result<(), WorkspaceError> {
        if !self.descriptor.fields.iter().any(|f| f.name == name) {
            return Err(WorkspaceError::UnknownField(name.to_string()));
        }
        let mut inner = self.inner.lock().unwrap();
        inner.params.insert(name.to_string(), value.to_string());
        Ok(())
    }

    /// Stored artifact for a stage, if any
    pub fn artifact(&self, stage: usize) -> Option<Artifact> {
        self.inner.lock().unwrap().artifacts.get(&stage).cloned()
    }

    /// Run log entries, newest first
    pub fn run_log(&self, limit: Option<usize>) -> Vec<RunLogEntry> {
        let inner = self.inner.lock().unwrap();
        let entries = inner.run_log.iter().rev().cloned();
        match limit {
            Some(limit) => entries.take(limit).collect(),
            None => entries.collect(),
        }
    }

    /// Subscribe to run log entries as they are appended
    pub fn subscribe(&self) -> broadcast::Receiver<RunLogEntry> {
        self.logs_tx.subscribe()
    }

    /// Append an auxiliary-failure warning without changing status
    pub fn record_warning(&self, message: &str) {
        let mut inner = self.inner.lock().unwrap();
        Self::append_log(&mut inner, &self.logs_tx, Severity::Warning, message);
    }

    /// Clear config to defaults, discard artifacts and run log, return to idle.
    ///
    /// Any in-flight executor result is discarded when it arrives.
    pub fn reset(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.params = self.descriptor.default_params();
        inner.artifacts.clear();
        inner.run_log.clear();
        inner.next_log_id = 0;
        inner.status = WorkspaceStatus::Idle;
        inner.epoch += 1;
    }

    /// Invoke a stage.
    ///
    /// Rejected without state change while a stage is running, or when the
    /// current status does not allow the requested stage. A failed
    /// precondition check moves the workspace to `error(stage)` with a
    /// warning entry and never calls the executor. On success the executor
    /// runs on a background task; await the returned completion to observe
    /// the post-transition status.
    pub fn invoke(&self, stage: usize) -> Result<StageCompletion, WorkspaceError> {
        let binding = self
            .descriptor
            .stages
            .get(stage)
            .ok_or(WorkspaceError::UnknownStage(stage))?
            .clone();

        let (tx, rx) = oneshot::channel();
        let epoch;
        let params;
        let inputs;
        {
            let mut inner = self.inner.lock().unwrap();

            match &inner.status {
                WorkspaceStatus::Running { stage: running } => {
                    return Err(WorkspaceError::StageInFlight {
                        running: *running,
                        requested: stage,
                    });
                }
                WorkspaceStatus::Ready { stage: ready } => {
                    // Re-run the same stage or advance to the next one
                    if *ready != stage && *ready + 1 != stage {
                        return Err(WorkspaceError::IllegalTransition { requested: stage });
                    }
                }
                // Error is recoverable: retry the same stage, or run the
                // stage whose missing artifact caused the failure. The
                // precondition check below gates either path.
                WorkspaceStatus::Error { .. } => {}
                WorkspaceStatus::Idle => {}
            }

            if let Err(message) = self.check_preconditions(&inner, &binding) {
                inner.status = WorkspaceStatus::Error {
                    stage,
                    message: message.clone(),
                };
                Self::append_log(&mut inner, &self.logs_tx, Severity::Warning, &message);
                return Err(WorkspaceError::Validation(message));
            }

            inner.status = WorkspaceStatus::Running { stage };
            Self::append_log(
                &mut inner,
                &self.logs_tx,
                Severity::Info,
                &format!("Stage '{}' started", binding.schema.name),
            );

            epoch = inner.epoch;
            params = inner.params.clone();
            inputs = binding
                .schema
                .requires
                .iter()
                .filter_map(|required| inner.artifacts.get(required).cloned())
                .collect::<Vec<_>>();
        }

        let weak = Arc::downgrade(&self.inner);
        let logs_tx = self.logs_tx.clone();
        let stage_name = binding.schema.name.clone();
        let executor = binding.executor.clone();

        tokio::spawn(async move {
            let result = executor.run(params, inputs).await;

            // The workspace was dropped or reset while we ran: discard.
            let Some(inner) = weak.upgrade() else { return };
            let mut inner = inner.lock().unwrap();
            if inner.epoch != epoch {
                return;
            }

            let status = match result {
                Ok(artifact) => {
                    inner.artifacts.insert(stage, artifact);
                    Self::append_log(
                        &mut inner,
                        &logs_tx,
                        Severity::Success,
                        &format!("Stage '{}' completed", stage_name),
                    );
                    WorkspaceStatus::Ready { stage }
                }
                Err(err) => {
                    let message = err.to_string();
                    Self::append_log(
                        &mut inner,
                        &logs_tx,
                        Severity::Error,
                        &format!("Stage '{}' failed: {}", stage_name, message),
                    );
                    WorkspaceStatus::Error { stage, message }
                }
            };
            inner.status = status.clone();
            let _ = tx.send(status);
        });

        Ok(StageCompletion::new(rx))
    }

    fn check_preconditions(&self, inner: &Inner, binding: &StageBinding) -> Result<(), String> {
        let stage = binding.schema.index;

        for field in &self.descriptor.fields {
            let value = inner
                .params
                .get(&field.name)
                .map(|v| v.trim())
                .unwrap_or("");
            if value.is_empty() {
                if field.required_for_stage(stage) {
                    return Err(format!(
                        "Field '{}' is required before running '{}'",
                        field.label, binding.schema.name
                    ));
                }
                continue;
            }
            field.validate(value)?;
        }

        if let Some(check) = binding.check {
            check(&inner.params)?;
        }

        for required in &binding.schema.requires {
            if !inner.artifacts.contains_key(required) {
                let name = self
                    .descriptor
                    .stages
                    .get(*required)
                    .map(|b| b.schema.name.as_str())
                    .unwrap_or("an earlier stage");
                return Err(format!("Run '{}' before '{}'", name, binding.schema.name));
            }
        }

        Ok(())
    }

    fn append_log(
        inner: &mut Inner,
        logs_tx: &broadcast::Sender<RunLogEntry>,
        severity: Severity,
        message: &str,
    ) {
        let entry = RunLogEntry {
            id: inner.next_log_id,
            timestamp: Utc::now(),
            severity,
            message: message.to_string(),
        };
        inner.next_log_id += 1;
        inner.run_log.push(entry.clone());
        let _ = logs_tx.send(entry);
    }
}
