//! In-process implementation of the `AgentRuntime` trait.
//!
//! Holds the agent registry plus the live workspaces, keyed by handle.
//! A backend-backed runtime can replace this one behind the same trait.

use agent_workspace_sdk::{
    async_trait, AgentDescriptor, AgentRuntime, Artifact, FullAgentMetadata, RunLogEntry,
    StageCompletion, StageSchema, WorkspaceHandle, WorkspaceResult, WorkspaceStatus,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::registry;
use crate::session::Session;
use crate::workspace::Workspace;

pub struct InProcessRuntime {
    /// Registry in dashboard order
    agents: Vec<Arc<AgentDescriptor>>,
    /// Open workspaces (handle id -> workspace)
    workspaces: Arc<Mutex<HashMap<Uuid, Workspace>>>,
}

impl InProcessRuntime {
    /// Build a runtime over the fixed registry, with the session injected
    /// into the descriptors that use it
    pub fn new(session: &Session) -> Self {
        Self {
            agents: registry::all(session),
            workspaces: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn agent(&self, id: &str) -> WorkspaceResult<&Arc<AgentDescriptor>> {
        self.agents
            .iter()
            .find(|d| d.metadata.id == id)
            .ok_or_else(|| format!("Agent '{}' not found", id).into())
    }

    fn workspace(&self, handle_id: &Uuid) -> WorkspaceResult<Workspace> {
        self.workspaces
            .lock()
            .unwrap()
            .get(handle_id)
            .cloned()
            .ok_or_else(|| format!("Workspace not found: {}", handle_id).into())
    }
}

#[async_trait]
impl AgentRuntime for InProcessRuntime {
    fn list_agents(&self) -> WorkspaceResult<Vec<FullAgentMetadata>> {
        Ok(self.agents.iter().map(|d| d.full_metadata()).collect())
    }

    fn get_agent_metadata(&self, id: &str) -> WorkspaceResult<FullAgentMetadata> {
        Ok(self.agent(id)?.full_metadata())
    }

    fn list_stages(&self, id: &str) -> WorkspaceResult<Vec<StageSchema>> {
        Ok(self
            .agent(id)?
            .stages
            .iter()
            .map(|b| b.schema.clone())
            .collect())
    }

    fn validate_params(&self, id: &str, params: &HashMap<String, String>) -> WorkspaceResult<()> {
        let agent = self.agent(id)?;

        for name in params.keys() {
            if !agent.fields.iter().any(|f| &f.name == name) {
                return Err(format!("Unknown field '{}' for agent '{}'", name, id).into());
            }
        }

        for field in &agent.fields {
            let value = params
                .get(&field.name)
                .map(|v| v.trim().to_string())
                .or_else(|| field.default.clone())
                .unwrap_or_default();
            if value.is_empty() {
                if field.required {
                    return Err(format!("Required field '{}' missing", field.name).into());
                }
                continue;
            }
            field.validate(&value)?;
        }

        Ok(())
    }

    fn open_workspace(&self, id: &str) -> WorkspaceResult<WorkspaceHandle> {
        let descriptor = self.agent(id)?.clone();
        let workspace = Workspace::new(descriptor);

        let handle_id = Uuid::new_v4();
        self.workspaces.lock().unwrap().insert(handle_id, workspace);

        Ok(WorkspaceHandle::new(handle_id, id.to_string()))
    }

    fn set_param(&self, handle_id: &Uuid, name: &str, value: &str) -> WorkspaceResult<()> {
        Ok(self.workspace(handle_id)?.set_param(name, value)?)
    }

    async fn invoke_stage(
        &self,
        handle_id: &Uuid,
        stage: usize,
    ) -> WorkspaceResult<StageCompletion> {
        Ok(self.workspace(handle_id)?.invoke(stage)?)
    }

    async fn get_status(&self, handle_id: &Uuid) -> WorkspaceResult<WorkspaceStatus> {
        Ok(self.workspace(handle_id)?.status())
    }

    async fn get_run_log(
        &self,
        handle_id: &Uuid,
        limit: Option<usize>,
    ) -> WorkspaceResult<Vec<RunLogEntry>> {
        Ok(self.workspace(handle_id)?.run_log(limit))
    }

    async fn subscribe_run_log(
        &self,
        handle_id: &Uuid,
    ) -> WorkspaceResult<broadcast::Receiver<RunLogEntry>> {
        Ok(self.workspace(handle_id)?.subscribe())
    }

    async fn get_artifact(
        &self,
        handle_id: &Uuid,
        stage: usize,
    ) -> WorkspaceResult<Option<Artifact>> {
        Ok(self.workspace(handle_id)?.artifact(stage))
    }

    async fn record_warning(&self, handle_id: &Uuid, message: &str) -> WorkspaceResult<()> {
        self.workspace(handle_id)?.record_warning(message);
        Ok(())
    }

    async fn reset_workspace(&self, handle_id: &Uuid) -> WorkspaceResult<()> {
        self.workspace(handle_id)?.reset();
        Ok(())
    }

    async fn close_workspace(&self, handle_id: &Uuid) -> WorkspaceResult<()> {
        self.workspaces
            .lock()
            .unwrap()
            .remove(handle_id)
            .map(|_| ())
            .ok_or_else(|| format!("Workspace not found: {}", handle_id).into())
    }
}
