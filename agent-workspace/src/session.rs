//! Session state: the signed-in user as an explicit value.
//!
//! The session is loaded once at startup and injected into the runtime;
//! workspaces never read ambient user state. Sign-in persists the user to
//! a platform config file so the session survives restarts; sign-out
//! removes it.

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Account record shared with the REST backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub created_at: String,
}

/// Signed-in state injected into the runtime at construction
#[derive(Debug, Clone, Default)]
pub struct Session {
    user: Option<User>,
}

impl Session {
    pub fn signed_out() -> Self {
        Self { user: None }
    }

    pub fn for_user(user: User) -> Self {
        Self { user: Some(user) }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Display name used for cosmetic labeling only
    pub fn display_name(&self) -> Option<String> {
        self.user.as_ref().map(|u| u.full_name.clone())
    }
}

/// Path of the persisted session file
pub fn session_file_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("com", "aicademy", "agent-workspace") {
        proj_dirs.config_dir().join("current_user.json")
    } else {
        PathBuf::from(".agent-workspace-session.json")
    }
}

/// Load the persisted session; a missing or corrupt file reads as signed out
pub fn load_session() -> Session {
    let path = session_file_path();
    match std::fs::read_to_string(&path) {
        Ok(content) => match serde_json::from_str::<User>(&content) {
            Ok(user) => Session::for_user(user),
            Err(_) => {
                // Corrupt payloads are dropped rather than surfaced
                let _ = std::fs::remove_file(&path);
                Session::signed_out()
            }
        },
        Err(_) => Session::signed_out(),
    }
}

/// Persist the signed-in user (called at sign-in)
pub fn save_session(user: &User) -> Result<()> {
    let path = session_file_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(user)?)?;
    Ok(())
}

/// Remove the persisted session (called at sign-out)
pub fn clear_session() -> Result<()> {
    let path = session_file_path();
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    Ok(())
}
