//! Fixed registry of the six teaching-assistant agents.

use agent_workspace_sdk::AgentDescriptor;
use std::sync::Arc;

use crate::agents::{booklet, code_review, evaluation, homework, syllabus, topic};
use crate::session::Session;

/// All agents, in dashboard order.
///
/// The session is injected here so descriptors that decorate output with
/// the display name (booklet) never reach for ambient state.
pub fn all(session: &Session) -> Vec<Arc<AgentDescriptor>> {
    vec![
        Arc::new(topic::descriptor()),
        Arc::new(syllabus::descriptor()),
        Arc::new(homework::descriptor()),
        Arc::new(evaluation::descriptor()),
        Arc::new(booklet::descriptor(session.display_name())),
        Arc::new(code_review::descriptor()),
    ]
}

/// Look up one agent by its identifier.
///
/// Unknown identifiers resolve to `None`; callers render a graceful
/// fallback instead of failing.
pub fn find(session: &Session, id: &str) -> Option<Arc<AgentDescriptor>> {
    all(session).into_iter().find(|d| d.metadata.id == id)
}
