// Workspace state machine
pub mod workspace;

// In-process runtime implementation
pub mod runtime;

// Fixed agent registry
pub mod registry;

// Per-agent definitions and executors
pub mod agents;

// Keyword scan helpers
pub mod keyword;

// Session state
pub mod session;

// REST client for the account endpoints
pub mod api;

// Export sink
pub mod export;
