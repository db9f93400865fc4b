//! Application State

use std::sync::Arc;

use agent_core::{session::MemorySessionStore, Agent};
use tokio::sync::Mutex;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Turn orchestrator with its provider and toolbox
    pub agent: Arc<Agent>,

    /// Display transcripts, one per session
    pub sessions: Arc<MemorySessionStore>,

    /// Held for the whole of a turn so turns run one at a time
    pub turn_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(agent: Agent) -> Self {
        Self {
            agent: Arc::new(agent),
            sessions: Arc::new(MemorySessionStore::new()),
            turn_lock: Arc::new(Mutex::new(())),
        }
    }
}
