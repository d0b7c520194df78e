use std::collections::HashMap;
use std::sync::Arc;

use agency_contracts::{AgentRequest, AgentResponse};
use async_trait::async_trait;

/// The external "Agent" collaborator: an opaque executable invoked with a
/// request, returning a structured output or a typed error. Agents'
/// internal analysis logic is out of scope for this runtime.
#[async_trait]
pub trait AgentInvoker: Send + Sync {
    async fn invoke(&self, request: AgentRequest) -> AgentResponse;
}

/// A startup-populated, shared, read-mostly map of agent name -> invoker.
#[derive(Clone, Default)]
pub struct AgentRegistry {
    agents: HashMap<String, Arc<dyn AgentInvoker>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, agent: Arc<dyn AgentInvoker>) {
        self.agents.insert(name.into(), agent);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn AgentInvoker>> {
        self.agents.get(name).cloned()
    }
}
