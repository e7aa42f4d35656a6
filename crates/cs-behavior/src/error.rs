use cs_agent::{AgentError, AgentKind, Capability};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BehaviorError {
    #[error("{behavior} requires {capability}, which a {kind} does not provide")]
    CapabilityMismatch {
        behavior:   &'static str,
        capability: Capability,
        kind:       AgentKind,
    },

    #[error(transparent)]
    Agent(#[from] AgentError),
}

pub type BehaviorResult<T> = Result<T, BehaviorError>;
