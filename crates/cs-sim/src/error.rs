use cs_behavior::BehaviorError;
use cs_core::{AgentUid, CsError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("{what} length {got} does not match agent count {expected}")]
    AgentCountMismatch {
        expected: usize,
        got:      usize,
        what:     &'static str,
    },

    #[error("population of {requested} would exceed max_agents = {limit}")]
    CapacityExceeded {
        limit:     usize,
        requested: usize,
    },

    #[error("agent {0} not found")]
    AgentNotFound(AgentUid),

    #[error(transparent)]
    Behavior(#[from] BehaviorError),

    #[error(transparent)]
    Core(#[from] CsError),
}

pub type SimResult<T> = Result<T, SimError>;
