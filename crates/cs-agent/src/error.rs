use thiserror::Error;

use crate::{AgentKind, Capability};

/// Invariant violations.  The agent is left unmutated whenever one of these
/// is returned.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("volume ratio must be positive and finite, got {0}")]
    InvalidVolumeRatio(f64),

    #[error("division axis has zero length or is not finite")]
    DegenerateAxis,

    #[error("division would leave a daughter with volume {volume} below the floor")]
    BelowVolumeFloor { volume: f64 },

    #[error("local axes are not orthonormal")]
    NonOrthonormalAxes,

    #[error("invalid {field}: {value}")]
    InvalidValue { field: &'static str, value: f64 },

    #[error("{kind} does not support {capability}")]
    Unsupported {
        kind:       AgentKind,
        capability: Capability,
    },
}

pub type AgentResult<T> = Result<T, AgentError>;
