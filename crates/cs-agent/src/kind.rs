//! Agent kinds and the capabilities they carry.
//!
//! Behaviors declare the capabilities they need; the resource manager checks
//! them against the agent's kind when the behavior is attached, so nothing
//! has to recover a concrete type at run time.

use std::fmt;

/// What an agent is.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AgentKind {
    /// A biological cell: spherical, can grow and divide.
    #[default]
    Cell,
    /// A passive sphere: occupies space and exerts forces but never divides.
    Inert,
}

/// Something a behavior may require of its owner.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Capability {
    /// Position, diameter, volume, density, axes.
    Geometry,
    /// Volume-conserving division.
    Division,
}

impl AgentKind {
    pub fn supports(self, capability: Capability) -> bool {
        match (self, capability) {
            (_, Capability::Geometry) => true,
            (AgentKind::Cell, Capability::Division) => true,
            (AgentKind::Inert, Capability::Division) => false,
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentKind::Cell => f.write_str("cell"),
            AgentKind::Inert => f.write_str("inert sphere"),
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Geometry => f.write_str("geometry"),
            Capability::Division => f.write_str("division"),
        }
    }
}
