//! Intents: what a behavior asks the step driver to do at the step boundary.

use std::fmt;

use cs_agent::{Cell, Extension};

use crate::Behavior;

/// A request produced by [`Behavior::run`][crate::Behavior::run].
///
/// Nothing here touches storage immediately.  The step driver buffers every
/// intent and applies them after all agents have run, so iteration order and
/// indices stay stable for the rest of the step.
pub enum Intent<X: Extension> {
    /// The owner divided; `0` is the daughter it returned.
    ///
    /// The driver stores the daughter and attaches fresh copies of every
    /// copy-on-divide behavior of the owner.
    Divided(Cell<X>),

    /// Create an unrelated agent with an explicit behavior set (recruitment,
    /// proliferation from a template).
    Spawn {
        cell:      Cell<X>,
        behaviors: Vec<Box<dyn Behavior<X>>>,
    },

    /// Remove the owner at the end of the step.
    Remove,

    /// Detach the behavior that returned this intent from its owner.
    Detach,
}

impl<X: Extension> Intent<X> {
    pub fn spawn(cell: Cell<X>, behaviors: Vec<Box<dyn Behavior<X>>>) -> Self {
        Intent::Spawn { cell, behaviors }
    }
}

impl<X: Extension> fmt::Debug for Intent<X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::Divided(cell) => f.debug_tuple("Divided").field(cell).finish(),
            Intent::Spawn { cell, behaviors } => f
                .debug_struct("Spawn")
                .field("cell", cell)
                .field("behaviors", &behaviors.iter().map(|b| b.name()).collect::<Vec<_>>())
                .finish(),
            Intent::Remove => f.write_str("Remove"),
            Intent::Detach => f.write_str("Detach"),
        }
    }
}
