//! Read-only simulation state passed to every behavior callback.

use cs_core::Step;

use crate::Environment;

/// A read-only snapshot of the simulation state passed to every
/// [`Behavior`][crate::Behavior] callback.
///
/// Built once per step by cs-sim and shared across all agents (and worker
/// threads) during the behavior phase.
pub struct SimContext<'a> {
    /// Current simulation step.
    pub step: Step,

    /// Simulated time units per step; scales rate-based updates such as
    /// `change_volume`.
    pub time_step: f64,

    /// Live agents at the start of the step.  Agents created or removed
    /// during the step are not reflected until the next one.
    pub agent_count: usize,

    /// Neighbor queries, refreshed at the start of the step.
    pub environment: &'a dyn Environment,
}

impl<'a> SimContext<'a> {
    #[inline]
    pub fn new(
        step:        Step,
        time_step:   f64,
        agent_count: usize,
        environment: &'a dyn Environment,
    ) -> Self {
        Self { step, time_step, agent_count, environment }
    }
}
