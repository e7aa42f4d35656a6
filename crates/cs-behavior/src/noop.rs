//! A behavior that does nothing.

use cs_agent::{Agent, Extension};
use cs_core::AgentRng;

use crate::{Behavior, BehaviorResult, Intent, SimContext};

/// A [`Behavior`] that never changes its owner and never produces intents.
///
/// Useful as a placeholder in tests or for passive populations that simply
/// occupy space.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopBehavior;

impl<X: Extension> Behavior<X> for NoopBehavior {
    fn run(
        &mut self,
        _agent: &mut dyn Agent<Ext = X>,
        _ctx:   &SimContext<'_>,
        _rng:   &mut AgentRng,
    ) -> BehaviorResult<Vec<Intent<X>>> {
        Ok(vec![])
    }
}
