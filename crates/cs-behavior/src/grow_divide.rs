//! Grow until a diameter threshold, then divide.

use cs_agent::{Agent, Capability, Division, Extension};
use cs_core::AgentRng;

use crate::{Behavior, BehaviorResult, Intent, SimContext};

/// Grows its owner by `growth_rate` volume per unit time while the diameter
/// is at most `threshold`; once above, divides every step it runs.
///
/// Copied to both daughters on division.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GrowDivide {
    pub threshold:   f64,
    pub growth_rate: f64,
}

impl Default for GrowDivide {
    fn default() -> Self {
        Self { threshold: 40.0, growth_rate: 300.0 }
    }
}

impl GrowDivide {
    pub fn new(threshold: f64, growth_rate: f64) -> Self {
        Self { threshold, growth_rate }
    }
}

impl<X: Extension> Behavior<X> for GrowDivide {
    fn run(
        &mut self,
        agent: &mut dyn Agent<Ext = X>,
        ctx:   &SimContext<'_>,
        rng:   &mut AgentRng,
    ) -> BehaviorResult<Vec<Intent<X>>> {
        if agent.diameter() <= self.threshold {
            agent.change_volume(self.growth_rate, ctx.time_step);
            Ok(vec![])
        } else {
            let daughter = agent.divide(rng, Division::random())?;
            Ok(vec![Intent::Divided(daughter)])
        }
    }

    fn copy_on_divide(&self) -> bool {
        true
    }

    fn requires(&self) -> &'static [Capability] {
        &[Capability::Geometry, Capability::Division]
    }

    fn name(&self) -> &'static str {
        "GrowDivide"
    }
}
