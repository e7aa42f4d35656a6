//! Division counts and periodic population logs.

use cs_agent::AgentStore;
use cs_core::Step;
use cs_sim::{SimObserver, StepSummary};
use tracing::info;

/// Running totals over one growth run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GrowthObserver {
    pub divisions:   usize,
    pub peak_agents: usize,
}

impl SimObserver for GrowthObserver {
    fn on_step_end(&mut self, summary: &StepSummary) {
        self.divisions += summary.divisions;
        self.peak_agents = self.peak_agents.max(summary.agents);
    }

    fn on_snapshot(&mut self, step: Step, agents: &AgentStore) {
        let diameters = agents.diameters();
        let smallest = diameters.iter().copied().fold(f64::INFINITY, f64::min);
        let largest = diameters.iter().copied().fold(0.0, f64::max);
        info!(
            %step,
            agents    = agents.len(),
            divisions = self.divisions,
            smallest,
            largest,
            "population"
        );
    }
}
