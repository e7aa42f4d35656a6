//! Simulation observer trait for progress reporting and data collection.

use cs_agent::{AgentStore, Extension};
use cs_core::Step;

/// What happened during one step, reported after the apply phase.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StepSummary {
    pub step:      Step,
    /// Live agents after the step.
    pub agents:    usize,
    pub divisions: usize,
    pub spawned:   usize,
    pub removed:   usize,
}

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// step loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter { interval: u64 }
///
/// impl SimObserver for ProgressPrinter {
///     fn on_step_end(&mut self, summary: &StepSummary) {
///         if summary.step.0 % self.interval == 0 {
///             println!("{}: {} agents", summary.step, summary.agents);
///         }
///     }
/// }
/// ```
pub trait SimObserver<X: Extension = ()> {
    /// Called at the very start of each step, before any behavior runs.
    fn on_step_start(&mut self, _step: Step) {}

    /// Called once the step's creations and removals have been applied.
    fn on_step_end(&mut self, _summary: &StepSummary) {}

    /// Called at snapshot intervals (every `config.output_interval_steps`
    /// steps) with read-only access to the whole store.
    fn on_snapshot(&mut self, _step: Step, _agents: &AgentStore<X>) {}

    /// Called once after the final step completes.
    fn on_sim_end(&mut self, _final_step: Step) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl<X: Extension> SimObserver<X> for NoopObserver {}
