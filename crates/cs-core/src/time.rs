//! Simulation time model.
//!
//! # Design
//!
//! Time advances in whole `Step`s.  Continuous-rate quantities (volume
//! growth, dose decay, …) are integrated by multiplying with the fixed
//! `time_step` held in `SimClock`:
//!
//!   elapsed = step * time_step
//!
//! Keeping the step counter integral means every comparison a behavior makes
//! ("has the treatment step passed?") is exact.

use std::fmt;

use crate::{CsError, CsResult};

// ── Step ──────────────────────────────────────────────────────────────────────

/// An absolute simulation step counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Step(pub u64);

impl Step {
    pub const ZERO: Step = Step(0);

    /// Return the step `n` after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Step {
        Step(self.0 + n)
    }

    /// Steps elapsed from `earlier` to `self`, saturating at zero.
    #[inline]
    pub fn since(self, earlier: Step) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl std::ops::Add<u64> for Step {
    type Output = Step;
    #[inline]
    fn add(self, rhs: u64) -> Step {
        Step(self.0 + rhs)
    }
}

impl std::ops::Sub for Step {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Step) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Current step plus the integration step it represents.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Simulated time units per step.  Default: 0.01.
    pub time_step: f64,
    /// The current step, advanced by `SimClock::advance()` each iteration.
    pub current_step: Step,
}

impl SimClock {
    pub fn new(time_step: f64) -> Self {
        Self {
            time_step,
            current_step: Step::ZERO,
        }
    }

    /// Advance the clock by one step.
    #[inline]
    pub fn advance(&mut self) {
        self.current_step = self.current_step + 1;
    }

    /// Simulated time elapsed since step 0.
    #[inline]
    pub fn elapsed(&self) -> f64 {
        self.current_step.0 as f64 * self.time_step
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (t = {:.4})", self.current_step, self.elapsed())
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Total steps to simulate.
    pub total_steps: u64,

    /// Simulated time units per step; scales every rate-based update.
    pub time_step: f64,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Worker thread count passed to Rayon.  `None` uses all logical cores.
    pub num_threads: Option<usize>,

    /// Snapshot every N steps.  0 disables snapshots.
    pub output_interval_steps: u64,

    /// Upper bound on the live population.  `None` means unbounded.
    pub max_agents: Option<usize>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            total_steps:           100,
            time_step:             0.01,
            seed:                  0,
            num_threads:           None,
            output_interval_steps: 0,
            max_agents:            None,
        }
    }
}

impl SimConfig {
    /// The step at which the simulation ends (exclusive upper bound).
    #[inline]
    pub fn end_step(&self) -> Step {
        Step(self.total_steps)
    }

    /// Construct a `SimClock` pre-configured for this run.
    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.time_step)
    }

    /// Reject settings the step driver cannot honour.
    pub fn validate(&self) -> CsResult<()> {
        if !(self.time_step.is_finite() && self.time_step > 0.0) {
            return Err(CsError::Config(format!(
                "time_step must be positive and finite, got {}",
                self.time_step
            )));
        }
        if self.max_agents == Some(0) {
            return Err(CsError::Config("max_agents must be at least 1".into()));
        }
        if self.num_threads == Some(0) {
            return Err(CsError::Config("num_threads must be at least 1".into()));
        }
        Ok(())
    }
}
