//! Growth and division with per-cell random thresholds.
//!
//! Each cell draws its own division threshold and growth rate from a
//! population distribution ([`GrowthPopulation`]) when the behavior is
//! initialized, so daughters differ from their mothers.
//!
//! Every step:
//!
//! | Diameter          | Action                                                         |
//! |-------------------|----------------------------------------------------------------|
//! | `≤ threshold`     | grow by `max(N(rate, 0.1·rate), 0)`; divide with p = 0.001     |
//! | `> threshold`     | divide with p = 0.1 · σ((d − threshold) / 5)                   |

use cs_agent::{Agent, Capability, Division, Extension};
use cs_core::{AgentRng, CsError, CsResult, Random};

use crate::{Behavior, BehaviorList, BehaviorResult, Intent, SimContext};

/// Smallest threshold a cell may draw.
const MIN_THRESHOLD: f64 = 5.0;
/// Smallest growth rate a cell may draw.
const MIN_GROWTH_RATE: f64 = 10.0;
/// Relative noise on each step's growth.
const GROWTH_NOISE: f64 = 0.1;
/// Per-step division probability below the threshold.
const SPONTANEOUS_DIVISION: f64 = 0.001;
/// Width of the sigmoid above the threshold.
const SIGMOID_SCALE: f64 = 5.0;
/// Ceiling of the per-step division probability above the threshold.
const MAX_DIVISION_PROBABILITY: f64 = 0.1;

// ── GrowthPopulation ──────────────────────────────────────────────────────────

/// Population-level distribution of thresholds and growth rates.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GrowthPopulation {
    pub threshold_mean:   f64,
    pub threshold_std:    f64,
    pub growth_rate_mean: f64,
    pub growth_rate_std:  f64,
}

impl Default for GrowthPopulation {
    fn default() -> Self {
        Self::new(40.0, 5.0, 300.0, 50.0)
    }
}

impl GrowthPopulation {
    pub fn new(threshold_mean: f64, threshold_std: f64, growth_rate_mean: f64, growth_rate_std: f64) -> Self {
        Self { threshold_mean, threshold_std, growth_rate_mean, growth_rate_std }
    }

    /// Small, fast, highly variable cells.
    pub fn fast_growing() -> Self {
        Self::new(35.0, 8.0, 400.0, 80.0)
    }

    /// Large, slow, consistent cells.
    pub fn slow_growing() -> Self {
        Self::new(50.0, 2.0, 200.0, 20.0)
    }

    /// Default means with wide spread.
    pub fn high_variability() -> Self {
        Self::new(40.0, 15.0, 300.0, 100.0)
    }

    pub fn validate(&self) -> CsResult<()> {
        let fields = [
            ("threshold_mean", self.threshold_mean),
            ("threshold_std", self.threshold_std),
            ("growth_rate_mean", self.growth_rate_mean),
            ("growth_rate_std", self.growth_rate_std),
        ];
        for (name, value) in fields {
            if !(value.is_finite() && value >= 0.0) {
                return Err(CsError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }
}

// ── StochasticGrowthDivision ──────────────────────────────────────────────────

/// See the [module docs](self).
#[derive(Clone, Debug)]
pub struct StochasticGrowthDivision {
    population:  GrowthPopulation,
    threshold:   f64,
    growth_rate: f64,
}

impl Default for StochasticGrowthDivision {
    fn default() -> Self {
        Self::new(GrowthPopulation::default())
    }
}

impl StochasticGrowthDivision {
    /// Individual parameters start at the population means and are redrawn
    /// when the behavior is attached.
    pub fn new(population: GrowthPopulation) -> Self {
        Self {
            population,
            threshold:   population.threshold_mean.max(MIN_THRESHOLD),
            growth_rate: population.growth_rate_mean.max(MIN_GROWTH_RATE),
        }
    }

    pub fn population(&self) -> &GrowthPopulation {
        &self.population
    }

    /// This cell's division threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// This cell's mean growth rate.
    pub fn growth_rate(&self) -> f64 {
        self.growth_rate
    }

    fn division_probability(&self, diameter: f64) -> f64 {
        let excess = diameter - self.threshold;
        let sigmoid = 1.0 / (1.0 + (-excess / SIGMOID_SCALE).exp());
        sigmoid * MAX_DIVISION_PROBABILITY
    }
}

impl<X: Extension> Behavior<X> for StochasticGrowthDivision {
    fn run(
        &mut self,
        agent: &mut dyn Agent<Ext = X>,
        ctx:   &SimContext<'_>,
        rng:   &mut AgentRng,
    ) -> BehaviorResult<Vec<Intent<X>>> {
        let divide = if agent.diameter() <= self.threshold {
            let growth = rng.gaussian(self.growth_rate, self.growth_rate * GROWTH_NOISE).max(0.0);
            agent.change_volume(growth, ctx.time_step);
            rng.uniform() < SPONTANEOUS_DIVISION
        } else {
            rng.uniform() < self.division_probability(agent.diameter())
        };

        if divide {
            let daughter = agent.divide(rng, Division::random())?;
            Ok(vec![Intent::Divided(daughter)])
        } else {
            Ok(vec![])
        }
    }

    fn copy_on_divide(&self) -> bool {
        true
    }

    fn requires(&self) -> &'static [Capability] {
        &[Capability::Geometry, Capability::Division]
    }

    fn initialize(&mut self, rng: &mut AgentRng) {
        let p = &self.population;
        self.threshold = rng.gaussian(p.threshold_mean, p.threshold_std).max(MIN_THRESHOLD);
        self.growth_rate = rng.gaussian(p.growth_rate_mean, p.growth_rate_std).max(MIN_GROWTH_RATE);
    }

    fn name(&self) -> &'static str {
        "StochasticGrowthDivision"
    }
}

// ── GrowthSummary ─────────────────────────────────────────────────────────────

/// Population statistics for agents carrying [`StochasticGrowthDivision`].
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GrowthSummary {
    pub agents:           usize,
    pub with_behavior:    usize,
    pub min_diameter:     Option<f64>,
    pub max_diameter:     Option<f64>,
    pub mean_threshold:   Option<f64>,
    pub mean_growth_rate: Option<f64>,
}

impl GrowthSummary {
    /// Summarise index-aligned diameters and behavior lists.
    pub fn collect<X: Extension>(diameters: &[f64], behaviors: &[BehaviorList<X>]) -> Self {
        let mut summary = GrowthSummary { agents: diameters.len(), ..Self::default() };

        for &d in diameters {
            summary.min_diameter = Some(summary.min_diameter.map_or(d, |m| m.min(d)));
            summary.max_diameter = Some(summary.max_diameter.map_or(d, |m| m.max(d)));
        }

        let (mut threshold_sum, mut growth_sum) = (0.0, 0.0);
        for sgd in behaviors.iter().filter_map(|list| list.find::<StochasticGrowthDivision>()) {
            summary.with_behavior += 1;
            threshold_sum += sgd.threshold;
            growth_sum += sgd.growth_rate;
        }
        if summary.with_behavior > 0 {
            let n = summary.with_behavior as f64;
            summary.mean_threshold = Some(threshold_sum / n);
            summary.mean_growth_rate = Some(growth_sum / n);
        }
        summary
    }
}
