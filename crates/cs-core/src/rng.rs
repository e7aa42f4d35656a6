//! Deterministic per-agent and simulation-level RNG wrappers.
//!
//! # Determinism strategy
//!
//! Each agent gets its own independent `SmallRng` seeded by:
//!
//!   seed = global_seed XOR (agent_uid * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive uids uniformly across the seed space.  Because
//! the seed depends on the stable uid rather than the storage index:
//!
//! - Agents never share RNG state, so worker threads never contend.
//! - Compacting storage after removals does not disturb anyone's stream.
//! - Results do not depend on how agents are split across threads.
//!
//! # Distributions
//!
//! Both generators implement [`Random`], which provides the sampling
//! operations behaviors draw from (uniform, Gaussian, exponential, Poisson,
//! binomial) on top of `rand_distr`.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Binomial, Distribution, Exp, Poisson, StandardNormal};

use crate::AgentUid;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── Random ────────────────────────────────────────────────────────────────────

/// Sampling operations shared by [`AgentRng`] and [`SimRng`].
///
/// Every method consumes the underlying stream deterministically, so a fixed
/// seed and call sequence always reproduce the same values.
pub trait Random {
    /// The underlying generator, for use with other `rand` distributions.
    fn inner(&mut self) -> &mut SmallRng;

    /// Uniform in `[0, 1)`.
    #[inline]
    fn uniform(&mut self) -> f64 {
        self.inner().r#gen::<f64>()
    }

    /// Uniform in `[min, max)`.
    #[inline]
    fn uniform_range(&mut self, min: f64, max: f64) -> f64 {
        min + (max - min) * self.uniform()
    }

    /// Normal with the given mean and standard deviation.
    #[inline]
    fn gaussian(&mut self, mean: f64, sigma: f64) -> f64 {
        let z: f64 = self.inner().sample(StandardNormal);
        mean + sigma * z
    }

    /// Exponential with rate `lambda`.  Non-positive rates yield infinity.
    fn exponential(&mut self, lambda: f64) -> f64 {
        match Exp::new(lambda) {
            Ok(dist) if lambda > 0.0 => dist.sample(self.inner()),
            _ => f64::INFINITY,
        }
    }

    /// Poisson count with the given mean.  Non-positive means yield 0.
    fn poisson(&mut self, mean: f64) -> u64 {
        if !(mean > 0.0 && mean.is_finite()) {
            return 0;
        }
        match Poisson::new(mean) {
            Ok(dist) => {
                let k: f64 = dist.sample(self.inner());
                k as u64
            }
            Err(_) => 0,
        }
    }

    /// Successes in `n` Bernoulli trials with probability `p` (clamped to [0, 1]).
    fn binomial(&mut self, n: u64, p: f64) -> u64 {
        let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
        match Binomial::new(n, p) {
            Ok(dist) => dist.sample(self.inner()),
            Err(_) => 0,
        }
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    fn gen_bool(&mut self, p: f64) -> bool {
        let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
        self.inner().gen_bool(p)
    }
}

// ── AgentRng ──────────────────────────────────────────────────────────────────

/// Per-agent deterministic RNG.
///
/// Stored in a parallel `Vec<AgentRng>` alongside the SoA columns.  Each
/// Rayon worker receives an exclusive sub-slice, so no synchronisation is
/// needed.
#[derive(Clone, Debug)]
pub struct AgentRng(SmallRng);

impl AgentRng {
    /// Seed deterministically from the run's global seed and an agent uid.
    pub fn new(global_seed: u64, agent: AgentUid) -> Self {
        let seed = global_seed ^ agent.0.wrapping_mul(MIXING_CONSTANT);
        AgentRng(SmallRng::seed_from_u64(seed))
    }
}

impl Random for AgentRng {
    #[inline]
    fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Simulation-level RNG for set-up and other single-threaded work (initial
/// population placement, exogenous events).
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Derive a child `SimRng` with a different seed offset.
    pub fn child(&mut self, offset: u64) -> SimRng {
        let child_seed: u64 = self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT);
        SimRng(SmallRng::seed_from_u64(child_seed))
    }
}

impl Random for SimRng {
    #[inline]
    fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }
}
