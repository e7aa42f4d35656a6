//! The three behaviors every tissue cell carries.
//!
//! | Behavior               | Role                                                   |
//! |------------------------|--------------------------------------------------------|
//! | `RadiationTherapy`     | one-shot dose at the treatment step                    |
//! | `CellDynamics`         | metabolism, hypoxia, repair, death, proliferation      |
//! | `InflammatoryResponse` | inflammation dynamics and immune-cell recruitment      |
//!
//! None of them is copied on division: new cells are created with
//! [`Intent::Spawn`] and an explicit behavior set.

use cs_agent::{Agent, Cell};
use cs_behavior::{Behavior, BehaviorResult, Intent, SimContext};
use cs_core::{AgentRng, Random, Real3};

use crate::model::{CellType, RadiationParams, RadiationState};

type Intents = Vec<Intent<RadiationState>>;

/// Offset with each coordinate uniform in `[-spread/2, spread/2)`.
fn jitter(rng: &mut AgentRng, spread: f64) -> Real3 {
    let x = (rng.uniform() - 0.5) * spread;
    let y = (rng.uniform() - 0.5) * spread;
    let z = (rng.uniform() - 0.5) * spread;
    Real3::new(x, y, z)
}

/// Steps elapsed since treatment, or `None` before and at the treatment step.
fn steps_after(ctx: &SimContext<'_>, treatment_step: u64) -> Option<u64> {
    (ctx.step.0 > treatment_step).then(|| ctx.step.0 - treatment_step)
}

// ── RadiationTherapy ──────────────────────────────────────────────────────────

/// Delivers `params.dose` once, at `params.treatment_step`, to a living cell.
#[derive(Clone, Debug)]
pub struct RadiationTherapy {
    params:  RadiationParams,
    applied: bool,
}

impl RadiationTherapy {
    pub fn new(params: RadiationParams) -> Self {
        Self { params, applied: false }
    }
}

impl Behavior<RadiationState> for RadiationTherapy {
    fn run(
        &mut self,
        agent: &mut dyn Agent<Ext = RadiationState>,
        ctx:   &SimContext<'_>,
        _rng:  &mut AgentRng,
    ) -> BehaviorResult<Intents> {
        if self.applied || ctx.step.0 != self.params.treatment_step {
            return Ok(vec![]);
        }
        let state = agent.ext_mut();
        if !state.is_alive() {
            return Ok(vec![]);
        }

        let damage = self.params.dose * state.cell_type.radiosensitivity();
        state.dose += self.params.dose;
        state.damage += damage;
        state.metabolic_health -= damage * 0.1;
        self.applied = true;
        Ok(vec![])
    }

    fn name(&self) -> &'static str {
        "RadiationTherapy"
    }
}

// ── CellDynamics ──────────────────────────────────────────────────────────────

/// Survival fraction parameters of the linear-quadratic model for brain
/// tissue.
const LQ_ALPHA: f64 = 0.2;
const LQ_BETA: f64 = 0.02;

/// Metabolism, oxygenation, DNA repair, death, and proliferation.
#[derive(Clone, Debug)]
pub struct CellDynamics {
    params: RadiationParams,
}

impl CellDynamics {
    pub fn new(params: RadiationParams) -> Self {
        Self { params }
    }

    fn metabolism(&self, state: &mut RadiationState, ctx: &SimContext<'_>, rng: &mut AgentRng) {
        let drift = (rng.uniform() - 0.5) * 0.02;
        state.metabolic_health = (state.metabolic_health + drift).clamp(0.0, 1.5);

        let mut oxygen_change = -0.001;
        if let Some(after) = steps_after(ctx, self.params.treatment_step) {
            oxygen_change -= after as f64 * 0.0001;
        }
        let noise = (rng.uniform() - 0.5) * 0.01;
        state.oxygen = (state.oxygen + oxygen_change + noise).max(0.1);
    }

    fn progressive_damage(&self, state: &mut RadiationState, ctx: &SimContext<'_>, rng: &mut AgentRng) {
        let Some(after) = steps_after(ctx, self.params.treatment_step) else {
            return;
        };

        // Repair attempt: 70 % succeed, the rest misrepair.
        if rng.uniform() < 0.3 {
            if rng.uniform() < 0.7 {
                state.damage = (state.damage - 0.5).max(0.0);
            } else {
                state.damage += 0.8;
            }
        }

        // Late effects.
        if after > 50 && rng.uniform() < 0.05 {
            state.damage += rng.uniform_range(1.0, 3.0);
        }
    }

    /// Whether the cell dies this step.
    fn dies(&self, state: &RadiationState, ctx: &SimContext<'_>, rng: &mut AgentRng) -> bool {
        let mut dies = false;
        let step = ctx.step.0;
        let treatment = self.params.treatment_step;

        if state.dose > 10.0 && step > treatment + 2 {
            let d = state.dose;
            let survival = (-(LQ_ALPHA * d + LQ_BETA * d * d)).exp();
            let expression = ((step - treatment) as f64 / 10.0).min(1.0);
            if rng.uniform() < (1.0 - survival) * expression * 0.05 {
                dies = true;
            }
        }
        if state.oxygen < 0.3 && rng.uniform() < 0.25 {
            dies = true;
        }
        if state.damage > 40.0 && rng.uniform() < 0.1 {
            dies = true;
        }
        dies
    }

    fn proliferate(
        &self,
        agent: &dyn Agent<Ext = RadiationState>,
        ctx:   &SimContext<'_>,
        rng:   &mut AgentRng,
    ) -> BehaviorResult<Option<Cell<RadiationState>>> {
        let state = agent.ext();
        match state.cell_type {
            CellType::Necrotic => Ok(None),

            CellType::Tumor => {
                let mut rate = 0.005;
                if steps_after(ctx, self.params.treatment_step).is_some() {
                    rate *= (-state.dose / 20.0).exp().max(0.1);
                }
                if !(rng.uniform() < rate && ctx.agent_count < self.params.tumor_cap) {
                    return Ok(None);
                }
                let position = agent.position() + jitter(rng, 10.0);
                let diameter = agent.diameter() * rng.uniform_range(0.8, 1.2);
                let daughter = RadiationState {
                    metabolic_health: state.metabolic_health * rng.uniform_range(0.9, 1.1),
                    dose:             state.dose * 0.8,
                    ..RadiationState::of_type(CellType::Tumor)
                };
                Ok(Some(Cell::with_diameter(position, diameter)?.with_ext(daughter)))
            }

            // Adult brain regenerates rarely, and only well after treatment.
            _ => {
                let repairing = state.metabolic_health > 0.6
                    && ctx.step.0 > self.params.treatment_step + 5
                    && rng.uniform() < 0.0005;
                if !repairing {
                    return Ok(None);
                }
                let position = agent.position() + jitter(rng, 6.0);
                let diameter = agent.diameter() * rng.uniform_range(0.9, 1.1);
                let replacement = RadiationState {
                    metabolic_health: 0.8,
                    oxygen:           state.oxygen,
                    ..RadiationState::of_type(state.cell_type)
                };
                Ok(Some(Cell::with_diameter(position, diameter)?.with_ext(replacement)))
            }
        }
    }

    /// Behaviors of a proliferated or regenerated cell.
    fn offspring_behaviors(&self) -> Vec<Box<dyn Behavior<RadiationState>>> {
        vec![
            Box::new(RadiationTherapy::new(self.params)),
            Box::new(CellDynamics::new(self.params)),
        ]
    }
}

impl Behavior<RadiationState> for CellDynamics {
    fn run(
        &mut self,
        agent: &mut dyn Agent<Ext = RadiationState>,
        ctx:   &SimContext<'_>,
        rng:   &mut AgentRng,
    ) -> BehaviorResult<Intents> {
        let state = agent.ext_mut();
        self.metabolism(state, ctx, rng);
        self.progressive_damage(state, ctx, rng);

        if self.dies(state, ctx, rng) && !state.is_necrotic() {
            state.cell_type = CellType::Necrotic;
            state.metabolic_health = 0.0;
            let shrunk = agent.diameter() * 0.7;
            agent.set_diameter(shrunk)?;
        }

        let state = agent.ext_mut();
        if state.is_necrotic() {
            state.necrotic_steps += 1;
            let steps = state.necrotic_steps;
            if self.params.clearance_steps.is_some_and(|limit| steps >= limit) {
                return Ok(vec![Intent::Remove]);
            }
        }

        match self.proliferate(agent, ctx, rng)? {
            Some(cell) => Ok(vec![Intent::spawn(cell, self.offspring_behaviors())]),
            None => Ok(vec![]),
        }
    }

    fn name(&self) -> &'static str {
        "CellDynamics"
    }
}

// ── InflammatoryResponse ──────────────────────────────────────────────────────

/// Steps after treatment at which radiation-driven inflammation peaks.
const INFLAMMATION_PEAK: f64 = 48.0;
const INFLAMMATION_WIDTH: f64 = 20.0;

/// Inflammation dynamics, their effect on the host, and recruitment of
/// activated microglia.
#[derive(Clone, Debug)]
pub struct InflammatoryResponse {
    params: RadiationParams,
}

impl InflammatoryResponse {
    pub fn new(params: RadiationParams) -> Self {
        Self { params }
    }

    fn update_level(&self, state: &mut RadiationState, ctx: &SimContext<'_>, rng: &mut AgentRng) {
        let mut change = 0.0;

        if let Some(after) = steps_after(ctx, self.params.treatment_step).filter(|_| state.dose > 10.0) {
            let z = (after as f64 - INFLAMMATION_PEAK) / INFLAMMATION_WIDTH;
            change += state.dose / 30.0 * (-0.5 * z * z).exp() * 0.02;
        }
        if state.damage > 10.0 {
            change += state.damage / 1000.0;
        }
        if state.oxygen < 0.6 {
            change += (0.6 - state.oxygen) * 0.05;
        }

        // Necrosis sensed nearby.
        if rng.uniform() < 0.05 {
            state.inflammation += rng.uniform_range(0.01, 0.05);
        }

        change += (rng.uniform() - 0.5) * 0.02;
        state.inflammation = (state.inflammation + change).clamp(0.0, 2.0);

        // Resolution without sustained stimulus.
        if change < 0.01 {
            state.inflammation *= 0.995;
        }
    }

    fn effects(&self, state: &mut RadiationState, rng: &mut AgentRng) {
        let level = state.inflammation;
        if level <= 0.1 {
            return;
        }
        state.damage += level * 0.02 * rng.uniform_range(0.5, 1.5);
        let metabolic_cost = level * 0.01 * (0.5 + rng.uniform());
        state.metabolic_health = (state.metabolic_health - metabolic_cost).max(0.1);

        if rng.uniform() < 0.1 && level > 0.5 {
            let cleared = level * 0.5 * rng.uniform_range(0.5, 1.0);
            state.damage = (state.damage - cleared).max(0.0);
        }
    }

    fn recruit(
        &self,
        agent: &dyn Agent<Ext = RadiationState>,
        ctx:   &SimContext<'_>,
        rng:   &mut AgentRng,
    ) -> BehaviorResult<Option<Intent<RadiationState>>> {
        if !(agent.ext().inflammation > 1.0 && rng.uniform() < 0.008) {
            return Ok(None);
        }
        if ctx.agent_count >= self.params.immune_cap {
            return Ok(None);
        }
        let position = agent.position() + jitter(rng, 16.0);
        let state = RadiationState {
            inflammation: 0.8,
            ..RadiationState::of_type(CellType::Inflammatory)
        };
        let cell = Cell::with_diameter(position, 10.0)?.with_ext(state);
        let behaviors: Vec<Box<dyn Behavior<RadiationState>>> = vec![
            Box::new(RadiationTherapy::new(self.params)),
            Box::new(CellDynamics::new(self.params)),
            Box::new(InflammatoryResponse::new(self.params)),
        ];
        Ok(Some(Intent::spawn(cell, behaviors)))
    }
}

impl Behavior<RadiationState> for InflammatoryResponse {
    fn run(
        &mut self,
        agent: &mut dyn Agent<Ext = RadiationState>,
        ctx:   &SimContext<'_>,
        rng:   &mut AgentRng,
    ) -> BehaviorResult<Intents> {
        let state = agent.ext_mut();
        if state.is_necrotic() {
            return Ok(vec![]);
        }
        self.update_level(state, ctx, rng);
        self.effects(state, rng);
        Ok(self.recruit(agent, ctx, rng)?.into_iter().collect())
    }

    fn name(&self) -> &'static str {
        "InflammatoryResponse"
    }
}

/// The behavior set attached to every cell of the initial tissue.
pub fn tissue_behaviors(params: RadiationParams) -> Vec<Box<dyn Behavior<RadiationState>>> {
    vec![
        Box::new(RadiationTherapy::new(params)),
        Box::new(CellDynamics::new(params)),
        Box::new(InflammatoryResponse::new(params)),
    ]
}
