//! Minimal mechanics for the growth demo: an all-pairs neighbor search and a
//! displacement behavior driven by the sphere force law.

use cs_agent::{Agent, Capability};
use cs_behavior::{Behavior, BehaviorResult, Environment, Intent, Neighbor, SimContext};
use cs_core::{AgentId, AgentRng, Real3};

// ── AllPairs ──────────────────────────────────────────────────────────────────

/// Neighbor search by linear scan over a copy of the step's positions.
///
/// Quadratic per step, which is fine for the few hundred cells this demo
/// grows.
#[derive(Clone, Debug, Default)]
pub struct AllPairs {
    positions: Vec<Real3>,
    diameters: Vec<f64>,
}

impl Environment for AllPairs {
    fn update(&mut self, positions: &[Real3], diameters: &[f64]) {
        self.positions.clear();
        self.positions.extend_from_slice(positions);
        self.diameters.clear();
        self.diameters.extend_from_slice(diameters);
    }

    fn for_each_neighbor(&self, query: Real3, radius: f64, visit: &mut dyn FnMut(Neighbor)) {
        let radius_sq = radius * radius;
        for (i, (&position, &diameter)) in self.positions.iter().zip(&self.diameters).enumerate() {
            if position.distance_squared(query) <= radius_sq {
                visit(Neighbor { id: AgentId(i as u32), position, diameter });
            }
        }
    }
}

// ── Displacement ──────────────────────────────────────────────────────────────

/// Moves a cell along the net force its overlapping neighbors exert on it.
///
/// Neighbors are read from the environment snapshot taken at the start of
/// the step, so every cell sees the same positions regardless of run order.
#[derive(Clone, Debug)]
pub struct Displacement {
    /// Forces at or below this magnitude do not move the cell.
    pub adherence_floor:  f64,
    /// Cap on one step's movement.
    pub max_displacement: f64,
    /// Neighbor search radius beyond the cell's own diameter.
    pub search_margin:    f64,
}

impl Default for Displacement {
    fn default() -> Self {
        Self { adherence_floor: 0.01, max_displacement: 3.0, search_margin: 10.0 }
    }
}

impl Displacement {
    /// Sum of the forces every neighbor within reach exerts on `agent`.
    fn net_force(&self, agent: &dyn Agent<Ext = ()>, ctx: &SimContext<'_>) -> Real3 {
        let center = agent.mass_location();
        let radius = agent.diameter() + self.search_margin;
        let mut force = Real3::ZERO;
        // Coincident centers (including the cell itself) contribute nothing.
        ctx.environment.for_each_neighbor(center, radius, &mut |n| {
            force += agent.force_from(n.position, n.diameter);
        });
        force
    }
}

impl Behavior<()> for Displacement {
    fn run(
        &mut self,
        agent: &mut dyn Agent<Ext = ()>,
        ctx:   &SimContext<'_>,
        _rng:  &mut AgentRng,
    ) -> BehaviorResult<Vec<Intent<()>>> {
        let force = self.net_force(agent, ctx);
        if force.length() <= self.adherence_floor.max(agent.adherence()) {
            return Ok(vec![]);
        }
        let delta = (force * ctx.time_step).clamp_length_max(self.max_displacement);
        agent.set_position(agent.position() + delta);
        agent.update_mass_location(delta);
        Ok(vec![])
    }

    fn copy_on_divide(&self) -> bool {
        true
    }

    fn requires(&self) -> &'static [Capability] {
        &[Capability::Geometry]
    }

    fn name(&self) -> &'static str {
        "Displacement"
    }
}
