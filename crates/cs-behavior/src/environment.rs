//! Neighbor-search interface consumed by spatially aware behaviors.
//!
//! The step driver calls [`Environment::update`] once at the start of every
//! step with the current positions and diameters; behaviors then query it
//! through [`SimContext::environment`][crate::SimContext].  Spatial indexing
//! itself lives outside this workspace.

use cs_core::{AgentId, Real3};

/// What a neighbor query reports about each agent it finds.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Neighbor {
    pub id:       AgentId,
    pub position: Real3,
    pub diameter: f64,
}

/// Spatial neighbor search.
pub trait Environment: Send + Sync {
    /// Rebuild from the agents' state at the start of a step.
    fn update(&mut self, positions: &[Real3], diameters: &[f64]);

    /// Call `visit` for every agent whose position lies within `radius` of
    /// `query`.  Agents exactly at `query` are included.
    fn for_each_neighbor(&self, query: Real3, radius: f64, visit: &mut dyn FnMut(Neighbor));
}

/// An environment that never reports neighbors.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoEnvironment;

impl Environment for NoEnvironment {
    fn update(&mut self, _positions: &[Real3], _diameters: &[f64]) {}

    fn for_each_neighbor(&self, _query: Real3, _radius: f64, _visit: &mut dyn FnMut(Neighbor)) {}
}
