//! Fluent builder for constructing a [`Sim`].

use cs_agent::{AgentRngs, AgentStore, Extension};
use cs_behavior::{Behavior, BehaviorList, Environment, NoEnvironment};
use cs_core::{AgentId, SimConfig};
use tracing::debug;

use crate::{Sim, SimError, SimResult};

/// Fluent builder for [`Sim<X, E>`].
///
/// # Required inputs
///
/// - [`SimConfig`]: total steps, seed, time step, …
/// - [`AgentStore`] + [`AgentRngs`], from [`cs_agent::AgentStoreBuilder`]
///
/// # Optional inputs (have defaults)
///
/// | Method                      | Default                          |
/// |-----------------------------|----------------------------------|
/// | `.behaviors(v)`             | No behaviors on any agent        |
/// | `.same_behaviors(v)`        | (clones `v` onto every agent)    |
/// | `.environment(e)`           | `NoEnvironment`                  |
///
/// # Example
///
/// ```rust,ignore
/// let (store, rngs) = AgentStoreBuilder::new(seed).agents(cells).build();
/// let mut sim = SimBuilder::new(config, store, rngs)
///     .same_behaviors(vec![Box::new(GrowDivide::default())])
///     .build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder<X: Extension = (), E: Environment = NoEnvironment> {
    config:      SimConfig,
    agents:      AgentStore<X>,
    rngs:        AgentRngs,
    behaviors:   Option<Vec<Vec<Box<dyn Behavior<X>>>>>,
    environment: E,
}

impl<X: Extension> SimBuilder<X, NoEnvironment> {
    /// Create a builder with all required inputs.
    pub fn new(config: SimConfig, agents: AgentStore<X>, rngs: AgentRngs) -> Self {
        Self {
            config,
            agents,
            rngs,
            behaviors:   None,
            environment: NoEnvironment,
        }
    }
}

impl<X: Extension, E: Environment> SimBuilder<X, E> {
    /// Supply one behavior set per agent (must be length `agent_count`).
    pub fn behaviors(mut self, behaviors: Vec<Vec<Box<dyn Behavior<X>>>>) -> Self {
        self.behaviors = Some(behaviors);
        self
    }

    /// Give every agent its own copy of `template`.
    pub fn same_behaviors(mut self, template: Vec<Box<dyn Behavior<X>>>) -> Self {
        self.behaviors = Some(vec![template; self.agents.len()]);
        self
    }

    /// Supply the neighbor-search environment.
    pub fn environment<E2: Environment>(self, environment: E2) -> SimBuilder<X, E2> {
        SimBuilder {
            config:    self.config,
            agents:    self.agents,
            rngs:      self.rngs,
            behaviors: self.behaviors,
            environment,
        }
    }

    /// Validate inputs, attach behaviors, and return a ready-to-run [`Sim`].
    ///
    /// Each behavior is checked against its agent's kind and initialized with
    /// that agent's RNG.
    pub fn build(mut self) -> SimResult<Sim<X, E>> {
        self.config.validate()?;
        let agent_count = self.agents.len();

        if self.rngs.len() != agent_count {
            return Err(SimError::AgentCountMismatch {
                expected: agent_count,
                got:      self.rngs.len(),
                what:     "agent RNGs",
            });
        }
        match self.config.max_agents {
            Some(limit) if agent_count > limit => {
                return Err(SimError::CapacityExceeded { limit, requested: agent_count });
            }
            _ => {}
        }

        let sets = match self.behaviors {
            Some(b) => {
                if b.len() != agent_count {
                    return Err(SimError::AgentCountMismatch {
                        expected: agent_count,
                        got:      b.len(),
                        what:     "behavior sets",
                    });
                }
                b
            }
            None => (0..agent_count).map(|_| Vec::new()).collect(),
        };

        let mut behaviors = Vec::with_capacity(agent_count);
        for (i, set) in sets.into_iter().enumerate() {
            let id = AgentId(i as u32);
            let kind = self.agents.cells().kinds()[i];
            let mut list = BehaviorList::new();
            list.attach_all(set, kind, self.rngs.get_mut(id))?;
            behaviors.push(list);
        }

        #[cfg(feature = "parallel")]
        let pool = match self.config.num_threads {
            Some(n) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| SimError::Config(e.to_string()))?,
            ),
            None => None,
        };

        debug!(agents = agent_count, seed = self.config.seed, "simulation built");

        Ok(Sim {
            clock:       self.config.make_clock(),
            config:      self.config,
            agents:      self.agents,
            rngs:        self.rngs,
            behaviors,
            environment: self.environment,
            #[cfg(feature = "parallel")]
            pool,
        })
    }
}
