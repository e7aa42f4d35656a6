//! `cs-sim`: step driver for the cellsim framework.
//!
//! # Two-phase step loop
//!
//! ```text
//! for step in 0..config.total_steps:
//!   ① Environment: Environment::update(positions, diameters).
//!   ② Behaviors  : every agent runs its BehaviorList against its own slot
//!                   and RNG (parallel with the `parallel` feature).  Intents
//!                   are buffered per agent.
//!   ③ Apply      : in ascending AgentId order:
//!                     capacity check against config.max_agents
//!                     Remove       → compact the store, RNGs, and lists
//!                     Divided(c)   → append c with copy-on-divide behaviors
//!                     Spawn{c, bs} → append c, attach bs
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs the behavior phase on a Rayon thread pool.        |
//! | `serde`    | `Serialize`/`Deserialize` for config and summaries.    |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use cs_agent::{AgentStoreBuilder, Cell};
//! use cs_behavior::GrowDivide;
//! use cs_core::{Real3, SimConfig};
//! use cs_sim::{NoopObserver, SimBuilder};
//!
//! let (store, rngs) = AgentStoreBuilder::new(42).agent(Cell::new(Real3::ZERO)).build();
//! let mut sim = SimBuilder::new(config, store, rngs)
//!     .same_behaviors(vec![Box::new(GrowDivide::default())])
//!     .build()?;
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod sim;


pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver, StepSummary};
pub use sim::Sim;
