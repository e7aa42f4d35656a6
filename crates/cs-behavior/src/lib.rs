//! `cs-behavior`: per-step agent logic for `cellsim`.
//!
//! # Crate layout
//!
//! | Module            | Contents                                                       |
//! |-------------------|----------------------------------------------------------------|
//! | [`model`]         | `Behavior` trait, `BehaviorClone`                              |
//! | [`intent`]        | `Intent` (`Divided`, `Spawn`, `Remove`, `Detach`)              |
//! | [`context`]       | `SimContext<'a>`: read-only step snapshot shared by all agents |
//! | [`environment`]   | `Environment` neighbor-search trait, `NoEnvironment`           |
//! | [`list`]          | `BehaviorList`: one agent's ordered behaviors                  |
//! | [`noop`]          | `NoopBehavior`                                                 |
//! | [`grow_divide`]   | `GrowDivide`: grow to a threshold, then divide                 |
//! | [`stochastic`]    | `StochasticGrowthDivision`, `GrowthPopulation`, `GrowthSummary`|
//! | [`error`]         | `BehaviorError`, `BehaviorResult<T>`                           |
//!
//! # Design notes
//!
//! A step in cs-sim has two phases:
//!
//! 1. **Behavior phase** (parallel with the `parallel` feature): every agent
//!    runs its `BehaviorList`.  A behavior may mutate only its own agent;
//!    everything else is requested through an [`Intent`].
//!
//! 2. **Apply phase** (sequential, ascending agent index): removals and new
//!    agents are merged into storage, and copy-on-divide behaviors are
//!    attached to daughters.

pub mod context;
pub mod environment;
pub mod error;
pub mod grow_divide;
pub mod intent;
pub mod list;
pub mod model;
pub mod noop;
pub mod stochastic;


pub use context::SimContext;
pub use environment::{Environment, Neighbor, NoEnvironment};
pub use error::{BehaviorError, BehaviorResult};
pub use grow_divide::GrowDivide;
pub use intent::Intent;
pub use list::BehaviorList;
pub use model::{Behavior, BehaviorClone};
pub use noop::NoopBehavior;
pub use stochastic::{GrowthPopulation, GrowthSummary, StochasticGrowthDivision};
