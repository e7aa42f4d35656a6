//! `cs-core`: foundational types for the `cellsim` agent-based simulator.
//!
//! This crate is a dependency of every other `cs-*` crate.  It has no `cs-*`
//! dependencies and only a handful of external ones (`glam`, `rand`,
//! `rand_distr`, `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`ids`]         | `AgentId` (storage index), `AgentUid` (stable identity)   |
//! | [`math`]        | `Real3`, sphere volume/diameter, local-frame transforms   |
//! | [`time`]        | `Step`, `SimClock`, `SimConfig`                           |
//! | [`rng`]         | `Random` trait, `AgentRng` (per-agent), `SimRng` (global) |
//! | [`error`]       | `CsError`, `CsResult`                                     |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod ids;
pub mod math;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CsError, CsResult};
pub use ids::{AgentId, AgentUid};
pub use math::{LocalFrame, Real3, VOLUME_FLOOR, sphere_diameter, sphere_volume};
pub use rng::{AgentRng, Random, SimRng};
pub use time::{SimClock, SimConfig, Step};
