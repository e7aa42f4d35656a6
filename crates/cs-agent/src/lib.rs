//! `cs-agent`: cell storage and per-cell algorithms for `cellsim`.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                      |
//! |-----------------|---------------------------------------------------------------|
//! | [`backend`]     | `Backend` layouts (`Scalar`, `Soa`, `SoaSlice`), `Accessor`   |
//! | [`cell`]        | `CellData<B, X>`, `Cell`, `CellColumns`, `CellWindow`         |
//! | [`kind`]        | `AgentKind`, `Capability`                                     |
//! | [`access`]      | `Geometry`, `Divisible`, `Agent`, `CellIndex`, `CellSlot`     |
//! | [`division`]    | `Division`, `DivisionAxis`, the division algorithm            |
//! | [`force`]       | `SphereForce`, `force_between_spheres`                        |
//! | [`store`]       | `AgentStore` (columns + uids), `AgentRngs` (per-agent RNG)    |
//! | [`builder`]     | `AgentStoreBuilder` (fluent construction)                     |
//! | [`error`]       | `AgentError`, `AgentResult<T>`                                |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                     |
//! |------------|------------------------------------------------------------|
//! | `serde`    | Derives `Serialize`/`Deserialize` on public value types.   |

pub mod access;
pub mod backend;
pub mod builder;
pub mod cell;
pub mod division;
pub mod error;
pub mod force;
pub mod kind;
pub mod store;

#[cfg(test)]
mod tests;

pub use access::{Agent, CellIndex, CellSlot, Divisible, Geometry};
pub use backend::{Accessor, Backend, Scalar, Soa, SoaSlice};
pub use builder::AgentStoreBuilder;
pub use cell::{Cell, CellColumns, CellData, CellWindow, Extension, Neighbors};
pub use division::{Division, DivisionAxis};
pub use error::{AgentError, AgentResult};
pub use force::{DEFAULT_INTER_OBJECT_COEFFICIENT, SphereForce, force_between_spheres};
pub use kind::{AgentKind, Capability};
pub use store::{AgentRngs, AgentStore};
