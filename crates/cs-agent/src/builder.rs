//! Fluent builder for constructing `AgentStore` + `AgentRngs` in one step.
//!
//! # Usage
//!
//! ```rust
//! use cs_agent::{AgentStoreBuilder, Cell};
//! use cs_core::Real3;
//!
//! let (store, rngs) = AgentStoreBuilder::<()>::new(/*seed=*/ 42)
//!     .agents((0..10).map(|i| Cell::new(Real3::new(i as f64 * 20.0, 0.0, 0.0))))
//!     .build();
//!
//! assert_eq!(store.len(), 10);
//! assert_eq!(rngs.len(), 10);
//! ```

use crate::cell::{Cell, Extension};
use crate::{AgentRngs, AgentStore};

/// Fluent builder for [`AgentStore`] + [`AgentRngs`].
///
/// Agents receive uids in insertion order, and each RNG stream is seeded from
/// `seed` and that uid.
pub struct AgentStoreBuilder<X: Extension = ()> {
    seed:  u64,
    cells: Vec<Cell<X>>,
}

impl<X: Extension> AgentStoreBuilder<X> {
    pub fn new(seed: u64) -> Self {
        Self { seed, cells: Vec::new() }
    }

    /// Add one agent.
    pub fn agent(mut self, cell: Cell<X>) -> Self {
        self.cells.push(cell);
        self
    }

    /// Add many agents.
    pub fn agents(mut self, cells: impl IntoIterator<Item = Cell<X>>) -> Self {
        self.cells.extend(cells);
        self
    }

    /// Construct `AgentStore` and `AgentRngs`.
    pub fn build(self) -> (AgentStore<X>, AgentRngs) {
        let mut store = AgentStore::new();
        let mut rngs = AgentRngs::new(self.seed);
        for cell in self.cells {
            let uid = store.push(cell);
            rngs.push(uid);
        }
        (store, rngs)
    }
}
