//! Core agent storage: `AgentStore` (columnar cell data) and `AgentRngs`
//! (per-agent RNG).
//!
//! # Why two structs?
//!
//! The behavior phase needs a mutable window over the cell columns and
//! exclusive access to each agent's RNG at the same time, split into the same
//! contiguous chunks.  Keeping the RNGs in their own struct lets the step
//! driver borrow both without fighting the borrow checker:
//!
//! ```ignore
//! let window = sim.agents.window();
//! let rngs = sim.rngs.as_mut_slice();
//! // split `window` and `rngs` at the same offsets, one pair per worker
//! ```
//!
//! # Identity
//!
//! `AgentId` is the current index and changes when earlier agents are
//! removed.  `AgentUid` is assigned on insertion, strictly increasing, and
//! never reused; because removals preserve order, `uids` stays sorted and
//! [`AgentStore::index_of`] is a binary search.

use cs_core::{AgentId, AgentRng, AgentUid, Real3};

use crate::access::CellSlot;
use crate::backend::Soa;
use crate::cell::{Cell, CellColumns, CellWindow, Extension};

// ── AgentRngs ─────────────────────────────────────────────────────────────────

/// Per-agent deterministic RNG state, index-aligned with [`AgentStore`].
pub struct AgentRngs {
    seed:  u64,
    inner: Vec<AgentRng>,
}

impl AgentRngs {
    pub fn new(global_seed: u64) -> Self {
        Self { seed: global_seed, inner: Vec::new() }
    }

    /// The global seed every stream is derived from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Append the stream for a newly stored agent.
    pub fn push(&mut self, uid: AgentUid) {
        self.inner.push(AgentRng::new(self.seed, uid));
    }

    /// Mutable reference to one agent's RNG.
    #[inline]
    pub fn get_mut(&mut self, agent: AgentId) -> &mut AgentRng {
        &mut self.inner[agent.index()]
    }

    pub fn as_mut_slice(&mut self) -> &mut [AgentRng] {
        &mut self.inner
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub(crate) fn retain_mask(&mut self, keep: &[bool]) {
        let mut i = 0;
        self.inner.retain(|_| {
            let k = keep[i];
            i += 1;
            k
        });
    }
}

// ── AgentStore ────────────────────────────────────────────────────────────────

/// Columnar storage for every live agent.
///
/// All columns, and the uid list, have exactly `len()` elements; the
/// `AgentId` value is the index into all of them.
pub struct AgentStore<X: Extension = ()> {
    cells:    CellColumns<X>,
    uids:     Vec<AgentUid>,
    next_uid: u64,
}

impl<X: Extension> Default for AgentStore<X> {
    fn default() -> Self {
        Self::new()
    }
}

impl<X: Extension> AgentStore<X> {
    pub fn new() -> Self {
        Self {
            cells:    CellColumns::new(),
            uids:     Vec::new(),
            next_uid: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.uids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.uids.is_empty()
    }

    /// Iterator over all `AgentId`s in ascending index order.
    pub fn agent_ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        (0..self.len() as u32).map(AgentId)
    }

    // ── Identity ──────────────────────────────────────────────────────────

    pub fn uids(&self) -> &[AgentUid] {
        &self.uids
    }

    #[inline]
    pub fn uid(&self, agent: AgentId) -> AgentUid {
        self.uids[agent.index()]
    }

    /// Current index of the agent with this uid, if it is still stored.
    pub fn index_of(&self, uid: AgentUid) -> Option<AgentId> {
        self.uids
            .binary_search(&uid)
            .ok()
            .and_then(|i| AgentId::try_from(i).ok())
    }

    // ── Insertion / removal ───────────────────────────────────────────────

    /// Store `cell` and return its new uid.
    ///
    /// The caller must push the matching stream onto [`AgentRngs`].
    pub fn push(&mut self, cell: Cell<X>) -> AgentUid {
        let uid = AgentUid(self.next_uid);
        self.next_uid += 1;
        self.cells.push(cell);
        self.uids.push(uid);
        uid
    }

    /// Drop every agent whose `keep` entry is `false`, in store and RNGs
    /// alike.  Surviving agents keep their relative order.
    pub fn retain(&mut self, rngs: &mut AgentRngs, keep: &[bool]) -> usize {
        debug_assert_eq!(keep.len(), self.len());
        debug_assert_eq!(rngs.len(), self.len());
        let before = self.len();
        self.cells.retain_mask(keep);
        rngs.retain_mask(keep);
        let mut i = 0;
        self.uids.retain(|_| {
            let k = keep[i];
            i += 1;
            k
        });
        before - self.len()
    }

    // ── Access ────────────────────────────────────────────────────────────

    /// Copy of one agent.
    pub fn get(&self, agent: AgentId) -> Option<Cell<X>> {
        (agent.index() < self.len()).then(|| self.cells.get(agent.index()))
    }

    /// Mutable handle to one agent, usable as `&mut dyn Agent`.
    pub fn slot(&mut self, agent: AgentId) -> Option<CellSlot<'_, Soa, X>> {
        if agent.index() < self.len() {
            Some(CellSlot::new(&mut self.cells, agent.index()))
        } else {
            None
        }
    }

    /// Read-only columns for vectorised scans.
    pub fn cells(&self) -> &CellColumns<X> {
        &self.cells
    }

    /// Mutable window over every agent.  Cannot change the population.
    pub fn window(&mut self) -> CellWindow<'_, X> {
        self.cells.window()
    }

    pub fn positions(&self) -> &[Real3] {
        self.cells.positions()
    }

    pub fn diameters(&self) -> &[f64] {
        self.cells.diameters()
    }
}
