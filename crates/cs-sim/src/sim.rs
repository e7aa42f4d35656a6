//! The `Sim` struct and its step loop.

use cs_agent::{Agent, AgentRngs, AgentStore, Cell, CellSlot, CellWindow, Divisible, Extension};
use cs_behavior::{Behavior, BehaviorList, Environment, Intent, NoEnvironment, SimContext};
use cs_core::{AgentId, AgentRng, AgentUid, SimClock, SimConfig, Step};
use tracing::{debug, info};

use crate::{SimError, SimObserver, SimResult, StepSummary};

// ── Per-agent results of the behavior phase ───────────────────────────────────

/// A cell to be stored at the step boundary.
pub(crate) struct Birth<X: Extension> {
    pub(crate) cell:      Cell<X>,
    pub(crate) behaviors: Vec<Box<dyn Behavior<X>>>,
    /// Daughter of its owner.  Her behaviors were initialized when they were
    /// copied; spawned cells are initialized on attach.
    pub(crate) daughter:  bool,
}

/// Everything one agent asked for during the behavior phase.
pub(crate) struct Outcome<X: Extension> {
    pub(crate) remove: bool,
    pub(crate) births: Vec<Birth<X>>,
}

/// Run every agent of one contiguous window.
///
/// `lists` and `rngs` are index-aligned with `window`.  Nothing outside the
/// window is touched, so disjoint windows may run on different threads.
pub(crate) fn run_window<X: Extension>(
    mut window: CellWindow<'_, X>,
    lists:      &mut [BehaviorList<X>],
    rngs:       &mut [AgentRng],
    ctx:        &SimContext<'_>,
) -> SimResult<Vec<Outcome<X>>> {
    let mut out = Vec::with_capacity(lists.len());

    for (i, (list, rng)) in lists.iter_mut().zip(rngs.iter_mut()).enumerate() {
        let mut slot = CellSlot::new(&mut window, i);
        let intents = list.run(&mut slot, ctx, rng)?;

        let mut outcome = Outcome { remove: false, births: Vec::new() };
        for intent in intents {
            match intent {
                Intent::Divided(cell) => {
                    let behaviors = list.copies_for_daughter(rng);
                    outcome.births.push(Birth { cell, behaviors, daughter: true });
                }
                Intent::Spawn { cell, behaviors } => {
                    outcome.births.push(Birth { cell, behaviors, daughter: false });
                }
                Intent::Remove => outcome.remove = true,
                // Consumed by `BehaviorList::run`.
                Intent::Detach => {}
            }
        }
        out.push(outcome);
    }
    Ok(out)
}

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The main simulation runner.
///
/// Every step has two phases:
///
/// 1. **Behavior phase** (optionally parallel with the `parallel` feature):
///    the environment is refreshed, then each agent runs its
///    [`BehaviorList`] against its own storage slot and RNG.
/// 2. **Apply phase** (sequential, ascending `AgentId`): the capacity cap is
///    checked, removed agents are compacted away, and daughters and spawned
///    cells are appended in the order their parents produced them.
///
/// New agents therefore never run in the step that created them, and removed
/// agents finish the step they asked to leave in.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<X: Extension = (), E: Environment = NoEnvironment> {
    /// Global configuration (total steps, seed, time step, cap, …).
    pub config: SimConfig,

    /// Step counter read by behaviors through `SimContext`.
    pub clock: SimClock,

    pub(crate) agents:      AgentStore<X>,
    pub(crate) rngs:        AgentRngs,
    pub(crate) behaviors:   Vec<BehaviorList<X>>,
    pub(crate) environment: E,

    #[cfg(feature = "parallel")]
    pub(crate) pool: Option<rayon::ThreadPool>,
}

impl<X: Extension, E: Environment> Sim<X, E> {
    // ── Driver API ────────────────────────────────────────────────────────

    /// Run from the current step to `config.end_step()`.
    ///
    /// Calls observer hooks at every step boundary.  Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    pub fn run<O: SimObserver<X>>(&mut self, observer: &mut O) -> SimResult<()> {
        let start = self.clock.current_step;
        info!(
            from   = %start,
            to     = %self.config.end_step(),
            agents = self.agents.len(),
            "simulation started"
        );
        while self.clock.current_step < self.config.end_step() {
            self.observed_step(observer)?;
        }
        observer.on_sim_end(self.clock.current_step);
        info!(
            steps  = self.clock.current_step.since(start),
            agents = self.agents.len(),
            "simulation finished"
        );
        Ok(())
    }

    /// Run exactly `n` steps from the current position (ignores `end_step`).
    pub fn run_steps<O: SimObserver<X>>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.observed_step(observer)?;
        }
        Ok(())
    }

    /// Run a single step without observer callbacks.
    ///
    /// On error the clock does not advance and no agent is created or
    /// removed.  Daughters divided off during the step are absorbed back into
    /// their mothers, so total volume is unchanged; other changes behaviors
    /// made to their own agents are kept.
    pub fn run_one_step(&mut self) -> SimResult<StepSummary> {
        let now = self.clock.current_step;
        let outcomes = self.behavior_phase(now)?;
        let summary = self.apply_phase(now, outcomes)?;
        self.clock.advance();
        debug!(
            step      = %summary.step,
            agents    = summary.agents,
            divisions = summary.divisions,
            spawned   = summary.spawned,
            removed   = summary.removed,
            "step complete"
        );
        Ok(summary)
    }

    fn observed_step<O: SimObserver<X>>(&mut self, observer: &mut O) -> SimResult<()> {
        let now = self.clock.current_step;
        observer.on_step_start(now);
        let summary = self.run_one_step()?;
        observer.on_step_end(&summary);
        if self.config.output_interval_steps > 0
            && now.0.is_multiple_of(self.config.output_interval_steps)
        {
            observer.on_snapshot(now, &self.agents);
        }
        Ok(())
    }

    // ── Resource manager API ──────────────────────────────────────────────

    /// Store `cell` with `behaviors` attached, outside any step.
    ///
    /// Fails without changing anything if the cap would be exceeded or a
    /// behavior needs a capability the cell's kind lacks.
    pub fn add_agent(
        &mut self,
        cell:      Cell<X>,
        behaviors: Vec<Box<dyn Behavior<X>>>,
    ) -> SimResult<AgentUid> {
        self.check_capacity(self.agents.len() + 1)?;
        let kind = cell.kind();
        for behavior in &behaviors {
            BehaviorList::check(behavior.as_ref(), kind)?;
        }
        self.store(cell, behaviors, false)
    }

    /// Remove the agent with this uid immediately.  Later agents shift down
    /// one index.
    pub fn remove_agent(&mut self, uid: AgentUid) -> SimResult<()> {
        let id = self.agents.index_of(uid).ok_or(SimError::AgentNotFound(uid))?;
        let keep: Vec<bool> = self.agents.agent_ids().map(|a| a != id).collect();
        self.compact(&keep);
        Ok(())
    }

    /// Call `f` for every live agent in index order.
    pub fn for_each_agent(&mut self, mut f: impl FnMut(AgentId, &mut dyn Agent<Ext = X>)) {
        for i in 0..self.agents.len() {
            let id = AgentId(i as u32);
            if let Some(mut slot) = self.agents.slot(id) {
                f(id, &mut slot);
            }
        }
    }

    #[inline]
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    // ── Read access ───────────────────────────────────────────────────────

    pub fn agents(&self) -> &AgentStore<X> {
        &self.agents
    }

    /// Behavior lists, index-aligned with [`agents`][Self::agents].
    pub fn behavior_lists(&self) -> &[BehaviorList<X>] {
        &self.behaviors
    }

    pub fn behaviors(&self, agent: AgentId) -> Option<&BehaviorList<X>> {
        self.behaviors.get(agent.index())
    }

    pub fn environment(&self) -> &E {
        &self.environment
    }

    pub fn current_step(&self) -> Step {
        self.clock.current_step
    }

    // ── Behavior phase ────────────────────────────────────────────────────

    fn behavior_phase(&mut self, now: Step) -> SimResult<Vec<Outcome<X>>> {
        // Explicit field borrows so the borrow checker sees disjoint access.
        let agents      = &mut self.agents;
        let rngs        = self.rngs.as_mut_slice();
        let lists       = self.behaviors.as_mut_slice();
        let environment = &mut self.environment;

        environment.update(agents.positions(), agents.diameters());
        let ctx = SimContext::new(now, self.config.time_step, agents.len(), &*environment);
        let window = agents.window();

        #[cfg(not(feature = "parallel"))]
        {
            run_window(window, lists, rngs, &ctx)
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            let ctx = &ctx;
            let work = move || -> SimResult<Vec<Outcome<X>>> {
                let size = window.len().div_ceil(rayon::current_num_threads() * 4).max(1);
                let per_window: Vec<Vec<Outcome<X>>> = window
                    .into_chunks(size)
                    .into_par_iter()
                    .zip(lists.par_chunks_mut(size))
                    .zip(rngs.par_chunks_mut(size))
                    .map(|((w, l), r)| run_window(w, l, r, ctx))
                    .collect::<SimResult<_>>()?;
                Ok(per_window.into_iter().flatten().collect())
            };
            match &self.pool {
                Some(pool) => pool.install(work),
                None => work(),
            }
        }
    }

    // ── Apply phase ───────────────────────────────────────────────────────

    fn apply_phase(&mut self, now: Step, outcomes: Vec<Outcome<X>>) -> SimResult<StepSummary> {
        if let Err(err) = self.admit(&outcomes) {
            self.fold_back(outcomes);
            return Err(err);
        }

        let removed = outcomes.iter().filter(|o| o.remove).count();
        let born: usize = outcomes.iter().map(|o| o.births.len()).sum();

        let mut keep = Vec::with_capacity(outcomes.len());
        let mut births = Vec::with_capacity(born);
        for outcome in outcomes {
            keep.push(!outcome.remove);
            births.extend(outcome.births);
        }
        if removed > 0 {
            self.compact(&keep);
        }

        let mut divisions = 0;
        for birth in births {
            divisions += usize::from(birth.daughter);
            self.store(birth.cell, birth.behaviors, birth.daughter)?;
        }

        Ok(StepSummary {
            step:    now,
            agents:  self.agents.len(),
            divisions,
            spawned: born - divisions,
            removed,
        })
    }

    /// Everything that can reject a step, checked before anything changes:
    /// the capacity cap and every new cell's behaviors against its kind.
    fn admit(&self, outcomes: &[Outcome<X>]) -> SimResult<()> {
        let removed = outcomes.iter().filter(|o| o.remove).count();
        let born: usize = outcomes.iter().map(|o| o.births.len()).sum();
        self.check_capacity(self.agents.len() - removed + born)?;

        for birth in outcomes.iter().flat_map(|o| &o.births) {
            let kind = birth.cell.kind();
            for behavior in &birth.behaviors {
                BehaviorList::check(behavior.as_ref(), kind)?;
            }
        }
        Ok(())
    }

    /// Return each daughter of a rejected step to her mother.  Spawned cells
    /// took nothing from their parent and are dropped.
    fn fold_back(&mut self, outcomes: Vec<Outcome<X>>) {
        for (i, outcome) in outcomes.into_iter().enumerate() {
            let Some(mut mother) = self.agents.slot(AgentId(i as u32)) else {
                continue;
            };
            for birth in outcome.births.iter().filter(|b| b.daughter) {
                mother.absorb(&birth.cell);
            }
        }
        debug!(step = %self.clock.current_step, "step rejected, divisions undone");
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn check_capacity(&self, requested: usize) -> SimResult<()> {
        match self.config.max_agents {
            Some(limit) if requested > limit => Err(SimError::CapacityExceeded { limit, requested }),
            _ => Ok(()),
        }
    }

    /// Drop agents whose `keep` entry is `false` from every index-aligned
    /// collection.
    fn compact(&mut self, keep: &[bool]) {
        self.agents.retain(&mut self.rngs, keep);
        let mut i = 0;
        self.behaviors.retain(|_| {
            let k = keep[i];
            i += 1;
            k
        });
    }

    /// Append one agent with its RNG stream and behaviors.
    fn store(
        &mut self,
        cell:      Cell<X>,
        behaviors: Vec<Box<dyn Behavior<X>>>,
        adopted:   bool,
    ) -> SimResult<AgentUid> {
        let kind = cell.kind();
        let uid = self.agents.push(cell);
        self.rngs.push(uid);

        let mut list = BehaviorList::new();
        let attached = if adopted {
            list.adopt(behaviors, kind)
        } else {
            let id = AgentId((self.agents.len() - 1) as u32);
            list.attach_all(behaviors, kind, self.rngs.get_mut(id))
        };
        // Pushed even on failure so the collections stay index-aligned.
        self.behaviors.push(list);
        attached?;
        Ok(uid)
    }
}
