//! The ordered behavior list each agent hosts.

use cs_agent::{Agent, AgentKind, Extension};
use cs_core::AgentRng;
use tracing::warn;

use crate::{Behavior, BehaviorError, BehaviorResult, Intent, SimContext};

/// Behaviors attached to one agent, run in attachment order.
pub struct BehaviorList<X: Extension> {
    entries: Vec<Box<dyn Behavior<X>>>,
}

impl<X: Extension> Default for BehaviorList<X> {
    fn default() -> Self {
        Self::new()
    }
}

impl<X: Extension> BehaviorList<X> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check `behavior` against `kind`, initialize it, and append it.
    ///
    /// A missing capability is a configuration error; the behavior is
    /// dropped and the list is left as it was.
    pub fn attach(
        &mut self,
        mut behavior: Box<dyn Behavior<X>>,
        kind:         AgentKind,
        rng:          &mut AgentRng,
    ) -> BehaviorResult<()> {
        Self::check(behavior.as_ref(), kind)?;
        behavior.initialize(rng);
        self.entries.push(behavior);
        Ok(())
    }

    /// Fail if `kind` lacks a capability `behavior` requires.
    pub fn check(behavior: &dyn Behavior<X>, kind: AgentKind) -> BehaviorResult<()> {
        match behavior.requires().iter().find(|c| !kind.supports(**c)) {
            None => Ok(()),
            Some(&capability) => {
                warn!(behavior = behavior.name(), %kind, %capability, "behavior rejected");
                Err(BehaviorError::CapabilityMismatch {
                    behavior: behavior.name(),
                    capability,
                    kind,
                })
            }
        }
    }

    /// Append behaviors that are already initialized, such as the copies
    /// returned by [`copies_for_daughter`][Self::copies_for_daughter].
    ///
    /// Each is checked against `kind` like [`attach`][Self::attach] but not
    /// initialized again.  Stops at the first rejection.
    pub fn adopt(
        &mut self,
        behaviors: impl IntoIterator<Item = Box<dyn Behavior<X>>>,
        kind:      AgentKind,
    ) -> BehaviorResult<()> {
        for behavior in behaviors {
            Self::check(behavior.as_ref(), kind)?;
            self.entries.push(behavior);
        }
        Ok(())
    }

    /// Attach several behaviors in order, stopping at the first rejection.
    pub fn attach_all(
        &mut self,
        behaviors: impl IntoIterator<Item = Box<dyn Behavior<X>>>,
        kind:      AgentKind,
        rng:       &mut AgentRng,
    ) -> BehaviorResult<()> {
        for behavior in behaviors {
            self.attach(behavior, kind, rng)?;
        }
        Ok(())
    }

    /// Run every behavior once against `agent`.
    ///
    /// `Detach` intents are consumed here: the behavior that returned one is
    /// removed after the pass.  All other intents are returned in order.
    pub fn run(
        &mut self,
        agent: &mut dyn Agent<Ext = X>,
        ctx:   &SimContext<'_>,
        rng:   &mut AgentRng,
    ) -> BehaviorResult<Vec<Intent<X>>> {
        let mut out = Vec::new();
        let mut detached: Vec<usize> = Vec::new();

        for (i, behavior) in self.entries.iter_mut().enumerate() {
            for intent in behavior.run(agent, ctx, rng)? {
                match intent {
                    Intent::Detach => detached.push(i),
                    other => out.push(other),
                }
            }
        }

        if !detached.is_empty() {
            let mut i = 0;
            self.entries.retain(|_| {
                let keep = !detached.contains(&i);
                i += 1;
                keep
            });
        }
        Ok(out)
    }

    /// Fresh copies of every copy-on-divide behavior, each initialized with
    /// draws from `rng`.
    pub fn copies_for_daughter(&self, rng: &mut AgentRng) -> Vec<Box<dyn Behavior<X>>> {
        self.entries
            .iter()
            .filter(|b| b.copy_on_divide())
            .map(|b| {
                let mut copy = b.box_clone();
                copy.initialize(rng);
                copy
            })
            .collect()
    }

    /// First attached behavior of type `T`.
    pub fn find<T: Behavior<X>>(&self) -> Option<&T> {
        self.entries.iter().find_map(|b| b.as_any().downcast_ref::<T>())
    }

    /// Names of the attached behaviors, in order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|b| b.name())
    }
}
