//! The `Behavior` trait: the main extension point for user code.

use std::any::Any;

use cs_agent::{Agent, Capability, Extension};
use cs_core::AgentRng;

use crate::{BehaviorResult, Intent, SimContext};

/// Per-step logic attached to one agent.
///
/// # Lifecycle
///
/// ```text
/// Uninitialized ──initialize──▶ Active ──run (every step)──▶ Active
///                                  │                           │
///                                  └──── Intent::Detach ───────┴──▶ Removed
/// ```
///
/// [`initialize`][Self::initialize] is called exactly once per instance,
/// when it is attached to an agent: at set-up, when spawned, and on every
/// copy made for a division daughter.  Individually randomised parameters
/// belong there so each copy draws its own.
///
/// # Thread safety
///
/// With the `parallel` feature different agents' behaviors run on different
/// threads, so implementations must be `Send + Sync`.  Each instance is owned
/// by a single agent and is only ever touched by one thread at a time.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone)]
/// struct Shrink(f64);
///
/// impl<X: Extension> Behavior<X> for Shrink {
///     fn run(
///         &mut self,
///         agent: &mut dyn Agent<Ext = X>,
///         ctx:   &SimContext<'_>,
///         _rng:  &mut AgentRng,
///     ) -> BehaviorResult<Vec<Intent<X>>> {
///         agent.change_volume(-self.0, ctx.time_step);
///         Ok(vec![])
///     }
/// }
/// ```
pub trait Behavior<X: Extension>: BehaviorClone<X> + Send + Sync + 'static {
    /// Called once per step for the owning agent, in attachment order.
    fn run(
        &mut self,
        agent: &mut dyn Agent<Ext = X>,
        ctx:   &SimContext<'_>,
        rng:   &mut AgentRng,
    ) -> BehaviorResult<Vec<Intent<X>>>;

    /// Whether a copy is attached to the daughter when the owner divides.
    fn copy_on_divide(&self) -> bool {
        false
    }

    /// Capabilities the owner's kind must provide.
    fn requires(&self) -> &'static [Capability] {
        &[Capability::Geometry]
    }

    /// Enter the Active state; draw any per-instance random parameters.
    fn initialize(&mut self, _rng: &mut AgentRng) {}

    /// Name used in logs and errors.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Object-safe cloning and inspection, implemented for every
/// `Behavior + Clone`.
pub trait BehaviorClone<X: Extension> {
    fn box_clone(&self) -> Box<dyn Behavior<X>>;
    fn as_any(&self) -> &dyn Any;
}

impl<X: Extension, T: Behavior<X> + Clone> BehaviorClone<X> for T {
    fn box_clone(&self) -> Box<dyn Behavior<X>> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<X: Extension> Clone for Box<dyn Behavior<X>> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}
