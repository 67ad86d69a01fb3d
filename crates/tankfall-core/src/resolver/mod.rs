//! Resolvers turn outputs into state changes.
//!
//! Resolvers are the write phase of a tick. Pilots and the contact detector
//! only *propose* changes as [`Output`]s; resolvers validate them against the
//! arena, apply them, and record what happened in the [`EventLog`].
//!
//! # Architecture
//!
//! Each resolver declares which output kinds it handles via
//! [`Resolver::handles()`]. During a tick:
//! 1. Commands from pilots and host requests are routed to every resolver
//!    that handles [`OutputKind::Command`]
//! 2. Motion is integrated and contacts are detected
//! 3. Modifiers from contacts are routed to every resolver that handles
//!    [`OutputKind::Modifier`]
//!
//! # Invariants
//!
//! - Resolvers MUST be deterministic given the same inputs and output order
//! - Every random draw goes through [`ResolveContext::rng`]
//! - Rejected outputs are dropped silently; nothing here is fatal
//!
//! # Available Resolvers
//!
//! - [`ProgressionResolver`]: Stat-point spending and class upgrades
//! - [`PhysicsResolver`]: Steering, aiming, knockback and motion integration
//! - [`ArmamentResolver`]: Weapon volleys, projectile spawning and recoil
//! - [`CombatResolver`]: Damage, attribution, deaths and experience awards
//!
//! [`ContactDetector`] is not a resolver: it reads overlaps and produces the
//! modifiers the combat and physics resolvers consume.

mod armament;
mod combat;
mod contact;
mod event;
mod physics;
mod progression;

pub use armament::ArmamentResolver;
pub use combat::CombatResolver;
pub use contact::ContactDetector;
pub use event::EventLog;
pub use physics::{apply_knockback, PhysicsResolver, FIXED_DT};
pub use progression::ProgressionResolver;

use rand_chacha::ChaCha8Rng;

use crate::arena::Arena;
use crate::config::SimConfig;
use crate::output::{Output, OutputKind};

/// Shared, per-tick resources handed to every resolver.
#[derive(Debug)]
pub struct ResolveContext<'a> {
    /// Tuning constants.
    pub config: &'a SimConfig,
    /// The simulation's only random stream.
    pub rng: &'a mut ChaCha8Rng,
    /// Where resolvers report what happened.
    pub events: &'a mut EventLog,
}

/// Resolver processes outputs and mutates the arena.
///
/// # Implementation Guidelines
///
/// 1. **Determinism**: Given the same arena, outputs and RNG state, a
///    resolver must produce identical results. Iterate the arena in ID order
///    and process outputs in the order given.
///
/// 2. **Validate before applying**: targets may have died or been removed
///    since the output was produced. Skip them.
///
/// 3. **Handle conflicts**: Multiple outputs may target the same entity in
///    one tick. They apply in order (damage accumulates, the last steer wins).
///
/// # Example
///
/// ```
/// use tankfall_core::arena::Arena;
/// use tankfall_core::output::{Output, OutputKind};
/// use tankfall_core::resolver::{ResolveContext, Resolver};
///
/// struct CountingResolver;
///
/// impl Resolver for CountingResolver {
///     fn handles(&self) -> &[OutputKind] {
///         &[OutputKind::Command]
///     }
///
///     fn resolve(&self, outputs: &[&Output], _arena: &mut Arena, _ctx: &mut ResolveContext<'_>) {
///         assert!(outputs.iter().all(|o| o.kind() == OutputKind::Command));
///     }
/// }
/// ```
pub trait Resolver: Send + Sync {
    /// Returns the output kinds this resolver handles.
    fn handles(&self) -> &[OutputKind];

    /// Applies `outputs` (already filtered by [`Resolver::handles`]) to `arena`.
    fn resolve(&self, outputs: &[&Output], arena: &mut Arena, ctx: &mut ResolveContext<'_>);
}

/// Routes `outputs` to every resolver that handles their kind, in order.
pub fn dispatch(
    resolvers: &[Box<dyn Resolver>],
    outputs: &[Output],
    arena: &mut Arena,
    ctx: &mut ResolveContext<'_>,
) {
    for resolver in resolvers {
        let relevant: Vec<&Output> = outputs
            .iter()
            .filter(|o| resolver.handles().contains(&o.kind()))
            .collect();
        if !relevant.is_empty() {
            resolver.resolve(&relevant, arena, ctx);
        }
    }
}
