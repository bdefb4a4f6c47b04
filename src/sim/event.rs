/// Events emitted by a simulation step, consumed by the outer loop for
/// sound effects and HUD messages. The simulation itself never reacts to
/// its own events.

use crate::domain::platform::PlatformId;

#[derive(Clone, Copy, PartialEq, Debug)]
#[allow(dead_code)]
pub enum GameEvent {
    /// The actor left the ground.
    Jumped,
    /// The actor landed on a platform.
    Landed { id: PlatformId },
    /// A platform scrolled out of view and was released.
    PlatformEvicted { id: PlatformId },
    /// Eviction drained the pool past its threshold; new platforms were
    /// generated above the tail.
    PoolRefilled { count: usize },
    /// The platform under a grounded actor was evicted; the actor is now
    /// falling.
    SupportLost,
    /// The actor fell a full screen below the view. Session over.
    FellOut,
}
