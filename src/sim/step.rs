/// One fixed simulation tick.
///
/// Order inside a tick matters and is fixed:
///   1. session end check (fell a full screen below the view)
///   2. platform eviction and pool refill
///   3. landing resolution (only while descending)
///   4. support loss (resting platform was just evicted)
///   5. actor integration
///   6. platform drift
///   7. camera scroll
///
/// Everything observable about a tick comes back as `GameEvent`s; the
/// caller decides what to do with them (sounds, HUD).

use crate::domain::actor::{Actor, FrameInput};
use crate::domain::platform::Platform;
use super::event::GameEvent;
use super::world::{Phase, WorldState};

pub fn step(world: &mut WorldState, input: &FrameInput) -> Vec<GameEvent> {
    let mut events = Vec::new();

    if world.phase != Phase::Playing || world.paused {
        return events;
    }

    world.tick += 1;
    let dt = world.world.dt();

    if world.message_timer > 0 {
        world.message_timer -= 1;
        if world.message_timer == 0 {
            world.message = None;
        }
    }

    let view_bottom = world.view_bottom();

    // Session end: a full screen of grace below the visible bound.
    if world.actor.out_of_game(view_bottom, world.world.height) {
        world.phase = Phase::GameOver;
        events.push(GameEvent::FellOut);
        return events;
    }

    // Evict platforms that scrolled out below the view. The queue is
    // sorted by descending y, so only the front can ever be out of focus.
    // Each release tops the pool back up itself once it dips below the
    // low-water mark.
    while world
        .pool
        .front()
        .is_some_and(|p| !p.still_in_focus(view_bottom))
    {
        if let Some((id, added)) = world.pool.release_from_front() {
            events.push(GameEvent::PlatformEvicted { id });
            if added > 0 {
                events.push(GameEvent::PoolRefilled { count: added });
            }
        }
    }

    // Landing: only tested while descending, against the closest
    // qualifying surface.
    if world.actor.should_check_for_collision() {
        let winner = closest_landing(&world.actor, world.pool.platforms()).cloned();
        if let Some(p) = winner {
            world.actor.land_on(&p);
            events.push(GameEvent::Landed { id: p.id() });
        }
    }

    // The platform under a grounded actor may have been evicted above.
    if !world.actor.is_airborne() {
        let gone = world
            .actor
            .resting
            .map_or(true, |id| world.pool.get(id).is_none());
        if gone {
            world.actor.drop_support();
            events.push(GameEvent::SupportLost);
        }
    }

    let resting = world
        .actor
        .resting
        .and_then(|id| world.pool.get(id))
        .cloned();
    let was_airborne = world.actor.is_airborne();
    world.actor.integrate(dt, input, resting.as_ref(), &world.tuning);
    if !was_airborne && world.actor.is_airborne() {
        events.push(GameEvent::Jumped);
    }

    for p in world.pool.platforms_mut() {
        p.tick(dt);
    }
    world.camera.advance(dt);

    events
}

/// Of all platforms the actor currently qualifies to land on, pick the one
/// whose surface is nearest the actor's bottom edge. With generated gaps
/// this is almost always a single candidate; the tie-break only matters
/// when two platforms overlap inside the landing tolerance.
fn closest_landing<'a>(
    actor: &Actor,
    platforms: impl Iterator<Item = &'a Platform>,
) -> Option<&'a Platform> {
    let bottom = actor.bottom_y();
    platforms
        .filter(|p| actor.check_collision(p))
        .min_by(|a, b| {
            let da = (bottom - a.top_y()).abs();
            let db = (bottom - b.top_y()).abs();
            da.total_cmp(&db)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::platform::PlatformId;
    use crate::domain::rng::LevelRng;
    use glam::Vec2;

    fn playing_world(seed: u64) -> WorldState {
        let cfg = GameConfig::defaults();
        let mut world = WorldState::with_rng(&cfg, LevelRng::seeded(seed));
        world.phase = Phase::Playing;
        world
    }

    fn idle() -> FrameInput {
        FrameInput::default()
    }

    #[test]
    fn title_phase_does_not_simulate() {
        let cfg = GameConfig::defaults();
        let mut world = WorldState::with_rng(&cfg, LevelRng::seeded(1));
        let events = step(&mut world, &idle());
        assert!(events.is_empty());
        assert_eq!(world.tick, 0);
        assert_eq!(world.camera.climb(), 0.0);
    }

    #[test]
    fn pause_freezes_the_simulation() {
        let mut world = playing_world(1);
        world.paused = true;
        step(&mut world, &idle());
        assert_eq!(world.tick, 0);
    }

    #[test]
    fn jump_emits_event_once() {
        let mut world = playing_world(2);
        let jump = FrameInput { dir_x: 0.0, jump: true };

        let events = step(&mut world, &jump);
        assert!(events.contains(&GameEvent::Jumped));

        // Held jump while airborne: no second event.
        let events = step(&mut world, &jump);
        assert!(!events.contains(&GameEvent::Jumped));
    }

    #[test]
    fn hop_lands_back_on_a_platform() {
        let mut world = playing_world(3);
        // Gentle hop so the descent speed stays well inside the landing
        // tolerance band.
        world.tuning.jump_impulse = -300.0;

        let events = step(&mut world, &FrameInput { dir_x: 0.0, jump: true });
        assert!(events.contains(&GameEvent::Jumped));

        let mut landed = false;
        for _ in 0..120 {
            let events = step(&mut world, &idle());
            if events.iter().any(|e| matches!(e, GameEvent::Landed { .. })) {
                landed = true;
                break;
            }
        }
        assert!(landed, "hop must come back down onto a platform");
        assert!(!world.actor.is_airborne());
        assert!(world.actor.resting.is_some());
    }

    #[test]
    fn scrolled_out_support_is_lost_then_session_ends() {
        let mut world = playing_world(4);

        let mut saw_evicted = false;
        let mut saw_support_lost = false;
        let mut saw_fell_out = false;

        for _ in 0..2000 {
            let events = step(&mut world, &idle());
            for e in &events {
                match e {
                    GameEvent::PlatformEvicted { .. } => saw_evicted = true,
                    GameEvent::SupportLost => saw_support_lost = true,
                    GameEvent::FellOut => saw_fell_out = true,
                    _ => {}
                }
            }
            if world.phase == Phase::GameOver {
                break;
            }
        }

        assert!(saw_evicted, "spawn platform must scroll out");
        assert!(saw_support_lost, "actor was standing on it");
        assert!(saw_fell_out, "falling with no support ends the session");
        assert_eq!(world.phase, Phase::GameOver);
    }

    #[test]
    fn game_over_stops_ticking() {
        let mut world = playing_world(4);
        world.phase = Phase::GameOver;
        let t = world.tick;
        step(&mut world, &idle());
        assert_eq!(world.tick, t);
    }

    #[test]
    fn message_timer_counts_down_and_clears() {
        let mut world = playing_world(5);
        world.set_message("Go!", 2);
        step(&mut world, &idle());
        assert!(world.message.is_some());
        step(&mut world, &idle());
        assert!(world.message.is_none());
    }

    #[test]
    fn closest_surface_wins_overlapping_landings() {
        // Two platforms whose tolerance bands both contain the actor's
        // bottom edge; the one nearer the feet must win.
        let upper = Platform::new(PlatformId(10), 0.0, 500.0, 800.0, 10.0);
        let lower = Platform::new(PlatformId(11), 0.0, 508.0, 800.0, 10.0);

        // Landing snap puts the bottom edge 3 units above the surface, so
        // resting on a scratch platform at y 512 leaves the bottom at 509:
        // inside [500, 512.5] and inside [508, 520.5].
        let scratch = Platform::new(PlatformId(12), 0.0, 512.0, 800.0, 10.0);
        let mut actor = Actor::new(Vec2::new(100.0, 0.0), &scratch);
        actor.drop_support();
        assert!((actor.bottom_y() - 509.0).abs() < 1e-6);

        let winner = closest_landing(&actor, [&upper, &lower].into_iter())
            .expect("both platforms qualify");
        assert_eq!(winner.id(), PlatformId(11));
    }
}
