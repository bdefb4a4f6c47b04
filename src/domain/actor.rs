/// The controllable actor: a jumping box with a three-state physics life
/// (grounded / ascending / descending) and a non-owning reference to the
/// platform it rests on.
///
/// ## Integration model
///
/// Semi-implicit Euler, uniformly on both axes: velocity is updated first,
/// then displacement = velocity * dt. The takeoff impulse is stored in
/// `jump_vel`; each airborne tick folds gravity into its y component and
/// writes the result back, so the impulse vector doubles as the running
/// vertical velocity.
///
/// ## Grounded rules
///
/// While grounded, vertical velocity and displacement are forced to zero
/// and the horizontal position is clamped to the resting platform's span —
/// the actor cannot run off an edge, only jump off. The y position is
/// re-snapped onto the platform surface every tick so a drifting platform
/// carries the actor with it.

use glam::Vec2;

use crate::config::PhysicsConfig;
use super::platform::{Platform, PlatformId};

/// Actor bounding box edge length (world units).
pub const ACTOR_SIZE: f32 = 50.0;

/// Gap kept between the actor's bottom edge and the platform surface when
/// snapped (the outline thickness in the reference look).
const SNAP_PAD: f32 = 3.0;

/// Landing tolerance below the platform's bottom edge. Keeps fast downward
/// motion from tunneling through a thin platform in a single tick.
const LAND_MARGIN: f32 = 2.5;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

/// Discrete movement tag, recomputed each tick for the presentation layer
/// (sprite/glyph selection). The simulation itself only branches on
/// `airborne`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveState {
    Idle,
    Run,
    Jump,
    Fall,
}

/// Per-tick input snapshot, polled once before each step.
/// Jump is level-triggered here; the actor's own `!airborne` guard turns
/// it into an edge.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    /// Horizontal direction: -1.0, 0.0, or +1.0.
    pub dir_x: f32,
    pub jump: bool,
}

#[derive(Clone, Debug)]
pub struct Actor {
    pos: Vec2,            // top-left, world coordinates
    vel: Vec2,
    displacement: Vec2,
    jump_vel: Vec2,       // takeoff impulse; y doubles as running fall speed
    airborne: bool,
    pub facing: Facing,
    pub move_state: MoveState,
    /// Non-owning reference into the pool. The platform outlives this
    /// reference in normal play; eviction-under-feet is handled by the
    /// step function (support loss), not here.
    pub resting: Option<PlatformId>,
}

impl Actor {
    /// Spawn at `pos`, resting on (and snapped onto) `platform`.
    pub fn new(pos: Vec2, platform: &Platform) -> Self {
        let mut actor = Actor {
            pos,
            vel: Vec2::ZERO,
            displacement: Vec2::ZERO,
            jump_vel: Vec2::ZERO,
            airborne: false,
            facing: Facing::Right,
            move_state: MoveState::Idle,
            resting: None,
        };
        actor.land_on(platform);
        actor
    }

    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    pub fn vel(&self) -> Vec2 {
        self.vel
    }

    pub fn is_airborne(&self) -> bool {
        self.airborne
    }

    /// World y of the bottom edge.
    pub fn bottom_y(&self) -> f32 {
        self.pos.y + ACTOR_SIZE
    }

    /// Advance one fixed timestep.
    ///
    /// `resting` must be the platform referenced by `self.resting` whenever
    /// the actor is grounded — a grounded actor without a resting surface
    /// is a broken invariant and fails loudly.
    pub fn integrate(
        &mut self,
        dt: f32,
        input: &FrameInput,
        resting: Option<&Platform>,
        t: &PhysicsConfig,
    ) {
        let dir_x = input.dir_x.clamp(-1.0, 1.0);
        if dir_x < 0.0 {
            self.facing = Facing::Left;
        } else if dir_x > 0.0 {
            self.facing = Facing::Right;
        }

        // Jump edge: level input, edge behavior via the grounded guard.
        if input.jump && !self.airborne {
            self.jump_vel = Vec2::new(dir_x * t.speed_rate, t.jump_impulse);
            self.airborne = true;
        }

        if !self.airborne {
            let p = resting.expect("grounded actor must have a resting platform");

            // Glue to the surface; the platform may have drifted.
            self.pos.y = p.top_y() - ACTOR_SIZE - SNAP_PAD;

            self.vel.x = dir_x * t.speed_rate;
            self.vel.y = 0.0;
            self.displacement.y = 0.0;
            self.displacement.x = self.vel.x * dt;

            // Clamp to the platform span: running stops at the edge.
            let (left, right) = p.x_extent();
            let new_x = (self.pos.x + self.displacement.x).clamp(left, right);
            self.displacement.x = new_x - self.pos.x;
        } else {
            // Airborne steering adds to the takeoff impulse.
            self.vel.x = self.jump_vel.x + dir_x * t.speed_rate;
            self.vel.y = self.jump_vel.y + t.gravity_rate * t.gravity * dt;
            self.displacement = self.vel * dt;
            self.jump_vel.y = self.vel.y;
        }

        self.pos += self.displacement;
        self.move_state = self.classify(dir_x);
    }

    fn classify(&self, dir_x: f32) -> MoveState {
        if self.airborne {
            if self.vel.y < 0.0 { MoveState::Jump } else { MoveState::Fall }
        } else if dir_x != 0.0 {
            MoveState::Run
        } else {
            MoveState::Idle
        }
    }

    /// Landing test against one candidate platform. Pure predicate.
    ///
    /// Policy (applied everywhere): the bottom edge must sit within
    /// `[top, top + height + LAND_MARGIN]` of the platform, and the
    /// quarter-width-inset horizontal span must lie inside the platform's
    /// extent. The inset keeps the actor from catching a ledge with a
    /// sliver of its corner.
    pub fn check_collision(&self, p: &Platform) -> bool {
        let bottom = self.bottom_y();
        let inset = ACTOR_SIZE / 4.0;
        let left = self.pos.x + inset;
        let right = self.pos.x + ACTOR_SIZE - inset;

        let top = p.top_y();
        let (p_left, p_right) = p.x_extent();

        bottom >= top
            && bottom <= top + p.height() + LAND_MARGIN
            && left >= p_left
            && right <= p_right
    }

    /// Landing tests only make sense while descending (or at the apex).
    /// Testing on the way up would let the actor catch a platform above it.
    pub fn should_check_for_collision(&self) -> bool {
        self.airborne && self.jump_vel.y >= 0.0
    }

    /// Resolve a landing: become grounded on `p` and snap onto its surface.
    ///
    /// The snap is a pure function of the platform — calling this twice
    /// with the same platform yields the same position. Without the snap,
    /// fractional overlap from the collision tick stays visible as
    /// clipping.
    pub fn land_on(&mut self, p: &Platform) {
        self.resting = Some(p.id());
        self.airborne = false;
        self.jump_vel = Vec2::ZERO;
        self.pos.y = p.top_y() - ACTOR_SIZE - SNAP_PAD;
    }

    /// The surface under the actor disappeared (evicted while grounded):
    /// start falling from rest, no takeoff impulse.
    pub fn drop_support(&mut self) {
        self.resting = None;
        self.airborne = true;
        self.jump_vel = Vec2::ZERO;
    }

    /// Fallen more than one full screen below the visible lower bound.
    /// The extra screen of grace keeps a just-lost landing from ending the
    /// session on the very frame it slips out of view.
    pub fn out_of_game(&self, view_bottom_y: f32, screen_h: f32) -> bool {
        self.pos.y > view_bottom_y + screen_h
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::platform::{Platform, PlatformId};

    const DT: f32 = 1.0 / 60.0;

    fn tuning() -> PhysicsConfig {
        PhysicsConfig {
            speed_rate: 150.0,
            gravity: 9.8,
            gravity_rate: 100.0,
            jump_impulse: -800.0,
            camera_scroll: 30.0,
        }
    }

    fn plat(x: f32, y: f32, w: f32) -> Platform {
        Platform::new(PlatformId(1), x, y, w, 10.0)
    }

    fn grounded_actor(p: &Platform, x: f32) -> Actor {
        Actor::new(Vec2::new(x, 0.0), p)
    }

    fn idle() -> FrameInput {
        FrameInput::default()
    }

    fn jump(dir_x: f32) -> FrameInput {
        FrameInput { dir_x, jump: true }
    }

    // ── Gravity integration ──

    #[test]
    fn vertical_velocity_converges_to_closed_form() {
        let t = tuning();
        let p = plat(0.0, 500.0, 800.0);
        let mut actor = grounded_actor(&p, 100.0);

        actor.integrate(DT, &jump(0.0), Some(&p), &t);
        let mut prev_vy = actor.vel().y;

        let g = t.gravity_rate * t.gravity; // 980 units/s^2
        for n in 2..=60u32 {
            actor.integrate(DT, &idle(), None, &t);
            let vy = actor.vel().y;
            // Strictly increasing (less negative) every tick.
            assert!(vy > prev_vy, "tick {n}: {vy} <= {prev_vy}");
            prev_vy = vy;
            // Matches v0 + g*t within float tolerance.
            let expected = t.jump_impulse + g * (n as f32 * DT);
            assert!((vy - expected).abs() < 0.05, "tick {n}: {vy} vs {expected}");
        }
    }

    #[test]
    fn apex_tick_count_is_deterministic() {
        // Impulse -800 at g = 980 u/s^2, dt = 1/60: velocity crosses zero
        // on tick 49 (-800 + 49 * 980/60 > 0).
        let t = tuning();
        let p = plat(0.0, 500.0, 800.0);
        let mut actor = grounded_actor(&p, 100.0);

        actor.integrate(DT, &jump(0.0), Some(&p), &t);
        assert!(!actor.should_check_for_collision(), "ascending after takeoff");

        for _ in 1..48 {
            actor.integrate(DT, &idle(), None, &t);
            assert!(!actor.should_check_for_collision());
        }
        actor.integrate(DT, &idle(), None, &t); // tick 49
        assert!(actor.should_check_for_collision(), "apex crossed on tick 49");
    }

    #[test]
    fn grounded_never_tests_for_landing() {
        let p = plat(0.0, 500.0, 800.0);
        let actor = grounded_actor(&p, 100.0);
        assert!(!actor.should_check_for_collision());
    }

    // ── Grounded movement ──

    #[test]
    fn grounded_clamp_stops_at_right_edge() {
        // Platform x: 100..300, run right for 2 s at 150 u/s. Unclamped
        // this would travel 300 units; the edge stops it at exactly 300.
        let t = tuning();
        let p = plat(100.0, 500.0, 200.0);
        let mut actor = grounded_actor(&p, 100.0);

        let input = FrameInput { dir_x: 1.0, jump: false };
        for _ in 0..120 {
            actor.integrate(DT, &input, Some(&p), &t);
        }
        assert_eq!(actor.pos().x, 300.0);
    }

    #[test]
    fn grounded_clamp_stops_at_left_edge() {
        let t = tuning();
        let p = plat(100.0, 500.0, 200.0);
        let mut actor = grounded_actor(&p, 250.0);

        let input = FrameInput { dir_x: -1.0, jump: false };
        for _ in 0..120 {
            actor.integrate(DT, &input, Some(&p), &t);
        }
        assert_eq!(actor.pos().x, 100.0);
    }

    #[test]
    fn grounded_position_never_leaves_extent() {
        let t = tuning();
        let p = plat(100.0, 500.0, 200.0);
        let mut actor = grounded_actor(&p, 150.0);

        // Alternate directions; x must stay inside the span throughout.
        for i in 0..300 {
            let dir = if (i / 30) % 2 == 0 { 1.0 } else { -1.0 };
            actor.integrate(DT, &FrameInput { dir_x: dir, jump: false }, Some(&p), &t);
            let x = actor.pos().x;
            assert!((100.0..=300.0).contains(&x), "x left extent: {x}");
        }
    }

    #[test]
    fn grounded_vertical_state_is_pinned() {
        let t = tuning();
        let p = plat(100.0, 500.0, 200.0);
        let mut actor = grounded_actor(&p, 150.0);
        let y0 = actor.pos().y;

        for _ in 0..60 {
            actor.integrate(DT, &FrameInput { dir_x: 1.0, jump: false }, Some(&p), &t);
            assert_eq!(actor.vel().y, 0.0);
            assert_eq!(actor.pos().y, y0);
        }
    }

    #[test]
    #[should_panic(expected = "resting platform")]
    fn grounded_without_platform_is_fatal() {
        let t = tuning();
        let p = plat(0.0, 500.0, 800.0);
        let mut actor = grounded_actor(&p, 100.0);
        actor.integrate(DT, &idle(), None, &t);
    }

    // ── Jumping ──

    #[test]
    fn jump_captures_directional_impulse() {
        let t = tuning();
        let p = plat(0.0, 500.0, 800.0);
        let mut actor = grounded_actor(&p, 100.0);

        actor.integrate(DT, &jump(1.0), Some(&p), &t);
        assert!(actor.is_airborne());
        assert_eq!(actor.move_state, MoveState::Jump);
        // Takeoff tick: vx = impulse.x + steering = 150 + 150.
        assert_eq!(actor.vel().x, 300.0);
    }

    #[test]
    fn held_jump_does_not_retrigger_midair() {
        let t = tuning();
        let p = plat(0.0, 500.0, 800.0);
        let mut actor = grounded_actor(&p, 100.0);

        actor.integrate(DT, &jump(0.0), Some(&p), &t);
        let vy_after_takeoff = actor.vel().y;

        // Key still held next tick: gravity proceeds, no fresh impulse.
        actor.integrate(DT, &jump(0.0), None, &t);
        assert!(actor.vel().y > vy_after_takeoff);
        assert!(actor.vel().y > t.jump_impulse);
    }

    #[test]
    fn airborne_steering_adds_to_impulse() {
        let t = tuning();
        let p = plat(0.0, 500.0, 800.0);
        let mut actor = grounded_actor(&p, 100.0);

        // Takeoff to the right, then steer right while airborne.
        actor.integrate(DT, &jump(1.0), Some(&p), &t);
        actor.integrate(DT, &FrameInput { dir_x: 1.0, jump: false }, None, &t);
        assert_eq!(actor.vel().x, 300.0); // 150 impulse + 150 steering

        // Release steering: impulse alone remains.
        actor.integrate(DT, &idle(), None, &t);
        assert_eq!(actor.vel().x, 150.0);
    }

    // ── Collision predicate ──

    #[test]
    fn collision_requires_bottom_in_tolerance_band() {
        let p = plat(0.0, 500.0, 800.0);
        let mut actor = grounded_actor(&p, 100.0);
        actor.drop_support();

        // Bottom exactly on the surface.
        actor.pos.y = 500.0 - ACTOR_SIZE;
        assert!(actor.check_collision(&p));

        // Inside the band: height 10 + margin 2.5.
        actor.pos.y = 500.0 - ACTOR_SIZE + 12.0;
        assert!(actor.check_collision(&p));

        // Past the band: tunneled through.
        actor.pos.y = 500.0 - ACTOR_SIZE + 13.0;
        assert!(!actor.check_collision(&p));

        // Above the surface: no contact yet.
        actor.pos.y = 500.0 - ACTOR_SIZE - 1.0;
        assert!(!actor.check_collision(&p));
    }

    #[test]
    fn collision_requires_inset_span_inside_platform() {
        let p = plat(100.0, 500.0, 100.0); // x: 100..200
        let mut actor = grounded_actor(&p, 100.0);
        actor.drop_support();
        actor.pos.y = 500.0 - ACTOR_SIZE;

        // Inset span (x+12.5 .. x+37.5) inside 100..200.
        actor.pos.x = 120.0;
        assert!(actor.check_collision(&p));

        // Hanging too far off the left edge.
        actor.pos.x = 80.0;
        assert!(!actor.check_collision(&p));

        // Hanging too far off the right edge.
        actor.pos.x = 170.0;
        assert!(!actor.check_collision(&p));
    }

    // ── Landing ──

    #[test]
    fn landing_snap_is_idempotent() {
        let t = tuning();
        let p = plat(0.0, 500.0, 800.0);
        let mut actor = grounded_actor(&p, 100.0);

        actor.integrate(DT, &jump(0.0), Some(&p), &t);
        actor.land_on(&p);
        let y_once = actor.pos().y;
        actor.land_on(&p);
        assert_eq!(actor.pos().y, y_once);
        assert!(!actor.is_airborne());
        assert_eq!(actor.resting, Some(p.id()));
    }

    #[test]
    fn landing_clears_takeoff_impulse() {
        let t = tuning();
        let p = plat(0.0, 500.0, 800.0);
        let mut actor = grounded_actor(&p, 100.0);

        actor.integrate(DT, &jump(1.0), Some(&p), &t);
        for _ in 0..60 {
            actor.integrate(DT, &idle(), None, &t);
        }
        actor.land_on(&p);

        // Next grounded tick with no input: fully at rest.
        actor.integrate(DT, &idle(), Some(&p), &t);
        assert_eq!(actor.vel(), Vec2::ZERO);
        assert_eq!(actor.move_state, MoveState::Idle);
    }

    // ── Out of game ──

    #[test]
    fn out_of_game_needs_a_full_screen_of_grace() {
        let p = plat(0.0, 500.0, 800.0);
        let mut actor = grounded_actor(&p, 100.0);
        actor.drop_support();

        // View bottom at 600, screen height 600: threshold at y = 1200.
        actor.pos.y = 1200.0;
        assert!(!actor.out_of_game(600.0, 600.0));
        actor.pos.y = 1200.5;
        assert!(actor.out_of_game(600.0, 600.0));
    }
}
