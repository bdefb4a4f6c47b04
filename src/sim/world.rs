/// Whole-session state: actor, platform pool, camera, phase machine, and
/// the transient HUD message. Mutated exclusively by `sim::step` and the
/// meta-input handling in the outer loop.

use glam::Vec2;

use crate::config::{GameConfig, PhysicsConfig, WorldConfig};
use crate::domain::actor::{Actor, ACTOR_SIZE};
use crate::domain::rng::LevelRng;
use super::camera::Camera;
use super::pool::PlatformPool;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Title,
    Playing,
    GameOver,
}

pub struct WorldState {
    pub actor: Actor,
    pub pool: PlatformPool,
    pub camera: Camera,
    pub world: WorldConfig,
    pub tuning: PhysicsConfig,
    pub phase: Phase,
    pub paused: bool,
    pub tick: u64,
    /// Free-running presentation counter (blinking prompts). Advances in
    /// every phase, including pause, unlike `tick`.
    pub anim_tick: u64,
    pub message: Option<String>,
    pub message_timer: u32,
    /// Whether a gamepad is currently attached; shown on the title screen.
    pub pad_connected: bool,
}

impl WorldState {
    pub fn new(config: &GameConfig) -> Self {
        Self::with_rng(config, LevelRng::from_seed(config.pool.seed))
    }

    /// Build a session with an explicit generator (tests pass a fixed
    /// seed; `new` routes through the configured one).
    pub fn with_rng(config: &GameConfig, rng: LevelRng) -> Self {
        let pool = PlatformPool::new(&config.pool, &config.world, rng);

        let actor = {
            let spawn = pool.front().expect("fresh pool must not be empty");
            let (left, right) = spawn.x_extent();
            let x = (left + right - ACTOR_SIZE) / 2.0;
            Actor::new(Vec2::new(x, 0.0), spawn)
        };

        WorldState {
            actor,
            pool,
            camera: Camera::new(config.physics.camera_scroll),
            world: config.world.clone(),
            tuning: config.physics.clone(),
            phase: Phase::Title,
            paused: false,
            tick: 0,
            anim_tick: 0,
            message: None,
            message_timer: 0,
            pad_connected: false,
        }
    }

    /// World y of the lowest visible row for the current camera position.
    pub fn view_bottom(&self) -> f32 {
        self.camera.view_bottom_y(self.world.height)
    }

    /// Show a transient HUD message for `ticks` simulation ticks.
    pub fn set_message(&mut self, text: &str, ticks: u32) {
        self.message = Some(text.to_string());
        self.message_timer = ticks;
    }
}
