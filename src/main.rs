/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use config::GameConfig;
use domain::actor::FrameInput;
use sim::event::GameEvent;
use sim::step::step;
use sim::world::{Phase, WorldState};
use ui::gamepad::GamepadState;
use ui::input::{InputState, JUMP_KEYS};
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

/// HUD message duration in simulation ticks.
const MSG_TICKS: u32 = 90;

fn main() {
    let config = GameConfig::load();

    let mut world = WorldState::new(&config);

    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut world, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Sky Hopper!");
    println!("Best altitude this run: {:.0}", world.camera.climb());
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);

    let tick_rate = Duration::from_secs_f32(world.world.dt());
    let mut last_tick = Instant::now();
    let mut lag = Duration::ZERO;

    loop {
        kb.drain_events();
        gp.update();
        world.pad_connected = gp.connected;

        if kb.ctrl_c_pressed() {
            break;
        }
        if handle_meta(world, &kb, &gp, config) {
            break;
        }

        // Fixed-timestep accumulator: consume whole ticks, carry the rest.
        let now = Instant::now();
        lag += now.duration_since(last_tick);
        last_tick = now;

        while lag >= tick_rate {
            lag -= tick_rate;
            world.anim_tick = world.anim_tick.wrapping_add(1);

            if world.phase == Phase::Playing && !world.paused {
                let frame_input = FrameInput {
                    dir_x: detect_steering(&kb, &gp),
                    jump: kb.jump_held() || gp.jump_held(),
                };
                let events = step(world, &frame_input);
                process_events(world, sound, &events);
            }
        }

        renderer.render(world)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn process_events(world: &mut WorldState, sound: Option<&SoundEngine>, events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::SupportLost => {
                world.set_message("Platform scrolled away!", MSG_TICKS);
            }
            GameEvent::FellOut => {
                world.set_message("FELL OUT", MSG_TICKS);
            }
            _ => {}
        }
    }

    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for event in events {
        match event {
            GameEvent::Jumped => sfx.play_jump(),
            GameEvent::Landed { .. } => sfx.play_land(),
            GameEvent::SupportLost => sfx.play_crumble(),
            GameEvent::FellOut => sfx.play_over(),
            _ => {}
        }
    }
}

// ── Key Constants ──

const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];

fn detect_steering(kb: &InputState, gp: &GamepadState) -> f32 {
    let from_pad = gp.horizontal_dir();
    if from_pad != 0.0 {
        from_pad
    } else {
        kb.horizontal_dir()
    }
}

/// Begin a fresh climb, re-rolling the level from the configured seed.
fn start_session(world: &mut WorldState, config: &GameConfig) {
    *world = WorldState::new(config);
    world.phase = Phase::Playing;
    world.set_message("Climb!", MSG_TICKS / 2);
}

fn return_to_title(world: &mut WorldState, config: &GameConfig) {
    *world = WorldState::new(config);
    world.phase = Phase::Title;
}

fn handle_meta(
    world: &mut WorldState,
    kb: &InputState,
    gp: &GamepadState,
    config: &GameConfig,
) -> bool {
    let confirm = kb.any_pressed(KEYS_CONFIRM) || gp.confirm_pressed();
    let esc = kb.any_pressed(&[KeyCode::Esc]) || gp.cancel_pressed();

    match world.phase {
        // ── Title Screen ──
        Phase::Title => {
            if confirm || kb.any_pressed(&JUMP_KEYS) {
                start_session(world, config);
            } else if kb.any_pressed(&[KeyCode::Char('q'), KeyCode::Char('Q')]) || esc {
                return true;
            }
        }

        // ── Playing ──
        Phase::Playing => {
            // F1 (or p): Pause / Resume
            if kb.any_pressed(&[KeyCode::F(1), KeyCode::Char('p'), KeyCode::Char('P')]) {
                world.paused = !world.paused;
                return false;
            }
            if world.paused {
                if kb.any_pressed(KEYS_RESTART) || gp.restart_pressed() {
                    start_session(world, config);
                } else if esc {
                    world.paused = false;
                    return_to_title(world, config);
                }
                return false; // Block other input while paused
            }
            if kb.any_pressed(KEYS_RESTART) || gp.restart_pressed() {
                start_session(world, config);
            } else if esc {
                return_to_title(world, config);
            }
        }

        // ── Game Over ──
        Phase::GameOver => {
            if confirm || kb.any_pressed(KEYS_RESTART) || gp.restart_pressed() {
                start_session(world, config);
            } else if esc {
                return_to_title(world, config);
            }
        }
    }

    false
}
