/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub world: WorldConfig,
    pub physics: PhysicsConfig,
    pub pool: PoolConfig,
    pub gamepad: GamepadConfig,
}

/// Screen dimensions (world units) and simulation tick rate.
#[derive(Clone, Debug)]
pub struct WorldConfig {
    pub width: f32,
    pub height: f32,
    pub tick_hz: u32,
}

impl WorldConfig {
    /// Fixed simulation timestep in seconds.
    pub fn dt(&self) -> f32 {
        1.0 / self.tick_hz.max(1) as f32
    }
}

/// Physics tuning. Units are world units (pixels) and seconds.
#[derive(Clone, Debug)]
pub struct PhysicsConfig {
    /// Horizontal run speed (units/s).
    pub speed_rate: f32,
    /// Gravitational constant, scaled by `gravity_rate`.
    pub gravity: f32,
    pub gravity_rate: f32,
    /// Vertical takeoff velocity. Negative = up.
    pub jump_impulse: f32,
    /// Camera scroll speed (units/s, upward).
    pub camera_scroll: f32,
}

/// Platform pool sizing and generation ranges.
#[derive(Clone, Debug)]
pub struct PoolConfig {
    pub target_size: usize,
    /// Refill threshold: eviction below this size regenerates the pool.
    pub low_water: usize,
    /// Vertical gap between consecutive platforms (inclusive range).
    pub gap_min: i32,
    pub gap_max: i32,
    pub platform_height: f32,
    /// Fixed RNG seed for reproducible runs. None = entropy.
    pub seed: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub jump: Vec<String>,
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
    pub restart: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    world: TomlWorld,
    #[serde(default)]
    physics: TomlPhysics,
    #[serde(default)]
    pool: TomlPool,
    #[serde(default)]
    gamepad: TomlGamepad,
}

#[derive(Deserialize, Debug)]
struct TomlWorld {
    #[serde(default = "default_width")]
    width: f32,
    #[serde(default = "default_height")]
    height: f32,
    #[serde(default = "default_tick_hz")]
    tick_hz: u32,
}

#[derive(Deserialize, Debug)]
struct TomlPhysics {
    #[serde(default = "default_speed_rate")]
    speed_rate: f32,
    #[serde(default = "default_gravity")]
    gravity: f32,
    #[serde(default = "default_gravity_rate")]
    gravity_rate: f32,
    #[serde(default = "default_jump_impulse")]
    jump_impulse: f32,
    #[serde(default = "default_camera_scroll")]
    camera_scroll: f32,
}

#[derive(Deserialize, Debug)]
struct TomlPool {
    #[serde(default = "default_target_size")]
    target_size: usize,
    #[serde(default = "default_low_water")]
    low_water: usize,
    #[serde(default = "default_gap_min")]
    gap_min: i32,
    #[serde(default = "default_gap_max")]
    gap_max: i32,
    #[serde(default = "default_platform_height")]
    platform_height: f32,
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_jump_btns")]
    jump: Vec<String>,
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
    #[serde(default = "default_restart")]
    restart: Vec<String>,
}

// ── Defaults ──

fn default_width() -> f32 { 800.0 }
fn default_height() -> f32 { 600.0 }
fn default_tick_hz() -> u32 { 60 }

fn default_speed_rate() -> f32 { 150.0 }
fn default_gravity() -> f32 { 9.8 }
fn default_gravity_rate() -> f32 { 100.0 }
fn default_jump_impulse() -> f32 { -800.0 }
fn default_camera_scroll() -> f32 { 30.0 }   // 0.5 units per tick at 60 Hz

fn default_target_size() -> usize { 20 }
fn default_low_water() -> usize { 10 }
fn default_gap_min() -> i32 { 100 }
fn default_gap_max() -> i32 { 300 }
fn default_platform_height() -> f32 { 10.0 }

fn default_jump_btns() -> Vec<String> { vec!["A".into(), "X".into(), "R1".into()] }
fn default_confirm() -> Vec<String> { vec!["Start".into()] }
fn default_cancel() -> Vec<String> { vec!["Select".into()] }
fn default_restart() -> Vec<String> { vec!["Start".into()] }

impl Default for TomlWorld {
    fn default() -> Self {
        TomlWorld {
            width: default_width(),
            height: default_height(),
            tick_hz: default_tick_hz(),
        }
    }
}

impl Default for TomlPhysics {
    fn default() -> Self {
        TomlPhysics {
            speed_rate: default_speed_rate(),
            gravity: default_gravity(),
            gravity_rate: default_gravity_rate(),
            jump_impulse: default_jump_impulse(),
            camera_scroll: default_camera_scroll(),
        }
    }
}

impl Default for TomlPool {
    fn default() -> Self {
        TomlPool {
            target_size: default_target_size(),
            low_water: default_low_water(),
            gap_min: default_gap_min(),
            gap_max: default_gap_max(),
            platform_height: default_platform_height(),
            seed: None,
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            jump: default_jump_btns(),
            confirm: default_confirm(),
            cancel: default_cancel(),
            restart: default_restart(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let toml_cfg = load_toml(&candidate_dirs());
        Self::from_toml(toml_cfg)
    }

    fn from_toml(t: TomlConfig) -> Self {
        GameConfig {
            world: WorldConfig {
                width: t.world.width,
                height: t.world.height,
                tick_hz: t.world.tick_hz,
            },
            physics: PhysicsConfig {
                speed_rate: t.physics.speed_rate,
                gravity: t.physics.gravity,
                gravity_rate: t.physics.gravity_rate,
                jump_impulse: t.physics.jump_impulse,
                camera_scroll: t.physics.camera_scroll,
            },
            pool: PoolConfig {
                target_size: t.pool.target_size,
                low_water: t.pool.low_water,
                gap_min: t.pool.gap_min,
                gap_max: t.pool.gap_max,
                platform_height: t.pool.platform_height,
                seed: t.pool.seed,
            },
            gamepad: GamepadConfig {
                jump: t.gamepad.jump,
                confirm: t.gamepad.confirm,
                cancel: t.gamepad.cancel,
                restart: t.gamepad.restart,
            },
        }
    }

    /// All defaults, no file lookup. Used by tests.
    #[cfg(test)]
    pub fn defaults() -> Self {
        Self::from_toml(TomlConfig::default())
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so a linked binary still finds its config.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_tuning() {
        let cfg = GameConfig::defaults();
        assert_eq!(cfg.world.width, 800.0);
        assert_eq!(cfg.world.height, 600.0);
        assert_eq!(cfg.world.tick_hz, 60);
        assert_eq!(cfg.physics.speed_rate, 150.0);
        assert_eq!(cfg.physics.jump_impulse, -800.0);
        assert_eq!(cfg.pool.target_size, 20);
        assert_eq!(cfg.pool.low_water, 10);
        assert_eq!(cfg.pool.seed, None);
    }

    #[test]
    fn dt_from_tick_hz() {
        let cfg = GameConfig::defaults();
        assert!((cfg.world.dt() - 1.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn partial_toml_fills_missing_keys() {
        let text = r#"
            [pool]
            seed = 42
            target_size = 8

            [physics]
            gravity = 10.0
        "#;
        let t: TomlConfig = toml::from_str(text).expect("parse");
        let cfg = GameConfig::from_toml(t);
        assert_eq!(cfg.pool.seed, Some(42));
        assert_eq!(cfg.pool.target_size, 8);
        assert_eq!(cfg.pool.low_water, 10); // default
        assert_eq!(cfg.physics.gravity, 10.0);
        assert_eq!(cfg.physics.speed_rate, 150.0); // default
    }

    #[test]
    fn empty_toml_is_all_defaults() {
        let t: TomlConfig = toml::from_str("").expect("parse");
        let cfg = GameConfig::from_toml(t);
        assert_eq!(cfg.pool.gap_min, 100);
        assert_eq!(cfg.pool.gap_max, 300);
        assert_eq!(cfg.physics.camera_scroll, 30.0);
    }
}
