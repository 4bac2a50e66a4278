/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub tuning: Tuning,
    pub tick_rate_ms: u64,
    pub gamepad: GamepadConfig,
    pub save_file: String,
}

/// Physics and combat tuning. Units are pixels and frames.
#[derive(Clone, Debug, PartialEq)]
pub struct Tuning {
    pub gravity: f32,
    pub move_speed: f32,
    pub jump_power: f32,        // negative = up
    pub double_jump_power: f32, // weaker than jump_power
    pub dash_speed: f32,
    pub dash_cooldown: u32,
    pub slow_fall_factor: f32,
    pub slide_multiplier: f32,
    pub projectile_speed: i32,
    pub max_projectiles: usize,
    pub stomp_rebound: f32,     // fraction of jump_power
    pub slam_rebound: f32,
    pub focus_drain: f32,
    pub focus_regen: f32,
    pub viewport_width: i32,
}

impl Default for Tuning {
    fn default() -> Self {
        let t = TomlPhysics::default();
        Tuning {
            gravity: t.gravity,
            move_speed: t.move_speed,
            jump_power: t.jump_power,
            double_jump_power: t.double_jump_power,
            dash_speed: t.dash_speed,
            dash_cooldown: t.dash_cooldown,
            slow_fall_factor: t.slow_fall_factor,
            slide_multiplier: t.slide_multiplier,
            projectile_speed: t.projectile_speed,
            max_projectiles: t.max_projectiles,
            stomp_rebound: t.stomp_rebound,
            slam_rebound: t.slam_rebound,
            focus_drain: t.focus_drain,
            focus_regen: t.focus_regen,
            viewport_width: default_viewport_width(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub jump: Vec<String>,
    pub dash: Vec<String>,
    pub attack: Vec<String>,
    pub slam: Vec<String>,
    pub decoy: Vec<String>,
    pub slow_motion: Vec<String>,
    pub confirm: Vec<String>,
    pub pause: Vec<String>,
}

impl Default for GamepadConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default()).gamepad
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    physics: TomlPhysics,
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    view: TomlView,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlPhysics {
    #[serde(default = "default_gravity")]
    gravity: f32,
    #[serde(default = "default_move_speed")]
    move_speed: f32,
    #[serde(default = "default_jump_power")]
    jump_power: f32,
    #[serde(default = "default_double_jump_power")]
    double_jump_power: f32,
    #[serde(default = "default_dash_speed")]
    dash_speed: f32,
    #[serde(default = "default_dash_cooldown")]
    dash_cooldown: u32,
    #[serde(default = "default_slow_fall_factor")]
    slow_fall_factor: f32,
    #[serde(default = "default_slide_multiplier")]
    slide_multiplier: f32,
    #[serde(default = "default_projectile_speed")]
    projectile_speed: i32,
    #[serde(default = "default_max_projectiles")]
    max_projectiles: usize,
    #[serde(default = "default_stomp_rebound")]
    stomp_rebound: f32,
    #[serde(default = "default_slam_rebound")]
    slam_rebound: f32,
    #[serde(default = "default_focus_drain")]
    focus_drain: f32,
    #[serde(default = "default_focus_regen")]
    focus_regen: f32,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlView {
    #[serde(default = "default_viewport_width")]
    viewport_width: i32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_pad_jump")]
    jump: Vec<String>,
    #[serde(default = "default_pad_dash")]
    dash: Vec<String>,
    #[serde(default = "default_pad_attack")]
    attack: Vec<String>,
    #[serde(default = "default_pad_slam")]
    slam: Vec<String>,
    #[serde(default = "default_pad_decoy")]
    decoy: Vec<String>,
    #[serde(default = "default_pad_slow_motion")]
    slow_motion: Vec<String>,
    #[serde(default = "default_pad_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_pad_pause")]
    pause: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_save_file")]
    save_file: String,
}

// ── Defaults ──

fn default_gravity() -> f32 { 0.6 }
fn default_move_speed() -> f32 { 5.0 }
fn default_jump_power() -> f32 { -12.0 }
fn default_double_jump_power() -> f32 { -11.0 }
fn default_dash_speed() -> f32 { 12.0 }
fn default_dash_cooldown() -> u32 { 30 }        // half a second at 60 Hz
fn default_slow_fall_factor() -> f32 { 0.6 }
fn default_slide_multiplier() -> f32 { 1.2 }
fn default_projectile_speed() -> i32 { 9 }
fn default_max_projectiles() -> usize { 3 }
fn default_stomp_rebound() -> f32 { 0.6 }
fn default_slam_rebound() -> f32 { -6.0 }
fn default_focus_drain() -> f32 { 0.5 }
fn default_focus_regen() -> f32 { 0.2 }
fn default_tick_rate() -> u64 { 16 }            // ~60 Hz
fn default_viewport_width() -> i32 { 960 }

fn default_pad_jump() -> Vec<String> { vec!["A".into()] }
fn default_pad_dash() -> Vec<String> { vec!["R1".into()] }
fn default_pad_attack() -> Vec<String> { vec!["X".into()] }
fn default_pad_slam() -> Vec<String> { vec!["B".into()] }
fn default_pad_decoy() -> Vec<String> { vec!["Y".into()] }
fn default_pad_slow_motion() -> Vec<String> { vec!["L1".into()] }
fn default_pad_confirm() -> Vec<String> { vec!["Start".into(), "A".into()] }
fn default_pad_pause() -> Vec<String> { vec!["Select".into()] }
fn default_save_file() -> String { "ninja_progress.json".into() }

impl Default for TomlPhysics {
    fn default() -> Self {
        TomlPhysics {
            gravity: default_gravity(),
            move_speed: default_move_speed(),
            jump_power: default_jump_power(),
            double_jump_power: default_double_jump_power(),
            dash_speed: default_dash_speed(),
            dash_cooldown: default_dash_cooldown(),
            slow_fall_factor: default_slow_fall_factor(),
            slide_multiplier: default_slide_multiplier(),
            projectile_speed: default_projectile_speed(),
            max_projectiles: default_max_projectiles(),
            stomp_rebound: default_stomp_rebound(),
            slam_rebound: default_slam_rebound(),
            focus_drain: default_focus_drain(),
            focus_regen: default_focus_regen(),
        }
    }
}

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming { tick_rate_ms: default_tick_rate() }
    }
}

impl Default for TomlView {
    fn default() -> Self {
        TomlView { viewport_width: default_viewport_width() }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            jump: default_pad_jump(),
            dash: default_pad_dash(),
            attack: default_pad_attack(),
            slam: default_pad_slam(),
            decoy: default_pad_decoy(),
            slow_motion: default_pad_slow_motion(),
            confirm: default_pad_confirm(),
            pause: default_pad_pause(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { save_file: default_save_file() }
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

    fn from_toml(toml_cfg: TomlConfig) -> Self {
        let p = toml_cfg.physics;
        GameConfig {
            tuning: Tuning {
                gravity: p.gravity,
                move_speed: p.move_speed,
                jump_power: p.jump_power,
                double_jump_power: p.double_jump_power,
                dash_speed: p.dash_speed,
                dash_cooldown: p.dash_cooldown,
                slow_fall_factor: p.slow_fall_factor,
                slide_multiplier: p.slide_multiplier,
                projectile_speed: p.projectile_speed,
                max_projectiles: p.max_projectiles,
                stomp_rebound: p.stomp_rebound,
                slam_rebound: p.slam_rebound,
                focus_drain: p.focus_drain,
                focus_regen: p.focus_regen,
                viewport_width: toml_cfg.view.viewport_width.max(1),
            },
            tick_rate_ms: toml_cfg.timing.tick_rate_ms.max(1),
            gamepad: GamepadConfig {
                jump: toml_cfg.gamepad.jump,
                dash: toml_cfg.gamepad.dash,
                attack: toml_cfg.gamepad.attack,
                slam: toml_cfg.gamepad.slam,
                decoy: toml_cfg.gamepad.decoy,
                slow_motion: toml_cfg.gamepad.slow_motion,
                confirm: toml_cfg.gamepad.confirm,
                pause: toml_cfg.gamepad.pause,
            },
            save_file: toml_cfg.general.save_file,
        }
    }
}

/// Candidate directories to search: exe dir + CWD + data paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so an installed link still finds data beside the real binary.
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

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/ninja-scrolls");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    let sys = PathBuf::from("/usr/share/ninja-scrolls");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
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
                Ok(text) => return parse_toml(&text),
                Err(e) => {
                    tracing::warn!("could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

fn parse_toml(text: &str) -> TomlConfig {
    match toml::from_str::<TomlConfig>(text) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!("config.toml parse error, using default settings: {e}");
            TomlConfig::default()
        }
    }
}
