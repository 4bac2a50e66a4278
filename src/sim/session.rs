/// LevelSession: the complete snapshot of one attempt at one sublevel.
///
/// ## Ownership
///
/// The session owns everything that moves. Platforms are built once and
/// never mutated; coins, enemies and the optional boss are removed from
/// their collections as they are consumed. The player owns its projectiles.
///
/// ## Camera
///
/// Horizontal only. `camera_x` is the world x of the viewport's left edge,
/// recomputed every step from the player's center and never negative.

use crate::config::Tuning;
use crate::domain::entity::{Boss, Coin, Enemy, Platform, Player};
use crate::domain::geometry::Rect;
use super::level::Sublevel;

/// Projectiles outside this horizontal band are discarded.
pub const WORLD_MIN_X: i32 = -2000;
pub const WORLD_MAX_X: i32 = 5000;

/// How far below the lowest platform a falling player may drop before dying.
pub const FALL_MARGIN: i32 = 200;

/// Terminal signal returned by each step.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    Continuing,
    Dead,
    LevelExitReached,
    BossDefeated,
}

impl Outcome {
    pub fn is_terminal(self) -> bool {
        self != Outcome::Continuing
    }
}

#[derive(Clone, Debug)]
pub struct LevelSession {
    pub world: usize,
    pub sublevel: Sublevel,
    pub platforms: Vec<Platform>,
    pub coins: Vec<Coin>,
    pub enemies: Vec<Enemy>,
    pub boss: Option<Boss>,
    pub exit_marker: Option<Rect>,
    pub player: Player,
    pub camera_x: i32,
    /// Running score, seeded with the score carried into this sublevel.
    pub score: u32,
    pub tuning: Tuning,
    pub tick: u64,
}

impl LevelSession {
    pub fn new(world: usize, sublevel: Sublevel, player: Player, tuning: Tuning, score: u32) -> Self {
        let mut session = LevelSession {
            world,
            sublevel,
            platforms: Vec::new(),
            coins: Vec::new(),
            enemies: Vec::new(),
            boss: None,
            exit_marker: None,
            player,
            camera_x: 0,
            score,
            tuning,
            tick: 0,
        };
        session.follow_player();
        session
    }

    /// World y past which a player's top edge means a fatal fall.
    pub fn kill_plane(&self) -> i32 {
        let lowest = self.platforms.iter().map(|p| p.rect.bottom()).max().unwrap_or(0);
        lowest + FALL_MARGIN
    }

    /// Snap the camera so the player sits mid-viewport, clamped at the left edge.
    pub fn follow_player(&mut self) {
        let half = self.tuning.viewport_width / 2;
        self.camera_x = (self.player.rect().center_x() - half).max(0);
    }

    pub fn boss_hp(&self) -> Option<u32> {
        self.boss.as_ref().map(|b| b.hp)
    }
}
