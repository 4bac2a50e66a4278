/// Level construction: (world, sublevel) → a fresh LevelSession.
///
/// Every world shares one stage layout, shifted per world: the floating
/// platforms rise four pixels per world and enemies walk a tenth of a
/// pixel per frame faster. The boss sublevel swaps in a three-platform
/// arena with that world's named boss and no exit flag.
///
/// Out-of-range indices are rejected before anything is built.

use thiserror::Error;

use crate::config::Tuning;
use crate::domain::ability::AbilitySet;
use crate::domain::entity::{Boss, Coin, Enemy, Platform, Player};
use crate::domain::geometry::Rect;
use super::session::LevelSession;

pub const WORLD_COUNT: usize = 10;
pub const STAGES_PER_WORLD: u8 = 2;

pub const WORLD_NAMES: [&str; WORLD_COUNT] = [
    "Bamboo Forest",
    "Night Temple",
    "Volcanic Caverns",
    "Misty Graveyard",
    "Flooded Ruins",
    "Floating Dojo",
    "Thunder Peaks",
    "Ancient Caves",
    "Crumbling Temple",
    "Shadow Realm",
];

pub const BOSS_NAMES: [&str; WORLD_COUNT] = [
    "Wind Assassin",
    "Moonblade Ninja",
    "Fire Oni",
    "Phantom Shinobi",
    "Kappa General",
    "Ronin Shogun",
    "Raijin Monk",
    "Stone Titan",
    "Timekeeper Samurai",
    "Shadow Grandmaster",
];

const PLAYER_SPAWN: (i32, i32) = (100, 380);

// ── Stage layout ──

const STAGE_GROUND: Platform = Platform::new(-200, 480, 2600, 60);
const STAGE_LEDGES: [Platform; 6] = [
    Platform::new(200, 420, 180, 16),
    Platform::new(500, 360, 180, 16),
    Platform::new(820, 320, 200, 16),
    Platform::new(1120, 360, 200, 16),
    Platform::new(1420, 300, 200, 16),
    Platform::new(1720, 420, 220, 16),
];
const COIN_SPOTS: [(i32, i32); 6] = [(230, 380), (520, 320), (850, 280), (1150, 320), (1450, 260), (1750, 380)];
/// (x, y, patrol_left, patrol_right)
const ENEMY_SPOTS: [(i32, i32, i32, i32); 3] = [
    (560, 436, 520, 780),
    (1180, 436, 1120, 1400),
    (1520, 376, 1480, 1750),
];
const ENEMY_BASE_SPEED: f32 = 2.0;
const EXIT_FLAG: Rect = Rect::new(2100, 420, 20, 60);

// ── Boss arena ──

const ARENA_PLATFORMS: [Platform; 3] = [
    Platform::new(-200, 480, 2400, 60),
    Platform::new(700, 420, 500, 16),
    Platform::new(1300, 360, 500, 16),
];
const BOSS_SPAWN: (i32, i32) = (1100, 416);
const ARENA_BOUNDS: (i32, i32) = (800, 1600);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Sublevel {
    /// Ordinary stage, 1-based.
    Stage(u8),
    Boss,
}

impl Sublevel {
    pub fn first() -> Self {
        Sublevel::Stage(1)
    }

    /// The sublevel that follows this one in a world, if any.
    pub fn next(self) -> Option<Sublevel> {
        match self {
            Sublevel::Stage(n) if n < STAGES_PER_WORLD => Some(Sublevel::Stage(n + 1)),
            Sublevel::Stage(_) => Some(Sublevel::Boss),
            Sublevel::Boss => None,
        }
    }

    pub fn label(self) -> String {
        match self {
            Sublevel::Stage(n) => format!("Level {n}"),
            Sublevel::Boss => "Boss".to_string(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LevelError {
    #[error("world {0} is out of range (1..=10)")]
    WorldOutOfRange(usize),
    #[error("stage {0} is out of range (1..=2)")]
    StageOutOfRange(u8),
}

pub fn world_name(world: usize) -> Option<&'static str> {
    world.checked_sub(1).and_then(|i| WORLD_NAMES.get(i).copied())
}

pub fn boss_name(world: usize) -> Option<&'static str> {
    world.checked_sub(1).and_then(|i| BOSS_NAMES.get(i).copied())
}

pub fn validate(world: usize, sublevel: Sublevel) -> Result<(), LevelError> {
    if !(1..=WORLD_COUNT).contains(&world) {
        return Err(LevelError::WorldOutOfRange(world));
    }
    if let Sublevel::Stage(n) = sublevel {
        if !(1..=STAGES_PER_WORLD).contains(&n) {
            return Err(LevelError::StageOutOfRange(n));
        }
    }
    Ok(())
}

/// Build a fresh session for one attempt at (world, sublevel).
pub fn build_level(
    world: usize,
    sublevel: Sublevel,
    tuning: &Tuning,
    carried_score: u32,
    abilities: AbilitySet,
) -> Result<LevelSession, LevelError> {
    validate(world, sublevel)?;

    let player = Player::new(PLAYER_SPAWN.0, PLAYER_SPAWN.1, abilities);
    let mut session = LevelSession::new(world, sublevel, player, tuning.clone(), carried_score);
    session.coins = COIN_SPOTS.iter().map(|&(x, y)| Coin::new(x, y)).collect();

    match sublevel {
        Sublevel::Stage(_) => {
            let raise = (world as i32 - 1) * 4;
            let speed = ENEMY_BASE_SPEED + (world - 1) as f32 * 0.1;

            session.platforms.push(STAGE_GROUND);
            session.platforms.extend(STAGE_LEDGES.iter().map(|p| {
                Platform { rect: p.rect.translated(0, -raise) }
            }));
            session.enemies = ENEMY_SPOTS
                .iter()
                .map(|&(x, y, l, r)| Enemy::new(x, y, l, r, speed))
                .collect();
            session.exit_marker = Some(EXIT_FLAG);
        }
        Sublevel::Boss => {
            session.platforms.extend_from_slice(&ARENA_PLATFORMS);
            let name = boss_name(world).unwrap_or("Boss");
            session.boss = Some(Boss::new(BOSS_SPAWN.0, BOSS_SPAWN.1, ARENA_BOUNDS.0, ARENA_BOUNDS.1, name));
        }
    }

    tracing::info!(
        world,
        sublevel = %sublevel.label(),
        platforms = session.platforms.len(),
        enemies = session.enemies.len(),
        "level built"
    );
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ability::Ability;

    fn build(world: usize, sub: Sublevel) -> Result<LevelSession, LevelError> {
        build_level(world, sub, &Tuning::default(), 0, AbilitySet::tutorial())
    }

    #[test]
    fn sublevels_run_stage_stage_boss() {
        let mut seq = vec![Sublevel::first()];
        while let Some(next) = seq.last().and_then(|s| s.next()) {
            seq.push(next);
        }
        assert_eq!(seq, vec![Sublevel::Stage(1), Sublevel::Stage(2), Sublevel::Boss]);
    }

    #[test]
    fn rejects_out_of_range_indices() {
        assert_eq!(build(0, Sublevel::first()).unwrap_err(), LevelError::WorldOutOfRange(0));
        assert_eq!(build(11, Sublevel::Boss).unwrap_err(), LevelError::WorldOutOfRange(11));
        assert_eq!(build(3, Sublevel::Stage(3)).unwrap_err(), LevelError::StageOutOfRange(3));
        assert_eq!(build(3, Sublevel::Stage(0)).unwrap_err(), LevelError::StageOutOfRange(0));
    }

    #[test]
    fn stage_has_flag_enemies_and_no_boss() {
        let s = build(1, Sublevel::Stage(1)).unwrap();
        assert_eq!(s.exit_marker, Some(EXIT_FLAG));
        assert!(s.boss.is_none());
        assert_eq!(s.enemies.len(), 3);
        assert_eq!(s.coins.len(), 6);
        assert_eq!(s.platforms.len(), 7);
        assert_eq!(s.enemies[0].body.vx, 2.0);
    }

    #[test]
    fn later_worlds_raise_ledges_and_speed_up_enemies() {
        let s = build(4, Sublevel::Stage(2)).unwrap();
        assert_eq!(s.platforms[0].rect, STAGE_GROUND.rect);
        assert_eq!(s.platforms[1].rect.y, 420 - 12);
        assert!((s.enemies[0].body.vx - 2.3).abs() < 1e-5);
    }

    #[test]
    fn boss_stage_has_named_boss_and_no_flag() {
        let s = build(3, Sublevel::Boss).unwrap();
        let boss = s.boss.as_ref().unwrap();
        assert_eq!(boss.name, "Fire Oni");
        assert_eq!(boss.hp, 10);
        assert_eq!((boss.arena_left, boss.arena_right), ARENA_BOUNDS);
        assert!(s.exit_marker.is_none());
        assert!(s.enemies.is_empty());
    }

    #[test]
    fn carried_score_and_abilities_seed_the_session() {
        let mut abilities = AbilitySet::tutorial();
        abilities.grant(Ability::Dash);
        let s = build_level(2, Sublevel::Stage(1), &Tuning::default(), 42, abilities).unwrap();
        assert_eq!(s.score, 42);
        assert!(s.player.abilities.has(Ability::Dash));
        assert_eq!(s.player.rect().x, PLAYER_SPAWN.0);
    }

    #[test]
    fn names_cover_every_world() {
        assert_eq!(world_name(1), Some("Bamboo Forest"));
        assert_eq!(world_name(10), Some("Shadow Realm"));
        assert_eq!(world_name(0), None);
        assert_eq!(boss_name(10), Some("Shadow Grandmaster"));
    }
}
