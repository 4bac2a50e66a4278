/// The step function: advances a level session by one frame.
///
/// Processing order:
///   1. Player rules (ability-gated input), physics, timers, fall death
///   2. Projectile flight
///   3. Enemies: patrol, projectile hits, slam, stomp, touch
///   4. Boss: patrol/charge, projectile hits, stomp, touch
///   5. Coin collection
///   6. Exit marker
///   7. Camera + animation label
///   8. Outcome
///
/// Outcome precedence when several terminal conditions hold on the same
/// frame: boss-defeated > death > exit reached > continuing.

use crate::domain::ai;
use crate::domain::entity::Player;
use crate::domain::input::FrameInput;
use crate::domain::physics;
use crate::domain::rules::{self, ActionReport};
use super::event::GameEvent;
use super::session::{LevelSession, Outcome, WORLD_MAX_X, WORLD_MIN_X};

pub const STOMP_SCORE: u32 = 5;
pub const COIN_SCORE: u32 = 1;
/// Invulnerability granted by a boss stomp so the rebound can clear the boss.
pub const BOSS_STOMP_GRACE: u32 = 30;

#[derive(Clone, Debug)]
pub struct StepResult {
    pub outcome: Outcome,
    pub events: Vec<GameEvent>,
}

/// Per-frame combat verdicts gathered before the outcome is decided.
#[derive(Default)]
struct Verdict {
    killed: bool,
    boss_defeated: bool,
    exit_reached: bool,
}

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(session: &mut LevelSession, input: &FrameInput) -> StepResult {
    let mut events: Vec<GameEvent> = Vec::new();
    let mut verdict = Verdict::default();
    session.tick += 1;

    resolve_player(session, input, &mut events);
    verdict.killed |= resolve_fall(session);
    resolve_projectiles(session);
    verdict.killed |= resolve_enemies(session, &mut events);
    let (boss_killed_player, boss_down) = resolve_boss(session, &mut events);
    verdict.killed |= boss_killed_player;
    verdict.boss_defeated = boss_down;
    resolve_coins(session, &mut events);
    verdict.exit_reached = resolve_exit(session);

    session.follow_player();
    session.player.anim = rules::animation_state(&session.player);

    let outcome = resolve_outcome(&verdict, &mut events);
    if outcome.is_terminal() {
        tracing::debug!(
            world = session.world,
            sublevel = ?session.sublevel,
            tick = session.tick,
            score = session.score,
            ?outcome,
            "session ended"
        );
    }
    StepResult { outcome, events }
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

fn resolve_player(session: &mut LevelSession, input: &FrameInput, events: &mut Vec<GameEvent>) {
    let LevelSession { player, platforms, tuning, .. } = session;

    let report = rules::apply_input(player, input, platforms, tuning);
    report_events(&report, player, events);

    physics::step_player(player, platforms, tuning);
    rules::tick_timers(player, tuning);
}

/// Falling off the level is fatal regardless of invulnerability.
fn resolve_fall(session: &LevelSession) -> bool {
    session.player.rect().y > session.kill_plane()
}

fn report_events(report: &ActionReport, player: &Player, events: &mut Vec<GameEvent>) {
    if report.jumped { events.push(GameEvent::Jumped); }
    if report.double_jumped { events.push(GameEvent::DoubleJumped); }
    if report.wall_jumped { events.push(GameEvent::WallJumped); }
    if report.dashed { events.push(GameEvent::Dashed); }
    if report.threw { events.push(GameEvent::ProjectileThrown); }
    if report.decoy { events.push(GameEvent::DecoyDropped); }
    if let Some(active) = report.slow_motion {
        events.push(GameEvent::SlowMotion { active });
    }
    if report.slammed {
        if let Some(zone) = player.slam_zone {
            events.push(GameEvent::GroundSlam { x: zone.center_x(), y: zone.y });
        }
    }
}

fn resolve_projectiles(session: &mut LevelSession) {
    physics::advance_projectiles(&mut session.player.projectiles, WORLD_MIN_X, WORLD_MAX_X);
}

// ══════════════════════════════════════════════════════════════
// Coins
// ══════════════════════════════════════════════════════════════

/// A collected coin leaves the collection the same frame, so it can
/// never be counted twice.
fn resolve_coins(session: &mut LevelSession, events: &mut Vec<GameEvent>) {
    let body = session.player.rect();
    for coin in session.coins.iter_mut() {
        coin.anim_tick = coin.anim_tick.wrapping_add(1);
        if !coin.collected && coin.rect.intersects(&body) {
            coin.collected = true;
            session.score += COIN_SCORE;
            events.push(GameEvent::CoinCollected { x: coin.rect.x, y: coin.rect.y });
        }
    }
    session.coins.retain(|c| !c.collected);
}

// ══════════════════════════════════════════════════════════════
// Enemies
// ══════════════════════════════════════════════════════════════

/// Returns true if a live enemy touched a vulnerable player.
fn resolve_enemies(session: &mut LevelSession, events: &mut Vec<GameEvent>) -> bool {
    let LevelSession { enemies, player, tuning, score, .. } = session;
    let mut killed = false;

    for enemy in enemies.iter_mut() {
        ai::update_enemy(enemy);
        if !enemy.is_live() { continue; }
        let er = enemy.body.rect;

        if let Some(i) = player.projectiles.iter().position(|pr| pr.rect.intersects(&er)) {
            player.projectiles.remove(i);
            enemy.defeat();
            events.push(GameEvent::EnemyDefeated { x: er.x, y: er.y });
            continue;
        }

        if player.slam_zone.map_or(false, |zone| zone.intersects(&er)) {
            enemy.defeat();
            events.push(GameEvent::EnemyDefeated { x: er.x, y: er.y });
            continue;
        }

        if player.body.vy > 0.0 && player.feet().intersects(&enemy.head()) {
            enemy.defeat();
            player.body.vy = tuning.jump_power * tuning.stomp_rebound;
            *score += STOMP_SCORE;
            events.push(GameEvent::EnemyStomped { x: er.x, y: er.y });
            continue;
        }

        if player.invulnerable_frames == 0 && player.rect().intersects(&er) {
            killed = true;
        }
    }

    enemies.retain(|e| !e.expired());
    killed
}

// ══════════════════════════════════════════════════════════════
// Boss
// ══════════════════════════════════════════════════════════════

/// Returns (player killed by touch, boss defeated).
fn resolve_boss(session: &mut LevelSession, events: &mut Vec<GameEvent>) -> (bool, bool) {
    let LevelSession { boss, player, tuning, .. } = session;
    let boss = match boss.as_mut() { Some(b) => b, None => return (false, false) };
    if !boss.is_live() { return (false, true); }

    if ai::update_boss(boss, &player.rect()) {
        events.push(GameEvent::BossCharge);
    }

    // Projectile hits: each live projectile overlapping the boss costs one hp.
    let br = boss.body.rect;
    let mut i = 0;
    while i < player.projectiles.len() && boss.is_live() {
        if player.projectiles[i].rect.intersects(&br) {
            player.projectiles.remove(i);
            boss.hit(1);
            events.push(GameEvent::BossHit { hp: boss.hp });
        } else {
            i += 1;
        }
    }

    let mut stomped = false;
    if boss.is_live() && player.body.vy > 0.0 && player.feet().intersects(&boss.head()) {
        boss.hit(1);
        player.body.vy = tuning.jump_power * tuning.stomp_rebound;
        player.invulnerable_frames = BOSS_STOMP_GRACE;
        stomped = true;
        events.push(GameEvent::BossHit { hp: boss.hp });
    }

    let killed = !stomped
        && boss.is_live()
        && player.invulnerable_frames == 0
        && player.rect().intersects(&boss.body.rect);

    (killed, !boss.is_live())
}

// ══════════════════════════════════════════════════════════════
// Exit + outcome
// ══════════════════════════════════════════════════════════════

fn resolve_exit(session: &LevelSession) -> bool {
    session.exit_marker.map_or(false, |flag| flag.intersects(&session.player.rect()))
}

fn resolve_outcome(verdict: &Verdict, events: &mut Vec<GameEvent>) -> Outcome {
    if verdict.boss_defeated {
        events.push(GameEvent::BossDefeated);
        Outcome::BossDefeated
    } else if verdict.killed {
        events.push(GameEvent::PlayerKilled);
        Outcome::Dead
    } else if verdict.exit_reached {
        events.push(GameEvent::LevelExitReached);
        Outcome::LevelExitReached
    } else {
        Outcome::Continuing
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
