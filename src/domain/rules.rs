/// Player action rules, ability-gated and evaluated in a fixed priority order.
///
/// These encode "what is legal" and apply the resulting intent to the
/// player's velocity and timers. Collision and combat happen later in the
/// frame; nothing here touches other entities.
///
/// ## Rule table (evaluated top to bottom every frame)
///
/// ┌───┬───────────────┬──────────────────────────────┬────────────────────────────────┐
/// │ # │ Action         │ Gate                          │ Effect                          │
/// ├───┼───────────────┼──────────────────────────────┼────────────────────────────────┤
/// │ 1 │ Move           │ always                        │ vx = ±move_speed, facing        │
/// │ 2 │ Jump           │ on_ground                     │ vy = jump, arm charge           │
/// │   │                │ else double_jump && armed     │ vy = double jump, disarm        │
/// │ 3 │ Wall jump      │ wall_jump && one side touched │ vy = jump, vx away, re-arm      │
/// │ 4 │ Dash           │ dash && cooldown == 0         │ vx = ±dash_speed, cooldown set  │
/// │ 5 │ Slide          │ slide && down && moving       │ vx *= slide_multiplier (1 frame)│
/// │ 6 │ Ranged attack  │ ranged_attack && live < cap   │ spawn projectile at center      │
/// │ 7 │ Decoy          │ decoy                         │ cosmetic timer                  │
/// │ 8 │ Slow motion    │ slow_motion && focus > 0      │ toggle slowed mode              │
/// │ 9 │ Ground slam    │ ground_slam && airborne, vy>0 │ one-frame AoE, small rebound    │
/// └───┴───────────────┴──────────────────────────────┴────────────────────────────────┘
///
/// A gated action whose ability is missing does nothing. That is routine
/// input noise, not an error.

use super::ability::Ability;
use super::entity::{AnimState, Facing, Platform, Player, Projectile, DECOY_FRAMES, FOCUS_MAX};
use super::geometry::{self, Rect};
use super::input::{Actions, FrameInput};
use super::physics;
use crate::config::Tuning;

/// What the rules did this frame, for the event stream.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ActionReport {
    pub jumped: bool,
    pub double_jumped: bool,
    pub wall_jumped: bool,
    pub dashed: bool,
    pub threw: bool,
    pub decoy: bool,
    pub slow_motion: Option<bool>,
    pub slammed: bool,
}

pub fn apply_input(
    player: &mut Player,
    input: &FrameInput,
    platforms: &[Platform],
    tuning: &Tuning,
) -> ActionReport {
    let mut report = ActionReport::default();
    let ab = player.abilities;
    player.slam_zone = None;

    // 1. Horizontal move
    player.body.vx = 0.0;
    if input.holds(Actions::MOVE_LEFT) {
        player.body.vx = -tuning.move_speed;
        player.facing = Facing::Left;
    }
    if input.holds(Actions::MOVE_RIGHT) {
        player.body.vx = tuning.move_speed;
        player.facing = Facing::Right;
    }

    // 2. Jump / double jump
    if input.just(Actions::JUMP) {
        if player.on_ground {
            player.body.vy = tuning.jump_power;
            player.on_ground = false;
            player.can_double_jump = true;
            report.jumped = true;
        } else if ab.has(Ability::DoubleJump) && player.can_double_jump {
            player.body.vy = tuning.double_jump_power;
            player.can_double_jump = false;
            report.double_jumped = true;
        }
    }

    // 3. Wall jump
    if ab.has(Ability::WallJump) && input.just(Actions::JUMP) {
        let (left, right) = physics::touching_walls(&player.body.rect, platforms);
        if left != right {
            player.body.vy = tuning.jump_power;
            player.body.vx = if left { tuning.move_speed } else { -tuning.move_speed };
            player.on_ground = false;
            player.can_double_jump = true;
            report.wall_jumped = true;
        }
    }

    // 4. Dash
    if ab.has(Ability::Dash) && input.holds(Actions::DASH) && player.dash_cooldown == 0 {
        player.body.vx = tuning.dash_speed * player.facing.sign() as f32;
        player.dash_cooldown = tuning.dash_cooldown;
        report.dashed = true;
    }

    // 5. Slide
    player.sliding = ab.has(Ability::Slide)
        && input.holds(Actions::DOWN)
        && input.holds(Actions::MOVE_LEFT | Actions::MOVE_RIGHT);
    if player.sliding {
        player.body.vx *= tuning.slide_multiplier;
    }

    // 6. Ranged attack
    if ab.has(Ability::RangedAttack) && input.just(Actions::ATTACK) && player.projectiles.len() < tuning.max_projectiles {
        let r = player.body.rect;
        player.projectiles.push(Projectile {
            rect: Rect::new(r.center_x(), r.center_y(), 10, 4),
            vx: tuning.projectile_speed * player.facing.sign(),
        });
        report.threw = true;
    }

    // 7. Decoy (cosmetic)
    if ab.has(Ability::Decoy) && input.just(Actions::DECOY) {
        player.decoy_timer = DECOY_FRAMES;
        report.decoy = true;
    }

    // 8. Slow motion toggle
    if ab.has(Ability::SlowMotion) && input.just(Actions::SLOW_MOTION) {
        if player.slow_motion {
            player.slow_motion = false;
            report.slow_motion = Some(false);
        } else if player.focus > 0.0 {
            player.slow_motion = true;
            report.slow_motion = Some(true);
        }
    }

    // 9. Ground slam
    if ab.has(Ability::GroundSlam) && input.just(Actions::SLAM) && !player.on_ground && player.body.vy > 0.0 {
        player.slam_zone = Some(geometry::slam_zone(&player.body.rect));
        player.body.vy = tuning.slam_rebound;
        report.slammed = true;
    }

    report
}

/// Per-frame timers: cooldowns floor at zero, focus drains or regenerates.
pub fn tick_timers(player: &mut Player, tuning: &Tuning) {
    player.dash_cooldown = player.dash_cooldown.saturating_sub(1);
    player.invulnerable_frames = player.invulnerable_frames.saturating_sub(1);
    player.decoy_timer = player.decoy_timer.saturating_sub(1);

    if player.slow_motion {
        player.focus -= tuning.focus_drain;
        if player.focus <= 0.0 {
            player.focus = 0.0;
            player.slow_motion = false;
        }
    } else {
        player.focus = (player.focus + tuning.focus_regen).min(FOCUS_MAX);
    }
}

/// Animation label from grounding, speed and charge. Output only.
pub fn animation_state(player: &Player) -> AnimState {
    if !player.on_ground {
        if player.can_double_jump { AnimState::Jump } else { AnimState::DoubleJump }
    } else if player.body.vx != 0.0 {
        AnimState::Run
    } else {
        AnimState::Idle
    }
}
