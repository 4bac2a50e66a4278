/// Collision-resolved body physics: the one place bodies move.
///
/// ## Axis separation
///
/// Each frame a body moves horizontally first, then vertically:
///   1. x += trunc(vx); every platform now overlapping pushes the body
///      back out against the direction of travel.
///   2. vy += gravity (scaled while airborne with reduced fall), capped
///      at MAX_FALL_SPEED;
///      y += trunc(vy); an overlapping platform either lands the body
///      (falling: bottom → platform top, vy = 0, grounded, charge re-armed)
///      or bonks it (rising: top → platform bottom, vy = 0).
///
/// Horizontal-before-vertical biases ledge corners toward staying grounded.
/// Diagonal corner cases are not resolved beyond that.
///
/// ## Resting contact
///
/// Gravity is sub-pixel (0.6 px/frame²), so a body standing still moves
/// 0 px on most frames and would never "hit" the floor it rests on. If the
/// vertical pass resolved nothing and the body is not rising, a one-pixel
/// probe below the feet keeps it grounded.

use super::ability::Ability;
use super::entity::{Body, Platform, Player, Projectile};
use super::geometry::Rect;
use crate::config::Tuning;

/// Terminal fall speed in px/frame.
pub const MAX_FALL_SPEED: f32 = 20.0;

/// What the vertical pass ran into this frame.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct VerticalContact {
    pub landed: bool,
    pub bonked: bool,
}

#[inline]
fn overlapping<'a>(rect: Rect, platforms: &'a [Platform]) -> impl Iterator<Item = &'a Platform> + 'a {
    platforms.iter().filter(move |p| rect.intersects(&p.rect))
}

/// Horizontal pass: displace by vx, clamp the leading edge against platforms.
pub fn move_horizontal(body: &mut Body, platforms: &[Platform]) {
    body.rect.x += body.vx as i32;
    for p in platforms {
        if !body.rect.intersects(&p.rect) { continue; }
        if body.vx > 0.0 {
            body.rect.set_right(p.rect.x);
        } else if body.vx < 0.0 {
            body.rect.set_left(p.rect.right());
        }
    }
}

/// Vertical pass: integrate gravity, displace by vy, land or bonk.
pub fn move_vertical(body: &mut Body, platforms: &[Platform], gravity: f32) -> VerticalContact {
    let mut contact = VerticalContact::default();
    body.vy = (body.vy + gravity).min(MAX_FALL_SPEED);
    body.rect.y += body.vy as i32;

    for p in platforms {
        if !body.rect.intersects(&p.rect) { continue; }
        if body.vy > 0.0 {
            body.rect.set_bottom(p.rect.y);
            body.vy = 0.0;
            contact.landed = true;
        } else if body.vy < 0.0 {
            body.rect.set_top(p.rect.bottom());
            body.vy = 0.0;
            contact.bonked = true;
        }
    }

    if !contact.landed && !contact.bonked && body.vy >= 0.0 && resting_on(&body.rect, platforms) {
        body.vy = 0.0;
        contact.landed = true;
    }

    contact
}

/// Is a platform directly under the body's feet (one-pixel probe)?
pub fn resting_on(rect: &Rect, platforms: &[Platform]) -> bool {
    overlapping(rect.translated(0, 1), platforms).next().is_some()
}

/// One-unit probes to each side: (touching_left, touching_right).
pub fn touching_walls(rect: &Rect, platforms: &[Platform]) -> (bool, bool) {
    let left = overlapping(rect.translated(-1, 0), platforms).next().is_some();
    let right = overlapping(rect.translated(1, 0), platforms).next().is_some();
    (left, right)
}

/// Full player physics pass: horizontal, then gravity + vertical.
/// Grounding state and the double-jump charge follow the vertical result.
pub fn step_player(player: &mut Player, platforms: &[Platform], tuning: &Tuning) -> VerticalContact {
    move_horizontal(&mut player.body, platforms);

    let gravity = if player.abilities.has(Ability::ReducedFall) && !player.on_ground {
        tuning.gravity * tuning.slow_fall_factor
    } else {
        tuning.gravity
    };
    let contact = move_vertical(&mut player.body, platforms, gravity);
    player.on_ground = contact.landed;
    if contact.landed {
        player.can_double_jump = true;
    }
    contact
}

/// One-dimensional patrol between `[left, right]` on `rect.x`.
///
/// The body never ends the step outside its bounds: reaching or passing a
/// bound clamps to it and reverses direction. Returns the (possibly
/// reversed) direction sign.
pub fn patrol(rect: &mut Rect, dx: i32, left: i32, right: i32) -> i32 {
    rect.x += dx;
    if dx > 0 && rect.x >= right {
        rect.x = right;
        return -1;
    }
    if dx < 0 && rect.x <= left {
        rect.x = left;
        return 1;
    }
    rect.x = rect.x.clamp(left.min(right), right.max(left));
    if dx < 0 { -1 } else { 1 }
}

/// Move projectiles and drop those outside `[min_x, max_x]`.
pub fn advance_projectiles(projectiles: &mut Vec<Projectile>, min_x: i32, max_x: i32) {
    for pr in projectiles.iter_mut() {
        pr.rect.x += pr.vx;
    }
    projectiles.retain(|pr| pr.rect.x >= min_x && pr.rect.x <= max_x);
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ability::AbilitySet;

    fn ground() -> Vec<Platform> {
        vec![Platform::new(-200, 480, 2600, 60)]
    }

    fn body_at(x: i32, y: i32) -> Body {
        Body::new(Rect::new(x, y, 40, 46))
    }

    // ── horizontal ──

    #[test]
    fn moving_right_clamps_to_platform_left() {
        let walls = vec![Platform::new(200, 0, 20, 500)];
        let mut b = body_at(150, 100);
        b.vx = 12.0;
        move_horizontal(&mut b, &walls);
        assert_eq!(b.rect.right(), 200);
    }

    #[test]
    fn moving_left_clamps_to_platform_right() {
        let walls = vec![Platform::new(200, 0, 20, 500)];
        let mut b = body_at(225, 100);
        b.vx = -12.0;
        move_horizontal(&mut b, &walls);
        assert_eq!(b.rect.x, 220);
    }

    #[test]
    fn thin_platform_is_not_tunneled() {
        // 4 px thick, body moving 12 px/frame
        let walls = vec![Platform::new(195, 0, 4, 500)];
        let mut b = body_at(150, 100);
        b.vx = 12.0;
        move_horizontal(&mut b, &walls);
        assert_eq!(b.rect.right(), 195);
    }

    #[test]
    fn fractional_velocity_truncates() {
        let mut b = body_at(0, 0);
        b.vx = -0.9;
        move_horizontal(&mut b, &[]);
        assert_eq!(b.rect.x, 0);
    }

    // ── vertical ──

    #[test]
    fn falling_body_lands_and_stops() {
        let mut b = body_at(100, 430);
        b.vy = 8.0;
        let c = move_vertical(&mut b, &ground(), 0.6);
        assert!(c.landed);
        assert_eq!(b.rect.bottom(), 480);
        assert_eq!(b.vy, 0.0);
    }

    #[test]
    fn free_fall_caps_at_terminal_speed() {
        let mut b = body_at(0, 0);
        for _ in 0..500 {
            move_vertical(&mut b, &[], 0.6);
        }
        assert_eq!(b.vy, MAX_FALL_SPEED);
        assert!(b.rect.y <= 500 * MAX_FALL_SPEED as i32);
    }

    #[test]
    fn rising_body_bonks_ceiling() {
        let ceiling = vec![Platform::new(0, 300, 400, 16)];
        let mut b = body_at(100, 320);
        b.vy = -12.0;
        let c = move_vertical(&mut b, &ceiling, 0.6);
        assert!(c.bonked);
        assert!(!c.landed);
        assert_eq!(b.rect.y, 316);
        assert_eq!(b.vy, 0.0);
    }

    #[test]
    fn resting_body_stays_grounded_every_frame() {
        let mut b = body_at(100, 434);
        for _ in 0..10 {
            let c = move_vertical(&mut b, &ground(), 0.6);
            assert!(c.landed);
            assert_eq!(b.rect.bottom(), 480);
        }
    }

    #[test]
    fn landing_rearms_charge_regardless_of_horizontal_velocity() {
        for vx in [-12.0_f32, -5.0, 0.0, 5.0, 12.0] {
            let mut p = Player::new(500, 420, AbilitySet::default());
            p.can_double_jump = false;
            p.body.vx = vx;
            p.body.vy = 20.0;
            step_player(&mut p, &ground(), &Tuning::default());
            assert!(p.on_ground, "vx={vx}");
            assert!(p.can_double_jump, "vx={vx}");
        }
    }

    #[test]
    fn reduced_fall_scales_gravity_only_airborne() {
        let tuning = Tuning::default();
        let mut abilities = AbilitySet::default();
        abilities.grant(Ability::ReducedFall);

        let mut p = Player::new(0, 0, abilities);
        p.on_ground = false;
        step_player(&mut p, &[], &tuning);
        assert!((p.body.vy - tuning.gravity * tuning.slow_fall_factor).abs() < 1e-6);

        let mut q = Player::new(0, 0, AbilitySet::default());
        step_player(&mut q, &[], &tuning);
        assert!((q.body.vy - tuning.gravity).abs() < 1e-6);
    }

    // ── probes ──

    #[test]
    fn wall_probe_detects_each_side() {
        let walls = vec![Platform::new(0, 0, 100, 500), Platform::new(300, 0, 50, 500)];
        assert_eq!(touching_walls(&Rect::new(100, 50, 40, 46), &walls), (true, false));
        assert_eq!(touching_walls(&Rect::new(260, 50, 40, 46), &walls), (false, true));
        assert_eq!(touching_walls(&Rect::new(180, 50, 40, 46), &walls), (false, false));
    }

    // ── patrol ──

    #[test]
    fn patrol_clamps_and_reverses_at_right_bound() {
        let mut r = Rect::new(776, 436, 40, 44);
        assert_eq!(patrol(&mut r, 2, 520, 780), 1);
        assert_eq!(r.x, 778);
        assert_eq!(patrol(&mut r, 3, 520, 780), -1);
        assert_eq!(r.x, 780);
    }

    #[test]
    fn patrol_clamps_and_reverses_at_left_bound() {
        let mut r = Rect::new(521, 436, 40, 44);
        assert_eq!(patrol(&mut r, -2, 520, 780), 1);
        assert_eq!(r.x, 520);
    }

    // ── projectiles ──

    #[test]
    fn projectiles_leave_world_bounds() {
        let mut prs = vec![
            Projectile { rect: Rect::new(4995, 0, 10, 4), vx: 9 },
            Projectile { rect: Rect::new(100, 0, 10, 4), vx: 9 },
        ];
        advance_projectiles(&mut prs, -2000, 5000);
        assert_eq!(prs.len(), 1);
        assert_eq!(prs[0].rect.x, 109);
    }
}
