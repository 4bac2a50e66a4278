/// Enemy and boss behaviour: deterministic patrols, no pathfinding.
///
/// Enemies walk back and forth between their patrol bounds. Fractional
/// speeds (later worlds add a tenth of a pixel per world) accumulate in a
/// sub-pixel carry so the patrol actually speeds up.
///
/// The boss patrols its arena and, when off cooldown with the player close,
/// commits to a charge toward them.

use super::entity::{Boss, Enemy, BOSS_CHARGE_COOLDOWN, BOSS_CHARGE_RANGE, BOSS_SPEED, BOSS_TELEGRAPH_FRAMES};
use super::geometry::Rect;
use super::physics;

/// One frame of enemy behaviour. Defeated enemies only age toward removal.
pub fn update_enemy(enemy: &mut Enemy) {
    if enemy.defeated {
        enemy.defeat_timer += 1;
        return;
    }

    enemy.carry += enemy.body.vx;
    let dx = enemy.carry.trunc();
    enemy.carry -= dx;
    if dx == 0.0 {
        return;
    }

    let dir = physics::patrol(&mut enemy.body.rect, dx as i32, enemy.patrol_left, enemy.patrol_right);
    let speed = enemy.body.vx.abs();
    if (dir < 0) != (enemy.body.vx < 0.0) {
        // Reversal drops whatever carry was heading the old way.
        enemy.carry = 0.0;
    }
    enemy.body.vx = speed * dir as f32;
}

/// One frame of boss behaviour. Returns true on the frame a charge is committed.
pub fn update_boss(boss: &mut Boss, player: &Rect) -> bool {
    if !boss.is_live() {
        return false;
    }
    boss.cooldown = boss.cooldown.saturating_sub(1);
    boss.charge_timer = boss.charge_timer.saturating_sub(1);

    boss.direction = physics::patrol(
        &mut boss.body.rect,
        BOSS_SPEED * boss.direction,
        boss.arena_left,
        boss.arena_right,
    );

    let gap = player.center_x() - boss.body.rect.center_x();
    if boss.cooldown == 0 && gap.abs() < BOSS_CHARGE_RANGE {
        boss.direction = if gap < 0 { -1 } else { 1 };
        boss.cooldown = BOSS_CHARGE_COOLDOWN;
        boss.charge_timer = BOSS_TELEGRAPH_FRAMES;
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enemy_reaches_right_bound_then_turns() {
        let mut e = Enemy::new(560, 436, 520, 780, 2.0);
        for _ in 0..110 {
            update_enemy(&mut e);
        }
        assert_eq!(e.body.rect.x, 780);
        assert!(e.body.vx < 0.0);

        update_enemy(&mut e);
        assert_eq!(e.body.rect.x, 778);
    }

    #[test]
    fn enemy_never_leaves_patrol_bounds() {
        let mut e = Enemy::new(600, 436, 520, 780, 2.3);
        for _ in 0..2000 {
            update_enemy(&mut e);
            assert!((520..=780).contains(&e.body.rect.x), "x={}", e.body.rect.x);
        }
    }

    #[test]
    fn fractional_speed_accumulates() {
        let mut e = Enemy::new(0, 436, -1000, 1000, 2.5);
        for _ in 0..10 {
            update_enemy(&mut e);
        }
        assert_eq!(e.body.rect.x, 25);
    }

    #[test]
    fn defeated_enemy_stands_still_and_ages() {
        let mut e = Enemy::new(560, 436, 520, 780, 2.0);
        e.defeat();
        update_enemy(&mut e);
        update_enemy(&mut e);
        assert_eq!(e.body.rect.x, 560);
        assert_eq!(e.defeat_timer, 2);
    }

    #[test]
    fn boss_charges_when_player_close_and_off_cooldown() {
        let mut b = Boss::new(1100, 416, 800, 1600, "Wind Assassin");
        let near = Rect::new(1000, 434, 40, 46);
        assert!(update_boss(&mut b, &near));
        assert_eq!(b.direction, -1);
        assert_eq!(b.cooldown, BOSS_CHARGE_COOLDOWN);
        assert_eq!(b.charge_timer, BOSS_TELEGRAPH_FRAMES);

        // Still in range, but cooling down.
        assert!(!update_boss(&mut b, &near));
    }

    #[test]
    fn boss_ignores_distant_player() {
        let mut b = Boss::new(1100, 416, 800, 1600, "Wind Assassin");
        let far = Rect::new(100, 434, 40, 46);
        assert!(!update_boss(&mut b, &far));
        assert_eq!(b.body.rect.x, 1100 + BOSS_SPEED);
    }

    #[test]
    fn boss_stays_in_arena() {
        let mut b = Boss::new(1100, 416, 800, 1600, "Wind Assassin");
        let far = Rect::new(-500, 434, 40, 46);
        for _ in 0..1000 {
            update_boss(&mut b, &far);
            assert!((800..=1600).contains(&b.body.rect.x));
        }
    }

    #[test]
    fn defeated_boss_is_inert() {
        let mut b = Boss::new(1100, 416, 800, 1600, "Wind Assassin");
        b.hp = 0;
        assert!(!update_boss(&mut b, &Rect::new(1100, 434, 40, 46)));
        assert_eq!(b.body.rect.x, 1100);
    }
}
