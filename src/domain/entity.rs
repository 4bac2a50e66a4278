/// Entities: Body, Player, Enemy, Boss, Coin, Projectile, Platform.
/// Every entity owns its Body outright; probe rects are derived on demand.

use super::ability::AbilitySet;
use super::geometry::{self, Rect};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    pub fn sign(self) -> i32 {
        match self { Facing::Left => -1, Facing::Right => 1 }
    }
}

/// Animation label for the renderer. Derived each frame, never read by physics.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AnimState {
    Idle,
    Run,
    Jump,
    DoubleJump,
}

/// A moving rectangle with velocity (pixels per frame).
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Body {
    pub rect: Rect,
    pub vx: f32,
    pub vy: f32,
}

impl Body {
    pub fn new(rect: Rect) -> Self {
        Body { rect, vx: 0.0, vy: 0.0 }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Platform {
    pub rect: Rect,
}

impl Platform {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Platform { rect: Rect::new(x, y, w, h) }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Coin {
    pub rect: Rect,
    pub collected: bool,
    pub anim_tick: u32,
}

impl Coin {
    pub fn new(x: i32, y: i32) -> Self {
        Coin { rect: Rect::new(x, y, 24, 24), collected: false, anim_tick: 0 }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Projectile {
    pub rect: Rect,
    pub vx: i32,
}

pub const PLAYER_W: i32 = 40;
pub const PLAYER_H: i32 = 46;
pub const DECOY_FRAMES: u32 = 15;
pub const FOCUS_MAX: f32 = 100.0;

#[derive(Clone, Debug)]
pub struct Player {
    pub body: Body,
    pub abilities: AbilitySet,
    pub on_ground: bool,
    /// Double-jump charge: armed by a ground jump or ground contact, spent once in the air.
    pub can_double_jump: bool,
    pub facing: Facing,
    pub dash_cooldown: u32,
    pub invulnerable_frames: u32,
    pub focus: f32,
    pub slow_motion: bool,
    pub decoy_timer: u32,
    pub sliding: bool,
    /// Ground-slam area of effect, live for the frame it was triggered.
    pub slam_zone: Option<Rect>,
    pub anim: AnimState,
    pub projectiles: Vec<Projectile>,
}

impl Player {
    pub fn new(x: i32, y: i32, abilities: AbilitySet) -> Self {
        Player {
            body: Body::new(Rect::new(x, y, PLAYER_W, PLAYER_H)),
            abilities,
            on_ground: false,
            can_double_jump: true,
            facing: Facing::Right,
            dash_cooldown: 0,
            invulnerable_frames: 0,
            focus: FOCUS_MAX,
            slow_motion: false,
            decoy_timer: 0,
            sliding: false,
            slam_zone: None,
            anim: AnimState::Idle,
            projectiles: Vec::new(),
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        self.body.rect
    }

    pub fn feet(&self) -> Rect {
        geometry::feet_probe(&self.body.rect)
    }

    pub fn facing_left(&self) -> bool {
        self.facing == Facing::Left
    }
}

pub const ENEMY_W: i32 = 40;
pub const ENEMY_H: i32 = 44;
/// Frames a defeated enemy lingers before removal.
pub const ENEMY_LINGER_FRAMES: u32 = 30;

#[derive(Clone, Debug)]
pub struct Enemy {
    pub body: Body,
    pub patrol_left: i32,
    pub patrol_right: i32,
    pub defeated: bool,
    pub defeat_timer: u32,
    /// Sub-pixel remainder of horizontal motion.
    pub carry: f32,
}

impl Enemy {
    pub fn new(x: i32, y: i32, patrol_left: i32, patrol_right: i32, speed: f32) -> Self {
        let mut body = Body::new(Rect::new(x, y, ENEMY_W, ENEMY_H));
        body.vx = speed;
        Enemy { body, patrol_left, patrol_right, defeated: false, defeat_timer: 0, carry: 0.0 }
    }

    pub fn is_live(&self) -> bool {
        !self.defeated
    }

    pub fn defeat(&mut self) {
        self.defeated = true;
    }

    pub fn expired(&self) -> bool {
        self.defeated && self.defeat_timer > ENEMY_LINGER_FRAMES
    }

    pub fn head(&self) -> Rect {
        geometry::head_probe(&self.body.rect)
    }
}

pub const BOSS_SIZE: i32 = 64;
pub const BOSS_MAX_HP: u32 = 10;
pub const BOSS_SPEED: i32 = 3;
pub const BOSS_CHARGE_COOLDOWN: u32 = 90;
pub const BOSS_CHARGE_RANGE: i32 = 200;
pub const BOSS_TELEGRAPH_FRAMES: u32 = 20;

#[derive(Clone, Debug)]
pub struct Boss {
    pub body: Body,
    pub hp: u32,
    pub direction: i32,
    pub cooldown: u32,
    /// Telegraph after committing to a charge; cosmetic.
    pub charge_timer: u32,
    pub arena_left: i32,
    pub arena_right: i32,
    pub name: String,
}

impl Boss {
    pub fn new(x: i32, y: i32, arena_left: i32, arena_right: i32, name: &str) -> Self {
        Boss {
            body: Body::new(Rect::new(x, y, BOSS_SIZE, BOSS_SIZE)),
            hp: BOSS_MAX_HP,
            direction: 1,
            cooldown: 0,
            charge_timer: 0,
            arena_left,
            arena_right,
            name: name.to_string(),
        }
    }

    pub fn is_live(&self) -> bool {
        self.hp > 0
    }

    /// Deal damage, flooring at zero. Returns true if this hit was the killing blow.
    pub fn hit(&mut self, dmg: u32) -> bool {
        if self.hp == 0 { return false; }
        self.hp = self.hp.saturating_sub(dmg);
        self.hp == 0
    }

    pub fn head(&self) -> Rect {
        geometry::head_probe(&self.body.rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boss_hp_floors_at_zero() {
        let mut b = Boss::new(0, 0, 0, 100, "Test");
        b.hp = 2;
        assert!(!b.hit(1));
        assert!(b.hit(5));
        assert_eq!(b.hp, 0);
        assert!(!b.hit(1));
        assert_eq!(b.hp, 0);
        assert!(!b.is_live());
    }

    #[test]
    fn enemy_lingers_before_expiring() {
        let mut e = Enemy::new(0, 0, 0, 100, 2.0);
        e.defeat();
        e.defeat_timer = ENEMY_LINGER_FRAMES;
        assert!(!e.expired());
        e.defeat_timer += 1;
        assert!(e.expired());
    }

    #[test]
    fn new_player_starts_armed_and_full_focus() {
        let p = Player::new(100, 380, AbilitySet::default());
        assert!(p.can_double_jump);
        assert!(!p.on_ground);
        assert_eq!(p.focus, FOCUS_MAX);
        assert_eq!(p.rect(), Rect::new(100, 380, PLAYER_W, PLAYER_H));
    }
}
