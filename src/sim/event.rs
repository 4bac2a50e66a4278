/// Events emitted during a simulation step.
/// The presentation layer consumes these for sound and flashes; the
/// simulation itself never reads them back.

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    CoinCollected { x: i32, y: i32 },
    Jumped,
    DoubleJumped,
    WallJumped,
    Dashed,
    ProjectileThrown,
    DecoyDropped,
    SlowMotion { active: bool },
    GroundSlam { x: i32, y: i32 },
    EnemyStomped { x: i32, y: i32 },
    EnemyDefeated { x: i32, y: i32 },
    BossHit { hp: u32 },
    BossCharge,
    PlayerKilled,
    LevelExitReached,
    BossDefeated,
}
