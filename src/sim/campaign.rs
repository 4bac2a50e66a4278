/// World attempts: Level 1 → Level 2 → Boss, no deaths allowed.
///
/// A `WorldAttempt` consumes the outcome of each finished session and says
/// what comes next. It never touches the disk; the caller persists progress
/// after a clear.

use crate::config::Tuning;
use crate::domain::ability::Ability;
use super::level::{self, LevelError, Sublevel};
use super::progress::Progress;
use super::session::{LevelSession, Outcome};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AttemptStatus {
    /// Keep going; play this sublevel next.
    Next(Sublevel),
    Cleared,
    Failed,
}

#[derive(Clone, Debug)]
pub struct WorldAttempt {
    pub world: usize,
    pub sublevel: Sublevel,
    /// Score carried between sublevels of this attempt.
    pub score: u32,
}

impl WorldAttempt {
    pub fn start(world: usize, progress: &Progress) -> Result<Self, LevelError> {
        let sublevel = Sublevel::first();
        level::validate(world, sublevel)?;
        tracing::info!(world, name = level::world_name(world).unwrap_or("?"), "world attempt started");
        Ok(WorldAttempt { world, sublevel, score: progress.cumulative_score })
    }

    /// Fresh session for the current sublevel with the current abilities.
    pub fn build(&self, progress: &Progress, tuning: &Tuning) -> Result<LevelSession, LevelError> {
        level::build_level(self.world, self.sublevel, tuning, self.score, progress.abilities)
    }

    /// Feed back a session's terminal outcome and its final score.
    pub fn record(&mut self, outcome: Outcome, score: u32) -> AttemptStatus {
        self.score = score;
        match (self.sublevel, outcome) {
            (_, Outcome::Continuing) => AttemptStatus::Next(self.sublevel),
            (Sublevel::Stage(_), Outcome::LevelExitReached) => match self.sublevel.next() {
                Some(next) => {
                    self.sublevel = next;
                    AttemptStatus::Next(next)
                }
                None => AttemptStatus::Cleared,
            },
            (Sublevel::Boss, Outcome::BossDefeated) => AttemptStatus::Cleared,
            _ => AttemptStatus::Failed,
        }
    }

    /// Fold a finished attempt into `progress`. Returns the ability granted
    /// by a clear.
    pub fn conclude(&self, status: AttemptStatus, progress: &mut Progress) -> Option<Ability> {
        match status {
            AttemptStatus::Cleared => {
                let granted = progress.record_world_clear(self.world, self.score);
                tracing::info!(world = self.world, ability = ?granted, score = self.score, "world cleared");
                granted
            }
            AttemptStatus::Failed => {
                progress.record_failed_attempt(self.score);
                tracing::info!(world = self.world, sublevel = ?self.sublevel, score = self.score, "world attempt failed");
                None
            }
            AttemptStatus::Next(_) => None,
        }
    }
}
