/// GameState: phases around the level session.
///
/// ## Phases
///
///   Title → WorldMap → Playing ⇄ Paused
///                         ↓ world cleared
///                      Cutscene → WorldMap
///
/// Paused and Cutscene suspend the session entirely: no physics, AI or
/// timers advance. Quit is honoured in every phase and exits without
/// saving; an uncleared world attempt is simply dropped.
///
/// Progress reaches the disk from exactly one place: `clear_world`.

use std::path::PathBuf;

use crate::config::Tuning;
use crate::domain::ability::Ability;
use crate::domain::input::{Actions, FrameInput};
use super::campaign::{AttemptStatus, WorldAttempt};
use super::event::GameEvent;
use super::level::{self, WORLD_COUNT};
use super::progress::{self, Progress};
use super::session::{LevelSession, Outcome};
use super::step;

/// Frames the "scroll recovered" cutscene stays up unless dismissed.
pub const CUTSCENE_FRAMES: u32 = 180;
const MESSAGE_FRAMES: u32 = 90;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Title,
    WorldMap,
    Playing,
    Paused,
    Cutscene,
}

#[derive(Clone, Debug)]
pub struct Cutscene {
    pub world: usize,
    pub ability: Option<Ability>,
    pub timer: u32,
}

pub struct GameState {
    pub phase: Phase,
    pub progress: Progress,
    pub tuning: Tuning,
    pub save_path: PathBuf,
    pub attempt: Option<WorldAttempt>,
    pub session: Option<LevelSession>,
    /// 0-based world index under the map cursor.
    pub map_cursor: usize,
    pub cutscene: Option<Cutscene>,
    pub message: String,
    pub message_timer: u32,
    pub anim_tick: u64,
    pub quit: bool,
}

impl GameState {
    pub fn new(progress: Progress, tuning: Tuning, save_path: PathBuf) -> Self {
        let map_cursor = progress.world_unlocked.saturating_sub(1).min(WORLD_COUNT - 1);
        GameState {
            phase: Phase::Title,
            progress,
            tuning,
            save_path,
            attempt: None,
            session: None,
            map_cursor,
            cutscene: None,
            message: String::new(),
            message_timer: 0,
            anim_tick: 0,
            quit: false,
        }
    }

    pub fn set_message(&mut self, msg: &str, frames: u32) {
        self.message = msg.to_string();
        self.message_timer = frames;
    }

    /// Advance one logical frame. Returns the session's events, if it ran.
    pub fn tick(&mut self, input: &FrameInput) -> Vec<GameEvent> {
        self.anim_tick = self.anim_tick.wrapping_add(1);
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 { self.message.clear(); }
        }

        if input.just(Actions::QUIT) {
            tracing::info!(phase = ?self.phase, "quit requested");
            self.quit = true;
            return Vec::new();
        }

        match self.phase {
            Phase::Title => {
                if input.just(Actions::CONFIRM | Actions::JUMP) {
                    self.phase = Phase::WorldMap;
                }
            }
            Phase::WorldMap => self.tick_map(input),
            Phase::Playing => return self.tick_playing(input),
            Phase::Paused => {
                if input.just(Actions::PAUSE | Actions::CONFIRM) {
                    self.phase = Phase::Playing;
                }
            }
            Phase::Cutscene => self.tick_cutscene(input),
        }
        Vec::new()
    }

    fn tick_map(&mut self, input: &FrameInput) {
        if input.just(Actions::MOVE_LEFT) {
            self.map_cursor = self.map_cursor.saturating_sub(1);
        } else if input.just(Actions::MOVE_RIGHT) {
            self.map_cursor = (self.map_cursor + 1).min(WORLD_COUNT - 1);
        } else if input.just(Actions::CONFIRM | Actions::JUMP) {
            self.enter_world(self.map_cursor + 1);
        } else if input.just(Actions::PAUSE) {
            self.phase = Phase::Title;
        }
    }

    fn tick_playing(&mut self, input: &FrameInput) -> Vec<GameEvent> {
        if input.just(Actions::PAUSE) {
            self.phase = Phase::Paused;
            return Vec::new();
        }
        let session = match self.session.as_mut() {
            Some(s) => s,
            None => {
                self.phase = Phase::WorldMap;
                return Vec::new();
            }
        };
        let result = step::step(session, input);
        if result.outcome.is_terminal() {
            let score = session.score;
            self.finish_session(result.outcome, score);
        }
        result.events
    }

    fn tick_cutscene(&mut self, input: &FrameInput) {
        let done = match self.cutscene.as_mut() {
            Some(c) => {
                c.timer = c.timer.saturating_sub(1);
                c.timer == 0 || input.just(Actions::CONFIRM | Actions::JUMP)
            }
            None => true,
        };
        if done {
            self.cutscene = None;
            self.phase = Phase::WorldMap;
        }
    }

    // ── Attempt lifecycle ──

    pub fn enter_world(&mut self, world: usize) {
        if !self.progress.is_unlocked(world) {
            self.set_message("That scroll is still sealed.", MESSAGE_FRAMES);
            return;
        }
        let started = WorldAttempt::start(world, &self.progress)
            .and_then(|attempt| attempt.build(&self.progress, &self.tuning).map(|s| (attempt, s)));
        match started {
            Ok((attempt, session)) => {
                self.attempt = Some(attempt);
                self.session = Some(session);
                self.phase = Phase::Playing;
            }
            Err(e) => {
                tracing::warn!(world, error = %e, "cannot enter world");
                self.set_message(&e.to_string(), MESSAGE_FRAMES);
            }
        }
    }

    fn finish_session(&mut self, outcome: Outcome, score: u32) {
        let mut attempt = match self.attempt.take() {
            Some(a) => a,
            None => return,
        };
        let status = attempt.record(outcome, score);
        match status {
            AttemptStatus::Next(_) => match attempt.build(&self.progress, &self.tuning) {
                Ok(session) => {
                    self.session = Some(session);
                    self.attempt = Some(attempt);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "cannot build next sublevel");
                    self.back_to_map();
                }
            },
            AttemptStatus::Cleared => {
                let ability = attempt.conclude(status, &mut self.progress);
                self.clear_world(attempt.world, ability);
            }
            AttemptStatus::Failed => {
                attempt.conclude(status, &mut self.progress);
                let name = level::world_name(attempt.world).unwrap_or("?");
                self.set_message(&format!("Fallen in {name}. Try again."), MESSAGE_FRAMES);
                self.back_to_map();
            }
        }
    }

    fn clear_world(&mut self, world: usize, ability: Option<Ability>) {
        if let Err(e) = progress::save(&self.save_path, &self.progress) {
            tracing::error!(path = %self.save_path.display(), error = %e, "failed to save progress");
            self.set_message("Progress could not be saved!", MESSAGE_FRAMES);
        }
        self.session = None;
        self.map_cursor = self.progress.world_unlocked.saturating_sub(1).min(WORLD_COUNT - 1);
        self.cutscene = Some(Cutscene { world, ability, timer: CUTSCENE_FRAMES });
        self.phase = Phase::Cutscene;
    }

    fn back_to_map(&mut self) {
        self.session = None;
        self.attempt = None;
        self.phase = Phase::WorldMap;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::Sublevel;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ninja-scrolls-game-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        let _ = std::fs::remove_file(&path);
        path
    }

    fn game(name: &str) -> GameState {
        GameState::new(Progress::default(), Tuning::default(), scratch(name))
    }

    fn press(a: Actions) -> FrameInput {
        FrameInput::new(Actions::empty(), a)
    }

    fn playing(name: &str) -> GameState {
        let mut g = game(name);
        g.tick(&press(Actions::CONFIRM));
        g.tick(&press(Actions::CONFIRM));
        assert_eq!(g.phase, Phase::Playing);
        g
    }

    #[test]
    fn title_to_map_to_first_world() {
        let g = playing("enter.json");
        assert_eq!(g.attempt.as_ref().map(|a| a.world), Some(1));
        assert_eq!(g.session.as_ref().map(|s| s.sublevel), Some(Sublevel::Stage(1)));
    }

    #[test]
    fn locked_world_cannot_be_entered() {
        let mut g = game("locked.json");
        g.phase = Phase::WorldMap;
        g.tick(&press(Actions::MOVE_RIGHT));
        assert_eq!(g.map_cursor, 1);
        g.tick(&press(Actions::CONFIRM));
        assert_eq!(g.phase, Phase::WorldMap);
        assert!(g.session.is_none());
        assert!(!g.message.is_empty());
    }

    #[test]
    fn pause_suspends_the_session() {
        let mut g = playing("pause.json");
        g.tick(&FrameInput::idle());
        let tick = g.session.as_ref().unwrap().tick;
        let y = g.session.as_ref().unwrap().player.rect().y;

        g.tick(&press(Actions::PAUSE));
        assert_eq!(g.phase, Phase::Paused);
        for _ in 0..30 { g.tick(&FrameInput::idle()); }
        let s = g.session.as_ref().unwrap();
        assert_eq!(s.tick, tick);
        assert_eq!(s.player.rect().y, y);

        g.tick(&press(Actions::PAUSE));
        assert_eq!(g.phase, Phase::Playing);
        g.tick(&FrameInput::idle());
        assert_eq!(g.session.as_ref().unwrap().tick, tick + 1);
    }

    #[test]
    fn quit_mid_attempt_does_not_persist() {
        let mut g = playing("quit.json");
        for _ in 0..10 { g.tick(&FrameInput::idle()); }
        g.tick(&press(Actions::QUIT));
        assert!(g.quit);
        assert!(!g.save_path.exists());
    }

    #[test]
    fn clearing_a_world_saves_and_shows_cutscene() {
        let mut g = playing("clear.json");
        g.finish_session(Outcome::LevelExitReached, 4);
        assert_eq!(g.session.as_ref().map(|s| s.sublevel), Some(Sublevel::Stage(2)));
        assert_eq!(g.session.as_ref().map(|s| s.score), Some(4));
        g.finish_session(Outcome::LevelExitReached, 8);
        assert!(g.session.as_ref().and_then(|s| s.boss.as_ref()).is_some());
        assert!(!g.save_path.exists());

        g.finish_session(Outcome::BossDefeated, 9);
        assert_eq!(g.phase, Phase::Cutscene);
        assert_eq!(g.cutscene.as_ref().and_then(|c| c.ability), Some(Ability::DoubleJump));
        let saved = progress::load(&g.save_path);
        assert_eq!(saved.world_unlocked, 2);
        assert_eq!(saved.cumulative_score, 9);

        for _ in 0..CUTSCENE_FRAMES - 1 { g.tick(&FrameInput::idle()); }
        assert_eq!(g.phase, Phase::Cutscene);
        g.tick(&FrameInput::idle());
        assert_eq!(g.phase, Phase::WorldMap);
        assert_eq!(g.map_cursor, 1);
    }

    #[test]
    fn cutscene_can_be_dismissed() {
        let mut g = game("dismiss.json");
        g.cutscene = Some(Cutscene { world: 1, ability: None, timer: CUTSCENE_FRAMES });
        g.phase = Phase::Cutscene;
        g.tick(&press(Actions::CONFIRM));
        assert_eq!(g.phase, Phase::WorldMap);
    }

    #[test]
    fn death_returns_to_map_without_saving() {
        let mut g = playing("death.json");
        g.finish_session(Outcome::LevelExitReached, 3);
        g.finish_session(Outcome::Dead, 5);
        assert_eq!(g.phase, Phase::WorldMap);
        assert!(g.session.is_none() && g.attempt.is_none());
        assert_eq!(g.progress.world_unlocked, 1);
        assert_eq!(g.progress.cumulative_score, 5);
        assert!(!g.save_path.exists());
    }
}
