/// Keyboard tracker: crossterm key events → logical `Actions`.
///
/// Terminals rarely report key releases, so a key counts as held until
/// HOLD_TIMEOUT passes without a Press/Repeat for it. When keyboard
/// enhancement is active, Release events are honoured directly.
///
/// Default bindings:
///   ←/→ or A/D   move          ↓ or S    down (slide)
///   ↑, W, Space  jump          C or K    dash
///   X or J       shuriken      Z         ground slam
///   V            shadow clone  F         time slow
///   Esc or P     pause         Enter     confirm
///   Q / Ctrl+C   quit

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::input::{Actions, FrameInput};

const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

const KEYMAP: &[(Actions, &[KeyCode])] = &[
    (Actions::MOVE_LEFT, &[KeyCode::Left, KeyCode::Char('a')]),
    (Actions::MOVE_RIGHT, &[KeyCode::Right, KeyCode::Char('d')]),
    (Actions::DOWN, &[KeyCode::Down, KeyCode::Char('s')]),
    (Actions::JUMP, &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char(' ')]),
    (Actions::DASH, &[KeyCode::Char('c'), KeyCode::Char('k')]),
    (Actions::ATTACK, &[KeyCode::Char('x'), KeyCode::Char('j')]),
    (Actions::SLAM, &[KeyCode::Char('z')]),
    (Actions::DECOY, &[KeyCode::Char('v')]),
    (Actions::SLOW_MOTION, &[KeyCode::Char('f')]),
    (Actions::PAUSE, &[KeyCode::Esc, KeyCode::Char('p')]),
    (Actions::CONFIRM, &[KeyCode::Enter]),
    (Actions::QUIT, &[KeyCode::Char('q')]),
];

/// Letters bind case-insensitively.
fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

/// Every action bound to any of `codes`.
pub fn actions_for<'a>(codes: impl IntoIterator<Item = &'a KeyCode>) -> Actions {
    let mut out = Actions::empty();
    for code in codes {
        let code = normalize(*code);
        for (action, keys) in KEYMAP {
            if keys.contains(&code) {
                out |= *action;
            }
        }
    }
    out
}

pub struct InputState {
    /// Last Press/Repeat per key.
    last_active: HashMap<KeyCode, Instant>,
    /// Keys that went from released to held during the last drain.
    fresh_presses: Vec<KeyCode>,
    interrupted: bool,
    /// True only when keyboard enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            interrupted: false,
            honor_release: false,
        }
    }

    /// Drain pending terminal events. Call once per frame before sampling.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.interrupted = false;

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.apply(key);
            }
        }

        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    fn apply(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && normalize(key.code) == KeyCode::Char('c') {
            self.interrupted = true;
            return;
        }
        let code = normalize(key.code);
        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&code);
            }
            KeyEventKind::Release => {}
            _ => {
                if !self.is_held(code) {
                    self.fresh_presses.push(code);
                }
                self.last_active.insert(code, Instant::now());
            }
        }
    }

    fn is_held(&self, code: KeyCode) -> bool {
        self.last_active.get(&code).map_or(false, |t| t.elapsed() < HOLD_TIMEOUT)
    }

    /// Snapshot of this frame's keyboard actions.
    pub fn frame_input(&self) -> FrameInput {
        let held: Vec<KeyCode> = self.last_active.keys().copied().filter(|c| self.is_held(*c)).collect();
        let mut pressed = actions_for(&self.fresh_presses);
        if self.interrupted {
            pressed |= Actions::QUIT;
        }
        FrameInput::new(actions_for(&held), pressed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bindings_are_case_insensitive() {
        assert_eq!(actions_for(&[KeyCode::Char('X')]), Actions::ATTACK);
        assert_eq!(actions_for(&[KeyCode::Char('x')]), Actions::ATTACK);
    }

    #[test]
    fn several_keys_union() {
        let a = actions_for(&[KeyCode::Left, KeyCode::Char(' '), KeyCode::Char('c')]);
        assert_eq!(a, Actions::MOVE_LEFT | Actions::JUMP | Actions::DASH);
        assert_eq!(actions_for(&[KeyCode::F(5)]), Actions::empty());
    }

    #[test]
    fn fresh_press_is_held_and_pressed() {
        let mut kb = InputState::new();
        kb.apply(KeyEvent::new(KeyCode::Up, KeyModifiers::NONE));
        let input = kb.frame_input();
        assert!(input.just(Actions::JUMP));
        assert!(input.holds(Actions::JUMP));
    }

    #[test]
    fn ctrl_c_maps_to_quit() {
        let mut kb = InputState::new();
        kb.apply(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        let input = kb.frame_input();
        assert!(input.just(Actions::QUIT));
        assert!(!input.holds(Actions::DASH));
    }
}
