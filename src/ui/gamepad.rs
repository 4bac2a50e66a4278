/// Gamepad input tracker using gilrs.
///
/// Button mapping comes from the `[gamepad]` section of config.toml.
/// D-pad and left stick always drive movement; stick/d-pad up also jumps.
/// Without the `gamepad` feature this compiles to an inert tracker.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use crate::domain::input::{Actions, FrameInput};

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,
    R1,
    L2,
    R2,
    Start,
    Select,
}

const BTN_COUNT: usize = 10;

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER"  => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "L2" | "LT" | "LEFTTRIGGER2"  => Some(Btn::L2),
            "R2" | "RT" | "RIGHTTRIGGER2" => Some(Btn::R2),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South => Some(Btn::A),
            Button::East => Some(Btn::B),
            Button::West => Some(Btn::X),
            Button::North => Some(Btn::Y),
            Button::LeftTrigger => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::LeftTrigger2 => Some(Btn::L2),
            Button::RightTrigger2 => Some(Btn::R2),
            Button::Start => Some(Btn::Start),
            Button::Select => Some(Btn::Select),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

impl BtnState {
    fn set(&mut self, held: bool) {
        if held && !self.held {
            self.just_pressed = true;
        }
        self.held = held;
    }
}

/// Which buttons trigger which action.
fn action_map(cfg: &GamepadConfig) -> Vec<(Actions, Vec<Btn>)> {
    fn parse(names: &[String]) -> Vec<Btn> {
        names.iter().filter_map(|s| Btn::from_name(s)).collect()
    }
    vec![
        (Actions::JUMP, parse(&cfg.jump)),
        (Actions::DASH, parse(&cfg.dash)),
        (Actions::ATTACK, parse(&cfg.attack)),
        (Actions::SLAM, parse(&cfg.slam)),
        (Actions::DECOY, parse(&cfg.decoy)),
        (Actions::SLOW_MOTION, parse(&cfg.slow_motion)),
        (Actions::CONFIRM, parse(&cfg.confirm)),
        (Actions::PAUSE, parse(&cfg.pause)),
    ]
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    buttons: [BtnState; BTN_COUNT],
    up: BtnState,
    down: BtnState,
    left: BtnState,
    right: BtnState,
    dpad: [bool; 4],
    stick_x: f32,
    stick_y: f32,

    mapping: Vec<(Actions, Vec<Btn>)>,
    pub connected: bool,
}

impl GamepadState {
    pub fn new(cfg: &GamepadConfig) -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs, connected) = match Gilrs::new() {
            Ok(g) => {
                let has_pad = g.gamepads().next().is_some();
                (Some(g), has_pad)
            }
            Err(e) => {
                tracing::warn!(error = %e, "gamepad support unavailable");
                (None, false)
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs,
            buttons: [BtnState::default(); BTN_COUNT],
            up: BtnState::default(),
            down: BtnState::default(),
            left: BtnState::default(),
            right: BtnState::default(),
            dpad: [false; 4],
            stick_x: 0.0,
            stick_y: 0.0,
            mapping: action_map(cfg),
            connected,
        }
    }

    pub fn update(&mut self) {
        for b in &mut self.buttons { b.just_pressed = false; }
        for d in [&mut self.up, &mut self.down, &mut self.left, &mut self.right] {
            d.just_pressed = false;
        }

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();

        let [du, dd, dl, dr] = self.dpad;
        let (sx, sy) = (self.stick_x, self.stick_y);
        self.up.set(du || sy > STICK_DEADZONE);
        self.down.set(dd || sy < -STICK_DEADZONE);
        self.left.set(dl || sx < -STICK_DEADZONE);
        self.right.set(dr || sx > STICK_DEADZONE);
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };
        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true);
                }
                EventType::ButtonReleased(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, false);
                }
                EventType::AxisChanged(Axis::LeftStickX, v, _) => self.stick_x = v,
                EventType::AxisChanged(Axis::LeftStickY, v, _) => self.stick_y = v,
                EventType::Connected => {
                    tracing::info!("gamepad connected");
                    self.connected = true;
                }
                EventType::Disconnected => {
                    tracing::info!("gamepad disconnected");
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, btn: Button, held: bool) {
        match btn {
            Button::DPadUp => self.dpad[0] = held,
            Button::DPadDown => self.dpad[1] = held,
            Button::DPadLeft => self.dpad[2] = held,
            Button::DPadRight => self.dpad[3] = held,
            other => {
                if let Some(b) = Btn::from_gilrs(other) {
                    self.buttons[b as usize].set(held);
                }
            }
        }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        self.buttons = [BtnState::default(); BTN_COUNT];
        self.dpad = [false; 4];
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }

    /// Snapshot of this frame's gamepad actions.
    pub fn frame_input(&self) -> FrameInput {
        let mut held = Actions::empty();
        let mut pressed = Actions::empty();

        for (dir, action) in [
            (self.left, Actions::MOVE_LEFT),
            (self.right, Actions::MOVE_RIGHT),
            (self.down, Actions::DOWN),
            (self.up, Actions::JUMP),
        ] {
            if dir.held { held |= action; }
            if dir.just_pressed { pressed |= action; }
        }

        for (action, btns) in &self.mapping {
            for b in btns {
                let s = self.buttons[*b as usize];
                if s.held { held |= *action; }
                if s.just_pressed { pressed |= *action; }
            }
        }
        FrameInput::new(held, pressed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_names_parse_loosely() {
        assert_eq!(Btn::from_name("south"), Some(Btn::A));
        assert_eq!(Btn::from_name("RB"), Some(Btn::R1));
        assert_eq!(Btn::from_name("back"), Some(Btn::Select));
        assert_eq!(Btn::from_name("turbo"), None);
    }

    #[test]
    fn configured_buttons_drive_actions() {
        let mut pad = GamepadState::new(&GamepadConfig::default());
        pad.buttons[Btn::A as usize].set(true);
        pad.buttons[Btn::R1 as usize].set(true);
        let input = pad.frame_input();
        assert!(input.just(Actions::JUMP));
        assert!(input.holds(Actions::DASH));
        assert!(!input.holds(Actions::ATTACK));
    }

    #[test]
    fn stick_past_deadzone_moves() {
        let mut pad = GamepadState::new(&GamepadConfig::default());
        pad.stick_x = -0.8;
        pad.update();
        let input = pad.frame_input();
        assert!(input.holds(Actions::MOVE_LEFT));
        assert!(input.just(Actions::MOVE_LEFT));

        pad.update();
        let input = pad.frame_input();
        assert!(input.holds(Actions::MOVE_LEFT));
        assert!(!input.just(Actions::MOVE_LEFT));
    }
}
