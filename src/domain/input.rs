/// Logical input actions, sampled once per frame.
///
/// The input collaborators (keyboard, gamepad) map physical devices onto
/// these flags. The simulation never sees a key code.

use bitflags::bitflags;

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
    pub struct Actions: u16 {
        const MOVE_LEFT   = 1 << 0;
        const MOVE_RIGHT  = 1 << 1;
        const DOWN        = 1 << 2;
        const JUMP        = 1 << 3;
        const DASH        = 1 << 4;
        const ATTACK      = 1 << 5;
        const SLAM        = 1 << 6;
        const DECOY       = 1 << 7;
        const SLOW_MOTION = 1 << 8;
        const PAUSE       = 1 << 9;
        const CONFIRM     = 1 << 10;
        const QUIT        = 1 << 11;
    }
}

impl Default for Actions {
    fn default() -> Self {
        Actions::empty()
    }
}

/// Frame input: `held` = currently down, `pressed` = went down this frame.
/// Continuous actions (move, down, dash) read `held`; one-shot actions
/// (jump, attack, slam, decoy, slow-motion toggle) read `pressed`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct FrameInput {
    pub held: Actions,
    pub pressed: Actions,
}

impl FrameInput {
    pub fn new(held: Actions, pressed: Actions) -> Self {
        // A fresh press is also held for that frame.
        FrameInput { held: held | pressed, pressed }
    }

    pub fn idle() -> Self {
        FrameInput::default()
    }

    #[inline]
    pub fn holds(&self, a: Actions) -> bool {
        self.held.intersects(a)
    }

    #[inline]
    pub fn just(&self, a: Actions) -> bool {
        self.pressed.intersects(a)
    }

    pub fn merge(self, other: FrameInput) -> FrameInput {
        FrameInput { held: self.held | other.held, pressed: self.pressed | other.pressed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_implies_held() {
        let input = FrameInput::new(Actions::empty(), Actions::JUMP);
        assert!(input.holds(Actions::JUMP));
        assert!(input.just(Actions::JUMP));
        assert!(!input.just(Actions::DASH));
    }

    #[test]
    fn merge_unions_both_sources() {
        let kb = FrameInput::new(Actions::MOVE_LEFT, Actions::empty());
        let pad = FrameInput::new(Actions::empty(), Actions::ATTACK);
        let both = kb.merge(pad);
        assert!(both.holds(Actions::MOVE_LEFT | Actions::ATTACK));
        assert!(both.just(Actions::ATTACK));
        assert!(!both.just(Actions::MOVE_LEFT));
    }
}
