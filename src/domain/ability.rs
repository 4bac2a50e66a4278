/// Abilities and their unlock order.
///
/// `AbilitySet` is a fixed-shape record with one private flag per ability.
/// Callers read it through `has` and change it only through `grant`, so a
/// granted ability can never be revoked.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Ability {
    DoubleJump,
    WallJump,
    Dash,
    Decoy,
    ReducedFall,
    RangedAttack,
    GroundSlam,
    Slide,
    SlowMotion,
    ShadowForm,
}

/// One ability per world, granted when that world's boss falls.
pub const UNLOCK_ORDER: [Ability; 10] = [
    Ability::DoubleJump,   // W1 (already active; beating the boss formalizes it)
    Ability::WallJump,
    Ability::Dash,
    Ability::Decoy,
    Ability::ReducedFall,
    Ability::RangedAttack,
    Ability::GroundSlam,
    Ability::Slide,
    Ability::SlowMotion,
    Ability::ShadowForm,
];

impl Ability {
    pub const ALL: [Ability; 10] = UNLOCK_ORDER;

    /// Short HUD tag.
    pub fn label(self) -> &'static str {
        match self {
            Ability::DoubleJump   => "DJ",
            Ability::WallJump     => "WJ",
            Ability::Dash         => "DS",
            Ability::Decoy        => "CL",
            Ability::ReducedFall  => "SF",
            Ability::RangedAttack => "SH",
            Ability::GroundSlam   => "SL",
            Ability::Slide        => "SLD",
            Ability::SlowMotion   => "TM",
            Ability::ShadowForm   => "SFm",
        }
    }

    /// Display name used by the unlock cutscene.
    pub fn title(self) -> &'static str {
        match self {
            Ability::DoubleJump   => "Double Jump",
            Ability::WallJump     => "Wall Jump",
            Ability::Dash         => "Dash",
            Ability::Decoy        => "Shadow Clone",
            Ability::ReducedFall  => "Slow Fall",
            Ability::RangedAttack => "Shuriken",
            Ability::GroundSlam   => "Ground Slam",
            Ability::Slide        => "Slide",
            Ability::SlowMotion   => "Time Slow",
            Ability::ShadowForm   => "Shadow Form",
        }
    }

    /// The ability granted for clearing `world` (1-based).
    pub fn for_world(world: usize) -> Option<Ability> {
        world.checked_sub(1).and_then(|i| UNLOCK_ORDER.get(i).copied())
    }
}

/// Granted capabilities. Missing keys in a stored record read as `false`;
/// the aliases accept records written with the older short key names.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct AbilitySet {
    #[serde(default)]
    double_jump: bool,
    #[serde(default)]
    wall_jump: bool,
    #[serde(default)]
    dash: bool,
    #[serde(default, alias = "clone")]
    decoy: bool,
    #[serde(default, alias = "slowfall")]
    reduced_fall: bool,
    #[serde(default, alias = "shuriken")]
    ranged_attack: bool,
    #[serde(default, alias = "slam")]
    ground_slam: bool,
    #[serde(default)]
    slide: bool,
    #[serde(default, alias = "slowmo")]
    slow_motion: bool,
    #[serde(default)]
    shadow_form: bool,
}

impl AbilitySet {
    /// Fresh-run set: only the tutorial double jump.
    pub fn tutorial() -> Self {
        AbilitySet { double_jump: true, ..AbilitySet::default() }
    }

    pub fn has(&self, ability: Ability) -> bool {
        match ability {
            Ability::DoubleJump   => self.double_jump,
            Ability::WallJump     => self.wall_jump,
            Ability::Dash         => self.dash,
            Ability::Decoy        => self.decoy,
            Ability::ReducedFall  => self.reduced_fall,
            Ability::RangedAttack => self.ranged_attack,
            Ability::GroundSlam   => self.ground_slam,
            Ability::Slide        => self.slide,
            Ability::SlowMotion   => self.slow_motion,
            Ability::ShadowForm   => self.shadow_form,
        }
    }

    /// Set a flag. Idempotent; returns true if it was newly granted.
    pub fn grant(&mut self, ability: Ability) -> bool {
        let slot = match ability {
            Ability::DoubleJump   => &mut self.double_jump,
            Ability::WallJump     => &mut self.wall_jump,
            Ability::Dash         => &mut self.dash,
            Ability::Decoy        => &mut self.decoy,
            Ability::ReducedFall  => &mut self.reduced_fall,
            Ability::RangedAttack => &mut self.ranged_attack,
            Ability::GroundSlam   => &mut self.ground_slam,
            Ability::Slide        => &mut self.slide,
            Ability::SlowMotion   => &mut self.slow_motion,
            Ability::ShadowForm   => &mut self.shadow_form,
        };
        let fresh = !*slot;
        *slot = true;
        fresh
    }

    pub fn granted(&self) -> impl Iterator<Item = Ability> + '_ {
        Ability::ALL.into_iter().filter(move |a| self.has(*a))
    }

    /// Every flag set in `self` is also set in `other`.
    pub fn is_subset_of(&self, other: &AbilitySet) -> bool {
        self.granted().all(|a| other.has(a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tutorial_set_has_only_double_jump() {
        let set = AbilitySet::tutorial();
        let granted: Vec<Ability> = set.granted().collect();
        assert_eq!(granted, vec![Ability::DoubleJump]);
    }

    #[test]
    fn grant_is_idempotent() {
        let mut set = AbilitySet::default();
        assert!(set.grant(Ability::Dash));
        assert!(!set.grant(Ability::Dash));
        assert!(set.has(Ability::Dash));
        assert!(!set.has(Ability::Slide));
    }

    #[test]
    fn unlock_order_covers_every_ability_once() {
        for ability in Ability::ALL {
            assert_eq!(UNLOCK_ORDER.iter().filter(|a| **a == ability).count(), 1);
        }
        assert_eq!(Ability::for_world(3), Some(Ability::Dash));
        assert_eq!(Ability::for_world(0), None);
        assert_eq!(Ability::for_world(11), None);
    }

    #[test]
    fn missing_keys_read_as_false() {
        let set: AbilitySet = serde_json::from_str(r#"{"double_jump": true, "dash": true}"#).unwrap();
        assert!(set.double_jump && set.dash);
        assert!(!set.shadow_form && !set.wall_jump);
    }

    #[test]
    fn legacy_key_names_are_accepted() {
        let set: AbilitySet =
            serde_json::from_str(r#"{"clone": true, "shuriken": true, "slowmo": false}"#).unwrap();
        assert!(set.decoy);
        assert!(set.ranged_attack);
        assert!(!set.slow_motion);
    }

    #[test]
    fn granted_flags_survive_persistence() {
        let mut set = AbilitySet::default();
        for ability in Ability::ALL {
            set.grant(ability);
        }
        let json = serde_json::to_string(&set).unwrap();
        let back: AbilitySet = serde_json::from_str(&json).unwrap();
        assert_eq!(back.granted().count(), Ability::ALL.len());
        assert!(back.is_subset_of(&set) && set.is_subset_of(&back));
    }

    #[test]
    fn subset_relation() {
        let mut a = AbilitySet::tutorial();
        let b = a;
        assert!(a.is_subset_of(&b));
        a.grant(Ability::Slide);
        assert!(!a.is_subset_of(&b));
        assert!(b.is_subset_of(&a));
    }
}
