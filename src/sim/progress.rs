/// Durable campaign progress: unlocked worlds, granted abilities, score.
///
/// ## File format
///
/// Pretty-printed JSON, one object:
///
/// ```text
/// { "world_unlocked": 3, "scrolls_cleared": 2,
///   "abilities": { "double_jump": true, "wall_jump": true, ... },
///   "cumulative_score": 57 }
/// ```
///
/// Older records used `scrolls` and `coins` for the last two keys; both
/// are still accepted. Missing ability keys read as false.
///
/// ## Durability
///
/// Loading never fails: a missing or corrupt file yields a fresh record.
/// Saving writes a sibling `.tmp` file and renames it over the target, so
/// a failed write leaves the previous record intact.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::ability::{Ability, AbilitySet};
use super::level::WORLD_COUNT;

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("progress file I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("progress record could not be encoded: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    #[serde(default = "default_world_unlocked")]
    pub world_unlocked: usize,
    #[serde(default, alias = "scrolls")]
    pub scrolls_cleared: usize,
    #[serde(default = "AbilitySet::tutorial")]
    pub abilities: AbilitySet,
    #[serde(default, alias = "coins")]
    pub cumulative_score: u32,
}

fn default_world_unlocked() -> usize { 1 }

impl Default for Progress {
    fn default() -> Self {
        Progress {
            world_unlocked: default_world_unlocked(),
            scrolls_cleared: 0,
            abilities: AbilitySet::tutorial(),
            cumulative_score: 0,
        }
    }
}

impl Progress {
    pub fn is_unlocked(&self, world: usize) -> bool {
        world >= 1 && world <= self.world_unlocked
    }

    /// Record a full world clear: unlock the next world, mark the scroll,
    /// grant that world's ability. Never lowers anything.
    pub fn record_world_clear(&mut self, world: usize, score: u32) -> Option<Ability> {
        self.scrolls_cleared = self.scrolls_cleared.max(world);
        if world < WORLD_COUNT {
            self.world_unlocked = self.world_unlocked.max(world + 1);
        }
        self.cumulative_score = score;
        let ability = Ability::for_world(world)?;
        self.abilities.grant(ability);
        Some(ability)
    }

    /// A failed attempt keeps its score and nothing else.
    pub fn record_failed_attempt(&mut self, score: u32) {
        self.cumulative_score = score;
    }

    /// Clamp values a hand-edited record could put out of range.
    fn sanitized(mut self) -> Self {
        self.world_unlocked = self.world_unlocked.clamp(1, WORLD_COUNT);
        self.scrolls_cleared = self.scrolls_cleared.min(WORLD_COUNT);
        self
    }
}

// ══════════════════════════════════════════════════════════════
// Load / save
// ══════════════════════════════════════════════════════════════

pub fn load(path: &Path) -> Progress {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "no progress file, starting fresh");
            return Progress::default();
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "progress unreadable, starting fresh");
            return Progress::default();
        }
    };
    match serde_json::from_str::<Progress>(&text) {
        Ok(p) => {
            let p = p.sanitized();
            tracing::info!(
                path = %path.display(),
                world_unlocked = p.world_unlocked,
                scrolls = p.scrolls_cleared,
                "progress loaded"
            );
            p
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "progress corrupt, starting fresh");
            Progress::default()
        }
    }
}

/// Atomically replace the record at `path`.
pub fn save(path: &Path, progress: &Progress) -> Result<(), ProgressError> {
    let json = serde_json::to_string_pretty(progress)?;
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let tmp = temp_sibling(path);
    fs::write(&tmp, json)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    tracing::info!(path = %path.display(), world_unlocked = progress.world_unlocked, "progress saved");
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

// ══════════════════════════════════════════════════════════════
// Paths
// ══════════════════════════════════════════════════════════════

pub fn save_dir() -> PathBuf {
    // 1. Exe directory, if writable (portable installs)
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            let probe = parent.join(".write_test_ninja_scrolls");
            if fs::write(&probe, "").is_ok() {
                let _ = fs::remove_file(&probe);
                return parent.to_path_buf();
            }
        }
    }

    // 2. XDG data home for system installs
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/ninja-scrolls");
        if fs::create_dir_all(&xdg).is_ok() {
            return xdg;
        }
    }

    // 3. CWD
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Resolve the configured save file name; absolute paths are used as-is.
pub fn save_path(file: &str) -> PathBuf {
    let p = PathBuf::from(file);
    if p.is_absolute() { p } else { save_dir().join(p) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ninja-scrolls-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        let _ = fs::remove_file(&path);
        path
    }

    #[test]
    fn missing_file_gives_fresh_progress() {
        let p = load(&scratch("missing.json"));
        assert_eq!(p, Progress::default());
        assert_eq!(p.world_unlocked, 1);
        assert!(p.abilities.has(Ability::DoubleJump));
        assert!(!p.abilities.has(Ability::WallJump));
    }

    #[test]
    fn corrupt_file_gives_fresh_progress() {
        let path = scratch("corrupt.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(load(&path), Progress::default());
    }

    #[test]
    fn legacy_record_with_missing_keys_loads() {
        let path = scratch("legacy.json");
        fs::write(
            &path,
            r#"{"world_unlocked": 4, "scrolls": 3, "coins": 88,
                "abilities": {"double_jump": true, "wall_jump": true, "dash": true}}"#,
        )
        .unwrap();
        let p = load(&path);
        assert_eq!(p.world_unlocked, 4);
        assert_eq!(p.scrolls_cleared, 3);
        assert_eq!(p.cumulative_score, 88);
        assert!(p.abilities.has(Ability::Dash));
        assert!(!p.abilities.has(Ability::Decoy) && !p.abilities.has(Ability::ShadowForm));
    }

    #[test]
    fn out_of_range_world_is_clamped() {
        let path = scratch("clamp.json");
        fs::write(&path, r#"{"world_unlocked": 0}"#).unwrap();
        assert_eq!(load(&path).world_unlocked, 1);
        fs::write(&path, r#"{"world_unlocked": 99}"#).unwrap();
        assert_eq!(load(&path).world_unlocked, WORLD_COUNT);
    }

    #[test]
    fn save_then_load_preserves_record() {
        let path = scratch("roundtrip.json");
        let mut p = Progress::default();
        p.record_world_clear(1, 12);
        p.record_world_clear(2, 30);
        save(&path, &p).unwrap();
        assert!(!temp_sibling(&path).exists());
        assert_eq!(load(&path), p);
    }

    #[test]
    fn save_replaces_previous_record() {
        let path = scratch("replace.json");
        save(&path, &Progress::default()).unwrap();
        let mut p = Progress::default();
        p.record_world_clear(1, 5);
        save(&path, &p).unwrap();
        assert_eq!(load(&path).world_unlocked, 2);
    }

    #[test]
    fn world_clear_unlocks_and_grants_in_order() {
        let mut p = Progress::default();
        assert_eq!(p.record_world_clear(1, 10), Some(Ability::DoubleJump));
        assert_eq!(p.record_world_clear(2, 20), Some(Ability::WallJump));
        assert_eq!(p.world_unlocked, 3);
        assert_eq!(p.scrolls_cleared, 2);
        assert!(p.abilities.has(Ability::WallJump));
        assert_eq!(p.cumulative_score, 20);
    }

    #[test]
    fn world_unlocked_and_abilities_never_regress() {
        let mut p = Progress::default();
        for w in 1..=5 { p.record_world_clear(w, 0); }
        let snapshot = p.clone();

        // Replaying an early world or failing later ones changes nothing monotone.
        p.record_world_clear(2, 0);
        p.record_failed_attempt(3);
        assert_eq!(p.world_unlocked, snapshot.world_unlocked);
        assert_eq!(p.scrolls_cleared, snapshot.scrolls_cleared);
        assert!(snapshot.abilities.is_subset_of(&p.abilities));
    }

    #[test]
    fn last_world_does_not_unlock_past_the_end() {
        let mut p = Progress::default();
        p.world_unlocked = WORLD_COUNT;
        p.record_world_clear(WORLD_COUNT, 0);
        assert_eq!(p.world_unlocked, WORLD_COUNT);
        assert!(p.abilities.has(Ability::ShadowForm));
    }
}
