//! Stage unlock/clear progress
//!
//! Persisted as JSON under `~/.digitworld/progress.json`. A missing or
//! unreadable file means a fresh start; save failures are logged and the
//! in-memory state stays authoritative.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::consts::{LAST_REGULAR_WORLD, STAGES_PER_WORLD};

/// Persistence collaborator used by the game loop
pub trait StageProgress {
    fn is_stage_unlocked(&self, world: u32, stage: u32) -> bool;
    fn is_stage_cleared(&self, world: u32, stage: u32) -> bool;
    fn unlock_stage(&mut self, world: u32, stage: u32);
    /// Mark cleared; the first clear also unlocks the next stage
    fn clear_stage(&mut self, world: u32, stage: u32);
}

/// On-disk layout: world number (as a string key) to sorted stage numbers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressData {
    #[serde(default)]
    pub unlocked_stages: BTreeMap<String, Vec<u32>>,
    #[serde(default)]
    pub cleared_stages: BTreeMap<String, Vec<u32>>,
}

impl Default for ProgressData {
    fn default() -> Self {
        Self {
            unlocked_stages: BTreeMap::from([("1".to_string(), vec![1])]),
            cleared_stages: BTreeMap::new(),
        }
    }
}

/// Insert `stage` into the world's sorted list; false if already present
fn insert_sorted(map: &mut BTreeMap<String, Vec<u32>>, world: u32, stage: u32) -> bool {
    let stages = map.entry(world.to_string()).or_default();
    match stages.binary_search(&stage) {
        Ok(_) => false,
        Err(pos) => {
            stages.insert(pos, stage);
            true
        }
    }
}

fn contains(map: &BTreeMap<String, Vec<u32>>, world: u32, stage: u32) -> bool {
    map.get(&world.to_string())
        .is_some_and(|stages| stages.contains(&stage))
}

#[derive(Debug, Clone)]
pub struct Progress {
    data: ProgressData,
    path: Option<PathBuf>,
}

impl Progress {
    /// Progress that is never written to disk
    pub fn in_memory() -> Self {
        Self {
            data: ProgressData::default(),
            path: None,
        }
    }

    /// `~/.digitworld/progress.json`, if a home directory is known
    pub fn default_path() -> Option<PathBuf> {
        let home = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE"))?;
        Some(PathBuf::from(home).join(".digitworld").join("progress.json"))
    }

    /// Load from `path`, starting fresh (and writing the defaults) when the
    /// file is missing or corrupt
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match Self::read(&path) {
            Ok(data) => {
                log::info!("Loaded progress from {}", path.display());
                Self {
                    data,
                    path: Some(path),
                }
            }
            Err(e) => {
                log::info!("No usable progress, starting fresh ({e:#})");
                let progress = Self {
                    data: ProgressData::default(),
                    path: Some(path),
                };
                progress.save();
                progress
            }
        }
    }

    fn read(path: &Path) -> Result<ProgressData> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading progress {}", path.display()))?;
        serde_json::from_str(&json).with_context(|| format!("parsing progress {}", path.display()))
    }

    fn write(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(&self.data)?;
        std::fs::write(path, json).with_context(|| format!("writing progress {}", path.display()))
    }

    /// Write to disk if backed by a file; errors are logged, not returned
    pub fn save(&self) {
        let Some(path) = &self.path else { return };
        if let Err(e) = self.write(path) {
            log::warn!("Failed to save progress: {e:#}");
        }
    }

    pub fn data(&self) -> &ProgressData {
        &self.data
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Stage that the first clear of (world, stage) opens up, if any
    pub fn next_stage(world: u32, stage: u32) -> Option<(u32, u32)> {
        if stage < STAGES_PER_WORLD {
            Some((world, stage + 1))
        } else if stage == STAGES_PER_WORLD && world <= LAST_REGULAR_WORLD {
            Some((world + 1, 1))
        } else {
            None
        }
    }
}

impl StageProgress for Progress {
    fn is_stage_unlocked(&self, world: u32, stage: u32) -> bool {
        contains(&self.data.unlocked_stages, world, stage)
    }

    fn is_stage_cleared(&self, world: u32, stage: u32) -> bool {
        contains(&self.data.cleared_stages, world, stage)
    }

    fn unlock_stage(&mut self, world: u32, stage: u32) {
        if insert_sorted(&mut self.data.unlocked_stages, world, stage) {
            log::info!("Unlocked stage {world}-{stage}");
            self.save();
        }
    }

    fn clear_stage(&mut self, world: u32, stage: u32) {
        if !insert_sorted(&mut self.data.cleared_stages, world, stage) {
            return;
        }
        log::info!("Cleared stage {world}-{stage}");
        if let Some((w, s)) = Self::next_stage(world, stage) {
            self.unlock_stage(w, s);
        }
        self.save();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("digit-world-test-{}-{name}", std::process::id()))
            .join("progress.json")
    }

    #[test]
    fn test_default_unlocks_first_stage_only() {
        let p = Progress::in_memory();
        assert!(p.is_stage_unlocked(1, 1));
        assert!(!p.is_stage_unlocked(1, 2));
        assert!(!p.is_stage_cleared(1, 1));
    }

    #[test]
    fn test_clear_cascades() {
        let mut p = Progress::in_memory();
        p.clear_stage(1, 1);
        assert!(p.is_stage_cleared(1, 1));
        assert!(p.is_stage_unlocked(1, 2));

        p.clear_stage(1, 3);
        assert!(p.is_stage_unlocked(2, 1));

        p.clear_stage(4, 3);
        assert!(p.is_stage_unlocked(5, 1));

        // The bonus world still chains within itself but opens no world 6
        p.clear_stage(5, 1);
        assert!(p.is_stage_unlocked(5, 2));
        p.clear_stage(5, 3);
        assert!(!p.is_stage_unlocked(6, 1));
    }

    #[test]
    fn test_lists_stay_sorted_and_unique() {
        let mut p = Progress::in_memory();
        p.unlock_stage(2, 3);
        p.unlock_stage(2, 1);
        p.unlock_stage(2, 3);
        assert_eq!(p.data().unlocked_stages.get("2"), Some(&vec![1, 3]));
    }

    #[test]
    fn test_persists_round_trip() {
        let path = temp_path("roundtrip");
        let _ = std::fs::remove_file(&path);
        {
            let mut p = Progress::open(&path);
            p.clear_stage(1, 1);
        }
        let p = Progress::open(&path);
        assert!(p.is_stage_cleared(1, 1));
        assert!(p.is_stage_unlocked(1, 2));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_corrupt_file_starts_fresh() {
        let path = temp_path("corrupt");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ nope").unwrap();
        let p = Progress::open(&path);
        assert_eq!(p.data(), &ProgressData::default());
        // Defaults were written back
        let reread = Progress::open(&path);
        assert_eq!(reread.data(), &ProgressData::default());
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
