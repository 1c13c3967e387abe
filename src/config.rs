//! Single-key JSON configuration: the global pick shortcut.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_SHORTCUT: &str = "ctrl+shift+p";

/// Shortcuts offered as radio options in the tray menu.
pub const SHORTCUT_PRESETS: [&str; 5] = [
    "ctrl+shift+p",
    "ctrl+alt+c",
    "ctrl+shift+c",
    "alt+shift+c",
    "ctrl+alt+p",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub shortcut: String,
    #[serde(skip)]
    path: PathBuf,
}

impl Config {
    /// Load from `path`. A missing or unparsable file falls back to the
    /// default shortcut and writes the default back.
    pub fn load(path: PathBuf) -> Self {
        let loaded = fs::read_to_string(&path)
            .ok()
            .and_then(|data| serde_json::from_str::<Self>(&data).ok());
        match loaded {
            Some(mut config) => {
                config.path = path;
                config
            }
            None => {
                let config = Self {
                    shortcut: DEFAULT_SHORTCUT.to_string(),
                    path,
                };
                config.save();
                config
            }
        }
    }

    pub fn save(&self) {
        match serde_json::to_string(self) {
            Ok(data) => {
                if let Err(err) = fs::write(&self.path, data) {
                    tracing::warn!("config: write failed: {err}");
                }
            }
            Err(err) => tracing::warn!("config: serialize failed: {err}"),
        }
    }

    /// Index of the current shortcut among the presets, if it is one.
    pub fn preset_index(&self) -> Option<usize> {
        SHORTCUT_PRESETS.iter().position(|p| *p == self.shortcut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scratch() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        (dir, path)
    }

    #[test]
    fn missing_file_defaults_and_writes_back() {
        let (_dir, path) = scratch();
        let config = Config::load(path.clone());
        assert_eq!(config.shortcut, DEFAULT_SHORTCUT);
        assert!(path.exists());
    }

    #[test]
    fn corrupt_file_defaults_and_writes_back() {
        let (_dir, path) = scratch();
        fs::write(&path, "???").unwrap();
        let config = Config::load(path.clone());
        assert_eq!(config.shortcut, DEFAULT_SHORTCUT);
        let rewritten = fs::read_to_string(&path).unwrap();
        assert!(rewritten.contains(DEFAULT_SHORTCUT));
    }

    #[test]
    fn save_and_reload_round_trips() {
        let (_dir, path) = scratch();
        let mut config = Config::load(path.clone());
        config.shortcut = "ctrl+alt+c".to_string();
        config.save();
        assert_eq!(Config::load(path).shortcut, "ctrl+alt+c");
    }

    #[test]
    fn preset_index_matches_table() {
        let (_dir, path) = scratch();
        let mut config = Config::load(path);
        assert_eq!(config.preset_index(), Some(0));
        config.shortcut = "alt+shift+c".to_string();
        assert_eq!(config.preset_index(), Some(3));
        config.shortcut = "ctrl+q".to_string();
        assert_eq!(config.preset_index(), None);
    }
}
