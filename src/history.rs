//! JSON-backed history of saved colors, ordered most-recent last.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::color::Rgb;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub color: String,
    pub rgb: [u8; 3],
    pub timestamp: String,
}

impl HistoryEntry {
    fn now(color: Rgb) -> Self {
        Self {
            color: color.hex(),
            rgb: [color.r, color.g, color.b],
            timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    pub fn rgb(&self) -> Rgb {
        Rgb::new(self.rgb[0], self.rgb[1], self.rgb[2])
    }
}

pub struct History {
    path: PathBuf,
    entries: Vec<HistoryEntry>,
}

impl History {
    /// Load from `path`; a missing or unparsable file yields an empty list.
    pub fn load(path: PathBuf) -> Self {
        let entries = match fs::read_to_string(&path) {
            Ok(data) => serde_json::from_str(&data).unwrap_or_else(|err| {
                tracing::warn!("history: resetting unparsable file: {err}");
                Vec::new()
            }),
            Err(_) => Vec::new(),
        };
        Self { path, entries }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    /// Save `color`, deduplicating on exact hex: an existing entry is removed
    /// and re-appended with a fresh timestamp so it becomes most-recent.
    pub fn append_or_touch(&mut self, color: Rgb) {
        let hex = color.hex();
        self.entries.retain(|entry| entry.color != hex);
        self.entries.push(HistoryEntry::now(color));
        self.save();
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.save();
    }

    fn save(&self) {
        match serde_json::to_string(&self.entries) {
            Ok(data) => {
                if let Err(err) = fs::write(&self.path, data) {
                    tracing::warn!("history: write failed: {err}");
                }
            }
            Err(err) => tracing::warn!("history: serialize failed: {err}"),
        }
    }
}
