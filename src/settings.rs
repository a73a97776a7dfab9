use crate::render::{ChordDisplayMode, RenderOptions};
use crate::transforms::transpose::normalize_shift;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// Display preferences persisted between sessions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub compact: bool,
    pub nashville: bool,
    pub chord_display: ChordDisplayMode,
    /// Song id → remembered shift in semitones.
    pub transpositions: BTreeMap<String, i32>,
}

impl Settings {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse settings: {}", path.display()))
    }

    /// Like [`Settings::load`], but a missing or broken file yields defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No settings at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("{:#}, using defaults", e);
                Self::default()
            }
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write settings: {}", path.display()))
    }

    pub fn transposition(&self, song_id: &str) -> i32 {
        self.transpositions.get(song_id).copied().unwrap_or(0)
    }

    pub fn remember_transposition(&mut self, song_id: &str, semitones: i32) {
        let shift = normalize_shift(semitones);
        if shift == 0 {
            self.transpositions.remove(song_id);
        } else {
            self.transpositions.insert(song_id.to_string(), shift);
        }
    }

    pub fn render_options(&self, song_id: Option<&str>) -> RenderOptions {
        RenderOptions {
            compact: self.compact,
            transpose_semitones: song_id.map_or(0, |id| self.transposition(id)),
            nashville: self.nashville,
            chord_display: self.chord_display,
            key: None,
        }
    }
}
