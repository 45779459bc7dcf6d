//! Persisted player progress, stored as a tiny JSON document.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// File name of the saved state inside the data directory.
pub const STATE_FILE: &str = "state.save";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameState {
    #[serde(rename = "highScore")]
    pub high_score: i32,
}

impl GameState {
    /// Parse a saved document. Anything unreadable yields the default state.
    pub fn parse(text: &str) -> Self {
        if text.trim().is_empty() {
            return Self::default();
        }
        serde_json::from_str(text).unwrap_or_else(|e| {
            log::warn!("ignoring malformed game state: {e}");
            Self::default()
        })
    }

    pub fn to_json(&self) -> String {
        // Serializing a struct of integers cannot fail.
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }

    /// Read `state.save` from `dir`. A missing file is a fresh install.
    pub fn load(dir: &Path) -> Self {
        match std::fs::read_to_string(dir.join(STATE_FILE)) {
            Ok(text) => Self::parse(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                log::warn!("cannot read game state: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self, dir: &Path) -> std::io::Result<()> {
        std::fs::create_dir_all(dir)?;
        std::fs::write(dir.join(STATE_FILE), self.to_json())
    }

    /// Keep `score` if it beats the stored high score.
    pub fn record_score(&mut self, score: i32) -> bool {
        if score > self.high_score {
            self.high_score = score;
            true
        } else {
            false
        }
    }
}
