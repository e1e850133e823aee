//! Session settings
//!
//! Persisted as JSON next to the level files.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Result, TimelineError};
use crate::songs::SongCatalog;

/// Whether the session places triggers or plays them back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SessionMode {
    /// Designer places triggers against the radio edit
    Editor,
    /// Level plays against the official track
    #[default]
    Play,
}

impl SessionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionMode::Editor => "Editor",
            SessionMode::Play => "Play",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "editor" | "edit" => Some(SessionMode::Editor),
            "play" | "official" => Some(SessionMode::Play),
            _ => None,
        }
    }

    pub fn is_editor(&self) -> bool {
        *self == SessionMode::Editor
    }
}

/// Timeline session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Editor or play mode
    pub mode: SessionMode,

    // === Playback ===
    /// Seconds after its trigger time an event may still fire
    pub trigger_window: f32,
    /// Delay between a checkpoint and its new-life heal (seconds)
    pub new_life_delay: f32,

    // === Editing ===
    /// Seconds lane triggers are placed ahead of the button press
    pub lane_lead_seconds: u32,
    /// Tolerance when matching an event for removal (seconds)
    pub match_tolerance: f32,
    /// Pretty-print exported level files
    pub pretty_export: bool,

    /// Songs level documents may refer to
    pub songs: SongCatalog,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: SessionMode::Play,

            trigger_window: TRIGGER_WINDOW,
            new_life_delay: NEW_LIFE_DELAY,

            lane_lead_seconds: LANE_LEAD_SECONDS,
            match_tolerance: MATCH_TOLERANCE,
            pretty_export: true,

            songs: SongCatalog::default(),
        }
    }
}

impl Settings {
    /// Default settings for the given mode
    pub fn for_mode(mode: SessionMode) -> Self {
        let mut settings = Self::default();
        settings.mode = mode;
        settings
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(err) => {
                log::warn!("{err}; using default settings");
                Self::default()
            }
        }
    }

    /// Load settings from a JSON file
    pub fn try_load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| TimelineError::io(path.display().to_string(), e))?;
        let settings: Settings = serde_json::from_str(&json)?;
        Ok(settings.sanitized())
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| TimelineError::io(path.display().to_string(), e))?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Clamp values the timeline can't work with
    fn sanitized(mut self) -> Self {
        // The time-code borrow only handles one minute
        if self.lane_lead_seconds > 59 {
            log::warn!("lane_lead_seconds {} too large, clamping to 59", self.lane_lead_seconds);
            self.lane_lead_seconds = 59;
        }
        if self.trigger_window <= 0.0 {
            self.trigger_window = TRIGGER_WINDOW;
        }
        self.match_tolerance = self.match_tolerance.max(0.0);
        self.new_life_delay = self.new_life_delay.max(0.0);
        self
    }
}
