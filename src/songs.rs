//! Song catalog and level progress
//!
//! A level document refers to its song by index into this catalog. Each
//! song ships two clips: a "radio" edit used while placing triggers and the
//! official track used when the level is played.

use serde::{Deserialize, Serialize};

use crate::settings::SessionMode;

/// A selectable song
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub name: String,
    /// Clip played in editor mode
    pub radio_clip: String,
    /// Clip played in play mode
    pub official_clip: String,
}

impl Song {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let stem = name.to_lowercase().replace(' ', "_");
        Self {
            radio_clip: format!("{stem}_radio"),
            official_clip: stem,
            name,
        }
    }

    pub fn clip_for(&self, mode: SessionMode) -> &str {
        match mode {
            SessionMode::Editor => &self.radio_clip,
            SessionMode::Play => &self.official_clip,
        }
    }
}

/// Ordered list of songs, indexed by level documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SongCatalog {
    songs: Vec<Song>,
}

impl Default for SongCatalog {
    fn default() -> Self {
        Self::new(vec![Song::new("Battle tutorial")])
    }
}

impl SongCatalog {
    pub fn new(songs: Vec<Song>) -> Self {
        Self { songs }
    }

    /// `count` songs named "Song 1", "Song 2", ...
    pub fn with_placeholder_songs(count: usize) -> Self {
        Self::new((1..=count).map(|i| Song::new(format!("Song {i}"))).collect())
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        index < self.songs.len()
    }

    pub fn get(&self, index: usize) -> Option<&Song> {
        self.songs.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Song> {
        self.songs.iter()
    }

    /// Clip to load for `index` in the given mode
    pub fn clip_for(&self, index: usize, mode: SessionMode) -> Option<&str> {
        self.get(index).map(|song| song.clip_for(mode))
    }
}

/// Whether the current level has been played through since its last edit.
///
/// Only a completed level may be published; any new trigger clears it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelProgress {
    completed: bool,
}

impl LevelProgress {
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn can_publish(&self) -> bool {
        self.completed
    }

    /// Mark complete once playback reaches the end of the song in play mode
    pub fn observe(&mut self, position: f32, duration: f32, mode: SessionMode) {
        if !self.completed && mode == SessionMode::Play && duration > 0.0 && position >= duration {
            log::info!("Level completed at {:.3}s", position);
            self.completed = true;
        }
    }

    /// The timeline changed; it has to be played through again
    pub fn invalidate(&mut self) {
        self.completed = false;
    }
}
