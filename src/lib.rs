//! Spark Timeline - rhythm level timeline engine
//!
//! Core modules:
//! - `timeline`: Timed-event store, playback scheduling, checkpoint resets
//! - `editor`: Turns lane-button presses into timeline events
//! - `persistence`: JSON level documents and level files
//! - `platform`: Host collaborator traits (clock, spawner, effects, health)
//! - `session`: One loaded level, driven by the host each frame
//! - `settings`: Data-driven session configuration

pub mod editor;
pub mod error;
pub mod persistence;
pub mod platform;
pub mod session;
pub mod settings;
pub mod songs;
pub mod timeline;

pub use editor::{ButtonTarget, EditorSession};
pub use error::{Result, TimelineError};
pub use session::LevelSession;
pub use settings::{SessionMode, Settings};
pub use songs::{LevelProgress, Song, SongCatalog};

/// Timeline configuration constants
pub mod consts {
    /// Fixed step for headless replay (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;

    /// Seconds after its trigger time an event may still fire
    pub const TRIGGER_WINDOW: f32 = 1.0;
    /// Seconds lane triggers are recorded ahead of the button press
    pub const LANE_LEAD_SECONDS: u32 = 3;
    /// Tolerance when matching an event for removal (seconds)
    pub const MATCH_TOLERANCE: f32 = 1e-4;

    /// Delay between reaching a checkpoint and its heal landing
    pub const NEW_LIFE_DELAY: f32 = 1.8;
    /// Highest health that still earns a checkpoint heal
    pub const NEW_LIFE_MAX_HEALTH: i32 = 4;
    pub const MAX_HEALTH: i32 = 5;

    /// How long a headless bullet stays on screen
    pub const BULLET_ANIMATION_SECS: f32 = 3.5;
}
