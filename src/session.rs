//! Level session
//!
//! One loaded level: its timeline, the scheduler replaying it, the editor
//! recording into it and the host collaborators. Hosts drive everything
//! through this type.

use std::path::Path;

use crate::editor::{ButtonTarget, EditorSession};
use crate::error::{Result, TimelineError};
use crate::persistence::{self, TimelineDocument};
use crate::platform::{Collaborators, SpawnHandle};
use crate::settings::{SessionMode, Settings};
use crate::songs::LevelProgress;
use crate::timeline::{
    self, BulletKind, PlaybackScheduler, TickReport, TimedEvent, Timeline, TriggerPath,
};

pub struct LevelSession {
    timeline: Timeline,
    scheduler: PlaybackScheduler,
    editor: EditorSession,
    collab: Collaborators,
    settings: Settings,
    song: usize,
    /// Length of the playing clip, once the host knows it
    song_duration: Option<f32>,
    progress: LevelProgress,
    last_export: String,
}

impl LevelSession {
    pub fn new(settings: Settings, collab: Collaborators) -> Self {
        Self {
            timeline: Timeline::new(),
            scheduler: PlaybackScheduler::new(settings.trigger_window, settings.new_life_delay),
            editor: EditorSession::new(settings.lane_lead_seconds),
            collab,
            settings,
            song: 0,
            song_duration: None,
            progress: LevelProgress::default(),
            last_export: String::new(),
        }
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn scheduler(&self) -> &PlaybackScheduler {
        &self.scheduler
    }

    pub fn editor(&self) -> &EditorSession {
        &self.editor
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn mode(&self) -> SessionMode {
        self.settings.mode
    }

    pub fn song(&self) -> usize {
        self.song
    }

    /// Clip the host should play for the selected song in this mode
    pub fn song_clip(&self) -> Option<&str> {
        self.settings.songs.clip_for(self.song, self.settings.mode)
    }

    pub fn set_song_duration(&mut self, duration: f32) {
        self.song_duration = Some(duration);
    }

    pub fn progress(&self) -> LevelProgress {
        self.progress
    }

    /// JSON produced by the most recent export
    pub fn last_export(&self) -> &str {
        &self.last_export
    }

    /// Switch between editing and playing. Playback restarts from the top
    /// and the host should load the returned clip.
    pub fn set_mode(&mut self, mode: SessionMode) -> Result<Option<&str>> {
        self.reset_to(0.0)?;
        log::info!("Switching to {} mode", mode.as_str());
        self.settings.mode = mode;
        self.song_duration = None;
        Ok(self.song_clip())
    }

    // === Editing ===

    /// Editing calls are ignored outside editor mode
    fn editing_allowed(&self, action: &str) -> bool {
        if !self.settings.mode.is_editor() {
            log::warn!("Ignoring {action} in {} mode", self.settings.mode.as_str());
            return false;
        }
        true
    }

    pub fn set_active_kind(&mut self, kind: BulletKind) {
        self.editor.set_active_kind(kind);
    }

    /// Pick the song this level plays. Unknown indices are ignored.
    pub fn select_song(&mut self, index: usize) -> Option<&str> {
        if !self.settings.songs.contains(index) {
            log::warn!("No song at index {index}, keeping song {}", self.song);
            return None;
        }
        self.song = index;
        self.song_duration = None;
        self.song_clip()
    }

    /// Record `path` pressed at `raw_time`, then refresh the export.
    /// Returns `None` when not editing.
    pub fn record_event(&mut self, path: TriggerPath, raw_time: f32) -> Result<Option<TimedEvent>> {
        if !self.editing_allowed("recording") {
            return Ok(None);
        }
        let event = self.editor.record_event(&mut self.timeline, path, raw_time);
        self.progress.invalidate();
        self.export_document()?;
        Ok(Some(event))
    }

    /// Record a press of an editor button at the current clock position
    pub fn press(&mut self, target: ButtonTarget) -> Result<Option<TimedEvent>> {
        if !self.editing_allowed("button press") {
            return Ok(None);
        }
        let now = self.current_time()?;
        let path = target.resolve(self.editor.active_kind());
        self.record_event(path, now)
    }

    /// Delete the most recent event matching `path` at `trigger_time`.
    /// Returns whether anything was removed.
    pub fn remove_event(&mut self, path: &TriggerPath, trigger_time: f32) -> Result<bool> {
        let removed = self
            .timeline
            .remove_matching(path, trigger_time, self.settings.match_tolerance);
        if removed {
            self.export_document()?;
        }
        Ok(removed)
    }

    /// Delete the event behind a bullet that is on screen (the designer
    /// clicked it) and take the bullet away. Clicks during play do nothing.
    pub fn remove_spawned(&mut self, handle: SpawnHandle) -> Result<bool> {
        if !self.editing_allowed("bullet removal") {
            return Ok(false);
        }
        let Some(bullet) = self.scheduler.retract(handle, &mut self.collab) else {
            log::warn!("Bullet {:?} is no longer active", handle);
            return Ok(false);
        };
        self.remove_event(&TriggerPath::Lane(bullet.lane), bullet.trigger_time)
    }

    // === Persistence ===

    /// Serialize the timeline and remember the result
    pub fn export_document(&mut self) -> Result<&str> {
        let document = TimelineDocument::export(&self.timeline, self.song);
        self.last_export = document.to_json(self.settings.pretty_export)?;
        Ok(&self.last_export)
    }

    /// Replace the level with a serialized one. On any error the current
    /// level is left untouched.
    pub fn import_document(&mut self, json: &str) -> Result<()> {
        let level = persistence::import_json(json, &self.settings.songs)?;
        self.scheduler.retract_all(&mut self.collab);
        self.scheduler.cancel_heals();
        log::info!("Imported {} triggers for song {}", level.events.len(), level.song);
        self.timeline.replace_all(level.events);
        self.song = level.song;
        self.song_duration = None;
        self.progress.invalidate();
        self.last_export = json.to_string();
        Ok(())
    }

    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let json = persistence::read_level_file(path)?;
        self.import_document(&json)
    }

    /// Write the level once it has been played through. Returns `false`
    /// without touching the file otherwise.
    pub fn publish(&mut self, path: impl AsRef<Path>) -> Result<bool> {
        if !self.progress.can_publish() {
            log::warn!("Level must be completed once before it can be saved");
            return Ok(false);
        }
        self.export_document()?;
        persistence::write_level_file(path, &self.last_export)?;
        Ok(true)
    }

    // === Playback ===

    pub fn current_time(&self) -> Result<f32> {
        self.collab
            .clock
            .as_ref()
            .map(|clock| clock.current_time())
            .ok_or(TimelineError::MissingCollaborator("clock"))
    }

    /// Advance playback by one frame
    pub fn tick(&mut self, dt: f32) -> Result<TickReport> {
        let report = self.scheduler.tick(&mut self.timeline, &mut self.collab, dt)?;
        if let Some(duration) = self.song_duration {
            self.progress.observe(report.time, duration, self.settings.mode);
        }
        Ok(report)
    }

    pub fn reset_to(&mut self, time: f32) -> Result<()> {
        timeline::reset_to(time, &mut self.timeline, &mut self.scheduler, &mut self.collab)
    }

    /// Rewind after a death. Returns the time playback resumed at.
    pub fn reset_to_last_checkpoint(&mut self) -> Result<f32> {
        timeline::reset_to_last_checkpoint(&mut self.timeline, &mut self.scheduler, &mut self.collab)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{HeadlessHealth, HeadlessSpawner, ManualClock, RecordingEffects};
    use crate::songs::SongCatalog;
    use crate::timeline::{Direction, Lane, LaneAxis};

    struct Rig {
        clock: ManualClock,
        spawner: HeadlessSpawner,
        effects: RecordingEffects,
        health: HeadlessHealth,
        session: LevelSession,
    }

    fn rig(mode: SessionMode) -> Rig {
        let clock = ManualClock::new(0.0);
        let spawner = HeadlessSpawner::new(2.0);
        let effects = RecordingEffects::new();
        let health = HeadlessHealth::new(2);
        let collab = Collaborators::new()
            .with_clock(clock.clone())
            .with_spawner(spawner.clone())
            .with_effects(effects.clone())
            .with_health(health.clone());
        let mut settings = Settings::for_mode(mode);
        settings.songs = SongCatalog::with_placeholder_songs(3);
        settings.pretty_export = false;
        Rig {
            clock,
            spawner,
            effects,
            health,
            session: LevelSession::new(settings, collab),
        }
    }

    fn top_lane() -> Lane {
        Lane::new(LaneAxis::Top, Direction::Left, Direction::Right)
    }

    #[test]
    fn test_recorded_lane_plays_back_once() {
        let mut rig = rig(SessionMode::Editor);
        rig.clock.set(10.0);
        let event = rig.session.press(ButtonTarget::Lane(top_lane())).unwrap().unwrap();
        assert_eq!(event.trigger_time, 7.0);
        assert!(rig.session.last_export().contains("00:07:000"));

        rig.clock.set(7.0);
        assert_eq!(rig.session.tick(0.016).unwrap().spawned.len(), 1);
        assert!(rig.session.tick(0.016).unwrap().spawned.is_empty());
        assert_eq!(rig.spawner.spawned().len(), 1);
    }

    #[test]
    fn test_export_reads_stored_kind() {
        let mut rig = rig(SessionMode::Editor);
        rig.session.set_active_kind(BulletKind::Arrow);
        rig.clock.set(10.0);
        rig.session.press(ButtonTarget::Lane(top_lane())).unwrap();
        rig.session.set_active_kind(BulletKind::Boomerang);

        let json = rig.session.export_document().unwrap().to_string();
        assert!(json.contains(r#""type":"arrow""#), "{json}");
    }

    #[test]
    fn test_import_replaces_timeline() {
        let mut rig = rig(SessionMode::Editor);
        rig.session.record_event(TriggerPath::Checkpoint, 1.0).unwrap();
        rig.session.set_mode(SessionMode::Play).unwrap();
        let json = r#"{"song":2,"triggers":[{"type":"beat","triggerTimeString":"00:01:500"}]}"#;
        rig.session.import_document(json).unwrap();

        assert_eq!(rig.session.song(), 2);
        assert_eq!(rig.session.timeline().len(), 1);
        assert_eq!(rig.session.timeline().events()[0].path, TriggerPath::Beat);
        assert_eq!(rig.session.song_clip(), Some("song_3"));
    }

    #[test]
    fn test_failed_import_keeps_level() {
        let mut rig = rig(SessionMode::Editor);
        rig.session.record_event(TriggerPath::Beat, 4.0).unwrap();
        let bad = r#"{"song":0,"triggers":[{"type":"beat","triggerTimeString":"oops"}]}"#;
        assert!(rig.session.import_document(bad).is_err());
        assert_eq!(rig.session.timeline().len(), 1);
        let unknown_song = r#"{"song":9,"triggers":[]}"#;
        assert!(rig.session.import_document(unknown_song).is_err());
        assert_eq!(rig.session.song(), 0);
    }

    #[test]
    fn test_remove_event_most_recent_duplicate() {
        let mut rig = rig(SessionMode::Editor);
        rig.session.record_event(TriggerPath::Beat, 3.0).unwrap();
        rig.session.record_event(TriggerPath::Checkpoint, 3.0).unwrap();
        rig.session.record_event(TriggerPath::Beat, 3.0).unwrap();

        assert!(rig.session.remove_event(&TriggerPath::Beat, 3.0).unwrap());
        let paths: Vec<_> = rig.session.timeline().iter().map(|e| e.path).collect();
        assert_eq!(paths, vec![TriggerPath::Beat, TriggerPath::Checkpoint]);
        assert!(!rig.session.remove_event(&TriggerPath::Beat, 9.0).unwrap());
    }

    #[test]
    fn test_remove_spawned_bullet() {
        let mut rig = rig(SessionMode::Editor);
        let lane = top_lane().with_kind(BulletKind::Bullet);
        rig.session.record_event(TriggerPath::Lane(lane), 8.0).unwrap();
        rig.clock.set(5.0);
        let handle = rig.session.tick(0.016).unwrap().spawned[0];

        assert!(rig.session.remove_spawned(handle).unwrap());
        assert!(rig.session.timeline().is_empty());
        assert_eq!(rig.spawner.live_count(), 0);
        assert!(!rig.session.remove_spawned(handle).unwrap());
    }

    #[test]
    fn test_death_rewinds_to_checkpoint() {
        let mut rig = rig(SessionMode::Editor);
        rig.session.record_event(TriggerPath::Checkpoint, 4.0).unwrap();
        rig.session.record_event(TriggerPath::Beat, 6.0).unwrap();
        rig.session.set_mode(SessionMode::Play).unwrap();

        rig.clock.set(4.0);
        rig.session.tick(0.016).unwrap();
        rig.clock.set(6.0);
        rig.session.tick(0.016).unwrap();
        assert_eq!(rig.effects.checkpoints(), vec![Some(3)]);

        assert_eq!(rig.session.reset_to_last_checkpoint().unwrap(), 4.0);
        assert_eq!(rig.clock.get(), 4.0);
        rig.session.tick(0.016).unwrap();
        assert_eq!(rig.effects.checkpoints().len(), 2);
    }

    #[test]
    fn test_publish_requires_completion() {
        let mut rig = rig(SessionMode::Editor);
        let path = std::env::temp_dir().join(format!("spark-publish-{}.json", std::process::id()));
        rig.session.record_event(TriggerPath::Beat, 1.0).unwrap();
        rig.session.set_mode(SessionMode::Play).unwrap();
        assert!(!rig.session.publish(&path).unwrap());

        rig.session.set_song_duration(30.0);
        rig.clock.set(30.0);
        rig.session.tick(0.016).unwrap();
        assert!(rig.session.progress().can_publish());
        assert!(rig.session.publish(&path).unwrap());

        let mut other = LevelSession::new(Settings::default(), Collaborators::new());
        other.load(&path).unwrap();
        assert_eq!(other.timeline().len(), 1);
        std::fs::remove_file(&path).unwrap();

        rig.session.set_mode(SessionMode::Editor).unwrap();
        assert!(rig.session.progress().can_publish());
        rig.session.record_event(TriggerPath::Beat, 2.0).unwrap();
        assert!(!rig.session.progress().can_publish());
    }

    #[test]
    fn test_select_song() {
        let mut rig = rig(SessionMode::Editor);
        assert_eq!(rig.session.select_song(1), Some("song_2_radio"));
        assert_eq!(rig.session.select_song(7), None);
        assert_eq!(rig.session.song(), 1);
        let json = rig.session.export_document().unwrap();
        assert!(json.starts_with(r#"{"song":1"#));
    }

    #[test]
    fn test_tick_without_clock_is_reported() {
        let mut session =
            LevelSession::new(Settings::for_mode(SessionMode::Editor), Collaborators::new());
        assert!(matches!(
            session.tick(0.016),
            Err(TimelineError::MissingCollaborator("clock"))
        ));
        assert!(session.press(ButtonTarget::Sentinel(TriggerPath::Beat)).is_err());
        assert!(session.set_mode(SessionMode::Play).is_err());
        assert_eq!(session.mode(), SessionMode::Editor);
    }

    #[test]
    fn test_play_mode_ignores_editing() {
        let mut rig = rig(SessionMode::Editor);
        let lane = top_lane().with_kind(BulletKind::Bullet);
        rig.session.record_event(TriggerPath::Lane(lane), 8.0).unwrap();
        rig.session.set_mode(SessionMode::Play).unwrap();
        let export = rig.session.last_export().to_string();

        rig.clock.set(5.0);
        let handle = rig.session.tick(0.016).unwrap().spawned[0];
        assert!(!rig.session.remove_spawned(handle).unwrap());
        assert_eq!(rig.session.timeline().len(), 1);
        assert_eq!(rig.spawner.live_count(), 1);

        assert_eq!(rig.session.record_event(TriggerPath::Beat, 6.0).unwrap(), None);
        assert_eq!(rig.session.press(ButtonTarget::Lane(top_lane())).unwrap(), None);
        assert_eq!(rig.session.timeline().len(), 1);
        assert_eq!(rig.session.last_export(), export);
    }

    #[test]
    fn test_set_mode_swaps_clip_and_restarts() {
        let mut rig = rig(SessionMode::Editor);
        rig.session.select_song(1);
        rig.session.record_event(TriggerPath::Beat, 3.0).unwrap();
        rig.clock.set(3.0);
        rig.session.tick(0.016).unwrap();
        assert!(rig.session.timeline().is_fired(0));

        assert_eq!(rig.session.set_mode(SessionMode::Play).unwrap(), Some("song_2"));
        assert_eq!(rig.session.mode(), SessionMode::Play);
        assert_eq!(rig.clock.get(), 0.0);
        assert!(!rig.session.timeline().is_fired(0));

        assert_eq!(
            rig.session.set_mode(SessionMode::Editor).unwrap(),
            Some("song_2_radio")
        );
    }

    #[test]
    fn test_import_drops_pending_heal() {
        let mut rig = rig(SessionMode::Editor);
        rig.session.record_event(TriggerPath::Checkpoint, 2.0).unwrap();
        rig.session.set_mode(SessionMode::Play).unwrap();
        rig.clock.set(2.0);
        rig.session.tick(0.016).unwrap();
        assert_eq!(rig.session.scheduler().pending_heals(), 1);

        let json = r#"{"song":0,"triggers":[{"type":"beat","triggerTimeString":"00:30:000"}]}"#;
        rig.session.import_document(json).unwrap();
        let report = rig.session.tick(5.0).unwrap();
        assert_eq!(report.healed, 0);
        assert_eq!(rig.health.get(), 2);
    }
}
