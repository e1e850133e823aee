//! Checkpoint resets
//!
//! Dying (or a designer scrubbing the editor) rewinds playback. Every reset
//! retracts the bullets on screen before it returns, so a completion that
//! arrives later refers to an instance the scheduler no longer tracks.

use super::store::Timeline;
use super::tick::PlaybackScheduler;
use crate::error::{Result, TimelineError};
use crate::platform::Collaborators;

/// Seek to `time`, clear the screen and re-arm every event
pub fn reset_to(
    time: f32,
    timeline: &mut Timeline,
    scheduler: &mut PlaybackScheduler,
    collab: &mut Collaborators,
) -> Result<()> {
    let Some(clock) = collab.clock.as_mut() else {
        log::error!("Cannot reset to {}: no playback clock wired", time);
        return Err(TimelineError::MissingCollaborator("clock"));
    };
    clock.set_time(time);
    scheduler.retract_all(collab);
    timeline.reset_fired_flags();
    log::info!("Playback reset to {:.3}s", time);
    Ok(())
}

/// Where a checkpoint reset would land: the latest checkpoint that has
/// fired, or the start of the song
pub fn checkpoint_target(timeline: &Timeline) -> f32 {
    timeline.last_fired_checkpoint().unwrap_or(0.0)
}

/// Rewind to the latest fired checkpoint. Returns the time reset to.
pub fn reset_to_last_checkpoint(
    timeline: &mut Timeline,
    scheduler: &mut PlaybackScheduler,
    collab: &mut Collaborators,
) -> Result<f32> {
    let target = checkpoint_target(timeline);
    reset_to(target, timeline, scheduler, collab)?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{HeadlessSpawner, ManualClock};
    use crate::timeline::path::{BulletKind, Direction, LaneAxis, LanePath, TriggerPath};
    use crate::timeline::store::TimedEvent;

    fn lane() -> TriggerPath {
        TriggerPath::Lane(LanePath::new(
            LaneAxis::Second,
            Direction::Down,
            Direction::Up,
            BulletKind::Boomerang,
        ))
    }

    #[test]
    fn test_reset_without_checkpoint_goes_to_zero() {
        let clock = ManualClock::new(42.0);
        let mut collab = Collaborators::new()
            .with_clock(clock.clone())
            .with_spawner(HeadlessSpawner::default());
        let mut timeline = Timeline::new();
        timeline.insert(TimedEvent::at(TriggerPath::Checkpoint, 50.0));
        let mut scheduler = PlaybackScheduler::default();

        let target = reset_to_last_checkpoint(&mut timeline, &mut scheduler, &mut collab).unwrap();
        assert_eq!(target, 0.0);
        assert_eq!(clock.get(), 0.0);
    }

    #[test]
    fn test_reset_to_latest_fired_checkpoint() {
        let clock = ManualClock::new(0.0);
        let spawner = HeadlessSpawner::new(10.0);
        let mut collab = Collaborators::new()
            .with_clock(clock.clone())
            .with_spawner(spawner.clone());
        let mut timeline = Timeline::new();
        timeline.insert(TimedEvent::at(TriggerPath::Checkpoint, 5.0));
        timeline.insert(TimedEvent::at(TriggerPath::Checkpoint, 12.0));
        timeline.insert(TimedEvent::at(lane(), 12.5));
        timeline.insert(TimedEvent::at(TriggerPath::Checkpoint, 30.0));
        let mut scheduler = PlaybackScheduler::default();

        for t in [5.0, 12.0, 12.5] {
            clock.set(t);
            scheduler.tick(&mut timeline, &mut collab, 0.016).unwrap();
        }
        assert_eq!(spawner.live_count(), 1);

        let target = reset_to_last_checkpoint(&mut timeline, &mut scheduler, &mut collab).unwrap();
        assert_eq!(target, 12.0);
        assert_eq!(clock.get(), 12.0);
        assert_eq!(spawner.live_count(), 0);
        assert_eq!(scheduler.active_count(), 0);
        assert!(timeline.iter_with_state().all(|(_, fired)| !fired));
    }

    #[test]
    fn test_reset_rearms_events() {
        let clock = ManualClock::new(3.0);
        let spawner = HeadlessSpawner::default();
        let mut collab = Collaborators::new()
            .with_clock(clock.clone())
            .with_spawner(spawner.clone());
        let mut timeline = Timeline::new();
        timeline.insert(TimedEvent::at(lane(), 3.0));
        let mut scheduler = PlaybackScheduler::default();

        scheduler.tick(&mut timeline, &mut collab, 0.016).unwrap();
        reset_to(3.0, &mut timeline, &mut scheduler, &mut collab).unwrap();
        scheduler.tick(&mut timeline, &mut collab, 0.016).unwrap();
        assert_eq!(spawner.spawned().len(), 2);
        assert_eq!(spawner.live_count(), 1);
    }

    #[test]
    fn test_reset_needs_clock() {
        let mut collab = Collaborators::new();
        let mut timeline = Timeline::new();
        let mut scheduler = PlaybackScheduler::default();
        assert!(matches!(
            reset_to(1.0, &mut timeline, &mut scheduler, &mut collab),
            Err(TimelineError::MissingCollaborator("clock"))
        ));
    }
}
