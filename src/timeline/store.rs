//! Timed events and the mutable timeline that holds them
//!
//! Events are immutable once inserted. Whether an event has fired lives in
//! a separate flag vector indexed in lockstep with the events, so resetting
//! playback never has to rebuild or copy events back into the list.

use super::path::TriggerPath;
use super::time_code::TimeCode;
use crate::consts::MATCH_TOLERANCE;

/// A single scheduled trigger
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedEvent {
    /// What fires
    pub path: TriggerPath,
    /// Time code as written to level files
    pub time_code: TimeCode,
    /// Playback position the event fires at (seconds)
    pub trigger_time: f32,
}

impl TimedEvent {
    /// Build an event whose float time is derived from its time code
    pub fn from_time_code(path: TriggerPath, time_code: TimeCode) -> Self {
        Self {
            path,
            time_code,
            trigger_time: time_code.to_seconds(),
        }
    }

    /// Build an event whose time code is derived from its float time
    pub fn at(path: TriggerPath, trigger_time: f32) -> Self {
        Self {
            path,
            time_code: TimeCode::from_seconds(trigger_time),
            trigger_time,
        }
    }

    /// Identity check used for removal: same path, time within `tolerance`
    pub fn matches(&self, path: &TriggerPath, trigger_time: f32, tolerance: f32) -> bool {
        self.path == *path && (self.trigger_time - trigger_time).abs() <= tolerance
    }

    /// Whether `now` falls in `[trigger_time, trigger_time + window)`
    pub fn is_due(&self, now: f32, window: f32) -> bool {
        now >= self.trigger_time && now < self.trigger_time + window
    }
}

/// Ordered multiset of timed events with per-event fired flags
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    events: Vec<TimedEvent>,
    fired: Vec<bool>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_events(events: Vec<TimedEvent>) -> Self {
        let fired = vec![false; events.len()];
        Self { events, fired }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events in insertion order
    pub fn events(&self) -> &[TimedEvent] {
        &self.events
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimedEvent> {
        self.events.iter()
    }

    /// Events paired with their fired flag
    pub fn iter_with_state(&self) -> impl Iterator<Item = (&TimedEvent, bool)> {
        self.events.iter().zip(self.fired.iter().copied())
    }

    pub fn is_fired(&self, index: usize) -> bool {
        self.fired.get(index).copied().unwrap_or(false)
    }

    /// Append an event (unfired). Duplicates are allowed.
    pub fn insert(&mut self, event: TimedEvent) {
        self.events.push(event);
        self.fired.push(false);
    }

    /// Remove the last event matching `path` at `trigger_time`.
    ///
    /// Returns `false` (and logs) when nothing matched.
    pub fn remove_matching(&mut self, path: &TriggerPath, trigger_time: f32, tolerance: f32) -> bool {
        match self
            .events
            .iter()
            .rposition(|e| e.matches(path, trigger_time, tolerance))
        {
            Some(index) => {
                self.events.remove(index);
                self.fired.remove(index);
                true
            }
            None => {
                log::warn!("Bullet trigger not found: {} at time: {}", path, trigger_time);
                false
            }
        }
    }

    /// [`Timeline::remove_matching`] with the default tolerance
    pub fn remove(&mut self, path: &TriggerPath, trigger_time: f32) -> bool {
        self.remove_matching(path, trigger_time, MATCH_TOLERANCE)
    }

    /// Mark every event as not yet fired
    pub fn reset_fired_flags(&mut self) {
        self.fired.iter_mut().for_each(|f| *f = false);
    }

    /// Unfired events whose trigger window contains `now`
    pub fn due_events(&self, now: f32, window: f32) -> impl Iterator<Item = &TimedEvent> {
        self.iter_with_state()
            .filter(move |(event, fired)| !fired && event.is_due(now, window))
            .map(|(event, _)| event)
    }

    /// Collect the due events and mark them fired in one pass
    pub fn fire_due(&mut self, now: f32, window: f32) -> Vec<TimedEvent> {
        let mut due = Vec::new();
        for (event, fired) in self.events.iter().zip(self.fired.iter_mut()) {
            if !*fired && event.is_due(now, window) {
                *fired = true;
                due.push(*event);
            }
        }
        due
    }

    /// Latest trigger time among checkpoints that have already fired
    pub fn last_fired_checkpoint(&self) -> Option<f32> {
        self.iter_with_state()
            .filter(|(event, fired)| *fired && event.path == TriggerPath::Checkpoint)
            .map(|(event, _)| event.trigger_time)
            .reduce(f32::max)
    }

    /// Swap in a new set of events, all unfired
    pub fn replace_all(&mut self, events: Vec<TimedEvent>) {
        *self = Self::from_events(events);
    }
}
