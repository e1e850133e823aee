//! Level editor input
//!
//! The designer listens to the radio edit and presses a lane button when a
//! bullet should fly. Lane bullets need time to travel on screen, so lane
//! presses are recorded a few seconds earlier than the press itself.
//! Checkpoints and beats land exactly where they were pressed.

use crate::consts::LANE_LEAD_SECONDS;
use crate::timeline::path::capitalize;
use crate::timeline::{BulletKind, Lane, TimeCode, TimedEvent, Timeline, TriggerPath};

/// What a button in the editor panel records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonTarget {
    /// A lane; the bullet kind is taken from the session at press time
    Lane(Lane),
    /// Checkpoint or beat
    Sentinel(TriggerPath),
}

impl ButtonTarget {
    /// Full trigger path for a press with `kind` selected
    pub fn resolve(&self, kind: BulletKind) -> TriggerPath {
        match *self {
            ButtonTarget::Lane(lane) => TriggerPath::Lane(lane.with_kind(kind)),
            ButtonTarget::Sentinel(path) => path,
        }
    }

    /// Button caption, e.g. `Top left → right`
    pub fn label(&self) -> String {
        match self {
            ButtonTarget::Lane(lane) => format!(
                "{} {} → {}",
                capitalize(lane.axis.as_str()),
                lane.from.as_str(),
                lane.to.as_str()
            ),
            ButtonTarget::Sentinel(path) => capitalize(&path.to_string()),
        }
    }
}

/// Every button on the editor panel: checkpoint, beat, then the 12 lanes
pub fn button_catalog() -> Vec<ButtonTarget> {
    [TriggerPath::Checkpoint, TriggerPath::Beat]
        .into_iter()
        .map(ButtonTarget::Sentinel)
        .chain(Lane::all().into_iter().map(ButtonTarget::Lane))
        .collect()
}

/// Editor-side state that outlives a single press
#[derive(Debug, Clone)]
pub struct EditorSession {
    active_kind: BulletKind,
    lane_lead: u32,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(LANE_LEAD_SECONDS)
    }
}

impl EditorSession {
    pub fn new(lane_lead: u32) -> Self {
        Self {
            active_kind: BulletKind::default(),
            lane_lead,
        }
    }

    pub fn active_kind(&self) -> BulletKind {
        self.active_kind
    }

    pub fn set_active_kind(&mut self, kind: BulletKind) {
        log::debug!("Active bullet kind: {}", kind.as_str());
        self.active_kind = kind;
    }

    pub fn lane_lead(&self) -> u32 {
        self.lane_lead
    }

    /// Seconds subtracted from a press on `path`
    pub fn offset_for(&self, path: &TriggerPath) -> u32 {
        if path.is_sentinel() { 0 } else { self.lane_lead }
    }

    /// Record a press of `target` at playback position `raw_time`
    pub fn press(&self, timeline: &mut Timeline, target: ButtonTarget, raw_time: f32) -> TimedEvent {
        self.record_event(timeline, target.resolve(self.active_kind), raw_time)
    }

    /// Insert an event for `path` pressed at `raw_time`.
    ///
    /// The stored string borrows at most one minute when the offset crosses
    /// a minute boundary; the stored float is the plain difference and can
    /// be negative for presses in the first few seconds.
    pub fn record_event(&self, timeline: &mut Timeline, path: TriggerPath, raw_time: f32) -> TimedEvent {
        let offset = self.offset_for(&path);
        let event = TimedEvent {
            path,
            time_code: TimeCode::from_seconds(raw_time.max(0.0)).borrow_seconds(offset),
            trigger_time: raw_time - offset as f32,
        };
        log::info!("Recorded {} at {} ({:.3}s)", event.path, event.time_code, event.trigger_time);
        timeline.insert(event);
        event
    }
}
