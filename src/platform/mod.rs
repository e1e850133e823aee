//! Platform abstraction layer
//!
//! The timeline core never renders, plays audio or instantiates anything
//! itself. It talks to the host engine through these traits:
//! - Time: the audio clock is the source of truth for playback position
//! - Spawning: lane bullets and their animation-complete signal
//! - Effects: checkpoint and beat feedback
//! - Health: consulted by the checkpoint reward

pub mod headless;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::timeline::path::LanePath;

pub use headless::{HeadlessHealth, HeadlessSpawner, ManualClock, RecordingEffects};

/// Playback clock (usually the music's audio source)
pub trait Clock {
    /// Current playback position in seconds
    fn current_time(&self) -> f32;
    /// Seek playback to `time` seconds
    fn set_time(&mut self, time: f32);
}

/// Identifier of one spawned lane bullet instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpawnHandle(pub u64);

/// Everything a spawner needs to place a lane bullet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRequest {
    pub lane: LanePath,
    /// Trigger time of the event that spawned it, used to match the
    /// instance back to its timeline entry
    pub trigger_time: f32,
}

/// Creates and destroys lane bullet instances
pub trait Spawner {
    /// Instantiate a bullet. The spawner fires `on_complete` once the
    /// bullet's attack animation has finished.
    fn spawn(&mut self, handle: SpawnHandle, request: SpawnRequest, on_complete: CompletionSignal);
    /// Tear down an instance (completed, retracted by a reset, or removed)
    fn destroy(&mut self, handle: SpawnHandle);
}

/// Visual/audio feedback for sentinel events
pub trait Effects {
    /// A checkpoint was reached. `new_life` is the heart index whose
    /// animation should play, if the player is being rewarded.
    fn on_checkpoint_reached(&mut self, new_life: Option<u8>);
    /// A beat marker fired
    fn on_beat(&mut self);
}

/// Player health as seen by the checkpoint reward
pub trait Health {
    fn current_health(&self) -> i32;
    fn heal(&mut self, amount: i32);
}

/// Host-side collaborators wired into a session. Any of them may be
/// missing; the scheduler reports and skips work that needs one.
#[derive(Default)]
pub struct Collaborators {
    pub clock: Option<Box<dyn Clock>>,
    pub spawner: Option<Box<dyn Spawner>>,
    pub effects: Option<Box<dyn Effects>>,
    pub health: Option<Box<dyn Health>>,
}

impl Collaborators {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    pub fn with_spawner(mut self, spawner: impl Spawner + 'static) -> Self {
        self.spawner = Some(Box::new(spawner));
        self
    }

    pub fn with_effects(mut self, effects: impl Effects + 'static) -> Self {
        self.effects = Some(Box::new(effects));
        self
    }

    pub fn with_health(mut self, health: impl Health + 'static) -> Self {
        self.health = Some(Box::new(health));
        self
    }
}

/// Shared queue the scheduler drains at the start of every tick
pub(crate) type CompletionQueue = Rc<RefCell<Vec<SpawnHandle>>>;

/// One-shot "animation finished" notification for a spawned bullet.
///
/// Firing after the scheduler has been dropped, or after the instance was
/// retracted by a reset, does nothing.
#[derive(Debug, Clone)]
pub struct CompletionSignal {
    handle: SpawnHandle,
    queue: Weak<RefCell<Vec<SpawnHandle>>>,
}

impl CompletionSignal {
    pub(crate) fn new(handle: SpawnHandle, queue: &CompletionQueue) -> Self {
        Self {
            handle,
            queue: Rc::downgrade(queue),
        }
    }

    pub fn handle(&self) -> SpawnHandle {
        self.handle
    }

    pub fn fire(self) {
        if let Some(queue) = self.queue.upgrade() {
            queue.borrow_mut().push(self.handle);
        }
    }
}
