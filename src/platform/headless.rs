//! Headless collaborators
//!
//! Used by the native replay binary and by tests. Each type is a cheap
//! handle over shared state, so a clone kept outside the session can
//! drive or inspect what the session sees.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::{Clock, CompletionSignal, Effects, Health, SpawnHandle, SpawnRequest, Spawner};
use crate::consts::{BULLET_ANIMATION_SECS, MAX_HEALTH};

/// Clock advanced by hand (or by a fixed-step loop)
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    time: Rc<Cell<f32>>,
}

impl ManualClock {
    pub fn new(time: f32) -> Self {
        Self {
            time: Rc::new(Cell::new(time)),
        }
    }

    pub fn advance(&self, dt: f32) {
        self.time.set(self.time.get() + dt);
    }

    pub fn set(&self, time: f32) {
        self.time.set(time);
    }

    pub fn get(&self) -> f32 {
        self.time.get()
    }
}

impl Clock for ManualClock {
    fn current_time(&self) -> f32 {
        self.time.get()
    }

    fn set_time(&mut self, time: f32) {
        self.time.set(time);
    }
}

/// A live bullet in the headless spawner
#[derive(Debug)]
struct LiveBullet {
    handle: SpawnHandle,
    request: SpawnRequest,
    remaining: f32,
    signal: Option<CompletionSignal>,
}

#[derive(Debug, Default)]
struct SpawnerState {
    animation_secs: f32,
    live: Vec<LiveBullet>,
    spawned: Vec<SpawnRequest>,
    destroyed: Vec<SpawnHandle>,
}

/// Spawner whose bullets "animate" for a fixed duration of ticked time
#[derive(Debug, Clone)]
pub struct HeadlessSpawner {
    state: Rc<RefCell<SpawnerState>>,
}

impl Default for HeadlessSpawner {
    fn default() -> Self {
        Self::new(BULLET_ANIMATION_SECS)
    }
}

impl HeadlessSpawner {
    pub fn new(animation_secs: f32) -> Self {
        Self {
            state: Rc::new(RefCell::new(SpawnerState {
                animation_secs,
                ..Default::default()
            })),
        }
    }

    /// Advance every live animation, firing completion for finished ones
    pub fn advance(&self, dt: f32) {
        let finished: Vec<CompletionSignal> = {
            let mut state = self.state.borrow_mut();
            state
                .live
                .iter_mut()
                .filter_map(|bullet| {
                    bullet.remaining -= dt;
                    if bullet.remaining <= 0.0 {
                        bullet.signal.take()
                    } else {
                        None
                    }
                })
                .collect()
        };
        // Fired outside the borrow; the scheduler destroys on its next tick
        for signal in finished {
            signal.fire();
        }
    }

    /// Bullets spawned and not yet destroyed
    pub fn live_count(&self) -> usize {
        self.state.borrow().live.len()
    }

    /// Requests behind the bullets still on screen
    pub fn live_requests(&self) -> Vec<SpawnRequest> {
        self.state.borrow().live.iter().map(|b| b.request).collect()
    }

    /// Every spawn request ever received, in order
    pub fn spawned(&self) -> Vec<SpawnRequest> {
        self.state.borrow().spawned.clone()
    }

    pub fn destroyed(&self) -> Vec<SpawnHandle> {
        self.state.borrow().destroyed.clone()
    }
}

impl Spawner for HeadlessSpawner {
    fn spawn(&mut self, handle: SpawnHandle, request: SpawnRequest, on_complete: CompletionSignal) {
        let mut state = self.state.borrow_mut();
        let remaining = state.animation_secs;
        state.spawned.push(request);
        state.live.push(LiveBullet {
            handle,
            request,
            remaining,
            signal: Some(on_complete),
        });
    }

    fn destroy(&mut self, handle: SpawnHandle) {
        let mut state = self.state.borrow_mut();
        state.live.retain(|b| b.handle != handle);
        state.destroyed.push(handle);
    }
}

#[derive(Debug, Default)]
struct EffectLog {
    checkpoints: Vec<Option<u8>>,
    beats: u32,
}

/// Effects sink that only records what it was asked to play
#[derive(Debug, Clone, Default)]
pub struct RecordingEffects {
    log: Rc<RefCell<EffectLog>>,
}

impl RecordingEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// New-life reward passed with each checkpoint, in order
    pub fn checkpoints(&self) -> Vec<Option<u8>> {
        self.log.borrow().checkpoints.clone()
    }

    pub fn beats(&self) -> u32 {
        self.log.borrow().beats
    }
}

impl Effects for RecordingEffects {
    fn on_checkpoint_reached(&mut self, new_life: Option<u8>) {
        log::debug!("Checkpoint reached (new life: {:?})", new_life);
        self.log.borrow_mut().checkpoints.push(new_life);
    }

    fn on_beat(&mut self) {
        self.log.borrow_mut().beats += 1;
    }
}

/// Health counter capped at [`MAX_HEALTH`]
#[derive(Debug, Clone)]
pub struct HeadlessHealth {
    current: Rc<Cell<i32>>,
}

impl Default for HeadlessHealth {
    fn default() -> Self {
        Self::new(MAX_HEALTH)
    }
}

impl HeadlessHealth {
    pub fn new(current: i32) -> Self {
        Self {
            current: Rc::new(Cell::new(current)),
        }
    }

    pub fn get(&self) -> i32 {
        self.current.get()
    }

    pub fn set(&self, value: i32) {
        self.current.set(value);
    }
}

impl Health for HeadlessHealth {
    fn current_health(&self) -> i32 {
        self.current.get()
    }

    fn heal(&mut self, amount: i32) {
        self.current.set((self.current.get() + amount).min(MAX_HEALTH));
    }
}
