//! Per-frame playback scheduling
//!
//! Each tick reads the audio clock, fires every due-but-unfired event and
//! hands it to the matching collaborator. Lane bullets that were spawned
//! stay in the active set until their completion signal arrives or a reset
//! retracts them.

use std::collections::BTreeMap;

use super::path::{LanePath, TriggerPath};
use super::store::{TimedEvent, Timeline};
use crate::consts::{NEW_LIFE_DELAY, NEW_LIFE_MAX_HEALTH, TRIGGER_WINDOW};
use crate::error::{Result, TimelineError};
use crate::platform::{Collaborators, CompletionQueue, CompletionSignal, SpawnHandle, SpawnRequest};

/// Where the scheduler is within a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerPhase {
    /// Between ticks
    #[default]
    Idle,
    /// Collecting due events
    Scanning,
    /// Handing due events to collaborators
    Dispatching,
}

/// A spawned bullet still on screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveBullet {
    pub lane: LanePath,
    pub trigger_time: f32,
}

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Clock position the tick ran at
    pub time: f32,
    /// Handles of bullets spawned this tick
    pub spawned: Vec<SpawnHandle>,
    /// Handles destroyed because their animation finished
    pub completed: Vec<SpawnHandle>,
    pub checkpoints: u32,
    pub beats: u32,
    /// Health restored by checkpoint rewards that came due this tick
    pub healed: i32,
}

impl TickReport {
    pub fn dispatched(&self) -> usize {
        self.spawned.len() + (self.checkpoints + self.beats) as usize
    }
}

/// Fires timeline events against the external clock
#[derive(Debug)]
pub struct PlaybackScheduler {
    phase: SchedulerPhase,
    window: f32,
    new_life_delay: f32,
    active: BTreeMap<SpawnHandle, ActiveBullet>,
    completions: CompletionQueue,
    /// Seconds of tick time left before each pending checkpoint heal
    pending_heals: Vec<f32>,
    next_handle: u64,
}

impl Default for PlaybackScheduler {
    fn default() -> Self {
        Self::new(TRIGGER_WINDOW, NEW_LIFE_DELAY)
    }
}

impl PlaybackScheduler {
    pub fn new(window: f32, new_life_delay: f32) -> Self {
        Self {
            phase: SchedulerPhase::Idle,
            window,
            new_life_delay,
            active: BTreeMap::new(),
            completions: CompletionQueue::default(),
            pending_heals: Vec::new(),
            next_handle: 1,
        }
    }

    pub fn phase(&self) -> SchedulerPhase {
        self.phase
    }

    pub fn window(&self) -> f32 {
        self.window
    }

    /// Bullets currently on screen
    pub fn active(&self) -> impl Iterator<Item = (SpawnHandle, &ActiveBullet)> {
        self.active.iter().map(|(handle, bullet)| (*handle, bullet))
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn active_bullet(&self, handle: SpawnHandle) -> Option<&ActiveBullet> {
        self.active.get(&handle)
    }

    /// Run one tick. `dt` is wall/frame time, used only for delayed effects.
    ///
    /// A missing clock or spawner skips dispatch for this tick and is
    /// reported as [`TimelineError::MissingCollaborator`]; the caller's loop
    /// is expected to keep ticking.
    pub fn tick(
        &mut self,
        timeline: &mut Timeline,
        collab: &mut Collaborators,
        dt: f32,
    ) -> Result<TickReport> {
        let mut report = TickReport::default();
        self.drain_completions(collab, &mut report);
        self.advance_heals(collab, dt, &mut report);

        let Some(clock) = collab.clock.as_ref() else {
            log::warn!("No playback clock wired, skipping tick");
            return Err(TimelineError::MissingCollaborator("clock"));
        };
        if collab.spawner.is_none() {
            log::warn!("No bullet spawner wired, skipping tick");
            return Err(TimelineError::MissingCollaborator("spawner"));
        }
        let now = clock.current_time();
        report.time = now;

        self.phase = SchedulerPhase::Scanning;
        let due = timeline.fire_due(now, self.window);

        self.phase = SchedulerPhase::Dispatching;
        for event in &due {
            self.dispatch(event, collab, &mut report);
        }

        self.phase = SchedulerPhase::Idle;
        Ok(report)
    }

    fn dispatch(&mut self, event: &TimedEvent, collab: &mut Collaborators, report: &mut TickReport) {
        log::debug!("Trigger {} at {}", event.path, event.time_code);
        match event.path {
            TriggerPath::Checkpoint => {
                let new_life = self.checkpoint_reward(collab);
                match collab.effects.as_mut() {
                    Some(effects) => effects.on_checkpoint_reached(new_life),
                    None => log::warn!("Checkpoint effect not assigned"),
                }
                report.checkpoints += 1;
            }
            TriggerPath::Beat => {
                match collab.effects.as_mut() {
                    Some(effects) => effects.on_beat(),
                    None => log::warn!("Beat effect not assigned"),
                }
                report.beats += 1;
            }
            TriggerPath::Lane(lane) => {
                let Some(spawner) = collab.spawner.as_mut() else {
                    return;
                };
                let handle = SpawnHandle(self.next_handle);
                self.next_handle += 1;
                let request = SpawnRequest {
                    lane,
                    trigger_time: event.trigger_time,
                };
                spawner.spawn(handle, request, CompletionSignal::new(handle, &self.completions));
                self.active.insert(
                    handle,
                    ActiveBullet {
                        lane,
                        trigger_time: event.trigger_time,
                    },
                );
                report.spawned.push(handle);
            }
        }
    }

    /// Reward the player with a life when they reach a checkpoint hurt but
    /// alive. The heal itself lands after the new-life animation.
    fn checkpoint_reward(&mut self, collab: &Collaborators) -> Option<u8> {
        let Some(health) = collab.health.as_ref() else {
            log::warn!("No health provider wired, checkpoint gives no reward");
            return None;
        };
        let current = health.current_health();
        if (1..=NEW_LIFE_MAX_HEALTH).contains(&current) {
            self.pending_heals.push(self.new_life_delay);
            Some((current + 1) as u8)
        } else {
            None
        }
    }

    fn advance_heals(&mut self, collab: &mut Collaborators, dt: f32, report: &mut TickReport) {
        if self.pending_heals.is_empty() {
            return;
        }
        self.pending_heals.iter_mut().for_each(|t| *t -= dt);
        let ready = self.pending_heals.iter().filter(|t| **t <= 0.0).count();
        self.pending_heals.retain(|t| *t > 0.0);
        if ready == 0 {
            return;
        }
        match collab.health.as_mut() {
            Some(health) => {
                for _ in 0..ready {
                    health.heal(1);
                }
                report.healed += ready as i32;
            }
            None => log::error!("Health provider went missing before checkpoint heal"),
        }
    }

    fn drain_completions(&mut self, collab: &mut Collaborators, report: &mut TickReport) {
        let finished: Vec<SpawnHandle> = self.completions.borrow_mut().drain(..).collect();
        for handle in finished {
            // Instances retracted by a reset may still report in; ignore them
            if self.active.remove(&handle).is_none() {
                continue;
            }
            if let Some(spawner) = collab.spawner.as_mut() {
                spawner.destroy(handle);
            }
            report.completed.push(handle);
        }
    }

    /// Take one instance off screen without waiting for its animation
    pub fn retract(&mut self, handle: SpawnHandle, collab: &mut Collaborators) -> Option<ActiveBullet> {
        let bullet = self.active.remove(&handle)?;
        if let Some(spawner) = collab.spawner.as_mut() {
            spawner.destroy(handle);
        }
        Some(bullet)
    }

    /// Drop checkpoint heals that have not landed yet
    pub fn cancel_heals(&mut self) {
        if !self.pending_heals.is_empty() {
            log::debug!("Cancelling {} pending heals", self.pending_heals.len());
        }
        self.pending_heals.clear();
    }

    pub fn pending_heals(&self) -> usize {
        self.pending_heals.len()
    }

    /// Destroy every active instance and forget pending completions
    pub fn retract_all(&mut self, collab: &mut Collaborators) {
        let handles: Vec<SpawnHandle> = self.active.keys().copied().collect();
        match collab.spawner.as_mut() {
            Some(spawner) => handles.iter().for_each(|h| spawner.destroy(*h)),
            None if !handles.is_empty() => {
                log::warn!("No spawner wired, dropping {} bullets untracked", handles.len())
            }
            None => {}
        }
        self.active.clear();
        self.completions.borrow_mut().clear();
    }
}
