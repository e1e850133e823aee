//! Spark Timeline entry point
//!
//! Replays a level file headlessly and reports what fired.
//!
//! Usage: `spark-timeline <level.json> [settings.json]`

use std::process::ExitCode;

use spark_timeline::consts::*;
use spark_timeline::platform::{
    Collaborators, HeadlessHealth, HeadlessSpawner, ManualClock, RecordingEffects,
};
use spark_timeline::{LevelSession, Result, Settings};

/// Seconds replayed past the last trigger so trailing bullets finish
const TAIL_SECS: f32 = BULLET_ANIMATION_SECS + TRIGGER_WINDOW;

#[derive(Debug, Default)]
struct ReplayStats {
    ticks: u64,
    dispatched: usize,
    spawned: usize,
    completed: usize,
    checkpoints: u32,
    beats: u32,
    healed: i32,
}

fn replay(level_path: &str, settings: Settings) -> Result<ReplayStats> {
    let clock = ManualClock::new(0.0);
    let spawner = HeadlessSpawner::default();
    let effects = RecordingEffects::new();
    let collab = Collaborators::new()
        .with_clock(clock.clone())
        .with_spawner(spawner.clone())
        .with_effects(effects.clone())
        .with_health(HeadlessHealth::new(MAX_HEALTH - 2));

    let mut session = LevelSession::new(settings, collab);
    session.load(level_path)?;
    if let Some(clip) = session.song_clip() {
        log::info!("Song {} ({clip})", session.song());
    }

    let end = session
        .timeline()
        .iter()
        .map(|e| e.trigger_time)
        .fold(0.0f32, f32::max)
        + TAIL_SECS;
    session.set_song_duration(end);

    let mut stats = ReplayStats::default();
    while clock.get() <= end {
        let report = session.tick(SIM_DT)?;
        stats.ticks += 1;
        stats.dispatched += report.dispatched();
        stats.spawned += report.spawned.len();
        stats.completed += report.completed.len();
        stats.checkpoints += report.checkpoints;
        stats.beats += report.beats;
        stats.healed += report.healed;

        clock.advance(SIM_DT);
        spawner.advance(SIM_DT);
    }

    log::info!(
        "Replayed {:.2}s in {} ticks, {} bullets still live",
        end,
        stats.ticks,
        spawner.live_count()
    );
    for request in spawner.live_requests() {
        log::debug!("Still live: {} from {:.3}s", request.lane, request.trigger_time);
    }
    log::debug!("Checkpoint rewards: {:?}", effects.checkpoints());
    if session.progress().can_publish() {
        log::info!("Level completed");
    }
    Ok(stats)
}

fn main() -> ExitCode {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(level_path) = args.next() else {
        eprintln!("usage: spark-timeline <level.json> [settings.json]");
        return ExitCode::from(2);
    };
    let settings = match args.next() {
        Some(path) => Settings::load(path),
        None => Settings::default(),
    };

    log::info!("Spark Timeline (headless, {} mode)", settings.mode.as_str());
    match replay(&level_path, settings) {
        Ok(stats) => {
            println!(
                "{} triggers fired: {} bullets spawned ({} finished), {} checkpoints, {} beats, {} healed",
                stats.dispatched,
                stats.spawned,
                stats.completed,
                stats.checkpoints,
                stats.beats,
                stats.healed
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("Replay failed: {err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
