//! Timed-event core
//!
//! Everything that decides *when* bullets fire lives here:
//! - Playback position comes from the host clock only
//! - Events are never mutated after insertion, only their fired flag
//! - Resets retract on-screen bullets synchronously

pub mod checkpoint;
pub mod path;
pub mod store;
pub mod tick;
pub mod time_code;

pub use checkpoint::{checkpoint_target, reset_to, reset_to_last_checkpoint};
pub use path::{BulletKind, Direction, Lane, LaneAxis, LanePath, TriggerPath};
pub use store::{TimedEvent, Timeline};
pub use tick::{ActiveBullet, PlaybackScheduler, SchedulerPhase, TickReport};
pub use time_code::{TimeCode, from_seconds, to_seconds};
