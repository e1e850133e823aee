//! `MM:SS:mmm` time codes
//!
//! Level files store trigger times as human-readable strings. The editor
//! also derives the string directly from the audio clock, so the float and
//! the string are carried side by side on every event.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TimelineError};

/// A trigger time split into whole minutes, seconds and milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TimeCode {
    pub minutes: u32,
    pub seconds: u32,
    pub millis: u32,
}

impl TimeCode {
    pub fn new(minutes: u32, seconds: u32, millis: u32) -> Self {
        Self {
            minutes,
            seconds,
            millis,
        }
    }

    /// Floor a playback position to whole minutes/seconds/milliseconds.
    ///
    /// Negative positions are not valid here; callers clamp first. Release
    /// builds treat them as zero.
    pub fn from_seconds(seconds: f32) -> Self {
        debug_assert!(seconds >= 0.0, "negative time {seconds} passed to TimeCode");
        // All three fields come from one integer so they can't disagree
        // about rounding near a second boundary.
        let total_ms = (seconds.max(0.0) * 1000.0).floor() as u64;
        Self {
            minutes: (total_ms / 60_000) as u32,
            seconds: ((total_ms / 1000) % 60) as u32,
            millis: (total_ms % 1000) as u32,
        }
    }

    /// Position in seconds: `minutes * 60 + seconds + millis / 1000`
    pub fn to_seconds(&self) -> f32 {
        self.minutes as f32 * 60.0 + self.seconds as f32 + self.millis as f32 / 1000.0
    }

    /// Move the seconds field back by `offset`, borrowing a single minute
    /// when it goes negative. Minutes never drop below zero, so an offset
    /// larger than the position wraps into the 50s of minute zero instead
    /// of clamping to `00:00:000`.
    pub fn borrow_seconds(self, offset: u32) -> Self {
        let mut minutes = self.minutes;
        let mut seconds = self.seconds as i64 - offset as i64;
        if seconds < 0 {
            seconds += 60;
            minutes = minutes.saturating_sub(1);
        }
        Self {
            minutes,
            seconds: seconds.max(0) as u32,
            millis: self.millis,
        }
    }
}

impl fmt::Display for TimeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:03}", self.minutes, self.seconds, self.millis)
    }
}

impl FromStr for TimeCode {
    type Err = TimelineError;

    fn from_str(s: &str) -> Result<Self> {
        let fields: Vec<&str> = s.split(':').collect();
        let &[minutes, seconds, millis] = fields.as_slice() else {
            return Err(TimelineError::InvalidTimeFormat(s.to_string()));
        };
        // Digits only: `u32::from_str` would also take a leading `+`
        let parse = |field: &str| {
            if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
                return Err(TimelineError::InvalidTimeFormat(s.to_string()));
            }
            field
                .parse::<u32>()
                .map_err(|_| TimelineError::InvalidTimeFormat(s.to_string()))
        };
        Ok(Self {
            minutes: parse(minutes)?,
            seconds: parse(seconds)?,
            millis: parse(millis)?,
        })
    }
}

/// Parse `MM:SS:mmm` into seconds
pub fn to_seconds(time: &str) -> Result<f32> {
    Ok(time.parse::<TimeCode>()?.to_seconds())
}

/// Format seconds as `MM:SS:mmm` (floored)
pub fn from_seconds(seconds: f32) -> String {
    TimeCode::from_seconds(seconds).to_string()
}
