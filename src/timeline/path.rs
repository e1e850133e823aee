//! Bullet identifiers and their slash-delimited path form
//!
//! Lane events are addressed as `Bullets/{Axis}_{from}_{to}/{Kind}`, e.g.
//! `Bullets/Top_left_right/Bullet`. Checkpoint and beat markers use the bare
//! strings `checkpoint` and `beat`.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TimelineError};

/// Root segment of every lane path
pub const BULLETS_ROOT: &str = "Bullets";
/// Identifier of a checkpoint marker
pub const CHECKPOINT_TAG: &str = "checkpoint";
/// Identifier of a beat marker
pub const BEAT_TAG: &str = "beat";

/// Row or column a lane runs along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaneAxis {
    Top,
    Middle,
    Bottom,
    First,
    Second,
    Third,
}

impl LaneAxis {
    pub const ALL: [LaneAxis; 6] = [
        LaneAxis::Top,
        LaneAxis::Middle,
        LaneAxis::Bottom,
        LaneAxis::First,
        LaneAxis::Second,
        LaneAxis::Third,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LaneAxis::Top => "top",
            LaneAxis::Middle => "middle",
            LaneAxis::Bottom => "bottom",
            LaneAxis::First => "first",
            LaneAxis::Second => "second",
            LaneAxis::Third => "third",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "top" => Some(LaneAxis::Top),
            "middle" => Some(LaneAxis::Middle),
            "bottom" => Some(LaneAxis::Bottom),
            "first" => Some(LaneAxis::First),
            "second" => Some(LaneAxis::Second),
            "third" => Some(LaneAxis::Third),
            _ => None,
        }
    }

    /// Rows run horizontally, columns vertically
    pub fn is_row(&self) -> bool {
        matches!(self, LaneAxis::Top | LaneAxis::Middle | LaneAxis::Bottom)
    }

    /// The two direction pairs bullets can travel along this axis
    pub fn directions(&self) -> [(Direction, Direction); 2] {
        if self.is_row() {
            [
                (Direction::Left, Direction::Right),
                (Direction::Right, Direction::Left),
            ]
        } else {
            [
                (Direction::Up, Direction::Down),
                (Direction::Down, Direction::Up),
            ]
        }
    }
}

/// Screen edge a bullet enters from or leaves towards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Projectile variant spawned on a lane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BulletKind {
    #[default]
    Bullet,
    Boomerang,
    Arrow,
}

impl BulletKind {
    pub const ALL: [BulletKind; 3] = [BulletKind::Bullet, BulletKind::Boomerang, BulletKind::Arrow];

    pub fn as_str(&self) -> &'static str {
        match self {
            BulletKind::Bullet => "bullet",
            BulletKind::Boomerang => "boomerang",
            BulletKind::Arrow => "arrow",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "bullet" => Some(BulletKind::Bullet),
            "boomerang" => Some(BulletKind::Boomerang),
            "arrow" => Some(BulletKind::Arrow),
            _ => None,
        }
    }
}

/// One of the fixed lanes, without a bullet kind attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Lane {
    pub axis: LaneAxis,
    pub from: Direction,
    pub to: Direction,
}

impl Lane {
    pub fn new(axis: LaneAxis, from: Direction, to: Direction) -> Self {
        Self { axis, from, to }
    }

    /// All 12 lanes: rows first, then columns
    pub fn all() -> Vec<Lane> {
        LaneAxis::ALL
            .iter()
            .flat_map(|&axis| {
                axis.directions()
                    .into_iter()
                    .map(move |(from, to)| Lane::new(axis, from, to))
            })
            .collect()
    }

    /// Attach a bullet kind, producing a full lane path
    pub fn with_kind(self, kind: BulletKind) -> LanePath {
        LanePath {
            axis: self.axis,
            from: self.from,
            to: self.to,
            kind,
        }
    }
}

/// Decoded `Bullets/{Axis}_{from}_{to}/{Kind}` path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LanePath {
    pub axis: LaneAxis,
    pub from: Direction,
    pub to: Direction,
    pub kind: BulletKind,
}

impl LanePath {
    pub fn new(axis: LaneAxis, from: Direction, to: Direction, kind: BulletKind) -> Self {
        Self {
            axis,
            from,
            to,
            kind,
        }
    }

    pub fn lane(&self) -> Lane {
        Lane::new(self.axis, self.from, self.to)
    }

    /// Whether this is one of the 12 lanes the game actually has
    pub fn is_catalogued(&self) -> bool {
        self.axis.directions().contains(&(self.from, self.to))
    }
}

impl fmt::Display for LanePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}_{}_{}/{}",
            BULLETS_ROOT,
            capitalize(self.axis.as_str()),
            self.from.as_str(),
            self.to.as_str(),
            capitalize(self.kind.as_str()),
        )
    }
}

impl FromStr for LanePath {
    type Err = TimelineError;

    fn from_str(path: &str) -> Result<Self> {
        let segments: Vec<&str> = path.split('/').collect();
        let &[_root, direction_info, kind] = segments.as_slice() else {
            return Err(TimelineError::malformed_path(
                path,
                format!("expected 3 '/' segments, found {}", segments.len()),
            ));
        };

        let tokens: Vec<&str> = direction_info.split('_').collect();
        let &[axis, from, to] = tokens.as_slice() else {
            return Err(TimelineError::malformed_path(
                path,
                format!("expected 3 '_' tokens in '{direction_info}', found {}", tokens.len()),
            ));
        };

        let unknown = |what: &str, token: &str| {
            TimelineError::malformed_path(path, format!("unknown {what} '{token}'"))
        };
        Ok(LanePath {
            axis: LaneAxis::parse(axis).ok_or_else(|| unknown("axis", axis))?,
            from: Direction::parse(from).ok_or_else(|| unknown("direction", from))?,
            to: Direction::parse(to).ok_or_else(|| unknown("direction", to))?,
            kind: BulletKind::parse(kind).ok_or_else(|| unknown("bullet kind", kind))?,
        })
    }
}

/// What a timed event triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerPath {
    /// Safe resume point after a death
    Checkpoint,
    /// Camera pulse on the music's beat
    Beat,
    /// Spawn a bullet on a lane
    Lane(LanePath),
}

impl TriggerPath {
    pub fn is_sentinel(&self) -> bool {
        !matches!(self, TriggerPath::Lane(_))
    }

    pub fn as_lane(&self) -> Option<&LanePath> {
        match self {
            TriggerPath::Lane(lane) => Some(lane),
            _ => None,
        }
    }

    /// Recognize a sentinel tag (case-insensitive)
    pub fn sentinel(tag: &str) -> Option<Self> {
        if tag.eq_ignore_ascii_case(CHECKPOINT_TAG) {
            Some(TriggerPath::Checkpoint)
        } else if tag.eq_ignore_ascii_case(BEAT_TAG) {
            Some(TriggerPath::Beat)
        } else {
            None
        }
    }
}

impl From<LanePath> for TriggerPath {
    fn from(lane: LanePath) -> Self {
        TriggerPath::Lane(lane)
    }
}

impl fmt::Display for TriggerPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerPath::Checkpoint => f.write_str(CHECKPOINT_TAG),
            TriggerPath::Beat => f.write_str(BEAT_TAG),
            TriggerPath::Lane(lane) => lane.fmt(f),
        }
    }
}

impl FromStr for TriggerPath {
    type Err = TimelineError;

    fn from_str(path: &str) -> Result<Self> {
        match TriggerPath::sentinel(path) {
            Some(sentinel) => Ok(sentinel),
            None => Ok(TriggerPath::Lane(path.parse()?)),
        }
    }
}

/// Upper-case the first character, leave the rest untouched
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_lane_path() {
        let path = LanePath::new(
            LaneAxis::Top,
            Direction::Left,
            Direction::Right,
            BulletKind::Bullet,
        );
        assert_eq!(path.to_string(), "Bullets/Top_left_right/Bullet");

        let path = LanePath::new(
            LaneAxis::Third,
            Direction::Down,
            Direction::Up,
            BulletKind::Boomerang,
        );
        assert_eq!(path.to_string(), "Bullets/Third_down_up/Boomerang");
    }

    #[test]
    fn test_encode_sentinels() {
        assert_eq!(TriggerPath::Checkpoint.to_string(), "checkpoint");
        assert_eq!(TriggerPath::Beat.to_string(), "beat");
    }

    #[test]
    fn test_decode_is_case_insensitive() {
        let path: LanePath = "bullets/MIDDLE_Right_LEFT/arrow".parse().unwrap();
        assert_eq!(path.axis, LaneAxis::Middle);
        assert_eq!(path.from, Direction::Right);
        assert_eq!(path.to, Direction::Left);
        assert_eq!(path.kind, BulletKind::Arrow);
        assert_eq!(path.axis.as_str(), "middle");
    }

    #[test]
    fn test_decode_sentinels() {
        assert_eq!("checkpoint".parse::<TriggerPath>().unwrap(), TriggerPath::Checkpoint);
        assert_eq!("beat".parse::<TriggerPath>().unwrap(), TriggerPath::Beat);
    }

    #[test]
    fn test_decode_rejects_wrong_segment_count() {
        for bad in ["Bullets/Top_left_right", "Top_left_right", "a/b/c/d", ""] {
            assert!(
                matches!(bad.parse::<LanePath>(), Err(TimelineError::MalformedPath { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_decode_rejects_wrong_token_count() {
        for bad in ["Bullets/Top_left/Bullet", "Bullets/Top_left_right_up/Bullet"] {
            assert!(matches!(
                bad.parse::<LanePath>(),
                Err(TimelineError::MalformedPath { .. })
            ));
        }
    }

    #[test]
    fn test_decode_rejects_unknown_tokens() {
        assert!("Bullets/Diagonal_left_right/Bullet".parse::<LanePath>().is_err());
        assert!("Bullets/Top_left_sideways/Bullet".parse::<LanePath>().is_err());
        assert!("Bullets/Top_left_right/Laser".parse::<LanePath>().is_err());
    }

    #[test]
    fn test_lane_catalog() {
        let lanes = Lane::all();
        assert_eq!(lanes.len(), 12);
        assert!(lanes.iter().all(|l| l.with_kind(BulletKind::Arrow).is_catalogued()));
        let odd = LanePath::new(LaneAxis::Top, Direction::Up, Direction::Down, BulletKind::Bullet);
        assert!(!odd.is_catalogued());
    }

    fn any_trigger_path() -> impl Strategy<Value = TriggerPath> {
        let lane = (0..12usize, 0..3usize).prop_map(|(lane, kind)| {
            TriggerPath::Lane(Lane::all()[lane].with_kind(BulletKind::ALL[kind]))
        });
        prop_oneof![
            Just(TriggerPath::Checkpoint),
            Just(TriggerPath::Beat),
            lane,
        ]
    }

    proptest! {
        #[test]
        fn prop_decode_inverts_encode(path in any_trigger_path()) {
            prop_assert_eq!(path.to_string().parse::<TriggerPath>().unwrap(), path);
        }
    }
}
