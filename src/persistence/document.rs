//! Level document (JSON) model
//!
//! ```json
//! {
//!   "song": 0,
//!   "triggers": [
//!     { "rowOrColumn": "top", "from": "left", "to": "right", "type": "bullet", "triggerTimeString": "01:23:456" },
//!     { "type": "checkpoint", "triggerTimeString": "00:05:000" }
//!   ]
//! }
//! ```
//!
//! The document is versionless. Lane triggers are stored decomposed and
//! lowercase; sentinels carry only `type` and the time string.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TimelineError};
use crate::songs::SongCatalog;
use crate::timeline::path::{BULLETS_ROOT, TriggerPath, capitalize};
use crate::timeline::{TimeCode, TimedEvent, Timeline};

/// One trigger in wire form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedTrigger {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_or_column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    /// Bullet kind, or `checkpoint` / `beat`
    #[serde(rename = "type")]
    pub kind: String,
    pub trigger_time_string: String,
}

impl SerializedTrigger {
    /// Wire form of a stored event. Uses the event's own path and time
    /// code, never anything recomputed from editor state.
    pub fn from_event(event: &TimedEvent) -> Self {
        let trigger_time_string = event.time_code.to_string();
        match &event.path {
            TriggerPath::Lane(lane) => Self {
                row_or_column: Some(lane.axis.as_str().to_string()),
                from: Some(lane.from.as_str().to_string()),
                to: Some(lane.to.as_str().to_string()),
                kind: lane.kind.as_str().to_string(),
                trigger_time_string,
            },
            sentinel => Self {
                row_or_column: None,
                from: None,
                to: None,
                kind: sentinel.to_string(),
                trigger_time_string,
            },
        }
    }

    /// Rebuild the bullet path this trigger refers to
    pub fn bullet_path(&self) -> String {
        if TriggerPath::sentinel(&self.kind).is_some() {
            return self.kind.clone();
        }
        let field = |f: &Option<String>| f.clone().unwrap_or_default();
        format!(
            "{}/{}_{}_{}/{}",
            BULLETS_ROOT,
            capitalize(&field(&self.row_or_column)),
            field(&self.from),
            field(&self.to),
            capitalize(&self.kind),
        )
    }

    pub fn to_event(&self) -> Result<TimedEvent> {
        let path: TriggerPath = self.bullet_path().parse()?;
        let time_code: TimeCode = self.trigger_time_string.parse()?;
        Ok(TimedEvent::from_time_code(path, time_code))
    }
}

/// A whole level: which song plays and every trigger in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TimelineDocument {
    pub song: usize,
    pub triggers: Vec<SerializedTrigger>,
}

/// Result of a successful import
#[derive(Debug, Clone)]
pub struct ImportedLevel {
    pub song: usize,
    pub events: Vec<TimedEvent>,
}

impl TimelineDocument {
    /// Snapshot a timeline, preserving insertion order
    pub fn export(timeline: &Timeline, song: usize) -> Self {
        Self {
            song,
            triggers: timeline.iter().map(SerializedTrigger::from_event).collect(),
        }
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Decode every trigger. Fails on the first bad one; nothing partial
    /// is returned.
    pub fn decode_events(&self) -> Result<Vec<TimedEvent>> {
        self.triggers
            .iter()
            .enumerate()
            .map(|(index, trigger)| {
                trigger.to_event().map_err(|err| {
                    TimelineError::malformed_document(format!("trigger {index}: {err}"))
                })
            })
            .collect()
    }

    /// Decode the document against the songs this build knows about
    pub fn decode(&self, catalog: &SongCatalog) -> Result<ImportedLevel> {
        if !catalog.contains(self.song) {
            return Err(TimelineError::malformed_document(format!(
                "unknown song index {} ({} songs available)",
                self.song,
                catalog.len()
            )));
        }
        Ok(ImportedLevel {
            song: self.song,
            events: self.decode_events()?,
        })
    }
}

/// Export a timeline straight to JSON
pub fn export_json(timeline: &Timeline, song: usize, pretty: bool) -> Result<String> {
    TimelineDocument::export(timeline, song).to_json(pretty)
}

/// Parse and fully decode a level; all-or-nothing
pub fn import_json(json: &str, catalog: &SongCatalog) -> Result<ImportedLevel> {
    TimelineDocument::from_json(json)?.decode(catalog)
}
