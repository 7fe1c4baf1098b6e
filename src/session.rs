//! Per-session JSON record.
//!
//! A session file `<data_dir>/sessions/<session_id>.json` is shared with whatever
//! front end drives the session; this crate only sets its `"phase"` key to the
//! phase in which the session ended. Recording is best effort: failures are logged
//! and never interrupt a session.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

/// Phase of the high-dimensional session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    /// Block screening of attributes.
    DimensionScreening = 1,
    /// Group testing of the surviving attributes.
    GroupTesting = 2,
    /// Tuple recommendation on the final attributes.
    Recommendation = 3,
}

impl Phase {
    /// Phase number as stored in the session record.
    pub fn number(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Error)]
enum RecordError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Location of one session's JSON record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionLog {
    path: PathBuf,
}

impl SessionLog {
    /// Record under `<data_dir>/sessions/<session_id>.json`.
    pub fn new(data_dir: impl AsRef<Path>, session_id: &str) -> Self {
        Self {
            path: data_dir
                .as_ref()
                .join("sessions")
                .join(format!("{session_id}.json")),
        }
    }

    /// `DATA_DIR` (default `/data`) and `SESSION_ID` (default `default`).
    pub fn from_env() -> Self {
        let data_dir = env::var("DATA_DIR")
            .ok()
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| "/data".to_string());
        let session_id = env::var("SESSION_ID").unwrap_or_else(|_| "default".to_string());
        Self::new(data_dir, &session_id)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Set `"phase"` in the record, keeping every other key.
    pub fn record_phase(&self, phase: Phase) {
        match self.try_record(phase) {
            Ok(()) => debug!(path = %self.path.display(), phase = phase.number(), "session phase recorded"),
            Err(err) => warn!(path = %self.path.display(), %err, "could not record session phase"),
        }
    }

    fn try_record(&self, phase: Phase) -> Result<(), RecordError> {
        let mut record = match fs::read_to_string(&self.path) {
            Ok(text) if !text.trim().is_empty() => match serde_json::from_str::<Value>(&text)? {
                Value::Object(map) => map,
                _ => {
                    warn!(path = %self.path.display(), "session record is not an object; replacing it");
                    Map::new()
                }
            },
            Ok(_) => Map::new(),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(err) => return Err(err.into()),
        };
        record.insert("phase".to_string(), Value::from(phase.number()));

        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.path, serde_json::to_string(&Value::Object(record))?)?;
        Ok(())
    }
}
