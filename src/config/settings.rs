//! Environment-driven runtime settings.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::error::AllotError;

const DEFAULT_SYNC_INTERVAL_SECS: u64 = 30;

/// Claim window a front-end may enforce around the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventWindow {
    /// First instant claims are accepted.
    pub start: DateTime<Utc>,
    /// Last instant claims are accepted.
    pub end: DateTime<Utc>,
}

impl EventWindow {
    /// Whether `at` falls inside the window (inclusive on both ends).
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }
}

/// Runtime settings for the allotment engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Path of the slot roster file.
    pub slot_roster_path: PathBuf,
    /// Path of the requester roster file.
    pub requester_roster_path: PathBuf,
    /// Path of the pool state log.
    pub state_log_path: PathBuf,
    /// Path of the assignment log.
    pub assignment_log_path: PathBuf,
    /// Base URL of the reporting sink.
    pub report_url: String,
    /// Seconds between synchronization ticks.
    pub sync_interval_secs: u64,
    /// Optional claim window for the front-end.
    pub event_window: Option<EventWindow>,
}

impl Settings {
    /// Load settings from the process environment; a `.env` file is honored.
    ///
    /// `ALLOT_REPORT_URL` is required. File paths default to the working
    /// directory (`slots.csv`, `requesters.csv`, `state.log`,
    /// `assignments.csv`); the sync interval defaults to 30 seconds.
    /// `ALLOT_EVENT_START`/`ALLOT_EVENT_END` (RFC 3339) must be set together
    /// or not at all.
    pub fn from_env() -> Result<Self, AllotError> {
        dotenvy::dotenv().ok();

        let report_url = std::env::var("ALLOT_REPORT_URL")
            .map_err(|_| AllotError::Config("ALLOT_REPORT_URL is required".to_string()))?;

        let sync_interval_secs = match std::env::var("ALLOT_SYNC_INTERVAL_SECS") {
            Ok(raw) => raw.parse().map_err(|_| {
                AllotError::Config(format!("ALLOT_SYNC_INTERVAL_SECS is not a number: {raw:?}"))
            })?,
            Err(_) => DEFAULT_SYNC_INTERVAL_SECS,
        };

        let event_window = match (
            std::env::var("ALLOT_EVENT_START").ok(),
            std::env::var("ALLOT_EVENT_END").ok(),
        ) {
            (Some(start), Some(end)) => Some(EventWindow {
                start: parse_instant("ALLOT_EVENT_START", &start)?,
                end: parse_instant("ALLOT_EVENT_END", &end)?,
            }),
            (None, None) => None,
            _ => {
                return Err(AllotError::Config(
                    "ALLOT_EVENT_START and ALLOT_EVENT_END must be set together".to_string(),
                ))
            }
        };

        let settings = Self {
            slot_roster_path: var_or("ALLOT_SLOT_ROSTER", "slots.csv").into(),
            requester_roster_path: var_or("ALLOT_REQUESTER_ROSTER", "requesters.csv").into(),
            state_log_path: var_or("ALLOT_STATE_LOG", "state.log").into(),
            assignment_log_path: var_or("ALLOT_ASSIGNMENT_LOG", "assignments.csv").into(),
            report_url,
            sync_interval_secs,
            event_window,
        };
        settings.validate().map_err(AllotError::Config)?;
        Ok(settings)
    }

    /// Validate settings values.
    pub fn validate(&self) -> Result<(), String> {
        if self.report_url.trim().is_empty() {
            return Err("report_url must not be empty".to_string());
        }
        if self.sync_interval_secs == 0 {
            return Err("sync_interval_secs must be greater than 0".to_string());
        }
        if let Some(window) = &self.event_window {
            if window.end <= window.start {
                return Err("event window end must be after start".to_string());
            }
        }
        Ok(())
    }

    /// Sync cadence as a [`Duration`].
    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }
}

fn var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_instant(key: &str, value: &str) -> Result<DateTime<Utc>, AllotError> {
    DateTime::parse_from_rfc3339(value)
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|e| AllotError::Config(format!("{key} is not RFC 3339: {e}")))
}
