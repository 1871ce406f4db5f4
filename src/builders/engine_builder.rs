//! Construct the engine and registry from validated settings.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::Settings;
use crate::core::coordinator::Engine;
use crate::core::error::AllotError;
use crate::core::ledger::AssignmentLedger;
use crate::core::pool::SlotPool;
use crate::infra::assignment_log::AssignmentLog;
use crate::infra::roster::{self, RequesterRegistry};
use crate::infra::state_log::StateLog;

/// Load both rosters, recover durable state and assemble the shared engine.
///
/// Fails fast on any startup precondition: invalid settings, missing or
/// corrupt files, an empty slot roster. Bootstrap is expected to exit
/// non-zero on an error from here, before any claims are served.
pub fn build_engine(
    settings: &Settings,
) -> Result<(RequesterRegistry, Arc<Mutex<Engine>>), AllotError> {
    settings.validate().map_err(AllotError::Config)?;

    let slots = roster::load_slots(&settings.slot_roster_path)?;
    let registry = RequesterRegistry::load(&settings.requester_roster_path)?;

    let state_log = StateLog::open(&settings.state_log_path)?;
    let pool = SlotPool::recover(slots, state_log)?;

    let assignment_log = AssignmentLog::open(&settings.assignment_log_path)?;
    let ledger = AssignmentLedger::recover(assignment_log)?;

    Ok((registry, Arc::new(Mutex::new(Engine { pool, ledger }))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_in(dir: &tempfile::TempDir) -> Settings {
        Settings {
            slot_roster_path: dir.path().join("slots.csv"),
            requester_roster_path: dir.path().join("requesters.csv"),
            state_log_path: dir.path().join("state.log"),
            assignment_log_path: dir.path().join("assignments.csv"),
            report_url: "https://example.com/sheet".to_string(),
            sync_interval_secs: 30,
            event_window: None,
        }
    }

    #[test]
    fn builds_from_roster_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("slots.csv"), "1,Mentor A,alpha\n").unwrap();
        std::fs::write(dir.path().join("requesters.csv"), "100,Jane Doe\n").unwrap();

        let (registry, engine) = build_engine(&settings_in(&dir)).unwrap();
        assert_eq!(registry.len(), 1);
        let engine = engine.lock();
        assert_eq!(engine.pool.available(), 1);
        assert!(engine.ledger.is_empty());
    }

    #[test]
    fn missing_roster_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        assert!(build_engine(&settings_in(&dir)).is_err());
    }

    #[test]
    fn empty_roster_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("slots.csv"), "").unwrap();
        std::fs::write(dir.path().join("requesters.csv"), "100,Jane Doe\n").unwrap();

        assert!(matches!(
            build_engine(&settings_in(&dir)),
            Err(AllotError::EmptyRoster)
        ));
    }
}
