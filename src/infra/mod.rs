//! Durable file adapters: rosters, state log, assignment log.

pub mod assignment_log;
pub mod codec;
pub mod roster;
pub mod state_log;

pub use assignment_log::AssignmentLog;
pub use roster::{load_slots, RequesterRegistry};
pub use state_log::{PoolEvent, StateLog};
