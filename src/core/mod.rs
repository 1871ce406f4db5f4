//! Core allotment domain: pool, ledger, coordinator, errors.

pub mod coordinator;
pub mod error;
pub mod ledger;
pub mod pool;

pub use coordinator::{AllotOutcome, Claim, Coordinator, Engine};
pub use error::{AllotError, AppResult};
pub use ledger::{AssignmentLedger, AssignmentRecord, LedgerKey};
pub use pool::{Slot, SlotPool};

/// Identifier of a distributable slot.
pub type SlotId = u64;
/// Identifier of a registered requester.
pub type RequesterId = u64;
/// Identifier of the front-end actor submitting a claim.
pub type ActorId = u64;
