//! Claim validation and the atomic check-then-allocate entry point.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::core::error::AllotError;
use crate::core::ledger::{AssignmentLedger, AssignmentRecord, LedgerKey};
use crate::core::pool::SlotPool;
use crate::core::{ActorId, RequesterId};
use crate::infra::roster::RequesterRegistry;

/// Mutable engine state guarded by the process-wide lock.
///
/// Every mutation of pool or ledger goes through this lock: the
/// coordinator's check-then-allocate sequence and the scheduler's backlog
/// drain are serialized against each other.
#[derive(Debug)]
pub struct Engine {
    /// Pool of distributable slots.
    pub pool: SlotPool,
    /// Durable assignment ledger.
    pub ledger: AssignmentLedger,
}

/// A requester-supplied claim, exactly as the front-end collected it.
#[derive(Debug, Clone)]
pub struct Claim {
    /// Raw identifier string.
    pub identifier: String,
    /// Raw display name.
    pub display_name: String,
}

/// Outcome of a successful claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllotOutcome {
    /// A fresh slot was drawn and recorded.
    Granted(AssignmentRecord),
    /// The requester already had an assignment; the stored record is
    /// returned unchanged.
    Replayed(AssignmentRecord),
}

impl AllotOutcome {
    /// The record carried by either outcome.
    pub fn record(&self) -> &AssignmentRecord {
        match self {
            Self::Granted(record) | Self::Replayed(record) => record,
        }
    }
}

/// Single entry point for allotment claims.
pub struct Coordinator {
    registry: RequesterRegistry,
    engine: Arc<Mutex<Engine>>,
}

impl Coordinator {
    /// Create a coordinator over the shared engine.
    pub fn new(registry: RequesterRegistry, engine: Arc<Mutex<Engine>>) -> Self {
        Self { registry, engine }
    }

    /// Handle one claim, terminal on every branch.
    ///
    /// Validation (parse, registry lookup, name comparison) touches only the
    /// immutable registry and runs unlocked. The ledger lookup, the pool
    /// draw and the ledger append then form one critical section: two
    /// concurrent claims for the same requester must never both observe "not
    /// yet assigned".
    pub fn allot(
        &self,
        actor_id: ActorId,
        claim: &Claim,
        at: DateTime<Utc>,
    ) -> Result<AllotOutcome, AllotError> {
        let request = Uuid::new_v4();

        let identifier = claim.identifier.trim();
        let requester_id = identifier.parse::<RequesterId>().map_err(|_| {
            tracing::info!(%request, actor = actor_id, "rejected malformed identifier");
            AllotError::MalformedIdentifier(identifier.to_string())
        })?;
        let name = claim.display_name.trim();
        if name.is_empty() {
            tracing::info!(%request, actor = actor_id, "rejected blank display name");
            return Err(AllotError::BlankName);
        }
        let registered = self.registry.name_of(requester_id).ok_or_else(|| {
            tracing::info!(%request, requester = requester_id, "rejected unknown requester");
            AllotError::UnknownRequester(requester_id)
        })?;
        if registered != name {
            tracing::info!(%request, requester = requester_id, "rejected name mismatch");
            return Err(AllotError::NameMismatch(requester_id));
        }
        let key: LedgerKey = (requester_id, name.to_string());

        let mut engine = self.engine.lock();
        if engine.ledger.contains(&key) {
            return match engine.ledger.get(&key) {
                Some(record) => {
                    tracing::info!(%request, requester = requester_id, "replayed existing assignment");
                    Ok(AllotOutcome::Replayed(record.clone()))
                }
                None => {
                    tracing::error!(
                        %request,
                        requester = requester_id,
                        "ledger contains key but holds no record"
                    );
                    Err(AllotError::LedgerInconsistency(requester_id))
                }
            };
        }

        let slot = engine.pool.draw()?;
        let record = AssignmentRecord {
            assigned_at: at,
            actor_id,
            requester_id,
            requester_name: key.1,
            slot_id: slot.id,
            slot_label: slot.label,
            slot_payload: slot.payload,
        };
        engine.ledger.append(record.clone())?;
        tracing::info!(
            %request,
            requester = requester_id,
            slot = record.slot_id,
            "assignment granted"
        );
        Ok(AllotOutcome::Granted(record))
    }

    /// Shared engine handle (for the scheduler and tests).
    pub fn engine(&self) -> Arc<Mutex<Engine>> {
        Arc::clone(&self.engine)
    }

    /// The immutable requester registry.
    pub fn registry(&self) -> &RequesterRegistry {
        &self.registry
    }
}
