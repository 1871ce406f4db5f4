//! Durable, idempotent ledger of completed assignments.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::core::error::AllotError;
use crate::core::{ActorId, RequesterId, SlotId};
use crate::infra::assignment_log::AssignmentLog;

/// Ledger key: requester id plus the exact registered display name.
pub type LedgerKey = (RequesterId, String);

/// One completed assignment, immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentRecord {
    /// When the assignment was made.
    pub assigned_at: DateTime<Utc>,
    /// Front-end actor that submitted the claim.
    pub actor_id: ActorId,
    /// Requester who received the slot.
    pub requester_id: RequesterId,
    /// Registered display name at assignment time.
    pub requester_name: String,
    /// Assigned slot id.
    pub slot_id: SlotId,
    /// Assigned slot label.
    pub slot_label: String,
    /// Payload handed to the requester.
    pub slot_payload: String,
}

impl AssignmentRecord {
    /// Ledger key for this record.
    pub fn key(&self) -> LedgerKey {
        (self.requester_id, self.requester_name.clone())
    }
}

/// Append-only assignment ledger.
///
/// Holds the durable log, an idempotent lookup map over every record ever
/// appended, and the pending backlog of records not yet acknowledged by the
/// reporting sink. The ledger never checks uniqueness itself; the
/// coordinator's locked check-then-act sequence is responsible for that.
#[derive(Debug)]
pub struct AssignmentLedger {
    log: AssignmentLog,
    records: HashMap<LedgerKey, AssignmentRecord>,
    backlog: Vec<AssignmentRecord>,
}

impl AssignmentLedger {
    /// Replay the durable log into the lookup map. History that was already
    /// synchronized in past runs is not re-queued: the backlog starts empty.
    pub fn recover(log: AssignmentLog) -> Result<Self, AllotError> {
        let mut records = HashMap::new();
        for record in log.replay()? {
            records.insert(record.key(), record);
        }
        tracing::info!(count = records.len(), "assignment ledger recovered");
        Ok(Self {
            log,
            records,
            backlog: Vec::new(),
        })
    }

    /// Membership test on `(requester_id, requester_name)`.
    pub fn contains(&self, key: &LedgerKey) -> bool {
        self.records.contains_key(key)
    }

    /// Stored record for `key`, if any.
    pub fn get(&self, key: &LedgerKey) -> Option<&AssignmentRecord> {
        self.records.get(key)
    }

    /// Append a new record: durable log write first, then the in-memory
    /// mirrors.
    pub fn append(&mut self, record: AssignmentRecord) -> Result<(), AllotError> {
        self.log.append(&record)?;
        tracing::info!(
            requester = record.requester_id,
            slot = record.slot_id,
            "assignment recorded"
        );
        self.backlog.push(record.clone());
        self.records.insert(record.key(), record);
        Ok(())
    }

    /// Atomically take and clear the pending backlog (scheduler only).
    pub fn drain_backlog(&mut self) -> Vec<AssignmentRecord> {
        std::mem::take(&mut self.backlog)
    }

    /// Prepend a failed batch back in its original order so nothing already
    /// durable ever disappears from the sync queue.
    pub fn restore_backlog(&mut self, mut batch: Vec<AssignmentRecord>) {
        batch.append(&mut self.backlog);
        self.backlog = batch;
    }

    /// Number of records ever appended (including replayed history).
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the ledger holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records waiting for sink acknowledgement.
    pub fn backlog_len(&self) -> usize {
        self.backlog.len()
    }
}
