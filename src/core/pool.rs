//! Slot pool with durable consume/refill state.

use rand::Rng;

use crate::core::error::AllotError;
use crate::core::SlotId;
use crate::infra::state_log::{PoolEvent, StateLog};

/// An immutable distributable unit: a labeled slot carrying an opaque payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    /// Stable identifier, used in the state log.
    pub id: SlotId,
    /// Human-readable label (e.g. the slot owner's display name).
    pub label: String,
    /// Opaque payload handed to the requester on assignment.
    pub payload: String,
}

/// Pool of available slots backed by an append-only state log.
///
/// The in-memory available set is a cache: it is rebuilt from the log on
/// startup and every mutation writes its event durably before the memory
/// side changes. [`SlotPool::draw`] mutates shared state and must run under
/// the engine lock; it is not safe to call concurrently without external
/// serialization.
#[derive(Debug)]
pub struct SlotPool {
    roster: Vec<Slot>,
    available: Vec<Slot>,
    state_log: StateLog,
}

impl SlotPool {
    /// Rebuild pool state by replaying the log backward from its most
    /// recent entry.
    ///
    /// Scanning stops (exclusive) at the first `REFILL` encountered; every
    /// consume seen before that point removes one matching slot from a
    /// working copy of the roster. A log with no refill marker at all,
    /// including an empty first-run log, gets a baseline `REFILL` appended
    /// immediately so later replays have an anchor.
    ///
    /// Fails with [`AllotError::EmptyRoster`] if the roster is empty.
    pub fn recover(roster: Vec<Slot>, mut state_log: StateLog) -> Result<Self, AllotError> {
        if roster.is_empty() {
            return Err(AllotError::EmptyRoster);
        }

        let events = state_log.replay()?;
        let mut available = roster.clone();
        let mut refilled = false;
        for event in events.iter().rev() {
            match *event {
                PoolEvent::Refill => {
                    refilled = true;
                    break;
                }
                PoolEvent::Consume(id) => {
                    if let Some(pos) = available.iter().position(|slot| slot.id == id) {
                        available.remove(pos);
                        tracing::debug!(slot = id, "replayed consume");
                    } else {
                        tracing::warn!(slot = id, "consume event for slot not in roster");
                    }
                }
            }
        }
        if !refilled {
            // Legacy or first-run log: anchor it before serving.
            tracing::info!("no refill marker in state log, writing baseline");
            state_log.append(PoolEvent::Refill)?;
        }

        tracing::info!(
            roster = roster.len(),
            available = available.len(),
            "slot pool recovered"
        );
        Ok(Self {
            roster,
            available,
            state_log,
        })
    }

    /// Draw one slot uniformly at random, refilling first if the pool is
    /// exhausted. The refill event is durable before the consume that draws
    /// from the refilled set.
    pub fn draw(&mut self) -> Result<Slot, AllotError> {
        if self.available.is_empty() {
            tracing::info!("pool exhausted, refilling");
            self.state_log.append(PoolEvent::Refill)?;
            self.available = self.roster.clone();
        }

        let idx = rand::rng().random_range(0..self.available.len());
        let id = self.available[idx].id;
        self.state_log.append(PoolEvent::Consume(id))?;
        let slot = self.available.remove(idx);
        tracing::debug!(slot = slot.id, remaining = self.available.len(), "slot drawn");
        Ok(slot)
    }

    /// Number of slots currently available.
    pub fn available(&self) -> usize {
        self.available.len()
    }

    /// Ids of the currently available slots (diagnostics and tests).
    pub fn available_ids(&self) -> Vec<SlotId> {
        self.available.iter().map(|slot| slot.id).collect()
    }

    /// Size of the full roster.
    pub fn roster_len(&self) -> usize {
        self.roster.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(id: SlotId) -> Slot {
        Slot {
            id,
            label: format!("slot-{id}"),
            payload: format!("payload-{id}"),
        }
    }

    fn roster(ids: &[SlotId]) -> Vec<Slot> {
        ids.iter().copied().map(slot).collect()
    }

    #[test]
    fn empty_roster_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let log = StateLog::open(dir.path().join("state.log")).unwrap();
        assert!(matches!(
            SlotPool::recover(Vec::new(), log),
            Err(AllotError::EmptyRoster)
        ));
    }

    #[test]
    fn empty_log_starts_full_and_writes_baseline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.log");
        let log = StateLog::open(&path).unwrap();

        let pool = SlotPool::recover(roster(&[3, 5, 8]), log).unwrap();
        assert_eq!(pool.available(), 3);

        let check = StateLog::open(&path).unwrap();
        assert_eq!(check.replay().unwrap(), vec![PoolEvent::Refill]);
    }

    #[test]
    fn replay_excludes_consumes_after_last_refill() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.log");
        std::fs::write(&path, "5\n8\nREFILL\n3\n").unwrap();

        let log = StateLog::open(&path).unwrap();
        let pool = SlotPool::recover(roster(&[3, 5, 8]), log).unwrap();

        let mut ids = pool.available_ids();
        ids.sort_unstable();
        assert_eq!(ids, vec![5, 8]);
    }

    #[test]
    fn draw_consumes_and_logs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.log");
        let log = StateLog::open(&path).unwrap();
        let mut pool = SlotPool::recover(roster(&[1, 2]), log).unwrap();

        let drawn = pool.draw().unwrap();
        assert_eq!(pool.available(), 1);
        assert!(!pool.available_ids().contains(&drawn.id));

        let check = StateLog::open(&path).unwrap();
        assert_eq!(
            check.replay().unwrap(),
            vec![PoolEvent::Refill, PoolEvent::Consume(drawn.id)]
        );
    }

    #[test]
    fn exhaustion_refills_durably_before_consume() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.log");
        let log = StateLog::open(&path).unwrap();
        let mut pool = SlotPool::recover(roster(&[7]), log).unwrap();

        pool.draw().unwrap();
        let again = pool.draw().unwrap();
        assert_eq!(again.id, 7);

        let check = StateLog::open(&path).unwrap();
        assert_eq!(
            check.replay().unwrap(),
            vec![
                PoolEvent::Refill,
                PoolEvent::Consume(7),
                PoolEvent::Refill,
                PoolEvent::Consume(7)
            ]
        );
    }
}
