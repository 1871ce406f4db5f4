//! Append-only durable log of pool consume/refill events.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::core::error::AllotError;
use crate::core::SlotId;

const REFILL_TOKEN: &str = "REFILL";

/// One durable pool state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolEvent {
    /// A slot left the available set.
    Consume(SlotId),
    /// The available set was reset to the full roster.
    Refill,
}

/// Append-only line file backing the pool state.
///
/// One token per line: a slot id for a consume, the literal `REFILL` for a
/// refill. The in-memory pool is a cache over this file; replay order equals
/// append order. Every append is flushed and synced before it is considered
/// written.
#[derive(Debug)]
pub struct StateLog {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl StateLog {
    /// Open the state log at `path`, creating it if missing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AllotError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            path,
        })
    }

    /// Append one event, durable before return.
    pub fn append(&mut self, event: PoolEvent) -> Result<(), AllotError> {
        match event {
            PoolEvent::Consume(id) => writeln!(self.writer, "{id}")?,
            PoolEvent::Refill => writeln!(self.writer, "{REFILL_TOKEN}")?,
        }
        self.writer.flush()?;
        self.writer.get_ref().sync_data()?;
        Ok(())
    }

    /// Replay every event in append order. Blank lines are skipped; any
    /// other unrecognized token aborts with a corruption error.
    pub fn replay(&self) -> Result<Vec<PoolEvent>, AllotError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|source| {
            AllotError::ReadFile {
                path: self.path.display().to_string(),
                source,
            }
        })?;
        let mut events = Vec::new();
        for line in contents.lines() {
            let token = line.trim();
            if token.is_empty() {
                continue;
            }
            if token == REFILL_TOKEN {
                events.push(PoolEvent::Refill);
            } else {
                let id = token.parse::<SlotId>().map_err(|_| AllotError::Corrupted {
                    path: self.path.display().to_string(),
                    reason: format!("unrecognized token {token:?}"),
                })?;
                events.push(PoolEvent::Consume(id));
            }
        }
        Ok(events)
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
