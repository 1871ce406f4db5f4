//! Append-only durable log of completed assignments.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::core::error::AllotError;
use crate::core::ledger::AssignmentRecord;
use crate::infra::codec;

/// Append-only row file holding one [`AssignmentRecord`] per line.
///
/// Row layout: assignment time (RFC 3339), actor id, requester id, requester
/// name, slot id, slot label, slot payload. Rows are never rewritten or
/// deleted; replay order equals append order.
#[derive(Debug)]
pub struct AssignmentLog {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl AssignmentLog {
    /// Open the assignment log at `path`, creating it if missing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AllotError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            path,
        })
    }

    /// Append one record, durable before return.
    pub fn append(&mut self, record: &AssignmentRecord) -> Result<(), AllotError> {
        let row = codec::encode_row(&[
            &record.assigned_at.to_rfc3339(),
            &record.actor_id.to_string(),
            &record.requester_id.to_string(),
            &record.requester_name,
            &record.slot_id.to_string(),
            &record.slot_label,
            &record.slot_payload,
        ]);
        writeln!(self.writer, "{row}")?;
        self.writer.flush()?;
        self.writer.get_ref().sync_data()?;
        Ok(())
    }

    /// Replay every record in append order. Blank lines are skipped; any
    /// malformed row aborts with a corruption error.
    pub fn replay(&self) -> Result<Vec<AssignmentRecord>, AllotError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|source| {
            AllotError::ReadFile {
                path: self.path.display().to_string(),
                source,
            }
        })?;
        let mut records = Vec::new();
        for line in contents.lines() {
            if line.trim().is_empty() {
                continue;
            }
            records.push(self.parse_row(line)?);
        }
        Ok(records)
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse_row(&self, line: &str) -> Result<AssignmentRecord, AllotError> {
        let fields = codec::decode_row(line).map_err(|reason| self.corrupted(reason))?;
        if fields.len() != 7 {
            return Err(self.corrupted(format!("expected 7 fields, got {}", fields.len())));
        }
        let assigned_at = DateTime::parse_from_rfc3339(&fields[0])
            .map_err(|e| self.corrupted(format!("bad timestamp {:?}: {e}", fields[0])))?
            .with_timezone(&Utc);
        Ok(AssignmentRecord {
            assigned_at,
            actor_id: self.parse_id(&fields[1], "actor id")?,
            requester_id: self.parse_id(&fields[2], "requester id")?,
            requester_name: fields[3].clone(),
            slot_id: self.parse_id(&fields[4], "slot id")?,
            slot_label: fields[5].clone(),
            slot_payload: fields[6].clone(),
        })
    }

    fn parse_id(&self, field: &str, what: &str) -> Result<u64, AllotError> {
        field
            .parse::<u64>()
            .map_err(|_| self.corrupted(format!("bad {what} {field:?}")))
    }

    fn corrupted(&self, reason: String) -> AllotError {
        AllotError::Corrupted {
            path: self.path.display().to_string(),
            reason,
        }
    }
}
