//! Loaders for the immutable slot and requester rosters.
//!
//! Both rosters are loaded once at startup and never mutated afterwards.
//! A missing or malformed roster file is a startup precondition failure.

use std::collections::HashMap;
use std::path::Path;

use crate::core::error::AllotError;
use crate::core::pool::Slot;
use crate::core::RequesterId;
use crate::infra::codec;

/// Load the slot roster: rows of `(id, label, payload)`.
pub fn load_slots(path: impl AsRef<Path>) -> Result<Vec<Slot>, AllotError> {
    let path = path.as_ref();
    let contents = read(path)?;
    let mut slots = Vec::new();
    for line in contents.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let fields = codec::decode_row(line).map_err(|reason| corrupted(path, reason))?;
        if fields.len() != 3 {
            return Err(corrupted(
                path,
                format!("expected 3 fields, got {}", fields.len()),
            ));
        }
        let id = fields[0]
            .trim()
            .parse()
            .map_err(|_| corrupted(path, format!("bad slot id {:?}", fields[0])))?;
        slots.push(Slot {
            id,
            label: fields[1].clone(),
            payload: fields[2].clone(),
        });
    }
    tracing::info!(count = slots.len(), path = %path.display(), "loaded slot roster");
    Ok(slots)
}

/// Immutable registry of requesters eligible for an allotment.
#[derive(Debug, Clone)]
pub struct RequesterRegistry {
    names: HashMap<RequesterId, String>,
}

impl RequesterRegistry {
    /// Load the requester roster: rows of `(id, name)`. A duplicated id
    /// keeps the last row seen.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AllotError> {
        let path = path.as_ref();
        let contents = read(path)?;
        let mut names = HashMap::new();
        for line in contents.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let fields = codec::decode_row(line).map_err(|reason| corrupted(path, reason))?;
            if fields.len() != 2 {
                return Err(corrupted(
                    path,
                    format!("expected 2 fields, got {}", fields.len()),
                ));
            }
            let id = fields[0]
                .trim()
                .parse()
                .map_err(|_| corrupted(path, format!("bad requester id {:?}", fields[0])))?;
            names.insert(id, fields[1].clone());
        }
        tracing::info!(count = names.len(), path = %path.display(), "loaded requester roster");
        Ok(Self { names })
    }

    /// Build a registry directly from entries (tests and embedders).
    pub fn from_entries(entries: impl IntoIterator<Item = (RequesterId, String)>) -> Self {
        Self {
            names: entries.into_iter().collect(),
        }
    }

    /// Registered display name for `id`, if any.
    pub fn name_of(&self, id: RequesterId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    /// Number of registered requesters.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the registry has no entries.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn read(path: &Path) -> Result<String, AllotError> {
    std::fs::read_to_string(path).map_err(|source| AllotError::ReadFile {
        path: path.display().to_string(),
        source,
    })
}

fn corrupted(path: &Path, reason: String) -> AllotError {
    AllotError::Corrupted {
        path: path.display().to_string(),
        reason,
    }
}
