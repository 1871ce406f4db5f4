//! Error types for the allotment engine.

use thiserror::Error;

/// Errors produced by the allotment engine.
#[derive(Debug, Error)]
pub enum AllotError {
    /// Claim identifier did not parse as a decimal id.
    #[error("malformed identifier: {0:?}")]
    MalformedIdentifier(String),
    /// Claim display name was blank after trimming.
    #[error("blank display name")]
    BlankName,
    /// Identifier is not present in the requester registry.
    #[error("unknown requester {0}")]
    UnknownRequester(u64),
    /// Supplied display name does not match the registered name.
    #[error("name mismatch for requester {0}")]
    NameMismatch(u64),
    /// Ledger reported a key as present but returned no record for it.
    #[error("ledger inconsistency for requester {0}")]
    LedgerInconsistency(u64),
    /// The slot roster is empty; the pool cannot operate.
    #[error("slot roster is empty")]
    EmptyRoster,
    /// A persisted log or roster file failed to parse.
    #[error("corrupted file {path}: {reason}")]
    Corrupted {
        /// Path of the offending file.
        path: String,
        /// What failed to parse.
        reason: String,
    },
    /// A persisted file could not be read.
    #[error("failed to read {path}: {source}")]
    ReadFile {
        /// Path of the unreadable file.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The reporting sink answered with a non-ok status.
    #[error("report sink rejected batch: {0}")]
    SinkRejected(String),
    /// Transport-level failure talking to the reporting sink.
    #[error("report sink transport error: {0}")]
    SinkTransport(#[from] reqwest::Error),
    /// Required configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),
    /// Underlying filesystem failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AllotError {
    /// True for rejections caused by the claim itself; a front-end reports
    /// these back to the requester verbatim.
    pub fn is_claim_rejection(&self) -> bool {
        matches!(
            self,
            Self::MalformedIdentifier(_)
                | Self::BlankName
                | Self::UnknownRequester(_)
                | Self::NameMismatch(_)
        )
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
