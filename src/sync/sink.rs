//! Reporting sink contract and the HTTP sheet client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::error::AllotError;
use crate::core::ledger::AssignmentRecord;

/// One row in the sheet endpoint's wire format.
///
/// Field names follow the sheet's column contract, which keeps the
/// mentor/mentee vocabulary of the program this engine serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    /// Assignment time, RFC 3339.
    pub time: String,
    /// Requester id column.
    pub mentee_std_id: u64,
    /// Requester name column.
    pub mentee_name: String,
    /// Slot id column.
    pub mentor_std_id: u64,
    /// Slot label column.
    pub mentor_name: String,
    /// Slot payload column.
    pub message: String,
}

impl From<&AssignmentRecord> for ReportRow {
    fn from(record: &AssignmentRecord) -> Self {
        Self {
            time: record.assigned_at.to_rfc3339(),
            mentee_std_id: record.requester_id,
            mentee_name: record.requester_name.clone(),
            mentor_std_id: record.slot_id,
            mentor_name: record.slot_label.clone(),
            message: record.slot_payload.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SinkResponse {
    status: String,
}

/// Destination for batched assignment reports.
///
/// An `Err` from [`ReportSink::deliver`] means the whole batch must be
/// retried; partial acceptance is not part of the contract.
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Deliver one batch.
    async fn deliver(&self, batch: &[AssignmentRecord]) -> Result<(), AllotError>;
}

/// HTTP client for the sheet reporting endpoint.
pub struct SheetSink {
    client: reqwest::Client,
    url: String,
}

impl SheetSink {
    /// Create a client for the sheet endpoint at `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    /// Startup health check: GET the base URL and require `status == "ok"`.
    ///
    /// A failure here must abort bootstrap before any claims are served.
    pub async fn preflight(&self) -> Result<(), AllotError> {
        let response = self.client.get(self.url.as_str()).send().await?;
        if !response.status().is_success() {
            return Err(AllotError::SinkRejected(format!(
                "http {}",
                response.status()
            )));
        }
        let body: SinkResponse = response.json().await?;
        if body.status != "ok" {
            return Err(AllotError::SinkRejected(body.status));
        }
        tracing::info!(url = %self.url, "report sink preflight ok");
        Ok(())
    }
}

#[async_trait]
impl ReportSink for SheetSink {
    async fn deliver(&self, batch: &[AssignmentRecord]) -> Result<(), AllotError> {
        let rows: Vec<ReportRow> = batch.iter().map(ReportRow::from).collect();
        let response = self.client.post(self.url.as_str()).json(&rows).send().await?;
        if !response.status().is_success() {
            return Err(AllotError::SinkRejected(format!(
                "http {}",
                response.status()
            )));
        }
        let body: SinkResponse = response.json().await?;
        if body.status != "ok" {
            return Err(AllotError::SinkRejected(body.status));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;

    #[test]
    fn report_row_maps_ledger_fields_to_sheet_columns() {
        let record = AssignmentRecord {
            assigned_at: Utc.with_ymd_and_hms(2026, 8, 5, 12, 0, 0).unwrap(),
            actor_id: 9001,
            requester_id: 100,
            requester_name: "Jane Doe".to_string(),
            slot_id: 42,
            slot_label: "Mentor A".to_string(),
            slot_payload: "secret word".to_string(),
        };

        let row = ReportRow::from(&record);
        assert_eq!(row.mentee_std_id, 100);
        assert_eq!(row.mentee_name, "Jane Doe");
        assert_eq!(row.mentor_std_id, 42);
        assert_eq!(row.mentor_name, "Mentor A");
        assert_eq!(row.message, "secret word");

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["time"], "2026-08-05T12:00:00+00:00");
        assert_eq!(json["mentee_std_id"], 100);
        assert_eq!(json["message"], "secret word");
    }
}
