//! Input boundary: turns a reporting API response body into records.

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{InsightsError, InsightsResult};
use crate::types::CampaignRecord;

/// Parse a response body. Accepts a bare array of rows or the `{"data": [...]}`
/// envelope. Rows that are not objects or carry an invalid date are dropped.
pub fn parse_records(body: &str) -> InsightsResult<Vec<CampaignRecord>> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| InsightsError::InvalidResponse(e.to_string()))?;

    let rows = match value {
        Value::Array(rows) => rows,
        Value::Object(mut envelope) => match envelope.remove("data") {
            Some(Value::Array(rows)) => rows,
            Some(Value::Null) => Vec::new(),
            Some(other) => {
                return Err(InsightsError::InvalidResponse(format!(
                    "`data` must be an array, got {}",
                    json_kind(&other)
                )))
            }
            None => {
                return Err(InsightsError::InvalidResponse(
                    "response object has no `data` field".into(),
                ))
            }
        },
        other => {
            return Err(InsightsError::InvalidResponse(format!(
                "expected an array or object, got {}",
                json_kind(&other)
            )))
        }
    };

    let total = rows.len();
    let records: Vec<CampaignRecord> = rows
        .into_iter()
        .enumerate()
        .filter_map(|(index, row)| match serde_json::from_value::<CampaignRecord>(row) {
            Ok(record) if record.parsed_date().is_some() => Some(record),
            Ok(record) => {
                warn!(index, date = %record.date, "Dropping row with invalid date");
                metrics::counter!("response.rows_dropped").increment(1);
                None
            }
            Err(e) => {
                warn!(index, error = %e, "Dropping malformed row");
                metrics::counter!("response.rows_dropped").increment(1);
                None
            }
        })
        .collect();

    debug!(total, kept = records.len(), "Parsed reporting response");
    Ok(records)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
