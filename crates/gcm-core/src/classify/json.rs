//! JSON (multicast) reply parsing.

use serde_json::Value;

use super::Partition;
use crate::error::GcmError;

/// Pair each `results` entry with the recipient at the same position.
pub(super) fn parse(recipients: &[String], body: &str) -> Result<Partition, GcmError> {
    let data: Value = serde_json::from_str(body)
        .map_err(|e| GcmError::malformed(format!("invalid JSON: {e}")))?;

    let results = match data.get("results") {
        Some(Value::Array(results)) => results,
        _ => return Err(GcmError::malformed("missing results array")),
    };
    if results.len() != recipients.len() {
        return Err(GcmError::malformed(format!(
            "expected {} results, got {}",
            recipients.len(),
            results.len()
        )));
    }

    let mut partition = Partition {
        multicast_id: data.get("multicast_id").and_then(Value::as_i64),
        ..Partition::default()
    };

    for (recipient, result) in recipients.iter().zip(results) {
        if let Some(message_id) = result.get("message_id") {
            partition
                .success
                .insert(recipient.clone(), id_text(recipient, "message_id", message_id)?);
            if let Some(canonical) = result.get("registration_id") {
                partition.canonical.insert(
                    recipient.clone(),
                    id_text(recipient, "registration_id", canonical)?,
                );
            }
            continue;
        }
        match result.get("error").and_then(Value::as_str) {
            Some(code) => partition.record_error(recipient, code),
            None => {
                return Err(GcmError::malformed(format!(
                    "result for {recipient} has neither message_id nor error"
                )))
            }
        }
    }

    Ok(partition)
}

/// Ids must be JSON strings; anything else means the reply cannot be trusted.
fn id_text(recipient: &str, field: &str, value: &Value) -> Result<String, GcmError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(GcmError::malformed(format!(
            "{field} for {recipient} is not a string: {other}"
        ))),
    }
}
