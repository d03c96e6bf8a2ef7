//! Plain-text (unicast) reply parsing.
//!
//! ```text
//! id=1:2342
//! registration_id=32
//! ```
//! or `Error=<code>`.

use super::Partition;
use crate::error::GcmError;

pub(super) fn parse(recipient: &str, body: &str) -> Result<Partition, GcmError> {
    let mut partition = Partition::default();
    let mut lines = body.trim().split('\n').map(str::trim);
    let first = lines.next().unwrap_or_default();

    if let Some(code) = first.strip_prefix("Error=") {
        // Transient failures arrive as HTTP 5xx for this form, not as an error code.
        let code = code.trim();
        if code == super::NOT_REGISTERED {
            partition.not_registered.push(recipient.to_string());
        } else {
            partition.failed.insert(recipient.to_string(), code.to_string());
        }
    } else if let Some(message_id) = first.strip_prefix("id=") {
        partition
            .success
            .insert(recipient.to_string(), message_id.trim().to_string());
        if let Some(second) = lines.next() {
            match second.strip_prefix("registration_id=") {
                Some(canonical) => {
                    partition
                        .canonical
                        .insert(recipient.to_string(), canonical.to_string());
                }
                None => {
                    return Err(GcmError::malformed(format!(
                        "cannot parse second line of response body: {second}"
                    )))
                }
            }
        }
    } else {
        return Err(GcmError::malformed(format!(
            "cannot parse response body: {body}"
        )));
    }

    Ok(partition)
}
