//! Classify a gateway reply into per-recipient outcome buckets.
//!
//! Every recipient of the request lands in exactly one bucket of the
//! [`Partition`]. Whole-request transient failures (HTTP 5xx) put every
//! recipient in `unavailable` without looking at the body.

mod json;
mod plain;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::GcmError;
use crate::message::{Message, MessageKind};
use crate::transport::RawReply;

/// Per-error codes the gateway reports for transient per-recipient failures.
pub const RETRYABLE_ERRORS: [&str; 2] = ["Unavailable", "InternalServerError"];
pub const NOT_REGISTERED: &str = "NotRegistered";

/// Outcome of one send, keyed by recipient.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Partition {
    /// Gateway-assigned id of a multicast request, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multicast_id: Option<i64>,
    /// recipient -> message id.
    pub success: BTreeMap<String, String>,
    /// recipient -> replacement id to persist. Subset of `success` keys.
    pub canonical: BTreeMap<String, String>,
    /// Permanently invalid recipients; delete them.
    pub not_registered: Vec<String>,
    /// Transient failures, eligible for retry. Kept in send order.
    pub unavailable: Vec<String>,
    /// recipient -> error code for non-retryable failures.
    pub failed: BTreeMap<String, String>,
}

impl Partition {
    /// Partition for a whole-request transient failure.
    pub fn all_unavailable(recipients: &[String]) -> Self {
        Partition {
            unavailable: recipients.to_vec(),
            ..Partition::default()
        }
    }

    pub fn needs_retry(&self) -> bool {
        !self.unavailable.is_empty()
    }

    /// Route a per-recipient error code to its bucket.
    fn record_error(&mut self, recipient: &str, code: &str) {
        if RETRYABLE_ERRORS.contains(&code) {
            self.unavailable.push(recipient.to_string());
        } else if code == NOT_REGISTERED {
            self.not_registered.push(recipient.to_string());
        } else {
            self.failed.insert(recipient.to_string(), code.to_string());
        }
    }
}

/// Classify `reply` for a request of `kind` sent to `recipients`.
pub fn classify(
    kind: MessageKind,
    recipients: &[String],
    reply: &RawReply,
) -> Result<Partition, GcmError> {
    match reply.status {
        200 => {}
        400 => return Err(GcmError::RequestRejected(reply.body.clone())),
        401 => return Err(GcmError::Authentication),
        500..=599 => {
            tracing::warn!(
                status = reply.status,
                recipients = recipients.len(),
                "gateway transient failure, all recipients retryable"
            );
            return Ok(Partition::all_unavailable(recipients));
        }
        other => return Err(GcmError::UnknownStatus(other)),
    }

    let partition = match kind {
        MessageKind::Multicast => json::parse(recipients, &reply.body)?,
        MessageKind::Unicast => {
            let recipient = match recipients {
                [one] => one,
                _ => {
                    return Err(GcmError::validation(format!(
                        "plain-text messages are unicast, got {} recipients",
                        recipients.len()
                    )))
                }
            };
            plain::parse(recipient, &reply.body)?
        }
    };

    tracing::debug!(
        success = partition.success.len(),
        canonical = partition.canonical.len(),
        not_registered = partition.not_registered.len(),
        unavailable = partition.unavailable.len(),
        failed = partition.failed.len(),
        "classified gateway reply"
    );
    Ok(partition)
}

/// Classify the reply to `message`.
pub fn classify_message(message: &Message, reply: &RawReply) -> Result<Partition, GcmError> {
    classify(message.kind(), message.recipients(), reply)
}
