use std::time::Duration;

use super::Backoff;
use crate::classify::Partition;
use crate::error::GcmError;
use crate::message::Message;

/// What to do after a send.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPlan {
    /// Follow-up message for the retryable recipients, if any.
    pub message: Option<Message>,
    /// Seconds to wait before sending `message`.
    pub delay_secs: f64,
}

impl RetryPlan {
    pub fn needs_retry(&self) -> bool {
        self.message.is_some()
    }

    /// `delay_secs` as a `Duration`.
    pub fn delay(&self) -> Duration {
        Duration::from_secs_f64(self.delay_secs.max(0.0))
    }
}

/// Builds retry plans from a partition and the client's backoff state.
#[derive(Debug, Clone)]
pub struct RetryPlanner {
    backoff: Backoff,
}

impl RetryPlanner {
    pub fn new(backoff: Backoff) -> Self {
        Self { backoff }
    }

    pub fn backoff(&self) -> &Backoff {
        &self.backoff
    }

    /// Wait before retry `attempt` (0 for the first retry).
    ///
    /// A usable `Retry-After` (whole seconds, at least 1) wins over the
    /// computed backoff for every attempt that still sees it.
    pub fn delay_secs(&mut self, retry_after: Option<u64>, attempt: u32) -> f64 {
        match retry_after.filter(|secs| *secs >= 1) {
            Some(secs) => secs as f64,
            None => self.backoff.delay_secs(attempt),
        }
    }

    /// Plan the follow-up to `message` given its classified outcome.
    pub fn plan(
        &mut self,
        message: &Message,
        partition: &Partition,
        retry_after: Option<u64>,
        attempt: u32,
    ) -> Result<RetryPlan, GcmError> {
        let retry_message = if partition.needs_retry() {
            Some(message.narrow(partition.unavailable.clone())?)
        } else {
            None
        };
        let delay_secs = self.delay_secs(retry_after, attempt);
        if retry_message.is_some() {
            tracing::debug!(
                retryable = partition.unavailable.len(),
                attempt,
                delay_secs,
                "retry planned"
            );
        }
        Ok(RetryPlan {
            message: retry_message,
            delay_secs,
        })
    }
}
