//! Gateway client: serialize, POST once, classify.
//!
//! The client never retries on its own. After [`GcmClient::send`], inspect the
//! [`SendResult`]; if it needs a retry, ask [`GcmClient::plan_retry`] for the
//! narrowed message and the delay, wait, and send again with the attempt
//! counter incremented.

use std::fmt;

use crate::classify::{classify_message, Partition};
use crate::config::{GcmConfig, GCM_URL};
use crate::error::GcmError;
use crate::message::Message;
use crate::retry::{Backoff, RetryPlan, RetryPlanner, INITIAL_BACKOFF_MS};
use crate::transport::{CurlTransport, PostRequest, Transport};

/// Failure of a send: either the gateway's verdict or the transport's own error.
#[derive(Debug)]
pub enum SendError<E> {
    /// Gateway rejected the request or replied with something unusable.
    Gateway(GcmError),
    /// Network-level failure from the transport, untouched.
    Transport(E),
}

impl<E: fmt::Display> fmt::Display for SendError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendError::Gateway(e) => write!(f, "{}", e),
            SendError::Transport(e) => write!(f, "transport: {}", e),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for SendError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SendError::Gateway(e) => Some(e),
            SendError::Transport(e) => Some(e),
        }
    }
}

impl<E> From<GcmError> for SendError<E> {
    fn from(e: GcmError) -> Self {
        SendError::Gateway(e)
    }
}

/// Outcome of one send.
#[derive(Debug, Clone, PartialEq)]
pub struct SendResult {
    message: Message,
    partition: Partition,
    retry_after: Option<u64>,
}

impl SendResult {
    pub fn new(message: Message, partition: Partition, retry_after: Option<u64>) -> Self {
        Self {
            message,
            partition,
            retry_after,
        }
    }

    /// The message this result answers.
    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// Server-supplied `Retry-After` in seconds, if usable.
    pub fn retry_after(&self) -> Option<u64> {
        self.retry_after
    }

    pub fn needs_retry(&self) -> bool {
        self.partition.needs_retry()
    }

    /// Message for the retryable recipients, or `None` when nothing is left to retry.
    pub fn retry(&self) -> Result<Option<Message>, GcmError> {
        if !self.needs_retry() {
            return Ok(None);
        }
        self.message
            .narrow(self.partition.unavailable.clone())
            .map(Some)
    }
}

pub struct GcmClient<T: Transport = CurlTransport> {
    api_key: String,
    url: String,
    planner: RetryPlanner,
    transport: T,
}

impl<T: Transport> fmt::Debug for GcmClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GcmClient")
            .field("url", &self.url)
            .field("initial_backoff_ms", &self.planner.backoff().initial_ms())
            .finish()
    }
}

impl GcmClient<CurlTransport> {
    /// Client for the default GCM endpoint with a 1000 ms initial backoff.
    pub fn new(api_key: impl Into<String>) -> Result<Self, GcmError> {
        Self::with_transport(
            api_key,
            GCM_URL,
            Backoff::new(INITIAL_BACKOFF_MS)?,
            CurlTransport::default(),
        )
    }

    /// Client built from config. `api_key` overrides the configured key.
    pub fn from_config(cfg: &GcmConfig, api_key: Option<&str>) -> Result<Self, GcmError> {
        let key = api_key
            .map(str::to_string)
            .or_else(|| cfg.api_key.clone())
            .unwrap_or_default();
        Self::with_transport(
            key,
            cfg.url.clone(),
            Backoff::new(cfg.initial_backoff_ms)?,
            CurlTransport::new(cfg.connect_timeout(), cfg.timeout()),
        )
    }
}

impl<T: Transport> GcmClient<T> {
    pub fn with_transport(
        api_key: impl Into<String>,
        url: impl Into<String>,
        backoff: Backoff,
        transport: T,
    ) -> Result<Self, GcmError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(GcmError::validation("API key is required"));
        }
        Ok(Self {
            api_key,
            url: url.into(),
            planner: RetryPlanner::new(backoff),
            transport,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send `message` once and classify the reply.
    ///
    /// Gateway-level failures come back as [`SendError::Gateway`]; transport
    /// failures as [`SendError::Transport`] holding the transport's error.
    pub fn send(&self, message: &Message) -> Result<SendResult, SendError<T::Error>> {
        let wire = message.serialize();
        let request = PostRequest {
            url: self.url.clone(),
            api_key: self.api_key.clone(),
            content_type: wire.content_type,
            body: wire.body,
        };
        tracing::info!(
            url = %self.url,
            kind = ?message.kind(),
            recipients = message.recipients().len(),
            "sending message"
        );

        let reply = self
            .transport
            .post(&request)
            .map_err(SendError::Transport)?;

        let retry_after = reply.retry_after();
        if let Some(secs) = retry_after {
            tracing::warn!(retry_after = secs, "gateway asked to retry later");
        }
        let partition = classify_message(message, &reply)?;
        Ok(SendResult::new(message.clone(), partition, retry_after))
    }

    /// Plan retry `attempt` (0 for the first retry) for `result`.
    pub fn plan_retry(&mut self, result: &SendResult, attempt: u32) -> Result<RetryPlan, GcmError> {
        self.planner
            .plan(&result.message, &result.partition, result.retry_after, attempt)
    }
}
