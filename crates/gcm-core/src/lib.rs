pub mod config;
pub mod logging;

pub mod classify;
pub mod client;
pub mod error;
pub mod message;
pub mod retry;
pub mod transport;

pub use classify::{classify, classify_message, Partition};
pub use client::{GcmClient, SendError, SendResult};
pub use error::GcmError;
pub use message::{Message, MessageKind, Notification, Options, WireBody};
pub use retry::{Backoff, RetryPlan, RetryPlanner};
pub use transport::{CurlTransport, PostRequest, RawReply, Transport};
