//! Retry planning and backoff.
//!
//! This module decides whether a send needs a follow-up request, narrows
//! the message to the retryable recipients, and computes how long to wait.
//! It never sleeps or re-sends; the caller owns the loop and the attempt
//! counter.

mod backoff;
mod policy;

pub use backoff::{Backoff, INITIAL_BACKOFF_MS};
pub use policy::{RetryPlan, RetryPlanner};
