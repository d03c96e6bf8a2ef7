use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::GcmError;

/// Default starting backoff window in milliseconds.
pub const INITIAL_BACKOFF_MS: u64 = 1000;

/// `1 << attempt` is capped here so the window cannot overflow.
const MAX_SHIFT: u32 = 40;

/// Exponential backoff with jitter over an owned random generator.
///
/// For retry attempt `n` (0-based) the delay in milliseconds is
/// `(initial << n) - (initial >> 1) + jitter`, jitter uniform in `[0, initial)`.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial_ms: i64,
    rng: StdRng,
}

impl Backoff {
    /// Backoff seeded from OS entropy.
    pub fn new(initial_ms: u64) -> Result<Self, GcmError> {
        Ok(Self {
            initial_ms: check_initial(initial_ms)?,
            rng: StdRng::from_entropy(),
        })
    }

    /// Deterministic backoff for tests and reproducible schedules.
    pub fn with_seed(initial_ms: u64, seed: u64) -> Result<Self, GcmError> {
        Ok(Self {
            initial_ms: check_initial(initial_ms)?,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn initial_ms(&self) -> u64 {
        self.initial_ms as u64
    }

    /// Lower bound of the window for `attempt`, in milliseconds.
    pub fn base_ms(&self, attempt: u32) -> i64 {
        let factor = 1i64 << attempt.min(MAX_SHIFT);
        self.initial_ms
            .saturating_mul(factor)
            .saturating_sub(self.initial_ms >> 1)
    }

    /// Delay in seconds for `attempt`, jitter included.
    pub fn delay_secs(&mut self, attempt: u32) -> f64 {
        let jitter = self.rng.gen_range(0..self.initial_ms);
        self.base_ms(attempt).saturating_add(jitter) as f64 / 1000.0
    }
}

fn check_initial(initial_ms: u64) -> Result<i64, GcmError> {
    if initial_ms == 0 {
        return Err(GcmError::validation("initial backoff must be at least 1 ms"));
    }
    i64::try_from(initial_ms)
        .ok()
        .filter(|ms| *ms <= i64::MAX >> MAX_SHIFT)
        .ok_or_else(|| GcmError::validation(format!("initial backoff {initial_ms} ms is too large")))
}
