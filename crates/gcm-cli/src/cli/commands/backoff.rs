//! `gcm backoff` – print the retry delay schedule.

use anyhow::Result;
use gcm_core::config::GcmConfig;
use gcm_core::retry::Backoff;

pub fn run_backoff(
    cfg: &GcmConfig,
    initial_ms: Option<u64>,
    attempts: u32,
    seed: Option<u64>,
) -> Result<()> {
    let initial_ms = initial_ms.unwrap_or(cfg.initial_backoff_ms);
    let mut backoff = match seed {
        Some(seed) => Backoff::with_seed(initial_ms, seed)?,
        None => Backoff::new(initial_ms)?,
    };

    println!("{:<8} {:<12} {}", "ATTEMPT", "WINDOW(s)", "DELAY(s)");
    for attempt in 0..attempts {
        let lo = backoff.base_ms(attempt) as f64 / 1000.0;
        let hi = lo + initial_ms as f64 / 1000.0;
        let delay = backoff.delay_secs(attempt);
        println!(
            "{:<8} {:<12} {:.3}",
            attempt,
            format!("{lo:.3}-{hi:.3}"),
            delay
        );
    }
    Ok(())
}
