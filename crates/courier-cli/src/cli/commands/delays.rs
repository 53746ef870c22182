//! `courier delays` – print a preset's backoff schedule.

use anyhow::Result;
use courier_core::config::{CourierConfig, PresetName};
use courier_core::retry::{self, RetryPolicy};
use std::time::Duration;

/// Delays before attempts 2..=attempts, jitter disabled.
pub(crate) fn schedule(policy: &RetryPolicy, attempts: u32) -> Vec<Duration> {
    let policy = RetryPolicy {
        jitter: false,
        ..policy.clone()
    };
    (1..attempts)
        .map(|attempt| retry::compute_delay(attempt, &policy))
        .collect()
}

pub fn run_delays(cfg: &CourierConfig, preset: PresetName, attempts: Option<u32>) -> Result<()> {
    let policy = cfg.retry.policy(preset)?;
    let attempts = attempts.unwrap_or(policy.max_attempts);
    let delays = schedule(&policy, attempts);

    println!("Preset {} ({} attempts):", preset, attempts);
    println!("  attempt 1: immediately");
    let mut total = Duration::ZERO;
    for (i, delay) in delays.iter().enumerate() {
        total += *delay;
        println!(
            "  attempt {}: after {}ms (elapsed {}ms)",
            i + 2,
            delay.as_millis(),
            total.as_millis()
        );
    }
    if policy.jitter {
        println!("  (jitter enabled: each delay varies by up to ±10%)");
    }
    Ok(())
}
