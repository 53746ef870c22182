//! `courier presets` – show the configured retry presets.

use anyhow::Result;
use courier_core::config::{CourierConfig, PresetName};

pub fn run_presets(cfg: &CourierConfig) -> Result<()> {
    println!(
        "  {:<10}  {:>8}  {:>10}  {:>10}  {:>10}  {:>6}",
        "Preset", "Attempts", "Initial", "Max", "Multiplier", "Jitter"
    );
    println!(
        "  {}  {}  {}  {}  {}  {}",
        "----------", "--------", "----------", "----------", "----------", "------"
    );
    for name in PresetName::ALL {
        let rc = cfg.retry.get(name);
        // Surface invalid presets here rather than at first use.
        rc.to_policy()?;
        println!(
            "  {:<10}  {:>8}  {:>8}ms  {:>8}ms  {:>10.2}  {:>6}",
            name, rc.max_attempts, rc.initial_delay_ms, rc.max_delay_ms, rc.backoff_multiplier, rc.jitter
        );
    }
    Ok(())
}
