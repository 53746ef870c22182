//! CLI command handlers. Each command is in its own file.

mod classify;
mod delays;
mod presets;
mod simulate;

pub use classify::run_classify;
pub use delays::run_delays;
pub use presets::run_presets;
pub use simulate::{run_simulate, SimulateArgs};

#[cfg(test)]
pub(crate) use delays::schedule as delays_schedule;
