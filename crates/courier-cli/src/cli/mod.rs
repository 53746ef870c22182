//! CLI for inspecting and exercising Courier retry policies.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use courier_core::config::{self, PresetName};

use commands::{run_classify, run_delays, run_presets, run_simulate, SimulateArgs};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "courier")]
#[command(about = "Courier: retry policies for mail sends and template renders", long_about = None)]
pub struct Cli {
    /// Log to stderr instead of the state log file.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Show the configured retry presets.
    Presets,

    /// Print the backoff schedule of a preset (jitter disabled).
    Delays {
        /// Preset to inspect: send, render or connection.
        #[arg(long, default_value = "send")]
        preset: PresetName,
        /// Number of attempts to plan for (defaults to the preset's max_attempts).
        #[arg(long, value_name = "N")]
        attempts: Option<u32>,
    },

    /// Classify an error message and report whether it would be retried.
    Classify {
        /// Error message as reported by the transport.
        message: String,
    },

    /// Run the retry executor against an operation that fails N times, then succeeds.
    Simulate {
        /// Preset to run under: send, render or connection.
        #[arg(long, default_value = "send")]
        preset: PresetName,
        /// Number of leading attempts that fail.
        #[arg(long, default_value = "1", value_name = "N")]
        failures: u32,
        /// Message carried by each simulated failure.
        #[arg(long, default_value = "connect ETIMEDOUT")]
        message: String,
        /// Fail with a classified send failure instead of a raw error.
        #[arg(long)]
        classified: bool,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    pub async fn run(self) -> Result<()> {
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match self.command {
            CliCommand::Presets => run_presets(&cfg)?,
            CliCommand::Delays { preset, attempts } => run_delays(&cfg, preset, attempts)?,
            CliCommand::Classify { message } => run_classify(&message),
            CliCommand::Simulate {
                preset,
                failures,
                message,
                classified,
            } => {
                run_simulate(
                    &cfg,
                    SimulateArgs {
                        preset,
                        failures,
                        message,
                        classified,
                    },
                )
                .await?
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
