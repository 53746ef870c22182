//! `courier simulate` – drive the retry executor with a scripted operation.

use anyhow::{Context, Result};
use courier_core::config::{CourierConfig, PresetName};
use courier_core::retry::{ErrorContext, Failure, MailError, RetryExecutor};
use serde_json::json;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct SimulateArgs {
    pub preset: PresetName,
    pub failures: u32,
    pub message: String,
    pub classified: bool,
}

pub async fn run_simulate(cfg: &CourierConfig, args: SimulateArgs) -> Result<()> {
    let policy = cfg.retry.policy(args.preset)?;
    let executor = RetryExecutor::default();

    let mut context = ErrorContext::new();
    context.insert("preset".into(), json!(args.preset.as_str()));
    context.insert("simulated".into(), json!(true));

    let calls = Arc::new(AtomicU32::new(0));
    let outcome = executor
        .execute_with_context(&policy, context.clone(), || {
            let calls = Arc::clone(&calls);
            let message = args.message.clone();
            let classified = args.classified;
            let failures = args.failures;
            async move {
                let attempt = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt > failures {
                    return Ok(attempt);
                }
                if classified {
                    Err(Failure::from(MailError::send_failure(message)))
                } else {
                    Err(Failure::raw(message))
                }
            }
        })
        .await;

    let invoked = calls.load(Ordering::SeqCst);
    match outcome {
        Ok(attempt) => {
            println!("succeeded on attempt {} ({} invocations)", attempt, invoked);
            Ok(())
        }
        Err(failure) => {
            executor.logger().error(
                "simulated operation failed",
                &context,
                Some(&failure as &(dyn std::error::Error + 'static)),
            );
            println!("failed after {} invocations: {}", invoked, failure);
            if let Some(err) = failure.as_classified() {
                println!("category: {}", err.category());
                let rendered = serde_json::to_string_pretty(err.context())
                    .context("rendering error context")?;
                println!("context: {}", rendered);
            }
            Err(failure).context("simulated operation did not succeed")
        }
    }
}
