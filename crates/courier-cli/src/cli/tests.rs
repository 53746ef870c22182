use super::*;
use courier_core::retry::RetryPolicy;
use std::time::Duration;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

#[test]
fn cli_parse_presets() {
    match parse(&["courier", "presets"]).command {
        CliCommand::Presets => {}
        _ => panic!("expected Presets"),
    }
}

#[test]
fn cli_parse_delays_defaults() {
    match parse(&["courier", "delays"]).command {
        CliCommand::Delays { preset, attempts } => {
            assert_eq!(preset, PresetName::Send);
            assert!(attempts.is_none());
        }
        _ => panic!("expected Delays"),
    }
}

#[test]
fn cli_parse_delays_with_preset_and_attempts() {
    match parse(&["courier", "delays", "--preset", "connection", "--attempts", "7"]).command {
        CliCommand::Delays { preset, attempts } => {
            assert_eq!(preset, PresetName::Connection);
            assert_eq!(attempts, Some(7));
        }
        _ => panic!("expected Delays"),
    }
}

#[test]
fn cli_rejects_unknown_preset() {
    assert!(Cli::try_parse_from(["courier", "delays", "--preset", "bulk"]).is_err());
}

#[test]
fn cli_parse_classify() {
    match parse(&["courier", "classify", "connect ETIMEDOUT"]).command {
        CliCommand::Classify { message } => assert_eq!(message, "connect ETIMEDOUT"),
        _ => panic!("expected Classify"),
    }
}

#[test]
fn cli_parse_simulate() {
    let cli = parse(&[
        "courier",
        "simulate",
        "--preset",
        "render",
        "--failures",
        "3",
        "--message",
        "auth failed",
        "--classified",
        "-v",
    ]);
    assert!(cli.verbose);
    match cli.command {
        CliCommand::Simulate {
            preset,
            failures,
            message,
            classified,
        } => {
            assert_eq!(preset, PresetName::Render);
            assert_eq!(failures, 3);
            assert_eq!(message, "auth failed");
            assert!(classified);
        }
        _ => panic!("expected Simulate"),
    }
}

#[test]
fn cli_parse_simulate_defaults() {
    match parse(&["courier", "simulate"]).command {
        CliCommand::Simulate {
            preset,
            failures,
            message,
            classified,
        } => {
            assert_eq!(preset, PresetName::Send);
            assert_eq!(failures, 1);
            assert_eq!(message, "connect ETIMEDOUT");
            assert!(!classified);
        }
        _ => panic!("expected Simulate"),
    }
}

#[test]
fn delay_schedule_ignores_jitter() {
    let policy = RetryPolicy {
        max_attempts: 4,
        initial_delay: Duration::from_millis(250),
        max_delay: Duration::from_secs(1),
        backoff_multiplier: 2.0,
        jitter: true,
    };
    let delays = commands::delays_schedule(&policy, 4);
    assert_eq!(
        delays,
        vec![
            Duration::from_millis(250),
            Duration::from_millis(500),
            Duration::from_millis(1000)
        ]
    );
}
