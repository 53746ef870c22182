use rand::Rng;
use std::time::Duration;

/// Share of the capped delay used as the jitter range, in each direction.
const JITTER_FRACTION: f64 = 0.10;

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry this failure.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Exponential backoff policy with a cap and optional ±10% jitter.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_delay: Duration,
    /// Upper bound on the delay after multiplier growth.
    pub max_delay: Duration,
    /// Growth factor applied per attempt.
    pub backoff_multiplier: f64,
    /// Perturb each delay by up to ±10%.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::email_send()
    }
}

impl RetryPolicy {
    /// Preset for network sends.
    pub fn email_send() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }

    /// Preset for template rendering: few attempts, short fixed schedule.
    pub fn template_render() -> Self {
        Self {
            max_attempts: 2,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(1),
            backoff_multiplier: 2.0,
            jitter: false,
        }
    }

    /// Preset for connection checks: more attempts, longer ceiling.
    pub fn connection_check() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }

    /// Decide what to do after attempt `attempt` (1-based) failed.
    pub fn decide(&self, attempt: u32, retryable: bool) -> RetryDecision {
        if attempt >= self.max_attempts || !retryable {
            return RetryDecision::NoRetry;
        }
        RetryDecision::RetryAfter(compute_delay(attempt, self))
    }
}

/// Delay to wait after attempt `attempt` (1-based) before the next one.
pub fn compute_delay(attempt: u32, policy: &RetryPolicy) -> Duration {
    compute_delay_with(attempt, policy, &mut rand::thread_rng())
}

/// [`compute_delay`] with a caller-supplied random source.
///
/// `initial * multiplier^(attempt - 1)`, capped at `max_delay`, then jittered by
/// up to ±10% of the capped value, rounded to whole milliseconds and clamped at
/// zero. Jitter applies after the cap, so a jittered delay may exceed `max_delay`.
pub fn compute_delay_with<R: Rng>(
    attempt: u32,
    policy: &RetryPolicy,
    rng: &mut R,
) -> Duration {
    let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
    let initial = policy.initial_delay.as_millis() as f64;
    // 0 * inf is NaN once the multiplier overflows; a zero base stays zero.
    let raw = if initial == 0.0 {
        0.0
    } else {
        initial * policy.backoff_multiplier.powi(exponent)
    };
    let mut delay = raw.min(policy.max_delay.as_millis() as f64);

    if policy.jitter {
        let range = delay * JITTER_FRACTION;
        if range > 0.0 {
            delay += rng.gen_range(-range..=range);
        }
    }

    let millis = delay.round().max(0.0);
    Duration::from_millis(millis as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fixed(initial_ms: u64, max_ms: u64, multiplier: f64) -> RetryPolicy {
        RetryPolicy {
            max_attempts: 10,
            initial_delay: Duration::from_millis(initial_ms),
            max_delay: Duration::from_millis(max_ms),
            backoff_multiplier: multiplier,
            jitter: false,
        }
    }

    #[test]
    fn first_delay_equals_initial_delay() {
        let p = fixed(100, 1000, 2.0);
        assert_eq!(compute_delay(1, &p), Duration::from_millis(100));
    }

    #[test]
    fn exponential_backoff_grows_and_is_capped() {
        let p = fixed(100, 1000, 2.0);
        let delays: Vec<u128> = (1..=6).map(|k| compute_delay(k, &p).as_millis()).collect();
        assert_eq!(delays, vec![100, 200, 400, 800, 1000, 1000]);
    }

    #[test]
    fn fractional_multiplier_rounds_to_millis() {
        let p = fixed(100, 10_000, 1.5);
        assert_eq!(compute_delay(2, &p), Duration::from_millis(150));
        assert_eq!(compute_delay(3, &p), Duration::from_millis(225));
        // 337.5 rounds half away from zero.
        assert_eq!(compute_delay(4, &p), Duration::from_millis(338));
    }

    #[test]
    fn huge_attempt_numbers_saturate_at_cap() {
        let p = fixed(100, 5000, 2.0);
        assert_eq!(compute_delay(u32::MAX, &p), Duration::from_millis(5000));
    }

    #[test]
    fn zero_initial_delay_stays_zero_after_multiplier_overflow() {
        let p = fixed(0, 5000, 2.0);
        assert_eq!(compute_delay(1100, &p), Duration::ZERO);
        assert_eq!(compute_delay(u32::MAX, &p), Duration::ZERO);
        let p = fixed(0, 5000, 1e10);
        assert_eq!(compute_delay(40, &p), Duration::ZERO);
    }

    #[test]
    fn jitter_stays_within_ten_percent() {
        let mut p = fixed(1000, 4000, 2.0);
        p.jitter = true;
        let mut rng = StdRng::seed_from_u64(7);
        for attempt in 1..=5 {
            let base = compute_delay(attempt, &fixed(1000, 4000, 2.0)).as_millis() as f64;
            for _ in 0..200 {
                let d = compute_delay_with(attempt, &p, &mut rng).as_millis() as f64;
                assert!(d >= (base * 0.9).floor() && d <= (base * 1.1).ceil(), "{d} vs {base}");
            }
        }
    }

    #[test]
    fn jitter_on_zero_delay_is_zero() {
        let mut p = fixed(0, 0, 2.0);
        p.jitter = true;
        assert_eq!(compute_delay(3, &p), Duration::ZERO);
    }

    #[test]
    fn decide_respects_max_attempts_and_retryability() {
        let p = RetryPolicy {
            max_attempts: 3,
            ..fixed(100, 1000, 2.0)
        };
        assert_eq!(
            p.decide(1, true),
            RetryDecision::RetryAfter(Duration::from_millis(100))
        );
        assert_eq!(
            p.decide(2, true),
            RetryDecision::RetryAfter(Duration::from_millis(200))
        );
        assert_eq!(p.decide(3, true), RetryDecision::NoRetry);
        assert_eq!(p.decide(1, false), RetryDecision::NoRetry);
    }

    #[test]
    fn presets_have_expected_shape() {
        let send = RetryPolicy::email_send();
        let render = RetryPolicy::template_render();
        let connection = RetryPolicy::connection_check();
        assert!(send.jitter && connection.jitter && !render.jitter);
        assert!(render.max_attempts < send.max_attempts);
        assert!(connection.max_attempts > send.max_attempts);
        assert!(render.initial_delay < Duration::from_secs(1));
        assert!(connection.max_delay > send.max_delay);
        assert_eq!(RetryPolicy::default(), send);
    }
}
