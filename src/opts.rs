use std::time::Duration;

pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// How the pause between retries grows with the attempt number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backoff {
    /// Same delay before every retry.
    #[default]
    Flat,

    /// Delay multiplied by the number of the attempt that just failed (1x, 2x, 3x, ...).
    Linear,
}

/// Options that control how a transcript is fetched.
///
/// This struct represents *library-level configuration*, not CLI flags directly.
/// The binaries map user input into this type so that:
/// - the library remains reusable outside of a CLI/server context
/// - tests can construct options programmatically (e.g. with tiny timeouts)
#[derive(Debug, Clone)]
pub struct Opts {
    /// Total attempts for the primary fetch, including the first one. Values below 1 are
    /// treated as 1.
    pub max_attempts: u32,

    /// Upper bound on a single fetch attempt.
    pub attempt_timeout: Duration,

    /// Base pause between attempts.
    pub retry_delay: Duration,

    pub backoff: Backoff,

    /// Language tried once when the requested language has no captions.
    pub fallback_language: String,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            retry_delay: DEFAULT_RETRY_DELAY,
            backoff: Backoff::Flat,
            fallback_language: DEFAULT_LANGUAGE.to_owned(),
        }
    }
}

impl Opts {
    pub(crate) fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Pause to take after `failed_attempt` (1-based) before trying again.
    pub fn delay_after(&self, failed_attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Flat => self.retry_delay,
            Backoff::Linear => self.retry_delay.saturating_mul(failed_attempt.max(1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_policy() {
        let opts = Opts::default();
        assert_eq!(opts.max_attempts, 3);
        assert_eq!(opts.attempt_timeout, Duration::from_secs(10));
        assert_eq!(opts.retry_delay, Duration::from_secs(1));
        assert_eq!(opts.backoff, Backoff::Flat);
        assert_eq!(opts.fallback_language, "en");
    }

    #[test]
    fn flat_backoff_keeps_delay_constant() {
        let opts = Opts::default();
        assert_eq!(opts.delay_after(1), Duration::from_secs(1));
        assert_eq!(opts.delay_after(2), Duration::from_secs(1));
    }

    #[test]
    fn linear_backoff_scales_with_attempt() {
        let opts = Opts {
            backoff: Backoff::Linear,
            retry_delay: Duration::from_millis(250),
            ..Opts::default()
        };
        assert_eq!(opts.delay_after(1), Duration::from_millis(250));
        assert_eq!(opts.delay_after(3), Duration::from_millis(750));
    }

    #[test]
    fn zero_attempts_still_tries_once() {
        let opts = Opts {
            max_attempts: 0,
            ..Opts::default()
        };
        assert_eq!(opts.attempts(), 1);
    }
}
