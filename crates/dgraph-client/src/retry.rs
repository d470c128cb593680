//! Retry classification and backoff state for the transactor.
//!
//! The cluster reports transient conditions only through error text, so
//! classification is a case-insensitive substring match, evaluated in a
//! fixed precedence. The backoff state machine lives here as a standalone
//! unit so it can be exercised without a network.

use std::time::Duration;

/// Error messages indicating a write conflict or a stale transaction
/// timestamp. Safe to resubmit the identical operation after a wait.
const RETRYABLE_PATTERNS: &[&str] = &["aborted", "transaction is too old", "less than mints"];

/// Error messages indicating the underlying channel is dead. The pool must
/// be torn down and rebuilt before resubmitting.
const BROKEN_TRANSPORT_PATTERNS: &[&str] = &["transport is closing", "unhealthy connection"];

/// What an error message says about the failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Transient conflict; wait and resubmit.
    Retryable,
    /// Dead channel; rebuild the pool, then resubmit.
    BrokenTransport,
    /// Everything else; do not retry.
    Fatal,
}

/// Classify an error message. Conflict patterns take precedence over
/// transport patterns; anything unmatched is fatal.
pub fn classify(message: &str) -> FailureClass {
    let m = message.to_lowercase();
    if RETRYABLE_PATTERNS.iter().any(|p| m.contains(p)) {
        FailureClass::Retryable
    } else if BROKEN_TRANSPORT_PATTERNS.iter().any(|p| m.contains(p)) {
        FailureClass::BrokenTransport
    } else {
        FailureClass::Fatal
    }
}

/// Next action decided by [`RetryPolicy::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Sleep for the given duration, then resubmit the identical operation.
    Backoff(Duration),
    /// Tear down and rebuild the pool, then sleep and resubmit.
    Reconnect { wait: Duration },
    /// Fatal classification; surface the original message.
    Fail,
    /// The attempt cap was reached; give up with the retry count performed.
    Exhausted { attempts: u32 },
}

/// Backoff state for one operation's retry sequence.
///
/// The wait starts at a fixed base and doubles on every retryable failure,
/// with no jitter and no ceiling; only the retry counter is capped.
#[derive(Debug)]
pub struct RetryPolicy {
    max_retries: u32,
    retries: u32,
    wait: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_wait: Duration) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            retries: 0,
            wait: base_wait,
        }
    }

    /// Retries performed so far.
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Decide the next step for a failed attempt of the given class.
    pub fn apply(&mut self, class: FailureClass) -> Step {
        match class {
            FailureClass::Fatal => Step::Fail,
            FailureClass::Retryable | FailureClass::BrokenTransport => {
                if self.retries >= self.max_retries {
                    return Step::Exhausted {
                        attempts: self.retries,
                    };
                }
                self.retries += 1;
                let wait = self.wait;
                self.wait *= 2;
                if class == FailureClass::BrokenTransport {
                    Step::Reconnect { wait }
                } else {
                    Step::Backoff(wait)
                }
            }
        }
    }

    /// Convenience for classifying raw error text and applying it.
    pub fn next_step(&mut self, error_text: &str) -> Step {
        self.apply(classify(error_text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_messages_are_retryable_any_case() {
        assert_eq!(classify("Transaction has been Aborted"), FailureClass::Retryable);
        assert_eq!(classify("ABORTED"), FailureClass::Retryable);
        assert_eq!(classify("startTs less than minTs"), FailureClass::Retryable);
        assert_eq!(
            classify("rpc error: Transaction is too old"),
            FailureClass::Retryable
        );
    }

    #[test]
    fn dead_transport_messages_require_reconnect() {
        assert_eq!(
            classify("transport is closing"),
            FailureClass::BrokenTransport
        );
        assert_eq!(
            classify("the server reported an Unhealthy Connection"),
            FailureClass::BrokenTransport
        );
    }

    #[test]
    fn unknown_messages_are_fatal() {
        assert_eq!(classify("syntax error near line 3"), FailureClass::Fatal);
        assert_eq!(classify(""), FailureClass::Fatal);
    }

    #[test]
    fn conflict_takes_precedence_over_transport() {
        assert_eq!(
            classify("aborted because transport is closing"),
            FailureClass::Retryable
        );
    }

    #[test]
    fn backoff_doubles_without_ceiling() {
        let mut policy = RetryPolicy::new(64, Duration::from_secs(10));
        let mut expected = Duration::from_secs(10);
        for _ in 0..20 {
            assert_eq!(policy.next_step("aborted"), Step::Backoff(expected));
            expected *= 2;
        }
        // After 20 doublings the wait is well past any sane ceiling.
        assert!(expected > Duration::from_secs(5_000_000));
    }

    #[test]
    fn exhausts_after_max_retries() {
        // max-retries = 3: three backoffs, then the fourth attempt's
        // failure surfaces exhaustion. Four attempts total.
        let mut policy = RetryPolicy::new(3, Duration::from_secs(10));
        assert_eq!(
            policy.next_step("aborted"),
            Step::Backoff(Duration::from_secs(10))
        );
        assert_eq!(
            policy.next_step("aborted"),
            Step::Backoff(Duration::from_secs(20))
        );
        assert_eq!(
            policy.next_step("aborted"),
            Step::Backoff(Duration::from_secs(40))
        );
        assert_eq!(policy.next_step("aborted"), Step::Exhausted { attempts: 3 });
    }

    #[test]
    fn fatal_does_not_consume_attempts() {
        let mut policy = RetryPolicy::new(3, Duration::from_secs(10));
        assert_eq!(policy.next_step("syntax error"), Step::Fail);
        assert_eq!(policy.retries(), 0);
    }

    #[test]
    fn reconnect_step_carries_the_backoff_wait() {
        let mut policy = RetryPolicy::new(3, Duration::from_secs(10));
        assert_eq!(
            policy.next_step("unhealthy connection"),
            Step::Reconnect {
                wait: Duration::from_secs(10)
            }
        );
        assert_eq!(
            policy.next_step("aborted"),
            Step::Backoff(Duration::from_secs(20))
        );
    }
}
