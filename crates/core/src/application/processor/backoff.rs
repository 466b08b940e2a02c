// Fixed backoff policy for the processor loop

use std::time::Duration;

use super::constants::{ERROR_BACKOFF, IDLE_POLL_INTERVAL};
use super::IterationOutcome;

/// What the loop does after an iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    /// Query again right away
    Continue,
    /// Sleep (interruptible by shutdown), then query again
    Wait(Duration),
    /// Leave the loop
    Stop,
}

/// Maps an iteration outcome to the loop's next step.
///
/// Only "no work" and "error" insert a delay; a completed job is followed
/// immediately by the next query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub idle_interval: Duration,
    pub error_backoff: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            idle_interval: IDLE_POLL_INTERVAL,
            error_backoff: ERROR_BACKOFF,
        }
    }
}

impl BackoffPolicy {
    pub fn new(idle_interval: Duration, error_backoff: Duration) -> Self {
        Self {
            idle_interval,
            error_backoff,
        }
    }

    pub fn next_step(&self, outcome: &IterationOutcome) -> NextStep {
        match outcome {
            IterationOutcome::Processed(_) => NextStep::Continue,
            IterationOutcome::Idle => NextStep::Wait(self.idle_interval),
            IterationOutcome::Failed(_) => NextStep::Wait(self.error_backoff),
            IterationOutcome::Interrupted => NextStep::Stop,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn test_default_intervals_are_five_seconds() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.idle_interval, Duration::from_secs(5));
        assert_eq!(policy.error_backoff, Duration::from_secs(5));
    }

    #[test]
    fn test_next_step_per_outcome() {
        let policy = BackoffPolicy::new(Duration::from_millis(10), Duration::from_millis(20));

        assert_eq!(
            policy.next_step(&IterationOutcome::Processed("job-1".to_string())),
            NextStep::Continue
        );
        assert_eq!(
            policy.next_step(&IterationOutcome::Idle),
            NextStep::Wait(Duration::from_millis(10))
        );
        assert_eq!(
            policy.next_step(&IterationOutcome::Failed(AppError::Storage("down".into()))),
            NextStep::Wait(Duration::from_millis(20))
        );
        assert_eq!(
            policy.next_step(&IterationOutcome::Interrupted),
            NextStep::Stop
        );
    }
}
