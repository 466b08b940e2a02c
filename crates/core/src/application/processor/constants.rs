// Processor constants (no magic values)
use std::time::Duration;

/// Wait before re-querying when no PENDING job exists (5s)
pub const IDLE_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Wait after a failed iteration before the next one (5s)
pub const ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Duration of the placeholder report generation (5s)
pub const SIMULATED_WORK_DURATION: Duration = Duration::from_secs(5);

/// Default capacity of the observer broadcast channel
pub const DEFAULT_NOTIFY_CAPACITY: usize = 256;
