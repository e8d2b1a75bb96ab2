use std::thread;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::error::{ApiError, LifecycleError};

/// Bounded polling policy: how often to look, how the interval grows, and
/// when to give up. Configurable at the call site so the timeout contract is
/// testable without a real control plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay before the second and later observations.
    pub interval: Duration,
    /// Multiplier applied to the interval after each observation (1 = fixed).
    pub factor: u32,
    /// Upper bound on the interval once backoff kicks in.
    pub cap: Duration,
    /// Total observations before giving up with a timeout.
    pub max_attempts: u32,
}

impl PollPolicy {
    pub const fn fixed(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            factor: 1,
            cap: interval,
            max_attempts,
        }
    }

    /// Cluster create/delete cadence: every 30s, up to 15 minutes.
    pub const fn cluster_op() -> Self {
        Self::fixed(Duration::from_secs(30), 30)
    }

    /// Node pool resize cadence: every 10s, up to 10 minutes.
    pub const fn resize_op() -> Self {
        Self::fixed(Duration::from_secs(10), 60)
    }

    /// Networking (router/NAT/disk) cadence: every 5s, up to 5 minutes.
    pub const fn network_op() -> Self {
        Self::fixed(Duration::from_secs(5), 60)
    }

    /// The longest this policy can block before timing out.
    pub fn max_wait(&self) -> Duration {
        let mut total = Duration::ZERO;
        let mut delay = self.interval;
        for _ in 1..self.max_attempts {
            total += delay;
            delay = (delay * self.factor).min(self.cap);
        }
        total
    }
}

/// One observation made by a polling closure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStep<T> {
    Complete(T),
    /// Still waiting; carries the observed in-between status for logging.
    Pending(String),
}

/// Timed out, or the closure itself failed. The two are distinct: a timeout
/// means the wait may be retried, an inner error means the caller must
/// remediate first.
#[derive(Debug, Error)]
pub enum PollError<E> {
    #[error("timed out after {}s waiting for {what}", .waited.as_secs())]
    Timeout { what: String, waited: Duration },
    #[error("{0}")]
    Inner(E),
}

impl From<PollError<LifecycleError>> for LifecycleError {
    fn from(err: PollError<LifecycleError>) -> Self {
        match err {
            PollError::Timeout { what, waited } => LifecycleError::Timeout { what, waited },
            PollError::Inner(e) => e,
        }
    }
}

/// Drive `f` under `policy` until it completes, fails, or the policy is
/// exhausted. Blocks the calling thread between observations.
pub fn poll_until<T, E, F>(policy: &PollPolicy, what: &str, mut f: F) -> Result<T, PollError<E>>
where
    F: FnMut() -> Result<PollStep<T>, E>,
{
    let mut waited = Duration::ZERO;
    let mut delay = policy.interval;

    for attempt in 1..=policy.max_attempts {
        match f() {
            Ok(PollStep::Complete(val)) => return Ok(val),
            Ok(PollStep::Pending(status)) => {
                debug!(attempt, status = %status, "{} still in progress", what);
            }
            Err(e) => return Err(PollError::Inner(e)),
        }

        if attempt < policy.max_attempts {
            thread::sleep(delay);
            waited += delay;
            delay = (delay * policy.factor).min(policy.cap);
        }
    }

    Err(PollError::Timeout {
        what: what.to_string(),
        waited,
    })
}

/// Retry a side-effect-free call on transient failures with exponential
/// backoff. Mutations must never go through here: retrying a partially
/// applied infrastructure change can duplicate billable resources.
pub fn retry_transient<T, F>(
    max_attempts: u32,
    base_delay: Duration,
    label: &str,
    f: F,
) -> Result<T, ApiError>
where
    F: Fn() -> Result<T, ApiError>,
{
    let mut delay = base_delay;
    let mut last_err = None;

    for attempt in 1..=max_attempts {
        match f() {
            Ok(val) => return Ok(val),
            Err(e) if e.is_transient() && attempt < max_attempts => {
                warn!(
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "{} failed, retrying",
                    label,
                );
                thread::sleep(delay);
                delay *= 2;
                last_err = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_err.unwrap_or_else(|| ApiError::Transport(format!("{} never ran", label))))
}
