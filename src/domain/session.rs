use super::status::{PaymentId, RemoteStatus, StatusObservation};
use std::time::Duration;
use tokio::time::Instant;

/// Timing knobs for one poll session.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Cadence of status checks. The first check fires immediately.
    pub poll_interval: Duration,
    /// Hard wall-clock deadline for the whole session.
    pub timeout: Duration,
    /// Per-check deadline. Must stay below `poll_interval` so a single slow
    /// request cannot starve subsequent ticks.
    pub check_timeout: Duration,
}

impl PollConfig {
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);
    pub const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

    /// Builds a config with the given cadence and session deadline, keeping
    /// the per-check deadline no longer than the poll interval.
    pub fn new(poll_interval: Duration, timeout: Duration) -> Self {
        Self {
            poll_interval,
            timeout,
            check_timeout: Self::DEFAULT_CHECK_TIMEOUT.min(poll_interval),
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_POLL_INTERVAL, Self::DEFAULT_TIMEOUT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Polling,
    Success,
    Failure,
    TimedOut,
    Cancelled,
}

impl PollState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Success | Self::Failure | Self::TimedOut | Self::Cancelled
        )
    }
}

/// How a session ended. Cancellation produces no outcome: the event stream
/// simply closes.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Success { last_status: String },
    Failure { last_status: String, reason: String },
    TimedOut,
}

/// One entry of the ordered event stream a session delivers to its caller.
/// A `Terminal` event is strictly the last one.
#[derive(Debug, Clone, PartialEq)]
pub enum PollEvent {
    Update(StatusObservation),
    Terminal(PollOutcome),
}

/// State of one active or completed polling attempt.
///
/// Mutated only by the session's own task and by explicit cancellation; the
/// first writer to move the state out of `Polling` wins, and every transition
/// method is a no-op once the session is no longer polling. That guard is
/// what makes a late status-check result or a late deadline firing harmless.
#[derive(Debug)]
pub struct PollSession {
    pub payment_id: PaymentId,
    pub started_at: Instant,
    pub deadline: Instant,
    pub state: PollState,
    pub last_observed: Option<StatusObservation>,
}

impl PollSession {
    pub fn new(payment_id: PaymentId, timeout: Duration) -> Self {
        let started_at = Instant::now();
        Self {
            payment_id,
            started_at,
            deadline: started_at + timeout,
            state: PollState::Idle,
            last_observed: None,
        }
    }

    /// `Idle -> Polling`.
    pub fn begin(&mut self) {
        if self.state == PollState::Idle {
            self.state = PollState::Polling;
        }
    }

    /// Records a successful status check. Returns the terminal outcome if the
    /// observation ended the session, `None` while it stays `Polling`.
    pub fn observe(&mut self, observation: StatusObservation) -> Option<PollOutcome> {
        if self.state != PollState::Polling {
            return None;
        }
        self.last_observed = Some(observation.clone());
        match observation.status {
            RemoteStatus::Pending => None,
            RemoteStatus::Confirmed => {
                self.state = PollState::Success;
                Some(PollOutcome::Success {
                    last_status: observation.raw.unwrap_or_default(),
                })
            }
            RemoteStatus::Failed => {
                self.state = PollState::Failure;
                Some(PollOutcome::Failure {
                    last_status: observation.raw.unwrap_or_default(),
                    reason: "gateway declared the payment failed".to_string(),
                })
            }
        }
    }

    /// `Polling -> TimedOut` when the session deadline fires first.
    pub fn expire(&mut self) -> Option<PollOutcome> {
        if self.state != PollState::Polling {
            return None;
        }
        self.state = PollState::TimedOut;
        Some(PollOutcome::TimedOut)
    }

    /// `Polling -> Cancelled`. Returns whether this call did the transition,
    /// so repeated or late cancels stay inert.
    pub fn cancel(&mut self) -> bool {
        if self.state != PollState::Polling {
            return false;
        }
        self.state = PollState::Cancelled;
        true
    }
}
