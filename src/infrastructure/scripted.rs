use crate::domain::ports::PaymentGateway;
use crate::domain::status::{PaymentId, StatusObservation};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// One scripted reply for a status check.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Respond with this raw status string.
    Status(String),
    /// Respond with a body that carries no status field.
    Missing,
    /// Fail the check with a gateway error.
    Error(String),
    /// Never respond; exercises the per-check deadline.
    Hang,
}

/// In-memory gateway that serves a scripted sequence of replies.
///
/// Checks consume the script front to back; once only one reply remains it is
/// served for every further check. The number of checks served is recorded so
/// tests can assert that polling stopped.
pub struct ScriptedGateway {
    script: Mutex<VecDeque<ScriptedReply>>,
    checks: AtomicUsize,
}

impl ScriptedGateway {
    pub fn new(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
        Self {
            script: Mutex::new(replies.into_iter().collect()),
            checks: AtomicUsize::new(0),
        }
    }

    /// A gateway that answers every check with the same status.
    pub fn always(status: &str) -> Self {
        Self::new([ScriptedReply::Status(status.to_string())])
    }

    /// Number of status checks served so far.
    pub fn checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }

    fn next_reply(&self) -> Option<ScriptedReply> {
        let mut script = self
            .script
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().cloned()
        }
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn check_payment(&self, _id: &PaymentId) -> Result<StatusObservation> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        match self.next_reply() {
            Some(ScriptedReply::Status(status)) => Ok(StatusObservation::from_raw(Some(status))),
            Some(ScriptedReply::Missing) | None => Ok(StatusObservation::from_raw(None)),
            Some(ScriptedReply::Error(message)) => Err(PaymentError::MalformedResponse(message)),
            Some(ScriptedReply::Hang) => std::future::pending().await,
        }
    }
}
