use crate::domain::ports::SharedGateway;
use crate::domain::session::{PollConfig, PollEvent, PollOutcome, PollSession, PollState};
use crate::domain::status::{PaymentId, StatusObservation};
use crate::error::PaymentError;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

/// Drives bounded-duration payment confirmation polls against a gateway.
///
/// `PaymentPoller` owns the gateway handle and the timing configuration;
/// every `start` call spawns one independent session task. Sessions share
/// nothing with each other.
pub struct PaymentPoller {
    gateway: SharedGateway,
    config: PollConfig,
}

impl PaymentPoller {
    pub fn new(gateway: SharedGateway, config: PollConfig) -> Self {
        Self { gateway, config }
    }

    /// Starts a poll session for the given payment.
    ///
    /// The first status check fires immediately; subsequent checks run at the
    /// configured interval until the gateway reports a terminal status, the
    /// session deadline elapses, or the caller cancels the returned handle.
    pub fn start(&self, payment_id: PaymentId) -> PollHandle {
        let mut session = PollSession::new(payment_id.clone(), self.config.timeout);
        session.begin();
        let session = Arc::new(Mutex::new(session));
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(run_session(
            self.gateway.clone(),
            self.config.clone(),
            payment_id,
            Arc::clone(&session),
            events_tx,
        ));

        PollHandle {
            session,
            events: events_rx,
            task,
        }
    }
}

/// Caller-side handle to one poll session: the ordered event stream plus
/// cancellation. Dropping the handle aborts the session, so a closed payment
/// dialog cannot leave a poller running.
pub struct PollHandle {
    session: Arc<Mutex<PollSession>>,
    events: mpsc::UnboundedReceiver<PollEvent>,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Stops the session. Idempotent, and safe to call after the session has
    /// already reached a terminal state on its own; a cancelled session never
    /// emits a terminal event.
    pub fn cancel(&self) {
        let mut session = lock(&self.session);
        if session.cancel() {
            debug!(payment_id = %session.payment_id, "poll session cancelled");
        }
        drop(session);
        self.task.abort();
    }

    /// Next event of the session, `None` once the stream is closed.
    pub async fn next_event(&mut self) -> Option<PollEvent> {
        self.events.recv().await
    }

    /// Drains the stream to the terminal outcome. `None` if the session was
    /// cancelled before reaching one.
    pub async fn wait(mut self) -> Option<PollOutcome> {
        while let Some(event) = self.events.recv().await {
            if let PollEvent::Terminal(outcome) = event {
                return Some(outcome);
            }
        }
        None
    }

    pub fn state(&self) -> PollState {
        lock(&self.session).state
    }

    pub fn last_observed(&self) -> Option<StatusObservation> {
        lock(&self.session).last_observed.clone()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// The session state stays consistent even if a panicking holder poisoned
/// the lock: every critical section is a plain field update.
fn lock(session: &Arc<Mutex<PollSession>>) -> MutexGuard<'_, PollSession> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn run_session(
    gateway: SharedGateway,
    config: PollConfig,
    payment_id: PaymentId,
    session: Arc<Mutex<PollSession>>,
    events: mpsc::UnboundedSender<PollEvent>,
) {
    let deadline = lock(&session).deadline;
    let expiry = time::sleep_until(deadline);
    tokio::pin!(expiry);

    let mut ticker = time::interval(config.poll_interval);
    // One in-flight check at a time: a check still outstanding when the next
    // tick arrives delays that tick instead of bursting to catch up.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            // The deadline wins a dead heat with the next tick. A check that
            // is already in flight still completes through the tick arm below
            // and may beat the deadline with a terminal status.
            biased;

            _ = &mut expiry => {
                if let Some(outcome) = lock(&session).expire() {
                    debug!(payment_id = %payment_id, "poll session deadline elapsed");
                    let _ = events.send(PollEvent::Terminal(outcome));
                }
                return;
            }
            _ = ticker.tick() => {
                let checked = time::timeout(config.check_timeout, gateway.check_payment(&payment_id))
                    .await
                    .unwrap_or(Err(PaymentError::CheckTimeout));
                match checked {
                    Ok(observation) => {
                        if deliver(&session, &events, observation) {
                            return;
                        }
                    }
                    // Transient by policy: a single dropped request must not
                    // abort an in-progress payment confirmation.
                    Err(err) => {
                        warn!(payment_id = %payment_id, error = %err, "status check failed, retrying at next tick");
                    }
                }
            }
        }
    }
}

/// Feeds one observation into the session and forwards the resulting events.
/// Returns `true` once the session is finished.
fn deliver(
    session: &Arc<Mutex<PollSession>>,
    events: &mpsc::UnboundedSender<PollEvent>,
    observation: StatusObservation,
) -> bool {
    let mut session = lock(session);
    if session.state != PollState::Polling {
        // A result that resolved after the session finished is skipped.
        return true;
    }
    match session.observe(observation.clone()) {
        None => {
            let _ = events.send(PollEvent::Update(observation));
            false
        }
        Some(outcome @ PollOutcome::Success { .. }) => {
            let _ = events.send(PollEvent::Update(observation));
            let _ = events.send(PollEvent::Terminal(outcome));
            true
        }
        Some(outcome) => {
            let _ = events.send(PollEvent::Terminal(outcome));
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::scripted::{ScriptedGateway, ScriptedReply};

    #[tokio::test(start_paused = true)]
    async fn test_immediate_confirmation() {
        let gateway = Arc::new(ScriptedGateway::new([ScriptedReply::Status(
            "payment_success".into(),
        )]));
        let poller = PaymentPoller::new(gateway.clone(), PollConfig::default());

        let handle = poller.start(PaymentId::new("pay-1").unwrap());
        let outcome = handle.wait().await;

        assert_eq!(
            outcome,
            Some(PollOutcome::Success {
                last_status: "payment_success".to_string()
            })
        );
        assert_eq!(gateway.checks(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_state_snapshot_while_polling() {
        let gateway = Arc::new(ScriptedGateway::always("processing"));
        let poller = PaymentPoller::new(gateway, PollConfig::default());

        let mut handle = poller.start(PaymentId::new("pay-1").unwrap());
        let event = handle.next_event().await;

        assert!(matches!(event, Some(PollEvent::Update(_))));
        assert_eq!(handle.state(), PollState::Polling);
        let observed = handle.last_observed().expect("observation recorded");
        assert_eq!(observed.raw.as_deref(), Some("processing"));
        handle.cancel();
    }
}
