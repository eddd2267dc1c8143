use boostpay::application::poller::{PaymentPoller, PollHandle};
use boostpay::domain::session::{PollConfig, PollEvent, PollOutcome, PollState};
use boostpay::domain::status::PaymentId;
use boostpay::infrastructure::scripted::{ScriptedGateway, ScriptedReply};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

fn config_ms(interval: u64, timeout: u64) -> PollConfig {
    PollConfig {
        poll_interval: Duration::from_millis(interval),
        timeout: Duration::from_millis(timeout),
        check_timeout: Duration::from_millis(interval / 2),
    }
}

async fn drain(handle: &mut PollHandle) -> (usize, PollOutcome) {
    let mut updates = 0;
    loop {
        match handle
            .next_event()
            .await
            .expect("event stream ended without a terminal event")
        {
            PollEvent::Update(_) => updates += 1,
            PollEvent::Terminal(outcome) => return (updates, outcome),
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_transient_error_does_not_end_the_session() {
    let gateway = Arc::new(ScriptedGateway::new([
        ScriptedReply::Error("connection reset by peer".into()),
        ScriptedReply::Status("pending".into()),
        ScriptedReply::Status("paid".into()),
    ]));
    let poller = PaymentPoller::new(gateway.clone(), config_ms(1000, 10_000));

    let started = Instant::now();
    let mut handle = poller.start(PaymentId::new("pay-1").unwrap());
    let (updates, outcome) = drain(&mut handle).await;

    // The failed first check produces no update; the next tick still runs.
    assert_eq!(updates, 1);
    assert_eq!(
        outcome,
        PollOutcome::Success {
            last_status: "paid".to_string()
        }
    );
    assert_eq!(started.elapsed(), Duration::from_millis(2000));
    assert_eq!(gateway.checks(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_session_stays_polling_across_errors() {
    let gateway = Arc::new(ScriptedGateway::new([
        ScriptedReply::Error("503 service unavailable".into()),
        ScriptedReply::Status("pending".into()),
    ]));
    let poller = PaymentPoller::new(gateway.clone(), config_ms(1000, 600_000));
    let mut handle = poller.start(PaymentId::new("pay-1").unwrap());

    // The first event arrives from check 2, after the error was swallowed.
    let event = handle.next_event().await;
    assert!(matches!(event, Some(PollEvent::Update(_))));
    assert_eq!(handle.state(), PollState::Polling);
    assert!(gateway.checks() >= 2);

    handle.cancel();
}

#[tokio::test(start_paused = true)]
async fn test_hanging_check_is_reaped_by_the_per_check_deadline() {
    let gateway = Arc::new(ScriptedGateway::new([
        ScriptedReply::Hang,
        ScriptedReply::Status("paid".into()),
    ]));
    let poller = PaymentPoller::new(gateway.clone(), config_ms(1000, 10_000));

    let started = Instant::now();
    let mut handle = poller.start(PaymentId::new("pay-1").unwrap());
    let (updates, outcome) = drain(&mut handle).await;

    // The hung check times out inside its own tick and the next tick still
    // fires on schedule.
    assert_eq!(updates, 1);
    assert_eq!(
        outcome,
        PollOutcome::Success {
            last_status: "paid".to_string()
        }
    );
    assert_eq!(started.elapsed(), Duration::from_millis(1000));
    assert_eq!(gateway.checks(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_errors_all_the_way_to_the_deadline() {
    let gateway = Arc::new(ScriptedGateway::new([ScriptedReply::Error(
        "dns lookup failed".into(),
    )]));
    let poller = PaymentPoller::new(gateway.clone(), config_ms(1000, 2500));

    let mut handle = poller.start(PaymentId::new("pay-1").unwrap());
    let (updates, outcome) = drain(&mut handle).await;

    assert_eq!(updates, 0);
    assert_eq!(outcome, PollOutcome::TimedOut);
    assert_eq!(gateway.checks(), 3);
}
