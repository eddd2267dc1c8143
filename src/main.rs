use boostpay::application::poller::PaymentPoller;
use boostpay::domain::session::{PollConfig, PollEvent, PollOutcome};
use boostpay::domain::status::PaymentId;
use boostpay::infrastructure::http::HttpGateway;
use clap::Parser;
use miette::{IntoDiagnostic, Result, miette};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Payment identifier returned by the boost initiation endpoint
    payment_id: String,

    /// Base URL of the payment gateway
    #[arg(long, env = "BOOSTPAY_GATEWAY_URL")]
    gateway_url: String,

    /// Bearer token for the gateway
    #[arg(long, env = "BOOSTPAY_TOKEN")]
    token: Option<String>,

    /// Seconds between status checks
    #[arg(long, default_value_t = 15)]
    interval_secs: u64,

    /// Seconds before the session gives up
    #[arg(long, default_value_t = 300)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let config = PollConfig::new(
        Duration::from_secs(cli.interval_secs),
        Duration::from_secs(cli.timeout_secs),
    );

    let payment_id = PaymentId::new(cli.payment_id).into_diagnostic()?;
    let gateway = HttpGateway::new(&cli.gateway_url, cli.token.as_deref(), config.check_timeout)
        .into_diagnostic()?;

    let poller = PaymentPoller::new(Arc::new(gateway), config);
    let mut handle = poller.start(payment_id);

    while let Some(event) = handle.next_event().await {
        match event {
            PollEvent::Update(observation) => {
                info!(
                    status = ?observation.status,
                    raw = observation.raw.as_deref().unwrap_or("<absent>"),
                    "status check"
                );
            }
            PollEvent::Terminal(PollOutcome::Success { last_status }) => {
                println!("payment confirmed ({last_status})");
                return Ok(());
            }
            PollEvent::Terminal(PollOutcome::Failure {
                last_status,
                reason,
            }) => {
                return Err(miette!("payment failed ({last_status}): {reason}"));
            }
            PollEvent::Terminal(PollOutcome::TimedOut) => {
                return Err(miette!(
                    "payment not confirmed within {}s; check again later",
                    cli.timeout_secs
                ));
            }
        }
    }

    Err(miette!("poll session ended without an outcome"))
}
