use super::boost::{BoostQuote, BoostRequest};
use super::status::{PaymentId, StatusObservation};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Port to the payment status endpoint. One call is one status check; the
/// implementation is stateless from the poller's point of view and may be
/// shared across sessions.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn check_payment(&self, id: &PaymentId) -> Result<StatusObservation>;
}

/// Port to the boost initiation endpoint. Out of the poller's scope except
/// that the quote it returns carries the identifier a session is started with.
#[async_trait]
pub trait BoostInitiator: Send + Sync {
    async fn initiate_boost(&self, request: &BoostRequest) -> Result<BoostQuote>;
}

pub type SharedGateway = Arc<dyn PaymentGateway>;
pub type BoostInitiatorBox = Box<dyn BoostInitiator>;
