use super::status::PaymentId;
use crate::error::Result;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Input for starting a boost payment: the ad to promote, the boost package,
/// and the payer's mobile-money number.
#[derive(Debug, Clone, Serialize)]
pub struct BoostRequest {
    pub ad_id: String,
    pub package: String,
    pub msisdn: String,
}

/// Response of the boost initiation endpoint.
///
/// Backends name the identifier field inconsistently (`payment_id`,
/// `paymentId` or plain `id`), so all three are accepted. Everything besides
/// the identifier is display-only material for the payment dialog.
#[derive(Debug, Clone, Deserialize)]
pub struct BoostQuote {
    #[serde(alias = "paymentId", alias = "id")]
    pub payment_id: String,
    pub instructions: Option<String>,
    pub ussd_code: Option<String>,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub reference: Option<String>,
}

impl BoostQuote {
    /// The validated identifier the poller consumes.
    pub fn id(&self) -> Result<PaymentId> {
        PaymentId::new(self.payment_id.clone())
    }
}
