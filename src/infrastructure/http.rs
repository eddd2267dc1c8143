use crate::domain::boost::{BoostQuote, BoostRequest};
use crate::domain::ports::{BoostInitiator, PaymentGateway};
use crate::domain::status::{PaymentId, StatusObservation};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use std::time::Duration;

/// REST adapter for the payment gateway.
///
/// Builds a `reqwest::Client` with a per-request timeout and, when a bearer
/// token is configured, a default `Authorization` header. The client is cheap
/// to clone and safe to share across poll sessions.
#[derive(Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    /// Creates an adapter rooted at `base_url`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Gateway base URL, with or without a trailing slash.
    /// * `bearer_token` - Token from the auth collaborator, if any.
    /// * `check_timeout` - Per-request deadline; keep it below the poll
    ///   interval the sessions run with.
    pub fn new(
        base_url: impl Into<String>,
        bearer_token: Option<&str>,
        check_timeout: Duration,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(token) = bearer_token {
            let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                PaymentError::ValidationError(
                    "Bearer token contains characters not allowed in a header".to_string(),
                )
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .timeout(check_timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

/// Wire shape of the check-payment response. Some backend versions report the
/// status at the top level, others nest it under `data`; both are read, with
/// the top-level field winning.
#[derive(Debug, Deserialize)]
struct CheckPaymentBody {
    status: Option<String>,
    data: Option<CheckPaymentData>,
}

#[derive(Debug, Deserialize)]
struct CheckPaymentData {
    status: Option<String>,
}

impl CheckPaymentBody {
    fn into_status(self) -> Option<String> {
        self.status.or_else(|| self.data.and_then(|data| data.status))
    }
}

#[async_trait]
impl PaymentGateway for HttpGateway {
    async fn check_payment(&self, id: &PaymentId) -> Result<StatusObservation> {
        let url = format!("{}/boost/check-payment/{}", self.base_url, id);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        let body = response.text().await?;
        let parsed: CheckPaymentBody = serde_json::from_str(&body)
            .map_err(|err| PaymentError::MalformedResponse(err.to_string()))?;
        Ok(StatusObservation::from_raw(parsed.into_status()))
    }
}

#[async_trait]
impl BoostInitiator for HttpGateway {
    async fn initiate_boost(&self, request: &BoostRequest) -> Result<BoostQuote> {
        let url = format!("{}/boost", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|err| PaymentError::MalformedResponse(err.to_string()))
    }
}
