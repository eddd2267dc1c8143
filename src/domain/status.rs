use crate::error::{PaymentError, Result};
use serde::{Deserialize, Serialize};

/// Opaque token identifying one payment attempt at the gateway.
///
/// This is a wrapper around the raw identifier string to enforce the
/// non-empty invariant at construction, so a poll session can never be
/// started without a usable identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaymentId(String);

impl PaymentId {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(PaymentError::ValidationError(
                "Payment id must not be empty".to_string(),
            ));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for PaymentId {
    type Error = PaymentError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl std::fmt::Display for PaymentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalized gateway status. `Pending` is the only non-terminal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteStatus {
    Pending,
    Confirmed,
    Failed,
}

impl RemoteStatus {
    /// Maps a raw gateway status string onto the closed status set.
    ///
    /// Backends disagree on naming and casing, so all known synonyms are
    /// matched case-insensitively.
    pub fn normalize(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "pending" | "processing" => Self::Pending,
            "payment_success" | "success" | "paid" | "published" => Self::Confirmed,
            "payment_failed" | "failed" => Self::Failed,
            // An unrecognized status keeps the session alive instead of
            // failing it; only an explicit failure is treated as final.
            _ => Self::Pending,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// The result of one successful status check: the status string as returned
/// by the gateway (absent on some backends) plus its normalized form.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusObservation {
    pub raw: Option<String>,
    pub status: RemoteStatus,
}

impl StatusObservation {
    pub fn from_raw(raw: Option<String>) -> Self {
        let status = raw
            .as_deref()
            .map(RemoteStatus::normalize)
            .unwrap_or(RemoteStatus::Pending);
        Self { raw, status }
    }
}
