use thiserror::Error;

pub type Result<T> = std::result::Result<T, PaymentError>;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Gateway transport error: {0}")]
    TransportError(#[from] reqwest::Error),
    #[error("Malformed gateway response: {0}")]
    MalformedResponse(String),
    #[error("Status check exceeded its per-request deadline")]
    CheckTimeout,
}
