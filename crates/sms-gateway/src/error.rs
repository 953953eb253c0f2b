//! Delivery Error Types

use thiserror::Error;

/// Errors from a single SMS delivery attempt
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Receiver list was empty, nothing was sent
    #[error("no receivers provided")]
    NoReceivers,

    /// Connection, TLS or protocol failure talking to the provider
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Request deadline passed before the provider answered
    #[error("delivery deadline exceeded")]
    Timeout,

    /// Provider answered with a non-200 status
    #[error("provider returned status {status}: {body}")]
    ProviderRejected { status: u16, body: String },
}

impl DeliveryError {
    /// True for failures below the HTTP status level
    pub fn is_transport(&self) -> bool {
        matches!(self, DeliveryError::Transport(_) | DeliveryError::Timeout)
    }

    /// Provider status code, if the provider answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            DeliveryError::ProviderRejected { status, .. } => Some(*status),
            DeliveryError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
