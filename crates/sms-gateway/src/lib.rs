//! SMS Gateway Client
//!
//! Delivers one message to a fixed set of receivers through the Kavenegar
//! bulk send API. Every call is a single attempt bounded by a [`Deadline`].

mod client;
mod deadline;
mod error;

pub use client::{build_http_client, KavenegarClient, DEFAULT_BASE_URL, DEFAULT_HTTP_TIMEOUT};
pub use deadline::Deadline;
pub use error::DeliveryError;

use async_trait::async_trait;

/// Anything that can deliver one SMS body to a list of receivers
#[async_trait]
pub trait SmsSender: Send + Sync {
    /// Short name used in log fields
    fn name(&self) -> &'static str;

    /// Send `message` to every number in `receivers` in one provider call.
    ///
    /// Must give up with [`DeliveryError::Timeout`] once `deadline` passes.
    async fn send_bulk(
        &self,
        receivers: &[String],
        message: &str,
        deadline: Deadline,
    ) -> Result<(), DeliveryError>;
}
