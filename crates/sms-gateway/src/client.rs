//! Kavenegar HTTP Client

use crate::deadline::Deadline;
use crate::error::DeliveryError;
use crate::SmsSender;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

/// Production Kavenegar API host
pub const DEFAULT_BASE_URL: &str = "https://api.kavenegar.com";

/// Overall timeout of the shared HTTP client
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the HTTP client shared by every delivery for the lifetime of the process
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, DeliveryError> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    Ok(client)
}

/// Client for the Kavenegar bulk send endpoint
#[derive(Clone)]
pub struct KavenegarClient {
    api_key: String,
    sender: String,
    base_url: String,
    http: reqwest::Client,
}

impl KavenegarClient {
    /// Create a client bound to one API key and sender line
    ///
    /// # Arguments
    /// * `api_key` - Kavenegar API key, embedded in the endpoint path
    /// * `sender` - Sender line number shown to receivers
    /// * `http` - Shared HTTP client (cloning it shares the connection pool)
    pub fn new(api_key: impl Into<String>, sender: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            api_key: api_key.into(),
            sender: sender.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            http,
        }
    }

    /// Point the client at a different API host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// Full send endpoint, including the API key
    pub fn endpoint(&self) -> String {
        format!("{}/v1/{}/sms/send.json", self.base_url, self.api_key)
    }

    async fn post_form(&self, receptor: &str, message: &str) -> Result<(), DeliveryError> {
        let response = self
            .http
            .post(self.endpoint())
            .form(&[
                ("receptor", receptor),
                ("sender", self.sender.as_str()),
                ("message", message),
            ])
            .send()
            .await?;

        let status = response.status();
        // A body that cannot be read is reported as empty
        let body = response.text().await.unwrap_or_default();

        if status != StatusCode::OK {
            return Err(DeliveryError::ProviderRejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(status = status.as_u16(), "Kavenegar accepted message");
        Ok(())
    }
}

impl fmt::Debug for KavenegarClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KavenegarClient")
            .field("api_key", &"<redacted>")
            .field("sender", &self.sender)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl SmsSender for KavenegarClient {
    fn name(&self) -> &'static str {
        "kavenegar"
    }

    async fn send_bulk(
        &self,
        receivers: &[String],
        message: &str,
        deadline: Deadline,
    ) -> Result<(), DeliveryError> {
        if receivers.is_empty() {
            return Err(DeliveryError::NoReceivers);
        }

        if deadline.has_elapsed() {
            warn!("Delivery deadline already passed, not contacting Kavenegar");
            return Err(DeliveryError::Timeout);
        }

        let receptor = receivers.join(",");

        // Dropping the request future on expiry aborts the in-flight call
        match tokio::time::timeout_at(deadline.instant(), self.post_form(&receptor, message)).await {
            Ok(result) => result,
            Err(_) => Err(DeliveryError::Timeout),
        }
    }
}
