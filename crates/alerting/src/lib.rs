//! Alerting System
//!
//! Decides which Alertmanager alerts warrant an SMS, renders the SMS body
//! and hands each one to an [`SmsSender`](sms_gateway::SmsSender).

mod format;
mod processor;
mod webhook;

pub use format::{format_message, should_notify, ELLIPSIS, MAX_MESSAGE_CHARS};
pub use processor::{describe_metrics, AlertProcessor, BatchOutcome, BatchReport, DEFAULT_DELIVERY_BUDGET};
pub use webhook::{Alert, WebhookPayload};
