//! Batch processing: filter, format and deliver

use crate::format::{format_message, should_notify};
use crate::webhook::{Alert, WebhookPayload};
use metrics::{counter, describe_counter};
use sms_gateway::{Deadline, SmsSender};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Time budget shared by every delivery of one batch
pub const DEFAULT_DELIVERY_BUDGET: Duration = Duration::from_secs(5);

const ALERTS_RECEIVED: &str = "alerts_received_total";
const ALERTS_SKIPPED: &str = "alerts_skipped_total";
const SMS_DELIVERIES: &str = "sms_deliveries_total";

/// Register metric descriptions with the installed recorder
pub fn describe_metrics() {
    describe_counter!(ALERTS_RECEIVED, "Alerts received through the webhook");
    describe_counter!(ALERTS_SKIPPED, "Alerts that did not qualify for an SMS");
    describe_counter!(SMS_DELIVERIES, "SMS delivery attempts by outcome");
}

/// Counts for one processed batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Alerts in the batch
    pub total: usize,
    /// Alerts that qualified for an SMS
    pub notified: usize,
    /// Deliveries the provider accepted
    pub delivered: usize,
    /// Deliveries that failed
    pub failed: usize,
}

/// Result of processing one webhook batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// The batch held no alerts, nothing was attempted
    Empty,
    /// Every alert was visited
    Processed(BatchReport),
}

impl BatchOutcome {
    /// Acknowledgement text returned to the webhook caller
    pub fn ack(&self) -> &'static str {
        match self {
            BatchOutcome::Empty => "no alerts",
            BatchOutcome::Processed(_) => "alerts processed",
        }
    }
}

/// Turns webhook batches into SMS deliveries
#[derive(Clone)]
pub struct AlertProcessor {
    sender: Arc<dyn SmsSender>,
    receivers: Arc<[String]>,
    budget: Duration,
}

impl AlertProcessor {
    /// Create a processor that sends every qualifying alert to `receivers`
    pub fn new(sender: Arc<dyn SmsSender>, receivers: Vec<String>) -> Self {
        info!(
            provider = sender.name(),
            receivers = receivers.len(),
            "Creating alert processor"
        );
        Self {
            sender,
            receivers: receivers.into(),
            budget: DEFAULT_DELIVERY_BUDGET,
        }
    }

    /// Override the per-batch delivery budget
    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }

    pub fn receivers(&self) -> &[String] {
        &self.receivers
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Process one batch. Delivery failures are logged, never returned.
    pub async fn process(&self, payload: &WebhookPayload) -> BatchOutcome {
        if payload.is_empty() {
            info!("Received webhook with no alerts");
            return BatchOutcome::Empty;
        }

        let deadline = Deadline::after(self.budget);
        let mut report = BatchReport {
            total: payload.alerts.len(),
            ..Default::default()
        };
        counter!(ALERTS_RECEIVED).increment(report.total as u64);

        debug!(
            receiver = payload.receiver.as_deref().unwrap_or(""),
            group_status = payload.status.as_deref().unwrap_or(""),
            alerts = report.total,
            "Processing webhook batch"
        );

        for alert in &payload.alerts {
            if !should_notify(alert) {
                debug!(
                    alertname = alert.alertname().unwrap_or(""),
                    severity = alert.severity().unwrap_or(""),
                    status = %alert.status,
                    "Alert does not qualify for SMS"
                );
                counter!(ALERTS_SKIPPED).increment(1);
                continue;
            }

            report.notified += 1;
            if self.deliver(alert, deadline).await {
                report.delivered += 1;
            } else {
                report.failed += 1;
            }
        }

        info!(
            total = report.total,
            notified = report.notified,
            delivered = report.delivered,
            failed = report.failed,
            "Webhook batch processed"
        );
        BatchOutcome::Processed(report)
    }

    async fn deliver(&self, alert: &Alert, deadline: Deadline) -> bool {
        let message = format_message(alert);
        let alertname = alert.alertname().unwrap_or("");
        let severity = alert.severity().unwrap_or("");
        let instance = alert.instance().unwrap_or("");

        match self.sender.send_bulk(&self.receivers, &message, deadline).await {
            Ok(()) => {
                info!(
                    alertname,
                    severity,
                    instance,
                    to = ?self.receivers,
                    "SMS sent"
                );
                counter!(SMS_DELIVERIES, "outcome" => "sent").increment(1);
                true
            }
            Err(e) => {
                error!(
                    alertname,
                    severity,
                    instance,
                    error = %e,
                    "Failed to send SMS"
                );
                counter!(SMS_DELIVERIES, "outcome" => "failed").increment(1);
                false
            }
        }
    }
}
