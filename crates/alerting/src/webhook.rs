//! Alertmanager webhook payload

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// One webhook call from Alertmanager
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    /// Alertmanager receiver that routed this group
    #[serde(default)]
    pub receiver: Option<String>,
    /// Group status ("firing" or "resolved")
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub group_key: Option<String>,
    /// Alerts in the order Alertmanager sent them
    #[serde(default, deserialize_with = "null_as_default")]
    pub alerts: Vec<Alert>,
}

impl WebhookPayload {
    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}

/// A single alert inside a webhook batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: HashMap<String, String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub annotations: HashMap<String, String>,
}

impl Alert {
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(String::as_str)
    }

    pub fn alertname(&self) -> Option<&str> {
        self.label("alertname")
    }

    pub fn severity(&self) -> Option<&str> {
        self.label("severity")
    }

    pub fn instance(&self) -> Option<&str> {
        self.label("instance")
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
