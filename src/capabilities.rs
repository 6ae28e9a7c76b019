//! Injected side-effect capabilities.
//!
//! Handler nodes never talk to storage or a UI directly; they go through
//! these traits so tests can observe effects and production can wire real
//! backends.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::info;

/// A fully specified ad, ready to persist.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdRecord {
    pub id: String,
    pub name: String,
    pub merchant_id: String,
    pub merchant_name: String,
    pub offer_id: String,
    pub media_type: String,
    pub cost_per_activation: f64,
    pub cost_per_redemption: f64,
    pub created_at: DateTime<Utc>,
}

/// Errors from the ad store backend.
#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("ad store rejected the record: {reason}")]
    #[diagnostic(code(promograph::store::rejected))]
    Rejected { reason: String },

    #[error("ad store unavailable: {reason}")]
    #[diagnostic(code(promograph::store::unavailable))]
    Unavailable { reason: String },
}

/// Persistence seam for created ads.
#[async_trait]
pub trait AdStore: Send + Sync {
    async fn create_ad_record(&self, record: AdRecord) -> Result<(), StoreError>;
}

/// Severity of a user-facing notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// A toast-style notification for the UI layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

/// Delivery seam for notifications. Best-effort, no failure surface.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// In-memory [`AdStore`] for tests and demos.
#[derive(Debug, Default)]
pub struct InMemoryAdStore {
    records: Mutex<Vec<AdRecord>>,
}

impl InMemoryAdStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything stored so far.
    pub fn records(&self) -> Vec<AdRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl AdStore for InMemoryAdStore {
    async fn create_ad_record(&self, record: AdRecord) -> Result<(), StoreError> {
        let mut records = self.records.lock().map_err(|_| StoreError::Unavailable {
            reason: "store lock poisoned".to_string(),
        })?;
        records.push(record);
        Ok(())
    }
}

/// [`NotificationSink`] that buffers notifications for inspection.
#[derive(Debug, Default)]
pub struct MemorySink {
    delivered: Mutex<Vec<Notification>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered(&self) -> Vec<Notification> {
        self.delivered.lock().map(|d| d.clone()).unwrap_or_default()
    }
}

impl NotificationSink for MemorySink {
    fn notify(&self, notification: Notification) {
        if let Ok(mut delivered) = self.delivered.lock() {
            delivered.push(notification);
        }
    }
}

/// [`NotificationSink`] that logs through `tracing`.
#[derive(Debug, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, notification: Notification) {
        info!(
            severity = ?notification.severity,
            message = %notification.message,
            "notification"
        );
    }
}

/// The capability bundle handed to handler nodes.
#[derive(Clone)]
pub struct Capabilities {
    pub ad_store: Arc<dyn AdStore>,
    pub notifications: Arc<dyn NotificationSink>,
}

impl Capabilities {
    pub fn new(ad_store: Arc<dyn AdStore>, notifications: Arc<dyn NotificationSink>) -> Self {
        Self {
            ad_store,
            notifications,
        }
    }

    /// In-memory store plus tracing notifications.
    pub fn in_memory() -> Self {
        Self {
            ad_store: Arc::new(InMemoryAdStore::new()),
            notifications: Arc::new(TracingSink),
        }
    }
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> AdRecord {
        AdRecord {
            id: format!("ad_{name}"),
            name: name.to_string(),
            merchant_id: "m1".to_string(),
            merchant_name: "Starbucks".to_string(),
            offer_id: "mcm_o1_2023".to_string(),
            media_type: "native".to_string(),
            cost_per_activation: 2.5,
            cost_per_redemption: 5.0,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn in_memory_store_keeps_records_in_order() {
        let store = InMemoryAdStore::new();
        store.create_ad_record(record("first")).await.unwrap();
        store.create_ad_record(record("second")).await.unwrap();

        let records = store.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "first");
        assert_eq!(records[1].name, "second");
    }

    #[test]
    fn memory_sink_buffers_notifications() {
        let sink = MemorySink::new();
        sink.notify(Notification::success("created"));
        sink.notify(Notification::error("failed"));

        let delivered = sink.delivered();
        assert_eq!(delivered.len(), 2);
        assert_eq!(delivered[0].severity, Severity::Success);
        assert_eq!(delivered[1].severity, Severity::Error);
    }
}
