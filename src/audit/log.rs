//! Bounded in-memory audit log
//!
//! Retains the most recent alerts for querying and summarization. The log
//! is capacity-bounded with FIFO eviction so a flood of alerts cannot grow
//! memory without bound; nothing is persisted beyond the process lifetime.

use super::alert::{Alert, AlertLevel};
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};

/// Maximum number of alerts retained by the audit log.
pub const AUDIT_LOG_CAPACITY: usize = 100;

/// Bounded alert buffer with FIFO eviction
#[derive(Debug)]
pub struct AuditLog {
    alerts: VecDeque<Alert>,
    capacity: usize,
}

impl AuditLog {
    /// Create a new audit log with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            alerts: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Create a new audit log with the default capacity.
    pub fn with_default_capacity() -> Self {
        Self::new(AUDIT_LOG_CAPACITY)
    }

    /// Append an alert, evicting the oldest entry at capacity.
    pub fn record(&mut self, alert: Alert) {
        if self.alerts.len() >= self.capacity {
            self.alerts.pop_front();
        }
        self.alerts.push_back(alert);
    }

    /// Number of alerts currently retained.
    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    /// Whether the log holds no alerts.
    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    /// Ordered snapshot of the retained alerts, oldest first.
    pub fn snapshot(&self) -> Vec<Alert> {
        self.alerts.iter().cloned().collect()
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

/// Aggregate view over a sequence of alerts
#[derive(Debug, Clone, Serialize)]
pub struct AlertSummary {
    /// Total number of alerts
    pub total: usize,
    /// Count per level
    pub by_level: BTreeMap<AlertLevel, usize>,
    /// All critical alerts, in order
    pub critical: Vec<Alert>,
    /// All block alerts, in order
    pub blocked: Vec<Alert>,
}

/// Summarize a sequence of alerts by level.
pub fn summarize(alerts: &[Alert]) -> AlertSummary {
    let mut summary = AlertSummary {
        total: alerts.len(),
        by_level: BTreeMap::new(),
        critical: Vec::new(),
        blocked: Vec::new(),
    };

    for alert in alerts {
        *summary.by_level.entry(alert.level).or_insert(0) += 1;

        match alert.level {
            AlertLevel::Critical => summary.critical.push(alert.clone()),
            AlertLevel::Block => summary.blocked.push(alert.clone()),
            _ => {}
        }
    }

    summary
}

/// Whether any alert in the sequence demands blocking execution.
pub fn any_blocking(alerts: &[Alert]) -> bool {
    alerts.iter().any(|a| a.requires_action)
}
