//! Structured alerts for policy violations
//!
//! Alerts are immutable once created. Raising one emits a single-line
//! notice through `tracing` as a side effect; emission is best-effort and
//! never affects the verdict being returned to the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    /// Informational - no action needed
    Info,
    /// Warning - proceed with caution
    Warn,
    /// Block - do not proceed
    Block,
    /// Critical - halt and alert human
    Critical,
}

impl AlertLevel {
    /// Lowercase wire name of the level.
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Info => "info",
            AlertLevel::Warn => "warn",
            AlertLevel::Block => "block",
            AlertLevel::Critical => "critical",
        }
    }

    /// Human description of what the level demands.
    pub fn description(&self) -> &'static str {
        match self {
            AlertLevel::Info => "Informational - no action needed",
            AlertLevel::Warn => "Warning - proceed with caution",
            AlertLevel::Block => "Block - do not proceed",
            AlertLevel::Critical => "Critical - halt and alert human",
        }
    }

    /// Terminal indicator shown in notices and formatted alerts.
    pub fn indicator(&self) -> &'static str {
        match self {
            AlertLevel::Info => "ℹ️",
            AlertLevel::Warn => "⚠️",
            AlertLevel::Block => "🛑",
            AlertLevel::Critical => "🚨",
        }
    }

    /// Whether alerts at this level demand action before proceeding.
    pub fn requires_action(&self) -> bool {
        matches!(self, AlertLevel::Block | AlertLevel::Critical)
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(AlertLevel::Info),
            "warn" => Ok(AlertLevel::Warn),
            "block" => Ok(AlertLevel::Block),
            "critical" => Ok(AlertLevel::Critical),
            _ => Err(()),
        }
    }
}

// Unrecognized level strings coerce to `warn` instead of failing, so a
// malformed configuration value cannot take the engine down.
impl<'de> Deserialize<'de> for AlertLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(s.parse().unwrap_or(AlertLevel::Warn))
    }
}

/// A structured alert raised by the policy engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    /// Unique id (time component plus random component, best-effort)
    pub id: String,
    /// Severity level
    pub level: AlertLevel,
    /// Human-readable description of what was detected
    pub message: String,
    /// Opaque structured context (verdict, finding, warnings, ...)
    pub context: serde_json::Value,
    /// Creation time
    pub timestamp: DateTime<Utc>,
    /// Whether a human must act before proceeding
    pub requires_action: bool,
}

/// Raise a new alert.
///
/// Assigns a time-ordered-ish unique id, stamps the current time, and emits
/// a single-line notice at the `tracing` level matching the alert severity.
pub fn raise(level: AlertLevel, message: impl Into<String>, context: serde_json::Value) -> Alert {
    let message = message.into();
    let alert = Alert {
        id: alert_id(),
        level,
        message: message.clone(),
        context,
        timestamp: Utc::now(),
        requires_action: level.requires_action(),
    };

    let notice = format!(
        "[SHIELD {}] {} {}",
        level.as_str().to_uppercase(),
        level.indicator(),
        message
    );
    match level {
        AlertLevel::Info => tracing::info!(alert_id = %alert.id, "{}", notice),
        AlertLevel::Warn => tracing::warn!(alert_id = %alert.id, "{}", notice),
        AlertLevel::Block | AlertLevel::Critical => {
            tracing::error!(alert_id = %alert.id, "{}", notice)
        }
    }

    alert
}

/// Render an alert as a fixed-width bordered block for terminal display.
///
/// Purely presentational; carries no information not already in the alert.
pub fn format_human(alert: &Alert) -> String {
    let border = "═".repeat(40);
    let level = format!("{} ", alert.level.as_str().to_uppercase());
    let time = format!("{} ", alert.timestamp.to_rfc3339());
    let message = format!("{} ", alert.message);

    format!(
        "╔{border}╗\n\
         ║        🛡️  SHIELD ALERT        ║\n\
         ╠{border}╣\n\
         ║ Level: {:<35}║\n\
         ║ Time: {:<35}║\n\
         ╠{border}╣\n\
         ║ {:<38}║\n\
         ╚{border}╝",
        level, time, message
    )
}

fn alert_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let random: u16 = rand::random();
    format!("shield-{:x}-{:04x}", millis, random)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raise_sets_requires_action() {
        assert!(!raise(AlertLevel::Info, "i", serde_json::json!({})).requires_action);
        assert!(!raise(AlertLevel::Warn, "w", serde_json::json!({})).requires_action);
        assert!(raise(AlertLevel::Block, "b", serde_json::json!({})).requires_action);
        assert!(raise(AlertLevel::Critical, "c", serde_json::json!({})).requires_action);
    }

    #[test]
    fn test_alert_ids_differ() {
        let a = raise(AlertLevel::Info, "first", serde_json::json!({}));
        let b = raise(AlertLevel::Info, "second", serde_json::json!({}));
        assert!(a.id.starts_with("shield-"));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_context_preserved() {
        let alert = raise(
            AlertLevel::Block,
            "blocked",
            serde_json::json!({ "command": "rm -rf /", "source": "user" }),
        );
        assert_eq!(alert.context["command"], "rm -rf /");
    }

    #[test]
    fn test_format_human_contains_fields() {
        let alert = raise(AlertLevel::Critical, "Injection pattern found", serde_json::json!({}));
        let rendered = format_human(&alert);
        assert!(rendered.contains("SHIELD ALERT"));
        assert!(rendered.contains("CRITICAL"));
        assert!(rendered.contains("Injection pattern found"));
        assert!(rendered.starts_with('╔'));
        assert!(rendered.ends_with('╝'));
    }

    #[test]
    fn test_level_parse() {
        assert_eq!("block".parse::<AlertLevel>(), Ok(AlertLevel::Block));
        assert!("nope".parse::<AlertLevel>().is_err());
    }

    #[test]
    fn test_level_deserialize_fallback() {
        let level: AlertLevel = serde_json::from_str(r#""critical""#).unwrap();
        assert_eq!(level, AlertLevel::Critical);

        let level: AlertLevel = serde_json::from_str(r#""no-such-level""#).unwrap();
        assert_eq!(level, AlertLevel::Warn);
    }

    #[test]
    fn test_alert_serialize_round_trip() {
        let alert = raise(AlertLevel::Warn, "warned", serde_json::json!({ "n": 1 }));
        let json = serde_json::to_string(&alert).unwrap();
        let parsed: Alert = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, alert.id);
        assert_eq!(parsed.level, AlertLevel::Warn);
        assert_eq!(parsed.context["n"], 1);
    }

    #[test]
    fn test_level_descriptions() {
        assert_eq!(AlertLevel::Info.description(), "Informational - no action needed");
        assert_eq!(AlertLevel::Critical.description(), "Critical - halt and alert human");
    }
}
