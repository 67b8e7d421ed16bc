use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One synthesized instant of traffic/threat metrics. Wire-only, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub time: String,
    pub threats: i64,
    pub traffic: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertSeverity {
    High,
    Critical,
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertSeverity::High => write!(f, "High"),
            AlertSeverity::Critical => write!(f, "Critical"),
        }
    }
}

/// A transient high-severity event raised alongside an incident-regime
/// snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: i64,
    #[serde(rename = "type")]
    pub severity: AlertSeverity,
    pub source: String,
    pub desc: String,
    pub time: String,
}

/// The durable form of an [`Alert`]. Immutable once written; removed only by
/// the retention sweeper.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AlertRecord {
    pub id: i64,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub severity: String,
    pub source: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

/// The sole message type emitted to stream subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StreamMessage {
    #[serde(rename = "METRICS_UPDATE")]
    MetricsUpdate {
        data: MetricsSnapshot,
        alert: Option<Alert>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_update_wire_shape() {
        let message = StreamMessage::MetricsUpdate {
            data: MetricsSnapshot {
                time: "12:30:01".to_string(),
                threats: 9,
                traffic: 1200,
            },
            alert: None,
        };

        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&message).unwrap()).unwrap();
        assert_eq!(json["type"], "METRICS_UPDATE");
        assert_eq!(json["data"]["threats"], 9);
        assert_eq!(json["data"]["traffic"], 1200);
        assert!(json["alert"].is_null());
    }

    #[test]
    fn alert_serializes_severity_as_type() {
        let alert = Alert {
            id: 4,
            severity: AlertSeverity::Critical,
            source: "System Monitor".to_string(),
            desc: "CPU spiked to 95%".to_string(),
            time: "Just now".to_string(),
        };

        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&alert).unwrap()).unwrap();
        assert_eq!(json["type"], "Critical");
        assert_eq!(json["id"], 4);

        let back: Alert = serde_json::from_value(json).unwrap();
        assert_eq!(back, alert);
    }
}
