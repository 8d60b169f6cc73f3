//! Tool call results reported back to the browser client

use serde::{Deserialize, Serialize};

use super::command::CorrelationId;

/// What happened to the navigation command a tool call produced
///
/// Correlation ids use the same `correlationId` key as the navigation
/// envelope and its acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// Envelope handed to the connection; acknowledgement not awaited
    Sent {
        #[serde(rename = "correlationId")]
        correlation_id: CorrelationId,
    },
    /// Client confirmed the command
    Acknowledged {
        #[serde(rename = "correlationId")]
        correlation_id: CorrelationId,
        client_status: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// No acknowledgement arrived within the configured wait
    TimedOut {
        #[serde(rename = "correlationId")]
        correlation_id: CorrelationId,
    },
    /// Connection went away while waiting
    Cancelled {
        #[serde(rename = "correlationId")]
        correlation_id: CorrelationId,
    },
    /// Tool result indicated failure, so nothing was sent
    Suppressed,
    /// The envelope could not be transmitted
    Failed { reason: String },
}

/// One executed tool call, in the order the model requested it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResultEntry {
    pub tool_name: String,
    pub arguments: serde_json::Value,
    pub result: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery: Option<DeliveryStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_status_tagging() {
        let json = serde_json::to_value(DeliveryStatus::Suppressed).unwrap();
        assert_eq!(json, serde_json::json!({"status": "suppressed"}));

        let id = CorrelationId::new();
        let json = serde_json::to_value(DeliveryStatus::Sent { correlation_id: id }).unwrap();
        assert_eq!(json["status"], "sent");
        assert_eq!(json["correlationId"], id.to_string());
        assert!(json.get("correlation_id").is_none());
    }

    #[test]
    fn test_acknowledged_matches_envelope_id_key() {
        let id = CorrelationId::new();
        let status = DeliveryStatus::Acknowledged {
            correlation_id: id,
            client_status: "success".into(),
            message: None,
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["status"], "acknowledged");
        assert_eq!(json["correlationId"], id.to_string());

        let back: DeliveryStatus = serde_json::from_value(json).unwrap();
        assert_eq!(back, status);
    }

    #[test]
    fn test_entry_omits_missing_delivery() {
        let entry = ToolResultEntry {
            tool_name: "get_navigation_history".into(),
            arguments: serde_json::json!({"limit": 5}),
            result: "No navigation history available.".into(),
            delivery: None,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("delivery").is_none());
    }
}
