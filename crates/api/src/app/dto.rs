//! Request/response DTOs and JSON mapping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use workpass_attendance::{Direction, PresenceStatus, StatusView, TapKind, TapRecorded};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordTapRequest {
    pub tag_uid: String,
    pub counter: u32,
    #[serde(default)]
    pub signature: Option<String>,
    pub user_id: i64,
    pub company_id: i64,
    #[serde(rename = "type", default)]
    pub kind: Option<TapKind>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyTapRequest {
    pub uid: String,
    pub counter: u32,
    pub mac: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct TapResponse {
    pub status: PresenceStatus,
    pub direction: Direction,
    pub timestamp: DateTime<Utc>,
}

impl From<TapRecorded> for TapResponse {
    fn from(recorded: TapRecorded) -> Self {
        Self {
            status: PresenceStatus::Success,
            direction: recorded.direction,
            timestamp: recorded.recorded_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: PresenceStatus,
    pub direction: Option<Direction>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl From<StatusView> for StatusResponse {
    fn from(view: StatusView) -> Self {
        Self {
            status: view.status,
            direction: view.direction,
            timestamp: view.recorded_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tap_request_accepts_wire_field_names() {
        let body: RecordTapRequest = serde_json::from_value(json!({
            "tagUid": "042C6632A91190",
            "counter": 54,
            "signature": "6B8B1F06C2B3B7C1",
            "userId": 3,
            "companyId": 1,
            "type": "NFC"
        }))
        .unwrap();

        assert_eq!(body.user_id, 3);
        assert_eq!(body.kind, Some(TapKind::Nfc));
    }

    #[test]
    fn tap_request_signature_and_type_are_optional() {
        let body: RecordTapRequest = serde_json::from_value(json!({
            "tagUid": "042C6632A91190",
            "counter": 54,
            "userId": 3,
            "companyId": 1
        }))
        .unwrap();

        assert_eq!(body.signature, None);
        assert_eq!(body.kind, None);
    }

    #[test]
    fn status_response_serializes_wire_shape() {
        let idle = StatusResponse {
            status: PresenceStatus::Idle,
            direction: None,
            timestamp: None,
        };
        let value = serde_json::to_value(&idle).unwrap();
        assert_eq!(
            value,
            json!({"status": "idle", "direction": null, "timestamp": null})
        );
    }
}
