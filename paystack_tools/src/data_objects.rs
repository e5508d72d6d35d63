use chrono::{DateTime, Utc};
use mps_common::Naira;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The metadata we attach to a Paystack transaction so that the webhook can be correlated with
/// the orders it funds. Paystack echoes it back verbatim in `charge.*` events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutMetadata {
    /// The engine ids of every order created for this checkout.
    pub order_ids: Vec<i64>,
    pub customer_name: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// The cart as the storefront sent it, carried along for support/debugging only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cart: Option<Value>,
}

/// Request body for `POST /transaction/initialize`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitializeTransaction {
    /// Total charge for the whole checkout, in kobo.
    pub amount: Naira,
    pub email: String,
    pub metadata: CheckoutMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
}

/// The `data` object returned by a successful transaction initialization. The buyer completes
/// payment at `authorization_url`; `reference` is what the webhook later carries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionAuthorization {
    pub authorization_url: String,
    pub access_code: String,
    pub reference: String,
}

/// The `data` object returned by `GET /transaction/verify/{reference}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionStatus {
    pub status: String,
    pub reference: String,
    pub amount: Naira,
    #[serde(default)]
    pub gateway_response: Option<String>,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
}

/// Paystack's REST envelope: `status` is the request outcome, not the charge outcome.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PaystackResponse<T> {
    pub status: bool,
    pub message: String,
    pub data: Option<T>,
}

//--------------------------------------   Webhook events   ----------------------------------------------------------

/// The webhook envelope: `{"event": "charge.success", "data": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeEvent {
    pub event: String,
    pub data: ChargeEventData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeEventData {
    pub reference: String,
    #[serde(default)]
    pub amount: Option<Naira>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

/// The event types the reconciler distinguishes. Everything else is acknowledged and ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    ChargeSuccess,
    ChargeFailed,
    Other(String),
}

impl ChargeEvent {
    pub fn kind(&self) -> EventKind {
        match self.event.as_str() {
            "charge.success" => EventKind::ChargeSuccess,
            "charge.failed" => EventKind::ChargeFailed,
            other => EventKind::Other(other.to_string()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn charge_events_deserialize_from_the_provider_envelope() {
        let raw = r#"{
            "event": "charge.success",
            "data": {
                "reference": "5a3pu3flo8",
                "amount": 150000,
                "metadata": { "order_ids": [1, 2, 3] }
            }
        }"#;
        let event: ChargeEvent = serde_json::from_str(raw).expect("should deserialize");
        assert_eq!(event.kind(), EventKind::ChargeSuccess);
        assert_eq!(event.data.reference, "5a3pu3flo8");
        assert_eq!(event.data.amount, Some(Naira::from(150_000)));
    }

    #[test]
    fn unrecognized_events_are_classified_as_other() {
        let raw = r#"{"event": "transfer.success", "data": {"reference": "r1"}}"#;
        let event: ChargeEvent = serde_json::from_str(raw).expect("should deserialize");
        assert_eq!(event.kind(), EventKind::Other("transfer.success".to_string()));
    }

    #[test]
    fn initialize_request_skips_absent_optional_fields() {
        let req = InitializeTransaction {
            amount: Naira::from(5_000),
            email: "ada@example.com".into(),
            metadata: CheckoutMetadata {
                order_ids: vec![7],
                customer_name: "Ada".into(),
                address: "14 Allen Avenue".into(),
                phone: None,
                note: None,
                cart: None,
            },
            callback_url: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["amount"], 5_000);
        assert!(json.get("callback_url").is_none());
        assert!(json["metadata"].get("phone").is_none());
    }
}
