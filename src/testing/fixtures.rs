//! Test fixtures for building signed Stripe deliveries.

use hmac::{Hmac, Mac};
use serde_json::{Value, json};
use sha2::Sha256;
use uuid::Uuid;

/// Build a `Stripe-Signature` header value for `payload` at `timestamp`.
///
/// Produces `t=<timestamp>,v1=<hex hmac>` exactly as Stripe signs deliveries.
pub fn sign_payload(secret: &str, payload: &[u8], timestamp: i64) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
}

/// A `checkout.session.completed` event body.
///
/// `custom_fields` is placed as-is on the session, so tests can send any
/// shape Stripe might.
pub fn checkout_completed_event(
    session_id: &str,
    subscription_id: Option<&str>,
    custom_fields: Value,
) -> Value {
    json!({
        "id": fake::event_id(),
        "object": "event",
        "type": "checkout.session.completed",
        "api_version": "2023-10-16",
        "created": 1_700_000_000u64,
        "livemode": false,
        "data": {
            "object": {
                "id": session_id,
                "object": "checkout.session",
                "mode": "subscription",
                "subscription": subscription_id,
                "custom_fields": custom_fields
            }
        }
    })
}

/// Any other event type, with a minimal object.
pub fn event_of_type(event_type: &str) -> Value {
    json!({
        "id": fake::event_id(),
        "object": "event",
        "type": event_type,
        "created": 1_700_000_000u64,
        "livemode": false,
        "data": { "object": { "id": fake::string(14) } }
    })
}

/// Custom field shapes as Stripe sends them.
pub mod field {
    use serde_json::{Value, json};

    /// A dropdown with the given selection and `(label, value)` options.
    pub fn dropdown(key: &str, selected: Option<&str>, options: &[(&str, &str)]) -> Value {
        let options: Vec<Value> = options
            .iter()
            .map(|(label, value)| json!({ "label": label, "value": value }))
            .collect();
        json!({
            "key": key,
            "label": { "type": "custom", "custom": key },
            "optional": false,
            "type": "dropdown",
            "dropdown": { "value": selected, "options": options },
            "text": null
        })
    }

    /// A text field with the given value.
    pub fn text(key: &str, value: Option<&str>) -> Value {
        json!({
            "key": key,
            "label": { "type": "custom", "custom": key },
            "optional": false,
            "type": "text",
            "text": { "value": value },
            "dropdown": null
        })
    }
}

/// Helper functions for generating fake test data
pub mod fake {
    use super::*;

    /// Generate a fake checkout session id
    pub fn session_id() -> String {
        format!("cs_test_{}", Uuid::new_v4().simple())
    }

    /// Generate a fake subscription id
    pub fn subscription_id() -> String {
        format!("sub_{}", &Uuid::new_v4().simple().to_string()[..14])
    }

    /// Generate a fake event id
    pub fn event_id() -> String {
        format!("evt_{}", Uuid::new_v4().simple())
    }

    /// Generate a fake webhook signing secret
    pub fn webhook_secret() -> String {
        format!("whsec_{}", string(32))
    }

    /// Generate a random string of the given length
    pub fn string(length: usize) -> String {
        (0..length).map(|_| fastrand::alphanumeric()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_payload_format() {
        let header = sign_payload("whsec_test", b"{}", 1_700_000_000);
        let (t, v1) = header.split_once(',').unwrap();
        assert_eq!(t, "t=1700000000");
        assert!(v1.starts_with("v1="));
        assert_eq!(v1.len(), 3 + 64);
    }

    #[test]
    fn test_sign_payload_depends_on_body() {
        assert_ne!(sign_payload("whsec_test", b"a", 1), sign_payload("whsec_test", b"b", 1));
    }

    #[test]
    fn test_checkout_completed_event_shape() {
        let event = checkout_completed_event("cs_1", None, json!([]));
        assert_eq!(event["type"], "checkout.session.completed");
        assert_eq!(event["data"]["object"]["id"], "cs_1");
        assert!(event["data"]["object"]["subscription"].is_null());
    }

    #[test]
    fn test_field_builders() {
        let dropdown = field::dropdown("buildingname", Some("w"), &[("West Hall", "w")]);
        assert_eq!(dropdown["dropdown"]["options"][0]["label"], "West Hall");

        let text = field::text("roomnumber", None);
        assert!(text["text"]["value"].is_null());
    }

    #[test]
    fn test_fake_ids() {
        assert!(fake::session_id().starts_with("cs_test_"));
        assert!(fake::subscription_id().starts_with("sub_"));
        assert_ne!(fake::event_id(), fake::event_id());
        assert_eq!(fake::string(10).len(), 10);
    }
}
