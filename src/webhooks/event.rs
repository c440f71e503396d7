//! Stripe event shapes.
//!
//! Only the parts of the payload this service reads are modelled; anything
//! else in the JSON is ignored by serde.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Event type that triggers the metadata update.
pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";

/// A Stripe event that passed signature verification.
///
/// Only [`StripeSignatureVerifier`](super::StripeSignatureVerifier) builds
/// these from raw bytes; never deserialize one from an unverified body.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    /// Event ID (`evt_...`).
    pub id: String,
    /// Event type (e.g., "checkout.session.completed").
    #[serde(rename = "type")]
    pub event_type: String,
    /// Event data.
    pub data: WebhookEventData,
    /// Timestamp when the event was created.
    #[serde(default)]
    pub created: u64,
    #[serde(default)]
    pub livemode: bool,
}

/// Webhook event data.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEventData {
    /// The object that triggered the event.
    pub object: serde_json::Value,
}

/// Which branch of the dispatcher an event takes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    CheckoutSessionCompleted,
    Other(String),
}

impl WebhookEvent {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self.event_type.as_str() {
            CHECKOUT_SESSION_COMPLETED => EventKind::CheckoutSessionCompleted,
            other => EventKind::Other(other.to_string()),
        }
    }

    /// Interpret `data.object` as a checkout session.
    pub fn checkout_session(&self) -> serde_json::Result<CheckoutSession> {
        CheckoutSession::deserialize(&self.data.object)
    }
}

/// The checkout session carried by `checkout.session.completed`.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    /// Checkout session ID (`cs_...`).
    pub id: String,
    #[serde(default)]
    pub subscription: Option<SubscriptionRef>,
    /// Entries that aren't JSON objects are dropped; a value that isn't a
    /// list at all is still a malformed session.
    #[serde(default, deserialize_with = "custom_field_list")]
    pub custom_fields: Vec<CustomField>,
}

impl CheckoutSession {
    /// The subscription created by this checkout, if any.
    ///
    /// An empty id is treated the same as a missing one.
    #[must_use]
    pub fn subscription_id(&self) -> Option<&str> {
        self.subscription
            .as_ref()
            .map(SubscriptionRef::id)
            .filter(|id| !id.is_empty())
    }

    /// First custom field with the given key.
    #[must_use]
    pub fn custom_field(&self, key: &str) -> Option<&CustomField> {
        self.custom_fields
            .iter()
            .find(|field| field.key.as_deref() == Some(key))
    }
}

/// Subscription reference: a bare id, or the expanded object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SubscriptionRef {
    Id(String),
    Object { id: String },
}

impl SubscriptionRef {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) | Self::Object { id } => id,
        }
    }
}

/// One custom field collected at checkout.
///
/// Every member is optional and parsed leniently: a member with the wrong
/// JSON type reads as absent instead of failing the whole session.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomField {
    /// Developer-chosen key, e.g. `buildingname`.
    #[serde(default, deserialize_with = "lenient")]
    pub key: Option<String>,
    /// Field type reported by Stripe (`dropdown`, `text`, `numeric`).
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub field_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub dropdown: Option<DropdownField>,
    #[serde(default, deserialize_with = "lenient")]
    pub text: Option<TextField>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DropdownField {
    /// Value of the option the customer picked.
    #[serde(default, deserialize_with = "lenient")]
    pub value: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub options: Vec<DropdownOption>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DropdownOption {
    #[serde(default, deserialize_with = "lenient")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextField {
    #[serde(default, deserialize_with = "lenient")]
    pub value: Option<String>,
}

/// `None` for null or for anything that doesn't fit `T`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Elements that don't fit `T` are skipped; a non-list reads as empty.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => parse_each(items),
        _ => Vec::new(),
    })
}

/// Stripe sends `null` rather than `[]` when there are no custom fields.
fn custom_field_list<'de, D>(deserializer: D) -> Result<Vec<CustomField>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Value>>::deserialize(deserializer)?
        .map(parse_each)
        .unwrap_or_default())
}

fn parse_each<T: DeserializeOwned>(items: Vec<Value>) -> Vec<T> {
    items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect()
}
