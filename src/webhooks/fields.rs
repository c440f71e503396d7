//! Pickup details pulled from checkout custom fields.

use serde::Serialize;

use super::event::{CheckoutSession, CustomField};

/// Placeholder for any field that is missing or can't be resolved.
pub const NOT_AVAILABLE: &str = "N/A";

/// Custom field keys configured on the Stripe checkout.
pub const BUILDING_NAME_KEY: &str = "buildingname";
pub const ROOM_NUMBER_KEY: &str = "roomnumber";
pub const PICKUP_TIME_KEY: &str = "pickuptime";

/// Metadata labels written to the subscription.
pub const BUILDING_NAME_LABEL: &str = "Building Name";
pub const ROOM_NUMBER_LABEL: &str = "Room Number";
pub const PICKUP_TIME_LABEL: &str = "Pickup Time";

/// Metadata written to the subscription after checkout.
///
/// Always carries all three labels; serializes in declaration order so logs
/// read building, room, pickup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PickupMetadata {
    #[serde(rename = "Building Name")]
    pub building_name: String,
    #[serde(rename = "Room Number")]
    pub room_number: String,
    #[serde(rename = "Pickup Time")]
    pub pickup_time: String,
}

impl PickupMetadata {
    /// Resolve the three pickup fields from a checkout session.
    ///
    /// Never fails: anything absent or malformed becomes [`NOT_AVAILABLE`].
    #[must_use]
    pub fn from_session(session: &CheckoutSession) -> Self {
        Self {
            building_name: dropdown_label(session.custom_field(BUILDING_NAME_KEY)),
            room_number: text_value(session.custom_field(ROOM_NUMBER_KEY)),
            pickup_time: dropdown_label(session.custom_field(PICKUP_TIME_KEY)),
        }
    }

    /// Label/value pairs in display order.
    #[must_use]
    pub fn entries(&self) -> [(&'static str, &str); 3] {
        [
            (BUILDING_NAME_LABEL, self.building_name.as_str()),
            (ROOM_NUMBER_LABEL, self.room_number.as_str()),
            (PICKUP_TIME_LABEL, self.pickup_time.as_str()),
        ]
    }
}

/// Label of the selected dropdown option.
pub fn dropdown_label(field: Option<&CustomField>) -> String {
    field
        .and_then(|f| f.dropdown.as_ref())
        .and_then(|dropdown| {
            let selected = dropdown.value.as_deref().filter(|v| !v.is_empty())?;
            dropdown
                .options
                .iter()
                .find(|opt| opt.value.as_deref() == Some(selected))
        })
        .and_then(|opt| opt.label.as_deref())
        .filter(|label| !label.is_empty())
        .unwrap_or(NOT_AVAILABLE)
        .to_string()
}

/// Submitted value of a text field.
pub fn text_value(field: Option<&CustomField>) -> String {
    field
        .and_then(|f| f.text.as_ref())
        .and_then(|text| text.value.as_deref())
        .filter(|value| !value.is_empty())
        .unwrap_or(NOT_AVAILABLE)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field(value: serde_json::Value) -> CustomField {
        serde_json::from_value(value).unwrap()
    }

    fn session(custom_fields: serde_json::Value) -> CheckoutSession {
        serde_json::from_value(json!({
            "id": "cs_test_1",
            "subscription": "sub_123",
            "custom_fields": custom_fields
        }))
        .unwrap()
    }

    #[test]
    fn test_dropdown_resolves_matching_label() {
        let building = field(json!({
            "key": "buildingname",
            "type": "dropdown",
            "dropdown": {
                "value": "a",
                "options": [{ "label": "Building A", "value": "a" }]
            }
        }));
        assert_eq!(dropdown_label(Some(&building)), "Building A");
    }

    #[test]
    fn test_dropdown_without_match_is_placeholder() {
        let building = field(json!({
            "key": "buildingname",
            "dropdown": {
                "value": "z",
                "options": [{ "label": "Building A", "value": "a" }]
            }
        }));
        assert_eq!(dropdown_label(Some(&building)), NOT_AVAILABLE);
    }

    #[test]
    fn test_dropdown_absent_field_is_placeholder() {
        assert_eq!(dropdown_label(None), NOT_AVAILABLE);
    }

    #[test]
    fn test_dropdown_degenerate_shapes_are_placeholder() {
        let no_dropdown = field(json!({ "key": "pickuptime", "type": "text" }));
        assert_eq!(dropdown_label(Some(&no_dropdown)), NOT_AVAILABLE);

        let no_value = field(json!({
            "key": "pickuptime",
            "dropdown": { "value": null, "options": [{ "label": "Morning", "value": "am" }] }
        }));
        assert_eq!(dropdown_label(Some(&no_value)), NOT_AVAILABLE);

        let empty_value = field(json!({
            "key": "pickuptime",
            "dropdown": { "value": "", "options": [{ "label": "Blank", "value": "" }] }
        }));
        assert_eq!(dropdown_label(Some(&empty_value)), NOT_AVAILABLE);

        let no_options = field(json!({
            "key": "pickuptime",
            "dropdown": { "value": "am" }
        }));
        assert_eq!(dropdown_label(Some(&no_options)), NOT_AVAILABLE);

        let empty_label = field(json!({
            "key": "pickuptime",
            "dropdown": { "value": "am", "options": [{ "label": "", "value": "am" }] }
        }));
        assert_eq!(dropdown_label(Some(&empty_label)), NOT_AVAILABLE);
    }

    #[test]
    fn test_dropdown_mistyped_data_is_placeholder() {
        let option_without_value = field(json!({
            "key": "buildingname",
            "dropdown": { "value": "westhall", "options": [{ "label": "West Hall" }] }
        }));
        assert_eq!(dropdown_label(Some(&option_without_value)), NOT_AVAILABLE);

        let numeric_value = field(json!({
            "key": "buildingname",
            "dropdown": { "value": 2, "options": [{ "label": "West Hall", "value": "2" }] }
        }));
        assert_eq!(dropdown_label(Some(&numeric_value)), NOT_AVAILABLE);

        let dropdown_as_string = field(json!({ "key": "buildingname", "dropdown": "westhall" }));
        assert_eq!(dropdown_label(Some(&dropdown_as_string)), NOT_AVAILABLE);

        let numeric_label = field(json!({
            "key": "buildingname",
            "dropdown": { "value": "w", "options": [{ "label": 5, "value": "w" }] }
        }));
        assert_eq!(dropdown_label(Some(&numeric_label)), NOT_AVAILABLE);
    }

    #[test]
    fn test_text_mistyped_data_is_placeholder() {
        let numeric = field(json!({ "key": "roomnumber", "text": { "value": 204 } }));
        assert_eq!(text_value(Some(&numeric)), NOT_AVAILABLE);

        let text_as_string = field(json!({ "key": "roomnumber", "text": "204" }));
        assert_eq!(text_value(Some(&text_as_string)), NOT_AVAILABLE);
    }

    #[test]
    fn test_keyless_entries_are_skipped() {
        let s = session(json!([
            { "type": "text", "text": { "value": "orphan" } },
            { "key": 12, "text": { "value": "numeric key" } },
            { "key": "roomnumber", "type": "text", "text": { "value": "12B" } }
        ]));
        assert_eq!(PickupMetadata::from_session(&s).room_number, "12B");
    }

    #[test]
    fn test_dropdown_picks_the_selected_option() {
        let pickup = field(json!({
            "key": "pickuptime",
            "dropdown": {
                "value": "pm",
                "options": [
                    { "label": "Morning (9-12)", "value": "am" },
                    { "label": "Afternoon (1-5)", "value": "pm" }
                ]
            }
        }));
        assert_eq!(dropdown_label(Some(&pickup)), "Afternoon (1-5)");
    }

    #[test]
    fn test_text_value() {
        let room = field(json!({ "key": "roomnumber", "type": "text", "text": { "value": "204" } }));
        assert_eq!(text_value(Some(&room)), "204");
        assert_eq!(text_value(None), NOT_AVAILABLE);

        let null_value = field(json!({ "key": "roomnumber", "text": { "value": null } }));
        assert_eq!(text_value(Some(&null_value)), NOT_AVAILABLE);

        let no_text = field(json!({ "key": "roomnumber" }));
        assert_eq!(text_value(Some(&no_text)), NOT_AVAILABLE);
    }

    #[test]
    fn test_metadata_from_full_session() {
        let s = session(json!([
            {
                "key": "buildingname",
                "type": "dropdown",
                "dropdown": {
                    "value": "westhall",
                    "options": [
                        { "label": "East Hall", "value": "easthall" },
                        { "label": "West Hall", "value": "westhall" }
                    ]
                }
            },
            { "key": "roomnumber", "type": "text", "text": { "value": "204" } },
            {
                "key": "pickuptime",
                "type": "dropdown",
                "dropdown": {
                    "value": "midnight",
                    "options": [{ "label": "Morning", "value": "am" }]
                }
            }
        ]));

        let metadata = PickupMetadata::from_session(&s);
        assert_eq!(
            metadata,
            PickupMetadata {
                building_name: "West Hall".to_string(),
                room_number: "204".to_string(),
                pickup_time: NOT_AVAILABLE.to_string(),
            }
        );
    }

    #[test]
    fn test_metadata_without_custom_fields() {
        let metadata = PickupMetadata::from_session(&session(json!([])));
        for (_, value) in metadata.entries() {
            assert_eq!(value, NOT_AVAILABLE);
        }
    }

    #[test]
    fn test_unrelated_fields_are_ignored() {
        let s = session(json!([
            { "key": "giftnote", "type": "text", "text": { "value": "hi" } },
            { "key": "roomnumber", "type": "text", "text": { "value": "12B" } }
        ]));
        let metadata = PickupMetadata::from_session(&s);
        assert_eq!(metadata.room_number, "12B");
        assert_eq!(metadata.building_name, NOT_AVAILABLE);
    }

    #[test]
    fn test_metadata_serializes_with_labels_in_order() {
        let metadata = PickupMetadata {
            building_name: "West Hall".to_string(),
            room_number: "204".to_string(),
            pickup_time: "N/A".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&metadata).unwrap(),
            r#"{"Building Name":"West Hall","Room Number":"204","Pickup Time":"N/A"}"#
        );
        assert_eq!(
            metadata.entries().map(|(label, _)| label),
            ["Building Name", "Room Number", "Pickup Time"]
        );
    }
}
