//! Client-submitted event fields.

use chrono::NaiveDateTime;
use evreg_id::EventId;
use serde::{Deserialize, Serialize};

use crate::event::EventStatus;
use crate::timestamp;
use crate::validation::{field, FieldViolation, ViolationReason, Violations};

/// Event fields as submitted by a client on create or update.
///
/// Every field is optional at this stage so that missing values can be
/// reported together. There are no `free`/`offline` fields: those are always
/// derived. `id` and `eventStatus` are accepted only so that create can
/// reject them explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EventId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "timestamp::deserialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub begin_enrollment_date_time: Option<NaiveDateTime>,
    #[serde(
        default,
        deserialize_with = "timestamp::deserialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub close_enrollment_date_time: Option<NaiveDateTime>,
    #[serde(
        default,
        deserialize_with = "timestamp::deserialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub begin_event_date_time: Option<NaiveDateTime>,
    #[serde(
        default,
        deserialize_with = "timestamp::deserialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_event_date_time: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_price: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_of_enrollment: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_status: Option<EventStatus>,
}

/// The client-controlled fields of an event, all present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetails {
    pub name: String,
    pub description: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub begin_enrollment_date_time: NaiveDateTime,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub close_enrollment_date_time: NaiveDateTime,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub begin_event_date_time: NaiveDateTime,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub end_event_date_time: NaiveDateTime,
    #[serde(default)]
    pub location: Option<String>,
    pub base_price: u32,
    pub max_price: u32,
    #[serde(default)]
    pub limit_of_enrollment: u32,
}

impl EventInput {
    /// Checks that every required field is present.
    ///
    /// `name` and `description` must also be non-blank. Every missing field
    /// is reported with [`ViolationReason::Required`].
    pub fn into_details(self) -> Result<EventDetails, Violations> {
        let mut missing = Vec::new();
        let mut require = |present: bool, name: &'static str| {
            if !present {
                missing.push(FieldViolation::new(name, ViolationReason::Required));
            }
        };

        require(is_filled(&self.name), field::NAME);
        require(is_filled(&self.description), field::DESCRIPTION);
        require(
            self.begin_enrollment_date_time.is_some(),
            field::BEGIN_ENROLLMENT_DATE_TIME,
        );
        require(
            self.close_enrollment_date_time.is_some(),
            field::CLOSE_ENROLLMENT_DATE_TIME,
        );
        require(self.begin_event_date_time.is_some(), field::BEGIN_EVENT_DATE_TIME);
        require(self.end_event_date_time.is_some(), field::END_EVENT_DATE_TIME);
        require(self.base_price.is_some(), field::BASE_PRICE);
        require(self.max_price.is_some(), field::MAX_PRICE);

        match self {
            Self {
                name: Some(name),
                description: Some(description),
                begin_enrollment_date_time: Some(begin_enrollment_date_time),
                close_enrollment_date_time: Some(close_enrollment_date_time),
                begin_event_date_time: Some(begin_event_date_time),
                end_event_date_time: Some(end_event_date_time),
                base_price: Some(base_price),
                max_price: Some(max_price),
                location,
                limit_of_enrollment,
                ..
            } if missing.is_empty() => Ok(EventDetails {
                name,
                description,
                begin_enrollment_date_time,
                close_enrollment_date_time,
                begin_event_date_time,
                end_event_date_time,
                location,
                base_price,
                max_price,
                limit_of_enrollment: limit_of_enrollment.unwrap_or(0),
            }),
            _ => Err(Violations::from(missing)),
        }
    }
}

impl From<EventDetails> for EventInput {
    fn from(details: EventDetails) -> Self {
        Self {
            id: None,
            name: Some(details.name),
            description: Some(details.description),
            begin_enrollment_date_time: Some(details.begin_enrollment_date_time),
            close_enrollment_date_time: Some(details.close_enrollment_date_time),
            begin_event_date_time: Some(details.begin_event_date_time),
            end_event_date_time: Some(details.end_event_date_time),
            location: details.location,
            base_price: Some(details.base_price),
            max_price: Some(details.max_price),
            limit_of_enrollment: Some(details.limit_of_enrollment),
            event_status: None,
        }
    }
}

fn is_filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> EventInput {
        serde_json::from_value(serde_json::json!({
            "name": "spring",
            "description": "REST API",
            "beginEnrollmentDateTime": "2022-03-27T11:30:00",
            "closeEnrollmentDateTime": "2022-03-28T11:30:00",
            "beginEventDateTime": "2022-04-27T11:30:00",
            "endEventDateTime": "2022-04-28T11:30:00",
            "basePrice": 100,
            "maxPrice": 200,
            "limitOfEnrollment": 100,
            "location": "X"
        }))
        .unwrap()
    }

    #[test]
    fn test_complete_input_converts() {
        let details = complete().into_details().unwrap();
        assert_eq!(details.name, "spring");
        assert_eq!(details.base_price, 100);
        assert_eq!(details.limit_of_enrollment, 100);
        assert_eq!(details.location.as_deref(), Some("X"));
    }

    #[test]
    fn test_empty_input_reports_every_required_field() {
        let violations = EventInput::default().into_details().unwrap_err();
        assert_eq!(violations.len(), 8);
        assert!(violations
            .iter()
            .all(|v| v.reason == ViolationReason::Required));
        assert!(!violations.mentions(field::LOCATION));
        assert!(!violations.mentions(field::LIMIT_OF_ENROLLMENT));
    }

    #[test]
    fn test_blank_name_is_required() {
        let input = EventInput {
            name: Some("  ".to_string()),
            ..complete()
        };
        let violations = input.into_details().unwrap_err();
        assert_eq!(violations.len(), 1);
        assert!(violations.contains(field::NAME, ViolationReason::Required));
    }

    #[test]
    fn test_limit_of_enrollment_defaults_to_zero() {
        let input = EventInput {
            limit_of_enrollment: None,
            location: None,
            ..complete()
        };
        let details = input.into_details().unwrap();
        assert_eq!(details.limit_of_enrollment, 0);
        assert_eq!(details.location, None);
    }

    #[test]
    fn test_minute_precision_timestamps_are_accepted() {
        let input: EventInput = serde_json::from_value(serde_json::json!({
            "name": "Spring",
            "description": "REST API Development with Spring",
            "beginEnrollmentDateTime": "2022-03-27T11:30",
            "closeEnrollmentDateTime": "2022-03-28T11:30",
            "beginEventDateTime": "2022-04-27T11:30",
            "endEventDateTime": "2022-04-28T11:30",
            "basePrice": 100,
            "maxPrice": 200,
            "limitOfEnrollment": 100,
            "location": "X"
        }))
        .unwrap();

        let details = input.into_details().unwrap();
        let reference = complete().into_details().unwrap();
        assert_eq!(
            details.begin_enrollment_date_time,
            reference.begin_enrollment_date_time
        );
        assert_eq!(
            details.close_enrollment_date_time,
            reference.close_enrollment_date_time
        );
        assert_eq!(details.begin_event_date_time, reference.begin_event_date_time);
        assert_eq!(details.end_event_date_time, reference.end_event_date_time);
    }

    #[test]
    fn test_malformed_timestamp_is_rejected() {
        let result = serde_json::from_value::<EventInput>(serde_json::json!({
            "beginEventDateTime": "27/04/2022 11:30"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_null_timestamp_is_missing() {
        let input: EventInput = serde_json::from_value(serde_json::json!({
            "beginEventDateTime": null
        }))
        .unwrap();
        assert_eq!(input.begin_event_date_time, None);
    }

    #[test]
    fn test_derived_fields_in_payload_are_ignored() {
        let input: EventInput = serde_json::from_value(serde_json::json!({
            "name": "spring",
            "free": true,
            "offline": false
        }))
        .unwrap();
        assert_eq!(input.name.as_deref(), Some("spring"));
    }

    #[test]
    fn test_id_and_status_are_captured() {
        let input: EventInput = serde_json::from_value(serde_json::json!({
            "id": 100,
            "eventStatus": "PUBLISHED"
        }))
        .unwrap();
        assert_eq!(input.id, Some(EventId::new(100)));
        assert_eq!(input.event_status, Some(EventStatus::Published));
    }
}
