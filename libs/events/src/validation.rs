//! Cross-field validation of event details.
//!
//! [`validate`] is a pure function over [`EventDetails`]. Each rule is checked
//! independently and every violation found is returned; nothing
//! short-circuits.
//!
//! The four timestamp rules overlap on purpose. Each timestamp is checked
//! against all three others, so a single out-of-order timestamp usually flags
//! more than one field. Callers rely on exactly which fields are flagged for a
//! given input, so the comparisons below must stay as they are.

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};

use crate::input::EventDetails;

/// Wire names of event fields, as used in violations.
pub mod field {
    pub const NAME: &str = "name";
    pub const DESCRIPTION: &str = "description";
    pub const BEGIN_ENROLLMENT_DATE_TIME: &str = "beginEnrollmentDateTime";
    pub const CLOSE_ENROLLMENT_DATE_TIME: &str = "closeEnrollmentDateTime";
    pub const BEGIN_EVENT_DATE_TIME: &str = "beginEventDateTime";
    pub const END_EVENT_DATE_TIME: &str = "endEventDateTime";
    pub const LOCATION: &str = "location";
    pub const BASE_PRICE: &str = "basePrice";
    pub const MAX_PRICE: &str = "maxPrice";
    pub const LIMIT_OF_ENROLLMENT: &str = "limitOfEnrollment";
}

/// Machine-readable reason a field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ViolationReason {
    Required,
    WrongValue,
    WrongBeginEventDateTime,
    WrongEndEventDateTime,
    WrongBeginEnrollmentDateTime,
    WrongCloseEnrollmentDateTime,
}

impl ViolationReason {
    /// Reason code as reported to clients.
    pub fn code(&self) -> &'static str {
        match self {
            ViolationReason::Required => "required",
            ViolationReason::WrongValue => "wrongValue",
            ViolationReason::WrongBeginEventDateTime => "wrongBeginEventDateTime",
            ViolationReason::WrongEndEventDateTime => "wrongEndEventDateTime",
            ViolationReason::WrongBeginEnrollmentDateTime => "wrongBeginEnrollmentDateTime",
            ViolationReason::WrongCloseEnrollmentDateTime => "wrongCloseEnrollmentDateTime",
        }
    }
}

/// A single rejected field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldViolation {
    pub field: &'static str,
    pub reason: ViolationReason,
}

impl FieldViolation {
    pub const fn new(field: &'static str, reason: ViolationReason) -> Self {
        Self { field, reason }
    }

    /// Default human-readable message, e.g. `BasePrice is wrong`.
    pub fn message(&self) -> String {
        let mut chars = self.field.chars();
        let field = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
            None => String::new(),
        };
        match self.reason {
            ViolationReason::Required => format!("{field} is required"),
            _ => format!("{field} is wrong"),
        }
    }
}

impl Serialize for FieldViolation {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("FieldViolation", 3)?;
        state.serialize_field("field", self.field)?;
        state.serialize_field("code", self.reason.code())?;
        state.serialize_field("message", &self.message())?;
        state.end()
    }
}

/// Every violation found for one candidate, in rule order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Violations(Vec<FieldViolation>);

impl Violations {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldViolation> {
        self.0.iter()
    }

    /// True if `field` was rejected for `reason`.
    pub fn contains(&self, field: &str, reason: ViolationReason) -> bool {
        self.0.iter().any(|v| v.field == field && v.reason == reason)
    }

    /// True if `field` was rejected for any reason.
    pub fn mentions(&self, field: &str) -> bool {
        self.0.iter().any(|v| v.field == field)
    }
}

impl From<Vec<FieldViolation>> for Violations {
    fn from(violations: Vec<FieldViolation>) -> Self {
        Self(violations)
    }
}

impl IntoIterator for Violations {
    type Item = FieldViolation;
    type IntoIter = std::vec::IntoIter<FieldViolation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Violations {
    type Item = &'a FieldViolation;
    type IntoIter = std::slice::Iter<'a, FieldViolation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Checks the price rule and the four timestamp-ordering rules.
///
/// Returns an empty set iff the details are acceptable for persistence.
pub fn validate(details: &EventDetails) -> Violations {
    let mut violations = Vec::new();

    // maxPrice == 0 means "no maximum".
    if details.max_price != 0 && details.base_price > details.max_price {
        violations.push(FieldViolation::new(field::BASE_PRICE, ViolationReason::WrongValue));
        violations.push(FieldViolation::new(field::MAX_PRICE, ViolationReason::WrongValue));
    }

    let Timestamps {
        begin_enrollment,
        close_enrollment,
        begin_event,
        end_event,
    } = Timestamps::of(details);

    if begin_event > end_event || begin_event < begin_enrollment || begin_event < close_enrollment
    {
        violations.push(FieldViolation::new(
            field::BEGIN_EVENT_DATE_TIME,
            ViolationReason::WrongBeginEventDateTime,
        ));
    }

    if end_event < begin_event || end_event < begin_enrollment || end_event < close_enrollment {
        violations.push(FieldViolation::new(
            field::END_EVENT_DATE_TIME,
            ViolationReason::WrongEndEventDateTime,
        ));
    }

    if begin_enrollment > close_enrollment
        || begin_enrollment > begin_event
        || begin_enrollment > end_event
    {
        violations.push(FieldViolation::new(
            field::BEGIN_ENROLLMENT_DATE_TIME,
            ViolationReason::WrongBeginEnrollmentDateTime,
        ));
    }

    if close_enrollment < begin_enrollment
        || close_enrollment > begin_event
        || close_enrollment > end_event
    {
        violations.push(FieldViolation::new(
            field::CLOSE_ENROLLMENT_DATE_TIME,
            ViolationReason::WrongCloseEnrollmentDateTime,
        ));
    }

    Violations(violations)
}

struct Timestamps {
    begin_enrollment: NaiveDateTime,
    close_enrollment: NaiveDateTime,
    begin_event: NaiveDateTime,
    end_event: NaiveDateTime,
}

impl Timestamps {
    fn of(details: &EventDetails) -> Self {
        Self {
            begin_enrollment: details.begin_enrollment_date_time,
            close_enrollment: details.close_enrollment_date_time,
            begin_event: details.begin_event_date_time,
            end_event: details.end_event_date_time,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
