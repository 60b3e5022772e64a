//! Id definitions.

use crate::{prefixed_id, IdError};

// =============================================================================
// Principals and Requests
// =============================================================================

prefixed_id!(
    /// Identity of an account (the manager of an event).
    AccountId,
    "acct"
);

prefixed_id!(
    /// Correlation id attached to every API request.
    RequestId,
    "req"
);

// =============================================================================
// Events
// =============================================================================

/// Event id is a positive integer handed out by the event store.
///
/// It is never generated client-side; the store assigns it exactly once when
/// the record is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventId(i64);

impl EventId {
    /// Creates an EventId from an i64.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the underlying i64 value.
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for EventId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(IdError::Empty);
        }
        match s.parse::<i64>() {
            Ok(id) if id > 0 => Ok(Self(id)),
            _ => Err(IdError::InvalidNumber(s.to_string())),
        }
    }
}

impl From<i64> for EventId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<EventId> for i64 {
    fn from(id: EventId) -> Self {
        id.0
    }
}

impl serde::Serialize for EventId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i64(self.0)
    }
}

impl<'de> serde::Deserialize<'de> for EventId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let id = i64::deserialize(deserializer)?;
        Ok(Self(id))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_account_id_prefix() {
        let id = AccountId::new();
        assert!(id.to_string().starts_with("acct_"));
    }

    #[test]
    fn test_account_id_rejects_request_prefix() {
        let request = RequestId::new().to_string();
        let result: Result<AccountId, _> = request.parse();
        assert!(matches!(
            result.unwrap_err(),
            IdError::InvalidPrefix { expected: "acct", .. }
        ));
    }

    #[test]
    fn test_account_id_missing_separator() {
        let result: Result<AccountId, _> = "acct01HV4Z2WQXKJNM8GPQY6VBKC3D".parse();
        assert!(matches!(result.unwrap_err(), IdError::MissingSeparator));
    }

    #[test]
    fn test_account_id_invalid_ulid() {
        let result: Result<AccountId, _> = "acct_nope".parse();
        assert!(matches!(result.unwrap_err(), IdError::InvalidUlid(_)));
    }

    #[test]
    fn test_account_id_from_bytes_is_stable() {
        let a = AccountId::from_bytes([7; 16]);
        let b = AccountId::from_bytes([7; 16]);
        assert_eq!(a, b);
        assert_eq!(a.to_string().parse::<AccountId>().unwrap(), a);
    }

    #[test]
    fn test_account_id_json_is_string() {
        let id = AccountId::from_bytes([1; 16]);
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json.as_str().unwrap(), id.to_string());
    }

    #[test]
    fn test_event_id_parse() {
        assert_eq!("12345".parse::<EventId>().unwrap(), EventId::new(12345));
        assert!("".parse::<EventId>().unwrap_err().is_empty());
        assert!(matches!(
            "0".parse::<EventId>().unwrap_err(),
            IdError::InvalidNumber(_)
        ));
        assert!(matches!(
            "-3".parse::<EventId>().unwrap_err(),
            IdError::InvalidNumber(_)
        ));
        assert!(matches!(
            "evt_1".parse::<EventId>().unwrap_err(),
            IdError::InvalidNumber(_)
        ));
    }

    #[test]
    fn test_event_id_json_is_number() {
        let json = serde_json::to_string(&EventId::new(100)).unwrap();
        assert_eq!(json, "100");
        let parsed: EventId = serde_json::from_str("100").unwrap();
        assert_eq!(parsed.value(), 100);
    }

    proptest! {
        #[test]
        fn prop_positive_event_ids_parse_back(n in 1i64..i64::MAX) {
            let id = EventId::new(n);
            prop_assert_eq!(id.to_string().parse::<EventId>().unwrap(), id);
        }
    }
}
