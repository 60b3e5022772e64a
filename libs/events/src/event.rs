//! The persisted Event entity.

use evreg_id::{AccountId, EventId};
use serde::{Deserialize, Serialize};

use crate::input::EventDetails;

// =============================================================================
// Status
// =============================================================================

/// Lifecycle status of an event.
///
/// Every event starts as `Draft`. Publishing is driven outside this crate;
/// `Published` is recognized so stored records round-trip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    #[default]
    Draft,
    Published,
}

impl EventStatus {
    /// Storage and wire label.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Draft => "DRAFT",
            EventStatus::Published => "PUBLISHED",
        }
    }

    /// Parses a storage label.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "DRAFT" => Some(EventStatus::Draft),
            "PUBLISHED" => Some(EventStatus::Published),
            _ => None,
        }
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Entity
// =============================================================================

/// Reference to the account managing an event.
///
/// Serialized as `{"id": "acct_..."}` so the account itself never leaks
/// into event payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manager {
    pub id: AccountId,
}

/// An event as persisted, without its store-assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(flatten)]
    pub details: EventDetails,

    /// Derived: the event has a non-blank location.
    pub offline: bool,

    /// Derived: both prices are zero.
    pub free: bool,

    pub event_status: EventStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager: Option<Manager>,
}

impl Event {
    /// A new draft managed by `manager`.
    ///
    /// Derived flags are left unset; callers run [`Event::recompute`] before
    /// the record is written.
    pub fn draft(details: EventDetails, manager: AccountId) -> Self {
        Self {
            details,
            offline: false,
            free: false,
            event_status: EventStatus::Draft,
            manager: Some(Manager { id: manager }),
        }
    }

    /// Replaces the client-controlled fields, keeping the manager.
    ///
    /// The status is only replaced when `status` is given.
    pub fn revise(self, details: EventDetails, status: Option<EventStatus>) -> Self {
        Self {
            details,
            event_status: status.unwrap_or(self.event_status),
            ..self
        }
    }

    /// Recomputes `free` and `offline` from prices and location.
    ///
    /// Every other field is left as is, and applying it twice is the same as
    /// applying it once.
    #[must_use]
    pub fn recompute(self) -> Self {
        let free = self.details.base_price == 0 && self.details.max_price == 0;
        let offline = self
            .details
            .location
            .as_deref()
            .is_some_and(|location| !location.trim().is_empty());
        Self {
            free,
            offline,
            ..self
        }
    }

    pub fn manager_id(&self) -> Option<AccountId> {
        self.manager.map(|m| m.id)
    }
}

/// A persisted event together with its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: EventId,

    #[serde(flatten)]
    pub event: Event,
}

// =============================================================================
// Tests
// =============================================================================
