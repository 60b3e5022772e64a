//! Event use cases: create, get, update, list.
//!
//! [`EventService`] composes the validator, the store, and the assembler.
//! Every write validates first, then recomputes the derived fields right
//! before the store call. Errors are scoped to the request and never
//! retried here.

use std::sync::Arc;

use evreg_events::{
    validate, Event, EventDetails, EventInput, EventStatus, PageRequest, Violations,
};
use evreg_id::EventId;
use thiserror::Error;
use tracing::{debug, info};

use crate::assembler::{AssemblyContext, EventPageResource, EventResource, EventResourceAssembler};
use crate::db::{DbError, EventStore};
use crate::identity::Principal;

/// Why an event operation was refused.
#[derive(Debug, Error)]
pub enum EventError {
    /// One or more required fields are missing; ordering rules were skipped.
    #[error("required fields missing")]
    Required(Violations),

    /// The candidate broke one or more validation rules.
    #[error("event validation failed")]
    ValidationFailed(Violations),

    /// The client tried to choose the id of a new event.
    #[error("event id is assigned by the server")]
    IdentityConflict,

    /// The client tried to set the status of a new event.
    #[error("new events cannot be created as {0}")]
    IllegalState(EventStatus),

    #[error("event {0} not found")]
    NotFound(EventId),

    /// Writes need an authenticated caller.
    #[error("authentication required")]
    Unauthenticated,

    #[error(transparent)]
    Store(#[from] DbError),
}

/// Result of a successful create: where the event lives, and its body.
#[derive(Debug, Clone)]
pub struct Created {
    pub location: String,
    pub resource: EventResource,
}

/// Orchestrates the event use cases.
#[derive(Clone)]
pub struct EventService {
    store: Arc<dyn EventStore>,
    assembler: EventResourceAssembler,
}

impl EventService {
    pub fn new(store: Arc<dyn EventStore>, assembler: EventResourceAssembler) -> Self {
        Self { store, assembler }
    }

    pub fn assembler(&self) -> &EventResourceAssembler {
        &self.assembler
    }

    pub fn store(&self) -> &Arc<dyn EventStore> {
        &self.store
    }

    /// Creates a draft event managed by the caller.
    pub async fn create(
        &self,
        input: EventInput,
        principal: &Principal,
    ) -> Result<Created, EventError> {
        let manager = principal.account_id().ok_or(EventError::Unauthenticated)?;

        if input.id.is_some() {
            return Err(EventError::IdentityConflict);
        }
        if let Some(status) = input.event_status.filter(|s| *s != EventStatus::default()) {
            return Err(EventError::IllegalState(status));
        }

        let details = check(input)?;
        let event = Event::draft(details, manager).recompute();
        let record = self.store.create(event).await?;

        info!(event_id = %record.id, manager = %manager, "Event created");

        let location = self.assembler.links().event(record.id);
        let resource = self
            .assembler
            .assemble(record, principal, AssemblyContext::Created);
        Ok(Created { location, resource })
    }

    /// Reads one event. Anonymous callers may read.
    pub async fn get(&self, id: EventId, principal: &Principal) -> Result<EventResource, EventError> {
        let record = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(EventError::NotFound(id))?;

        Ok(self
            .assembler
            .assemble(record, principal, AssemblyContext::Fetched))
    }

    /// Lists one page of events. An empty page is a normal result.
    pub async fn list(
        &self,
        request: &PageRequest,
        principal: &Principal,
    ) -> Result<EventPageResource, EventError> {
        let page = self.store.list_page(request).await?;
        Ok(self.assembler.assemble_page(page, request, principal))
    }

    /// Overwrites the client-controlled fields of an event.
    ///
    /// `id` and `manager` never change. The status is taken from the input
    /// when present and kept otherwise. An `id` in the body is ignored.
    pub async fn update(
        &self,
        id: EventId,
        input: EventInput,
        principal: &Principal,
    ) -> Result<EventResource, EventError> {
        if !principal.is_authenticated() {
            return Err(EventError::Unauthenticated);
        }

        let current = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(EventError::NotFound(id))?;

        let status = input.event_status;
        let details = check(input)?;
        let event = current.event.revise(details, status).recompute();

        // The record can disappear between the read and the write.
        let record = self
            .store
            .update(id, event)
            .await?
            .ok_or(EventError::NotFound(id))?;

        info!(event_id = %record.id, "Event updated");

        Ok(self
            .assembler
            .assemble(record, principal, AssemblyContext::Updated))
    }
}

/// Presence checks, then the validation rules.
fn check(input: EventInput) -> Result<EventDetails, EventError> {
    let details = input.into_details().map_err(|violations| {
        debug!(fields = ?field_names(&violations), "Required fields missing");
        EventError::Required(violations)
    })?;

    let violations = validate(&details);
    if !violations.is_empty() {
        debug!(fields = ?field_names(&violations), "Event validation failed");
        return Err(EventError::ValidationFailed(violations));
    }

    Ok(details)
}

fn field_names(violations: &Violations) -> Vec<&'static str> {
    violations.iter().map(|v| v.field).collect()
}

impl EventError {
    /// Violations carried by this error, if any.
    pub fn violations(&self) -> Option<&Violations> {
        match self {
            EventError::Required(v) | EventError::ValidationFailed(v) => Some(v),
            _ => None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
