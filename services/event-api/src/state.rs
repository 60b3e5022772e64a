//! Application state shared across request handlers.

use std::sync::Arc;

use crate::assembler::EventResourceAssembler;
use crate::db::EventStore;
use crate::identity::IdentityResolver;
use crate::service::EventService;

/// Shared application state.
///
/// This is passed to all request handlers via Axum's state extractor.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    events: EventService,
    identity: Arc<dyn IdentityResolver>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        store: Arc<dyn EventStore>,
        identity: Arc<dyn IdentityResolver>,
        assembler: EventResourceAssembler,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                events: EventService::new(store, assembler),
                identity,
            }),
        }
    }

    /// Get the event service.
    pub fn events(&self) -> &EventService {
        &self.inner.events
    }

    /// Get the resolver for bearer tokens.
    pub fn identity(&self) -> &dyn IdentityResolver {
        self.inner.identity.as_ref()
    }

    pub fn assembler(&self) -> &EventResourceAssembler {
        self.inner.events.assembler()
    }

    pub fn store(&self) -> &dyn EventStore {
        self.inner.events.store().as_ref()
    }
}
