//! In-memory event store.
//!
//! Used when no database is configured and throughout the test suite. Ids
//! start at 1 and are never reused, matching a Postgres `BIGSERIAL`.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use evreg_events::{Event, EventRecord, Page, PageRequest};
use evreg_id::EventId;
use tokio::sync::RwLock;

use super::{DbError, EventStore};

#[derive(Debug, Default)]
struct Inner {
    last_id: i64,
    records: BTreeMap<EventId, EventRecord>,
}

/// Event store holding every record in a map behind a single lock.
#[derive(Clone, Debug, Default)]
pub struct InMemoryEventStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryEventStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored events.
    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.records.is_empty()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn create(&self, event: Event) -> Result<EventRecord, DbError> {
        let mut inner = self.inner.write().await;
        inner.last_id += 1;
        let record = EventRecord {
            id: EventId::new(inner.last_id),
            event,
        };
        inner.records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: EventId) -> Result<Option<EventRecord>, DbError> {
        Ok(self.inner.read().await.records.get(&id).cloned())
    }

    async fn update(&self, id: EventId, event: Event) -> Result<Option<EventRecord>, DbError> {
        let mut inner = self.inner.write().await;
        Ok(inner.records.get_mut(&id).map(|record| {
            record.event = event;
            record.clone()
        }))
    }

    async fn delete(&self, id: EventId) -> Result<bool, DbError> {
        Ok(self.inner.write().await.records.remove(&id).is_some())
    }

    async fn list_page(&self, request: &PageRequest) -> Result<Page<EventRecord>, DbError> {
        let inner = self.inner.read().await;

        let mut records: Vec<&EventRecord> = inner.records.values().collect();
        records.sort_by(|a, b| request.compare(a, b));

        let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let items = records
            .into_iter()
            .skip(offset)
            .take(request.size() as usize)
            .cloned()
            .collect();

        Ok(Page::new(items, request, inner.records.len() as u64))
    }
}
