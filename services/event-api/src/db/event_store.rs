//! Event store contract and its Postgres implementation.
//!
//! The store owns id assignment and is the only shared mutable resource in
//! the service. Each operation is a single statement, so create, read,
//! update, and delete are atomic per id.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use evreg_events::{
    Event, EventDetails, EventRecord, EventStatus, Manager, Page, PageRequest, SortField,
};
use evreg_id::{AccountId, EventId};
use sqlx::{postgres::PgPool, postgres::PgRow, Row};

use super::DbError;

/// Persistence operations the event service needs.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Persists a new event and assigns its id.
    async fn create(&self, event: Event) -> Result<EventRecord, DbError>;

    /// Looks up an event by id.
    async fn find_by_id(&self, id: EventId) -> Result<Option<EventRecord>, DbError>;

    /// Overwrites an existing event. Returns `None` if no event has `id`.
    async fn update(&self, id: EventId, event: Event) -> Result<Option<EventRecord>, DbError>;

    /// Removes an event. Returns whether a record was removed.
    async fn delete(&self, id: EventId) -> Result<bool, DbError>;

    /// Returns one page of events in the requested order, plus the total count.
    async fn list_page(&self, request: &PageRequest) -> Result<Page<EventRecord>, DbError>;

    /// Checks that the backing storage is reachable.
    async fn health_check(&self) -> Result<(), DbError> {
        Ok(())
    }
}

const COLUMNS: &str = r#"
    id, name, description,
    begin_enrollment_at, close_enrollment_at, begin_event_at, end_event_at,
    location, base_price, max_price, limit_of_enrollment,
    offline, free, event_status, manager_id
"#;

/// Postgres-backed event store.
#[derive(Clone)]
pub struct PgEventStore {
    pool: PgPool,
}

impl PgEventStore {
    /// Create a new event store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn create(&self, event: Event) -> Result<EventRecord, DbError> {
        let sql = format!(
            r#"
            INSERT INTO events (
                name, description,
                begin_enrollment_at, close_enrollment_at, begin_event_at, end_event_at,
                location, base_price, max_price, limit_of_enrollment,
                offline, free, event_status, manager_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {COLUMNS}
            "#
        );

        let row = bind_event(sqlx::query_as::<_, EventRow>(&sql), &event)
            .fetch_one(&self.pool)
            .await
            .map_err(DbError::Query)?;

        row.try_into()
    }

    async fn find_by_id(&self, id: EventId) -> Result<Option<EventRecord>, DbError> {
        let sql = format!("SELECT {COLUMNS} FROM events WHERE id = $1");

        sqlx::query_as::<_, EventRow>(&sql)
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::Query)?
            .map(EventRecord::try_from)
            .transpose()
    }

    async fn update(&self, id: EventId, event: Event) -> Result<Option<EventRecord>, DbError> {
        let sql = format!(
            r#"
            UPDATE events SET
                name = $1,
                description = $2,
                begin_enrollment_at = $3,
                close_enrollment_at = $4,
                begin_event_at = $5,
                end_event_at = $6,
                location = $7,
                base_price = $8,
                max_price = $9,
                limit_of_enrollment = $10,
                offline = $11,
                free = $12,
                event_status = $13,
                manager_id = $14,
                updated_at = now()
            WHERE id = $15
            RETURNING {COLUMNS}
            "#
        );

        bind_event(sqlx::query_as::<_, EventRow>(&sql), &event)
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::Query)?
            .map(EventRecord::try_from)
            .transpose()
    }

    async fn delete(&self, id: EventId) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(DbError::Query)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_page(&self, request: &PageRequest) -> Result<Page<EventRecord>, DbError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await
            .map_err(DbError::Query)?;

        let sql = format!(
            "SELECT {COLUMNS} FROM events ORDER BY {} LIMIT $1 OFFSET $2",
            order_by(request)
        );

        let rows = sqlx::query_as::<_, EventRow>(&sql)
            .bind(i64::from(request.size()))
            .bind(i64::try_from(request.offset()).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::Query)?;

        let items = rows
            .into_iter()
            .map(EventRecord::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(items, request, u64::try_from(total).unwrap_or(0)))
    }

    async fn health_check(&self) -> Result<(), DbError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(DbError::Query)?;
        Ok(())
    }
}

type EventQuery<'q> = sqlx::query::QueryAs<'q, sqlx::Postgres, EventRow, sqlx::postgres::PgArguments>;

fn bind_event<'q>(query: EventQuery<'q>, event: &'q Event) -> EventQuery<'q> {
    let details = &event.details;
    query
        .bind(&details.name)
        .bind(&details.description)
        .bind(details.begin_enrollment_date_time)
        .bind(details.close_enrollment_date_time)
        .bind(details.begin_event_date_time)
        .bind(details.end_event_date_time)
        .bind(&details.location)
        .bind(i64::from(details.base_price))
        .bind(i64::from(details.max_price))
        .bind(i64::from(details.limit_of_enrollment))
        .bind(event.offline)
        .bind(event.free)
        .bind(event.event_status.as_str())
        .bind(event.manager_id().map(|id| id.to_string()))
}

/// Maps sort properties to columns. Only these names ever reach the SQL text.
fn column(field: SortField) -> &'static str {
    match field {
        SortField::Id => "id",
        SortField::Name => "name",
        SortField::BeginEnrollmentDateTime => "begin_enrollment_at",
        SortField::CloseEnrollmentDateTime => "close_enrollment_at",
        SortField::BeginEventDateTime => "begin_event_at",
        SortField::EndEventDateTime => "end_event_at",
        SortField::BasePrice => "base_price",
        SortField::MaxPrice => "max_price",
        SortField::LimitOfEnrollment => "limit_of_enrollment",
        SortField::EventStatus => "event_status",
    }
}

fn order_by(request: &PageRequest) -> String {
    request
        .sort()
        .iter()
        .map(|order| format!("{} {}", column(order.field), order.direction.as_str()))
        .chain(std::iter::once("id ASC".to_string()))
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// Database Row Types
// =============================================================================

struct EventRow {
    id: i64,
    name: String,
    description: String,
    begin_enrollment_at: NaiveDateTime,
    close_enrollment_at: NaiveDateTime,
    begin_event_at: NaiveDateTime,
    end_event_at: NaiveDateTime,
    location: Option<String>,
    base_price: i64,
    max_price: i64,
    limit_of_enrollment: i64,
    offline: bool,
    free: bool,
    event_status: String,
    manager_id: Option<String>,
}

impl<'r> sqlx::FromRow<'r, PgRow> for EventRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            begin_enrollment_at: row.try_get("begin_enrollment_at")?,
            close_enrollment_at: row.try_get("close_enrollment_at")?,
            begin_event_at: row.try_get("begin_event_at")?,
            end_event_at: row.try_get("end_event_at")?,
            location: row.try_get("location")?,
            base_price: row.try_get("base_price")?,
            max_price: row.try_get("max_price")?,
            limit_of_enrollment: row.try_get("limit_of_enrollment")?,
            offline: row.try_get("offline")?,
            free: row.try_get("free")?,
            event_status: row.try_get("event_status")?,
            manager_id: row.try_get("manager_id")?,
        })
    }
}

impl TryFrom<EventRow> for EventRecord {
    type Error = DbError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let corrupt = |message: String| DbError::CorruptRow { id, message };
        let amount = |name: &str, value: i64| {
            u32::try_from(value).map_err(|_| corrupt(format!("{name} out of range: {value}")))
        };

        let event_status = EventStatus::parse(&row.event_status)
            .ok_or_else(|| corrupt(format!("unknown status '{}'", row.event_status)))?;

        let manager = row
            .manager_id
            .as_deref()
            .map(|s| {
                s.parse::<AccountId>()
                    .map(|id| Manager { id })
                    .map_err(|e| corrupt(format!("invalid manager id: {e}")))
            })
            .transpose()?;

        Ok(EventRecord {
            id: EventId::new(row.id),
            event: Event {
                details: EventDetails {
                    name: row.name,
                    description: row.description,
                    begin_enrollment_date_time: row.begin_enrollment_at,
                    close_enrollment_date_time: row.close_enrollment_at,
                    begin_event_date_time: row.begin_event_at,
                    end_event_date_time: row.end_event_at,
                    location: row.location,
                    base_price: amount("base_price", row.base_price)?,
                    max_price: amount("max_price", row.max_price)?,
                    limit_of_enrollment: amount("limit_of_enrollment", row.limit_of_enrollment)?,
                },
                offline: row.offline,
                free: row.free,
                event_status,
                manager,
            },
        })
    }
}
