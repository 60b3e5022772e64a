//! HAL representations of event records.
//!
//! The assembler decides which links a representation carries. The caller's
//! [`Principal`] is passed in explicitly; nothing is read from ambient
//! request state.
//!
//! | link | single event | list item | collection |
//! |---|---|---|---|
//! | `self` | always | always | always |
//! | `query-events` | always | never | never |
//! | `update-event` | authenticated | authenticated | never |
//! | `create-event` | never | never | authenticated |
//! | `profile` | always | always | always |
//! | `first`/`prev`/`next`/`last` | never | never | when the page has neighbours |
//!
//! `update-event` is offered to any authenticated caller, not only the
//! event's manager.

use evreg_events::{EventRecord, Page, PageMetadata, PageRequest};
use evreg_id::EventId;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::identity::Principal;

/// Link relation names.
pub mod rel {
    pub const SELF: &str = "self";
    pub const PROFILE: &str = "profile";
    pub const QUERY_EVENTS: &str = "query-events";
    pub const UPDATE_EVENT: &str = "update-event";
    pub const CREATE_EVENT: &str = "create-event";
    pub const FIRST: &str = "first";
    pub const PREV: &str = "prev";
    pub const NEXT: &str = "next";
    pub const LAST: &str = "last";
    pub const INDEX: &str = "index";
    pub const EVENTS: &str = "events";
}

/// A single HAL link.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Link {
    pub href: String,
}

/// Named links in insertion order, serialized as a HAL `_links` object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Links(Vec<(&'static str, Link)>);

impl Links {
    pub fn push(&mut self, rel: &'static str, href: String) {
        self.0.push((rel, Link { href }));
    }

    fn push_if(&mut self, condition: bool, rel: &'static str, href: impl FnOnce() -> String) {
        if condition {
            self.push(rel, href());
        }
    }

    pub fn get(&self, rel: &str) -> Option<&Link> {
        self.0.iter().find(|(r, _)| *r == rel).map(|(_, link)| link)
    }

    pub fn contains(&self, rel: &str) -> bool {
        self.get(rel).is_some()
    }

    pub fn rels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(|(rel, _)| *rel)
    }
}

impl Serialize for Links {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (rel, link) in &self.0 {
            map.serialize_entry(rel, link)?;
        }
        map.end()
    }
}

/// Which operation a representation answers.
///
/// Drives the list-context link rules and the profile anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyContext {
    Created,
    Fetched,
    Updated,
    Listed,
}

impl AssemblyContext {
    pub fn is_list(&self) -> bool {
        matches!(self, AssemblyContext::Listed)
    }

    fn profile_anchor(&self) -> &'static str {
        match self {
            AssemblyContext::Created => "resources-events-create",
            AssemblyContext::Fetched => "resources-events-get",
            AssemblyContext::Updated => "resources-events-update",
            AssemblyContext::Listed => "resources-events-list",
        }
    }
}

/// Builds hrefs, rooted at the public base URL.
#[derive(Debug, Clone, Default)]
pub struct LinkBuilder {
    base_url: String,
}

impl LinkBuilder {
    /// `base_url` may be empty, giving root-relative hrefs.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn index(&self) -> String {
        format!("{}/api", self.base_url)
    }

    pub fn events(&self) -> String {
        format!("{}/api/events", self.base_url)
    }

    pub fn event(&self, id: EventId) -> String {
        format!("{}/api/events/{id}", self.base_url)
    }

    pub fn profile(&self, context: AssemblyContext) -> String {
        format!(
            "{}/docs/index.html#{}",
            self.base_url,
            context.profile_anchor()
        )
    }

    pub fn page(&self, request: &PageRequest, number: u64) -> String {
        let mut href = format!("{}?page={number}&size={}", self.events(), request.size());
        for order in request.sort() {
            href.push_str("&sort=");
            href.push_str(&order.to_string());
        }
        href
    }
}

/// One event with its links.
#[derive(Debug, Clone, serde::Serialize)]
pub struct EventResource {
    #[serde(flatten)]
    pub record: EventRecord,

    #[serde(rename = "_links")]
    pub links: Links,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct EmbeddedEvents {
    #[serde(rename = "eventList")]
    pub event_list: Vec<EventResource>,
}

/// A page of events with collection links and paging metadata.
#[derive(Debug, Clone, serde::Serialize)]
pub struct EventPageResource {
    #[serde(rename = "_embedded", skip_serializing_if = "Option::is_none")]
    pub embedded: Option<EmbeddedEvents>,

    #[serde(rename = "_links")]
    pub links: Links,

    pub page: PageMetadata,
}

impl EventPageResource {
    pub fn items(&self) -> &[EventResource] {
        self.embedded
            .as_ref()
            .map(|e| e.event_list.as_slice())
            .unwrap_or_default()
    }
}

/// Entry point of the API: links only.
#[derive(Debug, Clone, serde::Serialize)]
pub struct IndexResource {
    #[serde(rename = "_links")]
    pub links: Links,
}

/// Turns records into representations.
#[derive(Debug, Clone, Default)]
pub struct EventResourceAssembler {
    links: LinkBuilder,
}

impl EventResourceAssembler {
    pub fn new(links: LinkBuilder) -> Self {
        Self { links }
    }

    pub fn links(&self) -> &LinkBuilder {
        &self.links
    }

    /// Wraps one record with the links its context and caller allow.
    pub fn assemble(
        &self,
        record: EventRecord,
        principal: &Principal,
        context: AssemblyContext,
    ) -> EventResource {
        let id = record.id;
        let mut links = Links::default();

        links.push(rel::SELF, self.links.event(id));
        links.push_if(!context.is_list(), rel::QUERY_EVENTS, || self.links.events());
        links.push_if(principal.is_authenticated(), rel::UPDATE_EVENT, || {
            self.links.event(id)
        });
        links.push(rel::PROFILE, self.links.profile(context));

        EventResource { record, links }
    }

    /// Wraps a page of records as a collection.
    pub fn assemble_page(
        &self,
        page: Page<EventRecord>,
        request: &PageRequest,
        principal: &Principal,
    ) -> EventPageResource {
        let metadata = page.metadata();
        let number = u64::from(page.number);
        let total_pages = page.total_pages();
        let (has_previous, has_next) = (page.has_previous(), page.has_next());

        let event_list: Vec<EventResource> = page
            .items
            .into_iter()
            .map(|record| self.assemble(record, principal, AssemblyContext::Listed))
            .collect();

        let mut links = Links::default();
        links.push_if(total_pages > 1, rel::FIRST, || self.links.page(request, 0));
        links.push_if(has_previous, rel::PREV, || {
            self.links.page(request, number - 1)
        });
        links.push(rel::SELF, self.links.page(request, number));
        links.push_if(has_next, rel::NEXT, || self.links.page(request, number + 1));
        links.push_if(total_pages > 1, rel::LAST, || {
            self.links.page(request, total_pages - 1)
        });
        links.push(rel::PROFILE, self.links.profile(AssemblyContext::Listed));
        links.push_if(principal.is_authenticated(), rel::CREATE_EVENT, || {
            self.links.events()
        });

        EventPageResource {
            embedded: (!event_list.is_empty()).then_some(EmbeddedEvents { event_list }),
            links,
            page: metadata,
        }
    }

    /// The API index.
    pub fn index(&self) -> IndexResource {
        let mut links = Links::default();
        links.push(rel::EVENTS, self.links.events());
        IndexResource { links }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use evreg_events::{Direction, Event, EventDetails, SortField, SortOrder};
    use evreg_id::AccountId;

    use crate::identity::Identity;

    fn record(id: i64) -> EventRecord {
        let at = NaiveDate::from_ymd_opt(2022, 4, 27)
            .unwrap()
            .and_hms_opt(11, 30, 0)
            .unwrap();
        EventRecord {
            id: EventId::new(id),
            event: Event::draft(
                EventDetails {
                    name: format!("event {id}"),
                    description: "REST API".to_string(),
                    begin_enrollment_date_time: at,
                    close_enrollment_date_time: at,
                    begin_event_date_time: at,
                    end_event_date_time: at,
                    location: None,
                    base_price: 0,
                    max_price: 0,
                    limit_of_enrollment: 0,
                },
                AccountId::new(),
            )
            .recompute(),
        }
    }

    fn user() -> Principal {
        Principal::Authenticated(Identity {
            account_id: AccountId::new(),
            email: Some("user@example.com".to_string()),
        })
    }

    #[test]
    fn test_single_event_links_for_authenticated_caller() {
        let assembler = EventResourceAssembler::default();
        let resource = assembler.assemble(record(7), &user(), AssemblyContext::Created);

        let rels: Vec<_> = resource.links.rels().collect();
        assert_eq!(
            rels,
            vec![rel::SELF, rel::QUERY_EVENTS, rel::UPDATE_EVENT, rel::PROFILE]
        );
        assert_eq!(resource.links.get(rel::SELF).unwrap().href, "/api/events/7");
        assert_eq!(
            resource.links.get(rel::PROFILE).unwrap().href,
            "/docs/index.html#resources-events-create"
        );
    }

    #[test]
    fn test_anonymous_caller_gets_no_update_link() {
        let assembler = EventResourceAssembler::default();
        let resource = assembler.assemble(record(7), &Principal::Anonymous, AssemblyContext::Fetched);
        assert!(!resource.links.contains(rel::UPDATE_EVENT));
        assert!(resource.links.contains(rel::SELF));
        assert!(resource.links.contains(rel::QUERY_EVENTS));
        assert!(resource.links.contains(rel::PROFILE));
    }

    #[test]
    fn test_list_items_have_no_query_link() {
        let assembler = EventResourceAssembler::default();
        let resource = assembler.assemble(record(1), &user(), AssemblyContext::Listed);
        assert!(!resource.links.contains(rel::QUERY_EVENTS));
        assert!(resource.links.contains(rel::UPDATE_EVENT));
        assert!(!resource.links.contains(rel::CREATE_EVENT));
    }

    #[test]
    fn test_no_state_transition_links() {
        let assembler = EventResourceAssembler::default();
        let resource = assembler.assemble(record(1), &user(), AssemblyContext::Fetched);
        assert!(resource
            .links
            .rels()
            .all(|r| !r.contains("publish") && !r.contains("cancel")));
    }

    #[test]
    fn test_links_serialize_as_hal_object() {
        let assembler = EventResourceAssembler::new(LinkBuilder::new("http://localhost:8080/"));
        let resource = assembler.assemble(record(3), &user(), AssemblyContext::Updated);
        let json = serde_json::to_value(&resource).unwrap();

        assert_eq!(json["id"], 3);
        assert_eq!(json["_links"]["self"]["href"], "http://localhost:8080/api/events/3");
        assert_eq!(
            json["_links"]["update-event"]["href"],
            "http://localhost:8080/api/events/3"
        );
        assert_eq!(
            json["_links"]["query-events"]["href"],
            "http://localhost:8080/api/events"
        );
    }

    #[test]
    fn test_page_links_for_middle_page() {
        let assembler = EventResourceAssembler::default();
        let request = PageRequest::new(1, 10)
            .with_sort(vec![SortOrder::new(SortField::Name, Direction::Desc)]);
        let page = Page::new((11..=20).map(record).collect(), &request, 30);

        let resource = assembler.assemble_page(page, &request, &user());

        let rels: Vec<_> = resource.links.rels().collect();
        assert_eq!(
            rels,
            vec![
                rel::FIRST,
                rel::PREV,
                rel::SELF,
                rel::NEXT,
                rel::LAST,
                rel::PROFILE,
                rel::CREATE_EVENT
            ]
        );
        assert_eq!(
            resource.links.get(rel::NEXT).unwrap().href,
            "/api/events?page=2&size=10&sort=name,DESC"
        );
        assert_eq!(resource.items().len(), 10);
        assert_eq!(resource.page.total_elements, 30);
        assert_eq!(resource.page.total_pages, 3);
        assert_eq!(resource.page.number, 1);
    }

    #[test]
    fn test_anonymous_page_has_no_create_link() {
        let assembler = EventResourceAssembler::default();
        let request = PageRequest::new(0, 10);
        let page = Page::new(vec![record(1)], &request, 1);

        let resource = assembler.assemble_page(page, &request, &Principal::Anonymous);
        assert!(!resource.links.contains(rel::CREATE_EVENT));
        assert!(!resource.links.contains(rel::NEXT));
        assert!(!resource.links.contains(rel::FIRST));
        assert!(resource.links.contains(rel::SELF));
        assert!(resource.links.contains(rel::PROFILE));
        assert!(!resource.items()[0].links.contains(rel::UPDATE_EVENT));
    }

    #[test]
    fn test_empty_page_omits_embedded() {
        let assembler = EventResourceAssembler::default();
        let request = PageRequest::default();
        let page = Page::new(Vec::new(), &request, 0);

        let json = serde_json::to_value(assembler.assemble_page(page, &request, &user())).unwrap();
        assert!(json.get("_embedded").is_none());
        assert_eq!(json["page"]["totalElements"], 0);
    }
}
