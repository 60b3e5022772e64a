//! Paging and sorting of event listings.
//!
//! Page numbers are zero-based. Sort expressions use the `property,DIR`
//! form (`name,DESC`); a bare property sorts ascending.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::Serialize;

use crate::error::PagingError;
use crate::event::EventRecord;

/// Default page size when none is requested.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Properties an event listing can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    Id,
    Name,
    BeginEnrollmentDateTime,
    CloseEnrollmentDateTime,
    BeginEventDateTime,
    EndEventDateTime,
    BasePrice,
    MaxPrice,
    LimitOfEnrollment,
    EventStatus,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Name => "name",
            SortField::BeginEnrollmentDateTime => "beginEnrollmentDateTime",
            SortField::CloseEnrollmentDateTime => "closeEnrollmentDateTime",
            SortField::BeginEventDateTime => "beginEventDateTime",
            SortField::EndEventDateTime => "endEventDateTime",
            SortField::BasePrice => "basePrice",
            SortField::MaxPrice => "maxPrice",
            SortField::LimitOfEnrollment => "limitOfEnrollment",
            SortField::EventStatus => "eventStatus",
        }
    }

    /// Compares two records by this property, ascending.
    pub fn compare(&self, a: &EventRecord, b: &EventRecord) -> Ordering {
        let (x, y) = (&a.event.details, &b.event.details);
        match self {
            SortField::Id => a.id.cmp(&b.id),
            SortField::Name => x.name.cmp(&y.name),
            SortField::BeginEnrollmentDateTime => x
                .begin_enrollment_date_time
                .cmp(&y.begin_enrollment_date_time),
            SortField::CloseEnrollmentDateTime => x
                .close_enrollment_date_time
                .cmp(&y.close_enrollment_date_time),
            SortField::BeginEventDateTime => x.begin_event_date_time.cmp(&y.begin_event_date_time),
            SortField::EndEventDateTime => x.end_event_date_time.cmp(&y.end_event_date_time),
            SortField::BasePrice => x.base_price.cmp(&y.base_price),
            SortField::MaxPrice => x.max_price.cmp(&y.max_price),
            SortField::LimitOfEnrollment => x.limit_of_enrollment.cmp(&y.limit_of_enrollment),
            SortField::EventStatus => a
                .event
                .event_status
                .as_str()
                .cmp(b.event.event_status.as_str()),
        }
    }
}

impl FromStr for SortField {
    type Err = PagingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let field = match s {
            "id" => SortField::Id,
            "name" => SortField::Name,
            "beginEnrollmentDateTime" => SortField::BeginEnrollmentDateTime,
            "closeEnrollmentDateTime" => SortField::CloseEnrollmentDateTime,
            "beginEventDateTime" => SortField::BeginEventDateTime,
            "endEventDateTime" => SortField::EndEventDateTime,
            "basePrice" => SortField::BasePrice,
            "maxPrice" => SortField::MaxPrice,
            "limitOfEnrollment" => SortField::LimitOfEnrollment,
            "eventStatus" => SortField::EventStatus,
            other => return Err(PagingError::UnknownSortField(other.to_string())),
        };
        Ok(field)
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

impl FromStr for Direction {
    type Err = PagingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(Direction::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(Direction::Desc)
        } else {
            Err(PagingError::InvalidDirection(s.to_string()))
        }
    }
}

/// One `property,DIR` sort criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortOrder {
    pub field: SortField,
    pub direction: Direction,
}

impl SortOrder {
    pub const fn new(field: SortField, direction: Direction) -> Self {
        Self { field, direction }
    }

    pub fn compare(&self, a: &EventRecord, b: &EventRecord) -> Ordering {
        let ordering = self.field.compare(a, b);
        match self.direction {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    }
}

impl FromStr for SortOrder {
    type Err = PagingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PagingError::EmptySort);
        }
        let (field, direction) = match s.split_once(',') {
            Some((field, direction)) => (field.trim(), direction.trim().parse()?),
            None => (s, Direction::Asc),
        };
        Ok(Self::new(field.parse()?, direction))
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.field.as_str(), self.direction.as_str())
    }
}

/// Requested slice of the event listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    size: u32,
    sort: Vec<SortOrder>,
}

impl PageRequest {
    /// A page request; `size` is clamped to `1..=MAX_PAGE_SIZE`.
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size: size.clamp(1, MAX_PAGE_SIZE),
            sort: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_sort(mut self, sort: Vec<SortOrder>) -> Self {
        self.sort = sort;
        self
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn sort(&self) -> &[SortOrder] {
        &self.sort
    }

    /// Number of records before this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }

    /// Orders two records by every sort criterion, then by id.
    ///
    /// The id tie-break keeps pages stable across requests.
    pub fn compare(&self, a: &EventRecord, b: &EventRecord) -> Ordering {
        self.sort
            .iter()
            .map(|order| order.compare(a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| a.id.cmp(&b.id))
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE)
    }
}

/// Paging metadata, serialized as the `page` member of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
    pub number: u32,
}

/// One page of results plus the total count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u32,
    pub size: u32,
    pub total_elements: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        Self {
            items,
            number: request.page(),
            size: request.size(),
            total_elements,
        }
    }

    pub fn total_pages(&self) -> u64 {
        self.total_elements.div_ceil(u64::from(self.size.max(1)))
    }

    pub fn has_previous(&self) -> bool {
        self.number > 0
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.number) + 1 < self.total_pages()
    }

    pub fn metadata(&self) -> PageMetadata {
        PageMetadata {
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages(),
            number: self.number,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sort_with_direction() {
        let order: SortOrder = "name,DESC".parse().unwrap();
        assert_eq!(order, SortOrder::new(SortField::Name, Direction::Desc));
        assert_eq!(order.to_string(), "name,DESC");
    }

    #[test]
    fn test_parse_sort_defaults_to_ascending() {
        let order: SortOrder = "basePrice".parse().unwrap();
        assert_eq!(order.direction, Direction::Asc);
        let order: SortOrder = "id,desc".parse().unwrap();
        assert_eq!(order.direction, Direction::Desc);
    }

    #[test]
    fn test_parse_sort_errors() {
        assert_eq!(
            "free,ASC".parse::<SortOrder>().unwrap_err(),
            PagingError::UnknownSortField("free".to_string())
        );
        assert_eq!(
            "name,UP".parse::<SortOrder>().unwrap_err(),
            PagingError::InvalidDirection("UP".to_string())
        );
        assert_eq!("".parse::<SortOrder>().unwrap_err(), PagingError::EmptySort);
    }

    #[test]
    fn test_page_request_clamps_size() {
        assert_eq!(PageRequest::new(0, 0).size(), 1);
        assert_eq!(PageRequest::new(0, 10_000).size(), MAX_PAGE_SIZE);
        assert_eq!(PageRequest::new(3, 10).offset(), 30);
    }

    #[test]
    fn test_page_metadata() {
        let request = PageRequest::new(1, 10);
        let page = Page::new(vec![(); 10], &request, 30);
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_previous());
        assert!(page.has_next());

        let last = Page::new(vec![(); 10], &PageRequest::new(2, 10), 30);
        assert!(!last.has_next());

        let empty = Page::<()>::new(Vec::new(), &PageRequest::default(), 0);
        assert_eq!(empty.total_pages(), 0);
        assert!(!empty.has_next());
        assert!(!empty.has_previous());
    }
}
