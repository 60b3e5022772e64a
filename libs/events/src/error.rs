//! Error types for paging parameters.

use thiserror::Error;

/// Errors that can occur when parsing paging and sort parameters.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PagingError {
    /// The sort property is not sortable or does not exist.
    #[error("unknown sort property: {0}")]
    UnknownSortField(String),

    /// The sort direction is neither `ASC` nor `DESC`.
    #[error("invalid sort direction: {0}")]
    InvalidDirection(String),

    /// The sort expression is empty.
    #[error("sort expression cannot be empty")]
    EmptySort,
}
