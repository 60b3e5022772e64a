//! # evreg-id
//!
//! Typed identifiers for the event registration service.
//!
//! Two kinds of ids live here:
//!
//! - [`EventId`] is a positive integer assigned by the event store when a
//!   record is first persisted. Clients never choose it.
//! - Principal and request ids are ULID-based with a type prefix, formatted
//!   as `{prefix}_{ulid}` (for example `acct_01HV4Z2WQXKJNM8GPQY6VBKC3D`).
//!
//! Typed wrappers keep an account id from being passed where an event id is
//! expected, and every id parses back from its own string form.

mod error;
mod macros;
mod types;

pub use error::IdError;
pub use types::*;

/// Re-export ulid for consumers that need raw ULID operations
pub use ulid::Ulid;
