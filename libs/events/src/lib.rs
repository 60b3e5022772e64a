//! # evreg-events
//!
//! Domain model for the "Event" resource of the registration platform.
//!
//! ## Contents
//!
//! - [`Event`] / [`EventRecord`]: the persisted entity, with the derived
//!   `free` and `offline` flags kept consistent by [`Event::recompute`]
//! - [`EventInput`]: what a client may submit; it has no derived fields and
//!   is reduced to [`EventDetails`] once every required field is present
//! - [`validate`]: the price and timestamp-ordering rules, returning every
//!   [`FieldViolation`] found
//! - [`PageRequest`] / [`Page`]: paging and sorting for listings
//! - [`timestamp`]: the accepted wire forms of event timestamps
//!
//! Everything here is pure and synchronous. Storage, identity resolution,
//! and HTTP live in the service crate.

mod error;
mod event;
mod input;
mod paging;
pub mod timestamp;
mod validation;

pub use error::PagingError;
pub use event::*;
pub use input::*;
pub use paging::*;
pub use validation::*;
