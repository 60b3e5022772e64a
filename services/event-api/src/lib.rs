//! Event registration API.
//!
//! This crate primarily ships an `event-api` binary, but we expose the
//! library surface to enable integration testing and reuse.

pub mod api;
pub mod assembler;
pub mod config;
pub mod db;
pub mod identity;
pub mod service;
pub mod state;
