//! SessionCart Core - Shared cart types.
//!
//! This crate provides the value types used across all SessionCart components:
//! - `storefront` - Cart service, repositories and HTTP handlers
//! - `cli` - Command-line tools for migrations and catalog seeding
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP. Every type that arrives from a form field or a session is parsed
//! here, so the service layer only ever sees validated values.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, cart identifiers, slugs,
//!   quantities and prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
