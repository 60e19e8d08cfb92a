//! taNrleMn Core - Shared domain types.
//!
//! This crate provides the records the storefront reads from and writes to
//! the backend:
//! - [`Artwork`] - gallery pieces, read-only
//! - [`Product`] and [`CollectionTag`] - shop listings, read-only
//! - [`Profile`] and [`ProfileUpsert`] - the signed-in user's profile row
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. Field names
//! follow the backend's column names so rows deserialize without mapping.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
