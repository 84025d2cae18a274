//! Customer Registry Core - Shared types library.
//!
//! This crate provides the domain types used across the customer registry:
//! - `api` - HTTP service that creates and updates customer records
//! - `cli` - Command-line tools for migrations and postal code lookups
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, names, emails, postal codes, and the
//!   customer record itself

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
