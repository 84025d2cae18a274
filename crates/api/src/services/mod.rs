//! Business logic services.
//!
//! # Services
//!
//! - `customers` - customer CRUD with postal code address enrichment

pub mod customers;

pub use customers::{CustomerService, LOOKUP_DEADLINE_GRACE};
