//! Core types for the customer registry.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod address;
pub mod customer;
pub mod email;
pub mod id;
pub mod name;
pub mod postal_code;

pub use address::Address;
pub use customer::{Customer, CustomerDraft, NewCustomer};
pub use email::{Email, EmailError};
pub use id::*;
pub use name::{CustomerName, CustomerNameError};
pub use postal_code::{PostalCode, PostalCodeError};
