//! Wire models for the customer API.

pub mod customer;

pub use customer::{CustomerRequest, CustomerResponse};
