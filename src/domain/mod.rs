//! Domain values exposed by the customer client.

pub mod customer;
pub mod query;
pub mod types;
