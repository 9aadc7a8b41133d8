//! Services built on top of a remote collection.

pub mod export;
pub mod list;
