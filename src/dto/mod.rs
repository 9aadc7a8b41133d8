//! DTOs exchanged with the remote customer endpoint.

pub mod api;
