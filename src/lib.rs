//! Client-side synchronizer for the paginated customer collection of the CRM
//! backend.
//!
//! [`services::list::ListSynchronizer`] keeps a local view of a remote
//! collection consistent with query changes and mutations. The collection is
//! reached through the [`api::RemoteCollection`] seam, implemented over HTTP
//! by [`api::http::HttpCustomerApi`] and in memory by
//! [`api::memory::InMemoryCustomers`].

pub mod api;
pub mod domain;
pub mod dto;
pub mod forms;
pub mod models;
pub mod pagination;
pub mod services;
pub mod session;

/// Page size used when a view mounts.
pub const DEFAULT_PAGE_SIZE: u32 = 20;
/// Largest page the customer endpoint serves.
pub const MAX_PAGE_SIZE: u32 = 100;
