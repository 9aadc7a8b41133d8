//! Seam between the list synchronizer and a remote collection.

use std::fmt::{Debug, Display};

use async_trait::async_trait;

use crate::api::errors::ApiResult;
use crate::domain::customer::Customer;
use crate::domain::query::{PageResult, QueryState};
use crate::domain::types::CustomerKey;
use crate::dto::api::DuplicateCheckResult;

pub mod errors;
pub mod http;
pub mod memory;
#[cfg(feature = "test-mocks")]
pub mod mock;

/// An entity held by a remote collection. Only its key is interpreted.
pub trait Record: Clone + Debug + Send + Sync + 'static {
    type Key: Clone + Debug + Display + PartialEq + Send + Sync + 'static;

    fn key(&self) -> &Self::Key;
}

impl Record for Customer {
    type Key = CustomerKey;

    fn key(&self) -> &CustomerKey {
        &self.key
    }
}

/// A server-side paginated, filterable, sortable collection.
#[async_trait]
pub trait RemoteCollection: Send + Sync {
    type Record: Record;
    type Draft: Debug + Send + Sync;
    type Patch: Debug + Send + Sync;

    async fn fetch_page(&self, query: &QueryState) -> ApiResult<PageResult<Self::Record>>;
    async fn fetch_one(
        &self,
        key: &<Self::Record as Record>::Key,
    ) -> ApiResult<Self::Record>;
    async fn create(&self, draft: &Self::Draft) -> ApiResult<Self::Record>;
    async fn update(
        &self,
        key: &<Self::Record as Record>::Key,
        patch: &Self::Patch,
    ) -> ApiResult<Self::Record>;
    async fn delete(&self, key: &<Self::Record as Record>::Key) -> ApiResult<()>;
}

/// Lookup of existing customers by their unique attributes.
#[async_trait]
pub trait DuplicateCheck: Send + Sync {
    async fn check_duplicate(
        &self,
        company_name: Option<&str>,
        credit_code: Option<&str>,
    ) -> ApiResult<DuplicateCheckResult>;
}
