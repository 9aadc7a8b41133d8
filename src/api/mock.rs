//! Mock customer collection for isolating the synchronizer in tests.

use async_trait::async_trait;
use mockall::mock;

use crate::api::errors::ApiResult;
use crate::api::RemoteCollection;
use crate::domain::customer::{Customer, NewCustomer, UpdateCustomer};
use crate::domain::query::{PageResult, QueryState};
use crate::domain::types::CustomerKey;

mock! {
    pub Customers {}

    #[async_trait]
    impl RemoteCollection for Customers {
        type Record = Customer;
        type Draft = NewCustomer;
        type Patch = UpdateCustomer;

        async fn fetch_page(&self, query: &QueryState) -> ApiResult<PageResult<Customer>>;
        async fn fetch_one(&self, key: &CustomerKey) -> ApiResult<Customer>;
        async fn create(&self, draft: &NewCustomer) -> ApiResult<Customer>;
        async fn update(&self, key: &CustomerKey, patch: &UpdateCustomer) -> ApiResult<Customer>;
        async fn delete(&self, key: &CustomerKey) -> ApiResult<()>;
    }
}
