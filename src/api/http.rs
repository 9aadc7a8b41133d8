//! reqwest-backed client for the customer endpoint.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use crate::api::errors::{ApiError, ApiResult};
use crate::api::{DuplicateCheck, RemoteCollection};
use crate::domain::customer::{Customer, NewCustomer, UpdateCustomer};
use crate::domain::query::{PageResult, QueryState};
use crate::domain::types::{CustomerKey, PageNumber, PageSize};
use crate::dto::api::{
    ApiEnvelope, CustomerListData, DuplicateCheckParams, DuplicateCheckResult, list_query_string,
};
use crate::models::config::ClientConfig;
use crate::session::Session;

/// Customer collection served over HTTP.
#[derive(Clone)]
pub struct HttpCustomerApi {
    client: Client,
    base_url: String,
    session: Arc<Session>,
}

impl HttpCustomerApi {
    pub fn new(config: &ClientConfig, session: Arc<Session>) -> ApiResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ApiError::Transient(format!("Failed to build HTTP client: {e}")))?;

        let base_url = config.api_base_url.trim_end_matches('/').to_string();
        log::info!("Customer API client created for {base_url}");

        Ok(Self {
            client,
            base_url,
            session,
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    fn customers_url(&self) -> String {
        format!("{}/customers", self.base_url)
    }

    fn customer_url(&self, key: &CustomerKey) -> String {
        format!("{}/customers/{key}", self.base_url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Sends the request and unwraps the response envelope.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<Option<T>> {
        let response = self.authorize(request).send().await.map_err(|e| {
            log::error!("Request to customer endpoint failed: {e}");
            ApiError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiEnvelope<serde_json::Value>>(&body)
                .ok()
                .and_then(|envelope| envelope.reason().map(str::to_string))
                .unwrap_or_else(|| status.to_string());

            log::warn!("Customer endpoint returned {status}: {message}");
            if status == StatusCode::UNAUTHORIZED {
                self.session.logout();
            }
            return Err(ApiError::from_status(status.as_u16(), message));
        }

        let envelope: ApiEnvelope<T> = response.json().await?;
        if !envelope.success {
            let message = envelope.reason().unwrap_or("Request failed").to_string();
            return Err(ApiError::Validation(message));
        }

        Ok(envelope.data)
    }

    async fn execute_required<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        self.execute(request)
            .await?
            .ok_or_else(|| ApiError::Decode("response carried no data".to_string()))
    }
}

#[async_trait]
impl RemoteCollection for HttpCustomerApi {
    type Record = Customer;
    type Draft = NewCustomer;
    type Patch = UpdateCustomer;

    async fn fetch_page(&self, query: &QueryState) -> ApiResult<PageResult<Customer>> {
        let query_string = list_query_string(query)
            .map_err(|e| ApiError::Validation(format!("Invalid query: {e}")))?;
        let url = format!("{}?{query_string}", self.customers_url());
        log::debug!("GET {url}");

        let data: CustomerListData = self.execute_required(self.client.get(url)).await?;

        // The server clamps out-of-range values; trust what it echoes back.
        let page = PageNumber::new(data.page).unwrap_or(query.page());
        let page_size = PageSize::new(data.page_size).unwrap_or(query.page_size());

        Ok(PageResult::new(data.customers, data.total, page, page_size))
    }

    async fn fetch_one(&self, key: &CustomerKey) -> ApiResult<Customer> {
        self.execute_required(self.client.get(self.customer_url(key)))
            .await
    }

    async fn create(&self, draft: &NewCustomer) -> ApiResult<Customer> {
        let customer: Customer = self
            .execute_required(self.client.post(self.customers_url()).json(draft))
            .await?;
        log::info!("Created customer {}", customer.key);
        Ok(customer)
    }

    async fn update(&self, key: &CustomerKey, patch: &UpdateCustomer) -> ApiResult<Customer> {
        if patch.is_empty() {
            return Err(ApiError::Validation("Nothing to update".to_string()));
        }
        let customer: Customer = self
            .execute_required(self.client.put(self.customer_url(key)).json(patch))
            .await?;
        log::info!("Updated customer {key}");
        Ok(customer)
    }

    async fn delete(&self, key: &CustomerKey) -> ApiResult<()> {
        self.execute::<serde_json::Value>(self.client.delete(self.customer_url(key)))
            .await?;
        log::info!("Deleted customer {key}");
        Ok(())
    }
}

#[async_trait]
impl DuplicateCheck for HttpCustomerApi {
    async fn check_duplicate(
        &self,
        company_name: Option<&str>,
        credit_code: Option<&str>,
    ) -> ApiResult<DuplicateCheckResult> {
        if company_name.is_none() && credit_code.is_none() {
            return Err(ApiError::Validation(
                "Either company name or credit code must be provided".to_string(),
            ));
        }
        let params = DuplicateCheckParams {
            company_name,
            credit_code,
        };
        let query_string = serde_html_form::to_string(&params)
            .map_err(|e| ApiError::Validation(format!("Invalid query: {e}")))?;
        let url = format!("{}/check-duplicate?{query_string}", self.customers_url());

        self.execute_required(self.client.get(url)).await
    }
}
