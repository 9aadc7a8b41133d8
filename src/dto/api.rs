//! Wire DTOs exchanged with the customer endpoint.

use serde::{Deserialize, Serialize};

use crate::domain::customer::Customer;
use crate::domain::query::QueryState;

/// Envelope wrapping every response body: `{ success, data, message, error }`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub error: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Best human-readable explanation carried by the envelope.
    pub fn reason(&self) -> Option<&str> {
        if !self.message.is_empty() {
            Some(&self.message)
        } else {
            self.error.as_deref()
        }
    }
}

/// Payload of `GET /customers`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CustomerListData {
    pub customers: Vec<Customer>,
    pub total: usize,
    pub page: u32,
    pub page_size: u32,
    #[serde(default)]
    pub total_pages: usize,
}

/// Payload of `GET /customers/check-duplicate`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DuplicateCheckResult {
    pub is_duplicate: bool,
    #[serde(default)]
    pub duplicate_field: Option<String>,
    #[serde(default)]
    pub duplicate_value: Option<String>,
}

/// Query parameters accepted by `GET /customers/check-duplicate`.
#[derive(Debug, Default, Serialize)]
pub struct DuplicateCheckParams<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_code: Option<&'a str>,
}

/// Encodes query state the way the customer endpoint expects it: filters as
/// top-level parameters and sorting as `field:order`.
pub fn list_query_string(query: &QueryState) -> Result<String, serde_html_form::ser::Error> {
    let mut params: Vec<(&str, String)> = vec![
        ("page", query.page().to_string()),
        ("page_size", query.page_size().to_string()),
    ];

    if !query.search_text().is_empty() {
        params.push(("search", query.search_text().to_string()));
    }

    for (name, value) in query.filters() {
        params.push((name.as_str(), value.clone()));
    }

    if let Some((field, order)) = query.sorting() {
        params.push(("sort", format!("{field}:{order}")));
    }

    serde_html_form::to_string(&params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::query::{SortOrder, filters};
    use crate::domain::types::{PageNumber, PageSize};
    use serde_json::json;

    #[test]
    fn default_query_only_paginates() {
        let encoded = list_query_string(&QueryState::new()).expect("encode");
        assert_eq!(encoded, "page=1&page_size=20");
    }

    #[test]
    fn search_filters_and_sort_are_encoded() {
        let query = QueryState::new()
            .search("Acme Corp")
            .filter(filters::STATUS, "active")
            .filter(filters::PROVINCE, "Guangdong")
            .sort("company_name", SortOrder::Asc)
            .paginate(
                PageNumber::new(2).expect("page"),
                PageSize::new(50).expect("size"),
            );

        let encoded = list_query_string(&query).expect("encode");

        assert_eq!(
            encoded,
            "page=2&page_size=50&search=Acme+Corp&province=Guangdong&status=active&sort=company_name%3Aasc"
        );
    }

    #[test]
    fn envelope_reason_prefers_message() {
        let envelope: ApiEnvelope<serde_json::Value> = serde_json::from_value(json!({
            "success": false,
            "error": "Duplicate customer",
            "message": "Customer with company name \"Acme\" already exists"
        }))
        .expect("decode");

        assert_eq!(
            envelope.reason(),
            Some("Customer with company name \"Acme\" already exists")
        );
        assert!(envelope.data.is_none());
    }

    #[test]
    fn envelope_without_data_decodes_for_records() {
        let envelope: ApiEnvelope<Customer> = serde_json::from_value(json!({
            "success": false,
            "error": "Not Found",
            "message": "Customer not found"
        }))
        .expect("decode");

        assert!(!envelope.success);
        assert!(envelope.data.is_none());
        assert_eq!(envelope.reason(), Some("Customer not found"));
    }

    #[test]
    fn list_payload_tolerates_missing_total_pages() {
        let data: CustomerListData = serde_json::from_value(json!({
            "customers": [],
            "total": 0,
            "page": 1,
            "page_size": 20
        }))
        .expect("decode");

        assert_eq!(data.total_pages, 0);
    }
}
