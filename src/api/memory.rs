//! In-process customer collection with the endpoint's query semantics.
//!
//! Search matches company and contact names case-insensitively, known
//! filters match exactly, `created_from`/`created_to` bound the creation
//! date, and the default order is newest first. Useful for previews and as a
//! test double for the synchronizer.

use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Utc};

use crate::api::errors::{ApiError, ApiResult};
use crate::api::{DuplicateCheck, RemoteCollection};
use crate::domain::customer::{Customer, NewCustomer, UpdateCustomer};
use crate::domain::query::{PageResult, QueryState, SortOrder, filters};
use crate::domain::types::CustomerKey;
use crate::dto::api::DuplicateCheckResult;

#[derive(Default)]
struct Store {
    next_id: i64,
    customers: Vec<Customer>,
}

#[derive(Default)]
pub struct InMemoryCustomers {
    store: Mutex<Store>,
    offline: AtomicBool,
}

impl InMemoryCustomers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the collection, assigning ids and keys.
    pub fn with_customers(drafts: impl IntoIterator<Item = NewCustomer>) -> Self {
        let collection = Self::new();
        {
            let mut store = collection.lock();
            for draft in drafts {
                insert(&mut store, &draft);
            }
        }
        collection
    }

    /// While offline every call fails with a transient error.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, AtomicOrdering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.lock().customers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_online(&self) -> ApiResult<()> {
        if self.offline.load(AtomicOrdering::SeqCst) {
            Err(ApiError::Transient("network unreachable".to_string()))
        } else {
            Ok(())
        }
    }
}

fn insert(store: &mut Store, draft: &NewCustomer) -> Customer {
    store.next_id += 1;
    let now = Utc::now().naive_utc();
    let customer = Customer {
        id: store.next_id,
        key: CustomerKey::new(),
        company_name: draft.company_name.to_string(),
        contact_name: draft.contact_name.to_string(),
        contact_phone: draft.contact_phone.to_string(),
        credit_code: draft.credit_code.as_ref().map(ToString::to_string),
        customer_type: draft.customer_type,
        province: draft.province.clone(),
        city: draft.city.clone(),
        address: draft.address.clone(),
        email: draft.email.as_ref().map(ToString::to_string),
        website: draft.website.as_ref().map(ToString::to_string),
        industry: draft.industry.clone(),
        erp_system: draft.erp_system.clone(),
        erp_customer_code: draft.erp_customer_code.clone(),
        status: draft.status,
        level: draft.level,
        source: draft.source,
        remarks: draft.remarks.as_ref().map(ToString::to_string),
        created_at: now,
        updated_at: now,
    };
    store.customers.push(customer.clone());
    customer
}

fn duplicate_of(
    customers: &[Customer],
    company_name: Option<&str>,
    credit_code: Option<&str>,
    except: Option<&CustomerKey>,
) -> Option<(&'static str, String)> {
    let others = || customers.iter().filter(|c| Some(&c.key) != except);

    if let Some(name) = company_name {
        if others().any(|c| c.company_name == name) {
            return Some(("company_name", name.to_string()));
        }
    }
    if let Some(code) = credit_code {
        if others().any(|c| c.credit_code.as_deref() == Some(code)) {
            return Some(("credit_code", code.to_string()));
        }
    }
    None
}

fn parse_bound(value: &str, end_of_day: bool) -> Option<NaiveDateTime> {
    if let Ok(datetime) = value.parse::<NaiveDateTime>() {
        return Some(datetime);
    }
    let date = value.parse::<NaiveDate>().ok()?;
    if end_of_day {
        date.and_hms_opt(23, 59, 59)
    } else {
        date.and_hms_opt(0, 0, 0)
    }
}

fn matches(customer: &Customer, query: &QueryState) -> bool {
    let search = query.search_text().to_lowercase();
    if !search.is_empty()
        && !customer.company_name.to_lowercase().contains(&search)
        && !customer.contact_name.to_lowercase().contains(&search)
    {
        return false;
    }

    query.filters().iter().all(|(name, value)| match name.as_str() {
        filters::STATUS => customer.status.as_str() == value.as_str(),
        filters::LEVEL => customer.level.as_str() == value.as_str(),
        filters::CUSTOMER_TYPE => customer.customer_type.as_str() == value.as_str(),
        filters::SOURCE => customer.source.as_str() == value.as_str(),
        filters::PROVINCE => customer.province.as_deref() == Some(value.as_str()),
        filters::CITY => customer.city.as_deref() == Some(value.as_str()),
        filters::CREATED_FROM => {
            parse_bound(value, false).is_none_or(|from| customer.created_at >= from)
        }
        filters::CREATED_TO => parse_bound(value, true).is_none_or(|to| customer.created_at <= to),
        // The endpoint ignores filters it does not know.
        _ => true,
    })
}

const SORTABLE_FIELDS: &[&str] = &[
    "id",
    "company_name",
    "contact_name",
    "province",
    "city",
    "status",
    "level",
    "created_at",
    "updated_at",
];

fn compare_by(field: &str, a: &Customer, b: &Customer) -> Option<Ordering> {
    let ordering = match field {
        "id" => a.id.cmp(&b.id),
        "company_name" => a.company_name.cmp(&b.company_name),
        "contact_name" => a.contact_name.cmp(&b.contact_name),
        "province" => a.province.cmp(&b.province),
        "city" => a.city.cmp(&b.city),
        "status" => a.status.as_str().cmp(b.status.as_str()),
        "level" => a.level.as_str().cmp(b.level.as_str()),
        "created_at" => a.created_at.cmp(&b.created_at),
        "updated_at" => a.updated_at.cmp(&b.updated_at),
        _ => return None,
    };
    Some(ordering)
}

fn sort_customers(customers: &mut [Customer], query: &QueryState) {
    let sorting = query
        .sorting()
        .filter(|(field, _)| SORTABLE_FIELDS.contains(field));

    match sorting {
        Some((field, order)) => customers.sort_by(|a, b| {
            let ordering = compare_by(field, a, b).unwrap_or(Ordering::Equal);
            let ordering = if order == SortOrder::Desc {
                ordering.reverse()
            } else {
                ordering
            };
            ordering.then_with(|| b.id.cmp(&a.id))
        }),
        // Newest first; ids break ties between rows created in the same instant.
        None => customers.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        }),
    }
}

#[async_trait]
impl RemoteCollection for InMemoryCustomers {
    type Record = Customer;
    type Draft = NewCustomer;
    type Patch = UpdateCustomer;

    async fn fetch_page(&self, query: &QueryState) -> ApiResult<PageResult<Customer>> {
        self.ensure_online()?;

        let mut selected: Vec<Customer> = self
            .lock()
            .customers
            .iter()
            .filter(|c| matches(c, query))
            .cloned()
            .collect();
        sort_customers(&mut selected, query);

        let total = selected.len();
        let page_size = query.page_size().get() as usize;
        let offset = (query.page().get() as usize - 1).saturating_mul(page_size);
        let items = selected.into_iter().skip(offset).take(page_size).collect();

        Ok(PageResult::new(
            items,
            total,
            query.page(),
            query.page_size(),
        ))
    }

    async fn fetch_one(&self, key: &CustomerKey) -> ApiResult<Customer> {
        self.ensure_online()?;
        self.lock()
            .customers
            .iter()
            .find(|c| &c.key == key)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("Customer with id \"{key}\" not found")))
    }

    async fn create(&self, draft: &NewCustomer) -> ApiResult<Customer> {
        self.ensure_online()?;
        let mut store = self.lock();

        if let Some((field, value)) = duplicate_of(
            &store.customers,
            Some(draft.company_name.as_str()),
            draft.credit_code.as_ref().map(|c| c.as_str()),
            None,
        ) {
            let label = if field == "company_name" {
                "company name"
            } else {
                "credit code"
            };
            return Err(ApiError::Validation(format!(
                "Customer with {label} \"{value}\" already exists"
            )));
        }

        Ok(insert(&mut store, draft))
    }

    async fn update(&self, key: &CustomerKey, patch: &UpdateCustomer) -> ApiResult<Customer> {
        self.ensure_online()?;
        let mut store = self.lock();

        if duplicate_of(
            &store.customers,
            patch.company_name.as_ref().map(|n| n.as_str()),
            patch.credit_code.as_ref().map(|c| c.as_str()),
            Some(key),
        )
        .is_some()
        {
            return Err(ApiError::Validation(
                "Another customer already uses these details".to_string(),
            ));
        }

        let customer = store
            .customers
            .iter_mut()
            .find(|c| &c.key == key)
            .ok_or_else(|| ApiError::NotFound(format!("Customer with id \"{key}\" not found")))?;

        if let Some(name) = &patch.company_name {
            customer.company_name = name.to_string();
        }
        if let Some(name) = &patch.contact_name {
            customer.contact_name = name.to_string();
        }
        if let Some(phone) = &patch.contact_phone {
            customer.contact_phone = phone.to_string();
        }
        if let Some(code) = &patch.credit_code {
            customer.credit_code = Some(code.to_string());
        }
        if let Some(customer_type) = patch.customer_type {
            customer.customer_type = customer_type;
        }
        if let Some(province) = &patch.province {
            customer.province = Some(province.clone());
        }
        if let Some(city) = &patch.city {
            customer.city = Some(city.clone());
        }
        if let Some(address) = &patch.address {
            customer.address = Some(address.clone());
        }
        if let Some(email) = &patch.email {
            customer.email = Some(email.to_string());
        }
        if let Some(website) = &patch.website {
            customer.website = Some(website.to_string());
        }
        if let Some(industry) = &patch.industry {
            customer.industry = Some(industry.clone());
        }
        if let Some(erp_system) = &patch.erp_system {
            customer.erp_system = Some(erp_system.clone());
        }
        if let Some(code) = &patch.erp_customer_code {
            customer.erp_customer_code = Some(code.clone());
        }
        if let Some(status) = patch.status {
            customer.status = status;
        }
        if let Some(level) = patch.level {
            customer.level = level;
        }
        if let Some(source) = patch.source {
            customer.source = source;
        }
        if let Some(remarks) = &patch.remarks {
            customer.remarks = Some(remarks.to_string());
        }
        customer.updated_at = Utc::now().naive_utc();

        Ok(customer.clone())
    }

    async fn delete(&self, key: &CustomerKey) -> ApiResult<()> {
        self.ensure_online()?;
        let mut store = self.lock();
        let before = store.customers.len();
        store.customers.retain(|c| &c.key != key);
        if store.customers.len() == before {
            return Err(ApiError::NotFound(format!(
                "Customer with id \"{key}\" not found"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl DuplicateCheck for InMemoryCustomers {
    async fn check_duplicate(
        &self,
        company_name: Option<&str>,
        credit_code: Option<&str>,
    ) -> ApiResult<DuplicateCheckResult> {
        self.ensure_online()?;
        if company_name.is_none() && credit_code.is_none() {
            return Err(ApiError::Validation(
                "Either company name or credit code must be provided".to_string(),
            ));
        }

        let store = self.lock();
        Ok(
            match duplicate_of(&store.customers, company_name, credit_code, None) {
                Some((field, value)) => DuplicateCheckResult {
                    is_duplicate: true,
                    duplicate_field: Some(field.to_string()),
                    duplicate_value: Some(value),
                },
                None => DuplicateCheckResult::default(),
            },
        )
    }
}
