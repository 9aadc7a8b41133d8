//! Query state sent to a remote collection and the page it yields.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::domain::types::{PageNumber, PageSize};
use crate::pagination::page_links;

/// Filter names understood by the customer endpoint.
pub mod filters {
    pub const STATUS: &str = "status";
    pub const PROVINCE: &str = "province";
    pub const CITY: &str = "city";
    pub const LEVEL: &str = "level";
    pub const CUSTOMER_TYPE: &str = "customer_type";
    pub const SOURCE: &str = "source";
    pub const CREATED_FROM: &str = "created_from";
    pub const CREATED_TO: &str = "created_to";
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
    #[default]
    None,
}

impl Display for SortOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
            SortOrder::None => "none",
        })
    }
}

/// User-controlled parameters selecting a slice of a remote collection.
///
/// Setters return `true` only when the state actually changed. Changing
/// anything but the page itself moves back to the first page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryState {
    search: String,
    filters: BTreeMap<String, String>,
    sort_field: Option<String>,
    sort_order: SortOrder,
    page: PageNumber,
    page_size: PageSize,
}

impl QueryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.set_search(text);
        self
    }

    pub fn filter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_filter(name, value);
        self
    }

    pub fn sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.set_sort(field, order);
        self
    }

    pub fn paginate(mut self, page: PageNumber, page_size: PageSize) -> Self {
        self.page_size = page_size;
        self.page = page;
        self
    }

    pub fn search_text(&self) -> &str {
        &self.search
    }

    pub fn filters(&self) -> &BTreeMap<String, String> {
        &self.filters
    }

    pub fn filter_value(&self, name: &str) -> Option<&str> {
        self.filters.get(name).map(String::as_str)
    }

    /// Sort column and direction; `None` when the collection's default order applies.
    pub fn sorting(&self) -> Option<(&str, SortOrder)> {
        match (&self.sort_field, self.sort_order) {
            (Some(field), order) if order != SortOrder::None => Some((field.as_str(), order)),
            _ => None,
        }
    }

    pub fn page(&self) -> PageNumber {
        self.page
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn set_search(&mut self, text: impl Into<String>) -> bool {
        let text = text.into().trim().to_string();
        if text == self.search {
            return false;
        }
        self.search = text;
        self.page = PageNumber::FIRST;
        true
    }

    /// Sets a filter; an empty (or blank) value removes it.
    pub fn set_filter(&mut self, name: impl Into<String>, value: impl Into<String>) -> bool {
        let name = name.into().trim().to_string();
        let value = value.into().trim().to_string();
        if name.is_empty() {
            return false;
        }

        let changed = if value.is_empty() {
            self.filters.remove(&name).is_some()
        } else if self.filters.get(&name) == Some(&value) {
            false
        } else {
            self.filters.insert(name, value);
            true
        };

        if changed {
            self.page = PageNumber::FIRST;
        }
        changed
    }

    /// Sets the sort column. `SortOrder::None` (or a blank field) clears sorting.
    pub fn set_sort(&mut self, field: impl Into<String>, order: SortOrder) -> bool {
        let field = field.into().trim().to_string();
        let (sort_field, sort_order) = if order == SortOrder::None || field.is_empty() {
            (None, SortOrder::None)
        } else {
            (Some(field), order)
        };

        if sort_field == self.sort_field && sort_order == self.sort_order {
            return false;
        }
        self.sort_field = sort_field;
        self.sort_order = sort_order;
        self.page = PageNumber::FIRST;
        true
    }

    pub fn set_page(&mut self, page: PageNumber) -> bool {
        if page == self.page {
            return false;
        }
        self.page = page;
        true
    }

    pub fn set_page_size(&mut self, page_size: PageSize) -> bool {
        if page_size == self.page_size {
            return false;
        }
        self.page_size = page_size;
        self.page = PageNumber::FIRST;
        true
    }
}

/// One page of a remote collection. Replaced wholesale on every fetch.
#[derive(Clone, Debug, PartialEq)]
pub struct PageResult<R> {
    items: Vec<R>,
    total: usize,
    page: PageNumber,
    page_size: PageSize,
}

impl<R> PageResult<R> {
    /// Builds a page, dropping any items beyond `page_size`.
    pub fn new(mut items: Vec<R>, total: usize, page: PageNumber, page_size: PageSize) -> Self {
        let limit = page_size.get() as usize;
        if items.len() > limit {
            log::warn!(
                "Remote returned {} items for page size {limit}; truncating",
                items.len()
            );
            items.truncate(limit);
        }
        Self {
            items,
            total,
            page,
            page_size,
        }
    }

    pub fn items(&self) -> &[R] {
        &self.items
    }

    /// Size of the whole filtered collection, not just this page.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn page(&self) -> PageNumber {
        self.page
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn total_pages(&self) -> usize {
        self.total.div_ceil(self.page_size.get() as usize)
    }

    /// Numbered links for a pager, `None` marking a gap.
    pub fn page_links(&self) -> Vec<Option<usize>> {
        page_links(self.total_pages(), self.page.get() as usize)
    }
}
