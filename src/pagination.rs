use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize};

use crate::query::is_zero;

pub const DEFAULT_PER_PAGE: i32 = 100;
pub const MAX_PER_PAGE: i32 = 100;
/// Page size ceiling for the handful of lookup endpoints that allow it.
pub const MAX_LOOKUP_PER_PAGE: i32 = 2000;

/// Paging parameters shared by every list call. Pages are 1-based; zero
/// values are left off the query string so the server defaults apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOptions {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub page: i32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub per_page: i32,
}

impl ListOptions {
    pub fn new(page: i32, per_page: i32) -> Self {
        Self { page, per_page }
    }

    pub fn page(page: i32) -> Self {
        Self { page, per_page: 0 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
}

/// Envelope embedded (flattened) in every list response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_page: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_entries: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_page: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<PageLinks>,
}

impl Pagination {
    pub(crate) const FIELD_COUNT: usize = 7;

    /// Writes the envelope fields into a list record's struct, skipping the
    /// absent ones.
    pub(crate) fn serialize_fields<S: SerializeStruct>(&self, state: &mut S) -> Result<(), S::Error> {
        fn field<S: SerializeStruct, T: Serialize>(
            state: &mut S,
            key: &'static str,
            value: &Option<T>,
        ) -> Result<(), S::Error> {
            match value {
                Some(value) => state.serialize_field(key, value),
                None => state.skip_field(key),
            }
        }

        field(state, "per_page", &self.per_page)?;
        field(state, "total_pages", &self.total_pages)?;
        field(state, "total_entries", &self.total_entries)?;
        field(state, "next_page", &self.next_page)?;
        field(state, "previous_page", &self.previous_page)?;
        field(state, "page", &self.page)?;
        field(state, "links", &self.links)
    }

    pub fn has_next_page(&self) -> bool {
        self.next_page.is_some() || self.next_link().is_some()
    }

    /// Absolute URL of the next page as issued by the server.
    pub fn next_link(&self) -> Option<&str> {
        self.links.as_ref().and_then(|links| links.next.as_deref())
    }

    /// Options for fetching the page after this one, keeping the page size.
    pub fn next_page_options(&self, current: &ListOptions) -> Option<ListOptions> {
        let next = self.next_page.or_else(|| match (self.page, self.total_pages) {
            (Some(page), Some(total)) if page < total => Some(page + 1),
            _ => None,
        })?;
        Some(ListOptions {
            page: next,
            per_page: current.per_page,
        })
    }
}
