//! Descriptors for the read endpoints of the V53a API.

use std::fmt;

/// Default list page
pub const DEFAULT_PAGE: u32 = 1;

/// Default list page size
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Pagination and equality filters for the list endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub page_size: u32,
    pub filters: Vec<(String, String)>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            filters: Vec::new(),
        }
    }
}

impl ListQuery {
    pub fn page(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size,
            filters: Vec::new(),
        }
    }

    /// Add an equality filter, e.g. `did=250520`
    pub fn filter(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.filters.push((key.into(), value.to_string()));
        self
    }

    fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("page_size".to_string(), self.page_size.to_string()),
        ];
        pairs.extend(self.filters.iter().cloned());
        pairs
    }
}

/// Which read endpoint to hit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    List(ListQuery),
    Detail { id: i64 },
    LastElements { did: i64 },
}

impl Resource {
    /// Path relative to the API base URL
    pub fn path(&self) -> String {
        match self {
            Resource::List(_) => "api/v53a/".to_string(),
            Resource::Detail { id } => format!("api/v53a/{}/", id),
            Resource::LastElements { did } => format!("api/v53a/{}/last-elements/", did),
        }
    }

    pub fn query(&self) -> Vec<(String, String)> {
        match self {
            Resource::List(query) => query.to_pairs(),
            _ => Vec::new(),
        }
    }

    /// What was requested, as reported in not-found errors
    pub fn identifier(&self) -> String {
        match self {
            Resource::List(query) => format!("page {}", query.page),
            Resource::Detail { id } => id.to_string(),
            Resource::LastElements { did } => format!("DID {}", did),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::List(query) => write!(f, "V53a list (page {})", query.page),
            Resource::Detail { id } => write!(f, "V53a detail {}", id),
            Resource::LastElements { did } => write!(f, "last elements for DID {}", did),
        }
    }
}
