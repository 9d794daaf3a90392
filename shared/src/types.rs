//! Common types used across the platform

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Actor roles recognized by the platform
///
/// Every authenticated request carries exactly one of these. Admins own a
/// farm (the tenant); workers and customers belong to the admin that
/// created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Worker,
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Worker => "worker",
            Role::Customer => "customer",
        }
    }

    /// Staff roles may record and manage farm data
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Worker)
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "worker" => Ok(Role::Worker),
            "customer" => Ok(Role::Customer),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for role strings outside the recognized set
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

/// Pagination parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default = "Pagination::default_page")]
    pub page: u32,
    #[serde(default = "Pagination::default_per_page")]
    pub per_page: u32,
}

impl Pagination {
    const MAX_PER_PAGE: u32 = 100;

    fn default_page() -> u32 {
        1
    }

    fn default_per_page() -> u32 {
        20
    }

    /// Effective page size, clamped to the allowed maximum
    pub fn limit(&self) -> i64 {
        self.per_page.clamp(1, Self::MAX_PER_PAGE) as i64
    }

    /// Row offset for the requested page (pages are 1-based)
    pub fn offset(&self) -> i64 {
        let page = self.page.max(1) as i64;
        (page - 1) * self.limit()
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
        }
    }
}

/// Paginated response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub per_page: u32,
    pub total_items: u64,
    pub total_pages: u32,
}

impl PaginationMeta {
    /// Build metadata from the request parameters and a total row count
    pub fn new(pagination: &Pagination, total_items: u64) -> Self {
        let per_page = pagination.limit() as u32;
        let total_pages = if total_items == 0 {
            0
        } else {
            ((total_items + per_page as u64 - 1) / per_page as u64) as u32
        };
        Self {
            page: pagination.page.max(1),
            per_page,
            total_items,
            total_pages,
        }
    }
}
