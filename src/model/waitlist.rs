use uuid::Uuid;

use chrono::{DateTime, SubsecRound, Utc};

use serde::{Deserialize, Serialize};

use crate::domain::EmailAddress;

/// Origin tag stored on every entry created through the signup form
pub const LANDING_PAGE_SOURCE: &str = "landing-page";

/// Best-effort metadata about the request that created an entry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestMetadata {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// New waitlist entry, ready to be inserted
#[derive(Debug, Clone)]
pub struct NewWaitlistEntry {
    pub id: Uuid,
    pub email: EmailAddress,
    pub created_at: DateTime<Utc>,
    pub source: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl NewWaitlistEntry {
    pub fn new(email: EmailAddress, metadata: RequestMetadata) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            // Millisecond precision survives every store unchanged
            created_at: Utc::now().trunc_subsecs(3),
            source: LANDING_PAGE_SOURCE.into(),
            ip_address: metadata.ip_address,
            user_agent: metadata.user_agent,
        }
    }
}

/// Stored waitlist entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WaitlistEntry {
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// Normalized email, unique across all entries
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub source: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl From<NewWaitlistEntry> for WaitlistEntry {
    fn from(entry: NewWaitlistEntry) -> Self {
        Self {
            id: entry.id,
            email: entry.email.as_ref().to_string(),
            created_at: entry.created_at,
            source: entry.source,
            ip_address: entry.ip_address,
            user_agent: entry.user_agent,
        }
    }
}

/// Successful registration, as reported back to the signup form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub id: Uuid,
    pub email: String,
}

impl From<WaitlistEntry> for Registration {
    fn from(entry: WaitlistEntry) -> Self {
        Self {
            id: entry.id,
            email: entry.email,
        }
    }
}

/// Entry field to order listings by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    Id,
    Email,
    #[default]
    CreatedAt,
    Source,
    IpAddress,
    UserAgent,
}

impl SortField {
    /// Parse the wire name of an entry field
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "_id" | "id" => Some(Self::Id),
            "email" => Some(Self::Email),
            "createdAt" => Some(Self::CreatedAt),
            "source" => Some(Self::Source),
            "ipAddress" => Some(Self::IpAddress),
            "userAgent" => Some(Self::UserAgent),
            _ => None,
        }
    }

    /// Wire name, as accepted by `from_key`
    pub fn key(&self) -> &'static str {
        match self {
            Self::Id => "_id",
            Self::Email => "email",
            Self::CreatedAt => "createdAt",
            Self::Source => "source",
            Self::IpAddress => "ipAddress",
            Self::UserAgent => "userAgent",
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Email => "email",
            Self::CreatedAt => "created_at",
            Self::Source => "source",
            Self::IpAddress => "ip_address",
            Self::UserAgent => "user_agent",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Only an explicit `asc` sorts ascending
    pub fn from_key(key: &str) -> Self {
        if key == "asc" {
            Self::Asc
        } else {
            Self::Desc
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub order: SortOrder,
}

/// A single page request against the waitlist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    page: u64,
    limit: u64,
    pub sort: Sort,
}

impl ListQuery {
    pub const DEFAULT_PAGE: u64 = 1;
    pub const DEFAULT_LIMIT: u64 = 50;

    /// Zero page or limit values are replaced by their defaults
    pub fn new(page: u64, limit: u64, sort: Sort) -> Self {
        let page = if page == 0 { Self::DEFAULT_PAGE } else { page };
        let limit = if limit == 0 { Self::DEFAULT_LIMIT } else { limit };
        Self { page, limit, sort }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Number of entries before the first one on this page
    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PAGE, Self::DEFAULT_LIMIT, Sort::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_count: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    pub limit: u64,
}

impl Pagination {
    pub fn new(query: &ListQuery, total_count: u64) -> Self {
        let total_pages = total_count.div_ceil(query.limit);
        Self {
            current_page: query.page,
            total_pages,
            total_count,
            has_next_page: query.page < total_pages,
            has_prev_page: query.page > 1,
            limit: query.limit,
        }
    }
}

/// One window of the sorted waitlist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntriesPage {
    pub entries: Vec<WaitlistEntry>,
    pub pagination: Pagination,
}
