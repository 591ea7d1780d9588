//! Pagination types.
//!
//! A [`PageRequest`] is the (page number, page size, sort) tuple controlling
//! a bounded slice of query results; a [`Page`] is the slice itself plus the
//! counts clients use to render pagination controls. The serialized `Page`
//! shape (`content` / `totalPages` / `totalElements` / `size` / `number`)
//! is the contract the admin frontend consumes.

use serde::{Deserialize, Serialize};

/// Default page size when the client does not specify one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Upper bound on requested page sizes.
pub const MAX_PAGE_SIZE: u32 = 200;

/// Sort direction for an ordered query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// The SQL keyword for this direction.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl std::str::FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("invalid sort direction: {other}")),
        }
    }
}

/// A bounded, ordered slice request: zero-based page number, page size, and
/// sort direction. The sorted-by columns travel separately, already mapped
/// through a whitelist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    size: u32,
    direction: SortDirection,
}

impl PageRequest {
    /// Create a page request.
    ///
    /// `page` is zero-based. `size` is clamped into `1..=MAX_PAGE_SIZE`;
    /// zero falls back to [`DEFAULT_PAGE_SIZE`].
    #[must_use]
    pub fn new(page: u32, size: u32, direction: SortDirection) -> Self {
        let size = match size {
            0 => DEFAULT_PAGE_SIZE,
            s => s.min(MAX_PAGE_SIZE),
        };
        Self {
            page,
            size,
            direction,
        }
    }

    /// Zero-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Page size.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Sort direction applied to every sort field.
    #[must_use]
    pub const fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Row offset of the first element of this page.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        self.page as i64 * self.size as i64
    }

    /// Row limit for this page.
    #[must_use]
    pub const fn limit(&self) -> i64 {
        self.size as i64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE, SortDirection::default())
    }
}

/// One page of query results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// The rows on this page.
    pub content: Vec<T>,
    /// Total number of pages for the current size.
    pub total_pages: u32,
    /// Total number of matching rows across all pages.
    pub total_elements: i64,
    /// Page size the slice was requested with.
    pub size: u32,
    /// Zero-based number of this page.
    pub number: u32,
}

impl<T> Page<T> {
    /// Assemble a page from a fetched slice, the request that produced it,
    /// and the total matching-row count.
    #[must_use]
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: i64) -> Self {
        let size = request.size();
        let total_pages = u32::try_from(
            u64::try_from(total_elements.max(0))
                .unwrap_or(0)
                .div_ceil(u64::from(size)),
        )
        .unwrap_or(u32::MAX);
        Self {
            content,
            total_pages,
            total_elements,
            size,
            number: request.page(),
        }
    }

    /// Map the page's content to another type, preserving the counts.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_pages: self.total_pages,
            total_elements: self.total_elements,
            size: self.size,
            number: self.number,
        }
    }
}
