use std::fmt;
use std::fmt::Write;

/// Page size used when pagination is requested without an explicit limit.
pub const DEFAULT_LIMIT: u32 = 100;

/// Sort order of paginated results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Oldest first.
    Asc,
    /// Newest first.
    Desc,
}

impl Order {
    /// Value used in the query string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Order::Asc => "asc",
            Order::Desc => "desc",
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pagination options for list endpoints.
///
/// ```
/// use bitbutter_core::{Order, PaginationOptions};
///
/// let page = PaginationOptions::new()
///     .with_limit(3)
///     .with_order(Order::Asc)
///     .with_page(1);
/// assert_eq!(page.to_query(), "limit=3&order=asc&page=1");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationOptions {
    /// Page size, [`DEFAULT_LIMIT`] if unset.
    pub limit: Option<u32>,
    /// Only return entries before this epoch millisecond.
    pub before: Option<i64>,
    /// Only return entries after this epoch millisecond.
    pub after: Option<i64>,
    /// Sort order.
    pub order: Option<Order>,
    /// Page number.
    pub page: Option<u32>,
}

impl PaginationOptions {
    /// Create empty pagination options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set limit
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set before
    pub fn with_before(mut self, before: i64) -> Self {
        self.before = Some(before);
        self
    }

    /// Set after
    pub fn with_after(mut self, after: i64) -> Self {
        self.after = Some(after);
        self
    }

    /// Set order
    pub fn with_order(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    /// Set page
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Render the query string without the leading `?`.
    ///
    /// Parameters always come in the order `limit`, `before`, `after`,
    /// `order`, `page`; unset ones are skipped except `limit`.
    pub fn to_query(&self) -> String {
        let mut s = String::with_capacity(32);
        // Writing into a String never fails.
        let _ = write!(s, "limit={}", self.limit.unwrap_or(DEFAULT_LIMIT));
        if let Some(v) = self.before {
            let _ = write!(s, "&before={v}");
        }
        if let Some(v) = self.after {
            let _ = write!(s, "&after={v}");
        }
        if let Some(v) = self.order {
            let _ = write!(s, "&order={v}");
        }
        if let Some(v) = self.page {
            let _ = write!(s, "&page={v}");
        }

        s
    }
}

/// Build the versioned request path.
///
/// Produces `/v{version}/{resource_path}` followed by the pagination query if
/// any. The joining character depends on what the resource path already holds:
///
/// - ends with `?` or `&`: parameters are appended directly.
/// - contains a `?` elsewhere: parameters are joined with `&`.
/// - otherwise: parameters start with `?`.
///
/// Values are not url-encoded; every pagination value is a number or a fixed
/// keyword.
pub fn build_path(
    version: &str,
    resource_path: &str,
    pagination: Option<&PaginationOptions>,
) -> String {
    let resource_path = resource_path.trim_start_matches('/');
    let mut s = format!("/v{version}/{resource_path}");

    if let Some(pagination) = pagination {
        if !(s.ends_with('?') || s.ends_with('&')) {
            s.push(if s.contains('?') { '&' } else { '?' });
        }
        s.push_str(&pagination.to_query());
    }

    s
}
