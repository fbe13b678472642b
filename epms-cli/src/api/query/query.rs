//! UI-level query request model

use super::filters::Filter;
use super::orderby::OrderBy;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// What a list screen asks for: one page of a collection, optionally sorted,
/// narrowed by a status value, a free-text keyword or a custom expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// 1-indexed page number
    pub page: u32,
    /// Rows per page
    pub page_size: u32,
    /// `None` means the collection's default ordering
    pub sort: Option<OrderBy>,
    /// Equality value for the collection's status field
    pub status_filter: Option<String>,
    /// Free text matched against the collection's keyword fields
    pub keyword: Option<String>,
    /// Escape hatch for expressions the structured fields cannot express
    pub custom_filter: Option<Filter>,
}

impl Default for QueryRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            sort: None,
            status_filter: None,
            keyword: None,
            custom_filter: None,
        }
    }
}

impl QueryRequest {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size,
            ..Self::default()
        }
    }

    pub fn builder() -> QueryRequestBuilder {
        QueryRequestBuilder::new()
    }

    /// Page number, never below 1
    pub fn effective_page(&self) -> u32 {
        self.page.max(1)
    }

    /// Page size, never below 1
    pub fn effective_page_size(&self) -> u32 {
        self.page_size.max(1)
    }

    /// 0-indexed row offset of the requested page
    pub fn offset(&self) -> u64 {
        (self.effective_page() as u64 - 1) * self.effective_page_size() as u64
    }

    /// Trimmed keyword, `None` when absent or blank
    pub fn normalized_keyword(&self) -> Option<&str> {
        self.keyword
            .as_deref()
            .map(str::trim)
            .filter(|kw| !kw.is_empty())
    }

    /// Status value, `None` when absent or blank
    pub fn normalized_status(&self) -> Option<&str> {
        self.status_filter
            .as_deref()
            .map(str::trim)
            .filter(|status| !status.is_empty())
    }
}

/// Fluent builder for [`QueryRequest`]
#[derive(Debug, Default)]
pub struct QueryRequestBuilder {
    request: QueryRequest,
}

impl QueryRequestBuilder {
    pub fn new() -> Self {
        Self {
            request: QueryRequest::default(),
        }
    }

    pub fn page(mut self, page: u32) -> Self {
        self.request.page = page;
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.request.page_size = page_size;
        self
    }

    pub fn sort(mut self, order: OrderBy) -> Self {
        self.request.sort = Some(order);
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.request.status_filter = Some(status.into());
        self
    }

    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.request.keyword = Some(keyword.into());
        self
    }

    pub fn custom_filter(mut self, filter: Filter) -> Self {
        self.request.custom_filter = Some(filter);
        self
    }

    pub fn build(self) -> QueryRequest {
        self.request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let request = QueryRequest::default();
        assert_eq!(request.page, 1);
        assert_eq!(request.page_size, 10);
        assert!(request.sort.is_none());
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn test_offset_from_one_indexed_page() {
        assert_eq!(QueryRequest::new(1, 10).offset(), 0);
        assert_eq!(QueryRequest::new(2, 10).offset(), 10);
        assert_eq!(QueryRequest::new(3, 20).offset(), 40);
    }

    #[test]
    fn test_zero_values_are_clamped() {
        let request = QueryRequest::new(0, 0);
        assert_eq!(request.effective_page(), 1);
        assert_eq!(request.effective_page_size(), 1);
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn test_blank_keyword_and_status_are_ignored() {
        let request = QueryRequest::builder().keyword("   ").status("").build();
        assert_eq!(request.normalized_keyword(), None);
        assert_eq!(request.normalized_status(), None);

        let request = QueryRequest::builder().keyword("  abc ").build();
        assert_eq!(request.normalized_keyword(), Some("abc"));
    }
}
