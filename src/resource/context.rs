//! List request parameters and result pages.

use serde::Serialize;

use super::resource::Resource;
use crate::filter::Filter;

/// Parameters for listing resources.
///
/// `start_index` is 1-based as in RFC 7644 Section 3.4.2.4; values below 1
/// are treated as 1.
#[derive(Debug, Clone, PartialEq)]
pub struct ListRequestParams {
    pub start_index: usize,
    pub count: usize,
    pub filter: Option<Filter>,
}

impl ListRequestParams {
    /// Request `count` resources starting at 1-based position `start_index`.
    pub fn new(start_index: usize, count: usize) -> Self {
        Self {
            start_index,
            count,
            filter: None,
        }
    }

    /// Restrict the listing to resources matching `filter`.
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Parse and attach a filter expression.
    pub fn with_filter_str(self, expression: &str) -> Self {
        self.with_filter(Filter::parse(expression))
    }

    /// Zero-based offset of the first resource on the page.
    pub fn offset(&self) -> usize {
        self.start_index.max(1) - 1
    }
}

impl Default for ListRequestParams {
    fn default() -> Self {
        Self::new(1, 100)
    }
}

/// A page of list results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Size of the filtered result set before pagination
    pub total_results: usize,
    #[serde(rename = "Resources")]
    pub resources: Vec<Resource>,
}
