//! Offset-based page of results.
//!
//! ```rust
//! use sieve_query::Page;
//!
//! let page: Page<u32> = Page::new(vec![], 95, 10, 20);
//! assert_eq!(page.total_pages(), 10);
//! assert_eq!(page.current_page(), 2);
//! assert!(page.has_next());
//! assert!(page.has_previous());
//!
//! let unbounded: Page<u32> = Page::new(vec![], 95, 0, 0);
//! assert_eq!(unbounded.total_pages(), 0);
//! assert_eq!(unbounded.current_page(), 0);
//! ```

use serde::Serialize;

/// One page of results plus the counts needed to navigate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// The records on this page.
    pub content: Vec<T>,
    /// Total number of records matching the query.
    pub total_elements: u64,
    /// Page size.
    pub limit: u32,
    /// Number of records skipped.
    pub offset: u64,
}

impl<T> Page<T> {
    /// Create a new page.
    pub fn new(content: Vec<T>, total_elements: u64, limit: u32, offset: u64) -> Self {
        Self {
            content,
            total_elements,
            limit,
            offset,
        }
    }

    /// An empty page.
    pub fn empty(limit: u32, offset: u64) -> Self {
        Self::new(Vec::new(), 0, limit, offset)
    }

    /// Number of pages, `0` when the limit is `0`.
    pub fn total_pages(&self) -> u64 {
        if self.limit == 0 {
            return 0;
        }
        self.total_elements.div_ceil(u64::from(self.limit))
    }

    /// Zero-based index of this page, `0` when the limit is `0`.
    pub fn current_page(&self) -> u64 {
        if self.limit == 0 {
            return 0;
        }
        self.offset / u64::from(self.limit)
    }

    /// Whether a page follows this one, `false` when the limit is `0`.
    pub fn has_next(&self) -> bool {
        if self.limit == 0 {
            return false;
        }
        self.current_page()
            .saturating_add(1)
            .saturating_mul(u64::from(self.limit))
            < self.total_elements
    }

    /// Whether a page precedes this one.
    pub fn has_previous(&self) -> bool {
        self.current_page() > 0
    }

    /// Get the number of records on this page.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Check if this page has no records.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Map the records, keeping the counts.
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            limit: self.limit,
            offset: self.offset,
        }
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.content.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        let page: Page<()> = Page::new(vec![], 95, 10, 0);
        assert_eq!(page.total_pages(), 10);

        let page: Page<()> = Page::new(vec![], 100, 10, 0);
        assert_eq!(page.total_pages(), 10);

        let page: Page<()> = Page::new(vec![], 0, 10, 0);
        assert_eq!(page.total_pages(), 0);
    }

    #[test]
    fn test_zero_limit() {
        let page: Page<()> = Page::new(vec![], 95, 0, 30);
        assert_eq!(page.total_pages(), 0);
        assert_eq!(page.current_page(), 0);
        assert!(!page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn test_offset_at_upper_bound() {
        let page: Page<()> = Page::new(vec![], 95, 10, u64::MAX);
        assert!(!page.has_next());
        assert!(page.has_previous());

        let page: Page<()> = Page::new(vec![], u64::MAX, u32::MAX, u64::MAX - 1);
        assert!(!page.has_next());
    }

    #[test]
    fn test_navigation() {
        let first: Page<()> = Page::new(vec![], 25, 10, 0);
        assert!(first.has_next());
        assert!(!first.has_previous());

        let last: Page<()> = Page::new(vec![], 25, 10, 20);
        assert_eq!(last.current_page(), 2);
        assert!(!last.has_next());
        assert!(last.has_previous());
    }

    #[test]
    fn test_map_keeps_counts() {
        let page = Page::new(vec![1, 2], 2, 10, 0).map(|n| n * 10);
        assert_eq!(page.content, vec![10, 20]);
        assert_eq!(page.total_elements, 2);
    }

    #[test]
    fn test_serializes_camel_case() {
        let page = Page::new(vec!["a"], 1, 5, 0);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["totalElements"], 1);
        assert_eq!(json["content"][0], "a");
    }
}
