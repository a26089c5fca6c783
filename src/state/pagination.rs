// Infinite-scroll page accumulator.
// Appends fixed-size pages for one filter and rejects responses issued for an older filter.

use crate::error::FetchError;

/// One fetched page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Whether another page may follow this one.
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Page whose continuation is decided by whether it came back full-sized.
    pub fn sized(items: Vec<T>, page_size: usize) -> Self {
        let has_more = items.len() >= page_size;
        Self { items, has_more }
    }
}

/// Tag attached to a page fetch; identifies the filter generation and page number it was sent for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub generation: u64,
    /// One-based page number.
    pub page: u32,
}

/// Ordered pages loaded so far for the current filter.
#[derive(Debug, Clone)]
pub struct PageAccumulator<T> {
    filter: String,
    generation: u64,
    pages: Vec<Vec<T>>,
    has_more: bool,
    in_flight: Option<PageRequest>,
    error: Option<FetchError>,
}

impl<T> Default for PageAccumulator<T> {
    fn default() -> Self {
        Self {
            filter: String::new(),
            generation: 0,
            pages: Vec::new(),
            has_more: true,
            in_flight: None,
            error: None,
        }
    }
}

impl<T> PageAccumulator<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Start over for `filter`. Any request in flight becomes stale.
    pub fn reset(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
        self.generation += 1;
        self.pages.clear();
        self.has_more = true;
        self.in_flight = None;
        self.error = None;
    }

    /// Claim the next page if nothing is in flight and more may exist.
    pub fn begin_next(&mut self) -> Option<PageRequest> {
        if self.in_flight.is_some() || !self.has_more {
            return None;
        }
        let request = PageRequest {
            generation: self.generation,
            page: self.pages.len() as u32 + 1,
        };
        self.in_flight = Some(request);
        Some(request)
    }

    /// Append the page fetched for `request`. Returns false when the response is stale.
    pub fn complete(&mut self, request: PageRequest, page: Page<T>) -> bool {
        if self.in_flight != Some(request) {
            return false;
        }
        self.in_flight = None;
        self.error = None;
        self.has_more = page.has_more;
        self.pages.push(page.items);
        true
    }

    /// Record a failed fetch for `request`. Returns false when the response is stale.
    pub fn fail(&mut self, request: PageRequest, error: FetchError) -> bool {
        if self.in_flight != Some(request) {
            return false;
        }
        self.in_flight = None;
        self.error = Some(error);
        true
    }

    /// All loaded items in page order.
    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.pages.iter().flatten()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items().nth(index)
    }

    pub fn len(&self) -> usize {
        self.pages.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Fetching and nothing to show yet.
    pub fn is_loading_first(&self) -> bool {
        self.is_fetching() && self.pages.is_empty()
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE_SIZE: usize = 10;

    /// 100 remote items served in `PAGE_SIZE` slices.
    fn remote_page(request: PageRequest) -> Page<u32> {
        let start = (request.page - 1) * PAGE_SIZE as u32;
        let end = (start + PAGE_SIZE as u32).min(100);
        let items: Vec<u32> = (start + 1..=end).collect();
        let has_more = items.len() == PAGE_SIZE && (end as usize) < 100;
        Page { items, has_more }
    }

    #[test]
    fn test_full_scroll_through() {
        let mut acc = PageAccumulator::new();
        acc.reset("");

        let first = acc.begin_next().unwrap();
        assert!(acc.complete(first, remote_page(first)));
        assert_eq!(acc.len(), 10);
        assert!(acc.has_more());

        for _ in 0..9 {
            let request = acc.begin_next().unwrap();
            assert!(acc.complete(request, remote_page(request)));
        }

        assert_eq!(acc.len(), 100);
        assert!(!acc.has_more());
        assert!(acc.begin_next().is_none());
        let items: Vec<u32> = acc.items().copied().collect();
        assert_eq!(items, (1..=100).collect::<Vec<_>>());
    }

    #[test]
    fn test_short_page_exhausts() {
        let mut acc: PageAccumulator<u32> = PageAccumulator::new();
        let request = acc.begin_next().unwrap();
        acc.complete(request, Page::sized(vec![1, 2, 3], PAGE_SIZE));

        assert!(!acc.has_more());
        assert!(acc.begin_next().is_none());
        assert!(!acc.is_fetching());
    }

    #[test]
    fn test_duplicate_trigger_suppressed() {
        let mut acc: PageAccumulator<u32> = PageAccumulator::new();
        let request = acc.begin_next().unwrap();
        assert!(acc.is_fetching());
        assert!(acc.is_loading_first());
        assert!(acc.begin_next().is_none());
        acc.complete(request, Page::sized((1..=10).collect(), PAGE_SIZE));
        assert_eq!(acc.begin_next().map(|r| r.page), Some(2));
    }

    #[test]
    fn test_filter_change_discards_in_flight() {
        let mut acc: PageAccumulator<u32> = PageAccumulator::new();
        let old = acc.begin_next().unwrap();

        acc.reset("qui");
        assert_eq!(acc.filter(), "qui");
        assert!(!acc.is_fetching());

        assert!(!acc.complete(old, Page::sized((1..=10).collect(), PAGE_SIZE)));
        assert!(acc.is_empty());

        let fresh = acc.begin_next().unwrap();
        assert_eq!(fresh.page, 1);
        assert_ne!(fresh.generation, old.generation);
        assert!(acc.complete(fresh, Page::sized(vec![42], PAGE_SIZE)));
        assert_eq!(acc.items().copied().collect::<Vec<_>>(), vec![42]);
    }

    #[test]
    fn test_failure_keeps_loaded_pages() {
        let mut acc: PageAccumulator<u32> = PageAccumulator::new();
        let first = acc.begin_next().unwrap();
        acc.complete(first, Page::sized((1..=10).collect(), PAGE_SIZE));

        let second = acc.begin_next().unwrap();
        assert!(acc.fail(second, FetchError::Timeout));

        assert_eq!(acc.len(), 10);
        assert_eq!(acc.error(), Some(&FetchError::Timeout));
        assert!(acc.has_more());
        assert_eq!(acc.begin_next().map(|r| r.page), Some(2));
    }

    #[test]
    fn test_stale_failure_ignored() {
        let mut acc: PageAccumulator<u32> = PageAccumulator::new();
        let old = acc.begin_next().unwrap();
        acc.reset("x");
        assert!(!acc.fail(old, FetchError::Timeout));
        assert!(acc.error().is_none());
    }
}
