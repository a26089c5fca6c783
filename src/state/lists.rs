// List and detail view state.
// Pairs loaded data with selection and viewport bookkeeping for the renderer.

use ratatui::widgets::ListState;

use crate::cache::QueryResult;
use crate::error::FetchError;

use super::pagination::{Page, PageAccumulator, PageRequest};

/// Data for a single query plus its last error.
///
/// A failed refresh keeps whatever was shown before.
#[derive(Debug, Clone)]
pub struct QueryState<T> {
    pub data: Option<T>,
    pub error: Option<FetchError>,
    pub loading: bool,
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            loading: false,
        }
    }
}

impl<T> QueryState<T> {
    pub fn begin(&mut self) {
        self.loading = true;
    }

    pub fn apply(&mut self, result: QueryResult<T>) {
        self.loading = false;
        if result.is_degraded() {
            tracing::debug!("refresh failed, keeping last data");
        }
        self.error = result.error;
        if let Some(data) = result.data {
            self.data = Some(data);
        }
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Loading with nothing to show yet.
    pub fn is_loading_first(&self) -> bool {
        self.loading && self.data.is_none()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Infinite-scroll list: accumulated pages, selection and visible window.
#[derive(Debug, Clone)]
pub struct PagedList<T> {
    pub pages: PageAccumulator<T>,
    pub list_state: ListState,
    /// Rows the list occupied at the last draw; zero before the first draw.
    pub viewport_rows: usize,
}

impl<T> Default for PagedList<T> {
    fn default() -> Self {
        Self {
            pages: PageAccumulator::new(),
            list_state: ListState::default(),
            viewport_rows: 0,
        }
    }
}

impl<T> PagedList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start over for `filter`.
    pub fn reset(&mut self, filter: impl Into<String>) {
        self.pages.reset(filter);
        self.list_state = ListState::default();
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Get the currently selected index.
    pub fn selected(&self) -> Option<usize> {
        self.list_state.selected()
    }

    /// Select the next item in the list.
    pub fn select_next(&mut self) {
        let len = self.len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 >= len => i, // Stay at end
            Some(i) => i + 1,
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    /// Select the previous item in the list.
    pub fn select_prev(&mut self) {
        if self.is_empty() {
            return;
        }
        let i = self.list_state.selected().map_or(0, |i| i.saturating_sub(1));
        self.list_state.select(Some(i));
    }

    /// Get the selected item.
    pub fn selected_item(&self) -> Option<&T> {
        self.pages.get(self.list_state.selected()?)
    }

    /// Whether the trailing "load more" row falls inside the drawn window.
    pub fn sentinel_visible(&self) -> bool {
        if self.viewport_rows == 0 || !self.pages.has_more() {
            return false;
        }
        self.list_state.offset() + self.viewport_rows > self.len()
    }

    /// Claim the next page when the sentinel is on screen and nothing blocks loading.
    pub fn request_more(&mut self) -> Option<PageRequest> {
        if self.pages.error().is_some() || !self.sentinel_visible() {
            return None;
        }
        self.pages.begin_next()
    }

    /// Append a page; selects the first row once something is shown.
    pub fn complete(&mut self, request: PageRequest, page: Page<T>) -> bool {
        let applied = self.pages.complete(request, page);
        if applied && self.list_state.selected().is_none() && !self.is_empty() {
            self.list_state.select(Some(0));
        }
        applied
    }

    pub fn fail(&mut self, request: PageRequest, error: FetchError) -> bool {
        self.pages.fail(request, error)
    }
}

/// Plain selectable list over a fixed set of rows.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub list_state: ListState,
}

impl Selection {
    pub fn select_next(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(len - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_prev(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let i = self.list_state.selected().map_or(0, |i| i.saturating_sub(1));
        self.list_state.select(Some(i));
    }

    /// Selected index, clamped to `len`.
    pub fn selected(&self, len: usize) -> Option<usize> {
        self.list_state.selected().filter(|&i| i < len)
    }

    pub fn reset(&mut self) {
        self.list_state = ListState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_page(from: u32) -> Page<u32> {
        Page {
            items: (from..from + 10).collect(),
            has_more: true,
        }
    }

    #[test]
    fn test_query_state_keeps_data_on_error() {
        let mut state = QueryState::default();
        state.begin();
        assert!(state.is_loading_first());
        state.apply(QueryResult::ok(vec![1, 2]));
        assert_eq!(state.data(), Some(&vec![1, 2]));

        state.begin();
        state.apply(QueryResult {
            data: None,
            error: Some(FetchError::Timeout),
        });
        assert_eq!(state.data(), Some(&vec![1, 2]));
        assert_eq!(state.error, Some(FetchError::Timeout));
        assert!(!state.loading);
    }

    #[test]
    fn test_sentinel_requires_draw() {
        let mut list: PagedList<u32> = PagedList::new();
        assert!(!list.sentinel_visible());
        list.viewport_rows = 20;
        assert!(list.sentinel_visible());
    }

    #[test]
    fn test_sentinel_visibility_follows_viewport() {
        let mut list = PagedList::new();
        list.viewport_rows = 5;
        let first = list.pages.begin_next().unwrap();
        assert!(list.complete(first, full_page(1)));
        assert_eq!(list.selected(), Some(0));

        // Ten rows loaded, five visible from the top: sentinel off screen.
        assert!(!list.sentinel_visible());
        assert!(list.request_more().is_none());

        *list.list_state.offset_mut() = 6;
        assert!(list.sentinel_visible());
        let second = list.request_more().unwrap();
        assert_eq!(second.page, 2);
        // Already in flight.
        assert!(list.request_more().is_none());
    }

    #[test]
    fn test_error_blocks_auto_loading() {
        let mut list: PagedList<u32> = PagedList::new();
        list.viewport_rows = 20;
        let first = list.request_more().unwrap();
        list.fail(first, FetchError::Network("offline".into()));
        assert!(list.request_more().is_none());

        list.pages.clear_error();
        assert!(list.request_more().is_some());
    }

    #[test]
    fn test_selection_bounds() {
        let mut list = PagedList::new();
        let first = list.pages.begin_next().unwrap();
        list.complete(first, Page::sized(vec![1, 2, 3], 10));

        list.select_prev();
        assert_eq!(list.selected_item(), Some(&1));
        for _ in 0..5 {
            list.select_next();
        }
        assert_eq!(list.selected_item(), Some(&3));
    }

    #[test]
    fn test_reset_clears_selection() {
        let mut list = PagedList::new();
        let first = list.pages.begin_next().unwrap();
        list.complete(first, full_page(1));
        list.select_next();

        list.reset("eum");
        assert_eq!(list.selected(), None);
        assert!(list.is_empty());
        assert_eq!(list.pages.filter(), "eum");
    }

    #[test]
    fn test_plain_selection() {
        let mut selection = Selection::default();
        selection.select_next(0);
        assert_eq!(selection.selected(3), None);
        selection.select_next(3);
        selection.select_next(3);
        selection.select_next(3);
        selection.select_next(3);
        assert_eq!(selection.selected(3), Some(2));
        assert_eq!(selection.selected(2), None);
        selection.select_prev(3);
        assert_eq!(selection.selected(3), Some(1));
    }
}
