// Debounced search input.
// Separates the text being typed from the query that drives fetching.

use std::time::{Duration, Instant};

use crate::config::DEFAULT_DEBOUNCE;

/// Search box state: raw keystrokes plus the committed query.
#[derive(Debug, Clone)]
pub struct SearchInput {
    raw: String,
    committed: String,
    delay: Duration,
    /// When the raw value last changed without being committed.
    changed_at: Option<Instant>,
    /// Whether keystrokes currently go to the search box.
    pub editing: bool,
}

impl Default for SearchInput {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl SearchInput {
    pub fn new(delay: Duration) -> Self {
        Self {
            raw: String::new(),
            committed: String::new(),
            delay,
            changed_at: None,
            editing: false,
        }
    }

    /// Text shown in the input box.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Query used for cache keys and pagination resets.
    pub fn committed(&self) -> &str {
        &self.committed
    }

    #[cfg(test)]
    pub fn set_raw(&mut self, value: impl Into<String>, now: Instant) {
        self.raw = value.into();
        self.changed_at = Some(now);
    }

    pub fn push(&mut self, c: char, now: Instant) {
        self.raw.push(c);
        self.changed_at = Some(now);
    }

    pub fn pop(&mut self, now: Instant) {
        if self.raw.pop().is_some() {
            self.changed_at = Some(now);
        }
    }

    /// Commit the raw value once it has been quiet for the debounce delay.
    /// Returns true when the committed query changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(changed_at) = self.changed_at else {
            return false;
        };
        if now.duration_since(changed_at) < self.delay {
            return false;
        }
        self.changed_at = None;
        if self.raw == self.committed {
            return false;
        }
        self.committed = self.raw.clone();
        true
    }

    /// Empty both values immediately. Returns true when the committed query changed.
    pub fn clear(&mut self) -> bool {
        let changed = !self.committed.is_empty();
        self.raw.clear();
        self.committed.clear();
        self.changed_at = None;
        changed
    }

    pub fn is_pending(&self) -> bool {
        self.changed_at.is_some()
    }

    /// Time left before a pending value would commit.
    pub fn time_until_commit(&self, now: Instant) -> Option<Duration> {
        self.changed_at
            .map(|changed_at| self.delay.saturating_sub(now.duration_since(changed_at)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(300);

    #[test]
    fn test_commits_after_quiet_period() {
        let start = Instant::now();
        let mut search = SearchInput::new(DELAY);

        search.push('q', start);
        search.push('u', start + Duration::from_millis(100));
        search.push('i', start + Duration::from_millis(200));
        assert_eq!(search.raw(), "qui");
        assert_eq!(search.committed(), "");

        // 250ms after the last keystroke: still waiting.
        assert!(!search.tick(start + Duration::from_millis(450)));
        assert_eq!(search.committed(), "");

        assert!(search.tick(start + Duration::from_millis(500)));
        assert_eq!(search.committed(), "qui");
        assert!(!search.is_pending());
    }

    #[test]
    fn test_no_change_no_commit() {
        let start = Instant::now();
        let mut search = SearchInput::new(DELAY);
        search.push('a', start);
        search.pop(start + Duration::from_millis(10));
        assert!(!search.tick(start + Duration::from_secs(1)));
        assert_eq!(search.committed(), "");
    }

    #[test]
    fn test_clear_bypasses_delay() {
        let start = Instant::now();
        let mut search = SearchInput::new(DELAY);
        search.set_raw("sunt", start);
        search.tick(start + DELAY);
        search.push('x', start + DELAY);

        assert!(search.clear());
        assert_eq!(search.raw(), "");
        assert_eq!(search.committed(), "");
        assert!(!search.tick(start + DELAY * 10));
    }

    #[test]
    fn test_time_until_commit() {
        let start = Instant::now();
        let mut search = SearchInput::new(DELAY);
        assert_eq!(search.time_until_commit(start), None);
        search.push('a', start);
        assert_eq!(
            search.time_until_commit(start + Duration::from_millis(100)),
            Some(Duration::from_millis(200))
        );
    }
}
