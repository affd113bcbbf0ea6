use std::collections::HashSet;

/// Tracks the traversal state of a single site walk
///
/// Topic pages and article pages share one visited namespace. The saved-article counter
/// only ever grows and is checked against a fixed budget.
#[derive(Debug, Clone)]
pub struct CrawlState {
    /// Every URL a visit was attempted for (allowed, disallowed or failed)
    visited: HashSet<String>,

    /// Number of articles handed to the sink so far
    articles_saved: usize,

    /// Maximum number of articles this walk may save
    budget: usize,
}

impl CrawlState {
    /// Creates an empty state with the given article budget
    pub fn new(budget: usize) -> Self {
        Self {
            visited: HashSet::new(),
            articles_saved: 0,
            budget,
        }
    }

    /// Marks a URL as visited
    ///
    /// # Returns
    ///
    /// * `true` - The URL had not been visited before
    /// * `false` - The URL was already visited and must be skipped
    pub fn mark_visited(&mut self, url: &str) -> bool {
        if self.visited.contains(url) {
            return false;
        }
        self.visited.insert(url.to_string())
    }

    /// Checks whether a URL has already been visited
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Records one saved article
    ///
    /// The counter saturates at the budget so it can never exceed it.
    pub fn record_saved(&mut self) {
        if self.articles_saved < self.budget {
            self.articles_saved += 1;
        }
    }

    /// Returns true once the article budget is used up
    pub fn budget_reached(&self) -> bool {
        self.articles_saved >= self.budget
    }

    /// Number of articles saved so far
    pub fn articles_saved(&self) -> usize {
        self.articles_saved
    }

    /// Number of articles that may still be saved
    pub fn remaining(&self) -> usize {
        self.budget.saturating_sub(self.articles_saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state() {
        let state = CrawlState::new(5);
        assert_eq!(state.articles_saved(), 0);
        assert_eq!(state.remaining(), 5);
        assert!(!state.is_visited("https://example.com/"));
        assert!(!state.budget_reached());
    }

    #[test]
    fn test_mark_visited_once() {
        let mut state = CrawlState::new(5);
        assert!(state.mark_visited("https://example.com/a"));
        assert!(!state.mark_visited("https://example.com/a"));
        assert!(state.is_visited("https://example.com/a"));
        assert!(!state.is_visited("https://example.com/b"));
    }

    #[test]
    fn test_budget_reached() {
        let mut state = CrawlState::new(2);
        state.record_saved();
        assert!(!state.budget_reached());
        state.record_saved();
        assert!(state.budget_reached());
        assert_eq!(state.remaining(), 0);
    }

    #[test]
    fn test_counter_never_exceeds_budget() {
        let mut state = CrawlState::new(1);
        state.record_saved();
        state.record_saved();
        state.record_saved();
        assert_eq!(state.articles_saved(), 1);
    }

    #[test]
    fn test_zero_budget_is_immediately_reached() {
        let state = CrawlState::new(0);
        assert!(state.budget_reached());
    }
}
