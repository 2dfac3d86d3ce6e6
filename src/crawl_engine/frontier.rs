//! FIFO frontier with at-most-once visitation
//!
//! A URL is in `visited` from the moment it is handed out for fetching, so a
//! link back to a page in flight can never queue it again.

use std::collections::{HashSet, VecDeque};

#[derive(Debug, Default, Clone)]
pub struct Frontier {
    visited: HashSet<String>,
    queued: HashSet<String>,
    pending: VecDeque<String>,
}

impl Frontier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a URL unless it is already visited or queued
    pub fn enqueue(&mut self, url: impl Into<String>) -> bool {
        let url = url.into();
        if self.visited.contains(&url) || self.queued.contains(&url) {
            return false;
        }

        self.queued.insert(url.clone());
        self.pending.push_back(url);
        true
    }

    /// Pop the oldest queued URL and mark it visited
    pub fn next(&mut self) -> Option<String> {
        let url = self.pending.pop_front()?;
        self.queued.remove(&url);
        self.visited.insert(url.clone());
        Some(url)
    }

    #[must_use]
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    #[must_use]
    pub fn is_queued(&self, url: &str) -> bool {
        self.queued.contains(url)
    }

    /// Take a URL for an immediate out-of-band fetch
    ///
    /// Returns false when it was already visited. A queued copy is dropped so
    /// the URL is still fetched only once.
    pub fn claim(&mut self, url: &str) -> bool {
        if self.visited.contains(url) {
            return false;
        }

        if self.queued.remove(url) {
            self.pending.retain(|pending| pending != url);
        }
        self.visited.insert(url.to_string());
        true
    }

    /// Record a URL as visited without fetching it (resume)
    pub fn mark_visited(&mut self, url: impl Into<String>) {
        let url = url.into();
        if self.queued.remove(&url) {
            self.pending.retain(|pending| *pending != url);
        }
        self.visited.insert(url);
    }

    /// Queued URLs in fetch order
    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.pending.iter().map(String::as_str)
    }

    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut frontier = Frontier::new();
        assert!(frontier.enqueue("A"));
        assert!(frontier.enqueue("B"));
        assert!(frontier.enqueue("C"));

        assert_eq!(frontier.next().as_deref(), Some("A"));
        assert_eq!(frontier.next().as_deref(), Some("B"));
        assert_eq!(frontier.next().as_deref(), Some("C"));
        assert_eq!(frontier.next(), None);
    }

    #[test]
    fn test_duplicates_and_visited_are_refused() {
        let mut frontier = Frontier::new();
        assert!(frontier.enqueue("A"));
        assert!(!frontier.enqueue("A"));

        assert_eq!(frontier.next().as_deref(), Some("A"));
        assert!(frontier.is_visited("A"));
        assert!(!frontier.enqueue("A"));
        assert!(frontier.is_empty());
    }

    #[test]
    fn test_claim_removes_queued_copy() {
        let mut frontier = Frontier::new();
        frontier.enqueue("A");
        frontier.enqueue("B");

        assert!(frontier.claim("B"));
        assert!(!frontier.claim("B"));
        assert_eq!(frontier.pending_len(), 1);
        assert_eq!(frontier.next().as_deref(), Some("A"));
        assert_eq!(frontier.next(), None);
        assert_eq!(frontier.visited_len(), 2);
    }

    #[test]
    fn test_mark_visited_blocks_enqueue() {
        let mut frontier = Frontier::new();
        frontier.mark_visited("hist0304/");
        assert!(!frontier.enqueue("hist0304/"));
        assert!(frontier.is_empty());
    }
}
