//! Resolution queue with snapshot-history cycle detection.
//!
//! The queue holds the names of derived slices that have not been resolved
//! yet. Each resolution step either pops the head (its dependencies were all
//! available) or rotates the head to the tail (some dependency is still
//! pending). After every step the queue's exact contents and order are
//! recorded; if a snapshot ever matches an earlier one, the queue has made a
//! full rotation without resolving anything, which is only possible when the
//! remaining names form a cycle or depend on something unresolvable.
//!
//! Both the queue and its history are construction-time scratch state,
//! discarded once resolution completes.

use std::collections::VecDeque;

pub(crate) struct ResolutionQueue {
    pending: VecDeque<String>,
    history: Vec<Vec<String>>,
}

impl ResolutionQueue {
    /// Build the queue in declaration order. The starting configuration is
    /// recorded as the first snapshot.
    pub fn new(names: impl IntoIterator<Item = String>) -> Self {
        let pending: VecDeque<String> = names.into_iter().collect();
        let mut history = Vec::new();
        if !pending.is_empty() {
            history.push(pending.iter().cloned().collect());
        }
        Self { pending, history }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Name currently at the head, if any.
    pub fn head(&self) -> Option<&str> {
        self.pending.front().map(String::as_str)
    }

    /// Pop the head: its value has been resolved.
    pub fn resolve_head(&mut self) -> Option<String> {
        self.pending.pop_front()
    }

    /// Rotate the head to the tail: some dependency is still pending.
    pub fn defer_head(&mut self) {
        if let Some(name) = self.pending.pop_front() {
            self.pending.push_back(name);
        }
    }

    /// Record the queue's configuration after a step. Returns `true` when the
    /// configuration exactly matches a previously recorded snapshot, meaning
    /// no further progress is possible.
    pub fn record_step(&mut self) -> bool {
        let snapshot: Vec<String> = self.pending.iter().cloned().collect();
        let repeated = self.history.iter().any(|past| *past == snapshot);
        self.history.push(snapshot);
        repeated
    }

    /// Names still waiting to be resolved, in queue order.
    pub fn remaining(&self) -> Vec<String> {
        self.pending.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue(names: &[&str]) -> ResolutionQueue {
        ResolutionQueue::new(names.iter().map(|n| n.to_string()))
    }

    #[test]
    fn resolve_pops_in_fifo_order() {
        let mut q = queue(&["a", "b", "c"]);
        assert_eq!(q.head(), Some("a"));
        assert_eq!(q.resolve_head(), Some("a".to_string()));
        assert_eq!(q.head(), Some("b"));
        assert!(!q.is_empty());
    }

    #[test]
    fn defer_rotates_head_to_tail() {
        let mut q = queue(&["a", "b", "c"]);
        q.defer_head();
        assert_eq!(q.head(), Some("b"));
        assert_eq!(q.remaining(), ["b", "c", "a"]);
    }

    #[test]
    fn full_rotation_without_progress_repeats_a_snapshot() {
        let mut q = queue(&["a", "b"]);

        // Deferring both names brings the queue back to its starting
        // configuration, which was recorded at construction.
        q.defer_head();
        assert!(!q.record_step());
        q.defer_head();
        assert!(q.record_step());
        assert_eq!(q.remaining(), ["a", "b"]);
    }

    #[test]
    fn progress_resets_the_rotation() {
        let mut q = queue(&["a", "b", "c"]);

        q.defer_head();
        assert!(!q.record_step()); // b c a
        q.resolve_head();
        assert!(!q.record_step()); // c a
        q.defer_head();
        assert!(!q.record_step()); // a c
        q.defer_head();
        assert!(q.record_step()); // c a again, no resolution in between
    }

    #[test]
    fn empty_queue_records_nothing_at_construction() {
        let mut q = ResolutionQueue::new(Vec::new());
        assert!(q.is_empty());
        assert_eq!(q.head(), None);
        assert_eq!(q.resolve_head(), None);
        assert!(!q.record_step());
    }
}
