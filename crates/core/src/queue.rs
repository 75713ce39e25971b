//! Resolution queue - FIFO of coordinates with duplicate suppression

use std::collections::{HashSet, VecDeque};

use crate::types::Hex;

/// Coordinates waiting to be re-examined during one resolution pass.
///
/// Processing order is insertion order; a coordinate already waiting is not
/// added a second time.
#[derive(Debug, Clone, Default)]
pub struct ResolutionQueue {
    order: VecDeque<Hex>,
    members: HashSet<Hex>,
}

impl ResolutionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue seeded with a single coordinate
    pub fn seeded(at: Hex) -> Self {
        let mut queue = Self::new();
        queue.push(at);
        queue
    }

    /// Append `at` unless it is already waiting. Returns whether it was added.
    pub fn push(&mut self, at: Hex) -> bool {
        if !self.members.insert(at) {
            return false;
        }
        self.order.push_back(at);
        true
    }

    pub fn pop(&mut self) -> Option<Hex> {
        let at = self.order.pop_front()?;
        self.members.remove(&at);
        Some(at)
    }

    pub fn contains(&self, at: Hex) -> bool {
        self.members.contains(&at)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Waiting coordinates in processing order
    pub fn iter(&self) -> impl Iterator<Item = Hex> + '_ {
        self.order.iter().copied()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut queue = ResolutionQueue::new();
        queue.push(Hex::new(0, 0));
        queue.push(Hex::new(1, 0));
        queue.push(Hex::new(0, 1));

        assert_eq!(queue.pop(), Some(Hex::new(0, 0)));
        assert_eq!(queue.pop(), Some(Hex::new(1, 0)));
        assert_eq!(queue.pop(), Some(Hex::new(0, 1)));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_duplicates_suppressed_while_waiting() {
        let mut queue = ResolutionQueue::seeded(Hex::ORIGIN);
        assert!(!queue.push(Hex::ORIGIN));
        assert_eq!(queue.len(), 1);

        // Once popped, the same coordinate can be queued again.
        assert_eq!(queue.pop(), Some(Hex::ORIGIN));
        assert!(queue.push(Hex::ORIGIN));
        assert!(queue.contains(Hex::ORIGIN));
    }
}
