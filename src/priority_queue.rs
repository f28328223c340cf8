//! Array-backed binary min-heap.
//!
//! Ordering comes from the element type's `Ord` impl or from a comparator
//! fixed at construction. Positions are 1-based: the root lives at position 1
//! and the parent of position `i` is `i / 2`. When the backing storage is
//! full, capacity grows to `2 * capacity + 1`.

use std::cmp::Ordering;

use tracing::trace;

use crate::error::{CompressError, Result};

pub const DEFAULT_CAPACITY: usize = 11;

/// Comparator type used when ordering falls back to `Ord`.
pub type NaturalOrder<T> = fn(&T, &T) -> Ordering;

#[derive(Clone)]
pub struct PriorityQueue<T, F = NaturalOrder<T>> {
    items: Vec<T>,
    capacity: usize,
    compare: F,
}

impl<T: Ord> PriorityQueue<T> {
    pub fn new() -> Self {
        Self::build(DEFAULT_CAPACITY, <T as Ord>::cmp as NaturalOrder<T>)
    }

    /// Fails with `InvalidArgument` if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::with_capacity_and_comparator(capacity, <T as Ord>::cmp as NaturalOrder<T>)
    }
}

impl<T: Ord> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, F> PriorityQueue<T, F>
where
    F: Fn(&T, &T) -> Ordering,
{
    pub fn with_comparator(compare: F) -> Self {
        Self::build(DEFAULT_CAPACITY, compare)
    }

    pub fn with_capacity_and_comparator(capacity: usize, compare: F) -> Result<Self> {
        if capacity == 0 {
            return Err(CompressError::invalid_argument(
                "priority queue capacity must be at least 1",
            ));
        }
        Ok(Self::build(capacity, compare))
    }

    /// Seeds a queue by offering every element of `iter` in turn.
    pub fn from_iter_with<I>(iter: I, compare: F) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut queue = Self::with_comparator(compare);
        queue.extend(iter);
        queue
    }

    fn build(capacity: usize, compare: F) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
            compare,
        }
    }

    pub fn offer(&mut self, item: T) {
        if self.items.len() == self.capacity {
            self.grow();
        }
        self.items.push(item);
        self.sift_up(self.items.len());
    }

    /// Removes and returns the minimum element.
    pub fn poll(&mut self) -> Option<T> {
        let last = self.items.len().checked_sub(1)?;
        self.items.swap(0, last);
        let min = self.items.pop();
        if !self.items.is_empty() {
            self.sift_down(1);
        }
        min
    }

    pub fn peek(&self) -> Option<&T> {
        self.items.first()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn comparator(&self) -> &F {
        &self.compare
    }

    /// Elements in heap storage order, not sorted order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    fn grow(&mut self) {
        let grown = self.capacity * 2 + 1;
        self.items.reserve_exact(grown - self.items.len());
        trace!(from = self.capacity, to = grown, "priority queue grown");
        self.capacity = grown;
    }

    fn at(&self, pos: usize) -> &T {
        &self.items[pos - 1]
    }

    /// Strict comparison between two 1-based positions.
    fn less(&self, a: usize, b: usize) -> bool {
        (self.compare)(self.at(a), self.at(b)) == Ordering::Less
    }

    fn sift_up(&mut self, mut pos: usize) {
        while pos > 1 {
            let parent = pos / 2;
            if !self.less(pos, parent) {
                break;
            }
            self.items.swap(pos - 1, parent - 1);
            pos = parent;
        }
    }

    fn sift_down(&mut self, mut pos: usize) {
        let len = self.items.len();
        loop {
            let left = pos * 2;
            if left > len {
                break;
            }
            let right = left + 1;
            let child = if right <= len && self.less(right, left) {
                right
            } else {
                left
            };
            if !self.less(child, pos) {
                break;
            }
            self.items.swap(pos - 1, child - 1);
            pos = child;
        }
    }
}

impl<T, F> Extend<T> for PriorityQueue<T, F>
where
    F: Fn(&T, &T) -> Ordering,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.offer(item);
        }
    }
}

impl<T: Ord> FromIterator<T> for PriorityQueue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_iter_with(iter, <T as Ord>::cmp as NaturalOrder<T>)
    }
}

impl<'a, T, F> IntoIterator for &'a PriorityQueue<T, F> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: std::fmt::Debug, F> std::fmt::Debug for PriorityQueue<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriorityQueue")
            .field("items", &self.items)
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::cmp::Reverse;
    use std::collections::BinaryHeap;

    fn assert_heap_ordered<T, F: Fn(&T, &T) -> Ordering>(queue: &PriorityQueue<T, F>) {
        for pos in 2..=queue.len() {
            assert!(!queue.less(pos, pos / 2), "heap order broken at {}", pos);
        }
    }

    #[test]
    fn test_peek() {
        let mut queue = PriorityQueue::new();
        queue.offer(5);
        queue.offer(1);
        assert_eq!(queue.peek(), Some(&1));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_poll() {
        let mut queue = PriorityQueue::new();
        queue.offer(5);
        queue.offer(1);
        queue.offer(3);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.poll(), Some(1));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.poll(), Some(3));
        assert_eq!(queue.poll(), Some(5));
    }

    #[test]
    fn test_empty() {
        let mut queue: PriorityQueue<u32> = PriorityQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.peek(), None);
        assert_eq!(queue.poll(), None);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result = PriorityQueue::<u32>::with_capacity(0);
        assert!(matches!(result, Err(CompressError::InvalidArgument(_))));
    }

    #[test]
    fn test_growth() {
        let mut queue = PriorityQueue::with_capacity(1).unwrap();
        queue.offer("b");
        assert_eq!(queue.capacity(), 1);
        queue.offer("a");
        assert_eq!(queue.capacity(), 3);
        queue.offer("d");
        queue.offer("c");
        assert_eq!(queue.capacity(), 7);
        assert_eq!(queue.poll(), Some("a"));
        assert_eq!(queue.peek(), Some(&"b"));
    }

    #[test]
    fn test_comparator() {
        let mut queue = PriorityQueue::with_comparator(|a: &i32, b: &i32| b.cmp(a));
        queue.extend([3, 9, -2, 7]);
        assert_eq!(queue.poll(), Some(9));
        assert_eq!(queue.poll(), Some(7));
        assert_eq!(queue.comparator()(&1, &2), Ordering::Greater);
    }

    #[test]
    fn test_duplicates() {
        let mut queue: PriorityQueue<u8> = [4, 4, 1, 4, 1].into_iter().collect();
        let drained: Vec<u8> = std::iter::from_fn(|| queue.poll()).collect();
        assert_eq!(drained, vec![1, 1, 4, 4, 4]);
    }

    #[test]
    fn test_iter_yields_all_elements() {
        let queue: PriorityQueue<i32> = (0..20).rev().collect();
        let mut seen: Vec<i32> = queue.iter().copied().collect();
        seen.sort();
        assert_eq!(seen, (0..20).collect::<Vec<_>>());
        assert_eq!((&queue).into_iter().count(), 20);
    }

    #[test]
    fn test_reseed_from_queue_keeps_ordering() {
        let source = PriorityQueue::from_iter_with([1, 5, 3], |a: &i32, b: &i32| b.cmp(a));
        let mut copy =
            PriorityQueue::from_iter_with(source.iter().copied(), source.comparator().clone());
        assert_eq!(copy.poll(), Some(5));
    }

    #[test]
    fn test_stress_against_binary_heap() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut reference = BinaryHeap::new();
        let mut queue = PriorityQueue::new();

        reference.push(Reverse(10));
        queue.offer(10);

        for _ in 0..10_000 {
            if rng.gen::<f32>() < 0.66 {
                let value = rng.gen_range(0..100);
                reference.push(Reverse(value));
                queue.offer(value);
            } else {
                assert_eq!(queue.poll(), reference.pop().map(|Reverse(v)| v));
            }

            assert_eq!(queue.len(), reference.len());
            assert_eq!(queue.peek(), reference.peek().map(|Reverse(v)| v));
            assert_heap_ordered(&queue);
        }

        let mut actual: Vec<i32> = queue.iter().copied().collect();
        let mut expected: Vec<i32> = reference.into_iter().map(|Reverse(v)| v).collect();
        actual.sort();
        expected.sort();
        assert_eq!(actual, expected);
    }
}
