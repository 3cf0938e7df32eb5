//! A min-heap whose elements can be removed or re-keyed after insertion.
//!
//! Removal is lazy: removed entries stay in the underlying binary heap and are
//! purged only once they reach the top, so `remove` never has to search the heap.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};
use std::hash::Hash;

use crate::errors::EmptyError;

struct Slot<E, K> {
    key: K,
    seq: u64,
    element: E,
}

impl<E, K: Ord> PartialEq for Slot<E, K> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<E, K: Ord> Eq for Slot<E, K> {}

impl<E, K: Ord> PartialOrd for Slot<E, K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E, K: Ord> Ord for Slot<E, K> {
    // Equal keys pop in insertion order.
    fn cmp(&self, other: &Self) -> Ordering {
        self.key
            .cmp(&other.key)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// A collection of `(element, key)` pairs ordered ascending by `key`.
///
/// Elements are identified by equality, so the same element may be pushed more
/// than once. Every pushed entry stays live until it is popped or its element is
/// removed, but only the most recently pushed live entry of an element is
/// authoritative: it is the one [`MutableHeap::peek`], [`MutableHeap::pop`] and
/// [`MutableHeap::current_key`] report. An older entry that reaches the top of
/// the heap is discarded instead of being returned.
///
/// # Examples
///
/// ```
/// # use biggest::heap::MutableHeap;
/// let mut heap = MutableHeap::new();
/// heap.push("a", 3);
/// heap.push("b", 1);
/// heap.push("c", 2);
///
/// assert!(heap.remove(&"b"));
/// heap.update_key("a", 0);
///
/// assert_eq!(heap.pop(), Ok("a"));
/// assert_eq!(heap.pop(), Ok("c"));
/// assert!(heap.pop().is_err());
/// ```
pub struct MutableHeap<E, K> {
    heap: BinaryHeap<Reverse<Slot<E, K>>>,
    live: HashMap<E, Vec<(u64, K)>>,
    next_seq: u64,
}

impl<E, K> MutableHeap<E, K>
where
    E: Eq + Hash + Clone,
    K: Ord + Clone,
{
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            live: HashMap::new(),
            next_seq: 0,
        }
    }

    /// Inserts `element` with `key`.
    ///
    /// Any entries already live for `element` are kept; use
    /// [`MutableHeap::update_key`] to replace them instead.
    pub fn push(&mut self, element: E, key: K) {
        let seq = self.next_seq;
        self.next_seq += 1;

        self.live
            .entry(element.clone())
            .or_default()
            .push((seq, key.clone()));
        self.heap.push(Reverse(Slot { key, seq, element }));
    }

    /// Marks every live entry for `element` as removed.
    ///
    /// Returns `false` when `element` had no live entry.
    pub fn remove(&mut self, element: &E) -> bool {
        let removed = self.live.remove(element).is_some();
        self.purge();
        removed
    }

    /// Replaces whatever keys `element` had with `key`.
    ///
    /// This is a remove followed by a push, so it works for both decreasing and
    /// increasing keys and for elements that were not present.
    pub fn update_key(&mut self, element: E, key: K) {
        self.remove(&element);
        self.push(element, key);
    }

    /// The key of the most recently pushed live entry for `element`.
    pub fn current_key(&self, element: &E) -> Option<&K> {
        self.live
            .get(element)
            .and_then(|entries| entries.last())
            .map(|(_, key)| key)
    }

    pub fn contains(&self, element: &E) -> bool {
        self.live.contains_key(element)
    }

    /// Returns the element whose authoritative key is the smallest.
    pub fn peek(&mut self) -> Result<&E, EmptyError> {
        self.purge();
        self.heap
            .peek()
            .map(|Reverse(slot)| &slot.element)
            .ok_or(EmptyError)
    }

    /// Returns the smallest authoritative key.
    pub fn peek_key(&mut self) -> Result<&K, EmptyError> {
        self.purge();
        self.heap
            .peek()
            .map(|Reverse(slot)| &slot.key)
            .ok_or(EmptyError)
    }

    /// Removes and returns the element whose authoritative key is the smallest.
    pub fn pop(&mut self) -> Result<E, EmptyError> {
        self.pop_with_key().map(|(element, _)| element)
    }

    /// Removes the authoritative entry with the smallest key and returns it with
    /// its key.
    ///
    /// Older live entries for the same element are left in place, and the most
    /// recent of them becomes authoritative.
    pub fn pop_with_key(&mut self) -> Result<(E, K), EmptyError> {
        self.purge();
        let Reverse(slot) = self.heap.pop().ok_or(EmptyError)?;

        if let Some(entries) = self.live.get_mut(&slot.element) {
            entries.retain(|(seq, _)| *seq != slot.seq);
            if entries.is_empty() {
                self.live.remove(&slot.element);
            }
        }
        self.purge();

        Ok((slot.element, slot.key))
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.live.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    // Only the most recently pushed live entry of an element may surface.
    fn is_current(&self, slot: &Slot<E, K>) -> bool {
        self.live
            .get(&slot.element)
            .and_then(|entries| entries.last())
            .is_some_and(|(seq, _)| *seq == slot.seq)
    }

    // Drops removed and superseded entries until the top of the heap is current.
    fn purge(&mut self) {
        while let Some(Reverse(top)) = self.heap.peek() {
            if self.is_current(top) {
                break;
            }
            if let Some(Reverse(stale)) = self.heap.pop() {
                if let Some(entries) = self.live.get_mut(&stale.element) {
                    entries.retain(|(seq, _)| *seq != stale.seq);
                    if entries.is_empty() {
                        self.live.remove(&stale.element);
                    }
                }
            }
        }
    }
}

impl<E, K> Default for MutableHeap<E, K>
where
    E: Eq + Hash + Clone,
    K: Ord + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E, K> FromIterator<(E, K)> for MutableHeap<E, K>
where
    E: Eq + Hash + Clone,
    K: Ord + Clone,
{
    fn from_iter<I: IntoIterator<Item = (E, K)>>(iter: I) -> Self {
        let mut heap = Self::new();
        for (element, key) in iter {
            heap.push(element, key);
        }
        heap
    }
}
