use std::cmp::Ordering;

use crate::math::decimal_key;

/// Indexed binary max-heap over point ids.
///
/// Weights are quantized to a fixed number of decimals so that values that
/// differ only by floating-point noise compare equal; equal keys pop the
/// smaller id first. Any present id can be re-keyed in `O(log n)`. Keys are
/// exact for weights below `2^63 / 10^decimals` and saturate above it.
#[derive(Debug, Clone)]
pub struct MaxHeap {
    heap: Vec<usize>,
    keys: Vec<i64>,
    positions: Vec<Option<usize>>,
    scale: f64,
    decimals: u32,
}

impl MaxHeap {
    /// Creates an empty heap for ids in `0..capacity`.
    #[must_use]
    pub fn new(capacity: usize, decimals: u32) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
            keys: vec![0; capacity],
            positions: vec![None; capacity],
            scale: 10f64.powi(i32::try_from(decimals).unwrap_or(i32::MAX)),
            decimals,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: usize) -> bool {
        self.positions.get(id).is_some_and(Option::is_some)
    }

    /// Ids still in the heap, in internal heap order.
    #[must_use]
    pub fn ids(&self) -> &[usize] {
        &self.heap
    }

    /// Inserts `id` with `weight`, or re-keys it if already present.
    pub fn push(&mut self, id: usize, weight: f64) {
        if self.contains(id) {
            self.update(id, weight);
            return;
        }
        if id >= self.positions.len() {
            self.positions.resize(id + 1, None);
            self.keys.resize(id + 1, 0);
        }
        self.keys[id] = decimal_key(weight, self.decimals);
        self.heap.push(id);
        let pos = self.heap.len() - 1;
        self.positions[id] = Some(pos);
        self.sift_up(pos);
    }

    /// Largest entry without removing it.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn peek(&self) -> Option<(usize, f64)> {
        self.heap
            .first()
            .map(|&id| (id, self.keys[id] as f64 / self.scale))
    }

    /// Removes and returns the entry with the largest weight.
    #[allow(clippy::cast_precision_loss)]
    pub fn pop(&mut self) -> Option<(usize, f64)> {
        let top = *self.heap.first()?;
        let last = self.heap.len() - 1;
        self.swap(0, last);
        self.heap.pop();
        self.positions[top] = None;
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Some((top, self.keys[top] as f64 / self.scale))
    }

    /// Changes the weight of a present id. Returns `false` if `id` is not in
    /// the heap, in which case nothing changes.
    pub fn update(&mut self, id: usize, weight: f64) -> bool {
        let Some(pos) = self.positions.get(id).copied().flatten() else {
            return false;
        };
        let old = self.keys[id];
        let new = decimal_key(weight, self.decimals);
        self.keys[id] = new;
        match new.cmp(&old) {
            Ordering::Greater => self.sift_up(pos),
            Ordering::Less => self.sift_down(pos),
            Ordering::Equal => {}
        }
        true
    }

    /// `true` if the entry at heap position `a` should sit above `b`.
    fn outranks(&self, a: usize, b: usize) -> bool {
        let (ia, ib) = (self.heap[a], self.heap[b]);
        match self.keys[ia].cmp(&self.keys[ib]) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => ia < ib,
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.positions[self.heap[a]] = Some(a);
        self.positions[self.heap[b]] = Some(b);
    }

    fn sift_up(&mut self, mut pos: usize) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if !self.outranks(pos, parent) {
                break;
            }
            self.swap(pos, parent);
            pos = parent;
        }
    }

    fn sift_down(&mut self, mut pos: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * pos + 1;
            let right = left + 1;
            let mut best = pos;
            if left < len && self.outranks(left, best) {
                best = left;
            }
            if right < len && self.outranks(right, best) {
                best = right;
            }
            if best == pos {
                break;
            }
            self.swap(pos, best);
            pos = best;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_descending_order() {
        let mut heap = MaxHeap::new(5, 8);
        for (id, w) in [(0, 0.3), (1, 2.5), (2, 0.0), (3, 1.25), (4, 0.7)] {
            heap.push(id, w);
        }
        let order: Vec<usize> = std::iter::from_fn(|| heap.pop().map(|(id, _)| id)).collect();
        assert_eq!(order, vec![1, 3, 4, 0, 2]);
    }

    #[test]
    fn pop_returns_quantized_weight() {
        let mut heap = MaxHeap::new(1, 2);
        heap.push(0, 0.123_456);
        let (id, w) = heap.pop().unwrap();
        assert_eq!(id, 0);
        assert!((w - 0.12).abs() < 1e-12);
        assert!(heap.pop().is_none());
    }

    #[test]
    fn ties_pop_smaller_id_first() {
        let mut heap = MaxHeap::new(4, 8);
        heap.push(3, 1.0);
        heap.push(1, 1.0 + 1e-12);
        heap.push(2, 1.0 - 1e-12);
        assert_eq!(heap.pop().unwrap().0, 1);
        assert_eq!(heap.pop().unwrap().0, 2);
        assert_eq!(heap.pop().unwrap().0, 3);
    }

    #[test]
    fn update_moves_entries_both_ways() {
        let mut heap = MaxHeap::new(3, 8);
        heap.push(0, 1.0);
        heap.push(1, 2.0);
        heap.push(2, 3.0);
        assert!(heap.update(2, 0.5));
        assert_eq!(heap.peek().unwrap().0, 1);
        assert!(heap.update(0, 10.0));
        assert_eq!(heap.pop().unwrap().0, 0);
        assert_eq!(heap.pop().unwrap().0, 1);
        assert_eq!(heap.pop().unwrap().0, 2);
    }

    #[test]
    fn update_of_popped_id_is_ignored() {
        let mut heap = MaxHeap::new(2, 8);
        heap.push(0, 1.0);
        heap.push(1, 2.0);
        assert_eq!(heap.pop().unwrap().0, 1);
        assert!(!heap.update(1, 5.0));
        assert_eq!(heap.len(), 1);
        assert!(!heap.contains(1));
    }

    #[test]
    fn push_grows_beyond_capacity() {
        let mut heap = MaxHeap::new(0, 8);
        heap.push(7, 1.0);
        assert!(heap.contains(7));
        assert_eq!(heap.ids(), &[7]);
    }
}
