//! Cyclic doubly-linked list over vertex indices.

use std::collections::HashMap;

/// A closed polygon boundary stored as a chain of links over vertex indices.
///
/// The chain runs from [`Loop::first`] to [`Loop::last`] through explicit
/// links; the closing link `last -> first` is implicit. This lets a loop be
/// grown one edge at a time before it is known to be closed.
///
/// Links live in two companion maps, so navigation, insertion and removal
/// are all O(1). A loop with no links is *cleared*: it marks a loop that has
/// been merged into another one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Loop {
    forward: HashMap<usize, usize>,
    backward: HashMap<usize, usize>,
    first: Option<usize>,
    last: Option<usize>,
}

impl Loop {
    /// Creates an empty (cleared) loop.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a loop from an ordered list of distinct vertex indices.
    pub fn from_indices(indices: &[usize]) -> Self {
        let mut result = Self::new();
        for pair in indices.windows(2) {
            result.add_link(pair[0], pair[1]);
        }
        if let [single] = indices {
            result.first = Some(*single);
            result.last = Some(*single);
        }
        result
    }

    /// Returns the head of the chain.
    #[inline]
    pub fn first(&self) -> Option<usize> {
        self.first
    }

    /// Returns the tail of the chain.
    #[inline]
    pub fn last(&self) -> Option<usize> {
        self.last
    }

    /// Returns `true` if the loop has been cleared (or never had a link).
    #[inline]
    pub fn is_cleared(&self) -> bool {
        self.first.is_none()
    }

    /// Number of explicit links (the implicit closing link is not counted).
    #[inline]
    pub fn link_count(&self) -> usize {
        self.forward.len()
    }

    /// Number of vertices in the loop.
    pub fn len(&self) -> usize {
        match self.first {
            None => 0,
            Some(_) => self.forward.len() + 1,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if `index` is one of the loop's vertices.
    pub fn contains(&self, index: usize) -> bool {
        self.first == Some(index) || self.backward.contains_key(&index)
    }

    /// Returns the successor of `index`, wrapping from last to first.
    ///
    /// # Panics
    /// Panics if `index` is not in the loop.
    pub fn next(&self, index: usize) -> usize {
        match (self.last, self.first) {
            (Some(last), Some(first)) if last == index => first,
            _ => self.forward[&index],
        }
    }

    /// Returns the predecessor of `index`, wrapping from first to last.
    ///
    /// # Panics
    /// Panics if `index` is not in the loop.
    pub fn prev(&self, index: usize) -> usize {
        match (self.first, self.last) {
            (Some(first), Some(last)) if first == index => last,
            _ => self.backward[&index],
        }
    }

    /// Adds the link `start -> end`.
    ///
    /// `start` becomes the new first vertex if nothing links into it, and
    /// `end` becomes the new last vertex if nothing links out of it. This
    /// makes extending either end of the chain a single call.
    pub fn add_link(&mut self, start: usize, end: usize) {
        self.forward.insert(start, end);
        self.backward.insert(end, start);
        if !self.forward.contains_key(&end) {
            self.last = Some(end);
        }
        if !self.backward.contains_key(&start) {
            self.first = Some(start);
        }
    }

    /// Replaces the tail of the chain with `new_last`, keeping the link that
    /// led into the old tail.
    ///
    /// # Panics
    /// Panics if the loop has no links.
    pub fn set_last(&mut self, new_last: usize) {
        assert!(!self.forward.is_empty(), "set_last on a loop without links");
        let Some(old_last) = self.last else {
            return;
        };
        let before = self.backward[&old_last];
        self.forward.insert(before, new_last);
        self.backward.remove(&old_last);
        self.backward.insert(new_last, before);
        self.last = Some(new_last);
    }

    /// Inserts the link `start -> end` without updating first/last.
    pub(crate) fn link(&mut self, start: usize, end: usize) {
        self.forward.insert(start, end);
        self.backward.insert(end, start);
    }

    /// Overrides both ends of the chain. Used after splicing two chains.
    pub(crate) fn set_endpoints(&mut self, first: usize, last: usize) {
        self.first = Some(first);
        self.last = Some(last);
    }

    /// Drops the explicit link into `index` and makes its source the new last
    /// vertex. Used when a splice wraps a chain around onto its own head, so
    /// the closing link becomes implicit again.
    pub(crate) fn open_before(&mut self, index: usize) {
        if let Some(before) = self.backward.remove(&index) {
            self.forward.remove(&before);
            self.last = Some(before);
        }
    }

    /// Removes `index` from the loop and relinks its neighbours.
    ///
    /// Removing the only vertex of a single-vertex loop clears it.
    ///
    /// # Panics
    /// Panics if `index` is not in the loop.
    pub fn remove(&mut self, index: usize) {
        if self.forward.is_empty() {
            assert_eq!(self.first, Some(index), "vertex {index} is not in the loop");
            self.clear();
        } else if self.last == Some(index) {
            let before = self.backward[&index];
            self.forward.remove(&before);
            self.backward.remove(&index);
            self.last = Some(before);
        } else if self.first == Some(index) {
            let after = self.forward[&index];
            self.backward.remove(&after);
            self.forward.remove(&index);
            self.first = Some(after);
        } else {
            let before = self.backward[&index];
            let after = self.forward[&index];
            self.forward.insert(before, after);
            self.backward.insert(after, before);
            self.forward.remove(&index);
            self.backward.remove(&index);
        }
    }

    /// Moves every link of `other` into this loop without touching first/last.
    ///
    /// The caller is responsible for bridging the two chains and fixing the
    /// endpoints afterwards.
    pub(crate) fn absorb_links(&mut self, other: Loop) {
        self.forward.extend(other.forward);
        self.backward.extend(other.backward);
    }

    /// Returns the vertices in chain order, from first to last.
    pub fn to_vec(&self) -> Vec<usize> {
        let Some(first) = self.first else {
            return Vec::new();
        };
        let mut result = Vec::with_capacity(self.len());
        let mut index = first;
        result.push(index);
        while let Some(&next) = self.forward.get(&index) {
            if result.len() > self.forward.len() {
                break;
            }
            index = next;
            result.push(index);
        }
        result
    }

    /// Removes every link, turning this into a cleared loop.
    pub fn clear(&mut self) {
        self.forward.clear();
        self.backward.clear();
        self.first = None;
        self.last = None;
    }

    /// Checks that `next(prev(v)) == v` and `prev(next(v)) == v` for every vertex.
    pub fn is_consistent(&self) -> bool {
        if self.is_cleared() {
            return self.forward.is_empty() && self.backward.is_empty();
        }
        let vertices = self.to_vec();
        vertices.len() == self.len()
            && vertices
                .iter()
                .all(|&v| self.next(self.prev(v)) == v && self.prev(self.next(v)) == v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_loop_is_cleared() {
        let lp = Loop::new();
        assert!(lp.is_cleared());
        assert!(lp.is_empty());
        assert!(lp.to_vec().is_empty());
        assert!(lp.is_consistent());
    }

    #[test]
    fn navigation_wraps_around() {
        let lp = Loop::from_indices(&[4, 7, 2, 9]);
        assert_eq!(lp.first(), Some(4));
        assert_eq!(lp.last(), Some(9));
        assert_eq!(lp.len(), 4);
        assert_eq!(lp.link_count(), 3);
        assert_eq!(lp.next(9), 4);
        assert_eq!(lp.prev(4), 9);
        assert_eq!(lp.next(7), 2);
        assert_eq!(lp.prev(7), 4);
        assert!(lp.is_consistent());
    }

    #[test]
    fn add_link_extends_either_end() {
        let mut lp = Loop::new();
        lp.add_link(1, 2);
        lp.add_link(2, 3);
        lp.add_link(0, 1);
        assert_eq!(lp.to_vec(), vec![0, 1, 2, 3]);
        assert_eq!(lp.first(), Some(0));
        assert_eq!(lp.last(), Some(3));
    }

    #[test]
    fn set_last_replaces_tail() {
        let mut lp = Loop::from_indices(&[0, 1, 2]);
        lp.set_last(5);
        assert_eq!(lp.to_vec(), vec![0, 1, 5]);
        assert!(!lp.contains(2));
        assert!(lp.is_consistent());
    }

    #[test]
    fn remove_middle_first_and_last() {
        let mut lp = Loop::from_indices(&[0, 1, 2, 3, 4]);
        lp.remove(2);
        assert_eq!(lp.to_vec(), vec![0, 1, 3, 4]);
        lp.remove(0);
        assert_eq!(lp.to_vec(), vec![1, 3, 4]);
        lp.remove(4);
        assert_eq!(lp.to_vec(), vec![1, 3]);
        assert!(lp.is_consistent());
        assert_eq!(lp.next(3), 1);
        lp.remove(3);
        assert_eq!(lp.to_vec(), vec![1]);
        lp.remove(1);
        assert!(lp.is_cleared());
    }

    #[test]
    fn absorb_and_bridge() {
        let mut a = Loop::from_indices(&[0, 1, 2]);
        let b = Loop::from_indices(&[3, 4]);
        a.absorb_links(b);
        a.link(2, 3);
        a.set_endpoints(0, 4);
        assert_eq!(a.to_vec(), vec![0, 1, 2, 3, 4]);
        assert!(a.is_consistent());
    }

    #[test]
    fn open_before_restores_implicit_closure() {
        let mut lp = Loop::from_indices(&[0, 1, 2]);
        lp.link(2, 0);
        lp.set_endpoints(0, 0);
        lp.open_before(0);
        assert_eq!(lp.last(), Some(2));
        assert_eq!(lp.to_vec(), vec![0, 1, 2]);
        assert!(lp.is_consistent());
    }

    #[test]
    fn contains_checks_all_nodes() {
        let lp = Loop::from_indices(&[10, 11, 12]);
        assert!(lp.contains(10));
        assert!(lp.contains(12));
        assert!(!lp.contains(13));
    }
}
