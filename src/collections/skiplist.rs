//! Arena-backed skip list used as the priority queue of each book side.
//!
//! The list is ordered by a caller-supplied [`Comparator`] and keeps its
//! nodes in a `slab` arena, linked by arena keys rather than pointers. It is
//! deliberately sequential: every instance is owned by one instrument book
//! and only touched while that book's matching mutex is held, so the O(log n)
//! descent needs no internal synchronization.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use slab::Slab;
use std::cmp::Ordering;

/// Maximum number of levels a node can be promoted to.
const MAX_LEVEL: usize = 64;

/// Total order over `T` used to sort a [`SkipList`].
///
/// Implementations must be total: `compare` may only return `Equal` for
/// elements that are interchangeable as far as removal is concerned.
pub trait Comparator<T>: Default {
    /// Compare two elements.
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

struct Node<T> {
    /// `None` only for the head and tail sentinels.
    value: Option<T>,

    /// `links[level]` is the arena key of the successor at that level.
    /// Normal nodes carry links up to their promoted height; the head
    /// carries all `MAX_LEVEL` of them, the tail carries none.
    links: Vec<usize>,
}

/// An ordered collection with O(log n) insertion, removal and minimum lookup.
pub struct SkipList<T, C> {
    arena: Slab<Node<T>>,
    head: usize,
    tail: usize,
    len: usize,
    rng: SmallRng,
    cmp: C,
}

impl<T, C: Comparator<T>> SkipList<T, C> {
    /// Create an empty list.
    pub fn new() -> Self {
        let mut arena = Slab::new();
        let tail = arena.insert(Node {
            value: None,
            links: Vec::new(),
        });
        let head = arena.insert(Node {
            value: None,
            links: vec![tail; MAX_LEVEL],
        });

        Self {
            arena,
            head,
            tail,
            len: 0,
            rng: SmallRng::from_entropy(),
            cmp: C::default(),
        }
    }

    /// Number of elements currently in the list.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the list holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The element ranked first by the comparator, if any.
    pub fn front(&self) -> Option<&T> {
        let first = self.arena[self.head].links[0];
        if first == self.tail {
            None
        } else {
            self.arena[first].value.as_ref()
        }
    }

    /// Insert `value`, keeping the list ordered. Returns `false` without
    /// modifying the list when an equal element is already present.
    pub fn insert(&mut self, value: T) -> bool {
        let preds = self.predecessors(&value);
        let at = self.arena[preds[0]].links[0];
        if self.is_equal(at, &value) {
            return false;
        }

        let height = self.random_level();
        let mut links = vec![0; height + 1];
        for (level, link) in links.iter_mut().enumerate() {
            *link = self.arena[preds[level]].links[level];
        }
        let key = self.arena.insert(Node {
            value: Some(value),
            links,
        });
        for level in 0..=height {
            self.arena[preds[level]].links[level] = key;
        }

        self.len += 1;
        true
    }

    /// Remove the element equal to `value`. Returns `true` if an element was
    /// unlinked, `false` if no equal element was present.
    pub fn remove(&mut self, value: &T) -> bool {
        let preds = self.predecessors(value);
        let target = self.arena[preds[0]].links[0];
        if !self.is_equal(target, value) {
            return false;
        }

        let height = self.arena[target].links.len();
        for (level, pred) in preds.iter().enumerate().take(height) {
            if self.arena[*pred].links[level] == target {
                let next = self.arena[target].links[level];
                self.arena[*pred].links[level] = next;
            }
        }
        self.arena.remove(target);

        self.len -= 1;
        true
    }

    /// Whether an element equal to `value` is present. Observation only; the
    /// answer can be stale the moment the owning lock is released.
    pub fn contains(&self, value: &T) -> bool {
        let preds = self.predecessors(value);
        let at = self.arena[preds[0]].links[0];
        self.is_equal(at, value)
    }

    /// Iterate the elements in comparator order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            arena: &self.arena,
            tail: self.tail,
            current: self.arena[self.head].links[0],
        }
    }

    /// For every level, the last node sorting strictly before `value`.
    fn predecessors(&self, value: &T) -> [usize; MAX_LEVEL] {
        let mut preds = [self.head; MAX_LEVEL];
        let mut current = self.head;
        for level in (0..MAX_LEVEL).rev() {
            let mut next = self.arena[current].links[level];
            while self.is_less(next, value) {
                current = next;
                next = self.arena[current].links[level];
            }
            preds[level] = current;
        }
        preds
    }

    /// Whether the node at `key` sorts strictly before `value`. The tail
    /// sentinel compares as +inf.
    fn is_less(&self, key: usize, value: &T) -> bool {
        match self.arena[key].value {
            Some(ref held) => self.cmp.compare(held, value) == Ordering::Less,
            None => false,
        }
    }

    fn is_equal(&self, key: usize, value: &T) -> bool {
        match self.arena[key].value {
            Some(ref held) => self.cmp.compare(held, value) == Ordering::Equal,
            None => false,
        }
    }

    /// Geometric level draw: each promotion happens with probability 1/2.
    fn random_level(&mut self) -> usize {
        let mut level = 0;
        while level + 1 < MAX_LEVEL && self.rng.gen_bool(0.5) {
            level += 1;
        }
        level
    }
}

impl<T, C: Comparator<T>> Default for SkipList<T, C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Level-zero walk over a [`SkipList`], in comparator order.
pub struct Iter<'a, T> {
    arena: &'a Slab<Node<T>>,
    tail: usize,
    current: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.current == self.tail {
            return None;
        }
        let node = &self.arena[self.current];
        self.current = node.links[0];
        node.value.as_ref()
    }
}
