use std::collections::HashMap;
use std::hash::Hash;

use crate::error::LookupError;

/// Size-tracked union-find over arbitrary hashable keys.
///
/// Keys are interned into dense slots on [`add`](Self::add); parent links
/// and set sizes live in parallel vectors. `find` compresses paths and
/// `join` attaches the smaller tree under the larger one, so the size of a
/// set is always read from its root.
#[derive(Debug, Clone, Default)]
pub struct DisjointSet<T> {
    slots: HashMap<T, usize>,
    keys: Vec<T>,
    parent: Vec<usize>,
    size: Vec<usize>,
    num_sets: usize,
}

impl<T: Clone + Eq + Hash> DisjointSet<T> {
    /// Creates an empty disjoint set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
            keys: Vec::new(),
            parent: Vec::new(),
            size: Vec::new(),
            num_sets: 0,
        }
    }

    /// Registers `key` as a singleton set. Adding a known key is a no-op.
    pub fn add(&mut self, key: T) {
        self.intern(key);
    }

    /// Adds `a` and `b` if missing and unions their sets.
    pub fn union(&mut self, a: T, b: T) {
        let sa = self.intern(a);
        let sb = self.intern(b);
        self.merge(sa, sb);
    }

    /// Returns `true` if `key` has been added.
    #[must_use]
    pub fn contains(&self, key: &T) -> bool {
        self.slots.contains_key(key)
    }

    /// Number of registered keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if no key has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of disjoint sets currently represented.
    #[must_use]
    pub fn num_sets(&self) -> usize {
        self.num_sets
    }

    /// Returns the root key of the set containing `key`.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::UnknownKey`] if `key` was never added.
    pub fn find(&mut self, key: &T) -> Result<T, LookupError> {
        let slot = self.slot(key)?;
        let root = self.root(slot);
        Ok(self.keys[root].clone())
    }

    /// Unions the sets containing `a` and `b` (union by size).
    ///
    /// On equal sizes the root of `b` is attached under the root of `a`.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::UnknownKey`] if either key was never added.
    pub fn join(&mut self, a: &T, b: &T) -> Result<(), LookupError> {
        let sa = self.slot(a)?;
        let sb = self.slot(b)?;
        self.merge(sa, sb);
        Ok(())
    }

    /// Size of the set containing `key`.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::UnknownKey`] if `key` was never added.
    pub fn get_size(&mut self, key: &T) -> Result<usize, LookupError> {
        let slot = self.slot(key)?;
        let root = self.root(slot);
        Ok(self.size[root])
    }

    fn intern(&mut self, key: T) -> usize {
        if let Some(&slot) = self.slots.get(&key) {
            return slot;
        }
        let slot = self.keys.len();
        self.slots.insert(key.clone(), slot);
        self.keys.push(key);
        self.parent.push(slot);
        self.size.push(1);
        self.num_sets += 1;
        slot
    }

    /// On equal sizes the root of `b` goes under the root of `a`.
    fn merge(&mut self, a: usize, b: usize) {
        let ra = self.root(a);
        let rb = self.root(b);
        if ra == rb {
            return;
        }

        let (big, small) = if self.size[rb] > self.size[ra] {
            (rb, ra)
        } else {
            (ra, rb)
        };
        self.parent[small] = big;
        self.size[big] += self.size[small];
        self.num_sets -= 1;
    }

    fn slot(&self, key: &T) -> Result<usize, LookupError> {
        self.slots.get(key).copied().ok_or(LookupError::UnknownKey)
    }

    fn root(&mut self, slot: usize) -> usize {
        let mut root = slot;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        let mut current = slot;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        root
    }
}
