//! Bidirectional vertex correspondence bookkeeping.
//!
//! A [`Matches`] is a bijection-in-progress between source-graph and
//! target-graph vertex ids: two plain maps kept mutually consistent by a
//! single mutator. Adding a pair unlinks any prior pairing of either
//! endpoint, so `forward[reverse[x]] == x` holds for every mapped `x`.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Matches {
    forward: BTreeMap<u32, u32>,
    reverse: BTreeMap<u32, u32>,
}

impl Matches {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed matches that pair each vertex with itself.
    #[must_use]
    pub fn from_self_pairs(seeds: &[u32]) -> Self {
        let mut m = Self::new();
        for &v in seeds {
            m.add(v, v);
        }
        m
    }

    /// Register the pair `(source, target)`, unlinking any prior pairing of
    /// either endpoint. Returns `true` if the mapping changed.
    pub fn add(&mut self, source: u32, target: u32) -> bool {
        if self.forward.get(&source) == Some(&target) {
            return false;
        }
        if let Some(old_target) = self.forward.remove(&source) {
            self.reverse.remove(&old_target);
        }
        if let Some(old_source) = self.reverse.remove(&target) {
            self.forward.remove(&old_source);
        }
        self.forward.insert(source, target);
        self.reverse.insert(target, source);
        true
    }

    #[must_use]
    pub fn get(&self, source: u32) -> Option<u32> {
        self.forward.get(&source).copied()
    }

    #[must_use]
    pub fn get_reverse(&self, target: u32) -> Option<u32> {
        self.reverse.get(&target).copied()
    }

    #[must_use]
    pub fn contains_source(&self, source: u32) -> bool {
        self.forward.contains_key(&source)
    }

    #[must_use]
    pub fn contains_target(&self, target: u32) -> bool {
        self.reverse.contains_key(&target)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Pairs in ascending source-id order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.forward.iter().map(|(&s, &t)| (s, t))
    }
}
