use fnv::FnvHasher;
use rayon::prelude::*;
use std::{collections::HashMap, hash::Hasher, iter::FromIterator};
use crate::{token::words, Merge};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CountEntry {
    pub key: String,
    pub count: u64,
}

impl CountEntry {
    pub fn new(key: impl Into<String>, count: u64) -> Self {
        Self {
            key: key.into(),
            count,
        }
    }
}

/// Running count per normalized token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Counts {
    counts: HashMap<String, u64>,
}

impl Counts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, key: String) {
        self.add(key, 1);
    }

    /// Adds `n` occurrences of `key`. Adding zero never inserts a key.
    pub fn add(&mut self, key: String, n: u64) {
        if n == 0 {
            return;
        }
        *self.counts.entry(key).or_insert(0) += n;
    }

    pub fn observe_line(&mut self, line: &str) {
        self.extend(words(line));
    }

    pub fn get(&self, key: &str) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, c)| (k.as_str(), *c))
    }

    /// One entry per distinct key, in no particular order.
    pub fn finalize(self) -> Vec<CountEntry> {
        self.counts
            .into_iter()
            .map(|(key, count)| CountEntry { key, count })
            .collect()
    }

    /// Splits into `n` key-disjoint accumulators; a key always lands in
    /// `bucket(key, n)`. `n == 0` is treated as 1.
    pub fn partition(self, n: usize) -> Vec<Counts> {
        let n = n.max(1);
        let mut parts = vec![Counts::new(); n];
        for (key, count) in self.counts {
            let part = bucket(&key, n);
            parts[part].counts.insert(key, count);
        }
        parts
    }
}

/// Bucket of `key` among `n` buckets. FNV-1a over the UTF-8 bytes, so every
/// build and platform agrees on it.
pub fn bucket(key: &str, n: usize) -> usize {
    let mut hasher = FnvHasher::default();
    hasher.write(key.as_bytes());
    (hasher.finish() % n.max(1) as u64) as usize
}

impl Merge for Counts {
    fn merge(self, other: Self) -> Self {
        let (mut larger, smaller) = if self.len() >= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        for (key, count) in smaller.counts {
            larger.add(key, count);
        }
        larger
    }
}

impl Extend<String> for Counts {
    fn extend<T: IntoIterator<Item = String>>(&mut self, iter: T) {
        for key in iter {
            self.observe(key);
        }
    }
}

impl FromIterator<String> for Counts {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        let mut counts = Counts::new();
        counts.extend(iter);
        counts
    }
}

pub fn count_lines<I>(lines: I) -> Counts
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut counts = Counts::new();
    for line in lines {
        counts.observe_line(line.as_ref());
    }
    counts
}

pub fn par_count<S>(lines: &[S]) -> Counts
where
    S: AsRef<str> + Sync,
{
    lines
        .par_iter()
        .fold(Counts::new, |mut counts, line| {
            counts.observe_line(line.as_ref());
            counts
        })
        .reduce(Counts::new, Merge::merge)
}
