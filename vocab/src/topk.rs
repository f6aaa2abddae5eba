use itertools::Itertools;
use std::{cmp::Ordering, collections::BinaryHeap};
use crate::{CountEntry, Merge};

impl CountEntry {
    /// Ranking order: higher count first, equal counts by key ascending.
    /// `Less` means `self` ranks ahead of `other`.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .count
            .cmp(&self.count)
            .then_with(|| self.key.cmp(&other.key))
    }
}

// max-heap by rank: the top is the worst retained entry
#[derive(Debug, PartialEq, Eq)]
struct Ranked(CountEntry);

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.rank_cmp(&other.0)
    }
}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// At most `limit` entries, best ranked first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopK {
    limit: usize,
    entries: Vec<CountEntry>,
}

impl TopK {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            entries: Vec::new(),
        }
    }

    /// Keeps the `limit` best ranked entries through a bounded heap.
    /// Duplicate keys are ranked independently.
    pub fn select<I>(entries: I, limit: usize) -> Self
    where
        I: IntoIterator<Item = CountEntry>,
    {
        if limit == 0 {
            return Self::new(0);
        }

        let mut heap = BinaryHeap::new();
        for entry in entries {
            if heap.len() == limit {
                match heap.peek() {
                    Some(Ranked(worst)) if entry.rank_cmp(worst) != Ordering::Less => continue,
                    _ => {}
                }
            }
            heap.push(Ranked(entry));
            if heap.len() > limit {
                heap.pop();
            }
        }

        Self {
            limit,
            entries: heap.into_sorted_vec().into_iter().map(|r| r.0).collect(),
        }
    }

    pub fn offer(&mut self, entry: CountEntry) {
        let pos = self
            .entries
            .partition_point(|e| e.rank_cmp(&entry) != Ordering::Greater);
        if pos >= self.limit {
            return;
        }
        self.entries.insert(pos, entry);
        self.entries.truncate(self.limit);
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_saturated(&self) -> bool {
        self.entries.len() == self.limit
    }

    pub fn entries(&self) -> &[CountEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<CountEntry> {
        self.entries
    }

    pub fn min_count(&self) -> Option<u64> {
        self.entries.last().map(|e| e.count)
    }
}

impl Merge for TopK {
    // keeps the smaller of both limits
    fn merge(self, other: Self) -> Self {
        let limit = self.limit.min(other.limit);
        let entries = self
            .entries
            .into_iter()
            .merge_by(other.entries, |a, b| a.rank_cmp(b) != Ordering::Greater)
            .take(limit)
            .collect();
        Self { limit, entries }
    }
}

#[cfg(test)]
mod tests {
    use rand::{seq::SliceRandom, SeedableRng};
    use crate::{count_lines, merge_all, merge_tree, testing::*, Counts};
    use super::*;

    fn sorted(mut entries: Vec<CountEntry>) -> Vec<CountEntry> {
        entries.sort_by(CountEntry::rank_cmp);
        entries
    }

    #[test]
    fn select_breaks_ties_by_key() {
        let counts = count_lines(&["the cat sat.", "the dog sat, the cat ran"]);
        let top = TopK::select(counts.finalize(), 2);
        assert_eq!(
            top.entries(),
            &[CountEntry::new("the", 3), CountEntry::new("cat", 2)]
        );
        assert!(top.is_saturated());
        assert_eq!(top.min_count(), Some(2));
    }

    #[test]
    fn select_boundaries() {
        let counts = count_lines(&["b a b c", "c c"]);
        assert!(TopK::select(counts.clone().finalize(), 0).is_empty());
        assert!(TopK::select(Vec::new(), 1000).is_empty());

        let all = TopK::select(counts.finalize(), 1000);
        assert_eq!(all.len(), 3);
        assert!(!all.is_saturated());
        assert_eq!(
            all.into_entries(),
            vec![
                CountEntry::new("c", 3),
                CountEntry::new("b", 2),
                CountEntry::new("a", 1)
            ]
        );
    }

    #[test]
    fn select_keeps_duplicate_keys() {
        let top = TopK::select(
            vec![
                CountEntry::new("a", 2),
                CountEntry::new("a", 2),
                CountEntry::new("b", 1),
            ],
            2,
        );
        assert_eq!(top.entries(), &[CountEntry::new("a", 2), CountEntry::new("a", 2)]);
    }

    #[test]
    fn select_equals_full_sort() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(5);
        for limit in [1, 2, 5, 17, 60, 200].iter().copied() {
            let entries = random_entries(&mut rng, 60);
            let top = TopK::select(entries.clone(), limit);
            let expected = sorted(entries).into_iter().take(limit).collect::<Vec<_>>();
            assert_eq!(top.entries(), expected.as_slice(), "limit {}", limit);
        }
    }

    #[test]
    fn select_is_optimal() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(9);
        let counts = count_lines(random_lines(&mut rng, 300));
        let entries = counts.finalize();
        let top = TopK::select(entries.clone(), 5);
        assert!(top.is_saturated());

        let min = top.min_count().unwrap();
        for entry in entries.iter().filter(|e| !top.entries().contains(e)) {
            assert!(entry.count <= min, "{:?} left out", entry);
        }
    }

    #[test]
    fn offer_matches_select() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(13);
        let entries = random_entries(&mut rng, 80);
        let mut top = TopK::new(10);
        for entry in entries.clone() {
            top.offer(entry);
        }
        assert_eq!(top, TopK::select(entries, 10));

        let mut none = TopK::new(0);
        none.offer(CountEntry::new("a", 1));
        assert!(none.is_empty());
    }

    #[test]
    fn merge_laws() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(17);
        for limit in [0, 1, 4, 10, 100].iter().copied() {
            let entries = random_entries(&mut rng, 90);
            let lists = entries
                .chunks(30)
                .map(|chunk| TopK::select(chunk.to_vec(), limit))
                .collect::<Vec<_>>();
            let (a, b, c) = (lists[0].clone(), lists[1].clone(), lists[2].clone());

            assert_eq!(a.clone().merge(b.clone()), b.clone().merge(a.clone()));
            assert_eq!(
                a.clone().merge(b.clone()).merge(c.clone()),
                a.clone().merge(b.clone().merge(c.clone()))
            );
            assert_eq!(a.clone().merge(TopK::new(limit)), a);
            assert_eq!(
                a.merge(b).merge(c),
                TopK::select(entries, limit),
                "limit {}",
                limit
            );
        }
    }

    #[test]
    fn merge_keeps_smaller_limit() {
        let a = TopK::select(vec![CountEntry::new("a", 3), CountEntry::new("b", 2)], 5);
        let b = TopK::select(vec![CountEntry::new("c", 1)], 1);
        let merged = a.merge(b);
        assert_eq!(merged.limit(), 1);
        assert_eq!(merged.entries(), &[CountEntry::new("a", 3)]);
    }

    #[test]
    fn hierarchical_top_k_equals_global_top_k() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(23);
        let lines = random_lines(&mut rng, 400);
        let global = count_lines(&lines);

        for limit in [1, 3, 10, 1000].iter().copied() {
            let expected = TopK::select(global.clone().finalize(), limit);

            for shards in [1, 2, 5, 16].iter().copied() {
                // Shards of records are counted and merged first; the counts are
                // then split by key so that per-bucket lists can be merged.
                let mut lines = lines.clone();
                lines.shuffle(&mut rng);
                let partials = lines.chunks(lines.len() / shards).map(count_lines);
                let counts = merge_all(Counts::new(), partials);

                let mut lists = counts
                    .partition(shards)
                    .into_iter()
                    .map(|bucket| TopK::select(bucket.finalize(), limit))
                    .collect::<Vec<_>>();

                lists.shuffle(&mut rng);
                assert_eq!(merge_all(TopK::new(limit), lists.clone()), expected);
                lists.shuffle(&mut rng);
                assert_eq!(merge_tree(TopK::new(limit), lists), expected);
            }
        }
    }
}
