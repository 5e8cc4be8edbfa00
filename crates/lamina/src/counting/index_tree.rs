//! Multiset of small non-negative integers with logarithmic rank queries.

/// Fenwick tree over the values `0..capacity`.
#[derive(Debug, Clone, Default)]
pub(crate) struct IndexTree {
    sums: Vec<usize>,
    counts: Vec<usize>,
    size: usize,
}

impl IndexTree {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            sums: vec![0; capacity + 1],
            counts: vec![0; capacity],
            size: 0,
        }
    }

    /// Empties the tree and makes room for values in `0..capacity`.
    pub(crate) fn reset(&mut self, capacity: usize) {
        self.sums.clear();
        self.sums.resize(capacity + 1, 0);
        self.counts.clear();
        self.counts.resize(capacity, 0);
        self.size = 0;
    }

    pub(crate) fn add(&mut self, value: usize) {
        self.counts[value] += 1;
        self.size += 1;
        let mut i = value + 1;
        while i < self.sums.len() {
            self.sums[i] += 1;
            i += i & i.wrapping_neg();
        }
    }

    /// Removes every occurrence of `value`.
    pub(crate) fn remove_all(&mut self, value: usize) {
        let n = self.counts[value];
        if n == 0 {
            return;
        }
        self.counts[value] = 0;
        self.size -= n;
        let mut i = value + 1;
        while i < self.sums.len() {
            self.sums[i] -= n;
            i += i & i.wrapping_neg();
        }
    }

    /// Number of stored values strictly smaller than `value`.
    pub(crate) fn rank(&self, value: usize) -> usize {
        let mut i = value.min(self.counts.len());
        let mut sum = 0;
        while i > 0 {
            sum += self.sums[i];
            i -= i & i.wrapping_neg();
        }
        sum
    }

    pub(crate) fn size(&self) -> usize {
        self.size
    }
}
