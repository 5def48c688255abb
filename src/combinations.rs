//! Combination keys and the tiered combination table.

use std::fmt;

/// Separator between indices in a rendered key.
pub const KEY_SEPARATOR: char = '.';

/// Canonical identifier for a set of 1-based dataset indices.
///
/// Indices are kept ascending and unique, so a key built from any ordering of
/// the same datasets compares and hashes equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CombinationKey(Vec<usize>);

impl CombinationKey {
    pub fn new(indices: impl IntoIterator<Item = usize>) -> Self {
        let mut indices: Vec<usize> = indices.into_iter().collect();
        indices.sort_unstable();
        indices.dedup();
        Self(indices)
    }

    /// Key of a single dataset.
    pub fn single(index: usize) -> Self {
        Self(vec![index])
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Key extended by one more dataset.
    pub fn with(&self, index: usize) -> Self {
        Self::new(self.0.iter().copied().chain(std::iter::once(index)))
    }

    /// Split into the key of all but the last index and the key of the last.
    ///
    /// Returns `None` for keys of fewer than two datasets.
    pub fn split_last(&self) -> Option<(CombinationKey, CombinationKey)> {
        match self.0.split_last() {
            Some((&last, rest)) if !rest.is_empty() => {
                Some((Self(rest.to_vec()), Self::single(last)))
            }
            _ => None,
        }
    }
}

impl fmt::Display for CombinationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", KEY_SEPARATOR)?;
            }
            write!(f, "{}", index)?;
        }
        Ok(())
    }
}

/// Lexicographic r-combinations of `0..n`.
#[derive(Debug, Clone)]
pub struct Combinations {
    n: usize,
    current: Option<Vec<usize>>,
}

impl Combinations {
    pub fn new(n: usize, r: usize) -> Self {
        let current = (r <= n).then(|| (0..r).collect());
        Self { n, current }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current.take()?;
        let result = current.clone();

        // Advance the rightmost index that still has room
        let r = current.len();
        let mut next = current;
        let mut i = r;
        while i > 0 {
            i -= 1;
            if next[i] < self.n - r + i {
                next[i] += 1;
                for j in i + 1..r {
                    next[j] = next[j - 1] + 1;
                }
                self.current = Some(next);
                break;
            }
        }

        Some(result)
    }
}

/// One tier of the table: every subset of a fixed size.
pub type Tier = Vec<CombinationKey>;

/// All subsets of `{1, …, n}` with at least two members, grouped by size.
///
/// Tier `k` of the result holds the `C(n, k + 2)` subsets of size `k + 2` in
/// lexicographic order. Fewer than two datasets produce no tiers.
pub fn combination_table(n: usize) -> Vec<Tier> {
    (2..=n)
        .map(|r| {
            Combinations::new(n, r)
                .map(|c| CombinationKey(c.into_iter().map(|i| i + 1).collect()))
                .collect()
        })
        .collect()
}
