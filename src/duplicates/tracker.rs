//! Equivalence classes of identical files.
//!
//! The [`PoolTracker`] collects "these two files are identical" facts and
//! keeps them transitively closed: once `a ≡ b` and `b ≡ c` have been
//! declared, in any order, `a`, `b` and `c` share one pool.
//!
//! Pools live in a slot vector and a lookup table maps every pooled path to
//! its slot. Merging moves the members of the smaller pool into the larger one
//! and re-registers them, which keeps the total re-keying cost at
//! O(n log n).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A set of mutually identical paths.
pub type Pool = Vec<PathBuf>;

/// What a [`PoolTracker::declare_equal`] call changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declared {
    /// Neither path was pooled; a new two-member pool was created.
    Created,
    /// One path joined the pool the other one was already in.
    Joined,
    /// Two existing pools were merged into one.
    Merged,
    /// Both paths were already in the same pool (or were the same path).
    AlreadyPooled,
}

impl Declared {
    /// Whether the declaration grew some pool.
    #[must_use]
    pub fn changed(self) -> bool {
        !matches!(self, Self::AlreadyPooled)
    }
}

/// Tracks pools of identical files.
#[derive(Debug, Default)]
pub struct PoolTracker {
    pools: Vec<Option<Pool>>,
    lookup: HashMap<PathBuf, usize>,
}

impl PoolTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `a` and `b` have identical content.
    pub fn declare_equal(&mut self, a: &Path, b: &Path) -> Declared {
        if a == b {
            return Declared::AlreadyPooled;
        }

        match (self.lookup.get(a).copied(), self.lookup.get(b).copied()) {
            (None, None) => {
                let slot = self.pools.len();
                self.pools.push(Some(vec![a.to_path_buf(), b.to_path_buf()]));
                self.lookup.insert(a.to_path_buf(), slot);
                self.lookup.insert(b.to_path_buf(), slot);
                log::debug!("New pool: {} = {}", a.display(), b.display());
                Declared::Created
            }
            (Some(slot), None) => {
                self.join(slot, b);
                Declared::Joined
            }
            (None, Some(slot)) => {
                self.join(slot, a);
                Declared::Joined
            }
            (Some(sa), Some(sb)) if sa == sb => Declared::AlreadyPooled,
            (Some(sa), Some(sb)) => {
                self.merge(sa, sb);
                Declared::Merged
            }
        }
    }

    fn join(&mut self, slot: usize, path: &Path) {
        if let Some(pool) = self.pools[slot].as_mut() {
            pool.push(path.to_path_buf());
            self.lookup.insert(path.to_path_buf(), slot);
            log::trace!("{} joined pool of {}", path.display(), pool.len() - 1);
        }
    }

    fn merge(&mut self, sa: usize, sb: usize) {
        let len_a = self.pools[sa].as_ref().map_or(0, Vec::len);
        let len_b = self.pools[sb].as_ref().map_or(0, Vec::len);
        let (into, from) = if len_a >= len_b { (sa, sb) } else { (sb, sa) };

        let moved = self.pools[from].take().unwrap_or_default();
        log::debug!(
            "Merging pool of {} into pool of {}",
            moved.len(),
            len_a.max(len_b)
        );
        for path in &moved {
            self.lookup.insert(path.clone(), into);
        }
        if let Some(pool) = self.pools[into].as_mut() {
            pool.extend(moved);
        }
    }

    /// Whether `path` is in any pool.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.lookup.contains_key(path)
    }

    /// Members of the pool containing `path`.
    #[must_use]
    pub fn pool_of(&self, path: &Path) -> Option<&[PathBuf]> {
        let slot = *self.lookup.get(path)?;
        self.pools[slot].as_deref()
    }

    /// Number of live pools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pools.iter().filter(|p| p.is_some()).count()
    }

    /// Whether no pool has been created yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    /// Drain all pools.
    ///
    /// Every pool is emitted once with its members sorted. Pools are ordered
    /// by ascending member count, then by their smallest member path. The
    /// lookup table is emptied, so the tracker can be reused.
    pub fn finalize_pools(&mut self) -> Vec<Pool> {
        let mut pools = Vec::with_capacity(self.len());
        for (_, slot) in self.lookup.drain() {
            if let Some(mut pool) = self.pools[slot].take() {
                pool.sort();
                pool.dedup();
                pools.push(pool);
            }
        }
        self.pools.clear();

        pools.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a[0].cmp(&b[0])));
        pools
    }
}
