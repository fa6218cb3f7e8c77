//! Layout cache for memoizing split results.
//!
//! This module provides [`LayoutCache`] which caches the `Vec<Rect>` results of
//! [`Layout::split`] so the render loop does not re-solve the same panel
//! layout several times per frame.
//!
//! # Overview
//!
//! The solver itself is stateless. The cache is a separate, caller-owned
//! table: it never changes what a split returns, it only skips recomputing
//! a result that is already known for the same layout and area.
//!
//! # Usage
//!
//! ```
//! use tessel_layout::{Constraint, Layout, LayoutCache, Rect};
//!
//! let mut cache = LayoutCache::new(64);
//! let layout = Layout::horizontal([Constraint::Percentage(50.0), Constraint::Fill(1)]);
//! let area = Rect::new(0, 0, 80, 24);
//!
//! // First call computes and caches
//! let rects = layout.split_cached(area, &mut cache).unwrap();
//!
//! // Second call returns cached result
//! let cached = layout.split_cached(area, &mut cache).unwrap();
//! assert_eq!(rects, cached);
//! assert_eq!(cache.stats().hits, 1);
//! ```
//!
//! # Invalidation
//!
//! Resizes need no invalidation: the area is part of the key. Call
//! [`LayoutCache::invalidate_all()`] when something outside the key changes
//! which layouts the dashboard uses (e.g. a panel set is reloaded from config).
//!
//! # Eviction
//!
//! At capacity a stale split (from before the last `invalidate_all`) goes
//! first; otherwise the split read the fewest times.

use std::hash::{Hash, Hasher};

use rustc_hash::{FxHashMap, FxHasher};
use tessel_core::geometry::Rect;

use crate::{Constraint, Direction, Layout, Result};

/// Key for layout cache lookups.
///
/// Includes every input that affects [`Layout::split`]: the area, a
/// fingerprint of the constraints, the direction, the margin, and the spacing.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct LayoutCacheKey {
    /// The region being split.
    pub area: Rect,
    /// Hash fingerprint of constraints.
    pub constraints_hash: u64,
    /// Layout direction.
    pub direction: Direction,
    /// Outer margin.
    pub margin: u16,
    /// Inter-region spacing.
    pub spacing: u16,
}

impl LayoutCacheKey {
    /// Create a cache key for splitting `area` with `layout`.
    pub fn new(area: Rect, layout: &Layout) -> Self {
        Self {
            area,
            constraints_hash: Self::hash_constraints(layout.constraints()),
            direction: layout.direction(),
            margin: layout.margin(),
            spacing: layout.spacing(),
        }
    }

    /// Hash a slice of constraints.
    ///
    /// Ratios are reduced by their GCD first, so `Ratio(1, 3)` and
    /// `Ratio(2, 6)` share a fingerprint.
    fn hash_constraints(constraints: &[Constraint]) -> u64 {
        let mut hasher = FxHasher::default();
        constraints.len().hash(&mut hasher);
        for c in constraints {
            std::mem::discriminant(c).hash(&mut hasher);
            match c {
                Constraint::Length(v) => v.hash(&mut hasher),
                Constraint::Percentage(p) => p.to_bits().hash(&mut hasher),
                Constraint::Ratio(n, d) => {
                    let divisor = gcd(*n, *d);
                    if let (Some(n_div), Some(d_div)) =
                        (n.checked_div(divisor), d.checked_div(divisor))
                    {
                        n_div.hash(&mut hasher);
                        d_div.hash(&mut hasher);
                    } else {
                        n.hash(&mut hasher);
                        d.hash(&mut hasher);
                    }
                }
                Constraint::Fill(w) => w.hash(&mut hasher),
            }
        }
        hasher.finish()
    }
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

#[derive(Clone, Debug)]
struct CachedSplit {
    rects: Vec<Rect>,
    /// Cache generation the rects were solved in.
    generation: u64,
    access_count: u32,
}

/// Hit/miss counters for a [`LayoutCache`], as shown on the debug overlay.
#[derive(Debug, Clone, Default)]
pub struct LayoutCacheStats {
    /// Splits held right now, stale ones included.
    pub entries: usize,
    /// Lookups answered without solving.
    pub hits: u64,
    /// Lookups that ran the solver.
    pub misses: u64,
    /// `hits / (hits + misses)`, or 0.0 before the first lookup.
    pub hit_rate: f64,
}

impl LayoutCacheStats {
    /// Total lookups counted.
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }
}

/// Memo of split results for the render loop.
///
/// A dashboard frame splits the same handful of layouts against the same
/// terminal size; between resizes every lookup is a hit. Holds at most
/// [`capacity`](LayoutCache::capacity) splits: once full, stale splits are
/// dropped first, then the least-read one.
///
/// [`invalidate_all`](LayoutCache::invalidate_all) marks every split stale
/// without touching the table, so a config reload costs nothing up front.
#[derive(Debug)]
pub struct LayoutCache {
    entries: FxHashMap<LayoutCacheKey, CachedSplit>,
    generation: u64,
    max_entries: usize,
    hits: u64,
    misses: u64,
}

impl LayoutCache {
    /// Cache holding up to `max_entries` splits (at least one).
    pub fn new(max_entries: usize) -> Self {
        let max_entries = max_entries.max(1);
        Self {
            entries: FxHashMap::with_capacity_and_hasher(max_entries, Default::default()),
            generation: 0,
            max_entries,
            hits: 0,
            misses: 0,
        }
    }

    /// Return the rects cached under `key`, or run `compute` and keep its
    /// result.
    ///
    /// Splits from an older generation count as misses. A failed `compute`
    /// is returned as-is and leaves the cache untouched, so a bad layout is
    /// reported again on every frame.
    pub fn get_or_try_compute<F>(&mut self, key: LayoutCacheKey, compute: F) -> Result<Vec<Rect>>
    where
        F: FnOnce() -> Result<Vec<Rect>>,
    {
        if let Some(entry) = self.entries.get_mut(&key)
            && entry.generation == self.generation
        {
            self.hits += 1;
            entry.access_count = entry.access_count.saturating_add(1);
            return Ok(entry.rects.clone());
        }

        self.misses += 1;
        let rects = compute()?;

        if self.entries.len() >= self.max_entries && !self.entries.contains_key(&key) {
            self.evict_one();
        }
        self.entries.insert(
            key,
            CachedSplit {
                rects: rects.clone(),
                generation: self.generation,
                access_count: 1,
            },
        );

        Ok(rects)
    }

    /// Mark every cached split stale, e.g. after the panel config reloads.
    ///
    /// Resizes never need this since the area is part of the key.
    pub fn invalidate_all(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn stats(&self) -> LayoutCacheStats {
        let lookups = self.hits + self.misses;
        let hit_rate = if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        };
        LayoutCacheStats {
            entries: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
            hit_rate,
        }
    }

    /// Zero the hit/miss counters; cached splits are kept.
    pub fn reset_stats(&mut self) {
        self.hits = 0;
        self.misses = 0;
    }

    /// Drop every cached split and release the table's contents.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most splits held at once.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.max_entries
    }

    /// Remove one split: a stale one if any, else the least-read.
    fn evict_one(&mut self) {
        let victim = self
            .entries
            .iter()
            .min_by_key(|(_, e)| (e.generation == self.generation, e.access_count))
            .map(|(k, _)| *k);
        if let Some(key) = victim {
            self.entries.remove(&key);
        }
    }
}

impl Default for LayoutCache {
    /// Room for 64 splits, enough for a full dashboard of nested layouts.
    fn default() -> Self {
        Self::new(64)
    }
}
