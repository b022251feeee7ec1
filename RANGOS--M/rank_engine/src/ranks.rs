//! Pure rank computations.
//!
//! The rank of a query point `p` against a reference set `A` is the number of
//! points in `A` whose `y` is strictly less than `p.y`. Equal values never
//! count. Both strategies below return identical results for every input
//! whose `y` coordinates are finite.
//!
//! # Preconditions
//!
//! Callers must not pass NaN or infinite `y` values. The functions do not
//! check; with NaN the comparisons are meaningless and the two strategies
//! may disagree. [`crate::RankRuntime`] validates before calling in.

use crate::{point::Point, strategy::RankStrategy};

/// Ranks aligned index-for-index with the query set.
pub type RankResult = Vec<usize>;

/// Counts, for every point of `query`, the points of `reference` with a
/// strictly smaller `y`, by scanning all of `reference` each time.
#[must_use]
pub fn compute_ranks_brute_force(reference: &[Point], query: &[Point]) -> RankResult {
    query
        .iter()
        .map(|p| reference.iter().filter(|q| q.y() < p.y()).count())
        .collect()
}

/// Same result as [`compute_ranks_brute_force`] in `O((|A|+|B|) log |A|)`.
#[must_use]
pub fn compute_ranks_sorted(reference: &[Point], query: &[Point]) -> RankResult {
    let sorted = SortedReference::new(reference);
    query.iter().map(|p| sorted.rank_of(p.y())).collect()
}

/// Dispatches to the selected strategy.
#[must_use]
pub fn compute_ranks(strategy: RankStrategy, reference: &[Point], query: &[Point]) -> RankResult {
    match strategy {
        RankStrategy::BruteForce => compute_ranks_brute_force(reference, query),
        RankStrategy::Sorted => compute_ranks_sorted(reference, query),
    }
}

/// Ascending `y` values of a reference set, duplicates kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SortedReference {
    ys: Vec<f64>,
}

impl SortedReference {
    /// Extracts and sorts the `y` values of `reference`.
    #[must_use]
    pub fn new(reference: &[Point]) -> Self {
        let mut ys: Vec<f64> = reference.iter().map(Point::y).collect();
        // total_cmp only refines `<` on finite values (-0.0 before 0.0),
        // so the slice stays partitioned for the `< y` predicate below.
        ys.sort_unstable_by(f64::total_cmp);
        Self { ys }
    }

    /// Number of stored values strictly less than `y` (leftmost insertion point).
    #[must_use]
    pub fn rank_of(&self, y: f64) -> usize {
        self.ys.partition_point(|&value| value < y)
    }

    /// Number of reference values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ys.len()
    }

    /// True when the reference set was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ys.is_empty()
    }

    /// Sorted values.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.ys
    }
}
