//! Property-based tests for the rank laws.
//!
//! Both strategies must agree on every finite input, stay within bounds, and
//! react to a new reference point exactly as the strict `<` definition says.

use proptest::prelude::*;
use rangos_rank_engine::{
    compute_ranks, compute_ranks_brute_force, compute_ranks_sorted, Point, RankStrategy,
};

/// Finite y values, biased towards a small grid so duplicates and signed
/// zeros show up often.
fn y_value() -> impl Strategy<Value = f64> {
    prop_oneof![
        3 => (-6i32..=6).prop_map(|step| f64::from(step) * 0.25),
        1 => Just(0.0),
        1 => Just(-0.0),
        2 => -1.0e6..1.0e6f64,
        1 => prop::num::f64::NORMAL | prop::num::f64::SUBNORMAL,
    ]
}

fn point_set(len: std::ops::Range<usize>) -> impl Strategy<Value = Vec<Point>> {
    prop::collection::vec((-10.0..10.0f64, y_value()).prop_map(Point::from), len)
}

fn insert_at(points: &[Point], at: prop::sample::Index, point: Point) -> Vec<Point> {
    let mut out = points.to_vec();
    out.insert(at.index(points.len() + 1), point);
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn strategies_agree(a in point_set(0..64), b in point_set(0..64)) {
        let brute = compute_ranks_brute_force(&a, &b);
        let sorted = compute_ranks_sorted(&a, &b);
        prop_assert_eq!(&brute, &sorted);
        for strategy in RankStrategy::ALL {
            prop_assert_eq!(&compute_ranks(strategy, &a, &b), &brute);
        }
    }

    #[test]
    fn ranks_align_with_query_and_stay_bounded(
        a in point_set(0..64),
        b in point_set(0..64),
    ) {
        for ranks in [compute_ranks_brute_force(&a, &b), compute_ranks_sorted(&a, &b)] {
            prop_assert_eq!(ranks.len(), b.len());
            for (rank, p) in ranks.iter().zip(&b) {
                prop_assert!(*rank <= a.len());
                let smaller = a.iter().filter(|q| q.y() < p.y()).count();
                prop_assert_eq!(*rank, smaller);
            }
        }
    }

    #[test]
    fn reference_order_does_not_matter(a in point_set(0..64), b in point_set(0..32)) {
        let mut reversed = a.clone();
        reversed.reverse();
        prop_assert_eq!(compute_ranks_sorted(&a, &b), compute_ranks_sorted(&reversed, &b));
        prop_assert_eq!(
            compute_ranks_brute_force(&a, &b),
            compute_ranks_brute_force(&reversed, &b)
        );
    }

    #[test]
    fn adding_point_at_or_above_every_query_keeps_ranks(
        a in point_set(0..48),
        b in point_set(0..48),
        x in -10.0..10.0f64,
        lift in prop_oneof![Just(0.0), 0.0..1.0e6f64],
        at in any::<prop::sample::Index>(),
    ) {
        let top = b.iter().map(Point::y).fold(f64::NEG_INFINITY, f64::max);
        let new_y = if b.is_empty() { lift } else { top + lift };
        prop_assume!(new_y.is_finite());
        let grown = insert_at(&a, at, Point::new(x, new_y));

        prop_assert_eq!(compute_ranks_brute_force(&grown, &b), compute_ranks_brute_force(&a, &b));
        prop_assert_eq!(compute_ranks_sorted(&grown, &b), compute_ranks_sorted(&a, &b));
    }

    #[test]
    fn adding_point_below_a_query_increments_exactly_the_greater_ranks(
        a in point_set(0..48),
        b in point_set(1..48),
        x in -10.0..10.0f64,
        target in any::<prop::sample::Index>(),
        other in any::<prop::sample::Index>(),
        gap in 1.0e-6..1.0e3f64,
        at in any::<prop::sample::Index>(),
    ) {
        let target = target.index(b.len());
        let target_y = b[target].y();
        // Reuse another query's y when it lies below the target so ties with
        // the new point are exercised too.
        let candidate = b[other.index(b.len())].y();
        let new_y = if candidate < target_y {
            candidate
        } else if target_y - gap < target_y {
            target_y - gap
        } else {
            target_y - target_y.abs() / 2.0
        };
        prop_assume!(new_y.is_finite() && new_y < target_y);

        let grown = insert_at(&a, at, Point::new(x, new_y));
        for (before, after) in [
            (compute_ranks_brute_force(&a, &b), compute_ranks_brute_force(&grown, &b)),
            (compute_ranks_sorted(&a, &b), compute_ranks_sorted(&grown, &b)),
        ] {
            prop_assert_eq!(after[target], before[target] + 1);
            for (j, p) in b.iter().enumerate() {
                let expected = before[j] + usize::from(new_y < p.y());
                prop_assert_eq!(after[j], expected, "query index {}", j);
            }
        }
    }
}
