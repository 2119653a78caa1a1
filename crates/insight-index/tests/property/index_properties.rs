//! Property tests: query results are always bounded, sorted, and free of
//! duplicates, for arbitrary corpora and k.

use insight_index::{build, IvfParams};
use proptest::prelude::*;

const DIM: usize = 4;

fn params() -> IvfParams {
    IvfParams {
        num_lists: 4,
        probe_lists: 2,
        max_kmeans_iters: 10,
        seed: 42,
    }
}

fn corpus_strategy() -> impl Strategy<Value = Vec<Vec<f32>>> {
    proptest::collection::vec(
        proptest::collection::vec(-10.0f32..10.0, DIM),
        1..40,
    )
}

proptest! {
    #[test]
    fn prop_results_bounded_sorted_unique(
        vectors in corpus_strategy(),
        query in proptest::collection::vec(-10.0f32..10.0, DIM),
        k in 0usize..20,
    ) {
        let entries: Vec<(String, Vec<f32>)> = vectors
            .into_iter()
            .enumerate()
            .map(|(i, v)| (format!("item-{i:03}"), v))
            .collect();
        let n = entries.len();

        let snapshot = build(entries, params(), DIM).unwrap();
        let results = snapshot.query(&query, k).unwrap();

        prop_assert!(results.len() <= k.min(n));

        for pair in results.windows(2) {
            prop_assert!(pair[0].1 <= pair[1].1);
            if pair[0].1 == pair[1].1 {
                prop_assert!(pair[0].0 < pair[1].0);
            }
        }

        let mut ids: Vec<&str> = results.iter().map(|(id, _)| id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        prop_assert_eq!(ids.len(), results.len());
    }

    #[test]
    fn prop_distances_are_valid_cosine(
        vectors in corpus_strategy(),
        query in proptest::collection::vec(-10.0f32..10.0, DIM),
    ) {
        let entries: Vec<(String, Vec<f32>)> = vectors
            .into_iter()
            .enumerate()
            .map(|(i, v)| (format!("item-{i:03}"), v))
            .collect();

        let snapshot = build(entries, params(), DIM).unwrap();
        for (_, d) in snapshot.query(&query, 10).unwrap() {
            prop_assert!((-1e-6..=2.0 + 1e-6).contains(&d));
        }
    }
}
