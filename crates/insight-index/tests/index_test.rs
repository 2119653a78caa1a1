//! Integration tests: the recall contract against brute force, snapshot
//! isolation under concurrent publishes, and ordering guarantees.

use insight_core::InsightError;
use insight_index::{brute_force_top_k, build, IndexSnapshot, IvfParams, SnapshotHandle};
use test_fixtures::clustered_corpus;

const DIM: usize = 16;
const TOP_K: usize = 10;
/// Documented recall bound: probed queries must overlap brute-force
/// ground truth by at least this fraction on the reference corpus.
const RECALL_BOUND: f64 = 0.95;

fn params(num_lists: usize, probe_lists: usize) -> IvfParams {
    IvfParams {
        num_lists,
        probe_lists,
        max_kmeans_iters: 25,
        seed: 42,
    }
}

fn overlap(approx: &[(String, f64)], exact: &[(String, f64)]) -> f64 {
    let exact_ids: std::collections::HashSet<&str> =
        exact.iter().map(|(id, _)| id.as_str()).collect();
    let hits = approx
        .iter()
        .filter(|(id, _)| exact_ids.contains(id.as_str()))
        .count();
    hits as f64 / exact.len() as f64
}

#[test]
fn recall_meets_bound_on_reference_corpus() {
    let corpus = clustered_corpus(8, 50, DIM, 7);
    let snapshot = build(corpus.clone(), params(8, 4), DIM).unwrap();

    // One probe query per cluster.
    let mut total = 0.0;
    let mut queries = 0;
    for (i, (_, query)) in corpus.iter().enumerate() {
        if i % 50 != 25 {
            continue;
        }
        let approx = snapshot.query(query, TOP_K).unwrap();
        let exact = brute_force_top_k(&corpus, query, TOP_K);
        total += overlap(&approx, &exact);
        queries += 1;
    }

    let recall = total / queries as f64;
    assert!(
        recall >= RECALL_BOUND,
        "recall {recall:.3} below bound {RECALL_BOUND}"
    );
}

#[test]
fn full_probe_equals_brute_force() {
    let corpus = clustered_corpus(4, 25, DIM, 11);
    let snapshot = build(corpus.clone(), params(4, 4), DIM).unwrap();

    let query = &corpus[13].1;
    let approx = snapshot.query(query, TOP_K).unwrap();
    let exact = brute_force_top_k(&corpus, query, TOP_K);
    assert_eq!(approx, exact);
}

#[test]
fn results_are_sorted_and_bounded() {
    let corpus = clustered_corpus(4, 25, DIM, 3);
    let snapshot = build(corpus.clone(), params(4, 2), DIM).unwrap();

    let results = snapshot.query(&corpus[0].1, TOP_K).unwrap();
    assert!(results.len() <= TOP_K);
    for pair in results.windows(2) {
        assert!(pair[0].1 <= pair[1].1);
    }
}

#[test]
fn equal_distances_tie_break_by_item_id() {
    // Five identical vectors inserted in scrambled id order.
    let vector = vec![1.0f32; DIM];
    let entries: Vec<(String, Vec<f32>)> = ["item-d", "item-b", "item-e", "item-a", "item-c"]
        .iter()
        .map(|id| (id.to_string(), vector.clone()))
        .collect();

    let snapshot = build(entries, params(2, 2), DIM).unwrap();
    let results = snapshot.query(&vector, 5).unwrap();

    let ids: Vec<&str> = results.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, ["item-a", "item-b", "item-c", "item-d", "item-e"]);
}

#[test]
fn query_dimension_mismatch_is_an_error() {
    let corpus = clustered_corpus(2, 10, DIM, 5);
    let snapshot = build(corpus, params(2, 1), DIM).unwrap();

    let err = snapshot.query(&vec![1.0f32; DIM + 1], TOP_K).unwrap_err();
    assert!(matches!(err, InsightError::DimensionMismatch { .. }));
}

#[test]
fn empty_index_queries_are_empty_not_errors() {
    let snapshot = IndexSnapshot::empty(DIM, params(4, 2));
    assert!(snapshot.query(&vec![1.0f32; DIM], TOP_K).unwrap().is_empty());
}

#[test]
fn incremental_inserts_are_findable_and_tracked() {
    let corpus = clustered_corpus(4, 10, DIM, 9);
    let snapshot = build(corpus, params(4, 4), DIM).unwrap();

    let novel = vec![0.5f32; DIM];
    let next = snapshot.insert("item-new", novel.clone()).unwrap();
    assert_eq!(next.inserted_since_build(), 1);

    let results = next.query(&novel, 1).unwrap();
    assert_eq!(results[0].0, "item-new");
    assert!(results[0].1.abs() < 1e-9);

    // Drift accounting: 1 insert over 41 vectors stays under 25%.
    assert!(!next.needs_rebuild(0.25));
    let mut drifted = next;
    for i in 0..14 {
        drifted = drifted
            .insert(&format!("item-extra-{i}"), vec![0.1 * i as f32; DIM])
            .unwrap();
    }
    // 15 of 55 vectors are uncompacted inserts: past the 25% cap.
    assert!(drifted.needs_rebuild(0.25));
}

#[test]
fn in_flight_query_is_isolated_from_publish() {
    let corpus = clustered_corpus(4, 10, DIM, 21);
    let handle = SnapshotHandle::new(build(corpus.clone(), params(4, 4), DIM).unwrap(), 3600);

    // A reader pins the current snapshot.
    let pinned = handle.current();
    let query = &corpus[5].1;
    let before = pinned.query(query, TOP_K).unwrap();

    // A rebuild publishes a completely different snapshot mid-query.
    let replacement = build(clustered_corpus(2, 5, DIM, 99), params(2, 2), DIM).unwrap();
    handle.publish(replacement);

    // The pinned snapshot answers exactly as before.
    let after = pinned.query(query, TOP_K).unwrap();
    assert_eq!(before, after);

    // New readers see the replacement.
    assert_eq!(handle.current().len(), 10);
}
