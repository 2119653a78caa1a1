//! Snapshot construction from a consistent embedding read, plus the exact
//! reference scan used to validate the recall contract.

use tracing::info;

use insight_core::errors::{InsightError, InsightResult};

use crate::kmeans;
use crate::snapshot::{IndexSnapshot, IvfParams, ListEntry};

/// Build a new immutable snapshot from `(item_id, vector)` entries.
///
/// Partitions the vectors into at most `params.num_lists` coarse clusters;
/// fewer entries than lists degenerate gracefully (one entry per list).
/// An empty input produces an empty, queryable snapshot.
pub fn build(
    entries: Vec<(String, Vec<f32>)>,
    params: IvfParams,
    dim: usize,
) -> InsightResult<IndexSnapshot> {
    for (_, vector) in &entries {
        if vector.len() != dim {
            return Err(InsightError::DimensionMismatch {
                expected: dim,
                actual: vector.len(),
            });
        }
    }

    if entries.is_empty() {
        return Ok(IndexSnapshot::empty(dim, params));
    }

    let k = params.num_lists.min(entries.len());
    let vectors: Vec<&[f32]> = entries.iter().map(|(_, v)| v.as_slice()).collect();
    let (centroids, assignments) =
        kmeans::cluster(&vectors, k, params.max_kmeans_iters, params.seed);

    let mut lists: Vec<Vec<ListEntry>> = vec![Vec::new(); centroids.len()];
    for ((item_id, vector), cluster) in entries.into_iter().zip(assignments) {
        lists[cluster].push(ListEntry { item_id, vector });
    }

    let snapshot = IndexSnapshot::new(dim, params, centroids, lists);
    info!(
        snapshot = %snapshot.id(),
        vectors = snapshot.len(),
        lists = k,
        "index snapshot built"
    );
    Ok(snapshot)
}

/// Exact top-k by brute-force scan. The ground truth that `query` is
/// measured against in recall tests; same ordering discipline.
pub fn brute_force_top_k(
    entries: &[(String, Vec<f32>)],
    query: &[f32],
    top_k: usize,
) -> Vec<(String, f64)> {
    let mut scored: Vec<(String, f64)> = entries
        .iter()
        .map(|(id, v)| (id.clone(), crate::distance::cosine_distance(query, v)))
        .collect();
    scored.sort_by(|a, b| {
        a.1.partial_cmp(&b.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    scored.truncate(top_k);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(num_lists: usize, probe_lists: usize) -> IvfParams {
        IvfParams {
            num_lists,
            probe_lists,
            max_kmeans_iters: 15,
            seed: 42,
        }
    }

    #[test]
    fn build_from_empty_input_is_queryable() {
        let snapshot = build(Vec::new(), params(4, 2), 3).unwrap();
        assert!(snapshot.is_empty());
        assert!(snapshot.query(&[1.0, 0.0, 0.0], 5).unwrap().is_empty());
    }

    #[test]
    fn build_rejects_mismatched_entry() {
        let entries = vec![("a".to_string(), vec![1.0, 0.0, 0.0])];
        assert!(build(entries, params(4, 2), 2).is_err());
    }

    #[test]
    fn fewer_entries_than_lists_still_builds() {
        let entries = vec![
            ("a".to_string(), vec![1.0, 0.0]),
            ("b".to_string(), vec![0.0, 1.0]),
        ];
        let snapshot = build(entries, params(16, 4), 2).unwrap();
        assert_eq!(snapshot.len(), 2);
    }

    #[test]
    fn probing_all_lists_matches_brute_force() {
        let entries: Vec<(String, Vec<f32>)> = (0..30)
            .map(|i| {
                let angle = i as f32 * 0.2;
                (format!("item-{i:02}"), vec![angle.cos(), angle.sin()])
            })
            .collect();

        let snapshot = build(entries.clone(), params(4, 4), 2).unwrap();
        let query = vec![1.0, 0.1];
        let approx = snapshot.query(&query, 5).unwrap();
        let exact = brute_force_top_k(&entries, &query, 5);
        assert_eq!(approx, exact);
    }
}
