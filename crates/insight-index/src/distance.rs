//! Cosine distance over f32 vectors with f64 accumulation.

/// Cosine similarity between two vectors. Zero-norm inputs yield 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (*x as f64) * (*y as f64))
        .sum();
    let norm_a = norm(a);
    let norm_b = norm(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Cosine distance: `1 - cosine_similarity`. Zero-norm vectors sit at
/// distance 1.0 from everything.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f64 {
    1.0 - cosine_similarity(a, b)
}

/// Euclidean norm with f64 accumulation.
pub(crate) fn norm(v: &[f32]) -> f64 {
    v.iter()
        .map(|x| (*x as f64) * (*x as f64))
        .sum::<f64>()
        .sqrt()
}

/// Scale a vector to unit norm. Zero vectors are returned unchanged.
pub(crate) fn normalize(v: &[f32]) -> Vec<f32> {
    let n = norm(v);
    if n == 0.0 {
        return v.to_vec();
    }
    v.iter().map(|x| (*x as f64 / n) as f32).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_vectors_have_zero_distance() {
        let v = vec![1.0, 2.0, 3.0];
        assert!(cosine_distance(&v, &v).abs() < 1e-9);
    }

    #[test]
    fn orthogonal_vectors_have_distance_one() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert!((cosine_distance(&a, &b) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn opposite_vectors_have_distance_two() {
        let a = vec![1.0, 0.0];
        let b = vec![-1.0, 0.0];
        assert!((cosine_distance(&a, &b) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn distance_is_scale_invariant() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![3.0, 1.0, 2.0];
        let scaled: Vec<f32> = b.iter().map(|x| x * 7.5).collect();
        assert!((cosine_distance(&a, &b) - cosine_distance(&a, &scaled)).abs() < 1e-6);
    }

    #[test]
    fn zero_vector_is_maximally_distant() {
        let a = vec![0.0, 0.0];
        let b = vec![1.0, 1.0];
        assert!((cosine_distance(&a, &b) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn normalize_produces_unit_norm() {
        let v = normalize(&[3.0, 4.0]);
        assert!((norm(&v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn normalize_keeps_zero_vector() {
        assert_eq!(normalize(&[0.0, 0.0]), vec![0.0, 0.0]);
    }
}
