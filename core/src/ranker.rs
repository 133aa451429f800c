use crate::error::RankError;
use crate::vectorizer::SparseVec;
use std::cmp::Ordering;

/// Cosine similarity of two vectors from the same vector space. Both sides
/// are unit-normalized by the vectorizer, so this is a sparse dot product.
/// A zero vector scores 0.0 against anything; never NaN.
pub fn cosine(a: &SparseVec, b: &SparseVec) -> Result<f32, RankError> {
    if a.dim != b.dim {
        return Err(RankError::DimensionMismatch { expected: b.dim, found: a.dim });
    }
    let mut dot = 0.0f32;
    let (mut i, mut j) = (0, 0);
    while i < a.entries.len() && j < b.entries.len() {
        match a.entries[i].0.cmp(&b.entries[j].0) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                dot += a.entries[i].1 * b.entries[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    Ok(dot)
}

/// Score every document vector against the query vector. The output is
/// parallel to `docs`; every vector is dimension-checked so the ranker is
/// safe to call outside the `rank` entry point.
pub fn score_all(docs: &[SparseVec], query: &SparseVec) -> Result<Vec<f32>, RankError> {
    docs.iter().map(|d| cosine(d, query)).collect()
}

/// Order document indices by descending score. `sort_by` is stable, so equal
/// scores keep their relative input order; callers wanting a different tie
/// policy re-sort with a secondary key.
pub fn order_by_score(scores: &[f32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].partial_cmp(&scores[a]).unwrap_or(Ordering::Equal));
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TermId;

    fn vec_of(dim: usize, entries: &[(TermId, f32)]) -> SparseVec {
        SparseVec { dim, entries: entries.to_vec() }
    }

    #[test]
    fn dot_product_of_disjoint_vectors_is_zero() {
        let a = vec_of(4, &[(0, 1.0)]);
        let b = vec_of(4, &[(3, 1.0)]);
        assert_eq!(cosine(&a, &b).unwrap(), 0.0);
    }

    #[test]
    fn self_similarity_of_unit_vector_is_one() {
        let w = (0.5f32).sqrt();
        let a = vec_of(3, &[(0, w), (2, w)]);
        let sim = cosine(&a, &a).unwrap();
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn zero_vector_scores_zero_never_nan() {
        let zero = vec_of(3, &[]);
        let b = vec_of(3, &[(1, 1.0)]);
        assert_eq!(cosine(&zero, &b).unwrap(), 0.0);
        assert_eq!(cosine(&zero, &zero).unwrap(), 0.0);
    }

    #[test]
    fn dimension_mismatch_is_an_error() {
        let a = vec_of(3, &[(0, 1.0)]);
        let b = vec_of(4, &[(0, 1.0)]);
        let err = cosine(&a, &b).unwrap_err();
        assert!(matches!(err, RankError::DimensionMismatch { expected: 4, found: 3 }));
    }

    #[test]
    fn score_all_checks_every_vector() {
        let docs = vec![vec_of(3, &[(0, 1.0)]), vec_of(2, &[(0, 1.0)])];
        let query = vec_of(3, &[(0, 1.0)]);
        assert!(score_all(&docs, &query).is_err());
    }

    #[test]
    fn order_is_descending_and_stable() {
        let scores = [0.2, 0.9, 0.2, 0.5];
        assert_eq!(order_by_score(&scores), vec![1, 3, 0, 2]);
    }
}
