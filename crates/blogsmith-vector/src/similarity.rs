//! Similarity scoring and linear-scan top-K ranking
//!
//! Author: hephaex@gmail.com

use std::cmp::Ordering;

pub use blogsmith_core::SimilarityMetric;

/// Position of a candidate and its score against the query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredIndex {
    pub index: usize,
    pub score: f32,
}

/// Dot product over the common prefix of `a` and `b`
pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Cosine similarity of `a` and `b`.
///
/// Accumulates in `f64` so large finite components cannot overflow.
/// Returns `0.0` when either vector has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
    }
    for x in a {
        norm_a += f64::from(*x) * f64::from(*x);
    }
    for y in b {
        norm_b += f64::from(*y) * f64::from(*y);
    }

    let denominator = norm_a.sqrt() * norm_b.sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    (dot / denominator) as f32
}

/// Score `a` against `b` with the given metric
pub fn score(metric: SimilarityMetric, a: &[f32], b: &[f32]) -> f32 {
    match metric {
        SimilarityMetric::Cosine => cosine_similarity(a, b),
        SimilarityMetric::Dot => dot_product(a, b),
    }
}

/// Descending order by score; NaN sorts after every number
fn by_score_desc(a: &ScoredIndex, b: &ScoredIndex) -> Ordering {
    match (a.score.is_nan(), b.score.is_nan()) {
        (false, false) => b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal),
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (true, true) => Ordering::Equal,
    }
}

/// Rank `candidates` against `query` and return at most `k` of them.
///
/// Results are in non-increasing score order. The sort is stable, so equal
/// scores keep the candidates' original order.
pub fn rank<V>(query: &[f32], candidates: &[V], k: usize, metric: SimilarityMetric) -> Vec<ScoredIndex>
where
    V: AsRef<[f32]>,
{
    if k == 0 || candidates.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<ScoredIndex> = candidates
        .iter()
        .enumerate()
        .map(|(index, candidate)| ScoredIndex {
            index,
            score: score(metric, query, candidate.as_ref()),
        })
        .collect();

    scored.sort_by(by_score_desc);
    scored.truncate(k);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_dot_product() {
        assert_eq!(dot_product(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]), 32.0);
        assert_eq!(dot_product(&[], &[]), 0.0);
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 3.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 1.0], &[-1.0, -1.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_zero_vector_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_cosine_large_components_stay_finite() {
        let big = [1e20f32, -3e19];
        let score = cosine_similarity(&big, &big);
        assert!((score - 1.0).abs() < 1e-6);

        let score = cosine_similarity(&[f32::MAX, f32::MAX], &[f32::MAX, 0.0]);
        assert!(score.is_finite());
        assert!((score - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn test_rank_orders_by_score() {
        let candidates: Vec<Vec<f32>> = vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![0.7, 0.3]];
        let ranked = rank(&[1.0, 0.0], &candidates, 2, SimilarityMetric::Cosine);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].index, 1);
        assert_eq!(ranked[1].index, 2);
    }

    #[test]
    fn test_rank_dot_rewards_magnitude() {
        let candidates: Vec<Vec<f32>> = vec![vec![1.0, 0.0], vec![5.0, 0.0]];

        let cosine = rank(&[1.0, 0.0], &candidates, 2, SimilarityMetric::Cosine);
        assert_eq!(cosine[0].index, 0, "cosine ties keep original order");

        let dot = rank(&[1.0, 0.0], &candidates, 2, SimilarityMetric::Dot);
        assert_eq!(dot[0].index, 1);
        assert_eq!(dot[0].score, 5.0);
    }

    #[test]
    fn test_rank_ties_keep_original_order() {
        let candidates: Vec<Vec<f32>> = vec![vec![1.0], vec![1.0], vec![2.0], vec![1.0]];
        let ranked = rank(&[1.0], &candidates, 4, SimilarityMetric::Dot);
        let order: Vec<usize> = ranked.iter().map(|s| s.index).collect();
        assert_eq!(order, vec![2, 0, 1, 3]);
    }

    #[test]
    fn test_rank_nan_sorts_last() {
        let candidates: Vec<Vec<f32>> = vec![vec![f32::NAN], vec![0.5], vec![-1.0]];
        let ranked = rank(&[1.0], &candidates, 3, SimilarityMetric::Dot);
        let order: Vec<usize> = ranked.iter().map(|s| s.index).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn test_rank_empty_inputs() {
        let candidates: Vec<Vec<f32>> = Vec::new();
        assert!(rank(&[1.0], &candidates, 5, SimilarityMetric::Cosine).is_empty());
        let one: Vec<Vec<f32>> = vec![vec![1.0]];
        assert!(rank(&[1.0], &one, 0, SimilarityMetric::Cosine).is_empty());
    }

    fn arb_candidates() -> impl Strategy<Value = (Vec<f32>, Vec<Vec<f32>>)> {
        (1usize..8).prop_flat_map(|dim| {
            (
                prop::collection::vec(-10.0f32..10.0, dim),
                prop::collection::vec(prop::collection::vec(-10.0f32..10.0, dim), 0..40),
            )
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_rank_is_bounded_and_sorted(
            (query, candidates) in arb_candidates(),
            k in 0usize..50,
            dot in any::<bool>(),
        ) {
            let metric = if dot { SimilarityMetric::Dot } else { SimilarityMetric::Cosine };
            let ranked = rank(&query, &candidates, k, metric);

            prop_assert!(ranked.len() <= k);
            prop_assert_eq!(ranked.len(), k.min(candidates.len()));
            for pair in ranked.windows(2) {
                prop_assert!(pair[0].score >= pair[1].score);
                if pair[0].score == pair[1].score {
                    prop_assert!(pair[0].index < pair[1].index);
                }
            }
        }

        #[test]
        fn prop_rank_returns_best_candidates(
            (query, candidates) in arb_candidates(),
            k in 1usize..10,
        ) {
            let ranked = rank(&query, &candidates, k, SimilarityMetric::Cosine);
            if let Some(last) = ranked.last() {
                let chosen: Vec<usize> = ranked.iter().map(|s| s.index).collect();
                for (i, candidate) in candidates.iter().enumerate() {
                    if !chosen.contains(&i) {
                        prop_assert!(cosine_similarity(&query, candidate) <= last.score);
                    }
                }
            }
        }

        #[test]
        fn prop_cosine_is_bounded_for_finite_input(
            a in prop::collection::vec(prop::num::f32::NORMAL | prop::num::f32::ZERO, 1..8),
            b in prop::collection::vec(prop::num::f32::NORMAL | prop::num::f32::ZERO, 1..8),
        ) {
            let score = cosine_similarity(&a, &b);
            prop_assert!(!score.is_nan());
            prop_assert!((-1.0 - 1e-5..=1.0 + 1e-5).contains(&score));
        }
    }
}
