use std::cmp::Ordering;

use super::similarity::cosine_similarity;
use super::{MatchError, ProjectEmbeddingIndex, RankedProject};

/// Score `query` against every row of `index` and return the top `k`
/// (id, score) pairs, sorted descending by cosine similarity.
///
/// Determinism contract:
/// - the sort is stable, so equal scores keep ascending row order
/// - zero-norm vectors score 0.0, never NaN
/// - repeated calls on the same inputs return identical output
///
/// `k = 0` returns an empty list; `k > N` returns all N matches.
pub fn rank(
    query: &[f32],
    index: &ProjectEmbeddingIndex,
    k: usize,
) -> Result<Vec<RankedProject>, MatchError> {
    if index.is_empty() {
        return Ok(Vec::new());
    }

    if query.len() != index.dimension() {
        return Err(MatchError::DimensionMismatch {
            expected: index.dimension(),
            actual: query.len(),
        });
    }

    let mut scored: Vec<RankedProject> = index
        .ids()
        .iter()
        .zip(index.rows())
        .map(|(id, row)| RankedProject {
            project_id: *id,
            score: cosine_similarity(query, row),
        })
        .collect();

    // Vec::sort_by is stable: ties fall through as Equal and preserve the
    // original row order.
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored.truncate(k.min(index.len()));

    Ok(scored)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_project_index() -> ProjectEmbeddingIndex {
        // A along x, B along y, C on the diagonal.
        ProjectEmbeddingIndex::from_vectors(
            vec![1, 2, 3],
            vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.7, 0.7]],
        )
        .unwrap()
    }

    #[test]
    fn returns_top_k_sorted_descending() {
        let result = rank(&[1.0, 0.0], &three_project_index(), 2).unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].project_id, 1);
        assert!((result[0].score - 1.0).abs() < 1e-6);
        assert_eq!(result[1].project_id, 3);
        assert!((result[1].score - 0.707).abs() < 1e-3);
    }

    #[test]
    fn scores_are_non_increasing_and_match_brute_force() {
        let index = ProjectEmbeddingIndex::from_vectors(
            vec![10, 20, 30, 40, 50],
            vec![
                vec![0.9, 0.1, 0.0],
                vec![-0.3, 0.8, 0.5],
                vec![0.0, 0.0, 1.0],
                vec![0.5, 0.5, 0.5],
                vec![-1.0, 0.0, 0.0],
            ],
        )
        .unwrap();
        let query = [0.2, 0.5, 0.8];

        let result = rank(&query, &index, 3).unwrap();

        assert!(result.windows(2).all(|w| w[0].score >= w[1].score));

        // Brute-force reference: best 3 scores over all rows.
        let mut reference: Vec<f32> = index
            .rows()
            .iter()
            .map(|row| cosine_similarity(&query, row))
            .collect();
        reference.sort_by(|a, b| b.partial_cmp(a).unwrap());
        for (got, want) in result.iter().zip(reference.iter()) {
            assert!((got.score - want).abs() < 1e-6);
        }
    }

    #[test]
    fn k_zero_returns_empty() {
        assert!(rank(&[1.0, 0.0], &three_project_index(), 0)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn k_above_n_returns_all_n() {
        let result = rank(&[1.0, 0.0], &three_project_index(), 100).unwrap();
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn ties_keep_ascending_index_order() {
        // Rows 0 and 2 are identical; both score 1.0 against the query.
        let index = ProjectEmbeddingIndex::from_vectors(
            vec![5, 6, 7],
            vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0]],
        )
        .unwrap();

        let result = rank(&[1.0, 0.0], &index, 3).unwrap();

        assert_eq!(result[0].project_id, 5);
        assert_eq!(result[1].project_id, 7);
        assert_eq!(result[2].project_id, 6);
    }

    #[test]
    fn self_similarity_ranks_first_with_score_one() {
        let index = three_project_index();
        let result = rank(&[0.0, 1.0], &index, 3).unwrap();

        assert_eq!(result[0].project_id, 2);
        assert!((result[0].score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let index = three_project_index();
        let query = [0.4, 0.9];

        let first = rank(&query, &index, 3).unwrap();
        let second = rank(&query, &index, 3).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn zero_query_scores_every_row_zero() {
        let result = rank(&[0.0, 0.0], &three_project_index(), 3).unwrap();
        assert!(result.iter().all(|m| m.score == 0.0));
        // All-tied scores fall back to index order.
        let ids: Vec<_> = result.iter().map(|m| m.project_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn dimension_mismatch_is_an_error() {
        let err = rank(&[1.0, 0.0, 0.0], &three_project_index(), 2).unwrap_err();
        assert!(matches!(
            err,
            MatchError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
    }

    #[test]
    fn empty_index_returns_empty_for_any_query() {
        let index = ProjectEmbeddingIndex::from_vectors(vec![], vec![]).unwrap();
        assert!(rank(&[1.0, 2.0, 3.0], &index, 10).unwrap().is_empty());
    }
}
