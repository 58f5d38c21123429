//! Brute-force cosine k-nearest-neighbour search
//!
//! Rows are compared against the whole population in parallel, one rayon
//! task per row. Output order is deterministic: edges are grouped by source
//! row and sorted by similarity descending, ties broken by ascending raw id.

use std::cmp::Ordering;

use rayon::prelude::*;
use tracing::debug;

use crate::matrix::SparseRows;

/// Default number of neighbours kept per row
pub const DEFAULT_TOP_K: usize = 10;

/// One directed similarity edge between raw ids
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityEdge {
    pub source_id: i64,
    pub target_id: i64,
    pub score: f32,
}

/// Compute the top-k cosine neighbours of every row
///
/// Each row requests k+1 candidates (clipped to the population) so that
/// dropping itself still leaves k. Scores are clamped to [0, 1]; a row with
/// zero norm produces no edges of its own and scores 0.0 as a target.
pub fn top_k_neighbors(rows: &SparseRows, k: usize) -> Vec<SimilarityEdge> {
    let n = rows.len();
    if n == 0 || k == 0 {
        return Vec::new();
    }

    let norms_sq: Vec<f32> = rows.rows().iter().map(|row| norm_sq(row)).collect();
    let ids = rows.ids();
    let take = (k + 1).min(n);

    let per_row: Vec<Vec<SimilarityEdge>> = (0..n)
        .into_par_iter()
        .map(|i| {
            if norms_sq[i] == 0.0 {
                return Vec::new();
            }

            let source = &rows.rows()[i];
            let mut candidates: Vec<(f32, i64, usize)> = (0..n)
                .map(|j| {
                    let sim = if norms_sq[j] == 0.0 {
                        0.0
                    } else {
                        let denom = (norms_sq[i] * norms_sq[j]).sqrt();
                        (sparse_dot(source, &rows.rows()[j]) / denom).clamp(0.0, 1.0)
                    };
                    (sim, ids[j], j)
                })
                .collect();

            if candidates.len() > take {
                candidates.select_nth_unstable_by(take - 1, cmp_candidates);
                candidates.truncate(take);
            }
            candidates.sort_unstable_by(cmp_candidates);

            candidates
                .into_iter()
                .filter(|&(_, _, j)| j != i)
                .take(k)
                .map(|(score, target_id, _)| SimilarityEdge {
                    source_id: ids[i],
                    target_id,
                    score,
                })
                .collect()
        })
        .collect();

    let edges: Vec<SimilarityEdge> = per_row.into_iter().flatten().collect();
    debug!("Computed {} similarity edges over {} rows", edges.len(), n);
    edges
}

/// Similarity descending, ties broken by ascending raw id
fn cmp_candidates(a: &(f32, i64, usize), b: &(f32, i64, usize)) -> Ordering {
    b.0.partial_cmp(&a.0)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.1.cmp(&b.1))
}

/// Dot product of two sparse rows sorted by column
fn sparse_dot(a: &[(u32, f32)], b: &[(u32, f32)]) -> f32 {
    let mut sum = 0.0;
    let (mut x, mut y) = (0, 0);
    while x < a.len() && y < b.len() {
        match a[x].0.cmp(&b[y].0) {
            Ordering::Less => x += 1,
            Ordering::Greater => y += 1,
            Ordering::Equal => {
                sum += a[x].1 * b[y].1;
                x += 1;
                y += 1;
            }
        }
    }
    sum
}

fn norm_sq(row: &[(u32, f32)]) -> f32 {
    row.iter().map(|&(_, w)| w * w).sum()
}
