//! Exact cosine ranking.
//!
//! Every query is a linear scan over the corpus snapshot it is given. Scores use
//! the norms cached on each [`Document`] at ingestion, so only the query norm is
//! computed per call.

use serde::Serialize;

use crate::{
    document::Document,
    vector_store::{cosine_with_norms, euclidean_norm, is_degenerate, VectorStoreError},
};

/// One ranked hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredDocument {
    /// 1-based position in the result list
    pub rank: usize,
    /// Cosine similarity in `[-1, 1]`
    pub score: f64,
    pub document: Document,
}

/// Ranks `corpus` by cosine similarity to `query` and keeps the best `top_k`.
///
/// Results are sorted by descending score. Equal scores keep corpus order. An
/// empty corpus yields an empty result rather than an error.
///
/// # Errors
/// - [`VectorStoreError::Validation`] if `top_k` is zero
/// - [`VectorStoreError::DegenerateVector`] if the query has zero or non-finite norm
/// - [`VectorStoreError::DimensionMismatch`] if the query width differs from the corpus
pub fn query(
    corpus: &[Document],
    query: &[f64],
    top_k: usize,
) -> Result<Vec<ScoredDocument>, VectorStoreError> {
    if top_k == 0 {
        return Err(VectorStoreError::Validation(
            "top_k must be at least 1".to_string(),
        ));
    }
    let Some(first) = corpus.first() else {
        return Ok(vec![]);
    };
    if query.len() != first.vector.len() {
        return Err(VectorStoreError::DimensionMismatch {
            expected: first.vector.len(),
            found: query.len(),
        });
    }
    let query_norm = euclidean_norm(query);
    if is_degenerate(query_norm) {
        return Err(VectorStoreError::DegenerateVector(format!(
            "query vector has norm {query_norm}"
        )));
    }

    let mut scored: Vec<(f64, &Document)> = corpus
        .iter()
        .map(|doc| {
            (
                cosine_with_norms(query, query_norm, &doc.vector, doc.norm),
                doc,
            )
        })
        .collect();
    // `sort_by` is stable, ties stay in insertion order
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(top_k);

    Ok(scored
        .into_iter()
        .enumerate()
        .map(|(i, (score, doc))| ScoredDocument {
            rank: i + 1,
            score,
            document: doc.clone(),
        })
        .collect())
}
