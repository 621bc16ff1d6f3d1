pub mod hashing;
pub(crate) mod openai;

pub use hashing::HashingEmbedding;
pub use openai::OpenAIEmbeddingModel as OpenAIEmbedding;

use serde::Deserialize;

use crate::embeddings::EmbedderError;

/// Response body shared by OpenAI compatible embedding endpoints.
#[derive(Deserialize, Debug)]
pub struct IndexedEmbeddingResponse {
    pub data: Vec<IndexedEmbedding>,
}

#[derive(Deserialize, Debug)]
pub struct IndexedEmbedding {
    pub embedding: Vec<f64>,
    pub index: usize,
}

impl IndexedEmbeddingResponse {
    /// Returns the vectors in request order.
    ///
    /// # Errors
    /// Fails with [`EmbedderError::CountMismatch`] if the provider didn't return
    /// exactly one vector per input, and [`EmbedderError::ParseError`] on a
    /// duplicated or out of range index.
    pub fn into_ordered(self, expected: usize) -> Result<Vec<Vec<f64>>, EmbedderError> {
        if self.data.len() != expected {
            return Err(EmbedderError::CountMismatch {
                expected,
                found: self.data.len(),
            });
        }
        let mut slots: Vec<Option<Vec<f64>>> = vec![None; expected];
        for item in self.data {
            let slot = slots.get_mut(item.index).ok_or_else(|| {
                EmbedderError::ParseError(format!("embedding index {} out of range", item.index))
            })?;
            if slot.replace(item.embedding).is_some() {
                return Err(EmbedderError::ParseError(format!(
                    "duplicate embedding index {}",
                    item.index
                )));
            }
        }
        // every slot is filled: `expected` distinct in-range indices were seen
        Ok(slots.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_order_response() {
        let response: IndexedEmbeddingResponse = serde_json::from_str(
            r#"{
                "object": "list",
                "data": [
                    {"object": "embedding", "index": 1, "embedding": [0.0, 1.0]},
                    {"object": "embedding", "index": 0, "embedding": [1.0, 0.0]}
                ],
                "model": "text-embedding-3-small"
            }"#,
        )
        .unwrap();
        let vectors = response.into_ordered(2).unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_bad_responses() {
        let short: IndexedEmbeddingResponse =
            serde_json::from_str(r#"{"data": [{"index": 0, "embedding": [1.0]}]}"#).unwrap();
        assert!(matches!(
            short.into_ordered(2),
            Err(EmbedderError::CountMismatch {
                expected: 2,
                found: 1
            })
        ));

        let duplicated: IndexedEmbeddingResponse = serde_json::from_str(
            r#"{"data": [{"index": 0, "embedding": [1.0]}, {"index": 0, "embedding": [2.0]}]}"#,
        )
        .unwrap();
        assert!(matches!(
            duplicated.into_ordered(2),
            Err(EmbedderError::ParseError(_))
        ));
    }
}
