use serde::Serialize;

/// A document held by a document store.
///
/// Documents are immutable once stored. The `id` is assigned by the store at
/// ingestion, starts at 1 and is never reused.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub id: usize,
    pub text: String,
    pub vector: Vec<f64>,
    /// Euclidean norm of `vector`, computed once at ingestion.
    pub norm: f64,
}

impl Document {
    pub(crate) fn new(id: usize, text: String, vector: Vec<f64>, norm: f64) -> Self {
        Self {
            id,
            text,
            vector,
            norm,
        }
    }

    #[must_use]
    pub fn entry(&self) -> DocumentEntry {
        DocumentEntry {
            id: self.id,
            text: self.text.clone(),
        }
    }
}

/// The `(id, text)` pair returned when listing a store.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct DocumentEntry {
    pub id: usize,
    pub text: String,
}

impl DocumentEntry {
    pub fn new(id: usize, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}
