//! Flat L2 vector index.
//!
//! An exhaustive-scan nearest-neighbor index over the corpus embeddings,
//! immutable once built. The corpus is small (a private document folder),
//! so a linear scan per query is simpler and fast enough; the dominant
//! cost of a question is the two provider round-trips, not local compute.
//!
//! The index is rebuilt wholesale whenever the document set changes —
//! there is no incremental add or remove.

use crate::error::{PipelineError, Result};

/// Immutable nearest-neighbor index over fixed-dimension embeddings.
#[derive(Debug)]
pub struct VectorIndex {
    dims: usize,
    vectors: Vec<Vec<f32>>,
}

impl VectorIndex {
    /// Build an index from corpus embeddings, in corpus order.
    ///
    /// The dimension is inferred from the first vector, so an empty input
    /// is a configuration error. Every vector must share that dimension.
    pub fn build(embeddings: Vec<Vec<f32>>) -> Result<Self> {
        let dims = match embeddings.first() {
            Some(v) => v.len(),
            None => {
                return Err(PipelineError::Configuration(
                    "cannot build a vector index from zero embeddings".to_string(),
                ))
            }
        };

        for v in &embeddings {
            if v.len() != dims {
                return Err(PipelineError::DimensionMismatch {
                    expected: dims,
                    actual: v.len(),
                });
            }
        }

        Ok(Self {
            dims,
            vectors: embeddings,
        })
    }

    /// Number of indexed vectors.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Return the `min(k, len)` nearest corpus positions to `query`,
    /// as `(corpus_index, l2_distance)` sorted ascending by distance.
    /// Ties are broken by lower corpus index for determinism.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        if query.len() != self.dims {
            return Err(PipelineError::DimensionMismatch {
                expected: self.dims,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (i, l2_distance(query, v)))
            .collect();

        scored.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(k);

        Ok(scored)
    }
}

/// Euclidean distance between two equal-length vectors.
fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    let mut sum = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        let d = x - y;
        sum += d * d;
    }
    sum.sqrt()
}
