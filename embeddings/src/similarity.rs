//! Similarity computation for embeddings.
//!
//! Provider vectors are unit length, so the dot product is the cosine
//! similarity and no magnitude division is performed.

use crate::error::{EmbeddingError, Result};

/// Compute the dot product between two embeddings.
///
/// Fails with [`EmbeddingError::DimensionMismatch`] when the lengths differ;
/// `expected` is the length of `a`.
pub fn dot_product(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(EmbeddingError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    Ok(a.iter().zip(b.iter()).map(|(x, y)| x * y).sum())
}

/// Normalize an embedding to unit length.
///
/// Zero vectors are left untouched.
pub fn normalize(embedding: &mut [f32]) {
    let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if magnitude > 0.0 {
        for x in embedding.iter_mut() {
            *x /= magnitude;
        }
    }
}
