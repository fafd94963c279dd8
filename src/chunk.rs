//! Fixed-size text chunker.
//!
//! Splits document text into consecutive non-overlapping slices of at most
//! `size` characters, in original order. The final slice holds whatever
//! remains. Counting is per `char`, not per byte, so a slice boundary can
//! never land inside a multi-byte UTF-8 sequence.
//!
//! # Guarantees
//!
//! - Concatenating the returned chunks reproduces the input exactly.
//! - Every chunk except possibly the last has exactly `size` characters.
//! - Empty input yields an empty vector.

use crate::error::{PipelineError, Result};

/// Split `text` into consecutive chunks of `size` characters.
///
/// Returns `PipelineError::Configuration` when `size` is zero.
pub fn chunk_text(text: &str, size: usize) -> Result<Vec<String>> {
    if size == 0 {
        return Err(PipelineError::Configuration(
            "chunk size must be > 0".to_string(),
        ));
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0usize;

    for ch in text.chars() {
        current.push(ch);
        count += 1;
        if count == size {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    Ok(chunks)
}
