//! Deterministic text embedding for the ticker index.
//!
//! Index documents and query text are both mapped into the same
//! fixed-dimension space with hashed character trigrams, so
//! nearest-neighbor search in the database ranks tickers by lexical
//! similarity to the query. The function is pure: equal inputs embed
//! identically across processes and platforms.

use crate::schema::EMBEDDING_DIM;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Embeds text as an L2-normalized hashed-trigram vector of
/// [`EMBEDDING_DIM`] components.
///
/// Empty or whitespace-only input yields the zero vector, which the
/// index treats as matching nothing in particular.
#[must_use]
pub fn embed_text(text: &str) -> Vec<f32> {
    let normalized: Vec<char> = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    let mut vector = vec![0.0f32; EMBEDDING_DIM];
    let mut padded = Vec::with_capacity(normalized.len() + 2);
    padded.push(' ');
    padded.extend(normalized);
    padded.push(' ');

    for trigram in padded.windows(3) {
        let token: String = trigram.iter().collect();
        let hash = fnv1a(token.as_bytes());
        let slot = usize::try_from(hash % EMBEDDING_DIM as u64).unwrap_or(0);
        // Second hash bit decides sign so common trigrams do not all
        // pile onto the positive axis.
        let sign = if hash & (1 << 63) == 0 { 1.0 } else { -1.0 };
        vector[slot] += sign;
    }

    let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in &mut vector {
            *v /= norm;
        }
    }
    vector
}
