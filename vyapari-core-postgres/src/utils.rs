use blake3::Hasher as Blake3Hasher;
use serde::Serialize;
use std::error::Error;

/// A trait for converting a database row into a model.
pub trait TryFromRow<R>: Sized {
    /// Performs the conversion.
    fn try_from_row(row: &R) -> Result<Self, Box<dyn Error + Send + Sync>>;
}

/// Stable 64-bit key for `pg_advisory_xact_lock`, derived from the JSON
/// encoding of `data`.
pub fn hash_as_i64<T: Serialize>(data: &T) -> Result<i64, Box<dyn Error + Send + Sync>> {
    let mut hasher = Blake3Hasher::new();
    hasher.update(&serde_json::to_vec(data)?);
    let hash = hasher.finalize();
    let mut head = [0u8; 8];
    head.copy_from_slice(&hash.as_bytes()[..8]);
    Ok(i64::from_le_bytes(head))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_keys_are_stable_and_distinct() {
        let a = hash_as_i64(&("rate_window", "42")).unwrap();
        assert_eq!(a, hash_as_i64(&("rate_window", "42")).unwrap());
        assert_ne!(a, hash_as_i64(&("rate_window", "43")).unwrap());
    }
}
