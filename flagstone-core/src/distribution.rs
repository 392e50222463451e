//! Deterministic distribution
//!
//! Maps a seed string to a stable percentile in `[0, 1)` with 32-bit
//! MurmurHash3 (x86, seed 0). The divisor is `u32::MAX - 1`, not
//! `u32::MAX`; other clients bucket with the same constant.

use std::io::Cursor;

/// Normalizing divisor shared with every other client implementation.
pub const HASH_DIVISOR: f64 = 4_294_967_294.0;

/// Stable percentile for `seed`
pub fn percentile(seed: &str) -> f64 {
    // Reading from an in-memory cursor cannot fail.
    let hash = murmur3::murmur3_32(&mut Cursor::new(seed.as_bytes()), 0).unwrap_or_default();
    f64::from(hash) / HASH_DIVISOR
}

/// Percentile for a weighted value, seeded by config key and hash-by property value
pub fn weighted_value_percentile(config_key: &str, hash_by_value: &str) -> f64 {
    percentile(&format!("{}{}", config_key, hash_by_value))
}

/// Percentile for legacy percentage flags
pub fn rollout_percentile(account_id: &str, flag_key: &str, lookup_key: &str) -> f64 {
    percentile(&format!("{}{}{}", account_id, flag_key, lookup_key))
}

/// Index of the weighted bucket `percent` falls into.
///
/// Returns the first index whose running weight total exceeds
/// `percent * total`; the last index when nothing does (including a zero
/// total). `None` only for an empty list.
pub fn bucket_index(weights: &[u32], percent: f64) -> Option<usize> {
    if weights.is_empty() {
        return None;
    }

    let total: u64 = weights.iter().map(|w| u64::from(*w)).sum();
    let threshold = percent * total as f64;

    let mut running = 0u64;
    for (index, weight) in weights.iter().enumerate() {
        running += u64::from(*weight);
        if running as f64 > threshold {
            return Some(index);
        }
    }

    Some(weights.len() - 1)
}
