//! Eviction Module
//!
//! Picks the batch of entries removed when the image cache overflows.
//! Unlike a strict LRU, one pass drops the oldest fifth of the capacity at
//! once, ranked by insertion time rather than access time.

use std::collections::HashMap;

use crate::cache::CacheEntry;

/// Fraction of `max_size` dropped per eviction pass.
pub const EVICTION_FRACTION: f64 = 0.2;

// == Eviction Count ==
/// Number of entries one pass removes: `floor(max_size * 0.2)`.
///
/// Zero below a capacity of 5, in which case an overflowing insert leaves
/// the cache above `max_size`.
pub fn eviction_count(max_size: usize) -> usize {
    (max_size as f64 * EVICTION_FRACTION).floor() as usize
}

// == Select Oldest ==
/// Returns the keys of the `count` oldest entries by `(timestamp, sequence)`.
///
/// `protect` is never selected; it is the key that triggered the pass.
pub fn select_oldest(
    entries: &HashMap<String, CacheEntry>,
    count: usize,
    protect: &str,
) -> Vec<String> {
    let mut ranked: Vec<(&String, u64, u64)> = entries
        .iter()
        .filter(|(key, _)| key.as_str() != protect)
        .map(|(key, entry)| (key, entry.timestamp, entry.sequence))
        .collect();

    ranked.sort_unstable_by_key(|&(_, timestamp, sequence)| (timestamp, sequence));

    ranked
        .into_iter()
        .take(count)
        .map(|(key, _, _)| key.clone())
        .collect()
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ImagePayload;

    fn entries(specs: &[(&str, u64, u64)]) -> HashMap<String, CacheEntry> {
        specs
            .iter()
            .map(|&(key, timestamp, sequence)| {
                (
                    key.to_string(),
                    CacheEntry::new(ImagePayload::new("", "image/png"), timestamp, sequence),
                )
            })
            .collect()
    }

    #[test]
    fn test_eviction_count() {
        assert_eq!(eviction_count(10), 2);
        assert_eq!(eviction_count(14), 2);
        assert_eq!(eviction_count(15), 3);
        assert_eq!(eviction_count(100), 20);
    }

    #[test]
    fn test_eviction_count_small_capacity() {
        assert_eq!(eviction_count(0), 0);
        assert_eq!(eviction_count(1), 0);
        assert_eq!(eviction_count(4), 0);
        assert_eq!(eviction_count(5), 1);
    }

    #[test]
    fn test_select_oldest_by_timestamp() {
        let map = entries(&[("c", 30, 0), ("a", 10, 1), ("b", 20, 2), ("d", 40, 3)]);

        let mut oldest = select_oldest(&map, 2, "d");
        oldest.sort();
        assert_eq!(oldest, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_sequence_breaks_timestamp_ties() {
        let map = entries(&[("second", 5, 2), ("first", 5, 1), ("third", 5, 3)]);

        let oldest = select_oldest(&map, 1, "third");
        assert_eq!(oldest, vec!["first".to_string()]);
    }

    #[test]
    fn test_protected_key_never_selected() {
        // Protected key has the oldest timestamp (clock moved backwards)
        let map = entries(&[("new", 1, 9), ("a", 10, 1), ("b", 20, 2)]);

        let oldest = select_oldest(&map, 3, "new");
        assert_eq!(oldest.len(), 2);
        assert!(!oldest.contains(&"new".to_string()));
    }

    #[test]
    fn test_select_from_empty() {
        let map = HashMap::new();
        assert!(select_oldest(&map, 5, "x").is_empty());
    }
}
