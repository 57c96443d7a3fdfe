//! Positional placeholder lists, precomputed per arity.

/// Precomputed `$1,$2,...` strings indexed by arity.
///
/// Built once when the sink is initialized so the write path never formats
/// placeholder lists. `get(n)` yields exactly `n` comma-joined markers for
/// every `n` in `1..=max_arity`.
#[derive(Debug, Clone)]
pub struct PlaceholderCache {
    lists: Vec<String>,
}

impl PlaceholderCache {
    /// Builds lists for arities `0..=max_arity`; arity 0 maps to an empty list.
    pub fn new(max_arity: usize) -> Self {
        let mut lists = Vec::with_capacity(max_arity + 1);
        lists.push(String::new());
        for n in 1..=max_arity {
            let list = if n == 1 {
                "$1".to_string()
            } else {
                format!("{},${}", lists[n - 1], n)
            };
            lists.push(list);
        }
        PlaceholderCache { lists }
    }

    /// Placeholder list for a record with `arity` values.
    pub fn get(&self, arity: usize) -> Option<&str> {
        self.lists.get(arity).map(String::as_str)
    }

    /// Largest arity the cache was built for.
    pub fn max_arity(&self) -> usize {
        self.lists.len() - 1
    }
}

/// Formats a placeholder list without the cache.
///
/// Used for records wider than the mapping the cache was built for.
pub fn placeholder_list(arity: usize) -> String {
    (1..=arity)
        .map(|n| format!("${}", n))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_lists_are_ascending_from_one() {
        let cache = PlaceholderCache::new(5);
        assert_eq!(cache.max_arity(), 5);
        assert_eq!(cache.get(1), Some("$1"));
        assert_eq!(cache.get(2), Some("$1,$2"));
        assert_eq!(cache.get(5), Some("$1,$2,$3,$4,$5"));
    }

    #[test]
    fn test_every_arity_has_exactly_n_markers() {
        let m = 12;
        let cache = PlaceholderCache::new(m);
        for n in 1..=m {
            let list = cache.get(n).unwrap();
            let markers: Vec<&str> = list.split(',').collect();
            assert_eq!(markers.len(), n, "arity {}", n);
            for (i, marker) in markers.iter().enumerate() {
                assert_eq!(*marker, format!("${}", i + 1));
            }
        }
    }

    #[test]
    fn test_out_of_range_arity() {
        let cache = PlaceholderCache::new(3);
        assert_eq!(cache.get(0), Some(""));
        assert_eq!(cache.get(4), None);
        assert_eq!(PlaceholderCache::new(0).get(1), None);
    }

    #[test]
    fn test_uncached_list_matches_cache() {
        let cache = PlaceholderCache::new(7);
        for n in 0..=7 {
            assert_eq!(placeholder_list(n), cache.get(n).unwrap());
        }
    }
}
