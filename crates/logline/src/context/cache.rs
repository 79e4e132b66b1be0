use std::collections::HashMap;

/// Stringified context lookups for one scope.
///
/// Every entry is tagged with the scope generation it was computed at.
/// The scope bumps its generation on each bind/clear, so a stale entry is
/// never returned: a lookup with a newer generation drops the whole cache
/// before answering.
#[derive(Debug, Default)]
pub struct LookupCache {
    generation: u64,
    entries: HashMap<String, String>,
    hits: u64,
    misses: u64,
}

impl LookupCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value for `key`, or `None` if absent or computed at an older generation
    pub fn get(&mut self, key: &str, generation: u64) -> Option<String> {
        if generation != self.generation {
            self.entries.clear();
            self.generation = generation;
        }
        match self.entries.get(key) {
            Some(value) => {
                self.hits += 1;
                Some(value.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, key: &str, generation: u64, value: String) {
        if generation != self.generation {
            self.entries.clear();
            self.generation = generation;
        }
        self.entries.insert(key.to_string(), value);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            generation: self.generation,
            entries: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub generation: u64,
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}
