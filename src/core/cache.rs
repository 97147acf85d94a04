use crate::core::{VerseRecord, VerseReference};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Process-lifetime verse cache. Entries are never evicted or replaced in place;
/// a racing second store for the same reference simply overwrites with an equal record.
#[derive(Debug, Default)]
pub struct VerseCache {
    entries: RwLock<HashMap<VerseReference, Arc<VerseRecord>>>,
}

impl VerseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, reference: &VerseReference) -> Option<Arc<VerseRecord>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(reference).cloned()
    }

    pub fn store(&self, reference: VerseReference, record: Arc<VerseRecord>) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(reference, record);
    }

    pub fn contains(&self, reference: &VerseReference) -> bool {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.contains_key(reference)
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Commentary, Translator};

    fn record(text: &str) -> Arc<VerseRecord> {
        Arc::new(VerseRecord::new(
            Some(text.to_string()),
            Some("translation".to_string()),
            vec![Commentary::new("author", "body")],
        ))
    }

    #[test]
    fn test_lookup_after_store() {
        let cache = VerseCache::new();
        let reference = VerseReference::new(1, 1, Translator::Kuliev).unwrap();

        assert!(cache.lookup(&reference).is_none());
        cache.store(reference, record("a"));

        assert_eq!(cache.lookup(&reference).unwrap().arabic_text, "a");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_translator_is_part_of_key() {
        let cache = VerseCache::new();
        let kuliev = VerseReference::new(1, 1, Translator::Kuliev).unwrap();
        cache.store(kuliev, record("a"));

        assert!(!cache.contains(&kuliev.with_translator(Translator::Osmanov)));
    }

    #[test]
    fn test_concurrent_stores_stay_consistent() {
        let cache = Arc::new(VerseCache::new());
        let handles: Vec<_> = (1..=8u16)
            .map(|ayah| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    let reference = VerseReference::new(2, ayah, Translator::Kuliev).unwrap();
                    for _ in 0..50 {
                        cache.store(reference, record(&ayah.to_string()));
                        let seen = cache.lookup(&reference).unwrap();
                        assert_eq!(seen.arabic_text, ayah.to_string());
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 8);
    }
}
