//! Optional cache of complete translation results

use std::time::Duration;

use mini_moka::sync::Cache;
use tracing::debug;

use crate::core::models::{TranslationRequest, TranslationResult};

/// Results keyed by (source language, target language, query)
#[derive(Clone)]
pub struct ResultCache {
    cache: Cache<TranslationRequest, TranslationResult>,
}

impl ResultCache {
    /// Cache holding at most `capacity` results, each for at most `ttl`
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .build();
        Self { cache }
    }

    /// Stored result for exactly this language pair and query
    pub fn get(&self, request: &TranslationRequest) -> Option<TranslationResult> {
        let hit = self.cache.get(request);
        if hit.is_some() {
            debug!("Result cache hit for {} -> {}", request.source_lang, request.target_lang);
        }
        hit
    }

    /// Store a successful result
    pub fn insert(&self, request: TranslationRequest, result: TranslationResult) {
        self.cache.insert(request, result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::Sentence;

    fn result(text: &str) -> TranslationResult {
        TranslationResult {
            sentences: vec![Sentence {
                translated_text: text.to_string(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_hit_requires_same_languages_and_query() {
        let cache = ResultCache::new(16, Duration::from_secs(60));
        cache.insert(TranslationRequest::new("en", "fr", "hello"), result("bonjour"));

        let hit = cache.get(&TranslationRequest::new("en", "fr", "hello"));
        assert_eq!(hit.map(|r| r.translated_text()), Some("bonjour".to_string()));

        assert!(cache.get(&TranslationRequest::new("en", "de", "hello")).is_none());
        assert!(cache.get(&TranslationRequest::new("auto", "fr", "hello")).is_none());
        assert!(cache.get(&TranslationRequest::new("en", "fr", "hello!")).is_none());
    }

    #[test]
    fn test_entries_expire() {
        let cache = ResultCache::new(16, Duration::from_millis(20));
        let request = TranslationRequest::new("en", "fr", "hello");
        cache.insert(request.clone(), result("bonjour"));

        std::thread::sleep(Duration::from_millis(60));
        assert!(cache.get(&request).is_none());
    }
}
