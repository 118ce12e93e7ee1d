//! Per-host signing key pairs with time-bound caching

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::core::errors::{Result, TranslationError};
use crate::core::models::ServerAddress;
use crate::core::signer::SigningKeyPair;
use crate::core::transport::{FormMethod, Transport};

/// How long a fetched key pair stays usable
pub const DEFAULT_KEY_TTL: Duration = Duration::from_secs(10 * 60);

/// Current page format: `tkk:'406398.2087938574'`
static TKK_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\btkk\s*[:=]\s*['"](-?\d+)\.(-?\d+)['"]"#).unwrap());

/// Older page format, where the second half is the sum of two script variables:
/// `TKK=eval('((function(){var a\x3d4264492758;var b\x3d-1857761911;return 406375+...`
static TKK_EVAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"var\s+a\\x3d(-?\d+);\s*var\s+b\\x3d(-?\d+);\s*return\s+(-?\d+)\+").unwrap()
});

/// Fetches a fresh key pair from a host
pub trait KeyFetcher: Send + Sync {
    /// Fetch the key pair `server` currently issues
    fn fetch(&self, server: ServerAddress) -> Result<SigningKeyPair>;
}

/// Pulls the key pair out of the host's landing page
pub struct LandingPageFetcher {
    transport: Arc<dyn Transport>,
}

impl LandingPageFetcher {
    /// Fetcher loading landing pages over `transport`
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }
}

impl KeyFetcher for LandingPageFetcher {
    fn fetch(&self, server: ServerAddress) -> Result<SigningKeyPair> {
        let key_error = |message: String| TranslationError::KeyAcquisition {
            server: server.to_string(),
            message,
        };

        let response = self
            .transport
            .send(FormMethod::Get, &server.landing_url(), &[])
            .map_err(|e| key_error(e.to_string()))?;

        if !response.is_success() {
            return Err(key_error(format!("landing page returned HTTP {}", response.status)));
        }

        extract_key_pair(&response.text())
            .ok_or_else(|| key_error("no key pair found in landing page".to_string()))
    }
}

/// Find the key pair embedded in a landing page
pub fn extract_key_pair(page: &str) -> Option<SigningKeyPair> {
    if let Some(caps) = TKK_LITERAL.captures(page) {
        let h1 = caps[1].parse().ok()?;
        let h2 = caps[2].parse().ok()?;
        return Some(SigningKeyPair::new(h1, h2));
    }

    let caps = TKK_EVAL.captures(page)?;
    let a: i64 = caps[1].parse().ok()?;
    let b: i64 = caps[2].parse().ok()?;
    let h1 = caps[3].parse().ok()?;
    Some(SigningKeyPair::new(h1, a.checked_add(b)?))
}

#[derive(Debug, Clone, Copy)]
struct CachedKey {
    key: SigningKeyPair,
    fetched_at: Instant,
}

/// Key pairs per server address, refreshed after `ttl`.
///
/// Concurrent callers that find the same entry missing may each fetch; the
/// last write wins. Stale entries are swept whenever a new one is stored.
pub struct SigningKeyCache {
    fetcher: Arc<dyn KeyFetcher>,
    ttl: Duration,
    entries: RwLock<HashMap<ServerAddress, CachedKey>>,
}

impl SigningKeyCache {
    /// Empty cache keeping each pair from `fetcher` for `ttl`
    pub fn new(fetcher: Arc<dyn KeyFetcher>, ttl: Duration) -> Self {
        Self {
            fetcher,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Cache backed by landing-page fetches over `transport`
    pub fn from_transport(transport: Arc<dyn Transport>, ttl: Duration) -> Self {
        Self::new(Arc::new(LandingPageFetcher::new(transport)), ttl)
    }

    /// How long a fetched pair is reused
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Live key pair for `server`, fetching one if absent or expired
    pub fn get(&self, server: ServerAddress) -> Result<SigningKeyPair> {
        if let Some(key) = self.fresh(server) {
            debug!("Using cached key pair for {}", server);
            return Ok(key);
        }

        let key = self.fetcher.fetch(server).map_err(|e| {
            warn!("Failed to acquire key pair for {}: {}", server, e);
            e
        })?;
        info!("Fetched key pair {} for {}", key, server);

        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        let ttl = self.ttl;
        entries.retain(|_, cached| now.duration_since(cached.fetched_at) < ttl);
        entries.insert(server, CachedKey { key, fetched_at: now });

        Ok(key)
    }

    /// Drop the entry for `server` so the next `get` fetches
    pub fn invalidate(&self, server: ServerAddress) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(&server);
    }

    /// Remove every expired entry
    pub fn purge_expired(&self) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let ttl = self.ttl;
        entries.retain(|_, cached| cached.fetched_at.elapsed() < ttl);
    }

    /// Number of stored entries, expired or not
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// True when no entries are stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn fresh(&self, server: ServerAddress) -> Option<SigningKeyPair> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries
            .get(&server)
            .filter(|cached| cached.fetched_at.elapsed() < self.ttl)
            .map(|cached| cached.key)
    }
}
