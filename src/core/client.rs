//! Blocking translate client: validation, signing, request and decode

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::core::config::ClientConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::key_cache::{SigningKeyCache, DEFAULT_KEY_TTL};
use crate::core::models::{ServerAddress, TranslationRequest, TranslationResult, TRANSLATE_CN_ADDR};
use crate::core::result_cache::ResultCache;
use crate::core::signer;
use crate::core::transport::{FormMethod, HttpTransport, Transport, TransportConfig};

/// Server used by [`default_client`]
pub const DEFAULT_SERVER: &str = TRANSLATE_CN_ADDR;

/// Longest slice of an error response body kept in a transport error
const ERROR_BODY_LIMIT: usize = 200;

/// Client bound to one endpoint host
#[derive(Clone)]
pub struct TranslateClient {
    server: ServerAddress,
    transport: Arc<dyn Transport>,
    keys: Arc<SigningKeyCache>,
    results: Option<ResultCache>,
}

/// Client for [`DEFAULT_SERVER`] with default transport settings
pub fn default_client() -> Result<TranslateClient> {
    TranslateClient::new(DEFAULT_SERVER, TransportConfig::default())
}

impl TranslateClient {
    /// Create a client for `address`, which must be one of the two known hosts.
    ///
    /// No network I/O happens here; the key pair is fetched on first use.
    pub fn new(address: &str, transport: TransportConfig) -> Result<Self> {
        let server: ServerAddress = address.parse()?;
        let transport = Arc::new(HttpTransport::new(&transport)?);
        Ok(Self::with_transport(server, transport))
    }

    /// Create a client from a full configuration
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let server = config.server_address()?;
        let transport: Arc<dyn Transport> =
            Arc::new(HttpTransport::new(&config.transport_config()?)?);
        let keys = Arc::new(SigningKeyCache::from_transport(
            Arc::clone(&transport),
            config.key_ttl(),
        ));

        let mut client = Self::with_transport(server, transport).with_key_cache(keys);
        if config.result_cache_capacity > 0 {
            client = client.with_result_cache(config.result_cache_capacity, config.result_cache_ttl());
        }
        Ok(client)
    }

    /// Create from environment
    pub fn from_env() -> Result<Self> {
        let config = ClientConfig::from_env()?;
        Self::from_config(&config)
    }

    /// Client over an arbitrary transport, with its own key cache
    pub fn with_transport(server: ServerAddress, transport: Arc<dyn Transport>) -> Self {
        let keys = Arc::new(SigningKeyCache::from_transport(
            Arc::clone(&transport),
            DEFAULT_KEY_TTL,
        ));
        Self {
            server,
            transport,
            keys,
            results: None,
        }
    }

    /// Share a key cache with other clients
    pub fn with_key_cache(mut self, keys: Arc<SigningKeyCache>) -> Self {
        self.keys = keys;
        self
    }

    /// Cache full results for `ttl`, up to `capacity` entries
    pub fn with_result_cache(mut self, capacity: u64, ttl: Duration) -> Self {
        self.results = Some(ResultCache::new(capacity, ttl));
        self
    }

    /// Host this client talks to
    pub fn server(&self) -> ServerAddress {
        self.server
    }

    /// Key cache used for signing, shareable via [`with_key_cache`](Self::with_key_cache)
    pub fn key_cache(&self) -> &Arc<SigningKeyCache> {
        &self.keys
    }

    /// Translate `query` from `source_lang` (or `auto`) to `target_lang`
    pub fn translate(&self, source_lang: &str, target_lang: &str, query: &str) -> Result<TranslationResult> {
        let request = TranslationRequest::new(source_lang, target_lang, query);
        self.execute(&request)
    }

    /// Translate and return only the concatenated translated text
    pub fn simple_translate(&self, source_lang: &str, target_lang: &str, query: &str) -> Result<String> {
        let result = self.translate(source_lang, target_lang, query)?;
        Ok(result.translated_text())
    }

    /// Run a prepared request
    pub fn execute(&self, request: &TranslationRequest) -> Result<TranslationResult> {
        request.validate()?;

        if let Some(hit) = self.results.as_ref().and_then(|cache| cache.get(request)) {
            return Ok(hit);
        }

        let key = self.keys.get(self.server)?;
        let token = signer::sign(&key, &request.query);
        debug!(
            "Translating {} chars {} -> {} with tk={}",
            request.query.chars().count(),
            request.source_lang,
            request.target_lang,
            token
        );

        let url = self.server.translate_url();
        let response = self
            .transport
            .send(FormMethod::Get, &url, &request.params(&token))
            .map_err(|e| {
                let err = match e {
                    TranslationError::Transport { status, message, .. } => self.transport_error(status, message),
                    other => self.transport_error(None, other.to_string()),
                };
                warn!("Translate request failed: {}", err);
                err
            })?;

        if !response.is_success() {
            let err = self.transport_error(Some(response.status), response.snippet(ERROR_BODY_LIMIT));
            warn!("Translate request failed: {}", err);
            return Err(err);
        }

        let result = TranslationResult::from_slice(&response.body).map_err(|e| TranslationError::Decode {
            server: self.server.to_string(),
            message: e.to_string(),
        })?;

        if let Some(cache) = &self.results {
            cache.insert(request.clone(), result.clone());
        }

        Ok(result)
    }

    fn transport_error(&self, status: Option<u16>, message: String) -> TranslationError {
        TranslationError::Transport {
            server: self.server.to_string(),
            status,
            message,
        }
    }
}
