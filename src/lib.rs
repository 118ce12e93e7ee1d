//! gtranslate - client for the public translate web endpoint
//!
//! Reproduces the endpoint's request signing: a per-host key pair is scraped
//! from the landing page and cached, every query is signed with it, and the
//! `dj=1` JSON response is decoded into [`TranslationResult`].
//!
//! ```no_run
//! let client = gtranslate::default_client()?;
//! let text = client.simple_translate("auto", "en", "你好")?;
//! # Ok::<(), gtranslate::TranslationError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod core;

// Re-export key types for convenience
pub use crate::core::{
    client::{default_client, TranslateClient, DEFAULT_SERVER},
    config::ClientConfig,
    errors::{ErrorStage, Result, TranslationError},
    key_cache::{KeyFetcher, LandingPageFetcher, SigningKeyCache},
    languages::{is_supported, language_name, AUTO},
    models::{
        ServerAddress, Sentence, LanguageDetection, TranslationRequest, TranslationResult,
        TRANSLATE_CN_ADDR, TRANSLATE_COM_ADDR,
    },
    signer::{sign, SigningKeyPair},
    transport::{FormMethod, HttpResponse, HttpTransport, ProxyResolver, StaticProxy, Transport, TransportConfig},
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
