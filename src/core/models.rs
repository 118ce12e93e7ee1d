//! Core data models for translation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::errors::{Result, TranslationError};
use crate::core::languages::{self, AUTO};

/// International endpoint host
pub const TRANSLATE_COM_ADDR: &str = "https://translate.google.com";

/// Region-specific endpoint host
pub const TRANSLATE_CN_ADDR: &str = "http://translate.google.cn";

/// Response sections requested on every call: sentences and dictionary data
pub const DATA_TYPES: &[&str] = &["t", "bd"];

/// One of the two hosts the signing algorithm is known to work against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerAddress {
    /// translate.google.com
    International,
    /// translate.google.cn
    Regional,
}

impl ServerAddress {
    /// Base URL without a trailing slash
    pub fn as_str(&self) -> &'static str {
        match self {
            ServerAddress::International => TRANSLATE_COM_ADDR,
            ServerAddress::Regional => TRANSLATE_CN_ADDR,
        }
    }

    /// URL of the translate call on this host
    pub fn translate_url(&self) -> String {
        format!("{}/translate_a/single", self.as_str())
    }

    /// URL of the landing page carrying the key pair
    pub fn landing_url(&self) -> String {
        format!("{}/", self.as_str())
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServerAddress {
    type Err = TranslationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim_end_matches('/') {
            TRANSLATE_COM_ADDR => Ok(ServerAddress::International),
            TRANSLATE_CN_ADDR => Ok(ServerAddress::Regional),
            _ => Err(TranslationError::UnsupportedAddress {
                address: s.to_string(),
            }),
        }
    }
}

/// A single translate call
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TranslationRequest {
    /// Source language code or `auto`
    pub source_lang: String,
    /// Target language code
    pub target_lang: String,
    /// Text to translate
    pub query: String,
}

impl TranslationRequest {
    /// Build a request; nothing is validated until [`validate`](Self::validate)
    pub fn new(
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
        query: impl Into<String>,
    ) -> Self {
        Self {
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
            query: query.into(),
        }
    }

    /// Check both language codes against the catalog
    pub fn validate(&self) -> Result<()> {
        if self.source_lang != AUTO && !languages::is_supported(&self.source_lang) {
            return Err(TranslationError::UnsupportedSourceLanguage {
                code: self.source_lang.clone(),
            });
        }

        if !languages::is_supported(&self.target_lang) {
            return Err(TranslationError::UnsupportedTargetLanguage {
                code: self.target_lang.clone(),
            });
        }

        Ok(())
    }

    /// Query parameters for the translate call, signed with `token`
    pub fn params(&self, token: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("client", "t".to_string()),
            ("sl", self.source_lang.clone()),
            ("tl", self.target_lang.clone()),
            // dj=1 selects the object-shaped response instead of nested arrays
            ("dj", "1".to_string()),
            ("ie", "UTF-8".to_string()),
            ("oe", "UTF-8".to_string()),
            ("tk", token.to_string()),
            ("q", self.query.clone()),
        ];
        params.extend(DATA_TYPES.iter().map(|dt| ("dt", dt.to_string())));
        params
    }
}

/// One translated sentence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    /// Translation of this sentence
    #[serde(rename = "trans", default)]
    pub translated_text: String,
    /// Source text of this sentence
    #[serde(rename = "orig", default)]
    pub original_text: String,
    /// Backend that produced the sentence
    #[serde(rename = "backend", default)]
    pub backend_id: i64,
}

/// Source language detection details
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguageDetection {
    /// Candidate source languages, most likely first
    #[serde(rename = "srclangs", default)]
    pub candidate_langs: Vec<String>,
    /// Confidence for each entry of `candidate_langs`
    #[serde(rename = "srclangs_confidences", default)]
    pub candidate_confidences: Vec<f64>,
    /// Wider candidate list
    #[serde(rename = "extended_srclangs", default)]
    pub extended_candidate_langs: Vec<String>,
}

/// Dictionary block returned for single words (`dt=bd`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    /// Part of speech, e.g. "noun"
    #[serde(default)]
    pub pos: String,
    /// Translations for this part of speech
    #[serde(default)]
    pub terms: Vec<String>,
    /// Translations with back-translations and scores
    #[serde(rename = "entry", default)]
    pub entries: Vec<DictionaryTerm>,
    /// Dictionary form of the looked-up word
    #[serde(default)]
    pub base_form: String,
}

/// A dictionary translation with its back-translations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DictionaryTerm {
    /// Translated word
    #[serde(default)]
    pub word: String,
    /// Words in the source language that translate to `word`
    #[serde(default)]
    pub reverse_translation: Vec<String>,
    /// Frequency score, when given
    #[serde(default)]
    pub score: Option<f64>,
}

/// Decoded translate response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslationResult {
    /// Sentences in input order
    pub sentences: Vec<Sentence>,
    /// Source language, detected when the request used `auto`
    #[serde(rename = "src", default)]
    pub detected_source_lang: String,
    /// Detection confidence, 0.0 to 1.0
    #[serde(default)]
    pub confidence: f64,
    /// Language detection details
    #[serde(rename = "ld_result", default)]
    pub language_detection: LanguageDetection,
    /// Dictionary data, present for single words
    #[serde(rename = "dict", default, skip_serializing_if = "Vec::is_empty")]
    pub dictionary: Vec<DictionaryEntry>,
}

impl TranslationResult {
    /// Decode a `dj=1` response body.
    ///
    /// Only a JSON object is accepted; the nested-array form served without
    /// `dj=1` is rejected even though serde could map it onto the fields.
    pub fn from_slice(body: &[u8]) -> serde_json::Result<Self> {
        let value: serde_json::Value = serde_json::from_slice(body)?;
        if !value.is_object() {
            return Err(serde::de::Error::custom(format!(
                "expected a JSON object, found {}",
                json_kind(&value)
            )));
        }
        serde_json::from_value(value)
    }

    /// Full translation: every sentence's translated text, in order
    pub fn translated_text(&self) -> String {
        self.sentences
            .iter()
            .map(|s| s.translated_text.as_str())
            .collect()
    }

    /// Source text as the endpoint split it, rejoined in order
    pub fn original_text(&self) -> String {
        self.sentences
            .iter()
            .map(|s| s.original_text.as_str())
            .collect()
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
