//! CLI command definitions and handlers

use clap::Subcommand;
use tracing::info;

use gtranslate::core::languages;
use gtranslate::{ClientConfig, SigningKeyPair, TranslateClient, AUTO};

/// Commands for gtranslate
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Translate text
    Translate {
        /// Text to translate
        text: String,

        /// Source language (default: auto)
        #[arg(short, long, default_value = AUTO)]
        source_lang: String,

        /// Target language (default: en)
        #[arg(short, long, default_value = "en")]
        target_lang: String,

        /// Print the full decoded response as JSON
        #[arg(long)]
        json: bool,
    },

    /// List supported language codes
    Languages,

    /// Compute the request token for a text offline
    Token {
        /// Text to sign
        text: String,

        /// Key pair in h1.h2 form
        #[arg(short, long)]
        key: String,
    },

    /// Fetch the current key pair from the server
    Key,
}

/// Handle translate command
pub fn handle_translate(
    config: &ClientConfig,
    text: String,
    source_lang: String,
    target_lang: String,
    json: bool,
) -> anyhow::Result<()> {
    let client = TranslateClient::from_config(config)?;

    info!("Translating via {}: {} -> {}", client.server(), source_lang, target_lang);

    let result = client.translate(&source_lang, &target_lang, &text)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result.translated_text());
        if source_lang == AUTO && !result.detected_source_lang.is_empty() {
            let name = languages::language_name(&result.detected_source_lang)
                .unwrap_or(result.detected_source_lang.as_str());
            info!("Detected source language: {}", name);
        }
    }

    Ok(())
}

/// Handle languages command
pub fn handle_languages() -> anyhow::Result<()> {
    for (code, name) in languages::supported_languages() {
        println!("{:<8} {}", code, name);
    }
    Ok(())
}

/// Handle token command
pub fn handle_token(text: String, key: String) -> anyhow::Result<()> {
    let key: SigningKeyPair = key.parse()?;
    println!("{}", gtranslate::sign(&key, &text));
    Ok(())
}

/// Handle key command
pub fn handle_key(config: &ClientConfig) -> anyhow::Result<()> {
    let client = TranslateClient::from_config(config)?;
    let keys = client.key_cache();
    let key = keys.get(client.server())?;
    info!("Key pair for {} is reused for {}s", client.server(), keys.ttl().as_secs());
    println!("{}", key);
    Ok(())
}
